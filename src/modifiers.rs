//! Rewriting passes built on [`ExpModifier`].
//!
//! None of these modifiers abort, so the convenience functions return the
//! rewritten tree directly.

use crate::core::oper::Oper;
use crate::expr::{Exp, SharedExp};
use crate::location::Location;
use crate::proc::ProcId;
use crate::refexp::Def;
use crate::traverse::{accept_modifier, ExpModifier};
use std::collections::HashMap;
use std::ops::ControlFlow;

fn run<M: ExpModifier>(exp: SharedExp, modifier: &mut M) -> SharedExp {
    match accept_modifier(exp.clone(), modifier) {
        ControlFlow::Continue(e) => e,
        ControlFlow::Break(()) => exp,
    }
}

// ===========================================================================
// Search and replace
// ===========================================================================

/// Replaces every occurrence of a pattern.  Replacements are not searched
/// again.
#[derive(Debug)]
pub struct SearchReplace<'a> {
    pattern: &'a Exp,
    replacement: SharedExp,
    pub changed: bool,
}

impl<'a> SearchReplace<'a> {
    pub fn new(pattern: &'a Exp, replacement: SharedExp) -> Self {
        SearchReplace {
            pattern,
            replacement,
            changed: false,
        }
    }
}

impl ExpModifier for SearchReplace<'_> {
    fn pre_modify(&mut self, exp: SharedExp, visit_children: &mut bool) -> ControlFlow<(), SharedExp> {
        if *exp == *self.pattern {
            *visit_children = false;
            self.changed = true;
            return ControlFlow::Continue(self.replacement.clone());
        }
        ControlFlow::Continue(exp)
    }
}

/// Replace every `pattern` in `exp` with `replacement`.  The flag tells
/// whether anything was replaced.
pub fn search_replace_all(exp: SharedExp, pattern: &Exp, replacement: SharedExp) -> (SharedExp, bool) {
    let mut m = SearchReplace::new(pattern, replacement);
    let out = run(exp, &mut m);
    (out, m.changed)
}

// ===========================================================================
// SSA
// ===========================================================================

/// Subscripts every free occurrence of one location with a definition.
///
/// Occurrences that are already subscripted are left alone, but the
/// address of a subscripted memory location is still rewritten:
/// `m[r28]{5}` becomes `m[r28{d}]{5}` when subscripting `r28`.
#[derive(Debug)]
pub struct Subscripter<'a> {
    target: &'a Exp,
    def: Def,
    in_ref: bool,
    pub changed: bool,
}

impl<'a> Subscripter<'a> {
    pub fn new(target: &'a Exp, def: Def) -> Self {
        Subscripter {
            target,
            def,
            in_ref: false,
            changed: false,
        }
    }
}

impl ExpModifier for Subscripter<'_> {
    fn pre_modify(&mut self, exp: SharedExp, visit_children: &mut bool) -> ControlFlow<(), SharedExp> {
        match exp.as_ref() {
            Exp::Ref(_) => self.in_ref = true,
            Exp::Location(loc) => {
                *visit_children = loc.oper() == Oper::MemOf;
                let subscripted = std::mem::take(&mut self.in_ref);
                if !subscripted && *exp == *self.target {
                    *visit_children = false;
                    self.changed = true;
                    return ControlFlow::Continue(Exp::subscript(exp, self.def));
                }
            }
            _ => {}
        }
        ControlFlow::Continue(exp)
    }
}

/// Subscript the free occurrences of `target` in `exp` with `def`.
pub fn subscript_var(exp: SharedExp, target: &Exp, def: Def) -> (SharedExp, bool) {
    let mut m = Subscripter::new(target, def);
    let out = run(exp, &mut m);
    (out, m.changed)
}

/// Removes every subscript.
#[derive(Debug, Default)]
pub struct RefStripper;

impl ExpModifier for RefStripper {
    fn post_modify(&mut self, exp: SharedExp) -> ControlFlow<(), SharedExp> {
        match exp.as_ref() {
            Exp::Ref(r) => ControlFlow::Continue(r.sub_exp().clone()),
            _ => ControlFlow::Continue(exp),
        }
    }
}

/// `exp` with all subscripts removed.
pub fn strip_refs(exp: SharedExp) -> SharedExp {
    run(exp, &mut RefStripper)
}

// ===========================================================================
// Procedure linkage
// ===========================================================================

/// Links every unattributed location to a procedure.  Locations that
/// already have a procedure keep it.
#[derive(Debug)]
pub struct ProcAttributor {
    proc: ProcId,
    pub changed: bool,
}

impl ProcAttributor {
    pub fn new(proc: ProcId) -> Self {
        ProcAttributor {
            proc,
            changed: false,
        }
    }
}

impl ExpModifier for ProcAttributor {
    fn post_modify(&mut self, exp: SharedExp) -> ControlFlow<(), SharedExp> {
        match exp.as_location() {
            Some(loc) if loc.proc().is_none() => {
                self.changed = true;
                ControlFlow::Continue(loc.with_proc(self.proc).into_exp())
            }
            _ => ControlFlow::Continue(exp),
        }
    }
}

/// Attribute the unattributed locations of `exp` to `proc`.
pub fn attribute_to(exp: SharedExp, proc: ProcId) -> SharedExp {
    run(exp, &mut ProcAttributor::new(proc))
}

// ===========================================================================
// Stack locals
// ===========================================================================

/// Maps stack accesses to named locals of a procedure.
///
/// `m[sp - K]` becomes `localN`; a bare `sp - K` (the address of a stack
/// slot) becomes `a[localN]`.  The stack pointer may be subscripted.
/// Names are handed out in order of first appearance and stay stable for
/// the lifetime of the mapper, so one mapper can be run over every
/// expression of a procedure.
#[derive(Debug)]
pub struct StackLocalMapper {
    proc: ProcId,
    sp: i64,
    locals: HashMap<i64, String>,
    pub changed: bool,
}

impl StackLocalMapper {
    /// `sp` is the register number of the stack pointer.
    pub fn new(proc: ProcId, sp: i64) -> Self {
        StackLocalMapper {
            proc,
            sp,
            locals: HashMap::new(),
            changed: false,
        }
    }

    /// Name given to the slot at `sp - offset`, if it has been seen.
    pub fn local_name(&self, offset: i64) -> Option<&str> {
        self.locals.get(&offset).map(String::as_str)
    }

    pub fn local_count(&self) -> usize {
        self.locals.len()
    }

    /// `K` if `e` is `sp - K` with `K > 0`.
    fn sp_offset(&self, e: &Exp) -> Option<i64> {
        let Exp::Binary {
            op: Oper::Minus,
            lhs,
            rhs,
        } = e
        else {
            return None;
        };
        let k = rhs.int_value()?;
        let base = lhs.base_location()?;
        (base.reg_num() == Some(self.sp) && k > 0).then_some(k)
    }

    fn local_for(&mut self, offset: i64) -> SharedExp {
        let next = self.locals.len();
        let name = self
            .locals
            .entry(offset)
            .or_insert_with(|| format!("local{next}"));
        Location::local(name, self.proc)
    }
}

impl ExpModifier for StackLocalMapper {
    fn pre_modify(&mut self, exp: SharedExp, visit_children: &mut bool) -> ControlFlow<(), SharedExp> {
        let slot = match exp.as_location() {
            Some(loc) if loc.oper() == Oper::MemOf => self.sp_offset(loc.sub_exp()),
            _ => None,
        };
        if let Some(k) = slot {
            *visit_children = false;
            self.changed = true;
            return ControlFlow::Continue(self.local_for(k));
        }
        if let Some(k) = self.sp_offset(&exp) {
            *visit_children = false;
            self.changed = true;
            return ControlFlow::Continue(Exp::addr_of(self.local_for(k)));
        }
        ControlFlow::Continue(exp)
    }
}
