//! Read-only passes built on [`ExpVisitor`].

use crate::core::oper::Oper;
use crate::errors::ExprError;
use crate::expr::{Exp, SharedExp};
use crate::location_set::LocationSet;
use crate::traverse::{accept, visit, ExpVisitor};

// ===========================================================================
// Used locations
// ===========================================================================

/// Collects the locations an expression reads.
///
/// `m[x]` uses both `m[x]` and whatever `x` uses.  The location inside a
/// subscript is not a use of its own (the subscript is), and neither is
/// the `m[x]` in `a[m[x]]`, although `x` still is.
#[derive(Debug, Default)]
pub struct UsedLocsFinder {
    used: LocationSet,
    mem_only: bool,
    skip_next: bool,
}

impl UsedLocsFinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only collect memory locations.
    pub fn mem_only() -> Self {
        UsedLocsFinder {
            mem_only: true,
            ..Self::default()
        }
    }

    pub fn used(&self) -> &LocationSet {
        &self.used
    }

    pub fn into_used(self) -> LocationSet {
        self.used
    }
}

fn is_mem(e: &Exp) -> bool {
    e.base_location().map(|l| l.oper()) == Some(Oper::MemOf)
}

impl ExpVisitor for UsedLocsFinder {
    fn pre_visit(&mut self, exp: &SharedExp, visit_children: &mut bool) -> bool {
        match exp.as_ref() {
            Exp::Location(loc) => {
                let mem = loc.oper() == Oper::MemOf;
                let skip = std::mem::take(&mut self.skip_next);
                if !skip && (mem || !self.mem_only) {
                    self.used.insert(exp.clone());
                }
                // Only a memory address contains further uses.
                *visit_children = mem;
            }
            Exp::Ref(_) => {
                if is_mem(exp) || !self.mem_only {
                    self.used.insert(exp.clone());
                }
                self.skip_next = true;
            }
            Exp::Unary {
                op: Oper::AddrOf,
                sub,
            } if sub.as_location().is_some_and(|l| l.oper() == Oper::MemOf) => {
                self.skip_next = true;
            }
            _ => {}
        }
        true
    }
}

/// Locations read by `exp`.
pub fn used_locations(exp: &SharedExp) -> LocationSet {
    let mut finder = UsedLocsFinder::new();
    accept(exp, &mut finder);
    finder.into_used()
}

// ===========================================================================
// Searching
// ===========================================================================

/// Finds the first subexpression equal to a pattern, then stops the walk.
#[derive(Debug)]
pub struct ExpSearcher<'a> {
    pattern: &'a Exp,
    found: Option<SharedExp>,
    visited: usize,
}

impl<'a> ExpSearcher<'a> {
    pub fn new(pattern: &'a Exp) -> Self {
        ExpSearcher {
            pattern,
            found: None,
            visited: 0,
        }
    }

    pub fn found(&self) -> Option<&SharedExp> {
        self.found.as_ref()
    }

    /// Nodes looked at before the walk ended.
    pub fn visited(&self) -> usize {
        self.visited
    }
}

impl ExpVisitor for ExpSearcher<'_> {
    fn pre_visit(&mut self, exp: &SharedExp, _visit_children: &mut bool) -> bool {
        self.visited += 1;
        if **exp == *self.pattern {
            self.found = Some(exp.clone());
            return false;
        }
        true
    }
}

/// First occurrence of `pattern` in `exp`, in pre-order.
pub fn search(exp: &SharedExp, pattern: &Exp) -> Option<SharedExp> {
    let mut searcher = ExpSearcher::new(pattern);
    accept(exp, &mut searcher);
    searcher.found
}

struct AllSearcher<'a> {
    pattern: &'a Exp,
    found: Vec<SharedExp>,
}

impl ExpVisitor for AllSearcher<'_> {
    fn pre_visit(&mut self, exp: &SharedExp, visit_children: &mut bool) -> bool {
        if **exp == *self.pattern {
            self.found.push(exp.clone());
            *visit_children = false;
        }
        true
    }
}

/// Every occurrence of `pattern` in `exp`, outermost first.  Matches
/// nested inside another match are not reported.
pub fn search_all(exp: &SharedExp, pattern: &Exp) -> Vec<SharedExp> {
    let mut searcher = AllSearcher {
        pattern,
        found: Vec::new(),
    };
    accept(exp, &mut searcher);
    searcher.found
}

// ===========================================================================
// Attribution
// ===========================================================================

/// Aborts at the first location that has no owning procedure.
#[derive(Debug, Default)]
struct AttributionChecker {
    unattributed: Option<SharedExp>,
}

impl ExpVisitor for AttributionChecker {
    fn pre_visit(&mut self, exp: &SharedExp, _visit_children: &mut bool) -> bool {
        match exp.as_location() {
            Some(loc) if loc.proc().is_none() => {
                self.unattributed = Some(exp.clone());
                false
            }
            _ => true,
        }
    }
}

/// Check that every location in `exp` is linked to a procedure.
///
/// For passes that cannot work with unattributed locations; reports the
/// first offender as [`ExprError::UnattributedLocation`].
pub fn check_attribution(exp: &SharedExp) -> Result<(), ExprError> {
    let mut checker = AttributionChecker::default();
    match visit(exp, &mut checker) {
        Ok(()) => Ok(()),
        Err(_) => Err(ExprError::UnattributedLocation(
            checker
                .unattributed
                .map(|e| e.to_string())
                .unwrap_or_default(),
        )),
    }
}
