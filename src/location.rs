//! Storage locations.
//!
//! A `Location` names a register, memory cell, local, global, parameter or
//! temporary.  It owns one operand (the register number, the address, or
//! the name) and an optional link to the procedure it belongs to.

use crate::alias::AliasPolicy;
use crate::core::oper::Oper;
use crate::errors::ExprError;
use crate::expr::{Exp, SharedExp};
use crate::location_set::LocationSet;
use crate::proc::ProcId;
use serde::Serialize;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// A storage location.
///
/// Equality and hashing look at the operator and the operand only; the
/// procedure link is an annotation.
#[derive(Debug, Clone, Serialize)]
pub struct Location {
    oper: Oper,
    sub: SharedExp,
    #[serde(skip_serializing_if = "Option::is_none")]
    proc: Option<ProcId>,
}

impl Location {
    /// Create a location.
    ///
    /// Without an explicit `proc`, the link is recovered from the operand:
    /// any chain of subscripts is unwrapped, and if a location sits
    /// underneath, its procedure is adopted.  Anything else leaves the link
    /// unset.
    ///
    /// # Panics
    ///
    /// If `oper` is not one of the six location kinds.
    pub fn new(oper: Oper, sub: SharedExp, proc: Option<ProcId>) -> Self {
        assert!(oper.is_location(), "{oper:?} is not a location operator");
        let proc = proc.or_else(|| recover_proc(&sub));
        if proc.is_none() && matches!(oper, Oper::Local | Oper::Param) {
            log::trace!("{oper:?} {sub} has no procedure link");
        }
        Location { oper, sub, proc }
    }

    // -- Builders ----------------------------------------------------------

    /// `r<num>`
    pub fn reg_of(num: i64) -> SharedExp {
        Location::new(Oper::RegOf, Exp::int(num), None).into_exp()
    }

    /// `r[exp]` for a computed register number.
    pub fn reg_of_exp(num: SharedExp) -> SharedExp {
        Location::new(Oper::RegOf, num, None).into_exp()
    }

    /// `m[addr]`
    pub fn mem_of(addr: SharedExp) -> SharedExp {
        Location::new(Oper::MemOf, addr, None).into_exp()
    }

    /// `m[addr]` attributed to `proc`.
    pub fn mem_of_in(addr: SharedExp, proc: ProcId) -> SharedExp {
        Location::new(Oper::MemOf, addr, Some(proc)).into_exp()
    }

    pub fn local(name: &str, proc: ProcId) -> SharedExp {
        Location::new(Oper::Local, Exp::str(name), Some(proc)).into_exp()
    }

    pub fn global(name: &str) -> SharedExp {
        Location::new(Oper::Global, Exp::str(name), None).into_exp()
    }

    pub fn param(name: &str, proc: ProcId) -> SharedExp {
        Location::new(Oper::Param, Exp::str(name), Some(proc)).into_exp()
    }

    pub fn temp(name: &str) -> SharedExp {
        Location::new(Oper::Temp, Exp::str(name), None).into_exp()
    }

    pub fn into_exp(self) -> SharedExp {
        Rc::new(Exp::Location(self))
    }

    // -- Accessors ---------------------------------------------------------

    pub fn oper(&self) -> Oper {
        self.oper
    }

    pub fn sub_exp(&self) -> &SharedExp {
        &self.sub
    }

    /// Replace the operand.  An unset procedure link is recovered from the
    /// new operand, as [`Location::new`] does; an existing link is kept.
    pub(crate) fn set_sub_exp(&mut self, sub: SharedExp) {
        if self.proc.is_none() {
            self.proc = recover_proc(&sub);
        }
        self.sub = sub;
    }

    pub fn proc(&self) -> Option<ProcId> {
        self.proc
    }

    /// Same location, attributed to `proc`.
    pub fn with_proc(&self, proc: ProcId) -> Location {
        Location {
            proc: Some(proc),
            ..self.clone()
        }
    }

    /// The owning procedure, for passes that cannot work without one.
    pub fn require_proc(&self) -> Result<ProcId, ExprError> {
        self.proc.ok_or_else(|| {
            ExprError::UnattributedLocation(Exp::Location(self.clone()).to_string())
        })
    }

    /// Register number of `r<num>`.
    pub fn reg_num(&self) -> Option<i64> {
        if self.oper != Oper::RegOf {
            return None;
        }
        self.sub.int_value()
    }

    /// Name of a local, global, parameter or temporary.
    pub fn name(&self) -> Option<&str> {
        match self.oper {
            Oper::Local | Oper::Global | Oper::Param | Oper::Temp => self.sub.str_value(),
            _ => None,
        }
    }

    /// Add the locations that are also defined when this one is written,
    /// as listed by the target's alias policy.
    pub fn definitions(&self, policy: &AliasPolicy, defs: &mut LocationSet) {
        for alias in policy.aliases_of(self) {
            defs.insert(alias);
        }
    }
}

/// Unwrap subscripts until a location turns up and take its procedure.
fn recover_proc(sub: &SharedExp) -> Option<ProcId> {
    let mut e = sub;
    loop {
        match e.as_ref() {
            Exp::Location(loc) => return loc.proc,
            Exp::Ref(r) => e = r.sub_exp(),
            _ => return None,
        }
    }
}

impl PartialEq for Location {
    fn eq(&self, other: &Self) -> bool {
        self.oper == other.oper && self.sub == other.sub
    }
}

impl Eq for Location {}

impl Hash for Location {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.oper.hash(state);
        self.sub.hash(state);
    }
}
