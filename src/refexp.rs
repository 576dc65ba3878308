//! SSA subscripts.
//!
//! A [`RefExp`] pairs a location with the program point that defines its
//! value, so every definition of the same storage gets its own identity.

use crate::errors::ExprError;
use crate::expr::{Exp, SharedExp};
use crate::location::Location;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Handle to a defining statement, owned by the procedure layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StmtId(u32);

impl StmtId {
    pub const fn new(number: u32) -> Self {
        StmtId(number)
    }

    pub const fn number(self) -> u32 {
        self.0
    }
}

/// Where the value of a subscripted location comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Def {
    /// Defined by this statement.
    Stmt(StmtId),
    /// No definition in the procedure: live on entry (a parameter, or
    /// defined by the caller).
    Implicit,
}

impl fmt::Display for Def {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Def::Stmt(id) => write!(f, "{}", id.0),
            Def::Implicit => f.write_str("-"),
        }
    }
}

/// `loc{def}`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RefExp {
    sub: SharedExp,
    def: Def,
}

impl RefExp {
    /// # Panics
    ///
    /// If `sub` is not a [`Location`]; a subscript never wraps a compound
    /// expression.
    pub fn new(sub: SharedExp, def: Def) -> Self {
        assert!(sub.is_location(), "cannot subscript non-location {sub}");
        RefExp { sub, def }
    }

    /// Checked variant of [`RefExp::new`] for callers handling untrusted input.
    pub fn try_new(sub: SharedExp, def: Def) -> Result<Self, ExprError> {
        if !sub.is_location() {
            return Err(ExprError::NotALocation(sub.to_string()));
        }
        Ok(RefExp { sub, def })
    }

    pub fn sub_exp(&self) -> &SharedExp {
        &self.sub
    }

    pub(crate) fn set_sub_exp(&mut self, sub: SharedExp) {
        assert!(sub.is_location(), "cannot subscript non-location {sub}");
        self.sub = sub;
    }

    pub fn location(&self) -> &Location {
        match self.sub.as_ref() {
            Exp::Location(loc) => loc,
            other => unreachable!("subscript over non-location {other}"),
        }
    }

    pub fn def(&self) -> Def {
        self.def
    }

    pub fn is_implicit(&self) -> bool {
        self.def == Def::Implicit
    }
}
