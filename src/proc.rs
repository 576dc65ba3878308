//! Procedure linkage.
//!
//! Expressions never own procedures.  A `Location` stores a [`ProcId`],
//! a plain index into a [`ProcRegistry`] kept by the analysis layer, so the
//! lifetime of an expression is never tied to the lifetime of a procedure.

use crate::core::address::Address;
use crate::errors::ExprError;
use crate::location::Location;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Non-owning handle to a procedure in a [`ProcRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProcId(u32);

impl ProcId {
    pub const fn new(index: u32) -> Self {
        ProcId(index)
    }

    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ProcId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "proc#{}", self.0)
    }
}

/// What the registry knows about a procedure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Procedure {
    pub name: String,
    pub entry: Address,
    /// Library procedures have a signature but no decoded body.
    pub is_lib: bool,
}

/// Registry of the procedures of a program.
///
/// Procedures are never removed, so a `ProcId` handed out once stays valid
/// for the lifetime of the registry.
#[derive(Debug, Clone, Default)]
pub struct ProcRegistry {
    procs: Vec<Procedure>,
}

impl ProcRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user procedure decoded at `entry`.
    pub fn register(&mut self, name: &str, entry: Address) -> ProcId {
        self.push(Procedure {
            name: name.to_string(),
            entry,
            is_lib: false,
        })
    }

    /// Register a library procedure.
    pub fn register_lib(&mut self, name: &str, entry: Address) -> ProcId {
        self.push(Procedure {
            name: name.to_string(),
            entry,
            is_lib: true,
        })
    }

    fn push(&mut self, proc: Procedure) -> ProcId {
        let id = ProcId(self.procs.len() as u32);
        log::debug!("registered {} as {id} at {}", proc.name, proc.entry);
        self.procs.push(proc);
        id
    }

    pub fn get(&self, id: ProcId) -> Option<&Procedure> {
        self.procs.get(id.0 as usize)
    }

    pub fn find_by_name(&self, name: &str) -> Option<ProcId> {
        self.procs
            .iter()
            .position(|p| p.name == name)
            .map(|i| ProcId(i as u32))
    }

    /// Find the procedure whose entry point is `addr`.  Invalid addresses
    /// never match.
    pub fn find_by_address(&self, addr: Address) -> Option<ProcId> {
        if !addr.is_valid() {
            return None;
        }
        self.procs
            .iter()
            .position(|p| p.entry == addr)
            .map(|i| ProcId(i as u32))
    }

    pub fn rename(&mut self, id: ProcId, name: &str) -> Result<(), ExprError> {
        let proc = self
            .procs
            .get_mut(id.0 as usize)
            .ok_or(ExprError::UnknownProc(id))?;
        proc.name = name.to_string();
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.procs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.procs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ProcId, &Procedure)> {
        self.procs
            .iter()
            .enumerate()
            .map(|(i, p)| (ProcId(i as u32), p))
    }

    /// Resolve the procedure a location belongs to.
    ///
    /// Passes that need strict attribution call this instead of looking at
    /// `Location::proc` directly, so a missing link surfaces as
    /// [`ExprError::UnattributedLocation`].
    pub fn resolve(&self, loc: &Location) -> Result<&Procedure, ExprError> {
        let id = loc.require_proc()?;
        self.get(id).ok_or(ExprError::UnknownProc(id))
    }
}
