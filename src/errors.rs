//! Domain-specific error types.
//!
//! Contract violations (a `Location` built with a non-location operator, a
//! subscript over a compound expression) are not represented here: they
//! panic at the construction site.  These enums cover the conditions a
//! caller is expected to handle.

use crate::core::oper::Oper;
use crate::proc::ProcId;
use std::path::PathBuf;
use thiserror::Error;

/// Errors from expression construction, traversal and procedure linkage.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExprError {
    #[error("operator {oper:?} takes {expected} operands, got {found}")]
    ArityMismatch {
        oper: Oper,
        expected: usize,
        found: usize,
    },

    #[error("constant operator {0:?} needs a literal value")]
    MissingLiteral(Oper),

    #[error("subscript needs a defining statement; build it with Exp::subscript")]
    MissingDefinition,

    #[error("{0} is not a location")]
    NotALocation(String),

    #[error("traversal aborted")]
    TraversalAborted,

    #[error("unattributed location: {0}")]
    UnattributedLocation(String),

    #[error("unknown procedure {0}")]
    UnknownProc(ProcId),
}

/// Errors from loading configuration and target descriptions.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("alias entry uses non-location kind {0:?}")]
    InvalidAliasKind(Oper),
}
