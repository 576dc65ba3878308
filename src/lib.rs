//! decomp-exp — symbolic expressions for a machine-code decompiler
//!
//! Operator trees over registers, memory, locals and constants; an
//! algebraic simplifier; read-only visitors and rewriting modifiers; SSA
//! subscripts and location sets with target-specific register aliasing.

pub mod core;

pub mod alias;
pub mod config;
pub mod errors;
pub mod expr;
pub mod location;
pub mod location_set;
pub mod modifiers;
pub mod proc;
pub mod refexp;
pub mod simplify;
pub mod traverse;
pub mod visitors;
