//! Leaf building blocks: the operator catalog, addresses and integer arithmetic.

pub mod address;
pub mod arithmetic;
pub mod oper;
