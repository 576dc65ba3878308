//! Native addresses supplied by the loader layer.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A virtual address in the loaded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Address(u64);

impl Address {
    /// Sentinel for "no address" (unknown entry point, library procedure, ...).
    pub const INVALID: Address = Address(u64::MAX);
    pub const ZERO: Address = Address(0);

    pub const fn new(value: u64) -> Self {
        Address(value)
    }

    pub const fn value(self) -> u64 {
        self.0
    }

    pub fn is_valid(self) -> bool {
        self != Address::INVALID
    }

    /// Offset by a signed displacement, wrapping on overflow.
    ///
    /// The invalid address stays invalid.
    pub fn offset(self, delta: i64) -> Address {
        if !self.is_valid() {
            return self;
        }
        Address(self.0.wrapping_add_signed(delta))
    }
}

impl From<u64> for Address {
    fn from(value: u64) -> Self {
        Address(value)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "0x{:08x}", self.0)
        } else {
            f.write_str("INVALID")
        }
    }
}
