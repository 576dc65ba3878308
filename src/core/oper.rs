//! Operator catalog.
//!
//! Every expression node carries exactly one `Oper`.  The catalog is closed:
//! arity and display form are fixed per operator and never change at runtime.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Expression operator kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Oper {
    // -- Arithmetic --------------------------------------------------------
    Plus,
    Minus,
    Mult,
    Div,
    Mod,
    Neg,

    // -- Bitwise -----------------------------------------------------------
    BitAnd,
    BitOr,
    BitXor,
    BitNot,
    ShiftL,
    ShiftR,
    ShiftRA,

    // -- Logical and comparison --------------------------------------------
    And,
    Or,
    LNot,
    Equals,
    NotEqual,
    Less,
    Greater,
    LessEq,
    GreaterEq,
    LessUns,
    GreaterUns,

    // -- Memory ------------------------------------------------------------
    /// Memory dereference `m[addr]`.  Also a location kind.
    MemOf,
    /// Address-of `a[exp]`.
    AddrOf,

    // -- Locations ---------------------------------------------------------
    RegOf,
    Local,
    Global,
    Param,
    Temp,

    // -- Structure ---------------------------------------------------------
    /// SSA subscript `loc{def}`.
    Subscript,
    /// `base.field`
    MemberAccess,
    /// `base[index]`
    ArrayIndex,

    // -- Misc --------------------------------------------------------------
    /// `cond ? a : b`
    Tern,
    /// Bit-size cast: `Size(bits, exp)`.
    Size,

    // -- Constants ---------------------------------------------------------
    IntConst,
    AddrConst,
    StrConst,
    FltConst,
}

impl Oper {
    /// Every operator in the catalog, in declaration order.
    pub const ALL: [Oper; 40] = [
        Oper::Plus,
        Oper::Minus,
        Oper::Mult,
        Oper::Div,
        Oper::Mod,
        Oper::Neg,
        Oper::BitAnd,
        Oper::BitOr,
        Oper::BitXor,
        Oper::BitNot,
        Oper::ShiftL,
        Oper::ShiftR,
        Oper::ShiftRA,
        Oper::And,
        Oper::Or,
        Oper::LNot,
        Oper::Equals,
        Oper::NotEqual,
        Oper::Less,
        Oper::Greater,
        Oper::LessEq,
        Oper::GreaterEq,
        Oper::LessUns,
        Oper::GreaterUns,
        Oper::MemOf,
        Oper::AddrOf,
        Oper::RegOf,
        Oper::Local,
        Oper::Global,
        Oper::Param,
        Oper::Temp,
        Oper::Subscript,
        Oper::MemberAccess,
        Oper::ArrayIndex,
        Oper::Tern,
        Oper::Size,
        Oper::IntConst,
        Oper::AddrConst,
        Oper::StrConst,
        Oper::FltConst,
    ];

    /// Number of child expressions a node with this operator owns.
    pub fn arity(self) -> usize {
        match self {
            Oper::IntConst | Oper::AddrConst | Oper::StrConst | Oper::FltConst => 0,

            Oper::Neg
            | Oper::BitNot
            | Oper::LNot
            | Oper::MemOf
            | Oper::AddrOf
            | Oper::RegOf
            | Oper::Local
            | Oper::Global
            | Oper::Param
            | Oper::Temp
            | Oper::Subscript => 1,

            Oper::Tern => 3,

            _ => 2,
        }
    }

    /// Textual form used by the diagnostic printer.
    ///
    /// Binary operators return their infix symbol, unary operators their
    /// prefix, and location kinds the bracketed prefix (`m`, `r`, ...).
    pub fn symbol(self) -> &'static str {
        match self {
            Oper::Plus => "+",
            Oper::Minus | Oper::Neg => "-",
            Oper::Mult => "*",
            Oper::Div => "/",
            Oper::Mod => "%",
            Oper::BitAnd => "&",
            Oper::BitOr => "|",
            Oper::BitXor => "^",
            Oper::BitNot => "~",
            Oper::ShiftL => "<<",
            Oper::ShiftR => ">>",
            Oper::ShiftRA => ">>A",
            Oper::And => "and",
            Oper::Or => "or",
            Oper::LNot => "!",
            Oper::Equals => "=",
            Oper::NotEqual => "~=",
            Oper::Less => "<",
            Oper::Greater => ">",
            Oper::LessEq => "<=",
            Oper::GreaterEq => ">=",
            Oper::LessUns => "<u",
            Oper::GreaterUns => ">u",
            Oper::MemOf => "m",
            Oper::AddrOf => "a",
            Oper::RegOf => "r",
            Oper::Local => "local",
            Oper::Global => "global",
            Oper::Param => "param",
            Oper::Temp => "tmp",
            Oper::Subscript => "{}",
            Oper::MemberAccess => ".",
            Oper::ArrayIndex => "[]",
            Oper::Tern => "?:",
            Oper::Size => "size",
            Oper::IntConst => "int",
            Oper::AddrConst => "addr",
            Oper::StrConst => "str",
            Oper::FltConst => "flt",
        }
    }

    /// `true` for the six storage-location kinds.
    pub fn is_location(self) -> bool {
        matches!(
            self,
            Oper::RegOf | Oper::MemOf | Oper::Local | Oper::Global | Oper::Param | Oper::Temp
        )
    }

    pub fn is_const(self) -> bool {
        matches!(
            self,
            Oper::IntConst | Oper::AddrConst | Oper::StrConst | Oper::FltConst
        )
    }

    /// `true` if `a op b == b op a` for all integer operands.
    pub fn is_commutative(self) -> bool {
        matches!(
            self,
            Oper::Plus
                | Oper::Mult
                | Oper::BitAnd
                | Oper::BitOr
                | Oper::BitXor
                | Oper::And
                | Oper::Or
                | Oper::Equals
                | Oper::NotEqual
        )
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            Oper::Equals
                | Oper::NotEqual
                | Oper::Less
                | Oper::Greater
                | Oper::LessEq
                | Oper::GreaterEq
                | Oper::LessUns
                | Oper::GreaterUns
        )
    }
}

impl fmt::Display for Oper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
