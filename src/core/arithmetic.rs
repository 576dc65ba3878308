//! Concrete integer arithmetic used for constant folding.
//!
//! Values are 64-bit two's complement.  Operations wrap like the machine
//! does; anything without a defined result (division by zero, out of range
//! shift counts) returns `None` so the folder leaves the node alone.

use crate::core::oper::Oper;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn from_bool(b: bool) -> i64 {
    b as i64
}

fn shift_amount(b: i64) -> Option<u32> {
    if (0..64).contains(&b) {
        Some(b as u32)
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Evaluate `a op b` for a binary operator over integer constants.
pub fn eval_binary(op: Oper, a: i64, b: i64) -> Option<i64> {
    let v = match op {
        Oper::Plus => a.wrapping_add(b),
        Oper::Minus => a.wrapping_sub(b),
        Oper::Mult => a.wrapping_mul(b),
        Oper::Div => {
            if b == 0 {
                return None;
            }
            a.wrapping_div(b)
        }
        Oper::Mod => {
            if b == 0 {
                return None;
            }
            a.wrapping_rem(b)
        }
        Oper::BitAnd => a & b,
        Oper::BitOr => a | b,
        Oper::BitXor => a ^ b,
        Oper::ShiftL => a.wrapping_shl(shift_amount(b)?),
        Oper::ShiftR => ((a as u64) >> shift_amount(b)?) as i64,
        Oper::ShiftRA => a >> shift_amount(b)?,
        Oper::And => from_bool(a != 0 && b != 0),
        Oper::Or => from_bool(a != 0 || b != 0),
        Oper::Equals => from_bool(a == b),
        Oper::NotEqual => from_bool(a != b),
        Oper::Less => from_bool(a < b),
        Oper::Greater => from_bool(a > b),
        Oper::LessEq => from_bool(a <= b),
        Oper::GreaterEq => from_bool(a >= b),
        Oper::LessUns => from_bool((a as u64) < (b as u64)),
        Oper::GreaterUns => from_bool((a as u64) > (b as u64)),
        _ => return None,
    };
    Some(v)
}

/// Evaluate a unary operator over an integer constant.
pub fn eval_unary(op: Oper, a: i64) -> Option<i64> {
    match op {
        Oper::Neg => Some(a.wrapping_neg()),
        Oper::BitNot => Some(!a),
        Oper::LNot => Some(from_bool(a == 0)),
        _ => None,
    }
}
