//! Operator catalog and constant arithmetic tests.

use decomp_exp::core::address::Address;
use decomp_exp::core::arithmetic::{eval_binary, eval_unary};
use decomp_exp::core::oper::Oper;

#[test]
fn test_catalog_is_complete() {
    assert_eq!(Oper::ALL.len(), 40);
    for op in Oper::ALL {
        assert!(op.arity() <= 3, "{op:?}");
    }
}

#[test]
fn test_arity() {
    assert_eq!(Oper::IntConst.arity(), 0);
    assert_eq!(Oper::MemOf.arity(), 1);
    assert_eq!(Oper::Subscript.arity(), 1);
    assert_eq!(Oper::Plus.arity(), 2);
    assert_eq!(Oper::MemberAccess.arity(), 2);
    assert_eq!(Oper::Tern.arity(), 3);
}

#[test]
fn test_classification() {
    assert!(Oper::RegOf.is_location());
    assert!(!Oper::AddrOf.is_location());
    assert!(Oper::StrConst.is_const());
    assert!(Oper::Plus.is_commutative());
    assert!(!Oper::Minus.is_commutative());
    assert!(Oper::LessUns.is_comparison());
}

#[test]
fn test_display_uses_symbol() {
    assert_eq!(Oper::Plus.to_string(), "+");
    assert_eq!(Oper::ShiftRA.to_string(), ">>A");
}

#[test]
fn test_eval_binary() {
    assert_eq!(eval_binary(Oper::Plus, 2, 3), Some(5));
    assert_eq!(eval_binary(Oper::Plus, i64::MAX, 1), Some(i64::MIN));
    assert_eq!(eval_binary(Oper::Div, 1, 0), None);
    assert_eq!(eval_binary(Oper::ShiftL, 1, 64), None);
    assert_eq!(eval_binary(Oper::Less, -1, 0), Some(1));
    assert_eq!(eval_binary(Oper::LessUns, -1, 0), Some(0));
    assert_eq!(eval_binary(Oper::MemberAccess, 1, 2), None);
}

#[test]
fn test_eval_unary() {
    assert_eq!(eval_unary(Oper::Neg, 5), Some(-5));
    assert_eq!(eval_unary(Oper::BitNot, 0), Some(-1));
    assert_eq!(eval_unary(Oper::LNot, 7), Some(0));
    assert_eq!(eval_unary(Oper::MemOf, 7), None);
}

#[test]
fn test_address() {
    assert!(!Address::INVALID.is_valid());
    assert_eq!(Address::new(0x1000).offset(-0x10), Address::new(0xff0));
    assert_eq!(Address::INVALID.offset(4), Address::INVALID);
    assert_eq!(Address::from(0x401000).to_string(), "0x00401000");
}
