//! Expression tree tests: construction, equality, sharing and copying.

use decomp_exp::core::oper::Oper;
use decomp_exp::errors::ExprError;
use decomp_exp::expr::{Exp, SharedExp};
use decomp_exp::location::Location;
use decomp_exp::refexp::{Def, StmtId};
use std::collections::HashSet;
use std::rc::Rc;

fn r4_plus_8() -> SharedExp {
    Exp::plus(Location::reg_of(4), Exp::int(8))
}

#[test]
fn test_clone_is_independent() {
    let original = r4_plus_8();
    let mut copy = original.deep_clone();
    Exp::set_sub_exp(&mut copy, 0, Location::reg_of(5));
    assert_eq!(original.sub_exp(0), Some(&Location::reg_of(4)));
    assert_eq!(copy.to_string(), "r5 + 8");
}

#[test]
fn test_set_sub_exp_copies_shared_node() {
    let original = r4_plus_8();
    let mut alias = original.clone();
    Exp::set_sub_exp(&mut alias, 1, Exp::int(12));
    assert_eq!(original.to_string(), "r4 + 8");
    assert_eq!(alias.to_string(), "r4 + 12");
    // the untouched operand is still shared
    assert!(Rc::ptr_eq(
        original.sub_exp(0).unwrap(),
        alias.sub_exp(0).unwrap()
    ));
}

#[test]
fn test_deep_clone_shares_nothing() {
    let original = r4_plus_8();
    let copy = original.deep_clone();
    assert_eq!(original, copy);
    assert!(!Rc::ptr_eq(&original, &copy));
    assert!(!Rc::ptr_eq(
        original.sub_exp(0).unwrap(),
        copy.sub_exp(0).unwrap()
    ));
}

#[test]
fn test_structural_equality_and_hash() {
    let a = r4_plus_8();
    let b = r4_plus_8();
    assert_eq!(a, b);
    let set: HashSet<SharedExp> = [a, b].into_iter().collect();
    assert_eq!(set.len(), 1);
    assert_ne!(r4_plus_8(), Exp::plus(Location::reg_of(4), Exp::int(9)));
}

#[test]
fn test_with_sub_exps_keeps_identity() {
    let e = r4_plus_8();
    let children = e.sub_exps().into_iter().cloned().collect();
    assert!(Rc::ptr_eq(&Exp::with_sub_exps(&e, children), &e));
}

#[test]
fn test_ref_collapses_when_location_replaced() {
    let r = Exp::subscript(Location::reg_of(24), Def::Stmt(StmtId::new(1)));
    let out = Exp::with_sub_exps(&r, vec![Exp::int(3)]);
    assert_eq!(out, Exp::int(3));
}

#[test]
fn test_build_checks_arity() {
    assert_eq!(
        Exp::build(Oper::Plus, vec![Exp::int(1)]),
        Err(ExprError::ArityMismatch {
            oper: Oper::Plus,
            expected: 2,
            found: 1
        })
    );
    assert_eq!(
        Exp::build(Oper::IntConst, vec![]),
        Err(ExprError::MissingLiteral(Oper::IntConst))
    );
    assert_eq!(
        Exp::build(Oper::Subscript, vec![Location::reg_of(1)]),
        Err(ExprError::MissingDefinition)
    );
    let m = Exp::build(Oper::MemOf, vec![Location::reg_of(28)]).unwrap();
    assert!(m.is_location());
}

#[test]
fn test_accessors() {
    let e = Exp::ternary(Oper::Tern, Location::reg_of(1), Exp::int(2), Exp::int(3));
    assert_eq!(e.oper(), Oper::Tern);
    assert_eq!(e.arity(), 3);
    assert_eq!(e.sub_exp(3), None);
    assert_eq!(e.node_count(), 5);
    assert!(e.contains(&Exp::int(3)));
    assert_eq!(e.to_string(), "r1 ? 2 : 3");
}

#[test]
fn test_json_view() {
    let j = Exp::int(7).to_json();
    assert!(j.to_string().contains('7'));
    let m = Location::mem_of(Location::reg_of(28)).to_json();
    assert!(m.to_string().contains("mem_of"));
}

#[test]
#[should_panic(expected = "cannot subscript")]
fn test_subscript_requires_location() {
    Exp::subscript(Exp::int(1), Def::Implicit);
}
