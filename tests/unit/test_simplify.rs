//! Simplifier tests.

use decomp_exp::config::SimplifierConfig;
use decomp_exp::core::oper::Oper;
use decomp_exp::expr::{Exp, SharedExp};
use decomp_exp::location::Location;
use decomp_exp::refexp::{Def, StmtId};
use decomp_exp::simplify::Simplifier;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn fixpoint(e: &SharedExp) -> SharedExp {
    Simplifier::standard().simplify_to_fixpoint(e)
}

#[test]
fn test_mem_of_addr_of_member() {
    let field = Exp::member(Location::reg_of(4), "field");
    let e = Location::mem_of(Exp::addr_of(field.clone()));
    let mut changed = false;
    let out = Simplifier::standard().simplify(&e, &mut changed);
    assert!(changed);
    assert_eq!(out, field);
    assert_eq!(out.to_string(), "r4.field");
}

#[test]
fn test_mem_of_addr_of_any_operand() {
    for x in [
        Exp::int(7),
        Location::reg_of(24),
        Exp::plus(Location::reg_of(28), Exp::int(8)),
        Exp::subscript(Location::reg_of(28), Def::Implicit),
    ] {
        let e = Location::mem_of(Exp::addr_of(x.clone()));
        assert_eq!(fixpoint(&e), fixpoint(&x), "{e}");
    }
}

#[test]
fn test_idempotent_at_fixpoint() {
    let e = Exp::binary(
        Oper::BitAnd,
        Exp::plus(Exp::int(0), Exp::minus(Location::reg_of(24), Location::reg_of(24))),
        Exp::plus(Location::reg_of(25), Exp::int(3)),
    );
    let s = Simplifier::standard();
    let fixed = s.simplify_to_fixpoint(&e);
    let mut changed = false;
    let again = s.simplify(&fixed, &mut changed);
    assert!(!changed);
    assert_eq!(again, fixed);
    assert_eq!(fixed, Exp::int(0));
}

#[test]
fn test_unchanged_tree_is_shared() {
    let e = Exp::plus(Location::reg_of(24), Location::reg_of(25));
    let mut changed = false;
    let out = Simplifier::standard().simplify(&e, &mut changed);
    assert!(!changed);
    assert!(std::rc::Rc::ptr_eq(&out, &e));
}

#[test]
fn test_subscript_operand_simplified() {
    let loc = Location::mem_of(Exp::plus(Location::reg_of(28), Exp::int(0)));
    let e = Exp::subscript(loc, Def::Stmt(StmtId::new(3)));
    assert_eq!(fixpoint(&e).to_string(), "m[r28]{3}");
}

#[test]
fn test_ternary_and_logic() {
    let e = Exp::ternary(Oper::Tern, Exp::int(1), Location::reg_of(1), Location::reg_of(2));
    assert_eq!(fixpoint(&e), Location::reg_of(1));
    let same = Exp::ternary(Oper::Tern, Location::reg_of(9), Exp::int(4), Exp::int(4));
    assert_eq!(fixpoint(&same), Exp::int(4));
    let neg = Exp::unary(Oper::Neg, Exp::unary(Oper::Neg, Location::reg_of(3)));
    assert_eq!(fixpoint(&neg), Location::reg_of(3));
}

#[test]
fn test_comparison_folds() {
    let e = Exp::binary(Oper::Equals, Location::reg_of(24), Location::reg_of(24));
    assert_eq!(fixpoint(&e), Exp::int(1));
    let e = Exp::binary(Oper::LessUns, Exp::int(-1), Exp::int(1));
    assert_eq!(fixpoint(&e), Exp::int(0));
}

fn swap_operands(e: &SharedExp) -> Option<SharedExp> {
    match e.as_ref() {
        Exp::Binary { op, lhs, rhs } => Some(Exp::binary(*op, rhs.clone(), lhs.clone())),
        _ => None,
    }
}

#[test]
fn test_custom_rule_table() {
    let mut s = Simplifier::empty(SimplifierConfig::default());
    assert_eq!(s.rule_count(Oper::BitOr), 0);
    s.add_rule(Oper::BitOr, swap_operands);
    assert_eq!(s.rule_count(Oper::BitOr), 1);

    let e = Exp::binary(Oper::BitOr, Location::reg_of(1), Location::reg_of(2));
    let mut changed = false;
    assert_eq!(s.simplify(&e, &mut changed).to_string(), "r2 | r1");
    assert!(changed);

    // other operators are untouched
    let p = Exp::plus(Exp::int(1), Exp::int(2));
    let mut changed = false;
    assert_eq!(s.simplify(&p, &mut changed), p);
    assert!(!changed);
}

#[test]
fn test_fixpoint_gives_up_after_cap() {
    init_logger();
    let config = SimplifierConfig {
        max_iterations: 3,
        ..SimplifierConfig::default()
    };
    let mut s = Simplifier::empty(config);
    s.add_rule(Oper::BitOr, swap_operands);
    let e = Exp::binary(Oper::BitOr, Location::reg_of(1), Location::reg_of(2));
    // three swaps
    assert_eq!(s.simplify_to_fixpoint(&e).to_string(), "r2 | r1");
}
