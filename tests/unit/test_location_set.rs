//! LocationSet tests.

use decomp_exp::alias::{pentium, AliasPolicy, LocKey};
use decomp_exp::core::oper::Oper;
use decomp_exp::expr::Exp;
use decomp_exp::location::Location;
use decomp_exp::location_set::LocationSet;
use decomp_exp::proc::ProcId;
use decomp_exp::refexp::{Def, RefExp, StmtId};
use std::rc::Rc;

fn r5_at(n: u32) -> decomp_exp::expr::SharedExp {
    Exp::subscript(Location::reg_of(5), Def::Stmt(StmtId::new(n)))
}

#[test]
fn test_distinct_definitions() {
    let mut set = LocationSet::new();
    set.insert(r5_at(3));
    set.insert(r5_at(7));
    assert_eq!(set.len(), 2);
}

#[test]
fn test_duplicate_definition() {
    let mut set = LocationSet::new();
    set.insert(r5_at(3));
    set.insert(r5_at(3));
    assert_eq!(set.len(), 1);
}

#[test]
fn test_remove_and_contains() {
    let mut set: LocationSet = [Location::reg_of(1), r5_at(3)].into_iter().collect();
    assert!(set.contains(&r5_at(3)));
    assert!(!set.contains(&r5_at(4)));
    assert!(set.remove(&Location::reg_of(1)));
    assert!(!set.remove(&Location::reg_of(1)));
    assert_eq!(set.len(), 1);
    set.clear();
    assert!(set.is_empty());
}

#[test]
fn test_find_ns_ignores_subscripts() {
    let set: LocationSet = [r5_at(3), Location::reg_of(6)].into_iter().collect();
    assert_eq!(set.find_ns(&Location::reg_of(5)), Some(&r5_at(3)));
    assert_eq!(set.find_ns(&r5_at(9)), Some(&r5_at(3)));
    assert_eq!(set.find_ns(&Location::reg_of(7)), None);
    assert_eq!(set.find_ns(&Exp::int(5)), None);
}

#[test]
fn test_find_different_ref() {
    let set: LocationSet = [r5_at(3)].into_iter().collect();
    let same = RefExp::new(Location::reg_of(5), Def::Stmt(StmtId::new(3)));
    let other = RefExp::new(Location::reg_of(5), Def::Stmt(StmtId::new(8)));
    assert_eq!(set.find_different_ref(&same), None);
    assert_eq!(set.find_different_ref(&other), Some(&r5_at(3)));
}

#[test]
fn test_implicit_and_subscripting() {
    let set: LocationSet = [Location::reg_of(24), r5_at(2)].into_iter().collect();
    let implicit = set.add_subscript(Def::Implicit);
    assert!(implicit.contains_implicit(&Location::reg_of(24)));
    assert!(!implicit.contains_implicit(&Location::reg_of(5)));
    assert_eq!(implicit.to_string(), "{r24{-}, r5{2}}");
}

#[test]
fn test_union_and_difference() {
    let mut a: LocationSet = [Location::reg_of(1), Location::reg_of(2)].into_iter().collect();
    let b: LocationSet = [Location::reg_of(2), Location::reg_of(3)].into_iter().collect();
    assert_eq!(a.difference(&b).sorted_strings(), vec!["r1"]);
    a.union_with(&b);
    assert_eq!(a.len(), 3);
}

#[test]
fn test_locations_for_proc() {
    let p = ProcId::new(0);
    let q = ProcId::new(1);
    let set: LocationSet = [
        Location::local("a", p),
        Exp::subscript(Location::local("b", p), Def::Implicit),
        Location::local("c", q),
        Location::reg_of(24),
    ]
    .into_iter()
    .collect();
    assert_eq!(set.locations_for(p).count(), 2);
    assert_eq!(set.locations_for(q).count(), 1);
}

#[test]
fn test_pentium_aliases() {
    let mut set = LocationSet::with_policy(Rc::new(AliasPolicy::pentium()));
    set.insert(Location::reg_of(pentium::ECX));
    assert_eq!(set.sorted_strings(), vec!["r1", "r13", "r25", "r9"]);

    // 16-bit registers without 8-bit halves stop at one level
    let mut set = LocationSet::with_policy(Rc::new(AliasPolicy::pentium()));
    set.insert(Location::reg_of(pentium::ESI));
    assert_eq!(set.sorted_strings(), vec!["r30", "r6"]);
}

#[test]
fn test_no_policy_no_aliases() {
    let mut set = LocationSet::new();
    set.insert(Location::reg_of(pentium::EAX));
    assert_eq!(set.len(), 1);
}

#[test]
fn test_cyclic_policy_terminates() {
    let mut policy = AliasPolicy::named("cycle");
    policy.add_alias(LocKey::reg(1), LocKey::reg(2));
    policy.add_alias(LocKey::reg(2), LocKey::reg(1));
    let mut set = LocationSet::with_policy(Rc::new(policy));
    set.insert(Location::reg_of(1));
    assert_eq!(set.len(), 2);
}

#[test]
fn test_named_alias() {
    let mut policy = AliasPolicy::named("toy");
    let flags = LocKey::of(Location::global("flags").as_location().unwrap()).unwrap();
    let zf = LocKey::of(Location::global("zf").as_location().unwrap()).unwrap();
    assert_eq!(flags.kind, Oper::Global);
    policy.add_alias(flags, zf);
    let mut set = LocationSet::with_policy(Rc::new(policy));
    set.insert(Location::global("flags"));
    assert!(set.contains(&Location::global("zf")));
}
