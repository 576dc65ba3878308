//! Expression simplification.
//!
//! The simplifier is a table of local rewrite rules keyed by operator.  A
//! single [`Simplifier::simplify`] call walks the tree bottom-up and gives
//! each node at most one replacement: the first rule registered for the
//! node's operator that matches.  Reaching a fixpoint means calling it
//! again until nothing changes; [`Simplifier::simplify_to_fixpoint`] does
//! that for callers that just want the result.
//!
//! Every standard rule either shrinks the tree or moves a constant into a
//! canonical position that no other rule moves back, so iteration
//! terminates.  Custom rules must keep that property.

use crate::config::SimplifierConfig;
use crate::core::arithmetic as arith;
use crate::core::oper::Oper;
use crate::expr::{Exp, SharedExp};
use std::collections::HashMap;
use std::fmt;

/// A rewrite rule: the replacement for `exp`, or `None` if it does not apply.
pub type Rule = fn(&SharedExp) -> Option<SharedExp>;

/// Rule table plus settings.
#[derive(Clone)]
pub struct Simplifier {
    rules: HashMap<Oper, Vec<Rule>>,
    config: SimplifierConfig,
}

impl fmt::Debug for Simplifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rules: usize = self.rules.values().map(Vec::len).sum();
        f.debug_struct("Simplifier")
            .field("rules", &rules)
            .field("config", &self.config)
            .finish()
    }
}

impl Default for Simplifier {
    fn default() -> Self {
        Self::standard()
    }
}

impl Simplifier {
    /// A simplifier with no rules.
    pub fn empty(config: SimplifierConfig) -> Self {
        Simplifier {
            rules: HashMap::new(),
            config,
        }
    }

    /// The standard rule catalog with default settings.
    pub fn standard() -> Self {
        Self::with_config(SimplifierConfig::default())
    }

    /// The standard rule catalog.
    pub fn with_config(config: SimplifierConfig) -> Self {
        let mut s = Self::empty(config);

        s.add_rule(Oper::MemOf, mem_of_addr_of);
        s.add_rule(Oper::AddrOf, addr_of_mem_of);

        for op in [Oper::Neg, Oper::BitNot, Oper::LNot] {
            s.add_rule(op, fold_unary);
            s.add_rule(op, double_unary);
        }

        for op in Oper::ALL.into_iter().filter(|op| op.arity() == 2) {
            s.add_rule(op, fold_binary);
        }
        for op in Oper::ALL.into_iter().filter(|op| op.is_commutative()) {
            s.add_rule(op, constant_to_right);
        }
        for op in [Oper::Plus, Oper::Minus] {
            s.add_rule(op, combine_constants);
            s.add_rule(op, negative_constant);
        }
        for op in [
            Oper::Plus,
            Oper::Minus,
            Oper::Mult,
            Oper::Div,
            Oper::BitOr,
            Oper::BitXor,
            Oper::ShiftL,
            Oper::ShiftR,
            Oper::ShiftRA,
        ] {
            s.add_rule(op, right_identity);
        }
        for op in [Oper::Mult, Oper::BitAnd, Oper::And] {
            s.add_rule(op, annihilate);
        }
        for op in [
            Oper::Minus,
            Oper::BitXor,
            Oper::BitAnd,
            Oper::BitOr,
            Oper::Equals,
            Oper::NotEqual,
        ] {
            s.add_rule(op, same_operands);
        }

        s.add_rule(Oper::Tern, fold_ternary);
        s
    }

    /// Append `rule` to the rules tried for `oper`.  Rules for other
    /// operators are unaffected.
    pub fn add_rule(&mut self, oper: Oper, rule: Rule) {
        self.rules.entry(oper).or_default().push(rule);
    }

    pub fn rule_count(&self, oper: Oper) -> usize {
        self.rules.get(&oper).map_or(0, Vec::len)
    }

    pub fn config(&self) -> &SimplifierConfig {
        &self.config
    }

    /// One bottom-up pass.  Sets `changed` if any node was replaced; never
    /// clears it.
    ///
    /// The location inside a subscript is never replaced, only its operand,
    /// so `m[a[x]]{3}` stays a subscripted location.
    pub fn simplify(&self, exp: &SharedExp, changed: &mut bool) -> SharedExp {
        if let Exp::Ref(r) = exp.as_ref() {
            let loc = r.sub_exp();
            let operand = self.simplify(loc.as_location().map_or(loc, |l| l.sub_exp()), changed);
            let loc = Exp::with_sub_exps(loc, vec![operand]);
            return Exp::with_sub_exps(exp, vec![loc]);
        }

        let children = exp
            .sub_exps()
            .into_iter()
            .map(|c| self.simplify(c, changed))
            .collect();
        let node = Exp::with_sub_exps(exp, children);

        match self.apply(&node) {
            Some(replacement) => {
                if self.config.trace_rewrites {
                    log::debug!("simplify: {node} => {replacement}");
                } else {
                    log::trace!("simplify: {node} => {replacement}");
                }
                *changed = true;
                replacement
            }
            None => node,
        }
    }

    fn apply(&self, node: &SharedExp) -> Option<SharedExp> {
        self.rules
            .get(&node.oper())?
            .iter()
            .find_map(|rule| rule(node))
    }

    /// Repeat [`simplify`](Self::simplify) until a pass changes nothing.
    ///
    /// Stops after `max_iterations` passes and returns what it has, with a
    /// warning: a rule set that keeps rewriting is a bug in the rules.
    pub fn simplify_to_fixpoint(&self, exp: &SharedExp) -> SharedExp {
        let mut current = exp.clone();
        for _ in 0..self.config.max_iterations {
            let mut changed = false;
            let next = self.simplify(&current, &mut changed);
            if !changed {
                return next;
            }
            current = next;
        }
        log::warn!(
            "no fixpoint after {} simplify passes: {current}",
            self.config.max_iterations
        );
        current
    }
}

// ===========================================================================
// Rules
// ===========================================================================

fn binary_parts(e: &Exp) -> Option<(Oper, &SharedExp, &SharedExp)> {
    match e {
        Exp::Binary { op, lhs, rhs } => Some((*op, lhs, rhs)),
        _ => None,
    }
}

// -- Memory ------------------------------------------------------------------

/// `m[a[X]] => X`.  Also covers `m[a[X.f]] => X.f`: dereferencing the
/// synthesized address of a member access yields the access itself.
fn mem_of_addr_of(e: &SharedExp) -> Option<SharedExp> {
    let loc = e.as_location()?;
    match loc.sub_exp().as_ref() {
        Exp::Unary {
            op: Oper::AddrOf,
            sub,
        } => Some(sub.clone()),
        _ => None,
    }
}

/// `a[m[X]] => X`
fn addr_of_mem_of(e: &SharedExp) -> Option<SharedExp> {
    let Exp::Unary { sub, .. } = e.as_ref() else {
        return None;
    };
    match sub.as_location() {
        Some(loc) if loc.oper() == Oper::MemOf => Some(loc.sub_exp().clone()),
        _ => None,
    }
}

// -- Unary -------------------------------------------------------------------

fn fold_unary(e: &SharedExp) -> Option<SharedExp> {
    let Exp::Unary { op, sub } = e.as_ref() else {
        return None;
    };
    arith::eval_unary(*op, sub.int_value()?).map(Exp::int)
}

/// `-(-X)`, `~~X`, `!!X` => `X`
fn double_unary(e: &SharedExp) -> Option<SharedExp> {
    let Exp::Unary { op, sub } = e.as_ref() else {
        return None;
    };
    match sub.as_ref() {
        Exp::Unary { op: inner, sub: x } if inner == op => Some(x.clone()),
        _ => None,
    }
}

// -- Binary ------------------------------------------------------------------

fn fold_binary(e: &SharedExp) -> Option<SharedExp> {
    let (op, lhs, rhs) = binary_parts(e)?;
    arith::eval_binary(op, lhs.int_value()?, rhs.int_value()?).map(Exp::int)
}

/// `K op X => X op K` for commutative `op`.
fn constant_to_right(e: &SharedExp) -> Option<SharedExp> {
    let (op, lhs, rhs) = binary_parts(e)?;
    if lhs.is_int_const() && !rhs.is_int_const() {
        Some(Exp::binary(op, rhs.clone(), lhs.clone()))
    } else {
        None
    }
}

/// Merge two constant displacements:
/// `(X + K1) + K2`, `(X - K1) + K2`, `(X + K1) - K2`, `(X - K1) - K2`.
fn combine_constants(e: &SharedExp) -> Option<SharedExp> {
    let (outer, inner, k2) = binary_parts(e)?;
    let k2 = k2.int_value()?;
    let (inner_op, x, k1) = binary_parts(inner)?;
    let k1 = k1.int_value()?;
    let k = match (inner_op, outer) {
        (Oper::Plus, Oper::Plus) => k1.wrapping_add(k2),
        (Oper::Minus, Oper::Plus) => k2.wrapping_sub(k1),
        (Oper::Plus, Oper::Minus) => k1.wrapping_sub(k2),
        (Oper::Minus, Oper::Minus) => k1.wrapping_add(k2).wrapping_neg(),
        _ => return None,
    };
    Some(Exp::plus(x.clone(), Exp::int(k)))
}

/// `X + -K => X - K` and `X - -K => X + K`.
fn negative_constant(e: &SharedExp) -> Option<SharedExp> {
    let (op, lhs, rhs) = binary_parts(e)?;
    let k = rhs.int_value()?;
    if k >= 0 {
        return None;
    }
    let flipped = if op == Oper::Plus { Oper::Minus } else { Oper::Plus };
    // i64::MIN has no positive counterpart.
    Some(Exp::binary(flipped, lhs.clone(), Exp::int(k.checked_neg()?)))
}

/// `X + 0`, `X * 1`, `X << 0`, ... => `X`
fn right_identity(e: &SharedExp) -> Option<SharedExp> {
    let (op, lhs, rhs) = binary_parts(e)?;
    let identity = match op {
        Oper::Mult | Oper::Div => 1,
        _ => 0,
    };
    (rhs.int_value()? == identity).then(|| lhs.clone())
}

/// `X * 0`, `X & 0`, `X and 0` => `0`
fn annihilate(e: &SharedExp) -> Option<SharedExp> {
    let (_, lhs, rhs) = binary_parts(e)?;
    if lhs.int_value() == Some(0) || rhs.int_value() == Some(0) {
        Some(Exp::int(0))
    } else {
        None
    }
}

/// Operators applied to two equal operands.
fn same_operands(e: &SharedExp) -> Option<SharedExp> {
    let (op, lhs, rhs) = binary_parts(e)?;
    if lhs != rhs {
        return None;
    }
    match op {
        Oper::Minus | Oper::BitXor | Oper::NotEqual => Some(Exp::int(0)),
        Oper::Equals => Some(Exp::int(1)),
        Oper::BitAnd | Oper::BitOr => Some(lhs.clone()),
        _ => None,
    }
}

// -- Ternary -----------------------------------------------------------------

/// `K ? A : B` picks a branch; `C ? A : A => A`.
fn fold_ternary(e: &SharedExp) -> Option<SharedExp> {
    let Exp::Ternary { a, b, c, .. } = e.as_ref() else {
        return None;
    };
    if let Some(cond) = a.int_value() {
        return Some(if cond != 0 { b.clone() } else { c.clone() });
    }
    (b == c).then(|| b.clone())
}
