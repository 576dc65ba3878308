//! Symbolic expression nodes.
//!
//! An expression is a tree of immutable, reference-counted [`Exp`] nodes.
//! Subtrees may be shared by several parents; nothing ever mutates a node
//! that another owner can see.  Mutation goes through [`Exp::set_sub_exp`],
//! which copies a shared node before touching it (`Rc::make_mut`), or
//! through the rebuilding helpers used by the simplifier and modifiers.
//!
//! Equality and hashing are structural: two trees built independently from
//! the same operators and leaves compare equal whether or not they share
//! any nodes.

use crate::core::address::Address;
use crate::core::oper::Oper;
use crate::errors::ExprError;
use crate::location::Location;
use crate::refexp::{Def, RefExp};
use serde::Serialize;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// Shared handle to an expression node.
pub type SharedExp = Rc<Exp>;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Literal value carried by a constant node.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Const {
    Int(i64),
    Addr(Address),
    Str(String),
    Flt(f64),
}

impl Const {
    pub fn oper(&self) -> Oper {
        match self {
            Const::Int(_) => Oper::IntConst,
            Const::Addr(_) => Oper::AddrConst,
            Const::Str(_) => Oper::StrConst,
            Const::Flt(_) => Oper::FltConst,
        }
    }
}

// Floats compare by bit pattern so that constants stay `Eq + Hash`.
impl PartialEq for Const {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Const::Int(a), Const::Int(b)) => a == b,
            (Const::Addr(a), Const::Addr(b)) => a == b,
            (Const::Str(a), Const::Str(b)) => a == b,
            (Const::Flt(a), Const::Flt(b)) => a.to_bits() == b.to_bits(),
            _ => false,
        }
    }
}

impl Eq for Const {}

impl Hash for Const {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Const::Int(v) => v.hash(state),
            Const::Addr(a) => a.hash(state),
            Const::Str(s) => s.hash(state),
            Const::Flt(v) => v.to_bits().hash(state),
        }
    }
}

impl fmt::Display for Const {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Const::Int(v) => {
                if v.unsigned_abs() <= 9999 {
                    write!(f, "{v}")
                } else if *v < 0 {
                    write!(f, "-0x{:x}", v.unsigned_abs())
                } else {
                    write!(f, "0x{v:x}")
                }
            }
            Const::Addr(a) => write!(f, "{a}"),
            Const::Str(s) => write!(f, "\"{s}\""),
            Const::Flt(v) => write!(f, "{v:?}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Core expression type
// ---------------------------------------------------------------------------

/// An expression node.
///
/// Build nodes with the constructors ([`Exp::unary`], [`Exp::build`],
/// [`Location::reg_of`], ...) rather than the variants.  Location
/// operators only ever appear in `Location`; a `Unary` carrying one is
/// malformed and compares unequal to the real location.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Exp {
    Const(Const),
    Unary {
        op: Oper,
        sub: SharedExp,
    },
    Binary {
        op: Oper,
        lhs: SharedExp,
        rhs: SharedExp,
    },
    Ternary {
        op: Oper,
        a: SharedExp,
        b: SharedExp,
        c: SharedExp,
    },
    /// Storage location: register, memory cell, local, global, parameter or temporary.
    Location(Location),
    /// SSA-subscripted location.
    Ref(RefExp),
}

impl Exp {
    // -- Constants ---------------------------------------------------------

    pub fn int(v: i64) -> SharedExp {
        Rc::new(Exp::Const(Const::Int(v)))
    }

    pub fn addr(a: Address) -> SharedExp {
        Rc::new(Exp::Const(Const::Addr(a)))
    }

    pub fn str(s: &str) -> SharedExp {
        Rc::new(Exp::Const(Const::Str(s.to_string())))
    }

    pub fn flt(v: f64) -> SharedExp {
        Rc::new(Exp::Const(Const::Flt(v)))
    }

    // -- Operators ---------------------------------------------------------

    /// Build a one-operand node.  Location operators produce a
    /// [`Location`] with no procedure link (see [`Location::new`]).
    ///
    /// # Panics
    ///
    /// If `op` does not take exactly one operand, or is `Subscript`
    /// (use [`Exp::subscript`]).
    pub fn unary(op: Oper, sub: SharedExp) -> SharedExp {
        assert!(
            op.arity() == 1 && op != Oper::Subscript,
            "{op:?} is not a plain unary operator"
        );
        if op.is_location() {
            return Rc::new(Exp::Location(Location::new(op, sub, None)));
        }
        Rc::new(Exp::Unary { op, sub })
    }

    /// Build a two-operand node.
    ///
    /// # Panics
    ///
    /// If `op` does not take exactly two operands.
    pub fn binary(op: Oper, lhs: SharedExp, rhs: SharedExp) -> SharedExp {
        assert_eq!(op.arity(), 2, "{op:?} is not a binary operator");
        Rc::new(Exp::Binary { op, lhs, rhs })
    }

    /// Build a three-operand node.
    ///
    /// # Panics
    ///
    /// If `op` does not take exactly three operands.
    pub fn ternary(op: Oper, a: SharedExp, b: SharedExp, c: SharedExp) -> SharedExp {
        assert_eq!(op.arity(), 3, "{op:?} is not a ternary operator");
        Rc::new(Exp::Ternary { op, a, b, c })
    }

    pub fn plus(lhs: SharedExp, rhs: SharedExp) -> SharedExp {
        Exp::binary(Oper::Plus, lhs, rhs)
    }

    pub fn minus(lhs: SharedExp, rhs: SharedExp) -> SharedExp {
        Exp::binary(Oper::Minus, lhs, rhs)
    }

    pub fn addr_of(sub: SharedExp) -> SharedExp {
        Exp::unary(Oper::AddrOf, sub)
    }

    /// `base.field`
    pub fn member(base: SharedExp, field: &str) -> SharedExp {
        Exp::binary(Oper::MemberAccess, base, Exp::str(field))
    }

    /// Subscript a location with its definition.
    ///
    /// # Panics
    ///
    /// If `loc` is not a [`Location`].
    pub fn subscript(loc: SharedExp, def: Def) -> SharedExp {
        Rc::new(Exp::Ref(RefExp::new(loc, def)))
    }

    /// Checked IR construction from an operator and its operands.
    ///
    /// Used by builders that receive operators as data.  Constants and
    /// subscripts cannot be built this way because they need more than
    /// child expressions.
    pub fn build(op: Oper, children: Vec<SharedExp>) -> Result<SharedExp, ExprError> {
        if op.is_const() {
            return Err(ExprError::MissingLiteral(op));
        }
        if op == Oper::Subscript {
            return Err(ExprError::MissingDefinition);
        }
        if children.len() != op.arity() {
            return Err(ExprError::ArityMismatch {
                oper: op,
                expected: op.arity(),
                found: children.len(),
            });
        }
        let mut it = children.into_iter();
        let e = match (it.next(), it.next(), it.next()) {
            (Some(a), None, None) => Exp::unary(op, a),
            (Some(a), Some(b), None) => Exp::binary(op, a, b),
            (Some(a), Some(b), Some(c)) => Exp::ternary(op, a, b, c),
            _ => unreachable!("arity checked above"),
        };
        Ok(e)
    }

    // -- Accessors ---------------------------------------------------------

    pub fn oper(&self) -> Oper {
        match self {
            Exp::Const(c) => c.oper(),
            Exp::Unary { op, .. } | Exp::Binary { op, .. } | Exp::Ternary { op, .. } => *op,
            Exp::Location(loc) => loc.oper(),
            Exp::Ref(_) => Oper::Subscript,
        }
    }

    pub fn arity(&self) -> usize {
        self.oper().arity()
    }

    /// The `i`th operand, left to right.
    pub fn sub_exp(&self, i: usize) -> Option<&SharedExp> {
        match (self, i) {
            (Exp::Unary { sub, .. }, 0) => Some(sub),
            (Exp::Binary { lhs, .. }, 0) => Some(lhs),
            (Exp::Binary { rhs, .. }, 1) => Some(rhs),
            (Exp::Ternary { a, .. }, 0) => Some(a),
            (Exp::Ternary { b, .. }, 1) => Some(b),
            (Exp::Ternary { c, .. }, 2) => Some(c),
            (Exp::Location(loc), 0) => Some(loc.sub_exp()),
            (Exp::Ref(r), 0) => Some(r.sub_exp()),
            _ => None,
        }
    }

    pub fn sub_exps(&self) -> Vec<&SharedExp> {
        (0..self.arity()).filter_map(|i| self.sub_exp(i)).collect()
    }

    pub fn is_location(&self) -> bool {
        matches!(self, Exp::Location(_))
    }

    pub fn is_subscript(&self) -> bool {
        matches!(self, Exp::Ref(_))
    }

    pub fn is_int_const(&self) -> bool {
        matches!(self, Exp::Const(Const::Int(_)))
    }

    pub fn int_value(&self) -> Option<i64> {
        match self {
            Exp::Const(Const::Int(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn str_value(&self) -> Option<&str> {
        match self {
            Exp::Const(Const::Str(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_location(&self) -> Option<&Location> {
        match self {
            Exp::Location(loc) => Some(loc),
            _ => None,
        }
    }

    pub fn as_ref_exp(&self) -> Option<&RefExp> {
        match self {
            Exp::Ref(r) => Some(r),
            _ => None,
        }
    }

    /// The location under any number of subscripts, if there is one.
    pub fn base_location(&self) -> Option<&Location> {
        match self {
            Exp::Location(loc) => Some(loc),
            Exp::Ref(r) => r.sub_exp().base_location(),
            _ => None,
        }
    }

    /// `true` if `target` occurs anywhere in this tree (including the root).
    pub fn contains(&self, target: &Exp) -> bool {
        self == target || self.sub_exps().into_iter().any(|c| c.contains(target))
    }

    /// Number of nodes in the tree.
    pub fn node_count(&self) -> usize {
        1 + self
            .sub_exps()
            .into_iter()
            .map(|c| c.node_count())
            .sum::<usize>()
    }

    // -- Copying and rebuilding --------------------------------------------

    /// Deep copy: every node of the result is freshly allocated, so the copy
    /// shares nothing with `self`.
    pub fn deep_clone(&self) -> SharedExp {
        let children = self
            .sub_exps()
            .into_iter()
            .map(|c| c.deep_clone())
            .collect();
        self.rebuild(children)
    }

    /// Rebuild `this` over new operands, keeping its operator, procedure link
    /// and definition.  Returns `this` itself when every operand is the
    /// identical `Rc`, preserving sharing.
    ///
    /// A subscript whose location was rewritten into something that is no
    /// longer a location collapses to the new operand.
    pub fn with_sub_exps(this: &SharedExp, children: Vec<SharedExp>) -> SharedExp {
        let same = children.len() == this.arity()
            && this
                .sub_exps()
                .into_iter()
                .zip(&children)
                .all(|(old, new)| Rc::ptr_eq(old, new));
        if same {
            return this.clone();
        }
        this.rebuild(children)
    }

    fn rebuild(&self, children: Vec<SharedExp>) -> SharedExp {
        match (self, children.as_slice()) {
            (Exp::Const(_), []) => Rc::new(self.clone()),
            (Exp::Unary { op, .. }, [sub]) => {
                debug_assert!(
                    !op.is_location() && *op != Oper::Subscript,
                    "{op:?} node built outside Location/RefExp"
                );
                Rc::new(Exp::Unary {
                    op: *op,
                    sub: sub.clone(),
                })
            }
            (Exp::Binary { op, .. }, [lhs, rhs]) => Rc::new(Exp::Binary {
                op: *op,
                lhs: lhs.clone(),
                rhs: rhs.clone(),
            }),
            (Exp::Ternary { op, .. }, [a, b, c]) => Rc::new(Exp::Ternary {
                op: *op,
                a: a.clone(),
                b: b.clone(),
                c: c.clone(),
            }),
            (Exp::Location(loc), [sub]) => Rc::new(Exp::Location(Location::new(
                loc.oper(),
                sub.clone(),
                loc.proc(),
            ))),
            (Exp::Ref(r), [sub]) if sub.is_location() => {
                Rc::new(Exp::Ref(RefExp::new(sub.clone(), r.def())))
            }
            (Exp::Ref(_), [sub]) => sub.clone(),
            _ => panic!(
                "{} operands given to {:?}, which takes {}",
                children.len(),
                self.oper(),
                self.arity()
            ),
        }
    }

    /// Replace operand `i` of the node behind `this`.
    ///
    /// If the node is shared with any other owner it is copied first, so no
    /// other owner observes the change.  Only the root node is copied; the
    /// untouched operands stay shared.
    ///
    /// # Panics
    ///
    /// If `i` is out of range, or when replacing the location of a
    /// subscript with something that is not a location.
    pub fn set_sub_exp(this: &mut SharedExp, i: usize, child: SharedExp) {
        let node = Rc::make_mut(this);
        let oper = node.oper();
        match (node, i) {
            (Exp::Unary { sub, .. }, 0) => *sub = child,
            (Exp::Binary { lhs, .. }, 0) => *lhs = child,
            (Exp::Binary { rhs, .. }, 1) => *rhs = child,
            (Exp::Ternary { a, .. }, 0) => *a = child,
            (Exp::Ternary { b, .. }, 1) => *b = child,
            (Exp::Ternary { c, .. }, 2) => *c = child,
            (Exp::Location(loc), 0) => loc.set_sub_exp(child),
            (Exp::Ref(r), 0) => r.set_sub_exp(child),
            _ => panic!("operand {i} out of range for {oper:?}"),
        }
    }

    /// JSON view of the tree for diagnostics.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

fn is_compound(e: &Exp) -> bool {
    matches!(e, Exp::Binary { .. } | Exp::Ternary { .. })
}

/// Write an operand, parenthesised if it is itself an infix expression.
fn fmt_operand(f: &mut fmt::Formatter<'_>, e: &Exp) -> fmt::Result {
    if is_compound(e) {
        write!(f, "({e})")
    } else {
        write!(f, "{e}")
    }
}

/// Names print bare (`local3`), anything else in parentheses.
fn fmt_name(f: &mut fmt::Formatter<'_>, e: &Exp) -> fmt::Result {
    match e.str_value() {
        Some(s) => f.write_str(s),
        None => write!(f, "({e})"),
    }
}

impl fmt::Display for Exp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Exp::Const(c) => write!(f, "{c}"),
            Exp::Unary { op, sub } => match op {
                Oper::AddrOf => write!(f, "a[{sub}]"),
                _ => {
                    f.write_str(op.symbol())?;
                    fmt_operand(f, sub)
                }
            },
            Exp::Binary { op, lhs, rhs } => match op {
                Oper::MemberAccess => {
                    fmt_operand(f, lhs)?;
                    f.write_str(".")?;
                    fmt_name(f, rhs)
                }
                Oper::ArrayIndex => {
                    fmt_operand(f, lhs)?;
                    write!(f, "[{rhs}]")
                }
                Oper::Size => {
                    write!(f, "*{lhs}* ")?;
                    fmt_operand(f, rhs)
                }
                _ => {
                    fmt_operand(f, lhs)?;
                    write!(f, " {} ", op.symbol())?;
                    fmt_operand(f, rhs)
                }
            },
            Exp::Ternary { a, b, c, .. } => {
                fmt_operand(f, a)?;
                f.write_str(" ? ")?;
                fmt_operand(f, b)?;
                f.write_str(" : ")?;
                fmt_operand(f, c)
            }
            Exp::Location(loc) => {
                let sub = loc.sub_exp();
                match loc.oper() {
                    Oper::RegOf => match sub.int_value() {
                        Some(n) => write!(f, "r{n}"),
                        None => write!(f, "r[{sub}]"),
                    },
                    Oper::MemOf => write!(f, "m[{sub}]"),
                    other => match sub.str_value() {
                        Some(name) => f.write_str(name),
                        None => write!(f, "{}({sub})", other.symbol()),
                    },
                }
            }
            Exp::Ref(r) => write!(f, "{}{{{}}}", r.sub_exp(), r.def()),
        }
    }
}
