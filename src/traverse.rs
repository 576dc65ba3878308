//! Traversal contracts.
//!
//! Passes implement [`ExpVisitor`] to walk a tree read-only, or
//! [`ExpModifier`] to rewrite it.  Trees know nothing about passes; the
//! drivers below dispatch by matching on the node in the hooks.
//!
//! Traversals are not reentrant: starting a new traversal over the same
//! tree from inside a hook is not supported.

use crate::errors::ExprError;
use crate::expr::{Exp, SharedExp};
use std::ops::ControlFlow;

// ===========================================================================
// Visitor
// ===========================================================================

/// Read-only traversal callbacks.
///
/// Returning `false` from either hook aborts the whole traversal, not just
/// the current subtree.
pub trait ExpVisitor {
    /// Called before the operands of `exp`.  Clear `visit_children` to skip
    /// them (the walk then continues with the next sibling).
    fn pre_visit(&mut self, exp: &SharedExp, visit_children: &mut bool) -> bool {
        let _ = (exp, visit_children);
        true
    }

    /// Called after the operands of `exp` (or right after `pre_visit` when
    /// they were skipped).
    fn post_visit(&mut self, exp: &SharedExp) -> bool {
        let _ = exp;
        true
    }
}

/// Walk `exp` depth-first, operands left to right.  Returns `false` if
/// the visitor aborted.
pub fn accept<V: ExpVisitor + ?Sized>(exp: &SharedExp, visitor: &mut V) -> bool {
    let mut visit_children = true;
    if !visitor.pre_visit(exp, &mut visit_children) {
        return false;
    }
    if visit_children {
        for child in exp.sub_exps() {
            if !accept(child, visitor) {
                return false;
            }
        }
    }
    visitor.post_visit(exp)
}

/// Like [`accept`], reporting an abort as [`ExprError::TraversalAborted`].
pub fn visit<V: ExpVisitor + ?Sized>(exp: &SharedExp, visitor: &mut V) -> Result<(), ExprError> {
    if accept(exp, visitor) {
        Ok(())
    } else {
        Err(ExprError::TraversalAborted)
    }
}

// ===========================================================================
// Modifier
// ===========================================================================

/// Rewriting traversal callbacks.
///
/// Either hook may return a different node, which replaces the one it was
/// given.  `ControlFlow::Break` aborts the whole traversal.
pub trait ExpModifier {
    /// Called before the operands.  The operands of the *returned* node are
    /// the ones rewritten next.
    fn pre_modify(&mut self, exp: SharedExp, visit_children: &mut bool) -> ControlFlow<(), SharedExp> {
        let _ = visit_children;
        ControlFlow::Continue(exp)
    }

    /// Called after the operands have been rewritten; `exp` already holds
    /// the rewritten operands.
    fn post_modify(&mut self, exp: SharedExp) -> ControlFlow<(), SharedExp> {
        ControlFlow::Continue(exp)
    }
}

/// Rewrite `exp` with `modifier`, returning the replacement tree.
///
/// Operands are rewritten strictly before the node's `post_modify`.  Nodes
/// are rebuilt only when an operand actually changed, so untouched
/// subtrees stay shared with the input.
pub fn accept_modifier<M: ExpModifier + ?Sized>(
    exp: SharedExp,
    modifier: &mut M,
) -> ControlFlow<(), SharedExp> {
    let mut visit_children = true;
    let node = modifier.pre_modify(exp, &mut visit_children)?;

    let node = if visit_children {
        let mut children = Vec::with_capacity(node.arity());
        for i in 0..node.arity() {
            // Read each operand from the node returned by pre_modify, never
            // from the node that was passed in.
            let child = match node.sub_exp(i) {
                Some(c) => c.clone(),
                None => break,
            };
            children.push(accept_modifier(child, modifier)?);
        }
        Exp::with_sub_exps(&node, children)
    } else {
        node
    };

    modifier.post_modify(node)
}

/// Like [`accept_modifier`], reporting an abort as
/// [`ExprError::TraversalAborted`].
pub fn modify<M: ExpModifier + ?Sized>(exp: SharedExp, modifier: &mut M) -> Result<SharedExp, ExprError> {
    match accept_modifier(exp, modifier) {
        ControlFlow::Continue(e) => Ok(e),
        ControlFlow::Break(()) => Err(ExprError::TraversalAborted),
    }
}
