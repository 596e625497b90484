//! Node identity for out-of-band semantic state.
//!
//! The tree built by the parser is never mutated once constructed: facts
//! discovered by later passes (a resolved [`dimsolve_dims::Unit`], a
//! propagated numeric value, a diagnostic) live in a side table keyed by
//! [`NodeId`] rather than in the node itself. This keeps the tree trivially
//! shareable across passes and makes "what does pass N know about this node"
//! a single hash lookup instead of a field on every variant.

use std::fmt;

/// An opaque, stable identifier for an arena-allocated node.
///
/// Two `NodeId`s compare equal if and only if they were obtained from the
/// same node (the same allocation, not merely an equal value) — this is
/// simply the node's address, reinterpreted as an integer so it can be used
/// as a hash map key without holding a borrow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Computes the identity of a node from a reference into its arena.
    ///
    /// # Example
    ///
    /// ```
    /// use dimsolve_ast::NodeId;
    ///
    /// let x = 5i32;
    /// let y = 5i32;
    /// assert_eq!(NodeId::of(&x), NodeId::of(&x));
    /// assert_ne!(NodeId::of(&x), NodeId::of(&y));
    /// ```
    pub fn of<T>(node: &T) -> Self {
        NodeId(node as *const T as usize)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:x}", self.0)
    }
}
