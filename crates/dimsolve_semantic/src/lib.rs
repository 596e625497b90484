//! # dimsolve-semantic
//!
//! The side table of facts later passes attach to the immutable tree from
//! `dimsolve-ast`: resolved dimensions, propagated values, and the unit
//! registry built from `unit` declarations.
//!
//! The table owns every [`Exp`] record; nothing else does, so passes borrow
//! records mutably through [`SemanticTable`] rather than threading owned
//! state through the tree itself.

pub mod table;

pub use table::{Exp, Origin, SemanticTable};
