//! # dimsolve-ast
//!
//! The expression tree produced by the parser (`dimsolve-parse`) and
//! consumed by every later compilation pass.
//!
//! All nodes are arena-allocated (`dimsolve_base::Arena`) so that the
//! semantic table, built in a later pass, can hold plain references into the
//! tree keyed by node identity without `Rc`/`RefCell`. The tree itself is
//! never mutated after parsing; see [`node_id`] for how mutable semantic
//! state is attached out of band.
//!
//! The node set is a single closed sum type, [`Expr`], matched exhaustively
//! everywhere it's consumed — there is deliberately no catch-all arm, so the
//! compiler flags every pass that needs updating when a variant is added.

pub mod document;
pub mod expr;
pub mod node_id;
pub mod unit_expr;
pub mod visitor;

pub use document::{Document, Specification, UnitDef};
pub use expr::{Binary, Define, Expr, Literal, Named, Negative, Power};
pub use node_id::NodeId;
pub use unit_expr::{UnitExpr, UnitTerm};
pub use visitor::Visitor;
