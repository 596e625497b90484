//! # dimsolve-resolve
//!
//! The two passes that run before any numeric value is known:
//!
//! - [`validate`] — builds the semantic table, diagnoses duplicate and
//!   unused definitions.
//! - [`resolve_units`] — assigns a [`dimsolve_dims::Dimension`] to every
//!   record by propagating through equalities and operators to a fixed
//!   point.
//!
//! Both are implemented as [`dimsolve_ast::Visitor`]s over the same
//! [`dimsolve_semantic::SemanticTable`], matching the order the driver runs
//! them in: validate first (so every node has a record), then resolve units.

pub mod units;
pub mod validate;

pub use units::{evaluate_unit_expr, resolve_units, DEFAULT_ITERATION_LIMIT};
pub use validate::{validate, ValidationOutcome};
