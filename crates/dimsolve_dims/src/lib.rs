//! # dimsolve-dims
//!
//! SI-style physical dimensions and the units built on top of them.
//!
//! - [`Rational`] — a reduced-fraction exponent component.
//! - [`Dimension`] — an ordered 7-tuple of rational exponents over the SI
//!   base dimensions (length, mass, time, current, temperature, amount,
//!   luminous intensity).
//! - [`Unit`] — a scale factor attached to a [`Dimension`].
//!
//! CRITICAL: NO AST DEPENDENCY. This crate has no notion of expression trees
//! or documents; it is pure value algebra that the AST, semantic table, and
//! resolver crates build on top of.

pub mod dimension;
pub mod rational;
pub mod unit;

pub use dimension::Dimension;
pub use rational::Rational;
pub use unit::Unit;
