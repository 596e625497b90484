//! The expression node set.
//!
//! [`Expr`] is a closed sum type: every pass that consumes it is written as
//! an exhaustive `match` with no catch-all arm, so adding a variant here is a
//! compile error at every site that needs updating rather than a silently
//! ignored case (the same guarantee the original C++ gets from deleting the
//! visitor's template fallback).

use dimsolve_base::{Loc, Symbol};

use crate::unit_expr::UnitExpr;

/// Two arena-referenced subexpressions sharing a location, the shape common
/// to every binary operator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Binary<'a> {
    pub lhs: &'a Expr<'a>,
    pub rhs: &'a Expr<'a>,
    pub loc: Loc,
}

/// A numeric literal, e.g. `9.8` or `2`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Literal {
    pub value: f64,
    pub loc: Loc,
}

/// A reference to a named quantity, resolved against the document's
/// definitions and equalities in later passes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Named {
    pub name: Symbol,
    pub loc: Loc,
}

/// `base ^ exp` for a compile-time integer exponent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Power<'a> {
    pub base: &'a Expr<'a>,
    pub exp: i32,
    pub loc: Loc,
}

/// `-operand`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Negative<'a> {
    pub operand: &'a Expr<'a>,
    pub loc: Loc,
}

/// A `define name = value [unit]` statement, binding `name` to a literal
/// value carrying a concrete unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Define<'a> {
    pub name: Symbol,
    pub value: f64,
    pub unit: &'a UnitExpr<'a>,
    pub loc: Loc,
}

/// An expression node produced by the parser.
///
/// Variants mirror the operators a document can write: equality
/// (`a == b`), the four binary arithmetic operators, unary negation,
/// integer exponentiation, literals, named references, and `define`
/// statements (which are themselves expressions, since a definition's name
/// can be referenced like any other value).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Expr<'a> {
    Literal(Literal),
    Named(Named),
    Equality(Binary<'a>),
    Sum(Binary<'a>),
    Difference(Binary<'a>),
    Product(Binary<'a>),
    Quotient(Binary<'a>),
    Power(Power<'a>),
    Negative(Negative<'a>),
    Define(Define<'a>),
}

impl<'a> Expr<'a> {
    /// The source location of this node.
    pub fn loc(&self) -> &Loc {
        match self {
            Expr::Literal(n) => &n.loc,
            Expr::Named(n) => &n.loc,
            Expr::Equality(n) => &n.loc,
            Expr::Sum(n) => &n.loc,
            Expr::Difference(n) => &n.loc,
            Expr::Product(n) => &n.loc,
            Expr::Quotient(n) => &n.loc,
            Expr::Power(n) => &n.loc,
            Expr::Negative(n) => &n.loc,
            Expr::Define(n) => &n.loc,
        }
    }

    /// A short tag naming the variant, used in diagnostics and graphviz labels.
    pub fn kind(&self) -> &'static str {
        match self {
            Expr::Literal(_) => "literal",
            Expr::Named(_) => "named",
            Expr::Equality(_) => "equality",
            Expr::Sum(_) => "sum",
            Expr::Difference(_) => "difference",
            Expr::Product(_) => "product",
            Expr::Quotient(_) => "quotient",
            Expr::Power(_) => "power",
            Expr::Negative(_) => "negative",
            Expr::Define(_) => "define",
        }
    }
}
