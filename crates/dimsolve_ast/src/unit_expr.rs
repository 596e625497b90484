//! Unit expressions: `[m,kg,s^-2]`-style products of named units.

use dimsolve_base::{Loc, Symbol};

/// One factor of a unit expression: a named unit raised to an integer power.
///
/// `kg^-1` parses to `UnitTerm { name: "kg", exp: -1, .. }`. A bare `kg`
/// parses to `exp: 1`. Division (`a/b`) is folded into negation of `b`'s
/// exponents by the parser, so by the time a `UnitExpr` exists there is no
/// separate subtraction operator left to evaluate — only a flat product.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitTerm {
    pub name: Symbol,
    pub exp: i32,
    pub loc: Loc,
}

/// A product of [`UnitTerm`]s, e.g. `m/s^2` or `kg*m^2/s^3/A^2`.
///
/// Appears as the right-hand side of a `unit` declaration, inside a `spec`
/// clause, and as the unit annotation of a `define`.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitExpr<'a> {
    pub terms: &'a [UnitTerm],
    pub loc: Loc,
}

impl<'a> UnitExpr<'a> {
    pub fn new(terms: &'a [UnitTerm], loc: Loc) -> Self {
        UnitExpr { terms, loc }
    }
}
