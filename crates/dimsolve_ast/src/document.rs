//! Top-level document structure: unit definitions, specifications, and the
//! document that collects every statement parsed from a source file.

use dimsolve_base::{Loc, Symbol};

use crate::expr::Expr;
use crate::unit_expr::UnitExpr;

/// A `unit name = value [unit-expr]` statement introducing a new named unit,
/// e.g. `unit newton = 1 [kg*m/s^2]`.
///
/// Unlike [`crate::expr::Define`], a `UnitDef` does not produce a value
/// usable in arithmetic — it only extends the set of unit names the resolver
/// recognizes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitDef<'a> {
    pub name: Symbol,
    pub value: f64,
    pub unit: &'a UnitExpr<'a>,
    pub loc: Loc,
}

/// A `spec name [unit-expr]` statement asserting the expected unit of a
/// named quantity, checked (not derived) by the resolver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Specification<'a> {
    pub name: Symbol,
    pub unit: &'a UnitExpr<'a>,
    pub loc: Loc,
}

/// The full set of statements parsed from one source file.
///
/// A `Document` owns no allocations itself — every `Expr`, `UnitDef`, and
/// `Specification` it references lives in the arena the parser allocated
/// from, so `Document` can be freely copied and passed by value.
#[derive(Debug, Clone)]
pub struct Document<'a> {
    pub equalities: Vec<&'a Expr<'a>>,
    pub defines: Vec<&'a Expr<'a>>,
    pub specs: Vec<&'a Specification<'a>>,
    pub unit_defs: Vec<&'a UnitDef<'a>>,
}

impl<'a> Document<'a> {
    pub fn new() -> Self {
        Document {
            equalities: Vec::new(),
            defines: Vec::new(),
            specs: Vec::new(),
            unit_defs: Vec::new(),
        }
    }

    pub fn add_equality(&mut self, e: &'a Expr<'a>) {
        debug_assert!(matches!(e, Expr::Equality(_)));
        self.equalities.push(e);
    }

    pub fn add_define(&mut self, d: &'a Expr<'a>) {
        debug_assert!(matches!(d, Expr::Define(_)));
        self.defines.push(d);
    }

    pub fn add_spec(&mut self, s: &'a Specification<'a>) {
        self.specs.push(s);
    }

    pub fn add_unit_def(&mut self, u: &'a UnitDef<'a>) {
        self.unit_defs.push(u);
    }

    /// Merges another document's statements into this one, in the order
    /// `other` then `self` — used to prepend the built-in preamble to a
    /// user's source document.
    pub fn prepend(mut self, mut other: Document<'a>) -> Self {
        other.equalities.extend(self.equalities.drain(..));
        other.defines.extend(self.defines.drain(..));
        other.specs.extend(self.specs.drain(..));
        other.unit_defs.extend(self.unit_defs.drain(..));
        other
    }
}

impl<'a> Default for Document<'a> {
    fn default() -> Self {
        Self::new()
    }
}
