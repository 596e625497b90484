//! The AST traversal contract (§4.1): one handler per [`Expr`] variant,
//! each returning `true` on success and `false` to abort the current pass.
//!
//! Every pass over the tree — validation, unit resolution, value
//! propagation, rendering — implements [`Visitor`] rather than hand-rolling
//! its own `match`. Because [`Expr`] is a closed enum and [`Expr::accept`]
//! matches it exhaustively with no catch-all arm, adding a tenth variant is
//! a compile error in every implementor, not a silently-skipped case.

use crate::expr::{Binary, Define, Expr, Literal, Named, Negative, Power};

/// One callback per [`Expr`] variant. Implementors do not recurse into
/// children themselves unless they choose to — [`Expr::accept`] dispatches
/// only the node itself; each callback is responsible for visiting its own
/// children via `self.accept(...)` if the pass needs to go deeper.
pub trait Visitor {
    fn visit_literal(&mut self, n: &Literal) -> bool;
    fn visit_named(&mut self, n: &Named) -> bool;
    fn visit_equality(&mut self, n: &Binary) -> bool;
    fn visit_sum(&mut self, n: &Binary) -> bool;
    fn visit_difference(&mut self, n: &Binary) -> bool;
    fn visit_product(&mut self, n: &Binary) -> bool;
    fn visit_quotient(&mut self, n: &Binary) -> bool;
    fn visit_power(&mut self, n: &Power) -> bool;
    fn visit_negative(&mut self, n: &Negative) -> bool;
    fn visit_define(&mut self, n: &Define) -> bool;
}

impl<'a> Expr<'a> {
    /// Dispatches to the matching [`Visitor`] callback for this node's variant.
    pub fn accept(&self, v: &mut dyn Visitor) -> bool {
        match self {
            Expr::Literal(n) => v.visit_literal(n),
            Expr::Named(n) => v.visit_named(n),
            Expr::Equality(n) => v.visit_equality(n),
            Expr::Sum(n) => v.visit_sum(n),
            Expr::Difference(n) => v.visit_difference(n),
            Expr::Product(n) => v.visit_product(n),
            Expr::Quotient(n) => v.visit_quotient(n),
            Expr::Power(n) => v.visit_power(n),
            Expr::Negative(n) => v.visit_negative(n),
            Expr::Define(n) => v.visit_define(n),
        }
    }
}
