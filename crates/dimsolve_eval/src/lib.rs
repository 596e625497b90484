//! # dimsolve-eval
//!
//! Turns a parsed, unit-resolved [`dimsolve_ast::Document`] into concrete
//! numeric values (§4.4): direct propagation first ([`propagate`]), then —
//! for whatever the direct pass couldn't pin down — minimum-DOF residual
//! selection ([`residual`], §4.4.3) followed by multidimensional
//! Newton-Raphson ([`dimsolve_solve::newton_raphson`], §4.6). [`op`] is the
//! straight-line instruction set both passes emit and [`op::execute_direct`]
//! / [`op::execute_residual`] replay.
//!
//! [`evaluate`] is the single entry point a driver calls; the three modules
//! are independently testable building blocks.

pub mod op;
pub mod propagate;
pub mod residual;

use dimsolve_ast::Document;
use dimsolve_base::LocatedError;
use dimsolve_semantic::SemanticTable;
use nalgebra::DVector;

pub use op::Op;
pub use propagate::Propagation;
pub use residual::ResidualPlan;

/// Default convergence tolerance for [`evaluate`]'s Newton-Raphson pass
/// (§4.6 leaves the exact value to the implementation).
pub const DEFAULT_TOLERANCE: f64 = 1e-9;

/// Runs the full evaluation pipeline over `doc` against `table`: direct
/// propagation, then (if anything remains) residual selection and
/// root-finding, leaving every reachable record's `value` set.
///
/// Returns every error raised along the way; an empty result means every
/// record direct propagation or residual solving could reach now has a
/// final value. A non-empty result always means evaluation stopped at the
/// point the first error was raised — the two phases never both run partway.
pub fn evaluate(doc: &Document, table: &mut SemanticTable, iteration_limit: u32, tol: f64) -> Vec<LocatedError> {
    evaluate_with_ops(doc, table, iteration_limit, tol).0
}

/// Same pipeline as [`evaluate`], additionally returning the full op-list
/// both passes built and replayed — the input a driver hands to
/// `dimsolve_render::render_codelist`. Ops are returned even when the
/// residual phase never runs (an empty second half).
pub fn evaluate_with_ops(
    doc: &Document,
    table: &mut SemanticTable,
    iteration_limit: u32,
    tol: f64,
) -> (Vec<LocatedError>, Vec<Op>) {
    let direct = propagate::direct_propagate(doc, table);
    op::execute_direct(&direct.ops, table);
    if !direct.errors.is_empty() {
        return (direct.errors, direct.ops);
    }

    let plan = residual::select_and_build(&doc.equalities, table);
    if !plan.errors.is_empty() {
        let mut ops = direct.ops;
        ops.extend(plan.ops);
        return (plan.errors, ops);
    }
    if plan.dim == 0 {
        return (Vec::new(), direct.ops);
    }

    let root = solve(&plan, table, iteration_limit, tol);
    op::execute_residual(&plan.ops, table, root.as_slice(), plan.dim);

    let mut ops = direct.ops;
    ops.extend(plan.ops);
    (Vec::new(), ops)
}

/// Drives [`dimsolve_solve::newton_raphson`] with `plan`'s op-list as the
/// residual function (§4.6): each candidate `x` is loaded into `table` and
/// the op-list replayed to produce `F(x)`.
fn solve(plan: &ResidualPlan, table: &mut SemanticTable, iteration_limit: u32, tol: f64) -> DVector<f64> {
    dimsolve_solve::newton_raphson(
        |x| DVector::from_vec(op::execute_residual(&plan.ops, table, x.as_slice(), plan.dim)),
        plan.dim,
        iteration_limit,
        tol,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use dimsolve_ast::{Binary as AstBinary, Define as AstDefine, Expr as AstExpr, Named as AstNamed};
    use dimsolve_ast::unit_expr::{UnitExpr, UnitTerm};
    use dimsolve_base::{Arena, Interner, Loc};
    use dimsolve_dims::Unit;
    use dimsolve_semantic::Origin;

    fn kg_unit<'a>(term_arena: &'a Arena<UnitTerm>, unit_arena: &'a Arena<UnitExpr<'a>>, kg: dimsolve_base::Symbol) -> &'a UnitExpr<'a> {
        let terms = term_arena.alloc_slice([UnitTerm { name: kg, exp: 1, loc: Loc::synthetic() }]);
        unit_arena.alloc(UnitExpr::new(terms, Loc::synthetic()))
    }

    /// `c = 10`, `c = x + x`: no residual needed to reach `c`, but `x` only
    /// resolves by way of a one-dimensional residual solve.
    #[test]
    fn evaluate_resolves_a_value_reachable_only_through_residual_solving() {
        let expr_arena: Arena<AstExpr> = Arena::new();
        let term_arena: Arena<UnitTerm> = Arena::new();
        let unit_arena: Arena<UnitExpr> = Arena::new();
        let mut interner = Interner::new();
        let kg = interner.intern("kg");
        let c = interner.intern("c");
        let x = interner.intern("x");

        let unit = kg_unit(&term_arena, &unit_arena, kg);
        let define_c = expr_arena.alloc(AstExpr::Define(AstDefine { name: c, value: 10.0, unit, loc: Loc::point("s.dim", 1, 1) }));

        let named_c = expr_arena.alloc(AstExpr::Named(AstNamed { name: c, loc: Loc::point("s.dim", 2, 1) }));
        let named_x1 = expr_arena.alloc(AstExpr::Named(AstNamed { name: x, loc: Loc::point("s.dim", 2, 5) }));
        let named_x2 = expr_arena.alloc(AstExpr::Named(AstNamed { name: x, loc: Loc::point("s.dim", 2, 9) }));
        let sum = expr_arena.alloc(AstExpr::Sum(AstBinary { lhs: named_x1, rhs: named_x2, loc: Loc::point("s.dim", 2, 5) }));
        let eq = expr_arena.alloc(AstExpr::Equality(AstBinary { lhs: named_c, rhs: sum, loc: Loc::point("s.dim", 2, 1) }));

        let mut doc = Document::new();
        doc.add_define(define_c);
        doc.add_equality(eq);

        let mut table = SemanticTable::new();
        table.record_mut(table.get_or_create_named(c, Origin::Define(dimsolve_ast::NodeId::of(define_c)))).unit = Some(Unit::kg());

        let errors = evaluate(&doc, &mut table, 64, DEFAULT_TOLERANCE);
        assert!(errors.is_empty(), "unexpected errors: {:?}", errors.iter().map(|e| e.to_string()).collect::<Vec<_>>());

        let x_idx = table.try_get_named(x).unwrap();
        assert!((table.record(x_idx).value - 5.0).abs() < 1e-4);
    }

    #[test]
    fn evaluate_is_a_no_op_when_everything_resolves_directly() {
        let expr_arena: Arena<AstExpr> = Arena::new();
        let term_arena: Arena<UnitTerm> = Arena::new();
        let unit_arena: Arena<UnitExpr> = Arena::new();
        let mut interner = Interner::new();
        let kg = interner.intern("kg");
        let a = interner.intern("a");
        let b = interner.intern("b");

        let unit = kg_unit(&term_arena, &unit_arena, kg);
        let define_a = expr_arena.alloc(AstExpr::Define(AstDefine { name: a, value: 4.0, unit, loc: Loc::point("s.dim", 1, 1) }));
        let named_a = expr_arena.alloc(AstExpr::Named(AstNamed { name: a, loc: Loc::point("s.dim", 2, 5) }));
        let named_b = expr_arena.alloc(AstExpr::Named(AstNamed { name: b, loc: Loc::point("s.dim", 2, 1) }));
        let eq = expr_arena.alloc(AstExpr::Equality(AstBinary { lhs: named_b, rhs: named_a, loc: Loc::point("s.dim", 2, 1) }));

        let mut doc = Document::new();
        doc.add_define(define_a);
        doc.add_equality(eq);

        let mut table = SemanticTable::new();
        table.record_mut(table.get_or_create_named(a, Origin::Define(dimsolve_ast::NodeId::of(define_a)))).unit = Some(Unit::kg());

        let errors = evaluate(&doc, &mut table, 64, DEFAULT_TOLERANCE);
        assert!(errors.is_empty());
        let b_idx = table.try_get_named(b).unwrap();
        assert_eq!(table.record(b_idx).value, 4.0);
    }

    #[test]
    fn evaluate_with_ops_returns_the_direct_and_residual_ops_it_ran() {
        let expr_arena: Arena<AstExpr> = Arena::new();
        let term_arena: Arena<UnitTerm> = Arena::new();
        let unit_arena: Arena<UnitExpr> = Arena::new();
        let mut interner = Interner::new();
        let kg = interner.intern("kg");
        let c = interner.intern("c");
        let x = interner.intern("x");

        let unit = kg_unit(&term_arena, &unit_arena, kg);
        let define_c = expr_arena.alloc(AstExpr::Define(AstDefine { name: c, value: 10.0, unit, loc: Loc::point("s.dim", 1, 1) }));

        let named_c = expr_arena.alloc(AstExpr::Named(AstNamed { name: c, loc: Loc::point("s.dim", 2, 1) }));
        let named_x1 = expr_arena.alloc(AstExpr::Named(AstNamed { name: x, loc: Loc::point("s.dim", 2, 5) }));
        let named_x2 = expr_arena.alloc(AstExpr::Named(AstNamed { name: x, loc: Loc::point("s.dim", 2, 9) }));
        let sum = expr_arena.alloc(AstExpr::Sum(AstBinary { lhs: named_x1, rhs: named_x2, loc: Loc::point("s.dim", 2, 5) }));
        let eq = expr_arena.alloc(AstExpr::Equality(AstBinary { lhs: named_c, rhs: sum, loc: Loc::point("s.dim", 2, 1) }));

        let mut doc = Document::new();
        doc.add_define(define_c);
        doc.add_equality(eq);

        let mut table = SemanticTable::new();
        table.record_mut(table.get_or_create_named(c, Origin::Define(dimsolve_ast::NodeId::of(define_c)))).unit = Some(Unit::kg());

        let (errors, ops) = evaluate_with_ops(&doc, &mut table, 64, DEFAULT_TOLERANCE);
        assert!(errors.is_empty());
        assert!(!ops.is_empty(), "both the direct and residual ops should be reported");
        assert!(ops.iter().any(|op| matches!(op, Op::Load { .. })));
        assert!(ops.iter().any(|op| matches!(op, Op::Check { .. })));
    }
}
