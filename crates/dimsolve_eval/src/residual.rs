//! Residual selection and assembly (§4.4.3): once direct propagation stalls,
//! pick the smallest closed subset of the equations still left unresolved,
//! choose which free variable each spare degree of freedom should load, and
//! assemble the op-list a root finder can iterate against.
//!
//! Grounded on the original's `select_equations.cc`, the glue between
//! `evaluate.cc`'s residual-mode node handlers and `select_solvable.cc`'s
//! pure subset search — exactly the "caller that translates expression-node
//! identity and variable names through compact integer spaces" that
//! [`dimsolve_solve`] documents as someone else's job.

use std::collections::{BTreeMap, BTreeSet};

use dimsolve_ast::{Binary, Define, Expr, Literal, Named, Negative, Power, Visitor};
use dimsolve_base::{ErrorKind, LocatedError, Symbol};
use dimsolve_semantic::SemanticTable;
use dimsolve_solve::find_solution;

use crate::op::Op;
use crate::propagate::residual_propagate;

/// The op-list and dimension of the residual system built by
/// [`select_and_build`], ready to hand to a root finder.
pub struct ResidualPlan {
    pub ops: Vec<Op>,
    pub errors: Vec<LocatedError>,
    /// The residual system's dimension — `0` when nothing was left to solve.
    pub dim: usize,
}

/// Collects every `Named` reference reachable from a root whose own record
/// is not yet resolved.
///
/// This always walks the full subtree, even through nodes whose own record
/// already carries a value: direct propagation can force-assign an
/// operator node's result from one side of an equality (e.g. `c = x^2`
/// assigns the power node the value of `c`) without that value having been
/// derived from its operands, so a resolved node is no guarantee its
/// children are too — exactly the gap residual selection exists to close.
struct FreeVars<'t> {
    table: &'t SemanticTable,
    names: BTreeSet<Symbol>,
}

impl<'t> Visitor for FreeVars<'t> {
    fn visit_literal(&mut self, _n: &Literal) -> bool {
        true
    }

    fn visit_named(&mut self, n: &Named) -> bool {
        let resolved = self
            .table
            .try_get_named(n.name)
            .map(|idx| self.table.record(idx).resolved)
            .unwrap_or(false);
        if !resolved {
            self.names.insert(n.name);
        }
        true
    }

    fn visit_equality(&mut self, n: &Binary) -> bool {
        n.lhs.accept(self);
        n.rhs.accept(self);
        true
    }

    fn visit_sum(&mut self, n: &Binary) -> bool {
        n.lhs.accept(self);
        n.rhs.accept(self);
        true
    }

    fn visit_difference(&mut self, n: &Binary) -> bool {
        n.lhs.accept(self);
        n.rhs.accept(self);
        true
    }

    fn visit_product(&mut self, n: &Binary) -> bool {
        n.lhs.accept(self);
        n.rhs.accept(self);
        true
    }

    fn visit_quotient(&mut self, n: &Binary) -> bool {
        n.lhs.accept(self);
        n.rhs.accept(self);
        true
    }

    fn visit_power(&mut self, n: &Power) -> bool {
        n.base.accept(self);
        true
    }

    fn visit_negative(&mut self, n: &Negative) -> bool {
        n.operand.accept(self);
        true
    }

    fn visit_define(&mut self, _n: &Define) -> bool {
        true
    }
}

fn free_vars(root: &Expr, table: &SemanticTable) -> BTreeSet<Symbol> {
    let mut collector = FreeVars { table, names: BTreeSet::new() };
    root.accept(&mut collector);
    collector.names
}

/// Runs §4.4.3 over `roots` (the document's equalities): finds every one
/// direct propagation left unresolved, selects the minimum-DOF closed
/// subset via [`dimsolve_solve::find_solution`], loads its free variables
/// one at a time in deterministic (interning) order, and re-propagates
/// after each load so a variable's value can feed the next.
pub fn select_and_build(roots: &[&Expr], table: &mut SemanticTable) -> ResidualPlan {
    // Step 1: a root is still unresolved exactly when some name it reaches
    // has no pinned value yet — regardless of whether its own top-level
    // record was already force-assigned from the other side of an equality.
    let mut unresolved: Vec<&Expr> = Vec::new();
    let mut free_sets: Vec<BTreeSet<Symbol>> = Vec::new();
    for &root in roots {
        let free = free_vars(root, table);
        if !free.is_empty() {
            unresolved.push(root);
            free_sets.push(free);
        }
    }

    if unresolved.is_empty() {
        return ResidualPlan { ops: Vec::new(), errors: Vec::new(), dim: 0 };
    }

    // Compact variable-name space, ids assigned in first-seen order over a
    // deterministic (symbol-interning) iteration.
    let mut var_ids: BTreeMap<Symbol, usize> = BTreeMap::new();
    for set in &free_sets {
        for &sym in set {
            let next = var_ids.len();
            var_ids.entry(sym).or_insert(next);
        }
    }
    let from_to: Vec<BTreeSet<usize>> =
        free_sets.iter().map(|set| set.iter().map(|sym| var_ids[sym]).collect()).collect();

    // Step 2: minimum-DOF subset selection.
    let (chosen_eqs, chosen_vars) = match find_solution(&from_to) {
        Some(pair) => pair,
        None => {
            let loc = unresolved[0].loc().clone();
            return ResidualPlan {
                ops: Vec::new(),
                errors: vec![LocatedError::of_kind(
                    ErrorKind::Unsolvable,
                    "no closed subset of the remaining equations covers the unresolved quantities".to_string(),
                    loc,
                )],
                dim: 0,
            };
        }
    };

    let id_to_var: BTreeMap<usize, Symbol> = var_ids.iter().map(|(&sym, &id)| (id, sym)).collect();

    // Step 3: the chosen roots' full subtrees are the working set —
    // `residual_propagate` already walks each root's whole subtree.
    let working: Vec<&Expr> = chosen_eqs.iter().map(|&i| unresolved[i]).collect();

    let mut chosen_symbols: Vec<Symbol> = chosen_vars.iter().map(|id| id_to_var[id]).collect();
    chosen_symbols.sort();

    // Step 4: load each free variable in turn, re-propagating after each so
    // that downstream values become available to later loads and checks.
    let mut ops = Vec::new();
    let mut errors = Vec::new();
    let mut in_idx = 0usize;
    let mut out_idx = 0usize;

    for sym in chosen_symbols {
        let idx = table
            .try_get_named(sym)
            .expect("a free variable collected from an unresolved subtree already has a semantic record");
        table.record_mut(idx).resolved = true;
        ops.push(Op::Load { n: idx, i: in_idx, loc: working[0].loc().clone() });
        in_idx += 1;

        let pass = residual_propagate(&working, table, out_idx);
        out_idx = pass.out_idx;
        ops.extend(pass.ops);
        errors.extend(pass.errors);
        if !errors.is_empty() {
            return ResidualPlan { ops, errors, dim: 0 };
        }
    }

    if in_idx != out_idx {
        log::warn!(
            "residual selection loaded {} variable(s) but the working set only produced {} check(s)",
            in_idx,
            out_idx
        );
    }

    ResidualPlan { ops, errors, dim: in_idx }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dimsolve_ast::{Binary as AstBinary, Define as AstDefine, Document, Expr as AstExpr, Named as AstNamed};
    use dimsolve_ast::unit_expr::{UnitExpr, UnitTerm};
    use dimsolve_base::{Arena, Interner, Loc};
    use dimsolve_dims::Unit;
    use dimsolve_semantic::Origin;

    fn kg_unit<'a>(term_arena: &'a Arena<UnitTerm>, unit_arena: &'a Arena<UnitExpr<'a>>, kg: Symbol) -> &'a UnitExpr<'a> {
        let terms = term_arena.alloc_slice([UnitTerm { name: kg, exp: 1, loc: Loc::synthetic() }]);
        unit_arena.alloc(UnitExpr::new(terms, Loc::synthetic()))
    }

    /// `c = 10`, `c = x + x` — direct propagation can force-assign the sum
    /// node the value of `c` but can't split that value between the two
    /// (identical) operands, leaving `x` a genuine free variable that only
    /// residual selection and loading can resolve.
    #[test]
    fn single_free_variable_is_selected_and_loaded() {
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

        let mut table = dimsolve_semantic::SemanticTable::new();
        table.record_mut(table.get_or_create_named(c, Origin::Define(dimsolve_ast::NodeId::of(define_c)))).unit = Some(Unit::kg());

        let direct = crate::propagate::direct_propagate(&doc, &mut table);
        crate::op::execute_direct(&direct.ops, &mut table);
        assert!(direct.errors.is_empty());

        let plan = select_and_build(&doc.equalities, &mut table);
        assert!(plan.errors.is_empty());
        assert_eq!(plan.dim, 1);
        assert!(plan.ops.iter().any(|op| matches!(op, Op::Load { i: 0, .. })));
        assert!(plan.ops.iter().any(|op| matches!(op, Op::Check { i: 0, .. })));

        // c - (x + x) == 0 at x = 5.
        let out = crate::op::execute_residual(&plan.ops, &mut table, &[5.0], plan.dim);
        assert!(out[0].abs() < 1e-9);
        let out = crate::op::execute_residual(&plan.ops, &mut table, &[0.0], plan.dim);
        assert!((out[0] - 10.0).abs() < 1e-9);
    }

    #[test]
    fn nothing_to_select_when_every_equality_is_already_processed() {
        let expr_arena: Arena<AstExpr> = Arena::new();
        let term_arena: Arena<UnitTerm> = Arena::new();
        let unit_arena: Arena<UnitExpr> = Arena::new();
        let mut interner = Interner::new();
        let kg = interner.intern("kg");
        let a = interner.intern("a");
        let b = interner.intern("b");

        let unit = kg_unit(&term_arena, &unit_arena, kg);
        let define_a = expr_arena.alloc(AstExpr::Define(AstDefine { name: a, value: 2.0, unit, loc: Loc::point("s.dim", 1, 1) }));
        let named_a = expr_arena.alloc(AstExpr::Named(AstNamed { name: a, loc: Loc::point("s.dim", 2, 5) }));
        let named_b = expr_arena.alloc(AstExpr::Named(AstNamed { name: b, loc: Loc::point("s.dim", 2, 1) }));
        let eq = expr_arena.alloc(AstExpr::Equality(AstBinary { lhs: named_b, rhs: named_a, loc: Loc::point("s.dim", 2, 1) }));

        let mut doc = Document::new();
        doc.add_define(define_a);
        doc.add_equality(eq);

        let mut table = dimsolve_semantic::SemanticTable::new();
        table.record_mut(table.get_or_create_named(a, Origin::Define(dimsolve_ast::NodeId::of(define_a)))).unit = Some(Unit::kg());

        let direct = crate::propagate::direct_propagate(&doc, &mut table);
        crate::op::execute_direct(&direct.ops, &mut table);
        assert!(direct.errors.is_empty());

        let plan = select_and_build(&doc.equalities, &mut table);
        assert!(plan.errors.is_empty());
        assert_eq!(plan.dim, 0);
        assert!(plan.ops.is_empty());
    }

    #[test]
    fn unsolvable_system_reports_an_error() {
        // A single equation relating two variables that never appear
        // anywhere else can never become a closed system on its own.
        let expr_arena: Arena<AstExpr> = Arena::new();
        let mut interner = Interner::new();
        let a = interner.intern("a");
        let b = interner.intern("b");

        let named_a = expr_arena.alloc(AstExpr::Named(AstNamed { name: a, loc: Loc::point("s.dim", 1, 1) }));
        let named_b = expr_arena.alloc(AstExpr::Named(AstNamed { name: b, loc: Loc::point("s.dim", 1, 5) }));
        let eq = expr_arena.alloc(AstExpr::Equality(AstBinary { lhs: named_a, rhs: named_b, loc: Loc::point("s.dim", 1, 1) }));

        let mut doc = Document::new();
        doc.add_equality(eq);

        let mut table = dimsolve_semantic::SemanticTable::new();
        let direct = crate::propagate::direct_propagate(&doc, &mut table);
        assert!(direct.errors.is_empty());

        let plan = select_and_build(&doc.equalities, &mut table);
        assert_eq!(plan.errors.len(), 1);
        assert_eq!(plan.errors[0].kind, ErrorKind::Unsolvable);
    }
}
