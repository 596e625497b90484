//! Direct value propagation and residual-mode op emission (§4.4.2, §4.4.3).
//!
//! Grounded on the original `evaluate.cc`'s per-node-type `operator()`
//! cascades: each binary operator checks which of its three records (the
//! node itself plus its two operands) are already resolved and emits the
//! one op that would pin down whichever record is still unknown. A node
//! whose record is already resolved, and already `equ_processed`, requires
//! no work; one that's resolved but *not* `equ_processed` while every
//! operand is also resolved is a record this equation would redundantly
//! re-derive — a [`dimsolve_base::ErrorKind::ValueConflict`] unless
//! `allow_conflict` turns it into an anonymous recomputation plus a `Check`.
//!
//! Unlike the original's explicit working-set (`DirectEvaluateNodes` erasing
//! resolved nodes from a `std::set`), this builds on the same recursive
//! `Visitor` idiom `dimsolve_resolve::units` already established: each pass
//! fully re-walks the tree, and the monotonic `resolved`/`equ_processed`
//! flags make repeat visits to already-settled nodes a cheap no-op. Because
//! a node's children are always visited before the node itself, literal
//! leaves resolve in the very same call that first reaches them — ahead of
//! every node that depends on them — which is what the original's separate
//! "literal-priority sub-pass" exists to guarantee explicitly.

use dimsolve_ast::{Binary, Define, Expr, Literal, Named, Negative, NodeId, Power, Visitor};
use dimsolve_base::{ErrorKind, Loc, LocatedError};
use dimsolve_semantic::{Origin, SemanticTable};

use crate::op::Op;

const ITERATION_LIMIT: u32 = 64;

/// The result of one call to [`direct_propagate`] or [`residual_propagate`].
pub struct Propagation {
    pub ops: Vec<Op>,
    pub errors: Vec<LocatedError>,
    /// The next `Check` output index to use — callers building a residual
    /// system across several calls (one per loaded variable) thread this
    /// back in as `out_idx_start`.
    pub out_idx: usize,
}

struct Propagator<'a> {
    table: &'a mut SemanticTable,
    allow_conflict: bool,
    progress: bool,
    out_idx: usize,
    ops: Vec<Op>,
    errors: Vec<LocatedError>,
}

impl<'a> Propagator<'a> {
    fn resolved(&self, idx: usize) -> bool {
        self.table.record(idx).resolved
    }

    fn equ_processed(&self, idx: usize) -> bool {
        self.table.record(idx).equ_processed
    }

    /// Records that `idx`'s value has been pinned by this op, without
    /// implying anything about whether it has also been *claimed* by an
    /// equation (see `mark_equ_processed`).
    fn mark_resolved(&mut self, idx: usize) {
        self.table.record_mut(idx).resolved = true;
        self.progress = true;
    }

    fn mark_equ_processed(&mut self, idx: usize) {
        self.table.record_mut(idx).equ_processed = true;
    }

    /// The shared "all three resolved but not yet claimed" handling used by
    /// every binary operator: recompute the result into an anonymous
    /// scratch record and emit a `Check` comparing it against the already-
    /// resolved target, or report a hard conflict when conflicts aren't
    /// allowed yet.
    fn conflict_or_check(
        &mut self,
        target: usize,
        node: NodeId,
        build_anon_op: impl FnOnce(usize) -> Op,
        loc: &Loc,
        what: &str,
    ) -> bool {
        if self.equ_processed(target) {
            return true;
        }
        if !self.allow_conflict {
            self.errors.push(LocatedError::of_kind(
                ErrorKind::ValueConflict,
                format!("{} is over-determined: this equation redundantly re-derives it", what),
                loc.clone(),
            ));
            return false;
        }
        let anon = self.table.new_anonymous(Origin::Expr(node));
        self.ops.push(build_anon_op(anon));
        self.ops.push(Op::Check { i: self.out_idx, a: target, b: anon, loc: loc.clone() });
        self.out_idx += 1;
        self.mark_equ_processed(target);
        self.table.record_mut(anon).resolved = true;
        self.table.record_mut(anon).equ_processed = true;
        self.progress = true;
        true
    }
}

impl<'a> Visitor for Propagator<'a> {
    fn visit_literal(&mut self, n: &Literal) -> bool {
        let idx = self.table.get_or_create_unnamed(NodeId::of(n), Origin::Expr(NodeId::of(n)));
        if !self.resolved(idx) {
            self.table.record_mut(idx).value = n.value;
            self.table.record_mut(idx).is_literal = true;
            self.mark_resolved(idx);
            self.mark_equ_processed(idx);
        }
        true
    }

    fn visit_named(&mut self, n: &Named) -> bool {
        // A named reference has no operands of its own to solve from; it is
        // only ever pinned by a `Define` or by the equality/operator that
        // targets it. Syncing `equ_processed` to `resolved` here mirrors the
        // original's `NamedValue` handler, which otherwise has nothing to do.
        if let Some(idx) = self.table.try_get_named(n.name) {
            let resolved = self.resolved(idx);
            if resolved {
                self.mark_equ_processed(idx);
            }
        }
        true
    }

    fn visit_equality(&mut self, n: &Binary) -> bool {
        if !n.lhs.accept(self) || !n.rhs.accept(self) {
            return false;
        }
        let self_idx = self.table.get_or_create_unnamed(NodeId::of(n), Origin::Expr(NodeId::of(n)));
        let lhs_idx = self.table.record_idx_for_expr(n.lhs);
        let rhs_idx = self.table.record_idx_for_expr(n.rhs);
        let (l, r) = (self.resolved(lhs_idx), self.resolved(rhs_idx));

        if l && r {
            if self.equ_processed(self_idx) {
                return true;
            }
            if !self.allow_conflict {
                self.errors.push(LocatedError::of_kind(
                    ErrorKind::ValueConflict,
                    "both sides of this equality are already known and disagree".to_string(),
                    n.loc.clone(),
                ));
                return false;
            }
            self.ops.push(Op::Check { i: self.out_idx, a: lhs_idx, b: rhs_idx, loc: n.loc.clone() });
            self.out_idx += 1;
            self.mark_equ_processed(self_idx);
            self.progress = true;
            return true;
        }
        if l {
            self.ops.push(Op::Assign { d: self_idx, s: lhs_idx, loc: n.loc.clone() });
            self.ops.push(Op::Assign { d: rhs_idx, s: lhs_idx, loc: n.loc.clone() });
            self.mark_equ_processed(self_idx);
            self.mark_resolved(self_idx);
            self.mark_resolved(rhs_idx);
            return true;
        }
        if r {
            self.ops.push(Op::Assign { d: self_idx, s: rhs_idx, loc: n.loc.clone() });
            self.ops.push(Op::Assign { d: lhs_idx, s: rhs_idx, loc: n.loc.clone() });
            self.mark_equ_processed(self_idx);
            self.mark_resolved(self_idx);
            self.mark_resolved(lhs_idx);
            return true;
        }
        true
    }

    fn visit_sum(&mut self, n: &Binary) -> bool {
        if !n.lhs.accept(self) || !n.rhs.accept(self) {
            return false;
        }
        let self_idx = self.table.get_or_create_unnamed(NodeId::of(n), Origin::Expr(NodeId::of(n)));
        let lhs_idx = self.table.record_idx_for_expr(n.lhs);
        let rhs_idx = self.table.record_idx_for_expr(n.rhs);
        let (s, l, r) = (self.resolved(self_idx), self.resolved(lhs_idx), self.resolved(rhs_idx));

        if s && l && r {
            let anon_op = Op::Add { r: 0, a: lhs_idx, b: rhs_idx, loc: n.loc.clone() };
            return self.conflict_or_check(self_idx, NodeId::of(n), anon_op, &n.loc, "this sum");
        }
        if l && r {
            self.ops.push(Op::Add { r: self_idx, a: lhs_idx, b: rhs_idx, loc: n.loc.clone() });
            self.mark_resolved(self_idx);
            self.mark_equ_processed(self_idx);
            return true;
        }
        if s && l {
            self.ops.push(Op::Sub { r: rhs_idx, a: self_idx, b: lhs_idx, loc: n.loc.clone() });
            self.mark_resolved(rhs_idx);
            self.mark_equ_processed(self_idx);
            return true;
        }
        if s && r {
            self.ops.push(Op::Sub { r: lhs_idx, a: self_idx, b: rhs_idx, loc: n.loc.clone() });
            self.mark_resolved(lhs_idx);
            self.mark_equ_processed(self_idx);
            return true;
        }
        true
    }

    fn visit_difference(&mut self, n: &Binary) -> bool {
        if !n.lhs.accept(self) || !n.rhs.accept(self) {
            return false;
        }
        let self_idx = self.table.get_or_create_unnamed(NodeId::of(n), Origin::Expr(NodeId::of(n)));
        let lhs_idx = self.table.record_idx_for_expr(n.lhs);
        let rhs_idx = self.table.record_idx_for_expr(n.rhs);
        let (s, l, r) = (self.resolved(self_idx), self.resolved(lhs_idx), self.resolved(rhs_idx));

        if s && l && r {
            let anon_op = Op::Sub { r: 0, a: lhs_idx, b: rhs_idx, loc: n.loc.clone() };
            return self.conflict_or_check(self_idx, NodeId::of(n), anon_op, &n.loc, "this difference");
        }
        if l && r {
            self.ops.push(Op::Sub { r: self_idx, a: lhs_idx, b: rhs_idx, loc: n.loc.clone() });
            self.mark_resolved(self_idx);
            self.mark_equ_processed(self_idx);
            return true;
        }
        if s && l {
            self.ops.push(Op::Sub { r: rhs_idx, a: lhs_idx, b: self_idx, loc: n.loc.clone() });
            self.mark_resolved(rhs_idx);
            self.mark_equ_processed(self_idx);
            return true;
        }
        if s && r {
            self.ops.push(Op::Add { r: lhs_idx, a: rhs_idx, b: self_idx, loc: n.loc.clone() });
            self.mark_resolved(lhs_idx);
            self.mark_equ_processed(self_idx);
            return true;
        }
        true
    }

    fn visit_product(&mut self, n: &Binary) -> bool {
        if !n.lhs.accept(self) || !n.rhs.accept(self) {
            return false;
        }
        let self_idx = self.table.get_or_create_unnamed(NodeId::of(n), Origin::Expr(NodeId::of(n)));
        let lhs_idx = self.table.record_idx_for_expr(n.lhs);
        let rhs_idx = self.table.record_idx_for_expr(n.rhs);
        let (s, l, r) = (self.resolved(self_idx), self.resolved(lhs_idx), self.resolved(rhs_idx));

        if s && l && r {
            let anon_op = Op::Mul { r: 0, a: lhs_idx, b: rhs_idx, loc: n.loc.clone() };
            return self.conflict_or_check(self_idx, NodeId::of(n), anon_op, &n.loc, "this product");
        }
        if l && r {
            self.ops.push(Op::Mul { r: self_idx, a: lhs_idx, b: rhs_idx, loc: n.loc.clone() });
            self.mark_resolved(self_idx);
            self.mark_equ_processed(self_idx);
            return true;
        }
        if s && l {
            self.ops.push(Op::Div { r: rhs_idx, a: self_idx, b: lhs_idx, loc: n.loc.clone() });
            self.mark_resolved(rhs_idx);
            self.mark_equ_processed(self_idx);
            return true;
        }
        if s && r {
            self.ops.push(Op::Div { r: lhs_idx, a: self_idx, b: rhs_idx, loc: n.loc.clone() });
            self.mark_resolved(lhs_idx);
            self.mark_equ_processed(self_idx);
            return true;
        }
        true
    }

    fn visit_quotient(&mut self, n: &Binary) -> bool {
        if !n.lhs.accept(self) || !n.rhs.accept(self) {
            return false;
        }
        let self_idx = self.table.get_or_create_unnamed(NodeId::of(n), Origin::Expr(NodeId::of(n)));
        let lhs_idx = self.table.record_idx_for_expr(n.lhs);
        let rhs_idx = self.table.record_idx_for_expr(n.rhs);
        let (s, l, r) = (self.resolved(self_idx), self.resolved(lhs_idx), self.resolved(rhs_idx));

        if s && l && r {
            let anon_op = Op::Div { r: 0, a: lhs_idx, b: rhs_idx, loc: n.loc.clone() };
            return self.conflict_or_check(self_idx, NodeId::of(n), anon_op, &n.loc, "this quotient");
        }
        if l && r {
            self.ops.push(Op::Div { r: self_idx, a: lhs_idx, b: rhs_idx, loc: n.loc.clone() });
            self.mark_resolved(self_idx);
            self.mark_equ_processed(self_idx);
            return true;
        }
        if s && r {
            self.ops.push(Op::Mul { r: lhs_idx, a: self_idx, b: rhs_idx, loc: n.loc.clone() });
            self.mark_resolved(lhs_idx);
            self.mark_equ_processed(self_idx);
            return true;
        }
        if s && l {
            self.ops.push(Op::Div { r: rhs_idx, a: lhs_idx, b: self_idx, loc: n.loc.clone() });
            self.mark_resolved(rhs_idx);
            self.mark_equ_processed(self_idx);
            return true;
        }
        true
    }

    fn visit_power(&mut self, n: &Power) -> bool {
        if !n.base.accept(self) {
            return false;
        }
        let self_idx = self.table.get_or_create_unnamed(NodeId::of(n), Origin::Expr(NodeId::of(n)));
        let base_idx = self.table.record_idx_for_expr(n.base);
        let (s, b) = (self.resolved(self_idx), self.resolved(base_idx));

        if s && b {
            let anon_op = Op::Exp { r: 0, b: base_idx, e: n.exp as f64, loc: n.loc.clone() };
            return self.conflict_or_check(self_idx, NodeId::of(n), anon_op, &n.loc, "this power expression");
        }
        if b {
            self.ops.push(Op::Exp { r: self_idx, b: base_idx, e: n.exp as f64, loc: n.loc.clone() });
            self.mark_resolved(self_idx);
            self.mark_equ_processed(self_idx);
            return true;
        }
        if s && n.exp % 2 != 0 {
            self.ops.push(Op::Exp { r: base_idx, b: self_idx, e: 1.0 / (n.exp as f64), loc: n.loc.clone() });
            self.mark_resolved(base_idx);
            self.mark_equ_processed(self_idx);
            return true;
        }
        true
    }

    fn visit_negative(&mut self, n: &Negative) -> bool {
        if !n.operand.accept(self) {
            return false;
        }
        let self_idx = self.table.get_or_create_unnamed(NodeId::of(n), Origin::Expr(NodeId::of(n)));
        let operand_idx = self.table.record_idx_for_expr(n.operand);
        let (s, a) = (self.resolved(self_idx), self.resolved(operand_idx));

        if s && a {
            let anon_op = Op::Neg { r: 0, a: operand_idx, loc: n.loc.clone() };
            return self.conflict_or_check(self_idx, NodeId::of(n), anon_op, &n.loc, "this negation");
        }
        if a {
            self.ops.push(Op::Neg { r: self_idx, a: operand_idx, loc: n.loc.clone() });
            self.mark_resolved(self_idx);
            self.mark_equ_processed(self_idx);
            return true;
        }
        if s {
            self.ops.push(Op::Neg { r: operand_idx, a: self_idx, loc: n.loc.clone() });
            self.mark_resolved(operand_idx);
            self.mark_equ_processed(self_idx);
            return true;
        }
        true
    }

    fn visit_define(&mut self, _n: &Define) -> bool {
        // Defines are assigned a value directly, before the pass loop runs
        // (see `direct_propagate`); a `Define` never appears nested inside
        // an equation subtree.
        true
    }
}

fn run_passes(equalities: &[&Expr], table: &mut SemanticTable, allow_conflict: bool, out_idx_start: usize) -> Propagation {
    let mut out_idx = out_idx_start;
    let mut errors = Vec::new();
    let mut ops = Vec::new();

    let mut progress = true;
    let mut pass = 0u32;
    while pass < ITERATION_LIMIT && progress {
        let mut propagator = Propagator {
            table,
            allow_conflict,
            progress: false,
            out_idx,
            ops: Vec::new(),
            errors: Vec::new(),
        };
        for e in equalities {
            e.accept(&mut propagator);
        }
        progress = propagator.progress;
        out_idx = propagator.out_idx;
        ops.extend(propagator.ops);
        errors.extend(propagator.errors);
        if !errors.is_empty() {
            break;
        }
        pass += 1;
    }

    Propagation { ops, errors, out_idx }
}

/// Assigns every `Define`'s value directly (`literal * unit.scale`), then
/// runs the fixed-point propagation loop (§4.4.2) over every equality with
/// `allow_conflict = false`: a record that would be re-derived despite
/// already being known is a hard [`dimsolve_base::ErrorKind::ValueConflict`].
pub fn direct_propagate(doc: &dimsolve_ast::Document, table: &mut SemanticTable) -> Propagation {
    for d in &doc.defines {
        if let Expr::Define(def) = *d {
            let idx = table.get_or_create_named(def.name, Origin::Define(NodeId::of(def)));
            let unit = table.record(idx).unit.expect("unit resolver runs before value propagation");
            table.record_mut(idx).value = def.value * unit.scale;
            table.record_mut(idx).resolved = true;
            table.record_mut(idx).equ_processed = true;
        }
    }

    run_passes(&doc.equalities, table, false, 0)
}

/// Re-runs the same fixed-point loop over just the chosen residual
/// subtrees, with `allow_conflict = true`: every node that would otherwise
/// conflict instead emits an anonymous recomputation plus a `Check` op.
/// `out_idx_start` threads the output-vector index across repeated calls —
/// one per free variable loaded (§4.4.3 step 4).
pub fn residual_propagate(roots: &[&Expr], table: &mut SemanticTable, out_idx_start: usize) -> Propagation {
    run_passes(roots, table, true, out_idx_start)
}
