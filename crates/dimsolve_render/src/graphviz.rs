//! Graphviz `.dot` rendering of a document's equation graph (§4.9).
//!
//! Grounded on the original source's `graphviz.cc`: one node per touched
//! record, one edge per equation or operator relating two records, a
//! distinct edge color for equalities. Unlike the original, node identity
//! and the dimension/value facts attached to each node come straight from
//! [`SemanticTable`] rather than a parallel id map the renderer builds
//! itself — this crate already has exactly that table. The original's
//! timestamp stanza and exact label text are not reproduced.

use std::collections::{BTreeMap, BTreeSet};

use dimsolve_ast::{Document, Expr};
use dimsolve_base::{Interner, Symbol};
use dimsolve_semantic::SemanticTable;

/// Renders `doc`'s equalities and defines as a Graphviz `digraph`.
///
/// Every node [`SemanticTable::try_idx_for_expr`] can resolve from a
/// document node is included; a node the table never created a record for
/// (possible only if `doc` was never run through resolution) is silently
/// skipped rather than panicking — rendering is a read-only, best-effort
/// view, not a pass that can fail.
pub fn render_graph(doc: &Document, table: &SemanticTable, interner: &Interner) -> String {
    let mut nodes: BTreeSet<usize> = BTreeSet::new();
    let mut edges: BTreeMap<(usize, usize), bool> = BTreeMap::new();
    let mut pinned: BTreeSet<usize> = BTreeSet::new();

    for &eq in &doc.equalities {
        if let Expr::Equality(b) = eq {
            let lhs = visit(b.lhs, table, &mut nodes, &mut edges);
            let rhs = visit(b.rhs, table, &mut nodes, &mut edges);
            if let (Some(l), Some(r)) = (lhs, rhs) {
                edges.insert(order(l, r), true);
            }
        }
    }

    for &def in &doc.defines {
        if let Expr::Define(d) = def {
            if let Some(idx) = table.try_get_named(d.name) {
                nodes.insert(idx);
                pinned.insert(idx);
            }
        }
    }

    let mut out = String::from("digraph {\n");
    for (&(a, b), &equ) in &edges {
        out.push_str(&format!("  {}->{} [dir=none", a, b));
        if equ {
            out.push_str(r#" color="black:black""#);
        }
        out.push_str("];\n");
    }
    for &idx in &nodes {
        out.push_str(&render_node(idx, table, interner, pinned.contains(&idx)));
    }
    out.push_str("}\n");
    out
}

/// Recurses into a binary/unary operator's operands, returning the node's
/// own record index — `None` only if the table has no record for `e`.
fn visit(e: &Expr, table: &SemanticTable, nodes: &mut BTreeSet<usize>, edges: &mut BTreeMap<(usize, usize), bool>) -> Option<usize> {
    let idx = table.try_idx_for_expr(e)?;
    if nodes.insert(idx) {
        match e {
            Expr::Sum(b) | Expr::Difference(b) | Expr::Product(b) | Expr::Quotient(b) => {
                if let Some(l) = visit(b.lhs, table, nodes, edges) {
                    edges.entry(order(idx, l)).or_insert(false);
                }
                if let Some(r) = visit(b.rhs, table, nodes, edges) {
                    edges.entry(order(idx, r)).or_insert(false);
                }
            }
            Expr::Power(p) => {
                if let Some(b) = visit(p.base, table, nodes, edges) {
                    edges.entry(order(idx, b)).or_insert(false);
                }
            }
            Expr::Negative(n) => {
                if let Some(o) = visit(n.operand, table, nodes, edges) {
                    edges.entry(order(idx, o)).or_insert(false);
                }
            }
            Expr::Literal(_) | Expr::Named(_) | Expr::Equality(_) | Expr::Define(_) => {}
        }
    }
    Some(idx)
}

fn order(a: usize, b: usize) -> (usize, usize) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

fn render_node(idx: usize, table: &SemanticTable, interner: &Interner, pinned: bool) -> String {
    let rec = table.record(idx);
    let mut label = if rec.name == Symbol::EMPTY {
        format!("@{}", idx)
    } else {
        interner.resolve(rec.name).to_string()
    };
    if let Some(dim) = &rec.dim {
        label.push(' ');
        label.push_str(&dim.to_string());
    }

    let mut attrs = vec![format!("label=\"{}\"", label)];
    if rec.dim.is_some() {
        attrs.push("color=red".to_string());
    }

    let mut style: Vec<&str> = Vec::new();
    let mut fillcolor = None;
    if pinned {
        style.push("filled");
        fillcolor = Some("cyan");
    } else if rec.name != Symbol::EMPTY {
        style.push("filled");
        fillcolor = Some("yellow");
    }
    if !rec.resolved {
        style.push("dashed");
    }
    if !style.is_empty() {
        attrs.push(format!("style=\"{}\"", style.join(",")));
    }
    if let Some(c) = fillcolor {
        attrs.push(format!("fillcolor={}", c));
    }

    format!("  {} [{}];\n", idx, attrs.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dimsolve_ast::{Binary, Define, Named, NodeId};
    use dimsolve_base::{Arena, Loc};
    use dimsolve_semantic::Origin;

    #[test]
    fn renders_one_node_per_operand_and_an_equality_edge() {
        let expr_arena: Arena<Expr> = Arena::new();
        let mut interner = Interner::new();
        let a = interner.intern("a");
        let b = interner.intern("b");

        let named_a = expr_arena.alloc(Expr::Named(Named { name: a, loc: Loc::synthetic() }));
        let named_b = expr_arena.alloc(Expr::Named(Named { name: b, loc: Loc::synthetic() }));
        let eq = expr_arena.alloc(Expr::Equality(Binary { lhs: named_a, rhs: named_b, loc: Loc::synthetic() }));

        let mut doc = Document::new();
        doc.add_equality(eq);

        let mut table = SemanticTable::new();
        table.get_or_create_named(a, Origin::Expr(NodeId::of(named_a)));
        table.get_or_create_named(b, Origin::Expr(NodeId::of(named_b)));

        let dot = render_graph(&doc, &table, &interner);
        assert!(dot.starts_with("digraph {\n"));
        assert!(dot.contains(r#"color="black:black""#));
        assert!(dot.contains("label=\"a\""));
        assert!(dot.contains("label=\"b\""));
    }

    #[test]
    fn a_pinned_define_gets_a_cyan_fill() {
        let expr_arena: Arena<Expr> = Arena::new();
        let unit_arena: Arena<dimsolve_ast::unit_expr::UnitExpr> = Arena::new();
        let mut interner = Interner::new();
        let g = interner.intern("g");
        let unit = unit_arena.alloc(dimsolve_ast::unit_expr::UnitExpr::new(&[], Loc::synthetic()));

        let define = expr_arena.alloc(Expr::Define(Define { name: g, value: 9.8, unit, loc: Loc::synthetic() }));
        let mut doc = Document::new();
        doc.add_define(define);

        let mut table = SemanticTable::new();
        table.get_or_create_named(g, Origin::Define(NodeId::of(define)));

        let dot = render_graph(&doc, &table, &interner);
        assert!(dot.contains("fillcolor=cyan"));
    }
}
