//! The end-to-end pipeline (§4.8): parse, validate, resolve units,
//! evaluate, then hand off to `dimsolve_render` for whichever optional
//! sinks `Options` configured.
//!
//! Each stage's errors short-circuit the rest, matching §7's propagation
//! policy: "the pass returns false on any error; the driver aborts the
//! remaining passes."

use std::collections::HashMap;

use dimsolve_ast::unit_expr::{UnitExpr, UnitTerm};
use dimsolve_ast::{Binary, Define, Document, Expr, Literal, Named, Negative, Power, Specification, UnitDef, Visitor};
use dimsolve_base::{Arena, Interner, Loc, LocatedError, Symbol};
use dimsolve_dims::{Dimension, Unit};
use dimsolve_eval::evaluate_with_ops;
use dimsolve_render::{render_codelist, render_graph};
use dimsolve_resolve::{resolve_units, validate};
use dimsolve_semantic::SemanticTable;

use crate::options::Options;
use crate::preamble;

/// One record's final state, in the shape a caller prints: its name, its
/// resolved dimension and unit-name (if any), and its value.
#[derive(Debug, Clone)]
pub struct ResolvedRecord {
    pub name: String,
    pub value: f64,
    pub dim: Option<Dimension>,
    pub unit_name: String,
    pub loc: Loc,
}

/// Everything a driver produced from one successful run.
pub struct RunOutcome {
    /// Named, non-preamble records, in location order.
    pub records: Vec<ResolvedRecord>,
    pub warnings: Vec<LocatedError>,
    /// Present only when `Options::dump_units` is set.
    pub unit_dump: Option<Vec<(String, Unit)>>,
    /// Present only when `Options::graphviz_output` is set.
    pub graphviz: Option<String>,
    /// Present only when `Options::code_output` is set.
    pub codelist: Option<String>,
}

/// Runs the full pipeline for `options`, returning every diagnostic
/// gathered on failure (§6 "Exit": callers should treat a non-empty `Err`
/// as a nonzero exit).
pub fn run(options: &Options) -> Result<RunOutcome, Vec<LocatedError>> {
    let source = std::fs::read_to_string(&options.src).map_err(|e| {
        vec![LocatedError::new(format!("failed to read '{}': {}", options.src.display(), e), Loc::synthetic())]
    })?;

    let preamble_arenas = preamble::PreambleArenas::new();
    let mut interner = Interner::new();
    let preamble_doc = preamble::parse(&preamble_arenas, &mut interner)
        .expect("the built-in preamble always parses without error");

    let expr_arena: Arena<Expr> = Arena::new();
    let term_arena: Arena<UnitTerm> = Arena::new();
    let unit_arena: Arena<UnitExpr> = Arena::new();
    let unit_def_arena: Arena<UnitDef> = Arena::new();
    let spec_arena: Arena<Specification> = Arena::new();

    let file_name = options.src.to_string_lossy().into_owned();
    let user_doc = dimsolve_parse::parse(
        &source,
        file_name,
        &mut interner,
        &expr_arena,
        &term_arena,
        &unit_arena,
        &unit_def_arena,
        &spec_arena,
    )?;

    let doc = user_doc.prepend(preamble_doc);

    let mut table = SemanticTable::new();
    let validation = validate(&doc, &mut table, &interner, options.warnings_as_errors);
    if !validation.errors.is_empty() {
        return Err(validation.errors);
    }

    let unit_errors = resolve_units(&doc, &mut table, &interner, options.iteration_limit);
    if !unit_errors.is_empty() {
        return Err(unit_errors);
    }

    let (eval_errors, ops) =
        evaluate_with_ops(&doc, &mut table, options.iteration_limit, dimsolve_eval::DEFAULT_TOLERANCE);
    if !eval_errors.is_empty() {
        return Err(eval_errors);
    }

    let locs = first_occurrence_locs(&doc);
    let records = collect_records(&table, &interner, &locs);

    let unit_dump = options.dump_units.then(|| {
        table.unit_names().map(|(name, unit)| (name.to_string(), *unit)).collect()
    });

    let graphviz = options.graphviz_output.is_some().then(|| render_graph(&doc, &table, &interner));
    let codelist = options.code_output.is_some().then(|| render_codelist(&ops, &table, &interner));

    Ok(RunOutcome { records, warnings: validation.warnings, unit_dump, graphviz, codelist })
}

/// Named, non-preamble records in `(location, identity)` order, matching
/// §5's determinism requirement.
fn collect_records(
    table: &SemanticTable,
    interner: &Interner,
    locs: &HashMap<Symbol, Loc>,
) -> Vec<ResolvedRecord> {
    let mut records: Vec<ResolvedRecord> = table
        .records()
        .iter()
        .filter(|rec| rec.name != Symbol::EMPTY)
        .filter_map(|rec| {
            let loc = locs.get(&rec.name)?;
            if loc.is_preamble() {
                return None;
            }
            Some(ResolvedRecord {
                name: interner.resolve(rec.name).to_string(),
                value: rec.value,
                dim: rec.dim,
                unit_name: rec.unit_name.clone(),
                loc: loc.clone(),
            })
        })
        .collect();
    records.sort_by_key(|rec| rec.loc.sort_key());
    records
}

/// Tracks each name's first-seen `Loc`, the same approach
/// `dimsolve_resolve::validate` uses internally — `Origin` only carries a
/// `NodeId`, so recovering a record's source location means walking the
/// tree once more rather than reading it off the record itself.
struct FirstOccurrence {
    locs: HashMap<Symbol, Loc>,
}

impl FirstOccurrence {
    fn visit_binary(&mut self, n: &Binary) -> bool {
        let lhs_ok = n.lhs.accept(self);
        let rhs_ok = n.rhs.accept(self);
        lhs_ok && rhs_ok
    }
}

impl Visitor for FirstOccurrence {
    fn visit_literal(&mut self, _n: &Literal) -> bool {
        true
    }

    fn visit_named(&mut self, n: &Named) -> bool {
        self.locs.entry(n.name).or_insert_with(|| n.loc.clone());
        true
    }

    fn visit_equality(&mut self, n: &Binary) -> bool {
        self.visit_binary(n)
    }
    fn visit_sum(&mut self, n: &Binary) -> bool {
        self.visit_binary(n)
    }
    fn visit_difference(&mut self, n: &Binary) -> bool {
        self.visit_binary(n)
    }
    fn visit_product(&mut self, n: &Binary) -> bool {
        self.visit_binary(n)
    }
    fn visit_quotient(&mut self, n: &Binary) -> bool {
        self.visit_binary(n)
    }

    fn visit_power(&mut self, n: &Power) -> bool {
        n.base.accept(self)
    }

    fn visit_negative(&mut self, n: &Negative) -> bool {
        n.operand.accept(self)
    }

    fn visit_define(&mut self, n: &Define) -> bool {
        self.locs.entry(n.name).or_insert_with(|| n.loc.clone());
        true
    }
}

/// Walks every equality and define in `doc`, recording each name's
/// first-seen `Loc` in document order.
fn first_occurrence_locs(doc: &Document) -> HashMap<Symbol, Loc> {
    let mut v = FirstOccurrence { locs: HashMap::new() };
    for e in &doc.defines {
        e.accept(&mut v);
    }
    for e in &doc.equalities {
        e.accept(&mut v);
    }
    v.locs
}
