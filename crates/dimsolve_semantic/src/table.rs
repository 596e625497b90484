//! [`Exp`] records and the [`SemanticTable`] that owns them.

use std::collections::BTreeMap;
use std::collections::HashMap;

use dimsolve_ast::{Expr, NodeId};
use dimsolve_base::Symbol;
use dimsolve_dims::{Dimension, Unit};

/// Where a record's facts came from, kept only for diagnostics — never
/// consulted by the arithmetic of resolution or evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Define(NodeId),
    Specification(NodeId),
    Expr(NodeId),
}

/// One semantic record: everything known about a named quantity or an
/// anonymous intermediate expression.
///
/// `dim` and `value` are monotonic once set: a pass that would overwrite
/// either with a *different* value has found a conflict, not a refinement,
/// and must report it rather than silently overwrite.
#[derive(Debug, Clone)]
pub struct Exp {
    /// Empty for anonymous intermediates (see [`Symbol::EMPTY`]).
    pub name: Symbol,
    pub dim: Option<Dimension>,
    pub unit: Option<Unit>,
    pub unit_name: String,
    /// A way to compute this record's value has been found.
    pub resolved: bool,
    /// At most one equation may claim to have pinned this record's value.
    pub equ_processed: bool,
    /// This record is just a literal, not derived from an equation.
    pub is_literal: bool,
    pub value: f64,
    pub referenced: bool,
    pub origin: Origin,
}

impl Exp {
    fn new(name: Symbol, origin: Origin) -> Self {
        Exp {
            name,
            dim: None,
            unit: None,
            unit_name: "?".to_string(),
            resolved: false,
            equ_processed: false,
            is_literal: false,
            value: f64::NAN,
            referenced: false,
            origin,
        }
    }
}

/// The owning store of every [`Exp`] record, the unit registry, and the
/// indices used to find a record by name or by node identity.
///
/// The unit registry orders entries by name (mirroring an ordered map),
/// which is what makes `--dump-units` output deterministic.
pub struct SemanticTable {
    units: BTreeMap<String, Unit>,
    records: Vec<Exp>,
    by_node: HashMap<NodeId, usize>,
    by_name: HashMap<Symbol, usize>,
}

impl SemanticTable {
    /// Creates a table with the seven SI base units preregistered.
    pub fn new() -> Self {
        let mut table = SemanticTable {
            units: BTreeMap::new(),
            records: Vec::new(),
            by_node: HashMap::new(),
            by_name: HashMap::new(),
        };
        for (name, unit) in [
            ("m", Unit::m()),
            ("kg", Unit::kg()),
            ("s", Unit::s()),
            ("A", Unit::a()),
            ("K", Unit::k()),
            ("mol", Unit::mol()),
            ("cd", Unit::cd()),
        ] {
            table.units.insert(name.to_string(), unit);
        }
        table
    }

    /// Registers a named unit. Returns `false` (and leaves the registry
    /// unchanged) if the name is already registered — redefinition is the
    /// caller's error to report, not this table's to resolve.
    pub fn add_unit(&mut self, name: &str, unit: Unit) -> bool {
        if self.units.contains_key(name) {
            return false;
        }
        self.units.insert(name.to_string(), unit);
        true
    }

    pub fn lookup_unit(&self, name: &str) -> Option<&Unit> {
        self.units.get(name)
    }

    /// Every registered unit name, in registry order.
    pub fn unit_names(&self) -> impl Iterator<Item = (&str, &Unit)> {
        self.units.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Fetches the record for `name`, creating one bound to `origin` if it
    /// doesn't exist yet.
    pub fn get_or_create_named(&mut self, name: Symbol, origin: Origin) -> usize {
        if let Some(&idx) = self.by_name.get(&name) {
            return idx;
        }
        let idx = self.records.len();
        self.records.push(Exp::new(name, origin));
        self.by_name.insert(name, idx);
        idx
    }

    /// Fetches the anonymous record for an expression node, creating one if
    /// it doesn't exist yet.
    pub fn get_or_create_unnamed(&mut self, node: NodeId, origin: Origin) -> usize {
        if let Some(&idx) = self.by_node.get(&node) {
            return idx;
        }
        let idx = self.records.len();
        self.records.push(Exp::new(Symbol::EMPTY, origin));
        self.by_node.insert(node, idx);
        idx
    }

    pub fn try_get_named(&self, name: Symbol) -> Option<usize> {
        self.by_name.get(&name).copied()
    }

    pub fn try_get_node(&self, node: NodeId) -> Option<usize> {
        self.by_node.get(&node).copied()
    }

    pub fn record(&self, idx: usize) -> &Exp {
        &self.records[idx]
    }

    pub fn record_mut(&mut self, idx: usize) -> &mut Exp {
        &mut self.records[idx]
    }

    pub fn records(&self) -> &[Exp] {
        &self.records
    }

    /// Fetches (creating if needed) the record backing an arbitrary
    /// expression node: by name for `Named`/`Define`, by node identity for
    /// every other variant. Every later pass keys records this same way, so
    /// this is the single place that decision lives.
    pub fn record_idx_for_expr(&mut self, e: &Expr) -> usize {
        match e {
            Expr::Literal(n) => self.get_or_create_unnamed(NodeId::of(n), Origin::Expr(NodeId::of(n))),
            Expr::Named(n) => self.get_or_create_named(n.name, Origin::Expr(NodeId::of(n))),
            Expr::Equality(n) => self.get_or_create_unnamed(NodeId::of(n), Origin::Expr(NodeId::of(n))),
            Expr::Sum(n) => self.get_or_create_unnamed(NodeId::of(n), Origin::Expr(NodeId::of(n))),
            Expr::Difference(n) => self.get_or_create_unnamed(NodeId::of(n), Origin::Expr(NodeId::of(n))),
            Expr::Product(n) => self.get_or_create_unnamed(NodeId::of(n), Origin::Expr(NodeId::of(n))),
            Expr::Quotient(n) => self.get_or_create_unnamed(NodeId::of(n), Origin::Expr(NodeId::of(n))),
            Expr::Power(n) => self.get_or_create_unnamed(NodeId::of(n), Origin::Expr(NodeId::of(n))),
            Expr::Negative(n) => self.get_or_create_unnamed(NodeId::of(n), Origin::Expr(NodeId::of(n))),
            Expr::Define(n) => self.get_or_create_named(n.name, Origin::Define(NodeId::of(n))),
        }
    }

    /// Looks up the record for an expression node without creating one,
    /// mirroring [`SemanticTable::record_idx_for_expr`]'s keying rule.
    pub fn try_idx_for_expr(&self, e: &Expr) -> Option<usize> {
        match e {
            Expr::Named(n) => self.try_get_named(n.name),
            Expr::Define(n) => self.try_get_named(n.name),
            Expr::Literal(n) => self.try_get_node(NodeId::of(n)),
            Expr::Equality(n) => self.try_get_node(NodeId::of(n)),
            Expr::Sum(n) => self.try_get_node(NodeId::of(n)),
            Expr::Difference(n) => self.try_get_node(NodeId::of(n)),
            Expr::Product(n) => self.try_get_node(NodeId::of(n)),
            Expr::Quotient(n) => self.try_get_node(NodeId::of(n)),
            Expr::Power(n) => self.try_get_node(NodeId::of(n)),
            Expr::Negative(n) => self.try_get_node(NodeId::of(n)),
        }
    }

    /// Creates a record with no key in either index — used for the
    /// throwaway intermediate a conflict-tolerant evaluation pass needs to
    /// recompute a value it will only ever compare against, never look up
    /// again by name or node.
    pub fn new_anonymous(&mut self, origin: Origin) -> usize {
        let idx = self.records.len();
        self.records.push(Exp::new(Symbol::EMPTY, origin));
        idx
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Default for SemanticTable {
    fn default() -> Self {
        Self::new()
    }
}
