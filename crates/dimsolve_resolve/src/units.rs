//! The bidirectional unit resolver (§4.3): assigns a [`Dimension`] to every
//! semantic record by evaluating unit declarations and then propagating
//! through equalities and operators until a fixed point.
//!
//! Grounded in the original source's `resolve_units.cc`: unit definitions
//! first, then named quantities' unit annotations, then a pass loop that
//! alternates an upward-only first pass with downward-and-upward subsequent
//! passes, run until no pass makes progress or `iteration_limit` is hit.

use dimsolve_ast::unit_expr::UnitExpr;
use dimsolve_ast::{Binary, Define, Document, Expr, Literal, Named, Negative, NodeId, Power, UnitDef, Visitor};
use dimsolve_base::{ErrorKind, Interner, Loc, LocatedError};
use dimsolve_dims::{Dimension, Unit};
use dimsolve_semantic::{Origin, SemanticTable};

/// Upper bound on unit-resolver passes if no fixed point is reached sooner.
pub const DEFAULT_ITERATION_LIMIT: u32 = 64;

/// Evaluates a unit-expression against the registry, returning the combined
/// [`Unit`] and the pretty-printed `unit_name` string (§6's convention:
/// `*id`/`/id` for unit exponents of ±1, `*id^n`/`/id^-n` otherwise, a
/// leading `/` rewritten to `1/…`, a leading `*` stripped).
pub fn evaluate_unit_expr(
    table: &SemanticTable,
    interner: &Interner,
    expr: &UnitExpr,
    errors: &mut Vec<LocatedError>,
) -> Option<(Unit, String)> {
    let mut scale = 1.0;
    let mut dim = Dimension::dimensionless();
    let mut name = String::new();

    for term in expr.terms {
        let id = interner.resolve(term.name);
        let unit = match table.lookup_unit(id) {
            Some(u) => *u,
            None => {
                errors.push(LocatedError::of_kind(
                    ErrorKind::UnknownUnit,
                    format!("unit '{}' is not defined", id),
                    term.loc.clone(),
                ));
                return None;
            }
        };
        scale *= unit.scale.powi(term.exp);
        dim = dim * unit.dim.pow(term.exp);

        if term.exp < -1 {
            name.push('/');
            name.push_str(id);
            name.push('^');
            name.push_str(&(-term.exp).to_string());
        } else if term.exp == -1 {
            name.push('/');
            name.push_str(id);
        } else if term.exp == 1 {
            name.push('*');
            name.push_str(id);
        } else {
            name.push('*');
            name.push_str(id);
            name.push('^');
            name.push_str(&term.exp.to_string());
        }
    }

    if !name.is_empty() {
        if name.starts_with('/') {
            name = format!("1{}", name);
        } else {
            name = name[1..].to_string();
        }
    }

    Some((Unit::new(scale, dim), name))
}

fn resolve_unit_def(table: &mut SemanticTable, interner: &Interner, ud: &UnitDef, errors: &mut Vec<LocatedError>) -> bool {
    let name_str = interner.resolve(ud.name).to_string();
    let already_defined = table.lookup_unit(&name_str).is_some();

    let (unit, _) = match evaluate_unit_expr(table, interner, ud.unit, errors) {
        Some(v) => v,
        None => return false,
    };

    if already_defined {
        errors.push(LocatedError::of_kind(
            ErrorKind::DuplicateDefinition,
            format!("unit '{}' is already defined", name_str),
            ud.loc.clone(),
        ));
        return false;
    }

    let final_unit = Unit::new(unit.scale * ud.value, unit.dim);
    table.add_unit(&name_str, final_unit);
    true
}

fn resolve_named_unit(
    table: &mut SemanticTable,
    interner: &Interner,
    name: dimsolve_base::Symbol,
    unit_expr: &UnitExpr,
    origin: Origin,
    errors: &mut Vec<LocatedError>,
) -> bool {
    let (unit, unit_name) = match evaluate_unit_expr(table, interner, unit_expr, errors) {
        Some(v) => v,
        None => return false,
    };
    let idx = table.get_or_create_named(name, origin);
    let rec = table.record_mut(idx);
    rec.dim = Some(unit.dim);
    rec.unit = Some(unit);
    rec.unit_name = unit_name;
    true
}

struct UnitResolver<'a> {
    table: &'a mut SemanticTable,
    down: bool,
    progress: bool,
    errors: Vec<LocatedError>,
}

impl<'a> UnitResolver<'a> {
    fn dim_of(&mut self, e: &Expr) -> Option<Dimension> {
        let idx = self.table.record_idx_for_expr(e);
        self.table.record(idx).dim
    }

    fn assign(&mut self, idx: usize, dim: Dimension, loc: &Loc, what: &str) -> bool {
        let rec = self.table.record_mut(idx);
        match rec.dim {
            None => {
                rec.dim = Some(dim);
                self.progress = true;
                true
            }
            Some(existing) if existing == dim => true,
            Some(existing) => {
                self.errors.push(LocatedError::of_kind(
                    ErrorKind::DimensionMismatch,
                    format!("{}'s dimensionality is deduced as both {} and {}", what, existing, dim),
                    loc.clone(),
                ));
                false
            }
        }
    }

    fn assign_expr(&mut self, e: &Expr, dim: Dimension) -> bool {
        let idx = self.table.record_idx_for_expr(e);
        self.assign(idx, dim, e.loc(), e.kind())
    }

    /// `Sum`/`Difference` share the same rule: all three of lhs, rhs, and the
    /// node itself carry the same dimension; downward mode pushes the node's
    /// dimension into either child that's still unknown.
    fn additive(&mut self, n: &Binary, what: &str) -> bool {
        if !n.lhs.accept(self) || !n.rhs.accept(self) {
            return false;
        }
        let self_idx = self.table.get_or_create_unnamed(NodeId::of(n), Origin::Expr(NodeId::of(n)));
        let l = self.dim_of(n.lhs);
        let r = self.dim_of(n.rhs);

        if let (Some(ld), Some(rd)) = (l, r) {
            if ld != rd {
                self.errors.push(LocatedError::of_kind(
                    ErrorKind::DimensionMismatch,
                    format!("{}'s terms have different dimensionality: {} and {}", what, ld, rd),
                    n.loc.clone(),
                ));
                return false;
            }
        }

        let known = l.or(r);
        if let Some(dim) = known {
            if !self.assign(self_idx, dim, &n.loc, what) {
                return false;
            }
        }

        if l.is_some() && r.is_some() {
            return true;
        }
        if !self.down {
            return true;
        }
        let result = match self.table.record(self_idx).dim {
            Some(d) => d,
            None => return true,
        };
        if l.is_none() && !self.assign_expr(n.lhs, result) {
            return false;
        }
        if r.is_none() && !self.assign_expr(n.rhs, result) {
            return false;
        }
        true
    }
}

impl<'a> Visitor for UnitResolver<'a> {
    fn visit_literal(&mut self, n: &Literal) -> bool {
        let idx = self.table.get_or_create_unnamed(NodeId::of(n), Origin::Expr(NodeId::of(n)));
        match self.table.record(idx).dim {
            None => {
                self.table.record_mut(idx).dim = Some(Dimension::dimensionless());
                self.progress = true;
                true
            }
            Some(d) if d.is_dimensionless() => true,
            Some(_) => {
                self.errors.push(LocatedError::of_kind(
                    ErrorKind::DimensionMismatch,
                    "literal value's dimensionality is not unitless".to_string(),
                    n.loc.clone(),
                ));
                false
            }
        }
    }

    fn visit_named(&mut self, _n: &Named) -> bool {
        true
    }

    fn visit_equality(&mut self, n: &Binary) -> bool {
        if !n.lhs.accept(self) || !n.rhs.accept(self) {
            return false;
        }
        let l = self.dim_of(n.lhs);
        let r = self.dim_of(n.rhs);
        match (l, r) {
            (Some(ld), Some(rd)) => {
                if ld != rd {
                    self.errors.push(LocatedError::of_kind(
                        ErrorKind::DimensionMismatch,
                        format!("equality's terms have different dimensionality: {} and {}", ld, rd),
                        n.loc.clone(),
                    ));
                    false
                } else {
                    true
                }
            }
            (Some(ld), None) if self.down => self.assign_expr(n.rhs, ld),
            (None, Some(rd)) if self.down => self.assign_expr(n.lhs, rd),
            _ => true,
        }
    }

    fn visit_sum(&mut self, n: &Binary) -> bool {
        self.additive(n, "addition expression")
    }

    fn visit_difference(&mut self, n: &Binary) -> bool {
        self.additive(n, "subtraction expression")
    }

    fn visit_product(&mut self, n: &Binary) -> bool {
        if !n.lhs.accept(self) || !n.rhs.accept(self) {
            return false;
        }
        let self_idx = self.table.get_or_create_unnamed(NodeId::of(n), Origin::Expr(NodeId::of(n)));
        let l = self.dim_of(n.lhs);
        let r = self.dim_of(n.rhs);

        if let (Some(ld), Some(rd)) = (l, r) {
            return self.assign(self_idx, ld * rd, &n.loc, "multiplication expression");
        }

        let result = self.table.record(self_idx).dim;
        let result = match result {
            Some(d) => d,
            None => return true,
        };
        if !self.down {
            return true;
        }
        if r.is_none() {
            let l = l.expect("exactly one of lhs/rhs is known here");
            return self.assign_expr(n.rhs, result / l);
        }
        if l.is_none() {
            let r = r.expect("exactly one of lhs/rhs is known here");
            return self.assign_expr(n.lhs, result / r);
        }
        true
    }

    fn visit_quotient(&mut self, n: &Binary) -> bool {
        if !n.lhs.accept(self) || !n.rhs.accept(self) {
            return false;
        }
        let self_idx = self.table.get_or_create_unnamed(NodeId::of(n), Origin::Expr(NodeId::of(n)));
        let l = self.dim_of(n.lhs);
        let r = self.dim_of(n.rhs);

        if let (Some(ld), Some(rd)) = (l, r) {
            return self.assign(self_idx, ld / rd, &n.loc, "division expression");
        }

        let result = self.table.record(self_idx).dim;
        let result = match result {
            Some(d) => d,
            None => return true,
        };
        if !self.down {
            return true;
        }
        if r.is_none() {
            let l = l.expect("exactly one of lhs/rhs is known here");
            return self.assign_expr(n.rhs, l / result);
        }
        if l.is_none() {
            let r = r.expect("exactly one of lhs/rhs is known here");
            return self.assign_expr(n.lhs, r * result);
        }
        true
    }

    fn visit_power(&mut self, n: &Power) -> bool {
        if !n.base.accept(self) {
            return false;
        }
        let self_idx = self.table.get_or_create_unnamed(NodeId::of(n), Origin::Expr(NodeId::of(n)));
        let base_dim = self.dim_of(n.base);

        if let Some(bd) = base_dim {
            return self.assign(self_idx, bd.pow(n.exp), &n.loc, "exponential expression");
        }
        if !self.down {
            return true;
        }
        let result = match self.table.record(self_idx).dim {
            Some(d) => d,
            None => return true,
        };
        self.assign_expr(n.base, result.root(n.exp))
    }

    fn visit_negative(&mut self, n: &Negative) -> bool {
        if !n.operand.accept(self) {
            return false;
        }
        let self_idx = self.table.get_or_create_unnamed(NodeId::of(n), Origin::Expr(NodeId::of(n)));
        let operand_dim = self.dim_of(n.operand);

        if let Some(od) = operand_dim {
            return self.assign(self_idx, od, &n.loc, "negation expression");
        }
        if !self.down {
            return true;
        }
        let result = match self.table.record(self_idx).dim {
            Some(d) => d,
            None => return true,
        };
        self.assign_expr(n.operand, result)
    }

    fn visit_define(&mut self, _n: &Define) -> bool {
        // Defines are resolved before the pass loop starts (see `resolve_units`);
        // a `Define` never appears nested inside an equation subtree.
        true
    }
}

/// Runs unit definition registration, named-quantity unit assignment, and
/// the bidirectional fixed-point pass over every equality in `doc`.
///
/// Returns the errors gathered; an empty vector means every record that
/// could be dimensioned was, and no inconsistency was found.
pub fn resolve_units(doc: &Document, table: &mut SemanticTable, interner: &Interner, iteration_limit: u32) -> Vec<LocatedError> {
    let mut errors = Vec::new();

    for ud in &doc.unit_defs {
        resolve_unit_def(table, interner, ud, &mut errors);
    }
    if !errors.is_empty() {
        return errors;
    }

    for d in &doc.defines {
        if let Expr::Define(def) = *d {
            resolve_named_unit(table, interner, def.name, def.unit, Origin::Define(NodeId::of(def)), &mut errors);
        }
    }
    for s in &doc.specs {
        resolve_named_unit(table, interner, s.name, s.unit, Origin::Specification(NodeId::of(*s)), &mut errors);
    }
    if !errors.is_empty() {
        return errors;
    }

    let mut progress = true;
    let mut pass = 0u32;
    while pass < iteration_limit && progress {
        let down = pass > 0;
        log::debug!("pass {}: {}", pass, if down { "down" } else { "up" });
        let mut resolver = UnitResolver {
            table,
            down,
            progress: pass <= 1,
            errors: Vec::new(),
        };
        for e in &doc.equalities {
            e.accept(&mut resolver);
        }
        progress = resolver.progress;
        errors.extend(resolver.errors);
        if !errors.is_empty() {
            return errors;
        }
        pass += 1;
    }
    log::debug!("unit resolution done after {} passes", pass);

    errors
}
