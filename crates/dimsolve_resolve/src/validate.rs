//! Validation (§4.2): builds the semantic table and diagnoses structural
//! errors — duplicate definitions, a `Specification` colliding with a
//! `Define`, and definitions that are never referenced.
//!
//! Grounded in the original source's `validate.cc`: one record per `Define`
//! and per `Specification` (duplicates compared by the *location* of the
//! first binding, not by node identity, since a second pass over the same
//! tree revisits the same nodes), one anonymous record per other node, and
//! a final unused-definition sweep that skips preamble-origin definitions.

use std::collections::HashMap;

use dimsolve_ast::{Binary, Define, Document, Literal, Named, Negative, NodeId, Power, Specification, Visitor};
use dimsolve_base::Symbol;
use dimsolve_base::{ErrorKind, Interner, Loc, LocatedError};
use dimsolve_semantic::{Origin, SemanticTable};

/// Errors and warnings collected by a single [`validate`] run.
pub struct ValidationOutcome {
    pub errors: Vec<LocatedError>,
    pub warnings: Vec<LocatedError>,
}

impl ValidationOutcome {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

struct Validate<'a> {
    table: &'a mut SemanticTable,
    interner: &'a Interner,
    defines: HashMap<Symbol, Loc>,
    specs: HashMap<Symbol, Loc>,
    errors: Vec<LocatedError>,
}

impl<'a> Validate<'a> {
    fn process_spec(&mut self, s: &Specification) {
        if let Some(def_loc) = self.defines.get(&s.name) {
            self.errors.push(LocatedError::of_kind(
                ErrorKind::DuplicateDefinition,
                format!(
                    "'{}' is already defined at {}",
                    self.interner.resolve(s.name),
                    def_loc
                ),
                s.loc.clone(),
            ));
            return;
        }
        if let Some(prior) = self.specs.get(&s.name) {
            self.errors.push(LocatedError::of_kind(
                ErrorKind::DuplicateDefinition,
                format!(
                    "'{}' already has a spec at {}",
                    self.interner.resolve(s.name),
                    prior
                ),
                s.loc.clone(),
            ));
            return;
        }
        self.specs.insert(s.name, s.loc.clone());
        self.table.get_or_create_named(s.name, Origin::Specification(NodeId::of(s)));
    }

    fn unused_definition_warnings(&self, warnings_as_errors: bool) -> (Vec<LocatedError>, Vec<LocatedError>) {
        let mut unused: Vec<(Symbol, Loc)> = self
            .defines
            .iter()
            .filter(|(_, loc)| !loc.is_preamble())
            .filter_map(|(&name, loc)| {
                let idx = self.table.try_get_named(name)?;
                if self.table.record(idx).referenced {
                    None
                } else {
                    Some((name, loc.clone()))
                }
            })
            .collect();
        unused.sort_by_key(|(_, loc)| loc.sort_key());

        let mut warnings = Vec::new();
        let mut promoted = Vec::new();
        for (name, loc) in unused {
            let warning = LocatedError::of_kind(
                ErrorKind::UnusedDefinition,
                format!("'{}' is defined but never used", self.interner.resolve(name)),
                loc,
            );
            if warnings_as_errors {
                promoted.push(warning);
            } else {
                warnings.push(warning);
            }
        }
        (warnings, promoted)
    }
}

impl<'a> Visitor for Validate<'a> {
    fn visit_literal(&mut self, n: &Literal) -> bool {
        self.table.get_or_create_unnamed(NodeId::of(n), Origin::Expr(NodeId::of(n)));
        true
    }

    fn visit_named(&mut self, n: &Named) -> bool {
        let idx = self.table.get_or_create_named(n.name, Origin::Expr(NodeId::of(n)));
        self.table.record_mut(idx).referenced = true;
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
        let id = NodeId::of(n);
        self.table.get_or_create_unnamed(id, Origin::Expr(id));
        n.base.accept(self)
    }

    fn visit_negative(&mut self, n: &Negative) -> bool {
        let id = NodeId::of(n);
        self.table.get_or_create_unnamed(id, Origin::Expr(id));
        n.operand.accept(self)
    }

    fn visit_define(&mut self, n: &Define) -> bool {
        if let Some(prior_loc) = self.defines.get(&n.name) {
            if *prior_loc != n.loc {
                self.errors.push(LocatedError::of_kind(
                    ErrorKind::DuplicateDefinition,
                    format!(
                        "'{}' is already defined at {}",
                        self.interner.resolve(n.name),
                        prior_loc
                    ),
                    n.loc.clone(),
                ));
                return false;
            }
            return true;
        }
        self.defines.insert(n.name, n.loc.clone());
        self.table.get_or_create_named(n.name, Origin::Define(NodeId::of(n)));
        true
    }
}

impl<'a> Validate<'a> {
    fn visit_binary(&mut self, n: &Binary) -> bool {
        let id = NodeId::of(n);
        self.table.get_or_create_unnamed(id, Origin::Expr(id));
        let lhs_ok = n.lhs.accept(self);
        let rhs_ok = n.rhs.accept(self);
        lhs_ok && rhs_ok
    }
}

/// Runs the validation pass over `doc`, populating `table` with one record
/// per name and one anonymous record per other expression node.
///
/// Errors abort the whole pass after every diagnostic gathered so far is
/// collected; warnings are reported separately unless `warnings_as_errors`
/// promotes them into the error list.
pub fn validate(
    doc: &Document,
    table: &mut SemanticTable,
    interner: &Interner,
    warnings_as_errors: bool,
) -> ValidationOutcome {
    let mut v = Validate {
        table,
        interner,
        defines: HashMap::new(),
        specs: HashMap::new(),
        errors: Vec::new(),
    };

    for d in &doc.defines {
        d.accept(&mut v);
    }
    for s in &doc.specs {
        v.process_spec(s);
    }
    for e in &doc.equalities {
        e.accept(&mut v);
    }

    let (warnings, promoted) = v.unused_definition_warnings(warnings_as_errors);
    let mut errors = v.errors;
    errors.extend(promoted);

    ValidationOutcome { errors, warnings }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dimsolve_ast::unit_expr::UnitExpr;
    use dimsolve_ast::Expr as AstExpr;
    use dimsolve_base::{Arena as BaseArena, Loc};

    fn dummy_unit<'a>(arena: &'a BaseArena<UnitExpr<'a>>) -> &'a UnitExpr<'a> {
        arena.alloc(UnitExpr::new(&[], Loc::synthetic()))
    }

    #[test]
    fn define_creates_a_named_record() {
        let expr_arena: BaseArena<AstExpr> = BaseArena::new();
        let unit_arena: BaseArena<UnitExpr> = BaseArena::new();
        let mut interner = Interner::new();
        let mass = interner.intern("mass");
        let unit = dummy_unit(&unit_arena);
        let define = expr_arena.alloc(AstExpr::Define(Define {
            name: mass,
            value: 2.0,
            unit,
            loc: Loc::point("spring.dim", 1, 1),
        }));
        let mut doc = Document::new();
        doc.add_define(define);

        let mut table = SemanticTable::new();
        let outcome = validate(&doc, &mut table, &interner, false);
        assert!(outcome.is_ok());
        assert!(table.try_get_named(mass).is_some());
    }

    #[test]
    fn duplicate_define_is_an_error() {
        let expr_arena: BaseArena<AstExpr> = BaseArena::new();
        let unit_arena: BaseArena<UnitExpr> = BaseArena::new();
        let mut interner = Interner::new();
        let mass = interner.intern("mass");
        let unit = dummy_unit(&unit_arena);
        let first = expr_arena.alloc(AstExpr::Define(Define {
            name: mass,
            value: 2.0,
            unit,
            loc: Loc::point("spring.dim", 1, 1),
        }));
        let second = expr_arena.alloc(AstExpr::Define(Define {
            name: mass,
            value: 3.0,
            unit,
            loc: Loc::point("spring.dim", 2, 1),
        }));
        let mut doc = Document::new();
        doc.add_define(first);
        doc.add_define(second);

        let mut table = SemanticTable::new();
        let outcome = validate(&doc, &mut table, &interner, false);
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].kind, ErrorKind::DuplicateDefinition);
    }

    #[test]
    fn spec_colliding_with_define_is_an_error() {
        let expr_arena: BaseArena<AstExpr> = BaseArena::new();
        let unit_arena: BaseArena<UnitExpr> = BaseArena::new();
        let spec_arena: BaseArena<Specification> = BaseArena::new();
        let mut interner = Interner::new();
        let mass = interner.intern("mass");
        let unit = dummy_unit(&unit_arena);
        let define = expr_arena.alloc(AstExpr::Define(Define {
            name: mass,
            value: 2.0,
            unit,
            loc: Loc::point("spring.dim", 1, 1),
        }));
        let spec = spec_arena.alloc(Specification {
            name: mass,
            unit,
            loc: Loc::point("spring.dim", 2, 1),
        });
        let mut doc = Document::new();
        doc.add_define(define);
        doc.add_spec(spec);

        let mut table = SemanticTable::new();
        let outcome = validate(&doc, &mut table, &interner, false);
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].kind, ErrorKind::DuplicateDefinition);
    }

    #[test]
    fn unreferenced_define_outside_the_preamble_warns() {
        let expr_arena: BaseArena<AstExpr> = BaseArena::new();
        let unit_arena: BaseArena<UnitExpr> = BaseArena::new();
        let mut interner = Interner::new();
        let mass = interner.intern("mass");
        let unit = dummy_unit(&unit_arena);
        let define = expr_arena.alloc(AstExpr::Define(Define {
            name: mass,
            value: 2.0,
            unit,
            loc: Loc::point("spring.dim", 1, 1),
        }));
        let mut doc = Document::new();
        doc.add_define(define);

        let mut table = SemanticTable::new();
        let outcome = validate(&doc, &mut table, &interner, false);
        assert!(outcome.is_ok());
        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(outcome.warnings[0].kind, ErrorKind::UnusedDefinition);
    }

    #[test]
    fn warnings_as_errors_promotes_unused_definitions() {
        let expr_arena: BaseArena<AstExpr> = BaseArena::new();
        let unit_arena: BaseArena<UnitExpr> = BaseArena::new();
        let mut interner = Interner::new();
        let mass = interner.intern("mass");
        let unit = dummy_unit(&unit_arena);
        let define = expr_arena.alloc(AstExpr::Define(Define {
            name: mass,
            value: 2.0,
            unit,
            loc: Loc::point("spring.dim", 1, 1),
        }));
        let mut doc = Document::new();
        doc.add_define(define);

        let mut table = SemanticTable::new();
        let outcome = validate(&doc, &mut table, &interner, true);
        assert!(!outcome.is_ok());
        assert!(outcome.warnings.is_empty());
        assert_eq!(outcome.errors[0].kind, ErrorKind::UnusedDefinition);
    }

    #[test]
    fn preamble_defines_never_warn_even_if_unused() {
        let expr_arena: BaseArena<AstExpr> = BaseArena::new();
        let unit_arena: BaseArena<UnitExpr> = BaseArena::new();
        let mut interner = Interner::new();
        let newton = interner.intern("N");
        let unit = dummy_unit(&unit_arena);
        let define = expr_arena.alloc(AstExpr::Define(Define {
            name: newton,
            value: 1.0,
            unit,
            loc: Loc::synthetic(),
        }));
        let mut doc = Document::new();
        doc.add_define(define);

        let mut table = SemanticTable::new();
        let outcome = validate(&doc, &mut table, &interner, false);
        assert!(outcome.is_ok());
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn named_reference_marks_the_record_referenced() {
        let expr_arena: BaseArena<AstExpr> = BaseArena::new();
        let unit_arena: BaseArena<UnitExpr> = BaseArena::new();
        let mut interner = Interner::new();
        let mass = interner.intern("mass");
        let unit = dummy_unit(&unit_arena);
        let define = expr_arena.alloc(AstExpr::Define(Define {
            name: mass,
            value: 2.0,
            unit,
            loc: Loc::point("spring.dim", 1, 1),
        }));
        let named = expr_arena.alloc(AstExpr::Named(Named { name: mass, loc: Loc::point("spring.dim", 2, 1) }));
        let lit = expr_arena.alloc(AstExpr::Literal(Literal { value: 1.0, loc: Loc::synthetic() }));
        let eq = expr_arena.alloc(AstExpr::Equality(Binary { lhs: named, rhs: lit, loc: Loc::point("spring.dim", 2, 1) }));
        let mut doc = Document::new();
        doc.add_define(define);
        doc.add_equality(eq);

        let mut table = SemanticTable::new();
        let outcome = validate(&doc, &mut table, &interner, false);
        assert!(outcome.is_ok());
        assert!(outcome.warnings.is_empty());
        let idx = table.try_get_named(mass).unwrap();
        assert!(table.record(idx).referenced);
    }
}
