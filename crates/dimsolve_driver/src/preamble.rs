//! The built-in preamble (§3.1, §6): a handful of SI-derived units parsed
//! under the sentinel preamble filename before the user's own source, so
//! `resolve_units` sees `newton`/`pascal`/etc. as ordinary prior `unit`
//! statements rather than as special cases wired into the resolver.
//!
//! `unit_defs` are resolved in document order (`dimsolve_resolve::units`),
//! so later lines here may build on units an earlier line in this same
//! preamble introduced.

use dimsolve_ast::unit_expr::{UnitExpr, UnitTerm};
use dimsolve_ast::{Document, Expr, Specification, UnitDef};
use dimsolve_base::{Arena, Interner, Loc, LocatedError};

pub const SOURCE: &str = "\
unit N = 1 [kg*m/s^2];
unit Pa = 1 [N/m^2];
unit J = 1 [N*m];
unit W = 1 [J/s];
unit Hz = 1 [s^-1];
unit C = 1 [A*s];
unit V = 1 [W/A];
unit ohm = 1 [V/A];
";

/// Arenas backing the preamble's nodes, kept alive alongside the user
/// document's own arenas for the lifetime of one pipeline run.
pub struct PreambleArenas<'a> {
    pub expr: Arena<Expr<'a>>,
    pub term: Arena<UnitTerm>,
    pub unit: Arena<UnitExpr<'a>>,
    pub unit_def: Arena<UnitDef<'a>>,
    pub spec: Arena<Specification<'a>>,
}

impl<'a> PreambleArenas<'a> {
    pub fn new() -> Self {
        PreambleArenas {
            expr: Arena::new(),
            term: Arena::new(),
            unit: Arena::new(),
            unit_def: Arena::new(),
            spec: Arena::new(),
        }
    }
}

impl<'a> Default for PreambleArenas<'a> {
    fn default() -> Self {
        Self::new()
    }
}

/// Parses the built-in preamble against its own arenas.
///
/// A parse failure here is a bug in this crate, not in any user input —
/// callers should treat a non-empty result as fatal.
pub fn parse<'a>(arenas: &'a PreambleArenas<'a>, interner: &mut Interner) -> Result<Document<'a>, Vec<LocatedError>> {
    dimsolve_parse::parse(
        SOURCE,
        Loc::synthetic().file,
        interner,
        &arenas.expr,
        &arenas.term,
        &arenas.unit,
        &arenas.unit_def,
        &arenas.spec,
    )
}
