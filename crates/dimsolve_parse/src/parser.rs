//! Recursive-descent statement parser plus a small Pratt-style expression
//! parser, turning a token stream into a `dimsolve_ast::Document` (§3.1).
//!
//! Grounded on the teacher's descent-style `parser/` module (one parse
//! method per syntactic category, each taking `&mut self` and returning a
//! `Result`) rather than a table-driven or combinator approach — this
//! grammar is small enough that hand-written descent reads more directly
//! than either.

use std::rc::Rc;

use dimsolve_ast::{
    unit_expr::{UnitExpr, UnitTerm},
    Binary, Define, Document, Expr, Literal, Named, Negative, Power, Specification, UnitDef,
};
use dimsolve_base::{Arena, ErrorKind, Interner, Loc, LocatedError};

use crate::lexer::Lexer;
use crate::token::{Token, TokenKind};

/// Parses `source` into a `Document`, arena-allocating every node from the
/// arenas the caller owns — one per node type, the same split
/// `dimsolve_ast`'s own tests use to build documents by hand.
///
/// Returns every diagnostic gathered; a non-empty `Err` means at least one
/// statement failed to parse, though the parser keeps going past a bad
/// statement (resynchronizing on the next `;`) to report as many as it can
/// in one pass, matching §4.2's "emit all diagnostics before aborting"
/// policy for the passes downstream of this one.
#[allow(clippy::too_many_arguments)]
pub fn parse<'a>(
    source: &str,
    file: impl Into<Rc<str>>,
    interner: &mut Interner,
    expr_arena: &'a Arena<Expr<'a>>,
    term_arena: &'a Arena<UnitTerm>,
    unit_arena: &'a Arena<UnitExpr<'a>>,
    unit_def_arena: &'a Arena<UnitDef<'a>>,
    spec_arena: &'a Arena<Specification<'a>>,
) -> Result<Document<'a>, Vec<LocatedError>> {
    let file = file.into();
    let tokens = Lexer::new(source, file).tokenize(interner).map_err(|e| vec![e])?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        expr_arena,
        term_arena,
        unit_arena,
        unit_def_arena,
        spec_arena,
        errors: Vec::new(),
    };
    let doc = parser.parse_document();
    if parser.errors.is_empty() {
        Ok(doc)
    } else {
        Err(parser.errors)
    }
}

struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    expr_arena: &'a Arena<Expr<'a>>,
    term_arena: &'a Arena<UnitTerm>,
    unit_arena: &'a Arena<UnitExpr<'a>>,
    unit_def_arena: &'a Arena<UnitDef<'a>>,
    spec_arena: &'a Arena<Specification<'a>>,
    errors: Vec<LocatedError>,
}

type PResult<T> = Result<T, LocatedError>;

impl<'a> Parser<'a> {
    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn at_eof(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Eof)
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> PResult<Token> {
        if self.peek().kind == kind {
            Ok(self.advance())
        } else {
            Err(LocatedError::of_kind(
                ErrorKind::Parse,
                format!("expected {} but found {}", what, self.peek().describe()),
                self.peek().loc.clone(),
            ))
        }
    }

    fn expect_ident(&mut self) -> PResult<(dimsolve_base::Symbol, Loc)> {
        match self.peek().kind {
            TokenKind::Ident(sym) => {
                let loc = self.peek().loc.clone();
                self.advance();
                Ok((sym, loc))
            }
            _ => Err(LocatedError::of_kind(
                ErrorKind::Parse,
                format!("expected identifier but found {}", self.peek().describe()),
                self.peek().loc.clone(),
            )),
        }
    }

    /// Skips tokens until just past the next `;` (or EOF), so one bad
    /// statement doesn't prevent parsing the rest of the document.
    fn synchronize(&mut self) {
        loop {
            match self.peek().kind {
                TokenKind::Semicolon => {
                    self.advance();
                    return;
                }
                TokenKind::Eof => return,
                _ => {
                    self.advance();
                }
            }
        }
    }

    fn parse_document(&mut self) -> Document<'a> {
        let mut doc = Document::new();
        while !self.at_eof() {
            match self.parse_statement() {
                Ok(Stmt::UnitDef(u)) => doc.add_unit_def(self.unit_def_arena.alloc(u)),
                Ok(Stmt::Define(d)) => doc.add_define(self.expr_arena.alloc(Expr::Define(d))),
                Ok(Stmt::Spec(s)) => doc.add_spec(self.spec_arena.alloc(s)),
                Ok(Stmt::Equality(lhs, rhs, loc)) => {
                    let eq = self.expr_arena.alloc(Expr::Equality(Binary { lhs, rhs, loc }));
                    doc.add_equality(eq);
                }
                Err(e) => {
                    log::warn!("{}; resynchronizing at next ';'", e);
                    self.errors.push(e);
                    self.synchronize();
                }
            }
        }
        doc
    }

    fn parse_statement(&mut self) -> PResult<Stmt<'a>> {
        match self.peek().kind {
            TokenKind::KwUnit => self.parse_unit_def(),
            TokenKind::KwDefine => self.parse_define(),
            TokenKind::KwSpec => self.parse_spec(),
            _ => self.parse_equality_statement(),
        }
    }

    fn parse_unit_def(&mut self) -> PResult<Stmt<'a>> {
        let start = self.peek().loc.clone();
        self.advance();
        let (name, _) = self.expect_ident()?;
        self.expect(TokenKind::Equal, "'='")?;
        let value = self.parse_number_literal()?;
        let unit = self.parse_optional_unit_expr()?;
        let end = self.expect(TokenKind::Semicolon, "';'")?.loc;
        Ok(Stmt::UnitDef(UnitDef { name, value, unit, loc: start.join(&end) }))
    }

    fn parse_define(&mut self) -> PResult<Stmt<'a>> {
        let start = self.peek().loc.clone();
        self.advance();
        let (name, _) = self.expect_ident()?;
        self.expect(TokenKind::Equal, "'='")?;
        let value = self.parse_number_literal()?;
        let unit = self.parse_optional_unit_expr()?;
        let end = self.expect(TokenKind::Semicolon, "';'")?.loc;
        Ok(Stmt::Define(Define { name, value, unit, loc: start.join(&end) }))
    }

    fn parse_spec(&mut self) -> PResult<Stmt<'a>> {
        let start = self.peek().loc.clone();
        self.advance();
        let (name, _) = self.expect_ident()?;
        self.expect(TokenKind::Colon, "':'")?;
        let unit = self.parse_unit_expr()?;
        let end = self.expect(TokenKind::Semicolon, "';'")?.loc;
        Ok(Stmt::Spec(Specification { name, unit, loc: start.join(&end) }))
    }

    fn parse_equality_statement(&mut self) -> PResult<Stmt<'a>> {
        let lhs = self.parse_expr()?;
        self.expect(TokenKind::EqEq, "'=='")?;
        let rhs = self.parse_expr()?;
        let end = self.expect(TokenKind::Semicolon, "';'")?.loc;
        let loc = lhs.loc().join(&end);
        Ok(Stmt::Equality(lhs, rhs, loc))
    }

    fn parse_number_literal(&mut self) -> PResult<f64> {
        let negative = if self.peek().kind == TokenKind::Minus {
            self.advance();
            true
        } else {
            false
        };
        match self.peek().kind {
            TokenKind::Number(v) => {
                self.advance();
                Ok(if negative { -v } else { v })
            }
            _ => Err(LocatedError::of_kind(
                ErrorKind::Parse,
                format!("expected a numeric literal but found {}", self.peek().describe()),
                self.peek().loc.clone(),
            )),
        }
    }

    /// `[<unit-expr>]`, or a dimensionless unit when the brackets are absent
    /// — the bracketed annotation on `unit`/`define` statements is optional.
    fn parse_optional_unit_expr(&mut self) -> PResult<&'a UnitExpr<'a>> {
        if self.peek().kind == TokenKind::LBracket {
            self.parse_unit_expr()
        } else {
            Ok(self.unit_arena.alloc(UnitExpr::new(&[], Loc::synthetic())))
        }
    }

    /// `[<id> (<int>)? (('*' | '/') <id> (<int>)?)*]` — a multiplicative list
    /// of unit factors (§3.1). `*` joins factors as-is; `/` joins a factor
    /// with its exponent negated, so `a/b` and `a*b^-1` produce the same
    /// term list — there is no separate division node (cf. the original's
    /// `UnitExp::Mul`/`UnitExp::Div`, folded here into a signed exponent).
    fn parse_unit_expr(&mut self) -> PResult<&'a UnitExpr<'a>> {
        let start = self.expect(TokenKind::LBracket, "'['")?.loc;
        let mut terms = Vec::new();
        let mut negate = false;
        loop {
            let (name, loc) = self.expect_ident()?;
            let exp = if self.peek().kind == TokenKind::Caret {
                self.advance();
                self.parse_exponent()?
            } else {
                1
            };
            terms.push(UnitTerm { name, exp: if negate { -exp } else { exp }, loc });

            negate = match self.peek().kind {
                TokenKind::Star => {
                    self.advance();
                    false
                }
                TokenKind::Slash => {
                    self.advance();
                    true
                }
                _ => break,
            };
        }
        let end = self.expect(TokenKind::RBracket, "']'")?.loc;
        let terms = self.term_arena.alloc_slice(terms);
        Ok(self.unit_arena.alloc(UnitExpr::new(terms, start.join(&end))))
    }

    fn parse_exponent(&mut self) -> PResult<i32> {
        let negative = if self.peek().kind == TokenKind::Minus {
            self.advance();
            true
        } else {
            false
        };
        match self.peek().kind {
            TokenKind::Number(v) if v.fract() == 0.0 => {
                self.advance();
                Ok(if negative { -(v as i32) } else { v as i32 })
            }
            _ => Err(LocatedError::of_kind(
                ErrorKind::Parse,
                format!("expected an integer exponent but found {}", self.peek().describe()),
                self.peek().loc.clone(),
            )),
        }
    }

    // --- Expressions, tightest to loosest: `^`, unary `-`, `* /`, `+ -`. ---

    fn parse_expr(&mut self) -> PResult<&'a Expr<'a>> {
        self.parse_additive()
    }

    fn parse_additive(&mut self) -> PResult<&'a Expr<'a>> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            let variant = match self.peek().kind {
                TokenKind::Plus => false,
                TokenKind::Minus => true,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_multiplicative()?;
            let loc = lhs.loc().join(rhs.loc());
            let binary = Binary { lhs, rhs, loc };
            lhs = self.expr_arena.alloc(if variant { Expr::Difference(binary) } else { Expr::Sum(binary) });
        }
        Ok(lhs)
    }

    fn parse_multiplicative(&mut self) -> PResult<&'a Expr<'a>> {
        let mut lhs = self.parse_unary()?;
        loop {
            let variant = match self.peek().kind {
                TokenKind::Star => false,
                TokenKind::Slash => true,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_unary()?;
            let loc = lhs.loc().join(rhs.loc());
            let binary = Binary { lhs, rhs, loc };
            lhs = self.expr_arena.alloc(if variant { Expr::Quotient(binary) } else { Expr::Product(binary) });
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> PResult<&'a Expr<'a>> {
        if self.peek().kind == TokenKind::Minus {
            let start = self.advance().loc;
            let operand = self.parse_unary()?;
            let loc = start.join(operand.loc());
            return Ok(self.expr_arena.alloc(Expr::Negative(Negative { operand, loc })));
        }
        self.parse_power()
    }

    fn parse_power(&mut self) -> PResult<&'a Expr<'a>> {
        let base = self.parse_primary()?;
        if self.peek().kind == TokenKind::Caret {
            self.advance();
            let exp = self.parse_exponent()?;
            let loc = base.loc().clone();
            return Ok(self.expr_arena.alloc(Expr::Power(Power { base, exp, loc })));
        }
        Ok(base)
    }

    fn parse_primary(&mut self) -> PResult<&'a Expr<'a>> {
        match self.peek().kind {
            TokenKind::Number(v) => {
                let loc = self.advance().loc;
                Ok(self.expr_arena.alloc(Expr::Literal(Literal { value: v, loc })))
            }
            TokenKind::Ident(name) => {
                let loc = self.advance().loc;
                Ok(self.expr_arena.alloc(Expr::Named(Named { name, loc })))
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect(TokenKind::RParen, "')'")?;
                Ok(inner)
            }
            _ => Err(LocatedError::of_kind(
                ErrorKind::Parse,
                format!("expected an expression but found {}", self.peek().describe()),
                self.peek().loc.clone(),
            )),
        }
    }
}

enum Stmt<'a> {
    UnitDef(UnitDef<'a>),
    Define(Define<'a>),
    Spec(Specification<'a>),
    Equality(&'a Expr<'a>, &'a Expr<'a>, Loc),
}

#[cfg(test)]
mod tests {
    use super::*;
    use dimsolve_base::SymbolEq;

    #[test]
    fn parses_a_define_with_unit_expression() {
        let expr_arena: Arena<Expr> = Arena::new();
        let term_arena: Arena<UnitTerm> = Arena::new();
        let unit_arena: Arena<UnitExpr> = Arena::new();
        let unit_def_arena: Arena<UnitDef> = Arena::new();
        let spec_arena: Arena<Specification> = Arena::new();
        let mut interner = Interner::new();
        let doc = parse(
            "define g = 9.8 [m/s^2];",
            "t.dim",
            &mut interner,
            &expr_arena,
            &term_arena,
            &unit_arena,
            &unit_def_arena,
            &spec_arena,
        )
        .unwrap();
        assert_eq!(doc.defines.len(), 1);
        match doc.defines[0] {
            Expr::Define(d) => {
                assert!(d.name.is(&interner, "g"));
                assert_eq!(d.value, 9.8);
                assert_eq!(d.unit.terms.len(), 2);
                assert_eq!(d.unit.terms[0].exp, 1);
                assert_eq!(d.unit.terms[1].exp, -2);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn parses_a_unit_def_and_a_spec() {
        let expr_arena: Arena<Expr> = Arena::new();
        let term_arena: Arena<UnitTerm> = Arena::new();
        let unit_arena: Arena<UnitExpr> = Arena::new();
        let unit_def_arena: Arena<UnitDef> = Arena::new();
        let spec_arena: Arena<Specification> = Arena::new();
        let mut interner = Interner::new();
        let doc = parse(
            "unit newton = 1 [kg*m/s^2];\nspec mass : [kg];",
            "t.dim",
            &mut interner,
            &expr_arena,
            &term_arena,
            &unit_arena,
            &unit_def_arena,
            &spec_arena,
        )
        .unwrap();
        assert_eq!(doc.unit_defs.len(), 1);
        assert_eq!(doc.unit_defs[0].unit.terms.len(), 3);
        assert_eq!(doc.specs.len(), 1);
        assert!(doc.specs[0].name.is(&interner, "mass"));
    }

    #[test]
    fn parse_unit_expr_consumes_star_and_slash_between_terms() {
        let expr_arena: Arena<Expr> = Arena::new();
        let term_arena: Arena<UnitTerm> = Arena::new();
        let unit_arena: Arena<UnitExpr> = Arena::new();
        let unit_def_arena: Arena<UnitDef> = Arena::new();
        let spec_arena: Arena<Specification> = Arena::new();
        let mut interner = Interner::new();
        let doc = parse(
            "unit ohm = 1 [W/A];",
            "t.dim",
            &mut interner,
            &expr_arena,
            &term_arena,
            &unit_arena,
            &unit_def_arena,
            &spec_arena,
        )
        .unwrap();
        let unit = &doc.unit_defs[0].unit;
        assert_eq!(unit.terms.len(), 2);
        assert!(unit.terms[0].name.is(&interner, "W"));
        assert_eq!(unit.terms[0].exp, 1);
        assert!(unit.terms[1].name.is(&interner, "A"));
        assert_eq!(unit.terms[1].exp, -1, "a term after '/' must have its exponent negated");
    }

    #[test]
    fn parses_equality_with_standard_precedence() {
        // c == x + x: Sum at the top, not (c == x) + x.
        let expr_arena: Arena<Expr> = Arena::new();
        let term_arena: Arena<UnitTerm> = Arena::new();
        let unit_arena: Arena<UnitExpr> = Arena::new();
        let unit_def_arena: Arena<UnitDef> = Arena::new();
        let spec_arena: Arena<Specification> = Arena::new();
        let mut interner = Interner::new();
        let doc = parse(
            "c == x + x;",
            "t.dim",
            &mut interner,
            &expr_arena,
            &term_arena,
            &unit_arena,
            &unit_def_arena,
            &spec_arena,
        )
        .unwrap();
        assert_eq!(doc.equalities.len(), 1);
        match doc.equalities[0] {
            Expr::Equality(Binary { rhs, .. }) => assert!(matches!(rhs, Expr::Sum(_))),
            _ => unreachable!(),
        }
    }

    #[test]
    fn power_binds_tighter_than_unary_minus() {
        // -x^2 parses as Negative(Power(x, 2)), not Power(Negative(x), 2).
        let expr_arena: Arena<Expr> = Arena::new();
        let term_arena: Arena<UnitTerm> = Arena::new();
        let unit_arena: Arena<UnitExpr> = Arena::new();
        let unit_def_arena: Arena<UnitDef> = Arena::new();
        let spec_arena: Arena<Specification> = Arena::new();
        let mut interner = Interner::new();
        let doc = parse(
            "y == -x^2;",
            "t.dim",
            &mut interner,
            &expr_arena,
            &term_arena,
            &unit_arena,
            &unit_def_arena,
            &spec_arena,
        )
        .unwrap();
        match doc.equalities[0] {
            Expr::Equality(Binary { rhs, .. }) => match rhs {
                Expr::Negative(Negative { operand, .. }) => assert!(matches!(operand, Expr::Power(_))),
                _ => panic!("expected Negative at the top"),
            },
            _ => unreachable!(),
        }
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        // a == b + c * d: Sum(b, Product(c, d)) at the top.
        let expr_arena: Arena<Expr> = Arena::new();
        let term_arena: Arena<UnitTerm> = Arena::new();
        let unit_arena: Arena<UnitExpr> = Arena::new();
        let unit_def_arena: Arena<UnitDef> = Arena::new();
        let spec_arena: Arena<Specification> = Arena::new();
        let mut interner = Interner::new();
        let doc = parse(
            "a == b + c * d;",
            "t.dim",
            &mut interner,
            &expr_arena,
            &term_arena,
            &unit_arena,
            &unit_def_arena,
            &spec_arena,
        )
        .unwrap();
        match doc.equalities[0] {
            Expr::Equality(Binary { rhs, .. }) => match rhs {
                Expr::Sum(Binary { rhs, .. }) => assert!(matches!(rhs, Expr::Product(_))),
                _ => panic!("expected Sum at the top"),
            },
            _ => unreachable!(),
        }
    }

    #[test]
    fn parenthesized_expression_overrides_precedence() {
        // a == (b + c) * d: Product(Sum(b, c), d) at the top.
        let expr_arena: Arena<Expr> = Arena::new();
        let term_arena: Arena<UnitTerm> = Arena::new();
        let unit_arena: Arena<UnitExpr> = Arena::new();
        let unit_def_arena: Arena<UnitDef> = Arena::new();
        let spec_arena: Arena<Specification> = Arena::new();
        let mut interner = Interner::new();
        let doc = parse(
            "a == (b + c) * d;",
            "t.dim",
            &mut interner,
            &expr_arena,
            &term_arena,
            &unit_arena,
            &unit_def_arena,
            &spec_arena,
        )
        .unwrap();
        match doc.equalities[0] {
            Expr::Equality(Binary { rhs, .. }) => match rhs {
                Expr::Product(Binary { lhs, .. }) => assert!(matches!(lhs, Expr::Sum(_))),
                _ => panic!("expected Product at the top"),
            },
            _ => unreachable!(),
        }
    }

    #[test]
    fn resynchronizes_after_a_bad_statement_to_report_a_second_error() {
        // Each statement is missing its own terminator before an extra stray
        // identifier; resync on the following `;` lets the next statement
        // still be attempted, so both errors surface in one pass.
        let expr_arena: Arena<Expr> = Arena::new();
        let term_arena: Arena<UnitTerm> = Arena::new();
        let unit_arena: Arena<UnitExpr> = Arena::new();
        let unit_def_arena: Arena<UnitDef> = Arena::new();
        let spec_arena: Arena<Specification> = Arena::new();
        let mut interner = Interner::new();
        let errs = parse(
            "unit x = 1 bogus;\nunit y = 2 bogus;",
            "t.dim",
            &mut interner,
            &expr_arena,
            &term_arena,
            &unit_arena,
            &unit_def_arena,
            &spec_arena,
        )
        .unwrap_err();
        assert_eq!(errs.len(), 2);
        assert!(errs.iter().all(|e| e.kind == ErrorKind::Parse));
    }
}
