//! # dimsolve-parse
//!
//! Turns source text into a [`dimsolve_ast::Document`] (§3.1, §4.7):
//! [`lexer::Lexer`] tokenizes, [`parser::parse`] drives a recursive-descent
//! statement parser with a small Pratt-style expression core on top, and
//! every node it produces is arena-allocated so the returned `Document`
//! borrows from arenas the caller owns for the rest of the compilation.
//!
//! No parser-combinator or grammar-generator crate is involved — matching
//! the teacher's own hand-written lexer and descent parser.

pub mod lexer;
pub mod parser;
pub mod token;

pub use parser::parse;
