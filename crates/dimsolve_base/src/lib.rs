#![cfg_attr(docsrs, feature(doc_cfg))]

//! # dimsolve-base
//!
//! Pure structural atoms for the dimsolve workspace.
//!
//! - [`Arena`] — bump allocation for stable AST references
//! - [`Interner`]/[`Symbol`] — string interning for O(1) name equality
//! - [`Loc`] — source location tracking (file, line range, column range)
//! - [`LocatedError`]/[`Result`] — errors with source positions
//!
//! # Design Principles
//!
//! This crate has **no knowledge of units, dimensions, or the document
//! grammar**. It provides only generic, reusable infrastructure that
//! higher-level crates build upon.
//!
//! # Example
//!
//! ```
//! use dimsolve_base::{Arena, Interner, Loc};
//!
//! let arena: Arena<&str> = Arena::new();
//! let mut interner = Interner::new();
//!
//! let hello = interner.intern("hello");
//! let loc = Loc::point("spring.dim", 1, 1);
//!
//! let allocated = arena.alloc("hello");
//! assert_eq!(*allocated, "hello");
//! ```

pub mod arena;
pub mod error;
pub mod intern;
pub mod loc;

pub use arena::Arena;
pub use error::{ErrorKind, LocatedError, Result};
pub use intern::{Interner, Symbol, SymbolEq};
pub use loc::Loc;
