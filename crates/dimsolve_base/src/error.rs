//! Located errors shared across every compilation pass.
//!
//! Every diagnostic in dimsolve carries a [`Loc`] indicating where in the
//! source text it occurred, formatted as
//! `<file>:<line>:[<col_begin>,<col_end>]: <message>`.
//!
//! # Example
//!
//! ```
//! use dimsolve_base::{LocatedError, Loc, Result};
//!
//! fn parse_exponent(s: &str, loc: Loc) -> Result<i64> {
//!     s.parse().map_err(|_| LocatedError::new(format!("invalid exponent: '{}'", s), loc))
//! }
//!
//! let err = parse_exponent("abc", Loc::point("spring.dim", 1, 1)).unwrap_err();
//! assert!(err.to_string().contains("invalid exponent"));
//! ```

use crate::loc::Loc;
use std::fmt;

/// Which of the nine error kinds a [`LocatedError`] represents.
///
/// `ShapeError` (residual system dimension < 1) is deliberately absent: the
/// spec treats it as a broken internal invariant, not a diagnosable user
/// error, so it surfaces as a `panic!` at the call site instead of a variant
/// here (see `dimsolve_solve::newton`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Parse,
    DuplicateDefinition,
    UnusedDefinition,
    UnknownUnit,
    DimensionMismatch,
    ValueConflict,
    Unsolvable,
    NonConvergence,
    /// Used by call sites that don't yet classify their errors by kind.
    Other,
}

/// An error annotated with its source location and taxonomy kind.
///
/// Implements [`std::error::Error`] and [`fmt::Display`]. Locations that
/// originate from the preamble are suppressed from the rendered message,
/// matching the diagnostic policy of the preamble itself.
#[derive(Debug, Clone)]
pub struct LocatedError {
    pub kind: ErrorKind,
    pub message: String,
    pub loc: Loc,
}

impl LocatedError {
    /// Creates an error with the given message and source location, kind
    /// unclassified (`ErrorKind::Other`).
    pub fn new(message: impl Into<String>, loc: Loc) -> Self {
        Self {
            kind: ErrorKind::Other,
            message: message.into(),
            loc,
        }
    }

    /// Creates an error tagged with a specific taxonomy kind.
    pub fn of_kind(kind: ErrorKind, message: impl Into<String>, loc: Loc) -> Self {
        Self {
            kind,
            message: message.into(),
            loc,
        }
    }

    /// `true` for `UnusedDefinition` — the one kind that is a warning unless
    /// `warnings_as_errors` is set.
    pub fn is_warning(&self) -> bool {
        matches!(self.kind, ErrorKind::UnusedDefinition)
    }
}

impl fmt::Display for LocatedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.loc.is_preamble() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.loc, self.message)
        }
    }
}

impl std::error::Error for LocatedError {}

/// Alias for `std::result::Result<T, LocatedError>`.
pub type Result<T> = std::result::Result<T, LocatedError>;
