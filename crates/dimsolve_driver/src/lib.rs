//! # dimsolve-driver
//!
//! The end-to-end pipeline (§4.8) wiring every other crate together:
//! [`options::Options`] in, a [`pipeline::RunOutcome`] out. `apps/dimsolve_cli`
//! is a thin binary over [`pipeline::run`] — argv parsing and printing live
//! there, not here.

pub mod options;
pub mod pipeline;
pub mod preamble;

pub use options::Options;
pub use pipeline::{run, ResolvedRecord, RunOutcome};
