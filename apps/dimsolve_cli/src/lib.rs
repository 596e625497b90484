//! Dimsolve CLI
//!
//! Command-line interface for the dimsolve dimensional-algebra solver.
//!
//! This crate provides the `dimsolve` binary: read a source file, run it
//! through [`dimsolve_driver`]'s pipeline, and print the resolved records.
//! It can also be used as a library for programmatic access to argument
//! parsing and dispatch.
//!
//! # Module Structure
//!
//! - [`cli`] — command-line argument parsing and dispatch

pub mod cli;

pub use cli::run_cli;
