//! dimsolve CLI — standalone binary
//!
//! The binary is a thin wrapper around [`dimsolve_cli::run_cli`], handling
//! error display and exit codes. All command logic lives in the library
//! crate for testability.
//!
//! # Exit Codes
//!
//! - `0` — success
//! - `1` — error (diagnostics printed to stderr)

fn main() {
    if let Err(e) = dimsolve_cli::run_cli() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
