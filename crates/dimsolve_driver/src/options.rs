//! Driver configuration (§6 "Options").

use std::path::PathBuf;

/// Every knob the pipeline of §4.8 reads, independent of how a caller
/// gathers them (CLI flags, a config file, a test harness).
#[derive(Debug, Clone)]
pub struct Options {
    /// Required input source file. An empty path is a configuration error,
    /// not a missing-file one — callers should reject it before `run`.
    pub src: PathBuf,
    /// Upper bound on unit-resolver passes. Default 64.
    pub iteration_limit: u32,
    /// Promotes `UnusedDefinition` from a warning to a hard error. Default off.
    pub warnings_as_errors: bool,
    /// Emits the unit registry alongside resolved records. Default off.
    pub dump_units: bool,
    /// Optional path to write the Graphviz `.dot` rendering to.
    pub graphviz_output: Option<PathBuf>,
    /// Optional path to write the op-list code rendering to.
    pub code_output: Option<PathBuf>,
}

impl Options {
    pub fn new(src: impl Into<PathBuf>) -> Self {
        Options {
            src: src.into(),
            iteration_limit: dimsolve_resolve::DEFAULT_ITERATION_LIMIT,
            warnings_as_errors: false,
            dump_units: false,
            graphviz_output: None,
            code_output: None,
        }
    }
}
