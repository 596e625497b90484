//! # dimsolve-render
//!
//! Two optional output renderers (§4.9): [`graphviz::render_graph`] emits
//! the equation graph as a Graphviz `digraph`, [`codelist::render_codelist`]
//! emits the evaluation op-list as straight-line pseudocode. Neither is
//! consulted by resolution or evaluation — a driver calls into this crate
//! only when its corresponding output sink is configured.

pub mod codelist;
pub mod graphviz;

pub use codelist::render_codelist;
pub use graphviz::render_graph;
