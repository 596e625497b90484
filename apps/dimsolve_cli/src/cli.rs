//! Command-line argument parsing and dispatch for `dimsolve`.
//!
//! The CLI is a thin layer over [`dimsolve_driver`]: flags map directly onto
//! [`dimsolve_driver::Options`] fields (§6), and all the actual work —
//! parsing, validation, unit resolution, evaluation, rendering — lives in
//! the driver crate so it stays testable without a subprocess.

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use dimsolve_driver::{Options, RunOutcome};

/// Solve a dimensioned system of equations.
#[derive(Parser)]
#[command(name = "dimsolve")]
#[command(about = "Dimensional-algebra equation solver", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Source file to parse and solve.
    #[arg(long)]
    pub src: PathBuf,

    /// Upper bound on resolver/solver passes before giving up.
    #[arg(long, default_value_t = dimsolve_resolve::DEFAULT_ITERATION_LIMIT)]
    pub iteration_limit: u32,

    /// Treat unused-definition warnings as hard errors.
    #[arg(long)]
    pub warnings_as_errors: bool,

    /// Also print the full unit registry alongside resolved records.
    #[arg(long)]
    pub dump_units: bool,

    /// Write a Graphviz `.dot` rendering of the equation graph to this path.
    #[arg(long)]
    pub graphviz_output: Option<PathBuf>,

    /// Write the evaluation op-list, rendered as straight-line code, to this path.
    #[arg(long)]
    pub code_output: Option<PathBuf>,
}

impl From<&Cli> for Options {
    fn from(cli: &Cli) -> Self {
        let mut options = Options::new(cli.src.clone());
        options.iteration_limit = cli.iteration_limit;
        options.warnings_as_errors = cli.warnings_as_errors;
        options.dump_units = cli.dump_units;
        options.graphviz_output = cli.graphviz_output.clone();
        options.code_output = cli.code_output.clone();
        options
    }
}

/// Parses argv, runs the pipeline, prints results, and writes any
/// configured render outputs.
///
/// Matches §6's "Exit" contract: an `Err` here is a signal for `main` to
/// exit nonzero, after printing every diagnostic it carries.
pub fn run_cli() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();
    let options = Options::from(&cli);
    match dimsolve_driver::run(&options) {
        Ok(outcome) => {
            print_outcome(&outcome);
            write_render_outputs(&cli, &outcome)?;
            Ok(())
        }
        Err(errors) => {
            for e in &errors {
                eprintln!("{}", e);
            }
            Err(format!("{} error(s)", errors.len()).into())
        }
    }
}

fn print_outcome(outcome: &RunOutcome) {
    for w in &outcome.warnings {
        eprintln!("warning: {}", w);
    }
    for record in &outcome.records {
        match &record.dim {
            Some(dim) => println!("{} = {} {} [{}]", record.name, record.value, record.unit_name, dim),
            None => println!("{} = {}", record.name, record.value),
        }
    }
    if let Some(units) = &outcome.unit_dump {
        println!("--- units ---");
        for (name, unit) in units {
            println!("{} = {} [{}]", name, unit.scale, unit.dim);
        }
    }
}

fn write_render_outputs(cli: &Cli, outcome: &RunOutcome) -> std::io::Result<()> {
    if let (Some(path), Some(dot)) = (&cli.graphviz_output, &outcome.graphviz) {
        fs::write(path, dot)?;
    }
    if let (Some(path), Some(code)) = (&cli.code_output, &outcome.codelist) {
        fs::write(path, code)?;
    }
    Ok(())
}
