//! Example: Execute Crumb scripts from files
//!
//! Usage: cargo run --example run_file <script.crumb>
//!
//! `RUST_LOG=crumb=debug` logs function calls, `CRUMB_TRACE=1` writes a line per
//! executed statement, and `CRUMB_MAX_CALL_DEPTH=N` turns runaway recursion into
//! a reported error.

use anyhow::{bail, Context, Result};
use crumb::{parse_program, Interpreter, InterpreterConfig};
use std::env;
use std::fs;
use std::process;

fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    // Only initialize if RUST_LOG is set
    if env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn main() {
    init_tracing();

    match run() {
        Ok(0) => {}
        Ok(failures) => {
            eprintln!("{} statement(s) failed", failures);
            process::exit(1);
        }
        Err(err) => {
            eprintln!("Error: {:#}", err);
            process::exit(2);
        }
    }
}

/// Runs the script named on the command line, returning the number of evaluation errors
fn run() -> Result<usize> {
    let Some(file_path) = env::args().nth(1) else {
        bail!("usage: cargo run --example run_file <script.crumb>\n\nsample script: demos/tour.crumb");
    };

    let code = fs::read_to_string(&file_path)
        .with_context(|| format!("reading file '{}'", file_path))?;

    let program = parse_program(&code).with_context(|| format!("parsing '{}'", file_path))?;

    let mut interp = Interpreter::with_config(InterpreterConfig::from_env());
    Ok(interp.execute(&program).len())
}
