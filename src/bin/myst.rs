use std::fs;
use std::process::ExitCode;

use clap::Parser as ClapParser;
use myst::{Interpreter, InterpreterBuilder};

/// Run a script file through the interpreter.
#[derive(ClapParser, Debug)]
#[command(name = "myst", version, about)]
struct Cli {
    /// Script file to run.
    script: String,

    /// Maximum nested function-call depth before the interpreter raises
    /// a runtime error instead of recursing further.
    #[arg(long, env = "MYST_MAX_CALL_DEPTH", default_value_t = 512)]
    max_call_depth: usize,

    /// Keep running after a script error, printing captured diagnostics
    /// instead of exiting non-zero.
    #[arg(long)]
    capture_errors: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let source = match fs::read_to_string(&cli.script) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("myst: cannot read '{}': {}", cli.script, e);
            return ExitCode::FAILURE;
        }
    };

    let mut interp: Interpreter = InterpreterBuilder::new()
        .max_call_depth(cli.max_call_depth)
        .capture_errors(cli.capture_errors)
        .build();

    match interp.run(&source, &cli.script) {
        Ok(value) => {
            println!("{}", value);
            for diag in interp.diagnostics() {
                eprintln!("{}", diag);
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("myst: {}", err);
            ExitCode::FAILURE
        }
    }
}
