use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{error, LevelFilter};

use dpll_sat::{solve_dimacs, SolveResult, SolverError};

/// A DPLL SAT solver: reports SAT or UNSAT for a DIMACS CNF formula.
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Path to a DIMACS CNF file.
    path: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn level_filter(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn run(cli: &Cli) -> Result<SolveResult, SolverError> {
    let contents = std::fs::read_to_string(&cli.path)?;
    solve_dimacs(&contents)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::from_default_env()
        .filter_level(level_filter(cli.verbose))
        .init();

    match run(&cli) {
        Ok(result) => {
            println!("{result}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}
