//! # lway CLI entry point
//!
//! Parses command-line arguments, initializes tracing, loads the engine,
//! and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use lway_cli::board::{run_board, BoardArgs};
use lway_cli::load::load_engine;
use lway_cli::script::{run_script, RunArgs};
use lway_cli::show::{run_show, ShowArgs};

/// LibriumWay contract routing.
///
/// Loads a board of trade contracts, routes them between departments with
/// take/accept/reject/return/send, and prints pools and audit history.
#[derive(Parser, Debug)]
#[command(name = "lway", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to the engine configuration file (YAML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Path to a board snapshot (YAML) to load before running.
    #[arg(long, global = true)]
    board: Option<PathBuf>,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the board: every pool and sub-pool with its contracts.
    Board(BoardArgs),

    /// Replay a script of routing commands against the board.
    Run(RunArgs),

    /// Show one contract with its history and comments.
    Show(ShowArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    tracing::debug!("lway CLI starting");

    let engine = match load_engine(cli.config.as_deref(), cli.board.as_deref()) {
        Ok(engine) => engine,
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            return ExitCode::from(1);
        }
    };

    let result = match &cli.command {
        Commands::Board(args) => run_board(args, &engine),
        Commands::Run(args) => run_script(args, &engine).await,
        Commands::Show(args) => run_show(args, &engine).await,
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}

/// `RUST_LOG` wins when set; otherwise the level follows the `-v` count.
fn init_tracing(verbose: u8, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }
}
