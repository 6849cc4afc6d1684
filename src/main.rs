//! src/main.rs
//!
//! Entry point for the wait-on binary.
//!
//! Responsibilities of this file:
//!   1) Parse command-line flags (`cli::Cli`) via `clap`.
//!   2) Install a `tracing` subscriber whose verbosity follows `--log`/`--verbose`.
//!   3) Merge an optional `--config` file with CLI overrides into a `RawOptions`.
//!   4) Hand that off to `wait_on::run` and translate the result into a process exit code.
//!
//! Notes:
//!   - We use Tokio's multi-thread runtime since probing N resources concurrently benefits
//!     from more than one worker thread.
//!   - `--help` must print to stdout and exit 1, which is why we use
//!     `Cli::try_parse()` instead of `Cli::parse()` — clap's own default is exit 0.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use wait_on::cli::{self, Cli};

fn init_tracing(log: bool, verbose: bool) {
    let default_level = if verbose {
        "debug"
    } else if log {
        "info"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .without_time()
        .with_target(false)
        .init();
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e)
            if matches!(
                e.kind(),
                clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion
            ) =>
        {
            print!("{e}");
            return ExitCode::from(1);
        }
        Err(e) => {
            eprint!("{e}");
            return ExitCode::FAILURE;
        }
    };

    init_tracing(cli.log, cli.verbose);

    let raw = match cli::resolve_options(cli) {
        Ok(raw) => raw,
        Err(e) => {
            eprintln!("wait-on: {e}");
            return ExitCode::FAILURE;
        }
    };

    match wait_on::run(raw).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("wait-on: {e}");
            ExitCode::FAILURE
        }
    }
}
