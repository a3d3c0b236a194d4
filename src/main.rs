#![deny(missing_docs)]

//! Entry point for the sympred CLI.

use std::process::ExitCode;

use clap::Parser;
use sympred::cli::Cli;
use sympred::logging;

fn main() -> ExitCode {
    if let Err(err) = logging::init() {
        eprintln!("Logging disabled: {err}");
    }

    match Cli::parse().run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err}");
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}
