//! Tick CLI - work through markdown checklists one task at a time

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = tick_cli::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
