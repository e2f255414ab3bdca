//! TaskFlow CLI - Local-first kanban board with conflict reports

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = taskflow::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
