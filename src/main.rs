//! kiln - Build orchestrator for front-end JavaScript projects

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = kiln_cli::cli::run() {
        eprintln!("Error [{}]: {:#}", kiln_cli::cli::error_kind(&e), e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
