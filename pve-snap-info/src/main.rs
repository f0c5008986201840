// Standard library
use std::io::Write;
use std::process::ExitCode;

// External crates
use chrono::Utc;
use clap::Parser;
use serde::Serialize;
use tracing::{error, info_span};
use uuid::Uuid;

// Internal imports
use pve_config::{ConfigLoader, ProxmoxConfig};

// Local modules
mod args_file;
mod cli;
mod module;

use cli::{usage_error, Args};
use module::{FailureReport, Invocation};

/// Write one JSON document to stdout, the only thing stdout ever carries.
fn emit<T: Serialize>(document: &T) -> std::io::Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer(&mut out, document)?;
    writeln!(out)?;
    out.flush()
}

fn run(args: &Args) -> pve_core::Result<pve_snapshot::ModuleReport> {
    let env = ProxmoxConfig::from_env()?;
    let invocation = Invocation::from_args(args, &ConfigLoader::new(), env)?;
    invocation.execute(Utc::now())
}

/// Print the failure document for `err`.
fn fail(err: &pve_core::PveError) -> ExitCode {
    error!(kind = err.kind(), "{}", err);
    if let Err(e) = emit(&FailureReport::from(err)) {
        eprintln!("Failed to write result: {}", e);
    }
    ExitCode::FAILURE
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        // --help and --version
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => return fail(&usage_error(&e)),
    };

    // Dropped at the end of main so buffered file logs get flushed
    let _log_guard = pve_logging::init_subscriber_with_level(args.debug.then_some("debug"));

    let request_id = Uuid::new_v4().to_string();
    let span = info_span!("pve_snap_info", request_id = %request_id);
    let _entered = span.enter();

    match run(&args) {
        Ok(report) => match emit(&report) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("Failed to write result: {}", e);
                ExitCode::FAILURE
            }
        },
        Err(e) => fail(&e),
    }
}
