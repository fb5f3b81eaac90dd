//! tms - Task Management System CLI
//!
//! Reads task management commands (one per line) and prints their outcome.

use clap::Parser;
use tms::cli::Cli;
use tms::error::exit_codes;
use tms::output::emit_error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() {
    // Tracing is opt-in via RUST_LOG.
    // Ignore invalid or oversized filters so startup never fails on them.
    let filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|raw| {
            let raw = raw.trim();
            if raw.is_empty() || raw.len() > 4096 {
                return None;
            }
            EnvFilter::try_new(raw).ok()
        })
        .unwrap_or_else(|| EnvFilter::new("off"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let cli = Cli::parse();
    let json = cli.json;
    let command = cli
        .command
        .first()
        .cloned()
        .unwrap_or_else(|| "tms".to_string());

    if let Err(err) = cli.run() {
        match err.downcast_ref::<tms::Error>() {
            Some(tms_err) => {
                let _ = emit_error(&command, tms_err, json);
                std::process::exit(tms_err.exit_code());
            }
            None => {
                eprintln!("error: {err:#}");
                std::process::exit(exit_codes::OPERATION_FAILED);
            }
        }
    }
}
