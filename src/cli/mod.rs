//! Command-line interface for tms
//!
//! This module defines the CLI structure using clap derive macros. Commands
//! themselves use the line syntax of the command surface and are read from
//! stdin, a script file, or the trailing arguments.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use crate::config::{Config, CONFIG_FILE};
use crate::output::OutputOptions;
use crate::session::Session;
use crate::snapshot;

mod script;

/// tms - Task Management System
///
/// Maintains primitive and composite tasks, answers duration and
/// earliest-finish queries, searches by criteria, and supports undo.
#[derive(Parser, Debug)]
#[command(name = "tms")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to .tms.toml in the current directory)
    #[arg(long, env = "TMS_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Load a snapshot before running commands (without a value: snapshot.path from config)
    #[arg(long, value_name = "PATH")]
    pub load: Option<Option<PathBuf>>,

    /// Read commands from a file instead of stdin
    #[arg(long, value_name = "FILE", conflicts_with = "command")]
    pub script: Option<PathBuf>,

    /// Output in JSON format, one envelope per command
    #[arg(long)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long)]
    pub quiet: bool,

    /// Run a single command and exit, e.g. `tms -- ReportDuration C`
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "COMMAND")]
    pub command: Vec<String>,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        let config = self.load_config()?;
        let options = OutputOptions {
            json: self.json,
            quiet: self.quiet,
        };

        let mut session = Session::new(&config);
        if let Some(path) = &self.load {
            let path = path.clone().unwrap_or_else(|| config.snapshot.path.clone());
            snapshot::load(session.store_mut(), &path)
                .with_context(|| format!("loading snapshot {}", path.display()))?;
        }

        if !self.command.is_empty() {
            return script::run_single(&mut session, &self.command.join(" "), options);
        }

        match &self.script {
            Some(path) => {
                let file = std::fs::File::open(path)
                    .with_context(|| format!("opening script {}", path.display()))?;
                script::run_lines(&mut session, std::io::BufReader::new(file), options, false)
            }
            None => {
                use std::io::IsTerminal;

                let stdin = std::io::stdin();
                let prompt = stdin.is_terminal() && !options.json;
                script::run_lines(&mut session, stdin.lock(), options, prompt)
            }
        }
    }

    fn load_config(&self) -> anyhow::Result<Config> {
        match &self.config {
            Some(path) => Config::load(path)
                .with_context(|| format!("loading config {}", path.display())),
            None => {
                let cwd = std::env::current_dir().context("resolving current directory")?;
                Config::load_from_dir(&cwd).with_context(|| format!("loading {CONFIG_FILE}"))
            }
        }
    }
}
