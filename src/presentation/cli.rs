//! CLI Argument Parsing
//!
//! Global flags (`--json`, `--verbose`) are inherited by every subcommand.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::InlineOptions;
use crate::domain::entities::DEFAULT_ENVIRONMENT;

/// Stagehand - stage, configure, boot and recycle applications locally
#[derive(Parser, Debug)]
#[command(name = "stagehand")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Log as JSON lines
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Stage and run applications, recycling them when their source changes
    Run(RunArgs),
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct RunArgs {
    /// Application build output to run (defaults to the current directory)
    #[arg(short, long)]
    pub application: Option<PathBuf>,

    /// Environment whose configuration overlays are applied
    #[arg(short, long, default_value = DEFAULT_ENVIRONMENT)]
    pub environment: String,

    /// Staging name (derived from the application path when omitted)
    #[arg(short, long)]
    pub name: Option<String>,

    /// Host adapters to prepare, in order
    #[arg(long, value_delimiter = ',')]
    pub hosts: Vec<String>,

    /// Directory patterns excluded from staging and live sync
    #[arg(short, long = "ignore", value_delimiter = ',')]
    pub ignore: Vec<String>,

    /// Run configuration document (JSON)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Tool settings file (TOML)
    #[arg(long)]
    pub settings: Option<PathBuf>,
}

impl RunArgs {
    /// Flag values as run-configuration fallbacks.
    pub fn inline_options(&self) -> InlineOptions {
        let defaults = InlineOptions::default();
        InlineOptions {
            application: self.application.clone().unwrap_or(defaults.application),
            environment: self.environment.clone(),
            name: self.name.clone(),
            hosts: trimmed(&self.hosts),
            ignored_paths: trimmed(&self.ignore),
        }
    }
}

fn trimmed(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}
