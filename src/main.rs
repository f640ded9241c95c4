//! Stagehand CLI - local application lifecycle supervisor
//!
//! Usage: stagehand run [OPTIONS]
//!
//! While running, press `r` to recycle every application and `q` to stop
//! them all and exit.

mod commands;
mod ui;

use anyhow::Result;
use clap::Parser;

use stagehand::presentation::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();
    ui::logging::init_logging(cli.verbose, cli.json)?;

    match cli.command {
        Commands::Run(args) => commands::run::cmd_run(&args),
    }
}
