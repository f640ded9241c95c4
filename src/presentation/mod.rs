//! Presentation Layer
//!
//! This layer handles:
//! - CLI argument parsing (via clap)
//! - Turning flag values into run-configuration fallbacks

pub mod cli;

pub use cli::{Cli, Commands, RunArgs};
