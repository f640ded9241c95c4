//! Error types for Stagehand
//!
//! Library code returns `StagehandResult`; the binary wraps these in
//! `anyhow` at the command boundary.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Stagehand operations
pub type StagehandResult<T> = Result<T, StagehandError>;

/// Main error type for Stagehand operations
#[derive(Error, Debug)]
pub enum StagehandError {
    /// The application's source directory is missing
    #[error("source directory does not exist or could not be found: {path}")]
    SourceNotFound { path: PathBuf },

    /// An ignore pattern failed to compile
    #[error("invalid ignore pattern '{pattern}': {message}")]
    InvalidIgnorePattern { pattern: String, message: String },

    /// A configuration overlay could not be applied
    #[error("configuration transform of {file} failed: {message}")]
    TransformFailed { file: PathBuf, message: String },

    /// A configuration or overlay document is not well-formed XML
    #[error("invalid XML in {file}: {message}")]
    InvalidXml { file: PathBuf, message: String },

    /// The execution sandbox could not be created or torn down
    #[error("sandbox for '{application}' failed: {message}")]
    Sandbox {
        application: String,
        message: String,
    },

    /// A bootstrap call inside the sandbox failed
    #[error("bootstrap '{operation}' failed for '{application}': {message}")]
    Bootstrap {
        application: String,
        operation: &'static str,
        message: String,
    },

    /// The change watcher could not be registered
    #[error("cannot watch {path}: {message}")]
    Watch { path: PathBuf, message: String },

    /// The run configuration document is malformed
    #[error("invalid run configuration {file}: {message}")]
    InvalidRunConfiguration { file: PathBuf, message: String },

    /// The tool settings file is malformed
    #[error("invalid settings in {file}: {message}")]
    InvalidSettings { file: PathBuf, message: String },

    /// Two applications in one run resolve to the same name
    #[error("duplicate application name '{name}' ({first} and {second})")]
    DuplicateApplication {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },

    /// Host name is neither configured nor backed by a host directory
    #[error("unknown host '{name}'")]
    UnknownHost { name: String },

    /// A file a host adapter requires is missing from its host directory
    #[error("host '{host}' requires {file}, which does not exist")]
    HostFileMissing { host: String, file: PathBuf },

    /// Another supervisor already owns this application's staging directory
    #[error("application '{name}' is already supervised by another process (lock: {lock})")]
    ApplicationLocked { name: String, lock: PathBuf },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StagehandError {
    /// True for failures that abort a Start rather than a single sync
    pub fn is_fatal_to_start(&self) -> bool {
        matches!(
            self,
            Self::SourceNotFound { .. }
                | Self::TransformFailed { .. }
                | Self::InvalidXml { .. }
                | Self::Sandbox { .. }
                | Self::Bootstrap { .. }
        )
    }
}

/// Render an error with its full source chain, one cause per line.
pub fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut rendered = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        rendered.push_str("\n  caused by: ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}
