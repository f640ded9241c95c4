//! Run configuration document
//!
//! An optional JSON document describing what to run. It holds either one
//! application or a list of them:
//!
//! ```json
//! { "application": "src/Shop/bin", "environment": "staging",
//!   "hosts": [{ "name": "katana", "arguments": ["--port", "8080"] }],
//!   "ignoredPaths": ["\\temp"] }
//! ```
//!
//! Each value in the document wins over the matching command-line flag
//! only when it is non-empty.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::entities::{ApplicationSpec, HostSpec, DEFAULT_ENVIRONMENT};
use crate::error::{StagehandError, StagehandResult};

/// A host entry of the document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostEntry {
    pub name: String,
    #[serde(default)]
    pub arguments: Vec<String>,
}

/// One application of the document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunEntry {
    #[serde(default)]
    pub application: Option<String>,
    #[serde(default)]
    pub environment: Option<String>,
    #[serde(default)]
    pub hosts: Vec<HostEntry>,
    #[serde(default)]
    pub ignored_paths: Vec<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub bootstrapper: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RunDocument {
    Many { applications: Vec<RunEntry> },
    Single(RunEntry),
}

/// A parsed run configuration document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfiguration {
    /// Directory relative application paths are resolved against.
    base_dir: PathBuf,
    entries: Vec<RunEntry>,
}

/// Values given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineOptions {
    pub application: PathBuf,
    pub environment: String,
    pub name: Option<String>,
    pub hosts: Vec<String>,
    pub ignored_paths: Vec<String>,
}

impl Default for InlineOptions {
    fn default() -> Self {
        Self {
            application: PathBuf::from("."),
            environment: DEFAULT_ENVIRONMENT.to_string(),
            name: None,
            hosts: Vec::new(),
            ignored_paths: Vec::new(),
        }
    }
}

impl RunConfiguration {
    /// Read and parse a document from disk.
    pub fn load(path: &Path) -> StagehandResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            StagehandError::InvalidRunConfiguration {
                file: path.to_path_buf(),
                message: e.to_string(),
            }
        })?;
        let base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Self::parse(&content, base_dir).map_err(|message| StagehandError::InvalidRunConfiguration {
            file: path.to_path_buf(),
            message,
        })
    }

    /// Parse a document; relative application paths resolve against `base_dir`.
    pub fn parse(content: &str, base_dir: impl Into<PathBuf>) -> Result<Self, String> {
        let document: RunDocument = serde_json::from_str(content).map_err(|e| e.to_string())?;
        let entries = match document {
            RunDocument::Many { applications } => applications,
            RunDocument::Single(entry) => vec![entry],
        };
        if entries.is_empty() {
            return Err("document lists no applications".to_string());
        }
        Ok(Self {
            base_dir: base_dir.into(),
            entries,
        })
    }

    pub fn entries(&self) -> &[RunEntry] {
        &self.entries
    }

    /// Merge every entry with the inline options.
    ///
    /// An inline name only names a single-entry document; with several
    /// entries each one derives its own name.
    pub fn specs(&self, inline: &InlineOptions) -> StagehandResult<Vec<ApplicationSpec>> {
        let inline_name = match self.entries.len() {
            1 => inline.name.as_deref(),
            _ => {
                if let Some(name) = &inline.name {
                    tracing::warn!(name = %name, "ignoring inline name for a document with several applications");
                }
                None
            }
        };
        self.entries
            .iter()
            .map(|entry| merge(entry, &self.base_dir, inline, inline_name))
            .collect()
    }
}

/// Application specs for a run: from the document when given, else inline.
pub fn application_specs(
    document: Option<&RunConfiguration>,
    inline: &InlineOptions,
) -> StagehandResult<Vec<ApplicationSpec>> {
    match document {
        Some(document) => document.specs(inline),
        None => merge(&RunEntry::default(), Path::new(""), inline, inline.name.as_deref())
            .map(|spec| vec![spec]),
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn merge(
    entry: &RunEntry,
    base_dir: &Path,
    inline: &InlineOptions,
    inline_name: Option<&str>,
) -> StagehandResult<ApplicationSpec> {
    let source = match non_empty(&entry.application) {
        Some(app) => base_dir.join(app),
        None => inline.application.clone(),
    };

    let environment = non_empty(&entry.environment).unwrap_or(&inline.environment);

    let hosts: Vec<HostSpec> = if entry.hosts.is_empty() {
        inline.hosts.iter().map(HostSpec::new).collect()
    } else {
        entry
            .hosts
            .iter()
            .map(|h| HostSpec::new(h.name.clone()).with_arguments(h.arguments.clone()))
            .collect()
    };

    let ignored_paths = if entry.ignored_paths.is_empty() {
        inline.ignored_paths.clone()
    } else {
        entry.ignored_paths.clone()
    };

    let mut builder = ApplicationSpec::builder(source)
        .environment(environment)
        .hosts(hosts)
        .ignored_paths(ignored_paths);

    if let Some(name) = non_empty(&entry.name).or(inline_name) {
        builder = builder.name(name);
    }
    if let Some(program) = non_empty(&entry.bootstrapper) {
        builder = builder.bootstrapper(program);
    }

    builder.build()
}
