//! Ignore patterns value object
//!
//! Decides whether a directory of an application's source tree takes part in
//! staging and live sync. Patterns are regular expressions evaluated against
//! the directory path relative to the source root, rendered with `/`
//! separators and a leading `/` (the root itself is `/`).

use std::fmt;
use std::path::{Component, Path};

use regex::Regex;

use crate::error::{StagehandError, StagehandResult};

/// Compiled set of ignored-path patterns.
#[derive(Clone, Default)]
pub struct IgnorePatterns {
    patterns: Vec<Regex>,
}

impl fmt::Debug for IgnorePatterns {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.patterns.iter().map(Regex::as_str))
            .finish()
    }
}

impl IgnorePatterns {
    /// Create an empty pattern set (everything is copied).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Compile a list of patterns. Blank entries are skipped.
    ///
    /// An escaped backslash (`\\`) is read as a path separator so patterns
    /// written for Windows paths (`\\temp`) behave the same everywhere.
    pub fn compile<S: AsRef<str>>(patterns: &[S]) -> StagehandResult<Self> {
        let mut compiled = Vec::with_capacity(patterns.len());
        for raw in patterns {
            let raw = raw.as_ref().trim();
            if raw.is_empty() {
                continue;
            }
            let normalised = raw.replace(r"\\", "/");
            let regex = Regex::new(&normalised).map_err(|e| {
                StagehandError::InvalidIgnorePattern {
                    pattern: raw.to_string(),
                    message: e.to_string(),
                }
            })?;
            compiled.push(regex);
        }
        Ok(Self { patterns: compiled })
    }

    /// Check whether a directory (relative to the source root) should be copied.
    pub fn should_copy(&self, relative_dir: &Path) -> bool {
        if self.patterns.is_empty() {
            return true;
        }
        let candidate = render_candidate(relative_dir);
        !self.patterns.iter().any(|p| p.is_match(&candidate))
    }

    /// Number of compiled patterns.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Render a relative directory as `/a/b`; the root renders as `/`.
fn render_candidate(relative_dir: &Path) -> String {
    let segments: Vec<String> = relative_dir
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    if segments.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", segments.join("/"))
    }
}
