//! Reload Policy
//!
//! Decides whether a changed source file needs a full recycle (binaries and
//! configuration) or can be synced into the staging directory in place.

use std::path::Path;

/// Extensions that trigger a full recycle when no settings override them.
pub const DEFAULT_RELOAD_EXTENSIONS: &[&str] =
    &[".dll", ".exe", ".so", ".dylib", ".config", ".xml"];

/// What to do about a changed source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeAction {
    /// Stop and start the application again.
    Recycle,
    /// Copy the single file into the staging directory.
    Sync,
}

/// Policy mapping file extensions to [`ChangeAction`]s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReloadPolicy {
    extensions: Vec<String>,
}

impl Default for ReloadPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_RELOAD_EXTENSIONS.iter().copied())
    }
}

impl ReloadPolicy {
    /// Build a policy from extensions, with or without the leading dot.
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extensions = extensions
            .into_iter()
            .map(|e| normalise_extension(e.as_ref()))
            .filter(|e| e.len() > 1)
            .collect();
        Self { extensions }
    }

    /// Classify a changed path.
    pub fn classify(&self, path: &Path) -> ChangeAction {
        let Some(ext) = path.extension() else {
            return ChangeAction::Sync;
        };
        let ext = format!(".{}", ext.to_string_lossy().to_ascii_lowercase());
        if self.extensions.iter().any(|e| *e == ext) {
            ChangeAction::Recycle
        } else {
            ChangeAction::Sync
        }
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }
}

/// Lower-case an extension and make sure it starts with a dot.
pub fn normalise_extension(ext: &str) -> String {
    let trimmed = ext.trim().to_ascii_lowercase();
    if trimmed.starts_with('.') {
        trimmed
    } else {
        format!(".{trimmed}")
    }
}
