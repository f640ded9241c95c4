//! Settings loading

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{StagehandError, StagehandResult};

use super::types::Settings;

/// Non-fatal settings warning surfaced to CLI users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub key: String,
    pub file: PathBuf,
    pub line: Option<usize>,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown key '{}' in {}", self.key, self.file.display())?;
        if let Some(line) = self.line {
            write!(f, ":{line}")?;
        }
        if let Some(suggestion) = &self.suggestion {
            write!(f, " (did you mean '{suggestion}'?)")?;
        }
        Ok(())
    }
}

/// Load settings and collect non-fatal warnings (e.g. unknown keys).
pub fn load_with_warnings(path: &Path) -> StagehandResult<(Settings, Vec<ConfigWarning>)> {
    let content = fs::read_to_string(path)?;

    let mut unknown_paths: Vec<String> = Vec::new();
    let deserializer = toml::de::Deserializer::new(&content);

    let settings: Settings = serde_ignored::deserialize(deserializer, |p| {
        unknown_paths.push(p.to_string());
    })
    .map_err(|e| StagehandError::InvalidSettings {
        file: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let warnings = unknown_paths
        .into_iter()
        .map(|path_str| {
            let key = path_str
                .split('.')
                .next_back()
                .unwrap_or(path_str.as_str())
                .to_string();
            ConfigWarning {
                line: find_line_number(&content, &key),
                suggestion: suggest_key(&key),
                key,
                file: path.to_path_buf(),
            }
        })
        .collect();

    Ok((settings, warnings))
}

/// Explicit path, then `<config dir>/stagehand/config.toml`, then defaults.
///
/// An explicit path must exist; the user file is optional. Environment
/// overrides are applied last in every case.
pub fn resolve(explicit: Option<&Path>) -> StagehandResult<(Settings, Vec<ConfigWarning>)> {
    let (settings, warnings) = match explicit {
        Some(path) => load_with_warnings(path)?,
        None => match user_settings_path().filter(|p| p.is_file()) {
            Some(path) => load_with_warnings(&path)?,
            None => (Settings::default(), Vec::new()),
        },
    };
    Ok((with_env_overrides(settings), warnings))
}

/// Default location of the user settings file.
pub fn user_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("stagehand").join("config.toml"))
}

/// Apply environment variable overrides (`STAGEHAND_*` prefix).
pub fn with_env_overrides(settings: Settings) -> Settings {
    apply_overrides(settings, |key| std::env::var(key).ok())
}

pub(crate) fn apply_overrides<F>(mut settings: Settings, var: F) -> Settings
where
    F: Fn(&str) -> Option<String>,
{
    // STAGEHAND_HOME
    if let Some(root) = var("STAGEHAND_HOME").filter(|v| !v.trim().is_empty()) {
        settings.runtime.root = Some(PathBuf::from(root));
    }

    // STAGEHAND_BOOTSTRAPPER
    if let Some(program) = var("STAGEHAND_BOOTSTRAPPER").filter(|v| !v.trim().is_empty()) {
        settings.sandbox.program = program;
    }

    // STAGEHAND_SYNC_RETRIES
    if let Some(retries) = var("STAGEHAND_SYNC_RETRIES") {
        match retries.trim().parse::<u32>() {
            Ok(n) => settings.sync.retry_attempts = n,
            Err(_) => tracing::warn!(value = %retries, "ignoring invalid STAGEHAND_SYNC_RETRIES"),
        }
    }

    settings
}

fn find_line_number(content: &str, needle: &str) -> Option<usize> {
    content
        .lines()
        .position(|line| line.contains(needle))
        .map(|i| i + 1)
}

fn suggest_key(unknown: &str) -> Option<String> {
    const CANDIDATES: &[&str] = &[
        "runtime",
        "root",
        "hosts_dir",
        "sandbox",
        "program",
        "args",
        "call_timeout_secs",
        "exit_grace_secs",
        "sync",
        "retry_attempts",
        "retry_delay_ms",
        "reload",
        "extensions",
        "transform",
        "config_extension",
        "markup_extension",
        "hosts",
        "strict",
        "directory",
        "include",
        "files",
    ];

    let mut best: Option<(&str, usize)> = None;
    for candidate in CANDIDATES {
        let dist = levenshtein(unknown, candidate);
        best = match best {
            None => Some((candidate, dist)),
            Some((_, best_dist)) if dist < best_dist => Some((candidate, dist)),
            Some(current) => Some(current),
        };
    }

    match best {
        Some((candidate, dist)) if dist <= 2 => Some(candidate.to_string()),
        _ => None,
    }
}

fn levenshtein(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }

    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    let mut prev: Vec<usize> = (0..=b_bytes.len()).collect();
    let mut curr = vec![0usize; b_bytes.len() + 1];

    for (i, &ac) in a_bytes.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &bc) in b_bytes.iter().enumerate() {
            let cost = usize::from(ac != bc);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        prev.clone_from_slice(&curr);
    }

    prev[b_bytes.len()]
}
