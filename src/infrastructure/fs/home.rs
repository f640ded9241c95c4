//! Home directory resolution with test isolation support.
//!
//! On Windows, `dirs::home_dir()` uses the system API rather than environment
//! variables, so setting `HOME` in tests has no effect there. Everything in
//! Stagehand that derives a functional path from the home directory (the
//! runtime root, the default settings file) goes through
//! [`stagehand_home_dir`], which checks `STAGEHAND_TEST_HOME` first.

use std::path::PathBuf;

/// Environment variable overriding the home directory for tests.
pub const STAGEHAND_TEST_HOME_VAR: &str = "STAGEHAND_TEST_HOME";

/// Home directory for Stagehand-internal paths.
///
/// ```
/// use stagehand::infrastructure::fs::stagehand_home_dir;
///
/// if let Some(home) = stagehand_home_dir() {
///     let root = home.join(".stagehand");
///     assert!(root.ends_with(".stagehand"));
/// }
/// ```
pub fn stagehand_home_dir() -> Option<PathBuf> {
    std::env::var_os(STAGEHAND_TEST_HOME_VAR)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
}
