//! Application name value object
//!
//! Derives a stable, filesystem-safe identity from a build-output path by
//! walking upward past build segments (`bin/Debug`, `obj/release`, ...).

use std::fmt;
use std::path::{Component, Path};

/// Name used when the whole path consists of build segments.
pub const FALLBACK_APPLICATION_NAME: &str = "application";

/// Build-output segment names skipped while walking upward.
const BUILD_OUTPUT_SEGMENTS: &[&str] = &["bin", "obj", "debug", "release"];

/// A filesystem-safe application identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ApplicationName(String);

impl ApplicationName {
    /// Use an explicitly configured name (sanitised).
    pub fn explicit(name: &str) -> Self {
        let sanitised = sanitise(name.trim());
        if sanitised.is_empty() {
            Self(FALLBACK_APPLICATION_NAME.to_string())
        } else {
            Self(sanitised)
        }
    }

    /// Derive a name from a source path using the default policy.
    pub fn from_path(path: &Path) -> Self {
        NamePolicy::default().derive(path)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ApplicationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ApplicationName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Policy for walking a path upward to its identifying segment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NamePolicy {
    skip_src: bool,
}

impl NamePolicy {
    /// Also skip `src` segments (for source trees rather than build outputs).
    pub fn skipping_src() -> Self {
        Self { skip_src: true }
    }

    fn is_skipped(&self, segment: &str) -> bool {
        BUILD_OUTPUT_SEGMENTS
            .iter()
            .any(|s| s.eq_ignore_ascii_case(segment))
            || (self.skip_src && segment.eq_ignore_ascii_case("src"))
    }

    /// Return the last path segment that is not a build-output segment.
    ///
    /// `.` and `..` are resolved lexically first, so `/work/Shop/bin/..`
    /// names `Shop`.
    pub fn derive(&self, path: &Path) -> ApplicationName {
        let found = normal_segments(path)
            .into_iter()
            .rev()
            .find(|segment| !self.is_skipped(segment));

        match found.map(|s| sanitise(&s)) {
            Some(name) if !name.is_empty() => ApplicationName(name),
            _ => ApplicationName(FALLBACK_APPLICATION_NAME.to_string()),
        }
    }
}

/// Normal segments of `path` with `..` applied to what precedes it.
fn normal_segments(path: &Path) -> Vec<String> {
    let mut segments = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(segment) => segments.push(segment.to_string_lossy().into_owned()),
            Component::ParentDir => {
                segments.pop();
            }
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }
    segments
}

fn sanitise(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '-'
            }
        })
        .collect::<String>()
        .trim_matches('.')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn strips_build_output_segments() {
        let path = PathBuf::from("/work/Shop.Web/bin/Debug");
        assert_eq!(ApplicationName::from_path(&path).as_str(), "Shop.Web");
    }

    #[test]
    fn segment_match_is_case_insensitive() {
        let path = PathBuf::from("/work/orders/OBJ/RELEASE");
        assert_eq!(ApplicationName::from_path(&path).as_str(), "orders");
    }

    #[test]
    fn plain_path_uses_last_segment() {
        let path = PathBuf::from("/work/billing");
        assert_eq!(ApplicationName::from_path(&path).as_str(), "billing");
    }

    #[test]
    fn src_only_skipped_when_requested() {
        let path = PathBuf::from("/work/billing/src");
        assert_eq!(ApplicationName::from_path(&path).as_str(), "src");
        assert_eq!(NamePolicy::skipping_src().derive(&path).as_str(), "billing");
    }

    #[test]
    fn exhausted_walk_falls_back() {
        let path = PathBuf::from("/bin/debug");
        assert_eq!(
            ApplicationName::from_path(&path).as_str(),
            FALLBACK_APPLICATION_NAME
        );
        assert_eq!(
            ApplicationName::from_path(Path::new("")).as_str(),
            FALLBACK_APPLICATION_NAME
        );
    }

    #[test]
    fn parent_segments_are_applied() {
        let path = PathBuf::from("/work/Shop/Web/..");
        assert_eq!(ApplicationName::from_path(&path).as_str(), "Shop");

        let path = PathBuf::from("/work/Shop/bin/Debug/../..");
        assert_eq!(ApplicationName::from_path(&path).as_str(), "Shop");

        let path = PathBuf::from("/work/./Shop/bin/../bin");
        assert_eq!(ApplicationName::from_path(&path).as_str(), "Shop");

        assert_eq!(
            ApplicationName::from_path(Path::new("/work/..")).as_str(),
            FALLBACK_APPLICATION_NAME
        );
    }

    #[test]
    fn unsafe_characters_are_replaced() {
        let path = PathBuf::from("/work/My App (v2)/bin");
        assert_eq!(ApplicationName::from_path(&path).as_str(), "My-App--v2-");
    }

    #[test]
    fn explicit_name_is_sanitised() {
        assert_eq!(ApplicationName::explicit("web api").as_str(), "web-api");
        assert_eq!(
            ApplicationName::explicit("  ").as_str(),
            FALLBACK_APPLICATION_NAME
        );
    }
}
