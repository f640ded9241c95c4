//! Configuration overlay discovery
//!
//! Within one directory, files sharing an extension split into *bases* and
//! *overlays*. `<stem>.<segment><ext>` is an overlay of `<stem><ext>` when
//! that base exists and `segment` is a single dot-free name (typically an
//! environment). Every other file is a base, including files whose stem
//! itself contains dots.

use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq)]
struct ConfigFile {
    name: String,
    stem: String,
}

/// Files of one extension found in one directory.
#[derive(Debug, Clone)]
pub struct ConfigFileSet {
    files: Vec<ConfigFile>,
}

impl ConfigFileSet {
    /// Keep the names ending in `extension` (ASCII case-insensitive).
    pub fn new<I, S>(file_names: I, extension: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut files: Vec<ConfigFile> = file_names
            .into_iter()
            .filter_map(|name| {
                let name = name.into();
                let stem = split_stem(&name, extension)?.to_string();
                if stem.is_empty() {
                    return None;
                }
                Some(ConfigFile { name, stem })
            })
            .collect();
        files.sort_by(|a, b| a.name.cmp(&b.name));
        Self { files }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Check whether `name` overlays another file of the set.
    pub fn is_overlay(&self, name: &str) -> bool {
        let stems: HashSet<&str> = self.files.iter().map(|f| f.stem.as_str()).collect();
        self.files
            .iter()
            .find(|f| f.name == name)
            .is_some_and(|f| overlays_existing_stem(&f.stem, &stems))
    }

    /// Names of all base files, sorted.
    pub fn bases(&self) -> Vec<&str> {
        let stems: HashSet<&str> = self.files.iter().map(|f| f.stem.as_str()).collect();
        self.files
            .iter()
            .filter(|f| !overlays_existing_stem(&f.stem, &stems))
            .map(|f| f.name.as_str())
            .collect()
    }

    /// The overlay of `base` for `environment`, when present in the set.
    pub fn overlay_for(&self, base: &str, environment: &str) -> Option<&str> {
        let base = self.files.iter().find(|f| f.name == base)?;
        let wanted = format!("{}.{}", base.stem, environment);
        self.files
            .iter()
            .find(|f| f.stem == wanted)
            .map(|f| f.name.as_str())
    }

    /// `(base, overlay)` pairs that apply for `environment`.
    pub fn transforms_for(&self, environment: &str) -> Vec<(&str, &str)> {
        self.bases()
            .into_iter()
            .filter_map(|base| self.overlay_for(base, environment).map(|o| (base, o)))
            .collect()
    }
}

/// `stem` is `<existing stem>.<segment>` with a non-empty, dot-free segment.
fn overlays_existing_stem(stem: &str, stems: &HashSet<&str>) -> bool {
    match stem.rsplit_once('.') {
        Some((prefix, segment)) => {
            !prefix.is_empty() && !segment.is_empty() && stems.contains(prefix)
        }
        None => false,
    }
}

/// Strip `extension` from `name`, comparing the extension case-insensitively.
pub fn split_stem<'a>(name: &'a str, extension: &str) -> Option<&'a str> {
    if extension.is_empty() || name.len() < extension.len() {
        return None;
    }
    let split = name.len() - extension.len();
    if !name.is_char_boundary(split) {
        return None;
    }
    let (stem, ext) = name.split_at(split);
    ext.eq_ignore_ascii_case(extension).then_some(stem)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(names: &[&str]) -> ConfigFileSet {
        ConfigFileSet::new(names.iter().map(|s| s.to_string()), ".config")
    }

    #[test]
    fn environment_file_is_overlay_not_base() {
        let files = set(&["web.config", "web.staging.config", "web.production.config"]);
        assert_eq!(files.bases(), vec!["web.config"]);
        assert!(files.is_overlay("web.staging.config"));
        assert_eq!(files.overlay_for("web.config", "staging"), Some("web.staging.config"));
        assert_eq!(files.overlay_for("web.config", "test"), None);
    }

    #[test]
    fn dotted_stems_are_bases() {
        let files = set(&["Shop.Web.config", "Shop.Web.staging.config"]);
        assert_eq!(files.bases(), vec!["Shop.Web.config"]);
        assert_eq!(
            files.transforms_for("staging"),
            vec![("Shop.Web.config", "Shop.Web.staging.config")]
        );
    }

    #[test]
    fn prefix_without_dot_is_not_overlay() {
        // "webapp" merely starts with "web"
        let files = set(&["web.config", "webapp.config"]);
        assert_eq!(files.bases(), vec!["web.config", "webapp.config"]);
    }

    #[test]
    fn orphan_environment_file_is_a_base() {
        let files = set(&["app.staging.config"]);
        assert_eq!(files.bases(), vec!["app.staging.config"]);
    }

    #[test]
    fn other_extensions_and_empty_stems_ignored() {
        let files = set(&["web.xml", ".config", "web.config"]);
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn extension_match_is_case_insensitive() {
        let files = set(&["Web.CONFIG", "Web.staging.Config"]);
        assert_eq!(files.overlay_for("Web.CONFIG", "staging"), Some("Web.staging.Config"));
    }

    #[test]
    fn split_stem_handles_short_and_multibyte_names() {
        assert_eq!(split_stem("a.config", ".config"), Some("a"));
        assert_eq!(split_stem("cfg", ".config"), None);
        assert_eq!(split_stem("é.xml", ".xml"), Some("é"));
        assert_eq!(split_stem("aé", ".x"), None);
    }
}
