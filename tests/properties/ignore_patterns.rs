//! Property tests for ignored-path matching.

use std::path::PathBuf;

use proptest::prelude::*;

use stagehand::domain::value_objects::IgnorePatterns;

fn segment() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[a-z][a-z0-9]{0,7}").unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: No patterns means every directory is copied.
    #[test]
    fn property_empty_set_copies_everything(
        segments in proptest::collection::vec(segment(), 0..5)
    ) {
        let path: PathBuf = segments.iter().collect();
        prop_assert!(IgnorePatterns::empty().should_copy(&path));
    }

    /// PROPERTY: A Windows-style `\\name` pattern excludes that directory at any depth.
    #[test]
    fn property_backslash_pattern_matches_segment(
        parents in proptest::collection::vec(segment(), 0..3),
        name in segment()
    ) {
        let patterns = IgnorePatterns::compile(&[format!(r"\\{name}$")]).unwrap();
        let mut path: PathBuf = parents.iter().collect();
        path.push(&name);

        prop_assert!(!patterns.should_copy(&path));
    }

    /// PROPERTY: A pattern only excludes directories whose path contains it.
    #[test]
    fn property_unrelated_directories_are_copied(
        segments in proptest::collection::vec(segment(), 0..4)
    ) {
        let patterns = IgnorePatterns::compile(&["ZZZ"]).unwrap();
        let path: PathBuf = segments.iter().collect();
        prop_assert!(patterns.should_copy(&path));
    }
}
