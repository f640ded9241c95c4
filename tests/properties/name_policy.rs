//! Property tests for application name derivation.

use std::path::PathBuf;

use proptest::prelude::*;

use stagehand::domain::value_objects::{ApplicationName, NamePolicy, FALLBACK_APPLICATION_NAME};

fn project_segment() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[A-Za-z][A-Za-z0-9_-]{0,11}")
        .unwrap()
        .prop_filter("not a build segment", |s| {
            !["bin", "obj", "debug", "release", "src"]
                .iter()
                .any(|b| b.eq_ignore_ascii_case(s))
        })
}

fn build_segments() -> impl Strategy<Value = Vec<&'static str>> {
    proptest::collection::vec(
        prop_oneof![Just("bin"), Just("Bin"), Just("obj"), Just("Debug"), Just("RELEASE")],
        0..4,
    )
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: Build-output segments below the project are skipped.
    #[test]
    fn property_build_segments_are_skipped(
        parents in proptest::collection::vec(project_segment(), 0..3),
        project in project_segment(),
        build in build_segments()
    ) {
        let mut path = PathBuf::from("/");
        for p in &parents {
            path.push(p);
        }
        path.push(&project);
        for b in &build {
            path.push(b);
        }

        let name = ApplicationName::from_path(&path);
        prop_assert_eq!(name.as_str(), project.as_str());
    }

    /// PROPERTY: A path made only of build segments yields the fallback name.
    #[test]
    fn property_only_build_segments_fall_back(build in build_segments()) {
        let mut path = PathBuf::from("/");
        for b in &build {
            path.push(b);
        }
        let name = ApplicationName::from_path(&path);
        prop_assert_eq!(name.as_str(), FALLBACK_APPLICATION_NAME);
    }

    /// PROPERTY: `src` is skipped only when the policy asks for it.
    #[test]
    fn property_src_policy(project in project_segment()) {
        let path = PathBuf::from("/work").join(&project).join("src");
        let skipped = NamePolicy::skipping_src().derive(&path);
        prop_assert_eq!(skipped.as_str(), project.as_str());
        let kept = NamePolicy::default().derive(&path);
        prop_assert_eq!(kept.as_str(), "src");
    }

    /// PROPERTY: Derived and explicit names are always filesystem-safe.
    #[test]
    fn property_names_are_filesystem_safe(raw in "(?s).{0,32}") {
        for name in [ApplicationName::explicit(&raw), ApplicationName::from_path(&PathBuf::from(&raw))] {
            prop_assert!(!name.as_str().is_empty());
            prop_assert!(name
                .as_str()
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')));
        }
    }
}
