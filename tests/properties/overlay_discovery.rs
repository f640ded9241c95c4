//! Property tests for configuration overlay discovery.

use proptest::prelude::*;

use stagehand::domain::services::ConfigFileSet;

/// Stems that may themselves contain dots (`Shop.Web`, `app.v2`).
fn dotted_stem() -> impl Strategy<Value = String> {
    let segment = proptest::string::string_regex("[A-Za-z0-9_-]{1,8}").unwrap();
    proptest::collection::vec(segment, 1..=3).prop_map(|segments| segments.join("."))
}

fn environment() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[a-z][a-z0-9]{0,7}").unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: `<stem>.<env><ext>` is an overlay of `<stem><ext>`, never a base.
    #[test]
    fn property_overlay_is_not_a_base(stem in dotted_stem(), env in environment()) {
        let base = format!("{stem}.config");
        let overlay = format!("{stem}.{env}.config");
        let set = ConfigFileSet::new([base.clone(), overlay.clone()], ".config");

        prop_assert!(set.is_overlay(&overlay));
        prop_assert!(!set.bases().contains(&overlay.as_str()));
        prop_assert!(set.bases().contains(&base.as_str()));
        prop_assert_eq!(set.overlay_for(&base, &env), Some(overlay.as_str()));
        prop_assert_eq!(set.transforms_for(&env), vec![(base.as_str(), overlay.as_str())]);
    }

    /// PROPERTY: Without its base, a dotted file name is a base of its own.
    #[test]
    fn property_orphan_dotted_file_is_a_base(stem in dotted_stem(), env in environment()) {
        let orphan = format!("{stem}.{env}.config");
        let set = ConfigFileSet::new([orphan.clone()], ".config");

        prop_assert!(!set.is_overlay(&orphan));
        prop_assert_eq!(set.bases(), vec![orphan.as_str()]);
    }

    /// PROPERTY: Every file of the extension is either a base or an overlay.
    #[test]
    fn property_bases_and_overlays_partition_the_set(
        names in proptest::collection::vec(dotted_stem(), 0..8)
    ) {
        let files: Vec<String> = names.iter().map(|n| format!("{n}.config")).collect();
        let set = ConfigFileSet::new(files.clone(), ".config");
        let bases = set.bases();

        for file in &files {
            prop_assert!(bases.contains(&file.as_str()) != set.is_overlay(file));
        }
    }

    /// PROPERTY: Discovery never panics on arbitrary names.
    #[test]
    fn property_discovery_never_panics(
        names in proptest::collection::vec("(?s).{0,24}", 0..8),
        env in "(?s).{0,8}"
    ) {
        let set = ConfigFileSet::new(names, ".config");
        let _ = set.transforms_for(&env);
    }
}
