//! Scenario: one application cannot start, its sibling keeps running.

use std::sync::Arc;

use stagehand::application::{lifecycle_services, ApplicationState, Runtime, SupervisorEvent};
use stagehand::{ApplicationSpec, Settings};

use crate::common::{FakeLauncher, FakeWatcher, SourceTree};

#[test]
fn scenario_missing_source_does_not_block_sibling() {
    let y = SourceTree::web_application();
    let root = tempfile::tempdir().unwrap();
    let launcher = FakeLauncher::default();

    let mut settings = Settings::default();
    settings.runtime.root = Some(root.path().to_path_buf());
    let services = lifecycle_services(
        &settings,
        Arc::new(launcher.clone()),
        Arc::new(FakeWatcher::default()),
    );
    let specs = vec![
        ApplicationSpec::builder(y.join("does-not-exist")).name("X").build().unwrap(),
        ApplicationSpec::builder(y.path()).name("Y").build().unwrap(),
    ];
    let mut runtime = Runtime::with_services(&settings, specs, services).unwrap();

    let failed = runtime.orchestrator_mut().start_all();

    assert_eq!(failed.iter().map(|n| n.as_str()).collect::<Vec<_>>(), vec!["X"]);
    let orchestrator = runtime.orchestrator();
    assert_eq!(orchestrator.application("X").unwrap().state(), ApplicationState::Stopped);
    assert_eq!(orchestrator.application("Y").unwrap().state(), ApplicationState::Running);
    assert!(!root.path().join("Applications/X").exists());
    assert_eq!(launcher.count("launch X"), 0);

    orchestrator.sender().send(SupervisorEvent::Key('q')).unwrap();
    runtime.orchestrator_mut().serve();
    assert!(runtime.orchestrator_mut().stop_all().is_empty());

    assert_eq!(launcher.count("stop Y"), 1);
    assert_eq!(launcher.count("unload Y"), 1);
    assert!(!root.path().join("Applications/Y").exists());
}
