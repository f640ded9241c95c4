//! Scenario: two applications, one of them ignoring its scratch directory.

use std::fs;
use std::sync::Arc;

use stagehand::application::{lifecycle_services, LifecycleServices, Runtime, SupervisorEvent};
use stagehand::{ApplicationSpec, Settings};

use crate::common::{FakeLauncher, FakeWatcher, SourceTree};

struct Session {
    a: SourceTree,
    b: SourceTree,
    root: tempfile::TempDir,
    launcher: FakeLauncher,
    watcher: FakeWatcher,
    runtime: Runtime,
}

fn session() -> Session {
    let a = SourceTree::web_application();
    let b = SourceTree::web_application();
    let root = tempfile::tempdir().unwrap();
    let launcher = FakeLauncher::default();
    let watcher = FakeWatcher::default();

    let mut settings = Settings::default();
    settings.runtime.root = Some(root.path().to_path_buf());
    settings.sync.retry_delay_ms = 0;
    let services: LifecycleServices = lifecycle_services(
        &settings,
        Arc::new(launcher.clone()),
        Arc::new(watcher.clone()),
    );

    let specs = vec![
        ApplicationSpec::builder(a.path()).name("A").build().unwrap(),
        ApplicationSpec::builder(b.path())
            .name("B")
            .ignored_path(r"\\temp")
            .build()
            .unwrap(),
    ];
    let runtime = Runtime::with_services(&settings, specs, services).unwrap();

    Session {
        a,
        b,
        root,
        launcher,
        watcher,
        runtime,
    }
}

#[test]
fn scenario_ignored_edit_and_config_recycle() {
    let mut s = session();
    let failed = s.runtime.orchestrator_mut().start_all();
    assert!(failed.is_empty());

    let staged_a = s.root.path().join("Applications/A");
    let staged_b = s.root.path().join("Applications/B");
    assert!(staged_a.join("temp/scratch.txt").is_file());
    assert!(!staged_b.join("temp").exists());

    // Editing B's ignored scratch file changes nothing.
    let scratch = s.b.join("temp/scratch.txt");
    fs::write(&scratch, "edited").unwrap();
    s.watcher.emit(&scratch);
    s.runtime.orchestrator_mut().drain();
    assert!(!staged_b.join("temp").exists());

    // Editing A's configuration recycles A only.
    let config = s.a.join("web.config");
    fs::write(&config, stagehand_fixture_config("changed")).unwrap();
    s.watcher.emit(&config);
    s.runtime.orchestrator_mut().drain();

    assert_eq!(s.launcher.count("launch A"), 2);
    assert_eq!(s.launcher.count("launch B"), 1);
    assert_eq!(s.launcher.peak("A"), 1);
    let staged = fs::read_to_string(staged_a.join("web.config")).unwrap();
    assert!(staged.contains("changed"));

    // Content edits are synced in place.
    let css = s.a.join("content/site.css");
    fs::write(&css, "body { margin: 0 }").unwrap();
    s.watcher.emit(&css);
    s.runtime.orchestrator_mut().drain();
    assert_eq!(
        fs::read_to_string(staged_a.join("content/site.css")).unwrap(),
        "body { margin: 0 }"
    );
    assert_eq!(s.launcher.count("launch A"), 2);

    s.runtime.orchestrator().sender().send(SupervisorEvent::Key('q')).unwrap();
    s.runtime.orchestrator_mut().serve();
    s.runtime.orchestrator_mut().stop_all();

    assert!(!staged_a.exists());
    assert!(!staged_b.exists());
    assert_eq!(s.launcher.live("A"), 0);
    assert_eq!(s.launcher.live("B"), 0);
}

#[test]
fn scenario_recycle_key_restarts_everything() {
    let mut s = session();
    s.runtime.orchestrator_mut().start_all();

    let sender = s.runtime.orchestrator().sender();
    sender.send(SupervisorEvent::Key('r')).unwrap();
    sender.send(SupervisorEvent::Key('q')).unwrap();
    s.runtime.orchestrator_mut().serve();

    // 'r' and 'q' were queued together, so quit wins.
    assert_eq!(s.launcher.count("launch A"), 1);

    s.runtime.orchestrator().sender().send(SupervisorEvent::Key('r')).unwrap();
    s.runtime.orchestrator_mut().drain();
    assert_eq!(s.launcher.count("launch A"), 2);
    assert_eq!(s.launcher.count("launch B"), 2);
    assert_eq!(s.launcher.peak("A"), 1);
}

fn stagehand_fixture_config(mode: &str) -> String {
    format!("<configuration>\n  <appSettings>\n    <add key=\"mode\" value=\"{mode}\" />\n  </appSettings>\n</configuration>\n")
}
