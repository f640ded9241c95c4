//! Tests for the supervisor module

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use tempfile::{tempdir, TempDir};

use super::{LoopControl, Orchestrator, SupervisorEvent};
use crate::application::lifecycle::{ApplicationState, LifecycleServices, RunnableApplication};
use crate::application::testing::{FakeLauncher, FakeWatcher};
use crate::domain::entities::ApplicationSpec;
use crate::domain::policies::RetryPolicy;

struct Fixture {
    sources: TempDir,
    root: TempDir,
    launcher: FakeLauncher,
    watcher: FakeWatcher,
}

impl Fixture {
    fn new() -> Self {
        Self {
            sources: tempdir().unwrap(),
            root: tempdir().unwrap(),
            launcher: FakeLauncher::new(),
            watcher: FakeWatcher::new(),
        }
    }

    fn source(&self, name: &str) -> std::path::PathBuf {
        let dir = self.sources.path().join(name);
        fs::create_dir_all(dir.join("temp")).unwrap();
        fs::write(dir.join("web.config"), "<configuration />").unwrap();
        fs::write(dir.join("site.css"), "body {}").unwrap();
        fs::write(dir.join("temp/scratch.txt"), "scratch").unwrap();
        dir
    }

    fn application(&self, name: &str, ignored: &[&str]) -> RunnableApplication {
        let spec = ApplicationSpec::builder(self.source(name))
            .name(name)
            .ignored_paths(ignored.iter().map(|s| s.to_string()))
            .build()
            .unwrap();
        self.runnable(spec)
    }

    fn runnable(&self, spec: ApplicationSpec) -> RunnableApplication {
        self.runnable_with(spec, RetryPolicy::new(1, Duration::ZERO))
    }

    fn runnable_with(&self, spec: ApplicationSpec, retry: RetryPolicy) -> RunnableApplication {
        let services = LifecycleServices::new(
            Arc::new(self.launcher.clone()),
            Arc::new(self.watcher.clone()),
        )
        .with_retry(retry);
        RunnableApplication::new(spec, self.root.path(), Vec::new(), services)
    }

    fn retrying(&self, name: &str, retry: RetryPolicy) -> RunnableApplication {
        let spec = ApplicationSpec::builder(self.source(name))
            .name(name)
            .build()
            .unwrap();
        self.runnable_with(spec, retry)
    }

    /// Add `sub/x.css` to a started application's source and make every
    /// copy of it fail by putting a plain file where its staged parent
    /// directory would go.
    fn unsyncable(&self, name: &str) -> PathBuf {
        let changed = self.sources.path().join(name).join("sub/x.css");
        fs::create_dir_all(changed.parent().unwrap()).unwrap();
        fs::write(&changed, "a {}").unwrap();
        fs::write(self.root.path().join(name).join("sub"), "in the way").unwrap();
        changed
    }

    fn orchestrator(&self) -> Orchestrator {
        Orchestrator::new(vec![self.application("a", &[]), self.application("b", &[r"\\temp"])])
    }
}

#[test]
fn start_failure_is_isolated() {
    let fx = Fixture::new();
    let missing = ApplicationSpec::builder(fx.sources.path().join("nowhere"))
        .name("x")
        .build()
        .unwrap();
    let mut orchestrator = Orchestrator::new(vec![fx.runnable(missing), fx.application("y", &[])]);

    let failed = orchestrator.start_all();

    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].as_str(), "x");
    assert_eq!(orchestrator.application("x").unwrap().state(), ApplicationState::Stopped);
    assert_eq!(orchestrator.application("y").unwrap().state(), ApplicationState::Running);
    assert!(!fx.root.path().join("x").exists());

    orchestrator.sender().send(SupervisorEvent::Key('q')).unwrap();
    orchestrator.serve();
    orchestrator.stop_all();

    assert_eq!(fx.launcher.count("stop y"), 1);
    assert_eq!(fx.launcher.live("y"), 0);
    assert!(!fx.root.path().join("y").exists());
}

#[test]
fn failed_boot_gets_compensating_stop() {
    let fx = Fixture::new();
    fx.launcher.fail_start("a");
    let mut orchestrator = fx.orchestrator();

    let failed = orchestrator.start_all();

    assert_eq!(failed.len(), 1);
    assert_eq!(fx.launcher.live("a"), 0);
    assert_eq!(fx.launcher.count("unload a"), 1);
    assert_eq!(orchestrator.application("b").unwrap().state(), ApplicationState::Running);
}

#[test]
fn config_change_recycles_only_its_application() {
    let fx = Fixture::new();
    let mut orchestrator = fx.orchestrator();
    orchestrator.start_all();

    fx.watcher.emit(fx.sources.path().join("a/web.config"));
    assert_eq!(orchestrator.drain(), LoopControl::Continue);

    assert_eq!(fx.launcher.count("launch a"), 2);
    assert_eq!(fx.launcher.count("launch b"), 1);
    assert_eq!(fx.launcher.peak("a"), 1);
}

#[test]
fn reload_changes_in_one_batch_coalesce() {
    let fx = Fixture::new();
    let mut orchestrator = fx.orchestrator();
    orchestrator.start_all();

    fx.watcher.emit(fx.sources.path().join("a/web.config"));
    fx.watcher.emit(fx.sources.path().join("a/web.config"));
    fx.watcher.emit(fx.sources.path().join("a/bin.dll"));
    fx.watcher.emit(fx.sources.path().join("a/site.css"));
    orchestrator.drain();

    assert_eq!(fx.launcher.count("launch a"), 2);
}

#[test]
fn ignored_change_leaves_staging_untouched() {
    let fx = Fixture::new();
    let mut orchestrator = fx.orchestrator();
    orchestrator.start_all();
    let staged = fx.root.path().join("b/temp/scratch.txt");
    assert!(!staged.exists());

    let changed = fx.sources.path().join("b/temp/scratch.txt");
    fs::write(&changed, "edited").unwrap();
    fx.watcher.emit(changed);
    orchestrator.drain();

    assert!(!staged.exists());
    assert_eq!(fx.launcher.count("launch b"), 1);
}

#[test]
fn content_change_is_synced_without_recycle() {
    let fx = Fixture::new();
    let mut orchestrator = fx.orchestrator();
    orchestrator.start_all();

    let changed = fx.sources.path().join("a/site.css");
    fs::write(&changed, "body { color: red }").unwrap();
    fx.watcher.emit(changed.clone());
    fx.watcher.emit(changed);
    orchestrator.drain();

    let staged = fs::read_to_string(fx.root.path().join("a/site.css")).unwrap();
    assert_eq!(staged, "body { color: red }");
    assert_eq!(fx.launcher.count("launch a"), 1);
}

#[test]
fn quit_wins_over_pending_changes() {
    let fx = Fixture::new();
    let mut orchestrator = fx.orchestrator();
    orchestrator.start_all();

    let control = orchestrator.process_batch(vec![
        SupervisorEvent::file_changed(0, fx.sources.path().join("a/web.config")),
        SupervisorEvent::Key('q'),
    ]);

    assert_eq!(control, LoopControl::Quit);
    assert_eq!(fx.launcher.count("launch a"), 1);
}

#[test]
fn recycle_key_supersedes_older_changes() {
    let fx = Fixture::new();
    let before = Instant::now();
    let mut orchestrator = fx.orchestrator();
    orchestrator.start_all();

    let control = orchestrator.process_batch(vec![
        SupervisorEvent::FileChanged {
            application: 0,
            path: fx.sources.path().join("a/web.config"),
            observed: before,
            attempt: 1,
        },
        SupervisorEvent::Key('r'),
        SupervisorEvent::Key('x'),
    ]);

    assert_eq!(control, LoopControl::Continue);
    assert_eq!(fx.launcher.count("launch a"), 2);
    assert_eq!(fx.launcher.count("launch b"), 2);
}

#[test]
fn changes_for_stopped_applications_are_dropped() {
    let fx = Fixture::new();
    let mut orchestrator = fx.orchestrator();

    orchestrator.process_batch(vec![
        SupervisorEvent::file_changed(0, fx.sources.path().join("a/web.config")),
        SupervisorEvent::file_changed(7, fx.sources.path().join("a/web.config")),
    ]);

    assert!(fx.launcher.journal().is_empty());
}

#[test]
fn terminate_ends_serve() {
    let fx = Fixture::new();
    let mut orchestrator = fx.orchestrator();
    orchestrator.start_all();

    let sender = orchestrator.sender();
    sender.send(SupervisorEvent::Key('z')).unwrap();
    sender.send(SupervisorEvent::Terminate).unwrap();
    orchestrator.serve();
    assert!(orchestrator.stop_all().is_empty());

    assert_eq!(fx.launcher.live("a"), 0);
    assert_eq!(fx.launcher.live("b"), 0);
}

/// Feed retries back through the loop until none are waiting.
fn settle(orchestrator: &mut Orchestrator) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while orchestrator.pending_retries() > 0 && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(5));
        orchestrator.drain();
    }
}

#[test]
fn sync_retries_do_not_hold_up_other_applications() {
    let fx = Fixture::new();
    let retry = RetryPolicy::new(10, Duration::from_secs(2));
    let mut orchestrator = Orchestrator::new(vec![fx.retrying("a", retry), fx.retrying("b", retry)]);
    orchestrator.start_all();
    let stuck = fx.unsyncable("a");

    let started = Instant::now();
    let control = orchestrator.process_batch(vec![
        SupervisorEvent::file_changed(0, stuck),
        SupervisorEvent::file_changed(1, fx.sources.path().join("b/web.config")),
    ]);

    assert_eq!(control, LoopControl::Continue);
    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(fx.launcher.count("launch b"), 2);
    assert_eq!(orchestrator.pending_retries(), 1);

    let control = orchestrator.process_batch(vec![SupervisorEvent::Key('q')]);
    assert_eq!(control, LoopControl::Quit);
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[test]
fn exhausted_sync_keeps_application_running() {
    let fx = Fixture::new();
    let retry = RetryPolicy::new(3, Duration::from_millis(10));
    let mut orchestrator = Orchestrator::new(vec![fx.retrying("a", retry)]);
    orchestrator.start_all();
    let stuck = fx.unsyncable("a");

    orchestrator.process_batch(vec![SupervisorEvent::file_changed(0, stuck)]);
    assert_eq!(orchestrator.pending_retries(), 1);
    settle(&mut orchestrator);

    assert_eq!(orchestrator.pending_retries(), 0);
    assert_eq!(orchestrator.application("a").unwrap().state(), ApplicationState::Running);
    assert_eq!(fx.launcher.count("launch a"), 1);
    assert!(!fx.root.path().join("a/sub").is_dir());

    let css = fx.sources.path().join("a/site.css");
    fs::write(&css, "body { margin: 0 }").unwrap();
    orchestrator.process_batch(vec![SupervisorEvent::file_changed(0, css)]);

    let staged = fs::read_to_string(fx.root.path().join("a/site.css")).unwrap();
    assert_eq!(staged, "body { margin: 0 }");
}

#[test]
fn recycle_drops_pending_sync_retries() {
    let fx = Fixture::new();
    let retry = RetryPolicy::new(10, Duration::from_millis(10));
    let mut orchestrator = Orchestrator::new(vec![fx.retrying("a", retry)]);
    orchestrator.start_all();
    let stuck = fx.unsyncable("a");

    orchestrator.process_batch(vec![SupervisorEvent::file_changed(0, stuck)]);
    orchestrator.process_batch(vec![SupervisorEvent::Key('r')]);
    settle(&mut orchestrator);

    assert_eq!(orchestrator.pending_retries(), 0);
    assert_eq!(fx.launcher.count("launch a"), 2);
    assert_eq!(
        fs::read_to_string(fx.root.path().join("a/sub/x.css")).unwrap(),
        "a {}"
    );
}
