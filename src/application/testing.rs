//! In-memory launcher and watcher for lifecycle tests.
//!
//! Shared by the unit tests and the integration suites under `tests/`.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::domain::entities::HostArguments;
use crate::domain::ports::{
    ChangeCallback, ChangeWatcher, Sandbox, SandboxLauncher, SandboxSetup, WatchHandle,
};
use crate::error::{StagehandError, StagehandResult};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Default)]
struct LauncherState {
    journal: Vec<String>,
    live: BTreeMap<String, usize>,
    peak: BTreeMap<String, usize>,
    setups: Vec<SandboxSetup>,
    failing_starts: BTreeSet<String>,
}

/// Launcher whose sandboxes only record what happens to them.
#[derive(Clone, Default)]
pub struct FakeLauncher {
    state: Arc<Mutex<LauncherState>>,
}

impl FakeLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `start` fail for the named application.
    pub fn fail_start(&self, application: &str) {
        lock(&self.state).failing_starts.insert(application.to_string());
    }

    pub fn journal(&self) -> Vec<String> {
        lock(&self.state).journal.clone()
    }

    pub fn count(&self, entry: &str) -> usize {
        self.journal().iter().filter(|e| *e == entry).count()
    }

    pub fn live(&self, application: &str) -> usize {
        lock(&self.state).live.get(application).copied().unwrap_or(0)
    }

    /// Highest number of sandboxes that coexisted for an application.
    pub fn peak(&self, application: &str) -> usize {
        lock(&self.state).peak.get(application).copied().unwrap_or(0)
    }

    pub fn setups(&self) -> Vec<SandboxSetup> {
        lock(&self.state).setups.clone()
    }
}

impl SandboxLauncher for FakeLauncher {
    fn launch(&self, setup: &SandboxSetup) -> StagehandResult<Box<dyn Sandbox>> {
        let mut state = lock(&self.state);
        let name = setup.application.clone();
        state.journal.push(format!("launch {name}"));
        state.setups.push(setup.clone());
        let live = {
            let live = state.live.entry(name.clone()).or_default();
            *live += 1;
            *live
        };
        let peak = state.peak.entry(name.clone()).or_default();
        *peak = (*peak).max(live);
        Ok(Box::new(FakeSandbox {
            application: name,
            state: Arc::clone(&self.state),
        }))
    }
}

struct FakeSandbox {
    application: String,
    state: Arc<Mutex<LauncherState>>,
}

impl FakeSandbox {
    fn record(&self, entry: String) {
        lock(&self.state).journal.push(entry);
    }
}

impl Sandbox for FakeSandbox {
    fn initialize(&mut self, staging_directory: &Path) -> StagehandResult<()> {
        assert!(staging_directory.is_dir(), "staging directory must exist before initialize");
        self.record(format!("initialize {}", self.application));
        Ok(())
    }

    fn start(&mut self, environment: &str, _host_arguments: &HostArguments) -> StagehandResult<()> {
        self.record(format!("start {} {environment}", self.application));
        if lock(&self.state).failing_starts.contains(&self.application) {
            return Err(StagehandError::Bootstrap {
                application: self.application.clone(),
                operation: "start",
                message: "refused".to_string(),
            });
        }
        Ok(())
    }

    fn stop(&mut self) -> StagehandResult<()> {
        self.record(format!("stop {}", self.application));
        Ok(())
    }

    fn unload(self: Box<Self>) -> StagehandResult<()> {
        let mut state = lock(&self.state);
        state.journal.push(format!("unload {}", self.application));
        if let Some(live) = state.live.get_mut(&self.application) {
            *live -= 1;
        }
        Ok(())
    }
}

type Slot = Arc<Mutex<Option<ChangeCallback>>>;

/// Watcher that delivers events only when a test emits them.
#[derive(Clone, Default)]
pub struct FakeWatcher {
    watches: Arc<Mutex<Vec<(PathBuf, Slot)>>>,
}

impl FakeWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver `path` to every active watch whose root contains it.
    pub fn emit(&self, path: impl Into<PathBuf>) {
        let path = path.into();
        let watches = lock(&self.watches);
        for (root, slot) in watches.iter() {
            if path.starts_with(root) {
                if let Some(callback) = lock(slot).as_ref() {
                    callback(path.clone());
                }
            }
        }
    }

    pub fn active(&self) -> usize {
        lock(&self.watches)
            .iter()
            .filter(|(_, slot)| lock(slot).is_some())
            .count()
    }
}

impl ChangeWatcher for FakeWatcher {
    fn watch(
        &self,
        root: &Path,
        _filter: &str,
        on_change: ChangeCallback,
    ) -> StagehandResult<Box<dyn WatchHandle>> {
        let slot: Slot = Arc::new(Mutex::new(Some(on_change)));
        lock(&self.watches).push((root.to_path_buf(), Arc::clone(&slot)));
        Ok(Box::new(FakeWatch { slot }))
    }
}

struct FakeWatch {
    slot: Slot,
}

impl WatchHandle for FakeWatch {
    fn stop(&mut self) {
        lock(&self.slot).take();
    }
}
