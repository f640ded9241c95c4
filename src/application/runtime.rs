//! Wiring of a supervisor run from settings

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::Settings;
use crate::domain::entities::ApplicationSpec;
use crate::domain::ports::{ChangeWatcher, SandboxLauncher};
use crate::error::{StagehandError, StagehandResult};
use crate::infrastructure::fs::ApplicationLock;
use crate::infrastructure::{HostRegistry, NotifyWatcher, ProcessLauncher};

use super::lifecycle::{LifecycleServices, RunnableApplication};
use super::supervisor::Orchestrator;

/// Lifecycle services configured from settings around the given launcher and watcher.
pub fn lifecycle_services(
    settings: &Settings,
    launcher: Arc<dyn SandboxLauncher>,
    watcher: Arc<dyn ChangeWatcher>,
) -> LifecycleServices {
    LifecycleServices::new(launcher, watcher)
        .with_reload(settings.reload_policy())
        .with_retry(settings.retry_policy())
        .with_transform_extensions(settings.transform_extensions())
}

/// An orchestrator plus the locks on the applications it owns.
pub struct Runtime {
    // Declared before the locks so applications stop before the locks go.
    orchestrator: Orchestrator,
    applications_root: PathBuf,
    _locks: Vec<ApplicationLock>,
}

impl Runtime {
    /// Build a runtime with child-process sandboxes and filesystem watchers.
    pub fn new(settings: &Settings, specs: Vec<ApplicationSpec>) -> StagehandResult<Self> {
        let launcher = ProcessLauncher::new(settings.sandbox.program.clone(), settings.sandbox.args.clone())
            .with_call_timeout(settings.call_timeout())
            .with_exit_grace(settings.exit_grace());
        let services = lifecycle_services(settings, Arc::new(launcher), Arc::new(NotifyWatcher::new()));
        Self::with_services(settings, specs, services)
    }

    /// Build a runtime around explicit services.
    ///
    /// Fails before anything is started when two specs share a name, a host
    /// cannot be resolved, or another process supervises one of the names.
    pub fn with_services(
        settings: &Settings,
        specs: Vec<ApplicationSpec>,
        services: LifecycleServices,
    ) -> StagehandResult<Self> {
        ensure_unique_names(&specs)?;

        let applications_root = settings.applications_root();
        let registry = HostRegistry::new(settings.hosts_root(), settings.hosts.clone());

        let mut locks = Vec::with_capacity(specs.len());
        let mut applications = Vec::with_capacity(specs.len());
        for spec in specs {
            let hosts = registry.resolve_all(spec.hosts().iter().map(|h| h.name.as_str()))?;
            locks.push(ApplicationLock::acquire(&applications_root, spec.name().as_str())?);
            applications.push(RunnableApplication::new(
                spec,
                &applications_root,
                hosts,
                services.clone(),
            ));
        }

        Ok(Self {
            orchestrator: Orchestrator::new(applications),
            applications_root,
            _locks: locks,
        })
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    pub fn orchestrator_mut(&mut self) -> &mut Orchestrator {
        &mut self.orchestrator
    }

    pub fn applications_root(&self) -> &Path {
        &self.applications_root
    }

    /// Start everything, serve events until quit, stop everything.
    pub fn run(&mut self) {
        self.orchestrator.run();
    }
}

fn ensure_unique_names(specs: &[ApplicationSpec]) -> StagehandResult<()> {
    let mut seen: BTreeMap<String, &Path> = BTreeMap::new();
    for spec in specs {
        let key = spec.name().as_str().to_ascii_lowercase();
        if let Some(first) = seen.get(&key) {
            return Err(StagehandError::DuplicateApplication {
                name: spec.name().to_string(),
                first: first.to_path_buf(),
                second: spec.source().to_path_buf(),
            });
        }
        seen.insert(key, spec.source());
    }
    Ok(())
}
