//! Runnable application state machine

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::domain::entities::ApplicationSpec;
use crate::domain::policies::ChangeAction;
use crate::domain::ports::{HostAdapter, Sandbox, SandboxSetup, WatchHandle, MATCH_ALL};
use crate::domain::value_objects::ApplicationName;
use crate::error::{StagehandError, StagehandResult};
use crate::infrastructure::fs::{DeploymentStager, SyncOutcome};
use crate::infrastructure::transform::ConfigTransformer;

use super::services::{ChangeSink, LifecycleServices};

/// Observable lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplicationState {
    Stopped,
    Running,
}

/// What exists while an application is (being) started.
#[derive(Default)]
struct RunningInstance {
    sandbox: Option<Box<dyn Sandbox>>,
    watchers: Vec<Box<dyn WatchHandle>>,
    started: bool,
}

/// One supervised application: staging directory, sandbox and watcher.
pub struct RunnableApplication {
    spec: ApplicationSpec,
    staging_directory: PathBuf,
    configuration_file: String,
    hosts: Vec<Arc<dyn HostAdapter>>,
    services: LifecycleServices,
    stager: DeploymentStager,
    sink: ChangeSink,
    instance: Option<RunningInstance>,
    staged_at: Option<Instant>,
}

impl RunnableApplication {
    /// `applications_root` is the parent of every staging directory.
    pub fn new(
        spec: ApplicationSpec,
        applications_root: &Path,
        hosts: Vec<Arc<dyn HostAdapter>>,
        services: LifecycleServices,
    ) -> Self {
        let staging_directory = applications_root.join(spec.name().as_str());
        let configuration_file = format!("{}{}", spec.name(), services.config_extension());
        let stager = DeploymentStager::new(spec.ignore().clone(), services.retry);
        let name = spec.name().clone();
        let sink: ChangeSink = Arc::new(move |path: PathBuf| {
            tracing::debug!(application = %name, path = %path.display(), "change with no supervisor");
        });
        Self {
            spec,
            staging_directory,
            configuration_file,
            hosts,
            services,
            stager,
            sink,
            instance: None,
            staged_at: None,
        }
    }

    /// Route watcher notifications somewhere; takes effect on the next start.
    pub fn set_change_sink(&mut self, sink: ChangeSink) {
        self.sink = sink;
    }

    pub fn name(&self) -> &ApplicationName {
        self.spec.name()
    }

    pub fn spec(&self) -> &ApplicationSpec {
        &self.spec
    }

    pub fn staging_directory(&self) -> &Path {
        &self.staging_directory
    }

    /// Configuration file name the sandbox is keyed by.
    pub fn configuration_file_name(&self) -> &str {
        &self.configuration_file
    }

    pub fn state(&self) -> ApplicationState {
        match &self.instance {
            Some(instance) if instance.started => ApplicationState::Running,
            _ => ApplicationState::Stopped,
        }
    }

    /// When the latest staging began.
    pub fn staged_at(&self) -> Option<Instant> {
        self.staged_at
    }

    /// Stage, transform, boot and watch.
    ///
    /// A previous instance is stopped first. On error the partially created
    /// instance is kept so that a following [`stop`](Self::stop) releases it.
    pub fn start(&mut self) -> StagehandResult<()> {
        if self.instance.is_some() {
            tracing::debug!(application = %self.name(), "already started, stopping first");
            self.stop()?;
        }

        let name = self.name().clone();
        let staging = self.staging_directory.clone();
        let started = Instant::now();
        self.staged_at = Some(started);
        self.instance = Some(RunningInstance::default());

        tracing::info!(application = %name, source = %self.spec.source().display(), "starting");

        DeploymentStager::clear(&staging)?;
        let stats = self.stager.mirror(self.spec.source(), &staging)?;
        tracing::debug!(application = %name, files = stats.files, "staged");

        for host in &self.hosts {
            host.prepare(&staging)?;
        }

        for extension in self.services.transform_extensions.clone() {
            let transformed = ConfigTransformer::new(&extension)
                .transform_tree(&staging, self.spec.environment())?;
            if !transformed.is_empty() {
                tracing::info!(
                    application = %name,
                    extension = %extension,
                    files = transformed.len(),
                    environment = self.spec.environment(),
                    "configuration transformed"
                );
            }
        }

        let setup = SandboxSetup {
            application: name.to_string(),
            base_directory: staging.clone(),
            configuration_file: self.configuration_file.clone(),
            environment: self.spec.environment().to_string(),
            program: self.spec.bootstrapper().map(str::to_string),
        };
        let sandbox = self.services.launcher.launch(&setup)?;
        let host_arguments = self.spec.host_arguments();

        let instance = self.instance.get_or_insert_with(RunningInstance::default);
        let sandbox = instance.sandbox.insert(sandbox);
        sandbox.initialize(&staging)?;
        sandbox.start(self.spec.environment(), &host_arguments)?;
        instance.started = true;

        let sink = Arc::clone(&self.sink);
        let watch = self.services.watcher.watch(
            self.spec.source(),
            MATCH_ALL,
            Box::new(move |path| sink(path)),
        )?;
        instance.watchers.push(watch);

        tracing::info!(
            application = %name,
            environment = self.spec.environment(),
            staging = %staging.display(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "running"
        );
        Ok(())
    }

    /// Stop watching, stop and unload the sandbox, tear hosts down and delete
    /// the staging directory.
    ///
    /// Every step runs even when an earlier one fails; the first error is
    /// returned. Calling this on a stopped application only makes sure the
    /// staging directory is gone.
    pub fn stop(&mut self) -> StagehandResult<()> {
        let mut first_error: Option<StagehandError> = None;
        let mut record = |result: StagehandResult<()>| {
            if let Err(e) = result {
                first_error.get_or_insert(e);
            }
        };

        let was_running = self.state() == ApplicationState::Running;

        if let Some(mut instance) = self.instance.take() {
            for watcher in &mut instance.watchers {
                watcher.stop();
            }
            if let Some(mut sandbox) = instance.sandbox.take() {
                if instance.started {
                    record(sandbox.stop());
                }
                record(sandbox.unload());
            }
        }

        for host in &self.hosts {
            record(host.tear_down(&self.staging_directory));
        }
        record(DeploymentStager::clear(&self.staging_directory));

        if was_running {
            tracing::info!(application = %self.name(), "stopped");
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Stop then start.
    pub fn recycle(&mut self) -> StagehandResult<()> {
        tracing::info!(application = %self.name(), "recycling");
        self.stop()?;
        self.start()
    }

    /// How a change to `path` should be handled.
    pub fn classify(&self, path: &Path) -> ChangeAction {
        self.services.reload.classify(path)
    }

    /// Pause between sync attempts.
    pub fn retry_delay(&self) -> Duration {
        self.stager.retry_policy().delay()
    }

    /// Make one attempt (1-based) at copying a changed source path into the
    /// staging directory. A [`SyncOutcome::Retry`] leaves scheduling the next
    /// attempt to the caller.
    pub fn sync_file(&self, path: &Path, attempt: u32) -> SyncOutcome {
        let outcome =
            self.stager
                .sync_file(self.spec.source(), &self.staging_directory, path, attempt);
        let name = self.name();
        match &outcome {
            SyncOutcome::Copied {
                destination,
                attempts,
            } => {
                tracing::info!(application = %name, file = %destination.display(), attempts, "synced")
            }
            SyncOutcome::Removed { destination } => {
                tracing::info!(application = %name, file = %destination.display(), "removed")
            }
            SyncOutcome::DirectoryMirrored { destination } => {
                tracing::info!(application = %name, directory = %destination.display(), "directory synced")
            }
            SyncOutcome::Ignored | SyncOutcome::OutsideSource => {
                tracing::trace!(application = %name, path = %path.display(), "change skipped")
            }
            SyncOutcome::Retry { attempt, error } => tracing::debug!(
                application = %name,
                path = %path.display(),
                next_attempt = attempt,
                error = %error,
                "sync failed, will retry"
            ),
            SyncOutcome::Failed { attempts, error } => tracing::error!(
                application = %name,
                path = %path.display(),
                attempts,
                error = %error,
                "sync failed, staged copy may be stale"
            ),
        }
        outcome
    }
}

impl Drop for RunnableApplication {
    fn drop(&mut self) {
        if self.instance.is_some() {
            if let Err(e) = self.stop() {
                tracing::warn!(application = %self.name(), error = %e, "stop on drop failed");
            }
        }
    }
}
