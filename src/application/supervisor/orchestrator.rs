//! Multi-application run loop

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use crate::application::lifecycle::{ApplicationState, RunnableApplication};
use crate::domain::policies::ChangeAction;
use crate::domain::value_objects::ApplicationName;
use crate::error::{error_chain, StagehandResult};
use crate::infrastructure::fs::SyncOutcome;

use super::event::{KeyCommand, LoopControl, SupervisorEvent};

/// One path to sync, as reported or as rescheduled after a failed attempt.
#[derive(Debug)]
struct PendingSync {
    path: PathBuf,
    observed: Instant,
    attempt: u32,
}

/// Changes collected for one application within a batch.
#[derive(Debug, Default)]
struct PendingChanges {
    recycle_on: Option<PathBuf>,
    sync: Vec<PendingSync>,
}

/// Owns every runnable application and is the only place that drives them.
pub struct Orchestrator {
    applications: Vec<RunnableApplication>,
    sender: Sender<SupervisorEvent>,
    events: Receiver<SupervisorEvent>,
    retries_in_flight: usize,
}

impl Orchestrator {
    /// Take ownership of the applications and route their watchers into the
    /// supervisor channel.
    pub fn new(mut applications: Vec<RunnableApplication>) -> Self {
        let (sender, events) = mpsc::channel();
        for (index, application) in applications.iter_mut().enumerate() {
            let tx = sender.clone();
            application.set_change_sink(Arc::new(move |path| {
                let _ = tx.send(SupervisorEvent::file_changed(index, path));
            }));
        }
        Self {
            applications,
            sender,
            events,
            retries_in_flight: 0,
        }
    }

    /// Handle for key readers and signal handlers.
    pub fn sender(&self) -> Sender<SupervisorEvent> {
        self.sender.clone()
    }

    pub fn applications(&self) -> &[RunnableApplication] {
        &self.applications
    }

    pub fn application(&self, name: &str) -> Option<&RunnableApplication> {
        self.applications.iter().find(|a| a.name().as_str() == name)
    }

    /// Sync retries waiting out their delay.
    pub fn pending_retries(&self) -> usize {
        self.retries_in_flight
    }

    /// Start every application, one after the other.
    ///
    /// Returns the names of the applications that failed; each of them has
    /// already been stopped again.
    pub fn start_all(&mut self) -> Vec<ApplicationName> {
        self.for_each_guarded("start", RunnableApplication::start)
    }

    /// Recycle every application with the same isolation as [`start_all`](Self::start_all).
    pub fn recycle_all(&mut self) -> Vec<ApplicationName> {
        self.for_each_guarded("recycle", RunnableApplication::recycle)
    }

    /// Stop every application; failures are logged and reported.
    pub fn stop_all(&mut self) -> Vec<ApplicationName> {
        let mut failed = Vec::new();
        for application in &mut self.applications {
            if let Err(e) = application.stop() {
                tracing::error!(
                    application = %application.name(),
                    "stop failed: {}",
                    error_chain(&e)
                );
                failed.push(application.name().clone());
            }
        }
        failed
    }

    /// Start everything, serve events until quit, then stop everything.
    pub fn run(&mut self) {
        let failed = self.start_all();
        let running = self.applications.len() - failed.len();
        tracing::info!(
            running,
            failed = failed.len(),
            "press 'r' to recycle all applications, 'q' to quit"
        );
        self.serve();
        tracing::info!("stopping all applications");
        self.stop_all();
    }

    /// Block on the supervisor channel until a quit request arrives.
    pub fn serve(&mut self) {
        loop {
            let Ok(first) = self.events.recv() else {
                return;
            };
            let mut batch = vec![first];
            batch.extend(self.pending());
            if self.process_batch(batch) == LoopControl::Quit {
                return;
            }
        }
    }

    /// Process whatever is queued right now without blocking.
    pub fn drain(&mut self) -> LoopControl {
        let batch = self.pending();
        if batch.is_empty() {
            return LoopControl::Continue;
        }
        self.process_batch(batch)
    }

    fn pending(&self) -> Vec<SupervisorEvent> {
        let mut batch = Vec::new();
        loop {
            match self.events.try_recv() {
                Ok(event) => batch.push(event),
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => return batch,
            }
        }
    }

    /// Apply one batch of events.
    ///
    /// A quit request wins over everything else in the batch. A recycle-all
    /// runs before file changes, and file changes are coalesced per
    /// application: one recycle when any path needs it, otherwise one sync
    /// attempt per distinct path. A failed attempt is rescheduled through the
    /// channel after the retry delay, so waiting never holds up the loop.
    pub fn process_batch(&mut self, batch: Vec<SupervisorEvent>) -> LoopControl {
        let mut recycle_all = false;
        let mut changes: Vec<(usize, PendingSync)> = Vec::new();

        for event in batch {
            match event {
                SupervisorEvent::Terminate => {
                    tracing::info!("termination requested");
                    return LoopControl::Quit;
                }
                SupervisorEvent::Key(key) => match KeyCommand::from_key(key) {
                    Some(KeyCommand::Quit) => return LoopControl::Quit,
                    Some(KeyCommand::RecycleAll) => recycle_all = true,
                    None => tracing::trace!(key = ?key, "key ignored"),
                },
                SupervisorEvent::FileChanged {
                    application,
                    path,
                    observed,
                    attempt,
                } => {
                    if attempt > 1 {
                        self.retries_in_flight = self.retries_in_flight.saturating_sub(1);
                    }
                    changes.push((
                        application,
                        PendingSync {
                            path,
                            observed,
                            attempt,
                        },
                    ));
                }
            }
        }

        if recycle_all {
            tracing::info!("recycling all applications");
            self.recycle_all();
        }

        let mut pending: BTreeMap<usize, PendingChanges> = BTreeMap::new();
        for (index, change) in changes {
            let Some(application) = self.applications.get(index) else {
                continue;
            };
            let path = &change.path;
            if application.state() != ApplicationState::Running {
                tracing::trace!(application = %application.name(), path = %path.display(), "not running, change dropped");
                continue;
            }
            if application.staged_at().is_some_and(|staged| change.observed < staged) {
                tracing::trace!(application = %application.name(), path = %path.display(), "change predates staging");
                continue;
            }
            let entry = pending.entry(index).or_default();
            match application.classify(path) {
                ChangeAction::Recycle => {
                    entry.recycle_on.get_or_insert(change.path);
                }
                ChangeAction::Sync => match entry.sync.iter().position(|s| s.path == change.path) {
                    Some(i) if change.attempt < entry.sync[i].attempt => entry.sync[i] = change,
                    Some(_) => {}
                    None => entry.sync.push(change),
                },
            }
        }

        for (index, changes) in pending {
            if let Some(trigger) = changes.recycle_on {
                tracing::info!(
                    application = %self.applications[index].name(),
                    path = %trigger.display(),
                    "change requires recycle"
                );
                self.guarded(index, "recycle", RunnableApplication::recycle);
                continue;
            }
            for sync in changes.sync {
                let outcome = self.applications[index].sync_file(&sync.path, sync.attempt);
                if let SyncOutcome::Retry { attempt, .. } = outcome {
                    self.schedule_retry(index, PendingSync { attempt, ..sync });
                }
            }
        }

        LoopControl::Continue
    }

    /// Send `retry` back into the channel once the application's retry
    /// delay has passed.
    fn schedule_retry(&mut self, index: usize, retry: PendingSync) {
        let delay = self.applications[index].retry_delay();
        let sender = self.sender.clone();
        let spawned = thread::Builder::new()
            .name("sync-retry".to_string())
            .spawn(move || {
                thread::sleep(delay);
                let _ = sender.send(SupervisorEvent::FileChanged {
                    application: index,
                    path: retry.path,
                    observed: retry.observed,
                    attempt: retry.attempt,
                });
            });
        match spawned {
            Ok(_) => self.retries_in_flight += 1,
            Err(e) => tracing::error!(
                application = %self.applications[index].name(),
                error = %e,
                "could not schedule sync retry"
            ),
        }
    }

    fn for_each_guarded<F>(&mut self, operation: &str, op: F) -> Vec<ApplicationName>
    where
        F: Fn(&mut RunnableApplication) -> StagehandResult<()>,
    {
        let mut failed = Vec::new();
        for index in 0..self.applications.len() {
            if !self.guarded(index, operation, &op) {
                failed.push(self.applications[index].name().clone());
            }
        }
        failed
    }

    /// Run `op` on one application; on failure log it and stop that
    /// application only. Returns whether `op` succeeded.
    fn guarded<F>(&mut self, index: usize, operation: &str, op: F) -> bool
    where
        F: Fn(&mut RunnableApplication) -> StagehandResult<()>,
    {
        let application = &mut self.applications[index];
        let Err(e) = op(&mut *application) else {
            return true;
        };

        tracing::error!(
            application = %application.name(),
            fatal = e.is_fatal_to_start(),
            "{operation} failed: {}",
            error_chain(&e)
        );
        if let Err(stop_error) = application.stop() {
            tracing::warn!(
                application = %application.name(),
                "compensating stop failed: {}",
                error_chain(&stop_error)
            );
        }
        false
    }
}
