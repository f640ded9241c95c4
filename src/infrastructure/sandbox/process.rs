//! Child-process execution sandbox
//!
//! Each application runs its bootstrapper in its own process. Killing that
//! process releases everything it held, which is what lets the staging
//! directory be wiped and copied again.

use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use crate::domain::entities::HostArguments;
use crate::domain::ports::{Sandbox, SandboxLauncher, SandboxSetup};
use crate::error::{StagehandError, StagehandResult};

use super::protocol::{encode, parse_response, Request, Response};

const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Launches bootstrapper processes.
#[derive(Debug, Clone)]
pub struct ProcessLauncher {
    program: String,
    args: Vec<String>,
    call_timeout: Duration,
    exit_grace: Duration,
}

impl ProcessLauncher {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            call_timeout: Duration::from_secs(30),
            exit_grace: Duration::from_secs(5),
        }
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    pub fn with_exit_grace(mut self, grace: Duration) -> Self {
        self.exit_grace = grace;
        self
    }
}

/// Prefer a program shipped in the staging directory over one on `PATH`.
fn resolve_program(program: &str, base_directory: &Path) -> PathBuf {
    let as_path = Path::new(program);
    if as_path.is_absolute() {
        return as_path.to_path_buf();
    }
    if as_path.components().count() > 1 {
        return base_directory.join(as_path);
    }
    let local = base_directory.join(program);
    if local.is_file() {
        return local;
    }
    if cfg!(windows) {
        let exe = base_directory.join(format!("{program}.exe"));
        if exe.is_file() {
            return exe;
        }
    }
    PathBuf::from(program)
}

impl SandboxLauncher for ProcessLauncher {
    fn launch(&self, setup: &SandboxSetup) -> StagehandResult<Box<dyn Sandbox>> {
        let program = setup.program.as_deref().unwrap_or(&self.program);
        let resolved = resolve_program(program, &setup.base_directory);

        tracing::debug!(
            application = %setup.application,
            program = %resolved.display(),
            "launching bootstrapper"
        );

        let mut child = Command::new(&resolved)
            .args(&self.args)
            .current_dir(&setup.base_directory)
            .env("STAGEHAND_APPLICATION", &setup.application)
            .env("STAGEHAND_BASE_DIR", &setup.base_directory)
            .env("STAGEHAND_CONFIG_FILE", setup.configuration_path())
            .env("STAGEHAND_ENVIRONMENT", &setup.environment)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| StagehandError::Sandbox {
                application: setup.application.clone(),
                message: format!("cannot start {}: {e}", resolved.display()),
            })?;

        let stdin = child.stdin.take();
        // The reader is detached: grandchildren may keep the pipe open after
        // the bootstrapper itself is gone.
        let responses = match child.stdout.take() {
            Some(stdout) => {
                let (tx, rx) = mpsc::channel();
                let application = setup.application.clone();
                thread::Builder::new()
                    .name(format!("sandbox-{application}"))
                    .spawn(move || {
                        for line in BufReader::new(stdout).lines() {
                            let Ok(line) = line else { break };
                            match parse_response(&line) {
                                Some(response) => {
                                    if tx.send(response).is_err() {
                                        break;
                                    }
                                }
                                None => tracing::info!(application = %application, "{line}"),
                            }
                        }
                    })?;
                rx
            }
            None => mpsc::channel().1,
        };

        Ok(Box::new(ProcessSandbox {
            application: setup.application.clone(),
            child,
            stdin,
            responses,
            call_timeout: self.call_timeout,
            exit_grace: self.exit_grace,
            reaped: false,
        }))
    }
}

/// A running bootstrapper process.
pub struct ProcessSandbox {
    application: String,
    child: Child,
    stdin: Option<ChildStdin>,
    responses: Receiver<Response>,
    call_timeout: Duration,
    exit_grace: Duration,
    reaped: bool,
}

impl ProcessSandbox {
    pub fn id(&self) -> u32 {
        self.child.id()
    }

    fn failure(&self, operation: &'static str, message: impl Into<String>) -> StagehandError {
        StagehandError::Bootstrap {
            application: self.application.clone(),
            operation,
            message: message.into(),
        }
    }

    fn call(&mut self, request: Request) -> StagehandResult<()> {
        let operation = request.operation();
        let line = encode(&request)?;

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(self.failure(operation, "bootstrapper input is closed"));
        };
        if let Err(e) = writeln!(stdin, "{line}").and_then(|()| stdin.flush()) {
            let message = format!("cannot reach bootstrapper: {e}");
            return Err(self.failure(operation, message));
        }

        match self.responses.recv_timeout(self.call_timeout) {
            Ok(Response::Ok) => Ok(()),
            Ok(Response::Error { message }) => Err(self.failure(operation, message)),
            Err(RecvTimeoutError::Timeout) => Err(self.failure(
                operation,
                format!("no response within {}s", self.call_timeout.as_secs_f32()),
            )),
            Err(RecvTimeoutError::Disconnected) => {
                let status = match self.child.try_wait() {
                    Ok(Some(status)) => status.to_string(),
                    _ => "closed its output".to_string(),
                };
                Err(self.failure(operation, format!("bootstrapper exited ({status})")))
            }
        }
    }

    /// Wait for the child to exit on its own, killing it after the grace period.
    fn reap(&mut self) -> StagehandResult<()> {
        if self.reaped {
            return Ok(());
        }
        self.stdin.take();

        let deadline = Instant::now() + self.exit_grace;
        loop {
            if self.child.try_wait()?.is_some() {
                break;
            }
            if Instant::now() >= deadline {
                tracing::warn!(application = %self.application, "bootstrapper did not exit, killing it");
                self.child.kill()?;
                self.child.wait()?;
                break;
            }
            thread::sleep(EXIT_POLL_INTERVAL);
        }
        self.reaped = true;
        Ok(())
    }
}

impl Sandbox for ProcessSandbox {
    fn initialize(&mut self, staging_directory: &Path) -> StagehandResult<()> {
        self.call(Request::Initialize {
            path: staging_directory.to_string_lossy().into_owned(),
        })
    }

    fn start(&mut self, environment: &str, host_arguments: &HostArguments) -> StagehandResult<()> {
        self.call(Request::Start {
            environment: environment.to_string(),
            host_arguments: host_arguments.clone(),
        })
    }

    fn stop(&mut self) -> StagehandResult<()> {
        self.call(Request::Stop)
    }

    fn unload(mut self: Box<Self>) -> StagehandResult<()> {
        self.reap().map_err(|e| StagehandError::Sandbox {
            application: self.application.clone(),
            message: format!("unload failed: {e}"),
        })
    }
}

impl Drop for ProcessSandbox {
    fn drop(&mut self) {
        if self.reaped {
            return;
        }
        self.stdin.take();
        if let Ok(None) = self.child.try_wait() {
            let _ = self.child.kill();
        }
        let _ = self.child.wait();
    }
}
