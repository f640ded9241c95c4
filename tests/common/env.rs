//! Isolated environment for running the `stagehand` binary.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tempfile::TempDir;

/// Result of running a Stagehand CLI command
#[derive(Debug)]
pub struct TestResult {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// Temporary home and runtime root.
pub struct TestEnv {
    pub home_dir: TempDir,
    pub runtime_root: TempDir,
    bin: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            home_dir: tempfile::tempdir().unwrap(),
            runtime_root: tempfile::tempdir().unwrap(),
            bin: PathBuf::from(env!("CARGO_BIN_EXE_stagehand")),
        }
    }

    pub fn applications_root(&self) -> PathBuf {
        self.runtime_root.path().join("Applications")
    }

    /// Run the binary with `args`, feeding `stdin` as piped input.
    pub fn run(&self, args: &[&str], stdin: &str, cwd: &Path) -> TestResult {
        let mut child = Command::new(&self.bin)
            .args(args)
            .current_dir(cwd)
            .env("STAGEHAND_TEST_HOME", self.home_dir.path())
            .env("STAGEHAND_HOME", self.runtime_root.path())
            .env("XDG_CONFIG_HOME", self.home_dir.path().join(".config"))
            .env("NO_COLOR", "1")
            .env_remove("STAGEHAND_LOG")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .unwrap();

        if let Some(mut input) = child.stdin.take() {
            input.write_all(stdin.as_bytes()).unwrap();
        }
        let output = child.wait_with_output().unwrap();

        TestResult {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}
