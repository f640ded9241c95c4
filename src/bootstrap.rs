//! Child side of the sandbox protocol
//!
//! A Rust application run by stagehand implements [`Bootstrap`] and hands
//! it to [`serve_stdio`] from its `main`:
//!
//! ```no_run
//! use std::path::Path;
//! use stagehand::bootstrap::{serve_stdio, Bootstrap, BootstrapResult};
//! use stagehand::domain::entities::HostArguments;
//!
//! struct Shop;
//!
//! impl Bootstrap for Shop {
//!     fn initialize(&mut self, _path: &Path) -> BootstrapResult { Ok(()) }
//!     fn start(&mut self, _environment: &str, _hosts: &HostArguments) -> BootstrapResult { Ok(()) }
//!     fn stop(&mut self) -> BootstrapResult { Ok(()) }
//! }
//!
//! fn main() -> std::io::Result<()> {
//!     serve_stdio(&mut Shop)
//! }
//! ```

use std::io::{self, BufRead, Write};
use std::path::Path;

use crate::domain::entities::HostArguments;
use crate::infrastructure::sandbox::protocol::{encode, parse_request, Request, Response};

/// Result of a bootstrap call; the error message is reported to the supervisor.
pub type BootstrapResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// The application's entry points.
pub trait Bootstrap {
    /// Called once with the staging directory the application runs from.
    fn initialize(&mut self, path: &Path) -> BootstrapResult;

    /// Boot in `environment`; `host_arguments` maps host names to arguments.
    fn start(&mut self, environment: &str, host_arguments: &HostArguments) -> BootstrapResult;

    fn stop(&mut self) -> BootstrapResult;
}

/// Answer requests from `input` until it closes.
pub fn serve<B, R, W>(bootstrap: &mut B, input: R, mut output: W) -> io::Result<()>
where
    B: Bootstrap + ?Sized,
    R: BufRead,
    W: Write,
{
    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let outcome = match parse_request(&line) {
            Ok(Request::Initialize { path }) => bootstrap.initialize(Path::new(&path)),
            Ok(Request::Start {
                environment,
                host_arguments,
            }) => bootstrap.start(&environment, &host_arguments),
            Ok(Request::Stop) => bootstrap.stop(),
            Err(e) => Err(format!("invalid request: {e}").into()),
        };

        let response = match outcome {
            Ok(()) => Response::Ok,
            Err(e) => Response::Error {
                message: e.to_string(),
            },
        };
        writeln!(output, "{}", encode(&response)?)?;
        output.flush()?;
    }
    Ok(())
}

/// [`serve`] over the process's stdin and stdout.
pub fn serve_stdio<B: Bootstrap + ?Sized>(bootstrap: &mut B) -> io::Result<()> {
    let stdin = io::stdin();
    serve(bootstrap, stdin.lock(), io::stdout())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
    }

    impl Bootstrap for Recorder {
        fn initialize(&mut self, path: &Path) -> BootstrapResult {
            self.calls.push(format!("initialize {}", path.display()));
            Ok(())
        }

        fn start(&mut self, environment: &str, host_arguments: &HostArguments) -> BootstrapResult {
            self.calls
                .push(format!("start {environment} {:?}", host_arguments.keys().collect::<Vec<_>>()));
            if environment == "broken" {
                return Err("no such environment".into());
            }
            Ok(())
        }

        fn stop(&mut self) -> BootstrapResult {
            self.calls.push("stop".to_string());
            Ok(())
        }
    }

    fn run(input: &str) -> (Recorder, String) {
        let mut recorder = Recorder::default();
        let mut output = Vec::new();
        serve(&mut recorder, input.as_bytes(), &mut output).unwrap();
        (recorder, String::from_utf8(output).unwrap())
    }

    #[test]
    fn answers_every_request() {
        let (recorder, output) = run(concat!(
            "{\"op\":\"initialize\",\"path\":\"/tmp/shop\"}\n",
            "\n",
            "{\"op\":\"start\",\"environment\":\"local\",\"hostArguments\":{\"katana\":[]}}\n",
            "{\"op\":\"stop\"}\n",
        ));

        assert_eq!(
            recorder.calls,
            vec!["initialize /tmp/shop", "start local [\"katana\"]", "stop"]
        );
        insta::assert_snapshot!(output.trim_end(), @r#"
        {"status":"ok"}
        {"status":"ok"}
        {"status":"ok"}
        "#);
    }

    #[test]
    fn failures_and_garbage_become_error_responses() {
        let (_, output) = run(concat!(
            "{\"op\":\"start\",\"environment\":\"broken\"}\n",
            "{\"op\":\"reboot\"}\n",
        ));

        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], r#"{"status":"error","message":"no such environment"}"#);
        assert!(lines[1].starts_with(r#"{"status":"error","message":"invalid request:"#));
    }
}
