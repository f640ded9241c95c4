use anyhow::{Context, Result};

use stagehand::application::{Runtime, SupervisorEvent};
use stagehand::config::{application_specs, RunConfiguration, Settings};
use stagehand::presentation::RunArgs;

use crate::ui::keys::KeyReader;

pub fn cmd_run(args: &RunArgs) -> Result<()> {
    let (settings, warnings) =
        Settings::resolve(args.settings.as_deref()).context("Failed to load settings")?;
    for warning in &warnings {
        tracing::warn!("{warning}");
    }

    let document = args
        .config
        .as_deref()
        .map(RunConfiguration::load)
        .transpose()?;
    let specs = application_specs(document.as_ref(), &args.inline_options())?;

    let mut runtime = Runtime::new(&settings, specs)?;
    tracing::debug!(
        applications_root = %runtime.applications_root().display(),
        "runtime ready"
    );

    let sender = runtime.orchestrator().sender();
    let on_signal = sender.clone();
    ctrlc::set_handler(move || {
        let _ = on_signal.send(SupervisorEvent::Terminate);
    })
    .context("Failed to install Ctrl+C handler")?;

    let _keys = KeyReader::spawn(sender).context("Failed to read keys")?;
    runtime.run();
    Ok(())
}
