//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use eosman_core::{
    CommandResult, ConfigIntent, DeviceId, Engine, ExportFormat, ScriptRunSummary,
};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;

/// Look up `id` in the engine's inventory, failing with a not-found error.
pub fn resolve_device(engine: &Engine, id: &str) -> Result<DeviceId, CliError> {
    let device_id = DeviceId::from(id);
    engine.device(&device_id)?;
    Ok(device_id)
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: message.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

// ── Intent documents ────────────────────────────────────────────────

/// One intent or a list of intents.
#[derive(Deserialize)]
#[serde(untagged)]
enum IntentDocument {
    Many(Vec<ConfigIntent>),
    One(ConfigIntent),
}

/// Read an intent document. `.json` files are parsed as JSON, anything
/// else as YAML (which also accepts JSON).
pub fn read_intents(path: &Path) -> Result<Vec<ConfigIntent>, CliError> {
    let contents = std::fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let doc: IntentDocument = if is_json {
        serde_json::from_str(&contents)?
    } else {
        serde_yaml::from_str(&contents)?
    };
    let intents = match doc {
        IntentDocument::Many(intents) => intents,
        IntentDocument::One(intent) => vec![intent],
    };
    if intents.is_empty() {
        return Err(CliError::Validation {
            field: "file".into(),
            reason: format!("{} contains no intents", path.display()),
        });
    }
    Ok(intents)
}

// ── Cancellation ────────────────────────────────────────────────────

/// Token that is cancelled on Ctrl-C. Dropping the handle is harmless;
/// abort it once the guarded work is done.
pub fn cancel_on_ctrl_c() -> (CancellationToken, JoinHandle<()>) {
    let token = CancellationToken::new();
    let trigger = token.clone();
    let handle = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nCancelling after the current command...");
            trigger.cancel();
        }
    });
    (token, handle)
}

// ── Progress ────────────────────────────────────────────────────────

/// Progress bar fed from the history ledger while a script runs.
pub struct ScriptProgress {
    bar: ProgressBar,
    feeder: JoinHandle<()>,
}

impl ScriptProgress {
    /// Start tracking, or `None` when stderr is not a terminal, output is
    /// quiet, or a structured format was requested.
    pub fn start(engine: &Engine, total: usize, global: &GlobalOpts) -> Option<Self> {
        if global.quiet
            || !matches!(global.output, OutputFormat::Table)
            || !std::io::stderr().is_terminal()
        {
            return None;
        }

        let bar = ProgressBar::new(u64::try_from(total).unwrap_or(u64::MAX));
        bar.set_style(
            ProgressStyle::with_template("{spinner} [{pos}/{len}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.enable_steady_tick(Duration::from_millis(120));

        let mut rx = engine.history().subscribe();
        let feed = bar.clone();
        let feeder = tokio::spawn(async move {
            let mut newest: Option<Arc<CommandResult>> = None;
            while rx.changed().await.is_ok() {
                let snapshot = Arc::clone(&rx.borrow_and_update());
                let fresh = snapshot
                    .iter()
                    .take_while(|r| newest.as_ref().is_none_or(|n| !Arc::ptr_eq(r, n)))
                    .count();
                if let Some(latest) = snapshot.first() {
                    feed.set_message(latest.command.clone());
                    newest = Some(Arc::clone(latest));
                }
                feed.inc(u64::try_from(fresh).unwrap_or(u64::MAX));
            }
        });
        Some(Self { bar, feeder })
    }

    pub fn finish(self) {
        self.feeder.abort();
        self.bar.finish_and_clear();
    }
}

/// Spinner for a single dispatch, under the same conditions as [`ScriptProgress`].
pub fn spinner(message: &str, global: &GlobalOpts) -> Option<ProgressBar> {
    if global.quiet
        || !matches!(global.output, OutputFormat::Table)
        || !std::io::stderr().is_terminal()
    {
        return None;
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.enable_steady_tick(Duration::from_millis(120));
    pb.set_message(message.to_owned());
    Some(pb)
}

// ── Outcomes ────────────────────────────────────────────────────────

/// Turn an incomplete or failed run into the matching error.
pub fn check_summary(summary: &ScriptRunSummary) -> Result<(), CliError> {
    if summary.cancelled {
        return Err(CliError::Cancelled {
            executed: summary.executed,
            total: summary.total,
        });
    }
    if summary.failed > 0 {
        return Err(CliError::CommandsFailed {
            device: summary.device_id.to_string(),
            failed: summary.failed,
            total: summary.total,
        });
    }
    Ok(())
}

/// Export the session ledger as JSON to `path`.
pub fn write_history(engine: &Engine, path: &Path) -> Result<(), CliError> {
    let json = engine.history().export(ExportFormat::Json)?;
    std::fs::write(path, json)?;
    tracing::info!(path = %path.display(), entries = engine.history().len(), "history written");
    Ok(())
}
