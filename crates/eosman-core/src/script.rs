// ── Script runner ──
//
// Turns script text into an ordered command list and drives the
// executor through it one command at a time. The device is resolved
// once and its lease is held for the whole run, so no other caller can
// interleave commands on the same device mid-script.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::CoreError;
use crate::executor::CommandExecutor;
use crate::model::{CommandResult, DeviceId};

// ── ScriptJob ───────────────────────────────────────────────────────

/// Trimmed, non-empty command lines in script order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptJob {
    commands: Vec<String>,
}

impl ScriptJob {
    /// Split on line boundaries, trim, drop blank lines.
    pub fn parse(text: &str) -> Result<Self, CoreError> {
        let commands: Vec<String> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_owned)
            .collect();
        if commands.is_empty() {
            return Err(CoreError::EmptyScript);
        }
        Ok(Self { commands })
    }

    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Always `false`: parsing rejects empty scripts.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl FromStr for ScriptJob {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// ── Options / summary ───────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScriptOptions {
    /// Stop after the first failing command instead of continuing.
    pub stop_on_error: bool,
    /// Minimum time between the starts of consecutive dispatches.
    pub min_spacing: Duration,
}

impl ScriptOptions {
    pub fn stop_on_error(mut self, stop: bool) -> Self {
        self.stop_on_error = stop;
        self
    }

    pub fn min_spacing(mut self, spacing: Duration) -> Self {
        self.min_spacing = spacing;
        self
    }
}

/// Outcome of a script run.
#[derive(Debug, Clone, Serialize)]
pub struct ScriptRunSummary {
    pub device_id: DeviceId,
    /// Commands in the job.
    pub total: usize,
    /// Commands actually dispatched.
    pub executed: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub cancelled: bool,
    pub stopped_early: bool,
    /// Results in execution order.
    pub results: Vec<Arc<CommandResult>>,
}

impl ScriptRunSummary {
    pub fn is_complete_success(&self) -> bool {
        self.executed == self.total && self.failed == 0
    }
}

// ── Runner ──────────────────────────────────────────────────────────

pub struct ScriptRunner {
    executor: Arc<CommandExecutor>,
}

impl ScriptRunner {
    pub fn new(executor: Arc<CommandExecutor>) -> Self {
        Self { executor }
    }

    /// Run with default options and no cancellation.
    pub async fn run_script(
        &self,
        device_id: &DeviceId,
        script: &str,
    ) -> Result<ScriptRunSummary, CoreError> {
        self.run(device_id, script, ScriptOptions::default(), &CancellationToken::new())
            .await
    }

    /// Parse `script` and run it on `device_id`.
    ///
    /// `cancel` is checked between commands only; a dispatched command
    /// always runs to completion.
    pub async fn run(
        &self,
        device_id: &DeviceId,
        script: &str,
        options: ScriptOptions,
        cancel: &CancellationToken,
    ) -> Result<ScriptRunSummary, CoreError> {
        let job = ScriptJob::parse(script)?;
        self.run_job(device_id, &job, options, cancel).await
    }

    pub async fn run_job(
        &self,
        device_id: &DeviceId,
        job: &ScriptJob,
        options: ScriptOptions,
        cancel: &CancellationToken,
    ) -> Result<ScriptRunSummary, CoreError> {
        let device = self.executor.resolve(device_id)?;
        let lease = self.executor.lease(device_id)?;

        let mut summary = ScriptRunSummary {
            device_id: device_id.clone(),
            total: job.len(),
            executed: 0,
            succeeded: 0,
            failed: 0,
            cancelled: false,
            stopped_early: false,
            results: Vec::with_capacity(job.len()),
        };
        let mut last_start: Option<Instant> = None;

        for (idx, command) in job.commands().iter().enumerate() {
            if cancel.is_cancelled() {
                summary.cancelled = true;
                break;
            }

            if let Some(prev) = last_start.filter(|_| !options.min_spacing.is_zero()) {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => {
                        summary.cancelled = true;
                        break;
                    }
                    () = tokio::time::sleep_until(prev + options.min_spacing) => {}
                }
            }

            last_start = Some(Instant::now());
            let result = self.executor.execute_leased(&lease, &device, command).await?;
            summary.executed += 1;
            if result.is_success() {
                summary.succeeded += 1;
            } else {
                summary.failed += 1;
            }
            let failed = !result.is_success();
            summary.results.push(result);

            if failed && options.stop_on_error {
                summary.stopped_early = idx + 1 < job.len();
                debug!(device = %device_id, command, "stopping script after failure");
                break;
            }
        }

        if summary.cancelled {
            warn!(
                device = %device_id,
                executed = summary.executed,
                total = summary.total,
                "script cancelled"
            );
        }
        info!(
            device = %device_id,
            total = summary.total,
            succeeded = summary.succeeded,
            failed = summary.failed,
            "script finished"
        );
        Ok(summary)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::history::HistoryLedger;
    use crate::model::Device;
    use crate::registry::InMemoryRegistry;
    use crate::transport::SimulatedTransport;

    fn runner_with_latency(latency: Duration) -> (ScriptRunner, Arc<CommandExecutor>) {
        let registry: InMemoryRegistry =
            std::iter::once(Device::new("sw1", "Core-Switch-01", "192.168.1.10")).collect();
        let executor = Arc::new(CommandExecutor::new(
            Arc::new(registry),
            Arc::new(SimulatedTransport::new().with_latency(latency)),
            Arc::new(HistoryLedger::unbounded()),
            Duration::from_secs(30),
        ));
        (ScriptRunner::new(Arc::clone(&executor)), executor)
    }

    fn runner() -> (ScriptRunner, Arc<CommandExecutor>) {
        runner_with_latency(Duration::ZERO)
    }

    fn commands(summary: &ScriptRunSummary) -> Vec<&str> {
        summary.results.iter().map(|r| r.command.as_str()).collect()
    }

    #[test]
    fn parse_drops_blank_lines_and_trims() {
        let job = ScriptJob::parse("show version\n\n  show vlan  \r\n\t\n").unwrap();
        assert_eq!(job.commands(), ["show version", "show vlan"]);
    }

    #[test]
    fn whitespace_only_script_is_empty() {
        assert!(matches!(ScriptJob::parse(" \n\n\t"), Err(CoreError::EmptyScript)));
    }

    #[tokio::test]
    async fn runs_commands_in_order() {
        let (runner, executor) = runner();
        let summary = runner
            .run_script(&"sw1".into(), "show version\n\nshow vlan\n")
            .await
            .unwrap();

        assert_eq!(summary.total, 2);
        assert_eq!(summary.executed, 2);
        assert_eq!(commands(&summary), ["show version", "show vlan"]);
        // Ledger is newest first.
        let ledger: Vec<_> = executor
            .ledger()
            .all()
            .iter()
            .map(|r| r.command.clone())
            .collect();
        assert_eq!(ledger, ["show vlan", "show version"]);
    }

    #[tokio::test]
    async fn continues_after_failure_by_default() {
        let (runner, _) = runner();
        let summary = runner
            .run_script(&"sw1".into(), "show version\nshow invalid\nshow vlan")
            .await
            .unwrap();

        assert_eq!(summary.executed, 3);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 1);
        assert!(!summary.stopped_early);
        assert!(!summary.is_complete_success());
    }

    #[tokio::test]
    async fn stop_on_error_halts_the_run() {
        let (runner, executor) = runner();
        let summary = runner
            .run(
                &"sw1".into(),
                "show version\nshow invalid\nshow vlan",
                ScriptOptions::default().stop_on_error(true),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(summary.total, 3);
        assert_eq!(summary.executed, 2);
        assert!(summary.stopped_early);
        assert_eq!(executor.ledger().len(), 2);
    }

    #[tokio::test]
    async fn empty_script_and_unknown_device_touch_nothing() {
        let (runner, executor) = runner();
        assert!(matches!(
            runner.run_script(&"sw1".into(), "\n\n").await,
            Err(CoreError::EmptyScript)
        ));
        assert!(matches!(
            runner.run_script(&"nope".into(), "show version").await,
            Err(CoreError::InvalidRequest { .. })
        ));
        assert!(executor.ledger().is_empty());
    }

    #[tokio::test]
    async fn busy_device_rejects_the_script() {
        let (runner, executor) = runner();
        let _held = executor.lease(&"sw1".into()).unwrap();
        assert!(matches!(
            runner.run_script(&"sw1".into(), "show version").await,
            Err(CoreError::DeviceBusy { .. })
        ));
        assert!(executor.ledger().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn device_stays_leased_for_the_whole_run() {
        let (runner, executor) = runner_with_latency(Duration::from_millis(100));
        let sw1 = DeviceId::from("sw1");
        let run = runner.run_script(&sw1, "show version\nshow vlan\nshow interfaces");
        let intruder = async {
            tokio::time::sleep(Duration::from_millis(150)).await;
            executor.execute(&sw1, "show clock").await
        };

        let (summary, intruder) = tokio::join!(run, intruder);
        assert_eq!(summary.unwrap().executed, 3);
        assert!(matches!(intruder, Err(CoreError::DeviceBusy { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_is_observed_between_commands() {
        let (runner, executor) = runner_with_latency(Duration::from_millis(100));
        let cancel = CancellationToken::new();
        let trigger = {
            let cancel = cancel.clone();
            async move {
                tokio::time::sleep(Duration::from_millis(150)).await;
                cancel.cancel();
            }
        };

        let sw1 = DeviceId::from("sw1");
        let (summary, ()) = tokio::join!(
            runner.run(
                &sw1,
                "show version\nshow vlan\nshow interfaces",
                ScriptOptions::default(),
                &cancel,
            ),
            trigger,
        );
        let summary = summary.unwrap();

        // Second command was in flight at cancel time and still completed.
        assert!(summary.cancelled);
        assert_eq!(summary.executed, 2);
        assert_eq!(executor.ledger().len(), 2);
        assert!(!executor.is_busy(&"sw1".into()));
    }

    #[tokio::test(start_paused = true)]
    async fn min_spacing_paces_dispatches() {
        let (runner, _) = runner();
        let start = Instant::now();
        let summary = runner
            .run(
                &"sw1".into(),
                "show version\nshow vlan\nshow interfaces",
                ScriptOptions::default().min_spacing(Duration::from_secs(1)),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(summary.executed, 3);
        assert!(start.elapsed() >= Duration::from_secs(2));
        assert!(start.elapsed() < Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_during_spacing_wait_stops_promptly() {
        let (runner, _) = runner();
        let cancel = CancellationToken::new();
        let trigger = {
            let cancel = cancel.clone();
            async move {
                tokio::time::sleep(Duration::from_secs(1)).await;
                cancel.cancel();
            }
        };
        let sw1 = DeviceId::from("sw1");
        let start = Instant::now();

        let (summary, ()) = tokio::join!(
            runner.run(
                &sw1,
                "show version\nshow vlan",
                ScriptOptions::default().min_spacing(Duration::from_secs(60)),
                &cancel,
            ),
            trigger,
        );
        let summary = summary.unwrap();

        assert!(summary.cancelled);
        assert_eq!(summary.executed, 1);
        assert!(start.elapsed() < Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn device_removed_mid_run_keeps_the_run_going() {
        let registry = Arc::new(InMemoryRegistry::new());
        registry.insert(Device::new("sw1", "Core-Switch-01", "192.168.1.10"));
        let executor = Arc::new(CommandExecutor::new(
            Arc::clone(&registry) as Arc<dyn crate::registry::DeviceRegistry>,
            Arc::new(SimulatedTransport::new().with_latency(Duration::from_millis(100))),
            Arc::new(HistoryLedger::unbounded()),
            Duration::from_secs(30),
        ));
        let runner = ScriptRunner::new(Arc::clone(&executor));
        let sw1 = DeviceId::from("sw1");
        let removal = async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            assert!(registry.remove(&sw1).is_some());
        };

        let (summary, ()) = tokio::join!(
            runner.run_script(&sw1, "show version\nshow vlan\nshow interfaces"),
            removal,
        );
        let summary = summary.unwrap();

        assert_eq!(summary.executed, 3);
        assert!(summary.is_complete_success());
        assert!(summary.results.iter().all(|r| r.device_name == "Core-Switch-01"));
        assert_eq!(executor.ledger().len(), 3);
    }
}
