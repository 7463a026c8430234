// ── Engine facade ──
//
// Wires registry, transport, executor, script runner and ledger into a
// single handle for the CLI and other callers.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::compiler;
use crate::config::EngineConfig;
use crate::error::CoreError;
use crate::executor::CommandExecutor;
use crate::history::HistoryLedger;
use crate::model::{CommandResult, ConfigIntent, Device, DeviceId};
use crate::registry::DeviceRegistry;
use crate::script::{ScriptJob, ScriptOptions, ScriptRunSummary, ScriptRunner};
use crate::transport::Transport;

/// Entry point for all engine operations.
///
/// Cheaply cloneable via `Arc<EngineInner>`; clones share the ledger and
/// the per-device busy state.
#[derive(Clone)]
pub struct Engine {
    inner: Arc<EngineInner>,
}

struct EngineInner {
    config: EngineConfig,
    executor: Arc<CommandExecutor>,
    scripts: ScriptRunner,
}

impl Engine {
    pub fn new(
        config: EngineConfig,
        registry: Arc<dyn DeviceRegistry>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let ledger = Arc::new(HistoryLedger::new(config.history_capacity));
        Self::with_ledger(config, registry, transport, ledger)
    }

    /// Build an engine around an existing ledger.
    pub fn with_ledger(
        config: EngineConfig,
        registry: Arc<dyn DeviceRegistry>,
        transport: Arc<dyn Transport>,
        ledger: Arc<HistoryLedger>,
    ) -> Self {
        let executor = Arc::new(CommandExecutor::new(
            registry,
            transport,
            ledger,
            config.command_timeout,
        ));
        let scripts = ScriptRunner::new(Arc::clone(&executor));
        Self {
            inner: Arc::new(EngineInner {
                config,
                executor,
                scripts,
            }),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    /// Script options seeded from the engine configuration.
    pub fn default_script_options(&self) -> ScriptOptions {
        ScriptOptions::default().min_spacing(self.inner.config.min_command_spacing)
    }

    // ── Devices ──────────────────────────────────────────────────────

    pub fn devices(&self) -> Vec<Arc<Device>> {
        self.inner.executor.registry().list()
    }

    pub fn device(&self, id: &DeviceId) -> Result<Arc<Device>, CoreError> {
        self.inner
            .executor
            .registry()
            .lookup(id)
            .ok_or_else(|| CoreError::DeviceNotFound {
                identifier: id.to_string(),
            })
    }

    pub fn is_busy(&self, id: &DeviceId) -> bool {
        self.inner.executor.is_busy(id)
    }

    // ── Execution ────────────────────────────────────────────────────

    pub async fn execute(
        &self,
        device_id: &DeviceId,
        command: &str,
    ) -> Result<Arc<CommandResult>, CoreError> {
        self.inner.executor.execute(device_id, command).await
    }

    /// Run a script with the configured spacing, continuing past failures.
    pub async fn run_script(
        &self,
        device_id: &DeviceId,
        script: &str,
    ) -> Result<ScriptRunSummary, CoreError> {
        self.run_script_with(
            device_id,
            script,
            self.default_script_options(),
            &CancellationToken::new(),
        )
        .await
    }

    pub async fn run_script_with(
        &self,
        device_id: &DeviceId,
        script: &str,
        options: ScriptOptions,
        cancel: &CancellationToken,
    ) -> Result<ScriptRunSummary, CoreError> {
        self.inner
            .scripts
            .run(device_id, script, options, cancel)
            .await
    }

    // ── Configuration ────────────────────────────────────────────────

    pub fn compile(&self, intent: &ConfigIntent) -> Result<String, CoreError> {
        compiler::compile(intent)
    }

    /// Compile `intent` and push it to the device inside a configure session.
    pub async fn apply(
        &self,
        device_id: &DeviceId,
        intent: &ConfigIntent,
        options: ScriptOptions,
    ) -> Result<ScriptRunSummary, CoreError> {
        self.apply_with(device_id, intent, options, &CancellationToken::new())
            .await
    }

    pub async fn apply_with(
        &self,
        device_id: &DeviceId,
        intent: &ConfigIntent,
        options: ScriptOptions,
        cancel: &CancellationToken,
    ) -> Result<ScriptRunSummary, CoreError> {
        let commands = compiler::compile_commands(intent)?;
        if commands.is_empty() {
            return Err(CoreError::EmptyScript);
        }
        debug!(device = %device_id, kind = intent.kind(), count = commands.len(), "applying intent");

        let mut script = String::from("configure\n");
        for command in &commands {
            script.push_str(command);
            script.push('\n');
        }
        script.push_str("end\n");

        let job = ScriptJob::parse(&script)?;
        let summary = self
            .inner
            .scripts
            .run_job(device_id, &job, options, cancel)
            .await?;

        let closed = summary
            .results
            .last()
            .is_some_and(|r| r.command == "end" && r.is_success());
        if !closed {
            debug!(device = %device_id, "configure session left open, resetting");
            self.inner.executor.reset_session(device_id);
        }
        Ok(summary)
    }

    // ── History ──────────────────────────────────────────────────────

    pub fn history(&self) -> &Arc<HistoryLedger> {
        self.inner.executor.ledger()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use pretty_assertions::assert_eq;

    use std::sync::Mutex;

    use futures_util::future::BoxFuture;

    use super::*;
    use crate::model::{InterfaceIntent, SystemIntent};
    use crate::registry::InMemoryRegistry;
    use crate::transport::{SimulatedTransport, TransportError, TransportReply};

    /// Simulated switch that remembers which devices had their session reset.
    #[derive(Default)]
    struct ResetTracking {
        inner: SimulatedTransport,
        resets: Mutex<Vec<DeviceId>>,
    }

    impl Transport for ResetTracking {
        fn send<'a>(
            &'a self,
            device: &'a Device,
            command: &'a str,
            timeout: Duration,
        ) -> BoxFuture<'a, Result<TransportReply, TransportError>> {
            self.inner.send(device, command, timeout)
        }

        fn reset(&self, device_id: &DeviceId) {
            self.resets.lock().unwrap().push(device_id.clone());
        }
    }

    fn registry() -> Arc<InMemoryRegistry> {
        Arc::new(
            [
                Device::new("sw1", "Core-Switch-01", "192.168.1.10"),
                Device::new("sw2", "Leaf-Switch-01", "192.168.1.20"),
            ]
            .into_iter()
            .collect(),
        )
    }

    fn engine(config: EngineConfig) -> Engine {
        Engine::new(config, registry(), Arc::new(SimulatedTransport::new()))
    }

    #[tokio::test]
    async fn clones_share_history() {
        let a = engine(EngineConfig::default());
        let b = a.clone();
        a.execute(&"sw1".into(), "show version").await.unwrap();
        assert_eq!(b.history().len(), 1);
    }

    #[tokio::test]
    async fn configured_capacity_bounds_history() {
        let e = engine(EngineConfig::default().with_history_capacity(2));
        for cmd in ["show version", "show vlan", "show interfaces"] {
            e.execute(&"sw1".into(), cmd).await.unwrap();
        }
        let kept: Vec<_> = e.history().all().iter().map(|r| r.command.clone()).collect();
        assert_eq!(kept, ["show interfaces", "show vlan"]);
    }

    #[tokio::test]
    async fn apply_wraps_compiled_text_in_configure_session() {
        let e = engine(EngineConfig::default());
        let intent = ConfigIntent::Interface(InterfaceIntent::new("Ethernet1"));
        let summary = e
            .apply(&"sw1".into(), &intent, ScriptOptions::default())
            .await
            .unwrap();

        let sent: Vec<_> = summary.results.iter().map(|r| r.command.as_str()).collect();
        assert_eq!(
            sent,
            [
                "configure",
                "interface Ethernet1",
                "description Configured via EOS Manager",
                "switchport mode access",
                "no shutdown",
                "end",
            ]
        );
        assert!(summary.is_complete_success());
    }

    #[tokio::test]
    async fn applying_an_empty_intent_is_rejected() {
        let e = engine(EngineConfig::default());
        let err = e
            .apply(
                &"sw1".into(),
                &ConfigIntent::System(SystemIntent::default()),
                ScriptOptions::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::EmptyScript));
        assert!(e.history().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn run_script_uses_configured_spacing() {
        let config = EngineConfig {
            min_command_spacing: Duration::from_millis(500),
            ..EngineConfig::default()
        };
        let e = engine(config);
        let start = tokio::time::Instant::now();
        e.run_script(&"sw1".into(), "show version\nshow vlan")
            .await
            .unwrap();
        assert!(start.elapsed() >= Duration::from_millis(500));
    }

    #[test]
    fn unknown_device_is_not_found() {
        let e = engine(EngineConfig::default());
        assert!(matches!(
            e.device(&"nope".into()),
            Err(CoreError::DeviceNotFound { .. })
        ));
        assert_eq!(e.devices().len(), 2);
    }

    #[tokio::test]
    async fn unfinished_apply_resets_the_session() {
        let transport = Arc::new(ResetTracking::default());
        let e = Engine::new(
            EngineConfig::default(),
            registry(),
            Arc::clone(&transport) as Arc<dyn Transport>,
        );
        let sw1 = DeviceId::from("sw1");

        let good = ConfigIntent::Interface(InterfaceIntent::new("Ethernet1"));
        e.apply(&sw1, &good, ScriptOptions::default().stop_on_error(true))
            .await
            .unwrap();
        assert!(transport.resets.lock().unwrap().is_empty());

        let mut port = InterfaceIntent::new("Ethernet2");
        port.description = Some("error-disabled uplink".into());
        let summary = e
            .apply(
                &sw1,
                &ConfigIntent::Interface(port),
                ScriptOptions::default().stop_on_error(true),
            )
            .await
            .unwrap();

        assert!(summary.stopped_early);
        assert_ne!(summary.results.last().unwrap().command, "end");
        assert_eq!(*transport.resets.lock().unwrap(), [sw1]);
    }
}
