// ── Command executor ──
//
// Dispatches one command to one device. At most one dispatch per device
// is in flight at any time: the in-flight set hands out a `DeviceLease`
// and a second request for the same device fails fast with `DeviceBusy`.
// Anything that goes wrong after dispatch becomes an error result, and
// every dispatch appends exactly one result to the ledger.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use dashmap::DashSet;
use tokio::time::Instant;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::CoreError;
use crate::history::HistoryLedger;
use crate::model::{CommandResult, CommandStatus, Device, DeviceId};
use crate::registry::DeviceRegistry;
use crate::transport::{Transport, TransportError, TransportReply};

// ── Device lease ────────────────────────────────────────────────────

/// Exclusive claim on a device. Released when dropped.
#[must_use = "the device is released as soon as the lease is dropped"]
#[derive(Debug)]
pub struct DeviceLease {
    device_id: DeviceId,
    in_flight: Arc<DashSet<DeviceId>>,
}

impl DeviceLease {
    pub fn device_id(&self) -> &DeviceId {
        &self.device_id
    }
}

impl Drop for DeviceLease {
    fn drop(&mut self) {
        self.in_flight.remove(&self.device_id);
    }
}

// ── Executor ────────────────────────────────────────────────────────

pub struct CommandExecutor {
    registry: Arc<dyn DeviceRegistry>,
    transport: Arc<dyn Transport>,
    ledger: Arc<HistoryLedger>,
    in_flight: Arc<DashSet<DeviceId>>,
    timeout: Duration,
}

impl CommandExecutor {
    pub fn new(
        registry: Arc<dyn DeviceRegistry>,
        transport: Arc<dyn Transport>,
        ledger: Arc<HistoryLedger>,
        timeout: Duration,
    ) -> Self {
        Self {
            registry,
            transport,
            ledger,
            in_flight: Arc::new(DashSet::new()),
            timeout,
        }
    }

    pub fn ledger(&self) -> &Arc<HistoryLedger> {
        &self.ledger
    }

    pub fn registry(&self) -> &Arc<dyn DeviceRegistry> {
        &self.registry
    }

    /// Drop the transport's session state for `device_id`.
    pub fn reset_session(&self, device_id: &DeviceId) {
        self.transport.reset(device_id);
    }

    /// Whether a dispatch or script currently holds `device_id`.
    pub fn is_busy(&self, device_id: &DeviceId) -> bool {
        self.in_flight.contains(device_id)
    }

    /// Claim `device_id`, failing with `DeviceBusy` if it is already claimed.
    pub fn lease(&self, device_id: &DeviceId) -> Result<DeviceLease, CoreError> {
        if !self.in_flight.insert(device_id.clone()) {
            return Err(CoreError::DeviceBusy {
                device_id: device_id.clone(),
            });
        }
        Ok(DeviceLease {
            device_id: device_id.clone(),
            in_flight: Arc::clone(&self.in_flight),
        })
    }

    /// Run `command` on `device_id` and record the outcome.
    ///
    /// Fails before dispatch, with nothing recorded, when the command is
    /// blank, the device is unknown, or the device is busy.
    pub async fn execute(
        &self,
        device_id: &DeviceId,
        command: &str,
    ) -> Result<Arc<CommandResult>, CoreError> {
        let command = validate_command(command)?;
        let device = self.resolve(device_id)?;
        let lease = self.lease(device_id)?;
        Ok(self.dispatch(&lease, &device, command).await)
    }

    /// Like [`execute`](Self::execute), for a caller already holding the
    /// lease on `device`. The registry is not consulted again, so a device
    /// resolved at the start of an operation stays valid for all of it.
    pub async fn execute_leased(
        &self,
        lease: &DeviceLease,
        device: &Device,
        command: &str,
    ) -> Result<Arc<CommandResult>, CoreError> {
        if lease.device_id() != &device.id {
            return Err(CoreError::Internal(format!(
                "lease for '{}' used for '{}'",
                lease.device_id(),
                device.id
            )));
        }
        let command = validate_command(command)?;
        Ok(self.dispatch(lease, device, command).await)
    }

    pub(crate) fn resolve(&self, device_id: &DeviceId) -> Result<Arc<Device>, CoreError> {
        if device_id.as_str().trim().is_empty() {
            return Err(CoreError::invalid_request("no device selected"));
        }
        self.registry
            .lookup(device_id)
            .ok_or_else(|| CoreError::invalid_request(format!("unknown device '{device_id}'")))
    }

    async fn dispatch(
        &self,
        _lease: &DeviceLease,
        device: &Device,
        command: &str,
    ) -> Arc<CommandResult> {
        debug!(device = %device.id, command, "dispatching");
        let started = Instant::now();

        let outcome = match tokio::time::timeout(
            self.timeout,
            self.transport.send(device, command, self.timeout),
        )
        .await
        {
            Ok(outcome) => outcome,
            Err(_) => Err(TransportError::Timeout(self.timeout)),
        };
        let duration = started.elapsed();
        let elapsed_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);

        let (output, status) = match outcome {
            Ok(TransportReply { output, succeeded }) => {
                let status = if succeeded {
                    CommandStatus::Success
                } else {
                    CommandStatus::Error
                };
                debug!(device = %device.id, command, elapsed_ms, %status, "completed");
                (output, status)
            }
            Err(err) => {
                warn!(device = %device.id, command, elapsed_ms, error = %err, "transport failure");
                (err.to_string(), CommandStatus::Error)
            }
        };

        self.ledger.append(CommandResult {
            id: Uuid::new_v4(),
            device_id: device.id.clone(),
            device_name: device.name.clone(),
            command: command.to_owned(),
            output,
            status,
            duration,
            completed_at: Utc::now(),
        })
    }
}

fn validate_command(command: &str) -> Result<&str, CoreError> {
    let trimmed = command.trim();
    if trimmed.is_empty() {
        return Err(CoreError::invalid_request("command text is empty"));
    }
    Ok(trimmed)
}
