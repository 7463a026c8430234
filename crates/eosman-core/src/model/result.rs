// ── Command results ──

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::device::DeviceId;

/// Outcome of one dispatch attempt.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CommandStatus {
    Success,
    Error,
}

/// Record of a single command executed against a single device.
///
/// Built exactly once by the executor and shared as `Arc<CommandResult>`
/// afterwards; nothing hands out `&mut` access to a recorded result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandResult {
    pub id: Uuid,
    pub device_id: DeviceId,
    /// Device name as it was when the command ran.
    pub device_name: String,
    pub command: String,
    /// Switch response text, or diagnostic text for failed attempts.
    pub output: String,
    pub status: CommandStatus,
    #[serde(rename = "duration_secs", serialize_with = "serialize_secs")]
    pub duration: Duration,
    pub completed_at: DateTime<Utc>,
}

impl CommandResult {
    pub fn is_success(&self) -> bool {
        self.status == CommandStatus::Success
    }

    /// The (device, command) pair that identifies this attempt.
    pub fn fingerprint(&self) -> (&DeviceId, &str) {
        (&self.device_id, &self.command)
    }
}

fn serialize_secs<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64())
}
