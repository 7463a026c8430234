// ── Transport seam ──
//
// How a command physically reaches a switch. The executor only sees this
// trait; concrete adapters live in the submodules.

mod eapi;
mod simulated;

use std::time::Duration;

use futures_util::future::BoxFuture;
use thiserror::Error;

use crate::model::{Device, DeviceId};

pub use eapi::EapiTransport;
pub use simulated::SimulatedTransport;

/// Reply from a switch: opaque output text plus whether the switch
/// accepted the command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportReply {
    pub output: String,
    pub succeeded: bool,
}

impl TransportReply {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            succeeded: true,
        }
    }

    pub fn failure(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            succeeded: false,
        }
    }
}

/// A dispatch that never produced a reply.
///
/// The executor turns every variant into an error `CommandResult`.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Timed out after {}s", .0.as_secs_f64())]
    Timeout(Duration),

    #[error("Device unreachable: {0}")]
    Unreachable(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Transport failure: {0}")]
    Failed(String),
}

impl From<eosman_api::Error> for TransportError {
    fn from(err: eosman_api::Error) -> Self {
        match &err {
            eosman_api::Error::Authentication { message } => Self::Authentication(message.clone()),
            eosman_api::Error::Timeout { timeout_secs } => {
                Self::Timeout(Duration::from_secs(*timeout_secs))
            }
            eosman_api::Error::Transport(e) if e.is_connect() => Self::Unreachable(err.to_string()),
            _ => Self::Failed(err.to_string()),
        }
    }
}

/// Sends one command to one switch.
///
/// Implementations should honour `timeout`; the executor enforces it again
/// with its own deadline regardless.
pub trait Transport: Send + Sync {
    fn send<'a>(
        &'a self,
        device: &'a Device,
        command: &'a str,
        timeout: Duration,
    ) -> BoxFuture<'a, Result<TransportReply, TransportError>>;

    /// Drop any CLI session state kept for `device_id`.
    fn reset(&self, _device_id: &DeviceId) {}
}
