// ── Core error types ──
//
// User-facing errors from eosman-core. Only failures that happen *before*
// a command reaches a switch surface here; anything that goes wrong on the
// wire is folded into an error `CommandResult` so history stays complete.

use thiserror::Error;

use crate::model::DeviceId;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Request validation ───────────────────────────────────────────
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Script contains no executable commands")]
    EmptyScript,

    // ── Concurrency ──────────────────────────────────────────────────
    #[error("Device {device_id} is busy with another command")]
    DeviceBusy { device_id: DeviceId },

    // ── Registry ─────────────────────────────────────────────────────
    #[error("Device not found: {identifier}")]
    DeviceNotFound { identifier: String },

    // ── Configuration compilation ────────────────────────────────────
    #[error("Invalid configuration for {intent}: {reason}")]
    InvalidConfiguration { intent: &'static str, reason: String },

    // ── Engine configuration ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub(crate) fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    pub(crate) fn invalid_config(intent: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            intent,
            reason: reason.into(),
        }
    }

    /// Returns `true` if the caller can simply try again later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::DeviceBusy { .. })
    }
}
