// ── Runtime engine configuration ──
//
// These types describe *how* the engine talks to switches: timeouts,
// history retention, and script pacing. They never touch disk.
// The CLI constructs an `EngineConfig` and hands it in.

use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

/// Default number of results retained by the history ledger.
pub const DEFAULT_HISTORY_CAPACITY: usize = 500;

/// TLS verification strategy for eAPI connections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed certs). Default for switches.
    #[default]
    DangerAcceptInvalid,
}

/// Credentials used by the eAPI transport for every switch in a profile.
#[derive(Debug, Clone)]
pub struct EapiCredentials {
    pub username: String,
    pub password: SecretString,
}

/// Engine configuration, built by the CLI and passed to [`Engine`](crate::Engine).
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Upper bound for a single dispatch against a switch.
    pub command_timeout: Duration,
    /// Maximum history entries kept. `None` keeps everything.
    pub history_capacity: Option<NonZeroUsize>,
    /// Minimum gap between consecutive script commands. Zero disables pacing.
    pub min_command_spacing: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            command_timeout: Duration::from_secs(30),
            history_capacity: NonZeroUsize::new(DEFAULT_HISTORY_CAPACITY),
            min_command_spacing: Duration::ZERO,
        }
    }
}

impl EngineConfig {
    /// Set the history capacity; `0` means unbounded.
    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = NonZeroUsize::new(capacity);
        self
    }
}
