use thiserror::Error;

/// Top-level error type for the `eosman-api` crate.
///
/// Covers every failure mode of talking to a switch's command API:
/// authentication, transport, JSON-RPC command errors, and malformed
/// responses. `eosman-core` folds these into its transport seam.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// The switch rejected the supplied credentials (HTTP 401/403).
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── eAPI ────────────────────────────────────────────────────────
    /// JSON-RPC error returned by the switch, typically a rejected CLI command.
    ///
    /// `output` carries whatever text the switch produced before failing,
    /// `errors` the per-command error strings from the `data` array.
    #[error("eAPI error {code}: {message}")]
    Command {
        code: i64,
        message: String,
        errors: Vec<String>,
        output: Option<String>,
    },

    /// Non-success HTTP status with no JSON-RPC body.
    #[error("eAPI returned HTTP {status}")]
    Http { status: u16 },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the switch refused our credentials.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } => true,
            _ => false,
        }
    }

    /// Returns `true` if the request never produced a response in time.
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout(),
            Self::Timeout { .. } => true,
            _ => false,
        }
    }

    /// Returns `true` if the switch answered but rejected the command itself.
    pub fn is_command_rejected(&self) -> bool {
        matches!(self, Self::Command { .. })
    }
}
