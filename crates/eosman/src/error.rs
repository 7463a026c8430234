//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use eosman_config::ConfigError;
use eosman_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Credentials ──────────────────────────────────────────────────
    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(eosman::no_credentials),
        help(
            "Set `username` in the profile and store a password with:\n\
             eosman config set-password --profile {profile}\n\
             Or point `password_env` at an environment variable."
        )
    )]
    NoCredentials { profile: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(eosman::not_found),
        help("Run: eosman {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── Execution ────────────────────────────────────────────────────
    #[error("Device '{device}' is busy with another command")]
    #[diagnostic(
        code(eosman::device_busy),
        help("Wait for the running command or script to finish, then retry.")
    )]
    DeviceBusy { device: String },

    #[error("{failed} of {total} command(s) failed on '{device}'")]
    #[diagnostic(code(eosman::command_failed))]
    CommandsFailed {
        device: String,
        failed: usize,
        total: usize,
    },

    #[error("Cancelled after {executed} of {total} command(s)")]
    #[diagnostic(code(eosman::cancelled))]
    Cancelled { executed: usize, total: usize },

    #[error("Script contains no executable commands")]
    #[diagnostic(
        code(eosman::empty_script),
        help("Blank lines are ignored; put one command per line.")
    )]
    EmptyScript,

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(eosman::validation))]
    Validation { field: String, reason: String },

    #[error("Invalid {intent} intent: {reason}")]
    #[diagnostic(
        code(eosman::invalid_intent),
        help("Fix the intent document and run `eosman compile` to check it.")
    )]
    InvalidIntent { intent: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(eosman::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: eosman config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No connection profiles configured")]
    #[diagnostic(
        code(eosman::no_config),
        help(
            "Create one with: eosman config init\n\
             Expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(eosman::config))]
    Config(Box<ConfigError>),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Operation '{action}' requires confirmation")]
    #[diagnostic(
        code(eosman::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Internal ─────────────────────────────────────────────────────
    #[error("Internal error: {0}")]
    #[diagnostic(code(eosman::internal))]
    Internal(String),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    #[diagnostic(code(eosman::json), help("Check the file contents and try again."))]
    Json(#[from] serde_json::Error),

    #[error("Invalid YAML: {0}")]
    #[diagnostic(code(eosman::yaml), help("Check the file contents and try again."))]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } | Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::DeviceBusy { .. } => exit_code::CONFLICT,
            Self::Validation { .. }
            | Self::InvalidIntent { .. }
            | Self::EmptyScript
            | Self::NonInteractiveRequiresYes { .. }
            | Self::Json(_)
            | Self::Yaml(_) => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidRequest { message } => CliError::Validation {
                field: "request".into(),
                reason: message,
            },

            CoreError::EmptyScript => CliError::EmptyScript,

            CoreError::DeviceBusy { device_id } => CliError::DeviceBusy {
                device: device_id.to_string(),
            },

            CoreError::DeviceNotFound { identifier } => CliError::NotFound {
                resource_type: "device".into(),
                identifier,
                list_command: "devices list".into(),
            },

            CoreError::InvalidConfiguration { intent, reason } => CliError::InvalidIntent {
                intent: intent.into(),
                reason,
            },

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },

            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::ProfileNotFound { name } => CliError::ProfileNotFound {
                name,
                available: "(see `eosman config show`)".into(),
            },
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config(Box::new(other)),
        }
    }
}
