//! Shared configuration for eosman.
//!
//! TOML profiles, the device inventory, credential resolution
//! (env + keyring + plaintext), and translation into the engine's
//! `EngineConfig`, registry and transport. The CLI layers its flag
//! overrides on top.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use eosman_core::{
    DEFAULT_HISTORY_CAPACITY, Device, DeviceStatus, EapiCredentials, EapiTransport, EngineConfig,
    InMemoryRegistry, InterfaceCounts, SimulatedTransport, TlsVerification, Transport,
};

/// Keyring service name; entries are keyed `<profile>/password`.
pub const KEYRING_SERVICE: &str = "eosman";

/// Prefix for environment overrides, e.g. `EOSMAN_DEFAULTS__TIMEOUT=10`.
pub const ENV_PREFIX: &str = "EOSMAN_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found")]
    ProfileNotFound { name: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named connection profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,

    /// Device inventory.
    #[serde(default)]
    pub devices: Vec<DeviceEntry>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
            devices: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// Per-command timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// History entries kept per session; 0 keeps everything.
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,

    /// Minimum gap between script commands, in milliseconds.
    #[serde(default)]
    pub command_spacing_ms: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
            history_capacity: default_history_capacity(),
            command_spacing_ms: 0,
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_history_capacity() -> usize {
    DEFAULT_HISTORY_CAPACITY
}

/// How commands reach the switches of a profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// HTTPS JSON-RPC command API.
    #[default]
    Eapi,
    /// Offline simulator with canned outputs.
    Simulated,
}

/// A named connection profile.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    #[serde(default)]
    pub transport: TransportKind,

    /// eAPI username.
    pub username: Option<String>,

    /// Password (plaintext — prefer keyring or env var).
    pub password: Option<String>,

    /// Environment variable name containing the password.
    pub password_env: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override timeout.
    pub timeout: Option<u64>,

    /// Artificial reply delay for the simulated transport, in milliseconds.
    pub latency_ms: Option<u64>,
}

impl Profile {
    /// TLS policy. Switches ship self-signed, so anything short of an
    /// explicit `insecure = false` or a CA file accepts invalid certs.
    pub fn tls(&self) -> TlsVerification {
        match (self.insecure, &self.ca_cert) {
            (Some(true), _) => TlsVerification::DangerAcceptInvalid,
            (_, Some(path)) => TlsVerification::CustomCa(path.clone()),
            (Some(false), None) => TlsVerification::SystemDefaults,
            (None, None) => TlsVerification::DangerAcceptInvalid,
        }
    }
}

/// One switch in the `[[devices]]` inventory.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeviceEntry {
    pub id: String,
    /// Display name; defaults to the id.
    pub name: Option<String>,
    /// Management IP, hostname, or full eAPI base URL.
    pub address: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub status: DeviceStatus,
    #[serde(default)]
    pub interfaces: InterfaceCounts,
}

impl DeviceEntry {
    pub fn to_device(&self) -> Device {
        let mut device = Device::new(
            self.id.as_str(),
            self.name.clone().unwrap_or_else(|| self.id.clone()),
            self.address.clone(),
        );
        device.model.clone_from(&self.model);
        device.version.clone_from(&self.version);
        device.status = self.status;
        device.interfaces = self.interfaces;
        device
    }
}

impl Config {
    /// Name of the profile to use: explicit override, then `default_profile`.
    pub fn active_profile_name(&self, requested: Option<&str>) -> String {
        requested
            .map(str::to_owned)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| "default".into())
    }

    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::ProfileNotFound { name: name.into() })
    }

    /// Build the device registry from the inventory.
    pub fn registry(&self) -> Result<InMemoryRegistry, ConfigError> {
        let mut seen = HashSet::new();
        for entry in &self.devices {
            if entry.id.trim().is_empty() {
                return Err(ConfigError::Validation {
                    field: "devices.id".into(),
                    reason: "device id must not be empty".into(),
                });
            }
            if entry.address.trim().is_empty() {
                return Err(ConfigError::Validation {
                    field: format!("devices.{}.address", entry.id),
                    reason: "address must not be empty".into(),
                });
            }
            if !seen.insert(entry.id.as_str()) {
                return Err(ConfigError::Validation {
                    field: "devices.id".into(),
                    reason: format!("duplicate device id '{}'", entry.id),
                });
            }
        }
        Ok(self.devices.iter().map(DeviceEntry::to_device).collect())
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "eosman", "eosman").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("eosman");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load config from `path` (missing file is fine) merged with `EOSMAN_*` env vars.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if it can't be read.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

fn keyring_entry(profile_name: &str) -> Result<keyring::Entry, ConfigError> {
    Ok(keyring::Entry::new(
        KEYRING_SERVICE,
        &format!("{profile_name}/password"),
    )?)
}

/// Store a profile password in the system keyring.
pub fn store_password(profile_name: &str, password: &str) -> Result<(), ConfigError> {
    keyring_entry(profile_name)?.set_password(password)?;
    Ok(())
}

/// Resolve the eAPI password: `password_env`, then keyring, then plaintext.
pub fn resolve_password(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    // 1. Profile's password_env → env var lookup
    if let Some(ref env_name) = profile.password_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    // 2. System keyring
    if let Ok(entry) = keyring_entry(profile_name) {
        if let Ok(pw) = entry.get_password() {
            return Ok(SecretString::from(pw));
        }
    }

    // 3. Plaintext in config
    if let Some(ref pw) = profile.password {
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

pub fn resolve_credentials(
    profile: &Profile,
    profile_name: &str,
) -> Result<EapiCredentials, ConfigError> {
    let username = profile
        .username
        .clone()
        .or_else(|| std::env::var("EOSMAN_USERNAME").ok())
        .ok_or_else(|| ConfigError::NoCredentials {
            profile: profile_name.into(),
        })?;
    let password = resolve_password(profile, profile_name)?;
    Ok(EapiCredentials { username, password })
}

// ── Engine wiring ───────────────────────────────────────────────────

/// Build an `EngineConfig` from defaults and an optional profile.
pub fn engine_config(defaults: &Defaults, profile: Option<&Profile>) -> EngineConfig {
    let timeout = profile
        .and_then(|p| p.timeout)
        .unwrap_or(defaults.timeout);
    EngineConfig {
        command_timeout: Duration::from_secs(timeout),
        min_command_spacing: Duration::from_millis(defaults.command_spacing_ms),
        ..EngineConfig::default()
    }
    .with_history_capacity(defaults.history_capacity)
}

/// Build the transport a profile asks for.
pub fn build_transport(
    profile: &Profile,
    profile_name: &str,
    timeout: Duration,
) -> Result<Arc<dyn Transport>, ConfigError> {
    match profile.transport {
        TransportKind::Simulated => {
            let latency = Duration::from_millis(profile.latency_ms.unwrap_or(0));
            Ok(Arc::new(SimulatedTransport::new().with_latency(latency)))
        }
        TransportKind::Eapi => {
            let credentials = resolve_credentials(profile, profile_name)?;
            Ok(Arc::new(EapiTransport::new(
                credentials,
                profile.tls(),
                timeout,
            )))
        }
    }
}
