//! CLI configuration: thin wrapper around `eosman_config`.
//!
//! Resolves the config file and active profile, applies `GlobalOpts`
//! flag overrides (--insecure, --timeout), and builds the `Engine`.

use std::path::PathBuf;
use std::sync::Arc;

use eosman_core::Engine;

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use eosman_config::{
    Config, DeviceEntry, Profile, TransportKind, load_config_from, save_config_to,
    store_password,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Config file in effect: `--config` / `EOSMAN_CONFIG`, else the platform path.
pub fn config_file(global: &GlobalOpts) -> PathBuf {
    global
        .config_file
        .clone()
        .unwrap_or_else(eosman_config::config_path)
}

pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    Ok(load_config_from(&config_file(global))?)
}

/// Load config, falling back to defaults when it can't be read.
pub fn load_or_default(global: &GlobalOpts) -> Config {
    load(global).unwrap_or_default()
}

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    config.active_profile_name(global.profile.as_deref())
}

/// Comma-separated profile names for help text.
pub fn available_profiles(config: &Config) -> String {
    let mut names: Vec<_> = config.profiles.keys().cloned().collect();
    if names.is_empty() {
        return "(none)".into();
    }
    names.sort();
    names.join(", ")
}

/// The active profile with CLI flag overrides applied.
///
/// Flag > env > profile precedence: `--insecure` forces invalid certs to
/// be accepted, `--timeout` replaces the profile timeout.
pub fn resolve_profile(global: &GlobalOpts, config: &Config) -> Result<(String, Profile), CliError> {
    let name = active_profile_name(global, config);
    let mut profile = match config.profiles.get(&name) {
        Some(profile) => profile.clone(),
        None if config.profiles.is_empty() => {
            return Err(CliError::NoConfig {
                path: config_file(global).display().to_string(),
            });
        }
        None => {
            return Err(CliError::ProfileNotFound {
                name,
                available: available_profiles(config),
            });
        }
    };

    if global.insecure {
        profile.insecure = Some(true);
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }
    Ok((name, profile))
}

/// Build an engine for the active profile and inventory.
pub fn build_engine(global: &GlobalOpts) -> Result<Engine, CliError> {
    let cfg = load(global)?;
    let (name, profile) = resolve_profile(global, &cfg)?;

    let engine_config = eosman_config::engine_config(&cfg.defaults, Some(&profile));
    let registry = cfg.registry()?;
    let transport =
        eosman_config::build_transport(&profile, &name, engine_config.command_timeout)?;

    tracing::debug!(
        profile = %name,
        transport = ?profile.transport,
        devices = registry.len(),
        "engine configured"
    );
    Ok(Engine::new(engine_config, Arc::new(registry), transport))
}
