//! Config subcommand handlers.

use std::collections::HashMap;

use dialoguer::{Confirm, Input, Select};

use eosman_core::{DeviceStatus, InterfaceCounts};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, DeviceEntry, Profile, TransportKind};
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

const MASK: &str = "****";

/// Copy of `cfg` with plaintext passwords masked.
fn redacted(cfg: &Config) -> Config {
    let mut cfg = cfg.clone();
    for profile in cfg.profiles.values_mut() {
        if profile.password.is_some() {
            profile.password = Some(MASK.into());
        }
    }
    cfg
}

/// Format config for display, masking sensitive fields.
fn format_config(cfg: &Config) -> String {
    use std::fmt::Write;
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);
    let _ = writeln!(out, "history_capacity = {}", cfg.defaults.history_capacity);
    let _ = writeln!(out, "command_spacing_ms = {}", cfg.defaults.command_spacing_ms);

    let mut names: Vec<_> = cfg.profiles.keys().collect();
    names.sort();
    for name in names {
        let p = &cfg.profiles[name];
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let transport = match p.transport {
            TransportKind::Eapi => "eapi",
            TransportKind::Simulated => "simulated",
        };
        let _ = writeln!(out, "transport = \"{transport}\"");
        if let Some(ref u) = p.username {
            let _ = writeln!(out, "username = \"{u}\"");
        }
        if p.password.is_some() {
            let _ = writeln!(out, "password = \"{MASK}\"");
        }
        if let Some(ref env) = p.password_env {
            let _ = writeln!(out, "password_env = \"{env}\"");
        }
        if let Some(ref ca) = p.ca_cert {
            let _ = writeln!(out, "ca_cert = \"{}\"", ca.display());
        }
        if let Some(insecure) = p.insecure {
            let _ = writeln!(out, "insecure = {insecure}");
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
    }

    for d in &cfg.devices {
        let _ = writeln!(out);
        let _ = writeln!(out, "[[devices]]");
        let _ = writeln!(out, "id = \"{}\"", d.id);
        if let Some(ref name) = d.name {
            let _ = writeln!(out, "name = \"{name}\"");
        }
        let _ = writeln!(out, "address = \"{}\"", d.address);
    }

    out.trim_end().to_owned()
}

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// Read a non-empty password without echo.
fn prompt_password(label: &str) -> Result<String, CliError> {
    let secret = rpassword::prompt_password(label).map_err(prompt_err)?;
    if secret.is_empty() {
        return Err(CliError::Validation {
            field: "password".into(),
            reason: "value cannot be empty".into(),
        });
    }
    Ok(secret)
}

/// Store in the keyring, or return the secret for plaintext config.
fn prompt_keyring_storage(secret: String, profile_name: &str) -> Result<Option<String>, CliError> {
    let choices = &[
        "Store in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let selection = Select::new()
        .with_prompt("Where to store the password?")
        .items(choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    if selection == 0 {
        config::store_password(profile_name, &secret)?;
        eprintln!("   ✓ Password stored in system keyring");
        Ok(None)
    } else {
        Ok(Some(secret))
    }
}

/// Prompt for inventory entries until the user declines.
fn prompt_devices() -> Result<Vec<DeviceEntry>, CliError> {
    let mut devices = Vec::new();
    loop {
        let prompt = if devices.is_empty() {
            "Add a switch to the inventory?"
        } else {
            "Add another switch?"
        };
        let add = Confirm::new()
            .with_prompt(prompt)
            .default(devices.is_empty())
            .interact()
            .map_err(prompt_err)?;
        if !add {
            return Ok(devices);
        }

        let id: String = Input::new()
            .with_prompt("Device id")
            .interact_text()
            .map_err(prompt_err)?;
        let name: String = Input::new()
            .with_prompt("Display name")
            .default(id.clone())
            .interact_text()
            .map_err(prompt_err)?;
        let address: String = Input::new()
            .with_prompt("Management address")
            .interact_text()
            .map_err(prompt_err)?;

        devices.push(DeviceEntry {
            name: (name != id).then_some(name),
            id,
            address,
            model: String::new(),
            version: String::new(),
            status: DeviceStatus::default(),
            interfaces: InterfaceCounts::default(),
        });
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = config::config_file(global);
            eprintln!("✨ eosman configuration wizard");
            eprintln!("   Config path: {}\n", config_path.display());

            if config_path.exists()
                && !Confirm::new()
                    .with_prompt("A config file already exists. Overwrite it?")
                    .default(false)
                    .interact()
                    .map_err(prompt_err)?
            {
                eprintln!("Aborted.");
                return Ok(());
            }

            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default("default".into())
                .interact_text()
                .map_err(prompt_err)?;

            let transport_choices = &["eAPI over HTTPS", "Simulated (offline)"];
            let transport = Select::new()
                .with_prompt("Transport")
                .items(transport_choices)
                .default(0)
                .interact()
                .map_err(prompt_err)?;

            let profile = if transport == 0 {
                let username: String = Input::new()
                    .with_prompt("eAPI username")
                    .default("admin".into())
                    .interact_text()
                    .map_err(prompt_err)?;
                let password = prompt_password("eAPI password: ")?;
                let password = prompt_keyring_storage(password, &profile_name)?;
                let verify = Confirm::new()
                    .with_prompt("Verify switch TLS certificates?")
                    .default(false)
                    .interact()
                    .map_err(prompt_err)?;
                Profile {
                    transport: TransportKind::Eapi,
                    username: Some(username),
                    password,
                    insecure: Some(!verify),
                    ..Profile::default()
                }
            } else {
                Profile {
                    transport: TransportKind::Simulated,
                    ..Profile::default()
                }
            };

            let devices = prompt_devices()?;

            let mut profiles = HashMap::new();
            profiles.insert(profile_name.clone(), profile);
            let cfg = Config {
                default_profile: Some(profile_name.clone()),
                profiles,
                devices,
                ..Config::default()
            };
            config::save_config_to(&cfg, &config_path)?;

            eprintln!("\n✓ Configuration written to {}", config_path.display());
            eprintln!("  Active profile: {profile_name}");
            eprintln!("\n  Test it: eosman devices list");
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = redacted(&config::load_or_default(global));
            let out = output::render_single(&global.output, &cfg, format_config, |_| {
                config::config_file(global).display().to_string()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── SetPassword ─────────────────────────────────────────────
        ConfigCommand::SetPassword => {
            let cfg = config::load(global)?;
            let profile_name = config::active_profile_name(global, &cfg);
            if !cfg.profiles.contains_key(&profile_name) {
                return Err(CliError::ProfileNotFound {
                    name: profile_name,
                    available: config::available_profiles(&cfg),
                });
            }

            let password = prompt_password("eAPI password: ")?;
            config::store_password(&profile_name, &password)?;
            eprintln!("✓ Password stored in system keyring for profile '{profile_name}'");
            Ok(())
        }
    }
}
