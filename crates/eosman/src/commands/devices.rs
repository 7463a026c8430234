//! Inventory listing. Reads the config only; no switch is contacted.

use std::sync::Arc;

use tabled::Tabled;

use eosman_core::{Device, DeviceId, DeviceRegistry};

use crate::cli::{DevicesArgs, DevicesCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "Model")]
    model: String,
    #[tabled(rename = "Version")]
    version: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Ports Up")]
    ports: String,
}

impl From<&Arc<Device>> for DeviceRow {
    fn from(d: &Arc<Device>) -> Self {
        Self {
            id: d.id.to_string(),
            name: d.name.clone(),
            address: d.address.clone(),
            model: d.model.clone(),
            version: d.version.clone(),
            status: d.status.to_string(),
            ports: format!("{}/{}", d.interfaces.up, d.interfaces.total),
        }
    }
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() { "-" } else { value }
}

fn detail(d: &Arc<Device>) -> String {
    let mut lines = vec![
        format!("ID:         {}", d.id),
        format!("Name:       {}", d.name),
        format!("Address:    {}", d.address),
        format!("Model:      {}", or_dash(&d.model)),
        format!("Version:    {}", or_dash(&d.version)),
        format!("Status:     {}", d.status),
        format!(
            "Interfaces: {} total, {} up, {} down",
            d.interfaces.total, d.interfaces.up, d.interfaces.down
        ),
    ];
    if let Some(ref uptime) = d.uptime {
        lines.push(format!("Uptime:     {uptime}"));
    }
    if let Some(seen) = d.last_seen {
        lines.push(format!("Last seen:  {}", seen.to_rfc3339()));
    }
    lines.join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: DevicesArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = config::load(global)?;
    let registry = cfg.registry()?;

    match args.command {
        DevicesCommand::List { search } => {
            let devices = match search {
                Some(term) => registry.search(&term),
                None => registry.list(),
            };
            let out = output::render_list(
                &global.output,
                &devices,
                |d| DeviceRow::from(d),
                |d| d.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
        DevicesCommand::Get { id } => {
            let device = registry
                .lookup(&DeviceId::from(id.as_str()))
                .ok_or_else(|| CliError::NotFound {
                    resource_type: "device".into(),
                    identifier: id,
                    list_command: "devices list".into(),
                })?;
            let out =
                output::render_single(&global.output, &device, detail, |d| d.id.to_string())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
