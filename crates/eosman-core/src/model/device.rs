// ── Device domain types ──
//
// A `Device` is owned by the registry. Everything else refers to it by
// `DeviceId` and re-resolves it per operation.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── DeviceId ────────────────────────────────────────────────────────

/// Stable identifier for a switch in the inventory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for DeviceId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_owned()))
    }
}

impl From<&str> for DeviceId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for DeviceId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

// ── Status ──────────────────────────────────────────────────────────

/// Reachability as last reported by discovery / polling.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DeviceStatus {
    Online,
    Offline,
    Warning,
    #[default]
    Discovered,
}

/// Port totals for a switch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceCounts {
    pub total: u32,
    pub up: u32,
    pub down: u32,
}

// ── Device ──────────────────────────────────────────────────────────

/// A managed switch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    pub name: String,
    /// Management address (IP or hostname) used by the transport.
    pub address: String,
    #[serde(default)]
    pub model: String,
    /// Software version string, e.g. `4.28.3M`.
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub status: DeviceStatus,
    /// Free-form uptime as reported by the switch.
    #[serde(default)]
    pub uptime: Option<String>,
    #[serde(default)]
    pub interfaces: InterfaceCounts,
    #[serde(default)]
    pub last_seen: Option<DateTime<Utc>>,
}

impl Device {
    /// Minimal device with only identity and address filled in.
    pub fn new(id: impl Into<DeviceId>, name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            address: address.into(),
            model: String::new(),
            version: String::new(),
            status: DeviceStatus::default(),
            uptime: None,
            interfaces: InterfaceCounts::default(),
            last_seen: None,
        }
    }

    /// Whether the registry believes commands can reach this switch.
    pub fn is_reachable(&self) -> bool {
        matches!(self.status, DeviceStatus::Online | DeviceStatus::Warning)
    }

    /// Case-insensitive match on name / model, substring match on address.
    pub fn matches(&self, term: &str) -> bool {
        let needle = term.to_lowercase();
        self.name.to_lowercase().contains(&needle)
            || self.address.contains(term)
            || self.model.to_lowercase().contains(&needle)
    }
}
