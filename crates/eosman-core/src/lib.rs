//! Command orchestration and configuration compilation for Arista EOS switches.
//!
//! - **[`Engine`]** — Cloneable facade over everything below. The CLI builds
//!   one per invocation from an [`EngineConfig`], a [`DeviceRegistry`] and a
//!   [`Transport`].
//!
//! - **[`CommandExecutor`]** — Dispatches a single command to a single device.
//!   At most one dispatch per device is in flight; a second caller gets
//!   [`CoreError::DeviceBusy`] immediately. Transport failures and timeouts
//!   come back as error [`CommandResult`]s, never as `Err`.
//!
//! - **[`ScriptRunner`]** — Parses script text into a [`ScriptJob`] and runs it
//!   strictly in order, holding the device for the whole run. Continues past
//!   failures unless [`ScriptOptions::stop_on_error`] is set; honours a
//!   `CancellationToken` between commands.
//!
//! - **[`HistoryLedger`]** — Newest-first record of every dispatch, optionally
//!   capacity-bounded, with atomic `clear()` and JSON / CSV export.
//!
//! - **[`compiler`]** — Pure rendering of [`ConfigIntent`] values (interface,
//!   VLAN, VXLAN, ACL, routing, system) into EOS CLI text.

pub mod catalog;
pub mod compiler;
pub mod config;
pub mod engine;
pub mod error;
pub mod executor;
pub mod history;
pub mod model;
pub mod registry;
pub mod script;
pub mod transport;

// ── Primary re-exports ──────────────────────────────────────────────
pub use catalog::{QuickCommand, find_quick_command, quick_commands};
pub use config::{DEFAULT_HISTORY_CAPACITY, EapiCredentials, EngineConfig, TlsVerification};
pub use engine::Engine;
pub use error::CoreError;
pub use executor::{CommandExecutor, DeviceLease};
pub use history::{ExportFormat, HistoryLedger, HistoryRecord, HistorySnapshot};
pub use registry::{DeviceRegistry, InMemoryRegistry};
pub use script::{ScriptJob, ScriptOptions, ScriptRunSummary, ScriptRunner};
pub use transport::{
    EapiTransport, SimulatedTransport, Transport, TransportError, TransportReply,
};

pub use model::{
    AclAction, AclIntent, AclRule, AdminState, BgpConfig, BgpNeighbor, CommandResult,
    CommandStatus, ConfigIntent, Device, DeviceId, DeviceStatus, InterfaceCounts,
    InterfaceIntent, PortMode, RoutingIntent, SnmpConfig, StaticRoute, SystemIntent, VlanIntent,
    VlanSet, VxlanIntent,
};
