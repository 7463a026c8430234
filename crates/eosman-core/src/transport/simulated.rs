// ── Simulated transport ──
//
// An offline stand-in for a switch. Replies come from a small table of
// canned outputs keyed on the command text, after an optional delay.

use std::time::Duration;

use futures_util::future::BoxFuture;
use tracing::trace;

use super::{Transport, TransportError, TransportReply};
use crate::model::Device;

const SHOW_VERSION: &str = "\
Arista DCS-7050SX3-48YC8-F
Hardware version: 11.00
Serial number: SSJ17120022
Software image version: 4.28.3M
Architecture: i686
Uptime: 45 days, 12 hours and 34 minutes
Total memory: 8155904 kB
Free memory: 5420516 kB";

const SHOW_INTERFACES: &str = "\
Port      Name               Status       Vlan       Duplex Speed Type
Et1                          connected    1          full   10G    10GBASE-SR
Et2                          connected    1          full   10G    10GBASE-SR
Et3                          notconnect   1          auto   auto   10GBASE-SR
Et48                         connected    20         full   10G    10GBASE-SR
Ma1                          connected    routed     full   1000   10/100/1000";

const SHOW_VLAN: &str = "\
VLAN  Name                             Status    Ports
----- -------------------------------- --------- -------------------------------
1     default                          active    Et1, Et2, Et3, Et4, Et5, Et6
10    Management                       active
20    Production                       active    Et48
30    Guest                            active";

/// Output returned for commands the simulator rejects.
pub const REJECTED_OUTPUT: &str = "% Invalid command or syntax error";

/// Transport answering from canned outputs without any network I/O.
#[derive(Debug, Clone, Default)]
pub struct SimulatedTransport {
    latency: Duration,
}

impl SimulatedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every reply by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    fn reply(command: &str) -> TransportReply {
        if command.contains("show version") {
            TransportReply::success(SHOW_VERSION)
        } else if command.contains("show interfaces") {
            TransportReply::success(SHOW_INTERFACES)
        } else if command.contains("show vlan") {
            TransportReply::success(SHOW_VLAN)
        } else if command.contains("invalid") || command.contains("error") {
            TransportReply::failure(REJECTED_OUTPUT)
        } else {
            TransportReply::success(format!("Command executed successfully: {command}"))
        }
    }
}

impl Transport for SimulatedTransport {
    fn send<'a>(
        &'a self,
        device: &'a Device,
        command: &'a str,
        _timeout: Duration,
    ) -> BoxFuture<'a, Result<TransportReply, TransportError>> {
        Box::pin(async move {
            if !self.latency.is_zero() {
                tokio::time::sleep(self.latency).await;
            }
            trace!(device = %device.id, command, "simulated reply");
            Ok(Self::reply(command))
        })
    }
}
