// ── Domain model ──

mod device;
mod intent;
mod result;

pub use device::{Device, DeviceId, DeviceStatus, InterfaceCounts};
pub use intent::{
    AclAction, AclIntent, AclRule, AdminState, BgpConfig, BgpNeighbor, ConfigIntent,
    InterfaceIntent, PortMode, RoutingIntent, SnmpConfig, StaticRoute, SystemIntent, VlanIntent,
    VlanSet, VxlanIntent,
};
pub use result::{CommandResult, CommandStatus};

/// Highest usable 802.1Q VLAN id.
pub const MAX_VLAN_ID: u16 = 4094;

/// Highest 24-bit VXLAN network identifier.
pub const MAX_VNI: u32 = 16_777_215;
