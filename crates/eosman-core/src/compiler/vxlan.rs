use super::Block;
use crate::error::CoreError;
use crate::model::{MAX_VLAN_ID, MAX_VNI, VxlanIntent};

pub(super) fn render(intent: &VxlanIntent) -> Result<Vec<Block>, CoreError> {
    let source = intent.source_interface.trim();
    if source.is_empty() {
        return Err(CoreError::invalid_config("vxlan", "source interface is empty"));
    }
    if let Some(vni) = intent.vni {
        if vni == 0 || vni > MAX_VNI {
            return Err(CoreError::invalid_config(
                "vxlan",
                format!("VNI {vni} is outside 1-{MAX_VNI}"),
            ));
        }
    }
    if let Some(vlan) = intent.vlan_id {
        if vlan == 0 || vlan > MAX_VLAN_ID {
            return Err(CoreError::invalid_config(
                "vxlan",
                format!("VLAN id {vlan} is outside 1-{MAX_VLAN_ID}"),
            ));
        }
    }
    if let Some(group) = intent.multicast_group {
        if !group.is_multicast() {
            return Err(CoreError::invalid_config(
                "vxlan",
                format!("{group} is not an IPv4 multicast address"),
            ));
        }
    }

    let mut tunnel = Block::new("interface Vxlan1");
    tunnel.clause(format!("vxlan source-interface {source}"));
    let binding = intent.vlan_id.zip(intent.vni);
    if let Some((vlan, vni)) = binding {
        tunnel.clause(format!("vxlan vlan {vlan} vni {vni}"));
    }
    if let Some(group) = intent.multicast_group {
        tunnel.clause(format!("vxlan multicast-group {group}"));
    }

    let mut blocks = vec![tunnel];
    if let Some((vlan, vni)) = binding {
        let mut companion = Block::new(format!("vlan {vlan}"));
        companion.clause(format!("name VXLAN_{vni}"));
        blocks.push(companion);
    }
    Ok(blocks)
}
