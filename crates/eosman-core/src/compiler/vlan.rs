use std::collections::BTreeMap;

use super::Block;
use crate::error::CoreError;
use crate::model::{MAX_VLAN_ID, VlanIntent, VlanSet};

pub(super) fn render(set: &VlanSet) -> Result<Vec<Block>, CoreError> {
    let mut by_id: BTreeMap<u16, &VlanIntent> = BTreeMap::new();
    for vlan in set.iter() {
        if vlan.vlan_id == 0 || vlan.vlan_id > MAX_VLAN_ID {
            return Err(CoreError::invalid_config(
                "vlan",
                format!("VLAN id {} is outside 1-{MAX_VLAN_ID}", vlan.vlan_id),
            ));
        }
        if by_id.insert(vlan.vlan_id, vlan).is_some() {
            return Err(CoreError::invalid_config(
                "vlan",
                format!("duplicate VLAN id {}", vlan.vlan_id),
            ));
        }
    }

    Ok(by_id
        .values()
        .map(|vlan| {
            let mut block = Block::new(format!("vlan {}", vlan.vlan_id));
            let name = vlan.name.trim();
            if !name.is_empty() {
                block.clause(format!("name {name}"));
            }
            block
        })
        .collect())
}
