use super::{Block, present};
use crate::error::CoreError;
use crate::model::{AdminState, InterfaceIntent, MAX_VLAN_ID, PortMode};

/// Description used when the intent leaves it blank.
pub const DEFAULT_DESCRIPTION: &str = "Configured via EOS Manager";

pub(super) fn render(intent: &InterfaceIntent) -> Result<Vec<Block>, CoreError> {
    let name = intent.interface_name.trim();
    if name.is_empty() {
        return Err(CoreError::invalid_config("interface", "interface name is empty"));
    }
    if let Some(id) = intent.vlan_id {
        if id == 0 || id > MAX_VLAN_ID {
            return Err(CoreError::invalid_config(
                "interface",
                format!("VLAN id {id} is outside 1-{MAX_VLAN_ID}"),
            ));
        }
    }

    let mut block = Block::new(format!("interface {name}"));
    block.clause(format!(
        "description {}",
        present(intent.description.as_deref()).unwrap_or(DEFAULT_DESCRIPTION)
    ));
    block.clause(format!("switchport mode {}", intent.port_mode));
    if let (PortMode::Access, Some(id)) = (intent.port_mode, intent.vlan_id) {
        block.clause(format!("switchport access vlan {id}"));
    }
    block.clause(match intent.admin_state {
        AdminState::Up => "no shutdown",
        AdminState::Down => "shutdown",
    });

    Ok(vec![block])
}
