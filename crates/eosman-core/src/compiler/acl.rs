use super::{Block, present};
use crate::error::CoreError;
use crate::model::AclIntent;

const SEQUENCE_STEP: usize = 10;

pub(super) fn render(intent: &AclIntent) -> Result<Vec<Block>, CoreError> {
    let name = intent.name.trim();
    if name.is_empty() {
        return Err(CoreError::invalid_config("acl", "access list name is empty"));
    }

    let mut block = Block::new(format!("ip access-list {name}"));
    for (idx, rule) in intent.rules.iter().enumerate() {
        block.clause(format!(
            "{seq} {action} {proto} {src} {dst}",
            seq = (idx + 1) * SEQUENCE_STEP,
            action = rule.action,
            proto = present(rule.protocol.as_deref()).unwrap_or("ip"),
            src = present(rule.source.as_deref()).unwrap_or("any"),
            dst = present(rule.destination.as_deref()).unwrap_or("any"),
        ));
    }
    Ok(vec![block])
}
