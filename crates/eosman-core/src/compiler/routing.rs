use super::Block;
use crate::error::CoreError;
use crate::model::RoutingIntent;

pub(super) fn render(intent: &RoutingIntent) -> Result<Vec<Block>, CoreError> {
    let mut blocks = Vec::new();

    let mut statics = Block::default();
    for route in &intent.static_routes {
        let prefix = route.prefix.trim();
        let next_hop = route.next_hop.trim();
        if prefix.is_empty() || next_hop.is_empty() {
            return Err(CoreError::invalid_config(
                "routing",
                "static route needs both a prefix and a next hop",
            ));
        }
        match route.distance {
            Some(distance) => statics.line(format!("ip route {prefix} {next_hop} {distance}")),
            None => statics.line(format!("ip route {prefix} {next_hop}")),
        };
    }
    blocks.push(statics);

    if let Some(bgp) = &intent.bgp {
        if bgp.asn == 0 {
            return Err(CoreError::invalid_config("routing", "BGP ASN must be non-zero"));
        }
        let mut block = Block::new(format!("router bgp {}", bgp.asn));
        if let Some(id) = bgp.router_id {
            block.clause(format!("router-id {id}"));
        }
        for neighbor in &bgp.neighbors {
            if neighbor.remote_as == 0 {
                return Err(CoreError::invalid_config(
                    "routing",
                    format!("neighbor {} has remote AS 0", neighbor.address),
                ));
            }
            block.clause(format!(
                "neighbor {} remote-as {}",
                neighbor.address, neighbor.remote_as
            ));
        }
        blocks.push(block);
    }

    Ok(blocks)
}
