use super::{Block, present};
use crate::model::SystemIntent;

pub(super) fn render(intent: &SystemIntent) -> Vec<Block> {
    let mut block = Block::default();

    if let Some(hostname) = present(intent.hostname.as_deref()) {
        block.line(format!("hostname {hostname}"));
    }
    if let Some(domain) = present(intent.domain_name.as_deref()) {
        block.line(format!("dns domain {domain}"));
    }
    for server in intent.name_servers.iter().filter_map(|s| present(Some(s))) {
        block.line(format!("ip name-server {server}"));
    }
    for server in intent.ntp_servers.iter().filter_map(|s| present(Some(s))) {
        block.line(format!("ntp server {server}"));
    }

    let snmp = &intent.snmp;
    let community = present(snmp.community.as_deref());
    if let Some(community) = community {
        block.line(format!("snmp-server community {community} ro"));
    }
    if let Some(contact) = present(snmp.contact.as_deref()) {
        block.line(format!("snmp-server contact {contact}"));
    }
    if let Some(location) = present(snmp.location.as_deref()) {
        block.line(format!("snmp-server location {location}"));
    }
    for host in snmp.hosts.iter().filter_map(|h| present(Some(h))) {
        block.line(format!(
            "snmp-server host {host} version 2c {}",
            community.unwrap_or("public")
        ));
    }

    vec![block]
}
