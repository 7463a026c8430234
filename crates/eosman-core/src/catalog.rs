// ── Quick command catalogue ──

use serde::Serialize;

/// A named, commonly used read-only command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuickCommand {
    pub name: &'static str,
    pub command: &'static str,
}

const QUICK_COMMANDS: &[QuickCommand] = &[
    QuickCommand { name: "Show Version", command: "show version" },
    QuickCommand { name: "Show Interfaces", command: "show interfaces status" },
    QuickCommand { name: "Show IP Routes", command: "show ip route" },
    QuickCommand { name: "Show VLANs", command: "show vlan" },
    QuickCommand { name: "Show MAC Table", command: "show mac address-table" },
    QuickCommand { name: "Show Running Config", command: "show running-config" },
    QuickCommand { name: "Show System Resources", command: "show processes top" },
    QuickCommand { name: "Show BGP Summary", command: "show ip bgp summary" },
];

pub fn quick_commands() -> &'static [QuickCommand] {
    QUICK_COMMANDS
}

/// Look up a quick command by display name, ignoring case.
pub fn find_quick_command(name: &str) -> Option<&'static QuickCommand> {
    QUICK_COMMANDS
        .iter()
        .find(|q| q.name.eq_ignore_ascii_case(name.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalogue_has_eight_show_commands() {
        assert_eq!(quick_commands().len(), 8);
        assert!(quick_commands().iter().all(|q| q.command.starts_with("show ")));
    }

    #[test]
    fn lookup_ignores_case() {
        assert_eq!(
            find_quick_command("show bgp summary").map(|q| q.command),
            Some("show ip bgp summary")
        );
        assert!(find_quick_command("reload").is_none());
    }
}
