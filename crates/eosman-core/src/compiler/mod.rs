// ── Configuration compiler ──
//
// Pure rendering of `ConfigIntent` values into EOS CLI text. Each intent
// variant has its own module producing a list of blocks; this module
// joins them. Output is a function of the intent alone: no I/O and no
// dependence on field order in the source document.

mod acl;
mod interface;
mod routing;
mod system;
mod vlan;
mod vxlan;

pub use interface::DEFAULT_DESCRIPTION;

use crate::error::CoreError;
use crate::model::ConfigIntent;

/// Indentation for clauses nested under a mode-entering line.
const INDENT: &str = "   ";

/// A run of lines rendered without blank lines in between.
#[derive(Debug, Default)]
struct Block {
    lines: Vec<String>,
}

impl Block {
    fn new(header: impl Into<String>) -> Self {
        Self {
            lines: vec![header.into()],
        }
    }

    /// Top-level line.
    fn line(&mut self, text: impl Into<String>) -> &mut Self {
        self.lines.push(text.into());
        self
    }

    /// Indented clause under the block header.
    fn clause(&mut self, text: impl AsRef<str>) -> &mut Self {
        self.lines.push(format!("{INDENT}{}", text.as_ref()));
        self
    }

    fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Render one intent as EOS configuration text.
///
/// Blocks are separated by a blank line and the text ends with a newline.
/// An intent with nothing to configure renders as an empty string.
pub fn compile(intent: &ConfigIntent) -> Result<String, CoreError> {
    Ok(join(&blocks(intent)?))
}

/// Render several intents in order, as one document.
pub fn compile_all(intents: &[ConfigIntent]) -> Result<String, CoreError> {
    let mut all = Vec::new();
    for intent in intents {
        all.extend(blocks(intent)?);
    }
    Ok(join(&all))
}

/// Compiled text as a flat list of commands, ready for the script runner.
pub fn compile_commands(intent: &ConfigIntent) -> Result<Vec<String>, CoreError> {
    Ok(to_commands(&compile(intent)?))
}

/// Split rendered text into trimmed, non-empty command lines.
pub fn to_commands(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_owned)
        .collect()
}

fn blocks(intent: &ConfigIntent) -> Result<Vec<Block>, CoreError> {
    let blocks = match intent {
        ConfigIntent::Interface(i) => interface::render(i)?,
        ConfigIntent::Vlan(v) => vlan::render(v)?,
        ConfigIntent::Vxlan(v) => vxlan::render(v)?,
        ConfigIntent::Acl(a) => acl::render(a)?,
        ConfigIntent::Routing(r) => routing::render(r)?,
        ConfigIntent::System(s) => system::render(s),
    };
    check_single_lines(intent.kind(), &blocks)?;
    Ok(blocks)
}

/// Every rendered line must stay one command: a field carrying a line
/// break or other control character would split into extra commands.
fn check_single_lines(kind: &'static str, blocks: &[Block]) -> Result<(), CoreError> {
    for line in blocks.iter().flat_map(|b| &b.lines) {
        if line.chars().any(char::is_control) {
            return Err(CoreError::invalid_config(
                kind,
                format!("{:?} contains a line break or control character", line.trim()),
            ));
        }
    }
    Ok(())
}

fn join(blocks: &[Block]) -> String {
    let mut out = String::new();
    for block in blocks.iter().filter(|b| !b.is_empty()) {
        if !out.is_empty() {
            out.push('\n');
        }
        for line in &block.lines {
            out.push_str(line);
            out.push('\n');
        }
    }
    out
}

/// Trimmed value of an optional text field, `None` when blank.
fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::{
        AclAction, AclIntent, AclRule, InterfaceIntent, RoutingIntent, StaticRoute, SystemIntent,
        VlanIntent, VlanSet, VxlanIntent,
    };

    #[test]
    fn blocks_are_separated_by_blank_lines() {
        let text = join(&[
            Block::new("a"),
            Block::default(),
            {
                let mut b = Block::new("b");
                b.clause("c");
                b
            },
        ]);
        assert_eq!(text, "a\n\nb\n   c\n");
    }

    #[test]
    fn empty_intent_renders_empty_text() {
        let text = compile(&ConfigIntent::System(SystemIntent::default())).unwrap();
        assert_eq!(text, "");
        assert!(compile_commands(&ConfigIntent::System(SystemIntent::default()))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn commands_are_flattened_and_trimmed() {
        let intent = ConfigIntent::Interface(InterfaceIntent::new("Ethernet2"));
        assert_eq!(
            compile_commands(&intent).unwrap(),
            [
                "interface Ethernet2",
                "description Configured via EOS Manager",
                "switchport mode access",
                "no shutdown",
            ]
        );
    }

    #[test]
    fn compile_all_concatenates_in_order() {
        let vlans: VlanSet = std::iter::once(VlanIntent {
            vlan_id: 10,
            name: "Management".into(),
            description: String::new(),
        })
        .collect();
        let text = compile_all(&[
            ConfigIntent::Vlan(vlans),
            ConfigIntent::Interface(InterfaceIntent::new("Ethernet1")),
        ])
        .unwrap();
        assert!(text.starts_with("vlan 10\n   name Management\n\ninterface Ethernet1\n"));
    }

    #[test]
    fn compile_is_deterministic() {
        let doc_a = r#"{"kind":"interface","interface_name":"Ethernet1","vlan_id":20,"port_mode":"access","admin_state":"up","description":""}"#;
        let doc_b = r#"{"admin_state":"up","description":"","port_mode":"access","vlan_id":20,"interface_name":"Ethernet1","kind":"interface"}"#;
        let a: ConfigIntent = serde_json::from_str(doc_a).unwrap();
        let b: ConfigIntent = serde_json::from_str(doc_b).unwrap();

        let first = compile(&a).unwrap();
        assert_eq!(first, compile(&a).unwrap());
        assert_eq!(first, compile(&b).unwrap());
    }

    fn assert_rejected(intent: &ConfigIntent) {
        let err = compile(intent).unwrap_err();
        assert!(
            matches!(
                &err,
                CoreError::InvalidConfiguration { intent: kind, .. } if *kind == intent.kind()
            ),
            "unexpected error: {err:?}"
        );
        assert!(compile_commands(intent).is_err());
    }

    #[test]
    fn line_breaks_in_interface_fields_are_rejected() {
        let mut port = InterfaceIntent::new("Ethernet1");
        port.description = Some("uplink\nreload now".into());
        assert_rejected(&ConfigIntent::Interface(port));

        let port = InterfaceIntent::new("Ethernet1\rshutdown");
        assert_rejected(&ConfigIntent::Interface(port));
    }

    #[test]
    fn line_breaks_in_vlan_names_are_rejected() {
        let vlans: VlanSet = std::iter::once(VlanIntent {
            vlan_id: 10,
            name: "Users\nno vlan 1".into(),
            description: String::new(),
        })
        .collect();
        assert_rejected(&ConfigIntent::Vlan(vlans));
    }

    #[test]
    fn line_breaks_in_vxlan_source_are_rejected() {
        let vxlan = VxlanIntent {
            source_interface: "Loopback1\nreload".into(),
            ..VxlanIntent::default()
        };
        assert_rejected(&ConfigIntent::Vxlan(vxlan));
    }

    #[test]
    fn line_breaks_in_acl_fields_are_rejected() {
        let acl = AclIntent {
            name: "EDGE-IN".into(),
            rules: vec![AclRule {
                action: AclAction::Permit,
                protocol: Some("tcp\nno ip access-list EDGE-IN".into()),
                source: None,
                destination: None,
            }],
        };
        assert_rejected(&ConfigIntent::Acl(acl));
    }

    #[test]
    fn line_breaks_in_static_routes_are_rejected() {
        let routing = RoutingIntent {
            static_routes: vec![StaticRoute {
                prefix: "0.0.0.0/0".into(),
                next_hop: "10.0.0.1\nreload".into(),
                distance: None,
            }],
            bgp: None,
        };
        assert_rejected(&ConfigIntent::Routing(routing));
    }

    #[test]
    fn control_characters_in_system_fields_are_rejected() {
        let system = SystemIntent {
            hostname: Some("core-01\u{7}".into()),
            ..SystemIntent::default()
        };
        assert_rejected(&ConfigIntent::System(system));

        let mut system = SystemIntent::default();
        system.snmp.location = Some("Rack 4\nsnmp-server community public rw".into());
        assert_rejected(&ConfigIntent::System(system));
    }
}
