// ── Configuration intents ──
//
// Plain structured records describing desired switch configuration.
// They are created and edited by the caller and only ever read by the
// compiler; every field that can be left out carries `#[serde(default)]`
// so intent documents stay terse.

use std::net::{IpAddr, Ipv4Addr};

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// One configuration intent, tagged by `kind` in serialized form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConfigIntent {
    Interface(InterfaceIntent),
    Vlan(VlanSet),
    Vxlan(VxlanIntent),
    Acl(AclIntent),
    Routing(RoutingIntent),
    System(SystemIntent),
}

impl ConfigIntent {
    /// Short lowercase name of the variant, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Interface(_) => "interface",
            Self::Vlan(_) => "vlan",
            Self::Vxlan(_) => "vxlan",
            Self::Acl(_) => "acl",
            Self::Routing(_) => "routing",
            Self::System(_) => "system",
        }
    }
}

// ── Interface ───────────────────────────────────────────────────────

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PortMode {
    #[default]
    Access,
    Trunk,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AdminState {
    #[default]
    Up,
    Down,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceIntent {
    pub interface_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vlan_id: Option<u16>,
    #[serde(default)]
    pub port_mode: PortMode,
    #[serde(default)]
    pub admin_state: AdminState,
}

impl InterfaceIntent {
    pub fn new(interface_name: impl Into<String>) -> Self {
        Self {
            interface_name: interface_name.into(),
            description: None,
            vlan_id: None,
            port_mode: PortMode::default(),
            admin_state: AdminState::default(),
        }
    }
}

// ── VLAN ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VlanIntent {
    pub vlan_id: u16,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// A set of VLAN definitions with unique ids.
///
/// Mutators keep ids unique; a set deserialized from a document is
/// re-checked at compile time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VlanSet {
    #[serde(default)]
    vlans: Vec<VlanIntent>,
}

impl VlanSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a VLAN, rejecting ids already present.
    pub fn insert(&mut self, vlan: VlanIntent) -> Result<(), CoreError> {
        if self.get(vlan.vlan_id).is_some() {
            return Err(CoreError::invalid_config(
                "vlan",
                format!("duplicate VLAN id {}", vlan.vlan_id),
            ));
        }
        self.vlans.push(vlan);
        Ok(())
    }

    /// Append a blank VLAN with id one above the current maximum.
    ///
    /// Returns the new id, or `None` once 4094 is taken.
    pub fn add_next(&mut self) -> Option<u16> {
        let next = self
            .vlans
            .iter()
            .map(|v| v.vlan_id)
            .max()
            .map_or(Some(1), |max| max.checked_add(1))?;
        if next > super::MAX_VLAN_ID {
            return None;
        }
        self.vlans.push(VlanIntent {
            vlan_id: next,
            name: String::new(),
            description: String::new(),
        });
        Some(next)
    }

    pub fn remove(&mut self, vlan_id: u16) -> Option<VlanIntent> {
        let idx = self.vlans.iter().position(|v| v.vlan_id == vlan_id)?;
        Some(self.vlans.remove(idx))
    }

    /// Replace name and description of an existing VLAN. Returns `false` if absent.
    pub fn update(
        &mut self,
        vlan_id: u16,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> bool {
        match self.vlans.iter_mut().find(|v| v.vlan_id == vlan_id) {
            Some(vlan) => {
                vlan.name = name.into();
                vlan.description = description.into();
                true
            }
            None => false,
        }
    }

    pub fn get(&self, vlan_id: u16) -> Option<&VlanIntent> {
        self.vlans.iter().find(|v| v.vlan_id == vlan_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &VlanIntent> {
        self.vlans.iter()
    }

    pub fn len(&self) -> usize {
        self.vlans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vlans.is_empty()
    }
}

impl FromIterator<VlanIntent> for VlanSet {
    /// Collects without checking uniqueness; `compile` rejects duplicates.
    fn from_iter<I: IntoIterator<Item = VlanIntent>>(iter: I) -> Self {
        Self {
            vlans: iter.into_iter().collect(),
        }
    }
}

// ── VXLAN ───────────────────────────────────────────────────────────

fn default_source_interface() -> String {
    "Loopback1".into()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VxlanIntent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vni: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vlan_id: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multicast_group: Option<Ipv4Addr>,
    #[serde(default = "default_source_interface")]
    pub source_interface: String,
}

impl Default for VxlanIntent {
    fn default() -> Self {
        Self {
            vni: None,
            vlan_id: None,
            multicast_group: None,
            source_interface: default_source_interface(),
        }
    }
}

// ── ACL ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AclAction {
    Permit,
    Deny,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclRule {
    pub action: AclAction,
    /// Protocol keyword; `ip` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    /// Source network in CIDR form; `any` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclIntent {
    pub name: String,
    #[serde(default)]
    pub rules: Vec<AclRule>,
}

// ── Routing ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticRoute {
    /// Destination prefix, e.g. `0.0.0.0/0`.
    pub prefix: String,
    pub next_hop: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BgpNeighbor {
    pub address: IpAddr,
    pub remote_as: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BgpConfig {
    pub asn: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub router_id: Option<Ipv4Addr>,
    #[serde(default)]
    pub neighbors: Vec<BgpNeighbor>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingIntent {
    #[serde(default)]
    pub static_routes: Vec<StaticRoute>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bgp: Option<BgpConfig>,
}

// ── System / SNMP ───────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnmpConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub community: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Trap receivers.
    #[serde(default)]
    pub hosts: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemIntent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain_name: Option<String>,
    #[serde(default)]
    pub name_servers: Vec<String>,
    #[serde(default)]
    pub ntp_servers: Vec<String>,
    #[serde(default)]
    pub snmp: SnmpConfig,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn vlan(id: u16, name: &str) -> VlanIntent {
        VlanIntent {
            vlan_id: id,
            name: name.into(),
            description: String::new(),
        }
    }

    #[test]
    fn insert_rejects_duplicate_ids() {
        let mut set = VlanSet::new();
        set.insert(vlan(10, "Management")).unwrap();
        let err = set.insert(vlan(10, "Other")).unwrap_err();
        assert!(matches!(err, CoreError::InvalidConfiguration { .. }));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn add_next_uses_max_plus_one() {
        let mut set = VlanSet::new();
        assert_eq!(set.add_next(), Some(1));

        let mut set: VlanSet = [vlan(10, "a"), vlan(30, "b"), vlan(20, "c")]
            .into_iter()
            .collect();
        assert_eq!(set.add_next(), Some(31));
        assert_eq!(set.len(), 4);
    }

    #[test]
    fn add_next_stops_at_max_vlan() {
        let mut set: VlanSet = std::iter::once(vlan(4094, "top")).collect();
        assert_eq!(set.add_next(), None);
    }

    #[test]
    fn update_and_remove() {
        let mut set: VlanSet = std::iter::once(vlan(20, "Production")).collect();
        assert!(set.update(20, "Prod", "Production servers"));
        assert!(!set.update(99, "x", "y"));
        assert_eq!(set.get(20).unwrap().name, "Prod");

        assert_eq!(set.remove(20).unwrap().vlan_id, 20);
        assert!(set.is_empty());
    }

    #[test]
    fn intent_documents_are_tagged_by_kind() {
        let doc = r#"{ "kind": "interface", "interface_name": "Ethernet1", "vlan_id": 20 }"#;
        let intent: ConfigIntent = serde_json::from_str(doc).unwrap();
        match intent {
            ConfigIntent::Interface(i) => {
                assert_eq!(i.port_mode, PortMode::Access);
                assert_eq!(i.admin_state, AdminState::Up);
                assert_eq!(i.vlan_id, Some(20));
            }
            other => panic!("unexpected intent: {other:?}"),
        }
    }

    #[test]
    fn yaml_documents_parse_the_same_way() {
        let doc = "
kind: vlan
vlans:
  - vlan_id: 10
    name: Management
  - vlan_id: 20
    name: Production
    description: Production servers
";
        let intent: ConfigIntent = serde_yaml::from_str(doc).unwrap();
        let ConfigIntent::Vlan(set) = intent else {
            panic!("expected a vlan intent");
        };
        assert_eq!(set.len(), 2);
        assert_eq!(set.get(20).unwrap().description, "Production servers");
        assert_eq!(set.get(10).unwrap().description, "");
    }

    #[test]
    fn vxlan_defaults_to_loopback1() {
        let intent: VxlanIntent = serde_json::from_str("{}").unwrap();
        assert_eq!(intent.source_interface, "Loopback1");
        assert_eq!(intent, VxlanIntent::default());
    }
}
