// ── Device registry ──
//
// The registry owns device identity. The engine resolves a `DeviceId`
// through it once per operation and never keeps the result around.

use std::sync::Arc;

use dashmap::DashMap;

use crate::model::{Device, DeviceId};

/// Source of truth for known devices.
pub trait DeviceRegistry: Send + Sync {
    fn lookup(&self, id: &DeviceId) -> Option<Arc<Device>>;

    /// All devices, sorted by name.
    fn list(&self) -> Vec<Arc<Device>>;
}

/// Concurrent in-process registry backed by `DashMap`.
#[derive(Default)]
pub struct InMemoryRegistry {
    devices: DashMap<DeviceId, Arc<Device>>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a device. Returns `true` if the id was new.
    pub fn insert(&self, device: Device) -> bool {
        self.devices
            .insert(device.id.clone(), Arc::new(device))
            .is_none()
    }

    pub fn remove(&self, id: &DeviceId) -> Option<Arc<Device>> {
        self.devices.remove(id).map(|(_, d)| d)
    }

    /// Devices whose name, address or model contain `term`.
    pub fn search(&self, term: &str) -> Vec<Arc<Device>> {
        let mut found: Vec<_> = self
            .devices
            .iter()
            .filter(|r| r.value().matches(term))
            .map(|r| Arc::clone(r.value()))
            .collect();
        sort_by_name(&mut found);
        found
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

impl FromIterator<Device> for InMemoryRegistry {
    fn from_iter<I: IntoIterator<Item = Device>>(iter: I) -> Self {
        let registry = Self::new();
        for device in iter {
            registry.insert(device);
        }
        registry
    }
}

impl DeviceRegistry for InMemoryRegistry {
    fn lookup(&self, id: &DeviceId) -> Option<Arc<Device>> {
        self.devices.get(id).map(|r| Arc::clone(r.value()))
    }

    fn list(&self) -> Vec<Arc<Device>> {
        let mut all: Vec<_> = self.devices.iter().map(|r| Arc::clone(r.value())).collect();
        sort_by_name(&mut all);
        all
    }
}

fn sort_by_name(devices: &mut [Arc<Device>]) {
    devices.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn registry() -> InMemoryRegistry {
        [
            Device::new("sw2", "Leaf-Switch-01", "192.168.1.20"),
            Device::new("sw1", "Core-Switch-01", "192.168.1.10"),
            Device::new("sw3", "Border-Router", "10.0.0.1"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn lookup_by_id() {
        let reg = registry();
        assert_eq!(reg.lookup(&"sw1".into()).unwrap().name, "Core-Switch-01");
        assert!(reg.lookup(&"nope".into()).is_none());
    }

    #[test]
    fn list_is_sorted_by_name() {
        let names: Vec<_> = registry().list().iter().map(|d| d.name.clone()).collect();
        assert_eq!(names, ["Border-Router", "Core-Switch-01", "Leaf-Switch-01"]);
    }

    #[test]
    fn insert_replaces_and_remove_drops() {
        let reg = registry();
        assert!(!reg.insert(Device::new("sw1", "Core-Switch-01b", "192.168.1.11")));
        assert_eq!(reg.lookup(&"sw1".into()).unwrap().address, "192.168.1.11");

        assert!(reg.remove(&"sw1".into()).is_some());
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn search_filters_by_term() {
        let found = registry().search("switch");
        assert_eq!(found.len(), 2);
        assert_eq!(registry().search("10.0.0").len(), 1);
    }
}
