use chrono::Utc;
use common::{MachineStatus, StatusEntry, StatusMap};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// In-memory map of machine id to its latest reported status.
///
/// Cloning is cheap and every clone points at the same map. Nothing is
/// persisted; the map lives as long as the process.
#[derive(Clone, Default)]
pub struct Registry {
    entries: Arc<RwLock<HashMap<String, StatusEntry>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a report, replacing whatever was known about `machine_id`.
    /// A missing timestamp is filled with the current wall-clock time.
    pub fn set(
        &self,
        machine_id: &str,
        status: MachineStatus,
        timestamp: Option<i64>,
    ) -> StatusEntry {
        let entry = StatusEntry {
            status,
            timestamp: timestamp.unwrap_or_else(|| Utc::now().timestamp()),
        };
        self.entries
            .write()
            .insert(machine_id.to_string(), entry.clone());
        entry
    }

    pub fn get(&self, machine_id: &str) -> Option<StatusEntry> {
        self.entries.read().get(machine_id).cloned()
    }

    pub fn snapshot(&self) -> StatusMap {
        self.entries.read().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_report_replaces_earlier_one() {
        let registry = Registry::new();
        registry.set("m1", MachineStatus::Active, Some(100));
        registry.set("m1", MachineStatus::Free, Some(50));

        let entry = registry.get("m1").unwrap();
        assert_eq!(entry.status, MachineStatus::Free);
        assert_eq!(entry.timestamp, 50);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn missing_timestamp_uses_now() {
        let registry = Registry::new();
        let before = Utc::now().timestamp();
        let entry = registry.set("m1", MachineStatus::Unknown, None);
        let after = Utc::now().timestamp();

        assert!(entry.timestamp >= before && entry.timestamp <= after);
    }

    #[test]
    fn clones_share_the_same_map() {
        let registry = Registry::new();
        let handle = registry.clone();
        handle.set("dryer-1", MachineStatus::Active, Some(-5));

        assert_eq!(registry.get("dryer-1").unwrap().timestamp, -5);
        assert!(registry.get("dryer-2").is_none());
    }

    #[test]
    fn snapshot_holds_every_machine() {
        let registry = Registry::new();
        assert!(registry.is_empty());
        for i in 0..5 {
            registry.set(&format!("m{i}"), MachineStatus::Free, Some(i));
        }

        let all = registry.snapshot();
        assert_eq!(all.len(), 5);
        assert_eq!(all["m3"].timestamp, 3);
    }
}
