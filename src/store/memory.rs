//! In-memory preset store for tests and ephemeral sessions.

use std::collections::HashMap;

use crate::error::StoreError;

use super::{validate_name, NewPreset, PresetRecord, PresetStore};

/// HashMap-backed store. Ids come from a counter that only moves
/// forward, so a deleted id never comes back.
#[derive(Debug)]
pub struct MemoryStore {
    records: HashMap<i64, PresetRecord>,
    next_id: i64,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore {
            records: HashMap::new(),
            next_id: 1,
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PresetStore for MemoryStore {
    fn create(&mut self, preset: NewPreset) -> Result<PresetRecord, StoreError> {
        validate_name(&preset.name)?;
        let record = PresetRecord {
            id: self.next_id,
            name: preset.name,
            settings: preset.settings,
        };
        self.next_id += 1;
        self.records.insert(record.id, record.clone());
        Ok(record)
    }

    fn list(&self) -> Result<Vec<PresetRecord>, StoreError> {
        let mut records: Vec<PresetRecord> = self.records.values().cloned().collect();
        records.sort_by_key(|r| r.id);
        Ok(records)
    }

    fn get(&self, id: i64) -> Result<Option<PresetRecord>, StoreError> {
        Ok(self.records.get(&id).cloned())
    }

    fn delete(&mut self, id: i64) -> Result<(), StoreError> {
        self.records.remove(&id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::SynthSettings;

    fn preset(name: &str) -> NewPreset {
        NewPreset {
            name: name.to_string(),
            settings: SynthSettings::default(),
        }
    }

    #[test]
    fn create_list_delete_lifecycle() {
        let mut store = MemoryStore::new();
        assert!(store.list().unwrap().is_empty());

        let a = store.create(preset("init")).unwrap();
        let b = store.create(preset("bright lead")).unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);

        let listed = store.list().unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].name, "init");
        assert_eq!(listed[1].name, "bright lead");

        store.delete(a.id).unwrap();
        let listed = store.list().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, 2);
    }

    #[test]
    fn list_is_ordered_by_id() {
        let mut store = MemoryStore::new();
        for name in ["c", "a", "b", "z", "d"] {
            store.create(preset(name)).unwrap();
        }
        let ids: Vec<i64> = store.list().unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn ids_are_never_reused() {
        let mut store = MemoryStore::new();
        let a = store.create(preset("one")).unwrap();
        let b = store.create(preset("two")).unwrap();
        store.delete(a.id).unwrap();
        store.delete(b.id).unwrap();

        let c = store.create(preset("three")).unwrap();
        assert_eq!(c.id, 3, "Deleted ids must not come back");
    }

    #[test]
    fn delete_is_idempotent() {
        let mut store = MemoryStore::new();
        let a = store.create(preset("gone soon")).unwrap();
        store.delete(a.id).unwrap();
        store.delete(a.id).unwrap();
        store.delete(9999).unwrap();
    }

    #[test]
    fn empty_name_is_rejected() {
        let mut store = MemoryStore::new();
        let err = store.create(preset("  ")).unwrap_err();
        assert!(matches!(err, StoreError::InvalidRecord(_)));
        assert!(store.list().unwrap().is_empty(), "Nothing stored on failure");
    }

    #[test]
    fn get_missing_returns_none() {
        let store = MemoryStore::new();
        assert_eq!(store.get(5).unwrap(), None);
    }
}
