//! Preset storage: named settings documents with numeric ids.

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::params::SynthSettings;

pub mod memory;
#[cfg(feature = "service")]
pub mod sqlite;

pub use memory::MemoryStore;
#[cfg(feature = "service")]
pub use sqlite::SqliteStore;

/// A stored preset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresetRecord {
    pub id: i64,
    pub name: String,
    pub settings: SynthSettings,
}

/// A preset about to be stored (no id yet).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPreset {
    pub name: String,
    pub settings: SynthSettings,
}

/// Storage backend for presets.
///
/// Ids start at 1 and are never reused within a store's lifetime, so
/// clients can hold them as stable handles across deletes. `delete` is
/// idempotent: removing an absent id succeeds. Settings are stored as
/// given; bounds are enforced by the engine, not the store.
pub trait PresetStore {
    fn create(&mut self, preset: NewPreset) -> Result<PresetRecord, StoreError>;

    /// All presets in ascending id order.
    fn list(&self) -> Result<Vec<PresetRecord>, StoreError>;

    fn get(&self, id: i64) -> Result<Option<PresetRecord>, StoreError>;

    fn delete(&mut self, id: i64) -> Result<(), StoreError>;
}

pub(crate) fn validate_name(name: &str) -> Result<(), StoreError> {
    if name.trim().is_empty() {
        return Err(StoreError::InvalidRecord(
            "preset name must not be empty".into(),
        ));
    }
    Ok(())
}
