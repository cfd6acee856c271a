//! SQLite-backed preset store.

use std::path::Path;

use rusqlite::{params, Connection};

use crate::error::StoreError;
use crate::params::SynthSettings;

use super::{validate_name, NewPreset, PresetRecord, PresetStore};

const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS synth_presets (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    settings TEXT NOT NULL
);
";

/// Durable preset store backed by a SQLite database.
///
/// AUTOINCREMENT keeps row ids monotonic across deletes, matching the
/// id contract of the in-memory store. Settings travel as the same JSON
/// document the engine and the HTTP API speak.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) a store at `path`. Uses WAL mode so readers
    /// never block the writer.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Self::from_connection(conn)
    }

    /// Open a throwaway in-memory store.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(SqliteStore { conn })
    }
}

impl PresetStore for SqliteStore {
    fn create(&mut self, preset: NewPreset) -> Result<PresetRecord, StoreError> {
        validate_name(&preset.name)?;
        let settings_json = serde_json::to_string(&preset.settings)?;
        self.conn.execute(
            "INSERT INTO synth_presets (name, settings) VALUES (?1, ?2)",
            params![preset.name, settings_json],
        )?;
        Ok(PresetRecord {
            id: self.conn.last_insert_rowid(),
            name: preset.name,
            settings: preset.settings,
        })
    }

    fn list(&self) -> Result<Vec<PresetRecord>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, settings FROM synth_presets ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (id, name, settings_json) = row?;
            let settings: SynthSettings = serde_json::from_str(&settings_json)?;
            records.push(PresetRecord { id, name, settings });
        }
        Ok(records)
    }

    fn get(&self, id: i64) -> Result<Option<PresetRecord>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT name, settings FROM synth_presets WHERE id = ?1")?;
        let mut rows = stmt.query_map(params![id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        match rows.next() {
            Some(row) => {
                let (name, settings_json) = row?;
                let settings: SynthSettings = serde_json::from_str(&settings_json)?;
                Ok(Some(PresetRecord { id, name, settings }))
            }
            None => Ok(None),
        }
    }

    fn delete(&mut self, id: i64) -> Result<(), StoreError> {
        self.conn
            .execute("DELETE FROM synth_presets WHERE id = ?1", params![id])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::oscillator::Waveform;

    fn preset(name: &str) -> NewPreset {
        NewPreset {
            name: name.to_string(),
            settings: SynthSettings::default(),
        }
    }

    #[test]
    fn in_memory_lifecycle() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        assert!(store.list().unwrap().is_empty());

        let a = store.create(preset("init")).unwrap();
        assert_eq!(a.id, 1);

        let fetched = store.get(a.id).unwrap().unwrap();
        assert_eq!(fetched, a);

        store.delete(a.id).unwrap();
        assert_eq!(store.get(a.id).unwrap(), None);
        store.delete(a.id).unwrap(); // idempotent
    }

    #[test]
    fn ids_survive_deletes() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let a = store.create(preset("one")).unwrap();
        let b = store.create(preset("two")).unwrap();
        store.delete(a.id).unwrap();
        store.delete(b.id).unwrap();

        let c = store.create(preset("three")).unwrap();
        assert_eq!(c.id, 3, "AUTOINCREMENT must not recycle ids");
    }

    #[test]
    fn custom_settings_roundtrip() {
        let mut settings = SynthSettings::default();
        settings.oscillator.waveform = Waveform::Square;
        settings.oscillator.detune = -35.0;
        settings.filter.cutoff_frequency = 4200.0;
        settings.effects.reverb.room_size = 0.8;

        let mut store = SqliteStore::open_in_memory().unwrap();
        let created = store
            .create(NewPreset {
                name: "gritty bass".into(),
                settings: settings.clone(),
            })
            .unwrap();

        let fetched = store.get(created.id).unwrap().unwrap();
        assert_eq!(fetched.settings, settings);
        assert_eq!(fetched.name, "gritty bass");
    }

    #[test]
    fn reopen_preserves_rows_and_id_counter() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("presets.db");

        {
            let mut store = SqliteStore::open(&path).unwrap();
            store.create(preset("keeper")).unwrap();
        }

        let mut store = SqliteStore::open(&path).unwrap();
        let listed = store.list().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "keeper");

        let next = store.create(preset("later")).unwrap();
        assert_eq!(next.id, 2);
    }

    #[test]
    fn empty_name_is_rejected() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let err = store.create(preset("")).unwrap_err();
        assert!(matches!(err, StoreError::InvalidRecord(_)));
        assert!(store.list().unwrap().is_empty());
    }
}
