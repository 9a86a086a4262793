//! Seesaw persistence
//!
//! Layout in the key/value store:
//! - `seesawSimulation_seesaws`: JSON array of seesaw records
//! - `seesawSimulation_activeId`: id of the last active seesaw
//!
//! Every operation is best-effort: failures are logged and the in-memory
//! state stays authoritative. Reads are lenient so a damaged entry only
//! loses what is actually damaged.

pub mod record;
pub mod store;

pub use record::SeesawRecord;
#[cfg(target_arch = "wasm32")]
pub use store::LocalStorage;
pub use store::{KeyValueStore, MemoryStore, PersistenceError};

use serde_json::Value;

use crate::config::SeesawConfig;
use record::{id_after, record_id};

/// Store keys
pub mod keys {
    pub const SEESAWS: &str = "seesawSimulation_seesaws";
    pub const ACTIVE_ID: &str = "seesawSimulation_activeId";
}

/// Seesaw records on top of a key/value store
#[derive(Debug)]
pub struct Persistence<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> Persistence<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Raw stored entries; anything but a JSON array reads as empty
    fn read_entries(&self) -> Result<Vec<Value>, PersistenceError> {
        let Some(json) = self.store.get(keys::SEESAWS)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str::<Value>(&json) {
            Ok(Value::Array(entries)) => Ok(entries),
            Ok(_) => {
                log::warn!("Stored seesaws are not a list, ignoring");
                Ok(Vec::new())
            }
            Err(e) => {
                log::warn!("Stored seesaws unreadable ({e}), ignoring");
                Ok(Vec::new())
            }
        }
    }

    fn write_entries(&mut self, entries: &[Value]) -> Result<(), PersistenceError> {
        let json = serde_json::to_string(entries)?;
        self.store.set(keys::SEESAWS, &json)
    }

    /// Every readable seesaw, in stored order
    pub fn load_all(&self, config: &SeesawConfig) -> Vec<SeesawRecord> {
        let entries = match self.read_entries() {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("Loading seesaws failed: {e}");
                return Vec::new();
            }
        };

        let records: Vec<SeesawRecord> = entries
            .iter()
            .filter_map(|entry| SeesawRecord::from_value(entry, config))
            .collect();
        if records.len() != entries.len() {
            log::warn!(
                "Skipped {} stored seesaw(s) without an id",
                entries.len() - records.len()
            );
        }
        records
    }

    /// Replace the whole stored list
    pub fn save_all(&mut self, records: &[SeesawRecord]) {
        let result = records
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<Value>, _>>()
            .map_err(PersistenceError::from)
            .and_then(|entries| self.write_entries(&entries));
        if let Err(e) = result {
            log::warn!("Saving seesaws failed: {e}");
        }
    }

    fn try_save_instance(&mut self, record: &SeesawRecord) -> Result<(), PersistenceError> {
        let value = serde_json::to_value(record)?;
        let mut entries = self.read_entries()?;
        match entries
            .iter_mut()
            .find(|entry| record_id(entry) == Some(record.id))
        {
            Some(entry) => *entry = value,
            None => entries.push(value),
        }
        self.write_entries(&entries)
    }

    /// Insert or replace one seesaw, leaving the others untouched
    pub fn save_instance(&mut self, record: &SeesawRecord) {
        if let Err(e) = self.try_save_instance(record) {
            log::warn!("Saving seesaw {} failed: {e}", record.id);
        }
    }

    /// One seesaw by id
    pub fn load_instance(&self, id: u32, config: &SeesawConfig) -> Option<SeesawRecord> {
        let entries = match self.read_entries() {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("Loading seesaw {id} failed: {e}");
                return None;
            }
        };
        entries
            .iter()
            .find(|entry| record_id(entry) == Some(id))
            .and_then(|entry| SeesawRecord::from_value(entry, config))
    }

    fn try_delete_instance(&mut self, id: u32) -> Result<(), PersistenceError> {
        let mut entries = self.read_entries()?;
        let before = entries.len();
        entries.retain(|entry| record_id(entry) != Some(id));
        if entries.len() != before {
            self.write_entries(&entries)?;
        }
        Ok(())
    }

    /// Remove one seesaw; deleting a missing id is a no-op
    pub fn delete_instance(&mut self, id: u32) {
        if let Err(e) = self.try_delete_instance(id) {
            log::warn!("Deleting seesaw {id} failed: {e}");
        }
    }

    /// Last active id, `0` when none was stored
    pub fn active_id(&self) -> u32 {
        match self.store.get(keys::ACTIVE_ID) {
            Ok(Some(raw)) => raw.trim().parse().unwrap_or_else(|_| {
                log::warn!("Stored active id {raw:?} unreadable, using 0");
                0
            }),
            Ok(None) => 0,
            Err(e) => {
                log::warn!("Reading active id failed: {e}");
                0
            }
        }
    }

    pub fn set_active_id(&mut self, id: u32) {
        if let Err(e) = self.store.set(keys::ACTIVE_ID, &id.to_string()) {
            log::warn!("Saving active id failed: {e}");
        }
    }

    /// Forget every seesaw and the active id
    pub fn clear_all(&mut self) {
        for key in [keys::SEESAWS, keys::ACTIVE_ID] {
            if let Err(e) = self.store.remove(key) {
                log::warn!("Clearing {key} failed: {e}");
            }
        }
    }

    /// One past the largest stored id, `0` when nothing is stored
    ///
    /// `None` once the id space is used up.
    pub fn next_id(&self) -> Option<u32> {
        match self
            .read_entries()
            .unwrap_or_default()
            .iter()
            .filter_map(record_id)
            .max()
        {
            Some(id) => id_after(id),
            None => Some(0),
        }
    }
}
