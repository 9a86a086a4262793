//! Multi-seesaw coordinator
//!
//! Owns every seesaw, keeps at most one active, and is the only place that
//! talks to persistence. Hosts feed it pointer input and one `tick()` per
//! frame, then drain `SimEvent`s for audio.

use crate::config::SeesawConfig;
use crate::persistence::record::id_after;
use crate::persistence::{KeyValueStore, Persistence};
use crate::sim::{self, PointerInput, SceneView, Seesaw, SimEvent, Stats};

/// Rejected coordinator operation; nothing was changed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ManagerError {
    #[error("at most {max} seesaws are allowed")]
    TooManySeesaws { max: usize },
    #[error("the last seesaw cannot be removed")]
    LastSeesaw,
    #[error("no seesaw with id {0}")]
    NotFound(u32),
    #[error("no seesaw ids left")]
    IdsExhausted,
}

/// Derive a per-seesaw RNG seed so instances roll independent weights
fn instance_seed(seed: u64, id: u32) -> u64 {
    seed ^ u64::from(id).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

pub struct SeesawManager<S: KeyValueStore> {
    config: SeesawConfig,
    persistence: Persistence<S>,
    seesaws: Vec<Seesaw>,
    active_id: Option<u32>,
    seed: u64,
    events: Vec<SimEvent>,
}

impl<S: KeyValueStore> SeesawManager<S> {
    /// Restore every stored seesaw and activate the last active one
    ///
    /// With nothing stored, a single fresh seesaw is created.
    pub fn new(store: S, config: SeesawConfig, seed: u64) -> Self {
        let mut manager = Self {
            config,
            persistence: Persistence::new(store),
            seesaws: Vec::new(),
            active_id: None,
            seed,
            events: Vec::new(),
        };
        manager.restore();
        manager
    }

    fn restore(&mut self) {
        let records = self.persistence.load_all(&self.config);
        for record in records {
            if self.seesaws.len() >= self.config.max_instances {
                log::warn!("Ignoring stored seesaw {} beyond the limit", record.id);
                continue;
            }
            if self.index_of(record.id).is_some() {
                log::warn!("Ignoring duplicate stored seesaw {}", record.id);
                continue;
            }
            let mut seesaw = Seesaw::new(record.id, &self.config, instance_seed(self.seed, record.id));
            seesaw.load_record(record, &self.config);
            self.seesaws.push(seesaw);
        }

        let restored = self.seesaws.len();
        if restored == 0 {
            let id = self.persistence.next_id().unwrap_or(0);
            let seesaw = Seesaw::new(id, &self.config, instance_seed(self.seed, id));
            self.persistence.save_instance(&seesaw.to_record());
            self.seesaws.push(seesaw);
            log::info!("Created seesaw {id}");
        }

        let stored_active = self.persistence.active_id();
        let index = self.index_of(stored_active).unwrap_or_else(|| {
            if restored > 0 {
                log::warn!("Stored active seesaw {stored_active} not found, using the first");
            }
            0
        });
        let seesaw = &mut self.seesaws[index];
        seesaw.activate();
        if restored > 0 {
            seesaw.log.push(format!("Restored {restored} seesaw(s)"));
            log::info!("Restored {restored} seesaw(s)");
        }
        let id = seesaw.id;
        self.active_id = Some(id);
        self.persistence.set_active_id(id);
    }

    fn index_of(&self, id: u32) -> Option<usize> {
        self.seesaws.iter().position(|s| s.id == id)
    }

    fn active_index(&self) -> Option<usize> {
        self.active_id.and_then(|id| self.index_of(id))
    }

    /// Persist and queue whatever a seesaw produced since the last flush
    fn flush(&mut self, index: usize) {
        let events = self.seesaws[index].take_events();
        if events.is_empty() {
            return;
        }
        self.persistence.save_instance(&self.seesaws[index].to_record());
        self.events.extend(events);
    }

    /// `None` once the id space is used up
    fn next_free_id(&self) -> Option<u32> {
        let in_memory = match self.seesaws.iter().map(|s| s.id).max() {
            Some(id) => id_after(id)?,
            None => 0,
        };
        Some(in_memory.max(self.persistence.next_id()?))
    }

    /// Create a new seesaw and switch to it
    pub fn add_seesaw(&mut self) -> Result<u32, ManagerError> {
        let max = self.config.max_instances;
        if self.seesaws.len() >= max {
            log::warn!("Seesaw limit of {max} reached");
            return Err(ManagerError::TooManySeesaws { max });
        }

        let Some(id) = self.next_free_id() else {
            log::warn!("Seesaw ids exhausted");
            return Err(ManagerError::IdsExhausted);
        };
        let seesaw = Seesaw::new(id, &self.config, instance_seed(self.seed, id));
        self.persistence.save_instance(&seesaw.to_record());
        self.seesaws.push(seesaw);
        log::info!("Added seesaw {id}");

        self.switch_to(id)?;
        Ok(id)
    }

    /// Delete a seesaw and its stored state
    ///
    /// Removing the active seesaw switches to the first remaining one.
    pub fn remove_seesaw(&mut self, id: u32) -> Result<(), ManagerError> {
        let index = self.index_of(id).ok_or(ManagerError::NotFound(id))?;
        if self.seesaws.len() <= 1 {
            log::warn!("Refusing to remove the last seesaw");
            return Err(ManagerError::LastSeesaw);
        }

        let mut seesaw = self.seesaws.remove(index);
        seesaw.deactivate(&self.config);
        self.persistence.delete_instance(id);
        log::info!("Removed seesaw {id}");

        if self.active_id == Some(id) {
            self.active_id = None;
            let next = self.seesaws[0].id;
            self.switch_to(next)?;
        }
        Ok(())
    }

    /// Make `id` the active seesaw, reloading it from storage
    ///
    /// Switching to the already active seesaw does nothing.
    pub fn switch_to(&mut self, id: u32) -> Result<(), ManagerError> {
        let target = self.index_of(id).ok_or(ManagerError::NotFound(id))?;
        if self.active_id == Some(id) {
            return Ok(());
        }

        if let Some(current) = self.active_index() {
            self.seesaws[current].deactivate(&self.config);
            // Force-landed objects land silently
            self.seesaws[current].take_events();
            self.persistence
                .save_instance(&self.seesaws[current].to_record());
        }

        if let Some(record) = self.persistence.load_instance(id, &self.config) {
            self.seesaws[target].load_record(record, &self.config);
        }
        self.seesaws[target].activate();
        self.active_id = Some(id);
        self.persistence.set_active_id(id);
        log::info!("Switched to seesaw {id}");
        Ok(())
    }

    /// Set a display name; blank names fall back to the default
    pub fn rename_seesaw(&mut self, id: u32, name: &str) -> Result<(), ManagerError> {
        let index = self.index_of(id).ok_or(ManagerError::NotFound(id))?;
        let name = name.trim();
        let seesaw = &mut self.seesaws[index];
        seesaw.name = if name.is_empty() {
            Seesaw::default_name(id)
        } else {
            name.to_string()
        };
        self.persistence.save_instance(&seesaw.to_record());
        Ok(())
    }

    /// Advance the active seesaw by one frame
    pub fn tick(&mut self) {
        if let Some(index) = self.active_index() {
            sim::tick(&mut self.seesaws[index], &self.config);
            self.flush(index);
        }
    }

    fn pointer(&mut self, input: PointerInput) {
        if let Some(index) = self.active_index() {
            sim::handle_pointer(&mut self.seesaws[index], input, &self.config);
            self.flush(index);
        }
    }

    /// Pointer moved, relative to the scene center
    pub fn on_pointer_move(&mut self, x: f64, y: f64) {
        self.pointer(PointerInput::Move { x, y });
    }

    /// Pointer clicked, relative to the scene center
    pub fn on_click(&mut self, x: f64, y: f64) {
        self.pointer(PointerInput::Click { x, y });
    }

    pub fn on_pointer_leave(&mut self) {
        self.pointer(PointerInput::Leave);
    }

    /// Clear the active seesaw
    pub fn reset_active(&mut self) {
        if let Some(index) = self.active_index() {
            self.seesaws[index].reset(&self.config);
            self.flush(index);
        }
    }

    /// Resize the active plank; returns the width actually applied
    pub fn set_plank_width(&mut self, width: f64) -> Option<f64> {
        let index = self.active_index()?;
        let applied = sim::set_plank_width(&mut self.seesaws[index], width, &self.config);
        self.flush(index);
        Some(applied)
    }

    /// Side effects since the last call, oldest first
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn config(&self) -> &SeesawConfig {
        &self.config
    }

    pub fn persistence(&self) -> &Persistence<S> {
        &self.persistence
    }

    pub fn seesaws(&self) -> &[Seesaw] {
        &self.seesaws
    }

    pub fn get(&self, id: u32) -> Option<&Seesaw> {
        self.seesaws.iter().find(|s| s.id == id)
    }

    pub fn active_id(&self) -> Option<u32> {
        self.active_id
    }

    pub fn active(&self) -> Option<&Seesaw> {
        self.active_index().map(|index| &self.seesaws[index])
    }

    /// Frame for the active seesaw
    pub fn view(&self) -> Option<SceneView> {
        self.active().map(|s| sim::scene(s, &self.config))
    }

    pub fn stats(&self) -> Option<Stats> {
        self.active().map(sim::stats)
    }

    /// Whether another seesaw can be added
    pub fn can_add(&self) -> bool {
        self.seesaws.len() < self.config.max_instances
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    fn manager() -> SeesawManager<MemoryStore> {
        SeesawManager::new(MemoryStore::new(), SeesawConfig::default(), 42)
    }

    #[test]
    fn test_fresh_store_creates_one_active_seesaw() {
        let manager = manager();
        assert_eq!(manager.seesaws().len(), 1);
        assert_eq!(manager.active_id(), Some(0));
        assert!(manager.active().is_some_and(Seesaw::is_active));
        assert_eq!(manager.persistence().load_all(manager.config()).len(), 1);
        assert_eq!(manager.persistence().active_id(), 0);
        // Nothing was restored, so nothing to report
        assert!(manager.active().is_some_and(|s| s.log.is_empty()));
    }

    #[test]
    fn test_instance_seeds_differ() {
        assert_ne!(instance_seed(42, 0), instance_seed(42, 1));
        assert_eq!(instance_seed(42, 0), 42);
    }

    #[test]
    fn test_remove_unknown_id() {
        let mut manager = manager();
        manager.add_seesaw().unwrap();
        assert_eq!(manager.remove_seesaw(9), Err(ManagerError::NotFound(9)));
        assert_eq!(manager.seesaws().len(), 2);
    }

    #[test]
    fn test_switch_to_active_is_noop() {
        let mut manager = manager();
        manager.on_click(100.0, 0.0);
        manager.drain_events();
        manager.switch_to(0).unwrap();
        // Still falling: a real switch would have force-landed it
        assert!(manager.active().is_some_and(|s| s.objects[0].is_falling()));
        assert!(manager.drain_events().is_empty());
    }

    #[test]
    fn test_rename_and_blank_name() {
        let mut manager = manager();
        manager.rename_seesaw(0, "  Park  ").unwrap();
        assert_eq!(manager.get(0).map(|s| s.name.as_str()), Some("Park"));
        manager.rename_seesaw(0, "   ").unwrap();
        assert_eq!(manager.get(0).map(|s| s.name.as_str()), Some("Seesaw 1"));
        assert_eq!(
            manager.rename_seesaw(3, "x"),
            Err(ManagerError::NotFound(3))
        );
    }
}
