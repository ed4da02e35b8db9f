//! Periodic re-write of the persisted history mirror.
//!
//! History writes through on every change, but those writes are best-effort.
//! The auto-save manager re-writes the mirror of the current stacks on an
//! interval while there are changes it has not yet written. It never
//! records a new history state.

use crate::history::History;
use crate::storage::{KeyValueStore, StorageResult};
use std::sync::Arc;

#[cfg(not(target_arch = "wasm32"))]
use std::time::{Duration, Instant};

#[cfg(target_arch = "wasm32")]
use web_time::{Duration, Instant};

/// Default auto-save interval in seconds.
pub const DEFAULT_AUTOSAVE_INTERVAL_SECS: u64 = 30;

/// Manages periodic persistence of the history stacks.
pub struct AutoSaveManager<S: KeyValueStore> {
    /// Storage backend.
    storage: Arc<S>,
    /// Auto-save interval.
    interval: Duration,
    /// Last save timestamp.
    last_save: Option<Instant>,
    /// Whether history changed since the last save.
    dirty: bool,
}

impl<S: KeyValueStore> AutoSaveManager<S> {
    /// Create a new auto-save manager with the given storage backend.
    pub fn new(storage: Arc<S>) -> Self {
        Self {
            storage,
            interval: Duration::from_secs(DEFAULT_AUTOSAVE_INTERVAL_SECS),
            last_save: None,
            dirty: false,
        }
    }

    /// Set the auto-save interval.
    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    /// Get the auto-save interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Mark the history as having unsaved changes.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Check if the history has unsaved changes.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Check if enough time has passed for an auto-save.
    pub fn should_save(&self) -> bool {
        if !self.dirty {
            return false;
        }

        match self.last_save {
            Some(last) => last.elapsed() >= self.interval,
            None => true, // Never saved, should save
        }
    }

    /// Save if needed (dirty + interval elapsed).
    /// Returns true if a save was performed.
    pub fn maybe_save<H: KeyValueStore>(&mut self, history: &History<H>) -> StorageResult<bool> {
        if !self.should_save() {
            return Ok(false);
        }

        self.save(history)?;
        Ok(true)
    }

    /// Write the current stacks immediately.
    pub fn save<H: KeyValueStore>(&mut self, history: &History<H>) -> StorageResult<()> {
        history.persist_into(self.storage.as_ref())?;

        self.last_save = Some(Instant::now());
        self.dirty = false;
        log::debug!("Auto-saved {} history states", history.past_len());

        Ok(())
    }

    /// Get a reference to the storage backend.
    pub fn storage(&self) -> &Arc<S> {
        &self.storage
    }
}

/// Create a platform-appropriate storage backend.
#[cfg(not(target_arch = "wasm32"))]
pub fn create_default_store() -> StorageResult<Arc<crate::storage::FileStore>> {
    Ok(Arc::new(crate::storage::FileStore::default_location()?))
}

#[cfg(target_arch = "wasm32")]
pub fn create_default_store() -> StorageResult<Arc<crate::storage::LocalStorageStore>> {
    Ok(Arc::new(crate::storage::LocalStorageStore::new()?))
}

/// Convenience type alias for platform-specific storage.
#[cfg(not(target_arch = "wasm32"))]
pub type PlatformStore = crate::storage::FileStore;

#[cfg(target_arch = "wasm32")]
pub type PlatformStore = crate::storage::LocalStorageStore;

/// Type alias for the auto-save manager with platform-specific storage.
pub type PlatformAutoSaveManager = AutoSaveManager<PlatformStore>;

/// Convenience function to create an auto-save manager with default storage.
pub fn create_autosave_manager() -> StorageResult<PlatformAutoSaveManager> {
    let storage = create_default_store()?;
    Ok(AutoSaveManager::new(storage))
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use crate::config::BoardConfig;
    use crate::history::{LEGACY_STATE_KEY, UNDO_STACK_KEY};
    use crate::scene::Scene;
    use crate::shapes::{Rectangle, Shape};
    use crate::storage::MemoryStore;
    use kurbo::Point;

    #[test]
    fn test_autosave_manager_creation() {
        let storage = Arc::new(MemoryStore::new());
        let manager = AutoSaveManager::new(storage);

        assert!(!manager.is_dirty());
        assert!(!manager.should_save());
    }

    #[test]
    fn test_autosave_dirty_flag() {
        let storage = Arc::new(MemoryStore::new());
        let mut manager = AutoSaveManager::new(storage);

        manager.mark_dirty();
        assert!(manager.is_dirty());
        // Should save when dirty and no previous save
        assert!(manager.should_save());
    }

    #[test]
    fn test_autosave_writes_mirror_without_capturing() {
        let config = BoardConfig::default();
        // History writes fail; the auto-save store is healthy.
        let mut history = History::new(Arc::new(MemoryStore::read_only()), &config);
        let mut scene = Scene::new(&config);
        scene
            .add_drawable(Shape::Rectangle(Rectangle::new(Point::new(1.0, 1.0), 5.0, 5.0)))
            .unwrap();
        history.capture(&scene).unwrap();

        let storage = Arc::new(MemoryStore::new());
        let mut manager = AutoSaveManager::new(storage.clone());
        manager.mark_dirty();
        assert!(manager.maybe_save(&history).unwrap());
        assert!(!manager.is_dirty());
        assert_eq!(history.past_len(), 2);

        let undo: Vec<String> =
            serde_json::from_str(&storage.get(UNDO_STACK_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(undo.len(), 2);
        assert_eq!(
            storage.get(LEGACY_STATE_KEY).unwrap().as_deref(),
            Some(history.current().as_str())
        );
    }

    #[test]
    fn test_autosave_respects_interval() {
        let config = BoardConfig::default();
        let history = History::new(Arc::new(MemoryStore::new()), &config);
        let mut manager = AutoSaveManager::new(Arc::new(MemoryStore::new()));
        manager.set_interval(Duration::from_secs(3600));

        manager.mark_dirty();
        assert!(manager.maybe_save(&history).unwrap());
        manager.mark_dirty();
        assert!(!manager.maybe_save(&history).unwrap());
        assert!(manager.is_dirty());
    }
}
