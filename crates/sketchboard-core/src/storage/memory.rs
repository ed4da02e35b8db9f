//! In-memory storage implementation.

use super::{KeyValueStore, StorageError, StorageResult};
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory store for testing and ephemeral use.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
    /// When set, every write fails (exercises best-effort persistence).
    read_only: bool,
}

impl MemoryStore {
    /// Create a new empty memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose writes always fail, like a full or disabled quota.
    pub fn read_only() -> Self {
        Self {
            read_only: true,
            ..Self::default()
        }
    }

    /// Create a store pre-populated with entries.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: RwLock::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
            read_only: false,
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let entries = self.entries.read().map_err(|e| {
            StorageError::Other(format!("Lock error: {}", e))
        })?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        if self.read_only {
            return Err(StorageError::Io(format!("Store is read-only, cannot write {key}")));
        }
        let mut entries = self.entries.write().map_err(|e| {
            StorageError::Other(format!("Lock error: {}", e))
        })?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let store = MemoryStore::new();
        store.set("undoStack", "[]").unwrap();
        assert_eq!(store.get("undoStack").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_missing_key() {
        let store = MemoryStore::new();
        assert_eq!(store.get("nonexistent").unwrap(), None);
    }

    #[test]
    fn test_with_entries() {
        let store = MemoryStore::with_entries([("undoStack", "x"), ("redoStack", "y")]);
        assert_eq!(store.get("undoStack").unwrap().as_deref(), Some("x"));
        assert_eq!(store.get("redoStack").unwrap().as_deref(), Some("y"));
    }

    #[test]
    fn test_read_only_rejects_writes() {
        let store = MemoryStore::read_only();
        assert!(matches!(store.set("a", "1"), Err(StorageError::Io(_))));
        assert_eq!(store.get("a").unwrap(), None);
    }
}
