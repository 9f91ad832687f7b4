//! In-memory store for testing

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::{AppData, Store, StoreResult};

/// Store that keeps the document in memory. Used by unit and integration
/// tests to observe what the engine persists and when.
pub struct MemoryStore {
    data: Mutex<Option<AppData>>,
    saves: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            data: Mutex::new(None),
            saves: AtomicUsize::new(0),
        }
    }

    pub fn with_data(data: AppData) -> Self {
        Self {
            data: Mutex::new(Some(data)),
            saves: AtomicUsize::new(0),
        }
    }

    /// Number of times `save` has been called.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// The most recently saved document, if any.
    pub fn saved(&self) -> Option<AppData> {
        self.data.lock().unwrap().clone()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Store for MemoryStore {
    fn load(&self) -> AppData {
        self.data.lock().unwrap().clone().unwrap_or_default()
    }

    fn save(&self, data: &AppData) -> StoreResult<()> {
        *self.data.lock().unwrap() = Some(data.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn is_healthy(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Rule;

    #[test]
    fn empty_store_loads_default() {
        let store = MemoryStore::new();
        assert!(store.load().rules.is_empty());
        assert_eq!(store.save_count(), 0);
    }

    #[test]
    fn save_is_observable() {
        let store = MemoryStore::new();
        let mut data = AppData::default();
        data.rules.push(Rule::new("game", 60, 10));

        store.save(&data).unwrap();
        assert_eq!(store.save_count(), 1);
        assert_eq!(store.load(), data);
        assert_eq!(store.saved().unwrap().rules.len(), 1);
    }
}
