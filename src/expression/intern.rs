//! Process-wide intern tables.
//!
//! Each table hands out one shared `Arc` per distinct key. Tables never
//! evict; their size is bounded only by the number of distinct identifier
//! names and literal texts seen by the process.

use log::debug;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

pub struct Interner<T> {
    label: &'static str,
    entries: Mutex<HashMap<String, Arc<T>>>,
}

impl<T> Interner<T> {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Return the shared instance for `key`, building it with `make` on first
    /// use. The lock covers the lookup and the insert, so concurrent callers
    /// always observe a single instance.
    pub fn get_or_try_insert<E>(
        &self,
        key: &str,
        make: impl FnOnce() -> Result<T, E>,
    ) -> Result<Arc<T>, E> {
        let mut entries = self.entries.lock();
        if let Some(existing) = entries.get(key) {
            return Ok(Arc::clone(existing));
        }

        let value = Arc::new(make()?);
        entries.insert(key.to_string(), Arc::clone(&value));
        debug!("interned {} '{}' ({} entries)", self.label, key, entries.len());
        Ok(value)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.lock().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
