use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use super::{KeyValueStore, StoreError, StoreResult};

/// In-process backend, optionally bounded like browser local storage.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<BTreeMap<String, String>>,
    quota_bytes: Option<usize>,
    unavailable: Cell<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects writes that would push the total key+value size past `bytes`.
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            quota_bytes: Some(bytes),
            ..Self::default()
        }
    }

    /// Simulates storage being switched off (e.g. a private browsing window).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.set(unavailable);
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    fn ensure_available(&self) -> StoreResult<()> {
        if self.unavailable.get() {
            return Err(StoreError::Unavailable);
        }
        Ok(())
    }

    fn size_with(&self, key: &str, value: &str) -> usize {
        let entries = self.entries.borrow();
        let others: usize = entries
            .iter()
            .filter(|(existing, _)| existing.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum();
        others + key.len() + value.len()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.ensure_available()?;
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.ensure_available()?;
        if let Some(quota) = self.quota_bytes {
            if self.size_with(key, value) > quota {
                return Err(StoreError::QuotaExceeded {
                    key: key.to_string(),
                });
            }
        }
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.ensure_available()?;
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quota_counts_replaced_values_once() {
        let store = MemoryStore::with_quota(20);
        store.set("theme-mode", "dark").unwrap();
        store.set("theme-mode", "light").unwrap();
        assert_eq!(store.len(), 1);

        let err = store.set("theme-color", "#2563eb").unwrap_err();
        assert!(matches!(err, StoreError::QuotaExceeded { key } if key == "theme-color"));
        assert_eq!(store.get("theme-mode").unwrap().as_deref(), Some("light"));
    }

    #[test]
    fn unavailable_store_fails_every_operation() {
        let store = MemoryStore::new();
        store.set("k", "v").unwrap();
        store.set_unavailable(true);
        assert!(matches!(store.get("k"), Err(StoreError::Unavailable)));
        assert!(matches!(store.set("k", "w"), Err(StoreError::Unavailable)));
        assert!(matches!(store.remove("k"), Err(StoreError::Unavailable)));

        store.set_unavailable(false);
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
    }
}
