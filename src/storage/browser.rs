//! `window.localStorage` backend.
//!
//! Private browsing modes and sandboxed iframes can deny storage access; in
//! that case every operation falls through to an in-memory map so the tab
//! still works until it is closed. The map only ever holds values that
//! `localStorage` could not take, so a key removed by another tab reads as
//! absent here too.

#[cfg(test)]
#[path = "browser_test.rs"]
mod browser_test;

use std::cell::Cell;

use super::{MemoryStorage, StorageBackend};

/// The slice of the Web Storage API this backend uses.
trait StorageArea {
    fn read(&self, key: &str) -> Option<String>;
    /// False when the browser rejected the write (quota, policy).
    fn write(&self, key: &str, value: &str) -> bool;
    fn delete(&self, key: &str);
}

impl StorageArea for web_sys::Storage {
    fn read(&self, key: &str) -> Option<String> {
        self.get_item(key).ok().flatten()
    }

    fn write(&self, key: &str, value: &str) -> bool {
        self.set_item(key, value).is_ok()
    }

    fn delete(&self, key: &str) {
        let _ = self.remove_item(key);
    }
}

#[derive(Debug, Default)]
pub struct BrowserStorage {
    fallback: MemoryStorage,
    degraded: Cell<bool>,
}

impl BrowserStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn local_storage(&self) -> Option<web_sys::Storage> {
        let storage = web_sys::window().and_then(|w| w.local_storage().ok().flatten());
        if storage.is_none() && !self.degraded.replace(true) {
            tracing::warn!("localStorage unavailable; session will not survive reload");
        }
        storage
    }

    fn get_in(&self, area: Option<&impl StorageArea>, key: &str) -> Option<String> {
        area.and_then(|area| area.read(key)).or_else(|| self.fallback.get(key))
    }

    fn set_in(&self, area: Option<&impl StorageArea>, key: &str, value: &str) {
        match area {
            Some(area) if area.write(key, value) => self.fallback.remove(key),
            Some(area) => {
                tracing::warn!(%key, "localStorage write rejected; keeping value in memory");
                area.delete(key);
                self.fallback.set(key, value);
            }
            None => self.fallback.set(key, value),
        }
    }

    fn remove_in(&self, area: Option<&impl StorageArea>, key: &str) {
        self.fallback.remove(key);
        if let Some(area) = area {
            area.delete(key);
        }
    }
}

impl StorageBackend for BrowserStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.get_in(self.local_storage().as_ref(), key)
    }

    fn set(&self, key: &str, value: &str) {
        self.set_in(self.local_storage().as_ref(), key, value);
    }

    fn remove(&self, key: &str) {
        self.remove_in(self.local_storage().as_ref(), key);
    }
}
