//! Key-value persistence backends for session credentials.
//!
//! SYSTEM CONTEXT
//! ==============
//! The token store only needs string get/set/remove. Each host supplies the
//! backend it can persist with: browser `localStorage`, a JSON file for the
//! CLI, or plain memory for tests and storage-less environments.
//!
//! TRADE-OFFS
//! ==========
//! Operations are infallible at this seam. Backends that can fail (browser
//! quota, unwritable file) log and keep an in-memory copy, losing persistence
//! but never the running session.

#[cfg(feature = "web")]
mod browser;
#[cfg(feature = "native")]
mod file;
mod memory;

#[cfg(feature = "web")]
pub use browser::BrowserStorage;
#[cfg(feature = "native")]
pub use file::FileStorage;
pub use memory::MemoryStorage;

/// String key-value storage shared by the HTTP client and session manager.
pub trait StorageBackend {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}
