//! Access/refresh token persistence.
//!
//! SYSTEM CONTEXT
//! ==============
//! Shared by the HTTP client (reads the access token for every request,
//! rewrites it after a refresh) and the session manager (writes both on
//! login, clears both on logout or eviction). Writes never overlap in
//! practice, so last-write-wins is sufficient.

#[cfg(test)]
#[path = "token_store_test.rs"]
mod token_store_test;

use std::fmt;
use std::rc::Rc;

use crate::storage::{MemoryStorage, StorageBackend};

pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub const ALL: [Self; 2] = [Self::Access, Self::Refresh];

    /// Storage key under which this token is persisted.
    pub fn key(self) -> &'static str {
        match self {
            Self::Access => ACCESS_TOKEN_KEY,
            Self::Refresh => REFRESH_TOKEN_KEY,
        }
    }
}

/// Cheaply clonable handle over a shared storage backend.
#[derive(Clone)]
pub struct TokenStore {
    backend: Rc<dyn StorageBackend>,
}

impl TokenStore {
    pub fn new(backend: impl StorageBackend + 'static) -> Self {
        Self { backend: Rc::new(backend) }
    }

    /// Store backed by process memory only.
    pub fn in_memory() -> Self {
        Self::new(MemoryStorage::new())
    }

    pub fn get(&self, kind: TokenKind) -> Option<String> {
        self.backend.get(kind.key()).filter(|token| !token.is_empty())
    }

    pub fn set(&self, kind: TokenKind, value: &str) {
        self.backend.set(kind.key(), value);
    }

    pub fn clear(&self, kind: TokenKind) {
        self.backend.remove(kind.key());
    }

    pub fn clear_all(&self) {
        for kind in TokenKind::ALL {
            self.clear(kind);
        }
    }
}

impl fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenStore")
            .field("access", &self.get(TokenKind::Access).map(|_| "<redacted>"))
            .field("refresh", &self.get(TokenKind::Refresh).map(|_| "<redacted>"))
            .finish()
    }
}
