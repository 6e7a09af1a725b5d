//! Single-flight request gating
//!
//! At most one generation, verification or translation runs per key. Other
//! callers for the same key wait on the key's async mutex and re-check the
//! cache once they get through. Distinct keys never contend. A key's lock is
//! dropped from the map once its last holder and waiter are gone.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GateKey {
    Generate(String),
    Verify(String),
    Translate(String, String),
}

impl fmt::Display for GateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Generate(path) => write!(f, "generate:{}", path),
            Self::Verify(path) => write!(f, "verify:{}", path),
            Self::Translate(path, language) => write!(f, "translate:{}:{}", path, language),
        }
    }
}

/// Held for the lifetime of one in-flight request
pub struct GateGuard<'a> {
    key: GateKey,
    locks: &'a DashMap<GateKey, Arc<Mutex<()>>>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for GateGuard<'_> {
    fn drop(&mut self) {
        // release first so our own clone of the lock no longer counts
        drop(self.guard.take());
        // acquire clones under the same shard lock, so a waiter always
        // holds a reference here and keeps the entry alive
        self.locks
            .remove_if(&self.key, |_, lock| Arc::strong_count(lock) == 1);
    }
}

#[derive(Default)]
pub struct RequestGate {
    locks: DashMap<GateKey, Arc<Mutex<()>>>,
}

impl RequestGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until no other request holds `key`
    pub async fn acquire(&self, key: GateKey) -> GateGuard<'_> {
        // clone the lock out so no shard lock is held across the await
        let lock = Arc::clone(self.locks.entry(key.clone()).or_default().value());
        let guard = lock.lock_owned().await;
        GateGuard {
            key,
            locks: &self.locks,
            guard: Some(guard),
        }
    }

    /// True while some request holds `key`
    pub fn is_busy(&self, key: &GateKey) -> bool {
        self.locks
            .get(key)
            .is_some_and(|lock| lock.try_lock().is_err())
    }

    /// Number of keys currently held or waited on
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
