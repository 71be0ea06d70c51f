//! Named mutex registry.
//!
//! Resources that rewrite a list owned by a shared parent object (for example
//! the key credentials of an application) take the lock named after the
//! parent before their read-modify-write cycle. The registry only serializes
//! callers within this process.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::trace;

/// Registry mapping a name to its mutex.
///
/// Entries are created on first use and kept for the registry's lifetime.
#[derive(Debug, Default)]
pub struct NamedLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

/// Held lock for one name. Released on drop or via [`NamedLockGuard::unlock`].
#[derive(Debug)]
pub struct NamedLockGuard {
    name: String,
    _guard: OwnedMutexGuard<()>,
}

impl NamedLockGuard {
    /// Name this guard holds.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Release the lock.
    pub fn unlock(self) {
        trace!(name = %self.name, "Releasing named lock");
    }
}

impl NamedLocks {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    async fn entry(&self, name: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        Arc::clone(locks.entry(name.to_string()).or_default())
    }

    /// Acquire the lock for `name`, waiting for the current holder if any.
    pub async fn lock(&self, name: &str) -> NamedLockGuard {
        let mutex = self.entry(name).await;
        trace!(name, "Acquiring named lock");
        let guard = mutex.lock_owned().await;
        NamedLockGuard {
            name: name.to_string(),
            _guard: guard,
        }
    }

    /// Acquire the lock for `name` only if nobody holds it.
    pub async fn try_lock(&self, name: &str) -> Option<NamedLockGuard> {
        let mutex = self.entry(name).await;
        mutex.try_lock_owned().ok().map(|guard| NamedLockGuard {
            name: name.to_string(),
            _guard: guard,
        })
    }

    /// Number of names that have been locked at least once.
    pub async fn len(&self) -> usize {
        self.locks.lock().await.len()
    }

    /// Whether no name has been locked yet.
    pub async fn is_empty(&self) -> bool {
        self.locks.lock().await.is_empty()
    }
}
