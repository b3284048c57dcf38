use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Per-code async locks. Entries live only while someone holds or waits on
/// them.
#[derive(Debug, Default)]
pub struct CodeLocks {
    inner: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl CodeLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn map(&self) -> MutexGuard<'_, HashMap<String, Arc<AsyncMutex<()>>>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub async fn lock(&self, code: &str) -> CodeGuard<'_> {
        let mutex = Arc::clone(self.map().entry(code.to_string()).or_default());
        let guard = mutex.lock_owned().await;
        CodeGuard {
            locks: self,
            code: code.to_string(),
            guard: Some(guard),
        }
    }

    /// Number of codes currently locked or waited on.
    pub fn len(&self) -> usize {
        self.map().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub struct CodeGuard<'a> {
    locks: &'a CodeLocks,
    code: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for CodeGuard<'_> {
    fn drop(&mut self) {
        let mut map = self.locks.map();
        self.guard.take();
        // Waiters clone the Arc under the map lock, so a count of one means
        // nobody else is interested in this code.
        if map.get(&self.code).is_some_and(|m| Arc::strong_count(m) == 1) {
            map.remove(&self.code);
        }
    }
}
