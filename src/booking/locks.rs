//! Keyed mutual exclusion for the coordinator's check-then-act windows.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

/// Registry of per-key async mutexes, created lazily.
///
/// The coordinator keeps one registry keyed by place id and one keyed by
/// queue id. Two concurrent bookings for the same place serialize on the
/// same mutex, so the "slot free?" check and the appointment write happen as
/// one unit; same-queue roster writes serialize the same way. Operations on
/// different keys never contend.
#[derive(Debug, Default)]
pub struct KeyedLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for `key`, waiting if another operation on the same
    /// key holds it.
    pub async fn acquire(&self, key: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}
