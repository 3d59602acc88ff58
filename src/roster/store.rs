//! Roster storage: one record per queue, embedding places and clients.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{BookingError, Result};
use crate::roster::types::Queue;

/// Storage backend for queue rosters, keyed by queue id.
#[async_trait]
pub trait RosterStore: Send + Sync {
    /// Create a queue. Fails with `Conflict` when the name is taken.
    async fn create_queue(&self, name: &str) -> Result<Queue>;

    /// Get a queue by id.
    async fn get(&self, queue_id: &str) -> Result<Option<Queue>>;

    /// Replace an existing queue. Fails with `NotFound` if absent.
    async fn update(&self, queue: Queue) -> Result<Queue>;

    /// Delete a queue. Returns false when no queue existed.
    async fn delete(&self, queue_id: &str) -> Result<bool>;

    /// All queues.
    async fn list(&self) -> Result<Vec<Queue>>;

    /// The queue containing a client entry for `client_id`, if any.
    async fn find_queue_with_client(&self, client_id: &str) -> Result<Option<Queue>>;
}

/// In-memory roster store.
#[derive(Debug, Default)]
pub struct MemoryRosterStore {
    queues: RwLock<HashMap<String, Queue>>,
}

impl MemoryRosterStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RosterStore for MemoryRosterStore {
    async fn create_queue(&self, name: &str) -> Result<Queue> {
        let mut queues = self.queues.write().await;
        if queues.values().any(|q| q.name == name) {
            return Err(
                BookingError::Conflict(format!("queue with name {name:?} already exists")).into(),
            );
        }
        let queue = Queue::new(name);
        debug!("Created queue {:?} ({})", queue.name, queue.id);
        queues.insert(queue.id.clone(), queue.clone());
        Ok(queue)
    }

    async fn get(&self, queue_id: &str) -> Result<Option<Queue>> {
        let queues = self.queues.read().await;
        Ok(queues.get(queue_id).cloned())
    }

    async fn update(&self, queue: Queue) -> Result<Queue> {
        let mut queues = self.queues.write().await;
        if !queues.contains_key(&queue.id) {
            return Err(BookingError::NotFound(format!("queue {} not found", queue.id)).into());
        }
        queues.insert(queue.id.clone(), queue.clone());
        Ok(queue)
    }

    async fn delete(&self, queue_id: &str) -> Result<bool> {
        let mut queues = self.queues.write().await;
        let removed = queues.remove(queue_id).is_some();
        if removed {
            debug!("Deleted queue {queue_id}");
        }
        Ok(removed)
    }

    async fn list(&self) -> Result<Vec<Queue>> {
        let queues = self.queues.read().await;
        Ok(queues.values().cloned().collect())
    }

    async fn find_queue_with_client(&self, client_id: &str) -> Result<Option<Queue>> {
        let queues = self.queues.read().await;
        Ok(queues
            .values()
            .find(|q| q.client(client_id).is_some())
            .cloned())
    }
}
