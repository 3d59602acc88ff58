//! Schedule record storage: one record per place.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{BookingError, Result};
use crate::schedule::types::{Appointment, ScheduleRecord};

/// Storage backend for schedule records, keyed by place id.
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    /// Create a record. Fails with `Conflict` if the place already has one.
    async fn create(&self, record: ScheduleRecord) -> Result<ScheduleRecord>;

    /// Get a record by place id.
    async fn get(&self, place_id: &str) -> Result<Option<ScheduleRecord>>;

    /// Replace an existing record. Fails with `NotFound` if absent.
    async fn update(&self, record: ScheduleRecord) -> Result<ScheduleRecord>;

    /// Delete a record. Returns false when no record existed.
    async fn delete(&self, place_id: &str) -> Result<bool>;

    /// All appointments held by one client, across every place.
    async fn appointments_for_client(&self, client_id: &str) -> Result<Vec<Appointment>>;
}

/// In-memory schedule store.
#[derive(Debug, Default)]
pub struct MemoryScheduleStore {
    records: RwLock<HashMap<String, ScheduleRecord>>,
}

impl MemoryScheduleStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ScheduleStore for MemoryScheduleStore {
    async fn create(&self, record: ScheduleRecord) -> Result<ScheduleRecord> {
        let mut records = self.records.write().await;
        if records.contains_key(&record.place_id) {
            return Err(BookingError::Conflict(format!(
                "schedule record for place {} already exists",
                record.place_id
            ))
            .into());
        }
        debug!("Created schedule record for place {}", record.place_id);
        records.insert(record.place_id.clone(), record.clone());
        Ok(record)
    }

    async fn get(&self, place_id: &str) -> Result<Option<ScheduleRecord>> {
        let records = self.records.read().await;
        Ok(records.get(place_id).cloned())
    }

    async fn update(&self, record: ScheduleRecord) -> Result<ScheduleRecord> {
        let mut records = self.records.write().await;
        if !records.contains_key(&record.place_id) {
            return Err(BookingError::NotFound(format!(
                "schedule record for place {} not found",
                record.place_id
            ))
            .into());
        }
        records.insert(record.place_id.clone(), record.clone());
        Ok(record)
    }

    async fn delete(&self, place_id: &str) -> Result<bool> {
        let mut records = self.records.write().await;
        let removed = records.remove(place_id).is_some();
        if removed {
            debug!("Deleted schedule record for place {place_id}");
        }
        Ok(removed)
    }

    async fn appointments_for_client(&self, client_id: &str) -> Result<Vec<Appointment>> {
        let records = self.records.read().await;
        Ok(records
            .values()
            .flat_map(|r| r.appointments.iter())
            .filter(|a| a.client_id == client_id)
            .cloned()
            .collect())
    }
}
