//! Reminder notification dispatch.
//!
//! The engine never sends email itself. After a successful booking it hands a
//! "notify this address at this time" request to a [`NotificationDispatcher`]
//! and moves on; a dispatcher failure is reported alongside the booking
//! outcome, never used to roll it back.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::error::Result;

/// Fire-and-forget reminder scheduling.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    /// Request a reminder for `email` at `at`.
    async fn schedule_reminder(&self, email: &str, at: DateTime<Utc>) -> Result<()>;
}

/// Dispatcher that only logs. Stands in for the external job queue in tests
/// and single-process deployments.
#[derive(Debug, Default)]
pub struct LogDispatcher;

impl LogDispatcher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotificationDispatcher for LogDispatcher {
    async fn schedule_reminder(&self, email: &str, at: DateTime<Utc>) -> Result<()> {
        if at <= Utc::now() {
            warn!("Not scheduling reminder for {email}: {at} is in the past");
            return Ok(());
        }
        info!("Scheduled reminder for {email} at {at}");
        Ok(())
    }
}

/// Dispatcher that does nothing at all.
#[derive(Debug, Default)]
pub struct NullDispatcher;

#[async_trait]
impl NotificationDispatcher for NullDispatcher {
    async fn schedule_reminder(&self, _email: &str, _at: DateTime<Utc>) -> Result<()> {
        Ok(())
    }
}
