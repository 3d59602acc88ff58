//! Error types for the waitline engine.

use thiserror::Error;

/// Main error type for waitline operations.
#[derive(Error, Debug)]
pub enum WaitlineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Booking error: {0}")]
    Booking(#[from] BookingError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Configuration-related errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Domain errors for booking, roster and schedule operations.
///
/// Every variant is recoverable from the caller's point of view; none is
/// fatal to the process. `PartialFailure` is the one outcome that requires
/// operator attention: the roster write succeeded but the schedule-side
/// write did not, so the two aggregates have diverged.
#[derive(Error, Debug)]
pub enum BookingError {
    /// A queue, place, client or schedule record does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Duplicate membership, duplicate appointment, double approve/cancel,
    /// or a queue-name collision.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Role mismatch or self-booking.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The requested time is not one of the weekly schedule's slots.
    #[error("Invalid slot: {0}")]
    InvalidSlot(String),

    /// The roster was updated but the matching schedule-side write failed.
    /// The ids identify the records that need reconciliation.
    #[error("Partial failure for place {place_id}, client {client_id}: {detail}")]
    PartialFailure {
        place_id: String,
        client_id: String,
        detail: String,
    },
}

impl BookingError {
    /// True when this error indicates diverged aggregates.
    pub fn is_partial_failure(&self) -> bool {
        matches!(self, Self::PartialFailure { .. })
    }
}

/// Result type alias for waitline operations.
pub type Result<T> = std::result::Result<T, WaitlineError>;
