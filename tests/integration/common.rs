//! Shared fixtures for the integration suites.

use std::sync::{Arc, Once};

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use waitline::{
    BookingCoordinator, BookingError, Identity, MemoryIdentityProvider, MemoryScheduleStore, Role,
    WaitlineError,
};

static TRACING: Once = Once::new();

/// Install the fmt subscriber once per test binary; `RUST_LOG` picks the
/// level, defaulting to info.
fn init_tracing() {
    TRACING.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

pub struct Harness {
    pub coordinator: Arc<BookingCoordinator>,
    pub identity: Arc<MemoryIdentityProvider>,
    pub schedules: Arc<MemoryScheduleStore>,
}

/// Coordinator over fresh in-memory stores.
pub async fn harness() -> Harness {
    init_tracing();
    let identity = Arc::new(MemoryIdentityProvider::new());
    identity.bootstrap().await.unwrap();
    let schedules = Arc::new(MemoryScheduleStore::new());
    let coordinator = BookingCoordinator::builder()
        .identity(identity.clone())
        .schedules(schedules.clone())
        .build();
    Harness {
        coordinator: Arc::new(coordinator),
        identity,
        schedules,
    }
}

pub async fn register(harness: &Harness, name: &str, role: Role) -> Identity {
    harness
        .identity
        .register(Identity::new(
            name,
            format!("{name}@example.com"),
            format!("+{name}"),
            role,
        ))
        .await
        .unwrap()
}

/// 2024-01-08, a Monday.
pub fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 8).unwrap()
}

pub fn monday_at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 8, hour, minute, 0).unwrap()
}

pub fn slot(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
}

pub fn booking_err(err: WaitlineError) -> BookingError {
    match err {
        WaitlineError::Booking(e) => e,
        other => panic!("expected booking error, got {other}"),
    }
}
