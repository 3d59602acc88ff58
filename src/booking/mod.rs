//! Booking coordination across the roster and schedule aggregates.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                  BookingCoordinator                      │
//! │   book / cancel / cascade / approve / submit_schedule    │
//! │        │                │                   │            │
//! │        ▼                ▼                   ▼            │
//! │  ┌───────────┐   ┌──────────────┐   ┌──────────────┐    │
//! │  │RosterStore│   │ScheduleStore │   │ KeyedLocks   │    │
//! │  │ (queues)  │   │ (per place)  │   │ (per place)  │    │
//! │  └───────────┘   └──────────────┘   └──────────────┘    │
//! │        │                                                 │
//! │        ▼                                                 │
//! │  IdentityProvider (lookups)  NotificationDispatcher      │
//! │                              (best-effort reminders)     │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! The coordinator is invoked per request and holds no state of its own
//! beyond the per-place lock registry. The invariant it protects: a client's
//! roster `appointment` and the matching schedule-record appointment exist
//! together or not at all.

mod coordinator;
mod locks;

pub use coordinator::{BookingCoordinator, BookingCoordinatorBuilder, BookingOutcome};
pub use locks::KeyedLocks;
