//! Waitline: booking and queue-consistency engine.
//!
//! An organization runs multiple independent queues; each queue has places
//! (service providers) and clients who book a time slot at a place. This
//! crate keeps the two aggregates involved (the queue roster and the
//! per-place schedule record) mutually consistent under concurrent booking,
//! cancellation and membership cascades, while enforcing the booking
//! invariants (no double booking, no out-of-schedule booking) and role-gated
//! transitions.
//!
//! Transport, authentication and email delivery live outside this crate;
//! the [`identity::IdentityProvider`] and [`notify::NotificationDispatcher`]
//! traits are the seams where they plug in.

pub mod booking;
pub mod config;
pub mod error;
pub mod identity;
pub mod notify;
pub mod roster;
pub mod schedule;

pub use booking::{BookingCoordinator, BookingCoordinatorBuilder, BookingOutcome, KeyedLocks};
pub use config::{default_week, BookingConfig, Config, NotifyConfig, SchedulePolicy};
pub use error::{BookingError, ConfigError, Result, WaitlineError};
pub use identity::{Identity, IdentityProvider, MemoryIdentityProvider, Role};
pub use notify::{LogDispatcher, NotificationDispatcher, NullDispatcher};
pub use roster::{AppointmentRef, Client, MemoryRosterStore, Place, Queue, RosterStore};
pub use schedule::{
    available_slots, weekday_name, Appointment, DaySchedule, MemoryScheduleStore, ScheduleRecord,
    ScheduleStore,
};
