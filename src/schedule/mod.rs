//! Schedule aggregate: per-place weekly availability and booked appointments.
//!
//! A [`ScheduleRecord`] carries a place's recurring weekly pattern (one
//! [`DaySchedule`] per weekday at most) and the concrete [`Appointment`]s
//! booked against it. [`available_slots`] is the pure calculator subtracting
//! one from the other for a target calendar date; [`ScheduleStore`] is the
//! storage seam with an in-memory implementation.

mod slots;
mod store;
mod types;

pub use slots::available_slots;
pub use store::{MemoryScheduleStore, ScheduleStore};
pub use types::{same_minute, weekday_name, Appointment, DaySchedule, ScheduleRecord};
