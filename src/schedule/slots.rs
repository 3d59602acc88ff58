//! Slot availability calculation.
//!
//! Pure functions over a [`ScheduleRecord`]: no clock access, no store
//! access. "Today's slots that are already in the past" are still returned;
//! filtering by the current time is a display concern owned by callers.

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};

use crate::error::{BookingError, Result};
use crate::schedule::types::{weekday_name, ScheduleRecord};

/// Free slots for `date`, in schedule order.
///
/// Looks up the schedule entry for `date`'s weekday, then removes every slot
/// consumed by an appointment falling on that calendar date. A weekday with
/// no schedule entry is `NotFound`; a fully-booked day is an empty list. The
/// two are distinct outcomes.
pub fn available_slots(record: &ScheduleRecord, date: NaiveDate) -> Result<Vec<NaiveTime>> {
    let weekday = date.weekday();
    let day = record.day_schedule(weekday).ok_or_else(|| {
        BookingError::NotFound(format!("no schedule for {}", weekday_name(weekday)))
    })?;

    let busy: Vec<(u32, u32)> = record
        .appointments
        .iter()
        .filter(|a| a.time.date_naive() == date)
        .map(|a| (a.time.hour(), a.time.minute()))
        .collect();

    Ok(day
        .time_stamps
        .iter()
        .filter(|slot| !busy.contains(&(slot.hour(), slot.minute())))
        .copied()
        .collect())
}
