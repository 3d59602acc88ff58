//! Schedule record types: weekly recurring availability plus booked
//! appointments for a single place.

use chrono::{DateTime, Datelike, NaiveTime, Timelike, Utc, Weekday};
use serde::{Deserialize, Serialize};

/// Lowercase full weekday name, matching the wire format schedules use.
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

/// Serde helpers for weekdays as lowercase full names.
mod weekday_serde {
    use super::weekday_name;
    use chrono::Weekday;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(day: &Weekday, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(weekday_name(*day))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Weekday, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid weekday: {s}")))
    }
}

/// Serde helpers for slot lists as "HH:mm" strings.
mod hhmm_serde {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(slots: &[NaiveTime], serializer: S) -> Result<S::Ok, S::Error> {
        let strings: Vec<String> = slots.iter().map(|t| t.format("%H:%M").to_string()).collect();
        serializer.collect_seq(strings)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<NaiveTime>, D::Error> {
        let strings: Vec<String> = Vec::deserialize(deserializer)?;
        strings
            .iter()
            .map(|s| NaiveTime::parse_from_str(s, "%H:%M").map_err(serde::de::Error::custom))
            .collect()
    }
}

/// Availability for one weekday: an ordered list of HH:mm slots.
///
/// Slot order is whatever the submitter chose; the calculator preserves it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySchedule {
    /// The weekday this entry covers. At most one entry per weekday exists
    /// in a schedule.
    #[serde(with = "weekday_serde")]
    pub day: Weekday,
    /// Bookable clock times for that weekday.
    #[serde(with = "hhmm_serde")]
    pub time_stamps: Vec<NaiveTime>,
}

impl DaySchedule {
    pub fn new(day: Weekday, time_stamps: Vec<NaiveTime>) -> Self {
        Self { day, time_stamps }
    }

    /// True when the schedule contains `time`, compared at minute precision.
    pub fn contains_slot(&self, time: NaiveTime) -> bool {
        self.time_stamps
            .iter()
            .any(|t| t.hour() == time.hour() && t.minute() == time.minute())
    }
}

/// A concrete booking: one client at one absolute time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    /// Absolute timestamp of the slot.
    pub time: DateTime<Utc>,
    /// Id of the client holding the slot.
    pub client_id: String,
}

/// A place's weekly recurring availability plus its booked appointments.
/// One record exists per place; the place id is unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRecord {
    /// The place this record belongs to.
    pub place_id: String,
    /// Weekly recurring availability, at most one entry per weekday.
    pub schedule: Vec<DaySchedule>,
    /// Concrete bookings against the schedule.
    #[serde(default)]
    pub appointments: Vec<Appointment>,
}

impl ScheduleRecord {
    /// Create a record with no appointments.
    pub fn new(place_id: impl Into<String>, schedule: Vec<DaySchedule>) -> Self {
        Self {
            place_id: place_id.into(),
            schedule,
            appointments: Vec::new(),
        }
    }

    /// The schedule entry for a weekday, if one exists.
    pub fn day_schedule(&self, day: Weekday) -> Option<&DaySchedule> {
        self.schedule.iter().find(|s| s.day == day)
    }

    /// Mutable schedule entry for a weekday.
    pub fn day_schedule_mut(&mut self, day: Weekday) -> Option<&mut DaySchedule> {
        self.schedule.iter_mut().find(|s| s.day == day)
    }

    /// True when an appointment already occupies `time`, compared at minute
    /// precision.
    pub fn has_appointment_at(&self, time: DateTime<Utc>) -> bool {
        self.appointments.iter().any(|a| same_minute(a.time, time))
    }

    /// True when `time`'s clock component is a slot on `time`'s weekday.
    pub fn slot_matches(&self, time: DateTime<Utc>) -> bool {
        self.day_schedule(time.date_naive().weekday())
            .is_some_and(|day| day.contains_slot(time.time()))
    }
}

/// Minute-precision timestamp equality. Seconds and finer are ignored, so a
/// request for 09:00:30 lands on the 09:00 slot.
pub fn same_minute(a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
    a.date_naive() == b.date_naive() && a.hour() == b.hour() && a.minute() == b.minute()
}
