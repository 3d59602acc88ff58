//! Configuration for the waitline engine.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::schedule::DaySchedule;

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub booking: BookingConfig,
    pub notify: NotifyConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            booking: BookingConfig::default(),
            notify: NotifyConfig::default(),
        }
    }
}

/// Booking-engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BookingConfig {
    /// What happens when a schedule replacement would strand existing
    /// appointments.
    pub schedule_policy: SchedulePolicy,
    /// Weekly schedule assigned to newly provisioned places.
    pub default_schedule: Vec<DaySchedule>,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            schedule_policy: SchedulePolicy::Reject,
            default_schedule: default_week(),
        }
    }
}

/// Policy for replacing a weekly schedule that has future appointments no
/// longer falling on any slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SchedulePolicy {
    /// Refuse the replacement with a conflict naming the stranded bookings.
    Reject,
    /// Accept the replacement and leave the stranded bookings in place.
    AllowOrphans,
}

/// Notification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    /// Whether successful bookings request a reminder at all.
    pub reminders_enabled: bool,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            reminders_enabled: true,
        }
    }
}

/// Monday through friday at 09:00, 12:00 and 18:00.
pub fn default_week() -> Vec<DaySchedule> {
    let slots = vec![
        NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
        NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
    ];
    [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
    ]
    .into_iter()
    .map(|day| DaySchedule::new(day, slots.clone()))
    .collect()
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::ReadFile)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from conventional file names in the working
    /// directory, falling back to defaults.
    pub fn load() -> Result<Self> {
        for path in [PathBuf::from("waitline.toml"), PathBuf::from("config.toml")] {
            if path.exists() {
                return Self::from_file(path);
            }
        }
        Ok(Self::default())
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        let mut seen_days = HashSet::new();
        for day in &self.booking.default_schedule {
            if !seen_days.insert(day.day) {
                return Err(ConfigError::Invalid(format!(
                    "default schedule lists {} more than once",
                    crate::schedule::weekday_name(day.day)
                ))
                .into());
            }
            if day.time_stamps.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "default schedule for {} has no slots",
                    crate::schedule::weekday_name(day.day)
                ))
                .into());
            }
        }
        Ok(())
    }
}
