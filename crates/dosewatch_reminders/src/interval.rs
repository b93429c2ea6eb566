// --- File: crates/dosewatch_reminders/src/interval.rs ---
//! Reminder interval arithmetic.
//!
//! The interval is stored as whole hours next to the free-form `frequency`
//! text. Text is parsed exactly once, when a medication is created or edited
//! without an explicit `interval_hours`.

use chrono::{DateTime, Duration, Utc};

use crate::error::ReminderError;

pub const MIN_INTERVAL_HOURS: u32 = 1;
/// Thirty days.
pub const MAX_INTERVAL_HOURS: u32 = 720;

pub fn validate_interval(hours: u32) -> Result<u32, ReminderError> {
    if (MIN_INTERVAL_HOURS..=MAX_INTERVAL_HOURS).contains(&hours) {
        Ok(hours)
    } else {
        Err(ReminderError::Validation(format!(
            "interval must be between {} and {} hours, got {}",
            MIN_INTERVAL_HOURS, MAX_INTERVAL_HOURS, hours
        )))
    }
}

/// Parses frequency text such as "Every 8 hours", "every hour" or "Once daily".
pub fn parse_frequency(text: &str) -> Result<u32, ReminderError> {
    let lowered = text.trim().to_lowercase();
    let words: Vec<&str> = lowered.split_whitespace().collect();

    let hours = match words.as_slice() {
        ["every", "hour"] => Some(1),
        ["every", n, "hour" | "hours"] => n.parse::<u32>().ok(),
        ["once", "daily"] | ["daily"] | ["once", "a", "day"] => Some(24),
        ["twice", "daily"] | ["twice", "a", "day"] => Some(12),
        _ => None,
    };

    match hours {
        Some(h) => validate_interval(h),
        None => Err(ReminderError::Validation(format!(
            "cannot derive an interval from frequency '{}'",
            text
        ))),
    }
}

/// Display text for an interval, in the form the client writes.
pub fn frequency_label(hours: u32) -> String {
    match hours {
        1 => "Every hour".to_string(),
        24 => "Once daily".to_string(),
        n => format!("Every {} hours", n),
    }
}

pub fn next_after(now: DateTime<Utc>, interval_hours: u32) -> DateTime<Utc> {
    now + Duration::hours(i64::from(interval_hours))
}

/// Converts a (possibly fractional) snooze in hours to a duration, rounded to
/// the millisecond.
pub fn snooze_duration(hours: f64, max_hours: f64) -> Result<Duration, ReminderError> {
    if !hours.is_finite() || hours <= 0.0 {
        return Err(ReminderError::Validation(format!(
            "snooze duration must be a positive number of hours, got {}",
            hours
        )));
    }
    if hours > max_hours {
        return Err(ReminderError::Validation(format!(
            "snooze duration must not exceed {} hours",
            max_hours
        )));
    }
    Ok(Duration::milliseconds((hours * 3_600_000.0).round() as i64))
}
