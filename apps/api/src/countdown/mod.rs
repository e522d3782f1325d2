//! Countdown settings and remaining-time arithmetic.
//!
//! Dates are plain `YYYY-MM-DD` strings, interpreted as local midnight. Anything that
//! does not have that shape is rejected by the clamps and replaced with a fallback.

pub mod handlers;

use chrono::{DateTime, Days, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

pub const DEFAULT_EVENT_NAME: &str = "Midsummer Eve";
pub const BLANK_EVENT_NAME: &str = "Event";
pub const DEFAULT_DAYS_AHEAD: i64 = 20;

/// Persisted countdown preferences. Field names match the stored JSON format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountdownSettings {
    pub event_name: String,
    pub end_iso: String,
}

/// Remaining time broken into display units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RemainingParts {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

// ────────────────────────────────────────────────────────────────────────────
// Settings helpers
// ────────────────────────────────────────────────────────────────────────────

pub fn default_settings(today: NaiveDate) -> CountdownSettings {
    settings_days_ahead(today, DEFAULT_DAYS_AHEAD)
}

/// Default event name, ending `days` after `today`.
pub fn settings_days_ahead(today: NaiveDate, days: i64) -> CountdownSettings {
    let end = if days >= 0 {
        today.checked_add_days(Days::new(days.unsigned_abs()))
    } else {
        today.checked_sub_days(Days::new(days.unsigned_abs()))
    }
    .unwrap_or(today);

    CountdownSettings {
        event_name: DEFAULT_EVENT_NAME.to_string(),
        end_iso: end.format("%Y-%m-%d").to_string(),
    }
}

pub fn clamp_event_name(s: &str) -> String {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        BLANK_EVENT_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}

/// True for strings shaped exactly like `YYYY-MM-DD` (digits only, no range check).
pub fn is_iso_date_shape(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

pub fn clamp_iso_date(s: &str, fallback: &str) -> String {
    if is_iso_date_shape(s) {
        s.to_string()
    } else {
        fallback.to_string()
    }
}

pub fn parse_iso_date(s: &str) -> Option<NaiveDate> {
    if !is_iso_date_shape(s) {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Clamps a submitted form against the settings currently in effect.
pub fn apply_form(form: &CountdownSettings, current: &CountdownSettings) -> CountdownSettings {
    CountdownSettings {
        event_name: clamp_event_name(&form.event_name),
        end_iso: clamp_iso_date(&form.end_iso, &current.end_iso),
    }
}

/// True when the chosen date lies strictly before `today`. Blank or invalid dates are not past.
pub fn is_past_date(iso: &str, today: NaiveDate) -> bool {
    parse_iso_date(iso.trim()).is_some_and(|date| date < today)
}

// ────────────────────────────────────────────────────────────────────────────
// Remaining time
// ────────────────────────────────────────────────────────────────────────────

/// Local midnight of `iso` in `now`'s time zone, as epoch milliseconds.
///
/// Falls back to `now` for malformed dates and for midnights skipped by a DST jump.
pub fn local_iso_to_ms<Tz: TimeZone>(iso: &str, now: &DateTime<Tz>) -> i64 {
    parse_iso_date(iso)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .and_then(|midnight| now.timezone().from_local_datetime(&midnight).earliest())
        .map(|dt| dt.timestamp_millis())
        .unwrap_or_else(|| now.timestamp_millis())
}

/// Splits `target − now` into units. Past targets clamp to zero.
pub fn parts_from_diff(target_ms: i64, now_ms: i64) -> RemainingParts {
    let total = target_ms.saturating_sub(now_ms).max(0) / 1000;
    RemainingParts {
        days: total / 86_400,
        hours: (total % 86_400) / 3_600,
        minutes: (total % 3_600) / 60,
        seconds: total % 60,
    }
}

pub fn format_remaining(parts: &RemainingParts) -> String {
    let unit = if parts.days == 1 { "day" } else { "days" };
    format!(
        "{} {unit}, {} h, {} m, {} s",
        parts.days, parts.hours, parts.minutes, parts.seconds
    )
}
