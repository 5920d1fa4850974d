//! Shifting between the UTC values Azure DevOps stores and the fixed local
//! offset the minutes are edited in.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};

/// Hours behind UTC of the local time minutes are written in.
pub const LOCAL_OFFSET_HOURS: i64 = 3;

/// Format of an HTML `datetime-local` input.
pub const LOCAL_FORMAT: &str = "%Y-%m-%dT%H:%M";

const UTC_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";
const DATE_FORMAT: &str = "%Y-%m-%d";

fn offset() -> Duration {
    Duration::hours(LOCAL_OFFSET_HOURS)
}

fn parse_naive(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M"))
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S"))
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M"))
        .ok()
}

/// Parses a remote timestamp as UTC. Values without an offset are taken as
/// UTC already.
fn parse_utc(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc).naive_utc())
        .ok()
        .or_else(|| parse_naive(value))
}

/// `2025-10-06T13:00:00Z` → `2025-10-06T10:00`.
pub fn utc_to_local(value: &str) -> Option<String> {
    parse_utc(value).map(|utc| (utc - offset()).format(LOCAL_FORMAT).to_string())
}

/// `2025-10-06T10:00` → `2025-10-06T13:00:00Z`.
pub fn local_to_utc(value: &str) -> Option<String> {
    parse_naive(value).map(|local| (local + offset()).format(UTC_FORMAT).to_string())
}

/// Date-only variant of [`local_to_utc`]: local midnight of `2025-10-10` is
/// stored as `2025-10-10T03:00:00Z`.
pub fn date_to_utc(value: &str) -> Option<String> {
    let date = NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()?;
    let midnight = date.and_hms_opt(0, 0, 0)?;
    Some((midnight + offset()).format(UTC_FORMAT).to_string())
}

/// Date-only variant of [`utc_to_local`].
pub fn utc_to_date(value: &str) -> Option<String> {
    parse_utc(value).map(|utc| (utc - offset()).format(DATE_FORMAT).to_string())
}

/// Today's date at the local offset, as `dd-mm-YYYY`.
pub fn today_local() -> String {
    (Utc::now().naive_utc() - offset()).format("%d-%m-%Y").to_string()
}
