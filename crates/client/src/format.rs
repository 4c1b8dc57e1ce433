//! Display formatting for dates coming back from the backend.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

/// Short month names as rendered for the `id-ID` locale.
const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "Mei", "Jun", "Jul", "Agu", "Sep", "Okt", "Nov", "Des",
];

/// Render a backend timestamp as `d Mon yyyy`, e.g. `5 Agu 2024`.
///
/// Accepts RFC 3339 timestamps, naive `YYYY-MM-DDTHH:MM:SS[.fff]` and plain
/// `YYYY-MM-DD`. A timestamp with an offset keeps the calendar day of that
/// offset. Empty input yields an empty string and anything unparseable is
/// returned unchanged.
#[must_use]
pub fn format_date(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    parse_day(raw.trim()).map_or_else(|| raw.to_string(), render)
}

fn parse_day(raw: &str) -> Option<NaiveDate> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.date_naive())
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").map(|dt| dt.date()))
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .ok()
}

fn render(day: NaiveDate) -> String {
    let month = MONTHS
        .get(day.month0() as usize)
        .copied()
        .unwrap_or_default();
    format!("{} {month} {}", day.day(), day.year())
}
