use chrono::{NaiveDate, NaiveDateTime};

/// Inclusive day count of a date range. Missing or inverted ranges yield 0.
pub fn duration_days(start: Option<NaiveDate>, end: Option<NaiveDate>) -> i64 {
    match (start, end) {
        (Some(start), Some(end)) if end >= start => (end - start).num_days() + 1,
        _ => 0,
    }
}

/// Elapsed hours between two instants, rounded to two decimals.
/// Missing, empty or inverted ranges yield 0.0.
pub fn duration_hours(start: Option<NaiveDateTime>, end: Option<NaiveDateTime>) -> f64 {
    match (start, end) {
        (Some(start), Some(end)) if end > start => {
            let seconds = (end - start).num_seconds() as f64;
            round_hours(seconds / 3600.0)
        }
        _ => 0.0,
    }
}

/// Round an hour figure to two decimals.
pub fn round_hours(hours: f64) -> f64 {
    (hours * 100.0).round() / 100.0
}
