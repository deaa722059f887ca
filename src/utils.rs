use chrono::{Datelike, Days, NaiveDate, Weekday};

/// Rounds to two decimal places. Only applied when values leave the engine.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `numerator / denominator`, or `None` when there is nothing to divide by.
pub fn safe_ratio(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator == 0.0 || !denominator.is_finite() {
        None
    } else {
        Some(numerator / denominator)
    }
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Every calendar day from `start` to `end` inclusive. Empty when `start > end`.
pub fn days_in_range(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    let mut current = start;

    while current <= end {
        dates.push(current);
        match current.checked_add_days(Days::new(1)) {
            Some(next) => current = next,
            None => break,
        }
    }

    dates
}

/// Counts Monday-Friday days in the inclusive range, in either order.
pub fn count_weekdays(start: NaiveDate, end: NaiveDate) -> u32 {
    let (start, end) = if start > end { (end, start) } else { (start, end) };

    days_in_range(start, end)
        .into_iter()
        .filter(|d| !is_weekend(*d))
        .count() as u32
}
