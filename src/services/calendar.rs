//! Calendar position
//!
//! The schedule policy cares about which occurrence of a weekday a date is
//! within its month (first Sunday, third Sunday, ...). The mapping shifts
//! at every month boundary because months start on different weekdays, so
//! it is recomputed from the date itself rather than cached.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate, Weekday};

/// Bucket every day of the given month by its weekday, ascending within
/// each bucket.
pub fn weekday_occurrences(year: i32, month: u32) -> HashMap<Weekday, Vec<u32>> {
    let mut buckets: HashMap<Weekday, Vec<u32>> = HashMap::new();

    for day in 1..=31 {
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            buckets.entry(date.weekday()).or_default().push(day);
        }
    }

    buckets
}

/// Describe a date as (occurrence index, weekday), where the index is the
/// 1-based position of the date within its weekday's bucket for that month.
/// The second Wednesday of a month yields `(2, Weekday::Wed)`.
pub fn describe(date: NaiveDate) -> (u32, Weekday) {
    let weekday = date.weekday();
    let bucket = weekday_occurrences(date.year(), date.month())
        .remove(&weekday)
        .unwrap_or_default();

    let index = bucket
        .iter()
        .position(|&day| day == date.day())
        .map_or(0, |i| i as u32 + 1);

    (index, weekday)
}
