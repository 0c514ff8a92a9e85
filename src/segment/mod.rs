//! Splitting a date range into fetch units.
//!
//! Ranges of up to seven days are fetched day by day; longer ranges are
//! fetched in Monday–Saturday week slices. Sundays never produce a unit.

use chrono::{Datelike, Days, NaiveDate, Weekday};

use crate::core::{DateRange, FetchUnit};

/// Longest range, in days, that is still fetched one day at a time.
pub const DAILY_THRESHOLD_DAYS: i64 = 7;

/// Splits `range` into fetch units, in ascending date order.
///
/// Pure: the same range always yields the same units. The result is empty
/// when the range contains nothing fetchable (e.g. a lone Sunday).
#[must_use]
pub fn segment(range: DateRange) -> Vec<FetchUnit> {
    if range.day_count() <= DAILY_THRESHOLD_DAYS {
        daily_units(range)
    } else {
        weekly_units(range)
    }
}

fn daily_units(range: DateRange) -> Vec<FetchUnit> {
    range
        .start()
        .iter_days()
        .take_while(|d| *d <= range.end())
        .filter(|d| d.weekday() != Weekday::Sun)
        .map(FetchUnit::day)
        .collect()
}

fn weekly_units(range: DateRange) -> Vec<FetchUnit> {
    let end = range.end();
    let mut units = Vec::new();
    let mut cursor = range.start();

    while cursor <= end {
        let monday = week_start(cursor);
        let Some(saturday) = monday.checked_add_days(Days::new(5)) else {
            break;
        };
        let to = saturday.min(end);
        if monday <= to {
            units.push(FetchUnit { from: monday, to });
        }
        match saturday.succ_opt() {
            Some(next) => cursor = next,
            None => break,
        }
    }
    units
}

/// The Monday on or before `date`; a Sunday belongs to the following week.
fn week_start(date: NaiveDate) -> NaiveDate {
    if date.weekday() == Weekday::Sun {
        return date.succ_opt().unwrap_or(date);
    }
    let back = u64::from(date.weekday().num_days_from_monday());
    date.checked_sub_days(Days::new(back)).unwrap_or(date)
}
