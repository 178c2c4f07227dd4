//! Permissive date-of-birth parsing.

use chrono::{Datelike, NaiveDate, NaiveDateTime};

/// Tried in order. Month-first comes before day-first, so `03/04/2020` is
/// March 4th and `13/04/2020` falls through to April 13th.
const DATE_FORMATS: &[&str] = &[
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m-%d-%Y",
    "%d-%m-%Y",
    "%m.%d.%Y",
    "%d.%m.%Y",
    "%Y.%m.%d",
    "%Y%m%d",
    "%B %d, %Y",
    "%B %d %Y",
    "%d %B %Y",
    "%d-%b-%Y",
    "%m/%d/%y",
    "%d/%m/%y",
    "%m-%d-%y",
    "%d-%b-%y",
];

/// Spreadsheet exports often carry a midnight time component.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
];

/// `%Y` happily reads `85` as the year 85.
const MIN_YEAR: i32 = 1000;

#[must_use]
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .filter_map(|format| NaiveDate::parse_from_str(s, format).ok())
        .find(|date| date.year() >= MIN_YEAR)
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .filter_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
                .map(|datetime| datetime.date())
                .find(|date| date.year() >= MIN_YEAR)
        })
}
