//! Calendar dates in `YYYY-MM-DD` form.
//!
//! Expense dates carry no time of day. They cross every boundary (serde,
//! the database column, range filters) as ten-character ISO dates; any
//! other textual form is rejected with [`DateFormatError`].

use serde::{Deserialize, Deserializer, Serializer};
use time::Date;
use time::format_description::FormatItem;
use time::macros::format_description;

use crate::constants::ERR_INVALID_DATE_FORMAT;

const DATE_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{}", ERR_INVALID_DATE_FORMAT)]
pub struct DateFormatError;

pub fn parse_date(value: &str) -> Result<Date, DateFormatError> {
    // `[year]` alone would also accept a sign or a short year
    if value.len() != 10 {
        return Err(DateFormatError);
    }
    Date::parse(value, DATE_FORMAT).map_err(|_| DateFormatError)
}

pub fn format_date(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

/// Serde adapter for `#[serde(with = "crate::date::date_only")]`.
pub mod date_only {
    use super::*;

    pub fn serialize<S>(date: &Date, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format_date(*date))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Date, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_date(&raw).map_err(serde::de::Error::custom)
    }
}
