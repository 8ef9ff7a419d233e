//! Conversions between stored UTC instants and the diary's local calendar.
//!
//! Every date a user sees is a local date at a fixed UTC offset (+09:00 by
//! default). Stored timestamps are UTC, so local midnight falls at 15:00 UTC
//! of the previous day and must never be derived by dividing epoch seconds.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use thiserror::Error;

use super::error::DomainError;

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum TimestampError {
    #[error("timestamp is empty")]
    Empty,

    #[error("unrecognized timestamp '{0}'")]
    Unrecognized(String),
}

/// Postgres renders `timestamptz` as text like `2024-01-01 09:30:00.123+00`.
const POSTGRES_TEXT_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f%#z";

/// Parses a stored creation timestamp into a UTC instant.
///
/// Accepts RFC 3339 (`2024-01-01T00:00:00Z`, `...+00:00`) and the Postgres
/// text rendering. Anything else is rejected; callers decide whether to skip.
pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, TimestampError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(TimestampError::Empty);
    }

    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, POSTGRES_TEXT_FORMAT))
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|_| TimestampError::Unrecognized(raw.to_string()))
}

pub(crate) fn local_date(instant: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    instant.with_timezone(&offset).date_naive()
}

/// Half-open UTC interval `[start, end)` covering one local calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct UtcRange {
    pub(crate) start: DateTime<Utc>,
    pub(crate) end: DateTime<Utc>,
}

pub(crate) fn month_utc_range(
    year: i32,
    month: u32,
    offset: FixedOffset,
) -> Result<UtcRange, DomainError> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };

    let start = local_midnight_utc(year, month, offset)?;
    let end = local_midnight_utc(next_year, next_month, offset)?;

    Ok(UtcRange { start, end })
}

fn local_midnight_utc(
    year: i32,
    month: u32,
    offset: FixedOffset,
) -> Result<DateTime<Utc>, DomainError> {
    let date = NaiveDate::from_ymd_opt(year, month, 1).ok_or(DomainError::Validation {
        field: "month",
        message: "must be a valid calendar month",
    })?;

    offset
        .from_local_datetime(&date.and_time(NaiveTime::MIN))
        .single()
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| DomainError::Unexpected(format!("ambiguous local midnight for {date}")))
}

/// Parses a UTC offset such as `+09:00`, `-05:30` or `+0900`.
pub(crate) fn parse_utc_offset(raw: &str) -> Option<FixedOffset> {
    let raw = raw.trim();
    let (sign, rest) = match raw.as_bytes().first()? {
        b'+' => (1, &raw[1..]),
        b'-' => (-1, &raw[1..]),
        _ => return None,
    };

    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    if minutes >= 60 {
        return None;
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

#[cfg(test)]
pub(crate) fn jst() -> FixedOffset {
    FixedOffset::east_opt(9 * 3600).expect("+09:00 must be a valid offset")
}
