//! Rental period arithmetic.
//!
//! Dates are accepted as ISO 8601 calendar dates (`2025-08-01`, read as UTC
//! midnight), RFC 3339 date-times, or offset-less date-times (read as UTC).

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;

use crate::Error;

const MILLIS_PER_DAY: u64 = 24 * 60 * 60 * 1000;

/// Parses a rental date into an instant.
pub fn parse_instant(value: &str) -> Result<DateTime<Utc>, Error> {
    let trimmed = value.trim();

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|midnight| midnight.and_utc())
            .ok_or_else(|| Error::InvalidDate(value.to_owned()));
    }
    if let Ok(instant) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(instant.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(naive.and_utc());
        }
    }
    Err(Error::InvalidDate(value.to_owned()))
}

/// Number of rental days between two dates: the absolute distance in
/// milliseconds divided by one day, rounded up.
/// Identical instants give 0 days.
pub fn rental_days(start_date: &str, end_date: &str) -> Result<u32, Error> {
    let start = parse_instant(start_date)?;
    let end = parse_instant(end_date)?;
    let millis = (end - start).num_milliseconds().unsigned_abs();
    u32::try_from(millis.div_ceil(MILLIS_PER_DAY))
        .map_err(|_| Error::InvalidDate(format!("{start_date}..{end_date}")))
}

/// Daily price times rental days, or [`Error::PriceOverflow`] when the
/// product does not fit in a `Decimal`.
pub fn total_price(daily_price: Decimal, rental_days: u32) -> Result<Decimal, Error> {
    daily_price
        .checked_mul(Decimal::from(rental_days))
        .ok_or(Error::PriceOverflow {
            daily_price,
            rental_days,
        })
}
