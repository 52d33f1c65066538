//! Night counting and price calculation.
//!
//! Prices are persisted as integer cents and handled here as `Decimal` values
//! with two decimal places. Totals are rounded half away from zero.

use crate::errors::{Error, Result};
use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};

/// Decimal places of the currency's minor unit
pub const MINOR_UNIT_DP: u32 = 2;

/// Raw number of nights between two dates; zero or negative for inverted ranges.
#[must_use]
pub fn night_span(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days()
}

/// Number of nights in `[start, end)`.
///
/// # Errors
/// Returns [`Error::InvalidDateRange`] when `end <= start`.
pub fn nights(start: NaiveDate, end: NaiveDate) -> Result<i64> {
    if end <= start {
        return Err(Error::InvalidDateRange { start, end });
    }
    Ok(night_span(start, end))
}

/// Rounds an amount to the currency's minor unit.
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MINOR_UNIT_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// `nights * rate_per_night`, rounded to cents.
pub fn compute_total(nights: i64, rate_per_night: Decimal) -> Result<Decimal> {
    rate_per_night
        .checked_mul(Decimal::from(nights))
        .map(round_money)
        .ok_or_else(|| Error::Validation {
            message: format!("Total for {nights} nights at {rate_per_night} is out of range"),
        })
}

/// Per-night rate a booking was originally charged: `total / nights` of its stored range.
///
/// The result is not rounded so that re-applying it to the original range
/// reproduces the stored total.
///
/// # Errors
/// Returns [`Error::CorruptedBooking`] when the stored range yields zero or
/// fewer nights.
pub fn locked_rate(
    booking_id: i64,
    stored_total: Decimal,
    stored_start: NaiveDate,
    stored_end: NaiveDate,
) -> Result<Decimal> {
    let stored_nights = night_span(stored_start, stored_end);
    if stored_nights <= 0 {
        return Err(Error::CorruptedBooking {
            booking_id,
            nights: stored_nights,
        });
    }
    Ok(stored_total / Decimal::from(stored_nights))
}

/// Converts cents to a two-decimal amount.
#[must_use]
pub fn from_cents(cents: i64) -> Decimal {
    Decimal::new(cents, MINOR_UNIT_DP)
}

/// Converts an amount to whole cents after rounding.
pub fn to_cents(amount: Decimal) -> Result<i64> {
    round_money(amount)
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|cents| cents.to_i64())
        .ok_or_else(|| Error::Validation {
            message: format!("Amount {amount} is out of range"),
        })
}
