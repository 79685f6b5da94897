//! Core pricing calculation functions.
//!
//! Pure functions for pricing math - no database access.

use chrono::NaiveDate;
use rust_decimal::prelude::*;
use rust_decimal::Decimal;

/// Decimal places used for every money field.
pub const MONEY_PLACES: u32 = 2;

/// Round to specified decimal places using round-half-up.
///
/// Amounts exactly halfway between two values round away from zero,
/// which for the non-negative amounts on a quote means up. The result always
/// carries exactly `places` decimals, so `225` comes back as `225.00`.
///
/// # Examples
/// ```
/// use rust_decimal_macros::dec;
/// use carlot_rentals::pricing::round_money;
///
/// assert_eq!(round_money(dec!(2.5), 0), dec!(3));
/// assert_eq!(round_money(dec!(2.345), 2), dec!(2.35));
/// assert_eq!(round_money(dec!(1.234), 2), dec!(1.23));
/// assert_eq!(round_money(dec!(225), 2).to_string(), "225.00");
/// ```
pub fn round_money(amount: Decimal, places: u32) -> Decimal {
    let mut rounded = amount.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(places);
    rounded
}

/// Apply a fractional rate to an amount and round the result to cents.
///
/// `None` when the product overflows.
pub fn apply_rate(amount: Decimal, rate: Decimal) -> Option<Decimal> {
    amount
        .checked_mul(rate)
        .map(|product| round_money(product, MONEY_PLACES))
}

/// Number of nights in the half-open range `[start, end)`.
///
/// Negative when `end` precedes `start`; callers validate the sign.
pub fn nights_between(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days()
}

/// Iterate every calendar day in `[start, end)`.
pub fn days_in_range(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |day| *day < end)
}
