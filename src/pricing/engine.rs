//! Rental pricing engine.
//!
//! Stateless apart from the immutable [`PricingConfig`] it is built with, so
//! a single engine can be shared across request handlers without locking.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::calculators::{apply_rate, days_in_range, nights_between, round_money, MONEY_PLACES};
use super::error::PricingError;
use super::models::{AvailabilityCalendar, BookingRequest, PriceBreakdown};
use super::policy::PricingConfig;

#[derive(Debug, Clone, Default)]
pub struct RentalPricingEngine {
    config: PricingConfig,
}

impl RentalPricingEngine {
    /// Build an engine after validating the configuration.
    pub fn new(config: PricingConfig) -> Result<Self, PricingError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// True only when every day in `[start, end)` is present and free.
    pub fn check_availability(
        &self,
        calendar: &AvailabilityCalendar,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<bool, PricingError> {
        validate_range(start, end)?;
        Ok(days_in_range(start, end).all(|day| calendar.is_available(day)))
    }

    /// Price a bookable range.
    ///
    /// Each fee is rounded once, and later fees build on the rounded values
    /// so the total matches the sum of its line items to the cent.
    pub fn calculate_pricing(
        &self,
        request: &BookingRequest,
        daily_rate: Decimal,
        calendar: &AvailabilityCalendar,
    ) -> Result<PriceBreakdown, PricingError> {
        if daily_rate < Decimal::ZERO {
            return Err(PricingError::InvalidDailyRate(daily_rate));
        }

        let (start, end) = (request.start_date, request.end_date);
        let total_days = validate_range(start, end)?;

        if !self.check_availability(calendar, start, end)? {
            return Err(PricingError::UnavailableRange { start, end });
        }

        // Amounts beyond Decimal's range surface as an unusable rate.
        let overflow = || PricingError::InvalidDailyRate(daily_rate);
        let rate = round_money(daily_rate, MONEY_PLACES);

        let base_price = rate
            .checked_mul(Decimal::from(total_days))
            .map(|amount| round_money(amount, MONEY_PLACES))
            .ok_or_else(overflow)?;
        let insurance_fee = apply_rate(
            base_price,
            self.config.insurance_rates.rate_for(request.insurance_tier),
        )
        .ok_or_else(overflow)?;
        let service_fee =
            apply_rate(base_price, self.config.service_fee_rate).ok_or_else(overflow)?;
        let taxable = checked_sum(&[base_price, insurance_fee, service_fee]).ok_or_else(overflow)?;
        let taxes = apply_rate(taxable, self.config.tax_rate).ok_or_else(overflow)?;
        let deposit = self
            .config
            .deposit_policy
            .deposit_for(base_price)
            .ok_or_else(overflow)?;
        let total_price = checked_sum(&[taxable, taxes])
            .map(|amount| round_money(amount, MONEY_PLACES))
            .ok_or_else(overflow)?;

        Ok(PriceBreakdown {
            daily_rate: rate,
            total_days,
            base_price,
            insurance_fee,
            service_fee,
            taxes,
            deposit,
            total_price,
        })
    }
}

fn checked_sum(amounts: &[Decimal]) -> Option<Decimal> {
    amounts
        .iter()
        .try_fold(Decimal::ZERO, |acc, amount| acc.checked_add(*amount))
}

/// Number of nights in a valid range, or `InvalidRange`.
fn validate_range(start: NaiveDate, end: NaiveDate) -> Result<i64, PricingError> {
    let nights = nights_between(start, end);
    if nights < 1 {
        return Err(PricingError::InvalidRange { start, end });
    }
    Ok(nights)
}
