//! Pricing error types.

use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Pricing calculation error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PricingError {
    #[error("Invalid date range: {start} must be before {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("Dates unavailable between {start} and {end}, pick another range")]
    UnavailableRange { start: NaiveDate, end: NaiveDate },

    #[error("Unknown insurance tier '{0}'")]
    InvalidInsuranceTier(String),

    #[error("Daily rate must not be negative (got {0})")]
    InvalidDailyRate(Decimal),

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl PricingError {
    /// Short machine-readable identifier used in API error payloads.
    pub fn error_type(&self) -> &'static str {
        match self {
            PricingError::InvalidRange { .. } => "invalid_range",
            PricingError::UnavailableRange { .. } => "unavailable_range",
            PricingError::InvalidInsuranceTier(_) => "invalid_insurance_tier",
            PricingError::InvalidDailyRate(_) => "invalid_daily_rate",
            PricingError::Configuration { .. } => "configuration_error",
        }
    }
}
