//! Pricing policy injected into the engine.
//!
//! Every rate is a decimal fraction (`0.10` is 10%). Defaults are
//! deployment placeholders; each deployment overrides them from the
//! environment (see `crate::config`).

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::calculators::{apply_rate, round_money, MONEY_PLACES};
use super::error::PricingError;
use super::models::InsuranceTier;

/// Insurance surcharge per tier, as a fraction of the base price
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsuranceRates {
    pub basic: Decimal,
    pub standard: Decimal,
    pub premium: Decimal,
    pub comprehensive: Decimal,
}

impl InsuranceRates {
    pub fn rate_for(&self, tier: InsuranceTier) -> Decimal {
        match tier {
            InsuranceTier::Basic => self.basic,
            InsuranceTier::Standard => self.standard,
            InsuranceTier::Premium => self.premium,
            InsuranceTier::Comprehensive => self.comprehensive,
        }
    }
}

impl Default for InsuranceRates {
    fn default() -> Self {
        Self {
            basic: Decimal::ZERO,
            standard: dec!(0.10),
            premium: dec!(0.15),
            comprehensive: dec!(0.20),
        }
    }
}

/// How the security deposit is sized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepositPolicy {
    /// Fixed hold regardless of rental length
    Flat(Decimal),
    /// Fraction of the base price
    Percentage(Decimal),
}

impl DepositPolicy {
    /// Parse the `flat` / `percentage` pair used in configuration.
    pub fn from_parts(kind: &str, value: Decimal) -> Result<Self, PricingError> {
        match kind.trim().to_ascii_lowercase().as_str() {
            "flat" => Ok(DepositPolicy::Flat(value)),
            "percentage" | "percent" => Ok(DepositPolicy::Percentage(value)),
            other => Err(PricingError::Configuration {
                message: format!("unknown deposit policy type '{}'", other),
            }),
        }
    }

    pub fn value(&self) -> Decimal {
        match self {
            DepositPolicy::Flat(v) | DepositPolicy::Percentage(v) => *v,
        }
    }

    /// Deposit held for a rental with the given base price.
    ///
    /// `None` when a percentage deposit overflows.
    pub fn deposit_for(&self, base_price: Decimal) -> Option<Decimal> {
        match self {
            DepositPolicy::Flat(amount) => Some(round_money(*amount, MONEY_PLACES)),
            DepositPolicy::Percentage(rate) => apply_rate(base_price, *rate),
        }
    }
}

impl Default for DepositPolicy {
    fn default() -> Self {
        DepositPolicy::Percentage(dec!(0.20))
    }
}

/// Complete pricing configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingConfig {
    pub insurance_rates: InsuranceRates,
    pub service_fee_rate: Decimal,
    pub tax_rate: Decimal,
    pub deposit_policy: DepositPolicy,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            insurance_rates: InsuranceRates::default(),
            service_fee_rate: dec!(0.05),
            tax_rate: dec!(0.08),
            deposit_policy: DepositPolicy::default(),
        }
    }
}

impl PricingConfig {
    /// Reject negative rates and deposit values.
    pub fn validate(&self) -> Result<(), PricingError> {
        let mut errors = Vec::new();

        for tier in InsuranceTier::ALL {
            if self.insurance_rates.rate_for(tier).is_sign_negative() {
                errors.push(format!("insurance rate for {} is negative", tier));
            }
        }
        if self.service_fee_rate.is_sign_negative() {
            errors.push("service fee rate is negative".to_string());
        }
        if self.tax_rate.is_sign_negative() {
            errors.push("tax rate is negative".to_string());
        }
        if self.deposit_policy.value().is_sign_negative() {
            errors.push("deposit value is negative".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(PricingError::Configuration {
                message: errors.join("; "),
            })
        }
    }
}
