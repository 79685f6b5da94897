//! Environment configuration

use std::{env, fmt::Display, str::FromStr};

use rust_decimal::Decimal;
use tracing::info;

use crate::pricing::{DepositPolicy, InsuranceRates, PricingConfig};

/// Service configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub database_max_connections: u32,
    pub run_migrations: bool,
    pub currency: String,
    pub pricing: PricingConfig,
}

/// Configuration loading error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Environment variable {0} is required")]
    Missing(&'static str),

    #[error("Invalid {key} value '{value}': {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error(transparent)]
    Pricing(#[from] crate::pricing::PricingError),
}

impl Config {
    /// Load from the process environment (call `dotenvy::dotenv()` first).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let defaults = PricingConfig::default();
        let insurance_rates = InsuranceRates {
            basic: try_load(&lookup, "RENTAL_INSURANCE_BASIC_RATE", defaults.insurance_rates.basic)?,
            standard: try_load(
                &lookup,
                "RENTAL_INSURANCE_STANDARD_RATE",
                defaults.insurance_rates.standard,
            )?,
            premium: try_load(
                &lookup,
                "RENTAL_INSURANCE_PREMIUM_RATE",
                defaults.insurance_rates.premium,
            )?,
            comprehensive: try_load(
                &lookup,
                "RENTAL_INSURANCE_COMPREHENSIVE_RATE",
                defaults.insurance_rates.comprehensive,
            )?,
        };

        let deposit_type: String = try_load(&lookup, "RENTAL_DEPOSIT_TYPE", "percentage".to_string())?;
        let deposit_value: Decimal =
            try_load(&lookup, "RENTAL_DEPOSIT_VALUE", defaults.deposit_policy.value())?;

        let pricing = PricingConfig {
            insurance_rates,
            service_fee_rate: try_load(&lookup, "RENTAL_SERVICE_FEE_RATE", defaults.service_fee_rate)?,
            tax_rate: try_load(&lookup, "RENTAL_TAX_RATE", defaults.tax_rate)?,
            deposit_policy: DepositPolicy::from_parts(&deposit_type, deposit_value)?,
        };
        pricing.validate()?;

        Ok(Self {
            database_url,
            bind_addr: try_load(&lookup, "BIND_ADDR", "0.0.0.0:8080".to_string())?,
            database_max_connections: try_load(&lookup, "DATABASE_MAX_CONNECTIONS", 5)?,
            run_migrations: try_load(&lookup, "RUN_MIGRATIONS", false)?,
            currency: try_load(&lookup, "RENTAL_CURRENCY", "USD".to_string())?,
            pricing,
        })
    }
}

fn try_load<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Display,
    T::Err: Display,
{
    match lookup(key) {
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            value,
            reason: e.to_string(),
        }),
        None => {
            info!("{key} not set, using default: {default}");
            Ok(default)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("DATABASE_URL", "postgres://localhost/carlot")]).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.database_max_connections, 5);
        assert!(!config.run_migrations);
        assert_eq!(config.currency, "USD");
        assert_eq!(config.pricing, PricingConfig::default());
    }

    #[test]
    fn test_missing_database_url() {
        assert!(matches!(load(&[]), Err(ConfigError::Missing("DATABASE_URL"))));
    }

    #[test]
    fn test_pricing_overrides() {
        let config = load(&[
            ("DATABASE_URL", "postgres://localhost/carlot"),
            ("RENTAL_TAX_RATE", "0.0725"),
            ("RENTAL_SERVICE_FEE_RATE", "0.03"),
            ("RENTAL_INSURANCE_PREMIUM_RATE", "0.18"),
            ("RENTAL_DEPOSIT_TYPE", "flat"),
            ("RENTAL_DEPOSIT_VALUE", "500"),
        ])
        .unwrap();

        assert_eq!(config.pricing.tax_rate, dec!(0.0725));
        assert_eq!(config.pricing.service_fee_rate, dec!(0.03));
        assert_eq!(config.pricing.insurance_rates.premium, dec!(0.18));
        assert_eq!(config.pricing.insurance_rates.standard, dec!(0.10));
        assert_eq!(config.pricing.deposit_policy, DepositPolicy::Flat(dec!(500)));
    }

    #[test]
    fn test_invalid_values() {
        let err = load(&[
            ("DATABASE_URL", "postgres://localhost/carlot"),
            ("RENTAL_TAX_RATE", "eight percent"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("RENTAL_TAX_RATE"));

        let err = load(&[
            ("DATABASE_URL", "postgres://localhost/carlot"),
            ("RENTAL_SERVICE_FEE_RATE", "-0.05"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::Pricing(_)));

        let err = load(&[
            ("DATABASE_URL", "postgres://localhost/carlot"),
            ("RENTAL_DEPOSIT_TYPE", "tiered"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::Pricing(_)));
    }
}
