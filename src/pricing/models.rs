//! Domain models for rental pricing.
//!
//! Calendar and quote types are computed on demand; `Listing` and `Booking`
//! map onto database rows via sqlx's FromRow derive.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::calculators::days_in_range;
use super::error::PricingError;

/// Named insurance coverage level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsuranceTier {
    Basic,
    Standard,
    Premium,
    Comprehensive,
}

impl InsuranceTier {
    pub const ALL: [InsuranceTier; 4] = [
        InsuranceTier::Basic,
        InsuranceTier::Standard,
        InsuranceTier::Premium,
        InsuranceTier::Comprehensive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InsuranceTier::Basic => "basic",
            InsuranceTier::Standard => "standard",
            InsuranceTier::Premium => "premium",
            InsuranceTier::Comprehensive => "comprehensive",
        }
    }
}

impl fmt::Display for InsuranceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InsuranceTier {
    type Err = PricingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(InsuranceTier::Basic),
            "standard" => Ok(InsuranceTier::Standard),
            "premium" => Ok(InsuranceTier::Premium),
            "comprehensive" => Ok(InsuranceTier::Comprehensive),
            _ => Err(PricingError::InvalidInsuranceTier(s.to_string())),
        }
    }
}

/// One day of a listing's availability calendar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct CalendarEntry {
    pub date: NaiveDate,
    pub available: bool,
}

/// Read-only availability lookup keyed by date.
///
/// A date listed more than once is only available if every entry agrees.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AvailabilityCalendar {
    days: BTreeMap<NaiveDate, bool>,
}

impl AvailabilityCalendar {
    pub fn new(entries: impl IntoIterator<Item = CalendarEntry>) -> Self {
        let mut days = BTreeMap::new();
        for entry in entries {
            days.entry(entry.date)
                .and_modify(|available: &mut bool| *available &= entry.available)
                .or_insert(entry.available);
        }
        Self { days }
    }

    /// Availability of a single day; `None` when the calendar has no entry.
    pub fn get(&self, date: NaiveDate) -> Option<bool> {
        self.days.get(&date).copied()
    }

    /// Whether the day is known and free. Missing days are unavailable.
    pub fn is_available(&self, date: NaiveDate) -> bool {
        self.get(date).unwrap_or(false)
    }

    /// Dense day-by-day view of `[start, end)`, filling gaps as unavailable.
    pub fn window(&self, start: NaiveDate, end: NaiveDate) -> Vec<CalendarEntry> {
        days_in_range(start, end)
            .map(|date| CalendarEntry {
                date,
                available: self.is_available(date),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

impl FromIterator<CalendarEntry> for AvailabilityCalendar {
    fn from_iter<I: IntoIterator<Item = CalendarEntry>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// A request to price a rental over `[start_date, end_date)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRequest {
    pub listing_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub insurance_tier: InsuranceTier,
}

/// Itemized rental quote.
///
/// `total_price` is what gets charged; `deposit` is held separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceBreakdown {
    #[serde(with = "rust_decimal::serde::str")]
    pub daily_rate: Decimal,
    pub total_days: i64,
    #[serde(with = "rust_decimal::serde::str")]
    pub base_price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub insurance_fee: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub service_fee: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub taxes: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub deposit: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_price: Decimal,
}

/// Rentable listing from rental_listings
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Listing {
    pub id: Uuid,
    pub title: String,
    pub daily_rate: Decimal,
    pub currency: String,
    pub active: bool,
}

/// Driver details captured at booking time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverVerification {
    pub license_number: String,
    pub license_expiry: NaiveDate,
    pub date_of_birth: NaiveDate,
}

/// A priced booking ready to be persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBooking {
    pub request: BookingRequest,
    pub pickup_location: String,
    pub dropoff_location: String,
    pub driver: DriverVerification,
    pub notes: Option<String>,
    pub pricing: PriceBreakdown,
    pub currency: String,
}

/// Booking from rental_bookings
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Booking {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub insurance_tier: String,
    pub pickup_location: String,
    pub dropoff_location: String,
    pub license_number: String,
    pub license_expiry: NaiveDate,
    pub date_of_birth: NaiveDate,
    pub notes: Option<String>,
    pub status: String,
    pub currency: String,
    pub daily_rate: Decimal,
    pub total_days: i64,
    pub base_price: Decimal,
    pub insurance_fee: Decimal,
    pub service_fee: Decimal,
    pub taxes: Decimal,
    pub deposit: Decimal,
    pub total_price: Decimal,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    pub const STATUS_PENDING: &'static str = "pending";

    /// Build the row a store writes for a freshly reserved booking.
    pub fn pending(new: NewBooking, id: Uuid, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            listing_id: new.request.listing_id,
            start_date: new.request.start_date,
            end_date: new.request.end_date,
            insurance_tier: new.request.insurance_tier.to_string(),
            pickup_location: new.pickup_location,
            dropoff_location: new.dropoff_location,
            license_number: new.driver.license_number,
            license_expiry: new.driver.license_expiry,
            date_of_birth: new.driver.date_of_birth,
            notes: new.notes,
            status: Self::STATUS_PENDING.to_string(),
            currency: new.currency,
            daily_rate: new.pricing.daily_rate,
            total_days: new.pricing.total_days,
            base_price: new.pricing.base_price,
            insurance_fee: new.pricing.insurance_fee,
            service_fee: new.pricing.service_fee,
            taxes: new.pricing.taxes,
            deposit: new.pricing.deposit,
            total_price: new.pricing.total_price,
            created_at,
        }
    }

    pub fn pricing(&self) -> PriceBreakdown {
        PriceBreakdown {
            daily_rate: self.daily_rate,
            total_days: self.total_days,
            base_price: self.base_price,
            insurance_fee: self.insurance_fee,
            service_fee: self.service_fee,
            taxes: self.taxes,
            deposit: self.deposit,
            total_price: self.total_price,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn entry(d: u32, available: bool) -> CalendarEntry {
        CalendarEntry { date: date(d), available }
    }

    #[test]
    fn test_insurance_tier_parse() {
        assert_eq!("basic".parse::<InsuranceTier>(), Ok(InsuranceTier::Basic));
        assert_eq!("Premium".parse::<InsuranceTier>(), Ok(InsuranceTier::Premium));
        assert_eq!(
            " comprehensive ".parse::<InsuranceTier>(),
            Ok(InsuranceTier::Comprehensive)
        );
        assert_eq!(
            "gold".parse::<InsuranceTier>(),
            Err(PricingError::InvalidInsuranceTier("gold".to_string()))
        );
    }

    #[test]
    fn test_insurance_tier_display_matches_parse() {
        for tier in InsuranceTier::ALL {
            assert_eq!(tier.to_string().parse::<InsuranceTier>(), Ok(tier));
        }
    }

    #[test]
    fn test_calendar_lookup() {
        let calendar = AvailabilityCalendar::new(vec![entry(2, false), entry(1, true)]);
        assert_eq!(calendar.len(), 2);
        assert!(calendar.is_available(date(1)));
        assert!(!calendar.is_available(date(2)));
        assert_eq!(calendar.get(date(3)), None);
        assert!(!calendar.is_available(date(3)));
    }

    #[test]
    fn test_calendar_duplicate_dates_fail_closed() {
        let calendar: AvailabilityCalendar =
            vec![entry(1, true), entry(1, false), entry(1, true)].into_iter().collect();
        assert_eq!(calendar.get(date(1)), Some(false));
    }

    #[test]
    fn test_calendar_window_fills_gaps() {
        let calendar = AvailabilityCalendar::new(vec![entry(1, true), entry(3, true)]);
        let window = calendar.window(date(1), date(4));
        assert_eq!(window, vec![entry(1, true), entry(2, false), entry(3, true)]);
    }

    #[test]
    fn test_price_breakdown_serializes_camel_case_strings() {
        use rust_decimal_macros::dec;

        let breakdown = PriceBreakdown {
            daily_rate: dec!(75),
            total_days: 3,
            base_price: dec!(225.00),
            insurance_fee: dec!(22.50),
            service_fee: dec!(11.25),
            taxes: dec!(20.70),
            deposit: dec!(45.00),
            total_price: dec!(279.45),
        };
        let json = serde_json::to_value(&breakdown).unwrap();
        assert_eq!(json["basePrice"], "225.00");
        assert_eq!(json["totalDays"], 3);
        assert_eq!(json["totalPrice"], "279.45");
    }
}
