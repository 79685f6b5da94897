//! Request DTOs for rental API endpoints.
//!
//! Field names follow the marketplace frontend (camelCase).

use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use super::error::PricingError;
use super::models::{BookingRequest, DriverVerification};

/// Query string for the availability window
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Request to price a rental
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatePricingRequest {
    pub listing_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default = "default_insurance_type")]
    pub insurance_type: String,
}

fn default_insurance_type() -> String {
    "basic".to_string()
}

impl CalculatePricingRequest {
    /// Parse the free-form insurance type into a typed request.
    pub fn to_booking_request(&self) -> Result<BookingRequest, PricingError> {
        Ok(BookingRequest {
            listing_id: self.listing_id,
            start_date: self.start_date,
            end_date: self.end_date,
            insurance_tier: self.insurance_type.parse()?,
        })
    }
}

/// Driver details submitted with a booking
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverVerificationRequest {
    pub license_number: String,
    pub license_expiry: NaiveDate,
    pub date_of_birth: NaiveDate,
}

impl From<DriverVerificationRequest> for DriverVerification {
    fn from(req: DriverVerificationRequest) -> Self {
        Self {
            license_number: req.license_number.trim().to_string(),
            license_expiry: req.license_expiry,
            date_of_birth: req.date_of_birth,
        }
    }
}

/// Request to create a booking
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    #[serde(flatten)]
    pub pricing: CalculatePricingRequest,
    pub pickup_location: String,
    pub dropoff_location: String,
    pub driver_verification: DriverVerificationRequest,
    #[serde(default)]
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::models::InsuranceTier;

    #[test]
    fn test_pricing_request_from_frontend_json() {
        let req: CalculatePricingRequest = serde_json::from_value(serde_json::json!({
            "listingId": "7f0c2a55-7c0e-4a4e-9d8e-0a4b7c1e2f3a",
            "startDate": "2024-06-01",
            "endDate": "2024-06-04",
            "insuranceType": "premium"
        }))
        .unwrap();

        let booking = req.to_booking_request().unwrap();
        assert_eq!(booking.insurance_tier, InsuranceTier::Premium);
        assert_eq!(booking.start_date, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
    }

    #[test]
    fn test_pricing_request_defaults_to_basic() {
        let req: CalculatePricingRequest = serde_json::from_value(serde_json::json!({
            "listingId": "7f0c2a55-7c0e-4a4e-9d8e-0a4b7c1e2f3a",
            "startDate": "2024-06-01",
            "endDate": "2024-06-02"
        }))
        .unwrap();
        assert_eq!(req.insurance_type, "basic");
    }

    #[test]
    fn test_pricing_request_unknown_tier() {
        let req: CalculatePricingRequest = serde_json::from_value(serde_json::json!({
            "listingId": "7f0c2a55-7c0e-4a4e-9d8e-0a4b7c1e2f3a",
            "startDate": "2024-06-01",
            "endDate": "2024-06-02",
            "insuranceType": "gold"
        }))
        .unwrap();
        assert_eq!(
            req.to_booking_request(),
            Err(PricingError::InvalidInsuranceTier("gold".to_string()))
        );
    }

    #[test]
    fn test_create_booking_request_flattens_pricing_fields() {
        let req: CreateBookingRequest = serde_json::from_value(serde_json::json!({
            "listingId": "7f0c2a55-7c0e-4a4e-9d8e-0a4b7c1e2f3a",
            "startDate": "2024-06-01",
            "endDate": "2024-06-04",
            "insuranceType": "standard",
            "pickupLocation": "Main St showroom",
            "dropoffLocation": "Main St showroom",
            "driverVerification": {
                "licenseNumber": " D1234567 ",
                "licenseExpiry": "2028-03-31",
                "dateOfBirth": "1990-05-17"
            }
        }))
        .unwrap();

        assert_eq!(req.pricing.insurance_type, "standard");
        assert!(req.notes.is_none());
        let driver = DriverVerification::from(req.driver_verification);
        assert_eq!(driver.license_number, "D1234567");
    }
}
