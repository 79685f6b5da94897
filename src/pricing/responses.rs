//! Response DTOs for rental API endpoints.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::models::{Booking, PriceBreakdown};

/// Response for a pricing calculation.
///
/// `pricing` is omitted when the range is not bookable.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingResponse {
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pricing: Option<PriceBreakdown>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

impl PricingResponse {
    pub fn unavailable() -> Self {
        Self {
            available: false,
            pricing: None,
            currency: None,
        }
    }

    pub fn priced(pricing: PriceBreakdown, currency: String) -> Self {
        Self {
            available: true,
            pricing: Some(pricing),
            currency: Some(currency),
        }
    }
}

/// Response for a created booking
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub insurance_type: String,
    pub pickup_location: String,
    pub dropoff_location: String,
    pub notes: Option<String>,
    pub status: String,
    pub currency: String,
    pub pricing: PriceBreakdown,
    pub created_at: DateTime<Utc>,
}

impl From<Booking> for BookingResponse {
    fn from(booking: Booking) -> Self {
        let pricing = booking.pricing();
        Self {
            id: booking.id,
            listing_id: booking.listing_id,
            start_date: booking.start_date,
            end_date: booking.end_date,
            insurance_type: booking.insurance_tier,
            pickup_location: booking.pickup_location,
            dropoff_location: booking.dropoff_location,
            notes: booking.notes,
            status: booking.status,
            currency: booking.currency,
            pricing,
            created_at: booking.created_at,
        }
    }
}

/// Generic pricing error response
#[derive(Debug, Serialize)]
pub struct PricingErrorResponse {
    pub error_type: String,
    pub message: String,
}
