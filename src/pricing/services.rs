//! Pricing service functions with storage access.
//!
//! These functions fetch listings and calendars through the store, then hand
//! the data to the pure engine.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::cache::AppCache;
use crate::error::AppError;

use super::engine::RentalPricingEngine;
use super::error::PricingError;
use super::models::{Booking, BookingRequest, CalendarEntry, Listing, NewBooking};
use super::requests::{CalculatePricingRequest, CreateBookingRequest};
use super::responses::PricingResponse;
use super::store::RentalStore;

/// Longest window the availability endpoint will expand.
pub const MAX_AVAILABILITY_DAYS: i64 = 366;

/// Look up a listing, serving from cache when possible.
pub async fn load_listing(
    store: &dyn RentalStore,
    cache: &AppCache,
    listing_id: Uuid,
) -> Result<Arc<Listing>, AppError> {
    if let Some(cached) = cache.listings.get(&listing_id).await {
        debug!("Cache HIT for listing: {}", listing_id);
        return Ok(cached);
    }
    debug!("Cache MISS for listing: {}", listing_id);

    let listing = store
        .find_listing(listing_id)
        .await?
        .filter(|l| l.active)
        .ok_or_else(|| AppError::NotFound(format!("listing {}", listing_id)))?;

    let listing = Arc::new(listing);
    cache.listings.insert(listing_id, listing.clone()).await;
    Ok(listing)
}

/// Day-by-day availability for `[start, end)`, gaps reported unavailable.
pub async fn availability_window(
    store: &dyn RentalStore,
    cache: &AppCache,
    listing_id: Uuid,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<CalendarEntry>, AppError> {
    let days = (end - start).num_days();
    if days < 1 {
        return Err(PricingError::InvalidRange { start, end }.into());
    }
    if days > MAX_AVAILABILITY_DAYS {
        return Err(AppError::BadRequest(format!(
            "availability window is limited to {} days",
            MAX_AVAILABILITY_DAYS
        )));
    }

    load_listing(store, cache, listing_id).await?;
    let calendar = store.availability(listing_id, start, end).await?;
    Ok(calendar.window(start, end))
}

/// Quote a rental. Unavailable ranges yield `available: false`, not an error.
pub async fn calculate_pricing(
    store: &dyn RentalStore,
    cache: &AppCache,
    engine: &RentalPricingEngine,
    currency: &str,
    req: &CalculatePricingRequest,
) -> Result<PricingResponse, AppError> {
    let request = req.to_booking_request()?;
    let listing = load_listing(store, cache, request.listing_id).await?;
    let calendar = store
        .availability(request.listing_id, request.start_date, request.end_date)
        .await?;

    match engine.calculate_pricing(&request, listing.daily_rate, &calendar) {
        Ok(pricing) => {
            info!(
                listing_id = %request.listing_id,
                start = %request.start_date,
                end = %request.end_date,
                tier = %request.insurance_tier,
                total = %pricing.total_price,
                "Rental quoted"
            );
            Ok(PricingResponse::priced(pricing, listing_currency(&listing, currency)))
        }
        Err(PricingError::UnavailableRange { start, end }) => {
            debug!("Listing {} unavailable for {}..{}", request.listing_id, start, end);
            Ok(PricingResponse::unavailable())
        }
        Err(e) => Err(e.into()),
    }
}

/// Price and persist a booking against a freshly fetched calendar.
pub async fn create_booking(
    store: &dyn RentalStore,
    cache: &AppCache,
    engine: &RentalPricingEngine,
    currency: &str,
    req: CreateBookingRequest,
) -> Result<Booking, AppError> {
    let request = req.pricing.to_booking_request()?;
    validate_booking_details(&req, &request)?;

    let listing = load_listing(store, cache, request.listing_id).await?;
    let calendar = store
        .availability(request.listing_id, request.start_date, request.end_date)
        .await?;
    let pricing = engine.calculate_pricing(&request, listing.daily_rate, &calendar)?;

    let (listing_id, start, end) = (request.listing_id, request.start_date, request.end_date);
    let new_booking = NewBooking {
        request,
        pickup_location: req.pickup_location.trim().to_string(),
        dropoff_location: req.dropoff_location.trim().to_string(),
        driver: req.driver_verification.into(),
        notes: req
            .notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty()),
        pricing,
        currency: listing_currency(&listing, currency),
    };

    match store.reserve(new_booking).await? {
        Some(booking) => {
            info!(
                booking_id = %booking.id,
                listing_id = %listing_id,
                start = %start,
                end = %end,
                total = %booking.total_price,
                "Booking created"
            );
            Ok(booking)
        }
        None => {
            warn!("Booking conflict for listing {} over {}..{}", listing_id, start, end);
            Err(PricingError::UnavailableRange { start, end }.into())
        }
    }
}

fn listing_currency(listing: &Listing, fallback: &str) -> String {
    if listing.currency.trim().is_empty() {
        fallback.to_string()
    } else {
        listing.currency.clone()
    }
}

fn validate_booking_details(
    req: &CreateBookingRequest,
    request: &BookingRequest,
) -> Result<(), AppError> {
    let mut errors = Vec::new();

    if req.pickup_location.trim().is_empty() {
        errors.push("pickupLocation is required");
    }
    if req.dropoff_location.trim().is_empty() {
        errors.push("dropoffLocation is required");
    }
    if req.driver_verification.license_number.trim().is_empty() {
        errors.push("driverVerification.licenseNumber is required");
    }
    if req.driver_verification.license_expiry < request.end_date {
        errors.push("driver license expires before the rental ends");
    }
    if req.driver_verification.date_of_birth >= request.start_date {
        errors.push("driverVerification.dateOfBirth must be in the past");
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::BadRequest(errors.join("; ")))
    }
}
