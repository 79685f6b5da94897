//! Persistence for listings, calendars and bookings.
//!
//! The engine never talks to storage; services go through [`RentalStore`]
//! so Postgres and the in-memory store are interchangeable.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::PgPool;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::AppError;

use super::calculators::days_in_range;
use super::models::{AvailabilityCalendar, Booking, CalendarEntry, Listing, NewBooking};
use super::queries;

#[async_trait]
pub trait RentalStore: Send + Sync {
    async fn find_listing(&self, listing_id: Uuid) -> Result<Option<Listing>, AppError>;

    /// Calendar entries for `[start, end)`. Days without a row are absent.
    async fn availability(
        &self,
        listing_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<AvailabilityCalendar, AppError>;

    /// Atomically re-check the range and persist the booking.
    ///
    /// Returns `None` when any day was taken since the caller priced it.
    async fn reserve(&self, booking: NewBooking) -> Result<Option<Booking>, AppError>;
}

fn range_is_free(calendar: &AvailabilityCalendar, start: NaiveDate, end: NaiveDate) -> bool {
    days_in_range(start, end).all(|day| calendar.is_available(day))
}

/// Postgres-backed store
#[derive(Clone)]
pub struct PgRentalStore {
    pool: PgPool,
}

impl PgRentalStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RentalStore for PgRentalStore {
    async fn find_listing(&self, listing_id: Uuid) -> Result<Option<Listing>, AppError> {
        queries::find_listing(&self.pool, listing_id).await
    }

    async fn availability(
        &self,
        listing_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<AvailabilityCalendar, AppError> {
        let entries = queries::get_availability(&self.pool, listing_id, start, end).await?;
        Ok(AvailabilityCalendar::new(entries))
    }

    async fn reserve(&self, booking: NewBooking) -> Result<Option<Booking>, AppError> {
        let (listing_id, start, end) = (
            booking.request.listing_id,
            booking.request.start_date,
            booking.request.end_date,
        );

        let mut tx = self.pool.begin().await?;

        let locked = queries::lock_availability(&mut *tx, listing_id, start, end).await?;
        if !range_is_free(&AvailabilityCalendar::new(locked), start, end) {
            tx.rollback().await?;
            return Ok(None);
        }

        let row = queries::insert_booking(&mut *tx, &booking).await?;
        queries::block_dates(&mut *tx, listing_id, start, end).await?;
        tx.commit().await?;

        Ok(Some(row))
    }
}

#[derive(Default)]
struct MemoryState {
    listings: HashMap<Uuid, Listing>,
    calendars: HashMap<Uuid, BTreeMap<NaiveDate, bool>>,
    bookings: Vec<Booking>,
}

/// In-memory store for tests and local development
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_listing(&self, listing: Listing) {
        self.state.write().await.listings.insert(listing.id, listing);
    }

    /// Upsert calendar days for a listing.
    pub async fn set_availability(
        &self,
        listing_id: Uuid,
        entries: impl IntoIterator<Item = CalendarEntry>,
    ) {
        let mut state = self.state.write().await;
        let calendar = state.calendars.entry(listing_id).or_default();
        for entry in entries {
            calendar.insert(entry.date, entry.available);
        }
    }

    pub async fn bookings(&self) -> Vec<Booking> {
        self.state.read().await.bookings.clone()
    }
}

#[async_trait]
impl RentalStore for MemoryStore {
    async fn find_listing(&self, listing_id: Uuid) -> Result<Option<Listing>, AppError> {
        Ok(self.state.read().await.listings.get(&listing_id).cloned())
    }

    async fn availability(
        &self,
        listing_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<AvailabilityCalendar, AppError> {
        if start >= end {
            return Ok(AvailabilityCalendar::default());
        }
        let state = self.state.read().await;
        let calendar = match state.calendars.get(&listing_id) {
            Some(days) => days
                .range(start..end)
                .map(|(date, available)| CalendarEntry {
                    date: *date,
                    available: *available,
                })
                .collect(),
            None => AvailabilityCalendar::default(),
        };
        Ok(calendar)
    }

    async fn reserve(&self, booking: NewBooking) -> Result<Option<Booking>, AppError> {
        let (listing_id, start, end) = (
            booking.request.listing_id,
            booking.request.start_date,
            booking.request.end_date,
        );

        // Single write guard covers check and update.
        let mut state = self.state.write().await;
        let Some(days) = state.calendars.get_mut(&listing_id) else {
            return Ok(None);
        };
        if !days_in_range(start, end).all(|day| days.get(&day).copied().unwrap_or(false)) {
            return Ok(None);
        }
        for day in days_in_range(start, end) {
            days.insert(day, false);
        }

        let row = Booking::pending(booking, Uuid::new_v4(), Utc::now());
        state.bookings.push(row.clone());
        Ok(Some(row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::models::{BookingRequest, DriverVerification, InsuranceTier, PriceBreakdown};
    use rust_decimal_macros::dec;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn new_booking(listing_id: Uuid, start: u32, end: u32) -> NewBooking {
        NewBooking {
            request: BookingRequest {
                listing_id,
                start_date: date(start),
                end_date: date(end),
                insurance_tier: InsuranceTier::Basic,
            },
            pickup_location: "Downtown lot".to_string(),
            dropoff_location: "Airport".to_string(),
            driver: DriverVerification {
                license_number: "D1234567".to_string(),
                license_expiry: NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
                date_of_birth: NaiveDate::from_ymd_opt(1990, 5, 17).unwrap(),
            },
            notes: None,
            pricing: PriceBreakdown {
                daily_rate: dec!(50),
                total_days: i64::from(end - start),
                base_price: dec!(50) * rust_decimal::Decimal::from(end - start),
                insurance_fee: dec!(0),
                service_fee: dec!(0),
                taxes: dec!(0),
                deposit: dec!(0),
                total_price: dec!(50) * rust_decimal::Decimal::from(end - start),
            },
            currency: "USD".to_string(),
        }
    }

    async fn store_with_open_days(listing_id: Uuid, from: u32, to: u32) -> MemoryStore {
        let store = MemoryStore::new();
        store
            .set_availability(
                listing_id,
                (from..to).map(|d| CalendarEntry { date: date(d), available: true }),
            )
            .await;
        store
    }

    #[test]
    fn test_locked_range_with_gap_is_not_free() {
        // Rows for days 1 and 3 are locked; day 2 has no row at all.
        let locked = AvailabilityCalendar::new(vec![
            CalendarEntry { date: date(1), available: true },
            CalendarEntry { date: date(3), available: true },
        ]);
        assert!(!range_is_free(&locked, date(1), date(4)));
        assert!(range_is_free(&locked, date(1), date(2)));
        assert!(range_is_free(&locked, date(3), date(4)));
    }

    #[test]
    fn test_locked_range_with_booked_day_is_not_free() {
        let locked = AvailabilityCalendar::new(vec![
            CalendarEntry { date: date(1), available: true },
            CalendarEntry { date: date(2), available: false },
            CalendarEntry { date: date(3), available: true },
        ]);
        assert!(!range_is_free(&locked, date(1), date(4)));
        assert!(!range_is_free(&AvailabilityCalendar::default(), date(1), date(2)));
    }

    #[tokio::test]
    async fn test_memory_availability_is_half_open() {
        let id = Uuid::new_v4();
        let store = store_with_open_days(id, 1, 10).await;

        let calendar = store.availability(id, date(2), date(5)).await.unwrap();
        assert_eq!(calendar.len(), 3);
        assert_eq!(calendar.get(date(5)), None);
    }

    #[tokio::test]
    async fn test_memory_reserve_blocks_dates() {
        let id = Uuid::new_v4();
        let store = store_with_open_days(id, 1, 10).await;

        let booking = store.reserve(new_booking(id, 2, 5)).await.unwrap().unwrap();
        assert_eq!(booking.status, "pending");
        assert_eq!(booking.total_days, 3);

        let calendar = store.availability(id, date(1), date(10)).await.unwrap();
        assert!(calendar.is_available(date(1)));
        assert!(!calendar.is_available(date(2)));
        assert!(!calendar.is_available(date(4)));
        assert!(calendar.is_available(date(5)));
        assert_eq!(store.bookings().await.len(), 1);
    }

    #[tokio::test]
    async fn test_memory_reserve_rejects_overlap() {
        let id = Uuid::new_v4();
        let store = store_with_open_days(id, 1, 10).await;

        assert!(store.reserve(new_booking(id, 2, 5)).await.unwrap().is_some());
        assert!(store.reserve(new_booking(id, 4, 6)).await.unwrap().is_none());
        // Back-to-back is fine: checkout day 5 is free.
        assert!(store.reserve(new_booking(id, 5, 7)).await.unwrap().is_some());
        assert_eq!(store.bookings().await.len(), 2);
    }

    #[tokio::test]
    async fn test_memory_reserve_unknown_calendar() {
        let store = MemoryStore::new();
        let result = store.reserve(new_booking(Uuid::new_v4(), 1, 2)).await.unwrap();
        assert!(result.is_none());
    }
}
