//! Database queries for the rental pricing engine.

use chrono::NaiveDate;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::error::AppError;

use super::models::{Booking, CalendarEntry, Listing, NewBooking};

const BOOKING_COLUMNS: &str = r#"
    id, listing_id, start_date, end_date, insurance_tier,
    pickup_location, dropoff_location,
    license_number, license_expiry, date_of_birth,
    notes, status, currency,
    daily_rate, total_days, base_price, insurance_fee,
    service_fee, taxes, deposit, total_price, created_at
"#;

/// Get a rentable listing by id
pub async fn find_listing(pool: &PgPool, listing_id: Uuid) -> Result<Option<Listing>, AppError> {
    let listing = sqlx::query_as::<_, Listing>(
        r#"
        SELECT id, title, daily_rate, currency, active
        FROM rental_listings
        WHERE id = $1
          AND deleted_at IS NULL
        "#,
    )
    .bind(listing_id)
    .fetch_optional(pool)
    .await?;

    Ok(listing)
}

/// Get calendar entries for a listing within `[start, end)`
pub async fn get_availability(
    pool: &PgPool,
    listing_id: Uuid,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<CalendarEntry>, AppError> {
    let entries = sqlx::query_as::<_, CalendarEntry>(
        r#"
        SELECT date, available
        FROM rental_availability
        WHERE listing_id = $1
          AND date >= $2
          AND date < $3
        ORDER BY date
        "#,
    )
    .bind(listing_id)
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;

    Ok(entries)
}

/// Lock calendar rows for a range until the surrounding transaction ends
pub async fn lock_availability(
    conn: &mut PgConnection,
    listing_id: Uuid,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<CalendarEntry>, AppError> {
    let entries = sqlx::query_as::<_, CalendarEntry>(
        r#"
        SELECT date, available
        FROM rental_availability
        WHERE listing_id = $1
          AND date >= $2
          AND date < $3
        ORDER BY date
        FOR UPDATE
        "#,
    )
    .bind(listing_id)
    .bind(start)
    .bind(end)
    .fetch_all(conn)
    .await?;

    Ok(entries)
}

/// Mark every day in `[start, end)` as booked
pub async fn block_dates(
    conn: &mut PgConnection,
    listing_id: Uuid,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<u64, AppError> {
    let result = sqlx::query(
        r#"
        UPDATE rental_availability
        SET available = FALSE
        WHERE listing_id = $1
          AND date >= $2
          AND date < $3
        "#,
    )
    .bind(listing_id)
    .bind(start)
    .bind(end)
    .execute(conn)
    .await?;

    Ok(result.rows_affected())
}

/// Insert a pending booking and return the stored row
pub async fn insert_booking(
    conn: &mut PgConnection,
    booking: &NewBooking,
) -> Result<Booking, AppError> {
    let sql = format!(
        r#"
        INSERT INTO rental_bookings (
            id, listing_id, start_date, end_date, insurance_tier,
            pickup_location, dropoff_location,
            license_number, license_expiry, date_of_birth,
            notes, status, currency,
            daily_rate, total_days, base_price, insurance_fee,
            service_fee, taxes, deposit, total_price
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13,
                $14, $15, $16, $17, $18, $19, $20, $21)
        RETURNING {}
        "#,
        BOOKING_COLUMNS
    );

    let request = &booking.request;
    let pricing = &booking.pricing;

    let row = sqlx::query_as::<_, Booking>(&sql)
        .bind(Uuid::new_v4())
        .bind(request.listing_id)
        .bind(request.start_date)
        .bind(request.end_date)
        .bind(request.insurance_tier.as_str())
        .bind(&booking.pickup_location)
        .bind(&booking.dropoff_location)
        .bind(&booking.driver.license_number)
        .bind(booking.driver.license_expiry)
        .bind(booking.driver.date_of_birth)
        .bind(&booking.notes)
        .bind(Booking::STATUS_PENDING)
        .bind(&booking.currency)
        .bind(pricing.daily_rate)
        .bind(pricing.total_days)
        .bind(pricing.base_price)
        .bind(pricing.insurance_fee)
        .bind(pricing.service_fee)
        .bind(pricing.taxes)
        .bind(pricing.deposit)
        .bind(pricing.total_price)
        .fetch_one(conn)
        .await?;

    Ok(row)
}
