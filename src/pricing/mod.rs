//! Rental pricing engine module.
//!
//! Quotes car rentals from a listing's daily rate, an insurance tier and the
//! listing's availability calendar, and creates bookings from those quotes.

pub mod calculators;
pub mod engine;
pub mod error;
pub mod models;
pub mod policy;
pub mod queries;
pub mod requests;
pub mod responses;
pub mod routes;
pub mod services;
pub mod store;

// Re-export commonly used items
pub use calculators::round_money;
pub use engine::RentalPricingEngine;
pub use error::PricingError;
pub use models::{AvailabilityCalendar, BookingRequest, CalendarEntry, InsuranceTier, PriceBreakdown};
pub use policy::{DepositPolicy, InsuranceRates, PricingConfig};
pub use routes::router;
pub use store::{MemoryStore, PgRentalStore, RentalStore};
