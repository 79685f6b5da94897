//! In-memory caching using moka
//!
//! Listings are read on every quote but their daily rate rarely changes, so
//! they are cached briefly. Availability is always read fresh.

use moka::future::Cache;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

use crate::pricing::models::Listing;

/// Application cache holding listing records
#[derive(Clone)]
pub struct AppCache {
    /// Listings (id -> Listing)
    pub listings: Cache<Uuid, Arc<Listing>>,
}

impl AppCache {
    /// Create a new cache instance with configured TTLs
    pub fn new() -> Self {
        Self::with_ttl(Duration::from_secs(5 * 60))
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            // Listings: 1000 entries, 5 min TTL by default
            listings: Cache::builder()
                .max_capacity(1000)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Get cache statistics for monitoring
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            listings_size: self.listings.entry_count(),
        }
    }

    /// Invalidate a specific listing, e.g. after its daily rate changed
    pub async fn invalidate_listing(&self, listing_id: Uuid) {
        self.listings.invalidate(&listing_id).await;
        info!("Cache invalidated for listing: {}", listing_id);
    }
}

impl Default for AppCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache statistics for monitoring endpoint
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub listings_size: u64,
}
