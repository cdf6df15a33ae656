#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Geocoding for client and property addresses.
//!
//! Converts addresses to latitude/longitude coordinates in three tiers:
//!
//! 1. **Persistent cache**: a [`GeocodeCache`] hit never touches the
//!    network.
//! 2. **External service**: any [`GeocodingService`] (by default
//!    [`nominatim::NominatimService`]). Calls are serialized through a
//!    single-permit semaphore and spaced by a minimum interval so the
//!    service's rate limit is respected no matter how many datasets load
//!    at once.
//! 3. **Fallback centroid**: when the service is unavailable or finds
//!    nothing, [`Geocoder::resolve_or_fallback`] substitutes the static
//!    centroid of the address's region.
//!
//! Geocoding failures are never surfaced to callers.
//!
//! Also provides address cleaning and region classification in
//! [`address`].

pub mod address;
pub mod nominatim;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use propmap_database::geocode_cache::GeocodeCache;
use propmap_region_models::centroids::fallback_centroid;
use propmap_region_models::{Coords, RegionCode};
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::time::Instant;

/// Errors from geocoding operations.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response parsing failed.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },

    /// Rate limit exceeded.
    #[error("Rate limit exceeded")]
    RateLimited,
}

/// An external address-to-coordinate lookup.
#[async_trait]
pub trait GeocodingService: Send + Sync {
    /// Resolves a free-form address.
    ///
    /// Returns `Ok(None)` when the service has no (or no unambiguous)
    /// match.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] if the request or response parsing fails.
    async fn lookup(&self, address: &str) -> Result<Option<Coords>, GeocodeError>;

    /// Short identifier used in log messages.
    fn name(&self) -> &'static str {
        "geocoder"
    }
}

/// Tunables for a [`Geocoder`].
#[derive(Debug, Clone, Copy, Default)]
pub struct GeocoderOptions {
    /// Minimum delay between the starts of two external lookups.
    pub rate_limit: Duration,
}

/// Counters describing how addresses were resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GeocodeStats {
    /// Answered from the cache.
    pub cache_hits: u64,
    /// Answered by the external service (and then cached).
    pub resolved: u64,
    /// Service returned no match or failed.
    pub misses: u64,
    /// Resolved to a region centroid by [`Geocoder::resolve_or_fallback`].
    pub fallbacks: u64,
}

#[derive(Debug, Default)]
struct StatCounters {
    cache_hits: AtomicU64,
    resolved: AtomicU64,
    misses: AtomicU64,
    fallbacks: AtomicU64,
}

/// Cached, rate-limited address resolver.
///
/// Cloning is cheap; clones share the cache, the rate-limit gate, and the
/// statistics.
#[derive(Clone)]
pub struct Geocoder {
    service: Option<Arc<dyn GeocodingService>>,
    cache: Arc<GeocodeCache>,
    gate: Arc<Semaphore>,
    last_call: Arc<Mutex<Option<Instant>>>,
    rate_limit: Duration,
    stats: Arc<StatCounters>,
}

impl std::fmt::Debug for Geocoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Geocoder")
            .field("service", &self.service.as_ref().map(|s| s.name()))
            .field("cache", &self.cache)
            .field("rate_limit", &self.rate_limit)
            .finish_non_exhaustive()
    }
}

impl Geocoder {
    /// Creates a geocoder. Pass `None` for `service` when no external
    /// geocoding is available; every lookup then resolves to a fallback.
    #[must_use]
    pub fn new(
        service: Option<Arc<dyn GeocodingService>>,
        cache: Arc<GeocodeCache>,
        options: GeocoderOptions,
    ) -> Self {
        Self {
            service,
            cache,
            gate: Arc::new(Semaphore::new(1)),
            last_call: Arc::new(Mutex::new(None)),
            rate_limit: options.rate_limit,
            stats: Arc::new(StatCounters::default()),
        }
    }

    /// The cache this geocoder reads and writes.
    #[must_use]
    pub fn cache(&self) -> &Arc<GeocodeCache> {
        &self.cache
    }

    /// Returns `true` if an external service is configured.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.service.is_some()
    }

    /// Resolves `address` to coordinates, or `None` if it cannot be.
    ///
    /// Empty addresses and a missing service short-circuit to `None`. A
    /// cache hit returns without calling the service. Successful lookups
    /// are cached; misses and errors are not, so they are retried on the
    /// next call.
    pub async fn resolve(&self, address: &str, fallback_region: RegionCode) -> Option<Coords> {
        let address = address.trim();
        if address.is_empty() {
            return None;
        }
        let service = self.service.as_ref()?;

        if let Some(coords) = self.cached(address) {
            return Some(coords);
        }

        // Semaphore is never closed, so acquire only fails on programmer
        // error; treat it like a miss.
        let Ok(_permit) = self.gate.acquire().await else {
            return None;
        };

        // Another task may have resolved the address while we waited.
        if let Some(coords) = self.cached(address) {
            return Some(coords);
        }

        self.wait_for_slot().await;

        match service.lookup(address).await {
            Ok(Some(coords)) => {
                log::debug!(
                    "{}: resolved '{address}' to ({}, {})",
                    service.name(),
                    coords.lat,
                    coords.lng
                );
                self.cache.put(address, coords);
                self.stats.resolved.fetch_add(1, Ordering::Relaxed);
                Some(coords)
            }
            Ok(None) => {
                log::debug!(
                    "{}: no match for '{address}' (region {fallback_region})",
                    service.name()
                );
                self.stats.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
            Err(e) => {
                log::warn!("{} error for '{address}': {e}", service.name());
                self.stats.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Resolves `address`, substituting the centroid of `fallback_region`
    /// when it cannot be geocoded. Always yields a coordinate.
    pub async fn resolve_or_fallback(&self, address: &str, fallback_region: RegionCode) -> Coords {
        if let Some(coords) = self.resolve(address, fallback_region).await {
            return coords;
        }
        self.stats.fallbacks.fetch_add(1, Ordering::Relaxed);
        fallback_centroid(fallback_region)
    }

    /// Snapshot of the resolution counters.
    #[must_use]
    pub fn stats(&self) -> GeocodeStats {
        GeocodeStats {
            cache_hits: self.stats.cache_hits.load(Ordering::Relaxed),
            resolved: self.stats.resolved.load(Ordering::Relaxed),
            misses: self.stats.misses.load(Ordering::Relaxed),
            fallbacks: self.stats.fallbacks.load(Ordering::Relaxed),
        }
    }

    fn cached(&self, address: &str) -> Option<Coords> {
        let coords = self.cache.get(address)?;
        self.stats.cache_hits.fetch_add(1, Ordering::Relaxed);
        Some(coords)
    }

    /// Sleeps until `rate_limit` has elapsed since the previous external
    /// call, then records the current call. Must be called while holding
    /// the gate permit.
    async fn wait_for_slot(&self) {
        let previous = *self
            .last_call
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(previous) = previous {
            let ready_at = previous + self.rate_limit;
            if ready_at > Instant::now() {
                tokio::time::sleep_until(ready_at).await;
            }
        }

        *self
            .last_call
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(Instant::now());
    }
}
