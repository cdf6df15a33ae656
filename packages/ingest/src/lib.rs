#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Loads yearly client CSVs into normalized, geocoded records.
//!
//! The pipeline is assembled explicitly by [`build_pipeline`]:
//!
//! ```text
//! FileStore -> GeocodeCache -> Geocoder -> RecordProcessor
//!           -> YearDataset -> MultiYearAggregator
//! ```
//!
//! Nothing here is global; callers own the [`Pipeline`] and pass its parts
//! where they are needed.

pub mod aggregate;
pub mod config;
pub mod dataset;
pub mod process;

use std::sync::Arc;

use propmap_database::StoreError;
use propmap_database::file_store::FileStore;
use propmap_database::geocode_cache::GeocodeCache;
use propmap_geocoder::nominatim::NominatimService;
use propmap_geocoder::{GeocodeError, Geocoder, GeocoderOptions, GeocodingService};
use propmap_source::YearSource;
use propmap_source::directory::DirectoryYearSource;
use propmap_source::http::HttpYearSource;
use propmap_source::progress::{ProgressFactory, null_progress_factory};

use crate::aggregate::MultiYearAggregator;
use crate::config::{DashboardConfig, SourceConfig, resolve_path};
use crate::dataset::YearDataset;
use crate::process::RecordProcessor;

/// Errors from assembling the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// The cache store could not be opened.
    #[error("Failed to open cache store: {0}")]
    Store(#[from] StoreError),

    /// The geocoding client could not be built.
    #[error("Failed to build geocoder: {0}")]
    Geocoder(#[from] GeocodeError),

    /// The HTTP client for year downloads could not be built.
    #[error("Failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Every long-lived component of a configured pipeline.
#[derive(Debug, Clone)]
pub struct Pipeline {
    /// Persistent address to coordinates cache.
    pub cache: Arc<GeocodeCache>,
    /// Rate-limited resolver used by every year.
    pub geocoder: Geocoder,
    /// Per-year loader and record cache.
    pub dataset: Arc<YearDataset>,
    /// Concurrent loader over [`Self::dataset`].
    pub aggregator: MultiYearAggregator,
}

/// Opens the geocode cache configured in `config`.
///
/// # Errors
///
/// Returns [`BuildError`] if the store directory cannot be created.
pub fn open_cache(config: &DashboardConfig) -> Result<Arc<GeocodeCache>, BuildError> {
    let store = FileStore::open(&resolve_path(&config.cache.dir))?;
    log::debug!("Geocode cache store at {}", store.dir().display());
    Ok(Arc::new(GeocodeCache::load(Arc::new(store), &config.cache.key)))
}

/// Builds the external geocoding service, or `None` when disabled.
///
/// # Errors
///
/// Returns [`BuildError`] if the HTTP client cannot be built.
pub fn geocoding_service(
    config: &DashboardConfig,
) -> Result<Option<Arc<dyn GeocodingService>>, BuildError> {
    let geocoder = &config.geocoder;
    if !geocoder.enabled {
        log::info!("Geocoding disabled, addresses resolve to region centroids");
        return Ok(None);
    }
    let service = NominatimService::new(
        &geocoder.base_url,
        &geocoder.user_agent,
        Some(geocoder.country_codes.as_str()),
    )?;
    Ok(Some(Arc::new(service)))
}

/// Builds the year source configured in `config`.
///
/// # Errors
///
/// Returns [`BuildError`] if the HTTP client cannot be built.
pub fn year_source(config: &DashboardConfig) -> Result<Arc<dyn YearSource>, BuildError> {
    let source: Arc<dyn YearSource> = match &config.source {
        SourceConfig::Http { url_template } => {
            let client = reqwest::Client::builder()
                .user_agent(&config.geocoder.user_agent)
                .build()?;
            Arc::new(HttpYearSource::new(client, url_template))
        }
        SourceConfig::Directory { dir, file_template } => Arc::new(DirectoryYearSource::new(
            &resolve_path(dir),
            file_template,
        )),
    };
    log::debug!("Year source: {}", source.describe());
    Ok(source)
}

/// Wires every component from `config`.
///
/// `progress` hands out one progress callback per year load.
///
/// # Errors
///
/// Returns [`BuildError`] if the cache store or an HTTP client cannot be
/// created.
pub fn build_pipeline(
    config: &DashboardConfig,
    progress: Option<ProgressFactory>,
) -> Result<Pipeline, BuildError> {
    let cache = open_cache(config)?;
    let geocoder = Geocoder::new(
        geocoding_service(config)?,
        cache.clone(),
        GeocoderOptions {
            rate_limit: config.geocoder.rate_limit(),
        },
    );

    let dataset = YearDataset::new(year_source(config)?, RecordProcessor::new(geocoder.clone()))
        .with_progress(progress.unwrap_or_else(null_progress_factory));
    let dataset = Arc::new(dataset);
    let aggregator = MultiYearAggregator::new(dataset.clone());

    Ok(Pipeline {
        cache,
        geocoder,
        dataset,
        aggregator,
    })
}
