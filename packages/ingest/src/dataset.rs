//! One year's records: fetch, parse, normalize, cache.
//!
//! The first [`YearDataset::load`] of a year fetches its CSV, processes
//! every row in file order, and caches the resulting records for the
//! lifetime of the dataset. Concurrent loads of the same uncached year
//! share one in-flight load, so each year is fetched and geocoded at most
//! once until it is invalidated.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use propmap_record_models::NormalizedRecord;
use propmap_source::csv_rows::parse_rows;
use propmap_source::progress::{ProgressFactory, null_progress_factory};
use propmap_source::{SourceError, YearSource};
use tokio::sync::OnceCell;

use crate::process::RecordProcessor;

/// Records of one year, shared with every caller that loaded it.
pub type YearRecords = Arc<Vec<NormalizedRecord>>;

/// Errors from loading a single year.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The year's source file could not be fetched.
    #[error("Failed to fetch data for {year}: {source}")]
    Fetch {
        /// Year that failed.
        year: String,
        /// Underlying cause.
        source: SourceError,
    },

    /// The year's source file could not be parsed as CSV.
    #[error("Failed to parse data for {year}: {source}")]
    Parse {
        /// Year that failed.
        year: String,
        /// Underlying cause.
        source: SourceError,
    },
}

impl LoadError {
    /// The year this error belongs to.
    #[must_use]
    pub fn year(&self) -> &str {
        match self {
            Self::Fetch { year, .. } | Self::Parse { year, .. } => year,
        }
    }
}

type Slot = Arc<OnceCell<YearRecords>>;

/// Loads and caches normalized records per year.
pub struct YearDataset {
    source: Arc<dyn YearSource>,
    processor: RecordProcessor,
    progress: ProgressFactory,
    slots: Mutex<BTreeMap<String, Slot>>,
}

impl std::fmt::Debug for YearDataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YearDataset")
            .field("source", &self.source.describe())
            .field("cached_years", &self.cached_years())
            .finish_non_exhaustive()
    }
}

impl YearDataset {
    /// Creates a dataset reading from `source` and normalizing with
    /// `processor`.
    #[must_use]
    pub fn new(source: Arc<dyn YearSource>, processor: RecordProcessor) -> Self {
        Self {
            source,
            processor,
            progress: null_progress_factory(),
            slots: Mutex::new(BTreeMap::new()),
        }
    }

    /// Reports per-row progress of each year to a callback made by
    /// `progress`.
    #[must_use]
    pub fn with_progress(mut self, progress: ProgressFactory) -> Self {
        self.progress = progress;
        self
    }

    fn slots(&self) -> MutexGuard<'_, BTreeMap<String, Slot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the records for `year`, loading them on first use.
    ///
    /// A cached year is returned as-is without fetching or geocoding
    /// again. A failed load caches nothing, so the next call retries.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] naming the year if its file cannot be
    /// fetched or parsed.
    pub async fn load(&self, year: &str) -> Result<YearRecords, LoadError> {
        let slot = self.slots().entry(year.to_string()).or_default().clone();

        if let Some(records) = slot.get() {
            log::debug!("{year}: serving {} cached records", records.len());
            return Ok(records.clone());
        }

        let records = slot.get_or_try_init(|| self.fetch_and_process(year)).await?;
        Ok(records.clone())
    }

    async fn fetch_and_process(&self, year: &str) -> Result<YearRecords, LoadError> {
        let progress = (self.progress)(year);
        progress.set_message(format!("Fetching {year}"));

        let fetched = self.source.fetch(year).await;
        let text = match fetched {
            Ok(text) => text,
            Err(source) => {
                progress.finish(format!("{year}: fetch failed"));
                return Err(LoadError::Fetch {
                    year: year.to_string(),
                    source,
                });
            }
        };

        let rows = match parse_rows(&text) {
            Ok(rows) => rows,
            Err(source) => {
                progress.finish(format!("{year}: parse failed"));
                return Err(LoadError::Parse {
                    year: year.to_string(),
                    source,
                });
            }
        };

        let total = rows.len();
        progress.set_total(total as u64);
        progress.set_message(format!("Processing {year}"));

        // One row at a time; every lookup goes through the rate-limited geocoder.
        let mut records = Vec::with_capacity(total);
        for row in &rows {
            if let Some(record) = self.processor.process(row, year).await {
                records.push(record);
            }
            progress.inc(1);
        }

        let stats = self.processor.geocoder().stats();
        log::info!(
            "{year}: {} records from {total} rows ({} dropped); geocoder so far: \
             {} cached, {} resolved, {} fallbacks",
            records.len(),
            total - records.len(),
            stats.cache_hits,
            stats.resolved,
            stats.fallbacks,
        );
        progress.finish(format!("{year}: {} records", records.len()));

        Ok(Arc::new(records))
    }

    /// Forgets the cached records for `year` without fetching again.
    pub fn invalidate(&self, year: &str) {
        if self.slots().remove(year).is_some() {
            log::debug!("{year}: invalidated");
        }
    }

    /// Forgets every cached year.
    pub fn reset(&self) {
        self.slots().clear();
    }

    /// Returns `true` if `year` has been loaded and not invalidated.
    #[must_use]
    pub fn is_cached(&self, year: &str) -> bool {
        self.slots()
            .get(year)
            .is_some_and(|slot| slot.initialized())
    }

    /// Years currently cached, in ascending order.
    #[must_use]
    pub fn cached_years(&self) -> Vec<String> {
        self.slots()
            .iter()
            .filter(|(_, slot)| slot.initialized())
            .map(|(year, _)| year.clone())
            .collect()
    }
}
