//! Concurrent multi-year loading.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::future::join_all;
use propmap_record_models::NormalizedRecord;

use crate::dataset::{YearDataset, YearRecords};

/// A year that could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearFailure {
    /// Year that failed to load.
    pub year: String,
    /// Rendered [`crate::dataset::LoadError`].
    pub reason: String,
}

/// Records of several years, plus the years that failed.
#[derive(Debug, Clone, Default)]
pub struct MultiYearResult {
    /// Every loaded record in requested year order, stamped with its year.
    pub combined: Vec<NormalizedRecord>,
    /// Unstamped records per year. Failed years map to an empty list.
    pub by_year: BTreeMap<String, YearRecords>,
    /// Failed years in requested order.
    pub failures: Vec<YearFailure>,
}

impl MultiYearResult {
    /// Number of years that loaded.
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.by_year.len() - self.failures.len()
    }

    /// Number of years that failed.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

/// Loads many years at once on top of a shared [`YearDataset`].
#[derive(Debug, Clone)]
pub struct MultiYearAggregator {
    dataset: Arc<YearDataset>,
}

impl MultiYearAggregator {
    /// Creates an aggregator loading through `dataset`.
    #[must_use]
    pub const fn new(dataset: Arc<YearDataset>) -> Self {
        Self { dataset }
    }

    /// The dataset whose per-year cache this aggregator shares.
    #[must_use]
    pub const fn dataset(&self) -> &Arc<YearDataset> {
        &self.dataset
    }

    /// Loads every year in `years` concurrently.
    ///
    /// A failing year contributes no records and is reported in
    /// [`MultiYearResult::failures`]; the other years are unaffected.
    /// Repeated years are loaded once, at their first position.
    pub async fn load_all(&self, years: &[String]) -> MultiYearResult {
        let mut unique: Vec<&str> = Vec::with_capacity(years.len());
        for year in years {
            if !unique.contains(&year.as_str()) {
                unique.push(year);
            }
        }

        log::info!("Loading {} years: {}", unique.len(), unique.join(", "));

        let outcomes = join_all(unique.iter().map(|year| self.dataset.load(year))).await;

        let mut result = MultiYearResult::default();

        for (year, outcome) in unique.into_iter().zip(outcomes) {
            match outcome {
                Ok(records) => {
                    result.combined.extend(
                        records
                            .iter()
                            .map(|record| record.clone().with_year(year)),
                    );
                    result.by_year.insert(year.to_string(), records);
                }
                Err(e) => {
                    log::warn!("{e}");
                    result.failures.push(YearFailure {
                        year: year.to_string(),
                        reason: e.to_string(),
                    });
                    result
                        .by_year
                        .insert(year.to_string(), Arc::new(Vec::new()));
                }
            }
        }

        let succeeded = result.succeeded();
        let failed = result.failed();
        if succeeded == 0 && failed > 0 {
            log::error!("All {failed} years failed to load");
        } else {
            log::info!(
                "Loaded {succeeded} years ({failed} failed), {} records",
                result.combined.len()
            );
        }

        result
    }
}
