//! Progress reporting for year loads.
//!
//! Loaders report row counts through [`ProgressCallback`] without knowing
//! how (or whether) they are displayed. Years load concurrently, so a
//! loader asks its [`ProgressFactory`] for a fresh callback per year.

use std::sync::Arc;

/// Sink for the progress of one year's load.
pub trait ProgressCallback: Send + Sync {
    /// Number of rows the load will process.
    fn set_total(&self, rows: u64);

    /// `rows` more rows were processed.
    fn inc(&self, rows: u64);

    /// Replaces the status text.
    fn set_message(&self, msg: String);

    /// The load is done; `summary` describes the outcome.
    fn finish(&self, summary: String);
}

/// Discards every update.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _: u64) {}
    fn inc(&self, _: u64) {}
    fn set_message(&self, _: String) {}
    fn finish(&self, _: String) {}
}

/// A shared [`NullProgress`].
#[must_use]
pub fn null_progress() -> Arc<dyn ProgressCallback> {
    Arc::new(NullProgress)
}

/// Creates a progress callback for the year passed in.
pub type ProgressFactory = Arc<dyn Fn(&str) -> Arc<dyn ProgressCallback> + Send + Sync>;

/// A factory handing out [`NullProgress`] for every year.
#[must_use]
pub fn null_progress_factory() -> ProgressFactory {
    Arc::new(|_: &str| null_progress())
}
