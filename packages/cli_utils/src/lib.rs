#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Terminal helpers for the `propmap` binary.
//!
//! [`init_logger`] routes `log` output through `indicatif-log-bridge` so
//! log lines never tear the progress bars. [`YearProgress`] draws one bar
//! per loading year, plus an overall bar when several years load at once.

use std::sync::Arc;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use propmap_source::progress::{ProgressCallback, ProgressFactory};

pub use indicatif::MultiProgress;

const SPINNER_TEMPLATE: &str = "{spinner:.cyan} {msg}";
const ROWS_TEMPLATE: &str = "  {msg:<18} {wide_bar:.cyan/dim} {pos}/{len} rows [{eta}]";
const YEARS_TEMPLATE: &str = "{msg} {bar:30.green/dim} {pos}/{len} years [{elapsed_precise}]";

fn style(template: &str, fallback: fn() -> ProgressStyle) -> ProgressStyle {
    ProgressStyle::with_template(template).unwrap_or_else(|_| fallback())
}

/// Progress of one year's rows, shown as a spinner until the row count is
/// known.
pub struct YearProgress {
    rows: ProgressBar,
    years: Option<ProgressBar>,
}

impl YearProgress {
    /// Adds a spinner for `year` to `multi`. When `years` is given it is
    /// advanced once this year finishes.
    #[must_use]
    pub fn new(multi: &MultiProgress, year: &str, years: Option<ProgressBar>) -> Self {
        let rows = multi.add(ProgressBar::new_spinner());
        rows.set_style(style(SPINNER_TEMPLATE, ProgressStyle::default_spinner));
        rows.enable_steady_tick(Duration::from_millis(100));
        rows.set_message(format!("Fetching {year}"));
        Self { rows, years }
    }

    /// Returns a [`ProgressFactory`] drawing a [`YearProgress`] for every
    /// year requested from it. With more than one expected year an overall
    /// bar counts finished years.
    #[must_use]
    pub fn factory(multi: &MultiProgress, expected_years: usize) -> ProgressFactory {
        let years = (expected_years > 1).then(|| {
            let bar = multi.add(ProgressBar::new(expected_years as u64));
            bar.set_style(style(YEARS_TEMPLATE, ProgressStyle::default_bar).progress_chars("=> "));
            bar.set_message("Loading");
            bar
        });
        let multi = multi.clone();

        Arc::new(move |year: &str| -> Arc<dyn ProgressCallback> {
            Arc::new(Self::new(&multi, year, years.clone()))
        })
    }
}

impl ProgressCallback for YearProgress {
    fn set_total(&self, total: u64) {
        self.rows.set_style(style(ROWS_TEMPLATE, ProgressStyle::default_bar).progress_chars("##-"));
        self.rows.set_length(total);
        self.rows.set_position(0);
    }

    fn inc(&self, delta: u64) {
        self.rows.inc(delta);
    }

    fn set_message(&self, msg: String) {
        self.rows.set_message(msg);
    }

    fn finish(&self, msg: String) {
        self.rows.finish_with_message(msg);
        if let Some(years) = &self.years {
            years.inc(1);
            if years.length().is_some_and(|len| years.position() >= len) {
                years.finish_with_message("Loaded");
            }
        }
    }
}

/// Installs `pretty_env_logger` behind `indicatif-log-bridge` and returns
/// the [`MultiProgress`] every bar must be added to.
///
/// `RUST_LOG` controls the filter; without it, `info` and above are shown.
#[must_use]
pub fn init_logger() -> MultiProgress {
    let multi = MultiProgress::new();

    let mut builder = pretty_env_logger::formatted_timed_builder();
    match std::env::var("RUST_LOG") {
        Ok(filters) => builder.parse_filters(&filters),
        Err(_) => builder.filter_level(log::LevelFilter::Info),
    };
    let logger = builder.build();
    let max_level = logger.filter();

    if indicatif_log_bridge::LogWrapper::new(multi.clone(), logger)
        .try_init()
        .is_err()
    {
        log::debug!("Logger already installed");
    }
    log::set_max_level(max_level);

    multi
}
