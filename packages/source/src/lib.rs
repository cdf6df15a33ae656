#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Yearly CSV sources and row parsing.
//!
//! Each year of client records lives in its own CSV file. A
//! [`YearSource`] knows how to fetch the text of one year's file;
//! [`csv_rows::parse_rows`] turns that text into [`RawRow`]s keyed by the
//! header row.
//!
//! [`RawRow`]: propmap_record_models::RawRow

pub mod csv_rows;
pub mod directory;
pub mod http;
pub mod progress;
pub mod retry;

use async_trait::async_trait;

/// Placeholder substituted with the year identifier in URL and file name
/// templates.
pub const YEAR_PLACEHOLDER: &str = "{year}";

/// Errors that can occur while fetching or parsing a year's CSV.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("HTTP {status} fetching {url}")]
    Status {
        /// URL that was requested.
        url: String,
        /// Status code returned.
        status: u16,
    },

    /// I/O error (file read).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing failed.
    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    /// The file parsed but has no header row.
    #[error("CSV file contains no header row")]
    MissingHeader,
}

/// Fetches the CSV text for one year.
#[async_trait]
pub trait YearSource: Send + Sync {
    /// Returns a short description of where files come from, for logs.
    fn describe(&self) -> String;

    /// Fetches the raw CSV text for `year`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the file is missing, unreachable, or
    /// answered with a non-success status.
    async fn fetch(&self, year: &str) -> Result<String, SourceError>;
}

/// Replaces every [`YEAR_PLACEHOLDER`] in `template` with `year`.
#[must_use]
pub fn expand_template(template: &str, year: &str) -> String {
    template.replace(YEAR_PLACEHOLDER, year)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_every_placeholder() {
        assert_eq!(
            expand_template("https://x/{year}/clients-{year}.csv", "2023"),
            "https://x/2023/clients-2023.csv"
        );
    }

    #[test]
    fn template_without_placeholder_is_unchanged() {
        assert_eq!(expand_template("clients.csv", "2023"), "clients.csv");
    }

    #[test]
    fn status_error_names_url() {
        let err = SourceError::Status {
            url: "https://x/2023.csv".to_string(),
            status: 404,
        };
        assert_eq!(err.to_string(), "HTTP 404 fetching https://x/2023.csv");
    }
}
