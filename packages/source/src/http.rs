//! [`YearSource`] downloading CSV files over HTTP.

use async_trait::async_trait;

use crate::retry::{self, RetryPolicy};
use crate::{SourceError, YearSource, expand_template};

/// Downloads `url_template` with `{year}` expanded.
#[derive(Debug, Clone)]
pub struct HttpYearSource {
    client: reqwest::Client,
    url_template: String,
    retry: RetryPolicy,
}

impl HttpYearSource {
    /// Creates a source for `url_template` (e.g.
    /// `"https://example.com/data/{year}.csv"`).
    #[must_use]
    pub fn new(client: reqwest::Client, url_template: &str) -> Self {
        Self {
            client,
            url_template: url_template.to_string(),
            retry: RetryPolicy::default(),
        }
    }

    /// Overrides the retry policy.
    #[must_use]
    pub const fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// URL of the file for `year`.
    #[must_use]
    pub fn year_url(&self, year: &str) -> String {
        expand_template(&self.url_template, year)
    }
}

#[async_trait]
impl YearSource for HttpYearSource {
    fn describe(&self) -> String {
        self.url_template.clone()
    }

    async fn fetch(&self, year: &str) -> Result<String, SourceError> {
        let url = self.year_url(year);
        log::info!("Fetching {year} from {url}");
        retry::send_text(&self.retry, || self.client.get(&url)).await
    }
}
