//! [`YearSource`] reading CSV files from a local directory.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::{SourceError, YearSource, expand_template};

/// Default file name template, e.g. `2023.csv`.
pub const DEFAULT_FILE_TEMPLATE: &str = "{year}.csv";

/// Reads `<dir>/<file_template with {year} expanded>`.
#[derive(Debug, Clone)]
pub struct DirectoryYearSource {
    dir: PathBuf,
    file_template: String,
}

impl DirectoryYearSource {
    /// Creates a source rooted at `dir` using `file_template` for names.
    #[must_use]
    pub fn new(dir: &Path, file_template: &str) -> Self {
        Self {
            dir: dir.to_path_buf(),
            file_template: file_template.to_string(),
        }
    }

    /// Path of the file for `year`.
    #[must_use]
    pub fn year_path(&self, year: &str) -> PathBuf {
        self.dir.join(expand_template(&self.file_template, year))
    }
}

#[async_trait]
impl YearSource for DirectoryYearSource {
    fn describe(&self) -> String {
        self.dir.join(&self.file_template).display().to_string()
    }

    async fn fetch(&self, year: &str) -> Result<String, SourceError> {
        let path = self.year_path(year);
        let bytes = tokio::fs::read(&path).await?;
        log::debug!("Read {} bytes from {}", bytes.len(), path.display());
        // Spreadsheet exports are not always UTF-8; undecodable bytes become U+FFFD.
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reads_year_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("2023.csv"), "Name\nJane\n").unwrap();

        let source = DirectoryYearSource::new(dir.path(), DEFAULT_FILE_TEMPLATE);
        assert_eq!(source.fetch("2023").await.unwrap(), "Name\nJane\n");
    }

    #[tokio::test]
    async fn non_utf8_bytes_are_replaced_not_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("2023.csv"), b"Name,Address\nJos\xE9,Sydney NSW\n").unwrap();

        let source = DirectoryYearSource::new(dir.path(), DEFAULT_FILE_TEMPLATE);
        let text = source.fetch("2023").await.unwrap();
        assert_eq!(text, "Name,Address\nJos\u{FFFD},Sydney NSW\n");
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = DirectoryYearSource::new(dir.path(), DEFAULT_FILE_TEMPLATE);
        assert!(matches!(
            source.fetch("1999").await,
            Err(SourceError::Io(_))
        ));
    }

    #[test]
    fn expands_custom_template() {
        let source = DirectoryYearSource::new(Path::new("/data"), "clients_{year}.csv");
        assert_eq!(
            source.year_path("2022"),
            PathBuf::from("/data/clients_2022.csv")
        );
    }
}
