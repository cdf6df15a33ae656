//! CSV text to [`RawRow`] parsing.
//!
//! Every record becomes a [`RawRow`] keyed by the trimmed column headers
//! from the first row. Short records are padded with empty values and
//! extra trailing fields are ignored, matching how spreadsheet exports
//! tend to drift.

use propmap_record_models::RawRow;

use crate::SourceError;

/// Parses CSV text into rows keyed by header.
///
/// Fully blank lines are skipped. A leading UTF-8 byte order mark is
/// ignored.
///
/// # Errors
///
/// Returns [`SourceError`] if the CSV is malformed or has no header row.
pub fn parse_rows(text: &str) -> Result<Vec<RawRow>, SourceError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_owned())
        .collect();

    if headers.iter().all(String::is_empty) {
        return Err(SourceError::MissingHeader);
    }

    let mut rows = Vec::new();

    for result in reader.records() {
        let record = result?;
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }

        let row: RawRow = headers
            .iter()
            .enumerate()
            .filter(|(_, header)| !header.is_empty())
            .map(|(i, header)| (header.as_str(), record.get(i).unwrap_or("")))
            .collect();
        rows.push(row);
    }

    log::debug!("Parsed {} rows with {} columns", rows.len(), headers.len());

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use propmap_record_models::columns;

    use super::*;

    #[test]
    fn parses_rows_by_header() {
        let text = "Name,Address,Type of Service\n\
                    Jane Doe,\"1 George St\nSydney NSW\",Investment\n\
                    John Roe,,\n";
        let rows = parse_rows(text).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].field(columns::NAME), "Jane Doe");
        assert_eq!(rows[0].field(columns::ADDRESS), "1 George St\nSydney NSW");
        assert_eq!(rows[0].field(columns::SERVICE_TYPE), "Investment");
        assert_eq!(rows[1].field(columns::ADDRESS), "");
    }

    #[test]
    fn trims_headers_and_values() {
        let text = " Name , Email \n  Jane  ,  jane@example.com \n";
        let rows = parse_rows(text).unwrap();
        assert_eq!(rows[0].field(columns::NAME), "Jane");
        assert_eq!(rows[0].field(columns::EMAIL), "jane@example.com");
    }

    #[test]
    fn pads_short_records() {
        let text = "Name,Address,Notes\nJane\n";
        let rows = parse_rows(text).unwrap();
        assert_eq!(rows[0].get(columns::NOTES), Some(""));
    }

    #[test]
    fn skips_blank_records() {
        let text = "Name,Address\n,\nJane,x\n";
        let rows = parse_rows(text).unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn strips_byte_order_mark() {
        let text = "\u{feff}Name\nJane\n";
        let rows = parse_rows(text).unwrap();
        assert_eq!(rows[0].field(columns::NAME), "Jane");
    }

    #[test]
    fn empty_input_has_no_header() {
        assert!(matches!(parse_rows(""), Err(SourceError::MissingHeader)));
    }

    #[test]
    fn header_only_yields_no_rows() {
        assert!(parse_rows("Name,Address\n").unwrap().is_empty());
    }
}
