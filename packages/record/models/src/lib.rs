#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Raw CSV rows and the canonical normalized client record.
//!
//! Every yearly CSV is parsed into [`RawRow`]s and then turned into
//! [`NormalizedRecord`]s, which is the only shape downstream consumers
//! (map, charts, table, analytics) ever see.

use std::collections::BTreeMap;

use propmap_region_models::{Coords, RegionCode};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// CSV column names consumed by the record processor.
pub mod columns {
    /// Client name. Rows without one are dropped.
    pub const NAME: &str = "Name";
    /// Client's own address.
    pub const ADDRESS: &str = "Address";
    /// Address of the purchased property.
    pub const PROPERTY_PURCHASED: &str = "Property Purchased";
    /// Service type (e.g. `"Investment"`).
    pub const SERVICE_TYPE: &str = "Type of Service";
    /// Contract signing date.
    pub const DATE_SIGNED: &str = "Date Signed";
    /// Property purchase date.
    pub const DATE_PURCHASE: &str = "Date of Purchase";
    /// Client email.
    pub const EMAIL: &str = "Email";
    /// Free-form notes.
    pub const NOTES: &str = "Notes";
}

/// Sentinel written into the address column when the contract has no
/// address on file.
pub const NO_ADDRESS_SENTINEL: &str = "No address in contract";

/// Service type assigned when the column is empty.
pub const DEFAULT_SERVICE_TYPE: &str = "Unknown";

/// One CSV row keyed by header name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRow(BTreeMap<String, String>);

impl RawRow {
    /// Creates an empty row.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Sets a column value, trimming surrounding whitespace.
    pub fn insert(&mut self, column: impl Into<String>, value: &str) {
        self.0.insert(column.into(), value.trim().to_string());
    }

    /// Returns the raw value of `column`, if the column exists.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&str> {
        self.0.get(column).map(String::as_str)
    }

    /// Returns the trimmed value of `column`, or `""` when missing.
    #[must_use]
    pub fn field(&self, column: &str) -> &str {
        self.get(column).map_or("", str::trim)
    }

    /// Number of columns in the row.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the row has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: AsRef<str>> FromIterator<(K, V)> for RawRow {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut row = Self::new();
        for (k, v) in iter {
            row.insert(k, v.as_ref());
        }
        row
    }
}

/// How the map renderer should draw a record.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum MapDisplayType {
    /// Client and property markers joined by a line.
    Both,
    /// Client marker only.
    ClientOnly,
    /// Not drawn on the map.
    Skip,
}

impl MapDisplayType {
    /// Classifies a record from its location flags.
    ///
    /// A property without a client location is not drawn: every marker is
    /// anchored on the client.
    #[must_use]
    pub const fn from_flags(has_client_location: bool, has_property_location: bool) -> Self {
        match (has_client_location, has_property_location) {
            (true, true) => Self::Both,
            (true, false) => Self::ClientOnly,
            (false, _) => Self::Skip,
        }
    }
}

/// A client record after cleaning, region classification, and geocoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedRecord {
    /// Client name (never empty).
    pub name: String,
    /// Cleaned client address, possibly empty.
    pub client_address: String,
    /// Cleaned property address, possibly empty.
    pub property_address: String,
    /// Service type, `"Unknown"` when not provided.
    pub service_type: String,
    /// Raw contract signing date.
    pub date_signed: String,
    /// Raw purchase date.
    pub date_purchase: String,
    /// Raw email.
    pub email: String,
    /// Raw notes.
    pub notes: String,
    /// Region of the client address.
    pub client_region: RegionCode,
    /// Region of the property address.
    pub property_region: RegionCode,
    /// Whether the client address column held a usable address.
    pub has_client_location: bool,
    /// Whether the property address column held a usable address.
    pub has_property_location: bool,
    /// Map rendering category derived from the two location flags.
    pub map_display_type: MapDisplayType,
    /// Client coordinates, present iff `has_client_location`.
    pub client_coords: Option<Coords>,
    /// Property coordinates, present iff `has_property_location`.
    pub property_coords: Option<Coords>,
    /// Client and property are in different known regions.
    pub is_interstate: bool,
    /// Source year, set only for records from a multi-year load.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
}

impl NormalizedRecord {
    /// Returns a copy of this record stamped with its source year.
    #[must_use]
    pub fn with_year(mut self, year: &str) -> Self {
        self.year = Some(year.to_string());
        self
    }
}

/// Returns `true` when both regions are known and they differ.
#[must_use]
pub fn is_interstate(client: RegionCode, property: RegionCode) -> bool {
    client.is_known() && property.is_known() && client != property
}
