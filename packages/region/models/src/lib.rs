#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Region codes and coordinates shared across the property client map.
//!
//! A [`RegionCode`] identifies one of the eight Australian states and
//! territories, one of the recognized overseas client locations, or
//! [`RegionCode::Unknown`]. The [`centroids`] module holds the static
//! per-region coordinates used when live geocoding is unavailable.

pub mod centroids;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// A latitude/longitude pair (WGS84).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coords {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

impl Coords {
    /// Creates a coordinate pair.
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Closed set of regions a client or property address can belong to.
///
/// The declaration order of the Australian variants is the classification
/// priority order: an address mentioning several state abbreviations is
/// assigned to whichever comes first here.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum RegionCode {
    /// New South Wales
    #[serde(rename = "NSW")]
    #[strum(serialize = "NSW")]
    Nsw,
    /// Victoria
    #[serde(rename = "VIC")]
    #[strum(serialize = "VIC")]
    Vic,
    /// Queensland
    #[serde(rename = "QLD")]
    #[strum(serialize = "QLD")]
    Qld,
    /// Western Australia
    #[serde(rename = "WA")]
    #[strum(serialize = "WA")]
    Wa,
    /// South Australia
    #[serde(rename = "SA")]
    #[strum(serialize = "SA")]
    Sa,
    /// Tasmania
    #[serde(rename = "TAS")]
    #[strum(serialize = "TAS")]
    Tas,
    /// Australian Capital Territory
    #[serde(rename = "ACT")]
    #[strum(serialize = "ACT")]
    Act,
    /// Northern Territory
    #[serde(rename = "NT")]
    #[strum(serialize = "NT")]
    Nt,
    /// Singapore (overseas client)
    Singapore,
    /// Dubai (overseas client)
    Dubai,
    /// Address did not match any known region
    Unknown,
}

impl RegionCode {
    /// Australian states and territories in classification priority order.
    pub const AUSTRALIAN: [Self; 8] = [
        Self::Nsw,
        Self::Vic,
        Self::Qld,
        Self::Wa,
        Self::Sa,
        Self::Tas,
        Self::Act,
        Self::Nt,
    ];

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Nsw,
            Self::Vic,
            Self::Qld,
            Self::Wa,
            Self::Sa,
            Self::Tas,
            Self::Act,
            Self::Nt,
            Self::Singapore,
            Self::Dubai,
            Self::Unknown,
        ]
    }

    /// Returns `true` for every region except [`RegionCode::Unknown`].
    #[must_use]
    pub const fn is_known(self) -> bool {
        !matches!(self, Self::Unknown)
    }

    /// Returns `true` for the recognized overseas client locations.
    #[must_use]
    pub const fn is_overseas(self) -> bool {
        matches!(self, Self::Singapore | Self::Dubai)
    }

    /// Returns the full human-readable name of the region.
    #[must_use]
    pub const fn full_name(self) -> &'static str {
        match self {
            Self::Nsw => "New South Wales",
            Self::Vic => "Victoria",
            Self::Qld => "Queensland",
            Self::Wa => "Western Australia",
            Self::Sa => "South Australia",
            Self::Tas => "Tasmania",
            Self::Act => "Australian Capital Territory",
            Self::Nt => "Northern Territory",
            Self::Singapore => "Singapore",
            Self::Dubai => "Dubai",
            Self::Unknown => "Unknown",
        }
    }
}
