#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Summary statistics and insight types for a set of client records.
//!
//! Breakdowns are ordered lists rather than maps: entries appear in the
//! order their key was first seen in the records, which is the order the
//! dashboard renders them in.

use propmap_region_models::RegionCode;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Value of [`AnalyticsResult::top_region`] when there are no records.
pub const NO_TOP_REGION: &str = "N/A";

/// Service type name counted towards the investment rate.
pub const INVESTMENT_SERVICE_TYPE: &str = "Investment";

/// Aggregate view of a record set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsResult {
    /// Number of records.
    pub total_clients: u64,
    /// Records with a non-empty property address.
    pub total_properties: u64,
    /// Records whose client and property are in different known regions.
    pub interstate_sales: u64,
    /// Interstate sales as a percentage of properties, one decimal.
    pub interstate_rate: f64,
    /// Investment clients as a percentage of all clients, one decimal.
    pub investment_rate: f64,
    /// Records per service type, in first-seen order.
    pub service_types: Vec<ServiceTypeCount>,
    /// Client and property counts per region, in first-seen order.
    pub region_stats: Vec<RegionStats>,
    /// Region with the most clients plus properties, or [`NO_TOP_REGION`].
    pub top_region: String,
    /// Findings in rule order.
    pub insights: Vec<Insight>,
}

impl AnalyticsResult {
    /// Count for `service_type`, or zero.
    #[must_use]
    pub fn service_type_count(&self, service_type: &str) -> u64 {
        self.service_types
            .iter()
            .find(|s| s.service_type == service_type)
            .map_or(0, |s| s.count)
    }

    /// Stats for `region`, if any record mentions it.
    #[must_use]
    pub fn region(&self, region: RegionCode) -> Option<&RegionStats> {
        self.region_stats.iter().find(|r| r.region == region)
    }
}

/// Number of records with one service type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceTypeCount {
    /// Value of the "Type of Service" column.
    pub service_type: String,
    /// Records with that value.
    pub count: u64,
}

/// Client and property counts for one region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionStats {
    /// Region the counts belong to.
    pub region: RegionCode,
    /// Records whose client lives here.
    pub clients: u64,
    /// Records whose property is here.
    pub properties: u64,
}

impl RegionStats {
    /// Clients plus properties.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.clients + self.properties
    }
}

/// Tone of an [`Insight`].
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
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum InsightType {
    /// Neutral observation.
    Info,
    /// Favourable trend.
    Positive,
}

/// A human-readable finding derived from the statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
    /// Tone, serialized as `type`.
    #[serde(rename = "type")]
    pub insight_type: InsightType,
    /// Short heading.
    pub title: String,
    /// One-sentence finding with the numbers filled in.
    pub message: String,
}

impl Insight {
    /// Creates an insight with a static `title`.
    #[must_use]
    pub fn new(insight_type: InsightType, title: &str, message: String) -> Self {
        Self {
            insight_type,
            title: title.to_string(),
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insight_serializes_type_field() {
        let insight = Insight::new(InsightType::Positive, "Investment Focus", "x".to_string());
        let json = serde_json::to_value(&insight).unwrap();
        assert_eq!(json["type"], "positive");
        assert_eq!(json["title"], "Investment Focus");
    }

    #[test]
    fn insight_type_display() {
        assert_eq!(InsightType::Info.to_string(), "info");
        assert_eq!("positive".parse::<InsightType>().unwrap(), InsightType::Positive);
    }

    #[test]
    fn region_stats_total() {
        let stats = RegionStats {
            region: RegionCode::Nsw,
            clients: 3,
            properties: 2,
        };
        assert_eq!(stats.total(), 5);
        assert_eq!(serde_json::to_value(&stats).unwrap()["region"], "NSW");
    }
}
