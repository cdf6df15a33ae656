#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Summary statistics and business insights over client records.
//!
//! [`summarize`] is pure: it reads the records once and derives totals,
//! per-service-type and per-region breakdowns, the top region, and a short
//! list of [`Insight`]s. Nothing is cached; callers recompute whenever the
//! record set changes.

use propmap_analytics_models::{
    AnalyticsResult, INVESTMENT_SERVICE_TYPE, Insight, InsightType, NO_TOP_REGION, RegionStats,
    ServiceTypeCount,
};
use propmap_record_models::NormalizedRecord;
use propmap_region_models::RegionCode;

/// Interstate rate (percent) above which activity is called out.
pub const HIGH_INTERSTATE_RATE: f64 = 30.0;

/// Investment rate (percent) above which the client base is called
/// investment focused.
pub const INVESTMENT_FOCUS_RATE: f64 = 70.0;

/// Computes statistics and insights for `records`.
#[must_use]
pub fn summarize(records: &[NormalizedRecord]) -> AnalyticsResult {
    let total_clients = records.len() as u64;
    let total_properties = records
        .iter()
        .filter(|r| !r.property_address.is_empty())
        .count() as u64;
    let interstate_sales = records.iter().filter(|r| r.is_interstate).count() as u64;

    let service_types = count_service_types(records);
    let region_stats = count_regions(records);
    let top_region = top_region(&region_stats);

    let investment_clients = service_types
        .iter()
        .find(|s| s.service_type == INVESTMENT_SERVICE_TYPE)
        .map_or(0, |s| s.count);

    let mut result = AnalyticsResult {
        total_clients,
        total_properties,
        interstate_sales,
        interstate_rate: percentage(interstate_sales, total_properties),
        investment_rate: percentage(investment_clients, total_clients),
        service_types,
        region_stats,
        top_region,
        insights: Vec::new(),
    };
    result.insights = insights(&result);

    log::debug!(
        "Summarized {total_clients} clients: {} regions, {} insights, top region {}",
        result.region_stats.len(),
        result.insights.len(),
        result.top_region
    );

    result
}

fn count_service_types(records: &[NormalizedRecord]) -> Vec<ServiceTypeCount> {
    let mut counts: Vec<ServiceTypeCount> = Vec::new();
    for record in records {
        match counts
            .iter_mut()
            .find(|c| c.service_type == record.service_type)
        {
            Some(entry) => entry.count += 1,
            None => counts.push(ServiceTypeCount {
                service_type: record.service_type.clone(),
                count: 1,
            }),
        }
    }
    counts
}

fn region_entry(stats: &mut Vec<RegionStats>, region: RegionCode) -> &mut RegionStats {
    let index = match stats.iter().position(|s| s.region == region) {
        Some(index) => index,
        None => {
            stats.push(RegionStats {
                region,
                clients: 0,
                properties: 0,
            });
            stats.len() - 1
        }
    };
    &mut stats[index]
}

/// Every record counts as a client of its client region, Unknown
/// included. Properties are only counted for known regions.
fn count_regions(records: &[NormalizedRecord]) -> Vec<RegionStats> {
    let mut stats = Vec::new();
    for record in records {
        region_entry(&mut stats, record.client_region).clients += 1;
        if record.property_region != RegionCode::Unknown {
            region_entry(&mut stats, record.property_region).properties += 1;
        }
    }
    stats
}

/// Region with the highest clients + properties; the earliest entry wins
/// ties.
fn top_region(stats: &[RegionStats]) -> String {
    let mut best: Option<&RegionStats> = None;
    for entry in stats {
        if best.is_none_or(|b| entry.total() > b.total()) {
            best = Some(entry);
        }
    }
    best.map_or_else(|| NO_TOP_REGION.to_string(), |b| b.region.to_string())
}

/// `part / whole` as a percentage rounded to one decimal. A zero `whole`
/// yields zero.
#[allow(clippy::cast_precision_loss)]
fn percentage(part: u64, whole: u64) -> f64 {
    let rate = part as f64 / whole as f64 * 100.0;
    if rate.is_finite() {
        (rate * 10.0).round() / 10.0
    } else {
        0.0
    }
}

fn region_clients(result: &AnalyticsResult, region: RegionCode) -> u64 {
    result.region(region).map_or(0, |r| r.clients)
}

fn region_properties(result: &AnalyticsResult, region: RegionCode) -> u64 {
    result.region(region).map_or(0, |r| r.properties)
}

/// Evaluates the insight rules in their fixed order.
fn insights(result: &AnalyticsResult) -> Vec<Insight> {
    let mut insights = Vec::new();

    if result.interstate_rate > HIGH_INTERSTATE_RATE {
        insights.push(Insight::new(
            InsightType::Info,
            "High Interstate Activity",
            format!(
                "{}% of properties were purchased interstate",
                result.interstate_rate
            ),
        ));
    }

    let nsw_clients = region_clients(result, RegionCode::Nsw);
    let qld_properties = region_properties(result, RegionCode::Qld);
    if nsw_clients > 0 && qld_properties > 0 {
        insights.push(Insight::new(
            InsightType::Positive,
            "NSW → QLD Investment Corridor",
            format!("{nsw_clients} NSW clients with {qld_properties} QLD properties purchased"),
        ));
    }

    if result.investment_rate > INVESTMENT_FOCUS_RATE {
        insights.push(Insight::new(
            InsightType::Positive,
            "Investment Focus",
            format!(
                "{}% of clients are purchasing investment properties",
                result.investment_rate
            ),
        ));
    }

    let overseas: u64 = result
        .region_stats
        .iter()
        .filter(|r| r.region.is_overseas())
        .map(|r| r.clients)
        .sum();
    if overseas > 0 {
        insights.push(Insight::new(
            InsightType::Info,
            "International Clients",
            format!("{overseas} clients based overseas (Singapore, Dubai)"),
        ));
    }

    insights
}

#[cfg(test)]
mod tests {
    use propmap_record_models::{MapDisplayType, is_interstate};

    use super::*;

    fn record(client: RegionCode, property: Option<RegionCode>, service: &str) -> NormalizedRecord {
        let property_region = property.unwrap_or(RegionCode::Unknown);
        NormalizedRecord {
            name: "Client".to_string(),
            client_address: format!("1 Main St, {client}"),
            property_address: property.map(|p| format!("2 High St, {p}")).unwrap_or_default(),
            service_type: service.to_string(),
            date_signed: String::new(),
            date_purchase: String::new(),
            email: String::new(),
            notes: String::new(),
            client_region: client,
            property_region,
            has_client_location: true,
            has_property_location: property.is_some(),
            map_display_type: MapDisplayType::from_flags(true, property.is_some()),
            client_coords: None,
            property_coords: None,
            is_interstate: is_interstate(client, property_region),
            year: None,
        }
    }

    fn with_interstate(interstate: usize, total: usize) -> Vec<NormalizedRecord> {
        (0..total)
            .map(|i| {
                let property = if i < interstate {
                    RegionCode::Vic
                } else {
                    RegionCode::Wa
                };
                record(RegionCode::Wa, Some(property), "Home")
            })
            .collect()
    }

    fn titles(result: &AnalyticsResult) -> Vec<&str> {
        result.insights.iter().map(|i| i.title.as_str()).collect()
    }

    #[test]
    fn empty_records() {
        let result = summarize(&[]);
        assert_eq!(result.total_clients, 0);
        assert_eq!(result.total_properties, 0);
        assert_eq!(result.interstate_rate, 0.0);
        assert_eq!(result.investment_rate, 0.0);
        assert_eq!(result.top_region, NO_TOP_REGION);
        assert!(result.insights.is_empty());
    }

    #[test]
    fn high_interstate_rate_emits_insight() {
        let result = summarize(&with_interstate(4, 10));
        assert_eq!(result.total_properties, 10);
        assert_eq!(result.interstate_sales, 4);
        assert!((result.interstate_rate - 40.0).abs() < f64::EPSILON);
        assert_eq!(titles(&result), vec!["High Interstate Activity"]);
        assert_eq!(result.insights[0].insight_type, InsightType::Info);
    }

    #[test]
    fn low_interstate_rate_emits_nothing() {
        let result = summarize(&with_interstate(2, 10));
        assert!((result.interstate_rate - 20.0).abs() < f64::EPSILON);
        assert!(result.insights.is_empty());
    }

    #[test]
    fn zero_properties_gives_zero_rate() {
        let records = vec![record(RegionCode::Nsw, None, "Home")];
        let result = summarize(&records);
        assert_eq!(result.total_properties, 0);
        assert_eq!(result.interstate_rate, 0.0);
        assert!(titles(&result).is_empty());
    }

    #[test]
    fn rates_round_to_one_decimal() {
        let result = summarize(&with_interstate(1, 3));
        assert!((result.interstate_rate - 33.3).abs() < 1e-9);
    }

    #[test]
    fn nsw_qld_corridor() {
        let records = vec![
            record(RegionCode::Nsw, Some(RegionCode::Nsw), "Home"),
            record(RegionCode::Vic, Some(RegionCode::Qld), "Home"),
            record(RegionCode::Vic, Some(RegionCode::Vic), "Home"),
            record(RegionCode::Vic, Some(RegionCode::Vic), "Home"),
        ];
        let result = summarize(&records);
        assert_eq!(titles(&result), vec!["NSW → QLD Investment Corridor"]);
        assert_eq!(result.insights[0].insight_type, InsightType::Positive);
        assert!(result.insights[0].message.contains("1 NSW clients"));
    }

    #[test]
    fn investment_focus_above_seventy_percent() {
        let mut records: Vec<_> = (0..8)
            .map(|_| record(RegionCode::Vic, None, "Investment"))
            .collect();
        records.extend((0..2).map(|_| record(RegionCode::Vic, None, "Home")));

        let result = summarize(&records);
        assert!((result.investment_rate - 80.0).abs() < f64::EPSILON);
        assert_eq!(titles(&result), vec!["Investment Focus"]);

        records.push(record(RegionCode::Vic, None, "Home"));
        records.push(record(RegionCode::Vic, None, "Home"));
        assert!(summarize(&records).insights.is_empty());
    }

    #[test]
    fn international_clients() {
        let records = vec![
            record(RegionCode::Singapore, Some(RegionCode::Qld), "Home"),
            record(RegionCode::Dubai, None, "Home"),
            record(RegionCode::Vic, None, "Home"),
        ];
        let result = summarize(&records);
        let last = result.insights.last().unwrap();
        assert_eq!(last.title, "International Clients");
        assert!(last.message.starts_with("2 clients"));
    }

    #[test]
    fn insights_follow_rule_order() {
        let records = vec![
            record(RegionCode::Nsw, Some(RegionCode::Qld), "Investment"),
            record(RegionCode::Singapore, Some(RegionCode::Qld), "Investment"),
        ];
        let result = summarize(&records);
        assert_eq!(
            titles(&result),
            vec![
                "High Interstate Activity",
                "NSW → QLD Investment Corridor",
                "Investment Focus",
                "International Clients",
            ]
        );
    }

    #[test]
    fn region_stats_in_first_seen_order() {
        let records = vec![
            record(RegionCode::Unknown, Some(RegionCode::Tas), "Home"),
            record(RegionCode::Vic, None, "Home"),
        ];
        let result = summarize(&records);
        let order: Vec<_> = result.region_stats.iter().map(|r| r.region).collect();
        assert_eq!(
            order,
            vec![RegionCode::Unknown, RegionCode::Tas, RegionCode::Vic]
        );
        assert_eq!(result.region(RegionCode::Unknown).unwrap().clients, 1);
        assert_eq!(result.region(RegionCode::Tas).unwrap().properties, 1);
    }

    #[test]
    fn unknown_property_region_is_not_counted() {
        let mut unknown_property = record(RegionCode::Vic, None, "Home");
        unknown_property.property_address = "somewhere".to_string();
        let result = summarize(&[unknown_property]);
        assert_eq!(result.total_properties, 1);
        assert!(result.region(RegionCode::Unknown).is_none());
    }

    #[test]
    fn top_region_tie_goes_to_first_inserted() {
        let records = vec![
            record(RegionCode::Sa, None, "Home"),
            record(RegionCode::Act, None, "Home"),
        ];
        assert_eq!(summarize(&records).top_region, "SA");

        let reversed = vec![
            record(RegionCode::Act, None, "Home"),
            record(RegionCode::Sa, None, "Home"),
        ];
        assert_eq!(summarize(&reversed).top_region, "ACT");
    }

    #[test]
    fn top_region_counts_clients_and_properties() {
        let records = vec![
            record(RegionCode::Vic, Some(RegionCode::Qld), "Home"),
            record(RegionCode::Nsw, Some(RegionCode::Qld), "Home"),
        ];
        assert_eq!(summarize(&records).top_region, "QLD");
    }

    #[test]
    fn service_types_in_first_seen_order() {
        let records = vec![
            record(RegionCode::Vic, None, "Home"),
            record(RegionCode::Vic, None, "Investment"),
            record(RegionCode::Vic, None, "Home"),
        ];
        let result = summarize(&records);
        assert_eq!(
            result.service_types,
            vec![
                ServiceTypeCount {
                    service_type: "Home".to_string(),
                    count: 2
                },
                ServiceTypeCount {
                    service_type: "Investment".to_string(),
                    count: 1
                },
            ]
        );
        assert_eq!(result.service_type_count("Investment"), 1);
        assert_eq!(result.service_type_count("Commercial"), 0);
    }
}
