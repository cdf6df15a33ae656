//! Static fallback coordinates per region.
//!
//! Used when an address cannot be geocoded (service unavailable, no
//! match, or a transport error). Each entry is the approximate
//! geographic center of the region.

use crate::{Coords, RegionCode};

/// Center of mainland Australia, used for [`RegionCode::Unknown`] and for
/// any region without its own entry in [`FALLBACK_CENTROIDS`].
pub const UNKNOWN_CENTROID: Coords = Coords::new(-25.2744, 133.7751);

/// Region centroids, looked up by [`lookup_centroid`].
pub const FALLBACK_CENTROIDS: &[(RegionCode, Coords)] = &[
    (RegionCode::Nsw, Coords::new(-31.8402, 145.6121)),
    (RegionCode::Vic, Coords::new(-36.9848, 143.3906)),
    (RegionCode::Qld, Coords::new(-20.9176, 142.7028)),
    (RegionCode::Wa, Coords::new(-25.0423, 117.7930)),
    (RegionCode::Sa, Coords::new(-30.0002, 136.2092)),
    (RegionCode::Tas, Coords::new(-42.0409, 146.8087)),
    (RegionCode::Act, Coords::new(-35.4735, 149.0124)),
    (RegionCode::Nt, Coords::new(-19.4914, 132.5510)),
    (RegionCode::Singapore, Coords::new(1.3521, 103.8198)),
    (RegionCode::Dubai, Coords::new(25.2048, 55.2708)),
    (RegionCode::Unknown, UNKNOWN_CENTROID),
];

/// Returns the centroid registered for `region`, if any.
#[must_use]
pub fn lookup_centroid(region: RegionCode) -> Option<Coords> {
    FALLBACK_CENTROIDS
        .iter()
        .find(|(r, _)| *r == region)
        .map(|(_, coords)| *coords)
}

/// Returns the centroid for `region`, or [`UNKNOWN_CENTROID`] when the
/// region has no entry.
#[must_use]
pub fn fallback_centroid(region: RegionCode) -> Coords {
    lookup_centroid(region).unwrap_or(UNKNOWN_CENTROID)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_region_has_a_centroid() {
        for region in RegionCode::all() {
            assert!(
                lookup_centroid(*region).is_some(),
                "no centroid for {region}"
            );
        }
    }

    #[test]
    fn centroid_regions_are_unique() {
        let mut seen = std::collections::BTreeSet::new();
        for (region, _) in FALLBACK_CENTROIDS {
            assert!(seen.insert(*region), "duplicate centroid for {region}");
        }
    }

    #[test]
    fn unknown_falls_back_to_australia_center() {
        assert_eq!(fallback_centroid(RegionCode::Unknown), UNKNOWN_CENTROID);
    }

    #[test]
    fn centroids_are_valid_coordinates() {
        for (region, c) in FALLBACK_CENTROIDS {
            assert!((-90.0..=90.0).contains(&c.lat), "{region} lat {}", c.lat);
            assert!((-180.0..=180.0).contains(&c.lng), "{region} lng {}", c.lng);
        }
    }

    #[test]
    fn state_centroids_lie_in_southern_hemisphere() {
        for region in RegionCode::AUSTRALIAN {
            assert!(fallback_centroid(region).lat < 0.0, "{region}");
        }
    }
}
