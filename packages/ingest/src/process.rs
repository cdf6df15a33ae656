//! Raw CSV row to [`NormalizedRecord`] conversion.

use propmap_geocoder::Geocoder;
use propmap_geocoder::address::{classify_region, clean_address, is_present_address};
use propmap_record_models::{
    DEFAULT_SERVICE_TYPE, MapDisplayType, NormalizedRecord, RawRow, columns, is_interstate,
};

/// Cleans, classifies, and geocodes one row at a time.
#[derive(Debug, Clone)]
pub struct RecordProcessor {
    geocoder: Geocoder,
}

impl RecordProcessor {
    /// Creates a processor resolving coordinates through `geocoder`.
    #[must_use]
    pub const fn new(geocoder: Geocoder) -> Self {
        Self { geocoder }
    }

    /// The geocoder used for address lookups.
    #[must_use]
    pub const fn geocoder(&self) -> &Geocoder {
        &self.geocoder
    }

    /// Normalizes `row`, or returns `None` if it has no client name.
    ///
    /// Coordinates are requested only for address columns that hold a
    /// usable address, client first. Lookups that fail fall back to the
    /// region centroid, so a present address always gets coordinates.
    pub async fn process(&self, row: &RawRow, year: &str) -> Option<NormalizedRecord> {
        let name = row.field(columns::NAME);
        if name.is_empty() {
            log::trace!("{year}: dropping row without a name");
            return None;
        }

        let raw_client = row.field(columns::ADDRESS);
        let raw_property = row.field(columns::PROPERTY_PURCHASED);
        let has_client_location = is_present_address(raw_client);
        let has_property_location = is_present_address(raw_property);

        let client_address = if has_client_location {
            clean_address(raw_client)
        } else {
            String::new()
        };
        let property_address = if has_property_location {
            clean_address(raw_property)
        } else {
            String::new()
        };

        let client_region = classify_region(&client_address);
        let property_region = classify_region(&property_address);

        let client_coords = if has_client_location {
            Some(
                self.geocoder
                    .resolve_or_fallback(&client_address, client_region)
                    .await,
            )
        } else {
            None
        };
        let property_coords = if has_property_location {
            Some(
                self.geocoder
                    .resolve_or_fallback(&property_address, property_region)
                    .await,
            )
        } else {
            None
        };

        let service_type = match row.field(columns::SERVICE_TYPE) {
            "" => DEFAULT_SERVICE_TYPE.to_string(),
            other => other.to_string(),
        };

        Some(NormalizedRecord {
            name: name.to_string(),
            client_address,
            property_address,
            service_type,
            date_signed: row.field(columns::DATE_SIGNED).to_string(),
            date_purchase: row.field(columns::DATE_PURCHASE).to_string(),
            email: row.field(columns::EMAIL).to_string(),
            notes: row.field(columns::NOTES).to_string(),
            client_region,
            property_region,
            has_client_location,
            has_property_location,
            map_display_type: MapDisplayType::from_flags(
                has_client_location,
                has_property_location,
            ),
            client_coords,
            property_coords,
            is_interstate: is_interstate(client_region, property_region),
            year: None,
        })
    }
}
