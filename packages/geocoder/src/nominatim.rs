//! Nominatim / OpenStreetMap geocoder client.
//!
//! The public instance allows **1 request per second**. Rate limiting is
//! enforced by [`crate::Geocoder`], not here.
//!
//! See <https://nominatim.org/release-docs/develop/api/Search/>

use async_trait::async_trait;
use propmap_region_models::Coords;

use crate::{GeocodeError, GeocodingService};

/// Default public search endpoint.
pub const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org/search";

/// [`GeocodingService`] backed by a Nominatim search endpoint.
#[derive(Debug, Clone)]
pub struct NominatimService {
    client: reqwest::Client,
    base_url: String,
    country_codes: Option<String>,
}

impl NominatimService {
    /// Creates a client for `base_url`.
    ///
    /// `country_codes` is passed through as Nominatim's `countrycodes`
    /// filter (e.g. `"au,sg,ae"`). Nominatim's usage policy requires an
    /// identifying `user_agent`.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] if the HTTP client cannot be built.
    pub fn new(
        base_url: &str,
        user_agent: &str,
        country_codes: Option<&str>,
    ) -> Result<Self, GeocodeError> {
        let client = reqwest::Client::builder().user_agent(user_agent).build()?;
        Ok(Self {
            client,
            base_url: base_url.to_string(),
            country_codes: country_codes
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(String::from),
        })
    }
}

#[async_trait]
impl GeocodingService for NominatimService {
    async fn lookup(&self, address: &str) -> Result<Option<Coords>, GeocodeError> {
        let mut query: Vec<(&str, &str)> =
            vec![("q", address), ("format", "jsonv2"), ("limit", "1")];
        if let Some(codes) = &self.country_codes {
            query.push(("countrycodes", codes.as_str()));
        }

        let resp = self.client.get(&self.base_url).query(&query).send().await?;

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(GeocodeError::RateLimited);
        }

        let resp = resp.error_for_status()?;
        let body: serde_json::Value = resp.json().await?;
        parse_response(&body)
    }

    fn name(&self) -> &'static str {
        "nominatim"
    }
}

/// Parses Nominatim JSON response.
fn parse_response(body: &serde_json::Value) -> Result<Option<Coords>, GeocodeError> {
    let results = body.as_array().ok_or_else(|| GeocodeError::Parse {
        message: "Nominatim response is not an array".to_string(),
    })?;

    let Some(first) = results.first() else {
        return Ok(None);
    };

    let lat = first["lat"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| GeocodeError::Parse {
            message: "Missing lat in Nominatim response".to_string(),
        })?;

    let lng = first["lon"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| GeocodeError::Parse {
            message: "Missing lon in Nominatim response".to_string(),
        })?;

    if let Some(name) = first["display_name"].as_str() {
        log::trace!("Nominatim matched '{name}'");
    }

    Ok(Some(Coords::new(lat, lng)))
}
