//! HTTP client for a Nominatim-compatible `/search` endpoint.

use std::time::Duration;

use alimapa_core::model::{SchoolSeed, parse_coord};
use serde::Deserialize;
use thiserror::Error;
use tokio::time::sleep;
use tracing::{info, warn};

/// Fallback for addresses the geocoder cannot place: the map's city-center
/// anchor for Alicante. A school pinned here is visibly "unplaced" rather
/// than silently absent.
pub const CITY_CENTER: (f64, f64) = (38.3452, -0.4815);

/// Nominatim's usage policy requires an identifying agent.
const USER_AGENT: &str = concat!("alimapa/", env!("CARGO_PKG_VERSION"));

#[derive(Error, Debug)]
pub enum GeoError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("geocoder returned {status}: {body}")]
    Server { status: u16, body: String },
}

/// One row of a `format=json` search response. Nominatim sends coordinates
/// as strings.
#[derive(Debug, Deserialize)]
struct Place {
    lat: String,
    lon: String,
}

/// Geocoding client with a fixed pause between lookups.
pub struct GeocodeClient {
    client: reqwest::Client,
    base_url: String,
    /// Appended to every query, e.g. `"Alicante, Spain"`.
    city_suffix: String,
    delay: Duration,
}

/// What a [`GeocodeClient::fill_missing`] pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FillSummary {
    /// Schools the geocoder placed.
    pub resolved: usize,
    /// Schools pinned to [`CITY_CENTER`] after a failed or empty lookup.
    pub placeholder: usize,
    /// Schools that already had coordinates.
    pub skipped: usize,
}

impl GeocodeClient {
    /// Create a client for the given base URL, e.g.
    /// `https://nominatim.openstreetmap.org` (no trailing slash).
    pub fn new(base_url: String, city_suffix: String, delay: Duration) -> Result<Self, GeoError> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            city_suffix,
            delay,
        })
    }

    /// The full query text sent for an address: postal-code noise stripped,
    /// city suffix appended.
    pub fn search_query(&self, address: &str) -> String {
        let cleaned = clean_address(address);
        if self.city_suffix.is_empty() {
            cleaned
        } else {
            format!("{cleaned}, {}", self.city_suffix)
        }
    }

    /// Look up a single address. `Ok(None)` means the geocoder had no
    /// answer; callers decide what to fall back to.
    pub async fn geocode(&self, address: &str) -> Result<Option<(f64, f64)>, GeoError> {
        let url = format!("{}/search", self.base_url);
        let query = self.search_query(address);
        let resp = self
            .client
            .get(&url)
            .query(&[
                ("format", "json"),
                ("q", query.as_str()),
                ("limit", "1"),
                ("countrycodes", "es"),
            ])
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(GeoError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.text().await?;
        Ok(parse_search_response(&body))
    }

    /// Geocode every school that lacks coordinates, one lookup at a time
    /// with the configured pause in between (public Nominatim instances are
    /// rate limited). A failed lookup pins the school to [`CITY_CENTER`] and
    /// moves on; this pass never fails as a whole.
    pub async fn fill_missing(&self, schools: &mut [SchoolSeed]) -> FillSummary {
        let mut summary = FillSummary::default();
        let mut looked_up = false;

        for school in schools.iter_mut() {
            if school.has_coords() {
                summary.skipped += 1;
                continue;
            }
            if looked_up {
                sleep(self.delay).await;
            }
            looked_up = true;

            match self.geocode(&school.address).await {
                Ok(Some((lat, lng))) => {
                    school.lat = Some(lat);
                    school.lng = Some(lng);
                    summary.resolved += 1;
                    info!(name = %school.name, lat, lng, "geocoded school");
                }
                Ok(None) => {
                    school.lat = Some(CITY_CENTER.0);
                    school.lng = Some(CITY_CENTER.1);
                    summary.placeholder += 1;
                    warn!(name = %school.name, "no geocoder result, pinning to city center");
                }
                Err(err) => {
                    school.lat = Some(CITY_CENTER.0);
                    school.lng = Some(CITY_CENTER.1);
                    summary.placeholder += 1;
                    warn!(name = %school.name, error = %err, "geocoding failed, pinning to city center");
                }
            }
        }
        summary
    }
}

/// Strip `C.P. <digits>` postal fragments from an address; the dataset mixes
/// them into street addresses and they confuse the geocoder. A bare `C.P.`
/// with no number after it is left alone.
pub fn clean_address(address: &str) -> String {
    const MARKER: &str = "C.P.";
    let mut out = String::with_capacity(address.len());
    let mut rest = address;

    while let Some(pos) = rest.find(MARKER) {
        let after = &rest[pos + MARKER.len()..];
        let no_ws = after.trim_start();
        let digits = no_ws.bytes().take_while(|b| b.is_ascii_digit()).count();
        if digits == 0 {
            out.push_str(&rest[..pos + MARKER.len()]);
            rest = after;
            continue;
        }
        out.push_str(&rest[..pos]);
        let ws = after.len() - no_ws.len();
        rest = &after[ws + digits..];
    }
    out.push_str(rest);
    out.trim().to_string()
}

/// First hit of a search response, if it parses to finite coordinates.
/// Malformed bodies count as "no answer", matching how the map treats them.
fn parse_search_response(body: &str) -> Option<(f64, f64)> {
    let places: Vec<Place> = serde_json::from_str(body).ok()?;
    let place = places.first()?;
    let lat = parse_coord(&place.lat)?;
    let lng = parse_coord(&place.lon)?;
    Some((lat, lng))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> GeocodeClient {
        GeocodeClient::new(
            base_url.into(),
            "Alicante, Spain".into(),
            Duration::from_millis(0),
        )
        .unwrap()
    }

    #[test]
    fn strips_postal_code_fragments() {
        assert_eq!(
            clean_address("Calle Mayor 5, C.P. 03012 Alicante"),
            "Calle Mayor 5,  Alicante"
        );
        assert_eq!(clean_address("C.P.03002 Av. de Elche 12"), "Av. de Elche 12");
        assert_eq!(clean_address("Calle Mayor 5"), "Calle Mayor 5");
    }

    #[test]
    fn strips_every_occurrence() {
        assert_eq!(clean_address("C.P. 1 x C.P. 2 y C.P. 3"), "x  y");
    }

    #[test]
    fn bare_marker_without_digits_survives() {
        assert_eq!(clean_address("Edificio C.P., planta 2"), "Edificio C.P., planta 2");
    }

    #[test]
    fn trims_the_result() {
        assert_eq!(clean_address("  C.P. 03012  "), "");
    }

    #[test]
    fn search_query_appends_the_city_suffix() {
        let c = client("https://nominatim.openstreetmap.org");
        assert_eq!(
            c.search_query("Calle Mayor 5, C.P. 03012"),
            "Calle Mayor 5,, Alicante, Spain"
        );
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let c = client("https://nominatim.openstreetmap.org/");
        assert_eq!(c.base_url, "https://nominatim.openstreetmap.org");
    }

    #[test]
    fn parses_the_first_hit() {
        let body = r#"[
            {"lat": "38.3651", "lon": "-0.4368", "display_name": "CEIP La Huerta"},
            {"lat": "0", "lon": "0"}
        ]"#;
        assert_eq!(parse_search_response(body), Some((38.3651, -0.4368)));
    }

    #[test]
    fn empty_result_set_is_no_answer() {
        assert_eq!(parse_search_response("[]"), None);
    }

    #[test]
    fn malformed_body_is_no_answer() {
        assert_eq!(parse_search_response("not json"), None);
        assert_eq!(parse_search_response(r#"{"error": "rate limited"}"#), None);
    }

    #[test]
    fn non_numeric_coordinates_are_no_answer() {
        let body = r#"[{"lat": "pending", "lon": "-0.43"}]"#;
        assert_eq!(parse_search_response(body), None);
    }
}
