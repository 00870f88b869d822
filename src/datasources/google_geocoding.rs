use super::{GeocodeError, ReverseGeocoder};
use crate::config::GeocodingConfig;
use crate::error::Result;
use crate::models::{Coordinates, Place};
use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use std::time::Duration;

const GEOCODE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";

pub struct GoogleGeocodingClient {
    client: reqwest::Client,
    config: GeocodingConfig,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    #[serde(default)]
    address_components: Vec<AddressComponent>,
}

#[derive(Debug, Deserialize)]
struct AddressComponent {
    long_name: String,
    #[serde(default)]
    types: Vec<String>,
}

impl GoogleGeocodingClient {
    pub fn new(config: GeocodingConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    pub async fn lookup(&self, coords: Coordinates) -> std::result::Result<Place, GeocodeError> {
        if self.config.api_key.is_empty() {
            return Err(GeocodeError(
                "GOOGLE_API_KEY missing in environment variables".into(),
            ));
        }

        let latlng = coords.to_string();
        let url = Url::parse_with_params(
            GEOCODE_URL,
            &[("latlng", latlng.as_str()), ("key", self.config.api_key.as_str())],
        )
        .map_err(|e| GeocodeError(format!("Invalid request URL: {}", e)))?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| GeocodeError(format!("Request error: {}", e.without_url())))?;

        if !response.status().is_success() {
            return Err(GeocodeError(format!(
                "Request error: geocoding service returned {}",
                response.status()
            )));
        }

        let body: GeocodeResponse = response
            .json()
            .await
            .map_err(|e| GeocodeError(format!("Request error: {}", e)))?;

        place_from_response(body)
    }
}

#[async_trait]
impl ReverseGeocoder for GoogleGeocodingClient {
    async fn reverse_geocode(
        &self,
        coords: Coordinates,
    ) -> std::result::Result<Place, GeocodeError> {
        let place = self.lookup(coords).await?;
        tracing::debug!(
            "Resolved {} to {}, {}, {}",
            coords,
            place.city,
            place.state,
            place.country
        );
        Ok(place)
    }
}

/// Pull city, state and country from the first (most specific) result.
fn place_from_response(body: GeocodeResponse) -> std::result::Result<Place, GeocodeError> {
    let first = match body.results.first() {
        Some(result) if body.status == "OK" => result,
        _ => return Err(GeocodeError(format!("Geocoding failed: {}", body.status))),
    };

    let components = &first.address_components;
    let city = extract_component(components, "locality")
        .or_else(|| extract_component(components, "administrative_area_level_2"));
    let state = extract_component(components, "administrative_area_level_1");
    let country = extract_component(components, "country").unwrap_or_default();

    match (city, state) {
        (Some(city), Some(state)) => Ok(Place {
            city,
            state,
            country,
        }),
        _ => Err(GeocodeError(
            "Could not parse city/state from response".into(),
        )),
    }
}

fn extract_component(components: &[AddressComponent], component_type: &str) -> Option<String> {
    components
        .iter()
        .find(|c| c.types.iter().any(|t| t == component_type))
        .map(|c| c.long_name.clone())
        .filter(|name| !name.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> GeocodeResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn extracts_locality_state_and_country() {
        let body = parse(
            r#"{"status":"OK","results":[{"address_components":[
                {"long_name":"Kanpur","types":["locality","political"]},
                {"long_name":"Kanpur Nagar","types":["administrative_area_level_2","political"]},
                {"long_name":"Uttar Pradesh","types":["administrative_area_level_1","political"]},
                {"long_name":"India","types":["country","political"]}
            ]}]}"#,
        );

        let place = place_from_response(body).unwrap();
        assert_eq!(
            place,
            Place {
                city: "Kanpur".into(),
                state: "Uttar Pradesh".into(),
                country: "India".into(),
            }
        );
    }

    #[test]
    fn falls_back_to_district_when_no_locality() {
        let body = parse(
            r#"{"status":"OK","results":[{"address_components":[
                {"long_name":"Unnao","types":["administrative_area_level_2"]},
                {"long_name":"Uttar Pradesh","types":["administrative_area_level_1"]}
            ]}]}"#,
        );

        let place = place_from_response(body).unwrap();
        assert_eq!(place.city, "Unnao");
        assert_eq!(place.country, "");
    }

    #[test]
    fn non_ok_status_is_an_error() {
        let body = parse(r#"{"status":"ZERO_RESULTS","results":[]}"#);
        let err = place_from_response(body).unwrap_err();
        assert_eq!(err.to_string(), "Geocoding failed: ZERO_RESULTS");
    }

    #[test]
    fn missing_state_is_an_error() {
        let body = parse(
            r#"{"status":"OK","results":[{"address_components":[
                {"long_name":"Somewhere","types":["locality"]}
            ]}]}"#,
        );
        let err = place_from_response(body).unwrap_err();
        assert_eq!(err.to_string(), "Could not parse city/state from response");
    }

    #[tokio::test]
    async fn missing_api_key_is_reported() {
        let client = GoogleGeocodingClient::new(GeocodingConfig {
            api_key: String::new(),
            timeout_secs: 5,
        })
        .unwrap();

        let coords = Coordinates::new(26.4499, 80.3319).unwrap();
        let err = client.reverse_geocode(coords).await.unwrap_err();
        assert!(err.to_string().contains("GOOGLE_API_KEY"));
    }
}
