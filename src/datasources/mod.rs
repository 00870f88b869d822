pub mod google_geocoding;
pub mod openweathermap;

pub use google_geocoding::GoogleGeocodingClient;
pub use openweathermap::OpenWeatherMapClient;

use crate::models::{Coordinates, Forecast, Place};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct GeocodeError(pub String);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ForecastError(pub String);

/// Resolves coordinates to a named place.
#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    async fn reverse_geocode(&self, coords: Coordinates) -> Result<Place, GeocodeError>;
}

/// Fetches an aggregated short-range forecast for a city.
#[async_trait]
pub trait ForecastProvider: Send + Sync {
    async fn fetch_forecast(&self, city: &str) -> Result<Forecast, ForecastError>;
}
