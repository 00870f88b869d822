use super::{ForecastError, ForecastProvider};
use crate::config::OpenWeatherMapConfig;
use crate::error::Result;
use crate::models::Forecast;
use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

const API_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

pub struct OpenWeatherMapClient {
    client: reqwest::Client,
    config: OpenWeatherMapConfig,
}

// OpenWeatherMap API response structures
#[derive(Debug, Deserialize)]
struct OwmForecastResponse {
    #[serde(default)]
    list: Vec<OwmForecastItem>,
}

#[derive(Debug, Deserialize)]
struct OwmForecastItem {
    main: OwmMain,
    #[serde(default)]
    weather: Vec<OwmWeather>,
    #[serde(default)]
    rain: Option<OwmPrecipitation>,
}

#[derive(Debug, Deserialize)]
struct OwmMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwmWeather {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwmPrecipitation {
    #[serde(rename = "3h", default)]
    three_hour: f64,
}

#[derive(Debug, Deserialize)]
struct OwmErrorBody {
    message: Option<String>,
}

impl OpenWeatherMapClient {
    pub fn new(config: OpenWeatherMapConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    /// Fetch the 3-hour forecast for a city and aggregate the configured slots.
    pub async fn fetch_city_forecast(
        &self,
        city: &str,
    ) -> std::result::Result<Forecast, ForecastError> {
        if self.config.api_key.is_empty() {
            return Err(ForecastError(
                "WEATHER_API_KEY missing in environment variables".into(),
            ));
        }

        let slots = self.config.forecast_slots.to_string();
        let url = Url::parse_with_params(
            &format!("{}/forecast", API_BASE_URL),
            &[
                ("q", city),
                ("appid", self.config.api_key.as_str()),
                ("units", "metric"),
                ("cnt", slots.as_str()),
            ],
        )
        .map_err(|e| ForecastError(format!("Invalid request URL: {}", e)))?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ForecastError(format!("Request failed: {}", e.without_url())))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<OwmErrorBody>(&body)
                .ok()
                .and_then(|b| b.message)
                .unwrap_or_else(|| status.to_string());
            return Err(ForecastError(format!("API error: {}", message)));
        }

        let owm_response: OwmForecastResponse = response.json().await.map_err(|e| {
            ForecastError(format!("Failed to parse OpenWeatherMap response: {}", e))
        })?;

        summarize(&owm_response.list)
    }
}

#[async_trait]
impl ForecastProvider for OpenWeatherMapClient {
    async fn fetch_forecast(&self, city: &str) -> std::result::Result<Forecast, ForecastError> {
        let forecast = self.fetch_city_forecast(city).await?;
        tracing::debug!(
            "Forecast for {}: {:.1}°C, {:.1} mm, {}",
            city,
            forecast.temperature,
            forecast.rainfall,
            forecast.description
        );
        Ok(forecast)
    }
}

/// Collapse forecast slots into mean temperature, total rain and the most
/// common description.
fn summarize(items: &[OwmForecastItem]) -> std::result::Result<Forecast, ForecastError> {
    if items.is_empty() {
        return Err(ForecastError("API returned no forecast entries".into()));
    }

    let avg_temp = items.iter().map(|i| i.main.temp).sum::<f64>() / items.len() as f64;

    let total_rain: f64 = items
        .iter()
        .map(|i| i.rain.as_ref().map(|r| r.three_hour).unwrap_or(0.0))
        .sum();

    // Most frequent description; the earliest one wins a tie
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (position, item) in items.iter().enumerate() {
        if let Some(weather) = item.weather.first() {
            let entry = counts
                .entry(weather.description.as_str())
                .or_insert((0, position));
            entry.0 += 1;
        }
    }
    let description = counts
        .into_iter()
        .max_by(|(_, (a_count, a_pos)), (_, (b_count, b_pos))| {
            a_count.cmp(b_count).then(b_pos.cmp(a_pos))
        })
        .map(|(desc, _)| desc.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    Ok(Forecast {
        temperature: round_tenth(avg_temp),
        rainfall: round_tenth(total_rain),
        description,
    })
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
