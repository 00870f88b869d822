use serde::{Deserialize, Serialize};

/// Aggregated short-range forecast for a city.
///
/// `rainfall` is the total over the lookahead window, not a rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub temperature: f64, // °C
    pub rainfall: f64,    // mm
    pub description: String,
}

impl Forecast {
    pub fn new(temperature: f64, rainfall: f64, description: impl Into<String>) -> Self {
        Self {
            temperature,
            rainfall,
            description: description.into(),
        }
    }
}
