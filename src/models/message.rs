use serde::{Deserialize, Serialize};

/// Raw latitude/longitude strings attached to an inbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationPayload {
    pub lat: String,
    pub lon: String,
}

/// Transport-neutral inbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundEvent {
    pub sender_id: String,
    pub text: String,
    pub location: Option<LocationPayload>,
}

impl InboundEvent {
    pub fn text(sender_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            sender_id: sender_id.into(),
            text: text.into(),
            location: None,
        }
    }

    pub fn with_location(mut self, lat: impl Into<String>, lon: impl Into<String>) -> Self {
        self.location = Some(LocationPayload {
            lat: lat.into(),
            lon: lon.into(),
        });
        self
    }

    /// Build an event from optional coordinate fields, attaching a location
    /// only when both values are non-empty.
    pub fn from_parts(
        sender_id: impl Into<String>,
        text: &str,
        lat: Option<&str>,
        lon: Option<&str>,
    ) -> Self {
        let location = match (lat.map(str::trim), lon.map(str::trim)) {
            (Some(lat), Some(lon)) if !lat.is_empty() && !lon.is_empty() => {
                Some(LocationPayload {
                    lat: lat.to_string(),
                    lon: lon.to_string(),
                })
            }
            _ => None,
        };

        Self {
            sender_id: sender_id.into(),
            text: text.trim().to_string(),
            location,
        }
    }
}
