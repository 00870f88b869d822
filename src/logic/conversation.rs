//! Per-sender intake flow: crop → stage → location → advice.
//!
//! Every inbound message is handled while holding the sender's session slot,
//! so two messages from the same sender never interleave. External lookups
//! run under that slot only; other senders proceed independently.

use crate::datasources::{ForecastError, ForecastProvider, GeocodeError, ReverseGeocoder};
use crate::logic::evaluator::evaluate;
use crate::logic::report::{render_advice, render_completion, title_case};
use crate::logic::rule_table::{RuleLookupError, RuleTable};
use crate::models::{
    ConversationState, Coordinates, InboundEvent, LocationPayload, Session, StageType,
};
use crate::store::SessionStore;
use chrono::{Datelike, Local};
use std::sync::Arc;
use thiserror::Error;

const RESTART_KEYWORDS: [&str; 3] = ["hi", "start", "restart"];

pub const WELCOME_MESSAGE: &str = "👋 Welcome!\n\
    Please enter your *crop and stage* in one message.\n\
    Example: `wheat, s` or `rice, harvesting`";

const STAGE_PROMPT: &str = "🌀 Please enter the stage: `sowing` or `harvesting` (or `s` / `h`).";

const LOCATION_PROMPT: &str =
    "📍 Noted. Now share your *location* using the 📎 attachment in WhatsApp.";

/// Recoverable per-message failures. The display text is the reply sent back.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConversationError {
    #[error("🙋 Type *Hi* to start getting crop-weather advice.\nExample: `rice, sowing` or `tomato, h`")]
    SessionAbsent,

    /// Bad stage token in a combined `crop, stage` message.
    #[error("⚠️ Please use `s` for sowing or `h` for harvesting.\nExample: wheat, s")]
    CombinedStageInvalid,

    #[error("⚠️ Invalid stage. Please reply with `sowing`, `harvesting`, `s`, or `h`.")]
    StageTokenInvalid,

    #[error("⚠️ Location not detected. Please *share your live location* using the 📎 button.")]
    LocationMissing,

    #[error("⚠️ Invalid location format. Please share location again.")]
    LocationUnparseable,

    #[error("❌ Location error: {0}")]
    GeocodeFailed(GeocodeError),

    #[error("⚠️ Unable to fetch weather for {city}: {source}")]
    ForecastFailed { city: String, source: ForecastError },

    #[error(transparent)]
    Rule(#[from] RuleLookupError),
}

impl ConversationError {
    /// Unknown crop or stage is a data problem retrying cannot fix, so the
    /// session is dropped and the user has to start over.
    pub fn ends_session(&self) -> bool {
        matches!(self, ConversationError::Rule(_))
    }
}

/// Successful outcome of one step.
#[derive(Debug, Clone, PartialEq)]
enum Transition {
    Advance {
        state: ConversationState,
        reply: String,
    },
    Complete {
        reply: String,
    },
}

pub struct ConversationEngine {
    rules: Arc<RuleTable>,
    sessions: Arc<dyn SessionStore>,
    geocoder: Arc<dyn ReverseGeocoder>,
    forecasts: Arc<dyn ForecastProvider>,
}

impl ConversationEngine {
    pub fn new(
        rules: Arc<RuleTable>,
        sessions: Arc<dyn SessionStore>,
        geocoder: Arc<dyn ReverseGeocoder>,
        forecasts: Arc<dyn ForecastProvider>,
    ) -> Self {
        Self {
            rules,
            sessions,
            geocoder,
            forecasts,
        }
    }

    pub fn sessions(&self) -> &Arc<dyn SessionStore> {
        &self.sessions
    }

    /// Handle an inbound message using the local calendar month.
    pub async fn handle(&self, event: &InboundEvent) -> String {
        self.handle_in_month(event, Local::now().month()).await
    }

    pub async fn handle_in_month(&self, event: &InboundEvent, current_month: u32) -> String {
        let sender = event.sender_id.as_str();
        let text = event.text.trim().to_lowercase();
        let mut slot = self.sessions.checkout(sender).await;

        if RESTART_KEYWORDS.contains(&text.as_str()) {
            *slot = Some(Session::new());
            tracing::info!(sender, "Session restarted");
            return WELCOME_MESSAGE.to_string();
        }

        let Some(state) = slot.as_ref().map(|s| s.state.clone()) else {
            tracing::debug!(sender, "Message without an active session");
            return ConversationError::SessionAbsent.to_string();
        };

        let outcome = self
            .advance(state, &text, event.location.as_ref(), current_month)
            .await;

        match outcome {
            Ok(Transition::Advance { state, reply }) => {
                tracing::info!(sender, state = %state, "Session advanced");
                if let Some(session) = slot.as_mut() {
                    session.advance_to(state);
                }
                reply
            }
            Ok(Transition::Complete { reply }) => {
                tracing::info!(sender, "Advice delivered, session closed");
                *slot = None;
                reply
            }
            Err(e) => {
                if e.ends_session() {
                    tracing::info!(sender, "Session aborted: {}", e);
                    *slot = None;
                } else {
                    tracing::debug!(sender, "Staying in current state: {}", e);
                }
                e.to_string()
            }
        }
    }

    async fn advance(
        &self,
        state: ConversationState,
        text: &str,
        location: Option<&LocationPayload>,
        current_month: u32,
    ) -> Result<Transition, ConversationError> {
        match state {
            ConversationState::AwaitingCrop => accept_crop(text),
            ConversationState::AwaitingStage { crop } => accept_stage(crop, text),
            ConversationState::AwaitingLocation { crop, stage } => {
                let location = location.ok_or(ConversationError::LocationMissing)?;
                let coords = Coordinates::parse(&location.lat, &location.lon)
                    .ok_or(ConversationError::LocationUnparseable)?;
                self.advise(&crop, stage, coords, current_month).await
            }
        }
    }

    async fn advise(
        &self,
        crop: &str,
        stage: StageType,
        coords: Coordinates,
        current_month: u32,
    ) -> Result<Transition, ConversationError> {
        let place = self.geocoder.reverse_geocode(coords).await.map_err(|e| {
            tracing::warn!("Reverse geocoding {} failed: {}", coords, e);
            ConversationError::GeocodeFailed(e)
        })?;

        let forecast = self
            .forecasts
            .fetch_forecast(&place.city)
            .await
            .map_err(|e| {
                tracing::warn!("Forecast for {} failed: {}", place.city, e);
                ConversationError::ForecastFailed {
                    city: place.city.clone(),
                    source: e,
                }
            })?;

        let rule = self.rules.lookup(crop, stage)?;
        let verdict = evaluate(rule, &forecast, current_month);
        tracing::info!(
            crop,
            stage = stage.as_str(),
            city = %place.city,
            suitable = verdict.suitable,
            "Crop stage evaluated"
        );

        let advice = render_advice(crop, stage, rule, &forecast, &verdict, current_month);
        Ok(Transition::Complete {
            reply: render_completion(&place, &advice),
        })
    }
}

/// `crop, stage` jumps straight to the location step; anything without
/// exactly one comma is taken as the crop name alone.
fn accept_crop(text: &str) -> Result<Transition, ConversationError> {
    let parts: Vec<&str> = text.split(',').map(str::trim).collect();

    if let [crop, stage_token] = parts.as_slice() {
        let stage =
            StageType::from_token(stage_token).ok_or(ConversationError::CombinedStageInvalid)?;
        let reply = format!(
            "📍 Got it!\nCrop: *{}*, Stage: *{}*\nNow please share your *location* using the 📎 attachment.",
            title_case(crop),
            stage.label()
        );
        return Ok(Transition::Advance {
            state: ConversationState::AwaitingLocation {
                crop: crop.to_string(),
                stage,
            },
            reply,
        });
    }

    Ok(Transition::Advance {
        state: ConversationState::AwaitingStage {
            crop: text.to_string(),
        },
        reply: STAGE_PROMPT.to_string(),
    })
}

fn accept_stage(crop: String, text: &str) -> Result<Transition, ConversationError> {
    let stage = StageType::from_token(text).ok_or(ConversationError::StageTokenInvalid)?;
    Ok(Transition::Advance {
        state: ConversationState::AwaitingLocation { crop, stage },
        reply: LOCATION_PROMPT.to_string(),
    })
}
