use super::StageType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Intake step a sender is currently on. Later steps carry everything
/// collected so far, so a session can never hold a stage without a crop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConversationState {
    AwaitingCrop,
    AwaitingStage { crop: String },
    AwaitingLocation { crop: String, stage: StageType },
}

impl ConversationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConversationState::AwaitingCrop => "awaiting_crop",
            ConversationState::AwaitingStage { .. } => "awaiting_stage",
            ConversationState::AwaitingLocation { .. } => "awaiting_location",
        }
    }
}

impl std::fmt::Display for ConversationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub state: ConversationState,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            state: ConversationState::AwaitingCrop,
            started_at: now,
            updated_at: now,
        }
    }

    pub fn advance_to(&mut self, state: ConversationState) {
        self.state = state;
        self.updated_at = Utc::now();
    }

    pub fn crop(&self) -> Option<&str> {
        match &self.state {
            ConversationState::AwaitingCrop => None,
            ConversationState::AwaitingStage { crop }
            | ConversationState::AwaitingLocation { crop, .. } => Some(crop),
        }
    }

    pub fn stage(&self) -> Option<StageType> {
        match &self.state {
            ConversationState::AwaitingLocation { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    pub fn is_idle_since(&self, cutoff: DateTime<Utc>) -> bool {
        self.updated_at < cutoff
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
