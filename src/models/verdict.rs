use serde::{Deserialize, Serialize};

/// Per-dimension outcome of a suitability check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub temperature_ok: bool,
    pub rainfall_ok: bool,
    /// `None` when the rule has no month window.
    pub month_ok: Option<bool>,
    pub suitable: bool,
}

impl Verdict {
    pub fn new(temperature_ok: bool, rainfall_ok: bool, month_ok: Option<bool>) -> Self {
        Self {
            temperature_ok,
            rainfall_ok,
            month_ok,
            suitable: temperature_ok && rainfall_ok && month_ok.unwrap_or(true),
        }
    }
}
