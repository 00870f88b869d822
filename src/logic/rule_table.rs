use crate::error::{AgriWeatherError, Result};
use crate::logic::report::title_case;
use crate::models::{CropStageRule, MonthWindow, StageType};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Why a crop/stage pair has no rule.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleLookupError {
    #[error("❌ No data available for crop: '{0}'")]
    CropUnknown(String),

    #[error("❌ Stage '{stage}' not found for crop '{crop}'")]
    StageUnknown { crop: String, stage: String },
}

// On-disk shape of a single stage entry
#[derive(Debug, Deserialize)]
struct RawStageRule {
    temp_min: f64,
    temp_max: f64,
    rain_min: f64,
    rain_max: f64,
    #[serde(default)]
    months: Vec<u32>,
}

/// Read-only crop → stage → rule lookup, keyed by lowercase names.
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    crops: HashMap<String, HashMap<String, CropStageRule>>,
}

impl RuleTable {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(AgriWeatherError::RuleTable(format!(
                "{} not found",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)?;
        let table = Self::from_json(&content)?;

        tracing::info!(
            "Loaded crop rules for {} crops from {}",
            table.crops.len(),
            path.display()
        );
        Ok(table)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let raw: HashMap<String, HashMap<String, RawStageRule>> = serde_json::from_str(content)
            .map_err(|e| AgriWeatherError::RuleTable(format!("not valid JSON: {}", e)))?;

        let mut crops = HashMap::with_capacity(raw.len());
        for (crop, stages) in raw {
            let crop = crop.trim().to_lowercase();
            let mut rules = HashMap::with_capacity(stages.len());
            for (stage, raw_rule) in stages {
                let stage = stage.trim().to_lowercase();
                let rule = validate_rule(&crop, &stage, raw_rule)?;
                rules.insert(stage, rule);
            }
            crops.insert(crop, rules);
        }

        Ok(Self { crops })
    }

    pub fn lookup(
        &self,
        crop: &str,
        stage: StageType,
    ) -> std::result::Result<&CropStageRule, RuleLookupError> {
        let crop = crop.trim().to_lowercase();
        let stages = self
            .crops
            .get(&crop)
            .ok_or_else(|| RuleLookupError::CropUnknown(title_case(&crop)))?;

        stages
            .get(stage.as_str())
            .ok_or_else(|| RuleLookupError::StageUnknown {
                crop: title_case(&crop),
                stage: stage.as_str().to_string(),
            })
    }

    /// Crop names in alphabetical order.
    pub fn crops(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.crops.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.crops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.crops.is_empty()
    }
}

fn validate_rule(crop: &str, stage: &str, raw: RawStageRule) -> Result<CropStageRule> {
    let invalid = |reason: String| {
        AgriWeatherError::RuleTable(format!("{}/{}: {}", crop, stage, reason))
    };

    if raw.temp_min > raw.temp_max {
        return Err(invalid(format!(
            "temp_min {} exceeds temp_max {}",
            raw.temp_min, raw.temp_max
        )));
    }
    if raw.rain_min > raw.rain_max {
        return Err(invalid(format!(
            "rain_min {} exceeds rain_max {}",
            raw.rain_min, raw.rain_max
        )));
    }

    let months = match raw.months.as_slice() {
        [] => None,
        [start, end] => Some(MonthWindow::new(*start, *end).ok_or_else(|| {
            invalid(format!("months [{}, {}] must be within 1-12", start, end))
        })?),
        other => {
            return Err(invalid(format!(
                "months must have exactly two values, found {}",
                other.len()
            )))
        }
    };

    Ok(CropStageRule {
        temp_min: raw.temp_min,
        temp_max: raw.temp_max,
        rain_min: raw.rain_min,
        rain_max: raw.rain_max,
        months,
    })
}
