use crate::models::{CropStageRule, Forecast, Place, StageType, Verdict};
use chrono::Month;
use std::fmt::Write;

/// Capitalize the first letter of every word and lowercase the rest.
/// Any non-alphabetic character starts a new word.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

pub fn month_name(month: u32) -> String {
    u8::try_from(month)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .map(|m| m.name().to_string())
        .unwrap_or_else(|| format!("Month {}", month))
}

fn mark(ok: bool, failure: &str) -> String {
    if ok {
        "✅ OK".to_string()
    } else {
        format!("⚠️ {}", failure)
    }
}

/// Human-readable breakdown of a verdict. The month lines only appear when
/// the rule has a month window.
pub fn render_advice(
    crop: &str,
    stage: StageType,
    rule: &CropStageRule,
    forecast: &Forecast,
    verdict: &Verdict,
    current_month: u32,
) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "🌾 *Crop:* {} ({} Stage)", title_case(crop), stage.label());

    if let (Some(window), Some(month_ok)) = (rule.months, verdict.month_ok) {
        let _ = writeln!(
            out,
            "🗓️ Ideal Months: {} to {}",
            month_name(window.start),
            month_name(window.end)
        );
        let _ = writeln!(
            out,
            "📅 Current: {} ({})",
            month_name(current_month),
            mark(month_ok, "Not ideal")
        );
    }

    let _ = writeln!(
        out,
        "🌡️ Temp: {:.1}°C ({})",
        forecast.temperature,
        mark(verdict.temperature_ok, "Out of range")
    );
    let _ = writeln!(
        out,
        "🌧️ Rain: {:.1} mm ({})",
        forecast.rainfall,
        mark(verdict.rainfall_ok, "Out of range")
    );
    let _ = writeln!(out, "🌤️ Weather: {}", forecast.description);

    if verdict.suitable {
        out.push_str("\n✅ Weather and timing are *suitable* for this crop stage!");
    } else {
        out.push_str("\n⚠️ One or more conditions are not ideal. Please be cautious.");
    }

    out
}

/// Final reply sent when a conversation completes.
pub fn render_completion(place: &Place, advice: &str) -> String {
    format!(
        "📍 *Location:* {}, {}\n\n{}",
        place.city, place.state, advice
    )
}
