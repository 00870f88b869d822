use serde::{Deserialize, Serialize};

/// Crop lifecycle phase a suitability check is run for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageType {
    Sowing,
    Harvesting,
}

impl StageType {
    /// Key used for this stage in the crop rule table.
    pub fn as_str(&self) -> &'static str {
        match self {
            StageType::Sowing => "sowing",
            StageType::Harvesting => "harvesting",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StageType::Sowing => "Sowing",
            StageType::Harvesting => "Harvesting",
        }
    }

    /// Parse a user-supplied stage token. Accepts the full name or its first letter.
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_lowercase().as_str() {
            "s" | "sowing" => Some(StageType::Sowing),
            "h" | "harvesting" => Some(StageType::Harvesting),
            _ => None,
        }
    }
}

impl std::fmt::Display for StageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Inclusive range of calendar months (1-12).
///
/// A window whose `end` is before its `start` wraps over the December/January
/// boundary, e.g. `11..=2` covers November through February.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthWindow {
    pub start: u32,
    pub end: u32,
}

impl MonthWindow {
    /// Returns `None` unless both bounds are valid month numbers.
    pub fn new(start: u32, end: u32) -> Option<Self> {
        if (1..=12).contains(&start) && (1..=12).contains(&end) {
            Some(Self { start, end })
        } else {
            None
        }
    }

    pub fn wraps(&self) -> bool {
        self.start > self.end
    }

    pub fn contains(&self, month: u32) -> bool {
        if self.wraps() {
            month >= self.start || month <= self.end
        } else {
            self.start <= month && month <= self.end
        }
    }
}

/// Weather and calendar requirements for one crop at one stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropStageRule {
    pub temp_min: f64,
    pub temp_max: f64,
    pub rain_min: f64,
    pub rain_max: f64,
    pub months: Option<MonthWindow>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_from_token_valid() {
        assert_eq!(StageType::from_token("s"), Some(StageType::Sowing));
        assert_eq!(StageType::from_token("Sowing"), Some(StageType::Sowing));
        assert_eq!(StageType::from_token(" h "), Some(StageType::Harvesting));
        assert_eq!(
            StageType::from_token("HARVESTING"),
            Some(StageType::Harvesting)
        );
    }

    #[test]
    fn stage_from_token_invalid() {
        assert_eq!(StageType::from_token("maybe"), None);
        assert_eq!(StageType::from_token(""), None);
        assert_eq!(StageType::from_token("sow"), None);
        assert_eq!(StageType::from_token("harvest"), None);
    }

    #[test]
    fn month_window_rejects_out_of_range() {
        assert!(MonthWindow::new(0, 5).is_none());
        assert!(MonthWindow::new(3, 13).is_none());
        assert!(MonthWindow::new(12, 1).is_some());
    }

    #[test]
    fn wrapping_window_covers_year_end() {
        let window = MonthWindow::new(11, 2).unwrap();
        assert!(window.wraps());
        for month in 1..=12 {
            let expected = matches!(month, 11 | 12 | 1 | 2);
            assert_eq!(window.contains(month), expected, "month {}", month);
        }
    }

    #[test]
    fn plain_window_is_inclusive() {
        let window = MonthWindow::new(3, 6).unwrap();
        assert!(!window.wraps());
        for month in 1..=12 {
            assert_eq!(window.contains(month), (3..=6).contains(&month), "month {}", month);
        }
    }

    #[test]
    fn single_month_window() {
        let window = MonthWindow::new(7, 7).unwrap();
        assert!(window.contains(7));
        assert!(!window.contains(6));
        assert!(!window.contains(8));
    }
}
