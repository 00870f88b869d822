use crate::models::{CropStageRule, Forecast, Verdict};

/// Compare a forecast and the current month against a crop stage rule.
///
/// All bounds are inclusive. The month check only applies when the rule has a
/// window; wrapping windows (start after end) span the new year.
pub fn evaluate(rule: &CropStageRule, forecast: &Forecast, current_month: u32) -> Verdict {
    let temperature_ok =
        rule.temp_min <= forecast.temperature && forecast.temperature <= rule.temp_max;
    let rainfall_ok = rule.rain_min <= forecast.rainfall && forecast.rainfall <= rule.rain_max;
    let month_ok = rule.months.map(|window| window.contains(current_month));

    Verdict::new(temperature_ok, rainfall_ok, month_ok)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MonthWindow;

    fn rule(months: Option<(u32, u32)>) -> CropStageRule {
        CropStageRule {
            temp_min: 20.0,
            temp_max: 35.0,
            rain_min: 50.0,
            rain_max: 200.0,
            months: months.and_then(|(s, e)| MonthWindow::new(s, e)),
        }
    }

    #[test]
    fn rice_sowing_in_july_is_suitable() {
        let forecast = Forecast::new(28.0, 80.0, "light rain");
        let verdict = evaluate(&rule(Some((6, 9))), &forecast, 7);

        assert!(verdict.temperature_ok);
        assert!(verdict.rainfall_ok);
        assert_eq!(verdict.month_ok, Some(true));
        assert!(verdict.suitable);
    }

    #[test]
    fn temperature_bounds_are_inclusive() {
        let r = rule(None);
        assert!(evaluate(&r, &Forecast::new(20.0, 80.0, ""), 1).temperature_ok);
        assert!(evaluate(&r, &Forecast::new(35.0, 80.0, ""), 1).temperature_ok);
        assert!(!evaluate(&r, &Forecast::new(19.0, 80.0, ""), 1).temperature_ok);
        assert!(!evaluate(&r, &Forecast::new(36.0, 80.0, ""), 1).temperature_ok);
    }

    #[test]
    fn rainfall_bounds_are_inclusive() {
        let r = rule(None);
        assert!(evaluate(&r, &Forecast::new(25.0, 50.0, ""), 1).rainfall_ok);
        assert!(evaluate(&r, &Forecast::new(25.0, 200.0, ""), 1).rainfall_ok);
        assert!(!evaluate(&r, &Forecast::new(25.0, 49.0, ""), 1).rainfall_ok);
        assert!(!evaluate(&r, &Forecast::new(25.0, 201.0, ""), 1).rainfall_ok);
    }

    #[test]
    fn wrapping_window_every_month() {
        let r = rule(Some((11, 2)));
        let forecast = Forecast::new(25.0, 100.0, "");
        for month in 1..=12 {
            let verdict = evaluate(&r, &forecast, month);
            let expected = matches!(month, 11 | 12 | 1 | 2);
            assert_eq!(verdict.month_ok, Some(expected), "month {}", month);
            assert_eq!(verdict.suitable, expected, "month {}", month);
        }
    }

    #[test]
    fn plain_window_every_month() {
        let r = rule(Some((3, 6)));
        let forecast = Forecast::new(25.0, 100.0, "");
        for month in 1..=12 {
            let verdict = evaluate(&r, &forecast, month);
            assert_eq!(verdict.month_ok, Some((3..=6).contains(&month)), "month {}", month);
        }
    }

    #[test]
    fn no_window_ignores_month() {
        let r = rule(None);
        let forecast = Forecast::new(25.0, 100.0, "");
        for month in 1..=12 {
            let verdict = evaluate(&r, &forecast, month);
            assert_eq!(verdict.month_ok, None);
            assert!(verdict.suitable);
        }
    }

    #[test]
    fn any_failed_dimension_fails_overall() {
        let r = rule(Some((6, 9)));
        assert!(!evaluate(&r, &Forecast::new(40.0, 80.0, ""), 7).suitable);
        assert!(!evaluate(&r, &Forecast::new(28.0, 10.0, ""), 7).suitable);
        assert!(!evaluate(&r, &Forecast::new(28.0, 80.0, ""), 1).suitable);
    }

    #[test]
    fn repeated_calls_agree() {
        let r = rule(Some((11, 2)));
        let forecast = Forecast::new(22.5, 60.0, "haze");
        for month in 1..=12 {
            assert_eq!(evaluate(&r, &forecast, month), evaluate(&r, &forecast, month));
        }
    }
}
