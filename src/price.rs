//! Conversion between predicted probabilities (expressed as percentages) and fair decimal odds.

use serde::{Deserialize, Serialize};

/// Rounds `value` to the given number of decimal places, half away from zero.
pub fn round_to(value: f64, places: u8) -> f64 {
    let scale = 10f64.powi(places as i32);
    (value * scale).round() / scale
}

/// Fair decimal odds for a probability percentage, rounded to two decimal places. A non-positive
/// or undefined probability yields the `0.0` sentinel, meaning "no fair odds". Probabilities above
/// 100 are not clamped.
pub fn fair_odds(probability: f64) -> f64 {
    if probability.is_nan() || probability <= 0.0 {
        return 0.0;
    }
    round_to(100.0 / probability, 2)
}

/// The probability percentage implied by decimal `odds`, rounded to one decimal place; `0.0` when
/// the odds are non-positive or undefined.
pub fn implied_probability(odds: f64) -> f64 {
    if odds.is_nan() || odds <= 0.0 {
        return 0.0;
    }
    round_to(100.0 / odds, 1)
}

/// Renders a percentage to one decimal place, e.g. `"55.0%"`. Zero renders as `"0%"`.
pub fn format_percentage(probability: f64) -> String {
    if probability == 0.0 || probability.is_nan() {
        return "0%".into();
    }
    format!("{probability:.1}%")
}

/// Coarse confidence band of a predicted probability.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum_macros::Display, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProbabilityTier {
    High,
    Medium,
    Low,
}
impl ProbabilityTier {
    pub const HIGH: f64 = 60.0;
    pub const MEDIUM: f64 = 40.0;

    pub fn of(probability: f64) -> Self {
        if probability >= Self::HIGH {
            ProbabilityTier::High
        } else if probability >= Self::MEDIUM {
            ProbabilityTier::Medium
        } else {
            ProbabilityTier::Low
        }
    }
}
