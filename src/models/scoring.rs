//! Priority scoring and quadrant classification.
//!
//! Three formulas coexist, each tied to the display that shows it:
//!
//! - **Raw RICE** (`reach * impact * confidence% / effort`): ranks matrix
//!   rows and is shown as each row's score.
//! - **Normalized RICE** (raw / 3000 * 100): the kanban "RICE Score" label.
//! - **Simple score** (business impact * urgency * effort / 125 * 100): the
//!   entry form's quick value/effort framework.
//!
//! # Example
//!
//! ```
//! use roadmap::models::scoring::{Quadrant, ScoreInputs};
//!
//! let inputs = ScoreInputs { reach: 1000.0, impact: 3.0, confidence: 100.0, effort: 1.0 };
//! assert_eq!(inputs.raw(), 3000.0);
//! assert_eq!(inputs.normalized(), 100.0);
//! assert_eq!(Quadrant::classify(3.0, 1.0), Quadrant::QuickWins);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Scoring constants.
pub mod thresholds {
    /// Impact and effort strictly above this value count as "high".
    pub const QUADRANT_BOUNDARY: f64 = 2.5;

    /// Maximum raw RICE score: reach 1000, impact 3, confidence 100%, effort 1.
    pub const MAX_RAW_SCORE: f64 = (1000.0 * 3.0 * 1.0) / 1.0;

    /// Maximum of business impact * urgency * effort on 1-5 scales.
    pub const MAX_SIMPLE_SCORE: f64 = 5.0 * 5.0 * 5.0;

    /// Smallest effort used as a divisor.
    pub const MIN_EFFORT: f64 = 1.0;
}

/// The four RICE inputs of a feature.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreInputs {
    pub reach: f64,
    pub impact: f64,
    pub confidence: f64,
    pub effort: f64,
}

impl ScoreInputs {
    /// Raw RICE score. See [`raw_score`].
    pub fn raw(&self) -> f64 {
        raw_score(self.reach, self.impact, self.confidence, self.effort)
    }

    /// Normalized RICE score (0-100). See [`normalized_rice_score`].
    pub fn normalized(&self) -> f64 {
        normalized_rice_score(self.reach, self.impact, self.confidence, self.effort)
    }

    /// Normalized score rounded to one decimal.
    pub fn rounded(&self) -> f64 {
        rounded_rice_score(self.reach, self.impact, self.confidence, self.effort)
    }
}

/// Coerce a non-negative input: non-finite or negative values become 0.
fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Coerce an effort divisor: anything below 1 (or non-finite) becomes 1.
pub fn effort_divisor(effort: f64) -> f64 {
    if effort.is_finite() {
        effort.max(thresholds::MIN_EFFORT)
    } else {
        thresholds::MIN_EFFORT
    }
}

/// `reach * impact * (confidence / 100) / max(effort, 1)`.
///
/// Never panics and never divides by zero.
pub fn raw_score(reach: f64, impact: f64, confidence: f64, effort: f64) -> f64 {
    let confidence_fraction = non_negative(confidence) / 100.0;
    (non_negative(reach) * non_negative(impact) * confidence_fraction) / effort_divisor(effort)
}

/// Raw score scaled to 0-100 against the fixed maximum of 3000.
pub fn normalized_rice_score(reach: f64, impact: f64, confidence: f64, effort: f64) -> f64 {
    raw_score(reach, impact, confidence, effort) / thresholds::MAX_RAW_SCORE * 100.0
}

/// The entry form's simple framework: `impact * urgency * effort / 125 * 100`.
///
/// On this scale effort is inverted (5 = minimal work), so larger is better.
pub fn simple_score(business_impact: f64, urgency: f64, effort: f64) -> f64 {
    (non_negative(business_impact) * non_negative(urgency) * non_negative(effort))
        / thresholds::MAX_SIMPLE_SCORE
        * 100.0
}

/// Normalized RICE score rounded to one decimal, as the kanban label shows
/// it and the kanban sort compares it.
pub fn rounded_rice_score(reach: f64, impact: f64, confidence: f64, effort: f64) -> f64 {
    round1(normalized_rice_score(reach, impact, confidence, effort))
}

/// Round to one decimal place, the precision every score label uses.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Score label for matrix rows and tooltips: one decimal, or "N/A" for zero.
pub fn format_score(score: f64) -> String {
    if score.is_finite() && score != 0.0 {
        format!("{:.1}", score)
    } else {
        "N/A".to_string()
    }
}

/// Impact/effort quadrant of the prioritization matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quadrant {
    /// High impact, high effort
    HighValue,
    /// High impact, low effort
    QuickWins,
    /// Low impact, high effort
    Strategic,
    /// Low impact, low effort
    Foundation,
}

impl Quadrant {
    /// All quadrants in drawing order (top-left, top-right, bottom-left, bottom-right).
    pub const ALL: [Quadrant; 4] = [
        Quadrant::QuickWins,
        Quadrant::HighValue,
        Quadrant::Foundation,
        Quadrant::Strategic,
    ];

    /// Classify by impact and effort. The boundary value 2.5 counts as low.
    pub fn classify(impact: f64, effort: f64) -> Self {
        let high_impact = impact > thresholds::QUADRANT_BOUNDARY;
        let high_effort = effort > thresholds::QUADRANT_BOUNDARY;
        match (high_impact, high_effort) {
            (true, true) => Quadrant::HighValue,
            (true, false) => Quadrant::QuickWins,
            (false, true) => Quadrant::Strategic,
            (false, false) => Quadrant::Foundation,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Quadrant::HighValue => "high_value",
            Quadrant::QuickWins => "quick_wins",
            Quadrant::Strategic => "strategic",
            Quadrant::Foundation => "foundation",
        }
    }

    /// Parse from the snake_case key.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "high_value" => Some(Quadrant::HighValue),
            "quick_wins" => Some(Quadrant::QuickWins),
            "strategic" => Some(Quadrant::Strategic),
            "foundation" => Some(Quadrant::Foundation),
            _ => None,
        }
    }

    /// Header label.
    pub fn label(&self) -> &'static str {
        match self {
            Quadrant::HighValue => "HIGH VALUE",
            Quadrant::QuickWins => "QUICK WINS",
            Quadrant::Strategic => "STRATEGIC",
            Quadrant::Foundation => "FOUNDATION",
        }
    }

    /// Header description.
    pub fn description(&self) -> &'static str {
        match self {
            Quadrant::HighValue => "High impact, more effort",
            Quadrant::QuickWins => "High impact, less effort",
            Quadrant::Strategic => "Low impact, more effort",
            Quadrant::Foundation => "Low impact, less effort",
        }
    }
}

impl fmt::Display for Quadrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_inputs_score() {
        assert_eq!(raw_score(1000.0, 3.0, 100.0, 1.0), 3000.0);
        assert_eq!(normalized_rice_score(1000.0, 3.0, 100.0, 1.0), 100.0);
    }

    #[test]
    fn test_zero_reach_scores_zero() {
        for impact in [0.0, 1.5, 3.0] {
            for confidence in [0.0, 50.0, 100.0] {
                for effort in [1.0, 4.0, 8.0] {
                    assert_eq!(raw_score(0.0, impact, confidence, effort), 0.0);
                }
            }
        }
    }

    #[test]
    fn test_effort_below_one_is_treated_as_one() {
        let base = raw_score(100.0, 2.0, 50.0, 1.0);
        assert_eq!(raw_score(100.0, 2.0, 50.0, 0.0), base);
        assert_eq!(raw_score(100.0, 2.0, 50.0, -3.0), base);
        assert_eq!(raw_score(100.0, 2.0, 50.0, 0.25), base);
        assert_eq!(raw_score(100.0, 2.0, 50.0, f64::NAN), base);
    }

    #[test]
    fn test_non_finite_inputs_coerce_to_zero() {
        assert_eq!(raw_score(f64::NAN, 3.0, 100.0, 1.0), 0.0);
        assert_eq!(raw_score(100.0, f64::INFINITY, 100.0, 1.0), 0.0);
        assert_eq!(raw_score(-100.0, 3.0, 100.0, 1.0), 0.0);
    }

    #[test]
    fn test_raw_score_divides_by_effort() {
        assert_eq!(raw_score(500.0, 2.0, 80.0, 4.0), 200.0);
    }

    #[test]
    fn test_simple_score() {
        assert_eq!(simple_score(5.0, 5.0, 5.0), 100.0);
        assert!((simple_score(3.0, 3.0, 3.0) - 21.6).abs() < 1e-9);
    }

    #[test]
    fn test_quadrant_boundaries() {
        assert_eq!(Quadrant::classify(3.0, 3.0), Quadrant::HighValue);
        assert_eq!(Quadrant::classify(3.0, 2.5), Quadrant::QuickWins);
        assert_eq!(Quadrant::classify(2.5, 3.0), Quadrant::Strategic);
        assert_eq!(Quadrant::classify(2.5, 2.5), Quadrant::Foundation);
        assert_eq!(Quadrant::classify(0.0, 1.0), Quadrant::Foundation);
        assert_eq!(Quadrant::classify(2.51, 8.0), Quadrant::HighValue);
    }

    #[test]
    fn test_quadrant_parse_round_trip() {
        for quadrant in Quadrant::ALL {
            assert_eq!(Quadrant::parse(quadrant.as_str()), Some(quadrant));
        }
        assert_eq!(Quadrant::parse("blocked"), None);
    }

    #[test]
    fn test_format_score() {
        assert_eq!(format_score(3000.0), "3000.0");
        assert_eq!(format_score(12.345), "12.3");
        assert_eq!(format_score(0.0), "N/A");
        assert_eq!(format_score(f64::NAN), "N/A");
    }

    #[test]
    fn test_rounded_rice_score() {
        assert_eq!(rounded_rice_score(500.0, 3.0, 80.0, 2.0), 20.0);
        assert_eq!(rounded_rice_score(100.0, 1.0, 50.0, 3.0), 0.6);
    }

    #[test]
    fn test_round1() {
        assert_eq!(round1(13.333), 13.3);
        assert_eq!(round1(0.05), 0.1);
    }
}
