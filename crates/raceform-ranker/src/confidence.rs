//! Confidence banding for a ranked race.
//!
//! The preferred signal is the de-margined market probability gap between
//! the top two ranked runners, independent of which components fired. When
//! there is no usable market the classifier falls back to thresholds on the
//! raw score margin and the top runner's component count. Every band comes
//! with reasons: the banding must be auditable, not just a label.

use serde::{Deserialize, Serialize};

use raceform_common::ranker_config::{Component, ConfidenceConfig};

use crate::normalise::round_dp;
use crate::race::ScoredRunner;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Band {
    High,
    Med,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Confidence {
    pub band: Band,
    /// Total-score gap between the top two runners.
    pub margin: f64,
    pub reasons: Vec<String>,
}

/// Classify ranking reliability over the sorted runner list.
///
/// `fair_probs` holds the de-margined win probability of each runner in the
/// same (rank) order, `None` where the runner was unpriced.
pub fn classify(
    ranked: &[ScoredRunner],
    fair_probs: &[Option<f64>],
    config: &ConfidenceConfig,
) -> Confidence {
    if ranked.len() < 2 {
        return Confidence {
            band: Band::Low,
            margin: 0.0,
            reasons: vec!["Fewer than 2 runners scored".to_string()],
        };
    }

    let margin = round_dp(
        ranked[0].scoring.total_score - ranked[1].scoring.total_score,
        1,
    );
    let components_present = ranked[0].scoring.components_with_data();
    let total_components = Component::ALL.len();

    let gap = match (
        fair_probs.first().copied().flatten(),
        fair_probs.get(1).copied().flatten(),
    ) {
        (Some(top), Some(second)) => Some(top - second),
        _ => None,
    };

    let mut reasons = Vec::new();
    let band = match gap {
        Some(gap) => {
            if components_present >= config.min_components && gap >= config.high_gap {
                reasons.push(format!(
                    "Market gap of {:.1} pct points between 1st and 2nd",
                    gap * 100.0
                ));
                reasons.push(format!(
                    "{components_present}/{total_components} scoring components available"
                ));
                Band::High
            } else if gap >= config.med_gap {
                reasons.push(format!(
                    "Moderate market gap of {:.1} pct points",
                    gap * 100.0
                ));
                if components_present < config.min_components {
                    reasons.push(format!(
                        "Only {components_present}/{total_components} components scored"
                    ));
                }
                Band::Med
            } else {
                reasons.push(format!(
                    "Top two closely matched in the market (gap {:.1} pct points)",
                    gap * 100.0
                ));
                Band::Low
            }
        }
        None => {
            reasons.push("No usable market data; falling back to score margin".to_string());
            if components_present >= config.min_components && margin >= config.high_margin {
                reasons.push(format!("Margin of {margin} pts between 1st and 2nd"));
                reasons.push(format!(
                    "{components_present}/{total_components} scoring components available"
                ));
                Band::High
            } else if (margin >= config.med_margin && margin < config.high_margin)
                || components_present < config.min_components
            {
                if margin < config.high_margin {
                    reasons.push(format!("Moderate margin of {margin} pts"));
                }
                if components_present < config.min_components {
                    reasons.push(format!(
                        "Only {components_present}/{total_components} components scored"
                    ));
                }
                Band::Med
            } else {
                reasons.push(format!("Narrow margin of {margin} pts"));
                Band::Low
            }
        }
    };

    Confidence {
        band,
        margin,
        reasons,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use raceform_common::Runner;

    use crate::scorer::{ComponentScore, Scoring};

    fn scored(name: &str, total: f64, components_with_data: usize) -> ScoredRunner {
        let mut components = BTreeMap::new();
        for (i, component) in Component::ALL.iter().enumerate() {
            components.insert(
                *component,
                ComponentScore {
                    score: (i < components_with_data).then_some(total),
                    weight: 0.0,
                    weighted_score: 0.0,
                    reason: String::new(),
                },
            );
        }
        ScoredRunner {
            runner: Runner {
                runner_name: name.to_string(),
                ..Default::default()
            },
            scoring: Scoring {
                total_score: total,
                components,
                available_weight: 0.0,
            },
            rank: 0,
        }
    }

    #[test]
    fn test_single_runner_is_low() {
        let ranked = vec![scored("a", 80.0, 6)];
        let confidence = classify(&ranked, &[Some(1.0)], &ConfidenceConfig::default());
        assert_eq!(confidence.band, Band::Low);
        assert_eq!(confidence.margin, 0.0);
        assert!(confidence.reasons[0].contains("Fewer than 2"));
    }

    #[test]
    fn test_wide_market_gap_is_high() {
        // Odds 1.5 and 10.0: implied 0.667 and 0.100, book 0.767,
        // fair 0.870 and 0.130, gap 0.739.
        let ranked = vec![scored("a", 80.0, 6), scored("b", 40.0, 6)];
        let fair = [Some(0.870), Some(0.130)];
        let confidence = classify(&ranked, &fair, &ConfidenceConfig::default());
        assert_eq!(confidence.band, Band::High);
        assert!(confidence.reasons.iter().any(|r| r.contains("Market gap")));
    }

    #[test]
    fn test_wide_gap_with_thin_data_is_med() {
        let ranked = vec![scored("a", 60.0, 3), scored("b", 40.0, 3)];
        let fair = [Some(0.60), Some(0.30)];
        let confidence = classify(&ranked, &fair, &ConfidenceConfig::default());
        assert_eq!(confidence.band, Band::Med);
        assert!(confidence.reasons.iter().any(|r| r.contains("3/8")));
    }

    #[test]
    fn test_narrow_gap_is_low() {
        let ranked = vec![scored("a", 55.0, 6), scored("b", 54.0, 6)];
        let fair = [Some(0.35), Some(0.33)];
        let confidence = classify(&ranked, &fair, &ConfidenceConfig::default());
        assert_eq!(confidence.band, Band::Low);
    }

    #[test]
    fn test_fallback_margin_high() {
        let ranked = vec![scored("a", 70.0, 6), scored("b", 55.0, 6)];
        let confidence = classify(&ranked, &[None, None], &ConfidenceConfig::default());
        assert_eq!(confidence.band, Band::High);
        assert_eq!(confidence.margin, 15.0);
        assert!(confidence.reasons[0].contains("No usable market data"));
    }

    #[test]
    fn test_fallback_moderate_margin_is_med() {
        let ranked = vec![scored("a", 60.0, 6), scored("b", 55.0, 6)];
        let confidence = classify(&ranked, &[None, None], &ConfidenceConfig::default());
        assert_eq!(confidence.band, Band::Med);
    }

    #[test]
    fn test_fallback_thin_data_is_med_even_with_wide_margin() {
        let ranked = vec![scored("a", 70.0, 2), scored("b", 50.0, 2)];
        let confidence = classify(&ranked, &[None, None], &ConfidenceConfig::default());
        assert_eq!(confidence.band, Band::Med);
    }

    #[test]
    fn test_fallback_narrow_margin_is_low() {
        let ranked = vec![scored("a", 56.0, 6), scored("b", 54.0, 6)];
        let confidence = classify(&ranked, &[None, None], &ConfidenceConfig::default());
        assert_eq!(confidence.band, Band::Low);
        assert!(confidence.reasons.iter().any(|r| r.contains("Narrow margin")));
    }

    #[test]
    fn test_band_serializes_uppercase() {
        let json = serde_json::to_string(&Band::High).unwrap();
        assert_eq!(json, "\"HIGH\"");
    }
}
