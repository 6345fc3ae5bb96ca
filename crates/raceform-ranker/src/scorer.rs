//! Per-runner score aggregation with missing-data weight redistribution.
//!
//! Components that produced a score share the full weight mass: each
//! available component's base weight is divided by the sum of available base
//! weights, so redistributed weights always sum to 1.0. Components without
//! data keep a weight of exactly 0 and contribute nothing.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use raceform_common::ranker_config::{Component, RankerConfig};

use crate::components::{score_component, RaceContext};
use crate::normalise::round_dp;

/// One component's contribution to a runner's total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentScore {
    /// `None` when the component had no data. Never defaulted.
    pub score: Option<f64>,
    /// Redistributed weight; exactly 0 for absent components.
    pub weight: f64,
    pub weighted_score: f64,
    pub reason: String,
}

/// A runner's full scoring breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scoring {
    pub total_score: f64,
    /// Empty when no component scored; otherwise holds all eight entries.
    pub components: BTreeMap<Component, ComponentScore>,
    /// Fraction of the configured weight mass that had data, before
    /// redistribution. Answers "how much signal was this total built from".
    pub available_weight: f64,
}

impl Scoring {
    /// Number of components that produced a score.
    pub fn components_with_data(&self) -> usize {
        self.components
            .values()
            .filter(|c| c.score.is_some())
            .count()
    }
}

/// Score one runner against the shared race context.
pub fn score_runner(ctx: &RaceContext, idx: usize, config: &RankerConfig) -> Scoring {
    let outcomes: Vec<_> = Component::ALL
        .iter()
        .map(|&c| (c, score_component(c, ctx, idx, config)))
        .collect();

    let available_weight: f64 = outcomes
        .iter()
        .filter(|(_, o)| o.score.is_some())
        .map(|(c, _)| config.weights.weight(*c))
        .sum();

    if available_weight <= 0.0 {
        return Scoring {
            total_score: 0.0,
            components: BTreeMap::new(),
            available_weight: 0.0,
        };
    }

    let mut components = BTreeMap::new();
    let mut total_score = 0.0;
    for (component, outcome) in outcomes {
        let entry = match outcome.score {
            Some(score) => {
                let weight = config.weights.weight(component) / available_weight;
                let weighted = score * weight;
                total_score += weighted;
                ComponentScore {
                    score: Some(score),
                    weight: round_dp(weight, 4),
                    weighted_score: round_dp(weighted, 2),
                    reason: outcome.reason,
                }
            }
            None => ComponentScore {
                score: None,
                weight: 0.0,
                weighted_score: 0.0,
                reason: outcome.reason,
            },
        };
        components.insert(component, entry);
    }

    Scoring {
        total_score: round_dp(total_score, 1),
        components,
        available_weight: round_dp(available_weight, 2),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use raceform_common::{FormLine, RaceMeta, Runner};

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn meta() -> RaceMeta {
        RaceMeta {
            track: Some("Cheltenham".to_string()),
            date: Some(date("2026-02-15")),
            distance: Some("2m4f".to_string()),
            going: Some("good_to_soft".to_string()),
            ..Default::default()
        }
    }

    fn bare_runner(name: &str) -> Runner {
        Runner {
            runner_name: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_no_data_runner_scores_zero_with_empty_map() {
        let meta = meta();
        let runners = vec![bare_runner("a"), bare_runner("b")];
        let ctx = RaceContext::new(&meta, &runners);
        let scoring = score_runner(&ctx, 0, &RankerConfig::default());

        assert_eq!(scoring.total_score, 0.0);
        assert!(scoring.components.is_empty());
        assert_eq!(scoring.available_weight, 0.0);
        assert_eq!(scoring.components_with_data(), 0);
    }

    #[test]
    fn test_single_component_takes_full_weight() {
        let meta = meta();
        let mut a = bare_runner("a");
        a.odds_decimal = Some(2.0);
        let mut b = bare_runner("b");
        b.odds_decimal = Some(4.0);
        let runners = vec![a, b];
        let ctx = RaceContext::new(&meta, &runners);
        let scoring = score_runner(&ctx, 0, &RankerConfig::default());

        // Only Market fired: its redistributed weight is 1.0 and it alone
        // determines the total.
        let market = &scoring.components[&Component::Market];
        assert_eq!(market.weight, 1.0);
        assert_eq!(scoring.total_score, 66.7);
        assert_eq!(scoring.available_weight, 0.3);

        // The other seven are present with zero weight and a reason.
        assert_eq!(scoring.components.len(), 8);
        for (component, entry) in &scoring.components {
            if *component != Component::Market {
                assert_eq!(entry.score, None);
                assert_eq!(entry.weight, 0.0);
                assert_eq!(entry.weighted_score, 0.0);
                assert!(!entry.reason.is_empty());
            }
        }
    }

    #[test]
    fn test_redistributed_weights_sum_to_one() {
        let meta = meta();
        let mut a = bare_runner("a");
        a.odds_decimal = Some(3.0);
        a.rpr = Some(140);
        a.trainer = Some("G. Elliott".to_string());
        a.recent_form = vec![FormLine {
            position: Some(1),
            date: Some(date("2026-01-20")),
            distance: Some("2m4f".to_string()),
            ..Default::default()
        }];
        let mut b = bare_runner("b");
        b.odds_decimal = Some(5.0);
        b.rpr = Some(120);
        let runners = vec![a, b];
        let ctx = RaceContext::new(&meta, &runners);
        let scoring = score_runner(&ctx, 0, &RankerConfig::default());

        let weight_sum: f64 = scoring.components.values().map(|c| c.weight).sum();
        assert!((weight_sum - 1.0).abs() < 1e-3);
        assert!(scoring.total_score > 0.0);
        assert!(scoring.total_score <= 100.0);
    }

    #[test]
    fn test_total_is_weighted_mean_of_available_scores() {
        let meta = meta();
        // Market and rating only: weights 0.30 and 0.25 redistribute to
        // 6/11 and 5/11.
        let mut a = bare_runner("a");
        a.odds_decimal = Some(2.0);
        a.rpr = Some(140);
        let mut b = bare_runner("b");
        b.odds_decimal = Some(4.0);
        b.rpr = Some(120);
        let runners = vec![a, b];
        let ctx = RaceContext::new(&meta, &runners);
        let scoring = score_runner(&ctx, 0, &RankerConfig::default());

        // 66.7 * 6/11 + 100 * 5/11 = 81.8
        assert_eq!(scoring.total_score, 81.8);
        assert_eq!(scoring.available_weight, 0.55);
        assert_eq!(scoring.components_with_data(), 2);
    }

    #[test]
    fn test_total_score_bounds() {
        let meta = meta();
        let mut a = bare_runner("a");
        a.odds_decimal = Some(1.2);
        a.rpr = Some(150);
        a.cd_winner = Some(true);
        let mut b = bare_runner("b");
        b.odds_decimal = Some(15.0);
        b.rpr = Some(100);
        let runners = vec![a, b];
        let ctx = RaceContext::new(&meta, &runners);

        for idx in 0..2 {
            let scoring = score_runner(&ctx, idx, &RankerConfig::default());
            assert!(scoring.total_score >= 0.0);
            assert!(scoring.total_score <= 100.0);
            // total is zero iff nothing scored
            assert_eq!(scoring.total_score == 0.0, scoring.components_with_data() == 0);
        }
    }
}
