//! De-margined win-market probabilities for one race.
//!
//! Bookmaker prices carry an overround: the implied probabilities `1/odds`
//! across a field sum to more than 1.0. Dividing each runner's implied
//! probability by that sum removes the margin and yields fair probabilities
//! that sum to 1.0 over the priced part of the field. The map is computed
//! once per race-scoring call, up front, and shared read-only by every
//! runner's Market component and by the confidence classifier.

use raceform_common::Runner;

/// Fair win probabilities, indexed by runner position in the input order.
#[derive(Debug, Clone)]
pub struct FairMarket {
    probs: Vec<Option<f64>>,
    overround: f64,
}

impl FairMarket {
    /// Build the fair-probability map for a field.
    ///
    /// Returns `None` when no runner carries valid odds: there is no market
    /// to de-margin and every Market component is absent.
    pub fn from_runners(runners: &[Runner]) -> Option<Self> {
        let implied: Vec<Option<f64>> = runners
            .iter()
            .map(|r| r.odds_decimal.filter(|o| *o > 1.0).map(|o| 1.0 / o))
            .collect();

        let overround: f64 = implied.iter().flatten().sum();
        if overround <= 0.0 {
            return None;
        }

        let probs = implied
            .iter()
            .map(|p| p.map(|p| p / overround))
            .collect();

        Some(Self { probs, overround })
    }

    /// Fair win probability of the runner at `idx` in input order.
    pub fn prob(&self, idx: usize) -> Option<f64> {
        self.probs.get(idx).copied().flatten()
    }

    /// The book total the margin was removed from (1.0 = a fair book).
    pub fn overround(&self) -> f64 {
        self.overround
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runner_at(odds: Option<f64>) -> Runner {
        Runner {
            runner_name: "r".to_string(),
            odds_decimal: odds,
            ..Default::default()
        }
    }

    #[test]
    fn test_demargin_two_runner_book() {
        // Implied 0.5 + 0.25 = 0.75 book; fair probs 2/3 and 1/3.
        let runners = vec![runner_at(Some(2.0)), runner_at(Some(4.0))];
        let fair = FairMarket::from_runners(&runners).unwrap();
        assert!((fair.prob(0).unwrap() - 2.0 / 3.0).abs() < 1e-9);
        assert!((fair.prob(1).unwrap() - 1.0 / 3.0).abs() < 1e-9);
        assert!((fair.overround() - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_fair_probs_sum_to_one_over_priced_field() {
        let runners = vec![
            runner_at(Some(3.5)),
            runner_at(Some(4.0)),
            runner_at(None),
            runner_at(Some(12.0)),
        ];
        let fair = FairMarket::from_runners(&runners).unwrap();
        let total: f64 = (0..4).filter_map(|i| fair.prob(i)).sum();
        assert!((total - 1.0).abs() < 1e-9);
        assert!(fair.prob(2).is_none());
    }

    #[test]
    fn test_invalid_odds_are_unpriced() {
        let runners = vec![runner_at(Some(0.8)), runner_at(Some(2.0))];
        let fair = FairMarket::from_runners(&runners).unwrap();
        assert!(fair.prob(0).is_none());
        assert_eq!(fair.prob(1), Some(1.0));
    }

    #[test]
    fn test_no_market_at_all() {
        let runners = vec![runner_at(None), runner_at(None)];
        assert!(FairMarket::from_runners(&runners).is_none());
    }
}
