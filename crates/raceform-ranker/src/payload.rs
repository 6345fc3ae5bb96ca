//! Display-payload shaping for the presentation layer.
//!
//! Losslessly reshapes a `RaceResult` for a display-oriented consumer:
//! component entries become an ordered list with human-readable labels,
//! every badge/rating/freshness field survives even when absent (absent
//! serializes as `null`, never as 0/false), and the payload always carries
//! the statistical-use disclaimer.

use serde::{Deserialize, Serialize};

use raceform_common::ranker_config::Component;
use raceform_common::{FormLine, RaceMeta};

use crate::confidence::Confidence;
use crate::race::{Picks, RaceResult};

pub const DISCLAIMER: &str = "These rankings represent statistical analysis only. \
They are not predictions or guarantees. Racing outcomes are inherently uncertain. \
Use for personal research only.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentPayload {
    pub name: String,
    pub score: Option<f64>,
    pub weight: f64,
    pub weighted_score: f64,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunnerPayload {
    pub rank: usize,
    pub runner_name: String,
    pub number: Option<u32>,
    pub draw: Option<u32>,
    pub age: Option<u32>,
    pub weight: Option<String>,
    pub official_rating: Option<i32>,
    pub rpr: Option<i32>,
    pub ts: Option<i32>,
    pub jockey: Option<String>,
    pub trainer: Option<String>,
    pub trainer_rtf: Option<f64>,
    pub odds_decimal: Option<f64>,
    pub days_since_last_run: Option<u32>,
    pub course_winner: Option<bool>,
    pub distance_winner: Option<bool>,
    pub cd_winner: Option<bool>,
    pub total_score: f64,
    pub available_weight: f64,
    /// In configured component order; empty when nothing scored.
    pub components: Vec<ComponentPayload>,
    pub recent_form: Vec<FormLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RacePayload {
    pub race_id: String,
    pub meta: RaceMeta,
    pub runners: Vec<RunnerPayload>,
    pub picks: Picks,
    pub confidence: Confidence,
    pub disclaimer: String,
}

/// Reshape a scored race into the frontend-friendly format.
pub fn build_web_payload(result: &RaceResult) -> RacePayload {
    let runners = result
        .runners
        .iter()
        .map(|scored| {
            let components = Component::ALL
                .iter()
                .filter_map(|c| {
                    scored.scoring.components.get(c).map(|entry| ComponentPayload {
                        name: c.label().to_string(),
                        score: entry.score,
                        weight: entry.weight,
                        weighted_score: entry.weighted_score,
                        reason: entry.reason.clone(),
                    })
                })
                .collect();

            let runner = &scored.runner;
            RunnerPayload {
                rank: scored.rank,
                runner_name: runner.runner_name.clone(),
                number: runner.number,
                draw: runner.draw,
                age: runner.age,
                weight: runner.weight.clone(),
                official_rating: runner.official_rating,
                rpr: runner.rpr,
                ts: runner.ts,
                jockey: runner.jockey.clone(),
                trainer: runner.trainer.clone(),
                trainer_rtf: runner.trainer_rtf,
                odds_decimal: runner.odds_decimal,
                days_since_last_run: runner.days_since_last_run,
                course_winner: runner.course_winner,
                distance_winner: runner.distance_winner,
                cd_winner: runner.cd_winner,
                total_score: scored.scoring.total_score,
                available_weight: scored.scoring.available_weight,
                components,
                recent_form: runner.recent_form.clone(),
            }
        })
        .collect();

    RacePayload {
        race_id: result.race_id.clone(),
        meta: result.meta.clone(),
        runners,
        picks: result.picks.clone(),
        confidence: result.confidence.clone(),
        disclaimer: DISCLAIMER.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use raceform_common::ranker_config::RankerConfig;
    use raceform_common::{RaceData, RaceMeta, Runner};

    use crate::race::score_race;

    fn sample_result() -> RaceResult {
        let race = RaceData {
            race_id: "test-race".to_string(),
            meta: RaceMeta {
                track: Some("Ascot".to_string()),
                date: Some("2026-02-15".parse().unwrap()),
                ..Default::default()
            },
            runners: vec![
                Runner {
                    runner_name: "Priced".to_string(),
                    odds_decimal: Some(2.0),
                    rpr: Some(140),
                    ..Default::default()
                },
                Runner {
                    runner_name: "Blank".to_string(),
                    ..Default::default()
                },
            ],
        };
        score_race(&race, &RankerConfig::default()).unwrap()
    }

    #[test]
    fn test_payload_carries_disclaimer() {
        let payload = build_web_payload(&sample_result());
        assert_eq!(payload.disclaimer, DISCLAIMER);
        assert!(payload.disclaimer.contains("statistical analysis only"));
    }

    #[test]
    fn test_component_labels_are_human_readable() {
        let payload = build_web_payload(&sample_result());
        let names: Vec<&str> = payload.runners[0]
            .components
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names[0], "Market");
        assert!(names.contains(&"Course/Distance"));
        assert!(names.contains(&"Market Expectation"));
    }

    #[test]
    fn test_absent_fields_serialize_as_null() {
        let payload = build_web_payload(&sample_result());
        let json = serde_json::to_value(&payload).unwrap();

        let blank = &json["runners"][1];
        assert_eq!(blank["runner_name"], "Blank");
        assert!(blank["odds_decimal"].is_null());
        assert!(blank["course_winner"].is_null());
        assert!(blank["days_since_last_run"].is_null());
        assert!(blank["rpr"].is_null());
        assert_eq!(blank["total_score"], 0.0);
        assert_eq!(blank["components"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn test_payload_preserves_ranking_and_scores() {
        let result = sample_result();
        let payload = build_web_payload(&result);
        assert_eq!(payload.race_id, "test-race");
        assert_eq!(payload.runners.len(), 2);
        assert_eq!(payload.runners[0].rank, 1);
        assert_eq!(
            payload.runners[0].total_score,
            result.runners[0].scoring.total_score
        );
        let market = &payload.runners[0].components[0];
        assert!(market.score.is_some());
        assert!(market.reason.contains("Odds"));
    }
}
