//! Race orchestration: validate, score every runner, rank, pick, classify.
//!
//! Deterministic and free of I/O. Runners are scored independently against
//! the shared context; the only race-wide state is the fair-probability map
//! computed once before any runner is scored.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use raceform_common::entities::make_race_id;
use raceform_common::ranker_config::RankerConfig;
use raceform_common::{RaceData, RaceMeta, RaceformError, Result, Runner};

use crate::components::RaceContext;
use crate::confidence::{classify, Confidence};
use crate::scorer::{score_runner, Scoring};

/// One runner with its scoring breakdown and final rank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredRunner {
    #[serde(flatten)]
    pub runner: Runner,
    pub scoring: Scoring,
    /// 1-based; ties keep their original input order.
    pub rank: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pick {
    pub runner_name: String,
    pub rank: usize,
    pub score: f64,
}

/// Top three of the ranking, each present only if that many runners exist.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Picks {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_pick: Option<Pick>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_1: Option<Pick>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_2: Option<Pick>,
}

/// A fully scored race: ranked runners, picks, and confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceResult {
    pub race_id: String,
    pub meta: RaceMeta,
    /// Descending by total score.
    pub runners: Vec<ScoredRunner>,
    pub picks: Picks,
    pub confidence: Confidence,
}

/// Score all runners in a race and rank them.
///
/// Fails hard on a structurally broken record (no runners, anonymous
/// runner): ranking nothing, or something without a name, is meaningless and
/// no partial result is returned. Missing data on individual fields never
/// fails; it degrades to absent components.
pub fn score_race(race: &RaceData, config: &RankerConfig) -> Result<RaceResult> {
    if race.runners.is_empty() {
        return Err(RaceformError::InvalidRace("race has no runners".to_string()));
    }
    if let Some(pos) = race
        .runners
        .iter()
        .position(|r| r.runner_name.trim().is_empty())
    {
        return Err(RaceformError::InvalidRace(format!(
            "runner at position {pos} has an empty name"
        )));
    }

    let ctx = RaceContext::new(&race.meta, &race.runners);

    let scorings: Vec<Scoring> = (0..race.runners.len())
        .map(|idx| {
            let scoring = score_runner(&ctx, idx, config);
            debug!(
                runner = %race.runners[idx].runner_name,
                total = scoring.total_score,
                components = scoring.components_with_data(),
                "scored runner"
            );
            scoring
        })
        .collect();

    // Stable sort: equal totals keep their input order.
    let mut order: Vec<usize> = (0..race.runners.len()).collect();
    order.sort_by(|&a, &b| {
        scorings[b]
            .total_score
            .partial_cmp(&scorings[a].total_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let fair_probs: Vec<Option<f64>> = order
        .iter()
        .map(|&idx| ctx.fair_market.as_ref().and_then(|m| m.prob(idx)))
        .collect();

    let runners: Vec<ScoredRunner> = order
        .iter()
        .enumerate()
        .map(|(pos, &idx)| ScoredRunner {
            runner: race.runners[idx].clone(),
            scoring: scorings[idx].clone(),
            rank: pos + 1,
        })
        .collect();

    let pick_at = |pos: usize| {
        runners.get(pos).map(|r| Pick {
            runner_name: r.runner.runner_name.clone(),
            rank: r.rank,
            score: r.scoring.total_score,
        })
    };
    let picks = Picks {
        top_pick: pick_at(0),
        backup_1: pick_at(1),
        backup_2: pick_at(2),
    };

    let confidence = classify(&runners, &fair_probs, &config.confidence);

    let race_id = if race.race_id.is_empty() {
        make_race_id(&race.meta)
    } else {
        race.race_id.clone()
    };

    info!(
        race_id = %race_id,
        runners = runners.len(),
        band = ?confidence.band,
        "scored race"
    );

    Ok(RaceResult {
        race_id,
        meta: race.meta.clone(),
        runners,
        picks,
        confidence,
    })
}
