//! The eight component scorers.
//!
//! Each scorer maps one runner (plus shared race context) to an optional
//! 0-100 score and a human-readable justification. The central contract:
//! a component returns `None` whenever its required inputs are missing or
//! uninformative. An absent input never becomes a score.

use raceform_common::ranker_config::{
    Component, ConnectionsConfig, MarketExpectationConfig, RankerConfig,
};
use raceform_common::{FormLine, RaceMeta, Runner};

use crate::market::FairMarket;
use crate::normalise::{distance_to_furlongs, going_ordinal, round_dp, weight_to_lbs};

/// Shared, read-only context for scoring one race.
///
/// The fair-probability map is computed once here, up front, so every
/// runner's Market component and the confidence classifier read the same
/// figures without re-deriving them.
pub struct RaceContext<'a> {
    pub meta: &'a RaceMeta,
    pub runners: &'a [Runner],
    pub fair_market: Option<FairMarket>,
}

impl<'a> RaceContext<'a> {
    pub fn new(meta: &'a RaceMeta, runners: &'a [Runner]) -> Self {
        Self {
            meta,
            runners,
            fair_market: FairMarket::from_runners(runners),
        }
    }
}

/// Result of one component scorer: an optional score plus its justification.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentOutcome {
    pub score: Option<f64>,
    pub reason: String,
}

impl ComponentOutcome {
    fn scored(score: f64, reason: impl Into<String>) -> Self {
        Self {
            score: Some(round_dp(score, 1)),
            reason: reason.into(),
        }
    }

    fn absent(reason: impl Into<String>) -> Self {
        Self {
            score: None,
            reason: reason.into(),
        }
    }
}

/// Dispatch one component for the runner at `idx`.
pub fn score_component(
    component: Component,
    ctx: &RaceContext,
    idx: usize,
    config: &RankerConfig,
) -> ComponentOutcome {
    let runner = &ctx.runners[idx];
    match component {
        Component::Market => score_market(ctx, idx),
        Component::Rating => score_rating(ctx, idx),
        Component::Form => score_form(runner, ctx.meta),
        Component::Suitability => score_suitability(runner, ctx.meta),
        Component::Freshness => score_freshness(runner, ctx.meta),
        Component::CdProfile => score_cd_profile(runner),
        Component::Connections => score_connections(runner, &config.connections),
        Component::MarketExpectation => {
            score_market_expectation(ctx, idx, &config.market_expectation)
        }
    }
}

/// Recency weight for the i-th most recent run (0-indexed).
fn recency_weight(i: usize) -> f64 {
    1.0 / (1.0 + 0.3 * i as f64)
}

// ---------------------------------------------------------------------------
// Market
// ---------------------------------------------------------------------------

/// De-margined market signal: the runner's fair share of the book, as a
/// percentage.
fn score_market(ctx: &RaceContext, idx: usize) -> ComponentOutcome {
    let runner = &ctx.runners[idx];
    let Some(odds) = runner.odds_decimal.filter(|o| *o > 1.0) else {
        return ComponentOutcome::absent("No odds available");
    };
    let Some(fair) = ctx.fair_market.as_ref().and_then(|m| m.prob(idx)) else {
        return ComponentOutcome::absent("No odds available");
    };

    let overround = ctx
        .fair_market
        .as_ref()
        .map(|m| m.overround())
        .unwrap_or(1.0);
    ComponentOutcome::scored(
        fair * 100.0,
        format!(
            "Odds {:.2} (implied {:.1}%, fair {:.1}% in a {:.0}% book)",
            odds,
            100.0 / odds,
            fair * 100.0,
            overround * 100.0,
        ),
    )
}

// ---------------------------------------------------------------------------
// Rating
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
enum Figure {
    Rpr,
    Ts,
    Official,
    Weight,
}

impl Figure {
    /// Priority order: external rating, speed figure, official rating, then
    /// carried weight as a proxy (meaningful in handicaps only).
    const PRIORITY: [Figure; 4] = [Figure::Rpr, Figure::Ts, Figure::Official, Figure::Weight];

    fn value(self, runner: &Runner) -> Option<f64> {
        match self {
            Figure::Rpr => runner.rpr.map(f64::from),
            Figure::Ts => runner.ts.map(f64::from),
            Figure::Official => runner.official_rating.map(f64::from),
            Figure::Weight => runner
                .weight
                .as_deref()
                .and_then(weight_to_lbs)
                .map(f64::from),
        }
    }
}

/// Ability signal: rescale the runner's best-available figure into the
/// field's observed range. A figure with zero spread says nothing about
/// relative ability, so the chain falls through to the next one.
fn score_rating(ctx: &RaceContext, idx: usize) -> ComponentOutcome {
    let runner = &ctx.runners[idx];

    for figure in Figure::PRIORITY {
        if matches!(figure, Figure::Weight) && !ctx.meta.is_handicap() {
            continue;
        }
        let Some(mine) = figure.value(runner) else {
            continue;
        };

        let field: Vec<f64> = ctx.runners.iter().filter_map(|r| figure.value(r)).collect();
        let min = field.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = field.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let spread = max - min;
        if spread <= f64::EPSILON {
            continue;
        }

        let score = 100.0 * (mine - min) / spread;
        let reason = match figure {
            Figure::Rpr => format!("RPR {mine:.0} (field {min:.0}-{max:.0})"),
            Figure::Ts => format!("Speed figure {mine:.0} (field {min:.0}-{max:.0})"),
            Figure::Official => format!("OR {mine:.0} (field {min:.0}-{max:.0})"),
            Figure::Weight => format!(
                "Weight {mine:.0} lbs as rating proxy (field {min:.0}-{max:.0} lbs)"
            ),
        };
        return ComponentOutcome::scored(score, reason);
    }

    ComponentOutcome::absent("No rating figure with usable spread across the field")
}

// ---------------------------------------------------------------------------
// Form
// ---------------------------------------------------------------------------

/// Recent-form signal: recency-weighted average of per-run scores, with a
/// small consistency bonus for an unbroken run of top-three finishes.
fn score_form(runner: &Runner, meta: &RaceMeta) -> ComponentOutcome {
    let form = runner.form_before(meta.date);
    if form.is_empty() {
        return ComponentOutcome::absent("No recent form data");
    }

    let positions: Vec<(usize, u32)> = form
        .iter()
        .enumerate()
        .filter_map(|(i, line)| line.position.map(|p| (i, p)))
        .collect();
    if positions.is_empty() {
        return ComponentOutcome::absent("Form present but no parseable finishing positions");
    }

    let mut weighted = 0.0;
    let mut total_weight = 0.0;
    for &(i, pos) in &positions {
        let run_score = (100.0 - 15.0 * pos.saturating_sub(1) as f64).max(0.0);
        let w = recency_weight(i);
        weighted += run_score * w;
        total_weight += w;
    }
    let mut score = weighted / total_weight;

    let consistent = positions.len() >= 2 && positions.iter().all(|&(_, p)| p <= 3);
    if consistent {
        score = (score + 5.0).min(100.0);
    }

    let pos_str = positions
        .iter()
        .map(|&(_, p)| p.to_string())
        .collect::<Vec<_>>()
        .join("/");
    let mut reason = format!("Recent positions: {pos_str} (recency-weighted avg)");
    if consistent {
        reason.push_str("; consistent top-3 bonus");
    }
    ComponentOutcome::scored(score, reason)
}

// ---------------------------------------------------------------------------
// Suitability
// ---------------------------------------------------------------------------

/// Conditions signal: how closely the runner's recent runs resemble today's
/// distance, going and course. Distance and going use exponential similarity
/// so a near miss still earns most of the credit.
fn score_suitability(runner: &Runner, meta: &RaceMeta) -> ComponentOutcome {
    let form = runner.form_before(meta.date);
    if form.is_empty() {
        return ComponentOutcome::absent("No form to assess suitability");
    }

    let today_dist = meta.distance.as_deref().and_then(distance_to_furlongs);
    let today_going = meta.going.as_deref().and_then(going_ordinal);
    let today_track = meta.track.as_deref().map(str::to_lowercase);
    if today_dist.is_none() && today_going.is_none() && today_track.is_none() {
        return ComponentOutcome::absent("No race conditions to compare against");
    }

    let mut score = 50.0;
    let mut parts: Vec<String> = Vec::new();

    // Distance: up to +20 for recency-weighted similarity.
    if let Some(td) = today_dist {
        let mut num = 0.0;
        let mut den = 0.0;
        for (i, line) in form.iter().enumerate() {
            if let Some(rd) = line.distance.as_deref().and_then(distance_to_furlongs) {
                let w = recency_weight(i);
                num += (-(td - rd).abs() / 2.5).exp() * w;
                den += w;
            }
        }
        if den > 0.0 {
            let sim = num / den;
            score += 20.0 * sim;
            parts.push(format!("distance similarity {sim:.2}"));
        }
    }

    // Going: up to +20.
    if let Some(tg) = today_going {
        let mut num = 0.0;
        let mut den = 0.0;
        for (i, line) in form.iter().enumerate() {
            if let Some(rg) = line.going.as_deref().and_then(going_ordinal) {
                let w = recency_weight(i);
                num += (-(tg - rg).abs()).exp() * w;
                den += w;
            }
        }
        if den > 0.0 {
            let sim = num / den;
            score += 20.0 * sim;
            parts.push(format!("going similarity {sim:.2}"));
        }
    }

    // Course: up to +10 for the fraction of recent runs at today's track.
    if let Some(tt) = &today_track {
        let matches = form
            .iter()
            .filter(|line| {
                line.track
                    .as_deref()
                    .map(|rt| rt.to_lowercase().contains(tt.as_str()))
                    .unwrap_or(false)
            })
            .count();
        score += 10.0 * matches as f64 / form.len() as f64;
        if matches > 0 {
            parts.push(format!(
                "{matches}/{} runs at {}",
                form.len(),
                meta.track.as_deref().unwrap_or("this course"),
            ));
        }
    }

    let reason = if parts.is_empty() {
        "Limited suitability data".to_string()
    } else {
        parts.join("; ")
    };
    ComponentOutcome::scored(score.clamp(0.0, 100.0), reason)
}

// ---------------------------------------------------------------------------
// Freshness
// ---------------------------------------------------------------------------

/// Days-since-last-run signal. The 14-35 day window is the sweet spot:
/// recovered from the last effort, not yet losing fitness.
fn score_freshness(runner: &Runner, meta: &RaceMeta) -> ComponentOutcome {
    let days: Option<i64> = runner.days_since_last_run.map(i64::from).or_else(|| {
        let race = meta.date?;
        let last = runner
            .form_before(meta.date)
            .iter()
            .filter_map(|line| line.date)
            .max()?;
        let d = (race - last).num_days();
        (d > 0).then_some(d)
    });
    let Some(days) = days else {
        return ComponentOutcome::absent("No days since last run derivable");
    };

    let (score, note) = match days {
        d if d < 7 => (55.0, "quick turnaround"),
        d if d <= 13 => (68.0, "recent outing"),
        d if d <= 35 => (100.0, "in the 14-35 day sweet spot"),
        d if d <= 60 => (80.0, "slightly fresh"),
        d if d <= 120 => (58.0, "long break"),
        _ => (30.0, "returning from extended absence"),
    };
    ComponentOutcome::scored(score, format!("Off {days} days ({note})"))
}

// ---------------------------------------------------------------------------
// Course/Distance profile
// ---------------------------------------------------------------------------

/// Proven-at badges. All three unknown means the record is silent, which is
/// different from a known non-winner.
fn score_cd_profile(runner: &Runner) -> ComponentOutcome {
    let (course, distance, cd) = (
        runner.course_winner,
        runner.distance_winner,
        runner.cd_winner,
    );
    if course.is_none() && distance.is_none() && cd.is_none() {
        return ComponentOutcome::absent("No course/distance record known");
    }

    if cd == Some(true) || (course == Some(true) && distance == Some(true)) {
        ComponentOutcome::scored(90.0, "Course & distance winner")
    } else if course == Some(true) {
        ComponentOutcome::scored(70.0, "Course winner")
    } else if distance == Some(true) {
        ComponentOutcome::scored(65.0, "Distance winner")
    } else {
        ComponentOutcome::scored(50.0, "No course/distance win recorded")
    }
}

// ---------------------------------------------------------------------------
// Connections
// ---------------------------------------------------------------------------

/// Trainer/jockey signal. With a trainer RTF% the yard's current form drives
/// the score; otherwise named connections earn a neutral 50.
fn score_connections(runner: &Runner, config: &ConnectionsConfig) -> ComponentOutcome {
    if runner.jockey.is_none() && runner.trainer.is_none() {
        return ComponentOutcome::absent("No jockey/trainer data");
    }

    let mut parts: Vec<String> = Vec::new();
    if let Some(jockey) = &runner.jockey {
        parts.push(format!("J: {jockey}"));
    }
    if let Some(trainer) = &runner.trainer {
        parts.push(format!("T: {trainer}"));
    }
    let who = parts.join(", ");

    match runner.trainer_rtf {
        Some(rtf) => {
            let score = (config.base + config.per_point * rtf).clamp(config.floor, config.ceiling);
            let yard = if rtf >= config.hot_rtf {
                "in-form yard"
            } else if rtf <= config.cold_rtf {
                "cold yard"
            } else {
                "steady yard"
            };
            ComponentOutcome::scored(score, format!("{who} (trainer RTF {rtf:.0}%, {yard})"))
        }
        None => ComponentOutcome::scored(50.0, format!("{who} (no form stats, neutral)")),
    }
}

// ---------------------------------------------------------------------------
// Market expectation
// ---------------------------------------------------------------------------

/// Previous-race market signal: what the market thought last time and whether
/// the runner delivered. Favouritism is taken from explicit flags when the
/// source provides them, otherwise derived by comparing starting prices
/// across the cohort of today's runners who contested that same race.
fn score_market_expectation(
    ctx: &RaceContext,
    idx: usize,
    config: &MarketExpectationConfig,
) -> ComponentOutcome {
    let runner = &ctx.runners[idx];
    let form = runner.form_before(ctx.meta.date);
    let Some(prev) = form.first() else {
        return ComponentOutcome::absent("No previous run on record");
    };
    let Some(sp) = prev.sp_decimal.filter(|s| *s > 1.0) else {
        return ComponentOutcome::absent("No usable starting price for previous run");
    };

    let (derived_fav, derived_joint) = derive_prev_favouritism(ctx, idx, prev, sp);
    let favourite = prev.favourite.unwrap_or(derived_fav);
    let joint = prev.joint_favourite.unwrap_or(derived_joint);
    let won = prev.position == Some(1);
    let beaten_fav = favourite && !won;

    let market_confidence = config.confidence_scale
        * (1.0 / sp).clamp(1.0 / config.odds_max, 1.0 / config.odds_min);
    let mut score = 50.0 + market_confidence;
    if favourite {
        score += config.last_fav;
    }
    if beaten_fav {
        score += config.last_beaten_fav;
    }
    if joint {
        score += config.last_joint_fav;
    }

    let mut notes: Vec<&str> = Vec::new();
    if joint {
        notes.push("joint favourite");
    } else if favourite {
        notes.push("favourite");
    }
    if beaten_fav {
        notes.push("beaten");
    } else if won {
        notes.push("won");
    }
    let reason = if notes.is_empty() {
        format!("Last run SP {sp:.2}")
    } else {
        format!("Last run SP {sp:.2} ({})", notes.join(", "))
    };
    ComponentOutcome::scored(score.clamp(0.0, 100.0), reason)
}

/// Compare starting prices across today's runners whose most recent run
/// shares the previous run's date and track. Shortest price is the
/// favourite; a tie at the top makes it joint. Too small a cohort to tell
/// means no favouritism is claimed.
fn derive_prev_favouritism(
    ctx: &RaceContext,
    idx: usize,
    prev: &FormLine,
    own_sp: f64,
) -> (bool, bool) {
    let (Some(date), Some(track)) = (prev.date, prev.track.as_deref()) else {
        return (false, false);
    };
    let track = track.to_lowercase();

    let mut cohort_sps = vec![own_sp];
    for (j, other) in ctx.runners.iter().enumerate() {
        if j == idx {
            continue;
        }
        let other_form = other.form_before(ctx.meta.date);
        let Some(other_prev) = other_form.first() else {
            continue;
        };
        let same_race = other_prev.date == Some(date)
            && other_prev
                .track
                .as_deref()
                .map(|t| t.to_lowercase() == track)
                .unwrap_or(false);
        if same_race {
            if let Some(sp) = other_prev.sp_decimal.filter(|s| *s > 1.0) {
                cohort_sps.push(sp);
            }
        }
    }
    if cohort_sps.len() < 2 {
        return (false, false);
    }

    let min = cohort_sps.iter().cloned().fold(f64::INFINITY, f64::min);
    let fav = own_sp <= min + 1e-9;
    let joint = fav
        && cohort_sps
            .iter()
            .filter(|s| (**s - min).abs() < 1e-9)
            .count()
            >= 2;
    (fav, joint)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
