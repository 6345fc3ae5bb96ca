/// Canonical race-record types handed to the engine by the parsing layer.
/// Field names match the serialized JSON shape of upstream racecard records,
/// so a stored record round-trips through serde unchanged. Every optional
/// attribute is an explicit `Option` field: absent is a value of its own and
/// serializes as `null`, never as 0/false/"".
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Form line
// ---------------------------------------------------------------------------

/// One past run of a runner. `Runner::recent_form` holds these most recent
/// first, capped at six by the parsing layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormLine {
    /// Finishing position. Non-completions (pulled up, fell, unseated…) are
    /// carried as `None`.
    #[serde(default)]
    pub position: Option<u32>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub distance: Option<String>,
    #[serde(default)]
    pub going: Option<String>,
    #[serde(default)]
    pub race_class: Option<String>,
    #[serde(default)]
    pub track: Option<String>,
    /// Starting price of that run, decimal odds.
    #[serde(default)]
    pub sp_decimal: Option<f64>,
    #[serde(default)]
    pub sp_string: Option<String>,
    /// Explicit market flags for that run, when the source provides them.
    /// Left `None` the engine derives favourite status from the cohort
    /// of runners that contested the same race.
    #[serde(default)]
    pub favourite: Option<bool>,
    #[serde(default)]
    pub joint_favourite: Option<bool>,
}

// ---------------------------------------------------------------------------
// Runner
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Runner {
    pub runner_name: String,
    #[serde(default)]
    pub number: Option<u32>,
    #[serde(default)]
    pub draw: Option<u32>,
    #[serde(default)]
    pub age: Option<u32>,
    /// Carried weight as a "st-lb" string, e.g. "11-4".
    #[serde(default)]
    pub weight: Option<String>,
    #[serde(default)]
    pub official_rating: Option<i32>,
    /// Primary external professional rating.
    #[serde(default)]
    pub rpr: Option<i32>,
    /// Secondary speed figure.
    #[serde(default)]
    pub ts: Option<i32>,
    /// Current win odds, decimal, > 1.0 when valid.
    #[serde(default)]
    pub odds_decimal: Option<f64>,
    #[serde(default)]
    pub jockey: Option<String>,
    #[serde(default)]
    pub trainer: Option<String>,
    /// Trainer runs-to-form percentage over the recent window.
    #[serde(default)]
    pub trainer_rtf: Option<f64>,
    #[serde(default)]
    pub days_since_last_run: Option<u32>,
    /// Proven-at badges. `None` is "unknown", `Some(false)` a known non-winner.
    #[serde(default)]
    pub course_winner: Option<bool>,
    #[serde(default)]
    pub distance_winner: Option<bool>,
    #[serde(default)]
    pub cd_winner: Option<bool>,
    #[serde(default)]
    pub recent_form: Vec<FormLine>,
}

impl Runner {
    /// Recent form usable for scoring a race run on `race_date`.
    ///
    /// Excludes any form line dated the same day as the race itself, so the
    /// outcome being ranked can never leak into its own inputs.
    pub fn form_before(&self, race_date: Option<NaiveDate>) -> Vec<&FormLine> {
        self.recent_form
            .iter()
            .filter(|line| match (line.date, race_date) {
                (Some(run), Some(race)) => run != race,
                _ => true,
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Race metadata
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RaceMeta {
    #[serde(default)]
    pub track: Option<String>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub off_time: Option<String>,
    /// Textual distance, e.g. "2m4f". Furlong count derivable on demand.
    #[serde(default)]
    pub distance: Option<String>,
    #[serde(default)]
    pub going: Option<String>,
    #[serde(default)]
    pub race_class: Option<String>,
    #[serde(default)]
    pub runners_count: usize,
    #[serde(default)]
    pub race_name: Option<String>,
}

impl RaceMeta {
    /// Weight-for-ability races let carried weight stand in as a rating proxy.
    pub fn is_handicap(&self) -> bool {
        let has = |field: &Option<String>| {
            field
                .as_deref()
                .map(|s| s.to_lowercase().contains("handicap"))
                .unwrap_or(false)
        };
        has(&self.race_name) || has(&self.race_class)
    }
}

/// Stable textual identifier for a race, derived from its meeting slot.
pub fn make_race_id(meta: &RaceMeta) -> String {
    let seed = format!(
        "{}-{}-{}",
        meta.track.as_deref().unwrap_or("unknown"),
        meta.date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "unknown".to_string()),
        meta.off_time.as_deref().unwrap_or("unknown"),
    )
    .to_lowercase();

    let mut slug = String::with_capacity(seed.len());
    let mut last_dash = true;
    for ch in seed.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch);
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    let slug = slug.trim_matches('-').to_string();
    if slug.is_empty() {
        "unknown-race".to_string()
    } else {
        slug
    }
}

// ---------------------------------------------------------------------------
// Race record
// ---------------------------------------------------------------------------

/// The canonical record the engine scores: metadata plus ordered runners.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RaceData {
    #[serde(default)]
    pub race_id: String,
    pub meta: RaceMeta,
    pub runners: Vec<Runner>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_make_race_id_slug() {
        let meta = RaceMeta {
            track: Some("Ffos Las".to_string()),
            date: Some(date("2026-02-15")),
            off_time: Some("14:30".to_string()),
            ..Default::default()
        };
        assert_eq!(make_race_id(&meta), "ffos-las-2026-02-15-14-30");
    }

    #[test]
    fn test_make_race_id_missing_fields() {
        let id = make_race_id(&RaceMeta::default());
        assert_eq!(id, "unknown-unknown-unknown");
    }

    #[test]
    fn test_form_before_excludes_race_day() {
        let race_day = date("2026-02-15");
        let runner = Runner {
            runner_name: "Test".to_string(),
            recent_form: vec![
                FormLine {
                    position: Some(1),
                    date: Some(race_day),
                    ..Default::default()
                },
                FormLine {
                    position: Some(2),
                    date: Some(date("2026-01-20")),
                    ..Default::default()
                },
                FormLine {
                    position: Some(3),
                    date: None,
                    ..Default::default()
                },
            ],
            ..Default::default()
        };

        let usable = runner.form_before(Some(race_day));
        assert_eq!(usable.len(), 2);
        assert_eq!(usable[0].position, Some(2));
        // Undated lines cannot be proven to leak, so they stay.
        assert_eq!(usable[1].position, Some(3));

        // Without a race date there is nothing to compare against.
        assert_eq!(runner.form_before(None).len(), 3);
    }

    #[test]
    fn test_is_handicap() {
        let mut meta = RaceMeta::default();
        assert!(!meta.is_handicap());
        meta.race_name = Some("Demo Handicap Hurdle".to_string());
        assert!(meta.is_handicap());
        meta.race_name = None;
        meta.race_class = Some("Class 4 handicap".to_string());
        assert!(meta.is_handicap());
    }

    #[test]
    fn test_runner_roundtrip_preserves_absence() {
        let runner = Runner {
            runner_name: "Stormbreaker".to_string(),
            odds_decimal: Some(3.5),
            ..Default::default()
        };
        let json = serde_json::to_value(&runner).unwrap();
        // Absent must serialize distinctly from zero/false.
        assert!(json["official_rating"].is_null());
        assert!(json["course_winner"].is_null());
        let back: Runner = serde_json::from_value(json).unwrap();
        assert_eq!(back, runner);
    }

    #[test]
    fn test_partial_record_deserializes() {
        let raw = r#"{"runner_name": "Minimal", "odds_decimal": 5.0}"#;
        let runner: Runner = serde_json::from_str(raw).unwrap();
        assert_eq!(runner.runner_name, "Minimal");
        assert_eq!(runner.odds_decimal, Some(5.0));
        assert!(runner.recent_form.is_empty());
        assert!(runner.trainer_rtf.is_none());
    }
}
