//! Engine configuration: component weights and tuned scoring constants.
//!
//! Everything here is tunable per deployment via YAML/JSON config files; the
//! defaults are the shipped calibration. Validation failures are fatal at
//! load time, never handled per race.

use serde::{Deserialize, Serialize};

use crate::error::{RaceformError, Result};

// ── Components ───────────────────────────────────────────────────────────────

/// The eight scoring components, in configured weight order.
///
/// A fixed, ordered registry: the weight-sum invariant is checkable against
/// this list at load time instead of being assembled at runtime.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Component {
    Market,
    Rating,
    Form,
    Suitability,
    Freshness,
    CdProfile,
    Connections,
    MarketExpectation,
}

impl Component {
    pub const ALL: [Component; 8] = [
        Component::Market,
        Component::Rating,
        Component::Form,
        Component::Suitability,
        Component::Freshness,
        Component::CdProfile,
        Component::Connections,
        Component::MarketExpectation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Component::Market => "market",
            Component::Rating => "rating",
            Component::Form => "form",
            Component::Suitability => "suitability",
            Component::Freshness => "freshness",
            Component::CdProfile => "cd_profile",
            Component::Connections => "connections",
            Component::MarketExpectation => "market_expectation",
        }
    }

    /// Display label for the presentation payload.
    pub fn label(&self) -> &'static str {
        match self {
            Component::Market => "Market",
            Component::Rating => "Rating",
            Component::Form => "Form",
            Component::Suitability => "Suitability",
            Component::Freshness => "Freshness",
            Component::CdProfile => "Course/Distance",
            Component::Connections => "Connections",
            Component::MarketExpectation => "Market Expectation",
        }
    }
}

// ── Component weights ─────────────────────────────────────────────────────────

/// Base weight of each component. Must sum to 1.0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentWeights {
    #[serde(default = "default_market_weight")]
    pub market: f64,
    #[serde(default = "default_rating_weight")]
    pub rating: f64,
    #[serde(default = "default_form_weight")]
    pub form: f64,
    #[serde(default = "default_suitability_weight")]
    pub suitability: f64,
    #[serde(default = "default_freshness_weight")]
    pub freshness: f64,
    #[serde(default = "default_cd_profile_weight")]
    pub cd_profile: f64,
    #[serde(default = "default_connections_weight")]
    pub connections: f64,
    #[serde(default = "default_market_expectation_weight")]
    pub market_expectation: f64,
}

fn default_market_weight() -> f64 {
    0.30
}
fn default_rating_weight() -> f64 {
    0.25
}
fn default_form_weight() -> f64 {
    0.18
}
fn default_suitability_weight() -> f64 {
    0.12
}
fn default_freshness_weight() -> f64 {
    0.07
}
fn default_cd_profile_weight() -> f64 {
    0.04
}
fn default_connections_weight() -> f64 {
    0.03
}
fn default_market_expectation_weight() -> f64 {
    0.01
}

impl Default for ComponentWeights {
    fn default() -> Self {
        Self {
            market: default_market_weight(),
            rating: default_rating_weight(),
            form: default_form_weight(),
            suitability: default_suitability_weight(),
            freshness: default_freshness_weight(),
            cd_profile: default_cd_profile_weight(),
            connections: default_connections_weight(),
            market_expectation: default_market_expectation_weight(),
        }
    }
}

impl ComponentWeights {
    /// Base weight for one component.
    pub fn weight(&self, component: Component) -> f64 {
        match component {
            Component::Market => self.market,
            Component::Rating => self.rating,
            Component::Form => self.form,
            Component::Suitability => self.suitability,
            Component::Freshness => self.freshness,
            Component::CdProfile => self.cd_profile,
            Component::Connections => self.connections,
            Component::MarketExpectation => self.market_expectation,
        }
    }

    /// Weights in `Component::ALL` order.
    pub fn as_array(&self) -> [f64; 8] {
        [
            self.market,
            self.rating,
            self.form,
            self.suitability,
            self.freshness,
            self.cd_profile,
            self.connections,
            self.market_expectation,
        ]
    }

    /// Validate that all weights sum to ~1.0.
    pub fn validate(&self) -> bool {
        let sum: f64 = self.as_array().iter().sum();
        (sum - 1.0).abs() < 1e-6
    }

    /// Renormalise weights so they sum to 1.0.
    pub fn normalise(&mut self) {
        let sum: f64 = self.as_array().iter().sum();
        if sum > 0.0 {
            self.market /= sum;
            self.rating /= sum;
            self.form /= sum;
            self.suitability /= sum;
            self.freshness /= sum;
            self.cd_profile /= sum;
            self.connections /= sum;
            self.market_expectation /= sum;
        }
    }
}

// ── Confidence thresholds ─────────────────────────────────────────────────────

/// Thresholds for the HIGH/MED/LOW confidence bands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfidenceConfig {
    /// Market probability gap between the top two for a HIGH band.
    #[serde(default = "default_high_gap")]
    pub high_gap: f64,
    /// Market probability gap between the top two for a MED band.
    #[serde(default = "default_med_gap")]
    pub med_gap: f64,
    /// Score-margin fallback when no market data exists.
    #[serde(default = "default_high_margin")]
    pub high_margin: f64,
    #[serde(default = "default_med_margin")]
    pub med_margin: f64,
    /// Components the top runner must have scored for a HIGH band.
    #[serde(default = "default_min_components")]
    pub min_components: usize,
}

fn default_high_gap() -> f64 {
    0.08
}
fn default_med_gap() -> f64 {
    0.04
}
fn default_high_margin() -> f64 {
    8.0
}
fn default_med_margin() -> f64 {
    4.0
}
fn default_min_components() -> usize {
    5
}

impl Default for ConfidenceConfig {
    fn default() -> Self {
        Self {
            high_gap: default_high_gap(),
            med_gap: default_med_gap(),
            high_margin: default_high_margin(),
            med_margin: default_med_margin(),
            min_components: default_min_components(),
        }
    }
}

// ── Connections scale ─────────────────────────────────────────────────────────

/// Linear scale mapping trainer runs-to-form % onto a component score.
/// The coefficients are a tuned calibration, not algorithmic truth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionsConfig {
    #[serde(default = "default_connections_base")]
    pub base: f64,
    #[serde(default = "default_connections_per_point")]
    pub per_point: f64,
    #[serde(default = "default_connections_floor")]
    pub floor: f64,
    #[serde(default = "default_connections_ceiling")]
    pub ceiling: f64,
    /// RTF% at or above which a yard counts as in form.
    #[serde(default = "default_hot_rtf")]
    pub hot_rtf: f64,
    /// RTF% at or below which a yard counts as cold.
    #[serde(default = "default_cold_rtf")]
    pub cold_rtf: f64,
}

fn default_connections_base() -> f64 {
    20.0
}
fn default_connections_per_point() -> f64 {
    2.3
}
fn default_connections_floor() -> f64 {
    15.0
}
fn default_connections_ceiling() -> f64 {
    95.0
}
fn default_hot_rtf() -> f64 {
    25.0
}
fn default_cold_rtf() -> f64 {
    10.0
}

impl Default for ConnectionsConfig {
    fn default() -> Self {
        Self {
            base: default_connections_base(),
            per_point: default_connections_per_point(),
            floor: default_connections_floor(),
            ceiling: default_connections_ceiling(),
            hot_rtf: default_hot_rtf(),
            cold_rtf: default_cold_rtf(),
        }
    }
}

// ── Market expectation weights ────────────────────────────────────────────────

/// Additive sub-weights for the previous-race market-expectation component.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketExpectationConfig {
    #[serde(default = "default_last_fav")]
    pub last_fav: f64,
    #[serde(default = "default_last_beaten_fav")]
    pub last_beaten_fav: f64,
    #[serde(default = "default_last_joint_fav")]
    pub last_joint_fav: f64,
    /// Scale on the previous run's implied win probability.
    #[serde(default = "default_confidence_scale")]
    pub confidence_scale: f64,
    /// Clamp bounds for the previous run's decimal starting price.
    #[serde(default = "default_odds_min")]
    pub odds_min: f64,
    #[serde(default = "default_odds_max")]
    pub odds_max: f64,
}

fn default_last_fav() -> f64 {
    15.0
}
fn default_last_beaten_fav() -> f64 {
    20.0
}
fn default_last_joint_fav() -> f64 {
    -5.0
}
fn default_confidence_scale() -> f64 {
    25.0
}
fn default_odds_min() -> f64 {
    1.01
}
fn default_odds_max() -> f64 {
    100.0
}

impl Default for MarketExpectationConfig {
    fn default() -> Self {
        Self {
            last_fav: default_last_fav(),
            last_beaten_fav: default_last_beaten_fav(),
            last_joint_fav: default_last_joint_fav(),
            confidence_scale: default_confidence_scale(),
            odds_min: default_odds_min(),
            odds_max: default_odds_max(),
        }
    }
}

// ── Top-level configuration ───────────────────────────────────────────────────

/// Complete scoring-engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RankerConfig {
    #[serde(default)]
    pub weights: ComponentWeights,
    #[serde(default)]
    pub confidence: ConfidenceConfig,
    #[serde(default)]
    pub connections: ConnectionsConfig,
    #[serde(default)]
    pub market_expectation: MarketExpectationConfig,
}

impl RankerConfig {
    /// Load from a YAML file, validating before returning.
    pub fn from_yaml(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        config.validate()?;
        tracing::info!(path, "loaded ranker config");
        Ok(config)
    }

    /// Load from a JSON file, validating before returning.
    pub fn from_json(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        tracing::info!(path, "loaded ranker config");
        Ok(config)
    }

    /// Check the invariants the engine relies on. Errors here are fatal at
    /// startup and never recoverable per race.
    pub fn validate(&self) -> Result<()> {
        if !self.weights.validate() {
            let sum: f64 = self.weights.as_array().iter().sum();
            return Err(RaceformError::Config(format!(
                "component weights must sum to 1.0, got {sum:.4}"
            )));
        }
        for (name, gap) in [
            ("confidence.high_gap", self.confidence.high_gap),
            ("confidence.med_gap", self.confidence.med_gap),
        ] {
            if !(0.0..=1.0).contains(&gap) {
                return Err(RaceformError::Config(format!(
                    "{name} must be a probability in [0, 1], got {gap}"
                )));
            }
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
