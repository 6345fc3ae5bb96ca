//! raceform-ranker — Explainable runner-scoring engine.
//!
//! Consumes one canonical race record and returns a ranked, reasoned result:
//! eight component scores per runner, proportional redistribution of the
//! weight of components without data, and a confidence band over the ranking.
//! Pure and synchronous; all I/O lives outside this crate.

pub mod components;
pub mod confidence;
pub mod market;
pub mod normalise;
pub mod payload;
pub mod race;
pub mod scorer;

pub use confidence::{Band, Confidence};
pub use payload::{build_web_payload, RacePayload, DISCLAIMER};
pub use race::{score_race, Pick, Picks, RaceResult, ScoredRunner};
pub use scorer::{ComponentScore, Scoring};
