//! # Risk and return scoring
//!
//! Turns a single `Record` into two composite 0-100 scores that feed the
//! risk/return quadrant. Both scores are weighted sums of normalized
//! sub-factors; the weights come from configuration.

use core_types::Record;

pub mod error;
pub mod scoring;
pub mod weighted;

pub use error::RiskError;
pub use scoring::{current_year, return_score, risk_score, risk_score_at, RETURN_SCORE_FLOOR};
pub use weighted::WeightedScorer;

/// A model that rates how risky an entity is and how much return it promises.
///
/// Implementations must be pure: the same record always gets the same scores.
pub trait ScoringModel {
    fn risk_score(&self, record: &Record) -> f64;
    fn return_score(&self, record: &Record) -> f64;
}
