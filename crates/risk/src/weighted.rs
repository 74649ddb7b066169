use crate::error::RiskError;
use crate::scoring::{return_score, risk_score_at};
use crate::ScoringModel;
use configuration::{ReturnWeights, RiskQuadrantSettings, RiskWeights};
use core_types::Record;

/// The default `ScoringModel`: fixed weights over the built-in sub-factors.
///
/// The reference year for company age is captured at construction so that a
/// single classification run scores every record against the same year.
#[derive(Debug, Clone)]
pub struct WeightedScorer {
    risk_weights: RiskWeights,
    return_weights: ReturnWeights,
    reference_year: i32,
}

impl WeightedScorer {
    /// Creates a scorer, rejecting negative or non-finite weights.
    pub fn new(risk_weights: RiskWeights, return_weights: ReturnWeights) -> Result<Self, RiskError> {
        let weights = [
            ("funding_rounds", risk_weights.funding_rounds),
            ("company_age", risk_weights.company_age),
            ("cb_rank", risk_weights.cb_rank),
            ("total_funding", return_weights.total_funding),
            ("valuation", return_weights.valuation),
        ];
        if let Some((name, value)) = weights.iter().find(|(_, w)| !w.is_finite() || *w < 0.0) {
            return Err(RiskError::InvalidWeights(format!(
                "{name} must be a non-negative number, got {value}"
            )));
        }
        tracing::debug!(?risk_weights, ?return_weights, "Scoring model configured");

        Ok(Self {
            risk_weights,
            return_weights,
            reference_year: crate::scoring::current_year(),
        })
    }

    pub fn from_settings(settings: &RiskQuadrantSettings) -> Result<Self, RiskError> {
        Self::new(settings.risk_weights, settings.return_weights)
    }

    /// Pins the year used for the company-age factor.
    pub fn with_reference_year(mut self, year: i32) -> Self {
        self.reference_year = year;
        self
    }

    pub fn reference_year(&self) -> i32 {
        self.reference_year
    }
}

impl Default for WeightedScorer {
    fn default() -> Self {
        Self {
            risk_weights: RiskWeights::default(),
            return_weights: ReturnWeights::default(),
            reference_year: crate::scoring::current_year(),
        }
    }
}

impl ScoringModel for WeightedScorer {
    fn risk_score(&self, record: &Record) -> f64 {
        risk_score_at(record, &self.risk_weights, self.reference_year)
    }

    fn return_score(&self, record: &Record) -> f64 {
        return_score(record, &self.return_weights)
    }
}
