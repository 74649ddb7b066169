use crate::categories::CategorySettings;
use crate::error::ConfigError;
use core_types::{AxisThresholds, NumericField};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// The root configuration structure for the entire application.
///
/// Every section is optional in the TOML file; a missing section takes the
/// built-in defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub ge_matrix: GeMatrixSettings,
    pub risk_quadrant: RiskQuadrantSettings,
    pub categories: CategorySettings,
    pub logging: LoggingSettings,
}

impl Config {
    /// Rejects configurations the analytics engine is not defined for.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (axis, t) in self.ge_matrix.thresholds.iter() {
            if !t.is_finite() {
                return Err(ConfigError::ValidationError(format!(
                    "thresholds for axis '{axis}' must be finite numbers"
                )));
            }
        }

        let quadrant = &self.risk_quadrant;
        if !(0.0..=100.0).contains(&quadrant.high_percentile) {
            return Err(ConfigError::ValidationError(format!(
                "risk_quadrant.high_percentile must be within 0..=100, got {}",
                quadrant.high_percentile
            )));
        }
        quadrant.risk_weights.validate()?;
        quadrant.return_weights.validate()?;

        if self.categories.fallback.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "categories.fallback must not be blank".to_string(),
            ));
        }
        for (position, rule) in self.categories.rules.iter().enumerate() {
            if rule.parent.trim().is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "category rule #{position} has a blank parent"
                )));
            }
            if rule.keywords.iter().all(|k| k.trim().is_empty()) {
                return Err(ConfigError::ValidationError(format!(
                    "category rule #{position} ('{}') has no keywords",
                    rule.parent
                )));
            }
        }

        Ok(())
    }
}

/// Parameters for the 3x3 GE matrix.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeMatrixSettings {
    pub default_x: NumericField,
    pub default_y: NumericField,
    /// Fixed, per-axis cut points. Entries given in the file override the
    /// built-in ones for that axis only.
    pub thresholds: ThresholdTable,
}

impl Default for GeMatrixSettings {
    fn default() -> Self {
        Self {
            default_x: NumericField::TotalFundingUsd,
            default_y: NumericField::FoundedYear,
            thresholds: ThresholdTable::default(),
        }
    }
}

/// Predefined GE-matrix cut points keyed by axis column name.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdTable(BTreeMap<String, AxisThresholds>);

impl ThresholdTable {
    /// A table with no entries. Every axis falls back to `AxisThresholds::ZERO`.
    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    pub fn get(&self, field: NumericField) -> Option<AxisThresholds> {
        self.0.get(field.as_str()).copied()
    }

    pub fn insert(&mut self, field: NumericField, thresholds: AxisThresholds) {
        self.0.insert(field.as_str().to_string(), thresholds);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &AxisThresholds)> {
        self.0.iter()
    }
}

impl Default for ThresholdTable {
    fn default() -> Self {
        let mut table = Self::empty();
        table.insert(NumericField::TotalFundingUsd, AxisThresholds::new(1e6, 1e7, 1e8));
        table.insert(NumericField::PostMoneyValuationUsd, AxisThresholds::new(1e7, 1e8, 1e9));
        table.insert(NumericField::NumFundingRounds, AxisThresholds::new(2.0, 5.0, 10.0));
        table.insert(NumericField::EmployeeCount, AxisThresholds::new(10.0, 100.0, 1000.0));
        // Smaller rank is better, so `high` is the tightest cut.
        table.insert(NumericField::Rank, AxisThresholds::new(5e6, 5e5, 5e4));
        table.insert(NumericField::FoundedYear, AxisThresholds::new(2020.0, 2020.0, 2025.0));
        table.insert(NumericField::FundingYear, AxisThresholds::new(2020.0, 2020.0, 2025.0));
        table
    }
}

impl<'de> Deserialize<'de> for ThresholdTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let overrides = BTreeMap::<String, AxisThresholds>::deserialize(deserializer)?;
        let mut table = ThresholdTable::default();
        table.0.extend(overrides);
        Ok(table)
    }
}

/// Parameters for the 2x2 risk/return quadrant.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RiskQuadrantSettings {
    /// Percentile of each score distribution at or above which a record is "high".
    pub high_percentile: f64,
    pub risk_weights: RiskWeights,
    pub return_weights: ReturnWeights,
}

impl Default for RiskQuadrantSettings {
    fn default() -> Self {
        Self {
            high_percentile: 75.0,
            risk_weights: RiskWeights::default(),
            return_weights: ReturnWeights::default(),
        }
    }
}

/// Weights for the three risk sub-factors.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct RiskWeights {
    pub funding_rounds: f64,
    pub company_age: f64,
    pub cb_rank: f64,
}

impl Default for RiskWeights {
    fn default() -> Self {
        Self {
            funding_rounds: 0.4,
            company_age: 0.3,
            cb_rank: 0.3,
        }
    }
}

impl RiskWeights {
    fn validate(&self) -> Result<(), ConfigError> {
        check_weight("risk_weights.funding_rounds", self.funding_rounds)?;
        check_weight("risk_weights.company_age", self.company_age)?;
        check_weight("risk_weights.cb_rank", self.cb_rank)
    }
}

/// Weights for the two return sub-factors.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ReturnWeights {
    pub total_funding: f64,
    pub valuation: f64,
}

impl Default for ReturnWeights {
    fn default() -> Self {
        Self {
            total_funding: 0.5,
            valuation: 0.5,
        }
    }
}

impl ReturnWeights {
    fn validate(&self) -> Result<(), ConfigError> {
        check_weight("return_weights.total_funding", self.total_funding)?;
        check_weight("return_weights.valuation", self.valuation)
    }
}

fn check_weight(name: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(format!(
            "{name} must be a non-negative number, got {value}"
        )))
    }
}

/// Where and how verbosely to log.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// An `EnvFilter` directive used when `RUST_LOG` is not set.
    pub level: String,
    /// If set, logs go to a daily-rotated file in this directory instead of stderr.
    pub directory: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}
