use crate::error::CoreError;
use crate::record::Record;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A numeric column of a `Record` that can be placed on a chart axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericField {
    TotalFundingUsd,
    RaisedAmountUsd,
    PostMoneyValuationUsd,
    NumFundingRounds,
    Rank,
    FoundedYear,
    EmployeeCount,
    FundingYear,
}

/// How a raw value maps onto the low/medium/high scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisDirection {
    /// Higher raw value means a higher class.
    Ascending,
    /// Lower raw value means a higher class (rankings).
    Descending,
}

impl NumericField {
    pub const ALL: [NumericField; 8] = [
        NumericField::TotalFundingUsd,
        NumericField::RaisedAmountUsd,
        NumericField::PostMoneyValuationUsd,
        NumericField::NumFundingRounds,
        NumericField::Rank,
        NumericField::FoundedYear,
        NumericField::EmployeeCount,
        NumericField::FundingYear,
    ];

    /// The column name used by the normalizer and the threshold table.
    pub fn as_str(&self) -> &'static str {
        match self {
            NumericField::TotalFundingUsd => "total_funding_usd",
            NumericField::RaisedAmountUsd => "raised_amount_usd",
            NumericField::PostMoneyValuationUsd => "post_money_valuation_usd",
            NumericField::NumFundingRounds => "num_funding_rounds",
            NumericField::Rank => "rank",
            NumericField::FoundedYear => "founded_year",
            NumericField::EmployeeCount => "employee_count",
            NumericField::FundingYear => "funding_year",
        }
    }

    pub fn direction(&self) -> AxisDirection {
        match self {
            NumericField::Rank => AxisDirection::Descending,
            // Years are ascending on the raw value: more recent is "higher".
            _ => AxisDirection::Ascending,
        }
    }

    /// Reads this field from a record as `f64`. Unknown values are already 0.
    pub fn value_of(&self, record: &Record) -> f64 {
        match self {
            NumericField::TotalFundingUsd => record.total_funding_usd.to_f64().unwrap_or(0.0),
            NumericField::RaisedAmountUsd => record.raised_amount_usd.to_f64().unwrap_or(0.0),
            NumericField::PostMoneyValuationUsd => {
                record.post_money_valuation_usd.to_f64().unwrap_or(0.0)
            }
            NumericField::NumFundingRounds => f64::from(record.num_funding_rounds),
            NumericField::Rank => record.rank as f64,
            NumericField::FoundedYear => f64::from(record.founded_year),
            NumericField::EmployeeCount => f64::from(record.employee_count),
            NumericField::FundingYear => f64::from(record.funding_year),
        }
    }
}

impl fmt::Display for NumericField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NumericField {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace('-', "_").to_lowercase();
        NumericField::ALL
            .into_iter()
            .find(|field| field.as_str() == wanted || field.as_str().replace('_', "") == wanted)
            .ok_or_else(|| CoreError::InvalidInput("numeric field".to_string(), s.to_string()))
    }
}

/// One band of a three-level classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Low,
    Medium,
    High,
}

impl Level {
    pub const ALL: [Level; 3] = [Level::High, Level::Medium, Level::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Low => "low",
            Level::Medium => "medium",
            Level::High => "high",
        }
    }

    /// The capitalized form used as the second half of a GE bucket key.
    pub fn capitalized(&self) -> &'static str {
        match self {
            Level::Low => "Low",
            Level::Medium => "Medium",
            Level::High => "High",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The four cells of the risk/return matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Quadrant {
    HighRiskHighReturn,
    HighRiskLowReturn,
    LowRiskHighReturn,
    LowRiskLowReturn,
}

impl Quadrant {
    pub fn from_flags(high_risk: bool, high_return: bool) -> Self {
        match (high_risk, high_return) {
            (true, true) => Quadrant::HighRiskHighReturn,
            (true, false) => Quadrant::HighRiskLowReturn,
            (false, true) => Quadrant::LowRiskHighReturn,
            (false, false) => Quadrant::LowRiskLowReturn,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Quadrant::HighRiskHighReturn => "highRiskHighReturn",
            Quadrant::HighRiskLowReturn => "highRiskLowReturn",
            Quadrant::LowRiskHighReturn => "lowRiskHighReturn",
            Quadrant::LowRiskLowReturn => "lowRiskLowReturn",
        }
    }
}

/// Which value a sunburst node carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChartMetric {
    CompanyCount,
    TotalFunding,
    AverageFunding,
}

impl FromStr for ChartMetric {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().replace('-', "_").to_lowercase().as_str() {
            "count" | "company_count" | "companycount" => Ok(ChartMetric::CompanyCount),
            "total_funding" | "totalfunding" => Ok(ChartMetric::TotalFunding),
            "average_funding" | "averagefunding" => Ok(ChartMetric::AverageFunding),
            _ => Err(CoreError::InvalidInput("chart metric".to_string(), s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}
