use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One investee entity, as produced by the record normalizer.
///
/// Field names on the wire follow the normalizer's output, which mixes
/// `PascalCase` industry columns with `snake_case` numeric ones. Every field is
/// optional on input: missing numbers become 0 and missing strings become empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Record {
    /// Identity key of the entity.
    pub name: String,
    /// Comma-separated list of sub-industries.
    #[serde(rename = "SubIndustry")]
    pub sub_industry_raw: String,
    /// Comma-separated list of product/service labels.
    #[serde(rename = "ProductServiceType")]
    pub product_service_type_raw: String,
    pub country_name: String,
    pub investment_type: String,
    pub total_funding_usd: Decimal,
    pub raised_amount_usd: Decimal,
    pub num_funding_rounds: u32,
    pub founded_year: i32,
    pub funding_year: i32,
    /// CB rank. Lower is better, 0 means unranked.
    pub rank: u64,
    pub post_money_valuation_usd: Decimal,
    pub employee_count: u32,
}

impl Record {
    /// Convenience constructor used heavily by tests and fixtures.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Parsed sub-industry values, trimmed, blanks removed.
    pub fn sub_industries(&self) -> Vec<&str> {
        split_multi_value(&self.sub_industry_raw)
    }

    /// Parsed product/service labels, trimmed, blanks removed.
    pub fn product_service_types(&self) -> Vec<&str> {
        split_multi_value(&self.product_service_type_raw)
    }
}

/// Splits a comma-separated multi-value field into its trimmed, non-empty parts.
pub fn split_multi_value(raw: &str) -> Vec<&str> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect()
}
