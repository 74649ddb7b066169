use crate::error::AnalyticsError;
use core_types::{sum_funding, NumericField, Record};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use std::str::FromStr;

const TOP_N: usize = 10;

/// Headline numbers for a record set.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_records: usize,
    pub total_funding: Decimal,
    pub average_funding: Decimal,
    pub top_countries: Vec<CountryCount>,
    pub top_industries: Vec<IndustryCount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountryCount {
    pub country: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndustryCount {
    pub industry: String,
    pub count: usize,
}

/// Total/average funding plus the ten most frequent countries and sub-industries.
///
/// Sub-industries are counted per parsed value, so a record listing three of
/// them contributes to three counters. Country names are counted as stored,
/// so a missing country shows up as its own `""` entry.
pub fn calculate_statistics(records: &[Record]) -> Statistics {
    if records.is_empty() {
        return Statistics::default();
    }

    let total_funding = sum_funding(records.iter().map(|r| r.total_funding_usd));
    let average_funding = total_funding / Decimal::from(records.len());

    let top_countries = top_n(
        count_in_order(records.iter().map(|r| r.country_name.as_str())),
        TOP_N,
    )
    .into_iter()
    .map(|(country, count)| CountryCount {
        country: country.to_string(),
        count,
    })
    .collect();

    let top_industries = top_n(
        count_in_order(records.iter().flat_map(|r| r.sub_industries())),
        TOP_N,
    )
    .into_iter()
    .map(|(industry, count)| IndustryCount {
        industry: industry.to_string(),
        count,
    })
    .collect();

    Statistics {
        total_records: records.len(),
        total_funding,
        average_funding,
        top_countries,
        top_industries,
    }
}

/// Counts occurrences, keeping keys in first-seen order.
pub(crate) fn count_in_order<'a>(keys: impl IntoIterator<Item = &'a str>) -> Vec<(&'a str, usize)> {
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    let mut counts: Vec<(&'a str, usize)> = Vec::new();
    for key in keys {
        match index.get(key) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(key, counts.len());
                counts.push((key, 1));
            }
        }
    }
    counts
}

/// Stable sort by count descending, then truncate. Ties keep first-seen order.
pub(crate) fn top_n<T>(mut counts: Vec<(T, usize)>, n: usize) -> Vec<(T, usize)> {
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(n);
    counts
}

/// Linear-interpolated percentile (`p` in `0..=100`).
///
/// The input does not need to be sorted. A single value is returned as-is for
/// any `p`. Empty input has no percentile and is reported as `NotEnoughData`.
pub fn calculate_percentile(values: &[f64], p: f64) -> Result<f64, AnalyticsError> {
    if values.is_empty() {
        return Err(AnalyticsError::NotEnoughData(
            "percentile of an empty series".to_string(),
        ));
    }
    if !(0.0..=100.0).contains(&p) {
        return Err(AnalyticsError::InvalidArgument(format!(
            "percentile must be within 0..=100, got {p}"
        )));
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let index = (p / 100.0) * (sorted.len() - 1) as f64;
    let lower = index.floor() as usize;
    let upper = index.ceil() as usize;
    if lower == upper {
        return Ok(sorted[lower]);
    }

    let weight = index - lower as f64;
    Ok(sorted[lower] * (1.0 - weight) + sorted[upper] * weight)
}

/// Pearson correlation coefficient via the sum-of-products formula.
///
/// Returns 0 for empty input, mismatched lengths and constant series.
pub fn calculate_correlation(values1: &[f64], values2: &[f64]) -> f64 {
    if values1.is_empty() || values1.len() != values2.len() {
        return 0.0;
    }

    let n = values1.len() as f64;
    let sum1: f64 = values1.iter().sum();
    let sum2: f64 = values2.iter().sum();
    let sum1_sq: f64 = values1.iter().map(|v| v * v).sum();
    let sum2_sq: f64 = values2.iter().map(|v| v * v).sum();
    let sum12: f64 = values1.iter().zip(values2).map(|(a, b)| a * b).sum();

    let numerator = n * sum12 - sum1 * sum2;
    let denominator = ((n * sum1_sq - sum1 * sum1) * (n * sum2_sq - sum2 * sum2)).sqrt();

    if denominator == 0.0 || !denominator.is_finite() {
        return 0.0;
    }
    let r = numerator / denominator;
    if r.is_finite() { r } else { 0.0 }
}

/// Correlation between two numeric columns of the same record set.
pub fn correlate_fields(records: &[Record], a: NumericField, b: NumericField) -> f64 {
    let left: Vec<f64> = records.iter().map(|r| a.value_of(r)).collect();
    let right: Vec<f64> = records.iter().map(|r| b.value_of(r)).collect();
    calculate_correlation(&left, &right)
}

/// The column a record set can be grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupField {
    Country,
    InvestmentType,
    SubIndustry,
    ProductServiceType,
    FoundedYear,
    FundingYear,
}

impl GroupField {
    /// The raw group key. Multi-value columns are grouped by their raw text.
    pub fn key_of(&self, record: &Record) -> String {
        match self {
            GroupField::Country => record.country_name.clone(),
            GroupField::InvestmentType => record.investment_type.clone(),
            GroupField::SubIndustry => record.sub_industry_raw.clone(),
            GroupField::ProductServiceType => record.product_service_type_raw.clone(),
            GroupField::FoundedYear => record.founded_year.to_string(),
            GroupField::FundingYear => record.funding_year.to_string(),
        }
    }
}

impl FromStr for GroupField {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().replace('-', "_").to_lowercase().as_str() {
            "country" | "country_name" => Ok(GroupField::Country),
            "investment_type" => Ok(GroupField::InvestmentType),
            "sub_industry" | "subindustry" => Ok(GroupField::SubIndustry),
            "product_service_type" | "productservicetype" => Ok(GroupField::ProductServiceType),
            "founded_year" => Ok(GroupField::FoundedYear),
            "funding_year" => Ok(GroupField::FundingYear),
            other => Err(AnalyticsError::InvalidArgument(format!(
                "unknown group field '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    pub group: String,
    pub count: usize,
    pub sum: f64,
    pub avg: f64,
    pub min: f64,
    pub max: f64,
}

/// Count/sum/avg/min/max of `value` per distinct `group_by` key, largest group first.
pub fn group_statistics(
    records: &[Record],
    group_by: GroupField,
    value: NumericField,
) -> Vec<GroupSummary> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<GroupSummary> = Vec::new();

    for record in records {
        let key = group_by.key_of(record);
        let v = value.value_of(record);
        match index.get(&key) {
            Some(&i) => {
                let g = &mut groups[i];
                g.count += 1;
                g.sum += v;
                g.min = g.min.min(v);
                g.max = g.max.max(v);
            }
            None => {
                index.insert(key.clone(), groups.len());
                groups.push(GroupSummary {
                    group: key,
                    count: 1,
                    sum: v,
                    avg: 0.0,
                    min: v,
                    max: v,
                });
            }
        }
    }

    for g in &mut groups {
        g.avg = g.sum / g.count as f64;
    }
    groups.sort_by(|a, b| b.count.cmp(&a.count));
    groups
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
}

/// Min/max/avg over the strictly positive values of a column (0 means unknown).
pub fn calculate_value_range(records: &[Record], field: NumericField) -> ValueRange {
    let values = positive_values(records, field);
    if values.is_empty() {
        return ValueRange::default();
    }
    let sum: f64 = values.iter().sum();
    ValueRange {
        min: values.iter().copied().fold(f64::INFINITY, f64::min),
        max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        avg: sum / values.len() as f64,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct FieldStatistics {
    pub count: usize,
    pub sum: f64,
    pub avg: f64,
    pub min: f64,
    pub max: f64,
    pub median: f64,
}

/// Summary of the strictly positive values of a column.
pub fn calculate_field_statistics(records: &[Record], field: NumericField) -> FieldStatistics {
    let mut values = positive_values(records, field);
    if values.is_empty() {
        return FieldStatistics::default();
    }
    values.sort_by(f64::total_cmp);

    let n = values.len();
    let sum: f64 = values.iter().sum();
    let median = if n % 2 == 0 {
        (values[n / 2 - 1] + values[n / 2]) / 2.0
    } else {
        values[n / 2]
    };

    FieldStatistics {
        count: n,
        sum,
        avg: sum / n as f64,
        min: values[0],
        max: values[n - 1],
        median,
    }
}

fn positive_values(records: &[Record], field: NumericField) -> Vec<f64> {
    records
        .iter()
        .map(|r| field.value_of(r))
        .filter(|v| *v > 0.0)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn record(name: &str, country: &str, sub: &str, funding: Decimal) -> Record {
        Record {
            country_name: country.to_string(),
            sub_industry_raw: sub.to_string(),
            total_funding_usd: funding,
            ..Record::new(name)
        }
    }

    #[test]
    fn statistics_of_empty_input_are_zeroed() {
        assert_eq!(calculate_statistics(&[]), Statistics::default());
    }

    #[test]
    fn statistics_count_countries_and_split_industries() {
        let records = vec![
            record("a", "Taiwan", "電化學儲能, 儲能系統整合", dec!(100)),
            record("b", "Japan", "電化學儲能", dec!(200)),
            record("c", "Taiwan", "機械儲能", dec!(300)),
            record("d", "", "", dec!(0)),
        ];

        let stats = calculate_statistics(&records);
        assert_eq!(stats.total_records, 4);
        assert_eq!(stats.total_funding, dec!(600));
        assert_eq!(stats.average_funding, dec!(150));
        assert_eq!(
            stats.top_countries,
            vec![
                CountryCount { country: "Taiwan".into(), count: 2 },
                CountryCount { country: "Japan".into(), count: 1 },
                CountryCount { country: "".into(), count: 1 },
            ]
        );
        assert_eq!(stats.top_industries[0], IndustryCount { industry: "電化學儲能".into(), count: 2 });
        // Ties keep first-seen order.
        assert_eq!(stats.top_industries[1].industry, "儲能系統整合");
        assert_eq!(stats.top_industries[2].industry, "機械儲能");
    }

    #[test]
    fn blank_countries_are_counted_as_their_own_entry() {
        let records = vec![
            record("a", "", "", dec!(0)),
            record("b", "Taiwan", "", dec!(0)),
            record("c", "", "", dec!(0)),
        ];
        assert_eq!(
            calculate_statistics(&records).top_countries,
            vec![
                CountryCount { country: "".into(), count: 2 },
                CountryCount { country: "Taiwan".into(), count: 1 },
            ]
        );
    }

    #[test]
    fn oversized_funding_totals_saturate() {
        let huge = Decimal::from_i128_with_scale(50_000_000_000_000_000_000_000_000_000, 0);
        let records = vec![record("a", "Taiwan", "", huge), record("b", "Taiwan", "", huge)];

        let stats = calculate_statistics(&records);
        assert_eq!(stats.total_funding, Decimal::MAX);
        assert!(stats.average_funding > Decimal::ZERO);
        assert!(stats.average_funding < stats.total_funding);
    }

    #[test]
    fn top_lists_are_capped_at_ten() {
        let records: Vec<Record> = (0..15)
            .map(|i| record(&format!("r{i}"), &format!("C{i}"), "", dec!(1)))
            .collect();
        assert_eq!(calculate_statistics(&records).top_countries.len(), 10);
    }

    #[test]
    fn percentile_interpolates_between_neighbours() {
        let values = [40.0, 10.0, 30.0, 20.0];
        assert_eq!(calculate_percentile(&values, 0.0).unwrap(), 10.0);
        assert_eq!(calculate_percentile(&values, 100.0).unwrap(), 40.0);
        // index = 0.75 * 3 = 2.25 -> 30 + 0.25 * 10
        assert!((calculate_percentile(&values, 75.0).unwrap() - 32.5).abs() < 1e-12);
        // index = 0.5 * 3 = 1.5
        assert!((calculate_percentile(&values, 50.0).unwrap() - 25.0).abs() < 1e-12);
    }

    #[test]
    fn percentile_of_single_value_is_that_value() {
        for p in [0.0, 33.0, 75.0, 100.0] {
            assert_eq!(calculate_percentile(&[7.5], p).unwrap(), 7.5);
        }
    }

    #[test]
    fn percentile_rejects_empty_and_out_of_range_input() {
        assert!(matches!(
            calculate_percentile(&[], 50.0),
            Err(AnalyticsError::NotEnoughData(_))
        ));
        assert!(matches!(
            calculate_percentile(&[1.0], 101.0),
            Err(AnalyticsError::InvalidArgument(_))
        ));
        assert!(calculate_percentile(&[1.0], f64::NAN).is_err());
    }

    #[test]
    fn correlation_of_empty_series_is_zero() {
        assert_eq!(calculate_correlation(&[], &[]), 0.0);
    }

    #[test]
    fn correlation_guards_degenerate_input() {
        assert_eq!(calculate_correlation(&[1.0, 2.0], &[1.0]), 0.0);
        assert_eq!(calculate_correlation(&[3.0, 3.0, 3.0], &[1.0, 2.0, 3.0]), 0.0);
    }

    #[test]
    fn correlation_detects_linear_relationships() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let up = [2.0, 4.0, 6.0, 8.0];
        let down = [8.0, 6.0, 4.0, 2.0];
        assert!((calculate_correlation(&x, &up) - 1.0).abs() < 1e-12);
        assert!((calculate_correlation(&x, &down) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn group_statistics_sorts_by_count() {
        let records = vec![
            record("a", "Japan", "", dec!(10)),
            record("b", "Taiwan", "", dec!(20)),
            record("c", "Taiwan", "", dec!(40)),
        ];
        let groups = group_statistics(&records, GroupField::Country, NumericField::TotalFundingUsd);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].group, "Taiwan");
        assert_eq!(groups[0].count, 2);
        assert_eq!(groups[0].sum, 60.0);
        assert_eq!(groups[0].avg, 30.0);
        assert_eq!(groups[0].min, 20.0);
        assert_eq!(groups[0].max, 40.0);
        assert_eq!(groups[1].group, "Japan");
    }

    #[test]
    fn field_statistics_ignore_unknown_zeroes() {
        let records = vec![
            record("a", "", "", dec!(0)),
            record("b", "", "", dec!(10)),
            record("c", "", "", dec!(30)),
            record("d", "", "", dec!(20)),
            record("e", "", "", dec!(40)),
        ];
        let stats = calculate_field_statistics(&records, NumericField::TotalFundingUsd);
        assert_eq!(stats.count, 4);
        assert_eq!(stats.median, 25.0);
        assert_eq!(stats.min, 10.0);
        assert_eq!(stats.max, 40.0);

        let range = calculate_value_range(&records, NumericField::TotalFundingUsd);
        assert_eq!(range, ValueRange { min: 10.0, max: 40.0, avg: 25.0 });
        assert_eq!(
            calculate_value_range(&records, NumericField::Rank),
            ValueRange::default()
        );
    }

    #[test]
    fn group_field_parses_cli_names() {
        assert_eq!("country".parse::<GroupField>(), Ok(GroupField::Country));
        assert_eq!("investment-type".parse::<GroupField>(), Ok(GroupField::InvestmentType));
        assert!("colour".parse::<GroupField>().is_err());
    }
}
