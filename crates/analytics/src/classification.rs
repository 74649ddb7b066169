use crate::error::AnalyticsError;
use crate::statistics::calculate_percentile;
use configuration::ThresholdTable;
use core_types::{AxisDirection, AxisThresholds, Level, NumericField, Quadrant, Record};
use risk::ScoringModel;
use serde::Serialize;

/// Places a value on the low/medium/high scale of an axis.
///
/// Ascending axes use "value ≥ cut"; descending axes (rank) use "value ≤ cut".
/// With the degenerate `{0,0,0}` thresholds every non-negative value is `High`
/// on an ascending axis and only 0 is `High` on a descending one.
pub fn classify_value(value: f64, thresholds: &AxisThresholds, direction: AxisDirection) -> Level {
    match direction {
        AxisDirection::Ascending => {
            if value >= thresholds.high {
                Level::High
            } else if value >= thresholds.medium {
                Level::Medium
            } else {
                Level::Low
            }
        }
        AxisDirection::Descending => {
            if value <= thresholds.high {
                Level::High
            } else if value <= thresholds.medium {
                Level::Medium
            } else {
                Level::Low
            }
        }
    }
}

/// The fixed GE-matrix thresholds for `field`, or `{0,0,0}` if the table has none.
pub fn axis_thresholds(field: NumericField, table: &ThresholdTable) -> AxisThresholds {
    table.get(field).unwrap_or_else(|| {
        tracing::warn!(axis = %field, "No predefined thresholds for axis, falling back to zero cut points.");
        AxisThresholds::ZERO
    })
}

/// The nine GE-matrix buckets plus the thresholds used to fill them.
///
/// Bucket names are `{y}{X}`: `high_low` serializes as `highLow` and holds
/// records that are high on the Y axis and low on the X axis.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeMatrixResult<'a> {
    pub high_high: Vec<&'a Record>,
    pub high_medium: Vec<&'a Record>,
    pub high_low: Vec<&'a Record>,
    pub medium_high: Vec<&'a Record>,
    pub medium_medium: Vec<&'a Record>,
    pub medium_low: Vec<&'a Record>,
    pub low_high: Vec<&'a Record>,
    pub low_medium: Vec<&'a Record>,
    pub low_low: Vec<&'a Record>,
    pub x_axis: NumericField,
    pub y_axis: NumericField,
    pub x_thresholds: AxisThresholds,
    pub y_thresholds: AxisThresholds,
}

impl<'a> GeMatrixResult<'a> {
    fn empty(x_axis: NumericField, y_axis: NumericField, x: AxisThresholds, y: AxisThresholds) -> Self {
        Self {
            high_high: Vec::new(),
            high_medium: Vec::new(),
            high_low: Vec::new(),
            medium_high: Vec::new(),
            medium_medium: Vec::new(),
            medium_low: Vec::new(),
            low_high: Vec::new(),
            low_medium: Vec::new(),
            low_low: Vec::new(),
            x_axis,
            y_axis,
            x_thresholds: x,
            y_thresholds: y,
        }
    }

    pub fn bucket(&self, y: Level, x: Level) -> &[&'a Record] {
        match (y, x) {
            (Level::High, Level::High) => &self.high_high,
            (Level::High, Level::Medium) => &self.high_medium,
            (Level::High, Level::Low) => &self.high_low,
            (Level::Medium, Level::High) => &self.medium_high,
            (Level::Medium, Level::Medium) => &self.medium_medium,
            (Level::Medium, Level::Low) => &self.medium_low,
            (Level::Low, Level::High) => &self.low_high,
            (Level::Low, Level::Medium) => &self.low_medium,
            (Level::Low, Level::Low) => &self.low_low,
        }
    }

    fn bucket_mut(&mut self, y: Level, x: Level) -> &mut Vec<&'a Record> {
        match (y, x) {
            (Level::High, Level::High) => &mut self.high_high,
            (Level::High, Level::Medium) => &mut self.high_medium,
            (Level::High, Level::Low) => &mut self.high_low,
            (Level::Medium, Level::High) => &mut self.medium_high,
            (Level::Medium, Level::Medium) => &mut self.medium_medium,
            (Level::Medium, Level::Low) => &mut self.medium_low,
            (Level::Low, Level::High) => &mut self.low_high,
            (Level::Low, Level::Medium) => &mut self.low_medium,
            (Level::Low, Level::Low) => &mut self.low_low,
        }
    }

    /// `(key, records)` for all nine cells, high Y rows first.
    pub fn buckets(&self) -> Vec<(String, &[&'a Record])> {
        let mut out = Vec::with_capacity(9);
        for y in Level::ALL {
            for x in Level::ALL {
                out.push((bucket_key(y, x), self.bucket(y, x)));
            }
        }
        out
    }

    pub fn population(&self) -> usize {
        self.buckets().iter().map(|(_, records)| records.len()).sum()
    }
}

/// `yClass + Capitalize(xClass)`, e.g. `mediumHigh`.
pub fn bucket_key(y: Level, x: Level) -> String {
    format!("{}{}", y.as_str(), x.capitalized())
}

/// Classifies every record into the 3x3 GE matrix using fixed, per-axis thresholds.
///
/// No record is dropped; a missing value is 0 and is classified like any other.
pub fn calculate_ge_matrix<'a>(
    records: &'a [Record],
    x_axis: NumericField,
    y_axis: NumericField,
    table: &ThresholdTable,
) -> GeMatrixResult<'a> {
    let x_thresholds = axis_thresholds(x_axis, table);
    let y_thresholds = axis_thresholds(y_axis, table);
    let mut result = GeMatrixResult::empty(x_axis, y_axis, x_thresholds, y_thresholds);

    for record in records {
        let x = classify_value(x_axis.value_of(record), &x_thresholds, x_axis.direction());
        let y = classify_value(y_axis.value_of(record), &y_thresholds, y_axis.direction());
        result.bucket_mut(y, x).push(record);
    }

    tracing::debug!(
        x = %x_axis,
        y = %y_axis,
        records = records.len(),
        "GE matrix built."
    );
    result
}

/// A record with the two scores that placed it in a quadrant.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredRecord<'a> {
    #[serde(flatten)]
    pub record: &'a Record,
    pub risk_score: f64,
    pub return_score: f64,
}

/// The four risk/return quadrants plus the data-derived cut points.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskQuadrantResult<'a> {
    pub high_risk_high_return: Vec<ScoredRecord<'a>>,
    pub high_risk_low_return: Vec<ScoredRecord<'a>>,
    pub low_risk_high_return: Vec<ScoredRecord<'a>>,
    pub low_risk_low_return: Vec<ScoredRecord<'a>>,
    /// Percentile used for both cuts.
    pub high_percentile: f64,
    /// Risk score at or above which a record is high risk.
    pub risk_cut: f64,
    /// Return score at or above which a record is high return.
    pub return_cut: f64,
}

impl<'a> RiskQuadrantResult<'a> {
    pub fn quadrant(&self, quadrant: Quadrant) -> &[ScoredRecord<'a>] {
        match quadrant {
            Quadrant::HighRiskHighReturn => &self.high_risk_high_return,
            Quadrant::HighRiskLowReturn => &self.high_risk_low_return,
            Quadrant::LowRiskHighReturn => &self.low_risk_high_return,
            Quadrant::LowRiskLowReturn => &self.low_risk_low_return,
        }
    }

    fn quadrant_mut(&mut self, quadrant: Quadrant) -> &mut Vec<ScoredRecord<'a>> {
        match quadrant {
            Quadrant::HighRiskHighReturn => &mut self.high_risk_high_return,
            Quadrant::HighRiskLowReturn => &mut self.high_risk_low_return,
            Quadrant::LowRiskHighReturn => &mut self.low_risk_high_return,
            Quadrant::LowRiskLowReturn => &mut self.low_risk_low_return,
        }
    }

    pub fn population(&self) -> usize {
        self.high_risk_high_return.len()
            + self.high_risk_low_return.len()
            + self.low_risk_high_return.len()
            + self.low_risk_low_return.len()
    }
}

/// Splits records into risk/return quadrants.
///
/// Unlike the GE matrix, the cuts come from the data: a record is "high" on a
/// score when it is at or above the `high_percentile`-th percentile of that
/// score across the whole input.
pub fn calculate_risk_quadrant<'a, S: ScoringModel + ?Sized>(
    records: &'a [Record],
    scorer: &S,
    high_percentile: f64,
) -> Result<RiskQuadrantResult<'a>, AnalyticsError> {
    if !(0.0..=100.0).contains(&high_percentile) {
        return Err(AnalyticsError::InvalidArgument(format!(
            "high percentile must be within 0..=100, got {high_percentile}"
        )));
    }

    let mut result = RiskQuadrantResult {
        high_percentile,
        ..RiskQuadrantResult::default()
    };
    if records.is_empty() {
        return Ok(result);
    }

    let risk_scores: Vec<f64> = records.iter().map(|r| scorer.risk_score(r)).collect();
    let return_scores: Vec<f64> = records.iter().map(|r| scorer.return_score(r)).collect();

    result.risk_cut = calculate_percentile(&risk_scores, high_percentile)?;
    result.return_cut = calculate_percentile(&return_scores, high_percentile)?;

    for ((record, risk_score), return_score) in records.iter().zip(risk_scores).zip(return_scores) {
        let quadrant = Quadrant::from_flags(risk_score >= result.risk_cut, return_score >= result.return_cut);
        result.quadrant_mut(quadrant).push(ScoredRecord {
            record,
            risk_score,
            return_score,
        });
    }

    tracing::debug!(
        records = records.len(),
        risk_cut = result.risk_cut,
        return_cut = result.return_cut,
        "Risk quadrant built."
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use risk::WeightedScorer;
    use rust_decimal_macros::dec;

    fn funded(name: &str, funding: rust_decimal::Decimal, founded: i32) -> Record {
        Record {
            total_funding_usd: funding,
            founded_year: founded,
            ..Record::new(name)
        }
    }

    #[test]
    fn ascending_classification_uses_greater_or_equal() {
        let t = AxisThresholds::new(1e6, 1e7, 1e8);
        assert_eq!(classify_value(1e8, &t, AxisDirection::Ascending), Level::High);
        assert_eq!(classify_value(1e7, &t, AxisDirection::Ascending), Level::Medium);
        assert_eq!(classify_value(9_999_999.0, &t, AxisDirection::Ascending), Level::Low);
        assert_eq!(classify_value(0.0, &t, AxisDirection::Ascending), Level::Low);
    }

    #[test]
    fn rank_classification_is_reversed() {
        let t = AxisThresholds::new(5e6, 5e5, 5e4);
        assert_eq!(classify_value(50_000.0, &t, AxisDirection::Descending), Level::High);
        assert_eq!(classify_value(50_001.0, &t, AxisDirection::Descending), Level::Medium);
        assert_eq!(classify_value(500_000.0, &t, AxisDirection::Descending), Level::Medium);
        assert_eq!(classify_value(500_001.0, &t, AxisDirection::Descending), Level::Low);
    }

    #[test]
    fn degenerate_thresholds_put_everything_in_one_band() {
        let t = AxisThresholds::ZERO;
        for v in [0.0, 1.0, 1e9] {
            assert_eq!(classify_value(v, &t, AxisDirection::Ascending), Level::High);
        }
        assert_eq!(classify_value(0.0, &t, AxisDirection::Descending), Level::High);
        assert_eq!(classify_value(3.0, &t, AxisDirection::Descending), Level::Low);
    }

    #[test]
    fn ge_matrix_buckets_by_year_and_funding() {
        let records = vec![
            funded("big-new", dec!(200000000), 2025),
            funded("mid-old", dec!(20000000), 2015),
            funded("small-mid", dec!(5000), 2021),
            funded("unknown", dec!(0), 0),
        ];
        let result = calculate_ge_matrix(
            &records,
            NumericField::TotalFundingUsd,
            NumericField::FoundedYear,
            &ThresholdTable::default(),
        );

        assert_eq!(result.high_high[0].name, "big-new");
        assert_eq!(result.low_medium[0].name, "mid-old");
        assert_eq!(result.medium_low[0].name, "small-mid");
        assert_eq!(result.low_low[0].name, "unknown");
        assert_eq!(result.population(), records.len());
        assert_eq!(result.x_thresholds, AxisThresholds::new(1e6, 1e7, 1e8));
    }

    #[test]
    fn ge_matrix_falls_back_to_zero_thresholds_for_unlisted_axis() {
        let records = vec![funded("a", dec!(1), 2020), funded("b", dec!(0), 2020)];
        let result = calculate_ge_matrix(
            &records,
            NumericField::RaisedAmountUsd,
            NumericField::FoundedYear,
            &ThresholdTable::default(),
        );
        assert_eq!(result.x_thresholds, AxisThresholds::ZERO);
        // Every raised amount (all zero here) is >= 0 and lands in the High column.
        assert_eq!(result.medium_high.len(), 2);
    }

    #[test]
    fn bucket_keys_capitalize_the_x_level() {
        assert_eq!(bucket_key(Level::High, Level::Low), "highLow");
        assert_eq!(bucket_key(Level::Medium, Level::Medium), "mediumMedium");
        let result = calculate_ge_matrix(
            &[],
            NumericField::Rank,
            NumericField::NumFundingRounds,
            &ThresholdTable::default(),
        );
        let keys: Vec<String> = result.buckets().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys.len(), 9);
        assert_eq!(keys[0], "highHigh");
        assert_eq!(keys[8], "lowLow");
    }

    #[test]
    fn ge_matrix_serializes_camel_case_keys() {
        let records = vec![funded("a", dec!(1), 2020)];
        let result = calculate_ge_matrix(
            &records,
            NumericField::TotalFundingUsd,
            NumericField::FoundedYear,
            &ThresholdTable::default(),
        );
        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("mediumLow").is_some());
        assert_eq!(json["xAxis"], "total_funding_usd");
        assert_eq!(json["xThresholds"]["high"], 1e8);
    }

    #[test]
    fn empty_input_gives_empty_quadrants() {
        let result = calculate_risk_quadrant(&[], &WeightedScorer::default(), 75.0).unwrap();
        assert_eq!(result.population(), 0);
        assert_eq!(result.risk_cut, 0.0);
    }

    #[test]
    fn single_record_is_high_on_both_axes() {
        let records = vec![Record {
            rank: 100,
            ..Record::new("solo")
        }];
        let result = calculate_risk_quadrant(&records, &WeightedScorer::default(), 75.0).unwrap();
        assert_eq!(result.high_risk_high_return.len(), 1);
        assert_eq!(result.return_cut, risk::RETURN_SCORE_FLOOR);
    }

    #[test]
    fn quadrant_uses_percentile_cut() {
        let scorer = WeightedScorer::default().with_reference_year(2026);
        let records: Vec<Record> = (1..=4)
            .map(|i| Record {
                num_funding_rounds: i,
                total_funding_usd: rust_decimal::Decimal::from(10_u64.pow(i + 1)),
                founded_year: 2000,
                ..Record::new(format!("r{i}"))
            })
            .collect();

        let result = calculate_risk_quadrant(&records, &scorer, 75.0).unwrap();
        assert_eq!(result.population(), 4);
        // Risk and return both grow with i, so only the top record clears the 75th percentile.
        assert_eq!(result.high_risk_high_return.len(), 1);
        assert_eq!(result.high_risk_high_return[0].record.name, "r4");
        assert_eq!(result.low_risk_low_return.len(), 3);
        assert!(result.quadrant(Quadrant::HighRiskLowReturn).is_empty());
    }

    #[test]
    fn quadrant_rejects_invalid_percentile() {
        let err = calculate_risk_quadrant(&[], &WeightedScorer::default(), -1.0).unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidArgument(_)));
    }
}
