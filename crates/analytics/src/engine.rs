use crate::cache::HierarchyCache;
use crate::classification::{
    calculate_ge_matrix, calculate_risk_quadrant, GeMatrixResult, RiskQuadrantResult,
};
use crate::error::AnalyticsError;
use crate::filter::{apply_filters, FilterCriteria};
use crate::hierarchy::{to_sunburst, HierarchyResult, SunburstData};
use crate::inference::CategoryInference;
use crate::statistics::{calculate_statistics, Statistics};
use configuration::{Config, ThresholdTable};
use core_types::{NumericField, Record};
use risk::WeightedScorer;
use std::sync::Arc;

/// One configured analytics session.
///
/// Holds everything derived from `Config` that the calculations need, plus
/// the hierarchy cache. Every method other than `hierarchy` and `sunburst` is
/// a pure function of its input.
#[derive(Debug)]
pub struct AnalyticsEngine {
    thresholds: ThresholdTable,
    default_axes: (NumericField, NumericField),
    inference: CategoryInference,
    scorer: WeightedScorer,
    high_percentile: f64,
    cache: HierarchyCache,
}

impl AnalyticsEngine {
    /// Builds an engine from validated configuration.
    ///
    /// # Returns
    ///
    /// An `AnalyticsError::Scoring` if the configured weights are unusable.
    pub fn new(config: &Config) -> Result<Self, AnalyticsError> {
        Ok(Self {
            thresholds: config.ge_matrix.thresholds.clone(),
            default_axes: (config.ge_matrix.default_x, config.ge_matrix.default_y),
            inference: CategoryInference::new(&config.categories),
            scorer: WeightedScorer::from_settings(&config.risk_quadrant)?,
            high_percentile: config.risk_quadrant.high_percentile,
            cache: HierarchyCache::new(),
        })
    }

    /// Pins the year used for company age so results do not drift with the clock.
    pub fn with_reference_year(mut self, year: i32) -> Self {
        self.scorer = self.scorer.with_reference_year(year);
        self
    }

    pub fn default_axes(&self) -> (NumericField, NumericField) {
        self.default_axes
    }

    pub fn inference(&self) -> &CategoryInference {
        &self.inference
    }

    pub fn statistics(&self, records: &[Record]) -> Statistics {
        calculate_statistics(records)
    }

    pub fn ge_matrix<'a>(
        &self,
        records: &'a [Record],
        x_axis: NumericField,
        y_axis: NumericField,
    ) -> GeMatrixResult<'a> {
        calculate_ge_matrix(records, x_axis, y_axis, &self.thresholds)
    }

    pub fn risk_quadrant<'a>(
        &self,
        records: &'a [Record],
    ) -> Result<RiskQuadrantResult<'a>, AnalyticsError> {
        calculate_risk_quadrant(records, &self.scorer, self.high_percentile)
    }

    /// The category hierarchy, served from the cache when the input is unchanged.
    pub fn hierarchy(&mut self, records: &[Record]) -> Arc<HierarchyResult> {
        self.cache.get_or_build(records, &self.inference)
    }

    pub fn sunburst(&mut self, records: &[Record]) -> SunburstData {
        to_sunburst(&self.hierarchy(records))
    }

    pub fn filter<'a>(&self, records: &'a [Record], criteria: &FilterCriteria) -> Vec<&'a Record> {
        apply_filters(records, criteria)
    }

    pub fn cache(&self) -> &HierarchyCache {
        &self.cache
    }
}
