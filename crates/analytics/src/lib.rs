//! # Storage Insights Analytics Engine
//!
//! Classifies, aggregates and summarizes energy-storage investee records. Every
//! result is a plain serializable struct; rendering is left to the caller.
//!
//! ## Architectural Principles
//!
//! - **Pure logic:** no I/O and no async. Every calculation is a function of an
//!   immutable record slice, and results are deterministic for a given input
//!   order and rule table.
//! - **Tables as data:** GE-matrix thresholds, risk/return weights and the
//!   category rule table all come from `configuration`.
//! - **Explicit caching:** the only state is the single-slot `HierarchyCache`,
//!   which callers construct and own.
//!
//! ## Public API
//!
//! - `AnalyticsEngine`: a configured session over all of the calculations below.
//! - `calculate_ge_matrix` / `calculate_risk_quadrant`: threshold classification.
//! - `CategoryInference` / `build_hierarchy` / `to_chart_nodes`: the category tree.
//! - `calculate_statistics` and friends: summary statistics.
//! - `apply_filters`: the compound record filter.

// Declare the modules that constitute this crate.
pub mod breakdown;
pub mod cache;
pub mod classification;
pub mod engine;
pub mod error;
pub mod filter;
pub mod hierarchy;
pub mod inference;
pub mod statistics;
pub mod views;

// Re-export the key components to create a clean, public-facing API.
pub use breakdown::{country_breakdown, CountryData, GeoAnalysis, NamedCount};
pub use cache::{fingerprint, HierarchyCache, SharedHierarchyCache};
pub use classification::{
    axis_thresholds, bucket_key, calculate_ge_matrix, calculate_risk_quadrant, classify_value,
    GeMatrixResult, RiskQuadrantResult, ScoredRecord,
};
pub use engine::AnalyticsEngine;
pub use error::AnalyticsError;
pub use filter::{apply_filters, FilterCriteria, FilterOptions, YearRange};
pub use hierarchy::{
    build_hierarchy, to_chart_nodes, to_sunburst, CategoryNode, ChartNode, HierarchyResult,
    ParentNode, SunburstData,
};
pub use inference::{normalize_label, CategoryInference};
pub use statistics::{
    calculate_correlation, calculate_field_statistics, calculate_percentile, calculate_statistics,
    calculate_value_range, correlate_fields, group_statistics, CountryCount, FieldStatistics,
    GroupField, GroupSummary, IndustryCount, Statistics, ValueRange,
};
pub use views::{
    chart_points, deduplicate_by_name, search_records, sort_records, ChartPoint,
    DEFAULT_POINT_SIZE,
};
