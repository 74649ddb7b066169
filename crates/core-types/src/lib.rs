pub mod enums;
pub mod error;
pub mod money;
pub mod record;
pub mod thresholds;

// Re-export the core types to provide a clean public API.
pub use enums::{AxisDirection, ChartMetric, Level, NumericField, Quadrant, SortOrder};
pub use error::CoreError;
pub use money::sum_funding;
pub use record::{split_multi_value, Record};
pub use thresholds::AxisThresholds;
