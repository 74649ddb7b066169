use serde::{Deserialize, Serialize};

/// Cut points for a low/medium/high classification of one axis.
///
/// For descending axes (rank) the numeric order of the cuts is reversed:
/// `high` is the smallest value.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AxisThresholds {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
}

impl AxisThresholds {
    pub const fn new(low: f64, medium: f64, high: f64) -> Self {
        Self { low, medium, high }
    }

    /// The degenerate fallback for axes without predefined cut points.
    pub const ZERO: AxisThresholds = AxisThresholds::new(0.0, 0.0, 0.0);

    pub fn is_finite(&self) -> bool {
        self.low.is_finite() && self.medium.is_finite() && self.high.is_finite()
    }
}
