use risk::RiskError;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum AnalyticsError {
    #[error("Not enough data to perform calculation: {0}")]
    NotEnoughData(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Scoring model could not be built: {0}")]
    Scoring(#[from] RiskError),
}
