use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum RiskError {
    #[error("Scoring weights from configuration are invalid: {0}")]
    InvalidWeights(String),
}
