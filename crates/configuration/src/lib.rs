use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod categories;
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use categories::{default_rules, CategoryRule, CategorySettings, FALLBACK_CATEGORY};
pub use logging::init_logging;
pub use settings::{
    Config, GeMatrixSettings, LoggingSettings, ReturnWeights, RiskQuadrantSettings, RiskWeights,
    ThresholdTable,
};

/// Prefix for environment overrides, e.g. `STORAGE_INSIGHTS__RISK_QUADRANT__HIGH_PERCENTILE=80`.
pub const ENV_PREFIX: &str = "STORAGE_INSIGHTS";

/// Loads the application configuration.
///
/// When `path` is given the file must exist. Otherwise an optional
/// `storage-insights.toml` in the working directory is used. Environment
/// variables are layered on top, and the result is validated before it is
/// returned.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let file = match path {
        Some(path) => config::File::from(path).required(true),
        None => config::File::with_name("storage-insights").required(false),
    };

    let builder = config::Config::builder()
        .add_source(file)
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;

    Ok(config)
}

/// Parses a configuration from TOML text. Used by tests and embedders that
/// keep their settings elsewhere.
pub fn config_from_toml(toml: &str) -> Result<Config, ConfigError> {
    let config = config::Config::builder()
        .add_source(config::File::from_str(toml, config::FileFormat::Toml))
        .build()?
        .try_deserialize::<Config>()?;
    config.validate()?;
    Ok(config)
}
