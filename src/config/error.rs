//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid database URL format")]
    InvalidDatabaseUrl,

    #[error("Pool min_connections exceeds max_connections")]
    InvalidPoolSize,

    #[error("Pool size exceeds maximum allowed (100)")]
    PoolSizeTooLarge,

    #[error("Minimum fee ({min} bps) exceeds maximum fee ({max} bps)")]
    InvalidFeeBounds { min: u32, max: u32 },

    #[error("Maximum fee of {0} bps exceeds 100%")]
    FeeAboveHundredPercent(u32),

    #[error("A fixed lottery seed is not allowed in production")]
    FixedLotterySeedInProduction,

    #[error("Invalid log filter directive: {0}")]
    InvalidLogLevel(String),
}
