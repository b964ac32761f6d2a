//! Error types for PRISM operations

use thiserror::Error;

/// Failures reported by the external mining pipeline or analytics service.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PipelineError {
    #[error("Request to {service} failed: {reason}")]
    RequestFailed { service: String, reason: String },

    #[error("Invalid response from {service}: {reason}")]
    InvalidResponse { service: String, reason: String },

    #[error("Service unavailable: {service}")]
    Unavailable { service: String },
}

impl PipelineError {
    pub fn request_failed(service: impl Into<String>, reason: impl Into<String>) -> Self {
        PipelineError::RequestFailed {
            service: service.into(),
            reason: reason.into(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing configuration file path (use --config or PRISM_CONFIG)")]
    MissingConfigPath,

    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Master error type for all PRISM errors.
#[derive(Debug, Error)]
pub enum PrismError {
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for PRISM operations.
pub type PrismResult<T> = Result<T, PrismError>;

// =============================================================================
// TESTS
// =============================================================================
