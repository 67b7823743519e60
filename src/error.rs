// File: src/error.rs
//! Error types for price estimation.

use thiserror::Error;

/// Result type alias for estimator operations.
pub type EstimatorResult<T> = Result<T, EstimatorError>;

/// Errors that can occur while loading artifacts or running an estimate.
#[derive(Debug, Error)]
pub enum EstimatorError {
    /// The feature schema does not agree with the predictor or is malformed.
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    /// The model artifact could not be loaded or is structurally invalid.
    #[error("Predictor unavailable: {0}")]
    PredictorUnavailable(String),

    /// Inference failed for a single request.
    #[error("Prediction failed: {0}")]
    PredictionFailure(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Artifact encoding or decoding error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl EstimatorError {
    /// Create a schema mismatch error.
    pub fn schema_mismatch(msg: impl Into<String>) -> Self {
        Self::SchemaMismatch(msg.into())
    }

    /// Create a predictor unavailable error.
    pub fn predictor_unavailable(msg: impl Into<String>) -> Self {
        Self::PredictorUnavailable(msg.into())
    }

    /// Create a prediction failure.
    pub fn prediction(msg: impl Into<String>) -> Self {
        Self::PredictionFailure(msg.into())
    }

    /// Create a config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Errors that leave the process without any way to serve an estimate.
    pub fn is_startup_fatal(&self) -> bool {
        matches!(
            self,
            Self::SchemaMismatch(_)
                | Self::PredictorUnavailable(_)
                | Self::Config(_)
                | Self::Io(_)
                | Self::Serialization(_)
        )
    }

    /// Inference is deterministic, so repeating a failed call never helps.
    pub fn is_retriable(&self) -> bool {
        false
    }
}

impl From<bincode::Error> for EstimatorError {
    fn from(err: bincode::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for EstimatorError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
