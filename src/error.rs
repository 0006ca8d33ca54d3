//! Error types for ferrite-cls.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while training a point-cloud classifier.
///
/// Every variant is fatal to a run: nothing in the training loop retries.
#[derive(Error, Debug)]
pub enum TrainError {
    /// Invalid configuration.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the configuration error.
        message: String,
    },

    /// Shape mismatch between a buffer, a batch, or a parameter and what was expected.
    #[error("shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        /// Expected shape.
        expected: Vec<usize>,
        /// Actual shape.
        got: Vec<usize>,
    },

    /// `next_batch` was called on a source whose `has_next_batch()` is false.
    #[error("dataset source exhausted: next_batch called without a remaining batch")]
    SourceExhausted,

    /// A label does not index a known class.
    #[error("label {label} out of range for {num_classes} classes")]
    LabelOutOfRange {
        /// Offending label.
        label: usize,
        /// Number of classes the model predicts.
        num_classes: usize,
    },

    /// The configured output directory does not exist and may not be created.
    #[error("output directory not found: {}", path.display())]
    OutputDirMissing {
        /// Directory that was looked up.
        path: PathBuf,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl TrainError {
    /// Shorthand for an [`TrainError::InvalidConfig`] with a formatted message.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        TrainError::InvalidConfig {
            message: message.into(),
        }
    }
}

/// Result type for ferrite-cls operations.
pub type Result<T> = std::result::Result<T, TrainError>;
