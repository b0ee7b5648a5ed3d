//! Error types for the view-splitting pipeline.
//!
//! This module defines the errors that can occur while post-processing
//! region proposals, along with helper constructors for creating errors
//! with appropriate context. "No regions survived" is deliberately not an
//! error anywhere in this taxonomy: an empty region list is a valid
//! pipeline state and flows through every stage untouched.

use thiserror::Error;

/// Stages of the post-processing pipeline, used to tag processing errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingStage {
    /// Engineering-criteria filtering.
    Filtering,
    /// Overlap deduplication.
    Deduplication,
    /// Proximity clustering and merging.
    Clustering,
    /// Info-region detection.
    InfoDetection,
    /// Region expansion and text refinement.
    Expansion,
    /// Importance ranking.
    Ranking,
    /// Generic processing error.
    Generic,
}

impl std::fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessingStage::Filtering => write!(f, "filtering"),
            ProcessingStage::Deduplication => write!(f, "deduplication"),
            ProcessingStage::Clustering => write!(f, "clustering"),
            ProcessingStage::InfoDetection => write!(f, "info-region detection"),
            ProcessingStage::Expansion => write!(f, "expansion"),
            ProcessingStage::Ranking => write!(f, "ranking"),
            ProcessingStage::Generic => write!(f, "processing"),
        }
    }
}

/// Errors produced by the view-splitting pipeline.
#[derive(Error, Debug)]
pub enum SplitError {
    /// Error occurred in a pipeline stage.
    #[error("{kind} failed: {context}")]
    Processing {
        /// The stage where the error occurred.
        kind: ProcessingStage,
        /// Additional context about the error.
        context: String,
        /// The underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Error indicating invalid input.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// A message describing the invalid input.
        message: String,
    },

    /// Error indicating a configuration problem.
    #[error("configuration: {message}")]
    ConfigError {
        /// A message describing the configuration error.
        message: String,
    },

    /// IO error.
    #[error("io")]
    Io(#[from] std::io::Error),
}

impl SplitError {
    /// Creates a processing error tagged with a pipeline stage.
    pub fn processing(
        kind: ProcessingStage,
        context: &str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Processing {
            kind,
            context: context.to_string(),
            source: Box::new(error),
        }
    }

    /// Creates an invalid-input error with the given message.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Creates a configuration error with the given message.
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }
}

/// Convenient result alias for pipeline operations.
pub type SplitResult<T> = Result<T, SplitError>;
