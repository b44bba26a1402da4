//! Error handling for feed loading and map rendering.
//!
//! Only source-level failures (feed, boundary collection, configuration)
//! are errors. Row-level and feature-level problems are reported through
//! the diagnostics port and never abort a load.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Source not found at path: {path}")]
    SourceNotFound { path: PathBuf },

    #[error("Invalid jurisdiction feed: {reason}")]
    InvalidFeed { reason: String },

    #[error("Invalid boundary collection: {reason}")]
    InvalidBoundaries { reason: String },

    #[error("Feed fetch failed: {reason}")]
    FeedFetch { reason: String },

    #[error("Boundary fetch failed: {reason}")]
    BoundaryFetch { reason: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Interrupted: {reason}")]
    Interrupted { reason: String },
}

impl MapError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an invalid feed error
    pub fn invalid_feed(reason: impl Into<String>) -> Self {
        Self::InvalidFeed {
            reason: reason.into(),
        }
    }

    /// Create an invalid boundary collection error
    pub fn invalid_boundaries(reason: impl Into<String>) -> Self {
        Self::InvalidBoundaries {
            reason: reason.into(),
        }
    }

    /// Whether this error came from fetching or parsing the boundary collection
    pub fn is_boundary_failure(&self) -> bool {
        matches!(
            self,
            MapError::BoundaryFetch { .. } | MapError::InvalidBoundaries { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, MapError>;
