//! Configuration management and validation.
//!
//! Collects the source locations, join switches, filter state and refresh
//! cadence for one map session. Built from CLI arguments and validated
//! before any source is fetched.

use crate::constants::{
    DEFAULT_OUTPUT_FILE, DEFAULT_REFRESH_INTERVAL_SECS, DEFAULT_UNIFICATION_MARKER,
    MIN_REFRESH_INTERVAL_SECS,
};
use crate::error::{MapError, Result};
use crate::filter::RecordFilter;
use crate::join::{DegradedShape, JoinOptions};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

/// Global configuration for a map session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    /// Jurisdiction feed (CSV)
    pub feed_path: PathBuf,

    /// County boundary collection (GeoJSON); not needed for diagnostics
    pub boundary_path: Option<PathBuf>,

    /// Where the rendered GeoJSON is written
    pub output_path: PathBuf,

    /// Seconds between automatic refreshes
    pub refresh_interval_secs: u64,

    /// Notes substring that marks a unified government
    pub unification_marker: String,

    pub join: JoinOptions,

    pub filter: RecordFilter,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            feed_path: PathBuf::new(),
            boundary_path: None,
            output_path: PathBuf::from(DEFAULT_OUTPUT_FILE),
            refresh_interval_secs: DEFAULT_REFRESH_INTERVAL_SECS,
            unification_marker: DEFAULT_UNIFICATION_MARKER.to_string(),
            join: JoinOptions::default(),
            filter: RecordFilter::default(),
        }
    }
}

impl MapConfig {
    /// Create configuration for a feed
    pub fn new(feed_path: impl Into<PathBuf>) -> Self {
        Self {
            feed_path: feed_path.into(),
            ..Self::default()
        }
    }

    /// Set the boundary collection location
    pub fn with_boundaries(mut self, path: impl Into<PathBuf>) -> Self {
        self.boundary_path = Some(path.into());
        self
    }

    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = path.into();
        self
    }

    pub fn with_refresh_interval(mut self, secs: u64) -> Self {
        self.refresh_interval_secs = secs;
        self
    }

    pub fn with_unification_marker(mut self, marker: impl Into<String>) -> Self {
        self.unification_marker = marker.into();
        self
    }

    pub fn with_degraded_shape(mut self, shape: DegradedShape) -> Self {
        self.join.degraded_shape = shape;
        self
    }

    /// Ignore latitude/longitude columns when joining
    pub fn without_coordinates(mut self) -> Self {
        self.join.use_coordinates = false;
        self
    }

    pub fn with_filter(mut self, filter: RecordFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    /// Check the settings common to every command
    pub fn validate(&self) -> Result<()> {
        if self.feed_path.as_os_str().is_empty() {
            return Err(MapError::configuration("feed path is required"));
        }

        if self.unification_marker.trim().is_empty() {
            return Err(MapError::configuration("unification marker cannot be empty"));
        }

        if self.refresh_interval_secs < MIN_REFRESH_INTERVAL_SECS {
            return Err(MapError::configuration(format!(
                "refresh interval must be at least {} seconds, got {}",
                MIN_REFRESH_INTERVAL_SECS, self.refresh_interval_secs
            )));
        }

        debug!(
            "Configuration validated: feed={}, boundaries={:?}, interval={}s",
            self.feed_path.display(),
            self.boundary_path,
            self.refresh_interval_secs
        );
        Ok(())
    }

    /// Validate for commands that render a map
    pub fn validate_for_render(&self) -> Result<()> {
        self.validate()?;

        if self.boundary_path.is_none() {
            return Err(MapError::configuration("boundary collection path is required"));
        }

        if self.output_path.file_name().is_none() {
            return Err(MapError::configuration(format!(
                "output path '{}' does not name a file",
                self.output_path.display()
            )));
        }
        Ok(())
    }
}
