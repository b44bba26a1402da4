//! Jurisdiction Map Library
//!
//! Joins a feed of government jurisdiction records (cities, counties and
//! unified city-county governments) to a collection of county boundary
//! polygons so they can be drawn on a map.
//!
//! This library provides tools for:
//! - Normalizing 5-digit county and 7-digit place identifiers
//! - Classifying records by declared government type and notes
//! - Joining identifiers to county polygons, supplied coordinates or an
//!   approximate same-state placement, reporting everything dropped
//! - Detecting duplicate names in the feed
//! - Periodic and manual refresh that never clears displayed data on failure
//! - Writing the result as GeoJSON

pub mod boundary;
pub mod classifier;
pub mod config;
pub mod constants;
pub mod diagnostics;
pub mod error;
pub mod events;
pub mod feed;
pub mod filter;
pub mod join;
pub mod loader;
pub mod models;
pub mod normalizer;
pub mod output;
pub mod refresh;

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use boundary::BoundaryCollection;
pub use classifier::{Classification, Classifier};
pub use config::MapConfig;
pub use diagnostics::DiagnosticsReport;
pub use error::{MapError, Result};
pub use events::{CollectingSink, DiagnosticEvent, EventSink, NoopSink, TracingSink};
pub use feed::FeedIngestor;
pub use filter::RecordFilter;
pub use join::{JoinEngine, JoinOptions, MapView};
pub use loader::{FileFetcher, MapLoader, MapState, SourceFetcher};
pub use models::{CanonicalId, EntityClass, JurisdictionRecord, Placement};
pub use normalizer::normalize;
pub use refresh::{RefreshHandle, Refresher};
