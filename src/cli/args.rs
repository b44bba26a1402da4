//! Command-line argument definitions
//!
//! Defines the CLI using the clap derive API. Every command reads the
//! jurisdiction feed; `render` and `watch` also need the county boundary
//! collection.

use crate::config::MapConfig;
use crate::constants::{DEFAULT_OUTPUT_FILE, DEFAULT_REFRESH_INTERVAL_SECS, DEFAULT_UNIFICATION_MARKER};
use crate::filter::RecordFilter;
use crate::join::DegradedShape;
use crate::models::EntityClass;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// CLI arguments for the jurisdiction map builder
///
/// Joins a feed of government jurisdictions (cities, counties, unified
/// city-county governments) to county boundary polygons and writes a
/// GeoJSON layer for map rendering.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "jurisdiction-map",
    version,
    about = "Join jurisdiction feeds to county boundaries and render GeoJSON",
    long_about = "Normalizes 5-digit county and 7-digit place identifiers from a jurisdiction \
                  feed, joins them to a county boundary collection (falling back to supplied \
                  coordinates or an approximate same-state placement) and writes a GeoJSON \
                  feature collection. Every identifier that cannot be placed is reported."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Load both sources once and write the GeoJSON layer
    Render(MapArgs),
    /// Report record counts and duplicate names in the feed
    Diagnostics(DiagnosticsArgs),
    /// Render, then refresh on an interval or when Enter is pressed
    Watch(WatchArgs),
}

/// Options shared by every command
#[derive(Debug, Clone, clap::Args)]
pub struct FeedArgs {
    /// Jurisdiction feed (CSV with a header row)
    #[arg(short = 'f', long = "feed", value_name = "CSV")]
    pub feed: PathBuf,

    /// Notes text that marks a unified city-county government
    #[arg(
        long = "unified-marker",
        value_name = "TEXT",
        default_value = DEFAULT_UNIFICATION_MARKER
    )]
    pub unified_marker: String,

    /// Enable debug logging
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Arguments for commands that produce a map
#[derive(Debug, Clone, clap::Args)]
pub struct MapArgs {
    #[command(flatten)]
    pub feed: FeedArgs,

    /// County boundary collection (GeoJSON FeatureCollection)
    #[arg(short = 'b', long = "boundaries", value_name = "GEOJSON")]
    pub boundaries: PathBuf,

    /// Where to write the rendered GeoJSON
    #[arg(
        short = 'o',
        long = "output",
        value_name = "FILE",
        default_value = DEFAULT_OUTPUT_FILE
    )]
    pub output: PathBuf,

    /// Only include these classes (unified, city, county, other)
    #[arg(long = "class", value_name = "CLASS", value_delimiter = ',')]
    pub classes: Vec<EntityClass>,

    /// Only include this population bucket
    #[arg(long = "population", value_name = "BUCKET")]
    pub population: Option<String>,

    /// Only include names containing this text
    #[arg(short = 's', long = "search", value_name = "TEXT")]
    pub search: Option<String>,

    /// How places without coordinates are drawn (centroid or polygon)
    #[arg(long = "degraded", value_name = "SHAPE", default_value = "centroid")]
    pub degraded: DegradedShape,

    /// Ignore latitude/longitude columns in the feed
    #[arg(long = "ignore-coordinates")]
    pub ignore_coordinates: bool,

    /// Summary format
    #[arg(long = "format", value_enum, default_value = "human")]
    pub format: OutputFormat,
}

/// Arguments for the diagnostics command
#[derive(Debug, Clone, clap::Args)]
pub struct DiagnosticsArgs {
    #[command(flatten)]
    pub feed: FeedArgs,

    /// Report format
    #[arg(long = "format", value_enum, default_value = "human")]
    pub format: OutputFormat,

    /// Number of duplicate-name groups to list
    #[arg(long = "top", value_name = "N", default_value_t = 10)]
    pub top: usize,
}

/// Arguments for the watch command
#[derive(Debug, Clone, clap::Args)]
pub struct WatchArgs {
    #[command(flatten)]
    pub map: MapArgs,

    /// Seconds between automatic refreshes
    #[arg(
        long = "interval",
        value_name = "SECS",
        default_value_t = DEFAULT_REFRESH_INTERVAL_SECS
    )]
    pub interval: u64,
}

/// Output format for summaries and reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Coloured, human-readable output
    Human,
    /// JSON for scripting
    Json,
}

impl FeedArgs {
    pub fn to_config(&self) -> MapConfig {
        MapConfig::new(self.feed.clone()).with_unification_marker(self.unified_marker.clone())
    }
}

impl MapArgs {
    pub fn filter(&self) -> RecordFilter {
        let mut filter = RecordFilter::new().with_classes(self.classes.iter().copied());
        if let Some(bucket) = &self.population {
            filter = filter.with_population(bucket.clone());
        }
        if let Some(text) = &self.search {
            filter = filter.with_search(text.clone());
        }
        filter
    }

    pub fn to_config(&self) -> MapConfig {
        let config = self
            .feed
            .to_config()
            .with_boundaries(self.boundaries.clone())
            .with_output(self.output.clone())
            .with_degraded_shape(self.degraded)
            .with_filter(self.filter());
        if self.ignore_coordinates {
            config.without_coordinates()
        } else {
            config
        }
    }
}

impl WatchArgs {
    pub fn to_config(&self) -> MapConfig {
        self.map.to_config().with_refresh_interval(self.interval)
    }
}
