//! Tests for feed ingestion
//!
//! Shared fixtures for column mapping and row ingestion tests.


use super::{FeedIngestor, IngestResult};
use crate::events::CollectingSink;

/// Header used by the standard feed export
pub const FEED_HEADER: &str =
    "Jurisdiction,Jurisdiction FIPS,Portal URL,Population,Government Type,Notes";

/// Header of the coordinate-aware feed export
pub const FEED_HEADER_WITH_COORDS: &str =
    "Jurisdiction,Jurisdiction FIPS,Portal URL,Population,Government Type,Notes,Latitude,Longitude";

/// Build feed text from a header and data lines
pub fn feed_text(header: &str, rows: &[&str]) -> String {
    let mut text = String::from(header);
    for row in rows {
        text.push('\n');
        text.push_str(row);
    }
    text.push('\n');
    text
}

/// Ingest with the default classifier, collecting events
pub fn ingest(text: &str) -> (IngestResult, CollectingSink) {
    let sink = CollectingSink::new();
    let result = FeedIngestor::default()
        .ingest(text.as_bytes(), &sink)
        .expect("feed header should be valid");
    (result, sink)
}
