//! End-to-end tests of the load pipeline from files on disk
//!
//! A realistic feed (quoted identifiers, unpadded codes, a coordinate
//! column, unusable rows) and a boundary collection mixing id styles are
//! written to a temporary directory, loaded through the public API and
//! rendered to GeoJSON.

use jurisdiction_map::events::CollectingSink;
use jurisdiction_map::join::{DegradedShape, JoinEngine, JoinOptions};
use jurisdiction_map::models::{EntityClass, Placement, PlacementMethod};
use jurisdiction_map::output::write_geojson;
use jurisdiction_map::{
    DiagnosticEvent, FileFetcher, MapConfig, MapLoader, MapState, NoopSink, RecordFilter,
};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

const FEED: &str = r#"Jurisdiction,Jurisdiction FIPS,Portal URL,Population,Government Type,Notes,Latitude,Longitude
Dallas County,'48113',https://www.dallascounty.org/open-data,1M+,County,,,
Dallas,4819000,https://www.dallasopendata.com,1M+,City,,,
Houston,"""4835000""",https://data.houstontx.gov,1M+,City,,29.7604,-95.3698
Denver,820000,https://www.denvergov.org/opendata,500K-1M,"City, County",Unified City-County Government,,
Example Unified,803100,https://data.example.gov,<50K,"City, County",,,
Adams County,8001,https://adcogov.org,500K-1M,County,,,
Seattle,5363000,https://data.seattle.gov,500K-1M,City,,,
Missing Id,,https://nowhere.example.org,<50K,City,,,
Austin,4805000,https://data.austintexas.gov,500K-1M,City,,not-a-number,-97.74
"#;

const BOUNDARIES: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {"type": "Feature", "id": "48113", "properties": {"NAME": "Dallas"},
     "geometry": {"type": "Polygon", "coordinates": [[[-97,32],[-96,32],[-96,33],[-97,33],[-97,32]]]}},
    {"type": "Feature", "id": 48201, "properties": {"NAME": "Harris"},
     "geometry": {"type": "Polygon", "coordinates": [[[-96,29],[-95,29],[-95,30],[-96,30],[-96,29]]]}},
    {"type": "Feature", "properties": {"GEO_ID": "0500000US08031", "NAME": "Denver"},
     "geometry": {"type": "MultiPolygon", "coordinates": [[[[-105,39.6],[-104.6,39.6],[-104.6,39.9],[-105,39.9],[-105,39.6]]]]}},
    {"type": "Feature", "properties": {"GEOID": "08001", "NAME": "Adams"},
     "geometry": {"type": "Polygon", "coordinates": [[[-105,39.7],[-103.7,39.7],[-103.7,40],[-105,40],[-105,39.7]]]}},
    {"type": "Feature", "id": "48113", "properties": {"NAME": "Dallas (duplicate)"},
     "geometry": {"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,1],[0,0]]]}},
    {"type": "Feature", "id": "48999", "properties": {},
     "geometry": {"type": "Point", "coordinates": [-97, 32]}},
    {"type": "Feature", "id": "123456", "properties": {},
     "geometry": {"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,1],[0,0]]]}}
  ]
}"#;

fn write_sources(dir: &Path) -> MapConfig {
    let feed = dir.join("portals.csv");
    let boundaries = dir.join("counties.geojson");
    std::fs::write(&feed, FEED).unwrap();
    std::fs::write(&boundaries, BOUNDARIES).unwrap();
    MapConfig::new(feed)
        .with_boundaries(boundaries)
        .with_output(dir.join("map.geojson"))
}

async fn load(config: &MapConfig) -> (MapState, Arc<CollectingSink>) {
    let sink = Arc::new(CollectingSink::new());
    let mut loader = MapLoader::from_config(FileFetcher::from_config(config), config)
        .with_sink(sink.clone());
    let state = loader.load().await.expect("sources should load");
    (state, sink)
}

fn method_of(state: &MapState, identifier: &str) -> PlacementMethod {
    state
        .view
        .feature(identifier)
        .unwrap_or_else(|| panic!("{} should be placed", identifier))
        .placement
        .method()
}

#[tokio::test]
async fn test_full_load_places_every_identifier_or_reports_it() {
    let dir = TempDir::new().unwrap();
    let config = write_sources(dir.path());

    let (state, sink) = load(&config).await;

    assert_eq!(state.dataset.stats.rows_read, 9);
    assert_eq!(state.dataset.stats.accepted, 8);
    assert_eq!(state.dataset.stats.coordinates_rejected, 1);
    assert_eq!(state.boundaries.as_ref().unwrap().len(), 4);

    let stats = &state.view.stats;
    assert_eq!(stats.identifiers, 8);
    assert_eq!(stats.placed() + stats.dropped, 8);
    assert_eq!(stats.boundary, 2);
    assert_eq!(stats.unified_boundary, 1);
    assert_eq!(stats.coordinates, 1);
    assert_eq!(stats.degraded, 3);
    assert_eq!(stats.dropped, 1);
    assert_eq!(stats.degraded_collisions, 1);

    assert_eq!(method_of(&state, "48113"), PlacementMethod::Boundary);
    assert_eq!(method_of(&state, "08001"), PlacementMethod::Boundary);
    assert_eq!(method_of(&state, "0803100"), PlacementMethod::UnifiedBoundary);
    assert_eq!(method_of(&state, "4835000"), PlacementMethod::Coordinates);
    assert_eq!(method_of(&state, "4819000"), PlacementMethod::Degraded);
    assert_eq!(method_of(&state, "4805000"), PlacementMethod::Degraded);
    assert_eq!(state.view.dropped[0].identifier.as_str(), "5363000");

    let count = |pred: fn(&DiagnosticEvent) -> bool| sink.count(pred);
    assert_eq!(count(|e| matches!(e, DiagnosticEvent::RowDropped { .. })), 1);
    assert_eq!(count(|e| matches!(e, DiagnosticEvent::CoordinatesRejected { .. })), 1);
    assert_eq!(count(|e| matches!(e, DiagnosticEvent::DuplicateBoundary { .. })), 1);
    assert_eq!(count(|e| matches!(e, DiagnosticEvent::BoundarySkipped { .. })), 2);
    assert_eq!(count(|e| matches!(e, DiagnosticEvent::FeatureDropped { .. })), 1);
    assert_eq!(count(|e| matches!(e, DiagnosticEvent::DegradedPlacement { .. })), 3);
}

#[tokio::test]
async fn test_denver_is_not_matched_through_unrelated_county() {
    let dir = TempDir::new().unwrap();
    let config = write_sources(dir.path());

    let (state, _) = load(&config).await;

    let denver = state.view.feature("0820000").unwrap();
    assert_eq!(denver.display_name, "Denver");
    assert!(denver.source_records[0].is_unified);
    match &denver.placement {
        Placement::DegradedCentroid { county_id, .. } => assert_eq!(county_id.as_str(), "08001"),
        other => panic!("Expected degraded centroid, got {:?}", other),
    }
}

#[tokio::test]
async fn test_dallas_stand_in_is_smallest_texas_county() {
    let dir = TempDir::new().unwrap();
    let config = write_sources(dir.path());

    let (state, _) = load(&config).await;

    let dallas = state.view.feature("4819000").unwrap();
    assert_eq!(dallas.placement.county_id().unwrap().as_str(), "48113");
    assert!(dallas.placement.is_approximate());
}

#[tokio::test]
async fn test_filter_and_options_recompute_view() {
    let dir = TempDir::new().unwrap();
    let config = write_sources(dir.path());
    let (state, _) = load(&config).await;

    let cities = RecordFilter::new().with_classes([EntityClass::City]);
    let polygon_engine = JoinEngine::new(JoinOptions {
        use_coordinates: false,
        degraded_shape: DegradedShape::Polygon,
    });

    let view = state.view_for(&cities, &polygon_engine, &NoopSink);

    assert_eq!(view.stats.identifiers, 4);
    assert_eq!(view.stats.coordinates, 0);
    assert_eq!(view.stats.degraded, 3);
    assert!(matches!(
        view.feature("4835000").unwrap().placement,
        Placement::DegradedPolygon { .. }
    ));
    // Original state is untouched
    assert_eq!(state.view.stats.identifiers, 8);
}

#[tokio::test]
async fn test_diagnostics_are_built_with_the_load() {
    let dir = TempDir::new().unwrap();
    let config = write_sources(dir.path());

    let (state, _) = load(&config).await;

    assert_eq!(state.diagnostics.total, 8);
    assert_eq!(state.diagnostics.class_count(EntityClass::Unified), 2);
    assert_eq!(state.diagnostics.class_count(EntityClass::County), 2);
    assert_eq!(state.diagnostics.class_count(EntityClass::City), 4);
    assert!(state.diagnostics.name_collisions.is_empty());
}

#[tokio::test]
async fn test_rendered_file_matches_view() {
    let dir = TempDir::new().unwrap();
    let config = write_sources(dir.path());
    let (state, _) = load(&config).await;

    write_geojson(&state.view, &config.output_path).unwrap();

    let text = std::fs::read_to_string(&config.output_path).unwrap();
    let written: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(written["type"], "FeatureCollection");
    assert_eq!(written["features"].as_array().unwrap().len(), 7);
    assert_eq!(written["hasData"].as_array().unwrap().len(), 7);
    assert_eq!(written["dropped"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_unreadable_boundaries_leave_empty_map_with_advisory() {
    let dir = TempDir::new().unwrap();
    let config = write_sources(dir.path());
    std::fs::write(config.boundary_path.as_ref().unwrap(), "not geojson").unwrap();

    let (state, sink) = load(&config).await;

    assert_eq!(state.dataset.records.len(), 8);
    assert!(state.boundaries.is_none());
    assert!(state.view.features.is_empty());
    assert_eq!(state.advisories.len(), 1);
    assert_eq!(
        sink.count(|e| matches!(e, DiagnosticEvent::BoundaryFetchFailed { .. })),
        1
    );
}
