//! GeoJSON rendering of a joined map view.
//!
//! One GeoJSON feature per placed identifier. Approximate placements carry
//! `"approximate": true` so the presentation layer can style them apart
//! from exact matches. The document also lists the placed identifiers
//! (`hasData`) and the dropped ones.

use crate::error::{MapError, Result};
use crate::join::MapView;
use crate::models::{JoinedFeature, JurisdictionRecord, Placement};
use serde_json::{Value, json};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// Build the FeatureCollection for a view
pub fn feature_collection(view: &MapView) -> Value {
    let features: Vec<Value> = view.features.iter().map(feature_json).collect();
    let dropped: Vec<Value> = view
        .dropped
        .iter()
        .map(|dropped| {
            json!({
                "identifier": dropped.identifier,
                "name": dropped.name,
                "stateCode": dropped.state_code,
            })
        })
        .collect();

    json!({
        "type": "FeatureCollection",
        "features": features,
        "hasData": view.has_data,
        "dropped": dropped,
        "stats": view.stats,
    })
}

fn feature_json(feature: &JoinedFeature) -> Value {
    let geometry = match &feature.placement {
        Placement::Boundary { geometry, .. }
        | Placement::UnifiedBoundary { geometry, .. }
        | Placement::DegradedPolygon { geometry, .. } => json!(geometry),
        Placement::Coordinates { point } | Placement::DegradedCentroid { point, .. } => json!({
            "type": "Point",
            "coordinates": point.position(),
        }),
    };

    let records: Vec<Value> = feature.source_records.iter().map(record_json).collect();

    json!({
        "type": "Feature",
        "id": feature.identifier,
        "geometry": geometry,
        "properties": {
            "identifier": feature.identifier,
            "displayName": feature.display_name,
            "placement": feature.placement.method(),
            "approximate": feature.placement.is_approximate(),
            "countyId": feature.placement.county_id(),
            "records": records,
        },
    })
}

fn record_json(record: &JurisdictionRecord) -> Value {
    json!({
        "name": record.name,
        "label": record.display_label,
        "class": record.entity_class(),
        "population": record.population_bucket,
        "portalUrl": record.portal_url,
        "notes": record.notes,
    })
}

/// Write the view to `path`, replacing any previous file atomically
pub fn write_geojson(view: &MapView, path: &Path) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let mut file = NamedTempFile::new_in(parent)?;
    serde_json::to_writer(&mut file, &feature_collection(view))?;
    file.write_all(b"\n")?;
    file.flush()?;
    file.persist(path).map_err(|e| MapError::Io(e.error))?;

    debug!(
        "Wrote {} features to {}",
        view.features.len(),
        path.display()
    );
    Ok(())
}
