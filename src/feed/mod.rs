//! Jurisdiction feed ingestion.
//!
//! Parses the tabular feed into [`JurisdictionRecord`]s. Each row goes
//! through the shape check, the classifier and the identifier normalizer;
//! rows that fail are dropped and reported through the diagnostics port,
//! never propagated as partially filled records.

pub mod columns;
pub mod row;
pub mod stats;

#[cfg(test)]
pub mod tests;

pub use columns::ColumnMapping;
pub use row::{FeedRow, RowCoordinates};
pub use stats::IngestStats;

use crate::classifier::Classifier;
use crate::error::{MapError, Result};
use crate::events::{DiagnosticEvent, EventSink, RowDropReason};
use crate::models::JurisdictionRecord;
use crate::normalizer::normalize_with;
use csv::StringRecord;
use tracing::debug;

/// Records produced by one feed load
#[derive(Debug, Clone)]
pub struct IngestResult {
    pub records: Vec<JurisdictionRecord>,
    pub stats: IngestStats,
}

/// Turns raw feed data into records
#[derive(Debug, Clone, Default)]
pub struct FeedIngestor {
    classifier: Classifier,
}

impl FeedIngestor {
    pub fn new(classifier: Classifier) -> Self {
        Self { classifier }
    }

    /// Parse CSV data with a header row.
    ///
    /// Fails only when the header itself is unusable; individual rows,
    /// including rows that are not valid UTF-8, are dropped and reported.
    pub fn ingest(&self, data: &[u8], sink: &dyn EventSink) -> Result<IngestResult> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(data);

        let headers = reader.headers()?.clone();
        if headers.is_empty() {
            return Err(MapError::invalid_feed("feed has no header row"));
        }
        let mapping = ColumnMapping::analyze(&headers)?;

        let mut stats = IngestStats {
            coordinate_columns: mapping.has_coordinates(),
            ..IngestStats::new()
        };
        let mut records = Vec::new();
        let mut record = StringRecord::new();

        loop {
            let line = reader.position().line();
            match reader.read_record(&mut record) {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => {
                    stats.rows_read += 1;
                    stats.dropped_unreadable += 1;
                    sink.record(DiagnosticEvent::RowDropped {
                        line: e.position().map(|p| p.line()).unwrap_or(line),
                        name: String::new(),
                        reason: RowDropReason::Unreadable(e.to_string()),
                    });
                    continue;
                }
            }

            // Blank lines are skipped by the reader; rows of empty cells are not
            if record.iter().all(|cell| cell.trim().is_empty()) {
                continue;
            }

            stats.rows_read += 1;
            let line = record.position().map(|p| p.line()).unwrap_or(line);
            let row = FeedRow::from_record(&record, &mapping, line);

            if let Some(built) = self.build_record(row, sink, &mut stats) {
                stats.accepted += 1;
                records.push(built);
            }
        }

        debug!("{}", stats.summary());
        Ok(IngestResult { records, stats })
    }

    /// Validate, classify and normalize one row
    fn build_record(
        &self,
        row: FeedRow,
        sink: &dyn EventSink,
        stats: &mut IngestStats,
    ) -> Option<JurisdictionRecord> {
        if let Err(reason) = row.validate() {
            stats.dropped_missing_fields += 1;
            sink.record(DiagnosticEvent::RowDropped {
                line: row.line,
                name: row.name,
                reason,
            });
            return None;
        }

        let classification = self.classifier.classify(&row.government_type, &row.notes);

        let identifier = match normalize_with(&row.identifier, &classification.entity_kinds, sink)
        {
            Ok(identifier) => identifier,
            Err(error) => {
                stats.dropped_identifier += 1;
                sink.record(DiagnosticEvent::RowDropped {
                    line: row.line,
                    name: row.name,
                    reason: error.into(),
                });
                return None;
            }
        };

        let location = match row.coordinates() {
            RowCoordinates::Absent => None,
            RowCoordinates::Valid(point) => Some(point),
            RowCoordinates::Rejected => {
                stats.coordinates_rejected += 1;
                sink.record(DiagnosticEvent::CoordinatesRejected {
                    name: row.name.clone(),
                    latitude: row.latitude.clone().unwrap_or_default(),
                    longitude: row.longitude.clone().unwrap_or_default(),
                });
                None
            }
        };

        Some(JurisdictionRecord {
            name: row.name,
            identifier_raw: row.identifier,
            identifier,
            entity_kinds: classification.entity_kinds,
            is_unified: classification.is_unified,
            display_label: classification.display_label,
            population_bucket: row.population_bucket,
            notes: row.notes,
            portal_url: row.portal_url,
            location,
        })
    }
}
