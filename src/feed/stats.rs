//! Ingestion statistics for a single feed load

use serde::Serialize;

/// Counts of rows read, accepted and dropped during ingestion
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestStats {
    /// Data rows encountered (header excluded)
    pub rows_read: usize,
    /// Rows that became records
    pub accepted: usize,
    /// Rows the CSV reader could not decode
    pub dropped_unreadable: usize,
    /// Rows missing an identifier or portal URL
    pub dropped_missing_fields: usize,
    /// Rows whose identifier could not be normalized
    pub dropped_identifier: usize,
    /// Accepted rows whose coordinates were ignored
    pub coordinates_rejected: usize,
    /// Whether the feed carried latitude/longitude columns
    pub coordinate_columns: bool,
}

impl IngestStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dropped(&self) -> usize {
        self.dropped_unreadable + self.dropped_missing_fields + self.dropped_identifier
    }

    /// Percentage of rows that became records
    pub fn acceptance_rate(&self) -> f64 {
        if self.rows_read == 0 {
            100.0
        } else {
            (self.accepted as f64 / self.rows_read as f64) * 100.0
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "Ingested {} of {} rows ({:.1}%) | dropped: {} unreadable, {} missing fields, {} bad identifiers | {} coordinates rejected",
            self.accepted,
            self.rows_read,
            self.acceptance_rate(),
            self.dropped_unreadable,
            self.dropped_missing_fields,
            self.dropped_identifier,
            self.coordinates_rejected
        )
    }
}
