//! Placement statistics for one join pass

use crate::models::PlacementMethod;
use serde::Serialize;

/// Counts of identifiers placed by each rule and dropped
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JoinStats {
    /// Distinct canonical identifiers in the filtered input
    pub identifiers: usize,
    pub boundary: usize,
    pub unified_boundary: usize,
    pub coordinates: usize,
    pub degraded: usize,
    pub dropped: usize,
    /// Counties used as the approximate location of more than one place
    pub degraded_collisions: usize,
}

impl JoinStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_placement(&mut self, method: PlacementMethod) {
        match method {
            PlacementMethod::Boundary => self.boundary += 1,
            PlacementMethod::UnifiedBoundary => self.unified_boundary += 1,
            PlacementMethod::Coordinates => self.coordinates += 1,
            PlacementMethod::Degraded => self.degraded += 1,
        }
    }

    pub fn placed(&self) -> usize {
        self.boundary + self.unified_boundary + self.coordinates + self.degraded
    }

    /// Every identifier is either placed or explicitly dropped
    pub fn is_balanced(&self) -> bool {
        self.identifiers == self.placed() + self.dropped
    }

    /// Percentage of placed identifiers that are approximate
    pub fn approximate_rate(&self) -> f64 {
        let placed = self.placed();
        if placed == 0 {
            0.0
        } else {
            (self.degraded as f64 / placed as f64) * 100.0
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "Join: {} identifiers -> {} placed ({} boundary, {} unified, {} coordinates, {} approximate) | {} dropped | {} shared approximate locations",
            self.identifiers,
            self.placed(),
            self.boundary,
            self.unified_boundary,
            self.coordinates,
            self.degraded,
            self.dropped,
            self.degraded_collisions
        )
    }
}
