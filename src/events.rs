//! Diagnostics port for the ingestion and join path.
//!
//! Components that drop rows or features, or fall back to approximate
//! placement, report it here instead of writing to a global log. The
//! default sink does nothing; the CLI installs [`TracingSink`] and tests
//! capture events with [`CollectingSink`].

use crate::models::{CanonicalId, IdWidth};
use std::sync::Mutex;
use tracing::{debug, info, warn};

/// Why a feed row was discarded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowDropReason {
    /// CSV record could not be read
    Unreadable(String),
    MissingIdentifier,
    MissingPortalUrl,
    /// Identifier was empty once quote artifacts were stripped
    EmptyIdentifier,
    /// Identifier longer than its target width
    IdentifierTooWide { cleaned: String, width: IdWidth },
}

impl std::fmt::Display for RowDropReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowDropReason::Unreadable(reason) => write!(f, "unreadable row: {}", reason),
            RowDropReason::MissingIdentifier => f.write_str("missing identifier"),
            RowDropReason::MissingPortalUrl => f.write_str("missing portal URL"),
            RowDropReason::EmptyIdentifier => f.write_str("identifier empty after cleaning"),
            RowDropReason::IdentifierTooWide { cleaned, width } => {
                write!(f, "identifier '{}' exceeds {} width", cleaned, width)
            }
        }
    }
}

/// Something an operator may want to know about a load
#[derive(Debug, Clone, PartialEq)]
pub enum DiagnosticEvent {
    RowDropped {
        line: u64,
        name: String,
        reason: RowDropReason,
    },
    /// Identifier padded as-is even though it contains non-digits
    SuspiciousIdentifier { raw: String, canonical: CanonicalId },
    CoordinatesRejected {
        name: String,
        latitude: String,
        longitude: String,
    },
    BoundarySkipped { index: usize, reason: String },
    DuplicateBoundary { county_id: CanonicalId },
    DegradedPlacement {
        identifier: CanonicalId,
        state_code: String,
        county_id: CanonicalId,
    },
    /// Several place identifiers share one degraded location
    DegradedCollision {
        county_id: CanonicalId,
        identifiers: Vec<CanonicalId>,
    },
    FeatureDropped {
        identifier: CanonicalId,
        name: String,
        state_code: String,
    },
    FeedFetchFailed { reason: String },
    BoundaryFetchFailed { reason: String },
}

/// Receiver for diagnostic events
pub trait EventSink: Send + Sync {
    fn record(&self, event: DiagnosticEvent);
}

/// Discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl EventSink for NoopSink {
    fn record(&self, _event: DiagnosticEvent) {}
}

/// Logs every event through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn record(&self, event: DiagnosticEvent) {
        match event {
            DiagnosticEvent::RowDropped { line, name, reason } => {
                warn!("Dropped feed row {} ({}): {}", line, display_name(&name), reason);
            }
            DiagnosticEvent::SuspiciousIdentifier { raw, canonical } => {
                warn!(
                    "Identifier '{}' contains non-digit characters, kept as '{}'",
                    raw, canonical
                );
            }
            DiagnosticEvent::CoordinatesRejected {
                name,
                latitude,
                longitude,
            } => {
                warn!(
                    "Ignoring coordinates ({}, {}) for {}",
                    latitude,
                    longitude,
                    display_name(&name)
                );
            }
            DiagnosticEvent::BoundarySkipped { index, reason } => {
                debug!("Skipped boundary feature #{}: {}", index, reason);
            }
            DiagnosticEvent::DuplicateBoundary { county_id } => {
                warn!("Duplicate boundary for county {}, keeping first", county_id);
            }
            DiagnosticEvent::DegradedPlacement {
                identifier,
                state_code,
                county_id,
            } => {
                debug!(
                    "Approximate placement for {} using county {} (state {})",
                    identifier, county_id, state_code
                );
            }
            DiagnosticEvent::DegradedCollision {
                county_id,
                identifiers,
            } => {
                info!(
                    "{} places share approximate location of county {}: {}",
                    identifiers.len(),
                    county_id,
                    join_ids(&identifiers)
                );
            }
            DiagnosticEvent::FeatureDropped {
                identifier,
                name,
                state_code,
            } => {
                warn!(
                    "No geographic match for {} ({}), state {}",
                    identifier,
                    display_name(&name),
                    state_code
                );
            }
            DiagnosticEvent::FeedFetchFailed { reason } => {
                warn!("Feed fetch failed, keeping previous data: {}", reason);
            }
            DiagnosticEvent::BoundaryFetchFailed { reason } => {
                warn!("Boundary fetch failed: {}", reason);
            }
        }
    }
}

/// Keeps every event in memory
#[derive(Debug, Default)]
pub struct CollectingSink {
    events: Mutex<Vec<DiagnosticEvent>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events recorded so far
    pub fn events(&self) -> Vec<DiagnosticEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.events.lock().map(|events| events.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Count events matching a predicate
    pub fn count(&self, predicate: impl Fn(&DiagnosticEvent) -> bool) -> usize {
        self.events
            .lock()
            .map(|events| events.iter().filter(|event| predicate(event)).count())
            .unwrap_or(0)
    }
}

impl EventSink for CollectingSink {
    fn record(&self, event: DiagnosticEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

fn display_name(name: &str) -> &str {
    if name.trim().is_empty() {
        "<unnamed>"
    } else {
        name
    }
}

fn join_ids(ids: &[CanonicalId]) -> String {
    ids.iter()
        .map(CanonicalId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
