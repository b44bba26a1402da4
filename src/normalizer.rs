//! Identifier normalization.
//!
//! Turns the raw identifier cell of a feed row into a [`CanonicalId`]:
//! quote artifacts and whitespace are stripped, then the value is
//! zero-padded to 5 digits for pure counties or 7 digits for everything
//! else. Normalize exactly once per raw value; padding an already
//! canonical code again under a different declared type changes it.

use crate::constants::QUOTE_ARTIFACTS;
use crate::events::{DiagnosticEvent, EventSink, NoopSink, RowDropReason};
use crate::models::{CanonicalId, EntityKind, IdWidth};
use thiserror::Error;

/// Why a raw identifier could not be normalized
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentifierError {
    #[error("identifier is empty after cleaning")]
    Empty,

    #[error("identifier '{cleaned}' is wider than {width}")]
    TooWide { cleaned: String, width: IdWidth },
}

impl From<IdentifierError> for RowDropReason {
    fn from(error: IdentifierError) -> Self {
        match error {
            IdentifierError::Empty => RowDropReason::EmptyIdentifier,
            IdentifierError::TooWide { cleaned, width } => {
                RowDropReason::IdentifierTooWide { cleaned, width }
            }
        }
    }
}

/// Strip surrounding whitespace and spreadsheet quoting artifacts
pub fn clean_identifier(raw: &str) -> &str {
    raw.trim()
        .trim_start_matches(QUOTE_ARTIFACTS)
        .trim_end_matches(QUOTE_ARTIFACTS)
        .trim()
}

/// Normalize without diagnostics
pub fn normalize(raw: &str, kinds: &[EntityKind]) -> Result<CanonicalId, IdentifierError> {
    normalize_with(raw, kinds, &NoopSink)
}

/// Normalize a raw identifier for a record with the given declared kinds.
///
/// Values containing non-digits are still padded (there is no range
/// validation) but reported as [`DiagnosticEvent::SuspiciousIdentifier`].
pub fn normalize_with(
    raw: &str,
    kinds: &[EntityKind],
    sink: &dyn EventSink,
) -> Result<CanonicalId, IdentifierError> {
    let cleaned = clean_identifier(raw);
    if cleaned.is_empty() {
        return Err(IdentifierError::Empty);
    }

    let width = IdWidth::for_kinds(kinds);
    let digits = width.digits();
    if cleaned.chars().count() > digits {
        return Err(IdentifierError::TooWide {
            cleaned: cleaned.to_string(),
            width,
        });
    }

    let padded = format!("{:0>digits$}", cleaned);
    let canonical = CanonicalId::new(padded).ok_or_else(|| IdentifierError::TooWide {
        cleaned: cleaned.to_string(),
        width,
    })?;

    if !cleaned.chars().all(|c| c.is_ascii_digit()) {
        sink.record(DiagnosticEvent::SuspiciousIdentifier {
            raw: raw.to_string(),
            canonical: canonical.clone(),
        });
    }

    Ok(canonical)
}
