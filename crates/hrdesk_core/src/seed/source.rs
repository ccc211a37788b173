//! Seed data source: JSON seed files and the embedded baseline.
//!
//! The loader only consumes parsed units; this module owns the file format.

use crate::seed::SeedUnit;
use std::error::Error;
use std::fmt::{Display, Formatter};

const BASELINE_JSON: &str = include_str!("baseline.json");

/// Seed file parsing errors.
#[derive(Debug)]
pub enum SeedSourceError {
    Json(serde_json::Error),
    InvalidUnit { position: usize, reason: String },
}

impl Display for SeedSourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "invalid seed json: {err}"),
            Self::InvalidUnit { position, reason } => {
                write!(f, "invalid seed unit at position {position}: {reason}")
            }
        }
    }
}

impl Error for SeedSourceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::InvalidUnit { .. } => None,
        }
    }
}

impl From<serde_json::Error> for SeedSourceError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Parses a JSON array of `{ "table", "key", "records" }` objects.
///
/// Record columns keep their document order.
pub fn parse_seed_units(json: &str) -> Result<Vec<SeedUnit>, SeedSourceError> {
    let units: Vec<SeedUnit> = serde_json::from_str(json)?;
    for (position, unit) in units.iter().enumerate() {
        if unit.table.trim().is_empty() {
            return Err(SeedSourceError::InvalidUnit {
                position,
                reason: "table must not be blank".to_string(),
            });
        }
        if unit.unique_key.is_empty() {
            return Err(SeedSourceError::InvalidUnit {
                position,
                reason: format!("unit `{}` declares no key columns", unit.table),
            });
        }
    }
    Ok(units)
}

/// Baseline roles and departments shipped with the crate.
pub fn baseline_units() -> Result<Vec<SeedUnit>, SeedSourceError> {
    parse_seed_units(BASELINE_JSON)
}
