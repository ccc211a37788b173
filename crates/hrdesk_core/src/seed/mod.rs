//! Baseline data seeding.
//!
//! # Responsibility
//! - Model seed units: one table's ordered records plus a uniqueness key.
//! - Load them idempotently through repositories and per-unit transactions.
//!
//! # Invariants
//! - Unit order is dependency order, as declared by the caller.
//! - Existence is checked explicitly before insert; no store-specific
//!   conditional-insert shorthand is used.

pub mod loader;
pub mod source;

use crate::model::record::Record;
use serde::{Deserialize, Serialize};

pub use loader::{SeedLoader, SeedReport, UnitReport};
pub use source::{baseline_units, parse_seed_units, SeedSourceError};

/// One table's baseline dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedUnit {
    pub table: String,
    /// Columns identifying a record for the existence check.
    #[serde(rename = "key")]
    pub unique_key: Vec<String>,
    #[serde(default)]
    pub records: Vec<Record>,
}

impl SeedUnit {
    pub fn new<I, S>(table: &str, unique_key: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            table: table.to_string(),
            unique_key: unique_key.into_iter().map(Into::into).collect(),
            records: Vec::new(),
        }
    }

    pub fn with_record(mut self, record: Record) -> Self {
        self.records.push(record);
        self
    }

    pub fn with_records(mut self, records: impl IntoIterator<Item = Record>) -> Self {
        self.records.extend(records);
        self
    }
}
