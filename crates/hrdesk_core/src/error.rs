//! Normalized error taxonomy for the data-access core.
//!
//! # Responsibility
//! - Give every caller-visible failure one engine-independent shape.
//! - Carry enough context to diagnose seed failures without store access.
//!
//! # Invariants
//! - Raw store errors never escape; adapters classify them first.
//! - Builder errors (`InvalidRecord`, `UnboundedMutation`) never reach a store.

use crate::model::record::Record;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type DataResult<T> = Result<T, DataError>;

/// Constraint family reported by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    Unique,
    PrimaryKey,
    ForeignKey,
    NotNull,
    Check,
    Other,
}

impl ConstraintKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unique => "unique",
            Self::PrimaryKey => "primary_key",
            Self::ForeignKey => "foreign_key",
            Self::NotNull => "not_null",
            Self::Check => "check",
            Self::Other => "other",
        }
    }
}

/// Error returned by every core operation.
#[derive(Debug)]
pub enum DataError {
    /// Record is empty, names unknown columns, or carries mistyped values.
    InvalidRecord(String),
    /// Update/delete issued without a predicate.
    UnboundedMutation { table: String },
    /// Statement rejected by the store as malformed.
    InvalidStatement(String),
    /// Store refused the write because a constraint failed.
    ConstraintViolation {
        kind: ConstraintKind,
        column: Option<String>,
        message: String,
    },
    /// Store could not be reached or is not usable right now.
    StoreUnavailable(String),
    /// A transaction scope is already active on this handle: a second scope
    /// was requested, or another thread tried to write through it.
    NestedTransaction,
    /// Table name has no registered descriptor.
    UnknownTable(String),
    /// One seed unit failed and was rolled back.
    ///
    /// `index`/`record` name the first offending record; they are `None`
    /// when the unit failed as a whole (unknown table, bad key, begin or
    /// commit failure).
    SeedUnitFailure {
        unit: String,
        index: Option<usize>,
        record: Option<Record>,
        cause: Box<DataError>,
    },
}

impl DataError {
    /// Returns the seed failure root cause, or `self` for other variants.
    pub fn root_cause(&self) -> &DataError {
        match self {
            Self::SeedUnitFailure { cause, .. } => cause.root_cause(),
            other => other,
        }
    }

    /// Stable short code used in log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidRecord(_) => "invalid_record",
            Self::UnboundedMutation { .. } => "unbounded_mutation",
            Self::InvalidStatement(_) => "invalid_statement",
            Self::ConstraintViolation { .. } => "constraint_violation",
            Self::StoreUnavailable(_) => "store_unavailable",
            Self::NestedTransaction => "nested_transaction",
            Self::UnknownTable(_) => "unknown_table",
            Self::SeedUnitFailure { .. } => "seed_unit_failure",
        }
    }
}

impl Display for DataError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRecord(message) => write!(f, "invalid record: {message}"),
            Self::UnboundedMutation { table } => write!(
                f,
                "refusing unbounded mutation on `{table}`; pass an explicit all-rows predicate"
            ),
            Self::InvalidStatement(message) => write!(f, "invalid statement: {message}"),
            Self::ConstraintViolation {
                kind,
                column,
                message,
            } => match column {
                Some(column) => write!(
                    f,
                    "{} constraint violated on `{column}`: {message}",
                    kind.as_str()
                ),
                None => write!(f, "{} constraint violated: {message}", kind.as_str()),
            },
            Self::StoreUnavailable(message) => write!(f, "store unavailable: {message}"),
            Self::NestedTransaction => {
                write!(f, "a transaction is already active on this store handle")
            }
            Self::UnknownTable(table) => write!(f, "unknown table `{table}`"),
            Self::SeedUnitFailure {
                unit, index, cause, ..
            } => match index {
                Some(index) => write!(f, "seed unit `{unit}` failed at record {index}: {cause}"),
                None => write!(f, "seed unit `{unit}` failed: {cause}"),
            },
        }
    }
}

impl Error for DataError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::SeedUnitFailure { cause, .. } => Some(cause.as_ref()),
            _ => None,
        }
    }
}
