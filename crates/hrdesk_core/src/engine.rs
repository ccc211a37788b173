//! Execution engine: runs built statements against an open store handle.
//!
//! # Responsibility
//! - Execute writes and queries without retrying.
//! - Map store-specific failures into [`DataError`].
//!
//! # Invariants
//! - Exactly one log entry per call, carrying table, op and outcome.
//! - Raw store errors never leave this module.
//! - Writes from a thread other than the open scope's owner are refused
//!   with `NestedTransaction` before reaching the store.

use crate::error::{DataError, DataResult};
use crate::model::record::Record;
use crate::query::Statement;
use crate::store::{Executed, FailureClass, StoreFailure, StoreHandle};
use log::{debug, warn};
use std::time::Instant;

/// Runs an insert/update/delete statement.
pub fn execute<S>(store: &S, statement: &Statement) -> DataResult<Executed>
where
    S: StoreHandle + ?Sized,
{
    let started_at = Instant::now();
    if !store.scope_slot().admits_current_thread() {
        warn!(
            "event=db_execute module=engine status=error table={} op={} duration_ms={} error_code=nested_transaction reason=scope_owned_by_other_thread",
            statement.table,
            statement.kind,
            started_at.elapsed().as_millis()
        );
        return Err(DataError::NestedTransaction);
    }
    match store.execute(&statement.sql, &statement.params) {
        Ok(executed) => {
            debug!(
                "event=db_execute module=engine status=ok table={} op={} rows_affected={} duration_ms={}",
                statement.table,
                statement.kind,
                executed.rows_affected,
                started_at.elapsed().as_millis()
            );
            Ok(executed)
        }
        Err(err) => {
            let normalized = normalize(&err);
            warn!(
                "event=db_execute module=engine status=error table={} op={} duration_ms={} error_code={} error={}",
                statement.table,
                statement.kind,
                started_at.elapsed().as_millis(),
                normalized.code(),
                err
            );
            Err(normalized)
        }
    }
}

/// Runs a row-returning statement.
pub fn query<S>(store: &S, statement: &Statement) -> DataResult<Vec<Record>>
where
    S: StoreHandle + ?Sized,
{
    let started_at = Instant::now();
    match store.query(&statement.sql, &statement.params) {
        Ok(rows) => {
            debug!(
                "event=db_query module=engine status=ok table={} op={} rows={} duration_ms={}",
                statement.table,
                statement.kind,
                rows.len(),
                started_at.elapsed().as_millis()
            );
            Ok(rows)
        }
        Err(err) => {
            let normalized = normalize(&err);
            warn!(
                "event=db_query module=engine status=error table={} op={} duration_ms={} error_code={} error={}",
                statement.table,
                statement.kind,
                started_at.elapsed().as_millis(),
                normalized.code(),
                err
            );
            Err(normalized)
        }
    }
}

/// Converts a classified store failure into the normalized taxonomy.
pub fn normalize<E: StoreFailure>(err: &E) -> DataError {
    let message = err.to_string();
    match err.classify() {
        FailureClass::Constraint { kind, column } => DataError::ConstraintViolation {
            kind,
            column,
            message,
        },
        FailureClass::Unavailable => DataError::StoreUnavailable(message),
        FailureClass::Malformed => DataError::InvalidStatement(message),
    }
}
