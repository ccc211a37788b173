//! SQLite adapter for the store handle seam.
//!
//! # Responsibility
//! - Bind core values positionally and read rows back as records.
//! - Classify `rusqlite` failures into engine-neutral classes.
//!
//! # Invariants
//! - The connection mutex is held for one store call only, never across a
//!   transaction scope.
//! - Statements go through the connection's prepared-statement cache.

use super::{Executed, FailureClass, ScopeSlot, StoreFailure, StoreHandle};
use crate::db::{disable_double_quoted_strings, open_db, open_db_in_memory, DbResult};
use crate::error::ConstraintKind;
use crate::model::record::Record;
use crate::model::value::Value;
use rusqlite::types::{ToSqlOutput, Type, Value as SqlValue, ValueRef};
use rusqlite::{ffi, params_from_iter, Connection, ErrorCode, ToSql};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Error raised by [`SqliteStore`].
#[derive(Debug)]
pub enum SqliteStoreError {
    Sqlite(rusqlite::Error),
    /// A previous caller panicked while holding the connection.
    Poisoned,
}

impl Display for SqliteStoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::Poisoned => write!(f, "sqlite connection lock poisoned"),
        }
    }
}

impl Error for SqliteStoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::Poisoned => None,
        }
    }
}

impl From<rusqlite::Error> for SqliteStoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl StoreFailure for SqliteStoreError {
    fn classify(&self) -> FailureClass {
        match self {
            Self::Poisoned => FailureClass::Unavailable,
            Self::Sqlite(err) => classify_sqlite(err),
        }
    }
}

/// Store handle over one SQLite connection.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    slot: ScopeSlot,
}

impl SqliteStore {
    /// Wraps a connection, disabling double-quoted string literals on it.
    pub fn new(conn: Connection) -> rusqlite::Result<Self> {
        disable_double_quoted_strings(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            slot: ScopeSlot::new(),
        })
    }

    /// Opens (and migrates) a database file.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        Ok(Self::new(open_db(path)?)?)
    }

    /// Opens (and migrates) a private in-memory database.
    pub fn open_in_memory() -> DbResult<Self> {
        Ok(Self::new(open_db_in_memory()?)?)
    }

    /// Runs `f` against the raw connection.
    pub fn with_connection<T>(
        &self,
        f: impl FnOnce(&Connection) -> rusqlite::Result<T>,
    ) -> Result<T, SqliteStoreError> {
        let conn = self.lock()?;
        Ok(f(&conn)?)
    }

    /// Closes the connection, surfacing any close failure.
    pub fn close(self) -> Result<(), SqliteStoreError> {
        let conn = self
            .conn
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        conn.close().map_err(|(_, err)| SqliteStoreError::Sqlite(err))
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, SqliteStoreError> {
        self.conn.lock().map_err(|_| SqliteStoreError::Poisoned)
    }
}

impl StoreHandle for SqliteStore {
    type Error = SqliteStoreError;

    fn execute(&self, sql: &str, params: &[Value]) -> Result<Executed, Self::Error> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare_cached(sql)?;
        let rows_affected = stmt.execute(params_from_iter(params.iter()))?;
        let last_insert_id = if rows_affected > 0 && is_insert(sql) {
            Some(conn.last_insert_rowid())
        } else {
            None
        };
        Ok(Executed {
            rows_affected,
            last_insert_id,
        })
    }

    fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Record>, Self::Error> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare_cached(sql)?;
        let columns: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect();

        let mut rows = stmt.query(params_from_iter(params.iter()))?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            let mut record = Record::new();
            for (index, name) in columns.iter().enumerate() {
                let value = match row.get_ref(index)? {
                    ValueRef::Null => Value::Null,
                    ValueRef::Integer(value) => Value::Integer(value),
                    ValueRef::Real(value) => Value::Real(value),
                    ValueRef::Text(bytes) => Value::Text(String::from_utf8_lossy(bytes).into_owned()),
                    ValueRef::Blob(_) => {
                        return Err(rusqlite::Error::InvalidColumnType(
                            index,
                            name.clone(),
                            Type::Blob,
                        )
                        .into());
                    }
                };
                record.set(name.as_str(), value);
            }
            records.push(record);
        }
        Ok(records)
    }

    fn begin_transaction(&self) -> Result<(), Self::Error> {
        self.lock()?.execute_batch("BEGIN IMMEDIATE;")?;
        Ok(())
    }

    fn commit(&self) -> Result<(), Self::Error> {
        self.lock()?.execute_batch("COMMIT;")?;
        Ok(())
    }

    fn rollback(&self) -> Result<(), Self::Error> {
        self.lock()?.execute_batch("ROLLBACK;")?;
        Ok(())
    }

    fn scope_slot(&self) -> &ScopeSlot {
        &self.slot
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Owned(SqlValue::Null),
            Value::Integer(value) => ToSqlOutput::Owned(SqlValue::Integer(*value)),
            Value::Real(value) => ToSqlOutput::Owned(SqlValue::Real(*value)),
            Value::Text(value) | Value::Date(value) => {
                ToSqlOutput::Borrowed(ValueRef::Text(value.as_bytes()))
            }
        })
    }
}

fn is_insert(sql: &str) -> bool {
    sql.trim_start()
        .get(..6)
        .is_some_and(|head| head.eq_ignore_ascii_case("insert"))
}

fn classify_sqlite(err: &rusqlite::Error) -> FailureClass {
    let rusqlite::Error::SqliteFailure(failure, message) = err else {
        return FailureClass::Malformed;
    };
    match failure.code {
        ErrorCode::ConstraintViolation => FailureClass::Constraint {
            kind: constraint_kind(failure.extended_code),
            column: message.as_deref().and_then(constraint_column),
        },
        ErrorCode::DatabaseBusy
        | ErrorCode::DatabaseLocked
        | ErrorCode::CannotOpen
        | ErrorCode::SystemIoFailure
        | ErrorCode::DatabaseCorrupt
        | ErrorCode::NotADatabase
        | ErrorCode::DiskFull
        | ErrorCode::ReadOnly
        | ErrorCode::OutOfMemory
        | ErrorCode::PermissionDenied
        | ErrorCode::FileLockingProtocolFailed => FailureClass::Unavailable,
        _ => FailureClass::Malformed,
    }
}

fn constraint_kind(extended_code: i32) -> ConstraintKind {
    match extended_code {
        ffi::SQLITE_CONSTRAINT_UNIQUE => ConstraintKind::Unique,
        ffi::SQLITE_CONSTRAINT_PRIMARYKEY => ConstraintKind::PrimaryKey,
        ffi::SQLITE_CONSTRAINT_FOREIGNKEY => ConstraintKind::ForeignKey,
        ffi::SQLITE_CONSTRAINT_NOTNULL => ConstraintKind::NotNull,
        ffi::SQLITE_CONSTRAINT_CHECK => ConstraintKind::Check,
        _ => ConstraintKind::Other,
    }
}

/// Extracts the first column from messages like
/// `UNIQUE constraint failed: roles.name`.
fn constraint_column(message: &str) -> Option<String> {
    let (_, detail) = message.split_once(": ")?;
    let first = detail.split(',').next()?.trim();
    let column = first.rsplit('.').next()?.trim();
    let is_identifier = !column.is_empty()
        && column
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    is_identifier.then(|| column.to_string())
}

#[cfg(test)]
mod tests {
    use super::{constraint_column, is_insert, SqliteStore, SqliteStoreError};
    use crate::engine::normalize;
    use crate::error::DataError;
    use crate::store::{FailureClass, StoreFailure, StoreHandle};
    use std::panic::{catch_unwind, AssertUnwindSafe};

    #[test]
    fn poisoned_connection_is_unavailable() {
        let store = SqliteStore::open_in_memory().unwrap();
        let panicked = catch_unwind(AssertUnwindSafe(|| {
            let _ = store.with_connection(|_| -> rusqlite::Result<()> {
                panic!("writer crashed while holding the connection")
            });
        }));
        assert!(panicked.is_err());

        let err = store.query("SELECT 1", &[]).unwrap_err();
        assert!(matches!(err, SqliteStoreError::Poisoned));
        assert_eq!(err.classify(), FailureClass::Unavailable);
        assert!(matches!(normalize(&err), DataError::StoreUnavailable(_)));
    }

    #[test]
    fn constraint_column_reads_first_qualified_column() {
        assert_eq!(
            constraint_column("UNIQUE constraint failed: roles.name"),
            Some("name".to_string())
        );
        assert_eq!(
            constraint_column("UNIQUE constraint failed: attendance.employee_id, attendance.date"),
            Some("employee_id".to_string())
        );
        assert_eq!(constraint_column("FOREIGN KEY constraint failed"), None);
        assert_eq!(
            constraint_column("CHECK constraint failed: status IN ('a')"),
            None
        );
    }

    #[test]
    fn is_insert_ignores_case_and_leading_space() {
        assert!(is_insert("  insert into t values (?)"));
        assert!(!is_insert("UPDATE t SET a = ?"));
        assert!(!is_insert("INS"));
    }
}
