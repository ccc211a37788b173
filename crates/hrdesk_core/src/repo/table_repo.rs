//! Generic repository bound to one table descriptor.
//!
//! # Responsibility
//! - Expose create/read/update/delete/count over dynamic records.
//! - Check records against the descriptor before any statement is built.
//!
//! # Invariants
//! - `update`/`delete` return affected counts; zero is not an error.
//! - Reads are ordered by primary key so results are deterministic.
//! - Rows leaving the repository are re-typed via the descriptor.

use crate::engine;
use crate::error::{DataError, DataResult};
use crate::model::descriptor::TableDescriptor;
use crate::model::predicate::Predicate;
use crate::model::record::Record;
use crate::model::value::Value;
use crate::query::{build_count, build_delete, build_insert, build_select_ordered, build_update};
use crate::store::StoreHandle;

/// Repository for one table, with the store passed on every call.
#[derive(Debug, Clone, Copy)]
pub struct TableRepository<'d> {
    descriptor: &'d TableDescriptor,
}

impl<'d> TableRepository<'d> {
    pub fn new(descriptor: &'d TableDescriptor) -> Self {
        Self { descriptor }
    }

    pub fn descriptor(&self) -> &'d TableDescriptor {
        self.descriptor
    }

    /// Inserts one record and returns its primary key columns.
    ///
    /// An auto-increment key may be omitted; the generated id is returned.
    /// Every other key column must be supplied.
    pub fn create<S>(&self, store: &S, record: &Record) -> DataResult<Record>
    where
        S: StoreHandle + ?Sized,
    {
        let record = self.descriptor.conform(record.clone())?;
        let auto_key = self.descriptor.auto_increment_key();
        for key in self.descriptor.primary_key() {
            let supplied = record.get(key.as_str()).is_some_and(|value| !value.is_null());
            if !supplied && auto_key != Some(key) {
                return Err(DataError::InvalidRecord(format!(
                    "primary key column `{}.{key}` must be supplied",
                    self.descriptor.name()
                )));
            }
        }

        let statement = build_insert(self.descriptor.name(), &record)?;
        let executed = engine::execute(store, &statement)?;

        let mut key = Record::new();
        for column in self.descriptor.primary_key() {
            match record.get(column.as_str()) {
                Some(value) if !value.is_null() => key.set(column.as_str(), value.clone()),
                _ => {
                    let generated = executed.last_insert_id.ok_or_else(|| {
                        DataError::InvalidRecord(format!(
                            "store reported no generated key for `{}.{column}`; supply it explicitly",
                            self.descriptor.name()
                        ))
                    })?;
                    key.set(column.as_str(), generated);
                }
            }
        }
        Ok(key)
    }

    pub fn read_all<S>(&self, store: &S) -> DataResult<Vec<Record>>
    where
        S: StoreHandle + ?Sized,
    {
        self.select(store, None)
    }

    pub fn read_where<S>(&self, store: &S, predicate: &Predicate) -> DataResult<Vec<Record>>
    where
        S: StoreHandle + ?Sized,
    {
        self.select(store, Some(predicate))
    }

    /// Loads the single row whose primary key matches `key`.
    pub fn find_by_key<S>(&self, store: &S, key: &Record) -> DataResult<Option<Record>>
    where
        S: StoreHandle + ?Sized,
    {
        let predicate = self.key_predicate(key)?;
        Ok(self.read_where(store, &predicate)?.into_iter().next())
    }

    /// Applies `patch` to rows matching `predicate`.
    ///
    /// `None` is rejected as an unbounded mutation; pass
    /// `Predicate::AllRows` to touch every row.
    pub fn update<S>(
        &self,
        store: &S,
        patch: &Record,
        predicate: Option<&Predicate>,
    ) -> DataResult<usize>
    where
        S: StoreHandle + ?Sized,
    {
        let patch = self.descriptor.conform(patch.clone())?;
        let statement = build_update(self.descriptor.name(), &patch, predicate)?;
        Ok(engine::execute(store, &statement)?.rows_affected)
    }

    pub fn delete<S>(&self, store: &S, predicate: Option<&Predicate>) -> DataResult<usize>
    where
        S: StoreHandle + ?Sized,
    {
        let statement = build_delete(self.descriptor.name(), predicate)?;
        Ok(engine::execute(store, &statement)?.rows_affected)
    }

    pub fn count<S>(&self, store: &S, predicate: Option<&Predicate>) -> DataResult<u64>
    where
        S: StoreHandle + ?Sized,
    {
        let statement = build_count(self.descriptor.name(), predicate);
        let rows = engine::query(store, &statement)?;
        rows.first()
            .and_then(|row| row.get("count"))
            .and_then(Value::as_integer)
            .and_then(|count| u64::try_from(count).ok())
            .ok_or_else(|| {
                DataError::InvalidStatement(format!(
                    "count on `{}` returned no integer",
                    self.descriptor.name()
                ))
            })
    }

    /// Equality predicate over every primary key column of `key`.
    pub fn key_predicate(&self, key: &Record) -> DataResult<Predicate> {
        let mut matched = Record::new();
        for column in self.descriptor.primary_key() {
            let value = key
                .get(column.as_str())
                .filter(|value| !value.is_null())
                .ok_or_else(|| {
                    DataError::InvalidRecord(format!(
                        "key for `{}` is missing `{column}`",
                        self.descriptor.name()
                    ))
                })?;
            matched.set(column.as_str(), value.clone());
        }
        Ok(Predicate::matching(&matched))
    }

    fn select<S>(&self, store: &S, predicate: Option<&Predicate>) -> DataResult<Vec<Record>>
    where
        S: StoreHandle + ?Sized,
    {
        let statement = build_select_ordered(
            self.descriptor.name(),
            predicate,
            None,
            self.descriptor.primary_key(),
        );
        let rows = engine::query(store, &statement)?;
        Ok(rows
            .into_iter()
            .map(|row| self.descriptor.decode_row(row))
            .collect())
    }
}
