//! Typed repository for one [`Entity`] type.

use crate::error::{DataError, DataResult};
use crate::model::entity::Entity;
use crate::model::predicate::Predicate;
use crate::model::record::Record;
use crate::model::value::Value;
use crate::repo::table_repo::TableRepository;
use crate::store::StoreHandle;
use std::marker::PhantomData;

/// Typed wrapper over [`TableRepository`] bound to `E::descriptor()`.
pub struct Repository<E: Entity> {
    table: TableRepository<'static>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> Default for Repository<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> Repository<E> {
    pub fn new() -> Self {
        Self {
            table: TableRepository::new(E::descriptor()),
            _entity: PhantomData,
        }
    }

    pub fn table(&self) -> &TableRepository<'static> {
        &self.table
    }

    /// Persists `entity` and returns its primary key columns.
    pub fn create<S>(&self, store: &S, entity: &E) -> DataResult<Record>
    where
        S: StoreHandle + ?Sized,
    {
        self.table.create(store, &entity.to_record())
    }

    pub fn read_all<S>(&self, store: &S) -> DataResult<Vec<E>>
    where
        S: StoreHandle + ?Sized,
    {
        decode_all(self.table.read_all(store)?)
    }

    pub fn read_where<S>(&self, store: &S, predicate: &Predicate) -> DataResult<Vec<E>>
    where
        S: StoreHandle + ?Sized,
    {
        decode_all(self.table.read_where(store, predicate)?)
    }

    /// Loads by single-column primary key.
    pub fn get<S>(&self, store: &S, id: impl Into<Value>) -> DataResult<Option<E>>
    where
        S: StoreHandle + ?Sized,
    {
        let predicate = self.id_predicate(id)?;
        match self.table.read_where(store, &predicate)?.first() {
            Some(row) => Ok(Some(E::from_record(row)?)),
            None => Ok(None),
        }
    }

    pub fn update<S>(
        &self,
        store: &S,
        patch: &Record,
        predicate: Option<&Predicate>,
    ) -> DataResult<usize>
    where
        S: StoreHandle + ?Sized,
    {
        self.table.update(store, patch, predicate)
    }

    /// Patches the row with primary key `id`; returns 0 when absent.
    pub fn update_by_id<S>(&self, store: &S, id: impl Into<Value>, patch: &Record) -> DataResult<usize>
    where
        S: StoreHandle + ?Sized,
    {
        let predicate = self.id_predicate(id)?;
        self.table.update(store, patch, Some(&predicate))
    }

    pub fn delete<S>(&self, store: &S, predicate: Option<&Predicate>) -> DataResult<usize>
    where
        S: StoreHandle + ?Sized,
    {
        self.table.delete(store, predicate)
    }

    pub fn delete_by_id<S>(&self, store: &S, id: impl Into<Value>) -> DataResult<usize>
    where
        S: StoreHandle + ?Sized,
    {
        let predicate = self.id_predicate(id)?;
        self.table.delete(store, Some(&predicate))
    }

    pub fn count<S>(&self, store: &S, predicate: Option<&Predicate>) -> DataResult<u64>
    where
        S: StoreHandle + ?Sized,
    {
        self.table.count(store, predicate)
    }

    fn id_predicate(&self, id: impl Into<Value>) -> DataResult<Predicate> {
        match self.table.descriptor().primary_key() {
            [key] => Ok(Predicate::eq(key.as_str(), id)),
            _ => Err(DataError::InvalidRecord(format!(
                "`{}` has a composite primary key; use TableRepository::find_by_key",
                self.table.descriptor().name()
            ))),
        }
    }
}

fn decode_all<E: Entity>(rows: Vec<Record>) -> DataResult<Vec<E>> {
    rows.iter().map(E::from_record).collect()
}
