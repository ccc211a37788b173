//! Registry of table descriptors, keyed by table name.

use crate::error::{DataError, DataResult};
use crate::model::descriptor::{DescriptorError, TableDescriptor};
use std::collections::BTreeMap;

/// Read-only set of descriptors known to a seed loader or launcher.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tables: BTreeMap<String, TableDescriptor>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one descriptor; names must be unique.
    pub fn register(&mut self, descriptor: TableDescriptor) -> Result<(), DescriptorError> {
        let name = descriptor.name().as_str().to_string();
        if self.tables.contains_key(&name) {
            return Err(DescriptorError::DuplicateTable(name));
        }
        self.tables.insert(name, descriptor);
        Ok(())
    }

    pub fn get(&self, table: &str) -> Option<&TableDescriptor> {
        self.tables.get(table)
    }

    pub fn require(&self, table: &str) -> DataResult<&TableDescriptor> {
        self.get(table)
            .ok_or_else(|| DataError::UnknownTable(table.to_string()))
    }

    /// Sorted table names.
    pub fn table_names(&self) -> Vec<&str> {
        self.tables.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
