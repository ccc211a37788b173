//! Core data-access layer for the HR desk.
//!
//! Statements are built from table descriptors, executed against a store
//! handle, and composed into repositories, transaction scopes and seed
//! loading. Nothing above `store` knows which engine sits underneath.

pub mod db;
pub mod engine;
pub mod error;
pub mod logging;
pub mod model;
pub mod query;
pub mod repo;
pub mod seed;
pub mod service;
pub mod store;
pub mod tx;

pub use error::{ConstraintKind, DataError, DataResult};
pub use logging::{default_log_level, init_logging, logging_status, LogConfig};
pub use model::catalog::Catalog;
pub use model::descriptor::{ColumnDef, DescriptorError, Ident, ScalarType, TableDescriptor};
pub use model::entity::Entity;
pub use model::hr::{
    hr_catalog, Attendance, AttendanceStatus, Department, Employee, LeaveRequest, LeaveStatus,
    Role,
};
pub use model::predicate::Predicate;
pub use model::record::Record;
pub use model::value::Value;
pub use repo::entity_repo::Repository;
pub use repo::table_repo::TableRepository;
pub use seed::{
    baseline_units, parse_seed_units, SeedLoader, SeedReport, SeedSourceError, SeedUnit,
    UnitReport,
};
pub use service::hr_service::HrService;
pub use store::{Executed, SqliteStore, SqliteStoreError, StoreHandle};
pub use tx::{run_in_transaction, ScopeState, TransactionCoordinator, TransactionScope};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
