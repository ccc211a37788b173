//! Data model shared by the statement builder, repositories and seeding.
//!
//! # Responsibility
//! - Define scalar values, ordered records and parameterized predicates.
//! - Describe tables statically so identifiers are validated once.
//!
//! # Invariants
//! - Records are flat; no nested structures reach the store.
//! - Descriptors are read-only after construction.

pub mod catalog;
pub mod descriptor;
pub mod entity;
pub mod hr;
pub mod predicate;
pub mod record;
pub mod value;
