//! Repository layer over the execution engine.
//!
//! # Responsibility
//! - Bind a fixed table descriptor to the generic CRUD operations.
//! - Keep statement construction out of service and seeding code.
//!
//! # Invariants
//! - Writes are checked against the descriptor before binding.
//! - Store errors propagate unchanged in their normalized form.

pub mod entity_repo;
pub mod table_repo;
