//! Use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into HR use cases.
//! - Keep launchers decoupled from descriptors and predicates.

pub mod hr_service;
