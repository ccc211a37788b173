//! Statement construction. No I/O happens in this module.

pub mod builder;

pub use builder::{
    build_count, build_delete, build_insert, build_select, build_select_ordered, build_update,
    Statement, StatementKind,
};
