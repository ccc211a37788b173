//! Parameterized row filters.
//!
//! The template text is forwarded verbatim; callers own its correctness.
//! Every placeholder is an anonymous positional `?`.

use crate::model::record::Record;
use crate::model::value::Value;

/// Filter used by read/update/delete statements.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Explicit marker for statements that target every row.
    AllRows,
    /// `WHERE <template>` with `params` bound in order.
    Filter { template: String, params: Vec<Value> },
}

impl Predicate {
    pub fn filter(template: impl Into<String>, params: Vec<Value>) -> Self {
        Self::Filter {
            template: template.into(),
            params,
        }
    }

    /// `"column" = ?`
    pub fn eq(column: &str, value: impl Into<Value>) -> Self {
        Self::filter(format!("{} = ?", quote_ident(column)), vec![value.into()])
    }

    /// Conjunction of equality tests over every entry of `record`.
    ///
    /// An empty record yields `AllRows`.
    pub fn matching(record: &Record) -> Self {
        if record.is_empty() {
            return Self::AllRows;
        }
        let template = record
            .columns()
            .map(|column| format!("{} = ?", quote_ident(column)))
            .collect::<Vec<_>>()
            .join(" AND ");
        Self::filter(template, record.values().cloned().collect())
    }

    pub fn params(&self) -> &[Value] {
        match self {
            Self::AllRows => &[],
            Self::Filter { params, .. } => params,
        }
    }
}

/// Double-quotes an identifier, doubling embedded quotes.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
