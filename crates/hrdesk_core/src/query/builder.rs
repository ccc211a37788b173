//! Statement builder: pure mapping from (table, record, predicate) to SQL.
//!
//! # Invariants
//! - Identical inputs produce identical SQL text and parameter order.
//! - Values are only ever bound through `?`; never interpolated.
//! - Update/delete without a predicate are rejected; `Predicate::AllRows`
//!   is the only way to target every row.

use crate::error::{DataError, DataResult};
use crate::model::descriptor::Ident;
use crate::model::predicate::{quote_ident, Predicate};
use crate::model::record::Record;
use crate::model::value::Value;
use std::fmt::{Display, Formatter};

/// Statement family, used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Insert,
    Select,
    Update,
    Delete,
    Count,
}

impl StatementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Insert => "insert",
            Self::Select => "select",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Count => "count",
        }
    }
}

impl Display for StatementKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameterized statement ready for the execution engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub kind: StatementKind,
    pub table: String,
    pub sql: String,
    pub params: Vec<Value>,
}

/// `INSERT INTO t (c1, c2) VALUES (?, ?)` in record order.
pub fn build_insert(table: &Ident, record: &Record) -> DataResult<Statement> {
    if record.is_empty() {
        return Err(DataError::InvalidRecord(format!(
            "cannot insert an empty record into `{table}`"
        )));
    }
    let columns = record
        .columns()
        .map(quote_ident)
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = vec!["?"; record.len()].join(", ");
    Ok(Statement {
        kind: StatementKind::Insert,
        table: table.to_string(),
        sql: format!(
            "INSERT INTO {} ({columns}) VALUES ({placeholders})",
            quote_ident(table.as_str())
        ),
        params: record.values().cloned().collect(),
    })
}

/// `SELECT` with optional filter and projection (`*` when `None`).
pub fn build_select(
    table: &Ident,
    predicate: Option<&Predicate>,
    columns: Option<&[Ident]>,
) -> Statement {
    build_select_ordered(table, predicate, columns, &[])
}

/// [`build_select`] followed by `ORDER BY` on `order_by`, ascending.
pub fn build_select_ordered(
    table: &Ident,
    predicate: Option<&Predicate>,
    columns: Option<&[Ident]>,
    order_by: &[Ident],
) -> Statement {
    let projection = match columns {
        Some(columns) if !columns.is_empty() => columns
            .iter()
            .map(|column| quote_ident(column.as_str()))
            .collect::<Vec<_>>()
            .join(", "),
        _ => "*".to_string(),
    };
    let mut sql = format!("SELECT {projection} FROM {}", quote_ident(table.as_str()));
    let params = push_where(&mut sql, predicate);
    if !order_by.is_empty() {
        let order = order_by
            .iter()
            .map(|column| format!("{} ASC", quote_ident(column.as_str())))
            .collect::<Vec<_>>()
            .join(", ");
        sql.push_str(" ORDER BY ");
        sql.push_str(&order);
    }
    Statement {
        kind: StatementKind::Select,
        table: table.to_string(),
        sql,
        params,
    }
}

/// `UPDATE t SET c = ? ... WHERE ...`; patch params precede predicate params.
pub fn build_update(
    table: &Ident,
    patch: &Record,
    predicate: Option<&Predicate>,
) -> DataResult<Statement> {
    if patch.is_empty() {
        return Err(DataError::InvalidRecord(format!(
            "cannot update `{table}` with an empty patch"
        )));
    }
    let predicate = predicate.ok_or_else(|| DataError::UnboundedMutation {
        table: table.to_string(),
    })?;
    let assignments = patch
        .columns()
        .map(|column| format!("{} = ?", quote_ident(column)))
        .collect::<Vec<_>>()
        .join(", ");
    let mut sql = format!(
        "UPDATE {} SET {assignments}",
        quote_ident(table.as_str())
    );
    let mut params: Vec<Value> = patch.values().cloned().collect();
    params.extend(push_where(&mut sql, Some(predicate)));
    Ok(Statement {
        kind: StatementKind::Update,
        table: table.to_string(),
        sql,
        params,
    })
}

/// `DELETE FROM t WHERE ...`.
pub fn build_delete(table: &Ident, predicate: Option<&Predicate>) -> DataResult<Statement> {
    let predicate = predicate.ok_or_else(|| DataError::UnboundedMutation {
        table: table.to_string(),
    })?;
    let mut sql = format!("DELETE FROM {}", quote_ident(table.as_str()));
    let params = push_where(&mut sql, Some(predicate));
    Ok(Statement {
        kind: StatementKind::Delete,
        table: table.to_string(),
        sql,
        params,
    })
}

/// `SELECT COUNT(*) AS "count"` with optional filter.
pub fn build_count(table: &Ident, predicate: Option<&Predicate>) -> Statement {
    let mut sql = format!(
        "SELECT COUNT(*) AS \"count\" FROM {}",
        quote_ident(table.as_str())
    );
    let params = push_where(&mut sql, predicate);
    Statement {
        kind: StatementKind::Count,
        table: table.to_string(),
        sql,
        params,
    }
}

fn push_where(sql: &mut String, predicate: Option<&Predicate>) -> Vec<Value> {
    match predicate {
        None | Some(Predicate::AllRows) => Vec::new(),
        Some(Predicate::Filter { template, params }) => {
            sql.push_str(" WHERE ");
            sql.push_str(template);
            params.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        build_count, build_delete, build_insert, build_select, build_select_ordered,
        build_update, StatementKind,
    };
    use crate::error::DataError;
    use crate::model::descriptor::Ident;
    use crate::model::predicate::Predicate;
    use crate::model::record::Record;
    use crate::model::value::Value;

    fn table() -> Ident {
        Ident::parse("employees").unwrap()
    }

    #[test]
    fn insert_binds_one_param_per_column_in_record_order() {
        let record = Record::new()
            .with("name", "A")
            .with("role_id", 1)
            .with("department_id", 2)
            .with("email", Value::Null);
        let statement = build_insert(&table(), &record).unwrap();

        assert_eq!(statement.kind, StatementKind::Insert);
        assert_eq!(
            statement.sql,
            "INSERT INTO \"employees\" (\"name\", \"role_id\", \"department_id\", \"email\") VALUES (?, ?, ?, ?)"
        );
        assert_eq!(statement.params.len(), record.len());
        assert_eq!(
            statement.params,
            vec![
                Value::Text("A".to_string()),
                Value::Integer(1),
                Value::Integer(2),
                Value::Null
            ]
        );
    }

    #[test]
    fn insert_rejects_empty_record() {
        let err = build_insert(&table(), &Record::new()).unwrap_err();
        assert!(matches!(err, DataError::InvalidRecord(_)));
    }

    #[test]
    fn builder_is_deterministic() {
        let record = Record::new().with("b", 2).with("a", 1);
        let first = build_insert(&table(), &record).unwrap();
        let second = build_insert(&table(), &record).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn select_defaults_to_all_rows_and_all_columns() {
        let statement = build_select(&table(), None, None);
        assert_eq!(statement.sql, "SELECT * FROM \"employees\"");
        assert!(statement.params.is_empty());

        let all_rows = build_select(&table(), Some(&Predicate::AllRows), None);
        assert_eq!(all_rows.sql, statement.sql);
    }

    #[test]
    fn select_projects_filters_and_orders() {
        let columns = [Ident::parse("id").unwrap(), Ident::parse("name").unwrap()];
        let predicate = Predicate::eq("department_id", 3);
        let statement = build_select_ordered(
            &table(),
            Some(&predicate),
            Some(&columns),
            &[Ident::parse("id").unwrap()],
        );
        assert_eq!(
            statement.sql,
            "SELECT \"id\", \"name\" FROM \"employees\" WHERE \"department_id\" = ? ORDER BY \"id\" ASC"
        );
        assert_eq!(statement.params, vec![Value::Integer(3)]);
    }

    #[test]
    fn update_without_predicate_is_unbounded_mutation() {
        let patch = Record::new().with("email", "a@x.com");
        let err = build_update(&table(), &patch, None).unwrap_err();
        assert!(matches!(err, DataError::UnboundedMutation { ref table } if table == "employees"));
    }

    #[test]
    fn update_with_all_rows_marker_succeeds() {
        let patch = Record::new().with("salary", 10.0);
        let statement = build_update(&table(), &patch, Some(&Predicate::AllRows)).unwrap();
        assert_eq!(statement.sql, "UPDATE \"employees\" SET \"salary\" = ?");
        assert_eq!(statement.params, vec![Value::Real(10.0)]);
    }

    #[test]
    fn update_orders_patch_params_before_predicate_params() {
        let patch = Record::new().with("email", "a@x.com");
        let statement =
            build_update(&table(), &patch, Some(&Predicate::eq("id", 1))).unwrap();
        assert_eq!(
            statement.sql,
            "UPDATE \"employees\" SET \"email\" = ? WHERE \"id\" = ?"
        );
        assert_eq!(
            statement.params,
            vec![Value::Text("a@x.com".to_string()), Value::Integer(1)]
        );
    }

    #[test]
    fn update_rejects_empty_patch_before_predicate_check() {
        let err = build_update(&table(), &Record::new(), None).unwrap_err();
        assert!(matches!(err, DataError::InvalidRecord(_)));
    }

    #[test]
    fn delete_requires_predicate() {
        let err = build_delete(&table(), None).unwrap_err();
        assert!(matches!(err, DataError::UnboundedMutation { .. }));

        let statement = build_delete(&table(), Some(&Predicate::AllRows)).unwrap();
        assert_eq!(statement.sql, "DELETE FROM \"employees\"");
        assert_eq!(statement.kind, StatementKind::Delete);
    }

    #[test]
    fn count_forwards_predicate_verbatim() {
        let predicate = Predicate::filter("salary > ? AND role_id = ?", vec![1.0.into(), 2.into()]);
        let statement = build_count(&table(), Some(&predicate));
        assert_eq!(
            statement.sql,
            "SELECT COUNT(*) AS \"count\" FROM \"employees\" WHERE salary > ? AND role_id = ?"
        );
        assert_eq!(statement.params.len(), 2);
    }
}
