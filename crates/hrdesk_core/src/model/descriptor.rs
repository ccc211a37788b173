//! Table descriptors: the static shape of every table the core touches.
//!
//! # Responsibility
//! - Validate identifiers once, at definition time.
//! - Check caller records against the declared columns before binding.
//!
//! # Invariants
//! - Every table, column, and foreign-key name matches `[A-Za-z_][A-Za-z0-9_]*`.
//! - Primary key and foreign key columns refer to declared columns.
//! - Auto-increment is only allowed on a single integer primary key.

use crate::error::{DataError, DataResult};
use crate::model::record::Record;
use crate::model::value::{is_iso_date, Value};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static IDENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid identifier regex"));

const MAX_IDENT_LEN: usize = 64;

/// Validated SQL identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ident(String);

impl Ident {
    pub fn parse(value: &str) -> Result<Self, DescriptorError> {
        if value.len() > MAX_IDENT_LEN || !IDENT_RE.is_match(value) {
            return Err(DescriptorError::InvalidIdentifier(value.to_string()));
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Ident {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Storage type of one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    Text,
    Integer,
    Real,
    /// ISO `YYYY-MM-DD`, persisted as text.
    Date,
}

/// One column definition.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub name: String,
    pub kind: ScalarType,
    pub nullable: bool,
    /// Applied by the store when the column is omitted on insert.
    pub default: Option<Value>,
    pub auto_increment: bool,
}

impl ColumnDef {
    /// Non-nullable column without default.
    pub fn new(name: &str, kind: ScalarType) -> Self {
        Self {
            name: name.to_string(),
            kind,
            nullable: false,
            default: None,
            auto_increment: false,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }
}

/// `column` references `table.column`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyRef {
    pub column: Ident,
    pub ref_table: Ident,
    pub ref_column: Ident,
}

/// Validated description of one table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableDescriptor {
    name: Ident,
    columns: Vec<(Ident, ColumnDef)>,
    primary_key: Vec<Ident>,
    foreign_keys: Vec<ForeignKeyRef>,
}

impl TableDescriptor {
    pub fn builder(name: &str) -> TableDescriptorBuilder {
        TableDescriptorBuilder {
            name: name.to_string(),
            columns: Vec::new(),
            primary_key: Vec::new(),
            foreign_keys: Vec::new(),
        }
    }

    pub fn name(&self) -> &Ident {
        &self.name
    }

    pub fn columns(&self) -> impl Iterator<Item = &ColumnDef> {
        self.columns.iter().map(|(_, column)| column)
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns
            .iter()
            .find(|(ident, _)| ident.as_str() == name)
            .map(|(_, column)| column)
    }

    /// Resolves a column name to its validated identifier.
    pub fn ident(&self, name: &str) -> Option<&Ident> {
        self.columns
            .iter()
            .find(|(ident, _)| ident.as_str() == name)
            .map(|(ident, _)| ident)
    }

    pub fn primary_key(&self) -> &[Ident] {
        &self.primary_key
    }

    pub fn foreign_keys(&self) -> &[ForeignKeyRef] {
        &self.foreign_keys
    }

    /// Returns the auto-increment primary key column, if the table has one.
    pub fn auto_increment_key(&self) -> Option<&Ident> {
        match self.primary_key.as_slice() {
            [key] if self.column(key.as_str()).is_some_and(|c| c.auto_increment) => Some(key),
            _ => None,
        }
    }

    /// Checks `record` against the declared columns and normalizes values.
    ///
    /// Text bound to a date column becomes `Value::Date`. Null is left to the
    /// store so not-null failures surface as constraint violations.
    pub fn conform(&self, mut record: Record) -> DataResult<Record> {
        for (name, value) in record.values_mut() {
            let column = self.column(name).ok_or_else(|| {
                DataError::InvalidRecord(format!("table `{}` has no column `{name}`", self.name))
            })?;
            let accepted = match (column.kind, &*value) {
                (_, Value::Null) => true,
                (ScalarType::Integer, Value::Integer(_)) => true,
                (ScalarType::Real, Value::Integer(_) | Value::Real(_)) => true,
                (ScalarType::Text, Value::Text(_) | Value::Date(_)) => true,
                (ScalarType::Date, Value::Date(text) | Value::Text(text)) => is_iso_date(text),
                _ => false,
            };
            if accepted && column.kind == ScalarType::Date {
                if let Value::Text(text) = value {
                    *value = Value::Date(std::mem::take(text));
                }
            }
            if !accepted {
                return Err(DataError::InvalidRecord(format!(
                    "column `{}.{name}` expects {:?}, got {} {value}",
                    self.name,
                    column.kind,
                    value.type_name()
                )));
            }
        }
        Ok(record)
    }

    /// Re-types a row read from the store using the declared column types.
    pub fn decode_row(&self, mut row: Record) -> Record {
        for (name, value) in row.values_mut() {
            let Some(column) = self.column(name) else {
                continue;
            };
            if column.kind == ScalarType::Date {
                if let Value::Text(text) = value {
                    *value = Value::Date(std::mem::take(text));
                }
            }
        }
        row
    }
}

/// Builder collecting raw names; validation happens in [`Self::build`].
#[derive(Debug, Clone)]
pub struct TableDescriptorBuilder {
    name: String,
    columns: Vec<ColumnDef>,
    primary_key: Vec<String>,
    foreign_keys: Vec<(String, String, String)>,
}

impl TableDescriptorBuilder {
    pub fn column(mut self, column: ColumnDef) -> Self {
        self.columns.push(column);
        self
    }

    pub fn primary_key<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.primary_key = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn foreign_key(mut self, column: &str, ref_table: &str, ref_column: &str) -> Self {
        self.foreign_keys.push((
            column.to_string(),
            ref_table.to_string(),
            ref_column.to_string(),
        ));
        self
    }

    pub fn build(self) -> Result<TableDescriptor, DescriptorError> {
        let name = Ident::parse(&self.name)?;

        let mut columns: Vec<(Ident, ColumnDef)> = Vec::with_capacity(self.columns.len());
        for column in self.columns {
            let ident = Ident::parse(&column.name)?;
            if columns.iter().any(|(existing, _)| *existing == ident) {
                return Err(DescriptorError::DuplicateColumn {
                    table: self.name,
                    column: column.name,
                });
            }
            columns.push((ident, column));
        }
        if columns.is_empty() {
            return Err(DescriptorError::NoColumns(self.name));
        }

        if self.primary_key.is_empty() {
            return Err(DescriptorError::MissingPrimaryKey(self.name));
        }
        let mut primary_key = Vec::with_capacity(self.primary_key.len());
        for key in &self.primary_key {
            let ident = lookup(&columns, key).ok_or_else(|| DescriptorError::UnknownColumn {
                table: self.name.clone(),
                column: key.clone(),
            })?;
            primary_key.push(ident);
        }

        for (ident, column) in &columns {
            if !column.auto_increment {
                continue;
            }
            let single_integer_key = column.kind == ScalarType::Integer
                && primary_key.len() == 1
                && primary_key[0] == *ident;
            if !single_integer_key {
                return Err(DescriptorError::InvalidAutoIncrement {
                    table: self.name.clone(),
                    column: column.name.clone(),
                });
            }
        }

        let mut foreign_keys = Vec::with_capacity(self.foreign_keys.len());
        for (column, ref_table, ref_column) in &self.foreign_keys {
            let column = lookup(&columns, column).ok_or_else(|| DescriptorError::UnknownColumn {
                table: self.name.clone(),
                column: column.clone(),
            })?;
            foreign_keys.push(ForeignKeyRef {
                column,
                ref_table: Ident::parse(ref_table)?,
                ref_column: Ident::parse(ref_column)?,
            });
        }

        Ok(TableDescriptor {
            name,
            columns,
            primary_key,
            foreign_keys,
        })
    }
}

fn lookup(columns: &[(Ident, ColumnDef)], name: &str) -> Option<Ident> {
    columns
        .iter()
        .find(|(ident, _)| ident.as_str() == name)
        .map(|(ident, _)| ident.clone())
}

/// Descriptor definition errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DescriptorError {
    InvalidIdentifier(String),
    NoColumns(String),
    DuplicateColumn { table: String, column: String },
    MissingPrimaryKey(String),
    UnknownColumn { table: String, column: String },
    InvalidAutoIncrement { table: String, column: String },
    DuplicateTable(String),
}

impl Display for DescriptorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidIdentifier(value) => write!(f, "invalid identifier `{value}`"),
            Self::NoColumns(table) => write!(f, "table `{table}` declares no columns"),
            Self::DuplicateColumn { table, column } => {
                write!(f, "table `{table}` declares column `{column}` twice")
            }
            Self::MissingPrimaryKey(table) => write!(f, "table `{table}` has no primary key"),
            Self::UnknownColumn { table, column } => {
                write!(f, "table `{table}` references undeclared column `{column}`")
            }
            Self::InvalidAutoIncrement { table, column } => write!(
                f,
                "auto-increment column `{table}.{column}` must be the single integer primary key"
            ),
            Self::DuplicateTable(table) => write!(f, "table `{table}` registered twice"),
        }
    }
}

impl Error for DescriptorError {}

#[cfg(test)]
mod tests {
    use super::{ColumnDef, DescriptorError, Ident, ScalarType, TableDescriptor};
    use crate::error::DataError;
    use crate::model::record::Record;
    use crate::model::value::Value;

    fn people() -> TableDescriptor {
        TableDescriptor::builder("people")
            .column(ColumnDef::new("id", ScalarType::Integer).auto_increment())
            .column(ColumnDef::new("name", ScalarType::Text))
            .column(ColumnDef::new("born", ScalarType::Date).nullable())
            .primary_key(["id"])
            .build()
            .unwrap()
    }

    #[test]
    fn ident_rejects_injection_attempts() {
        assert!(Ident::parse("employees").is_ok());
        assert!(Ident::parse("1abc").is_err());
        assert!(Ident::parse("name; DROP TABLE x").is_err());
        assert!(Ident::parse("").is_err());
    }

    #[test]
    fn build_rejects_unknown_primary_key() {
        let err = TableDescriptor::builder("t")
            .column(ColumnDef::new("a", ScalarType::Text))
            .primary_key(["b"])
            .build()
            .unwrap_err();
        assert!(matches!(err, DescriptorError::UnknownColumn { .. }));
    }

    #[test]
    fn build_rejects_auto_increment_on_text() {
        let err = TableDescriptor::builder("t")
            .column(ColumnDef::new("code", ScalarType::Text).auto_increment())
            .primary_key(["code"])
            .build()
            .unwrap_err();
        assert!(matches!(err, DescriptorError::InvalidAutoIncrement { .. }));
    }

    #[test]
    fn conform_turns_iso_text_into_date() {
        let record = Record::new().with("name", "Ada").with("born", "1815-12-10");
        let conformed = people().conform(record).unwrap();
        assert_eq!(
            conformed.get("born"),
            Some(&Value::Date("1815-12-10".to_string()))
        );
    }

    #[test]
    fn conform_rejects_unknown_column_and_bad_types() {
        let unknown = people().conform(Record::new().with("nickname", "x"));
        assert!(matches!(unknown, Err(DataError::InvalidRecord(_))));

        let mistyped = people().conform(Record::new().with("name", 5));
        assert!(matches!(mistyped, Err(DataError::InvalidRecord(_))));

        let bad_date = people().conform(Record::new().with("born", "yesterday"));
        assert!(matches!(bad_date, Err(DataError::InvalidRecord(_))));
    }
}
