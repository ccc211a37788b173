use hrdesk_core::db::migrations::{latest_version, schema_version};
use hrdesk_core::db::{open_db, open_db_in_memory, DbError};
use hrdesk_core::{hr_catalog, ScalarType, TableDescriptor, Value};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn).unwrap(), latest_version());
    for table in ["roles", "departments", "employees", "attendance", "leave_requests"] {
        assert_table_exists(&conn, table);
    }
}

#[test]
fn opened_connections_enforce_foreign_keys() {
    let conn = open_db_in_memory().unwrap();
    let enabled: i64 = conn
        .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(enabled, 1);
}

#[test]
fn reopening_file_database_keeps_schema_and_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hrdesk.db");

    let conn_first = open_db(&path).unwrap();
    conn_first
        .execute("INSERT INTO roles (name) VALUES ('Admin');", [])
        .unwrap();
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second).unwrap(), latest_version());
    let roles: i64 = conn_second
        .query_row("SELECT COUNT(*) FROM roles;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(roles, 1);
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn quoted_unknown_identifier_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    assert!(conn.prepare("SELECT \"nmae\" FROM roles").is_err());
}

#[test]
fn hr_descriptors_match_migrated_schema() {
    let conn = open_db_in_memory().unwrap();
    let catalog = hr_catalog();

    for table in catalog.table_names() {
        let descriptor = catalog.get(table).unwrap();
        assert_columns_match(&conn, descriptor);
        assert_foreign_keys_match(&conn, descriptor);
    }
}

struct ColumnInfo {
    name: String,
    declared_type: String,
    not_null: bool,
    default: Option<String>,
    pk_position: i64,
}

fn assert_columns_match(conn: &Connection, descriptor: &TableDescriptor) {
    let table = descriptor.name().as_str();
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({table});"))
        .unwrap();
    let columns: Vec<ColumnInfo> = stmt
        .query_map([], |row| {
            Ok(ColumnInfo {
                name: row.get(1)?,
                declared_type: row.get(2)?,
                not_null: row.get::<_, i64>(3)? != 0,
                default: row.get(4)?,
                pk_position: row.get(5)?,
            })
        })
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();

    let declared: Vec<&str> = descriptor.columns().map(|c| c.name.as_str()).collect();
    let actual: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(declared, actual, "column order of {table}");

    for (def, info) in descriptor.columns().zip(&columns) {
        let expected_type = match def.kind {
            ScalarType::Integer => "INTEGER",
            ScalarType::Real => "REAL",
            ScalarType::Text | ScalarType::Date => "TEXT",
        };
        assert_eq!(info.declared_type, expected_type, "type of {table}.{}", def.name);

        let store_allows_null = !info.not_null && info.pk_position == 0;
        assert_eq!(def.nullable, store_allows_null, "nullability of {table}.{}", def.name);

        let expected_default = def.default.as_ref().map(|value| match value {
            Value::Text(text) | Value::Date(text) => format!("'{text}'"),
            other => other.to_string(),
        });
        assert_eq!(info.default, expected_default, "default of {table}.{}", def.name);
    }

    let mut primary_key: Vec<(i64, &str)> = columns
        .iter()
        .filter(|c| c.pk_position > 0)
        .map(|c| (c.pk_position, c.name.as_str()))
        .collect();
    primary_key.sort();
    let primary_key: Vec<&str> = primary_key.into_iter().map(|(_, name)| name).collect();
    let declared_key: Vec<&str> = descriptor.primary_key().iter().map(|k| k.as_str()).collect();
    assert_eq!(declared_key, primary_key, "primary key of {table}");

    let create_sql: String = conn
        .query_row(
            "SELECT sql FROM sqlite_master WHERE type = 'table' AND name = ?1;",
            [table],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(
        descriptor.auto_increment_key().is_some(),
        create_sql.contains("AUTOINCREMENT"),
        "auto-increment of {table}"
    );
}

fn assert_foreign_keys_match(conn: &Connection, descriptor: &TableDescriptor) {
    let table = descriptor.name().as_str();
    let mut stmt = conn
        .prepare(&format!("PRAGMA foreign_key_list({table});"))
        .unwrap();
    let mut actual: Vec<(String, String, String)> = stmt
        .query_map([], |row| Ok((row.get(3)?, row.get(2)?, row.get(4)?)))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    actual.sort();

    let mut declared: Vec<(String, String, String)> = descriptor
        .foreign_keys()
        .iter()
        .map(|fk| {
            (
                fk.column.to_string(),
                fk.ref_table.to_string(),
                fk.ref_column.to_string(),
            )
        })
        .collect();
    declared.sort();
    assert_eq!(declared, actual, "foreign keys of {table}");
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
