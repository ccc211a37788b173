//! Dependency-ordered, idempotent seed loading.
//!
//! # Responsibility
//! - Insert baseline rows unit by unit, in caller-declared order.
//! - Skip rows that already exist by the unit's uniqueness key.
//!
//! # Invariants
//! - One transaction per unit; a failing unit rolls back alone and stops
//!   the load, leaving earlier units committed.
//! - Re-running the same units inserts nothing new.
//! - Within one unit, the first record with a given key wins; later ones are
//!   reported as skipped duplicates.
//! - Foreign keys are not inferred; a unit seeded before its dependencies
//!   fails with the store's constraint violation as cause.

use crate::error::{DataError, DataResult};
use crate::model::catalog::Catalog;
use crate::model::descriptor::TableDescriptor;
use crate::model::predicate::Predicate;
use crate::model::record::Record;
use crate::model::value::Value;
use crate::repo::table_repo::TableRepository;
use crate::seed::SeedUnit;
use crate::store::StoreHandle;
use crate::tx::run_in_transaction;
use log::{debug, error, info, warn};
use std::collections::HashSet;
use std::time::Instant;

/// Outcome of one committed unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitReport {
    pub table: String,
    pub inserted: usize,
    pub skipped_existing: usize,
    /// Input positions dropped because an earlier record had the same key.
    pub skipped_duplicates: Vec<usize>,
    /// Existing rows whose non-key columns differ from the seed record.
    /// They are left unchanged.
    pub drifted: usize,
}

impl UnitReport {
    fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            ..Self::default()
        }
    }
}

/// Outcome of a whole load, one entry per unit in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub units: Vec<UnitReport>,
}

impl SeedReport {
    pub fn total_inserted(&self) -> usize {
        self.units.iter().map(|unit| unit.inserted).sum()
    }

    pub fn total_skipped(&self) -> usize {
        self.units
            .iter()
            .map(|unit| unit.skipped_existing + unit.skipped_duplicates.len())
            .sum()
    }

    pub fn unit(&self, table: &str) -> Option<&UnitReport> {
        self.units.iter().find(|unit| unit.table == table)
    }
}

/// Loads seed units into tables described by a catalog.
pub struct SeedLoader<'c> {
    catalog: &'c Catalog,
}

impl<'c> SeedLoader<'c> {
    pub fn new(catalog: &'c Catalog) -> Self {
        Self { catalog }
    }

    /// Loads `units` in order, stopping at the first failing unit.
    pub fn load<S>(&self, store: &S, units: &[SeedUnit]) -> DataResult<SeedReport>
    where
        S: StoreHandle + ?Sized,
    {
        let started_at = Instant::now();
        info!(
            "event=seed_load module=seed status=start units={}",
            units.len()
        );

        let mut report = SeedReport::default();
        for unit in units {
            match self.load_unit(store, unit) {
                Ok(unit_report) => report.units.push(unit_report),
                Err(err) => {
                    error!(
                        "event=seed_load module=seed status=error units_committed={} duration_ms={} error={err}",
                        report.units.len(),
                        started_at.elapsed().as_millis()
                    );
                    return Err(err);
                }
            }
        }

        info!(
            "event=seed_load module=seed status=ok units={} inserted={} skipped={} duration_ms={}",
            report.units.len(),
            report.total_inserted(),
            report.total_skipped(),
            started_at.elapsed().as_millis()
        );
        Ok(report)
    }

    fn load_unit<S>(&self, store: &S, unit: &SeedUnit) -> DataResult<UnitReport>
    where
        S: StoreHandle + ?Sized,
    {
        if unit.records.is_empty() {
            debug!(
                "event=seed_unit module=seed status=skipped table={} reason=empty",
                unit.table
            );
            return Ok(UnitReport::new(&unit.table));
        }

        let started_at = Instant::now();
        let descriptor = self
            .catalog
            .require(&unit.table)
            .and_then(|descriptor| check_unique_key(descriptor, unit).map(|()| descriptor))
            .map_err(|cause| unit_failure(unit, None, cause))?;
        let repo = TableRepository::new(descriptor);

        let result = run_in_transaction(store, |scope| {
            let mut report = UnitReport::new(&unit.table);
            let mut seen_keys: HashSet<Vec<KeyPart>> = HashSet::new();
            for (index, record) in unit.records.iter().enumerate() {
                seed_record(
                    scope.store(),
                    &repo,
                    unit,
                    index,
                    record,
                    &mut seen_keys,
                    &mut report,
                )
                .map_err(|cause| unit_failure(unit, Some((index, record)), cause))?;
            }
            Ok(report)
        });

        match result {
            Ok(report) => {
                info!(
                    "event=seed_unit module=seed status=ok table={} inserted={} skipped_existing={} skipped_duplicate={} drifted={} duration_ms={}",
                    report.table,
                    report.inserted,
                    report.skipped_existing,
                    report.skipped_duplicates.len(),
                    report.drifted,
                    started_at.elapsed().as_millis()
                );
                Ok(report)
            }
            Err(err) => {
                let err = match err {
                    already @ DataError::SeedUnitFailure { .. } => already,
                    other => unit_failure(unit, None, other),
                };
                warn!(
                    "event=seed_unit module=seed status=rolled_back table={} duration_ms={} error_code={} cause_code={}",
                    unit.table,
                    started_at.elapsed().as_millis(),
                    err.code(),
                    err.root_cause().code()
                );
                Err(err)
            }
        }
    }
}

fn seed_record<S>(
    store: &S,
    repo: &TableRepository<'_>,
    unit: &SeedUnit,
    index: usize,
    record: &Record,
    seen_keys: &mut HashSet<Vec<KeyPart>>,
    report: &mut UnitReport,
) -> DataResult<()>
where
    S: StoreHandle + ?Sized,
{
    let key = extract_key(unit, record)?;
    if !seen_keys.insert(key_fingerprint(&key)) {
        debug!(
            "event=seed_record module=seed status=skipped table={} index={index} reason=duplicate_in_unit",
            unit.table
        );
        report.skipped_duplicates.push(index);
        return Ok(());
    }

    let existing = repo.read_where(store, &Predicate::matching(&key))?;

    match existing.first() {
        Some(row) => {
            report.skipped_existing += 1;
            if differs(row, record) {
                report.drifted += 1;
                warn!(
                    "event=seed_record module=seed status=skipped table={} index={index} reason=exists_with_different_values",
                    unit.table
                );
            }
        }
        None => {
            repo.create(store, record)?;
            report.inserted += 1;
        }
    }
    Ok(())
}

fn check_unique_key(descriptor: &TableDescriptor, unit: &SeedUnit) -> DataResult<()> {
    if unit.unique_key.is_empty() {
        return Err(DataError::InvalidRecord(format!(
            "seed unit `{}` declares no uniqueness key",
            unit.table
        )));
    }
    for column in &unit.unique_key {
        if descriptor.column(column).is_none() {
            return Err(DataError::InvalidRecord(format!(
                "uniqueness key column `{column}` is not declared on `{}`",
                unit.table
            )));
        }
    }
    Ok(())
}

/// Key columns of `record`, in declared key order. Null keys are rejected
/// since they never compare equal in the store.
fn extract_key(unit: &SeedUnit, record: &Record) -> DataResult<Record> {
    let mut key = Record::new();
    for column in &unit.unique_key {
        match record.get(column) {
            Some(value) if !value.is_null() => key.set(column.as_str(), value.clone()),
            _ => {
                return Err(DataError::InvalidRecord(format!(
                    "seed record for `{}` lacks a value for key column `{column}`",
                    unit.table
                )));
            }
        }
    }
    Ok(key)
}

/// Hashable key component. Equal parts follow [`Value::same_as`]: text and
/// dates share a form, as do reals with an integral value and integers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum KeyPart {
    Null,
    Integer(i64),
    Real(u64),
    Text(String),
}

fn key_fingerprint(key: &Record) -> Vec<KeyPart> {
    key.values()
        .map(|value| match value {
            Value::Null => KeyPart::Null,
            Value::Integer(number) => KeyPart::Integer(*number),
            Value::Real(number)
                if number.fract() == 0.0
                    && *number >= i64::MIN as f64
                    && *number < i64::MAX as f64 =>
            {
                KeyPart::Integer(*number as i64)
            }
            Value::Real(number) => KeyPart::Real(number.to_bits()),
            Value::Text(text) | Value::Date(text) => KeyPart::Text(text.clone()),
        })
        .collect()
}

fn differs(existing: &Record, seed: &Record) -> bool {
    seed.iter().any(|(column, value)| {
        existing
            .get(column)
            .is_some_and(|stored| !stored.same_as(value))
    })
}

fn unit_failure(unit: &SeedUnit, at: Option<(usize, &Record)>, cause: DataError) -> DataError {
    DataError::SeedUnitFailure {
        unit: unit.table.clone(),
        index: at.map(|(index, _)| index),
        record: at.map(|(_, record)| record.clone()),
        cause: Box::new(cause),
    }
}

#[cfg(test)]
mod tests {
    use super::{differs, extract_key, key_fingerprint};
    use crate::error::DataError;
    use crate::model::record::Record;
    use crate::model::value::Value;
    use crate::seed::SeedUnit;

    #[test]
    fn extract_key_follows_declared_order_and_rejects_null() {
        let unit = SeedUnit::new("attendance", ["employee_id", "date"]);
        let record = Record::new()
            .with("date", "2024-01-02")
            .with("status", "present")
            .with("employee_id", 7);
        let key = extract_key(&unit, &record).unwrap();
        assert_eq!(key.columns().collect::<Vec<_>>(), vec!["employee_id", "date"]);

        let missing = Record::new().with("employee_id", 7).with("date", Value::Null);
        assert!(matches!(
            extract_key(&unit, &missing),
            Err(DataError::InvalidRecord(_))
        ));
    }

    #[test]
    fn fingerprint_matches_values_the_store_treats_as_equal() {
        let text = Record::new().with("employee_id", 3).with("date", "2024-01-02");
        let date = Record::new()
            .with("employee_id", 3.0)
            .with("date", Value::date("2024-01-02").unwrap());
        assert_eq!(key_fingerprint(&text), key_fingerprint(&date));

        let other_day = Record::new().with("employee_id", 3).with("date", "2024-01-03");
        assert_ne!(key_fingerprint(&text), key_fingerprint(&other_day));
        assert_ne!(
            key_fingerprint(&Record::new().with("salary", 1.5)),
            key_fingerprint(&Record::new().with("salary", 1))
        );
    }

    #[test]
    fn differs_ignores_columns_missing_from_existing_row() {
        let existing = Record::new().with("name", "IT").with("location", "HQ");
        assert!(!differs(&existing, &Record::new().with("name", "IT")));
        assert!(differs(
            &existing,
            &Record::new().with("name", "IT").with("location", "Annex")
        ));
    }
}
