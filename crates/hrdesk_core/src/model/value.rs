//! Scalar values bound to and read from the store.
//!
//! # Invariants
//! - Values are flat scalars; there is no nested or blob variant.
//! - `Date` always holds an ISO `YYYY-MM-DD` string when built via
//!   [`Value::date`].

use crate::error::{DataError, DataResult};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

static ISO_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})-(\d{2})-(\d{2})$").expect("valid iso date regex"));

/// One scalar column value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    /// Calendar date persisted as ISO text.
    Date(String),
}

impl Value {
    /// Builds a date value, rejecting anything that is not `YYYY-MM-DD`.
    pub fn date(value: impl Into<String>) -> DataResult<Self> {
        let value = value.into();
        if !is_iso_date(&value) {
            return Err(DataError::InvalidRecord(format!(
                "`{value}` is not an ISO date (YYYY-MM-DD)"
            )));
        }
        Ok(Self::Date(value))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_real(&self) -> Option<f64> {
        match self {
            Self::Real(value) => Some(*value),
            Self::Integer(value) => Some(*value as f64),
            _ => None,
        }
    }

    /// Returns text for both `Text` and `Date`.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) | Self::Date(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Integer(_) => "integer",
            Self::Real(_) => "real",
            Self::Text(_) => "text",
            Self::Date(_) => "date",
        }
    }

    /// Compares values the way the store would after binding.
    ///
    /// `Text`/`Date` with equal strings match, as do numerically equal
    /// `Integer`/`Real` pairs.
    pub fn same_as(&self, other: &Value) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Integer(_) | Self::Real(_), Self::Integer(_) | Self::Real(_)) => {
                self.as_real() == other.as_real()
            }
            (Self::Text(_) | Self::Date(_), Self::Text(_) | Self::Date(_)) => {
                self.as_text() == other.as_text()
            }
            _ => false,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Real(value) => write!(f, "{value}"),
            Self::Text(value) | Self::Date(value) => write!(f, "{value:?}"),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Returns whether `value` is a real calendar date in `YYYY-MM-DD` form.
pub fn is_iso_date(value: &str) -> bool {
    let Some(captures) = ISO_DATE_RE.captures(value) else {
        return false;
    };
    let parse = |index: usize| -> u32 {
        captures
            .get(index)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0)
    };
    let (year, month, day) = (parse(1), parse(2), parse(3));
    let leap = (year % 4 == 0 && year % 100 != 0) || year % 400 == 0;
    let days_in_month = match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if leap => 29,
        2 => 28,
        _ => return false,
    };
    (1..=days_in_month).contains(&day)
}

#[cfg(test)]
mod tests {
    use super::{is_iso_date, Value};

    #[test]
    fn iso_date_rejects_impossible_days() {
        assert!(is_iso_date("2024-02-29"));
        assert!(!is_iso_date("2023-02-29"));
        assert!(!is_iso_date("2024-13-01"));
        assert!(!is_iso_date("24-01-01"));
    }

    #[test]
    fn same_as_bridges_text_and_date() {
        let date = Value::date("2024-05-01").unwrap();
        assert!(date.same_as(&Value::from("2024-05-01")));
        assert!(Value::Integer(3).same_as(&Value::Real(3.0)));
        assert!(!Value::Null.same_as(&Value::Integer(0)));
    }

    #[test]
    fn option_none_becomes_null() {
        let value: Value = Option::<i64>::None.into();
        assert!(value.is_null());
    }
}
