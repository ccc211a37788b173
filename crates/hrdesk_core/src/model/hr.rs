//! HR entities and their table descriptors.
//!
//! # Invariants
//! - Descriptors mirror `db/migrations/0001_hr_schema.sql`.
//! - Dependency order for seeding: roles, departments, employees, then
//!   attendance and leave_requests.

use crate::error::{DataError, DataResult};
use crate::model::catalog::Catalog;
use crate::model::descriptor::{ColumnDef, ScalarType, TableDescriptor};
use crate::model::entity::{
    optional_f64, optional_i64, optional_text, required_i64, required_text, Entity,
};
use crate::model::record::Record;
use once_cell::sync::Lazy;

pub const ROLES: &str = "roles";
pub const DEPARTMENTS: &str = "departments";
pub const EMPLOYEES: &str = "employees";
pub const ATTENDANCE: &str = "attendance";
pub const LEAVE_REQUESTS: &str = "leave_requests";

static ROLES_TABLE: Lazy<TableDescriptor> = Lazy::new(|| {
    TableDescriptor::builder(ROLES)
        .column(ColumnDef::new("id", ScalarType::Integer).auto_increment())
        .column(ColumnDef::new("name", ScalarType::Text))
        .column(ColumnDef::new("description", ScalarType::Text).nullable())
        .primary_key(["id"])
        .build()
        .expect("valid roles descriptor")
});

static DEPARTMENTS_TABLE: Lazy<TableDescriptor> = Lazy::new(|| {
    TableDescriptor::builder(DEPARTMENTS)
        .column(ColumnDef::new("id", ScalarType::Integer).auto_increment())
        .column(ColumnDef::new("name", ScalarType::Text))
        .column(ColumnDef::new("location", ScalarType::Text).nullable())
        .primary_key(["id"])
        .build()
        .expect("valid departments descriptor")
});

static EMPLOYEES_TABLE: Lazy<TableDescriptor> = Lazy::new(|| {
    TableDescriptor::builder(EMPLOYEES)
        .column(ColumnDef::new("id", ScalarType::Integer).auto_increment())
        .column(ColumnDef::new("name", ScalarType::Text))
        .column(ColumnDef::new("email", ScalarType::Text).nullable())
        .column(ColumnDef::new("phone", ScalarType::Text).nullable())
        .column(ColumnDef::new("hire_date", ScalarType::Date).nullable())
        .column(ColumnDef::new("salary", ScalarType::Real).nullable())
        .column(ColumnDef::new("role_id", ScalarType::Integer))
        .column(ColumnDef::new("department_id", ScalarType::Integer))
        .primary_key(["id"])
        .foreign_key("role_id", ROLES, "id")
        .foreign_key("department_id", DEPARTMENTS, "id")
        .build()
        .expect("valid employees descriptor")
});

static ATTENDANCE_TABLE: Lazy<TableDescriptor> = Lazy::new(|| {
    TableDescriptor::builder(ATTENDANCE)
        .column(ColumnDef::new("id", ScalarType::Integer).auto_increment())
        .column(ColumnDef::new("employee_id", ScalarType::Integer))
        .column(ColumnDef::new("date", ScalarType::Date))
        .column(ColumnDef::new("status", ScalarType::Text).default_value("present"))
        .column(ColumnDef::new("check_in", ScalarType::Text).nullable())
        .column(ColumnDef::new("check_out", ScalarType::Text).nullable())
        .primary_key(["id"])
        .foreign_key("employee_id", EMPLOYEES, "id")
        .build()
        .expect("valid attendance descriptor")
});

static LEAVE_REQUESTS_TABLE: Lazy<TableDescriptor> = Lazy::new(|| {
    TableDescriptor::builder(LEAVE_REQUESTS)
        .column(ColumnDef::new("id", ScalarType::Integer).auto_increment())
        .column(ColumnDef::new("employee_id", ScalarType::Integer))
        .column(ColumnDef::new("start_date", ScalarType::Date))
        .column(ColumnDef::new("end_date", ScalarType::Date))
        .column(ColumnDef::new("reason", ScalarType::Text).nullable())
        .column(ColumnDef::new("status", ScalarType::Text).default_value("pending"))
        .primary_key(["id"])
        .foreign_key("employee_id", EMPLOYEES, "id")
        .build()
        .expect("valid leave_requests descriptor")
});

/// Catalog holding every HR table.
pub fn hr_catalog() -> Catalog {
    let mut catalog = Catalog::new();
    for descriptor in [
        &*ROLES_TABLE,
        &*DEPARTMENTS_TABLE,
        &*EMPLOYEES_TABLE,
        &*ATTENDANCE_TABLE,
        &*LEAVE_REQUESTS_TABLE,
    ] {
        catalog
            .register(descriptor.clone())
            .expect("distinct hr table names");
    }
    catalog
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    pub id: Option<i64>,
    pub name: String,
    pub description: Option<String>,
}

impl Role {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: None,
        }
    }
}

impl Entity for Role {
    fn descriptor() -> &'static TableDescriptor {
        &ROLES_TABLE
    }

    fn to_record(&self) -> Record {
        with_id(self.id)
            .with("name", self.name.as_str())
            .with("description", self.description.clone())
    }

    fn from_record(record: &Record) -> DataResult<Self> {
        Ok(Self {
            id: optional_i64(record, "id")?,
            name: required_text(record, "name")?,
            description: optional_text(record, "description")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Department {
    pub id: Option<i64>,
    pub name: String,
    pub location: Option<String>,
}

impl Department {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            location: None,
        }
    }
}

impl Entity for Department {
    fn descriptor() -> &'static TableDescriptor {
        &DEPARTMENTS_TABLE
    }

    fn to_record(&self) -> Record {
        with_id(self.id)
            .with("name", self.name.as_str())
            .with("location", self.location.clone())
    }

    fn from_record(record: &Record) -> DataResult<Self> {
        Ok(Self {
            id: optional_i64(record, "id")?,
            name: required_text(record, "name")?,
            location: optional_text(record, "location")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Employee {
    pub id: Option<i64>,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// ISO `YYYY-MM-DD`.
    pub hire_date: Option<String>,
    pub salary: Option<f64>,
    pub role_id: i64,
    pub department_id: i64,
}

impl Employee {
    pub fn new(name: impl Into<String>, role_id: i64, department_id: i64) -> Self {
        Self {
            id: None,
            name: name.into(),
            email: None,
            phone: None,
            hire_date: None,
            salary: None,
            role_id,
            department_id,
        }
    }
}

impl Entity for Employee {
    fn descriptor() -> &'static TableDescriptor {
        &EMPLOYEES_TABLE
    }

    fn to_record(&self) -> Record {
        with_id(self.id)
            .with("name", self.name.as_str())
            .with("email", self.email.clone())
            .with("phone", self.phone.clone())
            .with("hire_date", self.hire_date.clone())
            .with("salary", self.salary)
            .with("role_id", self.role_id)
            .with("department_id", self.department_id)
    }

    fn from_record(record: &Record) -> DataResult<Self> {
        Ok(Self {
            id: optional_i64(record, "id")?,
            name: required_text(record, "name")?,
            email: optional_text(record, "email")?,
            phone: optional_text(record, "phone")?,
            hire_date: optional_text(record, "hire_date")?,
            salary: optional_f64(record, "salary")?,
            role_id: required_i64(record, "role_id")?,
            department_id: required_i64(record, "department_id")?,
        })
    }
}

/// Attendance mark for one employee-day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
    Remote,
}

impl AttendanceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Absent => "absent",
            Self::Late => "late",
            Self::Remote => "remote",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "present" => Some(Self::Present),
            "absent" => Some(Self::Absent),
            "late" => Some(Self::Late),
            "remote" => Some(Self::Remote),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attendance {
    pub id: Option<i64>,
    pub employee_id: i64,
    pub date: String,
    pub status: AttendanceStatus,
    pub check_in: Option<String>,
    pub check_out: Option<String>,
}

impl Entity for Attendance {
    fn descriptor() -> &'static TableDescriptor {
        &ATTENDANCE_TABLE
    }

    fn to_record(&self) -> Record {
        with_id(self.id)
            .with("employee_id", self.employee_id)
            .with("date", self.date.as_str())
            .with("status", self.status.as_str())
            .with("check_in", self.check_in.clone())
            .with("check_out", self.check_out.clone())
    }

    fn from_record(record: &Record) -> DataResult<Self> {
        let status_text = required_text(record, "status")?;
        let status = AttendanceStatus::parse(&status_text).ok_or_else(|| {
            DataError::InvalidRecord(format!("invalid attendance status `{status_text}`"))
        })?;
        Ok(Self {
            id: optional_i64(record, "id")?,
            employee_id: required_i64(record, "employee_id")?,
            date: required_text(record, "date")?,
            status,
            check_in: optional_text(record, "check_in")?,
            check_out: optional_text(record, "check_out")?,
        })
    }
}

/// Leave request workflow state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
}

impl LeaveStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaveRequest {
    pub id: Option<i64>,
    pub employee_id: i64,
    pub start_date: String,
    pub end_date: String,
    pub reason: Option<String>,
    pub status: LeaveStatus,
}

impl Entity for LeaveRequest {
    fn descriptor() -> &'static TableDescriptor {
        &LEAVE_REQUESTS_TABLE
    }

    fn to_record(&self) -> Record {
        with_id(self.id)
            .with("employee_id", self.employee_id)
            .with("start_date", self.start_date.as_str())
            .with("end_date", self.end_date.as_str())
            .with("reason", self.reason.clone())
            .with("status", self.status.as_str())
    }

    fn from_record(record: &Record) -> DataResult<Self> {
        let status_text = required_text(record, "status")?;
        let status = LeaveStatus::parse(&status_text).ok_or_else(|| {
            DataError::InvalidRecord(format!("invalid leave status `{status_text}`"))
        })?;
        Ok(Self {
            id: optional_i64(record, "id")?,
            employee_id: required_i64(record, "employee_id")?,
            start_date: required_text(record, "start_date")?,
            end_date: required_text(record, "end_date")?,
            reason: optional_text(record, "reason")?,
            status,
        })
    }
}

fn with_id(id: Option<i64>) -> Record {
    match id {
        Some(id) => Record::new().with("id", id),
        None => Record::new(),
    }
}
