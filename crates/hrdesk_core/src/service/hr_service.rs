//! HR use-case service.
//!
//! # Responsibility
//! - Provide employee, attendance and leave entry points for callers.
//! - Compose multi-step changes under one transaction scope.
//!
//! # Invariants
//! - Never builds SQL; all access goes through typed repositories.
//! - "No matching row" is reported as a zero count, not an error.

use crate::error::{DataError, DataResult};
use crate::model::hr::{Attendance, Department, Employee, LeaveRequest, LeaveStatus, Role};
use crate::model::predicate::Predicate;
use crate::model::record::Record;
use crate::model::value::Value;
use crate::repo::entity_repo::Repository;
use crate::store::StoreHandle;
use crate::tx::TransactionCoordinator;

/// Service facade over one store handle.
pub struct HrService<'s, S: StoreHandle + ?Sized> {
    store: &'s S,
    roles: Repository<Role>,
    departments: Repository<Department>,
    employees: Repository<Employee>,
    attendance: Repository<Attendance>,
    leave_requests: Repository<LeaveRequest>,
}

impl<'s, S: StoreHandle + ?Sized> HrService<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self {
            store,
            roles: Repository::new(),
            departments: Repository::new(),
            employees: Repository::new(),
            attendance: Repository::new(),
            leave_requests: Repository::new(),
        }
    }

    pub fn create_role(&self, role: &Role) -> DataResult<i64> {
        generated_id(self.roles.create(self.store, role)?)
    }

    pub fn list_roles(&self) -> DataResult<Vec<Role>> {
        self.roles.read_all(self.store)
    }

    pub fn create_department(&self, department: &Department) -> DataResult<i64> {
        generated_id(self.departments.create(self.store, department)?)
    }

    pub fn list_departments(&self) -> DataResult<Vec<Department>> {
        self.departments.read_all(self.store)
    }

    /// Inserts an employee and returns the generated id.
    pub fn hire_employee(&self, employee: &Employee) -> DataResult<i64> {
        generated_id(self.employees.create(self.store, employee)?)
    }

    pub fn get_employee(&self, id: i64) -> DataResult<Option<Employee>> {
        self.employees.get(self.store, id)
    }

    pub fn list_employees(&self) -> DataResult<Vec<Employee>> {
        self.employees.read_all(self.store)
    }

    pub fn employees_in_department(&self, department_id: i64) -> DataResult<Vec<Employee>> {
        self.employees
            .read_where(self.store, &Predicate::eq("department_id", department_id))
    }

    /// Patches one employee; returns 0 when `id` does not exist.
    pub fn update_employee(&self, id: i64, patch: &Record) -> DataResult<usize> {
        self.employees.update_by_id(self.store, id, patch)
    }

    /// Moves every employee of `from` into `to`.
    pub fn transfer_department(&self, from: i64, to: i64) -> DataResult<usize> {
        self.employees.update(
            self.store,
            &Record::new().with("department_id", to),
            Some(&Predicate::eq("department_id", from)),
        )
    }

    /// Removes an employee with their attendance and leave history, atomically.
    pub fn offboard_employee(&self, id: i64) -> DataResult<usize> {
        TransactionCoordinator::new(self.store).run_in_transaction(|scope| {
            let by_employee = Predicate::eq("employee_id", id);
            self.attendance.delete(scope.store(), Some(&by_employee))?;
            self.leave_requests.delete(scope.store(), Some(&by_employee))?;
            self.employees.delete_by_id(scope.store(), id)
        })
    }

    pub fn record_attendance(&self, attendance: &Attendance) -> DataResult<i64> {
        generated_id(self.attendance.create(self.store, attendance)?)
    }

    pub fn attendance_for(&self, employee_id: i64) -> DataResult<Vec<Attendance>> {
        self.attendance
            .read_where(self.store, &Predicate::eq("employee_id", employee_id))
    }

    /// Files a pending leave request.
    pub fn submit_leave_request(
        &self,
        employee_id: i64,
        start_date: &str,
        end_date: &str,
        reason: Option<String>,
    ) -> DataResult<i64> {
        let request = LeaveRequest {
            id: None,
            employee_id,
            start_date: start_date.to_string(),
            end_date: end_date.to_string(),
            reason,
            status: LeaveStatus::Pending,
        };
        generated_id(self.leave_requests.create(self.store, &request)?)
    }

    /// Approves or rejects a pending request.
    ///
    /// Returns 0 when the request does not exist; fails with
    /// `InvalidRecord` when it was already decided.
    pub fn decide_leave_request(&self, id: i64, decision: LeaveStatus) -> DataResult<usize> {
        if decision == LeaveStatus::Pending {
            return Err(DataError::InvalidRecord(
                "a leave decision must approve or reject".to_string(),
            ));
        }
        TransactionCoordinator::new(self.store).run_in_transaction(|scope| {
            let Some(request) = self.leave_requests.get(scope.store(), id)? else {
                return Ok(0);
            };
            if request.status != LeaveStatus::Pending {
                return Err(DataError::InvalidRecord(format!(
                    "leave request {id} is already {}",
                    request.status.as_str()
                )));
            }
            self.leave_requests.update_by_id(
                scope.store(),
                id,
                &Record::new().with("status", decision.as_str()),
            )
        })
    }

    pub fn leave_requests_for(&self, employee_id: i64) -> DataResult<Vec<LeaveRequest>> {
        self.leave_requests
            .read_where(self.store, &Predicate::eq("employee_id", employee_id))
    }
}

fn generated_id(key: Record) -> DataResult<i64> {
    key.get("id").and_then(Value::as_integer).ok_or_else(|| {
        DataError::InvalidRecord(format!("expected integer `id` key, got {key}"))
    })
}
