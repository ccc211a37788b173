use hrdesk_core::{
    baseline_units, hr_catalog, Attendance, AttendanceStatus, DataError, Employee, HrService,
    LeaveStatus, Record, SeedLoader, SqliteStore,
};

fn baseline_store() -> SqliteStore {
    let store = SqliteStore::open_in_memory().unwrap();
    let catalog = hr_catalog();
    SeedLoader::new(&catalog)
        .load(&store, &baseline_units().unwrap())
        .unwrap();
    store
}

#[test]
fn updating_missing_employee_affects_nothing() {
    let store = SqliteStore::open_in_memory().unwrap();
    let service = HrService::new(&store);

    let affected = service
        .update_employee(1, &Record::new().with("email", "a@x.com"))
        .unwrap();
    assert_eq!(affected, 0);
}

#[test]
fn hire_then_update_employee() {
    let store = baseline_store();
    let service = HrService::new(&store);

    let id = service.hire_employee(&Employee::new("A", 3, 1)).unwrap();
    let affected = service
        .update_employee(id, &Record::new().with("email", "a@x.com"))
        .unwrap();
    assert_eq!(affected, 1);

    let loaded = service.get_employee(id).unwrap().unwrap();
    assert_eq!(loaded.email.as_deref(), Some("a@x.com"));
    assert_eq!(service.list_roles().unwrap().len(), 3);
}

#[test]
fn transfer_moves_every_member_of_a_department() {
    let store = baseline_store();
    let service = HrService::new(&store);
    for name in ["A", "B"] {
        service.hire_employee(&Employee::new(name, 3, 1)).unwrap();
    }
    service.hire_employee(&Employee::new("C", 3, 2)).unwrap();

    assert_eq!(service.transfer_department(1, 3).unwrap(), 2);
    assert!(service.employees_in_department(1).unwrap().is_empty());
    assert_eq!(service.employees_in_department(3).unwrap().len(), 2);
}

#[test]
fn leave_request_is_decided_once() {
    let store = baseline_store();
    let service = HrService::new(&store);
    let employee = service.hire_employee(&Employee::new("A", 3, 1)).unwrap();

    let request = service
        .submit_leave_request(employee, "2024-05-01", "2024-05-03", Some("trip".to_string()))
        .unwrap();
    assert_eq!(
        service
            .decide_leave_request(request, LeaveStatus::Approved)
            .unwrap(),
        1
    );

    let again = service
        .decide_leave_request(request, LeaveStatus::Rejected)
        .unwrap_err();
    assert!(matches!(again, DataError::InvalidRecord(_)));
    assert_eq!(
        service.decide_leave_request(999, LeaveStatus::Approved).unwrap(),
        0
    );

    let stored = service.leave_requests_for(employee).unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].status, LeaveStatus::Approved);
    assert_eq!(stored[0].start_date, "2024-05-01");
}

#[test]
fn leave_request_ending_before_it_starts_is_refused() {
    let store = baseline_store();
    let service = HrService::new(&store);
    let employee = service.hire_employee(&Employee::new("A", 3, 1)).unwrap();

    let err = service
        .submit_leave_request(employee, "2024-05-03", "2024-05-01", None)
        .unwrap_err();
    assert!(matches!(err, DataError::ConstraintViolation { .. }));
}

#[test]
fn offboarding_removes_history_atomically() {
    let store = baseline_store();
    let service = HrService::new(&store);
    let employee = service.hire_employee(&Employee::new("A", 3, 1)).unwrap();
    service
        .record_attendance(&Attendance {
            id: None,
            employee_id: employee,
            date: "2024-05-02".to_string(),
            status: AttendanceStatus::Remote,
            check_in: Some("09:00".to_string()),
            check_out: None,
        })
        .unwrap();
    service
        .submit_leave_request(employee, "2024-06-01", "2024-06-02", None)
        .unwrap();

    let attendance = service.attendance_for(employee).unwrap();
    assert_eq!(attendance[0].status, AttendanceStatus::Remote);

    assert_eq!(service.offboard_employee(employee).unwrap(), 1);
    assert!(service.get_employee(employee).unwrap().is_none());
    assert!(service.attendance_for(employee).unwrap().is_empty());
    assert!(service.leave_requests_for(employee).unwrap().is_empty());
}
