use hrdesk_core::engine;
use hrdesk_core::model::hr::ROLES;
use hrdesk_core::query::{build_insert, build_select};
use hrdesk_core::{hr_catalog, Predicate, Record, SqliteStore};
use log::{Level, LevelFilter, Log, Metadata};
use std::sync::Mutex;

struct CapturingLogger {
    lines: Mutex<Vec<(Level, String)>>,
}

impl Log for CapturingLogger {
    fn enabled(&self, _metadata: &Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &log::Record<'_>) {
        let message = record.args().to_string();
        if message.contains("module=engine") {
            self.lines
                .lock()
                .unwrap()
                .push((record.level(), message));
        }
    }

    fn flush(&self) {}
}

static LOGGER: CapturingLogger = CapturingLogger {
    lines: Mutex::new(Vec::new()),
};

fn take_lines() -> Vec<(Level, String)> {
    std::mem::take(&mut *LOGGER.lines.lock().unwrap())
}

// Single test: the logger is process-global.
#[test]
fn each_engine_call_emits_exactly_one_entry() {
    log::set_logger(&LOGGER).unwrap();
    log::set_max_level(LevelFilter::Trace);

    let store = SqliteStore::open_in_memory().unwrap();
    let catalog = hr_catalog();
    let roles = catalog.get(ROLES).unwrap();
    take_lines();

    let insert = build_insert(roles.name(), &Record::new().with("name", "Admin")).unwrap();
    engine::execute(&store, &insert).unwrap();
    let lines = take_lines();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].0, Level::Debug);
    assert!(lines[0].1.contains("event=db_execute"));
    assert!(lines[0].1.contains("table=roles"));
    assert!(lines[0].1.contains("status=ok"));

    let select = build_select(roles.name(), Some(&Predicate::AllRows), None);
    assert_eq!(engine::query(&store, &select).unwrap().len(), 1);
    let lines = take_lines();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].1.contains("event=db_query"));
    assert!(lines[0].1.contains("rows=1"));

    let err = engine::execute(&store, &insert).unwrap_err();
    assert_eq!(err.code(), "constraint_violation");
    let lines = take_lines();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].0, Level::Warn);
    assert!(lines[0].1.contains("status=error"));
    assert!(lines[0].1.contains("error_code=constraint_violation"));
}
