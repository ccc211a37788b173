//! Seed launcher for an HR desk database.
//!
//! Usage: `hrdesk_cli <db-path> [seed.json]`
//!
//! Opens (and migrates) the database, loads the given seed file or the
//! embedded baseline, and prints one line per unit. Set `HRDESK_LOG_DIR`
//! (absolute) to enable file logging.

use hrdesk_core::{
    baseline_units, core_version, hr_catalog, init_logging, parse_seed_units, LogConfig,
    SeedLoader, SeedUnit, SqliteStore,
};
use log::info;
use std::path::PathBuf;
use std::process::ExitCode;

const LOG_DIR_ENV: &str = "HRDESK_LOG_DIR";
const LOG_LEVEL_ENV: &str = "HRDESK_LOG_LEVEL";

fn main() -> ExitCode {
    let mut args = std::env::args_os().skip(1);
    let Some(db_path) = args.next().map(PathBuf::from) else {
        eprintln!("usage: hrdesk_cli <db-path> [seed.json]");
        return ExitCode::from(2);
    };
    let seed_path = args.next().map(PathBuf::from);

    match run(db_path, seed_path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("hrdesk_cli: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(db_path: PathBuf, seed_path: Option<PathBuf>) -> Result<(), String> {
    if let Some(log_dir) = std::env::var_os(LOG_DIR_ENV) {
        let mut config = LogConfig::new(log_dir);
        if let Ok(level) = std::env::var(LOG_LEVEL_ENV) {
            config = config.with_level(level);
        }
        init_logging(&config)?;
    }

    let units = load_units(seed_path.as_ref())?;
    let store = SqliteStore::open(&db_path)
        .map_err(|err| format!("cannot open `{}`: {err}", db_path.display()))?;

    let catalog = hr_catalog();
    let report = SeedLoader::new(&catalog)
        .load(&store, &units)
        .map_err(|err| format!("seed failed: {err}"))?;
    info!(
        "event=cli_seed module=cli status=ok db={} inserted={} skipped={}",
        db_path.display(),
        report.total_inserted(),
        report.total_skipped()
    );

    println!("hrdesk_core version={}", core_version());
    for unit in &report.units {
        println!(
            "table={} inserted={} skipped_existing={} skipped_duplicates={} drifted={}",
            unit.table,
            unit.inserted,
            unit.skipped_existing,
            unit.skipped_duplicates.len(),
            unit.drifted
        );
    }

    store
        .close()
        .map_err(|err| format!("cannot close `{}`: {err}", db_path.display()))
}

fn load_units(seed_path: Option<&PathBuf>) -> Result<Vec<SeedUnit>, String> {
    match seed_path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .map_err(|err| format!("cannot read `{}`: {err}", path.display()))?;
            parse_seed_units(&json).map_err(|err| format!("`{}`: {err}", path.display()))
        }
        None => baseline_units().map_err(|err| format!("embedded baseline: {err}")),
    }
}
