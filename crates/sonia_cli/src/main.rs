//! Console entry point.
//!
//! # Responsibility
//! - Read settings, start logging and open the configured backend.
//! - Run the console over stdin/stdout until `quit` or end of input.

use log::{error, info};
use sonia_core::db::{open_db, reset_objects};
use sonia_core::{
    init_logging, log_session_start, Console, FileObjectStore, ObjectService, ObjectStore,
    PromptMode, Settings, SqliteObjectStore, StorageMode,
};
use std::error::Error;
use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_exit module=cli status=error error={err}");
            eprintln!("sonia: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let settings = Settings::from_env()?;

    // The console still works without file logs.
    if let Err(err) = init_logging(settings.log_level, &settings.log_dir) {
        eprintln!("sonia: logging disabled: {err}");
    }
    info!(
        "event=cli_start module=cli status=ok version={}",
        sonia_core::core_version()
    );
    log_session_start(&settings);

    match settings.storage {
        StorageMode::File => {
            let store = FileObjectStore::open(settings.file_path.clone())?;
            run_console(store, settings.storage)
        }
        StorageMode::Db => {
            let conn = open_db(&settings.db_path)?;
            if settings.reset_on_start {
                reset_objects(&conn)?;
            }
            run_console(SqliteObjectStore::new(&conn), settings.storage)
        }
    }
}

fn run_console<S: ObjectStore>(store: S, mode: StorageMode) -> Result<(), Box<dyn Error>> {
    let service = ObjectService::new(store, mode);
    let mut console = Console::with_prompt_mode(service, io::stdout().lock(), PromptMode::detect());
    console.run(io::stdin().lock())?;
    Ok(())
}
