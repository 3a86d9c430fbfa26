//! Core domain logic for the HBNB object console.
//! This crate is the single source of truth for command semantics.

pub mod command;
pub mod config;
pub mod console;
pub mod db;
pub mod logging;
pub mod model;
pub mod service;
pub mod store;

pub use command::{CommandError, Verb};
pub use config::{Settings, SettingsError, StorageMode};
pub use console::{Console, ConsoleError, Flow, PromptMode, PROMPT};
pub use logging::{default_log_level, init_logging, log_session_start, LoggingError};
pub use model::object::{AttrValue, ClassName, DomainObject, ObjectKey};
pub use service::ObjectService;
pub use store::{FileObjectStore, ObjectStore, SqliteObjectStore, StoreError, StoreResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
