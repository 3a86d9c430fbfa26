//! Runtime settings read from the process environment.
//!
//! # Responsibility
//! - Select the storage backend and its location.
//! - Resolve logging level and directory for the CLI entry point.
//!
//! # Invariants
//! - Unset variables fall back to fixed defaults; only malformed values error.
//! - Lookup is injectable so tests never mutate the real environment.

use crate::logging::{default_log_level, parse_level};
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// Selects the database backend when set to `db`.
pub const ENV_STORAGE_TYPE: &str = "HBNB_TYPE_STORAGE";
/// Wipes stored objects on startup when set to `test` (database backend only).
pub const ENV_MODE: &str = "HBNB_ENV";
pub const ENV_FILE_PATH: &str = "HBNB_FILE_PATH";
pub const ENV_DB_PATH: &str = "HBNB_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "HBNB_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "HBNB_LOG_DIR";

pub const DEFAULT_FILE_PATH: &str = "file.json";
pub const DEFAULT_DB_PATH: &str = "hbnb.sqlite3";
const DEFAULT_LOG_DIR_NAME: &str = "sonia-logs";

/// Which persistence backend the console runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageMode {
    /// Whole-map JSON document, rewritten on every save.
    #[default]
    File,
    /// SQLite database, one row per object.
    Db,
}

impl StorageMode {
    /// Maps the raw `HBNB_TYPE_STORAGE` value; anything but `db` is file mode.
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("db") => Self::Db,
            _ => Self::File,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Db => "db",
        }
    }
}

impl Display for StorageMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while reading settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    InvalidLogLevel(String),
    RelativeLogDir(PathBuf),
}

impl Display for SettingsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLogLevel(message) => write!(f, "invalid {ENV_LOG_LEVEL}: {message}"),
            Self::RelativeLogDir(path) => write!(
                f,
                "invalid {ENV_LOG_DIR}: `{}` is not an absolute path",
                path.display()
            ),
        }
    }
}

impl std::error::Error for SettingsError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub storage: StorageMode,
    /// True when `HBNB_ENV=test`.
    pub reset_on_start: bool,
    pub file_path: PathBuf,
    pub db_path: PathBuf,
    pub log_level: &'static str,
    pub log_dir: PathBuf,
}

impl Settings {
    /// Reads settings from the process environment.
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads settings through an arbitrary variable lookup.
    ///
    /// Empty values are treated the same as unset ones.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let storage = StorageMode::from_env_value(read(ENV_STORAGE_TYPE).as_deref());
        let reset_on_start = read(ENV_MODE).is_some_and(|value| value.trim() == "test");
        let file_path = read(ENV_FILE_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_FILE_PATH));
        let db_path = read(ENV_DB_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH));

        let log_level = match read(ENV_LOG_LEVEL) {
            Some(raw) => {
                parse_level(&raw).map_err(|err| SettingsError::InvalidLogLevel(err.to_string()))?
            }
            None => default_log_level(),
        };

        let log_dir = match read(ENV_LOG_DIR) {
            Some(raw) => {
                let path = PathBuf::from(raw.trim());
                if !path.is_absolute() {
                    return Err(SettingsError::RelativeLogDir(path));
                }
                path
            }
            None => std::env::temp_dir().join(DEFAULT_LOG_DIR_NAME),
        };

        Ok(Self {
            storage,
            reset_on_start,
            file_path,
            db_path,
            log_level,
            log_dir,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let settings = Settings::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(settings.storage, StorageMode::File);
        assert!(!settings.reset_on_start);
        assert_eq!(settings.file_path, PathBuf::from("file.json"));
        assert_eq!(settings.db_path, PathBuf::from("hbnb.sqlite3"));
        assert_eq!(settings.log_level, default_log_level());
        assert!(settings.log_dir.is_absolute());
        assert!(settings.log_dir.ends_with("sonia-logs"));
    }

    #[test]
    fn db_storage_and_test_env_are_recognized() {
        let settings = Settings::from_lookup(lookup_from(&[
            ("HBNB_TYPE_STORAGE", "db"),
            ("HBNB_ENV", "test"),
            ("HBNB_DB_PATH", "/tmp/hbnb_test.sqlite3"),
        ]))
        .unwrap();
        assert_eq!(settings.storage, StorageMode::Db);
        assert!(settings.reset_on_start);
        assert_eq!(settings.db_path, PathBuf::from("/tmp/hbnb_test.sqlite3"));
    }

    #[test]
    fn unrecognized_storage_value_falls_back_to_file() {
        let settings =
            Settings::from_lookup(lookup_from(&[("HBNB_TYPE_STORAGE", "mysql")])).unwrap();
        assert_eq!(settings.storage, StorageMode::File);

        let settings = Settings::from_lookup(lookup_from(&[("HBNB_TYPE_STORAGE", "")])).unwrap();
        assert_eq!(settings.storage, StorageMode::File);
    }

    #[test]
    fn log_level_is_normalized_and_validated() {
        let settings =
            Settings::from_lookup(lookup_from(&[("HBNB_LOG_LEVEL", "WARNING")])).unwrap();
        assert_eq!(settings.log_level, "warn");

        let error = Settings::from_lookup(lookup_from(&[("HBNB_LOG_LEVEL", "loud")]))
            .expect_err("unknown level must fail");
        assert!(matches!(error, SettingsError::InvalidLogLevel(_)));
    }

    #[test]
    fn relative_log_dir_is_rejected() {
        let error = Settings::from_lookup(lookup_from(&[("HBNB_LOG_DIR", "logs")]))
            .expect_err("relative dir must fail");
        assert_eq!(error, SettingsError::RelativeLogDir(PathBuf::from("logs")));
        assert!(error.to_string().contains("HBNB_LOG_DIR"));
    }
}
