//! Object store contract and storage errors.

use crate::db::DbError;
use crate::model::object::{ClassName, DomainObject, ObjectKey};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage-layer error shared by all backends.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    Io(std::io::Error),
    Json(serde_json::Error),
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "{err}"),
            Self::Json(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid stored object data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<std::io::Error> for StoreError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Keyed object storage used by the console.
pub trait ObjectStore {
    /// Returns every stored object, or only those of `class`, in key order.
    fn all(&self, class: Option<ClassName>) -> StoreResult<BTreeMap<ObjectKey, DomainObject>>;
    fn get(&self, key: &ObjectKey) -> StoreResult<Option<DomainObject>>;
    /// Registers a new object or replaces the stored copy with the same key.
    fn put(&mut self, object: &DomainObject) -> StoreResult<()>;
    /// Removes `key`. Returns `false` when nothing was stored under it.
    fn delete(&mut self, key: &ObjectKey) -> StoreResult<bool>;
    fn count(&self, class: ClassName) -> StoreResult<usize>;
    /// Flushes pending changes to durable storage.
    fn save(&mut self) -> StoreResult<()>;
}
