//! JSON-file object store.
//!
//! # Responsibility
//! - Keep all objects in memory, keyed by `Class.id`.
//! - Serialize the full object map to one JSON document on `save()`.
//!
//! # Invariants
//! - A missing file is an empty store; a malformed file is an error.
//! - The map key always equals the key derived from the stored object.

use super::object_store::{ObjectStore, StoreError, StoreResult};
use crate::model::object::{ClassName, DomainObject, ObjectKey};
use log::{info, warn};
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::PathBuf;

/// File-backed store holding every object in memory between saves.
#[derive(Debug)]
pub struct FileObjectStore {
    path: PathBuf,
    objects: BTreeMap<ObjectKey, DomainObject>,
}

impl FileObjectStore {
    /// Opens the store at `path`, loading any previously saved objects.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let mut store = Self {
            path: path.into(),
            objects: BTreeMap::new(),
        };
        store.reload()?;
        Ok(store)
    }

    /// Replaces the in-memory map with the file contents.
    pub fn reload(&mut self) -> StoreResult<()> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    "event=store_reload module=store status=ok backend=file objects=0 path={}",
                    self.path.display()
                );
                self.objects.clear();
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        };

        let decoded: BTreeMap<String, DomainObject> = serde_json::from_str(&text)?;
        let mut objects = BTreeMap::new();
        for (stored_key, object) in decoded {
            let key = object.key();
            if stored_key != key.to_string() {
                return Err(StoreError::InvalidData(format!(
                    "key `{stored_key}` does not match object `{key}`"
                )));
            }
            objects.insert(key, object);
        }
        self.objects = objects;

        info!(
            "event=store_reload module=store status=ok backend=file objects={} path={}",
            self.objects.len(),
            self.path.display()
        );
        Ok(())
    }
}

impl ObjectStore for FileObjectStore {
    fn all(&self, class: Option<ClassName>) -> StoreResult<BTreeMap<ObjectKey, DomainObject>> {
        Ok(self
            .objects
            .iter()
            .filter(|(key, _)| class.map_or(true, |class| key.class == class))
            .map(|(key, object)| (key.clone(), object.clone()))
            .collect())
    }

    fn get(&self, key: &ObjectKey) -> StoreResult<Option<DomainObject>> {
        Ok(self.objects.get(key).cloned())
    }

    fn put(&mut self, object: &DomainObject) -> StoreResult<()> {
        self.objects.insert(object.key(), object.clone());
        Ok(())
    }

    fn delete(&mut self, key: &ObjectKey) -> StoreResult<bool> {
        Ok(self.objects.remove(key).is_some())
    }

    fn count(&self, class: ClassName) -> StoreResult<usize> {
        Ok(self.objects.keys().filter(|key| key.class == class).count())
    }

    fn save(&mut self) -> StoreResult<()> {
        let encoded: BTreeMap<String, &DomainObject> = self
            .objects
            .iter()
            .map(|(key, object)| (key.to_string(), object))
            .collect();
        let text = serde_json::to_string(&encoded)?;

        if let Err(err) = std::fs::write(&self.path, text) {
            warn!(
                "event=store_save module=store status=error backend=file path={} error={}",
                self.path.display(),
                err
            );
            return Err(err.into());
        }

        info!(
            "event=store_save module=store status=ok backend=file objects={}",
            self.objects.len()
        );
        Ok(())
    }
}
