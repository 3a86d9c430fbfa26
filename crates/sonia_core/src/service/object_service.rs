//! Object use-case service.
//!
//! # Responsibility
//! - Provide create/save/lookup/destroy entry points for the console.
//! - Apply the backend mode's object-construction policy on create.
//!
//! # Invariants
//! - Every mutation is followed by a store `save()`.
//! - Service layer remains storage-agnostic.

use crate::config::StorageMode;
use crate::model::object::{
    format_timestamp, is_reserved, now, AttrValue, ClassName, DomainObject, ObjectKey,
};
use crate::store::{ObjectStore, StoreResult};
use log::{debug, info};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Use-case service wrapper for domain object operations.
pub struct ObjectService<S: ObjectStore> {
    store: S,
    mode: StorageMode,
}

impl<S: ObjectStore> ObjectService<S> {
    /// Creates a service over `store` using the construction policy of `mode`.
    pub fn new(store: S, mode: StorageMode) -> Self {
        Self { store, mode }
    }

    pub fn mode(&self) -> StorageMode {
        self.mode
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Constructs, registers and persists a new object.
    ///
    /// # Contract
    /// - `Db` mode: missing `id`/`created_at`/`updated_at` are synthesized and
    ///   the object is built from the full mapping, so caller-supplied
    ///   metadata wins.
    /// - `File` mode: a fresh object is built and every non-reserved
    ///   attribute is assigned onto it; reserved names are dropped.
    pub fn create(
        &mut self,
        class: ClassName,
        attributes: BTreeMap<String, AttrValue>,
    ) -> StoreResult<DomainObject> {
        let object = match self.mode {
            StorageMode::Db => {
                let mut attributes = attributes;
                let stamp = format_timestamp(&now());
                attributes
                    .entry("id".to_string())
                    .or_insert_with(|| AttrValue::Text(Uuid::new_v4().to_string()));
                attributes
                    .entry("created_at".to_string())
                    .or_insert_with(|| AttrValue::Text(stamp.clone()));
                attributes
                    .entry("updated_at".to_string())
                    .or_insert_with(|| AttrValue::Text(stamp));
                DomainObject::from_attributes(class, attributes)
            }
            StorageMode::File => {
                let mut object = DomainObject::new(class);
                for (name, value) in attributes {
                    if is_reserved(&name) {
                        debug!(
                            "event=create_attr_skip module=service status=ok class={} name={}",
                            class, name
                        );
                        continue;
                    }
                    object.set_attribute(name, value);
                }
                object
            }
        };

        self.store.put(&object)?;
        self.store.save()?;
        info!(
            "event=object_create module=service status=ok mode={} key={}",
            self.mode,
            object.key()
        );
        Ok(object)
    }

    /// Refreshes `updated_at`, writes the object back and flushes the store.
    pub fn save(&mut self, object: &mut DomainObject) -> StoreResult<()> {
        object.touch();
        self.store.put(object)?;
        self.store.save()
    }

    pub fn get(&self, key: &ObjectKey) -> StoreResult<Option<DomainObject>> {
        self.store.get(key)
    }

    /// Returns every stored object, optionally restricted to one class.
    pub fn all(&self, class: Option<ClassName>) -> StoreResult<BTreeMap<ObjectKey, DomainObject>> {
        self.store.all(class)
    }

    pub fn count(&self, class: ClassName) -> StoreResult<usize> {
        self.store.count(class)
    }

    /// Removes the object under `key`.
    ///
    /// Returns `false` without touching the store when the key is absent.
    pub fn destroy(&mut self, key: &ObjectKey) -> StoreResult<bool> {
        if !self.store.delete(key)? {
            return Ok(false);
        }
        self.store.save()?;
        info!(
            "event=object_destroy module=service status=ok key={}",
            key
        );
        Ok(true)
    }
}
