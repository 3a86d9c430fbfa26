//! SQLite object store.
//!
//! # Responsibility
//! - Persist objects as rows of the `objects` table.
//! - Keep SQL details inside the storage boundary.
//!
//! # Invariants
//! - Every statement autocommits, so `save()` has nothing left to flush.
//! - Read paths reject invalid persisted rows instead of masking them.

use super::object_store::{ObjectStore, StoreError, StoreResult};
use crate::model::object::{
    format_timestamp, parse_timestamp, AttrValue, ClassName, DomainObject, ObjectKey,
};
use rusqlite::{params, Connection, Row};
use std::collections::BTreeMap;

const OBJECT_SELECT_SQL: &str = "SELECT
    class,
    id,
    created_at,
    updated_at,
    attributes
FROM objects";

/// SQLite-backed object store.
pub struct SqliteObjectStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteObjectStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ObjectStore for SqliteObjectStore<'_> {
    fn all(&self, class: Option<ClassName>) -> StoreResult<BTreeMap<ObjectKey, DomainObject>> {
        let mut objects = BTreeMap::new();
        match class {
            Some(class) => {
                let mut stmt = self
                    .conn
                    .prepare(&format!("{OBJECT_SELECT_SQL} WHERE class = ?1;"))?;
                let mut rows = stmt.query([class.as_str()])?;
                while let Some(row) = rows.next()? {
                    let object = parse_object_row(row)?;
                    objects.insert(object.key(), object);
                }
            }
            None => {
                let mut stmt = self.conn.prepare(&format!("{OBJECT_SELECT_SQL};"))?;
                let mut rows = stmt.query([])?;
                while let Some(row) = rows.next()? {
                    let object = parse_object_row(row)?;
                    objects.insert(object.key(), object);
                }
            }
        }
        Ok(objects)
    }

    fn get(&self, key: &ObjectKey) -> StoreResult<Option<DomainObject>> {
        let mut stmt = self.conn.prepare(&format!(
            "{OBJECT_SELECT_SQL}
             WHERE class = ?1
               AND id = ?2;"
        ))?;

        let mut rows = stmt.query(params![key.class.as_str(), key.id.as_str()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_object_row(row)?));
        }

        Ok(None)
    }

    fn put(&mut self, object: &DomainObject) -> StoreResult<()> {
        let attributes = serde_json::to_string(&object.attributes)?;
        self.conn.execute(
            "INSERT INTO objects (
                class,
                id,
                created_at,
                updated_at,
                attributes
            ) VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT (class, id) DO UPDATE SET
                created_at = excluded.created_at,
                updated_at = excluded.updated_at,
                attributes = excluded.attributes;",
            params![
                object.class.as_str(),
                object.id.as_str(),
                format_timestamp(&object.created_at),
                format_timestamp(&object.updated_at),
                attributes,
            ],
        )?;
        Ok(())
    }

    fn delete(&mut self, key: &ObjectKey) -> StoreResult<bool> {
        let changed = self.conn.execute(
            "DELETE FROM objects WHERE class = ?1 AND id = ?2;",
            params![key.class.as_str(), key.id.as_str()],
        )?;
        Ok(changed > 0)
    }

    fn count(&self, class: ClassName) -> StoreResult<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM objects WHERE class = ?1;",
            [class.as_str()],
            |row| row.get(0),
        )?;
        usize::try_from(count)
            .map_err(|_| StoreError::InvalidData(format!("negative object count `{count}`")))
    }

    fn save(&mut self) -> StoreResult<()> {
        Ok(())
    }
}

fn parse_object_row(row: &Row<'_>) -> StoreResult<DomainObject> {
    let class_text: String = row.get("class")?;
    let class = class_text.parse::<ClassName>().map_err(|_| {
        StoreError::InvalidData(format!("invalid class `{class_text}` in objects.class"))
    })?;

    let created_at_text: String = row.get("created_at")?;
    let created_at = parse_timestamp(&created_at_text).ok_or_else(|| {
        StoreError::InvalidData(format!(
            "invalid timestamp `{created_at_text}` in objects.created_at"
        ))
    })?;

    let updated_at_text: String = row.get("updated_at")?;
    let updated_at = parse_timestamp(&updated_at_text).ok_or_else(|| {
        StoreError::InvalidData(format!(
            "invalid timestamp `{updated_at_text}` in objects.updated_at"
        ))
    })?;

    let attributes_text: String = row.get("attributes")?;
    let attributes: BTreeMap<String, AttrValue> = serde_json::from_str(&attributes_text)
        .map_err(|err| {
            StoreError::InvalidData(format!("invalid attributes in objects.attributes: {err}"))
        })?;

    Ok(DomainObject {
        class,
        id: row.get("id")?,
        created_at,
        updated_at,
        attributes,
    })
}
