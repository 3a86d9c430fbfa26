//! Storage facade and its interchangeable backends.
//!
//! # Responsibility
//! - Define the keyed object store contract used by the console.
//! - Provide a JSON-file backend and a SQLite backend.
//!
//! # Invariants
//! - Every backend keys objects by `ObjectKey` and returns them in key order.
//! - `delete` on an absent key leaves the store unmodified.

pub mod file_store;
pub mod object_store;
pub mod sqlite_store;

pub use file_store::FileObjectStore;
pub use object_store::{ObjectStore, StoreError, StoreResult};
pub use sqlite_store::SqliteObjectStore;
