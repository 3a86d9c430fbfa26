//! Domain model for console-managed objects.
//!
//! # Responsibility
//! - Define the fixed class registry and the typed attribute values.
//! - Provide the object shape shared by every storage backend.
//!
//! # Invariants
//! - Every stored object is addressed by an `ObjectKey` (`Class.id`).
//! - Reserved names (`id`, `created_at`, `updated_at`, `__class__`) never
//!   appear in the free-form attribute set.

pub mod object;
