//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store calls into object-level operations.
//! - Keep the console decoupled from backend details.

pub mod object_service;

pub use object_service::ObjectService;
