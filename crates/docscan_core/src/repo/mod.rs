//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the key-value contract used by host-owned settings.
//! - Isolate SQLite query details from the vocabulary logic.

pub mod kv_repo;
