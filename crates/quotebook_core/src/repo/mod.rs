//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the key/value storage contract the quote store persists through.
//! - Isolate SQLite query details from store/sync orchestration.
//!
//! # Invariants
//! - A successful `set` is visible to the next `get` on the same repository.

pub mod kv_repo;
