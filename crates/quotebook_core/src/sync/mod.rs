//! Reconciliation of the local collection with a remote endpoint.
//!
//! # Responsibility
//! - Fetch remote records and merge them with the server-wins rule.
//! - Post newly added quotes.
//! - Trigger reconciliation periodically.
//!
//! # Invariants
//! - Network calls are single-attempt.
//! - Failures are reported, never retried.

pub mod merge;
pub mod reconciler;
pub mod remote;
pub mod scheduler;
