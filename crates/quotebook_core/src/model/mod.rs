//! Domain model for the quote collection.
//!
//! # Responsibility
//! - Define the quote record shared by storage, store and sync layers.
//!
//! # Invariants
//! - A collection is an ordered `Vec`; insertion order is the display order.

pub mod quote;
