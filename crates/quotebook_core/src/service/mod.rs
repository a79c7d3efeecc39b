//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into quote-level APIs.
//! - Keep the CLI presentation layer decoupled from storage details.

pub mod quote_store;
