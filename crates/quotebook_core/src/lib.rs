//! Core logic for Quotebook: a local-first quote collection with periodic
//! server reconciliation.
//! This crate owns every data invariant; the CLI only presents results.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod sync;

pub use config::{ConfigError, QuotebookConfig, RemoteConfig};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::quote::{
    distinct_categories, filter_by_category, seed_quotes, QuoteRecord, QuoteValidationError,
    ALL_CATEGORIES,
};
pub use repo::kv_repo::{KeyValueRepository, RepoError, RepoResult, SqliteKvRepository};
pub use service::quote_store::{QuoteStore, StoreError, StoreResult};
pub use sync::merge::{merge, MergeOutcome};
pub use sync::reconciler::{Reconciler, SyncError, SyncReport, SyncResult};
pub use sync::remote::{HttpRemoteSource, NetworkError, RemoteSource};
pub use sync::scheduler::{SyncEvent, SyncScheduler, DEFAULT_SYNC_INTERVAL};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Opens the SQLite-backed store at `path`.
pub fn open_store(path: impl AsRef<std::path::Path>) -> StoreResult<QuoteStore<SqliteKvRepository>> {
    let conn = db::open_db(path).map_err(RepoError::from)?;
    QuoteStore::open(SqliteKvRepository::new(conn))
}
