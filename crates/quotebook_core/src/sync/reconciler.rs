//! Fetch-merge-persist reconciliation cycle.
//!
//! # Responsibility
//! - Run one reconciliation cycle against a `RemoteSource`.
//! - Forward newly added local quotes to the remote endpoint.
//!
//! # Invariants
//! - Network I/O never runs while the shared store lock is held.
//! - A failed fetch leaves the store untouched.

use crate::model::quote::QuoteRecord;
use crate::repo::kv_repo::KeyValueRepository;
use crate::service::quote_store::{QuoteStore, StoreError};
use crate::sync::remote::{NetworkError, RemoteSource};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Mutex;

pub type SyncResult<T> = Result<T, SyncError>;

/// Failure of one reconciliation cycle.
#[derive(Debug)]
pub enum SyncError {
    Network(NetworkError),
    Store(StoreError),
    /// The shared store lock was poisoned by a panicking holder.
    StoreUnavailable,
}

impl Display for SyncError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Network(err) => write!(f, "sync network error: {err}"),
            Self::Store(err) => write!(f, "sync store error: {err}"),
            Self::StoreUnavailable => write!(f, "quote store lock is poisoned"),
        }
    }
}

impl Error for SyncError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Network(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::StoreUnavailable => None,
        }
    }
}

impl From<NetworkError> for SyncError {
    fn from(value: NetworkError) -> Self {
        Self::Network(value)
    }
}

impl From<StoreError> for SyncError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Counters for one completed cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Records returned by the remote endpoint.
    pub fetched: usize,
    /// Remote records appended locally.
    pub appended: usize,
    /// Local records overwritten by the server copy.
    pub conflicts: usize,
}

impl SyncReport {
    /// Human-readable notification text for the presentation layer.
    pub fn notification(&self) -> String {
        if self.conflicts > 0 {
            format!(
                "Quotes synced with server: {} new, {} local quotes replaced by the server copy.",
                self.appended, self.conflicts
            )
        } else {
            format!("Quotes synced with server: {} new.", self.appended)
        }
    }
}

/// Reconciles a quote store with one remote source.
pub struct Reconciler<S: RemoteSource> {
    source: S,
}

impl<S: RemoteSource> Reconciler<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Runs one cycle on an exclusively borrowed store.
    pub fn sync_once<R: KeyValueRepository>(
        &self,
        store: &mut QuoteStore<R>,
    ) -> SyncResult<SyncReport> {
        let remote = self.fetch()?;
        let fetched = remote.len();
        let outcome = store.apply_remote(remote)?;
        Ok(self.finish(fetched, outcome.appended, outcome.conflicts))
    }

    /// Runs one cycle on a store shared with other threads.
    ///
    /// The fetch happens before the lock is taken; merge and persist happen
    /// under it.
    pub fn sync_shared<R: KeyValueRepository>(
        &self,
        store: &Mutex<QuoteStore<R>>,
    ) -> SyncResult<SyncReport> {
        let remote = self.fetch()?;
        let fetched = remote.len();
        let outcome = {
            let mut guard = store.lock().map_err(|_| SyncError::StoreUnavailable)?;
            guard.apply_remote(remote)?
        };
        Ok(self.finish(fetched, outcome.appended, outcome.conflicts))
    }

    /// Sends a newly added quote; failures are logged and returned.
    pub fn post_local(&self, quote: &QuoteRecord) -> Result<(), NetworkError> {
        self.source.post_local(quote).map_err(|err| {
            warn!("event=remote_post module=sync status=error error={err}");
            err
        })
    }

    fn fetch(&self) -> SyncResult<Vec<QuoteRecord>> {
        self.source.fetch_remote().map_err(|err| {
            warn!("event=sync_cycle module=sync status=error stage=fetch error={err}");
            SyncError::Network(err)
        })
    }

    fn finish(&self, fetched: usize, appended: usize, conflicts: usize) -> SyncReport {
        if conflicts > 0 {
            warn!(
                "event=sync_cycle module=sync status=conflict overwritten={conflicts} policy=server_wins"
            );
        }
        info!(
            "event=sync_cycle module=sync status=ok fetched={fetched} appended={appended} conflicts={conflicts}"
        );
        SyncReport {
            fetched,
            appended,
            conflicts,
        }
    }
}
