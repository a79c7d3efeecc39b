//! Quote store use-case service.
//!
//! # Responsibility
//! - Own the in-memory quote collection and the repository it persists to.
//! - Provide add/import/export/filter operations over that collection.
//! - Apply reconciled remote records through the merge rule.
//!
//! # Invariants
//! - Every mutation re-reads the persisted collection first, so records
//!   written by another handle on the same database are kept.
//! - After any mutating call returns, the persisted `quotes` value equals the
//!   in-memory collection. A failed persist restores the collection read at
//!   the start of the call.
//! - Unreadable persisted quotes are replaced by the seed set, never surfaced.
//! - The selected category defaults to `all`.

use crate::model::quote::{
    distinct_categories, filter_by_category, seed_quotes, QuoteRecord, QuoteValidationError,
    ALL_CATEGORIES,
};
use crate::repo::kv_repo::{KeyValueRepository, RepoError, QUOTES_KEY, SELECTED_CATEGORY_KEY};
use crate::sync::merge::{merge_into, MergeOutcome};
use log::{info, warn};
use rand::seq::IndexedRandom;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Store error for quote use-cases.
#[derive(Debug)]
pub enum StoreError {
    /// User input failed validation.
    Validation(QuoteValidationError),
    /// Import text is not a JSON array of quote records.
    Parse(serde_json::Error),
    /// The collection could not be serialized for persistence or export.
    Encode(serde_json::Error),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Parse(err) => write!(f, "invalid quotes JSON: {err}"),
            Self::Encode(err) => write!(f, "failed to encode quotes: {err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Parse(err) | Self::Encode(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<QuoteValidationError> for StoreError {
    fn from(value: QuoteValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Explicit owner of the quote collection.
pub struct QuoteStore<R: KeyValueRepository> {
    repo: R,
    quotes: Vec<QuoteRecord>,
}

impl<R: KeyValueRepository> QuoteStore<R> {
    /// Opens the store and hydrates the collection from `repo`.
    ///
    /// # Errors
    /// - Returns `StoreError::Repo` when the repository cannot be read.
    pub fn open(repo: R) -> StoreResult<Self> {
        let quotes = load_quotes(&repo)?;
        info!(
            "event=store_open module=store status=ok count={}",
            quotes.len()
        );
        Ok(Self { repo, quotes })
    }

    /// Reads the persisted collection, falling back to the seed set.
    pub fn load(&self) -> StoreResult<Vec<QuoteRecord>> {
        load_quotes(&self.repo)
    }

    /// Persists the full in-memory collection.
    pub fn save(&self) -> StoreResult<()> {
        let encoded = serde_json::to_string(&self.quotes).map_err(StoreError::Encode)?;
        self.repo.set(QUOTES_KEY, &encoded)?;
        Ok(())
    }

    /// Current collection in insertion order.
    pub fn quotes(&self) -> &[QuoteRecord] {
        &self.quotes
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Validates, appends and persists one user-entered quote.
    ///
    /// # Contract
    /// - Both fields are trimmed; an empty field leaves the store unchanged.
    /// - No duplicate check is made.
    pub fn add(&mut self, text: &str, category: &str) -> StoreResult<QuoteRecord> {
        let quote = QuoteRecord::new_validated(text, category).map_err(|err| {
            warn!("event=quote_add module=store status=rejected reason={err}");
            err
        })?;

        self.refresh()?;
        let previous_len = self.quotes.len();
        self.quotes.push(quote.clone());
        self.persist_appended(previous_len)?;

        info!(
            "event=quote_add module=store status=ok count={}",
            self.quotes.len()
        );
        Ok(quote)
    }

    pub fn filter_by_category(&self, category: &str) -> Vec<QuoteRecord> {
        filter_by_category(&self.quotes, category)
    }

    pub fn distinct_categories(&self) -> Vec<String> {
        distinct_categories(&self.quotes)
    }

    /// Picks one quote uniformly among those matching `category`.
    pub fn random_quote(&self, category: &str) -> Option<QuoteRecord> {
        self.filter_by_category(category)
            .choose(&mut rand::rng())
            .cloned()
    }

    /// Pretty-printed JSON array with 2-space indentation.
    pub fn export_json(&self) -> StoreResult<String> {
        serde_json::to_string_pretty(&self.quotes).map_err(StoreError::Encode)
    }

    /// Appends every record of a JSON array verbatim and persists.
    ///
    /// Returns the number of imported records. Malformed input leaves the
    /// store unchanged.
    pub fn import_json(&mut self, json_text: &str) -> StoreResult<usize> {
        let imported: Vec<QuoteRecord> = serde_json::from_str(json_text).map_err(|err| {
            warn!("event=quote_import module=store status=error error={err}");
            StoreError::Parse(err)
        })?;

        let count = imported.len();
        self.refresh()?;
        let previous_len = self.quotes.len();
        self.quotes.extend(imported);
        self.persist_appended(previous_len)?;

        info!(
            "event=quote_import module=store status=ok imported={count} count={}",
            self.quotes.len()
        );
        Ok(count)
    }

    /// Applies remote records with the server-wins merge rule and persists.
    ///
    /// The merge runs against the collection as currently persisted, not the
    /// copy read at `open`.
    pub fn apply_remote(&mut self, remote: Vec<QuoteRecord>) -> StoreResult<MergeOutcome> {
        self.refresh()?;
        let snapshot = self.quotes.clone();
        let outcome = merge_into(&mut self.quotes, remote);
        if let Err(err) = self.save() {
            self.quotes = snapshot;
            return Err(err);
        }
        Ok(outcome)
    }

    /// Persisted category filter, `all` when unset.
    pub fn selected_category(&self) -> StoreResult<String> {
        Ok(self
            .repo
            .get(SELECTED_CATEGORY_KEY)?
            .unwrap_or_else(|| ALL_CATEGORIES.to_string()))
    }

    pub fn set_selected_category(&self, category: &str) -> StoreResult<()> {
        self.repo.set(SELECTED_CATEGORY_KEY, category)?;
        Ok(())
    }

    fn refresh(&mut self) -> StoreResult<()> {
        self.quotes = load_quotes(&self.repo)?;
        Ok(())
    }

    fn persist_appended(&mut self, previous_len: usize) -> StoreResult<()> {
        if let Err(err) = self.save() {
            self.quotes.truncate(previous_len);
            return Err(err);
        }
        Ok(())
    }
}

fn load_quotes<R: KeyValueRepository>(repo: &R) -> StoreResult<Vec<QuoteRecord>> {
    let Some(raw) = repo.get(QUOTES_KEY)? else {
        return Ok(seed_quotes());
    };

    match serde_json::from_str::<Vec<QuoteRecord>>(&raw) {
        Ok(quotes) => Ok(quotes),
        Err(err) => {
            warn!("event=store_load module=store status=recovered reason=unparsable error={err}");
            Ok(seed_quotes())
        }
    }
}
