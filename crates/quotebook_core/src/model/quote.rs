//! Quote domain model.
//!
//! # Responsibility
//! - Define the canonical `{text, category}` record and its validation.
//! - Provide pure collection operations (filter, distinct categories).
//! - Own the built-in seed set used when nothing is persisted.
//!
//! # Invariants
//! - Records created through `QuoteRecord::new_validated` have non-empty,
//!   trimmed `text` and `category`.
//! - `text` is the natural key used by reconciliation; it is not unique.
//! - Collection operations never reorder records.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Category filter value that selects every record.
pub const ALL_CATEGORIES: &str = "all";

const SEED_QUOTES: &[(&str, &str)] = &[
    (
        "Life is what happens when you're busy making other plans.",
        "Life",
    ),
    ("Get busy living or get busy dying.", "Life"),
    (
        "You only live once, but if you do it right, once is enough.",
        "Life",
    ),
    (
        "In the end, we will remember not the words of our enemies, but the silence of our friends.",
        "Friendship",
    ),
];

/// One quotable line with its category.
///
/// Serialized as `{"text": ..., "category": ...}` in both the persisted
/// collection and the export file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuoteRecord {
    pub text: String,
    pub category: String,
}

/// Validation errors for user-entered quotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteValidationError {
    /// `text` is empty after trimming.
    EmptyText,
    /// `category` is empty after trimming.
    EmptyCategory,
}

impl Display for QuoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyText => write!(f, "quote text cannot be empty"),
            Self::EmptyCategory => write!(f, "quote category cannot be empty"),
        }
    }
}

impl Error for QuoteValidationError {}

impl QuoteRecord {
    /// Builds a record verbatim, without trimming or validation.
    ///
    /// Used by import and reconciliation paths, which accept records as-is.
    pub fn new(text: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            category: category.into(),
        }
    }

    /// Builds a record from user input.
    ///
    /// Both fields are trimmed; the text is checked first.
    pub fn new_validated(text: &str, category: &str) -> Result<Self, QuoteValidationError> {
        let text = text.trim();
        let category = category.trim();
        if text.is_empty() {
            return Err(QuoteValidationError::EmptyText);
        }
        if category.is_empty() {
            return Err(QuoteValidationError::EmptyCategory);
        }
        Ok(Self::new(text, category))
    }
}

/// Returns the built-in seed collection.
pub fn seed_quotes() -> Vec<QuoteRecord> {
    SEED_QUOTES
        .iter()
        .map(|(text, category)| QuoteRecord::new(*text, *category))
        .collect()
}

/// Returns records matching `category`, in collection order.
///
/// `ALL_CATEGORIES` matches everything. Matching is exact and case-sensitive.
pub fn filter_by_category(quotes: &[QuoteRecord], category: &str) -> Vec<QuoteRecord> {
    if category == ALL_CATEGORIES {
        return quotes.to_vec();
    }
    quotes
        .iter()
        .filter(|quote| quote.category == category)
        .cloned()
        .collect()
}

/// Returns distinct categories in first-seen order.
pub fn distinct_categories(quotes: &[QuoteRecord]) -> Vec<String> {
    let mut categories: Vec<String> = Vec::new();
    for quote in quotes {
        if !categories.iter().any(|seen| seen == &quote.category) {
            categories.push(quote.category.clone());
        }
    }
    categories
}
