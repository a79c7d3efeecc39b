//! Server-wins merge of remote records into the local collection.
//!
//! # Invariants
//! - Remote records are applied in order.
//! - A remote record whose `text` equals a local record's `text` overwrites
//!   the first such local record in place; no timestamps are consulted.
//! - Any other remote record is appended to the end.
//! - Local records are never removed or reordered.
//!
//! The overwrite discards local edits to a matching quote without any signal
//! beyond the conflict count. That behavior is kept as-is.

use crate::model::quote::QuoteRecord;
use std::collections::HashMap;

/// Counters produced by one merge pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Remote records appended as new local records.
    pub appended: usize,
    /// Local records overwritten by a remote record with identical text.
    pub conflicts: usize,
}

/// Merges `remote` into `local` in place.
pub fn merge_into(local: &mut Vec<QuoteRecord>, remote: Vec<QuoteRecord>) -> MergeOutcome {
    let mut first_by_text: HashMap<String, usize> = HashMap::with_capacity(local.len());
    for (index, quote) in local.iter().enumerate() {
        first_by_text.entry(quote.text.clone()).or_insert(index);
    }

    let mut outcome = MergeOutcome::default();
    for incoming in remote {
        match first_by_text.get(&incoming.text) {
            Some(&index) => {
                local[index] = incoming;
                outcome.conflicts += 1;
            }
            None => {
                first_by_text.insert(incoming.text.clone(), local.len());
                local.push(incoming);
                outcome.appended += 1;
            }
        }
    }
    outcome
}

/// Value-style merge returning the merged collection and the conflict count.
pub fn merge(mut local: Vec<QuoteRecord>, remote: Vec<QuoteRecord>) -> (Vec<QuoteRecord>, usize) {
    let outcome = merge_into(&mut local, remote);
    (local, outcome.conflicts)
}

#[cfg(test)]
mod tests {
    use super::{merge, merge_into, MergeOutcome};
    use crate::model::quote::QuoteRecord;

    fn q(text: &str, category: &str) -> QuoteRecord {
        QuoteRecord::new(text, category)
    }

    #[test]
    fn matching_text_is_overwritten_by_remote() {
        let (merged, conflicts) = merge(vec![q("A", "Old")], vec![q("A", "New")]);
        assert_eq!(merged, vec![q("A", "New")]);
        assert_eq!(conflicts, 1);
    }

    #[test]
    fn new_text_is_appended() {
        let (merged, conflicts) = merge(vec![q("A", "X")], vec![q("B", "Y")]);
        assert_eq!(merged, vec![q("A", "X"), q("B", "Y")]);
        assert_eq!(conflicts, 0);
    }

    #[test]
    fn only_first_local_duplicate_is_overwritten() {
        let mut local = vec![q("A", "one"), q("A", "two")];
        let outcome = merge_into(&mut local, vec![q("A", "remote")]);
        assert_eq!(local, vec![q("A", "remote"), q("A", "two")]);
        assert_eq!(
            outcome,
            MergeOutcome {
                appended: 0,
                conflicts: 1
            }
        );
    }

    #[test]
    fn repeated_remote_text_overwrites_record_appended_in_same_pass() {
        let mut local = Vec::new();
        let outcome = merge_into(&mut local, vec![q("A", "first"), q("A", "second")]);
        assert_eq!(local, vec![q("A", "second")]);
        assert_eq!(
            outcome,
            MergeOutcome {
                appended: 1,
                conflicts: 1
            }
        );
    }

    #[test]
    fn identical_records_still_count_as_conflicts() {
        let (merged, conflicts) = merge(vec![q("A", "X")], vec![q("A", "X")]);
        assert_eq!(merged, vec![q("A", "X")]);
        assert_eq!(conflicts, 1);
    }
}
