use quotebook_core::db::open_db_in_memory;
use quotebook_core::repo::kv_repo::{QUOTES_KEY, SELECTED_CATEGORY_KEY};
use quotebook_core::{
    open_store, seed_quotes, KeyValueRepository, QuoteRecord, QuoteStore, QuoteValidationError,
    RepoError, RepoResult, SqliteKvRepository, StoreError, ALL_CATEGORIES,
};
use std::cell::Cell;

fn memory_repo() -> SqliteKvRepository {
    SqliteKvRepository::new(open_db_in_memory().unwrap())
}

fn store_with(quotes: &[QuoteRecord]) -> QuoteStore<SqliteKvRepository> {
    let repo = memory_repo();
    repo.set(QUOTES_KEY, &serde_json::to_string(quotes).unwrap())
        .unwrap();
    QuoteStore::open(repo).unwrap()
}

fn persisted(store: &QuoteStore<SqliteKvRepository>) -> Vec<QuoteRecord> {
    let raw = store.repo().get(QUOTES_KEY).unwrap().unwrap();
    serde_json::from_str(&raw).unwrap()
}

/// Repository whose writes can be switched off to simulate a full disk.
struct FlakyRepo {
    inner: SqliteKvRepository,
    fail_writes: Cell<bool>,
}

impl KeyValueRepository for FlakyRepo {
    fn get(&self, key: &str) -> RepoResult<Option<String>> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> RepoResult<()> {
        if self.fail_writes.get() {
            return Err(RepoError::InvalidKey(format!("{key} (write refused)")));
        }
        self.inner.set(key, value)
    }
}

#[test]
fn open_without_persisted_quotes_uses_seed_set() {
    let store = QuoteStore::open(memory_repo()).unwrap();
    assert_eq!(store.quotes(), seed_quotes().as_slice());
    assert_eq!(store.load().unwrap(), seed_quotes());
}

#[test]
fn open_with_corrupted_quotes_recovers_seed_set() {
    let repo = memory_repo();
    repo.set(QUOTES_KEY, "{not json").unwrap();
    let store = QuoteStore::open(repo).unwrap();
    assert_eq!(store.quotes(), seed_quotes().as_slice());
}

#[test]
fn persisted_empty_array_is_honored() {
    let store = store_with(&[]);
    assert!(store.is_empty());
}

#[test]
fn add_appends_trimmed_record_and_persists_it() {
    let mut store = QuoteStore::open(memory_repo()).unwrap();
    let before = store.len();

    let added = store.add("  Stay hungry, stay foolish.  ", " Work ").unwrap();

    assert_eq!(added, QuoteRecord::new("Stay hungry, stay foolish.", "Work"));
    assert_eq!(store.len(), before + 1);
    assert_eq!(store.quotes().last(), Some(&added));
    assert_eq!(persisted(&store), store.quotes());
}

#[test]
fn add_allows_duplicate_text() {
    let mut store = store_with(&[]);
    store.add("Same", "One").unwrap();
    store.add("Same", "Two").unwrap();
    assert_eq!(store.len(), 2);
}

#[test]
fn add_with_blank_field_leaves_store_unchanged() {
    let mut store = store_with(&[QuoteRecord::new("A", "X")]);

    let err = store.add("   ", "Life").unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(QuoteValidationError::EmptyText)
    ));
    let err = store.add("Text", "\t").unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(QuoteValidationError::EmptyCategory)
    ));

    assert_eq!(store.quotes(), &[QuoteRecord::new("A", "X")]);
    assert_eq!(persisted(&store), vec![QuoteRecord::new("A", "X")]);
}

#[test]
fn failed_persist_rolls_back_in_memory_collection() {
    let repo = FlakyRepo {
        inner: memory_repo(),
        fail_writes: Cell::new(false),
    };
    let mut store = QuoteStore::open(repo).unwrap();
    store.add("Kept", "Ok").unwrap();
    let before = store.quotes().to_vec();

    store.repo().fail_writes.set(true);
    assert!(matches!(
        store.add("Lost", "Nope"),
        Err(StoreError::Repo(_))
    ));
    assert!(matches!(
        store.import_json(r#"[{"text": "Lost", "category": "Nope"}]"#),
        Err(StoreError::Repo(_))
    ));
    assert!(matches!(
        store.apply_remote(vec![QuoteRecord::new("Kept", "Changed")]),
        Err(StoreError::Repo(_))
    ));

    assert_eq!(store.quotes(), before.as_slice());
    assert_eq!(store.load().unwrap(), before);
}

#[test]
fn filter_by_category_matches_exactly() {
    let store = store_with(&[
        QuoteRecord::new("a", "Life"),
        QuoteRecord::new("b", "Work"),
        QuoteRecord::new("c", "Life"),
    ]);

    assert_eq!(store.filter_by_category(ALL_CATEGORIES), store.quotes());
    assert_eq!(
        store.filter_by_category("Life"),
        vec![QuoteRecord::new("a", "Life"), QuoteRecord::new("c", "Life")]
    );
    assert!(store.filter_by_category("life").is_empty());
    assert_eq!(store.distinct_categories(), vec!["Life", "Work"]);
}

#[test]
fn random_quote_respects_category() {
    let store = store_with(&[QuoteRecord::new("a", "Life"), QuoteRecord::new("b", "Work")]);
    for _ in 0..20 {
        assert_eq!(
            store.random_quote("Work"),
            Some(QuoteRecord::new("b", "Work"))
        );
    }
    assert_eq!(store.random_quote("Missing"), None);
}

#[test]
fn export_is_two_space_pretty_json_and_stable() {
    let store = store_with(&[QuoteRecord::new("A", "X")]);
    let exported = store.export_json().unwrap();
    assert_eq!(
        exported,
        "[\n  {\n    \"text\": \"A\",\n    \"category\": \"X\"\n  }\n]"
    );
    assert_eq!(store.export_json().unwrap(), exported);
}

#[test]
fn export_then_import_into_empty_store_round_trips() {
    let source = QuoteStore::open(memory_repo()).unwrap();
    let exported = source.export_json().unwrap();

    let mut target = store_with(&[]);
    let imported = target.import_json(&exported).unwrap();

    assert_eq!(imported, source.len());
    assert_eq!(target.quotes(), source.quotes());
    assert_eq!(persisted(&target), source.quotes());
}

#[test]
fn import_appends_without_dedup() {
    let mut store = store_with(&[QuoteRecord::new("A", "X")]);
    store
        .import_json(r#"[{"text": "A", "category": "X"}, {"text": "B", "category": ""}]"#)
        .unwrap();
    assert_eq!(
        store.quotes(),
        &[
            QuoteRecord::new("A", "X"),
            QuoteRecord::new("A", "X"),
            QuoteRecord::new("B", ""),
        ]
    );
}

#[test]
fn malformed_import_is_a_parse_error_and_changes_nothing() {
    let mut store = store_with(&[QuoteRecord::new("A", "X")]);
    for bad in ["not json", r#"{"text": "A", "category": "X"}"#, r#"[{"text": "A"}]"#] {
        let err = store.import_json(bad).unwrap_err();
        assert!(matches!(err, StoreError::Parse(_)), "input: {bad}");
    }
    assert_eq!(store.quotes(), &[QuoteRecord::new("A", "X")]);
}

#[test]
fn selected_category_defaults_to_all_and_persists() {
    let store = QuoteStore::open(memory_repo()).unwrap();
    assert_eq!(store.selected_category().unwrap(), ALL_CATEGORIES);

    store.set_selected_category("Life").unwrap();
    assert_eq!(store.selected_category().unwrap(), "Life");
    assert_eq!(
        store.repo().get(SELECTED_CATEGORY_KEY).unwrap().as_deref(),
        Some("Life")
    );
}

#[test]
fn file_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("quotebook.sqlite3");

    {
        let mut store = open_store(&path).unwrap();
        store.add("Persisted", "Disk").unwrap();
        store.set_selected_category("Disk").unwrap();
    }

    let reopened = open_store(&path).unwrap();
    assert_eq!(
        reopened.quotes().last(),
        Some(&QuoteRecord::new("Persisted", "Disk"))
    );
    assert_eq!(reopened.len(), seed_quotes().len() + 1);
    assert_eq!(reopened.selected_category().unwrap(), "Disk");
}

#[test]
fn add_keeps_quotes_written_by_another_handle() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("quotebook.sqlite3");
    let mut first = open_store(&path).unwrap();

    open_store(&path).unwrap().add("From elsewhere", "Other").unwrap();
    first.add("From here", "Mine").unwrap();

    let reopened = open_store(&path).unwrap();
    assert_eq!(reopened.len(), seed_quotes().len() + 2);
    assert_eq!(
        &reopened.quotes()[seed_quotes().len()..],
        &[
            QuoteRecord::new("From elsewhere", "Other"),
            QuoteRecord::new("From here", "Mine"),
        ]
    );
    assert_eq!(first.quotes(), reopened.quotes());
}
