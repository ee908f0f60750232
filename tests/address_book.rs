//! Behaviour of `AddressBook` over the in-memory and redb stores.

use std::io::Write;
use std::sync::Arc;

use contacts::{
    AddressBook, ContactService, Entry, EntryStore, InMemoryStore, ServiceError, StoreError,
    ValidationError,
};
use tempfile::NamedTempFile;

fn entry(first: &str, email: &str) -> Entry {
    Entry::new(first, "Tester", email, "8675309")
}

fn book_with_store() -> (AddressBook, Arc<InMemoryStore>) {
    let store = Arc::new(InMemoryStore::new());
    (AddressBook::new(store.clone()), store)
}

fn book() -> AddressBook {
    book_with_store().0
}

fn csv_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[tokio::test]
async fn add_assigns_id_and_lowercases_email() {
    let book = book();
    let stored = book
        .add_entry(entry("Tester", "Tester.McTesterson@CodeCave.App"))
        .await
        .unwrap();

    let id = stored.id.clone().expect("stored entry has an id");
    assert_eq!(stored.email, "tester.mctesterson@codecave.app");
    assert_eq!(book.entry_by_id(&id).await.unwrap(), stored);
}

#[tokio::test]
async fn duplicate_email_is_rejected_regardless_of_case() {
    let book = book();
    book.add_entry(entry("A", "dup@example.com")).await.unwrap();

    let err = book.add_entry(entry("B", "DUP@example.com")).await.unwrap_err();
    assert!(matches!(err, ServiceError::EmailExists));
    assert_eq!(book.all_entries().await.unwrap().len(), 1);
}

#[tokio::test]
async fn updating_an_entry_with_its_own_email_is_allowed() {
    let book = book();
    let stored = book.add_entry(entry("A", "self@example.com")).await.unwrap();

    let mut changed = stored.clone();
    changed.first_name = "Renamed".into();
    book.update_entry(changed).await.unwrap();

    let reloaded = book.entry_by_id(stored.id.as_deref().unwrap()).await.unwrap();
    assert_eq!(reloaded.first_name, "Renamed");
    assert_eq!(reloaded.email, "self@example.com");
}

#[tokio::test]
async fn updating_to_another_entrys_email_is_rejected() {
    let book = book();
    book.add_entry(entry("A", "a@example.com")).await.unwrap();
    let b = book.add_entry(entry("B", "b@example.com")).await.unwrap();

    let err = book
        .update_entry(Entry {
            email: "A@example.com".into(),
            ..b
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::EmailExists));
}

#[tokio::test]
async fn update_replaces_the_whole_document() {
    let book = book();
    let stored = book.add_entry(entry("A", "a@example.com")).await.unwrap();
    let id = stored.id.clone().unwrap();

    let replacement = Entry::new("Zed", "Zulu", "zed@example.com", "1").with_id(id.clone());
    book.update_entry(replacement).await.unwrap();

    let reloaded = book.entry_by_id(&id).await.unwrap();
    assert_eq!(
        reloaded,
        Entry::new("Zed", "Zulu", "zed@example.com", "1").with_id(id)
    );
}

#[tokio::test]
async fn update_needs_a_well_formed_existing_id() {
    let book = book();

    let err = book.update_entry(entry("A", "a@example.com")).await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidId));

    let err = book
        .update_entry(entry("A", "a@example.com").with_id("not-an-id"))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidId));

    let absent = entry("A", "a@example.com").with_id("65f1c0ffee0000000000abcd");
    let err = book.update_entry(absent).await.unwrap_err();
    assert!(matches!(err, ServiceError::Store(StoreError::NotFound)));
}

#[tokio::test]
async fn writes_reject_entries_with_empty_fields() {
    let book = book();
    let err = book
        .add_entry(Entry::new("A", "B", "a@example.com", ""))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Validation(ValidationError::Phone)
    ));
}

#[tokio::test]
async fn lookup_of_missing_or_malformed_id() {
    let book = book();

    let err = book.entry_by_id("not-an-id").await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidId));

    let err = book.entry_by_id("65f1c0ffee0000000000abcd").await.unwrap_err();
    assert!(matches!(err, ServiceError::Store(StoreError::NotFound)));
    assert_eq!(err.to_string(), "not found");
}

#[tokio::test]
async fn delete_is_idempotent_but_checks_the_id() {
    let book = book();
    let stored = book.add_entry(entry("A", "a@example.com")).await.unwrap();
    let id = stored.id.unwrap();

    book.delete_entry_by_id(&id).await.unwrap();
    book.delete_entry_by_id(&id).await.unwrap();
    assert!(book.all_entries().await.unwrap().is_empty());

    let err = book.delete_entry_by_id("1234").await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidId));
}

#[tokio::test]
async fn partial_documents_do_not_hold_an_email() {
    let (book, store) = book_with_store();
    store
        .insert(Entry {
            email: "stale@example.com".into(),
            ..Entry::default()
        })
        .await
        .unwrap();

    book.add_entry(entry("Fresh", "stale@example.com")).await.unwrap();
}

#[tokio::test]
async fn export_then_import_reproduces_the_collection() {
    let book = book();
    book.add_entry(entry("A", "a@example.com")).await.unwrap();
    book.add_entry(entry("B", "b@example.com")).await.unwrap();
    book.add_entry(entry("C", "c@example.com")).await.unwrap();
    let before = book.all_entries().await.unwrap();

    let export = book.entries_to_csv().await.unwrap();
    book.csv_to_entries(export.path()).await.unwrap();

    assert_eq!(book.all_entries().await.unwrap(), before);
}

#[tokio::test]
async fn import_skips_email_conflicts_and_keeps_going() {
    let book = book();
    book.add_entry(entry("Taken", "taken@example.com")).await.unwrap();

    let file = csv_file(
        "ID,FirstName,LastName,Email,Phone\n\
         ,One,Row,one@example.com,1\n\
         ,Two,Row,TAKEN@example.com,2\n\
         ,Three,Row,three@example.com,3\n\
         ,Four,Row,one@example.com,4\n\
         ,Five,Row,five@example.com,5\n",
    );

    let err = book.csv_to_entries(file.path()).await.unwrap_err();
    assert!(err.is_partial());
    assert!(matches!(err.source, ServiceError::EmailExists));

    let failed: Vec<&str> = err.failed.iter().map(|e| e.first_name.as_str()).collect();
    assert_eq!(failed, ["Two", "Four"]);

    let mut stored: Vec<String> = book
        .all_entries()
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.email)
        .collect();
    stored.sort();
    assert_eq!(
        stored,
        [
            "five@example.com",
            "one@example.com",
            "taken@example.com",
            "three@example.com"
        ]
    );
}

#[tokio::test]
async fn import_stops_at_the_first_unexpected_error() {
    let book = book();
    book.add_entry(entry("Taken", "taken@example.com")).await.unwrap();

    let file = csv_file(
        "ID,FirstName,LastName,Email,Phone\n\
         ,Dup,Row,taken@example.com,1\n\
         not-an-id,Bad,Row,bad@example.com,2\n\
         ,Never,Row,never@example.com,3\n",
    );

    let err = book.csv_to_entries(file.path()).await.unwrap_err();
    assert!(!err.is_partial());
    assert!(matches!(err.source, ServiceError::InvalidId));
    assert_eq!(err.failed.len(), 1);
    assert_eq!(err.failed[0].first_name, "Dup");
    assert_eq!(book.all_entries().await.unwrap().len(), 1);
}

#[tokio::test]
async fn malformed_csv_applies_nothing() {
    let book = book();
    let file = csv_file(
        "ID,FirstName,LastName,Email,Phone\n\
         ,One,Row,one@example.com,1\n\
         ,broken\n",
    );

    let err = book.csv_to_entries(file.path()).await.unwrap_err();
    assert!(matches!(err.source, ServiceError::Csv(_)));
    assert!(err.failed.is_empty());
    assert!(book.all_entries().await.unwrap().is_empty());
}

#[tokio::test]
async fn empty_csv_file_is_a_parse_error() {
    let book = book();

    let empty = csv_file("");
    let err = book.csv_to_entries(empty.path()).await.unwrap_err();
    assert!(!err.is_partial());
    assert!(matches!(err.source, ServiceError::Csv(_)));

    let header_only = csv_file("ID,FirstName,LastName,Email,Phone\n");
    book.csv_to_entries(header_only.path()).await.unwrap();
    assert!(book.all_entries().await.unwrap().is_empty());
}

#[cfg(feature = "embedded")]
#[tokio::test]
async fn redb_store_backs_the_same_service() {
    let db_file = NamedTempFile::new().unwrap();
    let store = Arc::new(contacts::RedbStore::open(db_file.path()).unwrap());
    let book = AddressBook::new(store);

    let stored = book.add_entry(entry("A", "A@example.com")).await.unwrap();
    assert_eq!(stored.email, "a@example.com");

    let err = book.add_entry(entry("B", "a@example.com")).await.unwrap_err();
    assert!(matches!(err, ServiceError::EmailExists));

    let export = book.entries_to_csv().await.unwrap();
    book.csv_to_entries(export.path()).await.unwrap();
    assert_eq!(book.all_entries().await.unwrap(), vec![stored]);
}
