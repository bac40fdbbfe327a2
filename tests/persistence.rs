//! Persistence Integration Tests
//!
//! Slot layout, reload round-trips and compatibility with data written by
//! the browser version of the catalog.

use bookshelf::library::{BOOKS_SLOT, BORROWED_SLOT};
use bookshelf::{BookId, FileStore, KeyValueStore, Library, LibraryError, LibraryOptions, MemoryStore};
use tempfile::TempDir;

#[test]
fn test_round_trip_through_file_store() {
    let temp = TempDir::new().unwrap();

    let (books, loans) = {
        let mut library = Library::open(FileStore::open(temp.path()).unwrap()).unwrap();
        library.add_book("Dune", "Herbert", "111").unwrap();
        library.add_book("Hyperion", "Simmons", "222").unwrap();
        library.borrow_book("222", "Alice").unwrap();

        (
            library.find_all_books().to_vec(),
            library.find_all_borrowed_books().to_vec(),
        )
    };

    // Fresh process: reload from disk
    let reopened = Library::open(FileStore::open(temp.path()).unwrap()).unwrap();
    assert_eq!(reopened.find_all_books(), books.as_slice());
    assert_eq!(reopened.find_all_borrowed_books(), loans.as_slice());
}

#[test]
fn test_round_trip_through_close() {
    let options = LibraryOptions {
        autosave: false,
        ..Default::default()
    };

    let mut library = Library::open_with(MemoryStore::new(), options.clone()).unwrap();
    library.add_book("Dune", "Herbert", "111").unwrap();
    library.borrow_book("111", "Alice").unwrap();
    let books = library.find_all_books().to_vec();
    let loans = library.find_all_borrowed_books().to_vec();

    let store = library.close().unwrap();
    let reopened = Library::open_with(store, options).unwrap();

    assert_eq!(reopened.find_all_books(), books.as_slice());
    assert_eq!(reopened.find_all_borrowed_books(), loans.as_slice());
    assert!(!reopened.has_unsaved_changes());
}

#[test]
fn test_slot_files_hold_json_arrays() {
    let temp = TempDir::new().unwrap();
    let mut library = Library::open(FileStore::open(temp.path()).unwrap()).unwrap();
    library.add_book("Dune", "Herbert", "111").unwrap();
    library.borrow_book("111", "Alice").unwrap();

    let books: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(temp.path().join("libraryBooks.json")).unwrap(),
    )
    .unwrap();
    let borrowed: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(temp.path().join("borrowedBooks.json")).unwrap(),
    )
    .unwrap();

    let book = &books.as_array().unwrap()[0];
    assert_eq!(book["title"], "Dune");
    assert_eq!(book["available"], false);

    let record = &borrowed.as_array().unwrap()[0];
    assert_eq!(record["isbn"], "111");
    assert_eq!(record["borrowerName"], "Alice");
    assert!(record["borrowDate"].is_string());
}

#[test]
fn test_loads_browser_written_slots() {
    let store = MemoryStore::with_slots([
        (
            BOOKS_SLOT,
            r#"[{"id":1700000000000,"title":"Dune","author":"Herbert","isbn":"111","available":false},
                {"id":1700000000001,"title":"Emma","author":"Austen","isbn":"333","available":true}]"#,
        ),
        (
            BORROWED_SLOT,
            r#"[{"id":1700000000000,"title":"Dune","author":"Herbert","isbn":"111","available":false,
                 "borrowerName":"Alice","borrowDate":"2024-03-01T12:00:00.000Z"}]"#,
        ),
    ]);

    let mut library = Library::open(store).unwrap();
    assert_eq!(library.find_all_books().len(), 2);
    assert_eq!(library.find_all_borrowed_books()[0].borrower_name, "Alice");

    // New ids never collide with the stored ones
    let book = library.add_book("Hyperion", "Simmons", "222").unwrap();
    assert!(book.id > BookId(1700000000001));

    // Loans written elsewhere can be returned here
    library.return_book("111").unwrap();
    assert!(library.find_all_books()[0].available);
}

#[test]
fn test_corrupt_slot_is_reported() {
    let temp = TempDir::new().unwrap();
    let mut store = FileStore::open(temp.path()).unwrap();
    store.set(BORROWED_SLOT, "[{\"id\": ").unwrap();

    let err = Library::open(store).unwrap_err();
    match err {
        LibraryError::CorruptSlot { slot, .. } => assert_eq!(slot, BORROWED_SLOT),
        other => panic!("expected CorruptSlot, got {:?}", other),
    }
}
