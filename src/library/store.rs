//! The library: catalog and loans bound to a key-value backend.
//!
//! State is loaded once when the library is opened. With autosave on (the
//! default) every mutation rewrites the slots it touched; otherwise writes
//! wait for [`Library::flush`] or [`Library::close`].

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use super::catalog::Catalog;
use super::loans::{LoanError, LoanTracker};
use crate::domain::{Book, BorrowRecord, IdsExhausted};
use crate::storage::{KeyValueStore, StorageError};

/// Default slot holding the catalog
pub const BOOKS_SLOT: &str = "libraryBooks";

/// Default slot holding open loans
pub const BORROWED_SLOT: &str = "borrowedBooks";

/// Errors from library operations
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error(transparent)]
    Loan(#[from] LoanError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Ids(#[from] IdsExhausted),

    #[error("Slot {slot} holds malformed data: {source}")]
    CorruptSlot {
        slot: String,
        source: serde_json::Error,
    },

    #[error("Failed to serialize slot {slot}: {source}")]
    Serialize {
        slot: String,
        source: serde_json::Error,
    },
}

impl LibraryError {
    /// The refused loan, if this is a borrow/return failure
    pub fn loan_error(&self) -> Option<&LoanError> {
        match self {
            Self::Loan(err) => Some(err),
            _ => None,
        }
    }
}

/// How the library maps onto its backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryOptions {
    /// Slot holding the catalog
    pub books_slot: String,

    /// Slot holding open loans
    pub borrowed_slot: String,

    /// Write after every mutation instead of only on flush/close
    pub autosave: bool,

    /// Pretty-print slot JSON
    pub pretty: bool,
}

impl Default for LibraryOptions {
    fn default() -> Self {
        Self {
            books_slot: BOOKS_SLOT.to_string(),
            borrowed_slot: BORROWED_SLOT.to_string(),
            autosave: true,
            pretty: false,
        }
    }
}

/// Catalog plus loans, persisted through `S`
#[derive(Debug)]
pub struct Library<S: KeyValueStore> {
    storage: S,
    options: LibraryOptions,
    catalog: Catalog,
    loans: LoanTracker,
    /// Unsaved changes (only when autosave is off)
    dirty: bool,
}

impl<S: KeyValueStore> Library<S> {
    /// Open with the default slot names and autosave on
    pub fn open(storage: S) -> Result<Self, LibraryError> {
        Self::open_with(storage, LibraryOptions::default())
    }

    /// Load both slots from `storage`.
    ///
    /// Absent (or `null`) slots start empty; malformed ones abort the open.
    pub fn open_with(storage: S, options: LibraryOptions) -> Result<Self, LibraryError> {
        let books: Vec<Book> = load_slot(&storage, &options.books_slot)?;
        let records: Vec<BorrowRecord> = load_slot(&storage, &options.borrowed_slot)?;

        info!(
            books = books.len(),
            borrowed = records.len(),
            "Library loaded"
        );

        Ok(Self {
            storage,
            options,
            catalog: Catalog::from_books(books),
            loans: LoanTracker::from_records(records),
            dirty: false,
        })
    }

    /// Add a new, available book.
    ///
    /// No validation: blank fields and duplicate ISBNs are the caller's call.
    pub fn add_book(&mut self, title: &str, author: &str, isbn: &str) -> Result<Book, LibraryError> {
        let book = self.catalog.add(title, author, isbn)?;
        info!(id = %book.id, isbn, "Book added");

        self.save_books()?;
        Ok(book)
    }

    /// Every book, insertion order
    pub fn find_all_books(&self) -> &[Book] {
        self.catalog.books()
    }

    /// Case-insensitive substring search on title
    pub fn find_books_by_title(&self, needle: &str) -> Vec<&Book> {
        self.catalog.find_by_title(needle)
    }

    /// Case-insensitive substring search on author
    pub fn find_books_by_author(&self, needle: &str) -> Vec<&Book> {
        self.catalog.find_by_author(needle)
    }

    /// Case-insensitive substring search on ISBN
    pub fn find_books_by_isbn(&self, needle: &str) -> Vec<&Book> {
        self.catalog.find_by_isbn(needle)
    }

    /// Title, author and ISBN search combined, each book once
    pub fn search(&self, term: &str) -> Vec<&Book> {
        self.catalog.search(term)
    }

    /// Lend the first available copy of `isbn`
    pub fn borrow_book(
        &mut self,
        isbn: &str,
        borrower_name: &str,
    ) -> Result<BorrowRecord, LibraryError> {
        let record = self
            .loans
            .borrow_book(&mut self.catalog, isbn, borrower_name, Utc::now())
            .inspect_err(|err| info!(isbn, %err, "Borrow refused"))?;

        info!(id = %record.book.id, isbn, borrower = borrower_name, "Book borrowed");

        self.save_all()?;
        Ok(record)
    }

    /// Close the first loan of `isbn`, returning the closed record
    pub fn return_book(&mut self, isbn: &str) -> Result<BorrowRecord, LibraryError> {
        let record = self
            .loans
            .return_book(&mut self.catalog, isbn)
            .inspect_err(|err| info!(isbn, %err, "Return refused"))?;

        if !self.catalog.contains_isbn(isbn) {
            debug!(isbn, "Returned book is no longer in the catalog");
        }
        info!(isbn, borrower = %record.borrower_name, "Book returned");

        self.save_all()?;
        Ok(record)
    }

    /// Every open loan, in lending order
    pub fn find_all_borrowed_books(&self) -> &[BorrowRecord] {
        self.loans.records()
    }

    /// Write both slots now
    pub fn flush(&mut self) -> Result<(), LibraryError> {
        self.write_books()?;
        self.write_loans()?;
        self.dirty = false;
        Ok(())
    }

    /// Write any deferred changes; hands the backend back to the caller
    pub fn close(mut self) -> Result<S, LibraryError> {
        if self.dirty {
            self.flush()?;
        }
        Ok(self.storage)
    }

    /// Check for changes not yet written (always false with autosave)
    pub fn has_unsaved_changes(&self) -> bool {
        self.dirty
    }

    /// Get the catalog
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Get the loan tracker
    pub fn loans(&self) -> &LoanTracker {
        &self.loans
    }

    /// Get the backend
    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn save_books(&mut self) -> Result<(), LibraryError> {
        if self.options.autosave {
            self.write_books()
        } else {
            self.dirty = true;
            Ok(())
        }
    }

    fn save_all(&mut self) -> Result<(), LibraryError> {
        if self.options.autosave {
            self.write_books()?;
            self.write_loans()
        } else {
            self.dirty = true;
            Ok(())
        }
    }

    fn write_books(&mut self) -> Result<(), LibraryError> {
        write_slot(
            &mut self.storage,
            &self.options.books_slot,
            self.catalog.books(),
            self.options.pretty,
        )
    }

    fn write_loans(&mut self) -> Result<(), LibraryError> {
        write_slot(
            &mut self.storage,
            &self.options.borrowed_slot,
            self.loans.records(),
            self.options.pretty,
        )
    }
}

fn load_slot<S, T>(storage: &S, slot: &str) -> Result<Vec<T>, LibraryError>
where
    S: KeyValueStore,
    T: DeserializeOwned,
{
    let Some(raw) = storage.get(slot)? else {
        debug!(slot, "Slot empty");
        return Ok(Vec::new());
    };

    let items: Option<Vec<T>> =
        serde_json::from_str(&raw).map_err(|source| LibraryError::CorruptSlot {
            slot: slot.to_string(),
            source,
        })?;

    Ok(items.unwrap_or_default())
}

fn write_slot<S, T>(storage: &mut S, slot: &str, items: &[T], pretty: bool) -> Result<(), LibraryError>
where
    S: KeyValueStore,
    T: Serialize,
{
    let serialized = if pretty {
        serde_json::to_string_pretty(items)
    } else {
        serde_json::to_string(items)
    };
    let json = serialized.map_err(|source| LibraryError::Serialize {
        slot: slot.to_string(),
        source,
    })?;

    storage.set(slot, &json)?;
    debug!(slot, items = items.len(), "Slot persisted");
    Ok(())
}
