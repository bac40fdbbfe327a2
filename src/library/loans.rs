//! Loan tracking for catalog books.
//!
//! Each book moves `Available -> Borrowed -> Available`. A borrow picks the
//! first available copy with an exact ISBN match, so duplicate ISBNs act as
//! interchangeable copies.

use chrono::{DateTime, Utc};
use thiserror::Error;

use super::catalog::Catalog;
use crate::domain::BorrowRecord;

/// Why a borrow or return was refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoanError {
    #[error("No book with ISBN {isbn} in the catalog")]
    NotFound { isbn: String },

    #[error("Every copy of ISBN {isbn} is already borrowed")]
    AlreadyBorrowed { isbn: String },

    #[error("ISBN {isbn} is not on loan")]
    NotBorrowed { isbn: String },
}

/// Books currently on loan, in the order they were lent
#[derive(Debug, Clone, Default)]
pub struct LoanTracker {
    records: Vec<BorrowRecord>,
}

impl LoanTracker {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the tracker from persisted records
    pub fn from_records(records: Vec<BorrowRecord>) -> Self {
        Self { records }
    }

    /// Lend the first available copy of `isbn` to `borrower_name`.
    ///
    /// On failure neither the catalog nor the tracker is modified.
    pub fn borrow_book(
        &mut self,
        catalog: &mut Catalog,
        isbn: &str,
        borrower_name: &str,
        borrowed_at: DateTime<Utc>,
    ) -> Result<BorrowRecord, LoanError> {
        let Some(book) = catalog.first_available_mut(isbn) else {
            return Err(if catalog.contains_isbn(isbn) {
                LoanError::AlreadyBorrowed {
                    isbn: isbn.to_string(),
                }
            } else {
                LoanError::NotFound {
                    isbn: isbn.to_string(),
                }
            });
        };

        // Snapshot after the flip so the record stores available = false
        book.available = false;
        let record = BorrowRecord::new(book, borrower_name, borrowed_at);
        self.records.push(record.clone());

        Ok(record)
    }

    /// Take back the first loan of `isbn` and return its record.
    ///
    /// The lent copy becomes available again; if it vanished from the
    /// catalog, the first book with that ISBN does instead. A loan with no
    /// catalog book left is still closed.
    pub fn return_book(
        &mut self,
        catalog: &mut Catalog,
        isbn: &str,
    ) -> Result<BorrowRecord, LoanError> {
        let pos = self
            .records
            .iter()
            .position(|r| r.isbn() == isbn)
            .ok_or_else(|| LoanError::NotBorrowed {
                isbn: isbn.to_string(),
            })?;

        if let Some(book) = catalog.lent_copy_mut(self.records[pos].book.id, isbn) {
            book.available = true;
        }

        Ok(self.records.remove(pos))
    }

    /// All open loans
    pub fn records(&self) -> &[BorrowRecord] {
        &self.records
    }

    /// Get the number of open loans
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if nothing is on loan
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
