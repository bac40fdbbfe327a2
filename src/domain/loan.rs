//! Loan records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::book::Book;

/// A book currently held by a borrower.
///
/// The book's fields are copied at borrow time, so later edits to the
/// catalog entry do not show up here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BorrowRecord {
    /// Snapshot of the catalog entry (flattened into the record on disk)
    #[serde(flatten)]
    pub book: Book,

    /// Who has the book
    pub borrower_name: String,

    /// When the book was lent (ISO 8601)
    pub borrow_date: DateTime<Utc>,
}

impl BorrowRecord {
    /// Snapshot `book` as lent to `borrower_name` at `borrow_date`
    pub fn new(book: &Book, borrower_name: impl Into<String>, borrow_date: DateTime<Utc>) -> Self {
        Self {
            book: book.clone(),
            borrower_name: borrower_name.into(),
            borrow_date,
        }
    }

    /// ISBN of the lent book
    pub fn isbn(&self) -> &str {
        &self.book.isbn
    }
}
