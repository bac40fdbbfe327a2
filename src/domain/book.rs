//! Catalog entries and their identifiers.

use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifier of a book in the catalog.
///
/// Serialized as a bare JSON number so slots written by older tooling, which
/// used the creation time in milliseconds, load unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookId(pub u64);

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single book known to the library
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    /// Unique identifier
    pub id: BookId,

    /// Free-text title
    pub title: String,

    /// Free-text author
    pub author: String,

    /// ISBN as typed by the user (not normalized)
    pub isbn: String,

    /// False while the book is on loan
    pub available: bool,
}

impl Book {
    /// Create an available book
    pub fn new(
        id: BookId,
        title: impl Into<String>,
        author: impl Into<String>,
        isbn: impl Into<String>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            author: author.into(),
            isbn: isbn.into(),
            available: true,
        }
    }

    /// Human-readable loan status
    pub fn status_label(&self) -> &'static str {
        if self.available {
            "available"
        } else {
            "borrowed"
        }
    }
}

/// Every id up to `u64::MAX` has been handed out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("No book ids left after {0}")]
pub struct IdsExhausted(pub BookId);

/// Hands out strictly increasing book ids.
///
/// Ids track the wall clock in milliseconds, but never repeat or go
/// backwards: two books added within the same millisecond get consecutive ids.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    last: u64,
}

impl IdGenerator {
    /// Create a generator that only yields ids above every id in `existing`
    pub fn seeded(existing: impl IntoIterator<Item = BookId>) -> Self {
        let last = existing.into_iter().map(|id| id.0).max().unwrap_or(0);
        Self { last }
    }

    /// Produce the next id, or fail once the id space is used up
    pub fn next_id(&mut self) -> Result<BookId, IdsExhausted> {
        let floor = self
            .last
            .checked_add(1)
            .ok_or(IdsExhausted(BookId(self.last)))?;

        let id = now_millis().max(floor);
        self.last = id;
        Ok(BookId(id))
    }

    /// The most recently issued (or seeded) id
    pub fn last(&self) -> BookId {
        BookId(self.last)
    }
}

fn now_millis() -> u64 {
    u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0)
}
