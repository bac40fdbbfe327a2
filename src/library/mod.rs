//! Book catalog and loan management.
//!
//! # Storage Layout
//!
//! ```text
//! <store>
//! ├── libraryBooks    # [{id, title, author, isbn, available}]
//! └── borrowedBooks   # [{id, title, author, isbn, available, borrowerName, borrowDate}]
//! ```
//!
//! Both slots are JSON arrays rewritten in full on every save.

pub mod catalog;
pub mod loans;
pub mod store;

pub use catalog::Catalog;
pub use loans::{LoanError, LoanTracker};
pub use store::{Library, LibraryError, LibraryOptions, BOOKS_SLOT, BORROWED_SLOT};
