//! Domain types for the library.
//!
//! - Book: a catalog entry with its availability flag
//! - BorrowRecord: a denormalized copy of a book plus who borrowed it and when

pub mod book;
pub mod loan;

pub use book::{Book, BookId, IdGenerator, IdsExhausted};
pub use loan::BorrowRecord;
