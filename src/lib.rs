//! bookshelf - Local library catalog with loan tracking
//!
//! Keeps a catalog of books and the set of books currently lent out,
//! persisted as two JSON slots in a key-value store.
//!
//! # Architecture
//!
//! Everything is single-threaded and synchronous:
//! - A `Library` owns both collections and its storage backend
//! - State is loaded once when the library is opened
//! - Every mutation rewrites the affected slots in full
//!
//! # Modules
//!
//! - `domain`: Data structures (Book, BorrowRecord)
//! - `library`: Catalog, loan tracking and the `Library` facade
//! - `storage`: Key-value backends (file, memory)
//! - `config`: Path and storage settings
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! bookshelf add "Dune" "Frank Herbert" 978-0441013593
//! bookshelf borrow 978-0441013593 Alice
//! bookshelf borrowed
//! bookshelf return 978-0441013593
//! ```

pub mod cli;
pub mod config;
pub mod domain;
pub mod library;
pub mod storage;

// Re-export main types at crate root for convenience
pub use domain::{Book, BookId, BorrowRecord, IdsExhausted};
pub use library::{Catalog, Library, LibraryError, LibraryOptions, LoanError, LoanTracker};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
