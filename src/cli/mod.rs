//! Command-line interface for bookshelf.
//!
//! Provides commands for adding and searching books, lending and returning
//! them, and listing what is currently on loan.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use crate::config;
use crate::domain::{Book, BorrowRecord};
use crate::library::{Library, LibraryError};
use crate::storage::{FileStore, KeyValueStore};

/// bookshelf - Local library catalog with loan tracking
#[derive(Parser, Debug)]
#[command(name = "bookshelf")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Data directory (or use BOOKSHELF_HOME env; overrides the config file)
    #[arg(long, global = true, env = "BOOKSHELF_HOME")]
    pub home: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add a book to the catalog
    Add {
        /// Book title
        title: String,

        /// Book author
        author: String,

        /// ISBN
        isbn: String,
    },

    /// List every book in the catalog
    List,

    /// Search books by title, author or ISBN
    Search {
        /// Search term (case-insensitive substring)
        term: String,

        /// Only search this field
        #[arg(short, long, value_enum)]
        by: Option<SearchField>,
    },

    /// Lend a book
    Borrow {
        /// ISBN of the book (exact match)
        isbn: String,

        /// Name of the borrower
        borrower: String,
    },

    /// Take a book back
    Return {
        /// ISBN of the book (exact match)
        isbn: String,
    },

    /// List books currently on loan
    Borrowed,

    /// Show resolved configuration (debug)
    Config,
}

/// Field restriction for `search`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SearchField {
    Title,
    Author,
    Isbn,
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        let mut stdout = io::stdout().lock();

        match self.command {
            Commands::Config => show_config(self.home.as_deref(), &mut stdout),
            command => {
                let mut library = open_library(self.home.as_deref())?;

                // Close even when the command fails so deferred writes land;
                // a library with nothing pending is left as it is on disk
                let outcome = run_command(&mut library, command, &mut stdout);
                library.close().context("Failed to save library")?;
                outcome
            }
        }
    }
}

/// Open the file-backed library described by the configuration
fn open_library(home_override: Option<&Path>) -> Result<Library<FileStore>> {
    let cfg = config::config()?;
    let home = home_override
        .map(Path::to_path_buf)
        .unwrap_or_else(|| cfg.home.clone());

    let store = FileStore::open(&home)
        .with_context(|| format!("Failed to open data directory: {}", home.display()))?;

    Library::open_with(store, cfg.storage.library_options())
        .with_context(|| format!("Failed to load library from {}", home.display()))
}

/// Run a library command, writing user-facing output to `out`
pub fn run_command<S, W>(library: &mut Library<S>, command: Commands, out: &mut W) -> Result<()>
where
    S: KeyValueStore,
    W: Write,
{
    match command {
        Commands::Add {
            title,
            author,
            isbn,
        } => {
            require_filled(&[("title", &title), ("author", &author), ("isbn", &isbn)])?;

            let book = library.add_book(&title, &author, &isbn)?;
            writeln!(out, "Book added: {} by {} (ISBN {})", book.title, book.author, book.isbn)?;
        }
        Commands::List => {
            let books: Vec<&Book> = library.find_all_books().iter().collect();
            if books.is_empty() {
                writeln!(out, "No books in the catalog")?;
            } else {
                print_books(&books, out)?;
            }
        }
        Commands::Search { term, by } => {
            require_filled(&[("search term", &term)])?;

            let results = match by {
                Some(SearchField::Title) => library.find_books_by_title(&term),
                Some(SearchField::Author) => library.find_books_by_author(&term),
                Some(SearchField::Isbn) => library.find_books_by_isbn(&term),
                None => library.search(&term),
            };

            if results.is_empty() {
                writeln!(out, "No books found")?;
            } else {
                print_books(&results, out)?;
            }
        }
        Commands::Borrow { isbn, borrower } => {
            require_filled(&[("isbn", &isbn), ("borrower", &borrower)])?;

            match library.borrow_book(&isbn, &borrower) {
                Ok(record) => writeln!(out, "Book lent to {}.", record.borrower_name)?,
                Err(LibraryError::Loan(_)) => {
                    anyhow::bail!("Book not found or already borrowed.")
                }
                Err(err) => return Err(err.into()),
            }
        }
        Commands::Return { isbn } => {
            require_filled(&[("isbn", &isbn)])?;

            match library.return_book(&isbn) {
                Ok(_) => writeln!(out, "Book returned.")?,
                Err(LibraryError::Loan(_)) => anyhow::bail!("This book is not on loan."),
                Err(err) => return Err(err.into()),
            }
        }
        Commands::Borrowed => {
            let records = library.find_all_borrowed_books();
            if records.is_empty() {
                writeln!(out, "No books on loan")?;
            } else {
                print_borrowed(records, out)?;
            }
        }
        Commands::Config => anyhow::bail!("config does not operate on a library"),
    }

    Ok(())
}

/// Reject blank user input before it reaches the library
fn require_filled(fields: &[(&str, &String)]) -> Result<()> {
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        anyhow::bail!("Please fill in all fields (missing: {})", missing.join(", "))
    }
}

fn print_books<W: Write>(books: &[&Book], out: &mut W) -> Result<()> {
    writeln!(out, "{:<30} {:<24} {:<18} {:<10}", "TITLE", "AUTHOR", "ISBN", "STATUS")?;
    writeln!(out, "{}", "-".repeat(85))?;

    for book in books {
        writeln!(
            out,
            "{:<30} {:<24} {:<18} {:<10}",
            book.title,
            book.author,
            book.isbn,
            book.status_label()
        )?;
    }

    Ok(())
}

fn print_borrowed<W: Write>(records: &[BorrowRecord], out: &mut W) -> Result<()> {
    writeln!(
        out,
        "{:<30} {:<24} {:<18} {:<20} {:<10}",
        "TITLE", "AUTHOR", "ISBN", "BORROWER", "DATE"
    )?;
    writeln!(out, "{}", "-".repeat(106))?;

    for record in records {
        writeln!(
            out,
            "{:<30} {:<24} {:<18} {:<20} {:<10}",
            record.book.title,
            record.book.author,
            record.book.isbn,
            record.borrower_name,
            record.borrow_date.format("%Y-%m-%d")
        )?;
    }

    Ok(())
}

/// Show resolved configuration
fn show_config<W: Write>(home_override: Option<&Path>, out: &mut W) -> Result<()> {
    let cfg = config::config()?;
    let home = home_override.unwrap_or(cfg.home.as_path());

    writeln!(out, "Bookshelf Configuration")?;
    writeln!(out)?;
    writeln!(
        out,
        "Config file: {}",
        cfg.config_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none - using defaults)".to_string())
    )?;
    writeln!(out, "Data directory: {}", home.display())?;
    writeln!(out)?;
    writeln!(out, "Storage:")?;
    writeln!(out, "  Books slot:    {}", cfg.storage.books_slot)?;
    writeln!(out, "  Borrowed slot: {}", cfg.storage.borrowed_slot)?;
    writeln!(out, "  Autosave:      {}", cfg.storage.autosave)?;
    writeln!(out, "  Pretty JSON:   {}", cfg.storage.pretty)?;

    Ok(())
}
