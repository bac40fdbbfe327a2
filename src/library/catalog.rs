//! Catalog of every known book.
//!
//! Insertion-ordered list searched by linear scan; the collection is small
//! enough that an index would only add bookkeeping.

use std::collections::HashSet;

use crate::domain::{Book, BookId, IdGenerator, IdsExhausted};

/// All books known to the library, in insertion order
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    books: Vec<Book>,
    ids: IdGenerator,
}

impl Catalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a catalog from persisted books
    pub fn from_books(books: Vec<Book>) -> Self {
        let ids = IdGenerator::seeded(books.iter().map(|b| b.id));
        Self { books, ids }
    }

    /// Add a new, available book and return a copy of it.
    ///
    /// Fields are stored as given: blank values and duplicate ISBNs are
    /// accepted. Fails only when no unused id is left.
    pub fn add(
        &mut self,
        title: impl Into<String>,
        author: impl Into<String>,
        isbn: impl Into<String>,
    ) -> Result<Book, IdsExhausted> {
        let book = Book::new(self.ids.next_id()?, title, author, isbn);
        self.books.push(book.clone());
        Ok(book)
    }

    /// All books, insertion order
    pub fn books(&self) -> &[Book] {
        &self.books
    }

    /// Get a book by id
    pub fn get(&self, id: BookId) -> Option<&Book> {
        self.books.iter().find(|b| b.id == id)
    }

    /// Books whose title contains `needle` (case-insensitive)
    pub fn find_by_title(&self, needle: &str) -> Vec<&Book> {
        self.filter_field(needle, |b| &b.title)
    }

    /// Books whose author contains `needle` (case-insensitive)
    pub fn find_by_author(&self, needle: &str) -> Vec<&Book> {
        self.filter_field(needle, |b| &b.author)
    }

    /// Books whose ISBN contains `needle` (case-insensitive)
    pub fn find_by_isbn(&self, needle: &str) -> Vec<&Book> {
        self.filter_field(needle, |b| &b.isbn)
    }

    /// Title, author and ISBN matches combined, each book listed once.
    ///
    /// Title hits come first, then author hits, then ISBN hits.
    pub fn search(&self, term: &str) -> Vec<&Book> {
        let mut seen = HashSet::new();

        self.find_by_title(term)
            .into_iter()
            .chain(self.find_by_author(term))
            .chain(self.find_by_isbn(term))
            .filter(|book| seen.insert(book.id))
            .collect()
    }

    /// Check if any book carries exactly this ISBN
    pub fn contains_isbn(&self, isbn: &str) -> bool {
        self.books.iter().any(|b| b.isbn == isbn)
    }

    /// Number of available copies with exactly this ISBN
    pub fn available_count(&self, isbn: &str) -> usize {
        self.books
            .iter()
            .filter(|b| b.isbn == isbn && b.available)
            .count()
    }

    /// First available book with exactly this ISBN
    pub(crate) fn first_available_mut(&mut self, isbn: &str) -> Option<&mut Book> {
        self.books
            .iter_mut()
            .find(|b| b.isbn == isbn && b.available)
    }

    /// The copy a loan refers to: the book with `id`, or else the first
    /// book with exactly this ISBN
    pub(crate) fn lent_copy_mut(&mut self, id: BookId, isbn: &str) -> Option<&mut Book> {
        let pos = self
            .books
            .iter()
            .position(|b| b.id == id)
            .or_else(|| self.books.iter().position(|b| b.isbn == isbn))?;

        self.books.get_mut(pos)
    }

    /// Get the number of books
    pub fn len(&self) -> usize {
        self.books.len()
    }

    /// Check if the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    fn filter_field<'a, F>(&'a self, needle: &str, field: F) -> Vec<&'a Book>
    where
        F: Fn(&'a Book) -> &'a String,
    {
        let needle_lower = needle.to_lowercase();

        self.books
            .iter()
            .filter(|book| field(*book).to_lowercase().contains(&needle_lower))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_catalog() -> Catalog {
        let mut catalog = Catalog::new();
        catalog.add("Dune", "Frank Herbert", "978-0441013593").unwrap();
        catalog.add("Children of Dune", "Frank Herbert", "978-0593098240").unwrap();
        catalog.add("Neuromancer", "William Gibson", "978-0441569595").unwrap();
        catalog
    }

    #[test]
    fn test_catalog_add() {
        let mut catalog = Catalog::new();
        let book = catalog.add("Dune", "Herbert", "111").unwrap();

        assert_eq!(catalog.len(), 1);
        assert!(book.available);
        assert_eq!(catalog.get(book.id), Some(&book));
    }

    #[test]
    fn test_catalog_accepts_blank_and_duplicate_fields() {
        let mut catalog = Catalog::new();
        let a = catalog.add("", "", "").unwrap();
        let b = catalog.add("", "", "").unwrap();

        assert_eq!(catalog.len(), 2);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_catalog_find_by_title() {
        let catalog = sample_catalog();

        // Case insensitive, substring, insertion order
        let results = catalog.find_by_title("DUNE");
        let titles: Vec<_> = results.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, vec!["Dune", "Children of Dune"]);

        assert!(catalog.find_by_title("python").is_empty());
    }

    #[test]
    fn test_catalog_find_by_author_and_isbn() {
        let catalog = sample_catalog();

        assert_eq!(catalog.find_by_author("herbert").len(), 2);
        assert_eq!(catalog.find_by_author("gibson").len(), 1);

        // Substring match on ISBN too
        assert_eq!(catalog.find_by_isbn("0441").len(), 2);
        assert_eq!(catalog.find_by_isbn("978-0593098240").len(), 1);
    }

    #[test]
    fn test_empty_needle_matches_everything() {
        let catalog = sample_catalog();
        assert_eq!(catalog.find_by_title("").len(), 3);
    }

    #[test]
    fn test_catalog_search_deduplicates() {
        let mut catalog = Catalog::new();
        // Matches "herbert" on title and author
        catalog.add("Herbert's Notes", "Frank Herbert", "1").unwrap();
        catalog.add("Dune", "Frank Herbert", "2").unwrap();
        catalog.add("Other", "Someone", "herbert-3").unwrap();

        let results = catalog.search("herbert");
        let titles: Vec<_> = results.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, vec!["Herbert's Notes", "Dune", "Other"]);
    }

    #[test]
    fn test_from_books_keeps_ids_unique() {
        let mut catalog = sample_catalog();
        let max_id = catalog.books().iter().map(|b| b.id).max().unwrap();

        let mut reloaded = Catalog::from_books(catalog.books().to_vec());
        let new_book = reloaded.add("New", "Author", "999").unwrap();
        assert!(new_book.id > max_id);

        // Original keeps issuing ids too
        assert!(catalog.add("Another", "Author", "998").unwrap().id > max_id);
    }

    #[test]
    fn test_first_available_skips_borrowed_copy() {
        let mut catalog = Catalog::new();
        let first = catalog.add("Dune", "Herbert", "111").unwrap();
        let second = catalog.add("Dune", "Herbert", "111").unwrap();

        catalog.first_available_mut("111").unwrap().available = false;
        assert_eq!(catalog.available_count("111"), 1);

        let next = catalog.first_available_mut("111").unwrap();
        assert_eq!(next.id, second.id);
        assert_ne!(next.id, first.id);
    }

    #[test]
    fn test_lent_copy_prefers_id_over_isbn() {
        let mut catalog = Catalog::new();
        catalog.add("Dune", "Herbert", "111").unwrap();
        let second = catalog.add("Dune", "Herbert", "111").unwrap();

        assert_eq!(catalog.lent_copy_mut(second.id, "111").unwrap().id, second.id);

        // Unknown id falls back to the first ISBN match
        let first_id = catalog.books()[0].id;
        assert_eq!(catalog.lent_copy_mut(BookId(1), "111").unwrap().id, first_id);
        assert!(catalog.lent_copy_mut(BookId(1), "999").is_none());
    }

    #[test]
    fn test_add_fails_when_ids_run_out() {
        let last = Book::new(BookId(u64::MAX), "Last", "Author", "1");
        let mut catalog = Catalog::from_books(vec![last]);

        assert_eq!(
            catalog.add("Next", "Author", "2"),
            Err(IdsExhausted(BookId(u64::MAX)))
        );
        assert_eq!(catalog.len(), 1);
    }
}
