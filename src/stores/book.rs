//! Book store
//!
//! Books embed a full copy of their author. The copy is resolved against the
//! author store when a book is written and refreshed on every read. Stock is
//! only ever decremented through [`BookStore::reserve_stock`], which the order
//! store calls while holding its own lock.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use parking_lot::{Mutex, MutexGuard};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::context::Context;
use crate::error::{StoreError, StoreResult};
use crate::types::{AuthorSelector, Book, BookPatch, NewBook, SearchCriteria};

use super::author::AuthorStore;
use super::snapshot::{first_id, read_snapshot, resume_next_id, write_snapshot};

/// Map + counter guarded by the book lock; also the on-disk snapshot shape
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct BookTable {
    #[serde(default)]
    pub(crate) books: BTreeMap<u64, Book>,
    #[serde(default = "first_id")]
    pub(crate) next_id: u64,
}

impl Default for BookTable {
    fn default() -> Self {
        Self {
            books: BTreeMap::new(),
            next_id: first_id(),
        }
    }
}

impl BookTable {
    /// Lowest book id whose embedded author is `author_id`
    pub(crate) fn first_book_by_author(&self, author_id: u64) -> Option<u64> {
        self.books
            .values()
            .find(|book| book.author.id == author_id)
            .map(|book| book.id)
    }
}

/// Owns book records
///
/// Lock order: taken after the order and customer locks, before the author lock.
#[derive(Debug, Default)]
pub struct BookStore {
    table: Mutex<BookTable>,
}

impl BookStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, BookTable> {
        self.table.lock()
    }

    /// Create a book whose `author.id` names an existing author
    ///
    /// The embedded author is replaced by the authoritative record.
    pub fn create(&self, ctx: &Context, book: NewBook, authors: &AuthorStore) -> StoreResult<Book> {
        ctx.check()?;
        validate_title(&book.title)?;
        validate_price(book.price)?;

        let mut table = self.lock();
        let author = authors
            .lookup(book.author.id)
            .ok_or_else(|| StoreError::not_found("Author", book.author.id))?;

        let created = Book {
            id: table.next_id,
            title: book.title,
            author,
            genres: book.genres,
            published_at: book.published_at,
            price: book.price,
            stock: book.stock,
        };
        table.next_id += 1;
        table.books.insert(created.id, created.clone());

        info!(book_id = created.id, author_id = created.author.id, "book created");
        Ok(created)
    }

    /// Fetch a book with its embedded author refreshed
    ///
    /// If the author has vanished the stale embedded copy is returned and the
    /// inconsistency is logged.
    pub fn get(&self, ctx: &Context, id: u64, authors: &AuthorStore) -> StoreResult<Book> {
        ctx.check()?;
        let table = self.lock();
        let book = table.books.get(&id).ok_or_else(|| {
            debug!(book_id = id, "book not found");
            StoreError::not_found("Book", id)
        })?;
        Ok(with_current_author(book, authors))
    }

    /// Merge a patch into an existing book
    ///
    /// An author selected by id must exist. An author selected by name goes
    /// through [`AuthorStore::find_or_create_by_name`], so an update can add a
    /// new author record.
    pub fn update(
        &self,
        ctx: &Context,
        id: u64,
        patch: BookPatch,
        authors: &AuthorStore,
    ) -> StoreResult<Book> {
        ctx.check()?;
        if let Some(title) = &patch.title {
            validate_title(title)?;
        }
        if let Some(price) = patch.price {
            validate_price(price)?;
        }

        let mut table = self.lock();
        let mut updated = table
            .books
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("Book", id))?;

        if let Some(selector) = patch.author {
            updated.author = match selector {
                AuthorSelector::Id { id: author_id } => authors
                    .lookup(author_id)
                    .ok_or_else(|| StoreError::not_found("Author", author_id))?,
                AuthorSelector::Name {
                    first_name,
                    last_name,
                } => authors.find_or_create_by_name(ctx, &first_name, &last_name)?,
            };
        }
        if let Some(title) = patch.title {
            updated.title = title;
        }
        if let Some(genres) = patch.genres {
            updated.genres = genres;
        }
        if let Some(published_at) = patch.published_at {
            updated.published_at = published_at;
        }
        if let Some(price) = patch.price {
            updated.price = price;
        }
        if let Some(stock) = patch.stock {
            updated.stock = stock;
        }

        table.books.insert(id, updated.clone());
        info!(book_id = id, author_id = updated.author.id, "book updated");
        Ok(updated)
    }

    /// Remove a book; orders keep their embedded copies
    pub fn delete(&self, ctx: &Context, id: u64) -> StoreResult<()> {
        ctx.check()?;
        match self.lock().books.remove(&id) {
            Some(_) => {
                info!(book_id = id, "book deleted");
                Ok(())
            }
            None => Err(StoreError::not_found("Book", id)),
        }
    }

    /// Linear scan over all books; an empty result is NotFound
    ///
    /// Author criteria match against the current author records, not the
    /// copies embedded at write time.
    pub fn search(
        &self,
        ctx: &Context,
        criteria: &SearchCriteria,
        authors: &AuthorStore,
    ) -> StoreResult<Vec<Book>> {
        ctx.check()?;
        let found: Vec<Book> = self
            .lock()
            .books
            .values()
            .map(|book| with_current_author(book, authors))
            .filter(|book| criteria.matches(book))
            .collect();

        if found.is_empty() {
            return Err(StoreError::NotFound("no books found".to_string()));
        }
        debug!(count = found.len(), "book search");
        Ok(found)
    }

    /// All books in id order, authors refreshed
    pub fn list(&self, ctx: &Context, authors: &AuthorStore) -> StoreResult<Vec<Book>> {
        ctx.check()?;
        Ok(self
            .lock()
            .books
            .values()
            .map(|book| with_current_author(book, authors))
            .collect())
    }

    /// Take stock for a set of order lines, all or nothing
    ///
    /// Quantities for the same book are summed. Every line is validated
    /// before any stock is touched, so a NotFound or InsufficientStock leaves
    /// every book unchanged. Returns the post-decrement book for each line,
    /// in request order.
    pub fn reserve_stock(&self, ctx: &Context, lines: &[(u64, u32)]) -> StoreResult<Vec<Book>> {
        ctx.check()?;
        let mut table = self.lock();

        // Phase 1: validate
        let mut wanted: HashMap<u64, u64> = HashMap::new();
        for &(book_id, quantity) in lines {
            *wanted.entry(book_id).or_insert(0) += u64::from(quantity);
        }
        for &(book_id, _) in lines {
            let book = table
                .books
                .get(&book_id)
                .ok_or_else(|| StoreError::not_found("Book", book_id))?;
            let requested = wanted[&book_id];
            if requested > u64::from(book.stock) {
                return Err(StoreError::InsufficientStock {
                    book_id,
                    requested,
                    available: book.stock,
                });
            }
        }

        // Phase 2: commit
        for (book_id, quantity) in &wanted {
            if let Some(book) = table.books.get_mut(book_id) {
                // Validated above: quantity <= stock fits in u32
                book.stock -= *quantity as u32;
                debug!(book_id, remaining = book.stock, "stock reserved");
            }
        }

        Ok(lines
            .iter()
            .filter_map(|(book_id, _)| table.books.get(book_id).cloned())
            .collect())
    }

    /// Lock-scoped lookup used by the report generator (no cancellation check)
    pub(crate) fn lookup(&self, id: u64) -> Option<Book> {
        self.lock().books.get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn next_id(&self) -> u64 {
        self.lock().next_id
    }

    /// Replace the store contents with a snapshot file; a missing file resets to empty
    pub fn load(&self, ctx: &Context, path: &Path) -> StoreResult<()> {
        ctx.check()?;
        let mut loaded: BookTable = read_snapshot(path)?.unwrap_or_default();
        loaded.next_id = resume_next_id(loaded.next_id, loaded.books.keys().copied());

        info!(count = loaded.books.len(), next_id = loaded.next_id, "books loaded");
        *self.lock() = loaded;
        Ok(())
    }

    pub fn save(&self, ctx: &Context, path: &Path) -> StoreResult<()> {
        ctx.check()?;
        let snapshot = self.lock().clone();
        write_snapshot(path, &snapshot)?;
        info!(count = snapshot.books.len(), path = %path.display(), "books saved");
        Ok(())
    }
}

/// Copy of `book` carrying the author store's current record
///
/// Called with the book lock held; takes the author lock, which is later in
/// the global order. A vanished author leaves the stale embedded copy and
/// logs the inconsistency.
fn with_current_author(book: &Book, authors: &AuthorStore) -> Book {
    let mut book = book.clone();
    match authors.lookup(book.author.id) {
        Some(author) => book.author = author,
        None => warn!(
            book_id = book.id,
            author_id = book.author.id,
            "embedded author no longer exists, returning stale copy"
        ),
    }
    book
}

fn validate_title(title: &str) -> StoreResult<()> {
    if title.trim().is_empty() {
        return Err(StoreError::invalid("book title is required"));
    }
    Ok(())
}

fn validate_price(price: f64) -> StoreResult<()> {
    if !price.is_finite() || price <= 0.0 {
        return Err(StoreError::invalid(format!(
            "book price must be greater than 0, got {}",
            price
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AuthorPatch, NewAuthor};
    use tempfile::TempDir;

    fn ctx() -> Context {
        Context::background()
    }

    fn setup() -> (AuthorStore, BookStore, u64) {
        let authors = AuthorStore::new();
        let books = BookStore::new();
        let author = authors.create(&ctx(), NewAuthor::new("Frank", "Herbert")).unwrap();
        (authors, books, author.id)
    }

    #[test]
    fn test_create_embeds_authoritative_author() {
        let (authors, books, author_id) = setup();
        let book = books
            .create(
                &ctx(),
                NewBook::new("Dune", author_id, 9.99, 3).with_genres(["sci-fi"]),
                &authors,
            )
            .unwrap();

        assert_eq!(book.id, 1);
        assert_eq!(book.author.first_name, "Frank");
        assert_eq!(book.stock, 3);
    }

    #[test]
    fn test_create_with_unknown_author() {
        let (authors, books, _) = setup();
        let err = books
            .create(&ctx(), NewBook::new("Dune", 99, 9.99, 3), &authors)
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(books.is_empty());
    }

    #[test]
    fn test_create_rejects_bad_price() {
        let (authors, books, author_id) = setup();
        for price in [0.0, -1.0, f64::NAN] {
            let err = books
                .create(&ctx(), NewBook::new("Dune", author_id, price, 3), &authors)
                .unwrap_err();
            assert!(err.is_invalid_input());
        }
    }

    #[test]
    fn test_get_refreshes_author() {
        let (authors, books, author_id) = setup();
        let book = books
            .create(&ctx(), NewBook::new("Dune", author_id, 9.99, 3), &authors)
            .unwrap();

        authors
            .update(
                &ctx(),
                author_id,
                AuthorPatch {
                    bio: Some("Arrakis".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        let fetched = books.get(&ctx(), book.id, &authors).unwrap();
        assert_eq!(fetched.author.bio, "Arrakis");
    }

    #[test]
    fn test_get_keeps_stale_author_when_missing() {
        let (authors, books, author_id) = setup();
        let book = books
            .create(&ctx(), NewBook::new("Dune", author_id, 9.99, 3), &authors)
            .unwrap();

        // Bypass the integrity check to simulate an inconsistent snapshot
        authors.lock().authors.remove(&author_id);

        let fetched = books.get(&ctx(), book.id, &authors).unwrap();
        assert_eq!(fetched.author.first_name, "Frank");
    }

    #[test]
    fn test_update_by_name_creates_author() {
        let (authors, books, author_id) = setup();
        let book = books
            .create(&ctx(), NewBook::new("Dune", author_id, 9.99, 3), &authors)
            .unwrap();

        let patch = BookPatch {
            author: Some(AuthorSelector::Name {
                first_name: "Brian".to_string(),
                last_name: "Herbert".to_string(),
            }),
            price: Some(12.5),
            ..Default::default()
        };
        let updated = books.update(&ctx(), book.id, patch, &authors).unwrap();

        assert_eq!(authors.len(), 2);
        assert_eq!(updated.author.first_name, "Brian");
        assert_eq!(updated.price, 12.5);
        assert_eq!(updated.title, "Dune");
        assert_eq!(updated.id, book.id);
    }

    #[test]
    fn test_update_with_fetched_author_object_uses_names() {
        let (authors, books, author_id) = setup();
        let book = books
            .create(&ctx(), NewBook::new("Dune", author_id, 9.99, 3), &authors)
            .unwrap();

        // A client echoing back the embedded author with edited names
        let patch: BookPatch = serde_json::from_value(serde_json::json!({
            "author": {"id": author_id, "first_name": "Ursula", "last_name": "Le Guin", "bio": ""}
        }))
        .unwrap();
        let updated = books.update(&ctx(), book.id, patch, &authors).unwrap();

        assert_eq!(authors.len(), 2);
        assert_ne!(updated.author.id, author_id);
        assert_eq!(updated.author.last_name, "Le Guin");
    }

    #[test]
    fn test_update_by_existing_name_reuses_author() {
        let (authors, books, author_id) = setup();
        let book = books
            .create(&ctx(), NewBook::new("Dune", author_id, 9.99, 3), &authors)
            .unwrap();

        let patch = BookPatch {
            author: Some(AuthorSelector::Name {
                first_name: "Frank".to_string(),
                last_name: "Herbert".to_string(),
            }),
            ..Default::default()
        };
        let updated = books.update(&ctx(), book.id, patch, &authors).unwrap();

        assert_eq!(authors.len(), 1);
        assert_eq!(updated.author.id, author_id);
    }

    #[test]
    fn test_update_missing_book_and_author() {
        let (authors, books, author_id) = setup();
        let err = books
            .update(&ctx(), 7, BookPatch::default(), &authors)
            .unwrap_err();
        assert!(err.is_not_found());

        let book = books
            .create(&ctx(), NewBook::new("Dune", author_id, 9.99, 3), &authors)
            .unwrap();
        let patch = BookPatch {
            author: Some(AuthorSelector::Id { id: 42 }),
            ..Default::default()
        };
        assert!(books.update(&ctx(), book.id, patch, &authors).unwrap_err().is_not_found());
    }

    #[test]
    fn test_update_can_clear_genres() {
        let (authors, books, author_id) = setup();
        let book = books
            .create(
                &ctx(),
                NewBook::new("Dune", author_id, 9.99, 3).with_genres(["sci-fi", "classic"]),
                &authors,
            )
            .unwrap();

        let patch = BookPatch {
            genres: Some(Vec::new()),
            ..Default::default()
        };
        let updated = books.update(&ctx(), book.id, patch, &authors).unwrap();
        assert!(updated.genres.is_empty());
    }

    #[test]
    fn test_delete() {
        let (authors, books, author_id) = setup();
        let book = books
            .create(&ctx(), NewBook::new("Dune", author_id, 9.99, 3), &authors)
            .unwrap();

        books.delete(&ctx(), book.id).unwrap();
        assert!(books.delete(&ctx(), book.id).unwrap_err().is_not_found());
    }

    #[test]
    fn test_search() {
        let (authors, books, author_id) = setup();
        let other = authors.create(&ctx(), NewAuthor::new("Ursula", "Le Guin")).unwrap();
        books
            .create(
                &ctx(),
                NewBook::new("Dune", author_id, 9.99, 3).with_genres(["sci-fi", "classic"]),
                &authors,
            )
            .unwrap();
        books
            .create(
                &ctx(),
                NewBook::new("The Dispossessed", other.id, 8.5, 1).with_genres(["utopia"]),
                &authors,
            )
            .unwrap();

        let all = books.search(&ctx(), &SearchCriteria::default(), &authors).unwrap();
        assert_eq!(all.len(), 2);

        let by_title = SearchCriteria {
            title: "Dune".to_string(),
            ..Default::default()
        };
        assert_eq!(books.search(&ctx(), &by_title, &authors).unwrap()[0].title, "Dune");

        let by_author = SearchCriteria {
            author: "Guin".to_string(),
            ..Default::default()
        };
        assert_eq!(
            books.search(&ctx(), &by_author, &authors).unwrap()[0].title,
            "The Dispossessed"
        );

        let by_joined_genres = SearchCriteria {
            genre: "fi,cla".to_string(),
            ..Default::default()
        };
        assert_eq!(books.search(&ctx(), &by_joined_genres, &authors).unwrap().len(), 1);

        let nothing = SearchCriteria {
            title: "Foundation".to_string(),
            ..Default::default()
        };
        assert!(books.search(&ctx(), &nothing, &authors).unwrap_err().is_not_found());
    }

    #[test]
    fn test_list_and_search_see_renamed_author() {
        let (authors, books, author_id) = setup();
        books
            .create(&ctx(), NewBook::new("Dune", author_id, 9.99, 3), &authors)
            .unwrap();
        authors
            .update(
                &ctx(),
                author_id,
                AuthorPatch {
                    last_name: Some("Herbertson".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        let listed = books.list(&ctx(), &authors).unwrap();
        assert_eq!(listed[0].author.last_name, "Herbertson");

        let by_new_name = SearchCriteria {
            author: "Herbertson".to_string(),
            ..Default::default()
        };
        let found = books.search(&ctx(), &by_new_name, &authors).unwrap();
        assert_eq!(found[0].author.last_name, "Herbertson");
    }

    #[test]
    fn test_search_empty_store_is_not_found() {
        let books = BookStore::new();
        assert!(books
            .search(&ctx(), &SearchCriteria::default(), &AuthorStore::new())
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_reserve_stock_exact_quantity() {
        let (authors, books, author_id) = setup();
        let book = books
            .create(&ctx(), NewBook::new("Dune", author_id, 9.99, 2), &authors)
            .unwrap();

        let reserved = books.reserve_stock(&ctx(), &[(book.id, 2)]).unwrap();
        assert_eq!(reserved[0].stock, 0);
        assert_eq!(books.get(&ctx(), book.id, &authors).unwrap().stock, 0);
    }

    #[test]
    fn test_reserve_stock_is_all_or_nothing() {
        let (authors, books, author_id) = setup();
        let a = books
            .create(&ctx(), NewBook::new("A", author_id, 1.0, 5), &authors)
            .unwrap();
        let b = books
            .create(&ctx(), NewBook::new("B", author_id, 1.0, 1), &authors)
            .unwrap();

        let err = books
            .reserve_stock(&ctx(), &[(a.id, 2), (b.id, 2)])
            .unwrap_err();
        assert!(err.is_insufficient_stock());
        assert_eq!(books.get(&ctx(), a.id, &authors).unwrap().stock, 5);
        assert_eq!(books.get(&ctx(), b.id, &authors).unwrap().stock, 1);

        let err = books.reserve_stock(&ctx(), &[(a.id, 1), (99, 1)]).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(books.get(&ctx(), a.id, &authors).unwrap().stock, 5);
    }

    #[test]
    fn test_reserve_stock_sums_repeated_lines() {
        let (authors, books, author_id) = setup();
        let book = books
            .create(&ctx(), NewBook::new("Dune", author_id, 9.99, 3), &authors)
            .unwrap();

        let err = books
            .reserve_stock(&ctx(), &[(book.id, 2), (book.id, 2)])
            .unwrap_err();
        match err {
            StoreError::InsufficientStock {
                requested,
                available,
                ..
            } => {
                assert_eq!(requested, 4);
                assert_eq!(available, 3);
            }
            other => panic!("unexpected error: {other}"),
        }

        let err = books
            .reserve_stock(&ctx(), &[(book.id, u32::MAX), (book.id, u32::MAX)])
            .unwrap_err();
        match err {
            StoreError::InsufficientStock { requested, .. } => {
                assert_eq!(requested, 2 * u64::from(u32::MAX));
            }
            other => panic!("unexpected error: {other}"),
        }

        let reserved = books
            .reserve_stock(&ctx(), &[(book.id, 1), (book.id, 2)])
            .unwrap();
        assert_eq!(reserved.len(), 2);
        assert!(reserved.iter().all(|b| b.stock == 0));
    }

    #[test]
    fn test_snapshot_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("books.json");
        let (authors, books, author_id) = setup();
        books
            .create(
                &ctx(),
                NewBook::new("Dune", author_id, 9.99, 3).with_genres(["sci-fi"]),
                &authors,
            )
            .unwrap();
        books.save(&ctx(), &path).unwrap();

        let restored = BookStore::new();
        restored.load(&ctx(), &path).unwrap();

        assert_eq!(
            restored.list(&ctx(), &authors).unwrap(),
            books.list(&ctx(), &authors).unwrap()
        );
        assert_eq!(restored.next_id(), books.next_id());
    }
}
