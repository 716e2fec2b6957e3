//! Author store

use std::collections::BTreeMap;
use std::path::Path;

use parking_lot::{Mutex, MutexGuard};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::context::Context;
use crate::error::{StoreError, StoreResult};
use crate::types::{Author, AuthorPatch, NewAuthor};

use super::book::BookStore;
use super::snapshot::{first_id, read_snapshot, resume_next_id, write_snapshot};

/// Map + counter guarded by the author lock; also the on-disk snapshot shape
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct AuthorTable {
    #[serde(default)]
    pub(crate) authors: BTreeMap<u64, Author>,
    #[serde(default = "first_id")]
    pub(crate) next_id: u64,
}

impl Default for AuthorTable {
    fn default() -> Self {
        Self {
            authors: BTreeMap::new(),
            next_id: first_id(),
        }
    }
}

impl AuthorTable {
    fn insert(&mut self, new: NewAuthor) -> Author {
        let author = Author {
            id: self.next_id,
            first_name: new.first_name,
            last_name: new.last_name,
            bio: new.bio,
        };
        self.next_id += 1;
        self.authors.insert(author.id, author.clone());
        author
    }
}

/// Owns author records
///
/// Reads and writes both take the single exclusive lock. Last in the global
/// lock order (Order → Customer → Book → Author): nothing else is locked
/// while the author lock is held.
#[derive(Debug, Default)]
pub struct AuthorStore {
    table: Mutex<AuthorTable>,
}

impl AuthorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, AuthorTable> {
        self.table.lock()
    }

    /// Create an author and assign the next id
    pub fn create(&self, ctx: &Context, author: NewAuthor) -> StoreResult<Author> {
        ctx.check()?;
        validate_names(&author.first_name, &author.last_name)?;

        let created = self.lock().insert(author);
        info!(author_id = created.id, "author created");
        Ok(created)
    }

    pub fn get(&self, ctx: &Context, id: u64) -> StoreResult<Author> {
        ctx.check()?;
        self.lock().authors.get(&id).cloned().ok_or_else(|| {
            debug!(author_id = id, "author not found");
            StoreError::not_found("Author", id)
        })
    }

    /// Merge a patch into an existing author
    pub fn update(&self, ctx: &Context, id: u64, patch: AuthorPatch) -> StoreResult<Author> {
        ctx.check()?;
        let mut table = self.lock();
        let author = table
            .authors
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("Author", id))?;

        let mut updated = author.clone();
        patch.apply(&mut updated);
        validate_names(&updated.first_name, &updated.last_name)?;

        *author = updated.clone();
        info!(author_id = id, "author updated");
        Ok(updated)
    }

    /// Remove an author no book refers to
    ///
    /// Takes the book lock before its own so the reference check and the
    /// removal cannot interleave with a concurrent book create.
    pub fn delete(&self, ctx: &Context, id: u64, books: &BookStore) -> StoreResult<()> {
        ctx.check()?;
        let book_table = books.lock();
        let mut table = self.lock();

        if !table.authors.contains_key(&id) {
            return Err(StoreError::not_found("Author", id));
        }
        if let Some(book_id) = book_table.first_book_by_author(id) {
            return Err(StoreError::conflict(format!(
                "author {} is the author of book {}; delete the author's books first",
                id, book_id
            )));
        }

        table.authors.remove(&id);
        info!(author_id = id, "author deleted");
        Ok(())
    }

    /// All authors in id order
    pub fn list(&self, ctx: &Context) -> StoreResult<Vec<Author>> {
        ctx.check()?;
        Ok(self.lock().authors.values().cloned().collect())
    }

    /// Return the lowest-id author with exactly this name, creating one if none exists
    ///
    /// Idempotent: repeated calls with the same name return the same author.
    pub fn find_or_create_by_name(
        &self,
        ctx: &Context,
        first_name: &str,
        last_name: &str,
    ) -> StoreResult<Author> {
        ctx.check()?;
        validate_names(first_name, last_name)?;

        let mut table = self.lock();
        if let Some(existing) = table
            .authors
            .values()
            .find(|a| a.has_name(first_name, last_name))
        {
            return Ok(existing.clone());
        }

        let created = table.insert(NewAuthor::new(first_name, last_name));
        info!(
            author_id = created.id,
            first_name, last_name, "author created by name lookup"
        );
        Ok(created)
    }

    /// Lock-scoped lookup used by other stores (no cancellation check)
    pub(crate) fn lookup(&self, id: u64) -> Option<Author> {
        self.lock().authors.get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().authors.len()
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
        let mut loaded: AuthorTable = read_snapshot(path)?.unwrap_or_default();
        loaded.next_id = resume_next_id(loaded.next_id, loaded.authors.keys().copied());

        info!(count = loaded.authors.len(), next_id = loaded.next_id, "authors loaded");
        *self.lock() = loaded;
        Ok(())
    }

    pub fn save(&self, ctx: &Context, path: &Path) -> StoreResult<()> {
        ctx.check()?;
        let snapshot = self.lock().clone();
        write_snapshot(path, &snapshot)?;
        info!(count = snapshot.authors.len(), path = %path.display(), "authors saved");
        Ok(())
    }
}

fn validate_names(first_name: &str, last_name: &str) -> StoreResult<()> {
    if first_name.trim().is_empty() || last_name.trim().is_empty() {
        return Err(StoreError::invalid("author first_name and last_name are required"));
    }
    Ok(())
}
