//! In-memory stores for authors, books, customers and orders
//!
//! Each store guards its map and id counter with a single exclusive lock.
//! Operations that touch more than one store take locks in a fixed order:
//!
//! ```text
//! Order → Customer → Book → Author
//! ```
//!
//! No store takes a lock earlier in this order while holding a later one.
//!
//! Persistence is snapshot based: [`Stores::load_all`] at startup and
//! [`Stores::save_all`] at shutdown, one JSON file per store.

mod author;
mod book;
mod customer;
mod order;
mod snapshot;

use std::path::Path;
use std::sync::Arc;

use tracing::{error, info};

use crate::context::Context;
use crate::error::{StoreError, StoreResult};

pub use author::AuthorStore;
pub use book::BookStore;
pub use customer::CustomerStore;
pub use order::OrderStore;

pub const AUTHORS_FILE: &str = "authors.json";
pub const BOOKS_FILE: &str = "books.json";
pub const CUSTOMERS_FILE: &str = "customers.json";
pub const ORDERS_FILE: &str = "orders.json";

/// The four stores, shared between request handlers and the report scheduler
#[derive(Debug, Clone, Default)]
pub struct Stores {
    pub authors: Arc<AuthorStore>,
    pub books: Arc<BookStore>,
    pub customers: Arc<CustomerStore>,
    pub orders: Arc<OrderStore>,
}

impl Stores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every store from `dir`
    ///
    /// A missing file leaves that store empty. Any other failure is returned
    /// as-is and the remaining stores are not loaded.
    pub fn load_all(&self, ctx: &Context, dir: &Path) -> StoreResult<()> {
        self.authors.load(ctx, &dir.join(AUTHORS_FILE))?;
        self.books.load(ctx, &dir.join(BOOKS_FILE))?;
        self.customers.load(ctx, &dir.join(CUSTOMERS_FILE))?;
        self.orders.load(ctx, &dir.join(ORDERS_FILE))?;

        info!(
            authors = self.authors.len(),
            books = self.books.len(),
            customers = self.customers.len(),
            orders = self.orders.len(),
            dir = %dir.display(),
            "stores loaded"
        );
        Ok(())
    }

    /// Save every store to `dir`
    ///
    /// Keeps going after a failure so one bad file does not cost the other
    /// snapshots. Returns the first error once all four have been attempted.
    pub fn save_all(&self, ctx: &Context, dir: &Path) -> StoreResult<()> {
        let results = [
            (AUTHORS_FILE, self.authors.save(ctx, &dir.join(AUTHORS_FILE))),
            (BOOKS_FILE, self.books.save(ctx, &dir.join(BOOKS_FILE))),
            (CUSTOMERS_FILE, self.customers.save(ctx, &dir.join(CUSTOMERS_FILE))),
            (ORDERS_FILE, self.orders.save(ctx, &dir.join(ORDERS_FILE))),
        ];

        let mut first_error: Option<StoreError> = None;
        for (file, result) in results {
            if let Err(e) = result {
                error!(file, error = %e, "failed to save snapshot");
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => {
                info!(dir = %dir.display(), "stores saved");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NewAuthor, NewBook, NewCustomer, NewOrder, NewOrderItem};
    use tempfile::TempDir;

    #[test]
    fn test_save_all_then_load_all() {
        let temp_dir = TempDir::new().unwrap();
        let ctx = Context::background();

        let stores = Stores::new();
        let author = stores.authors.create(&ctx, NewAuthor::new("A", "B")).unwrap();
        let book = stores
            .books
            .create(&ctx, NewBook::new("T", author.id, 4.0, 3), &stores.authors)
            .unwrap();
        let customer = stores
            .customers
            .create(&ctx, NewCustomer::new("C", "c@example.com"))
            .unwrap();
        stores
            .orders
            .create(
                &ctx,
                NewOrder::new(customer.id, vec![NewOrderItem::new(book.id, 1)]),
                &stores.customers,
                &stores.books,
            )
            .unwrap();

        stores.save_all(&ctx, temp_dir.path()).unwrap();
        for file in [AUTHORS_FILE, BOOKS_FILE, CUSTOMERS_FILE, ORDERS_FILE] {
            assert!(temp_dir.path().join(file).exists());
        }

        let restored = Stores::new();
        restored.load_all(&ctx, temp_dir.path()).unwrap();
        assert_eq!(restored.authors.list(&ctx).unwrap(), stores.authors.list(&ctx).unwrap());
        assert_eq!(
            restored.books.list(&ctx, &restored.authors).unwrap(),
            stores.books.list(&ctx, &stores.authors).unwrap()
        );
        assert_eq!(
            restored.customers.list(&ctx).unwrap(),
            stores.customers.list(&ctx).unwrap()
        );
        assert_eq!(restored.orders.list(&ctx).unwrap(), stores.orders.list(&ctx).unwrap());
        assert_eq!(restored.orders.next_id(), 2);
    }

    #[test]
    fn test_load_all_from_empty_dir() {
        let temp_dir = TempDir::new().unwrap();
        let stores = Stores::new();
        stores.load_all(&Context::background(), temp_dir.path()).unwrap();

        assert!(stores.authors.is_empty());
        assert_eq!(stores.books.next_id(), 1);
    }

    #[test]
    fn test_load_all_fails_on_corrupt_file() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join(BOOKS_FILE), "{ truncated").unwrap();

        let stores = Stores::new();
        assert!(stores.load_all(&Context::background(), temp_dir.path()).is_err());
    }

    #[test]
    fn test_save_all_cancelled() {
        let temp_dir = TempDir::new().unwrap();
        let ctx = Context::new();
        ctx.cancel();

        let err = Stores::new().save_all(&ctx, temp_dir.path()).unwrap_err();
        assert!(err.is_cancelled());
        assert!(!temp_dir.path().join(AUTHORS_FILE).exists());
    }
}
