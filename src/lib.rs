//! Bookstore data layer
//!
//! An in-process store for authors, books, customers and orders with
//! referential integrity across the four collections, snapshot persistence,
//! and a background job that writes daily sales reports.
//!
//! # Features
//!
//! - **Four stores**: one exclusive lock each, taken in a fixed global order
//! - **Integrity**: authors with books and customers with orders cannot be deleted
//! - **Stock**: order creation reserves stock for every line or for none
//! - **Snapshots**: one JSON file per store, written atomically at shutdown
//! - **Reports**: `report_<date>.json` files from a trailing window of orders
//!
//! # Modules
//!
//! - `types`: Records, create payloads, patches and the sales report shape
//! - `stores`: The four stores and the `Stores` service object
//! - `reports`: Report generation, scheduling and the report archive
//! - `api`: Axum REST endpoints over the stores
//! - `config`: Runtime configuration from the environment
//! - `context`: Per-request cancellation
//! - `utils`: Atomic file writes and date helpers
//!
//! # Example
//!
//! ```no_run
//! use bookstore::{Context, NewAuthor, NewBook, Stores};
//!
//! let stores = Stores::new();
//! let ctx = Context::background();
//! let author = stores.authors.create(&ctx, NewAuthor::new("Frank", "Herbert")).unwrap();
//! let book = stores
//!     .books
//!     .create(&ctx, NewBook::new("Dune", author.id, 9.99, 3), &stores.authors)
//!     .unwrap();
//! assert_eq!(book.author.last_name, "Herbert");
//! ```

pub mod api;
pub mod config;
pub mod context;
pub mod error;
pub mod reports;
pub mod stores;
pub mod types;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::Config;
pub use context::Context;
pub use error::{StoreError, StoreResult};
pub use reports::{list_reports, ReportScheduler};
pub use stores::{AuthorStore, BookStore, CustomerStore, OrderStore, Stores};
pub use types::{
    Address, Author, AuthorPatch, AuthorSelector, Book, BookPatch, BookSales, Customer,
    CustomerPatch, NewAuthor, NewBook, NewCustomer, NewOrder, NewOrderItem, Order, OrderItem,
    OrderPatch, SalesReport, SearchCriteria,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
