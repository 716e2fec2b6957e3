//! Data types for the bookstore
//!
//! Records owned by the stores, the request payloads that create and patch
//! them, and the sales report shape written by the report generator.

mod author;
mod book;
mod customer;
mod order;
mod report;

use serde::{Deserialize, Deserializer, Serialize};

pub use author::{Author, AuthorPatch, NewAuthor};
pub use book::{AuthorSelector, Book, BookPatch, NewBook, SearchCriteria};
pub use customer::{Address, Customer, CustomerPatch, NewCustomer};
pub use order::{NewOrder, NewOrderItem, Order, OrderItem, OrderPatch, DEFAULT_ORDER_STATUS};
pub use report::{BookSales, SalesReport};

/// Reference to another record by id (`{"id": 1}`); other fields are ignored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    pub id: u64,
}

impl EntityRef {
    pub fn new(id: u64) -> Self {
        Self { id }
    }
}

/// Keep `null` distinct from an absent field: absent -> None, null -> Some(None)
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
