//! Order types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Book, Customer, EntityRef};

/// Status given to orders created without one
pub const DEFAULT_ORDER_STATUS: &str = "pending";

/// Line item with the book as it was right after stock was reserved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub book: Book,
    pub quantity: u32,
}

/// Order record; `id`, `customer` and `created_at` are fixed at creation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: u64,
    pub customer: Customer,
    pub items: Vec<OrderItem>,
    pub total_price: f64,
    pub created_at: DateTime<Utc>,
    pub status: String,
}

impl Order {
    /// Sum of price x quantity over the embedded books
    pub fn total_of(items: &[OrderItem]) -> f64 {
        items
            .iter()
            .map(|item| item.book.price * f64::from(item.quantity))
            .sum()
    }
}

/// Requested line item: a book reference and how many copies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOrderItem {
    pub book: EntityRef,
    pub quantity: u32,
}

impl NewOrderItem {
    pub fn new(book_id: u64, quantity: u32) -> Self {
        Self {
            book: EntityRef::new(book_id),
            quantity,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrder {
    pub customer: EntityRef,
    pub items: Vec<NewOrderItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl NewOrder {
    pub fn new(customer_id: u64, items: Vec<NewOrderItem>) -> Self {
        Self {
            customer: EntityRef::new(customer_id),
            items,
            status: None,
        }
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }
}

/// Partial update for an order; the customer is not updatable
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<NewOrderItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}
