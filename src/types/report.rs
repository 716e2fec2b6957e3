//! Sales report types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Book;

/// Quantity sold for one book within a report window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookSales {
    pub book: Book,
    pub quantity_sold: u64,
}

/// Write-once aggregate over the orders of a trailing window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesReport {
    pub timestamp: DateTime<Utc>,
    pub total_revenue: f64,
    pub total_orders: usize,
    /// Every book tied at the highest quantity sold
    #[serde(default)]
    pub top_selling_books: Vec<BookSales>,
}
