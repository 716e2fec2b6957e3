//! Order store
//!
//! The only store that writes across store boundaries: creating an order
//! reserves book stock. Order creation holds the order lock for its whole
//! duration, then takes the customer and book locks in turn, which is the
//! front of the global lock order (Order → Customer → Book → Author).

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, MutexGuard};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::context::Context;
use crate::error::{StoreError, StoreResult};
use crate::types::{NewOrder, NewOrderItem, Order, OrderItem, OrderPatch, DEFAULT_ORDER_STATUS};

use super::book::BookStore;
use super::customer::CustomerStore;
use super::snapshot::{first_id, read_snapshot, resume_next_id, write_snapshot};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct OrderTable {
    #[serde(default)]
    pub(crate) orders: BTreeMap<u64, Order>,
    #[serde(default = "first_id")]
    pub(crate) next_id: u64,
}

impl Default for OrderTable {
    fn default() -> Self {
        Self {
            orders: BTreeMap::new(),
            next_id: first_id(),
        }
    }
}

impl OrderTable {
    /// Lowest order id placed by `customer_id`
    pub(crate) fn first_order_by_customer(&self, customer_id: u64) -> Option<u64> {
        self.orders
            .values()
            .find(|order| order.customer.id == customer_id)
            .map(|order| order.id)
    }
}

#[derive(Debug, Default)]
pub struct OrderStore {
    table: Mutex<OrderTable>,
}

impl OrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, OrderTable> {
        self.table.lock()
    }

    /// Place an order
    ///
    /// Resolves the customer, reserves stock for every line (all or nothing)
    /// and embeds the post-reservation books. The total is computed from the
    /// embedded prices; any client-supplied total is ignored.
    pub fn create(
        &self,
        ctx: &Context,
        order: NewOrder,
        customers: &CustomerStore,
        books: &BookStore,
    ) -> StoreResult<Order> {
        ctx.check()?;
        validate_items(&order.items)?;

        let mut table = self.lock();
        let customer = customers.get(ctx, order.customer.id)?;

        let lines: Vec<(u64, u32)> = order
            .items
            .iter()
            .map(|item| (item.book.id, item.quantity))
            .collect();
        let reserved = books.reserve_stock(ctx, &lines)?;

        let items: Vec<OrderItem> = reserved
            .into_iter()
            .zip(&order.items)
            .map(|(book, item)| OrderItem {
                book,
                quantity: item.quantity,
            })
            .collect();

        let created = Order {
            id: table.next_id,
            customer,
            total_price: Order::total_of(&items),
            items,
            created_at: Utc::now(),
            status: order
                .status
                .unwrap_or_else(|| DEFAULT_ORDER_STATUS.to_string()),
        };
        table.next_id += 1;
        table.orders.insert(created.id, created.clone());

        info!(
            order_id = created.id,
            customer_id = created.customer.id,
            items = created.items.len(),
            total_price = created.total_price,
            "order created"
        );
        Ok(created)
    }

    pub fn get(&self, ctx: &Context, id: u64) -> StoreResult<Order> {
        ctx.check()?;
        self.lock().orders.get(&id).cloned().ok_or_else(|| {
            debug!(order_id = id, "order not found");
            StoreError::not_found("Order", id)
        })
    }

    /// Replace an order's items and/or status
    ///
    /// New items must pass the exact-stock check: each item must name every
    /// book currently in the book store, with a quantity equal to that book's
    /// stock. Stock is not touched, so a sold-out book is matched by a
    /// quantity of zero. `id`, `customer` and `created_at` never change.
    pub fn update(
        &self,
        ctx: &Context,
        id: u64,
        patch: OrderPatch,
        books: &BookStore,
    ) -> StoreResult<Order> {
        ctx.check()?;
        let mut table = self.lock();
        let mut updated = table
            .orders
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("Order", id))?;

        if let Some(items) = patch.items {
            if items.is_empty() {
                return Err(StoreError::invalid("order must contain at least one item"));
            }
            let book_table = books.lock();

            for item in &items {
                for book in book_table.books.values() {
                    if book.id != item.book.id || item.quantity != book.stock {
                        return Err(StoreError::InsufficientStock {
                            book_id: book.id,
                            requested: u64::from(item.quantity),
                            available: book.stock,
                        });
                    }
                }
            }

            updated.items = items
                .iter()
                .map(|item| {
                    book_table
                        .books
                        .get(&item.book.id)
                        .cloned()
                        .map(|book| OrderItem {
                            book,
                            quantity: item.quantity,
                        })
                        .ok_or_else(|| StoreError::not_found("Book", item.book.id))
                })
                .collect::<StoreResult<_>>()?;
            updated.total_price = Order::total_of(&updated.items);
        }
        if let Some(status) = patch.status {
            updated.status = status;
        }

        table.orders.insert(id, updated.clone());
        info!(order_id = id, status = %updated.status, "order updated");
        Ok(updated)
    }

    /// Remove an order; reserved stock is not returned
    pub fn delete(&self, ctx: &Context, id: u64) -> StoreResult<()> {
        ctx.check()?;
        match self.lock().orders.remove(&id) {
            Some(_) => {
                info!(order_id = id, "order deleted");
                Ok(())
            }
            None => Err(StoreError::not_found("Order", id)),
        }
    }

    pub fn list(&self, ctx: &Context) -> StoreResult<Vec<Order>> {
        ctx.check()?;
        Ok(self.lock().orders.values().cloned().collect())
    }

    /// Creation time of every order, keyed by id
    pub fn view_history(&self, ctx: &Context) -> StoreResult<BTreeMap<u64, DateTime<Utc>>> {
        ctx.check()?;
        let history: BTreeMap<u64, DateTime<Utc>> = self
            .lock()
            .orders
            .values()
            .map(|order| (order.id, order.created_at))
            .collect();

        if history.is_empty() {
            return Err(StoreError::NotFound("no orders found".to_string()));
        }
        Ok(history)
    }

    /// Orders with `start <= created_at <= end`
    pub fn fetch_within_time_range(
        &self,
        ctx: &Context,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> StoreResult<Vec<Order>> {
        ctx.check()?;
        if end < start {
            return Err(StoreError::invalid(format!(
                "end time {} is before start time {}",
                end.to_rfc3339(),
                start.to_rfc3339()
            )));
        }

        Ok(self
            .lock()
            .orders
            .values()
            .filter(|order| order.created_at >= start && order.created_at <= end)
            .cloned()
            .collect())
    }

    pub fn len(&self) -> usize {
        self.lock().orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn next_id(&self) -> u64 {
        self.lock().next_id
    }

    pub fn load(&self, ctx: &Context, path: &Path) -> StoreResult<()> {
        ctx.check()?;
        let mut loaded: OrderTable = read_snapshot(path)?.unwrap_or_default();
        loaded.next_id = resume_next_id(loaded.next_id, loaded.orders.keys().copied());

        info!(count = loaded.orders.len(), next_id = loaded.next_id, "orders loaded");
        *self.lock() = loaded;
        Ok(())
    }

    pub fn save(&self, ctx: &Context, path: &Path) -> StoreResult<()> {
        ctx.check()?;
        let snapshot = self.lock().clone();
        write_snapshot(path, &snapshot)?;
        info!(count = snapshot.orders.len(), path = %path.display(), "orders saved");
        Ok(())
    }
}

fn validate_items(items: &[NewOrderItem]) -> StoreResult<()> {
    if items.is_empty() {
        return Err(StoreError::invalid("order must contain at least one item"));
    }
    if let Some(item) = items.iter().find(|item| item.quantity == 0) {
        return Err(StoreError::invalid(format!(
            "quantity for book {} must be at least 1",
            item.book.id
        )));
    }
    Ok(())
}
