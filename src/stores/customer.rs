//! Customer store

use std::collections::BTreeMap;
use std::path::Path;

use chrono::Utc;
use parking_lot::{Mutex, MutexGuard};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::context::Context;
use crate::error::{StoreError, StoreResult};
use crate::types::{Address, Customer, CustomerPatch, NewCustomer};

use super::order::OrderStore;
use super::snapshot::{first_id, read_snapshot, resume_next_id, write_snapshot};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct CustomerTable {
    #[serde(default)]
    pub(crate) customers: BTreeMap<u64, Customer>,
    #[serde(default = "first_id")]
    pub(crate) next_id: u64,
}

impl Default for CustomerTable {
    fn default() -> Self {
        Self {
            customers: BTreeMap::new(),
            next_id: first_id(),
        }
    }
}

/// Owns customer records
///
/// Lock order: after the order lock, before the book and author locks.
#[derive(Debug, Default)]
pub struct CustomerStore {
    table: Mutex<CustomerTable>,
}

impl CustomerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, CustomerTable> {
        self.table.lock()
    }

    /// Create a customer; `created_at` is stamped here
    pub fn create(&self, ctx: &Context, customer: NewCustomer) -> StoreResult<Customer> {
        ctx.check()?;
        validate_contact(&customer.name, &customer.email)?;
        validate_address(customer.address.as_ref())?;

        let mut table = self.lock();
        let created = Customer {
            id: table.next_id,
            name: customer.name,
            email: customer.email,
            address: customer.address,
            created_at: Utc::now(),
        };
        table.next_id += 1;
        table.customers.insert(created.id, created.clone());

        info!(customer_id = created.id, "customer created");
        Ok(created)
    }

    pub fn get(&self, ctx: &Context, id: u64) -> StoreResult<Customer> {
        ctx.check()?;
        self.lock().customers.get(&id).cloned().ok_or_else(|| {
            debug!(customer_id = id, "customer not found");
            StoreError::not_found("Customer", id)
        })
    }

    /// Merge a patch; an address in the patch replaces the whole address
    pub fn update(&self, ctx: &Context, id: u64, patch: CustomerPatch) -> StoreResult<Customer> {
        ctx.check()?;
        let mut table = self.lock();
        let customer = table
            .customers
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("Customer", id))?;

        let mut updated = customer.clone();
        if let Some(name) = patch.name {
            updated.name = name;
        }
        if let Some(email) = patch.email {
            updated.email = email;
        }
        if let Some(address) = patch.address {
            updated.address = address;
        }
        validate_contact(&updated.name, &updated.email)?;
        validate_address(updated.address.as_ref())?;

        *customer = updated.clone();
        info!(customer_id = id, "customer updated");
        Ok(updated)
    }

    /// Remove a customer no order refers to
    ///
    /// The order lock is taken first so no order for this customer can be
    /// created between the reference check and the removal.
    pub fn delete(&self, ctx: &Context, id: u64, orders: &OrderStore) -> StoreResult<()> {
        ctx.check()?;
        let order_table = orders.lock();
        let mut table = self.lock();

        if !table.customers.contains_key(&id) {
            return Err(StoreError::not_found("Customer", id));
        }
        if let Some(order_id) = order_table.first_order_by_customer(id) {
            return Err(StoreError::conflict(format!(
                "customer {} has order {}; delete the customer's orders first",
                id, order_id
            )));
        }

        table.customers.remove(&id);
        info!(customer_id = id, "customer deleted");
        Ok(())
    }

    pub fn list(&self, ctx: &Context) -> StoreResult<Vec<Customer>> {
        ctx.check()?;
        Ok(self.lock().customers.values().cloned().collect())
    }

    pub fn len(&self) -> usize {
        self.lock().customers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn next_id(&self) -> u64 {
        self.lock().next_id
    }

    pub fn load(&self, ctx: &Context, path: &Path) -> StoreResult<()> {
        ctx.check()?;
        let mut loaded: CustomerTable = read_snapshot(path)?.unwrap_or_default();
        loaded.next_id = resume_next_id(loaded.next_id, loaded.customers.keys().copied());

        info!(count = loaded.customers.len(), next_id = loaded.next_id, "customers loaded");
        *self.lock() = loaded;
        Ok(())
    }

    pub fn save(&self, ctx: &Context, path: &Path) -> StoreResult<()> {
        ctx.check()?;
        let snapshot = self.lock().clone();
        write_snapshot(path, &snapshot)?;
        info!(count = snapshot.customers.len(), path = %path.display(), "customers saved");
        Ok(())
    }
}

fn validate_contact(name: &str, email: &str) -> StoreResult<()> {
    if name.trim().is_empty() {
        return Err(StoreError::invalid("customer name is required"));
    }
    if email.trim().is_empty() {
        return Err(StoreError::invalid("customer email is required"));
    }
    Ok(())
}

fn validate_address(address: Option<&Address>) -> StoreResult<()> {
    match address {
        Some(address) if !address.is_complete() => Err(StoreError::invalid(
            "address requires street, city, state, postal_code and country",
        )),
        _ => Ok(()),
    }
}
