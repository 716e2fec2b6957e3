//! Sales report generation
//!
//! A report aggregates the orders placed in a trailing window: revenue,
//! order count, and every book tied for the highest quantity sold.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::context::Context;
use crate::error::StoreResult;
use crate::stores::{BookStore, OrderStore, Stores};
use crate::types::{Book, BookSales, SalesReport};
use crate::utils::{atomic_write_json, report_file_name, window_start};

/// Aggregate the orders created in `[now - window, now]`
///
/// Returns `None` when the window holds no orders. Top sellers carry the
/// current book record, or the copy embedded in the order if the book has
/// since been deleted, and are sorted by book id.
pub fn generate_sales_report(
    ctx: &Context,
    orders: &OrderStore,
    books: &BookStore,
    window: Duration,
    now: DateTime<Utc>,
) -> StoreResult<Option<SalesReport>> {
    let recent = orders.fetch_within_time_range(ctx, window_start(now, window), now)?;
    if recent.is_empty() {
        return Ok(None);
    }

    let mut total_revenue = 0.0;
    let mut tally: BTreeMap<u64, (u64, Book)> = BTreeMap::new();
    for order in &recent {
        total_revenue += order.total_price;
        for item in &order.items {
            tally
                .entry(item.book.id)
                .or_insert_with(|| (0, item.book.clone()))
                .0 += u64::from(item.quantity);
        }
    }

    let best = tally.values().map(|(sold, _)| *sold).max().unwrap_or(0);
    let top_selling_books = tally
        .into_iter()
        .filter(|(_, (sold, _))| *sold == best)
        .map(|(book_id, (quantity_sold, embedded))| BookSales {
            book: books.lookup(book_id).unwrap_or(embedded),
            quantity_sold,
        })
        .collect();

    Ok(Some(SalesReport {
        timestamp: now,
        total_revenue,
        total_orders: recent.len(),
        top_selling_books,
    }))
}

/// Write `report` as `report_<YYYY-MM-DD>.json` under `dir`
///
/// The date is the report timestamp's UTC date. A second report on the same
/// day replaces the first.
pub fn write_report(dir: &Path, report: &SalesReport) -> StoreResult<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(report_file_name(report.timestamp.date_naive()));
    atomic_write_json(&path, report)?;
    Ok(path)
}

/// One scheduler tick: generate and, if there was anything to report, write
pub fn run_report_tick(
    ctx: &Context,
    stores: &Stores,
    reports_dir: &Path,
    window: Duration,
    now: DateTime<Utc>,
) -> StoreResult<Option<PathBuf>> {
    let Some(report) = generate_sales_report(ctx, &stores.orders, &stores.books, window, now)?
    else {
        debug!("no orders in report window, skipping");
        return Ok(None);
    };

    let path = write_report(reports_dir, &report)?;
    info!(
        path = %path.display(),
        total_orders = report.total_orders,
        total_revenue = report.total_revenue,
        top_sellers = report.top_selling_books.len(),
        "sales report written"
    );
    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NewAuthor, NewBook, NewCustomer, NewOrder, NewOrderItem};
    use tempfile::TempDir;

    const WINDOW: Duration = Duration::from_secs(3 * 60 * 60);

    fn ctx() -> Context {
        Context::background()
    }

    fn seeded() -> (Stores, u64, u64, u64) {
        let stores = Stores::new();
        let author = stores.authors.create(&ctx(), NewAuthor::new("A", "B")).unwrap();
        let cheap = stores
            .books
            .create(&ctx(), NewBook::new("Cheap", author.id, 2.0, 10), &stores.authors)
            .unwrap();
        let dear = stores
            .books
            .create(&ctx(), NewBook::new("Dear", author.id, 20.0, 10), &stores.authors)
            .unwrap();
        let customer = stores
            .customers
            .create(&ctx(), NewCustomer::new("C", "c@example.com"))
            .unwrap();
        (stores, customer.id, cheap.id, dear.id)
    }

    fn order(stores: &Stores, customer_id: u64, items: Vec<NewOrderItem>) {
        stores
            .orders
            .create(
                &ctx(),
                NewOrder::new(customer_id, items),
                &stores.customers,
                &stores.books,
            )
            .unwrap();
    }

    #[test]
    fn test_empty_window_yields_nothing() {
        let (stores, _, _, _) = seeded();
        let report =
            generate_sales_report(&ctx(), &stores.orders, &stores.books, WINDOW, Utc::now())
                .unwrap();
        assert!(report.is_none());
    }

    #[test]
    fn test_report_totals_and_top_seller() {
        let (stores, customer_id, cheap, dear) = seeded();
        order(
            &stores,
            customer_id,
            vec![NewOrderItem::new(cheap, 3), NewOrderItem::new(dear, 1)],
        );
        order(&stores, customer_id, vec![NewOrderItem::new(cheap, 1)]);

        let report =
            generate_sales_report(&ctx(), &stores.orders, &stores.books, WINDOW, Utc::now())
                .unwrap()
                .unwrap();

        assert_eq!(report.total_orders, 2);
        assert_eq!(report.total_revenue, 28.0);
        assert_eq!(report.top_selling_books.len(), 1);
        assert_eq!(report.top_selling_books[0].book.id, cheap);
        assert_eq!(report.top_selling_books[0].quantity_sold, 4);
        // Current record, not the order's snapshot
        assert_eq!(report.top_selling_books[0].book.stock, 6);
    }

    #[test]
    fn test_ties_are_all_reported_in_id_order() {
        let (stores, customer_id, cheap, dear) = seeded();
        order(&stores, customer_id, vec![NewOrderItem::new(dear, 2)]);
        order(&stores, customer_id, vec![NewOrderItem::new(cheap, 2)]);

        let report =
            generate_sales_report(&ctx(), &stores.orders, &stores.books, WINDOW, Utc::now())
                .unwrap()
                .unwrap();

        let ids: Vec<u64> = report.top_selling_books.iter().map(|s| s.book.id).collect();
        assert_eq!(ids, vec![cheap, dear]);
    }

    #[test]
    fn test_deleted_book_falls_back_to_embedded_copy() {
        let (stores, customer_id, cheap, _) = seeded();
        order(&stores, customer_id, vec![NewOrderItem::new(cheap, 1)]);
        stores.books.delete(&ctx(), cheap).unwrap();

        let report =
            generate_sales_report(&ctx(), &stores.orders, &stores.books, WINDOW, Utc::now())
                .unwrap()
                .unwrap();
        assert_eq!(report.top_selling_books[0].book.title, "Cheap");
    }

    #[test]
    fn test_orders_outside_window_are_ignored() {
        let (stores, customer_id, cheap, _) = seeded();
        order(&stores, customer_id, vec![NewOrderItem::new(cheap, 1)]);

        let later = Utc::now() + chrono::Duration::hours(4);
        let report =
            generate_sales_report(&ctx(), &stores.orders, &stores.books, WINDOW, later).unwrap();
        assert!(report.is_none());
    }

    #[test]
    fn test_run_report_tick_writes_dated_file() {
        let temp_dir = TempDir::new().unwrap();
        let reports_dir = temp_dir.path().join("reports");
        let (stores, customer_id, cheap, _) = seeded();

        let now = Utc::now();
        assert!(run_report_tick(&ctx(), &stores, &reports_dir, WINDOW, now)
            .unwrap()
            .is_none());
        assert!(!reports_dir.exists());

        order(&stores, customer_id, vec![NewOrderItem::new(cheap, 1)]);
        let now = Utc::now();
        let path = run_report_tick(&ctx(), &stores, &reports_dir, WINDOW, now)
            .unwrap()
            .unwrap();

        assert_eq!(path, reports_dir.join(report_file_name(now.date_naive())));
        let written: SalesReport =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written.total_orders, 1);
        assert_eq!(written.timestamp, now);
    }
}
