//! # Inventory Engine
//!
//! The facade the presentation layer talks to. One [`Inventory`] is bound to
//! a logical connection name; every operation resolves the live handle
//! through the [`crate::registry`] immediately before use.
//!
//! ## Why Re-Acquire Per Call
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Handle Lifetime                                      │
//! │                                                                         │
//! │  Inventory { conn_name: "gear.db" }   ← holds only the NAME            │
//! │       │                                                                 │
//! │       │  every operation:                                               │
//! │       │    registry::lookup("gear.db") → Database → repository → SQL   │
//! │       ▼                                                                 │
//! │  If the connection is closed (or replaced) between two calls, the      │
//! │  next call fails cleanly with NotFound instead of touching a stale     │
//! │  pool. The registry, not this type, owns handle lifetime.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The engine exposes the only sanctioned mutations. There is deliberately
//! no delete operation for any entity: items and SKUs are corrected via the
//! `update_*` methods, customers and ledger rows are immutable outright.

use chrono::{DateTime, Utc};

use crate::error::DbResult;
use crate::pool::Database;
use crate::registry;
use rentledger_core::{
    Category, CheckinRecord, CheckoutRecord, Customer, CustodyStatus, Item, LedgerEntry, NewItem,
    NewSku, Sku,
};

/// Handle to one inventory store, addressed by connection name.
///
/// Cheap to construct and to clone; holds no database state of its own.
///
/// ## Usage
/// ```rust,ignore
/// let name = registry::open("/data/gear.db").await?;
/// let inventory = Inventory::new(name);
///
/// let cameras = inventory.add_category("Cameras", None).await?;
/// inventory.checkout(1, 5, Utc::now()).await?;
/// ```
#[derive(Debug, Clone)]
pub struct Inventory {
    conn_name: String,
}

impl Inventory {
    /// Binds an engine to a registered connection name.
    ///
    /// The name is not checked here; the first operation surfaces a
    /// `NotFound` if it was never registered.
    pub fn new(conn_name: impl Into<String>) -> Self {
        Inventory {
            conn_name: conn_name.into(),
        }
    }

    /// The connection name this engine resolves on every call.
    pub fn connection_name(&self) -> &str {
        &self.conn_name
    }

    /// Resolves the live handle for this engine's connection name.
    async fn handle(&self) -> DbResult<Database> {
        registry::lookup(&self.conn_name).await
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Adds a category. The id is generated by the store.
    pub async fn add_category(&self, name: &str, notes: Option<&str>) -> DbResult<Category> {
        self.handle().await?.catalog().add_category(name, notes).await
    }

    /// Adds a customer under a caller-supplied id.
    pub async fn add_customer(
        &self,
        id: i64,
        name: &str,
        contacts: Option<&str>,
        notes: Option<&str>,
    ) -> DbResult<Customer> {
        self.handle()
            .await?
            .customers()
            .add_customer(id, name, contacts, notes)
            .await
    }

    /// Adds an item under an existing SKU and category.
    ///
    /// Never creates a SKU; see [`Inventory::add_sku_with_first_item`].
    pub async fn add_item(&self, item: &NewItem) -> DbResult<Item> {
        self.handle().await?.catalog().add_item(item).await
    }

    /// Atomically creates a SKU together with its first item.
    pub async fn add_sku_with_first_item(
        &self,
        sku: &NewSku,
        first_item: &NewItem,
    ) -> DbResult<(Sku, Item)> {
        self.handle()
            .await?
            .catalog()
            .add_sku_with_first_item(sku, first_item)
            .await
    }

    /// Records a checkout; fails with `InvalidState` unless the item is
    /// currently in inventory.
    pub async fn checkout(
        &self,
        inv_nr: i64,
        customer_id: i64,
        time: DateTime<Utc>,
    ) -> DbResult<CheckoutRecord> {
        self.handle()
            .await?
            .ledger()
            .checkout(inv_nr, customer_id, time)
            .await
    }

    /// Records a checkin; fails with `InvalidState` unless the item is
    /// currently with a customer.
    pub async fn checkin(
        &self,
        inv_nr: i64,
        customer_id: i64,
        time: DateTime<Utc>,
    ) -> DbResult<CheckinRecord> {
        self.handle()
            .await?
            .ledger()
            .checkin(inv_nr, customer_id, time)
            .await
    }

    /// Corrects an item's fields or moves it to a different SKU/category.
    pub async fn update_item(&self, item: &Item) -> DbResult<()> {
        self.handle().await?.catalog().update_item(item).await
    }

    /// Corrects a SKU's name or notes.
    pub async fn update_sku(&self, sku: &Sku) -> DbResult<()> {
        self.handle().await?.catalog().update_sku(sku).await
    }

    /// Corrects a category's name or notes.
    pub async fn update_category(&self, category: &Category) -> DbResult<()> {
        self.handle().await?.catalog().update_category(category).await
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Resolves an item's current custody status, fresh from the ledger.
    pub async fn status_of(&self, inv_nr: i64) -> DbResult<CustodyStatus> {
        self.handle().await?.ledger().status_of(inv_nr).await
    }

    /// Returns an item's merged ledger history, oldest first.
    pub async fn history(&self, inv_nr: i64) -> DbResult<Vec<LedgerEntry>> {
        self.handle().await?.ledger().history(inv_nr).await
    }

    /// Gets an item by inventory number.
    pub async fn item(&self, inv_nr: i64) -> DbResult<Option<Item>> {
        self.handle().await?.catalog().get_item(inv_nr).await
    }

    /// Gets a SKU by number.
    pub async fn sku(&self, sku: i64) -> DbResult<Option<Sku>> {
        self.handle().await?.catalog().get_sku(sku).await
    }

    /// Gets a category by id.
    pub async fn category(&self, id: i64) -> DbResult<Option<Category>> {
        self.handle().await?.catalog().get_category(id).await
    }

    /// Gets a customer by id.
    pub async fn customer(&self, id: i64) -> DbResult<Option<Customer>> {
        self.handle().await?.customers().get_customer(id).await
    }

    /// Lists all items, sorted by inventory number.
    pub async fn list_items(&self) -> DbResult<Vec<Item>> {
        self.handle().await?.catalog().list_items().await
    }

    /// Lists the items belonging to one SKU.
    pub async fn list_items_for_sku(&self, sku: i64) -> DbResult<Vec<Item>> {
        self.handle().await?.catalog().list_items_for_sku(sku).await
    }

    /// Lists all SKUs, sorted by number.
    pub async fn list_skus(&self) -> DbResult<Vec<Sku>> {
        self.handle().await?.catalog().list_skus().await
    }

    /// Lists all categories, sorted by name.
    pub async fn list_categories(&self) -> DbResult<Vec<Category>> {
        self.handle().await?.catalog().list_categories().await
    }

    /// Lists all customers, sorted by name.
    pub async fn list_customers(&self) -> DbResult<Vec<Customer>> {
        self.handle().await?.customers().list_customers().await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};
    use chrono::Duration;
    use std::sync::atomic::{AtomicU64, Ordering};

    static NEXT_CONN: AtomicU64 = AtomicU64::new(0);

    /// Registers a fresh in-memory store under a unique name and returns an
    /// engine bound to it.
    async fn test_engine() -> Inventory {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "warn".into()),
            )
            .with_test_writer()
            .try_init();

        let n = NEXT_CONN.fetch_add(1, Ordering::Relaxed);
        let name = format!("engine-test-{n}");
        let db = Database::create(DbConfig::in_memory()).await.unwrap();
        crate::registry::register(&name, db).await.unwrap();
        Inventory::new(name)
    }

    fn new_item(inv_nr: i64, sku: i64, category: i64) -> NewItem {
        NewItem {
            inv_nr,
            sku,
            category,
            img_path: None,
            notes: None,
        }
    }

    fn new_sku(sku: i64, name: &str) -> NewSku {
        NewSku {
            sku,
            name: name.to_string(),
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_operations_on_unregistered_connection_fail() {
        let engine = Inventory::new("engine-test-never-registered");
        let err = engine.list_items().await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    /// Scenario: build up a small store and verify the row counts.
    #[tokio::test]
    async fn test_category_sku_item_scenario() {
        let engine = test_engine().await;

        let cameras = engine.add_category("Cameras", Some("")).await.unwrap();
        engine
            .add_sku_with_first_item(&new_sku(100, "DSLR"), &new_item(1, 100, cameras.id))
            .await
            .unwrap();

        assert_eq!(engine.list_categories().await.unwrap().len(), 1);
        assert_eq!(engine.list_skus().await.unwrap().len(), 1);
        assert_eq!(engine.list_items().await.unwrap().len(), 1);
    }

    /// Scenario: item against a SKU that was never created.
    #[tokio::test]
    async fn test_add_item_against_missing_sku() {
        let engine = test_engine().await;
        let cameras = engine.add_category("Cameras", None).await.unwrap();

        let err = engine
            .add_item(&new_item(2, 999, cameras.id))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { ref entity, .. } if entity == "SKU"));
    }

    /// Scenario: checkout, double checkout, checkin, and back out again.
    #[tokio::test]
    async fn test_full_rental_cycle() {
        let engine = test_engine().await;

        let cameras = engine.add_category("Cameras", None).await.unwrap();
        engine
            .add_sku_with_first_item(&new_sku(100, "DSLR"), &new_item(1, 100, cameras.id))
            .await
            .unwrap();
        engine
            .add_customer(5, "Alice", Some("a@x.com"), None)
            .await
            .unwrap();

        let t1 = Utc::now();
        engine.checkout(1, 5, t1).await.unwrap();
        assert_eq!(
            engine.status_of(1).await.unwrap(),
            CustodyStatus::WithCustomer {
                customer_id: 5,
                since: t1,
            }
        );

        // Second checkout without a checkin in between.
        let err = engine
            .checkout(1, 5, t1 + Duration::seconds(10))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::InvalidState { .. }));

        engine
            .checkin(1, 5, t1 + Duration::seconds(60))
            .await
            .unwrap();
        assert_eq!(
            engine.status_of(1).await.unwrap(),
            CustodyStatus::InInventory
        );

        engine
            .checkout(1, 5, t1 + Duration::seconds(120))
            .await
            .unwrap();
        assert_eq!(engine.history(1).await.unwrap().len(), 3);
    }

    /// The engine exposes no way to remove an item or SKU; corrections go
    /// through the update methods and keep the ledger resolvable.
    #[tokio::test]
    async fn test_corrections_preserve_ledger() {
        let engine = test_engine().await;

        let cameras = engine.add_category("Cameras", None).await.unwrap();
        let shelf = engine.add_category("Shelf B", None).await.unwrap();
        engine
            .add_sku_with_first_item(&new_sku(100, "DSLR"), &new_item(1, 100, cameras.id))
            .await
            .unwrap();
        engine.add_customer(5, "Alice", None, None).await.unwrap();
        engine.checkout(1, 5, Utc::now()).await.unwrap();

        let mut item = engine.item(1).await.unwrap().unwrap();
        item.category = shelf.id;
        engine.update_item(&item).await.unwrap();

        let mut sku = engine.sku(100).await.unwrap().unwrap();
        sku.name = "DSLR body".to_string();
        engine.update_sku(&sku).await.unwrap();

        // History still resolves after both corrections.
        assert_eq!(engine.history(1).await.unwrap().len(), 1);
        assert!(matches!(
            engine.status_of(1).await.unwrap(),
            CustodyStatus::WithCustomer { customer_id: 5, .. }
        ));
    }
}
