//! # Catalog Repository
//!
//! Database operations for categories, SKUs, and inventory items.
//!
//! ## Key Operations
//! - Reference-data inserts with referential integrity checked up front
//! - Atomic SKU + first-item creation
//! - Corrective edits (no entity here can ever be deleted)
//!
//! ## Atomic SKU Creation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                add_sku_with_first_item                                  │
//! │                                                                         │
//! │  BEGIN TRANSACTION                                                     │
//! │       │                                                                 │
//! │       ├── category exists? ──────── no ──► NotFound, nothing written   │
//! │       │                                                                 │
//! │       ├── INSERT INTO skus ──────── dup ─► Conflict, rolled back       │
//! │       │                                                                 │
//! │       ├── INSERT INTO inventory ─── dup ─► Conflict, rolled back       │
//! │       │                                    (the SKU insert too!)       │
//! │       ▼                                                                 │
//! │  COMMIT - both rows or neither                                         │
//! │                                                                         │
//! │  Invariant: a SKU row never exists without at least one item           │
//! │  referencing it, not even transiently for a concurrent reader.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use rentledger_core::validation::{validate_name, validate_new_item, validate_new_sku};
use rentledger_core::{Category, Item, NewItem, NewSku, Sku};

/// Repository for catalog database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = CatalogRepository::new(pool);
///
/// let cameras = repo.add_category("Cameras", None).await?;
/// let (sku, item) = repo.add_sku_with_first_item(&new_sku, &first_item).await?;
/// ```
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
}

impl CatalogRepository {
    /// Creates a new CatalogRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CatalogRepository { pool }
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// Inserts a new category; the id is generated by the store.
    ///
    /// ## Returns
    /// * `Ok(Category)` - Inserted category with its generated id
    /// * `Err(DbError::Validation)` - Empty name
    pub async fn add_category(&self, name: &str, notes: Option<&str>) -> DbResult<Category> {
        validate_name(name)?;
        let name = name.trim();

        debug!(name = %name, "Inserting category");

        let result = sqlx::query("INSERT INTO categories (name, notes) VALUES (?1, ?2)")
            .bind(name)
            .bind(notes)
            .execute(&self.pool)
            .await?;

        Ok(Category {
            id: result.last_insert_rowid(),
            name: name.to_string(),
            notes: notes.map(str::to_string),
        })
    }

    /// Gets a category by id.
    pub async fn get_category(&self, id: i64) -> DbResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT id, name, notes FROM categories WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    /// Lists all categories, sorted by name.
    pub async fn list_categories(&self) -> DbResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, name, notes FROM categories ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    /// Corrects a category's fields. The id itself never changes.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - Category doesn't exist
    pub async fn update_category(&self, category: &Category) -> DbResult<()> {
        validate_name(&category.name)?;

        debug!(id = category.id, "Updating category");

        let result = sqlx::query("UPDATE categories SET name = ?2, notes = ?3 WHERE id = ?1")
            .bind(category.id)
            .bind(category.name.trim())
            .bind(category.notes.as_deref())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", category.id));
        }

        Ok(())
    }

    // =========================================================================
    // SKUs
    // =========================================================================

    /// Creates a SKU together with its first item, as one transaction.
    ///
    /// This is the *only* path that creates a SKU: an item-less SKU is a
    /// domain invariant violation, so `add_item` never creates one and no
    /// bare `add_sku` exists.
    ///
    /// ## Returns
    /// * `Ok((Sku, Item))` - Both rows committed
    /// * `Err(DbError::Validation)` - The item doesn't name the new SKU
    /// * `Err(DbError::NotFound)` - The item's category doesn't exist
    /// * `Err(DbError::Conflict)` - Duplicate sku or inv_nr; neither row kept
    pub async fn add_sku_with_first_item(
        &self,
        sku: &NewSku,
        first_item: &NewItem,
    ) -> DbResult<(Sku, Item)> {
        validate_new_sku(sku, first_item)?;

        debug!(sku = sku.sku, inv_nr = first_item.inv_nr, "Inserting SKU with first item");

        let mut tx = self.pool.begin().await?;

        ensure_category_exists(&mut tx, first_item.category).await?;

        sqlx::query("INSERT INTO skus (sku, name, notes) VALUES (?1, ?2, ?3)")
            .bind(sku.sku)
            .bind(sku.name.trim())
            .bind(sku.notes.as_deref())
            .execute(&mut *tx)
            .await?;

        insert_item(&mut tx, first_item).await?;

        tx.commit()
            .await
            .map_err(|e| DbError::AtomicityFailure(e.to_string()))?;

        Ok((
            Sku {
                sku: sku.sku,
                name: sku.name.trim().to_string(),
                notes: sku.notes.clone(),
            },
            item_record(first_item),
        ))
    }

    /// Gets a SKU by its number.
    pub async fn get_sku(&self, sku: i64) -> DbResult<Option<Sku>> {
        let row = sqlx::query_as::<_, Sku>("SELECT sku, name, notes FROM skus WHERE sku = ?1")
            .bind(sku)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    /// Lists all SKUs, sorted by number.
    pub async fn list_skus(&self) -> DbResult<Vec<Sku>> {
        let skus = sqlx::query_as::<_, Sku>("SELECT sku, name, notes FROM skus ORDER BY sku")
            .fetch_all(&self.pool)
            .await?;

        Ok(skus)
    }

    /// Corrects a SKU's fields. The key itself never changes here.
    pub async fn update_sku(&self, sku: &Sku) -> DbResult<()> {
        validate_name(&sku.name)?;

        debug!(sku = sku.sku, "Updating SKU");

        let result = sqlx::query("UPDATE skus SET name = ?2, notes = ?3 WHERE sku = ?1")
            .bind(sku.sku)
            .bind(sku.name.trim())
            .bind(sku.notes.as_deref())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("SKU", sku.sku));
        }

        Ok(())
    }

    // =========================================================================
    // Items
    // =========================================================================

    /// Inserts a new item under an *existing* SKU and category.
    ///
    /// This operation never creates a SKU; use
    /// [`CatalogRepository::add_sku_with_first_item`] for that.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - SKU or category doesn't exist; nothing written
    /// * `Err(DbError::Conflict)` - Duplicate inv_nr
    pub async fn add_item(&self, item: &NewItem) -> DbResult<Item> {
        validate_new_item(item)?;

        debug!(inv_nr = item.inv_nr, sku = item.sku, "Inserting item");

        // The existence checks and the insert must observe the same state.
        let mut tx = self.pool.begin().await?;

        ensure_sku_exists(&mut tx, item.sku).await?;
        ensure_category_exists(&mut tx, item.category).await?;
        insert_item(&mut tx, item).await?;

        tx.commit()
            .await
            .map_err(|e| DbError::AtomicityFailure(e.to_string()))?;

        Ok(item_record(item))
    }

    /// Gets an item by inventory number.
    pub async fn get_item(&self, inv_nr: i64) -> DbResult<Option<Item>> {
        let item = sqlx::query_as::<_, Item>(
            "SELECT inv_nr, sku, category, img_path, notes FROM inventory WHERE inv_nr = ?1",
        )
        .bind(inv_nr)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    /// Lists all items, sorted by inventory number.
    pub async fn list_items(&self) -> DbResult<Vec<Item>> {
        let items = sqlx::query_as::<_, Item>(
            "SELECT inv_nr, sku, category, img_path, notes FROM inventory ORDER BY inv_nr",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Lists the items belonging to one SKU.
    pub async fn list_items_for_sku(&self, sku: i64) -> DbResult<Vec<Item>> {
        let items = sqlx::query_as::<_, Item>(
            "SELECT inv_nr, sku, category, img_path, notes FROM inventory \
             WHERE sku = ?1 ORDER BY inv_nr",
        )
        .bind(sku)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Corrects an item: field edits, or moving it to a different SKU or
    /// category. The inv_nr itself never changes here.
    ///
    /// Re-checks referential integrity: the corrective path must not be the
    /// one that breaks it.
    pub async fn update_item(&self, item: &Item) -> DbResult<()> {
        debug!(inv_nr = item.inv_nr, "Updating item");

        let mut tx = self.pool.begin().await?;

        ensure_sku_exists(&mut tx, item.sku).await?;
        ensure_category_exists(&mut tx, item.category).await?;

        let result = sqlx::query(
            "UPDATE inventory SET sku = ?2, category = ?3, img_path = ?4, notes = ?5 \
             WHERE inv_nr = ?1",
        )
        .bind(item.inv_nr)
        .bind(item.sku)
        .bind(item.category)
        .bind(item.img_path.as_deref())
        .bind(item.notes.as_deref())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Item", item.inv_nr));
        }

        tx.commit()
            .await
            .map_err(|e| DbError::AtomicityFailure(e.to_string()))?;

        Ok(())
    }

    /// Counts items (for diagnostics).
    pub async fn count_items(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM inventory")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Shared Insert Helpers
// =============================================================================

/// Fails with `NotFound` if the SKU is missing. Runs on the caller's
/// transaction so the check can't go stale before the insert.
pub(crate) async fn ensure_sku_exists(conn: &mut SqliteConnection, sku: i64) -> DbResult<()> {
    let exists: Option<i64> = sqlx::query_scalar("SELECT 1 FROM skus WHERE sku = ?1")
        .bind(sku)
        .fetch_optional(&mut *conn)
        .await?;

    match exists {
        Some(_) => Ok(()),
        None => Err(DbError::not_found("SKU", sku)),
    }
}

/// Fails with `NotFound` if the category is missing.
pub(crate) async fn ensure_category_exists(conn: &mut SqliteConnection, id: i64) -> DbResult<()> {
    let exists: Option<i64> = sqlx::query_scalar("SELECT 1 FROM categories WHERE id = ?1")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    match exists {
        Some(_) => Ok(()),
        None => Err(DbError::not_found("Category", id)),
    }
}

async fn insert_item(conn: &mut SqliteConnection, item: &NewItem) -> DbResult<()> {
    sqlx::query(
        "INSERT INTO inventory (inv_nr, sku, category, img_path, notes) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )
    .bind(item.inv_nr)
    .bind(item.sku)
    .bind(item.category)
    .bind(item.img_path.as_deref())
    .bind(item.notes.as_deref())
    .execute(&mut *conn)
    .await?;

    Ok(())
}

fn item_record(item: &NewItem) -> Item {
    Item {
        inv_nr: item.inv_nr,
        sku: item.sku,
        category: item.category,
        img_path: item.img_path.clone(),
        notes: item.notes.clone(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn test_db() -> Database {
        Database::create(DbConfig::in_memory()).await.unwrap()
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
    async fn test_add_category_generates_ids() {
        let db = test_db().await;
        let repo = db.catalog();

        let cameras = repo.add_category("Cameras", Some("DSLR etc")).await.unwrap();
        let tripods = repo.add_category("Tripods", None).await.unwrap();

        assert_ne!(cameras.id, tripods.id);
        assert_eq!(
            repo.get_category(cameras.id).await.unwrap().unwrap().name,
            "Cameras"
        );
    }

    #[tokio::test]
    async fn test_add_category_requires_name() {
        let db = test_db().await;
        let err = db.catalog().add_category("  ", None).await.unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));
    }

    #[tokio::test]
    async fn test_add_item_requires_existing_sku_and_category() {
        let db = test_db().await;
        let repo = db.catalog();
        let cat = repo.add_category("Cameras", None).await.unwrap();

        // SKU 999 never created.
        let err = repo.add_item(&new_item(2, 999, cat.id)).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { ref entity, .. } if entity == "SKU"));

        // Nothing was written.
        assert_eq!(repo.count_items().await.unwrap(), 0);

        // Unknown category is just as fatal.
        repo.add_sku_with_first_item(&new_sku(100, "DSLR"), &new_item(1, 100, cat.id))
            .await
            .unwrap();
        let err = repo.add_item(&new_item(2, 100, cat.id + 77)).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { ref entity, .. } if entity == "Category"));
        assert_eq!(repo.count_items().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_add_sku_with_first_item_is_atomic() {
        let db = test_db().await;
        let repo = db.catalog();
        let cat = repo.add_category("Cameras", None).await.unwrap();

        // Occupy inv_nr 1.
        repo.add_sku_with_first_item(&new_sku(100, "DSLR"), &new_item(1, 100, cat.id))
            .await
            .unwrap();

        // SKU insert succeeds, item insert hits the duplicate inv_nr.
        let err = repo
            .add_sku_with_first_item(&new_sku(200, "Mirrorless"), &new_item(1, 200, cat.id))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Conflict { .. }));

        // No orphaned SKU survived the rollback.
        assert!(repo.get_sku(200).await.unwrap().is_none());
        assert_eq!(repo.list_skus().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_add_sku_rejects_mismatched_first_item() {
        let db = test_db().await;
        let repo = db.catalog();
        let cat = repo.add_category("Cameras", None).await.unwrap();

        let err = repo
            .add_sku_with_first_item(&new_sku(100, "DSLR"), &new_item(1, 999, cat.id))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));
        assert!(repo.get_sku(100).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_inv_nr_conflicts() {
        let db = test_db().await;
        let repo = db.catalog();
        let cat = repo.add_category("Cameras", None).await.unwrap();
        repo.add_sku_with_first_item(&new_sku(100, "DSLR"), &new_item(1, 100, cat.id))
            .await
            .unwrap();

        let err = repo.add_item(&new_item(1, 100, cat.id)).await.unwrap_err();
        assert!(matches!(err, DbError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_update_item_moves_between_categories() {
        let db = test_db().await;
        let repo = db.catalog();
        let cameras = repo.add_category("Cameras", None).await.unwrap();
        let repair = repo.add_category("In repair", None).await.unwrap();
        repo.add_sku_with_first_item(&new_sku(100, "DSLR"), &new_item(1, 100, cameras.id))
            .await
            .unwrap();

        let mut item = repo.get_item(1).await.unwrap().unwrap();
        item.category = repair.id;
        item.notes = Some("shutter jammed".to_string());
        repo.update_item(&item).await.unwrap();

        let stored = repo.get_item(1).await.unwrap().unwrap();
        assert_eq!(stored.category, repair.id);
        assert_eq!(stored.notes.as_deref(), Some("shutter jammed"));

        // Moving to a nonexistent category is rejected.
        item.category = 9999;
        let err = repo.update_item(&item).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_list_items_for_sku() {
        let db = test_db().await;
        let repo = db.catalog();
        let cat = repo.add_category("Cameras", None).await.unwrap();
        repo.add_sku_with_first_item(&new_sku(100, "DSLR"), &new_item(1, 100, cat.id))
            .await
            .unwrap();
        repo.add_item(&new_item(2, 100, cat.id)).await.unwrap();

        let items = repo.list_items_for_sku(100).await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].inv_nr, 1);
        assert_eq!(items[1].inv_nr, 2);
    }
}
