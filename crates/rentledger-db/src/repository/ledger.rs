//! # Ledger Repository
//!
//! Database operations for the append-only checkout/checkin ledger, and the
//! custody status derived from it.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       checkout(inv_nr, customer, time)                  │
//! │                                                                         │
//! │  BEGIN TRANSACTION                                                     │
//! │       │                                                                 │
//! │       ├── item exists? ───────── no ──► NotFound                       │
//! │       ├── customer exists? ───── no ──► NotFound                       │
//! │       │                                                                 │
//! │       ├── derive status from ledger (same transaction!)                │
//! │       │      └── not InInventory? ──► InvalidState, nothing written    │
//! │       │                                                                 │
//! │       ├── INSERT INTO checkout                                         │
//! │       ▼                                                                 │
//! │  COMMIT                                                                │
//! │                                                                         │
//! │  The status check and the append are one atomic unit: a concurrent     │
//! │  writer cannot slip a row between them, and a concurrent reader never  │
//! │  observes the append without its precondition having held.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Checkin mirrors checkout with the opposite precondition.

use chrono::{DateTime, Utc};
use sqlx::{Row, SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use rentledger_core::validation::validate_key;
use rentledger_core::{
    resolve_status, CheckinRecord, CheckoutRecord, CustodyStatus, LedgerEntry, LedgerSide,
};

/// Repository for ledger database operations.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    pool: SqlitePool,
}

impl LedgerRepository {
    /// Creates a new LedgerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        LedgerRepository { pool }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Records a checkout: `inv_nr` leaves the inventory with `customer_id`.
    ///
    /// ## Preconditions (checked inside the transaction, in this order)
    /// 1. The item exists - else `NotFound`
    /// 2. The customer exists - else `NotFound`
    /// 3. The item's derived status is `InInventory` - else `InvalidState`
    ///
    /// On success, exactly one CheckoutRecord is appended.
    pub async fn checkout(
        &self,
        inv_nr: i64,
        customer_id: i64,
        time: DateTime<Utc>,
    ) -> DbResult<CheckoutRecord> {
        validate_key("inv_nr", inv_nr)?;
        validate_key("customer id", customer_id)?;

        debug!(inv_nr = inv_nr, customer_id = customer_id, "Checkout");

        let mut tx = self.pool.begin().await?;

        ensure_item_exists(&mut tx, inv_nr).await?;
        ensure_customer_exists(&mut tx, customer_id).await?;

        let status = derive_status(&mut tx, inv_nr).await?;
        if let CustodyStatus::WithCustomer {
            customer_id: holder,
            ..
        } = status
        {
            return Err(DbError::InvalidState {
                inv_nr,
                status: format!("with customer {holder}"),
                attempted: "checkout".to_string(),
            });
        }

        let result = sqlx::query(
            "INSERT INTO checkout (time, inv_nr, customer_id) VALUES (?1, ?2, ?3)",
        )
        .bind(time)
        .bind(inv_nr)
        .bind(customer_id)
        .execute(&mut *tx)
        .await?;

        tx.commit()
            .await
            .map_err(|e| DbError::AtomicityFailure(e.to_string()))?;

        Ok(CheckoutRecord {
            id: result.last_insert_rowid(),
            time,
            inv_nr,
            customer_id,
        })
    }

    /// Records a checkin: `inv_nr` returns to the inventory.
    ///
    /// Mirrors [`LedgerRepository::checkout`], with the precondition that the
    /// item's derived status is `WithCustomer`.
    pub async fn checkin(
        &self,
        inv_nr: i64,
        customer_id: i64,
        time: DateTime<Utc>,
    ) -> DbResult<CheckinRecord> {
        validate_key("inv_nr", inv_nr)?;
        validate_key("customer id", customer_id)?;

        debug!(inv_nr = inv_nr, customer_id = customer_id, "Checkin");

        let mut tx = self.pool.begin().await?;

        ensure_item_exists(&mut tx, inv_nr).await?;
        ensure_customer_exists(&mut tx, customer_id).await?;

        let status = derive_status(&mut tx, inv_nr).await?;
        if status.is_in_inventory() {
            return Err(DbError::InvalidState {
                inv_nr,
                status: "in inventory".to_string(),
                attempted: "checkin".to_string(),
            });
        }

        let result = sqlx::query(
            "INSERT INTO checkin (time, inv_nr, customer_id) VALUES (?1, ?2, ?3)",
        )
        .bind(time)
        .bind(inv_nr)
        .bind(customer_id)
        .execute(&mut *tx)
        .await?;

        tx.commit()
            .await
            .map_err(|e| DbError::AtomicityFailure(e.to_string()))?;

        Ok(CheckinRecord {
            id: result.last_insert_rowid(),
            time,
            inv_nr,
            customer_id,
        })
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Resolves an item's current custody status.
    ///
    /// Computed fresh from the ledger on every call - derived state is never
    /// cached or stored, so it cannot diverge from the rows it summarizes.
    pub async fn status_of(&self, inv_nr: i64) -> DbResult<CustodyStatus> {
        let mut conn = self.pool.acquire().await?;

        ensure_item_exists(&mut conn, inv_nr).await?;
        derive_status(&mut conn, inv_nr).await
    }

    /// Returns an item's full ledger history, oldest first.
    ///
    /// Checkout and checkin rows are merged into one chronological sequence
    /// for presentation.
    pub async fn history(&self, inv_nr: i64) -> DbResult<Vec<LedgerEntry>> {
        let rows = sqlx::query(
            "SELECT 'checkout' AS side, id, time, inv_nr, customer_id \
               FROM checkout WHERE inv_nr = ?1 \
             UNION ALL \
             SELECT 'checkin' AS side, id, time, inv_nr, customer_id \
               FROM checkin WHERE inv_nr = ?1 \
             ORDER BY time, id",
        )
        .bind(inv_nr)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let side: String = row.try_get("side").map_err(DbError::from)?;
                let side = match side.as_str() {
                    "checkout" => LedgerSide::Checkout,
                    _ => LedgerSide::Checkin,
                };
                Ok(LedgerEntry {
                    side,
                    id: row.try_get("id").map_err(DbError::from)?,
                    time: row.try_get("time").map_err(DbError::from)?,
                    inv_nr: row.try_get("inv_nr").map_err(DbError::from)?,
                    customer_id: row.try_get("customer_id").map_err(DbError::from)?,
                })
            })
            .collect()
    }
}

// =============================================================================
// Status Derivation
// =============================================================================

/// Fetches the latest ledger row of each side and resolves custody.
///
/// Runs on the caller's connection so checkout/checkin can evaluate the
/// precondition on the transaction's own view of the ledger.
async fn derive_status(conn: &mut SqliteConnection, inv_nr: i64) -> DbResult<CustodyStatus> {
    let last_checkout = sqlx::query_as::<_, CheckoutRecord>(
        "SELECT id, time, inv_nr, customer_id FROM checkout \
         WHERE inv_nr = ?1 ORDER BY time DESC, id DESC LIMIT 1",
    )
    .bind(inv_nr)
    .fetch_optional(&mut *conn)
    .await?;

    let last_checkin = sqlx::query_as::<_, CheckinRecord>(
        "SELECT id, time, inv_nr, customer_id FROM checkin \
         WHERE inv_nr = ?1 ORDER BY time DESC, id DESC LIMIT 1",
    )
    .bind(inv_nr)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(resolve_status(
        last_checkout.as_ref(),
        last_checkin.as_ref(),
    ))
}

async fn ensure_item_exists(conn: &mut SqliteConnection, inv_nr: i64) -> DbResult<()> {
    let exists: Option<i64> = sqlx::query_scalar("SELECT 1 FROM inventory WHERE inv_nr = ?1")
        .bind(inv_nr)
        .fetch_optional(&mut *conn)
        .await?;

    match exists {
        Some(_) => Ok(()),
        None => Err(DbError::not_found("Item", inv_nr)),
    }
}

async fn ensure_customer_exists(conn: &mut SqliteConnection, id: i64) -> DbResult<()> {
    let exists: Option<i64> = sqlx::query_scalar("SELECT 1 FROM customers WHERE id = ?1")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    match exists {
        Some(_) => Ok(()),
        None => Err(DbError::not_found("Customer", id)),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::Duration;
    use rentledger_core::{NewItem, NewSku};

    /// A fresh in-memory store with one category, SKU 100, item 1, customer 5.
    async fn seeded_db() -> Database {
        let db = Database::create(DbConfig::in_memory()).await.unwrap();

        let cat = db.catalog().add_category("Cameras", None).await.unwrap();
        db.catalog()
            .add_sku_with_first_item(
                &NewSku {
                    sku: 100,
                    name: "DSLR".to_string(),
                    notes: None,
                },
                &NewItem {
                    inv_nr: 1,
                    sku: 100,
                    category: cat.id,
                    img_path: None,
                    notes: None,
                },
            )
            .await
            .unwrap();
        db.customers()
            .add_customer(5, "Alice", Some("a@x.com"), None)
            .await
            .unwrap();

        db
    }

    #[tokio::test]
    async fn test_fresh_item_is_in_inventory() {
        let db = seeded_db().await;
        let status = db.ledger().status_of(1).await.unwrap();
        assert_eq!(status, CustodyStatus::InInventory);
    }

    #[tokio::test]
    async fn test_status_of_unknown_item() {
        let db = seeded_db().await;
        let err = db.ledger().status_of(77).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_checkout_moves_custody() {
        let db = seeded_db().await;
        let t1 = Utc::now();

        let record = db.ledger().checkout(1, 5, t1).await.unwrap();
        assert_eq!(record.inv_nr, 1);

        let status = db.ledger().status_of(1).await.unwrap();
        assert_eq!(
            status,
            CustodyStatus::WithCustomer {
                customer_id: 5,
                since: t1,
            }
        );
    }

    #[tokio::test]
    async fn test_double_checkout_is_invalid_state() {
        let db = seeded_db().await;
        let ledger = db.ledger();
        let t1 = Utc::now();

        ledger.checkout(1, 5, t1).await.unwrap();
        let err = ledger
            .checkout(1, 5, t1 + Duration::seconds(10))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::InvalidState { .. }));

        // The failed attempt appended nothing.
        assert_eq!(ledger.history(1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_checkin_of_shelved_item_is_invalid_state() {
        let db = seeded_db().await;
        let err = db.ledger().checkin(1, 5, Utc::now()).await.unwrap_err();
        assert!(matches!(err, DbError::InvalidState { .. }));
    }

    #[tokio::test]
    async fn test_checkout_checkin_alternation() {
        let db = seeded_db().await;
        let ledger = db.ledger();
        let t = Utc::now();

        // out - in - out - in - out: all five succeed in sequence.
        ledger.checkout(1, 5, t).await.unwrap();
        ledger.checkin(1, 5, t + Duration::seconds(1)).await.unwrap();
        ledger.checkout(1, 5, t + Duration::seconds(2)).await.unwrap();
        ledger.checkin(1, 5, t + Duration::seconds(3)).await.unwrap();
        ledger.checkout(1, 5, t + Duration::seconds(4)).await.unwrap();

        assert!(matches!(
            ledger.status_of(1).await.unwrap(),
            CustodyStatus::WithCustomer { customer_id: 5, .. }
        ));
    }

    #[tokio::test]
    async fn test_checkout_requires_existing_customer() {
        let db = seeded_db().await;
        let err = db.ledger().checkout(1, 42, Utc::now()).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { ref entity, .. } if entity == "Customer"));
        assert!(db.ledger().history(1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_status_is_idempotent_without_writes() {
        let db = seeded_db().await;
        db.ledger().checkout(1, 5, Utc::now()).await.unwrap();

        let first = db.ledger().status_of(1).await.unwrap();
        for _ in 0..5 {
            assert_eq!(db.ledger().status_of(1).await.unwrap(), first);
        }
    }

    #[tokio::test]
    async fn test_history_is_chronological_and_merged() {
        let db = seeded_db().await;
        let ledger = db.ledger();
        let t = Utc::now();

        ledger.checkout(1, 5, t).await.unwrap();
        ledger.checkin(1, 5, t + Duration::seconds(60)).await.unwrap();
        ledger
            .checkout(1, 5, t + Duration::seconds(120))
            .await
            .unwrap();

        let history = ledger.history(1).await.unwrap();
        let sides: Vec<LedgerSide> = history.iter().map(|e| e.side).collect();
        assert_eq!(
            sides,
            vec![LedgerSide::Checkout, LedgerSide::Checkin, LedgerSide::Checkout]
        );
        assert!(history.windows(2).all(|w| w[0].time <= w[1].time));
    }

    #[tokio::test]
    async fn test_ledger_rows_are_immutable_at_storage_layer() {
        let db = seeded_db().await;
        db.ledger().checkout(1, 5, Utc::now()).await.unwrap();

        let err: DbError = sqlx::query("DELETE FROM checkout")
            .execute(db.pool())
            .await
            .unwrap_err()
            .into();
        assert!(matches!(
            err,
            DbError::ImmutableViolation { ref table } if table == "checkout"
        ));

        let err: DbError = sqlx::query("UPDATE checkout SET customer_id = 6")
            .execute(db.pool())
            .await
            .unwrap_err()
            .into();
        assert!(matches!(err, DbError::ImmutableViolation { .. }));

        assert_eq!(db.ledger().history(1).await.unwrap().len(), 1);
    }
}
