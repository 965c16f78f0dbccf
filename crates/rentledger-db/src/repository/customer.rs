//! # Customer Repository
//!
//! Database operations for customers.
//!
//! Customers are insert-once: the checkin/checkout ledger references them
//! forever, so there is no update and no delete - not here, and not at the
//! storage layer either (schema triggers reject both). A typo in a customer
//! record is fixed by adding a new customer and using that one going forward.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use rentledger_core::validation::{validate_key, validate_name};
use rentledger_core::Customer;

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Inserts a new customer.
    ///
    /// The id is caller-supplied (membership number, badge id) and must be
    /// unique; name is required, contacts and notes are optional.
    ///
    /// ## Returns
    /// * `Err(DbError::Validation)` - Missing name or non-positive id
    /// * `Err(DbError::Conflict)` - Id already taken
    pub async fn add_customer(
        &self,
        id: i64,
        name: &str,
        contacts: Option<&str>,
        notes: Option<&str>,
    ) -> DbResult<Customer> {
        validate_key("customer id", id)?;
        validate_name(name)?;
        let name = name.trim();

        debug!(id = id, "Inserting customer");

        sqlx::query("INSERT INTO customers (id, name, contacts, notes) VALUES (?1, ?2, ?3, ?4)")
            .bind(id)
            .bind(name)
            .bind(contacts)
            .bind(notes)
            .execute(&self.pool)
            .await
            .map_err(|e| match DbError::from(e) {
                // The UNIQUE message names the column; the id is what the
                // caller cares about.
                DbError::Conflict { .. } => DbError::conflict("customer id", id),
                other => other,
            })?;

        Ok(Customer {
            id,
            name: name.to_string(),
            contacts: contacts.map(str::to_string),
            notes: notes.map(str::to_string),
        })
    }

    /// Gets a customer by id.
    pub async fn get_customer(&self, id: i64) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(
            "SELECT id, name, contacts, notes FROM customers WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Lists all customers, sorted by name.
    pub async fn list_customers(&self) -> DbResult<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>(
            "SELECT id, name, contacts, notes FROM customers ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
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

    #[tokio::test]
    async fn test_add_and_get_customer() {
        let db = test_db().await;
        let repo = db.customers();

        let alice = repo
            .add_customer(5, "Alice", Some("a@x.com"), None)
            .await
            .unwrap();
        assert_eq!(alice.id, 5);

        let stored = repo.get_customer(5).await.unwrap().unwrap();
        assert_eq!(stored, alice);
        assert!(repo.get_customer(6).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_customer_id_conflicts() {
        let db = test_db().await;
        let repo = db.customers();
        repo.add_customer(5, "Alice", None, None).await.unwrap();

        let err = repo.add_customer(5, "Bob", None, None).await.unwrap_err();
        assert!(matches!(err, DbError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_customer_requires_id_and_name() {
        let db = test_db().await;
        let repo = db.customers();

        assert!(matches!(
            repo.add_customer(0, "Alice", None, None).await.unwrap_err(),
            DbError::Validation(_)
        ));
        assert!(matches!(
            repo.add_customer(5, "", None, None).await.unwrap_err(),
            DbError::Validation(_)
        ));
    }

    #[tokio::test]
    async fn test_customers_are_immutable_at_storage_layer() {
        let db = test_db().await;
        let repo = db.customers();
        repo.add_customer(5, "Alice", None, None).await.unwrap();

        // No repository method updates or deletes a customer; go behind its
        // back to prove the schema itself refuses.
        let err: DbError = sqlx::query("UPDATE customers SET name = 'Mallory' WHERE id = 5")
            .execute(db.pool())
            .await
            .unwrap_err()
            .into();
        assert!(matches!(
            err,
            DbError::ImmutableViolation { ref table } if table == "customers"
        ));

        let err: DbError = sqlx::query("DELETE FROM customers WHERE id = 5")
            .execute(db.pool())
            .await
            .unwrap_err()
            .into();
        assert!(matches!(err, DbError::ImmutableViolation { .. }));

        // The row set is unchanged.
        let stored = repo.get_customer(5).await.unwrap().unwrap();
        assert_eq!(stored.name, "Alice");
    }
}
