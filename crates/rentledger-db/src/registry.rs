//! # Connection Registry
//!
//! Process-wide map from a logical connection name to a live [`Database`].
//!
//! ## Ownership Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   Connection Registry                                   │
//! │                                                                         │
//! │  create("/data/gear.db") ──┐                                           │
//! │  open("/data/gear.db") ────┤                                           │
//! │                            ▼                                            │
//! │            ┌─────────────────────────────┐                             │
//! │            │  "gear.db" → Database       │  (one entry per store)      │
//! │            │  "archive.db" → Database    │                             │
//! │            └──────────────┬──────────────┘                             │
//! │                           │ lookup("gear.db")  - on EVERY engine call  │
//! │                           ▼                                            │
//! │            Inventory engine operation                                  │
//! │                                                                         │
//! │  The registry - not the caller - owns handle lifetime. Nothing above   │
//! │  it caches a pool; `close` tears the handle down for everyone at once. │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Names are derived from the file name of the store path, so one process
//! can keep several inventories open side by side and address them by name.

use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::pool::{Database, DbConfig};

static REGISTRY: OnceLock<RwLock<HashMap<String, Database>>> = OnceLock::new();

fn registry() -> &'static RwLock<HashMap<String, Database>> {
    REGISTRY.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Derives the logical connection name from a store path.
///
/// The file name (with extension) is the name: `/data/gear.db` → `gear.db`.
fn connection_name(path: &Path) -> DbResult<String> {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| {
            DbError::StorageUnavailable(format!("{} has no file name", path.display()))
        })
}

// =============================================================================
// Lifecycle Operations
// =============================================================================

/// Opens an existing store and registers it under its derived name.
///
/// ## Failure
/// * `StorageUnavailable` - missing file, or not a valid inventory store
/// * `Conflict` - the derived name is already registered
pub async fn open(path: impl AsRef<Path>) -> DbResult<String> {
    let path = path.as_ref();
    let name = connection_name(path)?;

    let db = Database::open(DbConfig::new(path)).await?;
    if let Err(err) = register(&name, db.clone()).await {
        db.close().await;
        return Err(err);
    }

    info!(name = %name, "Store opened and registered");
    Ok(name)
}

/// Creates a new, empty store and registers it under its derived name.
///
/// Fails without partial effect if anything already exists at `path` -
/// creation never overwrites.
pub async fn create(path: impl AsRef<Path>) -> DbResult<String> {
    let path = path.as_ref();
    let name = connection_name(path)?;

    let db = Database::create(DbConfig::new(path)).await?;
    if let Err(err) = register(&name, db.clone()).await {
        db.close().await;
        return Err(err);
    }

    info!(name = %name, "Store created and registered");
    Ok(name)
}

/// Registers an already-constructed handle under an explicit name.
///
/// Used for in-memory stores (which have no path to derive a name from) and
/// by tests. Registering over an occupied name is a `Conflict`: silently
/// replacing a live handle would strand its pool.
pub async fn register(name: impl Into<String>, db: Database) -> DbResult<()> {
    let name = name.into();
    let mut map = registry().write().await;

    if map.contains_key(&name) {
        return Err(DbError::conflict("connection", &name));
    }

    debug!(name = %name, "Registering connection");
    map.insert(name, db);
    Ok(())
}

/// Returns the live handle for a previously registered connection.
///
/// Handles are cheap clones of the registered one (the pool inside is
/// reference-counted). Engine operations call this immediately before every
/// use instead of holding on to the result.
pub async fn lookup(name: &str) -> DbResult<Database> {
    let map = registry().read().await;
    map.get(name)
        .cloned()
        .ok_or_else(|| DbError::not_found("connection", name))
}

/// Closes a registered connection and removes it from the registry.
pub async fn close(name: &str) -> DbResult<()> {
    let db = {
        let mut map = registry().write().await;
        map.remove(name)
            .ok_or_else(|| DbError::not_found("connection", name))?
    };

    db.close().await;
    info!(name = %name, "Connection closed and unregistered");
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_register_lookup_close() {
        let db = Database::create(DbConfig::in_memory()).await.unwrap();
        register("registry-test-basic", db).await.unwrap();

        let handle = lookup("registry-test-basic").await.unwrap();
        assert!(handle.health_check().await);

        close("registry-test-basic").await.unwrap();
        assert!(lookup("registry-test-basic").await.is_err());
    }

    #[tokio::test]
    async fn test_register_occupied_name_conflicts() {
        let db = Database::create(DbConfig::in_memory()).await.unwrap();
        register("registry-test-occupied", db).await.unwrap();

        let other = Database::create(DbConfig::in_memory()).await.unwrap();
        let err = register("registry-test-occupied", other).await.unwrap_err();
        assert!(matches!(err, DbError::Conflict { .. }));

        close("registry-test-occupied").await.unwrap();
    }

    #[tokio::test]
    async fn test_lookup_unknown_name() {
        let err = lookup("registry-test-never-registered").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_create_and_open_by_path() {
        let path = std::env::temp_dir().join(format!(
            "rentledger-registry-{}.db",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);

        let name = create(&path).await.unwrap();
        assert_eq!(name, path.file_name().unwrap().to_string_lossy());

        // Same file again: the name is occupied.
        let err = open(&path).await.unwrap_err();
        assert!(matches!(err, DbError::Conflict { .. }));

        close(&name).await.unwrap();

        // After close the same store can be re-opened.
        let name = open(&path).await.unwrap();
        close(&name).await.unwrap();
        let _ = std::fs::remove_file(&path);
    }
}
