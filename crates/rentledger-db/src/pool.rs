//! # Database Pool Management
//!
//! Connection pool creation and configuration for SQLite.
//!
//! ## Create vs. Open
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  Two Ways to Get a Database                             │
//! │                                                                         │
//! │  Database::create(config)            Database::open(config)           │
//! │       │                                   │                             │
//! │       ├── file already exists?            ├── file missing?            │
//! │       │   → StorageUnavailable            │   → StorageUnavailable     │
//! │       │   (creation never overwrites)     │                             │
//! │       ▼                                   ▼                             │
//! │  connect (create_if_missing)         connect (existing only)          │
//! │       │                                   │                             │
//! │       ▼                                   ▼                             │
//! │  run embedded migrations             verify the six tables exist      │
//! │       │                                   │   (sqlite_master against   │
//! │       │                                   │    core schema metadata)   │
//! │       ▼                                   ▼                             │
//! │  ready                               ready - file never mutated       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## WAL Mode
//! SQLite WAL (Write-Ahead Logging) mode is enabled for:
//! - Better concurrent read performance
//! - Readers don't block writers
//! - Better crash recovery

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::catalog::CatalogRepository;
use crate::repository::customer::CustomerRepository;
use crate::repository::ledger::LedgerRepository;
use rentledger_core::schema;

// =============================================================================
// Configuration
// =============================================================================

/// Database configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = DbConfig::new("/path/to/store.db")
///     .max_connections(5)
///     .min_connections(1);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Path to the SQLite database file.
    pub database_path: PathBuf,

    /// Maximum number of connections in the pool.
    /// Default: 5 (sufficient for a single interactive session)
    pub max_connections: u32,

    /// Minimum number of connections to keep alive.
    /// Default: 1
    pub min_connections: u32,

    /// Connection timeout duration.
    /// Default: 30 seconds
    pub connect_timeout: Duration,

    /// Idle timeout before closing a connection.
    /// Default: 10 minutes; `None` for in-memory stores, where closing the
    /// last connection would discard the data.
    pub idle_timeout: Option<Duration>,

    /// Whether to run migrations when the store is created.
    /// Default: true
    pub run_migrations: bool,
}

impl DbConfig {
    /// Creates a new database configuration with the given path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Some(Duration::from_secs(600)),
            run_migrations: true,
        }
    }

    /// Sets the maximum number of connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets the minimum number of connections.
    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Sets the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets whether to run migrations on create.
    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// Creates an in-memory database configuration (for testing).
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let config = DbConfig::in_memory();
    /// let db = Database::create(config).await?;
    /// // Database is isolated, perfect for tests
    /// ```
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(":memory:"),
            max_connections: 1, // In-memory requires single connection
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: None,
            run_migrations: true,
        }
    }

    fn is_in_memory(&self) -> bool {
        self.database_path.as_os_str() == ":memory:"
    }
}

// =============================================================================
// Database
// =============================================================================

/// Main database handle providing repository access.
///
/// One `Database` wraps one SQLite file (one inventory). Handles are cheap
/// to clone (the pool is reference-counted) and live in the process-wide
/// [`crate::registry`]; engine operations look them up by connection name
/// on every call instead of caching them.
#[derive(Debug, Clone)]
pub struct Database {
    /// The SQLite connection pool.
    pool: SqlitePool,
}

impl Database {
    /// Creates a new, empty store at the configured path.
    ///
    /// ## What This Does
    /// 1. Refuses to touch a path where anything already exists
    /// 2. Connects with `create_if_missing`, WAL mode, foreign keys on
    /// 3. Runs the embedded migrations (six tables + append-only triggers)
    ///
    /// ## Returns
    /// * `Ok(Database)` - Ready-to-use handle over a fresh store
    /// * `Err(DbError::StorageUnavailable)` - Path occupied or connection failed
    pub async fn create(config: DbConfig) -> DbResult<Self> {
        info!(
            path = %config.database_path.display(),
            "Creating new inventory store"
        );

        if !config.is_in_memory() && config.database_path.exists() {
            return Err(DbError::StorageUnavailable(format!(
                "{} already exists; store creation never overwrites",
                config.database_path.display()
            )));
        }

        let db = Database::connect(&config, true).await?;

        if config.run_migrations {
            db.run_migrations().await?;
        }

        Ok(db)
    }

    /// Opens an existing store at the configured path.
    ///
    /// ## What This Does
    /// 1. Refuses a path with no file behind it
    /// 2. Connects without `create_if_missing`
    /// 3. Verifies the file actually carries the inventory schema - opening
    ///    never mutates the file, so a store written by a prior version (or
    ///    another program entirely) is either accepted as-is or rejected
    ///
    /// ## Returns
    /// * `Ok(Database)` - Ready-to-use handle
    /// * `Err(DbError::StorageUnavailable)` - Missing file or wrong schema
    pub async fn open(config: DbConfig) -> DbResult<Self> {
        info!(
            path = %config.database_path.display(),
            "Opening inventory store"
        );

        if config.is_in_memory() {
            return Err(DbError::StorageUnavailable(
                "an in-memory store has nothing to open; use create".to_string(),
            ));
        }

        if !config.database_path.exists() {
            return Err(DbError::StorageUnavailable(format!(
                "{} does not exist",
                config.database_path.display()
            )));
        }

        let db = Database::connect(&config, false).await?;
        db.verify_schema(&config).await?;

        Ok(db)
    }

    /// Builds the pool shared by [`Database::create`] and [`Database::open`].
    async fn connect(config: &DbConfig, create_if_missing: bool) -> DbResult<Self> {
        let connect_options = if config.is_in_memory() {
            SqliteConnectOptions::new().in_memory(true)
        } else {
            SqliteConnectOptions::new()
                .filename(&config.database_path)
                .create_if_missing(create_if_missing)
        }
        // WAL mode: readers don't block the writer
        .journal_mode(SqliteJournalMode::Wal)
        // NORMAL synchronous: safe from corruption, may lose the very last
        // transaction on power loss
        .synchronous(SqliteSynchronous::Normal)
        // SQLite ships with foreign keys off for backwards compatibility;
        // the whole integrity story depends on them being on
        .foreign_keys(true);

        debug!("Connection options configured");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(config.idle_timeout)
            .connect_with(connect_options)
            .await
            .map_err(|e| DbError::StorageUnavailable(e.to_string()))?;

        info!(
            max_connections = config.max_connections,
            "Database pool created"
        );

        Ok(Database { pool })
    }

    /// Checks that every table of the inventory schema is present.
    ///
    /// Driven by the schema metadata in `rentledger-core`, so the check and
    /// the engine can never disagree about what a store must contain.
    async fn verify_schema(&self, config: &DbConfig) -> DbResult<()> {
        let tables: Vec<String> =
            sqlx::query_scalar("SELECT name FROM sqlite_master WHERE type = 'table'")
                .fetch_all(&self.pool)
                .await?;

        for table in schema::ALL_TABLES {
            if !tables.iter().any(|name| name == table.name) {
                return Err(DbError::StorageUnavailable(format!(
                    "{} is not an inventory store: missing table '{}'",
                    config.database_path.display(),
                    table.name
                )));
            }
        }

        debug!("Schema verified");
        Ok(())
    }

    /// Runs database migrations.
    ///
    /// Automatically called by `create()` if `run_migrations` is true.
    pub async fn run_migrations(&self) -> DbResult<()> {
        info!("Running database migrations");
        migrations::run_migrations(&self.pool).await?;
        info!("Migrations complete");
        Ok(())
    }

    /// Returns a reference to the connection pool.
    ///
    /// For advanced queries not covered by the repositories.
    /// Prefer repository methods when available.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Returns the catalog repository (categories, SKUs, items).
    pub fn catalog(&self) -> CatalogRepository {
        CatalogRepository::new(self.pool.clone())
    }

    /// Returns the customer repository.
    pub fn customers(&self) -> CustomerRepository {
        CustomerRepository::new(self.pool.clone())
    }

    /// Returns the ledger repository (checkout, checkin, custody status).
    pub fn ledger(&self) -> LedgerRepository {
        LedgerRepository::new(self.pool.clone())
    }

    /// Closes the database connection pool.
    ///
    /// After calling close, all repository operations will fail.
    pub async fn close(&self) {
        info!("Closing database connection pool");
        self.pool.close().await;
    }

    /// Checks if the database is healthy (can execute queries).
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
