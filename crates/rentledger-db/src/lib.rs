//! # rentledger-db: Storage Layer for RentLedger
//!
//! This crate provides database access for the RentLedger rental inventory
//! engine. It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       RentLedger Data Flow                              │
//! │                                                                         │
//! │  Caller (UI, CLI, tests)                                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   rentledger-db (THIS CRATE)                    │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────────┐   ┌───────────────┐    ┌──────────────┐    │   │
//! │  │   │  Inventory   │   │  Repositories │    │  Migrations  │    │   │
//! │  │   │ (engine.rs)  │──►│ (catalog.rs,  │    │  (embedded)  │    │   │
//! │  │   │              │   │  customer.rs, │    │              │    │   │
//! │  │   │  registry.rs │   │  ledger.rs)   │    │ 001_initial_ │    │   │
//! │  │   │  pool.rs     │◄──│               │    │ schema.sql   │    │   │
//! │  │   └──────────────┘   └───────────────┘    └──────────────┘    │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   SQLite Database (one file)                    │   │
//! │  │   inventory + skus + categories + customers + checkout/checkin │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation, schema verification
//! - [`registry`] - Process-wide named connection registry
//! - [`engine`] - The [`Inventory`] facade callers use
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (catalog, customer, ledger)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use rentledger_db::{registry, Inventory};
//!
//! // Open an existing inventory file and bind an engine to it
//! let name = registry::open("path/to/gear.db").await?;
//! let inventory = Inventory::new(name);
//!
//! // Record a rental
//! inventory.checkout(1, 5, Utc::now()).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod engine;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod registry;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use engine::Inventory;
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::catalog::CatalogRepository;
pub use repository::customer::CustomerRepository;
pub use repository::ledger::LedgerRepository;
