//! # Repository Module
//!
//! Database repository implementations for RentLedger.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  Inventory engine call                                                 │
//! │       │                                                                 │
//! │       │  db.ledger().checkout(1, 5, now)                               │
//! │       │  ↓                                                              │
//! │       ▼                                                                 │
//! │  LedgerRepository                                                      │
//! │  ├── checkout(&self, inv_nr, customer_id, time)                        │
//! │  ├── checkin(&self, inv_nr, customer_id, time)                         │
//! │  ├── status_of(&self, inv_nr)                                          │
//! │  └── history(&self, inv_nr)                                            │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Benefits:                                                              │
//! │  • SQL is isolated in one place                                        │
//! │  • Integrity rules cannot be bypassed by callers                       │
//! │  • Clean separation of concerns                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`catalog::CatalogRepository`] - Categories, SKUs, and items
//! - [`customer::CustomerRepository`] - Customers (insert-once)
//! - [`ledger::LedgerRepository`] - Checkout/checkin ledger and custody status

pub mod catalog;
pub mod customer;
pub mod ledger;
