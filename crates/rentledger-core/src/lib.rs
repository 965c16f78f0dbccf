//! # rentledger-core: Pure Domain Logic for RentLedger
//!
//! This crate is the **heart** of RentLedger. It contains the domain model
//! for a rental inventory - items grouped under SKUs and categories, lent to
//! and returned by customers - as pure types and functions with zero I/O
//! dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       RentLedger Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Presentation Layer (external)                   │   │
//! │  │     list views ──► add dialogs ──► checkout/checkin actions     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ rentledger-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │  schema   │  │  status   │  │ validation│  │   │
//! │  │   │   Item    │  │ TableDef  │  │  Custody  │  │   rules   │  │   │
//! │  │   │   Sku     │  │ Relation  │  │  resolve  │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 rentledger-db (Database Layer)                  │   │
//! │  │        SQLite queries, migrations, the integrity engine         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain records (Item, Sku, Category, Customer, ledger rows)
//! - [`schema`] - Table/column/relation metadata as static data
//! - [`status`] - Custody status resolution from ledger rows
//! - [`error`] - Validation error types
//! - [`validation`] - Input validation rules
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Explicit Errors**: All errors are typed, never strings or panics
//! 4. **Derived State**: An item's custody status is never stored; [`status`]
//!    computes it from the two latest ledger rows on every call

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod schema;
pub mod status;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use rentledger_core::Item` instead of
// `use rentledger_core::types::Item`

pub use error::ValidationError;
pub use status::resolve_status;
pub use types::*;
