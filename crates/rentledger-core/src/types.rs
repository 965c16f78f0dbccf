//! # Domain Types
//!
//! Core domain types used throughout RentLedger.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Item       │   │      Sku        │   │    Category     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  inv_nr (key)   │──►│  sku (key)      │   │  id (generated) │       │
//! │  │  sku (FK)       │   │  name           │◄──│  name           │       │
//! │  │  category (FK)  │   │  notes          │   │  notes          │       │
//! │  └────────┬────────┘   └─────────────────┘   └─────────────────┘       │
//! │           │                                                             │
//! │  ┌────────▼────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ CheckoutRecord  │   │  CheckinRecord  │   │    Customer     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id, time       │   │  id, time       │   │  id             │       │
//! │  │  inv_nr (FK)    │   │  inv_nr (FK)    │◄──│  name           │       │
//! │  │  customer_id ───┼──►│  customer_id    │   │  contacts       │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity Pattern
//! - `Category.id` and ledger ids are store-generated integers
//! - `Sku.sku`, `Item.inv_nr`, and `Customer.id` are caller-supplied business
//!   keys (the numbers printed on the physical labels)
//!
//! All identifiers are stable once assigned; keys can be renumbered only
//! through the store's cascading update, never re-pointed by hand.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Category
// =============================================================================

/// A category grouping items for browsing (e.g. "Cameras", "Tripods").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Category {
    /// Store-generated identifier.
    pub id: i64,

    /// Display name. Required, non-empty.
    pub name: String,

    /// Free-form notes.
    pub notes: Option<String>,
}

// =============================================================================
// SKU
// =============================================================================

/// A stock-keeping unit grouping interchangeable physical items.
///
/// A SKU row never exists without at least one [`Item`] referencing it;
/// SKU creation is only possible together with its first item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sku {
    /// Caller-supplied SKU number - the business key.
    pub sku: i64,

    /// Display name. Required, non-empty.
    pub name: String,

    /// Free-form notes.
    pub notes: Option<String>,
}

/// Input record for creating a SKU.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSku {
    pub sku: i64,
    pub name: String,
    pub notes: Option<String>,
}

// =============================================================================
// Item
// =============================================================================

/// One physical, individually numbered rental unit.
///
/// Belongs to exactly one SKU and one Category. Items may be corrected
/// (edited, moved to a different SKU/category) but never deleted, so that
/// ledger rows can always resolve their `inv_nr`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Item {
    /// Caller-supplied inventory number - the number on the physical label.
    pub inv_nr: i64,

    /// SKU this item belongs to.
    pub sku: i64,

    /// Category this item is filed under.
    pub category: i64,

    /// Path to an image of the item, if one was captured.
    pub img_path: Option<String>,

    /// Free-form notes.
    pub notes: Option<String>,
}

/// Input record for creating an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewItem {
    pub inv_nr: i64,
    pub sku: i64,
    pub category: i64,
    pub img_path: Option<String>,
    pub notes: Option<String>,
}

// =============================================================================
// Customer
// =============================================================================

/// A customer who borrows items.
///
/// Customer rows are immutable after insertion - the ledger references them
/// forever, so there is no update or delete path, at any layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Customer {
    /// Caller-supplied identifier (membership number, badge id, ...).
    pub id: i64,

    /// Display name. Required, non-empty.
    pub name: String,

    /// Contact details (email, phone).
    pub contacts: Option<String>,

    /// Free-form notes.
    pub notes: Option<String>,
}

// =============================================================================
// Ledger Records
// =============================================================================

/// One checkout event: an item left the inventory with a customer.
///
/// Append-only; rows are never updated or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CheckoutRecord {
    /// Store-generated, monotonically increasing within the checkout table.
    pub id: i64,

    /// When the item was handed over.
    pub time: DateTime<Utc>,

    /// The item that left.
    pub inv_nr: i64,

    /// The customer who took it.
    pub customer_id: i64,
}

/// One checkin event: an item returned to the inventory.
///
/// Append-only; rows are never updated or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CheckinRecord {
    /// Store-generated, monotonically increasing within the checkin table.
    pub id: i64,

    /// When the item came back.
    pub time: DateTime<Utc>,

    /// The item that returned.
    pub inv_nr: i64,

    /// The customer who returned it.
    pub customer_id: i64,
}

// =============================================================================
// Ledger Read Model
// =============================================================================

/// Which side of the ledger a row came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerSide {
    Checkout,
    Checkin,
}

/// A merged ledger row, for presenting an item's history chronologically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub side: LedgerSide,
    pub id: i64,
    pub time: DateTime<Utc>,
    pub inv_nr: i64,
    pub customer_id: i64,
}

// =============================================================================
// Custody Status
// =============================================================================

/// An item's current custody state, derived from the ledger.
///
/// Never stored: see [`crate::status::resolve_status`] for the derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum CustodyStatus {
    /// The item is on the shelf. Also the implicit state of an item with no
    /// ledger rows at all.
    InInventory,

    /// The item is out with a customer.
    WithCustomer {
        customer_id: i64,
        since: DateTime<Utc>,
    },
}

impl CustodyStatus {
    /// Checks whether the item is available for checkout.
    #[inline]
    pub fn is_in_inventory(&self) -> bool {
        matches!(self, CustodyStatus::InInventory)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
