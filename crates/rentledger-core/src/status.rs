//! # Custody Status Resolution
//!
//! Derives an item's custody state from its two latest ledger rows.
//!
//! ## Why Derived, Never Stored
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Status Derivation                                    │
//! │                                                                         │
//! │  checkout ledger          checkin ledger                               │
//! │  ┌──────────────────┐     ┌──────────────────┐                         │
//! │  │ latest for item  │     │ latest for item  │                         │
//! │  │ (time, id)       │     │ (time, id)       │                         │
//! │  └────────┬─────────┘     └────────┬─────────┘                         │
//! │           └────────┬───────────────┘                                   │
//! │                    ▼                                                    │
//! │        resolve_status(out, in)                                         │
//! │                    │                                                    │
//! │      ├── no checkout row?          → InInventory                       │
//! │      ├── checkout later than       → WithCustomer { id, since }        │
//! │      │   checkin (time, then id)?                                      │
//! │      └── otherwise                 → InInventory                       │
//! │                                                                         │
//! │  A materialized status column could diverge from the ledger after a    │
//! │  partial write; a value computed fresh from the ledger cannot.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Timestamps can collide (clock resolution), so ties fall back to the
//! insertion-order id; a full tie resolves to checkin, which keeps a
//! same-instant out-and-back item available for the next checkout.

use crate::types::{CheckinRecord, CheckoutRecord, CustodyStatus};

/// Resolves custody state from the latest ledger row of each side.
///
/// Pure function: callers fetch the two rows (or their absence) and pass them
/// in. The db layer runs this inside the same transaction that appends a new
/// ledger row, so the precondition it backs cannot go stale.
///
/// ## Example
/// ```rust
/// use rentledger_core::status::resolve_status;
/// use rentledger_core::types::CustodyStatus;
///
/// assert_eq!(resolve_status(None, None), CustodyStatus::InInventory);
/// ```
pub fn resolve_status(
    last_checkout: Option<&CheckoutRecord>,
    last_checkin: Option<&CheckinRecord>,
) -> CustodyStatus {
    let Some(out) = last_checkout else {
        // Never checked out - a stray checkin cannot put an item "more" in
        // inventory than it already is.
        return CustodyStatus::InInventory;
    };

    match last_checkin {
        None => CustodyStatus::WithCustomer {
            customer_id: out.customer_id,
            since: out.time,
        },
        Some(back) => {
            let checkout_is_later = match out.time.cmp(&back.time) {
                std::cmp::Ordering::Greater => true,
                std::cmp::Ordering::Less => false,
                // Same timestamp: insertion-order id breaks the tie.
                std::cmp::Ordering::Equal => out.id > back.id,
            };

            if checkout_is_later {
                CustodyStatus::WithCustomer {
                    customer_id: out.customer_id,
                    since: out.time,
                }
            } else {
                CustodyStatus::InInventory
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
