//! # Validation Module
//!
//! Input validation for engine arguments.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Presentation (whatever sits on top)                          │
//! │  ├── Typed arguments (the engine never parses free-form text)          │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Required fields present and non-empty                             │
//! │  └── Business keys positive                                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / UNIQUE constraints                                     │
//! │  ├── Foreign key constraints                                           │
//! │  └── Append-only triggers                                              │
//! │                                                                         │
//! │  Defense in depth: multiple layers catch different errors              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::{ValidationError, ValidationResult};
use crate::types::{NewItem, NewSku};

/// Maximum length for names and notes fields.
pub const MAX_TEXT_LEN: usize = 500;

// =============================================================================
// Field Validators
// =============================================================================

/// Validates a display name (category, SKU, or customer).
///
/// ## Rules
/// - Must not be empty after trimming
/// - Must be at most [`MAX_TEXT_LEN`] characters
///
/// ## Example
/// ```rust
/// use rentledger_core::validation::validate_name;
///
/// assert!(validate_name("Cameras").is_ok());
/// assert!(validate_name("").is_err());
/// assert!(validate_name("   ").is_err());
/// ```
pub fn validate_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > MAX_TEXT_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_TEXT_LEN,
        });
    }

    Ok(())
}

/// Validates a caller-supplied business key (inv_nr, sku, customer id).
///
/// Zero and negative numbers are rejected: the physical labels start at 1,
/// and 0 is too easy to produce by accident from an unfilled form.
pub fn validate_key(field: &str, value: i64) -> ValidationResult<()> {
    if value <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Record Validators
// =============================================================================

/// Validates an item about to be inserted.
pub fn validate_new_item(item: &NewItem) -> ValidationResult<()> {
    validate_key("inv_nr", item.inv_nr)?;
    validate_key("sku", item.sku)?;
    validate_key("category", item.category)?;
    Ok(())
}

/// Validates a SKU and its first item, which are created as one atomic unit.
///
/// ## Rules
/// - The SKU itself must be a valid key with a valid name
/// - The first item must be valid
/// - The first item must name the SKU being created - otherwise the "SKU has
///   at least one item" invariant would be broken on arrival
pub fn validate_new_sku(sku: &NewSku, first_item: &NewItem) -> ValidationResult<()> {
    validate_key("sku", sku.sku)?;
    validate_name(&sku.name)?;
    validate_new_item(first_item)?;

    if first_item.sku != sku.sku {
        return Err(ValidationError::Mismatch {
            field: "sku".to_string(),
            expected: sku.sku,
            got: first_item.sku,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn new_item(inv_nr: i64, sku: i64) -> NewItem {
        NewItem {
            inv_nr,
            sku,
            category: 1,
            img_path: None,
            notes: None,
        }
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Cameras").is_ok());
        assert!(validate_name("  DSLR bodies  ").is_ok());

        assert!(validate_name("").is_err());
        assert!(validate_name("   ").is_err());
        assert!(validate_name(&"x".repeat(MAX_TEXT_LEN + 1)).is_err());
    }

    #[test]
    fn test_validate_key() {
        assert!(validate_key("inv_nr", 1).is_ok());
        assert!(validate_key("inv_nr", i64::MAX).is_ok());

        assert!(validate_key("inv_nr", 0).is_err());
        assert!(validate_key("inv_nr", -5).is_err());
    }

    #[test]
    fn test_validate_new_item() {
        assert!(validate_new_item(&new_item(1, 100)).is_ok());
        assert!(validate_new_item(&new_item(0, 100)).is_err());
        assert!(validate_new_item(&new_item(1, 0)).is_err());
    }

    #[test]
    fn test_validate_new_sku_requires_matching_item() {
        let sku = NewSku {
            sku: 100,
            name: "DSLR".to_string(),
            notes: None,
        };

        assert!(validate_new_sku(&sku, &new_item(1, 100)).is_ok());

        let err = validate_new_sku(&sku, &new_item(1, 999)).unwrap_err();
        assert!(matches!(err, ValidationError::Mismatch { .. }));
    }

    #[test]
    fn test_validate_new_sku_requires_name() {
        let sku = NewSku {
            sku: 100,
            name: "".to_string(),
            notes: None,
        };
        assert!(validate_new_sku(&sku, &new_item(1, 100)).is_err());
    }
}
