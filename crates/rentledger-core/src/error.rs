//! # Error Types
//!
//! Validation error types for rentledger-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  rentledger-core errors (this file)                                    │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  rentledger-db errors (separate crate)                                 │
//! │  └── DbError          - Storage failures, integrity violations,        │
//! │                         custody-state preconditions                    │
//! │                                                                         │
//! │  Flow: ValidationError → DbError → presentation layer                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (field, value)
//! 3. Errors are enum variants, never String
//! 4. The engine recovers every error at its boundary; nothing here panics

use thiserror::Error;

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when caller-supplied arguments do not meet requirements.
/// Used for early validation before any SQL runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric identifier must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Two arguments that must agree do not.
    ///
    /// ## When This Occurs
    /// - The first item passed to SKU creation names a different SKU number
    ///   than the SKU being created
    #[error("{field} mismatch: expected {expected}, got {got}")]
    Mismatch {
        field: String,
        expected: i64,
        got: i64,
    },
}

/// Convenience type alias for Results with ValidationError.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::Mismatch {
            field: "sku".to_string(),
            expected: 100,
            got: 101,
        };
        assert_eq!(err.to_string(), "sku mismatch: expected 100, got 101");
    }
}
