//! # Error Types
//!
//! Domain-specific error types for storefront-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  storefront-core (this file)                                           │
//! │  └── ValidationError  - Form/input validation failures                 │
//! │                                                                         │
//! │  storefront-client                                                     │
//! │  └── ClientError      - Transport, status, decode, config failures     │
//! │                                                                         │
//! │  storefront-state                                                      │
//! │  └── StoreError       - What an operation is rejected with             │
//! │                                                                         │
//! │  Flow: ValidationError / ClientError → StoreError → rejection reason   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include the offending field in the message
//! 3. The `Display` text is what the user eventually reads

use thiserror::Error;

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before a request leaves the client, so a malformed form never
/// reaches the API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., malformed email).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// A computed amount does not fit the money type.
    #[error("{field} is out of range")]
    Overflow { field: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "sku".to_string(),
        };
        assert_eq!(err.to_string(), "sku is required");

        let err = ValidationError::OutOfRange {
            field: "qty".to_string(),
            min: 1,
            max: 999,
        };
        assert_eq!(err.to_string(), "qty must be between 1 and 999");
    }

    #[test]
    fn test_not_allowed_lists_options() {
        let err = ValidationError::NotAllowed {
            field: "itemsPerPage".to_string(),
            allowed: vec!["5".to_string(), "10".to_string()],
        };
        assert_eq!(err.to_string(), r#"itemsPerPage must be one of: ["5", "10"]"#);
    }
}
