//! # Validation Module
//!
//! Input validation run before a request leaves the client.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: UI form                                                      │
//! │  └── Immediate field feedback                                          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Store operation (THIS MODULE)                                │
//! │  └── Reject early, no request issued                                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: API                                                          │
//! │  └── Uniqueness (duplicate SKU), stock, auth                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use storefront_core::validation::{validate_sku, validate_quantity};
//!
//! assert!(validate_sku("TEE-001").is_ok());
//! assert!(validate_quantity(0).is_err());
//! ```

use crate::error::ValidationError;
use crate::types::{ProductForm, Registration};
use crate::{ITEMS_PER_PAGE_OPTIONS, MAX_ITEM_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

fn require(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

fn max_len(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    if value.trim().chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }
    Ok(())
}

/// Validates a SKU.
///
/// ## Rules
/// - Must not be empty
/// - At most 50 characters
/// - Letters, digits, hyphens, underscores only
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    require("sku", sku)?;
    max_len("sku", sku, 50)?;

    if !sku
        .trim()
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "sku".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a product name (1-200 characters).
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    require("name", name)?;
    max_len("name", name, 200)
}

/// Validates an email address.
///
/// Only the shape `local@domain.tld` is checked; deliverability is the
/// API's problem.
pub fn validate_email(email: &str) -> ValidationResult<()> {
    require("email", email)?;

    let email = email.trim();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    };

    if !valid {
        return Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "expected name@domain".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a cart line quantity (1 to `MAX_ITEM_QUANTITY`).
pub fn validate_quantity(qty: u32) -> ValidationResult<()> {
    if qty == 0 || qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "qty".to_string(),
            min: 1,
            max: i64::from(MAX_ITEM_QUANTITY),
        });
    }
    Ok(())
}

/// Validates a page size against the item-count selector options.
pub fn validate_items_per_page(items_per_page: u32) -> ValidationResult<()> {
    if !ITEMS_PER_PAGE_OPTIONS.contains(&items_per_page) {
        return Err(ValidationError::NotAllowed {
            field: "itemsPerPage".to_string(),
            allowed: ITEMS_PER_PAGE_OPTIONS.iter().map(u32::to_string).collect(),
        });
    }
    Ok(())
}

/// Pages are 1-based.
pub fn validate_page(page: u32) -> ValidationResult<()> {
    if page == 0 {
        return Err(ValidationError::MustBePositive {
            field: "page".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Form Validators
// =============================================================================

/// Validates the product create/edit form.
pub fn validate_product_form(form: &ProductForm) -> ValidationResult<()> {
    validate_sku(&form.sku)?;
    validate_product_name(&form.name)?;

    if !form.price.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "price".to_string(),
        });
    }

    if form.size.is_empty() {
        return Err(ValidationError::Required {
            field: "size".to_string(),
        });
    }

    Ok(())
}

/// Validates the registration form.
pub fn validate_registration(registration: &Registration) -> ValidationResult<()> {
    validate_email(&registration.email)?;
    require("name", &registration.name)?;
    require("password", &registration.password)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;

    fn valid_form() -> ProductForm {
        ProductForm {
            sku: "TEE-001".to_string(),
            name: "Basic Tee".to_string(),
            size: vec!["m".to_string()],
            price: Money::from_major(15),
            ..ProductForm::default()
        }
    }

    #[test]
    fn test_validate_sku() {
        assert!(validate_sku("TEE-001").is_ok());
        assert!(validate_sku("tee_001").is_ok());
        assert!(validate_sku("").is_err());
        assert!(validate_sku("   ").is_err());
        assert!(validate_sku("TEE 001").is_err());
        assert!(validate_sku(&"A".repeat(51)).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("ann@example.com").is_ok());
        assert!(validate_email("ann").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("ann@example").is_err());
        assert!(validate_email("ann@@example.com").is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(MAX_ITEM_QUANTITY).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(MAX_ITEM_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_validate_items_per_page() {
        for option in ITEMS_PER_PAGE_OPTIONS {
            assert!(validate_items_per_page(option).is_ok());
        }
        assert!(validate_items_per_page(7).is_err());
    }

    #[test]
    fn test_validate_page() {
        assert!(validate_page(1).is_ok());
        assert!(validate_page(0).is_err());
    }

    #[test]
    fn test_validate_product_form() {
        assert!(validate_product_form(&valid_form()).is_ok());

        let mut form = valid_form();
        form.price = Money::zero();
        assert_eq!(
            validate_product_form(&form),
            Err(ValidationError::MustBePositive {
                field: "price".to_string()
            })
        );

        let mut form = valid_form();
        form.size.clear();
        assert!(validate_product_form(&form).is_err());
    }

    #[test]
    fn test_validate_registration() {
        let registration = Registration {
            email: "ann@example.com".to_string(),
            name: "Ann".to_string(),
            password: "secret".to_string(),
        };
        assert!(validate_registration(&registration).is_ok());

        let missing_name = Registration {
            name: " ".to_string(),
            ..registration
        };
        assert_eq!(
            validate_registration(&missing_name).unwrap_err().to_string(),
            "name is required"
        );
    }
}
