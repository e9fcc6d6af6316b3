//! # Validation Module
//!
//! Field-level rules shared by `Product`, `Sale` and `Client`.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP extractor (axum)                                        │
//! │  └── Shape checks (JSON types, query integers)                         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Entity constructors / setters                                │
//! │  └── THIS MODULE: one function per field rule                          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK constraints (stock ≥ 0, quantity > 0)                       │
//! │  ├── UNIQUE(supplier_id, supplier_code)                                │
//! │  └── Foreign keys (sale → client, item → product)                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each validator checks exactly one field so setters can re-use it without
//! re-validating the whole entity.

use crate::error::ValidationError;
use crate::money::Money;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Rejects empty or whitespace-only text.
///
/// ## Example
/// ```rust
/// use stockroom_core::validation::validate_required;
///
/// assert!(validate_required("name", "Arroz 5kg").is_ok());
/// assert!(validate_required("name", "   ").is_err());
/// ```
pub fn validate_required(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::required(field));
    }
    Ok(())
}

/// Product or client display name.
pub fn validate_name(name: &str) -> ValidationResult<()> {
    validate_required("name", name)
}

/// Supplier-assigned product code. Unique only within one supplier.
pub fn validate_supplier_code(code: &str) -> ValidationResult<()> {
    validate_required("supplier_code", code)
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Store-assigned identifiers referenced by other entities must be positive.
pub fn validate_id(field: &str, id: i64) -> ValidationResult<()> {
    if id <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Units on hand. Zero is a valid (sold-out) level.
pub fn validate_stock_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity < 0 {
        return Err(ValidationError::Negative {
            field: "stock_quantity".to_string(),
        });
    }
    Ok(())
}

/// Units on a sale line. A line for zero units is meaningless.
pub fn validate_item_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Money Validators
// =============================================================================

/// Rejects negative amounts. Zero is allowed (free items, giveaways).
pub fn validate_non_negative(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Parses a price string and checks it is not negative.
///
/// ## Example
/// ```rust
/// use stockroom_core::validation::parse_price;
///
/// assert_eq!(parse_price("price", "4.90").unwrap().to_string(), "4.90");
/// assert!(parse_price("price", "-1").is_err());
/// assert!(parse_price("price", "four").is_err());
/// ```
pub fn parse_price(field: &str, raw: &str) -> ValidationResult<Money> {
    let amount = Money::parse(raw).map_err(|e| ValidationError::invalid_format(field, e.reason))?;
    validate_non_negative(field, amount)?;
    Ok(amount)
}

// =============================================================================
// Unit Tests
// =============================================================================
