//! # Error Types
//!
//! Domain-specific error types for stockroom-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  stockroom-core errors (this file)                                     │
//! │  ├── CoreError        - Wraps everything the domain can reject         │
//! │  ├── ValidationError  - Input shape / invariant failures (400)         │
//! │  └── ParseError       - Malformed decimal input (400, money.rs)        │
//! │                                                                         │
//! │  stockroom-db errors (separate crate)                                  │
//! │  └── DbError          - NotFound (404), store failures (500)           │
//! │                                                                         │
//! │  HTTP errors (in app)                                                  │
//! │  └── ApiError         - What clients see (serialized)                  │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → JSON body              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Name the offending field in every variant
//! 3. Errors are enum variants, never String

use thiserror::Error;

use crate::money::ParseError;

// =============================================================================
// Core Error
// =============================================================================

/// Anything the domain layer can reject before touching the store.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An entity or filter violated a field rule.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A decimal string could not be parsed.
    #[error("{0}")]
    Parse(#[from] ParseError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Detected before any store interaction, so they never leave partial state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Value must be strictly greater than zero.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must be zero or greater.
    #[error("{field} cannot be negative")]
    Negative { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (e.g., malformed decimal).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// A declared value disagrees with the value computed from other fields.
    ///
    /// ## When This Occurs
    /// ```text
    /// items: 2 × 5.00 + 1 × 3.50   → computed total 13.50
    /// declared total: 12.00        → Mismatch { field: "total", .. }
    /// ```
    #[error("{field} mismatch: expected {expected}, got {actual}")]
    Mismatch {
        field: String,
        expected: String,
        actual: String,
    },

    /// A collection or patch that must carry at least one entry is empty.
    #[error("{field} cannot be empty")]
    Empty { field: String },
}

impl ValidationError {
    /// Creates a Required error for the given field.
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }

    /// Creates an InvalidFormat error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
