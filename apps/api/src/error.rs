//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Stockroom                              │
//! │                                                                         │
//! │  Handler                                                                │
//! │  Result<T, ApiError>                                                    │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Bad JSON / query? ──── JsonRejection ─────────────┐                   │
//! │         │                                          │                   │
//! │         ▼                                          ▼                   │
//! │  Validation Error? ──── ValidationError ───────► ApiError ──► 400      │
//! │         │                                          ▲                   │
//! │         ▼                                          │                   │
//! │  Database Error? ────── DbError::NotFound ─────────┤          404      │
//! │                         DbError::QueryFailed ──────┘          500      │
//! │                                                                         │
//! │  Response body:                                                         │
//! │    { "code": "NOT_FOUND", "message": "Product not found: 42" }         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Store internals never reach the client: they are logged with
//! `tracing::error!` and replaced by a generic message.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use stockroom_core::{CoreError, ParseError, ValidationError};
use stockroom_db::DbError;

/// API error returned from handlers.
///
/// ## Serialization
/// ```json
/// {
///   "code": "VALIDATION_ERROR",
///   "message": "Validation error: name is required"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Input failed a domain rule (400)
    ValidationError,

    /// Request could not be decoded (400)
    BadRequest,

    /// Database operation failed (500)
    DatabaseError,
}

impl ErrorCode {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::ValidationError | ErrorCode::BadRequest => StatusCode::BAD_REQUEST,
            ErrorCode::DatabaseError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: impl std::fmt::Display) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::BadRequest, message)
    }

    pub fn status(&self) -> StatusCode {
        self.code.status()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, id),
            DbError::UniqueViolation { field, value } => {
                ApiError::validation(format!("{} '{}' already exists", field, value))
            }
            DbError::ForeignKeyViolation { message } => {
                tracing::warn!("Foreign key violation: {}", message);
                ApiError::validation("Invalid reference")
            }
            DbError::CheckViolation { message } => {
                tracing::warn!("Check constraint violation: {}", message);
                ApiError::validation("Value rejected by a constraint")
            }
            DbError::Invalid { entity, reason } => {
                ApiError::validation(format!("Invalid {}: {}", entity, reason))
            }
            DbError::ConnectionFailed(e) => {
                tracing::error!("Database connection failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(e) => {
                tracing::error!("Database migration failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::TransactionFailed(e) => {
                tracing::error!("Transaction failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database transaction failed")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::Decode { entity, reason } => {
                tracing::error!(%entity, "Stored row failed to decode: {}", reason);
                ApiError::new(ErrorCode::DatabaseError, "Stored data is invalid")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(e) => e.into(),
            CoreError::Parse(e) => e.into(),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(CoreError::Validation(err).to_string())
    }
}

impl From<ParseError> for ApiError {
    fn from(err: ParseError) -> Self {
        ApiError::bad_request(err.to_string())
    }
}

// =============================================================================
// Extractor Rejections
// =============================================================================

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;
    use stockroom_core::Money;

    #[test]
    fn test_db_error_status_mapping() {
        let cases = [
            (DbError::not_found("Product", 7), StatusCode::NOT_FOUND),
            (
                DbError::UniqueViolation {
                    field: "supplier_code".into(),
                    value: "X".into(),
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                DbError::ForeignKeyViolation {
                    message: "FOREIGN KEY constraint failed".into(),
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                DbError::CheckViolation {
                    message: "CHECK constraint failed".into(),
                },
                StatusCode::BAD_REQUEST,
            ),
            (DbError::invalid("Sale", "no items"), StatusCode::BAD_REQUEST),
            (
                DbError::QueryFailed("syntax error".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (DbError::PoolExhausted, StatusCode::INTERNAL_SERVER_ERROR),
            (
                DbError::decode("Product", "price"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (db_err, status) in cases {
            assert_eq!(ApiError::from(db_err).status(), status);
        }
    }

    #[test]
    fn test_stock_overflow_is_a_validation_error() {
        let err = ApiError::from(DbError::invalid(
            "Product",
            ValidationError::OutOfRange {
                field: "stock_quantity".into(),
                min: 0,
                max: i64::MAX,
            },
        ));
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(err.message.contains("stock_quantity must be between"));
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let err = ApiError::from(DbError::QueryFailed("no such table: secrets".into()));
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(!err.message.contains("secrets"));
    }

    #[test]
    fn test_core_errors_are_bad_requests() {
        let validation = ApiError::from(ValidationError::required("name"));
        assert_eq!(validation.code, ErrorCode::ValidationError);
        assert!(validation.message.contains("name is required"));

        let parse = ApiError::from(Money::parse("abc").unwrap_err());
        assert_eq!(parse.code, ErrorCode::BadRequest);
        assert_eq!(parse.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_serialized_body() {
        let body = serde_json::to_value(ApiError::not_found("Sale", 3)).unwrap();
        assert_eq!(body["code"], "NOT_FOUND");
        assert_eq!(body["message"], "Sale not found: 3");
    }
}
