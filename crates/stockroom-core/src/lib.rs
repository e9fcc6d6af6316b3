//! # stockroom-core: Pure Business Logic for Stockroom
//!
//! Domain types and invariants for the inventory / point-of-sale backend,
//! with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockroom Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    HTTP API (axum)                              │   │
//! │  │    POST /products ──► POST /sales ──► GET /sales?...            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ DTO → validated entity                 │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ stockroom-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │  product  │  │   money   │  │   sale    │  │   query   │  │   │
//! │  │   │  Product  │  │   Money   │  │   Sale    │  │  filters  │  │   │
//! │  │   │ Supplier  │  │   Sign    │  │ SaleItem  │  │   Page    │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  stockroom-db (Database Layer)                  │   │
//! │  │        SQLite upsert, sale transaction, repositories            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Exact decimal `Money` (no floating point!)
//! - [`product`] - `Product` and `Supplier` with field validation
//! - [`sale`] - `Sale`, `SaleItem`, `PaymentStatus`
//! - [`client`] - `Client`, `NewClient`, `ClientPatch`
//! - [`query`] - Typed search filters and pagination
//! - [`validation`] - Field-level rules shared by the entities
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use stockroom_core::{Money, Product, Supplier};
//!
//! let product = Product::new("Sabonete", Supplier::new(7), "SAB-01", 12, "4.90").unwrap();
//! assert_eq!(product.price(), Money::parse("4.90").unwrap());
//! assert_eq!(product.price().to_string(), "4.90");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod client;
pub mod error;
pub mod money;
pub mod product;
pub mod query;
pub mod sale;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use client::{Client, ClientPatch, NewClient};
pub use error::{CoreError, ValidationError};
pub use money::{Money, ParseError, Sign};
pub use product::{Product, Supplier};
pub use query::{ClientFilter, Page, ProductFilter, SaleFilter};
pub use sale::{PaymentStatus, Sale, SaleItem};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Page size used when the caller does not ask for one.
pub const DEFAULT_PAGE_LIMIT: i64 = 10;

/// Largest page a single search may return.
///
/// ## Business Reason
/// Keeps one request from walking the whole catalogue.
pub const MAX_PAGE_LIMIT: i64 = 100;
