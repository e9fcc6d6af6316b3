//! # Query Module
//!
//! Typed search filters and pagination.
//!
//! ## Filter Semantics
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Every field is optional. None = no constraint.                         │
//! │  Text fields: blank counts as None.                                     │
//! │                                                                         │
//! │  ProductFilter { name: "arroz", min_price: 5, .. }                      │
//! │      ≡  name LIKE '%arroz%' AND price >= 5  (price compared as decimal) │
//! │                                                                         │
//! │  Results are ordered by id ascending, then paged:                       │
//! │      page 1, limit 2 → rows 1-2                                          │
//! │      page 2, limit 2 → rows 3-4                                          │
//! │      page 3, limit 2 → row  5                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use serde::Serialize;

use crate::money::Money;
use crate::{DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};

// =============================================================================
// Pagination
// =============================================================================

/// A window into an ordered result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Page {
    /// Page from raw `limit`/`offset`. Out-of-range values are clamped.
    pub fn new(limit: i64, offset: i64) -> Self {
        Page {
            limit: clamp_limit(Some(limit)),
            offset: offset.max(0),
        }
    }

    /// Page from 1-based `page` / `limit` query parameters.
    ///
    /// ## Defaults
    /// - `page` missing or < 1 → 1
    /// - `limit` missing or < 1 → [`DEFAULT_PAGE_LIMIT`]
    /// - `limit` above [`MAX_PAGE_LIMIT`] → [`MAX_PAGE_LIMIT`]
    ///
    /// ```rust
    /// use stockroom_core::Page;
    ///
    /// let page = Page::from_query(Some(3), Some(20));
    /// assert_eq!((page.limit, page.offset), (20, 40));
    /// assert_eq!(Page::from_query(None, None), Page::new(10, 0));
    /// ```
    pub fn from_query(page: Option<i64>, limit: Option<i64>) -> Self {
        let page = page.filter(|p| *p >= 1).unwrap_or(1);
        let limit = clamp_limit(limit);
        Page {
            limit,
            offset: (page - 1).saturating_mul(limit),
        }
    }

    /// 1-based page number this window corresponds to.
    pub fn number(&self) -> i64 {
        self.offset / self.limit + 1
    }
}

impl Default for Page {
    fn default() -> Self {
        Page::from_query(None, None)
    }
}

fn clamp_limit(limit: Option<i64>) -> i64 {
    match limit {
        Some(l) if l >= 1 => l.min(MAX_PAGE_LIMIT),
        _ => DEFAULT_PAGE_LIMIT,
    }
}

/// Treats blank text as an absent filter.
fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

// =============================================================================
// Product Filter
// =============================================================================

/// Predicates for product search.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilter {
    /// Substring of the product name.
    pub name: Option<String>,
    pub supplier_id: Option<i64>,
    /// Exact supplier code.
    pub supplier_code: Option<String>,
    /// Inclusive lower bound.
    pub min_price: Option<Money>,
    /// Inclusive upper bound.
    pub max_price: Option<Money>,
}

impl ProductFilter {
    pub fn name(&self) -> Option<&str> {
        non_blank(&self.name)
    }

    pub fn supplier_code(&self) -> Option<&str> {
        non_blank(&self.supplier_code)
    }

    /// Whether any predicate must be checked on the decimal value itself.
    pub fn has_price_range(&self) -> bool {
        self.min_price.is_some() || self.max_price.is_some()
    }

    /// Inclusive range check, by decimal value.
    pub fn price_in_range(&self, price: Money) -> bool {
        self.min_price.map_or(true, |min| price >= min)
            && self.max_price.map_or(true, |max| price <= max)
    }
}

// =============================================================================
// Sale Filter
// =============================================================================

/// Predicates for sale search.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SaleFilter {
    /// Substring of the client's name.
    pub client_name: Option<String>,
    /// Substring of the name of any product on the sale.
    pub product_name: Option<String>,
    /// Exact total, by decimal value.
    pub total: Option<Money>,
    pub sale_date: Option<NaiveDate>,
    pub payment_date: Option<NaiveDate>,
    /// Case-insensitive substring of the status text (`"PA"` matches PAID
    /// and PARTIAL).
    pub payment_status: Option<String>,
}

impl SaleFilter {
    pub fn client_name(&self) -> Option<&str> {
        non_blank(&self.client_name)
    }

    pub fn product_name(&self) -> Option<&str> {
        non_blank(&self.product_name)
    }

    pub fn payment_status(&self) -> Option<&str> {
        non_blank(&self.payment_status)
    }

    pub fn total_matches(&self, total: Money) -> bool {
        self.total.map_or(true, |t| t == total)
    }
}

// =============================================================================
// Client Filter
// =============================================================================

/// Predicates for client search. Both are substring matches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientFilter {
    pub name: Option<String>,
    pub phone: Option<String>,
}

impl ClientFilter {
    pub fn name(&self) -> Option<&str> {
        non_blank(&self.name)
    }

    pub fn phone(&self) -> Option<&str> {
        non_blank(&self.phone)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
