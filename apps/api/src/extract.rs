//! # Request Extractors
//!
//! Wrappers around axum's extractors whose rejections render as [`ApiError`]
//! bodies instead of axum's plain-text defaults, plus the pagination
//! extractor shared by every list endpoint.
//!
//! ## Pagination Rules
//! ```text
//! ?page=3&limit=20   →  limit 20, offset 40
//! ?page=0            →  page 1
//! ?page=abc          →  page 1
//! ?limit=-5          →  limit 10
//! ?limit=5000        →  limit 100
//! ?page=1&page=x     →  first `page` wins
//! ```
//! Pagination never rejects a request. Each key is read on its own, so a
//! malformed `page` falls back to its default without dropping `limit`.

use std::convert::Infallible;

use axum::extract::{FromRequest, FromRequestParts, Query};
use axum::http::request::Parts;
use stockroom_core::Page;

use crate::error::ApiError;

/// JSON body extractor with [`ApiError`] rejections.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct AppJson<T>(pub T);

/// Query string extractor with [`ApiError`] rejections.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct AppQuery<T>(pub T);

/// Path parameter extractor with [`ApiError`] rejections.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct AppPath<T>(pub T);

// =============================================================================
// Pagination
// =============================================================================

/// `?page=&limit=` resolved to a [`Page`].
#[derive(Debug, Clone, Copy)]
pub struct Pagination(pub Page);

impl<S> FromRequestParts<S> for Pagination
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let pairs = Query::<Vec<(String, String)>>::from_request_parts(parts, state)
            .await
            .map(|Query(pairs)| pairs)
            .unwrap_or_default();

        let number = |key: &str| {
            pairs
                .iter()
                .find(|(k, _)| k == key)
                .and_then(|(_, v)| v.trim().parse::<i64>().ok())
        };

        Ok(Pagination(Page::from_query(number("page"), number("limit"))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn paginate(uri: &str) -> Page {
        let (mut parts, _) = Request::builder().uri(uri).body(()).unwrap().into_parts();
        let Pagination(page) = Pagination::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        page
    }

    #[tokio::test]
    async fn test_pagination_defaults() {
        assert_eq!(paginate("/products").await, Page::new(10, 0));
    }

    #[tokio::test]
    async fn test_pagination_offsets() {
        assert_eq!(paginate("/products?page=3&limit=20").await, Page::new(20, 40));
        assert_eq!(paginate("/products?limit=2&page=2").await, Page::new(2, 2));
    }

    #[tokio::test]
    async fn test_pagination_falls_back_on_bad_values() {
        assert_eq!(paginate("/products?page=0&limit=-5").await, Page::new(10, 0));
        assert_eq!(paginate("/products?page=abc&limit=").await, Page::new(10, 0));
        assert_eq!(paginate("/products?page=1&page=2").await, Page::new(10, 0));
        assert_eq!(paginate("/products?limit=5000").await.limit, 100);
    }

    #[tokio::test]
    async fn test_pagination_keys_are_independent() {
        assert_eq!(paginate("/products?page=abc&limit=5").await, Page::new(5, 0));
        assert_eq!(paginate("/products?page=2&page=x&limit=5").await, Page::new(5, 5));
        assert_eq!(paginate("/products?limit=5&limit=7&page=3").await, Page::new(5, 10));
    }
}
