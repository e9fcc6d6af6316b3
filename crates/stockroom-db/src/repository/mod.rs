//! # Repository Module
//!
//! Database repository implementations for Stockroom.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  HTTP handler                                                           │
//! │       │  db.products().save(&product)                                   │
//! │       ▼                                                                 │
//! │  ProductRepository                                                      │
//! │  ├── save(&self, product)        ← upsert on (supplier_id, code)        │
//! │  ├── find(&self, filter, page)                                          │
//! │  ├── get_by_id(&self, id)                                               │
//! │  ├── update(&self, product)                                             │
//! │  └── delete(&self, id)                                                  │
//! │       │  SQL                                                            │
//! │       ▼                                                                 │
//! │  SQLite Database                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - Stock upsert, search, edit
//! - [`SaleRepository`](sale::SaleRepository) - Transactional sale save, search
//! - [`ClientRepository`](client::ClientRepository) - Client CRUD
//!
//! ## Exact-Decimal Predicates
//! Money columns are TEXT, and TEXT compares lexicographically (`"9.5" > "10"`).
//! Predicates on money are therefore applied in Rust after decoding, and
//! pagination is applied after them by [`paginate_filtered`].

pub mod client;
pub mod product;
pub mod sale;

use futures_util::{Stream, TryStreamExt};
use stockroom_core::Page;

use crate::error::{DbError, DbResult};

/// Escapes `%`, `_` and `\` and wraps the text for a `LIKE … ESCAPE '\'`
/// substring match.
pub(crate) fn like_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// SQL fragment following a LIKE bind.
pub(crate) const LIKE_ESCAPE: &str = " ESCAPE '\\'";

/// Walks an id-ordered row stream, keeping rows that pass `keep`, and
/// returns the requested page of the survivors.
///
/// Every row up to the end of the page is decoded; a row that fails to decode
/// aborts the read.
pub(crate) async fn paginate_filtered<S, R, T, F>(rows: S, page: Page, keep: F) -> DbResult<Vec<T>>
where
    S: Stream<Item = Result<R, sqlx::Error>> + Unpin,
    T: TryFrom<R, Error = DbError>,
    F: Fn(&T) -> bool,
{
    let mut rows = rows;
    let mut skipped = 0_i64;
    let mut out = Vec::new();

    while let Some(row) = rows.try_next().await? {
        let item = T::try_from(row)?;
        if !keep(&item) {
            continue;
        }
        if skipped < page.offset {
            skipped += 1;
            continue;
        }
        out.push(item);
        if out.len() as i64 >= page.limit {
            break;
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("arroz"), "%arroz%");
        assert_eq!(like_pattern("50%"), "%50\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
        assert_eq!(like_pattern("c:\\"), "%c:\\\\%");
    }

    #[tokio::test]
    async fn test_paginate_filtered() {
        struct Even(i64);
        impl TryFrom<i64> for Even {
            type Error = DbError;
            fn try_from(v: i64) -> Result<Self, DbError> {
                Ok(Even(v))
            }
        }

        let rows = || futures_util::stream::iter((1..=20).map(Ok::<i64, sqlx::Error>));
        let keep = |e: &Even| e.0 % 2 == 0;

        let first: Vec<Even> = paginate_filtered(rows(), Page::new(3, 0), keep).await.unwrap();
        let second: Vec<Even> = paginate_filtered(rows(), Page::new(3, 3), keep).await.unwrap();
        let last: Vec<Even> = paginate_filtered(rows(), Page::new(3, 9), keep).await.unwrap();

        assert_eq!(first.iter().map(|e| e.0).collect::<Vec<_>>(), vec![2, 4, 6]);
        assert_eq!(second.iter().map(|e| e.0).collect::<Vec<_>>(), vec![8, 10, 12]);
        assert_eq!(last.iter().map(|e| e.0).collect::<Vec<_>>(), vec![20]);
    }

    #[tokio::test]
    async fn test_paginate_filtered_propagates_decode_errors() {
        struct Never;
        impl TryFrom<i64> for Never {
            type Error = DbError;
            fn try_from(v: i64) -> Result<Self, DbError> {
                Err(DbError::decode("Never", v))
            }
        }

        let rows = futures_util::stream::iter(vec![Ok::<i64, sqlx::Error>(1)]);
        let result: DbResult<Vec<Never>> = paginate_filtered(rows, Page::default(), |_| true).await;
        assert!(matches!(result, Err(DbError::Decode { .. })));
    }
}
