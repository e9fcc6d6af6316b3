//! # Sale Repository
//!
//! Database operations for sales and sale items.
//!
//! ## Saving a Sale
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     save(&mut sale)                                     │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │   ├── INSERT INTO sales ... RETURNING id           → sale_id            │
//! │   ├── INSERT INTO sale_items VALUES (..), (..), .. (one statement)      │
//! │   └── SELECT id FROM sale_items WHERE sale_id = ?  → item ids           │
//! │  COMMIT                                                                 │
//! │   │                                                                     │
//! │   └── only now: sale.id, item.id, item.sale_id written in memory        │
//! │                                                                         │
//! │  Any failure → ROLLBACK. No reader ever sees a header without items.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Deleting a sale removes its items through `ON DELETE CASCADE`.

use std::collections::HashMap;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use stockroom_core::{Page, Sale, SaleFilter, SaleItem};
use tracing::{debug, warn};

use super::{like_pattern, paginate_filtered, LIKE_ESCAPE};
use crate::error::{DbError, DbResult};

const SALE_COLUMNS: &str =
    "s.id, s.client_id, s.sale_date, s.total, s.payment_date, s.payment_status";

const ITEM_COLUMNS: &str = "id, sale_id, product_id, quantity, unit_price, total AS line_total";

/// Sale header as read from `sales`, before items are attached.
struct SaleRow(Sale);

impl<'r> FromRow<'r, SqliteRow> for SaleRow {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        <Sale as FromRow<'r, SqliteRow>>::from_row(row).map(SaleRow)
    }
}

impl TryFrom<SaleRow> for Sale {
    type Error = DbError;

    fn try_from(row: SaleRow) -> Result<Self, Self::Error> {
        Ok(row.0)
    }
}

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Persists a new sale and all its items in one transaction.
    ///
    /// On success `sale.id`, and every item's `id` and `sale_id`, hold the
    /// store-assigned values. On failure nothing is written and `sale` is
    /// left untouched.
    ///
    /// ## Errors
    /// - `Invalid` - no items, or totals that do not add up
    /// - `ForeignKeyViolation` - unknown client or product
    pub async fn save(&self, sale: &mut Sale) -> DbResult<()> {
        check_insertable(sale)?;

        debug!(
            client_id = sale.client_id,
            items = sale.items.len(),
            total = %sale.total,
            "Saving sale"
        );

        let mut tx = self.pool.begin().await?;

        match insert_sale(&mut tx, sale).await {
            Ok((sale_id, item_ids)) => {
                tx.commit()
                    .await
                    .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
                sale.assign_ids(sale_id, &item_ids);
                debug!(sale_id, "Sale saved");
                Ok(())
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(error = %rollback_err, "Sale rollback failed");
                }
                Err(e)
            }
        }
    }

    /// Searches sales, ordered by id. Returned sales carry their items.
    ///
    /// ## Filters
    /// - `client_name`: substring of the client's name
    /// - `product_name`: substring of any item's product name
    /// - `total`: exact, compared as a decimal
    /// - `sale_date`, `payment_date`: exact
    /// - `payment_status`: substring of the status text
    pub async fn find(&self, filter: &SaleFilter, page: Page) -> DbResult<Vec<Sale>> {
        debug!(?filter, limit = page.limit, offset = page.offset, "Searching sales");

        let mut qb: QueryBuilder<'_, Sqlite> =
            QueryBuilder::new(format!("SELECT {SALE_COLUMNS} FROM sales s WHERE 1 = 1"));

        if let Some(name) = filter.client_name() {
            qb.push(" AND EXISTS (SELECT 1 FROM clients c WHERE c.id = s.client_id AND c.name LIKE ")
                .push_bind(like_pattern(name))
                .push(LIKE_ESCAPE)
                .push(")");
        }
        if let Some(name) = filter.product_name() {
            qb.push(
                " AND EXISTS (SELECT 1 FROM sale_items si JOIN products p ON p.id = si.product_id \
                 WHERE si.sale_id = s.id AND p.name LIKE ",
            )
            .push_bind(like_pattern(name))
            .push(LIKE_ESCAPE)
            .push(")");
        }
        if let Some(date) = filter.sale_date {
            qb.push(" AND s.sale_date = ").push_bind(date);
        }
        if let Some(date) = filter.payment_date {
            qb.push(" AND s.payment_date = ").push_bind(date);
        }
        if let Some(status) = filter.payment_status() {
            qb.push(" AND s.payment_status LIKE ")
                .push_bind(like_pattern(status))
                .push(LIKE_ESCAPE);
        }
        qb.push(" ORDER BY s.id");

        let mut sales = if filter.total.is_some() {
            let rows = qb.build_query_as::<SaleRow>().fetch(&self.pool);
            paginate_filtered(rows, page, |s: &Sale| filter.total_matches(s.total)).await?
        } else {
            qb.push(" LIMIT ")
                .push_bind(page.limit)
                .push(" OFFSET ")
                .push_bind(page.offset);
            qb.build_query_as::<SaleRow>()
                .fetch_all(&self.pool)
                .await?
                .into_iter()
                .map(|row| row.0)
                .collect()
        };

        self.attach_items(&mut sales).await?;

        debug!(count = sales.len(), "Search returned sales");
        Ok(sales)
    }

    /// Gets a sale with its items.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Sale>> {
        let sale: Option<Sale> =
            sqlx::query_as(&format!("SELECT {SALE_COLUMNS} FROM sales s WHERE s.id = ?1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        let Some(sale) = sale else {
            return Ok(None);
        };

        let mut sales = vec![sale];
        self.attach_items(&mut sales).await?;
        Ok(sales.pop())
    }

    /// Gets the items of one sale, in insertion order.
    pub async fn get_items(&self, sale_id: i64) -> DbResult<Vec<SaleItem>> {
        let items = sqlx::query_as(&format!(
            "SELECT {ITEM_COLUMNS} FROM sale_items WHERE sale_id = ?1 ORDER BY id"
        ))
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    /// Deletes a sale. Its items go with it.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id, "Deleting sale");

        let result = sqlx::query("DELETE FROM sales WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Sale", id));
        }

        Ok(())
    }

    /// Number of stored sale headers.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Number of stored sale items, across all sales.
    pub async fn count_items(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sale_items")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Loads items for all `sales` with one query.
    async fn attach_items(&self, sales: &mut [Sale]) -> DbResult<()> {
        if sales.is_empty() {
            return Ok(());
        }

        let mut qb: QueryBuilder<'_, Sqlite> =
            QueryBuilder::new(format!("SELECT {ITEM_COLUMNS} FROM sale_items WHERE sale_id IN ("));
        let mut ids = qb.separated(", ");
        for sale in sales.iter() {
            ids.push_bind(sale.id);
        }
        qb.push(") ORDER BY sale_id, id");

        let items: Vec<SaleItem> = qb.build_query_as().fetch_all(&self.pool).await?;

        let mut by_sale: HashMap<i64, Vec<SaleItem>> = HashMap::new();
        for item in items {
            by_sale.entry(item.sale_id).or_default().push(item);
        }
        for sale in sales.iter_mut() {
            sale.items = by_sale.remove(&sale.id).unwrap_or_default();
        }

        Ok(())
    }
}

// =============================================================================
// Transaction Steps
// =============================================================================

/// Rejects sales the schema would accept but that break the aggregate rules.
fn check_insertable(sale: &Sale) -> DbResult<()> {
    if !sale.is_new() {
        return Err(DbError::invalid("Sale", format!("already saved with id {}", sale.id)));
    }
    if sale.items.is_empty() {
        return Err(DbError::invalid("Sale", "a sale needs at least one item"));
    }
    for item in &sale.items {
        item.validate().map_err(|e| DbError::invalid("SaleItem", e))?;
    }
    let computed = sale.computed_total().map_err(|e| DbError::invalid("Sale", e))?;
    if computed != sale.total {
        return Err(DbError::invalid(
            "Sale",
            format!("total {} does not match items {}", sale.total, computed),
        ));
    }
    Ok(())
}

/// Header + items inside an open transaction. Returns the new sale id and
/// the item ids in item order.
async fn insert_sale(conn: &mut SqliteConnection, sale: &Sale) -> DbResult<(i64, Vec<i64>)> {
    let sale_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO sales (client_id, sale_date, total, payment_date, payment_status)
        VALUES (?1, ?2, ?3, ?4, ?5)
        RETURNING id
        "#,
    )
    .bind(sale.client_id)
    .bind(sale.sale_date)
    .bind(sale.total)
    .bind(sale.payment_date)
    .bind(sale.payment_status)
    .fetch_one(&mut *conn)
    .await?;

    let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new(
        "INSERT INTO sale_items (sale_id, product_id, quantity, unit_price, total) ",
    );
    qb.push_values(&sale.items, |mut row, item| {
        row.push_bind(sale_id)
            .push_bind(item.product_id)
            .push_bind(item.quantity)
            .push_bind(item.unit_price)
            .push_bind(item.line_total);
    });
    qb.build().execute(&mut *conn).await?;

    // AUTOINCREMENT ids grow in VALUES order; RETURNING order is unspecified.
    let item_ids: Vec<i64> =
        sqlx::query_scalar("SELECT id FROM sale_items WHERE sale_id = ?1 ORDER BY id")
            .bind(sale_id)
            .fetch_all(&mut *conn)
            .await?;

    if item_ids.len() != sale.items.len() {
        return Err(DbError::Internal(format!(
            "sale {sale_id}: wrote {} items, found {}",
            sale.items.len(),
            item_ids.len()
        )));
    }

    Ok((sale_id, item_ids))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use stockroom_core::{Money, NewClient, PaymentStatus, Product, Supplier};

    struct Fixture {
        db: Database,
        client_id: i64,
        rice_id: i64,
        beans_id: i64,
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn fixture() -> Fixture {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let client = db
            .clients()
            .create(&NewClient::new("Maria Souza", "11 98888-7777"))
            .await
            .unwrap();
        let rice = db
            .products()
            .save(&Product::new("Arroz 5kg", Supplier::new(1), "ARZ-5", 50, "21.90").unwrap())
            .await
            .unwrap();
        let beans = db
            .products()
            .save(&Product::new("Feijão 1kg", Supplier::new(1), "FJ-1", 50, "8.49").unwrap())
            .await
            .unwrap();

        Fixture {
            db,
            client_id: client.id,
            rice_id: rice.id(),
            beans_id: beans.id(),
        }
    }

    fn sale(client_id: i64, day: NaiveDate, status: PaymentStatus, items: Vec<SaleItem>) -> Sale {
        Sale::new(client_id, day, status, None, items).unwrap()
    }

    fn item(product_id: i64, quantity: i64, price: Money) -> SaleItem {
        SaleItem::new(product_id, quantity, price).unwrap()
    }

    #[tokio::test]
    async fn test_save_assigns_ids_and_links_items() {
        let f = fixture().await;
        let repo = f.db.sales();

        let mut s = sale(
            f.client_id,
            date(2026, 3, 2),
            PaymentStatus::Paid,
            vec![
                item(f.rice_id, 1, Money::new(dec!(21.90))),
                item(f.beans_id, 2, Money::new(dec!(8.49))),
            ],
        );
        repo.save(&mut s).await.unwrap();

        assert!(s.id > 0);
        assert!(s.items.iter().all(|i| i.id > 0 && i.sale_id == s.id));
        assert_ne!(s.items[0].id, s.items[1].id);

        let loaded = repo.get_by_id(s.id).await.unwrap().unwrap();
        assert_eq!(loaded, s);
        assert_eq!(repo.get_items(s.id).await.unwrap(), s.items);
        assert_eq!(loaded.total.to_string(), "38.88");
        assert_eq!(loaded.items[1].line_total.to_string(), "16.98");
    }

    #[tokio::test]
    async fn test_failed_item_rolls_back_whole_sale() {
        let f = fixture().await;
        let repo = f.db.sales();

        let mut s = sale(
            f.client_id,
            date(2026, 3, 2),
            PaymentStatus::Pending,
            vec![
                item(f.rice_id, 1, Money::new(dec!(21.90))),
                item(999_999, 1, Money::new(dec!(1))),
            ],
        );
        let err = repo.save(&mut s).await.unwrap_err();

        assert!(matches!(err, DbError::ForeignKeyViolation { .. }), "{err:?}");
        assert_eq!(repo.count().await.unwrap(), 0);
        assert_eq!(repo.count_items().await.unwrap(), 0);
        assert!(s.is_new());
        assert!(s.items.iter().all(|i| i.id == 0 && i.sale_id == 0));
    }

    #[tokio::test]
    async fn test_unknown_client_rolls_back() {
        let f = fixture().await;
        let repo = f.db.sales();

        let mut s = sale(
            424_242,
            date(2026, 3, 2),
            PaymentStatus::Pending,
            vec![item(f.rice_id, 1, Money::new(dec!(21.90)))],
        );
        assert!(repo.save(&mut s).await.is_err());
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_save_rejects_inconsistent_sales() {
        let f = fixture().await;
        let repo = f.db.sales();

        let mut empty = sale(
            f.client_id,
            date(2026, 3, 2),
            PaymentStatus::Pending,
            vec![item(f.rice_id, 1, Money::new(dec!(1)))],
        );
        empty.items.clear();
        assert!(matches!(repo.save(&mut empty).await, Err(DbError::Invalid { .. })));

        let mut wrong_total = sale(
            f.client_id,
            date(2026, 3, 2),
            PaymentStatus::Pending,
            vec![item(f.rice_id, 1, Money::new(dec!(1)))],
        );
        wrong_total.total = Money::new(dec!(2));
        assert!(matches!(repo.save(&mut wrong_total).await, Err(DbError::Invalid { .. })));

        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_cascades_items() {
        let f = fixture().await;
        let repo = f.db.sales();

        let mut s = sale(
            f.client_id,
            date(2026, 3, 2),
            PaymentStatus::Paid,
            vec![
                item(f.rice_id, 1, Money::new(dec!(21.90))),
                item(f.beans_id, 1, Money::new(dec!(8.49))),
            ],
        );
        repo.save(&mut s).await.unwrap();
        assert_eq!(repo.count_items().await.unwrap(), 2);

        repo.delete(s.id).await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 0);
        assert_eq!(repo.count_items().await.unwrap(), 0);
        assert!(repo.get_by_id(s.id).await.unwrap().is_none());
        assert!(repo.delete(s.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_product_on_a_sale_cannot_be_deleted() {
        let f = fixture().await;
        let mut s = sale(
            f.client_id,
            date(2026, 3, 2),
            PaymentStatus::Paid,
            vec![item(f.rice_id, 1, Money::new(dec!(21.90)))],
        );
        f.db.sales().save(&mut s).await.unwrap();

        let err = f.db.products().delete(f.rice_id).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }

    #[tokio::test]
    async fn test_find_filters() {
        let f = fixture().await;
        let repo = f.db.sales();
        let other = f
            .db
            .clients()
            .create(&NewClient::new("João Lima", ""))
            .await
            .unwrap();

        let mut rice_sale = sale(
            f.client_id,
            date(2026, 3, 2),
            PaymentStatus::Paid,
            vec![item(f.rice_id, 1, Money::new(dec!(21.80)))],
        );
        let mut beans_sale = Sale::new(
            other.id,
            date(2026, 3, 3),
            PaymentStatus::Partial,
            Some(date(2026, 3, 10)),
            vec![item(f.beans_id, 3, Money::new(dec!(8.49)))],
        )
        .unwrap();
        let mut pending_sale = sale(
            other.id,
            date(2026, 3, 3),
            PaymentStatus::Pending,
            vec![item(f.rice_id, 2, Money::new(dec!(21.90)))],
        );
        repo.save(&mut rice_sale).await.unwrap();
        repo.save(&mut beans_sale).await.unwrap();
        repo.save(&mut pending_sale).await.unwrap();

        let ids = |sales: Vec<Sale>| sales.into_iter().map(|s| s.id).collect::<Vec<_>>();

        let by_client = repo
            .find(
                &SaleFilter {
                    client_name: Some("maria".to_string()),
                    ..Default::default()
                },
                Page::default(),
            )
            .await
            .unwrap();
        assert_eq!(by_client.len(), 1);
        assert_eq!(by_client[0].items.len(), 1);
        assert_eq!(by_client[0].id, rice_sale.id);

        let by_product = repo
            .find(
                &SaleFilter {
                    product_name: Some("arroz".to_string()),
                    ..Default::default()
                },
                Page::default(),
            )
            .await
            .unwrap();
        assert_eq!(ids(by_product), vec![rice_sale.id, pending_sale.id]);

        let by_total = repo
            .find(
                &SaleFilter {
                    total: Some(Money::new(dec!(21.8))),
                    ..Default::default()
                },
                Page::default(),
            )
            .await
            .unwrap();
        assert_eq!(ids(by_total), vec![rice_sale.id]);

        let by_sale_date = repo
            .find(
                &SaleFilter {
                    sale_date: Some(date(2026, 3, 3)),
                    ..Default::default()
                },
                Page::default(),
            )
            .await
            .unwrap();
        assert_eq!(ids(by_sale_date), vec![beans_sale.id, pending_sale.id]);

        let by_payment_date = repo
            .find(
                &SaleFilter {
                    payment_date: Some(date(2026, 3, 10)),
                    ..Default::default()
                },
                Page::default(),
            )
            .await
            .unwrap();
        assert_eq!(ids(by_payment_date), vec![beans_sale.id]);

        let by_status = repo
            .find(
                &SaleFilter {
                    payment_status: Some("pa".to_string()),
                    ..Default::default()
                },
                Page::default(),
            )
            .await
            .unwrap();
        assert_eq!(ids(by_status), vec![rice_sale.id, beans_sale.id]);
    }

    #[tokio::test]
    async fn test_find_pagination_without_overlap() {
        let f = fixture().await;
        let repo = f.db.sales();
        for day in 1..=5 {
            let mut s = sale(
                f.client_id,
                date(2026, 4, day),
                PaymentStatus::Paid,
                vec![item(f.rice_id, 1, Money::new(dec!(1)))],
            );
            repo.save(&mut s).await.unwrap();
        }

        let filter = SaleFilter::default();
        let p1 = repo.find(&filter, Page::new(2, 0)).await.unwrap();
        let p2 = repo.find(&filter, Page::new(2, 2)).await.unwrap();
        let p3 = repo.find(&filter, Page::new(2, 4)).await.unwrap();

        assert_eq!((p1.len(), p2.len(), p3.len()), (2, 2, 1));
        assert!(p1.last().unwrap().id < p2.first().unwrap().id);
        assert!(p2.last().unwrap().id < p3.first().unwrap().id);
        assert!(p3.iter().all(|s| s.items.len() == 1));
    }
}
