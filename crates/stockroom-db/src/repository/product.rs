//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Receiving Stock
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    How save() Merges Stock                              │
//! │                                                                         │
//! │  save(supplier 1, "ARZ-5", qty 3, price 22.40)                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  INSERT ... ON CONFLICT (supplier_id, supplier_code) DO UPDATE          │
//! │       │                                                                 │
//! │       ├── no row  → new row, id assigned by SQLite                      │
//! │       │                                                                 │
//! │       └── row exists (qty 5, price 21.90)                               │
//! │               stock_quantity = 5 + 3 = 8                                │
//! │               price          = 22.40                                    │
//! │               name, supplier_name untouched                             │
//! │                                                                         │
//! │  One statement: two concurrent receipts cannot lose an update.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use stockroom_core::{Money, Page, Product, ProductFilter, Supplier, ValidationError};
use tracing::{debug, warn};

use super::{like_pattern, paginate_filtered, LIKE_ESCAPE};
use crate::error::{DbError, DbResult};

const PRODUCT_COLUMNS: &str =
    "id, name, supplier_id, supplier_name, supplier_code, stock_quantity, price";

// =============================================================================
// Row Mapping
// =============================================================================

/// Flat `products` row. Converted into a validated [`Product`].
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    supplier_id: i64,
    supplier_name: Option<String>,
    supplier_code: String,
    stock_quantity: i64,
    price: Money,
}

impl TryFrom<ProductRow> for Product {
    type Error = DbError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let supplier = Supplier {
            id: row.supplier_id,
            name: row.supplier_name,
        };
        Product::try_from_parts(
            row.id,
            row.name,
            supplier,
            row.supplier_code,
            row.stock_quantity,
            row.price,
        )
        .map_err(|e| DbError::decode("Product", format!("id {}: {e}", row.id)))
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Receives stock for a product line.
    ///
    /// Inserts a new row when `(supplier.id, supplier_code)` is unknown;
    /// otherwise adds `stock_quantity` to the stored quantity and replaces the
    /// stored price. Returns the row as stored after the merge.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let first = repo.save(&Product::new("Arroz", Supplier::new(1), "A", 5, "10")?).await?;
    /// let merged = repo.save(&Product::new("Arroz", Supplier::new(1), "A", 3, "12")?).await?;
    /// assert_eq!(merged.id(), first.id());
    /// assert_eq!(merged.stock_quantity(), 8);
    /// ```
    pub async fn save(&self, product: &Product) -> DbResult<Product> {
        debug!(
            supplier_id = product.supplier().id,
            supplier_code = %product.supplier_code(),
            quantity = product.stock_quantity(),
            "Receiving product stock"
        );

        // The DO UPDATE guard skips a merge that would overflow i64. SQLite
        // would otherwise store the sum as REAL. A skipped merge returns no row.
        let row: Option<ProductRow> = sqlx::query_as(&format!(
            r#"
            INSERT INTO products (name, supplier_id, supplier_name, supplier_code, stock_quantity, price)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT (supplier_id, supplier_code) DO UPDATE SET
                stock_quantity = products.stock_quantity + excluded.stock_quantity,
                price = excluded.price
            WHERE products.stock_quantity <= ?7 - excluded.stock_quantity
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(product.name())
        .bind(product.supplier().id)
        .bind(product.supplier().name.as_deref())
        .bind(product.supplier_code())
        .bind(product.stock_quantity())
        .bind(product.price())
        .bind(i64::MAX)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            warn!(
                supplier_id = product.supplier().id,
                supplier_code = %product.supplier_code(),
                "Stock merge rejected: quantity would overflow"
            );
            return Err(DbError::invalid(
                "Product",
                ValidationError::OutOfRange {
                    field: "stock_quantity".to_string(),
                    min: 0,
                    max: i64::MAX,
                },
            ));
        };

        debug!(id = row.id, stock_quantity = row.stock_quantity, "Product stock saved");
        Product::try_from(row)
    }

    /// Searches products, ordered by id.
    ///
    /// ## Filters
    /// - `name`: substring, case-insensitive for ASCII
    /// - `supplier_id`, `supplier_code`: exact
    /// - `min_price` / `max_price`: inclusive, compared as decimals
    pub async fn find(&self, filter: &ProductFilter, page: Page) -> DbResult<Vec<Product>> {
        debug!(?filter, limit = page.limit, offset = page.offset, "Searching products");

        let mut qb: QueryBuilder<'_, Sqlite> =
            QueryBuilder::new(format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE 1 = 1"));

        if let Some(name) = filter.name() {
            qb.push(" AND name LIKE ")
                .push_bind(like_pattern(name))
                .push(LIKE_ESCAPE);
        }
        if let Some(supplier_id) = filter.supplier_id {
            qb.push(" AND supplier_id = ").push_bind(supplier_id);
        }
        if let Some(code) = filter.supplier_code() {
            qb.push(" AND supplier_code = ").push_bind(code.to_string());
        }
        qb.push(" ORDER BY id");

        let products = if filter.has_price_range() {
            let rows = qb.build_query_as::<ProductRow>().fetch(&self.pool);
            paginate_filtered(rows, page, |p: &Product| filter.price_in_range(p.price())).await?
        } else {
            qb.push(" LIMIT ")
                .push_bind(page.limit)
                .push(" OFFSET ")
                .push_bind(page.offset);
            qb.build_query_as::<ProductRow>()
                .fetch_all(&self.pool)
                .await?
                .into_iter()
                .map(Product::try_from)
                .collect::<DbResult<Vec<_>>>()?
        };

        debug!(count = products.len(), "Search returned products");
        Ok(products)
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Product>> {
        let row: Option<ProductRow> =
            sqlx::query_as(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(Product::try_from).transpose()
    }

    /// Replaces name, supplier code, quantity and price of the row with
    /// `product.id()`.
    ///
    /// The quantity is overwritten, not merged; use [`save`](Self::save) to
    /// receive stock.
    pub async fn update(&self, product: &Product) -> DbResult<()> {
        debug!(id = product.id(), "Updating product");

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?2,
                supplier_code = ?3,
                stock_quantity = ?4,
                price = ?5
            WHERE id = ?1
            "#,
        )
        .bind(product.id())
        .bind(product.name())
        .bind(product.supplier_code())
        .bind(product.stock_quantity())
        .bind(product.price())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", product.id()));
        }

        Ok(())
    }

    /// Deletes a product. Fails with a foreign key violation while any sale
    /// still references it.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Number of stored products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
