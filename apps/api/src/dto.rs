//! # Request DTOs
//!
//! Wire shapes for request bodies and query strings, and their conversion
//! into validated domain values. Responses serialize the domain types
//! directly.
//!
//! ```text
//! JSON body ──serde──► CreateSaleRequest ──into_sale()──► Sale (validated)
//! ?query    ──serde──► SaleQuery         ──into_filter()─► SaleFilter
//! ```

use chrono::NaiveDate;
use serde::Deserialize;
use stockroom_core::error::ValidationError;
use stockroom_core::validation::ValidationResult;
use stockroom_core::{
    ClientFilter, CoreError, Money, PaymentStatus, Product, ProductFilter, Sale, SaleFilter,
    SaleItem, Supplier,
};

// =============================================================================
// Clients
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct ClientQuery {
    pub name: Option<String>,
    pub phone: Option<String>,
}

impl From<ClientQuery> for ClientFilter {
    fn from(query: ClientQuery) -> Self {
        ClientFilter {
            name: query.name,
            phone: query.phone,
        }
    }
}

// =============================================================================
// Products
// =============================================================================

/// Body of `POST /products`: a stock receipt.
///
/// `price` accepts a JSON string (`"12.50"`) or number.
#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub supplier_id: i64,
    #[serde(default)]
    pub supplier_name: Option<String>,
    pub supplier_code: String,
    pub stock_quantity: i64,
    pub price: Money,
}

impl CreateProductRequest {
    pub fn into_product(self) -> ValidationResult<Product> {
        let supplier = Supplier {
            id: self.supplier_id,
            name: self.supplier_name,
        };
        let mut product = Product::with_price(
            self.name,
            supplier,
            self.supplier_code,
            self.stock_quantity,
            self.price,
        )?;
        product.validate_and_update()?;
        Ok(product)
    }
}

/// Body of `PATCH /products/{id}`. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub supplier_code: Option<String>,
    pub stock_quantity: Option<i64>,
    pub price: Option<Money>,
}

impl UpdateProductRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.supplier_code.is_none()
            && self.stock_quantity.is_none()
            && self.price.is_none()
    }

    /// Applies the present fields through the product's setters, then
    /// re-validates and normalizes the whole product.
    pub fn apply(self, product: &mut Product) -> ValidationResult<()> {
        if self.is_empty() {
            return Err(ValidationError::Empty {
                field: "patch".to_string(),
            });
        }
        if let Some(name) = self.name {
            product.set_name(name)?;
        }
        if let Some(code) = self.supplier_code {
            product.set_supplier_code(code)?;
        }
        if let Some(quantity) = self.stock_quantity {
            product.set_stock_quantity(quantity)?;
        }
        if let Some(price) = self.price {
            product.set_price_amount(price)?;
        }
        product.validate_and_update()
    }
}

/// `GET /products` query string. Prices are decimal text.
#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    pub name: Option<String>,
    pub supplier_id: Option<String>,
    pub supplier_code: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
}

impl ProductQuery {
    pub fn into_filter(self) -> Result<ProductFilter, CoreError> {
        let supplier_id = match non_blank(self.supplier_id) {
            Some(raw) => Some(raw.parse::<i64>().map_err(|_| {
                ValidationError::invalid_format("supplier_id", "expected an integer")
            })?),
            None => None,
        };

        Ok(ProductFilter {
            name: self.name,
            supplier_id,
            supplier_code: self.supplier_code,
            min_price: parse_money(self.min_price)?,
            max_price: parse_money(self.max_price)?,
        })
    }
}

// =============================================================================
// Sales
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct SaleItemRequest {
    pub product_id: i64,
    pub quantity: i64,
    pub unit_price: Money,
    /// Optional line total; rejected if it disagrees with the computed one.
    #[serde(default)]
    pub total: Option<Money>,
}

/// Body of `POST /sales`.
///
/// ```json
/// {
///   "client_id": 1,
///   "sale_date": "2026-03-02",
///   "payment_status": "PAID",
///   "payment_date": "2026-03-02",
///   "items": [{ "product_id": 4, "quantity": 2, "unit_price": "5.00" }]
/// }
/// ```
#[derive(Debug, Deserialize)]
pub struct CreateSaleRequest {
    pub client_id: i64,
    /// Defaults to the day the request is handled.
    #[serde(default)]
    pub sale_date: Option<NaiveDate>,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub payment_date: Option<NaiveDate>,
    #[serde(default)]
    pub total: Option<Money>,
    pub items: Vec<SaleItemRequest>,
}

impl CreateSaleRequest {
    pub fn into_sale(self, today: NaiveDate) -> ValidationResult<Sale> {
        let items = self
            .items
            .into_iter()
            .map(|item| {
                let line = SaleItem::new(item.product_id, item.quantity, item.unit_price)?;
                match item.total {
                    Some(declared) => line.with_declared_total(declared),
                    None => Ok(line),
                }
            })
            .collect::<ValidationResult<Vec<_>>>()?;

        let sale = Sale::new(
            self.client_id,
            self.sale_date.unwrap_or(today),
            self.payment_status,
            self.payment_date,
            items,
        )?;

        match self.total {
            Some(declared) => sale.with_declared_total(declared),
            None => Ok(sale),
        }
    }
}

/// `GET /sales` query string.
#[derive(Debug, Default, Deserialize)]
pub struct SaleQuery {
    pub client_name: Option<String>,
    pub product_name: Option<String>,
    pub total: Option<String>,
    pub sale_date: Option<String>,
    pub payment_date: Option<String>,
    pub payment_status: Option<String>,
}

impl SaleQuery {
    pub fn into_filter(self) -> Result<SaleFilter, CoreError> {
        Ok(SaleFilter {
            client_name: self.client_name,
            product_name: self.product_name,
            total: parse_money(self.total)?,
            sale_date: parse_date("sale_date", self.sale_date)?,
            payment_date: parse_date("payment_date", self.payment_date)?,
            payment_status: self.payment_status,
        })
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_money(raw: Option<String>) -> Result<Option<Money>, CoreError> {
    non_blank(raw)
        .map(|v| Money::parse(&v))
        .transpose()
        .map_err(CoreError::from)
}

fn parse_date(field: &str, raw: Option<String>) -> Result<Option<NaiveDate>, CoreError> {
    non_blank(raw)
        .map(|v| {
            NaiveDate::parse_from_str(&v, "%Y-%m-%d")
                .map_err(|_| ValidationError::invalid_format(field, "expected YYYY-MM-DD"))
        })
        .transpose()
        .map_err(CoreError::from)
}
