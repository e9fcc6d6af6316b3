//! # Product Module
//!
//! A stocked product line and the supplier it is received from.
//!
//! ## Natural Key
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  (supplier.id, supplier_code)  ← identifies a stocked line              │
//! │                                                                         │
//! │  Receipt #1: supplier 1, "ARZ-5", qty 5, price 21.90                    │
//! │  Receipt #2: supplier 1, "ARZ-5", qty 3, price 22.40                    │
//! │                        │                                                │
//! │                        ▼                                                │
//! │  One row: qty 8, price 22.40  (quantity adds, price replaces)          │
//! │                                                                         │
//! │  Same code from supplier 2 is a DIFFERENT product line.                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Editing Protocol
//! Setters validate only the field they touch. After a batch of edits call
//! [`Product::validate_and_update`] before handing the product to the store.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::money::Money;
use crate::validation::{
    parse_price, validate_id, validate_name, validate_non_negative, validate_stock_quantity,
    validate_supplier_code, ValidationResult,
};

// =============================================================================
// Supplier
// =============================================================================

/// Reference to the supplier a product line comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supplier {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
}

impl Supplier {
    /// Supplier reference by id only.
    pub fn new(id: i64) -> Self {
        Supplier { id, name: None }
    }

    /// Supplier reference carrying a display name.
    pub fn named(id: i64, name: impl Into<String>) -> Self {
        Supplier {
            id,
            name: Some(name.into()),
        }
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product line held in stock.
///
/// Fields are private so every value in circulation has passed validation
/// at least once. `id` is 0 until the store assigns one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    id: i64,
    name: String,
    supplier: Supplier,
    supplier_code: String,
    stock_quantity: i64,
    price: Money,
}

impl Product {
    /// Builds a validated, unsaved product from raw input.
    ///
    /// ## Validation Order
    /// The first failing rule is reported:
    /// 1. `name` non-empty
    /// 2. `supplier.id > 0`
    /// 3. `supplier_code` non-empty
    /// 4. `stock_quantity >= 0`
    /// 5. `price` parses as a decimal and is not negative
    ///
    /// ## Example
    /// ```rust
    /// use stockroom_core::{Product, Supplier, ValidationError};
    ///
    /// let ok = Product::new("Feijão 1kg", Supplier::new(3), "FJ-1", 40, "8.49");
    /// assert!(ok.is_ok());
    ///
    /// let err = Product::new("", Supplier::new(0), "", -1, "x").unwrap_err();
    /// assert_eq!(err, ValidationError::required("name"));
    /// ```
    pub fn new(
        name: impl Into<String>,
        supplier: Supplier,
        supplier_code: impl Into<String>,
        stock_quantity: i64,
        price: &str,
    ) -> ValidationResult<Self> {
        let name = name.into();
        let supplier_code = supplier_code.into();

        validate_name(&name)?;
        validate_id("supplier_id", supplier.id)?;
        validate_supplier_code(&supplier_code)?;
        validate_stock_quantity(stock_quantity)?;
        let price = parse_price("price", price)?;

        Ok(Product {
            id: 0,
            name,
            supplier,
            supplier_code,
            stock_quantity,
            price,
        })
    }

    /// Same as [`Product::new`] for a price that is already a decimal.
    pub fn with_price(
        name: impl Into<String>,
        supplier: Supplier,
        supplier_code: impl Into<String>,
        stock_quantity: i64,
        price: Money,
    ) -> ValidationResult<Self> {
        let product = Product {
            id: 0,
            name: name.into(),
            supplier,
            supplier_code: supplier_code.into(),
            stock_quantity,
            price,
        };
        product.validate()?;
        Ok(product)
    }

    /// Rebuilds a stored product from its persisted parts.
    ///
    /// Used by the store when mapping rows; a row that no longer satisfies
    /// the rules is reported instead of silently loaded.
    pub fn try_from_parts(
        id: i64,
        name: String,
        supplier: Supplier,
        supplier_code: String,
        stock_quantity: i64,
        price: Money,
    ) -> ValidationResult<Self> {
        validate_id("id", id)?;
        Product::with_price(name, supplier, supplier_code, stock_quantity, price)
            .map(|p| p.with_id(id))
    }

    /// Returns the product carrying a store-assigned id.
    pub fn with_id(mut self, id: i64) -> Self {
        self.id = id;
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn id(&self) -> i64 {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn supplier(&self) -> &Supplier {
        &self.supplier
    }

    #[inline]
    pub fn supplier_code(&self) -> &str {
        &self.supplier_code
    }

    #[inline]
    pub fn stock_quantity(&self) -> i64 {
        self.stock_quantity
    }

    #[inline]
    pub fn price(&self) -> Money {
        self.price
    }

    /// True until the store has assigned an id.
    #[inline]
    pub fn is_new(&self) -> bool {
        self.id == 0
    }

    // =========================================================================
    // Setters (single-field validation)
    // =========================================================================

    pub fn set_name(&mut self, name: impl Into<String>) -> ValidationResult<()> {
        let name = name.into();
        validate_name(&name)?;
        self.name = name;
        Ok(())
    }

    pub fn set_supplier_code(&mut self, code: impl Into<String>) -> ValidationResult<()> {
        let code = code.into();
        validate_supplier_code(&code)?;
        self.supplier_code = code;
        Ok(())
    }

    pub fn set_stock_quantity(&mut self, quantity: i64) -> ValidationResult<()> {
        validate_stock_quantity(quantity)?;
        self.stock_quantity = quantity;
        Ok(())
    }

    /// Replaces the price from a decimal string. On error the old price stays.
    pub fn set_price(&mut self, price: &str) -> ValidationResult<()> {
        self.price = parse_price("price", price)?;
        Ok(())
    }

    pub fn set_price_amount(&mut self, price: Money) -> ValidationResult<()> {
        validate_non_negative("price", price)?;
        self.price = price;
        Ok(())
    }

    // =========================================================================
    // Full Validation
    // =========================================================================

    /// Runs every field rule, in constructor order.
    pub fn validate(&self) -> ValidationResult<()> {
        validate_name(&self.name)?;
        validate_id("supplier_id", self.supplier.id)?;
        validate_supplier_code(&self.supplier_code)?;
        validate_stock_quantity(self.stock_quantity)?;
        validate_non_negative("price", self.price)?;
        Ok(())
    }

    /// Full validation pass after a batch of setter calls.
    ///
    /// Trims the text fields it checks, so `"  Arroz "` is stored as `"Arroz"`.
    pub fn validate_and_update(&mut self) -> Result<(), ValidationError> {
        self.validate()?;
        self.name = self.name.trim().to_string();
        self.supplier_code = self.supplier_code.trim().to_string();
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample() -> Product {
        Product::new("Arroz 5kg", Supplier::named(1, "Camil"), "ARZ-5", 5, "21.90").unwrap()
    }

    #[test]
    fn test_new_valid_product() {
        let p = sample();
        assert_eq!(p.id(), 0);
        assert!(p.is_new());
        assert_eq!(p.name(), "Arroz 5kg");
        assert_eq!(p.supplier().id, 1);
        assert_eq!(p.supplier().name.as_deref(), Some("Camil"));
        assert_eq!(p.supplier_code(), "ARZ-5");
        assert_eq!(p.stock_quantity(), 5);
        assert_eq!(p.price(), Money::new(dec!(21.90)));
    }

    #[test]
    fn test_zero_quantity_and_price_allowed() {
        let p = Product::new("Brinde", Supplier::new(1), "BR-0", 0, "0").unwrap();
        assert_eq!(p.stock_quantity(), 0);
        assert!(p.price().is_zero());
    }

    #[test]
    fn test_new_reports_first_failure_in_order() {
        let cases: Vec<(Result<Product, ValidationError>, &str)> = vec![
            (Product::new("", Supplier::new(0), "", -1, "x"), "name"),
            (Product::new("A", Supplier::new(0), "", -1, "x"), "supplier_id"),
            (Product::new("A", Supplier::new(1), " ", -1, "x"), "supplier_code"),
            (Product::new("A", Supplier::new(1), "C", -1, "x"), "stock_quantity"),
            (Product::new("A", Supplier::new(1), "C", 0, "x"), "price"),
            (Product::new("A", Supplier::new(1), "C", 0, "-1"), "price"),
        ];

        for (result, expected) in cases {
            let err = result.unwrap_err();
            let reported = match &err {
                ValidationError::Required { field }
                | ValidationError::MustBePositive { field }
                | ValidationError::Negative { field }
                | ValidationError::InvalidFormat { field, .. } => field.clone(),
                other => panic!("unexpected error {other:?}"),
            };
            assert_eq!(reported, expected, "error was {err}");
        }
    }

    #[test]
    fn test_unparseable_price_is_invalid_format() {
        let err = Product::new("A", Supplier::new(1), "C", 0, "dez reais").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidFormat { .. }));
    }

    #[test]
    fn test_new_fails_iff_a_rule_is_broken() {
        let names = ["", "Arroz"];
        let suppliers = [0, -1, 2];
        let codes = ["", "C-1"];
        let quantities = [-1, 0, 7];
        let prices = ["-0.01", "0", "3.50"];

        for name in names {
            for supplier in suppliers {
                for code in codes {
                    for qty in quantities {
                        for price in prices {
                            let broken = name.is_empty()
                                || supplier <= 0
                                || code.is_empty()
                                || qty < 0
                                || price.starts_with('-');
                            let result = Product::new(name, Supplier::new(supplier), code, qty, price);
                            assert_eq!(result.is_err(), broken, "{name:?} {supplier} {code:?} {qty} {price}");
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_setters_validate_own_field_only() {
        let mut p = sample();

        assert!(p.set_name("").is_err());
        assert_eq!(p.name(), "Arroz 5kg");

        assert!(p.set_stock_quantity(-3).is_err());
        assert_eq!(p.stock_quantity(), 5);

        assert!(p.set_price("abc").is_err());
        assert!(p.set_price("-2").is_err());
        assert_eq!(p.price().to_string(), "21.90");

        p.set_name("Arroz Integral 5kg").unwrap();
        p.set_stock_quantity(12).unwrap();
        p.set_price("23.15").unwrap();
        p.set_supplier_code("ARZ-I5").unwrap();

        assert_eq!(p.name(), "Arroz Integral 5kg");
        assert_eq!(p.stock_quantity(), 12);
        assert_eq!(p.price().to_string(), "23.15");
        assert_eq!(p.supplier_code(), "ARZ-I5");
    }

    #[test]
    fn test_validate_and_update_trims() {
        let mut p = sample();
        p.set_name("  Arroz  ").unwrap();
        p.validate_and_update().unwrap();
        assert_eq!(p.name(), "Arroz");
    }

    #[test]
    fn test_try_from_parts() {
        let p = Product::try_from_parts(
            9,
            "Sal".to_string(),
            Supplier::new(2),
            "SAL".to_string(),
            1,
            Money::new(dec!(2.00)),
        )
        .unwrap();
        assert_eq!(p.id(), 9);
        assert!(!p.is_new());

        let bad = Product::try_from_parts(
            9,
            "Sal".to_string(),
            Supplier::new(2),
            "SAL".to_string(),
            -1,
            Money::ZERO,
        );
        assert!(bad.is_err());
    }

    #[test]
    fn test_serializes_price_as_string() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["price"], "21.90");
        assert_eq!(json["supplier"]["id"], 1);
        assert_eq!(json["supplier_code"], "ARZ-5");
    }
}
