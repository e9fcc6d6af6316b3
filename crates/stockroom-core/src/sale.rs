//! # Sale Module
//!
//! The sale aggregate: a header and its line items.
//!
//! ## Aggregate Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Sale #41  client 7  2026-03-02  PARTIAL                                │
//! │  ├── SaleItem  product 3  × 2  @ 8.49  = 16.98                          │
//! │  └── SaleItem  product 9  × 1  @ 4.90  =  4.90                          │
//! │                                          ──────                         │
//! │                                   total   21.88  (Σ line totals)        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Line totals and the sale total are always computed here. A total supplied
//! by a caller is only accepted when it agrees with the computed value.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::money::Money;
use crate::validation::{validate_id, validate_item_quantity, validate_non_negative, ValidationResult};

// =============================================================================
// Payment Status
// =============================================================================

/// How much of a sale has been paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentStatus {
    /// Nothing received yet.
    #[default]
    Pending,
    /// Settled in full.
    Paid,
    /// Some money received, balance outstanding.
    Partial,
}

impl PaymentStatus {
    pub const ALL: [PaymentStatus; 3] = [
        PaymentStatus::Pending,
        PaymentStatus::Paid,
        PaymentStatus::Partial,
    ];

    /// Stored / wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Paid => "PAID",
            PaymentStatus::Partial => "PARTIAL",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = ValidationError;

    /// Case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PaymentStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "payment_status".to_string(),
                allowed: PaymentStatus::ALL.iter().map(|s| s.as_str().to_string()).collect(),
            })
    }
}

// =============================================================================
// Sale Item
// =============================================================================

/// One product line within a sale.
///
/// `unit_price` is a snapshot taken at sale time; later price changes on the
/// product do not touch it. `id` and `sale_id` are 0 until persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleItem {
    pub id: i64,
    pub sale_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub unit_price: Money,
    pub line_total: Money,
}

impl SaleItem {
    /// Builds a line, computing `line_total = unit_price × quantity`.
    ///
    /// ## Example
    /// ```rust
    /// use stockroom_core::{Money, SaleItem};
    ///
    /// let item = SaleItem::new(3, 2, Money::parse("8.49").unwrap()).unwrap();
    /// assert_eq!(item.line_total.to_string(), "16.98");
    /// ```
    pub fn new(product_id: i64, quantity: i64, unit_price: Money) -> ValidationResult<Self> {
        validate_id("product_id", product_id)?;
        validate_item_quantity(quantity)?;
        validate_non_negative("unit_price", unit_price)?;

        let line_total = unit_price
            .checked_mul_quantity(quantity)
            .ok_or_else(|| ValidationError::invalid_format("line_total", "amount overflow"))?;

        Ok(SaleItem {
            id: 0,
            sale_id: 0,
            product_id,
            quantity,
            unit_price,
            line_total,
        })
    }

    /// Accepts a caller-supplied line total only if it matches the computed one.
    pub fn with_declared_total(self, declared: Money) -> ValidationResult<Self> {
        check_declared("line_total", self.line_total, declared)?;
        Ok(self)
    }

    /// Field rules for an item that did not come through [`SaleItem::new`].
    pub fn validate(&self) -> ValidationResult<()> {
        validate_id("product_id", self.product_id)?;
        validate_item_quantity(self.quantity)?;
        validate_non_negative("unit_price", self.unit_price)?;
        let expected = self
            .unit_price
            .checked_mul_quantity(self.quantity)
            .ok_or_else(|| ValidationError::invalid_format("line_total", "amount overflow"))?;
        check_declared("line_total", expected, self.line_total)
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A sale header with its items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    pub id: i64,
    pub client_id: i64,
    pub sale_date: NaiveDate,
    pub total: Money,
    pub payment_date: Option<NaiveDate>,
    pub payment_status: PaymentStatus,
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    #[serde(default)]
    pub items: Vec<SaleItem>,
}

impl Sale {
    /// Builds an unsaved sale and computes its total from the items.
    ///
    /// ## Rules
    /// - `client_id > 0`
    /// - at least one item
    /// - every item passes [`SaleItem::validate`]
    pub fn new(
        client_id: i64,
        sale_date: NaiveDate,
        payment_status: PaymentStatus,
        payment_date: Option<NaiveDate>,
        items: Vec<SaleItem>,
    ) -> ValidationResult<Self> {
        validate_id("client_id", client_id)?;
        if items.is_empty() {
            return Err(ValidationError::Empty {
                field: "items".to_string(),
            });
        }
        for item in &items {
            item.validate()?;
        }

        let total = sum_line_totals(&items)?;

        Ok(Sale {
            id: 0,
            client_id,
            sale_date,
            total,
            payment_date,
            payment_status,
            items,
        })
    }

    /// Accepts a caller-supplied total only if it matches the computed one.
    ///
    /// ```rust
    /// use chrono::NaiveDate;
    /// use stockroom_core::{Money, PaymentStatus, Sale, SaleItem};
    ///
    /// let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
    /// let items = vec![SaleItem::new(1, 2, Money::parse("5.00").unwrap()).unwrap()];
    /// let sale = Sale::new(7, date, PaymentStatus::Paid, Some(date), items).unwrap();
    ///
    /// assert!(sale.clone().with_declared_total(Money::parse("10.0").unwrap()).is_ok());
    /// assert!(sale.with_declared_total(Money::parse("9.99").unwrap()).is_err());
    /// ```
    pub fn with_declared_total(self, declared: Money) -> ValidationResult<Self> {
        check_declared("total", self.total, declared)?;
        Ok(self)
    }

    /// Sum of the current item line totals.
    pub fn computed_total(&self) -> ValidationResult<Money> {
        sum_line_totals(&self.items)
    }

    /// True until the store has assigned an id.
    #[inline]
    pub fn is_new(&self) -> bool {
        self.id == 0
    }

    /// Records store-assigned ids on the header and every item.
    ///
    /// `item_ids` must be in item order.
    pub fn assign_ids(&mut self, sale_id: i64, item_ids: &[i64]) {
        self.id = sale_id;
        for (item, id) in self.items.iter_mut().zip(item_ids) {
            item.sale_id = sale_id;
            item.id = *id;
        }
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn sum_line_totals(items: &[SaleItem]) -> ValidationResult<Money> {
    items.iter().try_fold(Money::ZERO, |acc, item| {
        acc.checked_add(item.line_total)
            .ok_or_else(|| ValidationError::invalid_format("total", "amount overflow"))
    })
}

fn check_declared(field: &str, computed: Money, declared: Money) -> ValidationResult<()> {
    if computed != declared {
        return Err(ValidationError::Mismatch {
            field: field.to_string(),
            expected: computed.to_string(),
            actual: declared.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn two_items() -> Vec<SaleItem> {
        vec![
            SaleItem::new(3, 2, Money::new(dec!(8.49))).unwrap(),
            SaleItem::new(9, 1, Money::new(dec!(4.90))).unwrap(),
        ]
    }

    #[test]
    fn test_item_line_total() {
        let item = SaleItem::new(3, 4, Money::new(dec!(0.25))).unwrap();
        assert_eq!(item.line_total, Money::new(dec!(1.00)));
        assert_eq!(item.id, 0);
        assert_eq!(item.sale_id, 0);
    }

    #[test]
    fn test_item_rules() {
        assert!(matches!(
            SaleItem::new(0, 1, Money::ZERO),
            Err(ValidationError::MustBePositive { .. })
        ));
        assert!(matches!(
            SaleItem::new(1, 0, Money::ZERO),
            Err(ValidationError::MustBePositive { .. })
        ));
        assert!(matches!(
            SaleItem::new(1, 1, Money::new(dec!(-1))),
            Err(ValidationError::Negative { .. })
        ));
    }

    #[test]
    fn test_item_declared_total() {
        let item = SaleItem::new(3, 2, Money::new(dec!(8.49))).unwrap();
        assert!(item.clone().with_declared_total(Money::new(dec!(16.98))).is_ok());
        assert!(matches!(
            item.with_declared_total(Money::new(dec!(17))),
            Err(ValidationError::Mismatch { .. })
        ));
    }

    #[test]
    fn test_sale_total_is_sum_of_lines() {
        let sale = Sale::new(7, date(2026, 3, 2), PaymentStatus::Partial, None, two_items()).unwrap();
        assert_eq!(sale.total, Money::new(dec!(21.88)));
        assert_eq!(sale.computed_total().unwrap(), sale.total);
        assert!(sale.is_new());
    }

    #[test]
    fn test_sale_rules() {
        let d = date(2026, 3, 2);
        assert!(matches!(
            Sale::new(0, d, PaymentStatus::Pending, None, two_items()),
            Err(ValidationError::MustBePositive { .. })
        ));
        assert!(matches!(
            Sale::new(7, d, PaymentStatus::Pending, None, vec![]),
            Err(ValidationError::Empty { .. })
        ));

        let mut tampered = two_items();
        tampered[1].line_total = Money::new(dec!(100));
        assert!(matches!(
            Sale::new(7, d, PaymentStatus::Pending, None, tampered),
            Err(ValidationError::Mismatch { .. })
        ));
    }

    #[test]
    fn test_declared_total_mismatch() {
        let sale = Sale::new(7, date(2026, 3, 2), PaymentStatus::Paid, None, two_items()).unwrap();
        let err = sale.with_declared_total(Money::new(dec!(20.00))).unwrap_err();
        assert_eq!(
            err,
            ValidationError::Mismatch {
                field: "total".to_string(),
                expected: "21.88".to_string(),
                actual: "20.00".to_string(),
            }
        );
    }

    #[test]
    fn test_assign_ids() {
        let mut sale = Sale::new(7, date(2026, 3, 2), PaymentStatus::Paid, None, two_items()).unwrap();
        sale.assign_ids(41, &[100, 101]);
        assert_eq!(sale.id, 41);
        assert!(sale.items.iter().all(|i| i.sale_id == 41));
        assert_eq!(sale.items[0].id, 100);
        assert_eq!(sale.items[1].id, 101);
    }

    #[test]
    fn test_payment_status_text() {
        assert_eq!(PaymentStatus::default(), PaymentStatus::Pending);
        assert_eq!("paid".parse::<PaymentStatus>().unwrap(), PaymentStatus::Paid);
        assert_eq!(" PARTIAL ".parse::<PaymentStatus>().unwrap(), PaymentStatus::Partial);
        assert!("PAGO".parse::<PaymentStatus>().is_err());

        assert_eq!(serde_json::to_string(&PaymentStatus::Partial).unwrap(), "\"PARTIAL\"");
        let parsed: PaymentStatus = serde_json::from_str("\"PENDING\"").unwrap();
        assert_eq!(parsed, PaymentStatus::Pending);
    }

    #[test]
    fn test_sale_json_shape() {
        let sale = Sale::new(7, date(2026, 3, 2), PaymentStatus::Paid, Some(date(2026, 3, 5)), two_items()).unwrap();
        let json = serde_json::to_value(&sale).unwrap();
        assert_eq!(json["total"], "21.88");
        assert_eq!(json["sale_date"], "2026-03-02");
        assert_eq!(json["payment_date"], "2026-03-05");
        assert_eq!(json["payment_status"], "PAID");
        assert_eq!(json["items"][0]["line_total"], "16.98");
    }
}
