//! # Order Types
//!
//! Orders are created once by a merchant and never mutated afterwards.

use crate::error::{GatewayError, GatewayResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Smallest order amount accepted, in minor currency units
pub const MIN_ORDER_AMOUNT: i64 = 100;

/// Currency applied when an order does not name one
pub const DEFAULT_CURRENCY: &str = "INR";

/// Order status. Orders are never moved past `created`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Created,
}

/// Merchant input for a new order
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    /// Amount in minor currency units (paise for INR)
    pub amount: i64,
    pub currency: Option<String>,
    pub receipt: Option<String>,
    pub notes: Option<serde_json::Value>,
}

impl NewOrder {
    pub fn new(amount: i64) -> Self {
        Self {
            amount,
            currency: None,
            receipt: None,
            notes: None,
        }
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    pub fn with_receipt(mut self, receipt: impl Into<String>) -> Self {
        self.receipt = Some(receipt.into());
        self
    }

    pub fn with_notes(mut self, notes: serde_json::Value) -> Self {
        self.notes = Some(notes);
        self
    }
}

/// A merchant order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// `order_` + 16 alphanumerics
    pub id: String,

    /// Owning merchant
    pub merchant_id: String,

    /// Amount in minor currency units
    pub amount: i64,

    pub currency: String,

    pub receipt: Option<String>,

    /// Free-form merchant notes
    pub notes: Option<serde_json::Value>,

    pub status: OrderStatus,

    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Build an order, enforcing the minimum amount
    pub fn create(
        id: impl Into<String>,
        merchant_id: impl Into<String>,
        new: NewOrder,
        created_at: DateTime<Utc>,
    ) -> GatewayResult<Self> {
        if new.amount < MIN_ORDER_AMOUNT {
            return Err(GatewayError::BadRequest(format!(
                "amount must be at least {}",
                MIN_ORDER_AMOUNT
            )));
        }

        let currency = new
            .currency
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());

        Ok(Self {
            id: id.into(),
            merchant_id: merchant_id.into(),
            amount: new.amount,
            currency,
            receipt: new.receipt,
            notes: new.notes,
            status: OrderStatus::Created,
            created_at,
        })
    }

    pub fn is_owned_by(&self, merchant_id: &str) -> bool {
        self.merchant_id == merchant_id
    }
}

/// The subset of an order the checkout page may see without credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    pub status: OrderStatus,
}

impl From<&Order> for OrderSummary {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.clone(),
            amount: order.amount,
            currency: order.currency.clone(),
            status: order.status,
        }
    }
}
