//! # Payment Types
//!
//! Payment records and the request shapes used to create them.
//!
//! ```text
//!   processing ──► success
//!        │
//!        └───────► failed
//! ```
//!
//! A payment is written once in `processing` and settled exactly once.

use crate::error::{GatewayError, GatewayResult, PAYMENT_FAILED_CODE, PAYMENT_FAILED_DESCRIPTION};
use crate::order::Order;
use crate::validate::CardNetwork;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Supported payment methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Upi,
    Card,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Upi => "upi",
            PaymentMethod::Card => "card",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upi" => Ok(PaymentMethod::Upi),
            "card" => Ok(PaymentMethod::Card),
            _ => Err(GatewayError::BadRequest("Invalid payment method".to_string())),
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Processing,
    Success,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Processing => "processing",
            PaymentStatus::Success => "success",
            PaymentStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, PaymentStatus::Processing)
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Expiry month or year as sent by clients: a JSON number or a numeric string.
///
/// Anything else (negative, fractional, objects) lands in `Other` so the
/// payment is rejected as an invalid card rather than a malformed body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExpiryPart {
    Number(u32),
    Text(String),
    Other(serde_json::Value),
}

impl ExpiryPart {
    pub fn value(&self) -> Option<u32> {
        match self {
            ExpiryPart::Number(n) => Some(*n),
            ExpiryPart::Text(s) => s.trim().parse().ok(),
            ExpiryPart::Other(_) => None,
        }
    }
}

impl From<u32> for ExpiryPart {
    fn from(n: u32) -> Self {
        ExpiryPart::Number(n)
    }
}

impl From<&str> for ExpiryPart {
    fn from(s: &str) -> Self {
        ExpiryPart::Text(s.to_string())
    }
}

/// Raw card details from the payer. Never persisted or logged.
///
/// Every field is optional on the wire; incomplete cards fail validation
/// with INVALID_CARD.
#[derive(Clone, Deserialize)]
pub struct CardInput {
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub expiry_month: Option<ExpiryPart>,
    #[serde(default)]
    pub expiry_year: Option<ExpiryPart>,
    #[serde(default)]
    pub cvv: Option<String>,
    #[serde(default)]
    pub holder_name: Option<String>,
}

impl CardInput {
    pub fn new(
        number: impl Into<String>,
        expiry_month: impl Into<ExpiryPart>,
        expiry_year: impl Into<ExpiryPart>,
    ) -> Self {
        Self {
            number: Some(number.into()),
            expiry_month: Some(expiry_month.into()),
            expiry_year: Some(expiry_year.into()),
            cvv: None,
            holder_name: None,
        }
    }

    /// Month and year as numbers, when both are present and the month is 1..=12
    pub fn expiry(&self) -> Option<(u32, u32)> {
        let month = self.expiry_month.as_ref().and_then(ExpiryPart::value)?;
        let year = self.expiry_year.as_ref().and_then(ExpiryPart::value)?;
        (1..=12).contains(&month).then_some((month, year))
    }
}

impl std::fmt::Debug for CardInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardInput")
            .field("number", &"<redacted>")
            .field("expiry_month", &self.expiry_month)
            .field("expiry_year", &self.expiry_year)
            .finish_non_exhaustive()
    }
}

/// Request to pay an order
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentRequest {
    pub order_id: String,
    /// Kept as text so an unknown method surfaces as BAD_REQUEST_ERROR
    pub method: String,
    #[serde(default)]
    pub vpa: Option<String>,
    #[serde(default)]
    pub card: Option<CardInput>,
}

impl PaymentRequest {
    pub fn upi(order_id: impl Into<String>, vpa: impl Into<String>) -> Self {
        Self {
            order_id: order_id.into(),
            method: PaymentMethod::Upi.as_str().to_string(),
            vpa: Some(vpa.into()),
            card: None,
        }
    }

    pub fn card(order_id: impl Into<String>, card: CardInput) -> Self {
        Self {
            order_id: order_id.into(),
            method: PaymentMethod::Card.as_str().to_string(),
            vpa: None,
            card: Some(card),
        }
    }
}

/// A validated instrument, reduced to what may be stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instrument {
    Upi { vpa: String },
    Card { network: CardNetwork, last4: String },
}

impl Instrument {
    pub fn method(&self) -> PaymentMethod {
        match self {
            Instrument::Upi { .. } => PaymentMethod::Upi,
            Instrument::Card { .. } => PaymentMethod::Card,
        }
    }
}

/// A payment attempt against an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    /// `pay_` + 16 alphanumerics
    pub id: String,
    pub order_id: String,
    /// Copied from the order when the payment is created
    pub merchant_id: String,
    pub amount: i64,
    pub currency: String,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    pub vpa: Option<String>,
    pub card_network: Option<CardNetwork>,
    pub card_last4: Option<String>,
    pub error_code: Option<String>,
    pub error_description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    /// A new `processing` payment carrying the order's ownership and amount
    pub fn processing(
        id: impl Into<String>,
        order: &Order,
        instrument: Instrument,
        created_at: DateTime<Utc>,
    ) -> Self {
        let method = instrument.method();
        let (vpa, card_network, card_last4) = match instrument {
            Instrument::Upi { vpa } => (Some(vpa), None, None),
            Instrument::Card { network, last4 } => (None, Some(network), Some(last4)),
        };

        Self {
            id: id.into(),
            order_id: order.id.clone(),
            merchant_id: order.merchant_id.clone(),
            amount: order.amount,
            currency: order.currency.clone(),
            method,
            status: PaymentStatus::Processing,
            vpa,
            card_network,
            card_last4,
            error_code: None,
            error_description: None,
            created_at,
            updated_at: created_at,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Move `processing` to `success` or `failed`. A terminal payment is never reopened.
    pub fn settle(&mut self, succeeded: bool, at: DateTime<Utc>) -> GatewayResult<()> {
        if self.is_terminal() {
            return Err(GatewayError::InvalidTransition {
                payment_id: self.id.clone(),
                status: self.status.to_string(),
            });
        }

        if succeeded {
            self.status = PaymentStatus::Success;
            self.error_code = None;
            self.error_description = None;
        } else {
            self.status = PaymentStatus::Failed;
            self.error_code = Some(PAYMENT_FAILED_CODE.to_string());
            self.error_description = Some(PAYMENT_FAILED_DESCRIPTION.to_string());
        }
        self.updated_at = at;
        Ok(())
    }
}
