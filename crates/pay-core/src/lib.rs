//! # pay-core
//!
//! Core types and engine for the lightning-gateway simulated payment backend.
//!
//! This crate provides:
//! - `Merchant`, `Order`, `Payment` records
//! - Instrument validation (Luhn, card network, UPI VPA, card expiry)
//! - `SettlementPolicy` trait with deterministic and stochastic policies
//! - `Store` trait and the in-memory `MemoryStore`
//! - `OrderLedger`, `PaymentLedger` and the `PaymentProcessor` state machine
//! - `GatewayError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use pay_core::{Caller, DeterministicPolicy, MemoryStore, NewOrder, PaymentRequest};
//!
//! let order = orders.create(&merchant, NewOrder::new(50000)).await?;
//!
//! // Resolves after the policy's delay, already in its terminal state
//! let payment = processor
//!     .create_payment(PaymentRequest::upi(&order.id, "user@paytm"), Caller::Merchant(&merchant))
//!     .await?;
//! ```

pub mod clock;
pub mod error;
pub mod id;
pub mod ledger;
pub mod merchant;
pub mod order;
pub mod payment;
pub mod processor;
pub mod settlement;
pub mod store;
pub mod validate;

// Re-exports for convenience
pub use clock::{Clock, FixedClock, SharedClock, SystemClock};
pub use error::{GatewayError, GatewayResult, PAYMENT_FAILED_CODE, PAYMENT_FAILED_DESCRIPTION};
pub use id::{IdGenerator, RandomIdGenerator, SharedIdGenerator};
pub use ledger::{OrderLedger, PaymentLedger};
pub use merchant::{Merchant, MerchantSeed};
pub use order::{NewOrder, Order, OrderStatus, OrderSummary, DEFAULT_CURRENCY, MIN_ORDER_AMOUNT};
pub use payment::{
    CardInput, ExpiryPart, Instrument, Payment, PaymentMethod, PaymentRequest, PaymentStatus,
};
pub use processor::{Caller, PaymentProcessor};
pub use settlement::{
    DeterministicPolicy, SettlementPolicy, SharedSettlementPolicy, StochasticPolicy,
};
pub use store::{MemoryStore, SharedStore, Store};
pub use validate::CardNetwork;
