//! # Ledgers
//!
//! Create/read/list services over the [`Store`](crate::store::Store):
//! the order ledger and the payment ledger. Lookups that miss become
//! `NOT_FOUND_ERROR`.

use crate::clock::SharedClock;
use crate::error::{GatewayError, GatewayResult};
use crate::id::{SharedIdGenerator, ORDER_PREFIX};
use crate::merchant::Merchant;
use crate::order::{NewOrder, Order, OrderSummary};
use crate::payment::Payment;
use crate::store::SharedStore;
use tracing::info;

/// Orders: create once, read many
#[derive(Clone)]
pub struct OrderLedger {
    store: SharedStore,
    clock: SharedClock,
    ids: SharedIdGenerator,
}

impl OrderLedger {
    pub fn new(store: SharedStore, clock: SharedClock, ids: SharedIdGenerator) -> Self {
        Self { store, clock, ids }
    }

    /// Create an order owned by `merchant`
    pub async fn create(&self, merchant: &Merchant, new: NewOrder) -> GatewayResult<Order> {
        let order = Order::create(
            self.ids.generate(ORDER_PREFIX),
            &merchant.id,
            new,
            self.clock.now(),
        )?;
        let order = self.store.insert_order(order).await?;

        info!(
            order_id = %order.id,
            merchant_id = %order.merchant_id,
            amount = order.amount,
            currency = %order.currency,
            "Order created"
        );
        Ok(order)
    }

    pub async fn get(&self, id: &str) -> GatewayResult<Order> {
        self.store
            .get_order(id)
            .await?
            .ok_or_else(|| GatewayError::order_not_found(id))
    }

    /// Get an order only if `merchant_id` owns it; other merchants see NOT_FOUND
    pub async fn get_owned(&self, id: &str, merchant_id: &str) -> GatewayResult<Order> {
        let order = self.get(id).await?;
        if !order.is_owned_by(merchant_id) {
            return Err(GatewayError::order_not_found(id));
        }
        Ok(order)
    }

    /// Checkout view of an order
    pub async fn summary(&self, id: &str) -> GatewayResult<OrderSummary> {
        self.get(id).await.map(|o| OrderSummary::from(&o))
    }

    pub async fn list_by_merchant(&self, merchant_id: &str) -> GatewayResult<Vec<Order>> {
        self.store.list_orders_by_merchant(merchant_id).await
    }
}

/// Payments: inserted by the processor, read by polling and dashboards
#[derive(Clone)]
pub struct PaymentLedger {
    store: SharedStore,
}

impl PaymentLedger {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub async fn insert(&self, payment: Payment) -> GatewayResult<Payment> {
        self.store.insert_payment(payment).await
    }

    pub async fn get(&self, id: &str) -> GatewayResult<Payment> {
        self.store
            .get_payment(id)
            .await?
            .ok_or_else(|| GatewayError::payment_not_found(id))
    }

    /// Write the terminal state of a `processing` payment
    pub async fn settle(
        &self,
        id: &str,
        succeeded: bool,
        at: chrono::DateTime<chrono::Utc>,
    ) -> GatewayResult<Payment> {
        self.store
            .settle_payment(id, succeeded, at)
            .await?
            .ok_or_else(|| GatewayError::payment_not_found(id))
    }

    pub async fn list_by_merchant(&self, merchant_id: &str) -> GatewayResult<Vec<Payment>> {
        self.store.list_payments_by_merchant(merchant_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::id::RandomIdGenerator;
    use crate::store::MemoryStore;
    use chrono::Utc;
    use std::sync::Arc;

    fn ledger() -> OrderLedger {
        OrderLedger::new(
            Arc::new(MemoryStore::new()),
            Arc::new(FixedClock(Utc::now())),
            Arc::new(RandomIdGenerator),
        )
    }

    #[tokio::test]
    async fn test_create_and_get_order() {
        let ledger = ledger();
        let merchant = Merchant::test_merchant();

        let order = ledger
            .create(&merchant, NewOrder::new(50000).with_receipt("r1"))
            .await
            .unwrap();
        assert!(order.id.starts_with("order_"));
        assert_eq!(order.merchant_id, Merchant::TEST_ID);

        let fetched = ledger.get(&order.id).await.unwrap();
        assert_eq!(fetched, order);

        let summary = ledger.summary(&order.id).await.unwrap();
        assert_eq!(summary.amount, 50000);
    }

    #[tokio::test]
    async fn test_below_minimum_is_not_stored() {
        let ledger = ledger();
        let merchant = Merchant::test_merchant();

        let err = ledger.create(&merchant, NewOrder::new(99)).await.unwrap_err();
        assert_eq!(err.code(), "BAD_REQUEST_ERROR");
        assert!(ledger.list_by_merchant(&merchant.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ownership_scoped_get() {
        let ledger = ledger();
        let owner = Merchant::test_merchant();
        let order = ledger.create(&owner, NewOrder::new(500)).await.unwrap();

        assert!(ledger.get_owned(&order.id, &owner.id).await.is_ok());
        let err = ledger.get_owned(&order.id, "someone_else").await.unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND_ERROR");
    }

    #[tokio::test]
    async fn test_missing_records() {
        let store: SharedStore = Arc::new(MemoryStore::new());
        let payments = PaymentLedger::new(store);
        let err = payments.get("pay_nope").await.unwrap_err();
        assert_eq!(err, GatewayError::payment_not_found("pay_nope"));

        let err = ledger().get("order_nope").await.unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND_ERROR");
    }
}
