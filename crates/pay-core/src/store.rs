//! # Store
//!
//! Persistence seam for merchants, orders and payments. The process entry
//! point constructs one store and hands it to every component.
//!
//! [`MemoryStore`] is the bundled implementation. A database-backed store
//! implements the same trait.

use crate::error::{GatewayError, GatewayResult};
use crate::merchant::Merchant;
use crate::order::Order;
use crate::payment::Payment;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Storage backend for the gateway
#[async_trait]
pub trait Store: Send + Sync {
    /// Liveness probe used by the health check
    async fn ping(&self) -> GatewayResult<()>;

    /// Exact match on the (api_key, api_secret) pair
    async fn find_merchant_by_credentials(
        &self,
        api_key: &str,
        api_secret: &str,
    ) -> GatewayResult<Option<Merchant>>;

    async fn find_merchant_by_email(&self, email: &str) -> GatewayResult<Option<Merchant>>;

    async fn insert_order(&self, order: Order) -> GatewayResult<Order>;

    async fn get_order(&self, id: &str) -> GatewayResult<Option<Order>>;

    /// Newest first
    async fn list_orders_by_merchant(&self, merchant_id: &str) -> GatewayResult<Vec<Order>>;

    async fn insert_payment(&self, payment: Payment) -> GatewayResult<Payment>;

    async fn get_payment(&self, id: &str) -> GatewayResult<Option<Payment>>;

    /// Atomically move a `processing` payment to its terminal state.
    ///
    /// Returns `Ok(None)` if the payment does not exist and
    /// `InvalidTransition` if it is already terminal.
    async fn settle_payment(
        &self,
        id: &str,
        succeeded: bool,
        at: DateTime<Utc>,
    ) -> GatewayResult<Option<Payment>>;

    /// Newest first
    async fn list_payments_by_merchant(&self, merchant_id: &str) -> GatewayResult<Vec<Payment>>;
}

/// Type alias for a shared store (dynamic dispatch)
pub type SharedStore = Arc<dyn Store>;

/// In-memory store. Rows are kept in insertion order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    merchants: RwLock<Vec<Merchant>>,
    orders: RwLock<Vec<Order>>,
    order_index: RwLock<HashMap<String, usize>>,
    payments: RwLock<Vec<Payment>>,
    payment_index: RwLock<HashMap<String, usize>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with merchants
    pub fn with_merchants(merchants: impl IntoIterator<Item = Merchant>) -> Self {
        Self {
            merchants: RwLock::new(merchants.into_iter().collect()),
            ..Self::default()
        }
    }

    pub async fn add_merchant(&self, merchant: Merchant) {
        self.merchants.write().await.push(merchant);
    }

    pub async fn merchant_count(&self) -> usize {
        self.merchants.read().await.len()
    }

    pub async fn payment_count(&self) -> usize {
        self.payments.read().await.len()
    }
}

/// Newest first; rows sharing a timestamp keep latest-inserted first
fn newest_first<T: Clone>(rows: &[T], created_at: impl Fn(&T) -> DateTime<Utc>) -> Vec<T> {
    let mut out: Vec<T> = rows.iter().rev().cloned().collect();
    out.sort_by(|a, b| created_at(b).cmp(&created_at(a)));
    out
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> GatewayResult<()> {
        Ok(())
    }

    async fn find_merchant_by_credentials(
        &self,
        api_key: &str,
        api_secret: &str,
    ) -> GatewayResult<Option<Merchant>> {
        let merchants = self.merchants.read().await;
        Ok(merchants
            .iter()
            .find(|m| m.matches(api_key, api_secret))
            .cloned())
    }

    async fn find_merchant_by_email(&self, email: &str) -> GatewayResult<Option<Merchant>> {
        let merchants = self.merchants.read().await;
        Ok(merchants.iter().find(|m| m.email == email).cloned())
    }

    async fn insert_order(&self, order: Order) -> GatewayResult<Order> {
        let mut orders = self.orders.write().await;
        let mut index = self.order_index.write().await;
        if index.contains_key(&order.id) {
            return Err(GatewayError::Internal(format!(
                "duplicate order id {}",
                order.id
            )));
        }
        index.insert(order.id.clone(), orders.len());
        orders.push(order.clone());
        Ok(order)
    }

    async fn get_order(&self, id: &str) -> GatewayResult<Option<Order>> {
        let orders = self.orders.read().await;
        let index = self.order_index.read().await;
        Ok(index.get(id).and_then(|&i| orders.get(i)).cloned())
    }

    async fn list_orders_by_merchant(&self, merchant_id: &str) -> GatewayResult<Vec<Order>> {
        let orders = self.orders.read().await;
        let owned: Vec<Order> = orders
            .iter()
            .filter(|o| o.merchant_id == merchant_id)
            .cloned()
            .collect();
        Ok(newest_first(&owned, |o| o.created_at))
    }

    async fn insert_payment(&self, payment: Payment) -> GatewayResult<Payment> {
        let mut payments = self.payments.write().await;
        let mut index = self.payment_index.write().await;
        if index.contains_key(&payment.id) {
            return Err(GatewayError::Internal(format!(
                "duplicate payment id {}",
                payment.id
            )));
        }
        index.insert(payment.id.clone(), payments.len());
        payments.push(payment.clone());
        Ok(payment)
    }

    async fn get_payment(&self, id: &str) -> GatewayResult<Option<Payment>> {
        let payments = self.payments.read().await;
        let index = self.payment_index.read().await;
        Ok(index.get(id).and_then(|&i| payments.get(i)).cloned())
    }

    async fn settle_payment(
        &self,
        id: &str,
        succeeded: bool,
        at: DateTime<Utc>,
    ) -> GatewayResult<Option<Payment>> {
        let mut payments = self.payments.write().await;
        let index = self.payment_index.read().await;
        let Some(payment) = index.get(id).and_then(|&i| payments.get_mut(i)) else {
            return Ok(None);
        };
        payment.settle(succeeded, at)?;
        Ok(Some(payment.clone()))
    }

    async fn list_payments_by_merchant(&self, merchant_id: &str) -> GatewayResult<Vec<Payment>> {
        let payments = self.payments.read().await;
        let owned: Vec<Payment> = payments
            .iter()
            .filter(|p| p.merchant_id == merchant_id)
            .cloned()
            .collect();
        Ok(newest_first(&owned, |p| p.created_at))
    }
}
