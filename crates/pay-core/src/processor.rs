//! # Payment Processor
//!
//! Orchestrates a payment from request to terminal state:
//!
//! 1. Load the order (NOT_FOUND_ERROR if absent)
//! 2. Merchant callers must own the order (AUTHENTICATION_ERROR otherwise);
//!    checkout callers skip this check
//! 3. Validate the instrument (INVALID_VPA / INVALID_CARD / EXPIRED_CARD /
//!    BAD_REQUEST_ERROR). Nothing is written before this passes.
//! 4. Insert the payment as `processing`
//! 5. Wait for the policy's delay, ask it for the outcome, settle
//!
//! Step 5 runs on its own task. The caller awaits it, but dropping the
//! caller's future does not cancel the settlement.

use crate::clock::SharedClock;
use crate::error::{GatewayError, GatewayResult};
use crate::id::{SharedIdGenerator, PAYMENT_PREFIX};
use crate::ledger::{OrderLedger, PaymentLedger};
use crate::merchant::Merchant;
use crate::payment::{CardInput, Instrument, Payment, PaymentMethod, PaymentRequest};
use crate::settlement::SharedSettlementPolicy;
use crate::validate::{card_last4, detect_network, is_expired, luhn_valid, vpa_valid};
use tracing::{error, info, instrument, warn};

/// Who is asking for the payment
#[derive(Debug, Clone, Copy)]
pub enum Caller<'a> {
    /// An authenticated merchant; must own the order
    Merchant(&'a Merchant),
    /// The public checkout page; no merchant session
    Checkout,
}

#[derive(Clone)]
pub struct PaymentProcessor {
    orders: OrderLedger,
    payments: PaymentLedger,
    policy: SharedSettlementPolicy,
    clock: SharedClock,
    ids: SharedIdGenerator,
}

impl PaymentProcessor {
    pub fn new(
        orders: OrderLedger,
        payments: PaymentLedger,
        policy: SharedSettlementPolicy,
        clock: SharedClock,
        ids: SharedIdGenerator,
    ) -> Self {
        Self {
            orders,
            payments,
            policy,
            clock,
            ids,
        }
    }

    pub fn settlement_mode(&self) -> &'static str {
        self.policy.mode()
    }

    /// Create a payment and return it in its terminal state
    #[instrument(skip(self, request, caller), fields(order_id = %request.order_id, method = %request.method))]
    pub async fn create_payment(
        &self,
        request: PaymentRequest,
        caller: Caller<'_>,
    ) -> GatewayResult<Payment> {
        let order = self.orders.get(&request.order_id).await?;

        if let Caller::Merchant(merchant) = caller {
            if !order.is_owned_by(&merchant.id) {
                warn!(
                    merchant_id = %merchant.id,
                    "Payment rejected: order belongs to another merchant"
                );
                return Err(GatewayError::Authentication(
                    "Order does not belong to this merchant".to_string(),
                ));
            }
        }

        let instrument = self.validate(&request)?;

        let payment = Payment::processing(
            self.ids.generate(PAYMENT_PREFIX),
            &order,
            instrument,
            self.clock.now(),
        );
        let payment = self.payments.insert(payment).await?;
        info!(payment_id = %payment.id, amount = payment.amount, "Payment processing");

        self.settle(payment.id, payment.method).await
    }

    /// Check the instrument for `request.method` and reduce it to storable data
    pub fn validate(&self, request: &PaymentRequest) -> GatewayResult<Instrument> {
        match request.method.parse::<PaymentMethod>()? {
            PaymentMethod::Upi => {
                let vpa = request
                    .vpa
                    .as_deref()
                    .filter(|vpa| vpa_valid(vpa))
                    .ok_or_else(|| GatewayError::InvalidVpa("Invalid VPA format".to_string()))?;

                Ok(Instrument::Upi {
                    vpa: vpa.to_string(),
                })
            }
            PaymentMethod::Card => {
                let card = request.card.as_ref();
                let number = card
                    .and_then(|card| card.number.as_deref())
                    .filter(|number| luhn_valid(number))
                    .ok_or_else(|| GatewayError::InvalidCard("Invalid Card Number".to_string()))?;

                let (month, year) = card
                    .and_then(CardInput::expiry)
                    .ok_or_else(|| GatewayError::InvalidCard("Invalid card expiry".to_string()))?;

                if is_expired(month, year, self.clock.now()) {
                    return Err(GatewayError::ExpiredCard("Card Expired".to_string()));
                }

                Ok(Instrument::Card {
                    network: detect_network(number),
                    last4: card_last4(number),
                })
            }
        }
    }

    async fn settle(&self, payment_id: String, method: PaymentMethod) -> GatewayResult<Payment> {
        let delay = self.policy.compute_delay();
        let processor = self.clone();

        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let succeeded = processor.policy.decide_outcome(method);
            processor
                .payments
                .settle(&payment_id, succeeded, processor.clock.now())
                .await
        });

        match task.await {
            Ok(Ok(payment)) => {
                info!(
                    payment_id = %payment.id,
                    status = %payment.status,
                    delay_ms = delay.as_millis() as u64,
                    "Payment settled"
                );
                Ok(payment)
            }
            Ok(Err(e)) => {
                error!("Failed to settle payment: {}", e);
                Err(e)
            }
            Err(e) => {
                error!("Settlement task aborted: {}", e);
                Err(GatewayError::Internal(format!("settlement task failed: {}", e)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::id::RandomIdGenerator;
    use crate::order::{NewOrder, Order};
    use crate::payment::{ExpiryPart, PaymentStatus};
    use crate::settlement::DeterministicPolicy;
    use crate::store::{MemoryStore, SharedStore};
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;
    use std::time::Duration;

    struct Harness {
        store: Arc<MemoryStore>,
        orders: OrderLedger,
        payments: PaymentLedger,
        processor: PaymentProcessor,
    }

    fn harness(policy: DeterministicPolicy) -> Harness {
        let store = Arc::new(MemoryStore::with_merchants([Merchant::test_merchant()]));
        let shared: SharedStore = store.clone();
        let clock = Arc::new(FixedClock(Utc.with_ymd_and_hms(2025, 6, 15, 9, 30, 0).unwrap()));
        let ids = Arc::new(RandomIdGenerator);

        let orders = OrderLedger::new(shared.clone(), clock.clone(), ids.clone());
        let payments = PaymentLedger::new(shared);
        let processor = PaymentProcessor::new(
            orders.clone(),
            payments.clone(),
            Arc::new(policy),
            clock,
            ids,
        );

        Harness {
            store,
            orders,
            payments,
            processor,
        }
    }

    async fn order(h: &Harness) -> Order {
        h.orders
            .create(&Merchant::test_merchant(), NewOrder::new(50000))
            .await
            .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_forced_failure_after_configured_delay() {
        let delay = Duration::from_millis(1500);
        let h = harness(DeterministicPolicy::new(delay, false));
        let order = order(&h).await;

        let started = tokio::time::Instant::now();
        let payment = h
            .processor
            .create_payment(PaymentRequest::upi(&order.id, "user@paytm"), Caller::Checkout)
            .await
            .unwrap();
        let elapsed = started.elapsed();

        assert!(elapsed >= delay);
        assert!(elapsed < delay + Duration::from_millis(10));
        assert_eq!(payment.status, PaymentStatus::Failed);
        assert_eq!(payment.error_code.as_deref(), Some("PAYMENT_FAILED"));
        assert_eq!(payment.vpa.as_deref(), Some("user@paytm"));

        tokio::time::sleep(Duration::from_secs(60)).await;
        let first = h.payments.get(&payment.id).await.unwrap();
        let second = h.payments.get(&payment.id).await.unwrap();
        assert_eq!(first, payment);
        assert_eq!(first, second);
    }

    #[tokio::test(start_paused = true)]
    async fn test_processing_visible_while_settling() {
        let h = harness(DeterministicPolicy::new(Duration::from_millis(1000), true));
        let order = order(&h).await;

        let processor = h.processor.clone();
        let order_id = order.id.clone();
        let pending = tokio::spawn(async move {
            processor
                .create_payment(PaymentRequest::upi(order_id, "user@okaxis"), Caller::Checkout)
                .await
        });

        tokio::time::sleep(Duration::from_millis(500)).await;
        let listed = h.payments.list_by_merchant(Merchant::TEST_ID).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].status, PaymentStatus::Processing);

        let settled = pending.await.unwrap().unwrap();
        assert_eq!(settled.status, PaymentStatus::Success);
        assert_eq!(settled.error_code, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_caller_still_settles() {
        let h = harness(DeterministicPolicy::new(Duration::from_millis(1000), true));
        let order = order(&h).await;

        let processor = h.processor.clone();
        let order_id = order.id.clone();
        let pending = tokio::spawn(async move {
            processor
                .create_payment(PaymentRequest::upi(order_id, "user@okaxis"), Caller::Checkout)
                .await
        });

        tokio::time::sleep(Duration::from_millis(100)).await;
        pending.abort();

        tokio::time::sleep(Duration::from_millis(2000)).await;
        let listed = h.payments.list_by_merchant(Merchant::TEST_ID).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].status, PaymentStatus::Success);
    }

    #[tokio::test]
    async fn test_card_payment_success() {
        let h = harness(DeterministicPolicy::instant());
        let order = order(&h).await;

        let card = CardInput::new("4111 1111 1111 1111", 12u32, 2030u32);
        let payment = h
            .processor
            .create_payment(PaymentRequest::card(&order.id, card), Caller::Checkout)
            .await
            .unwrap();

        assert_eq!(payment.status, PaymentStatus::Success);
        assert_eq!(payment.method, PaymentMethod::Card);
        assert_eq!(payment.card_network.map(|n| n.as_str()), Some("visa"));
        assert_eq!(payment.card_last4.as_deref(), Some("1111"));
        assert_eq!(payment.amount, 50000);
        assert_eq!(payment.currency, "INR");
        assert_eq!(payment.merchant_id, Merchant::TEST_ID);
    }

    #[tokio::test]
    async fn test_ownership_mismatch_writes_nothing() {
        let h = harness(DeterministicPolicy::instant());
        let order = order(&h).await;
        let intruder = Merchant::new("m_other", "other@example.com", "k", "s");

        let err = h
            .processor
            .create_payment(
                PaymentRequest::upi(&order.id, "user@paytm"),
                Caller::Merchant(&intruder),
            )
            .await
            .unwrap_err();

        assert_eq!(err.code(), "AUTHENTICATION_ERROR");
        assert_eq!(h.store.payment_count().await, 0);
    }

    #[tokio::test]
    async fn test_owner_may_pay() {
        let h = harness(DeterministicPolicy::instant());
        let order = order(&h).await;
        let owner = Merchant::test_merchant();

        let payment = h
            .processor
            .create_payment(
                PaymentRequest::upi(&order.id, "user@paytm"),
                Caller::Merchant(&owner),
            )
            .await
            .unwrap();
        assert_eq!(payment.status, PaymentStatus::Success);
    }

    #[tokio::test]
    async fn test_validation_failures_write_nothing() {
        let h = harness(DeterministicPolicy::instant());
        let order = order(&h).await;

        let cases = vec![
            (PaymentRequest::upi(&order.id, "not-a-vpa"), "INVALID_VPA"),
            (
                PaymentRequest::card(&order.id, CardInput::new("4111111111111112", 12u32, 2030u32)),
                "INVALID_CARD",
            ),
            (
                PaymentRequest::card(&order.id, CardInput::new("4111111111111111", 5u32, 25u32)),
                "EXPIRED_CARD",
            ),
            (
                PaymentRequest::card(&order.id, CardInput::new("4111111111111111", 13u32, 2030u32)),
                "INVALID_CARD",
            ),
            (
                PaymentRequest {
                    order_id: order.id.clone(),
                    method: "netbanking".into(),
                    vpa: None,
                    card: None,
                },
                "BAD_REQUEST_ERROR",
            ),
            (
                PaymentRequest {
                    order_id: order.id.clone(),
                    method: "card".into(),
                    vpa: None,
                    card: None,
                },
                "INVALID_CARD",
            ),
            (
                PaymentRequest {
                    order_id: order.id.clone(),
                    method: "upi".into(),
                    vpa: None,
                    card: None,
                },
                "INVALID_VPA",
            ),
        ];

        for (request, code) in cases {
            let err = h
                .processor
                .create_payment(request, Caller::Checkout)
                .await
                .unwrap_err();
            assert_eq!(err.code(), code);
        }
        assert_eq!(h.store.payment_count().await, 0);
    }

    #[tokio::test]
    async fn test_incomplete_card_is_invalid_card() {
        let h = harness(DeterministicPolicy::instant());
        let order = order(&h).await;

        let mut no_year = CardInput::new("4111111111111111", 12u32, 2030u32);
        no_year.expiry_year = None;
        let mut negative_month = CardInput::new("4111111111111111", 12u32, 2030u32);
        negative_month.expiry_month = Some(ExpiryPart::Other(serde_json::json!(-1)));
        let mut no_number = CardInput::new("4111111111111111", 12u32, 2030u32);
        no_number.number = None;

        for card in [no_year, negative_month, no_number] {
            let err = h
                .processor
                .create_payment(PaymentRequest::card(&order.id, card), Caller::Checkout)
                .await
                .unwrap_err();
            assert_eq!(err.code(), "INVALID_CARD");
        }
        assert_eq!(h.store.payment_count().await, 0);
    }

    #[tokio::test]
    async fn test_current_month_is_not_expired() {
        let h = harness(DeterministicPolicy::instant());
        let order = order(&h).await;

        let card = CardInput::new("5500005555555559", "06", "25");
        let payment = h
            .processor
            .create_payment(PaymentRequest::card(&order.id, card), Caller::Checkout)
            .await
            .unwrap();
        assert_eq!(payment.card_network.map(|n| n.as_str()), Some("mastercard"));
    }

    #[tokio::test]
    async fn test_unknown_order() {
        let h = harness(DeterministicPolicy::instant());
        let err = h
            .processor
            .create_payment(PaymentRequest::upi("order_missing", "user@paytm"), Caller::Checkout)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND_ERROR");
    }

    #[tokio::test]
    async fn test_multiple_attempts_on_one_order() {
        let h = harness(DeterministicPolicy::instant());
        let order = order(&h).await;

        let (a, b) = tokio::join!(
            h.processor
                .create_payment(PaymentRequest::upi(&order.id, "a@upi"), Caller::Checkout),
            h.processor
                .create_payment(PaymentRequest::upi(&order.id, "b@upi"), Caller::Checkout),
        );
        let (a, b) = (a.unwrap(), b.unwrap());

        assert_ne!(a.id, b.id);
        assert!(a.is_terminal() && b.is_terminal());
        assert_eq!(h.store.payment_count().await, 2);
    }
}
