//! # Settlement Policy
//!
//! Decides how long a simulated settlement takes and whether the bank
//! accepts it. Swapped at startup: the deterministic policy backs test mode,
//! the stochastic one backs everything else.
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │          SettlementPolicy (trait)             │
//! │  ├── decide_outcome(method) -> bool           │
//! │  └── compute_delay() -> Duration              │
//! └───────────────────────────────────────────────┘
//!                      ▲
//!          ┌───────────┴───────────┐
//!  ┌───────┴────────┐     ┌────────┴───────┐
//!  │ Deterministic  │     │   Stochastic   │
//!  └────────────────┘     └────────────────┘
//! ```

use crate::payment::PaymentMethod;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;

/// Delay and outcome model for simulated settlement
pub trait SettlementPolicy: Send + Sync {
    /// `true` when the bank accepts the payment
    fn decide_outcome(&self, method: PaymentMethod) -> bool;

    /// How long settlement takes
    fn compute_delay(&self) -> Duration;

    /// Name for logging
    fn mode(&self) -> &'static str;
}

/// Type alias for a shared settlement policy (dynamic dispatch)
pub type SharedSettlementPolicy = Arc<dyn SettlementPolicy>;

/// Fixed delay and fixed outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeterministicPolicy {
    pub delay: Duration,
    pub succeed: bool,
}

impl DeterministicPolicy {
    pub const DEFAULT_DELAY: Duration = Duration::from_millis(1000);

    pub fn new(delay: Duration, succeed: bool) -> Self {
        Self { delay, succeed }
    }

    /// Zero delay, always succeeds
    pub fn instant() -> Self {
        Self::new(Duration::ZERO, true)
    }

    pub fn with_outcome(mut self, succeed: bool) -> Self {
        self.succeed = succeed;
        self
    }
}

impl Default for DeterministicPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DELAY, true)
    }
}

impl SettlementPolicy for DeterministicPolicy {
    fn decide_outcome(&self, _method: PaymentMethod) -> bool {
        self.succeed
    }

    fn compute_delay(&self) -> Duration {
        self.delay
    }

    fn mode(&self) -> &'static str {
        "deterministic"
    }
}

/// Random delay in `[min_delay, max_delay]` and per-method success odds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StochasticPolicy {
    pub min_delay: Duration,
    pub max_delay: Duration,
    pub upi_success_rate: f64,
    pub card_success_rate: f64,
}

impl StochasticPolicy {
    pub fn success_rate(&self, method: PaymentMethod) -> f64 {
        match method {
            PaymentMethod::Upi => self.upi_success_rate,
            PaymentMethod::Card => self.card_success_rate,
        }
    }
}

impl Default for StochasticPolicy {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_millis(5000),
            max_delay: Duration::from_millis(10000),
            upi_success_rate: 0.90,
            card_success_rate: 0.95,
        }
    }
}

impl SettlementPolicy for StochasticPolicy {
    fn decide_outcome(&self, method: PaymentMethod) -> bool {
        rand::thread_rng().gen_bool(self.success_rate(method).clamp(0.0, 1.0))
    }

    fn compute_delay(&self) -> Duration {
        let min = self.min_delay.as_millis() as u64;
        let max = (self.max_delay.as_millis() as u64).max(min);
        Duration::from_millis(rand::thread_rng().gen_range(min..=max))
    }

    fn mode(&self) -> &'static str {
        "stochastic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic_policy() {
        let policy = DeterministicPolicy::new(Duration::from_millis(250), false);
        assert!(!policy.decide_outcome(PaymentMethod::Upi));
        assert!(!policy.decide_outcome(PaymentMethod::Card));
        assert_eq!(policy.compute_delay(), Duration::from_millis(250));

        let default = DeterministicPolicy::default();
        assert!(default.decide_outcome(PaymentMethod::Card));
        assert_eq!(default.compute_delay(), Duration::from_millis(1000));
    }

    #[test]
    fn test_stochastic_delay_bounds() {
        let policy = StochasticPolicy::default();
        for _ in 0..500 {
            let delay = policy.compute_delay();
            assert!(delay >= Duration::from_millis(5000));
            assert!(delay <= Duration::from_millis(10000));
        }
    }

    #[test]
    fn test_stochastic_extreme_rates() {
        let always = StochasticPolicy {
            upi_success_rate: 1.0,
            card_success_rate: 0.0,
            ..StochasticPolicy::default()
        };
        for _ in 0..100 {
            assert!(always.decide_outcome(PaymentMethod::Upi));
            assert!(!always.decide_outcome(PaymentMethod::Card));
        }
    }
}
