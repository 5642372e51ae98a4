//! Opaque, prefixed record identifiers.

use rand::distributions::Alphanumeric;
use rand::Rng;
use std::sync::Arc;

pub const ORDER_PREFIX: &str = "order_";
pub const PAYMENT_PREFIX: &str = "pay_";

const ID_BODY_LEN: usize = 16;

/// Generates unique ids with a type prefix
pub trait IdGenerator: Send + Sync {
    fn generate(&self, prefix: &str) -> String;
}

pub type SharedIdGenerator = Arc<dyn IdGenerator>;

/// `prefix` followed by 16 random ASCII alphanumerics
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIdGenerator;

impl IdGenerator for RandomIdGenerator {
    fn generate(&self, prefix: &str) -> String {
        let body: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(ID_BODY_LEN)
            .map(char::from)
            .collect();
        format!("{}{}", prefix, body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_ids() {
        let ids = RandomIdGenerator;
        let id = ids.generate(PAYMENT_PREFIX);
        assert!(id.starts_with("pay_"));
        assert_eq!(id.len(), "pay_".len() + 16);
        assert!(id["pay_".len()..].chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(ids.generate(ORDER_PREFIX), ids.generate(ORDER_PREFIX));
    }
}
