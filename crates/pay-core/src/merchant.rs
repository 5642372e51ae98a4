//! # Merchant Types
//!
//! Merchants own orders and authenticate with an API key/secret pair.
//! Merchant records are immutable for the lifetime of the process.

use serde::Deserialize;

/// A merchant account
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Merchant {
    /// Merchant id (UUID string for seeded merchants)
    pub id: String,

    /// Contact email
    pub email: String,

    /// Public half of the credential pair (`X-Api-Key`)
    pub api_key: String,

    /// Secret half of the credential pair (`X-Api-Secret`)
    pub api_secret: String,
}

impl Merchant {
    pub const TEST_ID: &'static str = "550e8400-e29b-41d4-a716-446655440000";
    pub const TEST_EMAIL: &'static str = "test@example.com";
    pub const TEST_API_KEY: &'static str = "key_test_abc123";
    pub const TEST_API_SECRET: &'static str = "secret_test_xyz789";

    pub fn new(
        id: impl Into<String>,
        email: impl Into<String>,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        }
    }

    /// The merchant seeded when no merchant file is configured
    pub fn test_merchant() -> Self {
        Self::new(
            Self::TEST_ID,
            Self::TEST_EMAIL,
            Self::TEST_API_KEY,
            Self::TEST_API_SECRET,
        )
    }

    /// Exact match on both halves of the credential pair
    pub fn matches(&self, api_key: &str, api_secret: &str) -> bool {
        self.api_key == api_key && self.api_secret == api_secret
    }
}

impl std::fmt::Debug for Merchant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Merchant")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

/// Merchant seed file (`config/merchants.toml`)
///
/// ```toml
/// [[merchants]]
/// id = "550e8400-e29b-41d4-a716-446655440000"
/// email = "test@example.com"
/// api_key = "key_test_abc123"
/// api_secret = "secret_test_xyz789"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MerchantSeed {
    #[serde(default)]
    pub merchants: Vec<Merchant>,
}
