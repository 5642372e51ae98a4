//! # Application State
//!
//! Shared state for the Axum application.
//! Holds the store, the ledgers and the payment processor. Everything is
//! constructed once by the entry point and cloned into handlers.

use pay_core::{
    DeterministicPolicy, GatewayError, GatewayResult, MemoryStore, Merchant, MerchantSeed,
    OrderLedger, PaymentLedger, PaymentProcessor, RandomIdGenerator, SharedClock,
    SharedIdGenerator, SharedSettlementPolicy, SharedStore, StochasticPolicy, SystemClock,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// How payments settle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettlementMode {
    /// Fixed delay and fixed outcome (`TEST_MODE=true`)
    Deterministic { delay: Duration, succeed: bool },
    /// Random 5–10s delay, 90% (upi) / 95% (card) success
    Stochastic,
}

impl SettlementMode {
    pub fn policy(&self) -> SharedSettlementPolicy {
        match *self {
            SettlementMode::Deterministic { delay, succeed } => {
                Arc::new(DeterministicPolicy::new(delay, succeed))
            }
            SettlementMode::Stochastic => Arc::new(StochasticPolicy::default()),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Environment (development, staging, production)
    pub environment: String,
    /// Settlement delay/outcome model
    pub settlement: SettlementMode,
    /// Merchant seed file; `config/merchants.toml` is tried when unset
    pub merchants_file: Option<PathBuf>,
}

impl AppConfig {
    /// Load from environment variables (and `.env` if present)
    pub fn from_env() -> GatewayResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary variable source
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> GatewayResult<Self> {
        let port = match get("PORT") {
            Some(p) => p
                .parse()
                .map_err(|_| GatewayError::Configuration(format!("PORT is not a port: {}", p)))?,
            None => 8000,
        };

        let test_mode = get("TEST_MODE").as_deref() == Some("true");
        let settlement = if test_mode {
            let delay_ms = match get("TEST_PROCESSING_DELAY") {
                Some(d) => d.parse::<u64>().map_err(|_| {
                    GatewayError::Configuration(format!(
                        "TEST_PROCESSING_DELAY must be milliseconds: {}",
                        d
                    ))
                })?,
                None => DeterministicPolicy::DEFAULT_DELAY.as_millis() as u64,
            };
            SettlementMode::Deterministic {
                delay: Duration::from_millis(delay_ms),
                succeed: get("TEST_PAYMENT_SUCCESS").as_deref() != Some("false"),
            }
        } else {
            SettlementMode::Stochastic
        };

        Ok(Self {
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            environment: get("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
            settlement,
            merchants_file: get("MERCHANTS_FILE").map(PathBuf::from),
        })
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> GatewayResult<std::net::SocketAddr> {
        format!("{}:{}", self.host, self.port).parse().map_err(|_| {
            GatewayError::Configuration(format!("Invalid socket address {}:{}", self.host, self.port))
        })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Backing store (credential lookups, health probe)
    pub store: SharedStore,
    /// Order ledger
    pub orders: OrderLedger,
    /// Payment ledger (polling and dashboard reads)
    pub payments: PaymentLedger,
    /// Payment state machine
    pub processor: PaymentProcessor,
    /// Application config
    pub config: AppConfig,
}

impl AppState {
    /// Wire the components around an existing store
    pub fn new(
        config: AppConfig,
        store: SharedStore,
        policy: SharedSettlementPolicy,
        clock: SharedClock,
        ids: SharedIdGenerator,
    ) -> Self {
        let orders = OrderLedger::new(store.clone(), clock.clone(), ids.clone());
        let payments = PaymentLedger::new(store.clone());
        let processor =
            PaymentProcessor::new(orders.clone(), payments.clone(), policy, clock, ids);

        Self {
            store,
            orders,
            payments,
            processor,
            config,
        }
    }

    /// Build the production state: in-memory store seeded with merchants,
    /// system clock, random ids, and the configured settlement policy
    pub fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let merchants = load_merchants(config.merchants_file.as_deref())?;
        tracing::info!("Merchants loaded: {}", merchants.len());

        let store: SharedStore = Arc::new(MemoryStore::with_merchants(merchants));
        let policy = config.settlement.policy();

        Ok(Self::new(
            config,
            store,
            policy,
            Arc::new(SystemClock),
            Arc::new(RandomIdGenerator),
        ))
    }
}

/// Load merchants from the configured file, then the default locations,
/// falling back to the built-in test merchant
fn load_merchants(explicit: Option<&std::path::Path>) -> anyhow::Result<Vec<Merchant>> {
    if let Some(path) = explicit {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
        return parse_merchants(&content, &path.display().to_string());
    }

    let config_paths = [
        "config/merchants.toml",
        "../config/merchants.toml",
        "../../config/merchants.toml",
    ];

    for path in config_paths {
        if let Ok(content) = std::fs::read_to_string(path) {
            return parse_merchants(&content, path);
        }
    }

    tracing::warn!("No merchant file found, seeding test merchant");
    Ok(vec![Merchant::test_merchant()])
}

fn parse_merchants(content: &str, path: &str) -> anyhow::Result<Vec<Merchant>> {
    let seed: MerchantSeed =
        toml::from_str(content).map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path, e))?;
    tracing::info!("Loaded {} merchants from {}", seed.merchants.len(), path);
    Ok(seed.merchants)
}
