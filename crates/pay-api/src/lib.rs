//! # pay-api
//!
//! HTTP API layer for lightning-gateway-rs.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - Merchant API-key authentication declared per route
//! - REST endpoints for orders, payments and checkout polling
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | POST | `/api/v1/orders` | Create order |
//! | GET | `/api/v1/orders/{id}/public` | Order summary for checkout |
//! | POST | `/api/v1/payments` | Create payment (merchant) |
//! | POST | `/api/v1/payments/public` | Create payment (checkout) |
//! | GET | `/api/v1/payments/{id}[/public]` | Poll payment |
//! | GET | `/api/v1/payments` | Merchant's payments, newest first |

pub mod auth;
pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::{create_router, route_table};
pub use state::{AppConfig, AppState, SettlementMode};
