//! # Merchant Authentication
//!
//! Every route is registered with an explicit [`Access`] level. Merchant
//! routes sit behind [`require_merchant`], which resolves the
//! `X-Api-Key`/`X-Api-Secret` pair against the store and attaches the
//! merchant to the request. Public routes never see this middleware.

use crate::handlers::ApiError;
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use pay_core::{GatewayError, Merchant};
use tracing::{debug, error, warn};

pub const API_KEY_HEADER: &str = "x-api-key";
pub const API_SECRET_HEADER: &str = "x-api-secret";

/// Access level declared for a route at registration time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// No credentials (health, checkout, test tooling)
    Public,
    /// Valid merchant credentials required
    Merchant,
}

impl std::fmt::Display for Access {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Access::Public => f.pad("public"),
            Access::Merchant => f.pad("merchant"),
        }
    }
}

/// The merchant resolved from the request's credentials
#[derive(Debug, Clone)]
pub struct AuthenticatedMerchant(pub Merchant);

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Reject the request unless its credentials match a merchant
pub async fn require_merchant(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let credentials = match (
        header(request.headers(), API_KEY_HEADER),
        header(request.headers(), API_SECRET_HEADER),
    ) {
        (Some(key), Some(secret)) => Some((key.to_owned(), secret.to_owned())),
        _ => None,
    };

    let merchant = match credentials {
        Some((key, secret)) => state
            .store
            .find_merchant_by_credentials(&key, &secret)
            .await
            .map_err(|e| {
                error!("Credential lookup failed: {}", e);
                GatewayError::Internal("Authentication Error".to_string())
            })?,
        None => None,
    };

    let Some(merchant) = merchant else {
        warn!(path = %request.uri().path(), "Rejected request with invalid API credentials");
        return Err(GatewayError::Authentication("Invalid API credentials".to_string()).into());
    };

    debug!(merchant_id = %merchant.id, "Merchant authenticated");
    request
        .extensions_mut()
        .insert(AuthenticatedMerchant(merchant));
    Ok(next.run(request).await)
}
