//! # Request Handlers
//!
//! Axum request handlers for the gateway API.
//! Merchant handlers receive the caller through the `AuthenticatedMerchant`
//! extension set by [`crate::auth::require_merchant`].

use crate::auth::AuthenticatedMerchant;
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Extension, Json,
};
use pay_core::{
    Caller, GatewayError, Merchant, NewOrder, Order, OrderSummary, Payment, PaymentRequest,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, instrument, warn};

// =============================================================================
// Request/Response Types
// =============================================================================

/// Create order request
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    /// Amount in minor currency units
    #[serde(default)]
    pub amount: Option<i64>,
    /// Currency (defaults to INR)
    #[serde(default)]
    pub currency: Option<String>,
    /// Merchant receipt reference
    #[serde(default)]
    pub receipt: Option<String>,
    /// Free-form notes
    #[serde(default)]
    pub notes: Option<serde_json::Value>,
}

impl CreateOrderRequest {
    fn into_new_order(self) -> Result<NewOrder, GatewayError> {
        let amount = self
            .amount
            .ok_or_else(|| GatewayError::BadRequest("amount is required".to_string()))?;

        Ok(NewOrder {
            amount,
            currency: self.currency,
            receipt: self.receipt,
            notes: self.notes,
        })
    }
}

/// Seeded test merchant, as exposed to the checkout tooling
#[derive(Debug, Serialize)]
pub struct TestMerchantResponse {
    pub id: String,
    pub email: String,
    pub api_key: String,
    pub seeded: bool,
}

/// Error envelope: `{ "error": { "code", "description" } }`
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub description: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                description: description.into(),
            },
        }
    }
}

/// Every handler failure, rendered as the error envelope
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// Body missing, not JSON, or the wrong shape
    #[error("Invalid request body: {0}")]
    Body(#[from] JsonRejection),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Gateway(e) => {
                StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            ApiError::Body(_) => StatusCode::BAD_REQUEST,
        }
    }

    pub fn to_response_body(&self) -> ErrorResponse {
        match self {
            ApiError::Gateway(e) => ErrorResponse::new(e.code(), e.description()),
            ApiError::Body(rejection) => {
                ErrorResponse::new("BAD_REQUEST_ERROR", rejection.body_text())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Gateway(e) = &self {
            if e.status_code() >= 500 {
                error!("Request failed: {}", e);
            }
        }
        (self.status(), Json(self.to_response_body())).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Fallback for paths with no route
pub async fn not_found(uri: Uri) -> Response {
    let body = ErrorResponse::new("NOT_FOUND_ERROR", format!("No route for {}", uri.path()));
    (StatusCode::NOT_FOUND, Json(body)).into_response()
}

/// Fallback for a known path called with the wrong method
pub async fn method_not_allowed(method: Method, uri: Uri) -> Response {
    let body = ErrorResponse::new(
        "BAD_REQUEST_ERROR",
        format!("{} is not allowed on {}", method, uri.path()),
    );
    (StatusCode::METHOD_NOT_ALLOWED, Json(body)).into_response()
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.ping().await {
        Ok(()) => Json(serde_json::json!({
            "status": "healthy",
            "database": "connected",
            "timestamp": chrono::Utc::now().to_rfc3339(),
        })),
        Err(e) => {
            warn!("Health check: store unreachable: {}", e);
            Json(serde_json::json!({
                "status": "unhealthy",
                "database": "disconnected",
            }))
        }
    }
}

/// Seeded test merchant lookup (checkout tooling)
pub async fn test_merchant(State(state): State<AppState>) -> ApiResult<Json<TestMerchantResponse>> {
    let merchant = state
        .store
        .find_merchant_by_email(Merchant::TEST_EMAIL)
        .await?
        .ok_or_else(|| GatewayError::NotFound {
            entity: "Merchant",
            id: Merchant::TEST_EMAIL.to_string(),
        })?;

    Ok(Json(TestMerchantResponse {
        id: merchant.id,
        email: merchant.email,
        api_key: merchant.api_key,
        seeded: true,
    }))
}

/// Create an order
#[instrument(skip_all, fields(merchant_id = %merchant.id))]
pub async fn create_order(
    State(state): State<AppState>,
    Extension(AuthenticatedMerchant(merchant)): Extension<AuthenticatedMerchant>,
    payload: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Order>)> {
    let Json(request) = payload?;
    let order = state
        .orders
        .create(&merchant, request.into_new_order()?)
        .await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// List the merchant's orders, newest first
pub async fn list_orders(
    State(state): State<AppState>,
    Extension(AuthenticatedMerchant(merchant)): Extension<AuthenticatedMerchant>,
) -> ApiResult<Json<Vec<Order>>> {
    Ok(Json(state.orders.list_by_merchant(&merchant.id).await?))
}

/// Get one of the merchant's orders
pub async fn get_order(
    State(state): State<AppState>,
    Extension(AuthenticatedMerchant(merchant)): Extension<AuthenticatedMerchant>,
    Path(order_id): Path<String>,
) -> ApiResult<Json<Order>> {
    Ok(Json(state.orders.get_owned(&order_id, &merchant.id).await?))
}

/// Order summary for the checkout page
pub async fn get_order_public(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> ApiResult<Json<OrderSummary>> {
    Ok(Json(state.orders.summary(&order_id).await?))
}

/// Create a payment as the authenticated merchant (ownership enforced)
#[instrument(skip_all, fields(merchant_id = %merchant.id))]
pub async fn create_payment(
    State(state): State<AppState>,
    Extension(AuthenticatedMerchant(merchant)): Extension<AuthenticatedMerchant>,
    payload: Result<Json<PaymentRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Payment>)> {
    let Json(request) = payload?;
    let payment = state
        .processor
        .create_payment(request, Caller::Merchant(&merchant))
        .await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

/// Create a payment from the checkout page (no merchant session)
#[instrument(skip_all)]
pub async fn create_payment_public(
    State(state): State<AppState>,
    payload: Result<Json<PaymentRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Payment>)> {
    let Json(request) = payload?;
    let payment = state
        .processor
        .create_payment(request, Caller::Checkout)
        .await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

/// Get a payment
pub async fn get_payment(
    State(state): State<AppState>,
    Path(payment_id): Path<String>,
) -> ApiResult<Json<Payment>> {
    Ok(Json(state.payments.get(&payment_id).await?))
}

/// List the merchant's payments, newest first (dashboard)
pub async fn list_payments(
    State(state): State<AppState>,
    Extension(AuthenticatedMerchant(merchant)): Extension<AuthenticatedMerchant>,
) -> ApiResult<Json<Vec<Payment>>> {
    Ok(Json(state.payments.list_by_merchant(&merchant.id).await?))
}
