//! # Routes
//!
//! Axum router configuration for the gateway API.
//! Each route declares its [`Access`] when it is registered; merchant
//! routes are grouped under the authentication middleware.

use crate::auth::{require_merchant, Access};
use crate::handlers;
use crate::state::AppState;
use axum::{
    middleware::from_fn_with_state,
    routing::{get, post, MethodRouter},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// A registered route and its access level
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    pub path: &'static str,
    pub methods: &'static str,
    pub access: Access,
}

/// Collects routes into a public and a merchant group
pub struct RouteTable {
    public: Router<AppState>,
    merchant: Router<AppState>,
    entries: Vec<RouteEntry>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self {
            public: Router::new(),
            merchant: Router::new(),
            entries: Vec::new(),
        }
    }

    /// Register `path` with an explicit access level
    pub fn route(
        mut self,
        path: &'static str,
        methods: &'static str,
        access: Access,
        handler: MethodRouter<AppState>,
    ) -> Self {
        match access {
            Access::Public => self.public = self.public.route(path, handler),
            Access::Merchant => self.merchant = self.merchant.route(path, handler),
        }
        self.entries.push(RouteEntry {
            path,
            methods,
            access,
        });
        self
    }

    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    /// Access level registered for `path`, if any
    pub fn access_for(&self, path: &str) -> Option<Access> {
        self.entries
            .iter()
            .find(|e| e.path == path)
            .map(|e| e.access)
    }

    /// Merge both groups, guarding the merchant group with authentication
    pub fn into_router(self, state: AppState) -> Router<AppState> {
        let merchant = self
            .merchant
            .route_layer(from_fn_with_state(state, require_merchant));
        self.public.merge(merchant)
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Every route of the API
///
/// | Method | Path | Access |
/// |--------|------|--------|
/// | GET | `/`, `/health` | public |
/// | GET | `/api/v1/test/merchant` | public |
/// | GET, POST | `/api/v1/orders` | merchant |
/// | GET | `/api/v1/orders/{order_id}` | merchant |
/// | GET | `/api/v1/orders/{order_id}/public` | public |
/// | GET, POST | `/api/v1/payments` | merchant |
/// | POST | `/api/v1/payments/public` | public |
/// | GET | `/api/v1/payments/{payment_id}` | merchant |
/// | GET | `/api/v1/payments/{payment_id}/public` | public |
pub fn route_table() -> RouteTable {
    RouteTable::new()
        // Health check
        .route("/", "GET", Access::Public, get(handlers::health))
        .route("/health", "GET", Access::Public, get(handlers::health))
        // Test tooling
        .route(
            "/api/v1/test/merchant",
            "GET",
            Access::Public,
            get(handlers::test_merchant),
        )
        // Orders
        .route(
            "/api/v1/orders",
            "GET, POST",
            Access::Merchant,
            post(handlers::create_order).get(handlers::list_orders),
        )
        .route(
            "/api/v1/orders/{order_id}",
            "GET",
            Access::Merchant,
            get(handlers::get_order),
        )
        .route(
            "/api/v1/orders/{order_id}/public",
            "GET",
            Access::Public,
            get(handlers::get_order_public),
        )
        // Payments
        .route(
            "/api/v1/payments",
            "GET, POST",
            Access::Merchant,
            post(handlers::create_payment).get(handlers::list_payments),
        )
        .route(
            "/api/v1/payments/public",
            "POST",
            Access::Public,
            post(handlers::create_payment_public),
        )
        .route(
            "/api/v1/payments/{payment_id}",
            "GET",
            Access::Merchant,
            get(handlers::get_payment),
        )
        .route(
            "/api/v1/payments/{payment_id}/public",
            "GET",
            Access::Public,
            get(handlers::get_payment),
        )
}

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    // CORS: the checkout page and dashboard are served from other origins
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    route_table()
        .into_router(state.clone())
        // Unmatched requests still get the error envelope
        .fallback(handlers::not_found)
        .method_not_allowed_fallback(handlers::method_not_allowed)
        // Middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        // State
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_is_declared_per_route() {
        let table = route_table();

        assert_eq!(table.access_for("/health"), Some(Access::Public));
        assert_eq!(table.access_for("/api/v1/orders"), Some(Access::Merchant));
        assert_eq!(
            table.access_for("/api/v1/orders/{order_id}/public"),
            Some(Access::Public)
        );
        assert_eq!(table.access_for("/api/v1/payments"), Some(Access::Merchant));
        assert_eq!(
            table.access_for("/api/v1/payments/{payment_id}"),
            Some(Access::Merchant)
        );
        assert_eq!(
            table.access_for("/api/v1/payments/{payment_id}/public"),
            Some(Access::Public)
        );
        assert_eq!(table.access_for("/api/v1/publicity"), None);
    }

    #[test]
    fn test_paths_are_unique() {
        let table = route_table();
        let mut paths: Vec<_> = table.entries().iter().map(|e| e.path).collect();
        let total = paths.len();
        paths.sort();
        paths.dedup();
        assert_eq!(paths.len(), total);
    }
}
