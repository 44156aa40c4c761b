//! # BEPAWA API
//!
//! JSON HTTP API for the BEPAWA pharmacy marketplace.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           API Server                                    │
//! │                                                                         │
//! │  React app ───► axum (8080) ───► AuthUser ───► routes::* ───► bepawa-db │
//! │                     │                               │                   │
//! │                TraceLayer                      CheckoutClient           │
//! │                                                 (optional)              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Route Map
//! | Prefix | Module |
//! |---|---|
//! | `/health` | [`routes::health`] |
//! | `/products` | [`routes::products`] |
//! | `/cart`, `/checkout-session` | [`routes::cart`] |
//! | `/orders` | [`routes::orders`] |
//! | `/notifications` | [`routes::notifications`] |
//! | `/profiles` | [`routes::profiles`] |
//! | `/suppliers`, `/purchase-orders` | [`routes::procurement`] |
//! | `/appointments` | [`routes::appointments`] |
//! | `/audit-logs` | [`routes::audit`] |
//! | `/sales` | [`routes::sales`] |
//! | `/dashboard` | [`routes::dashboard`] |

pub mod auth;
pub mod checkout;
pub mod config;
pub mod error;
pub mod routes;

#[cfg(test)]
pub(crate) mod test_support;

use std::sync::Arc;

use axum::Router;
use bepawa_core::visibility::ProductVisibility;
use bepawa_db::Database;
use tower_http::trace::TraceLayer;

use crate::auth::JwtManager;
use crate::checkout::CheckoutClient;
use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub jwt: Arc<JwtManager>,
    /// Rule deciding what retail callers see in the catalog.
    pub visibility: ProductVisibility,
    /// `None` when `CHECKOUT_URL` is unset.
    pub checkout: Option<CheckoutClient>,
}

impl AppState {
    pub fn new(db: Database, config: &ApiConfig) -> Self {
        AppState {
            db,
            jwt: Arc::new(JwtManager::new(
                config.jwt_secret.clone(),
                config.jwt_access_lifetime_secs,
            )),
            visibility: config.product_visibility,
            checkout: config.checkout_url.as_deref().map(CheckoutClient::new),
        }
    }
}

/// Builds the full router with request tracing.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(routes::health::routes())
        .merge(routes::products::routes())
        .merge(routes::cart::routes())
        .merge(routes::orders::routes())
        .merge(routes::notifications::routes())
        .merge(routes::profiles::routes())
        .merge(routes::procurement::routes())
        .merge(routes::appointments::routes())
        .merge(routes::audit::routes())
        .merge(routes::sales::routes())
        .merge(routes::dashboard::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
