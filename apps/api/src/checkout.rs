//! Checkout-session client.
//!
//! Forwards a payment request to the external checkout endpoint and returns
//! the hosted payment page URL.
//!
//! ```text
//! POST {CHECKOUT_URL}
//!   { amount, currency, productName, success_url, cancel_url }
//!      │
//!      ├── 2xx { "url": "https://..." }   ──► Ok(url)
//!      └── any { "error": "..." }         ──► ServiceUnavailable
//! ```

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::ApiError;

/// Body sent to the checkout endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRequest {
    /// Minor units.
    pub amount: i64,
    pub currency: String,
    #[serde(rename = "productName")]
    pub product_name: String,
    pub success_url: String,
    pub cancel_url: String,
}

#[derive(Debug, Deserialize)]
struct CheckoutResponse {
    url: Option<String>,
    error: Option<String>,
}

/// HTTP client for the checkout endpoint.
#[derive(Debug, Clone)]
pub struct CheckoutClient {
    http: reqwest::Client,
    url: String,
}

impl CheckoutClient {
    pub fn new(url: impl Into<String>) -> Self {
        CheckoutClient {
            http: reqwest::Client::new(),
            url: url.into(),
        }
    }

    /// Creates a checkout session and returns the payment page URL.
    pub async fn create_session(&self, request: &CheckoutRequest) -> Result<String, ApiError> {
        let response = self
            .http
            .post(&self.url)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Checkout endpoint unreachable");
                ApiError::service_unavailable("Checkout is temporarily unavailable")
            })?;

        let status = response.status();
        let body: CheckoutResponse = response.json().await.map_err(|e| {
            warn!(error = %e, %status, "Checkout endpoint returned an unreadable body");
            ApiError::service_unavailable("Checkout is temporarily unavailable")
        })?;

        match (status.is_success(), body.url, body.error) {
            (true, Some(url), _) => {
                info!(amount = request.amount, currency = %request.currency, "Checkout session created");
                Ok(url)
            }
            (_, _, Some(error)) => {
                warn!(%status, error = %error, "Checkout endpoint refused the session");
                Err(ApiError::service_unavailable(error))
            }
            _ => {
                warn!(%status, "Checkout endpoint returned neither url nor error");
                Err(ApiError::service_unavailable("Checkout is temporarily unavailable"))
            }
        }
    }
}
