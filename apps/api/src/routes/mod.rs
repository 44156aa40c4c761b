//! # HTTP Routes
//!
//! One module per resource. Each exposes `routes()` returning a
//! `Router<AppState>` that [`crate::router`] merges.
//!
//! Handlers stay thin: extract the [`AuthUser`](crate::auth::AuthUser),
//! call one repository method, wrap the result in `Json`.

pub mod appointments;
pub mod audit;
pub mod cart;
pub mod dashboard;
pub mod health;
pub mod notifications;
pub mod orders;
pub mod procurement;
pub mod products;
pub mod profiles;
pub mod sales;

use serde::Deserialize;

/// `?limit=` query parameter shared by list endpoints.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LimitQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    50
}

impl LimitQuery {
    /// Clamped to 1..=500.
    pub fn value(&self) -> i64 {
        self.limit.clamp(1, 500)
    }
}

/// `{ "status": "..." }` body for status-change endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusBody {
    pub status: String,
}
