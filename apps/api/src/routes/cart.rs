//! # Cart Routes
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐     ┌──────────┐       │
//! │  │  Empty   │────►│ In Cart  │────►│ Checkout │────►│ Pending  │       │
//! │  │  Cart    │     │          │     │ Session  │     │  Order   │       │
//! │  └──────────┘     └──────────┘     └──────────┘     └──────────┘       │
//! │                        │           (optional,            ▲              │
//! │                POST /cart/items     payment page)        │              │
//! │               PATCH /cart/items/{id}             POST /cart/checkout    │
//! │              DELETE /cart/items/{id}                                    │
//! │                        │                                                │
//! │                        ▼                                                │
//! │                  DELETE /cart ──────────► (back to empty)               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, patch, post};
use axum::{Json, Router};
use bepawa_core::cart::CartTotals;
use bepawa_core::{Cart, CoreError, Order, DEFAULT_CURRENCY};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::auth::AuthUser;
use crate::checkout::CheckoutRequest;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/cart", get(get_cart).delete(clear_cart))
        .route("/cart/items", post(add_item))
        .route(
            "/cart/items/{product_id}",
            patch(update_item).delete(remove_item),
        )
        .route("/cart/checkout", post(checkout))
        .route("/checkout-session", post(checkout_session))
}

/// Cart response including the order row and calculated totals.
#[derive(Debug, Clone, Serialize)]
pub struct CartResponse {
    pub cart: Order,
    pub totals: CartTotals,
}

impl From<Order> for CartResponse {
    fn from(order: Order) -> Self {
        let totals = CartTotals::from(&Cart::from_items(order.items.clone()));
        CartResponse { cart: order, totals }
    }
}

async fn get_cart(State(state): State<AppState>, AuthUser(caller): AuthUser) -> ApiResult<Json<CartResponse>> {
    let order = state.db.orders().get_cart(&caller.id).await?;
    Ok(Json(order.into()))
}

#[derive(Debug, Deserialize)]
struct AddItem {
    product_id: String,
    #[serde(default = "one")]
    quantity: i64,
}

fn one() -> i64 {
    1
}

async fn add_item(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Json(body): Json<AddItem>,
) -> ApiResult<Json<CartResponse>> {
    debug!(user = %caller.id, product = %body.product_id, quantity = body.quantity, "add_to_cart");
    let order = state
        .db
        .orders()
        .add_to_cart(&caller, &body.product_id, body.quantity, state.visibility)
        .await?;
    Ok(Json(order.into()))
}

#[derive(Debug, Deserialize)]
struct UpdateItem {
    quantity: i64,
}

async fn update_item(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(product_id): Path<String>,
    Json(body): Json<UpdateItem>,
) -> ApiResult<Json<CartResponse>> {
    let order = state
        .db
        .orders()
        .update_cart_item(&caller.id, &product_id, body.quantity)
        .await?;
    Ok(Json(order.into()))
}

async fn remove_item(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(product_id): Path<String>,
) -> ApiResult<Json<CartResponse>> {
    let order = state.db.orders().remove_cart_item(&caller.id, &product_id).await?;
    Ok(Json(order.into()))
}

async fn clear_cart(State(state): State<AppState>, AuthUser(caller): AuthUser) -> ApiResult<Json<CartResponse>> {
    let order = state.db.orders().clear_cart(&caller.id).await?;
    Ok(Json(order.into()))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CheckoutBody {
    delivery_address: Option<String>,
}

async fn checkout(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Json(body): Json<CheckoutBody>,
) -> ApiResult<(StatusCode, Json<Order>)> {
    let order = state.db.orders().checkout(&caller, body.delivery_address).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

#[derive(Debug, Deserialize)]
struct SessionBody {
    success_url: String,
    cancel_url: String,
    #[serde(default)]
    product_name: Option<String>,
}

#[derive(Debug, Serialize)]
struct SessionResponse {
    url: String,
}

/// Opens a hosted payment page for the caller's current cart total.
async fn checkout_session(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Json(body): Json<SessionBody>,
) -> ApiResult<Json<SessionResponse>> {
    let client = state
        .checkout
        .as_ref()
        .ok_or_else(|| ApiError::service_unavailable("Checkout is not configured"))?;

    let cart = Cart::from_items(state.db.orders().get_cart(&caller.id).await?.items);
    if cart.is_empty() {
        return Err(CoreError::EmptyCart.into());
    }

    let request = CheckoutRequest {
        amount: cart.total_amount().minor(),
        currency: DEFAULT_CURRENCY.to_string(),
        product_name: body
            .product_name
            .unwrap_or_else(|| format!("BEPAWA order ({} items)", cart.total_quantity())),
        success_url: body.success_url,
        cancel_url: body.cancel_url,
    };
    let url = client.create_session(&request).await?;
    Ok(Json(SessionResponse { url }))
}

#[cfg(test)]
mod tests {
    use crate::test_support::TestApp;
    use axum::http::StatusCode;
    use bepawa_core::Role;
    use serde_json::json;

    async fn with_product() -> (TestApp, String) {
        let app = TestApp::new().await;
        let pharmacy = app.token("p1", Role::Retail);
        let (_, product) = app
            .post(
                "/products",
                &pharmacy,
                json!({
                    "name": "Panadol",
                    "price": 1000,
                    "stock": 5,
                    "is_public_product": true,
                    "is_retail_product": true
                }),
            )
            .await;
        (app, product["id"].as_str().unwrap().to_string())
    }

    #[tokio::test]
    async fn test_cart_flow_to_pending_order() {
        let (app, product_id) = with_product().await;
        let buyer = app.token("u1", Role::Individual);

        let (status, body) = app
            .post("/cart/items", &buyer, json!({ "product_id": product_id, "quantity": 2 }))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["totals"]["total_amount"], 2000);

        let (_, body) = app
            .patch(&format!("/cart/items/{product_id}"), &buyer, json!({ "quantity": 3 }))
            .await;
        assert_eq!(body["cart"]["total_amount"], 3000);
        assert_eq!(body["totals"]["total_quantity"], 3);

        let (status, body) = app
            .patch(&format!("/cart/items/{product_id}"), &buyer, json!({ "quantity": 9 }))
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "INSUFFICIENT_STOCK");

        let (status, order) = app
            .post("/cart/checkout", &buyer, json!({ "delivery_address": "Mwenge" }))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(order["status"], "pending");
        assert_eq!(order["pharmacy_id"], "p1");

        let (_, body) = app.get("/cart", &buyer).await;
        assert!(body["cart"]["items"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_second_seller_is_business_error() {
        let (app, product_id) = with_product().await;
        let other = app.token("p2", Role::Retail);
        let (_, foreign) = app
            .post(
                "/products",
                &other,
                json!({ "name": "Zinc", "price": 300, "stock": 5, "is_public_product": true, "is_retail_product": true }),
            )
            .await;
        let buyer = app.token("u1", Role::Individual);

        app.post("/cart/items", &buyer, json!({ "product_id": product_id, "quantity": 1 }))
            .await;
        let (status, body) = app
            .post("/cart/items", &buyer, json!({ "product_id": foreign["id"], "quantity": 1 }))
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["code"], "BUSINESS_LOGIC");

        let (_, body) = app.get("/cart", &buyer).await;
        assert_eq!(body["cart"]["items"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_checkout_is_business_error() {
        let app = TestApp::new().await;
        let buyer = app.token("u1", Role::Individual);
        let (status, body) = app.post("/cart/checkout", &buyer, json!({})).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["code"], "BUSINESS_LOGIC");
    }

    #[tokio::test]
    async fn test_checkout_session_unconfigured() {
        let (app, product_id) = with_product().await;
        let buyer = app.token("u1", Role::Individual);
        app.post("/cart/items", &buyer, json!({ "product_id": product_id })).await;

        let (status, body) = app
            .post(
                "/checkout-session",
                &buyer,
                json!({ "success_url": "https://a.test/ok", "cancel_url": "https://a.test/no" }),
            )
            .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["code"], "SERVICE_UNAVAILABLE");
    }
}
