//! # Product Routes
//!
//! ## Catalog Listing
//! ```text
//! GET /products?search=pan&category=Pain%20Relief&stock=in-stock&sort=price-desc
//!      │
//!      ▼
//! ProductRepository::list_visible(caller, policy)   role-scoped SQL
//!      │
//!      ▼
//! ProductFilters::from(query).apply(..)             in-memory filter + sort
//!      │
//!      ▼
//! { "products": [...], "error": null }
//! ```
//!
//! A store failure still answers 200 with an empty list and an `error`
//! string for the frontend to toast; a missing table answers 503.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use bepawa_core::filter::{ProductFilters, RawProductFilters};
use bepawa_core::{NewProduct, ProductUpdate};
use bepawa_db::ProductList;
use serde::Deserialize;
use tracing::debug;

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route("/products/low-stock", get(low_stock))
        .route(
            "/products/{id}",
            get(get_product).patch(update_product).delete(delete_product),
        )
        .route("/products/{id}/stock", post(adjust_stock))
}

async fn list_products(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Query(raw): Query<RawProductFilters>,
) -> ApiResult<Json<ProductList>> {
    let mut listing = state.db.products().list_visible(&caller, state.visibility).await?;
    let filters = ProductFilters::from(raw);
    listing.products = filters.apply(&listing.products);

    debug!(caller = %caller.id, count = listing.products.len(), "Products listed");
    Ok(Json(listing))
}

async fn get_product(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let product = state.db.products().get_visible(&caller, &id, state.visibility).await?;
    Ok(Json(product))
}

async fn create_product(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Json(new): Json<NewProduct>,
) -> ApiResult<impl IntoResponse> {
    let product = state.db.products().create(&caller, new).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

async fn update_product(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
    Json(update): Json<ProductUpdate>,
) -> ApiResult<impl IntoResponse> {
    let product = state.db.products().update(&caller, &id, update).await?;
    Ok(Json(product))
}

async fn delete_product(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.db.products().delete(&caller, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
struct StockAdjustment {
    delta: i64,
}

async fn adjust_stock(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
    Json(body): Json<StockAdjustment>,
) -> ApiResult<impl IntoResponse> {
    let product = state.db.products().adjust_stock(&caller, &id, body.delta).await?;
    Ok(Json(product))
}

/// The caller's own listings at or below their reorder level.
async fn low_stock(State(state): State<AppState>, AuthUser(caller): AuthUser) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.db.products().low_stock(&caller.id).await?))
}
