//! # Procurement Routes
//!
//! Suppliers and purchase orders for pharmacies and wholesalers.
//!
//! ## Purchase Order Lifecycle
//! ```text
//! draft ──► sent ──► received   (stock += quantity per line)
//!   │         │
//!   └────┬────┘
//!        ▼
//!    cancelled
//! ```

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, patch};
use axum::{Json, Router};
use bepawa_core::{
    NewPurchaseOrder, NewSupplier, PurchaseOrder, PurchaseOrderItem, PurchaseOrderStatus, Supplier,
};
use serde::Serialize;

use super::StatusBody;
use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/suppliers", get(list_suppliers).post(create_supplier))
        .route(
            "/purchase-orders",
            get(list_purchase_orders).post(create_purchase_order),
        )
        .route("/purchase-orders/{id}", get(get_purchase_order))
        .route("/purchase-orders/{id}/status", patch(update_status))
}

async fn list_suppliers(State(state): State<AppState>, AuthUser(caller): AuthUser) -> ApiResult<Json<Vec<Supplier>>> {
    Ok(Json(state.db.procurement().list_suppliers(&caller.id).await?))
}

async fn create_supplier(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Json(new): Json<NewSupplier>,
) -> ApiResult<(StatusCode, Json<Supplier>)> {
    let supplier = state.db.procurement().create_supplier(&caller, new).await?;
    Ok((StatusCode::CREATED, Json(supplier)))
}

async fn list_purchase_orders(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
) -> ApiResult<Json<Vec<PurchaseOrder>>> {
    Ok(Json(state.db.procurement().list_purchase_orders(&caller.id).await?))
}

async fn create_purchase_order(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Json(new): Json<NewPurchaseOrder>,
) -> ApiResult<(StatusCode, Json<PurchaseOrder>)> {
    let po = state.db.procurement().create_purchase_order(&caller, new).await?;
    Ok((StatusCode::CREATED, Json(po)))
}

#[derive(Debug, Serialize)]
struct PurchaseOrderDetail {
    #[serde(flatten)]
    order: PurchaseOrder,
    items: Vec<PurchaseOrderItem>,
}

async fn get_purchase_order(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<PurchaseOrderDetail>> {
    let repo = state.db.procurement();
    let order = repo.get_purchase_order(&caller, &id).await?;
    let items = repo.items(&order.id).await?;
    Ok(Json(PurchaseOrderDetail { order, items }))
}

async fn update_status(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
    Json(body): Json<StatusBody>,
) -> ApiResult<Json<PurchaseOrder>> {
    let next: PurchaseOrderStatus = body.status.parse()?;
    Ok(Json(state.db.procurement().update_status(&caller, &id, next).await?))
}
