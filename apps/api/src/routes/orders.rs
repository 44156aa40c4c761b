use axum::extract::{Path, State};
use axum::routing::{get, patch};
use axum::{Json, Router};
use bepawa_core::{Order, OrderStatus};

use super::StatusBody;
use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_orders))
        .route("/orders/{id}", get(get_order))
        .route("/orders/{id}/status", patch(update_status))
}

/// Orders the caller placed or fulfils, newest first. Admins see all.
async fn list_orders(State(state): State<AppState>, AuthUser(caller): AuthUser) -> ApiResult<Json<Vec<Order>>> {
    Ok(Json(state.db.orders().list_visible(&caller).await?))
}

async fn get_order(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Order>> {
    Ok(Json(state.db.orders().get_visible(&caller, &id).await?))
}

async fn update_status(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
    Json(body): Json<StatusBody>,
) -> ApiResult<Json<Order>> {
    let next: OrderStatus = body.status.parse()?;
    Ok(Json(state.db.orders().update_status(&caller, &id, next).await?))
}
