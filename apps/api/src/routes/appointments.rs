use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use bepawa_core::{Appointment, AppointmentStatus, NewAppointment};
use serde::Deserialize;

use super::StatusBody;
use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/appointments", get(list).post(book))
        .route("/appointments/{id}/status", patch(update_status))
        .route("/appointments/{id}/results", post(record_results))
}

async fn book(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Json(new): Json<NewAppointment>,
) -> ApiResult<(StatusCode, Json<Appointment>)> {
    let appointment = state.db.appointments().book(&caller, new).await?;
    Ok((StatusCode::CREATED, Json(appointment)))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Side {
    #[default]
    Patient,
    Provider,
}

#[derive(Debug, Default, Deserialize)]
struct ListQuery {
    #[serde(default, rename = "as")]
    side: Side,
}

/// `?as=provider` lists the caller's schedule instead of their bookings.
async fn list(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<Appointment>>> {
    let repo = state.db.appointments();
    let appointments = match query.side {
        Side::Patient => repo.list_for_user(&caller.id).await?,
        Side::Provider => repo.list_for_provider(&caller.id).await?,
    };
    Ok(Json(appointments))
}

async fn update_status(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
    Json(body): Json<StatusBody>,
) -> ApiResult<Json<Appointment>> {
    let next: AppointmentStatus = body.status.parse()?;
    Ok(Json(state.db.appointments().update_status(&caller, &id, next).await?))
}

async fn record_results(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
    Json(results): Json<serde_json::Value>,
) -> ApiResult<Json<Appointment>> {
    Ok(Json(state.db.appointments().record_results(&caller, &id, results).await?))
}
