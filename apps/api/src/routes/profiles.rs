//! # Profile Routes
//!
//! ## Signup and Approval
//! ```text
//! POST /profiles ──► individual ──────────────────────────► approved
//!                └─► retail / wholesale / lab ──► pending ──► POST /profiles/{id}/approve
//!                                                   │              (admin)
//!                                                   ▼
//!                                        GET /profiles/pending (admin)
//! ```
//!
//! The profile id is the token subject, so each identity has one profile.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use bepawa_core::{CoreError, NewProfile, Profile, Role};

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/profiles", post(create_profile))
        .route("/profiles/me", get(me))
        .route("/profiles/pending", get(pending))
        .route("/profiles/{id}/approve", post(approve))
}

async fn create_profile(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Json(new): Json<NewProfile>,
) -> ApiResult<(StatusCode, Json<Profile>)> {
    if new.role == Role::Admin && !caller.is_admin() {
        return Err(CoreError::forbidden(caller.role_name(), "create admin accounts").into());
    }
    let profile = state.db.profiles().create(Some(caller.id), new).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

async fn me(State(state): State<AppState>, AuthUser(caller): AuthUser) -> ApiResult<Json<Profile>> {
    Ok(Json(state.db.profiles().get(&caller.id).await?))
}

async fn pending(State(state): State<AppState>, AuthUser(caller): AuthUser) -> ApiResult<Json<Vec<Profile>>> {
    Ok(Json(state.db.profiles().list_pending(&caller).await?))
}

async fn approve(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Profile>> {
    Ok(Json(state.db.profiles().approve(&caller, &id).await?))
}
