use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use bepawa_core::Notification;
use serde_json::{json, Value};

use super::LimitQuery;
use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/notifications", get(list))
        .route("/notifications/unread-count", get(unread_count))
        .route("/notifications/read-all", post(mark_all_read))
        .route("/notifications/{id}/read", post(mark_read))
}

async fn list(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Query(limit): Query<LimitQuery>,
) -> ApiResult<Json<Vec<Notification>>> {
    let notifications = state
        .db
        .notifications()
        .list_for_user(&caller.id, limit.value())
        .await?;
    Ok(Json(notifications))
}

async fn unread_count(State(state): State<AppState>, AuthUser(caller): AuthUser) -> ApiResult<Json<Value>> {
    let count = state.db.notifications().unread_count(&caller.id).await?;
    Ok(Json(json!({ "count": count })))
}

async fn mark_read(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.db.notifications().mark_read(&caller.id, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn mark_all_read(State(state): State<AppState>, AuthUser(caller): AuthUser) -> ApiResult<Json<Value>> {
    let updated = state.db.notifications().mark_all_read(&caller.id).await?;
    Ok(Json(json!({ "updated": updated })))
}

#[cfg(test)]
mod tests {
    use crate::test_support::TestApp;
    use axum::http::{Method, StatusCode};
    use bepawa_core::{NewNotification, NotificationType, Role};

    #[tokio::test]
    async fn test_read_flow() {
        let app = TestApp::new().await;
        let repo = app.state.db.notifications();
        for title in ["One", "Two", "Three"] {
            repo.create(&NewNotification::new("u1", NotificationType::System, title, "hello"))
                .await
                .unwrap();
        }
        repo.create(&NewNotification::new("u2", NotificationType::System, "Other", "hi"))
            .await
            .unwrap();

        let token = app.token("u1", Role::Individual);
        let (status, body) = app.get("/notifications?limit=2", &token).await;
        assert_eq!(status, StatusCode::OK);
        let list = body.as_array().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0]["type"], "system");

        let first = list[0]["id"].as_str().unwrap().to_string();
        let (status, _) = app
            .send(Method::POST, &format!("/notifications/{first}/read"), Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (_, body) = app.get("/notifications/unread-count", &token).await;
        assert_eq!(body["count"], 2);

        let (_, body) = app
            .send(Method::POST, "/notifications/read-all", Some(&token), None)
            .await;
        assert_eq!(body["updated"], 2);

        let other = app.token("u2", Role::Individual);
        let (status, _) = app
            .send(Method::POST, &format!("/notifications/{first}/read"), Some(&other), None)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
