use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use bepawa_core::{AuditLog, Role};

use super::LimitQuery;
use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/audit-logs", get(recent))
        .route("/audit-logs/{resource_type}/{resource_id}", get(for_resource))
}

async fn recent(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Query(limit): Query<LimitQuery>,
) -> ApiResult<Json<Vec<AuditLog>>> {
    caller.require_role(&[Role::Admin], "read audit logs")?;
    Ok(Json(state.db.audit().recent(limit.value()).await?))
}

async fn for_resource(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path((resource_type, resource_id)): Path<(String, String)>,
) -> ApiResult<Json<Vec<AuditLog>>> {
    caller.require_role(&[Role::Admin], "read audit logs")?;
    let entries = state
        .db
        .audit()
        .list_for_resource(&resource_type, &resource_id)
        .await?;
    Ok(Json(entries))
}

#[cfg(test)]
mod tests {
    use crate::test_support::TestApp;
    use axum::http::StatusCode;
    use bepawa_core::{AuditCategory, NewAuditLog, Role};

    #[tokio::test]
    async fn test_admin_only() {
        let app = TestApp::new().await;
        let repo = app.state.db.audit();
        repo.append(&NewAuditLog::new("p1", "create", "product", "prod-1", AuditCategory::DataChange))
            .await
            .unwrap();
        repo.append(&NewAuditLog::new("p1", "update", "product", "prod-1", AuditCategory::DataChange))
            .await
            .unwrap();
        repo.append(&NewAuditLog::new("u1", "checkout", "order", "o-1", AuditCategory::Financial))
            .await
            .unwrap();

        let pharmacy = app.token("p1", Role::Retail);
        let (status, _) = app.get("/audit-logs", &pharmacy).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let admin = app.token("admin", Role::Admin);
        let (status, body) = app.get("/audit-logs?limit=2", &admin).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 2);

        let (_, body) = app.get("/audit-logs/product/prod-1", &admin).await;
        let actions: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["action"].as_str().unwrap())
            .collect();
        assert_eq!(actions, vec!["create", "update"]);
        assert_eq!(body[0]["category"], "data_change");
    }
}
