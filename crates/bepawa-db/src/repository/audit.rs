//! # Audit Repository
//!
//! Append-only record of who changed what. The table rejects UPDATE and
//! DELETE with triggers; this repository only ever inserts and reads.

use bepawa_core::mapping::AuditLogRow;
use bepawa_core::{AuditLog, NewAuditLog};
use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use super::new_id;
use crate::error::DbResult;

const AUDIT_COLUMNS: &str =
    "id, user_id, action, resource_type, resource_id, old_values, new_values, category, created_at";

#[derive(Debug, Clone)]
pub struct AuditRepository {
    pool: SqlitePool,
}

impl AuditRepository {
    pub fn new(pool: SqlitePool) -> Self {
        AuditRepository { pool }
    }

    pub async fn append(&self, entry: &NewAuditLog) -> DbResult<String> {
        let mut conn = self.pool.acquire().await?;
        insert_audit(&mut conn, entry).await
    }

    /// History of one resource, oldest first.
    pub async fn list_for_resource(
        &self,
        resource_type: &str,
        resource_id: &str,
    ) -> DbResult<Vec<AuditLog>> {
        let sql = format!(
            "SELECT {AUDIT_COLUMNS} FROM audit_logs \
             WHERE resource_type = ? AND resource_id = ? ORDER BY created_at, rowid"
        );
        let rows: Vec<AuditLogRow> = sqlx::query_as(&sql)
            .bind(resource_type)
            .bind(resource_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(AuditLogRow::into_audit_log).collect())
    }

    /// Most recent entries across the platform, newest first.
    pub async fn recent(&self, limit: i64) -> DbResult<Vec<AuditLog>> {
        let sql = format!(
            "SELECT {AUDIT_COLUMNS} FROM audit_logs ORDER BY created_at DESC, rowid DESC LIMIT ?"
        );
        let rows: Vec<AuditLogRow> = sqlx::query_as(&sql).bind(limit).fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(AuditLogRow::into_audit_log).collect())
    }
}

/// Appends an audit entry on an existing connection or transaction.
pub(crate) async fn insert_audit(conn: &mut SqliteConnection, entry: &NewAuditLog) -> DbResult<String> {
    let id = new_id();
    sqlx::query(
        "INSERT INTO audit_logs \
         (id, user_id, action, resource_type, resource_id, old_values, new_values, category, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(&entry.user_id)
    .bind(&entry.action)
    .bind(&entry.resource_type)
    .bind(&entry.resource_id)
    .bind(entry.old_values.as_ref().map(|v| v.to_string()))
    .bind(entry.new_values.as_ref().map(|v| v.to_string()))
    .bind(entry.category.as_str())
    .bind(Utc::now())
    .execute(&mut *conn)
    .await?;

    debug!(id = %id, action = %entry.action, resource = %entry.resource_id, "Audit entry appended");
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};
    use bepawa_core::AuditCategory;

    #[tokio::test]
    async fn test_append_and_read_back() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.audit();

        repo.append(
            &NewAuditLog::new("admin-1", "approve", "profile", "p1", AuditCategory::Approval)
                .with_values(
                    Some(serde_json::json!({ "is_approved": false })),
                    Some(serde_json::json!({ "is_approved": true })),
                ),
        )
        .await
        .unwrap();
        repo.append(&NewAuditLog::new("u1", "update", "product", "x", AuditCategory::DataChange))
            .await
            .unwrap();

        let history = repo.list_for_resource("profile", "p1").await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].category, AuditCategory::Approval);
        assert_eq!(history[0].new_values.as_ref().unwrap()["is_approved"], true);

        assert_eq!(repo.recent(10).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_entries_cannot_be_deleted() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.audit()
            .append(&NewAuditLog::new("u1", "update", "product", "x", AuditCategory::DataChange))
            .await
            .unwrap();

        let err: DbError = sqlx::query("DELETE FROM audit_logs")
            .execute(db.pool())
            .await
            .unwrap_err()
            .into();
        assert!(err.to_string().contains("append-only"));
    }
}
