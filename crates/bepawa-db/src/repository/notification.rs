//! # Notification Repository
//!
//! Per-user notifications. Other repositories create them inside their own
//! transactions through [`insert_notification`], so a notification exists
//! exactly when the event it describes was committed.

use bepawa_core::mapping::NotificationRow;
use bepawa_core::{NewNotification, Notification};
use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use super::new_id;
use crate::error::{DbError, DbResult};

const NOTIFICATION_COLUMNS: &str =
    "id, user_id, type, title, message, is_read, metadata, created_at";

#[derive(Debug, Clone)]
pub struct NotificationRepository {
    pool: SqlitePool,
}

impl NotificationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        NotificationRepository { pool }
    }

    pub async fn create(&self, notification: &NewNotification) -> DbResult<Notification> {
        let id = {
            let mut conn = self.pool.acquire().await?;
            insert_notification(&mut conn, notification).await?
        };
        self.get(&id).await
    }

    pub async fn get(&self, id: &str) -> DbResult<Notification> {
        let sql = format!("SELECT {NOTIFICATION_COLUMNS} FROM notifications WHERE id = ?");
        let row: Option<NotificationRow> =
            sqlx::query_as(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.map(NotificationRow::into_notification)
            .ok_or_else(|| DbError::not_found("Notification", id))
    }

    /// Newest first.
    pub async fn list_for_user(&self, user_id: &str, limit: i64) -> DbResult<Vec<Notification>> {
        let sql = format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications \
             WHERE user_id = ? ORDER BY created_at DESC, rowid DESC LIMIT ?"
        );
        let rows: Vec<NotificationRow> = sqlx::query_as(&sql)
            .bind(user_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(NotificationRow::into_notification).collect())
    }

    pub async fn unread_count(&self, user_id: &str) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM notifications WHERE user_id = ? AND is_read = 0")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    /// Marks one of the user's notifications read.
    pub async fn mark_read(&self, user_id: &str, id: &str) -> DbResult<()> {
        let result = sqlx::query("UPDATE notifications SET is_read = 1 WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Notification", id));
        }
        Ok(())
    }

    /// Marks every notification of the user read, returning how many changed.
    pub async fn mark_all_read(&self, user_id: &str) -> DbResult<u64> {
        let result = sqlx::query("UPDATE notifications SET is_read = 1 WHERE user_id = ? AND is_read = 0")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        debug!(user = %user_id, count = result.rows_affected(), "Marked notifications read");
        Ok(result.rows_affected())
    }
}

/// Inserts a notification on an existing connection or transaction.
pub(crate) async fn insert_notification(
    conn: &mut SqliteConnection,
    notification: &NewNotification,
) -> DbResult<String> {
    let id = new_id();
    let metadata = if notification.metadata.is_null() {
        None
    } else {
        Some(notification.metadata.to_string())
    };

    sqlx::query(
        "INSERT INTO notifications (id, user_id, type, title, message, is_read, metadata, created_at) \
         VALUES (?, ?, ?, ?, ?, 0, ?, ?)",
    )
    .bind(&id)
    .bind(&notification.user_id)
    .bind(notification.notification_type.as_str())
    .bind(&notification.title)
    .bind(&notification.message)
    .bind(metadata)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await?;

    debug!(id = %id, user = %notification.user_id, kind = %notification.notification_type, "Notification created");
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use bepawa_core::NotificationType;

    #[tokio::test]
    async fn test_unread_lifecycle() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.notifications();

        let first = repo
            .create(
                &NewNotification::new("u1", NotificationType::LowStock, "Low stock", "Panadol: 3 left")
                    .with_metadata(serde_json::json!({ "product_id": "p1" })),
            )
            .await
            .unwrap();
        repo.create(&NewNotification::new("u1", NotificationType::System, "Welcome", "Hi"))
            .await
            .unwrap();
        repo.create(&NewNotification::new("u2", NotificationType::System, "Welcome", "Hi"))
            .await
            .unwrap();

        assert_eq!(first.metadata["product_id"], "p1");
        assert_eq!(repo.unread_count("u1").await.unwrap(), 2);

        repo.mark_read("u1", &first.id).await.unwrap();
        assert_eq!(repo.unread_count("u1").await.unwrap(), 1);

        // Someone else's notification is not found
        assert!(repo.mark_read("u2", &first.id).await.is_err());

        assert_eq!(repo.mark_all_read("u1").await.unwrap(), 1);
        assert_eq!(repo.unread_count("u1").await.unwrap(), 0);
        assert_eq!(repo.unread_count("u2").await.unwrap(), 1);

        let listed = repo.list_for_user("u1", 50).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].title, "Welcome");
    }
}
