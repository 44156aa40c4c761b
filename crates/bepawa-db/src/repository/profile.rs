//! # Profile Repository
//!
//! Signup and admin approval of business accounts.
//!
//! ## Approval Workflow
//! ```text
//! create(NewProfile) ──► individual/admin: is_approved = 1
//!                   └──► retail/wholesale/lab: is_approved = 0 ──► list_pending()
//!                                                                      │
//!                                 approve(admin) ◄─────────────────────┘
//!                                   ├── UPDATE is_approved = 1
//!                                   ├── notify (approval)
//!                                   └── audit  (approval)
//! ```

use bepawa_core::validation::validate_new_profile;
use bepawa_core::{
    AuditCategory, Caller, CoreError, NewAuditLog, NewNotification, NewProfile, NotificationType,
    Profile, Role,
};
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;

use super::audit::insert_audit;
use super::new_id;
use super::notification::insert_notification;
use crate::error::{DbError, DbResult};

const PROFILE_COLUMNS: &str = "id, role, full_name, email, phone, region, business_name, \
     license_number, is_approved, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct ProfileRepository {
    pool: SqlitePool,
}

impl ProfileRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProfileRepository { pool }
    }

    pub async fn get(&self, id: &str) -> DbResult<Profile> {
        let sql = format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = ?");
        sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Profile", id))
    }

    /// The role stored for `id`, if the profile exists.
    pub async fn role_of(&self, id: &str) -> DbResult<Option<Role>> {
        let role: Option<String> = sqlx::query_scalar("SELECT role FROM profiles WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(role.as_deref().and_then(Role::parse))
    }

    /// Creates a profile. `id` is the auth subject when known.
    pub async fn create(&self, id: Option<String>, new: NewProfile) -> DbResult<Profile> {
        validate_new_profile(&new).map_err(CoreError::from)?;

        let id = id.unwrap_or_else(new_id);
        let now = Utc::now();
        sqlx::query(
            "INSERT INTO profiles (id, role, full_name, email, phone, region, business_name, \
             license_number, is_approved, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(new.role.as_str())
        .bind(new.full_name.trim())
        .bind(new.email.trim().to_lowercase())
        .bind(new.phone)
        .bind(new.region)
        .bind(new.business_name)
        .bind(new.license_number)
        .bind(!new.role.requires_approval())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        info!(id = %id, role = %new.role, "Profile created");
        self.get(&id).await
    }

    /// Business accounts awaiting approval, oldest first.
    pub async fn list_pending(&self, caller: &Caller) -> DbResult<Vec<Profile>> {
        caller.require_role(&[Role::Admin], "review pending accounts")?;
        let sql = format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE is_approved = 0 ORDER BY created_at, rowid"
        );
        Ok(sqlx::query_as(&sql).fetch_all(&self.pool).await?)
    }

    /// Approves a business account. Admin only.
    pub async fn approve(&self, caller: &Caller, id: &str) -> DbResult<Profile> {
        caller.require_role(&[Role::Admin], "approve accounts")?;

        let mut tx = self.pool.begin().await?;
        let result = sqlx::query("UPDATE profiles SET is_approved = 1, updated_at = ? WHERE id = ? AND is_approved = 0")
            .bind(Utc::now())
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            let exists: Option<i64> = sqlx::query_scalar("SELECT 1 FROM profiles WHERE id = ?")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
            if exists.is_none() {
                return Err(DbError::not_found("Profile", id));
            }
            // Already approved
            tx.commit().await?;
            return self.get(id).await;
        }

        insert_notification(
            &mut tx,
            &NewNotification::new(
                id,
                NotificationType::Approval,
                "Account approved",
                "Your business account has been approved. You can now start selling.",
            ),
        )
        .await?;
        insert_audit(
            &mut tx,
            &NewAuditLog::new(&caller.id, "approve", "profile", id, AuditCategory::Approval).with_values(
                Some(serde_json::json!({ "is_approved": false })),
                Some(serde_json::json!({ "is_approved": true })),
            ),
        )
        .await?;
        tx.commit().await?;

        info!(id = %id, by = %caller.id, "Profile approved");
        self.get(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    fn signup(role: Role, email: &str) -> NewProfile {
        NewProfile {
            role,
            full_name: "Asha Mushi".to_string(),
            email: email.to_string(),
            phone: None,
            region: Some("Dar es Salaam".to_string()),
            business_name: (role != Role::Individual).then(|| "Afya Pharmacy".to_string()),
            license_number: None,
        }
    }

    #[tokio::test]
    async fn test_individuals_are_approved_at_signup() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let profile = db
            .profiles()
            .create(Some("u1".to_string()), signup(Role::Individual, "Asha@Example.com"))
            .await
            .unwrap();
        assert!(profile.is_approved);
        assert_eq!(profile.email, "asha@example.com");
        assert_eq!(db.profiles().role_of("u1").await.unwrap(), Some(Role::Individual));
        assert_eq!(db.profiles().role_of("nobody").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_approval_flow() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.profiles();
        let admin = Caller::new("admin-1", Some(Role::Admin));

        let pharmacy = repo.create(None, signup(Role::Retail, "afya@example.com")).await.unwrap();
        assert!(!pharmacy.is_approved);
        assert_eq!(repo.list_pending(&admin).await.unwrap().len(), 1);

        let retail = Caller::new(pharmacy.id.clone(), Some(Role::Retail));
        let err = repo.approve(&retail, &pharmacy.id).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::Forbidden { .. })));

        let approved = repo.approve(&admin, &pharmacy.id).await.unwrap();
        assert!(approved.is_approved);
        assert!(repo.list_pending(&admin).await.unwrap().is_empty());
        assert_eq!(db.notifications().unread_count(&pharmacy.id).await.unwrap(), 1);
        assert_eq!(db.audit().list_for_resource("profile", &pharmacy.id).await.unwrap().len(), 1);

        // Approving twice is a no-op
        repo.approve(&admin, &pharmacy.id).await.unwrap();
        assert_eq!(db.notifications().unread_count(&pharmacy.id).await.unwrap(), 1);

        assert!(matches!(repo.approve(&admin, "missing").await, Err(DbError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.profiles();
        repo.create(None, signup(Role::Individual, "a@example.com")).await.unwrap();
        let err = repo.create(None, signup(Role::Individual, "a@example.com")).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }
}
