//! # Appointment Repository
//!
//! Patients book lab tests or pharmacy consultations; providers confirm,
//! run and complete them, attaching results.
//!
//! ```text
//! scheduled ──► confirmed ──► in_progress ──► completed (+ results)
//!     │             │
//!     └─────────────┴──► cancelled | no_show
//! ```

use bepawa_core::mapping::AppointmentRow;
use bepawa_core::validation::validate_new_appointment;
use bepawa_core::{
    Appointment, AppointmentStatus, Caller, CoreError, Lifecycle, NewAppointment, NewNotification,
    NotificationType, Role,
};
use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::info;

use super::new_id;
use super::notification::insert_notification;
use crate::error::{DbError, DbResult};

const APPOINTMENT_COLUMNS: &str = "id, provider_id, provider_type, user_id, appointment_date, \
     appointment_time, service, status, notes, results, created_at";

#[derive(Debug, Clone)]
pub struct AppointmentRepository {
    pool: SqlitePool,
}

impl AppointmentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        AppointmentRepository { pool }
    }

    /// Books an appointment for the caller and notifies the provider.
    pub async fn book(&self, caller: &Caller, new: NewAppointment) -> DbResult<Appointment> {
        validate_new_appointment(&new).map_err(CoreError::from)?;

        let mut tx = self.pool.begin().await?;
        let provider_role: Option<String> = sqlx::query_scalar("SELECT role FROM profiles WHERE id = ?")
            .bind(&new.provider_id)
            .fetch_optional(&mut *tx)
            .await?;
        let provider_type = provider_role.as_deref().and_then(Role::parse).unwrap_or(Role::Lab);
        if !matches!(provider_type, Role::Lab | Role::Retail) {
            return Err(CoreError::forbidden(provider_type.as_str(), "accept appointments").into());
        }

        let id = new_id();
        let now = Utc::now();
        sqlx::query(
            "INSERT INTO appointments (id, provider_id, provider_type, user_id, appointment_date, \
             appointment_time, service, status, notes, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, 'scheduled', ?, ?, ?)",
        )
        .bind(&id)
        .bind(&new.provider_id)
        .bind(provider_type.as_str())
        .bind(&caller.id)
        .bind(new.appointment_date)
        .bind(&new.appointment_time)
        .bind(&new.service)
        .bind(&new.notes)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        insert_notification(
            &mut tx,
            &NewNotification::new(
                &new.provider_id,
                NotificationType::Appointment,
                "New appointment",
                format!("{} on {} at {}", new.service, new.appointment_date, new.appointment_time),
            )
            .with_metadata(serde_json::json!({ "appointment_id": id })),
        )
        .await?;

        let appointment = fetch_appointment(&mut tx, &id).await?;
        tx.commit().await?;

        info!(id = %id, provider = %new.provider_id, patient = %caller.id, "Appointment booked");
        Ok(appointment)
    }

    /// The caller's bookings, soonest first.
    pub async fn list_for_user(&self, user_id: &str) -> DbResult<Vec<Appointment>> {
        self.list_where("user_id", user_id).await
    }

    /// A provider's schedule, soonest first.
    pub async fn list_for_provider(&self, provider_id: &str) -> DbResult<Vec<Appointment>> {
        self.list_where("provider_id", provider_id).await
    }

    async fn list_where(&self, column: &'static str, id: &str) -> DbResult<Vec<Appointment>> {
        let sql = format!(
            "SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE {column} = ? \
             ORDER BY appointment_date, appointment_time"
        );
        let rows: Vec<AppointmentRow> = sqlx::query_as(&sql).bind(id).fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(AppointmentRow::into_appointment).collect())
    }

    /// Moves an appointment along its lifecycle.
    ///
    /// Providers and admins drive it; patients may only cancel.
    pub async fn update_status(
        &self,
        caller: &Caller,
        id: &str,
        next: AppointmentStatus,
    ) -> DbResult<Appointment> {
        let mut tx = self.pool.begin().await?;
        let current = fetch_appointment(&mut tx, id).await?;

        let is_provider = current.provider_id == caller.id;
        let is_patient = current.user_id == caller.id;
        if !(is_provider || is_patient || caller.is_admin()) {
            return Err(DbError::not_found("Appointment", id));
        }
        if is_patient && !is_provider && !caller.is_admin() && next != AppointmentStatus::Cancelled {
            return Err(CoreError::forbidden(caller.role_name(), "change this appointment").into());
        }
        current.status.ensure_transition(next)?;

        set_status(&mut tx, id, next).await?;

        let recipient = if is_patient { &current.provider_id } else { &current.user_id };
        insert_notification(
            &mut tx,
            &NewNotification::new(
                recipient,
                NotificationType::Appointment,
                "Appointment update",
                format!("{} on {} is now {}", current.service, current.appointment_date, next),
            )
            .with_metadata(serde_json::json!({ "appointment_id": id, "status": next.as_str() })),
        )
        .await?;

        let updated = fetch_appointment(&mut tx, id).await?;
        tx.commit().await?;
        Ok(updated)
    }

    /// Attaches results and completes the appointment. Provider only.
    pub async fn record_results(
        &self,
        caller: &Caller,
        id: &str,
        results: serde_json::Value,
    ) -> DbResult<Appointment> {
        let mut tx = self.pool.begin().await?;
        let current = fetch_appointment(&mut tx, id).await?;
        if current.provider_id != caller.id && !caller.is_admin() {
            return Err(CoreError::forbidden(caller.role_name(), "record results").into());
        }
        current.status.ensure_transition(AppointmentStatus::Completed)?;

        sqlx::query("UPDATE appointments SET results = ?, updated_at = ? WHERE id = ?")
            .bind(results.to_string())
            .bind(Utc::now())
            .bind(id)
            .execute(&mut *tx)
            .await?;
        set_status(&mut tx, id, AppointmentStatus::Completed).await?;

        insert_notification(
            &mut tx,
            &NewNotification::new(
                &current.user_id,
                NotificationType::LabResult,
                "Results ready",
                format!("Your {} results are ready", current.service),
            )
            .with_metadata(serde_json::json!({ "appointment_id": id })),
        )
        .await?;

        let updated = fetch_appointment(&mut tx, id).await?;
        tx.commit().await?;

        info!(id = %id, provider = %caller.id, "Results recorded");
        Ok(updated)
    }
}

async fn set_status(conn: &mut SqliteConnection, id: &str, status: AppointmentStatus) -> DbResult<()> {
    sqlx::query("UPDATE appointments SET status = ?, updated_at = ? WHERE id = ?")
        .bind(status.as_str())
        .bind(Utc::now())
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

async fn fetch_appointment(conn: &mut SqliteConnection, id: &str) -> DbResult<Appointment> {
    let sql = format!("SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE id = ?");
    let row: Option<AppointmentRow> = sqlx::query_as(&sql).bind(id).fetch_optional(&mut *conn).await?;
    row.map(AppointmentRow::into_appointment)
        .ok_or_else(|| DbError::not_found("Appointment", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::NaiveDate;

    fn booking(provider: &str) -> NewAppointment {
        NewAppointment {
            provider_id: provider.to_string(),
            appointment_date: NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
            appointment_time: "09:30".to_string(),
            service: "Malaria test".to_string(),
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_booking_to_results() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.appointments();
        let patient = Caller::new("u1", Some(Role::Individual));
        let lab = Caller::new("lab-1", Some(Role::Lab));

        let appt = repo.book(&patient, booking("lab-1")).await.unwrap();
        assert_eq!(appt.status, AppointmentStatus::Scheduled);
        assert_eq!(appt.provider_type, Role::Lab);
        assert_eq!(db.notifications().unread_count("lab-1").await.unwrap(), 1);

        // Patient can't confirm
        assert!(repo.update_status(&patient, &appt.id, AppointmentStatus::Confirmed).await.is_err());

        repo.update_status(&lab, &appt.id, AppointmentStatus::Confirmed).await.unwrap();
        repo.update_status(&lab, &appt.id, AppointmentStatus::InProgress).await.unwrap();
        let done = repo
            .record_results(&lab, &appt.id, serde_json::json!({ "malaria": "negative" }))
            .await
            .unwrap();

        assert_eq!(done.status, AppointmentStatus::Completed);
        assert_eq!(done.results.unwrap()["malaria"], "negative");
        assert_eq!(db.notifications().unread_count("u1").await.unwrap(), 3);

        assert_eq!(repo.list_for_user("u1").await.unwrap().len(), 1);
        assert_eq!(repo.list_for_provider("lab-1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_patient_may_cancel() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.appointments();
        let patient = Caller::new("u1", Some(Role::Individual));

        let appt = repo.book(&patient, booking("lab-1")).await.unwrap();
        let cancelled = repo.update_status(&patient, &appt.id, AppointmentStatus::Cancelled).await.unwrap();
        assert_eq!(cancelled.status, AppointmentStatus::Cancelled);

        let err = repo
            .record_results(&Caller::new("lab-1", Some(Role::Lab)), &appt.id, serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::InvalidStatusTransition { .. })));
    }
}
