//! Appointments repository for database operations

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{clients, map_unique_violation, AppointmentStore};
use crate::{
    error::{AppError, AppResult},
    models::appointment::{Appointment, AppointmentDetails, AppointmentFilter, AppointmentStatus},
};

#[derive(Clone)]
pub struct AppointmentsRepository {
    pool: Pool<Postgres>,
}

impl AppointmentsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn slot_taken(date_time: DateTime<Utc>) -> AppError {
    AppError::SlotConflict {
        date_time,
        existing: None,
    }
}

#[async_trait]
impl AppointmentStore for AppointmentsRepository {
    async fn get(&self, tenant_id: Uuid, id: Uuid) -> AppResult<Appointment> {
        sqlx::query_as::<_, Appointment>("SELECT * FROM appointments WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Appointment {} not found", id)))
    }

    async fn list(&self, tenant_id: Uuid, filter: &AppointmentFilter) -> AppResult<Vec<Appointment>> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT * FROM appointments WHERE tenant_id = ");
        builder.push_bind(tenant_id);

        if let Some(start) = filter.start {
            builder.push(" AND date_time >= ").push_bind(start);
        }
        if let Some(end) = filter.end {
            builder.push(" AND date_time < ").push_bind(end);
        }
        if let Some(stylist_id) = filter.stylist_id {
            builder.push(" AND stylist_id = ").push_bind(stylist_id);
        }
        if let Some(status) = filter.status {
            builder.push(" AND status = ").push_bind(status);
        }
        builder.push(" ORDER BY date_time, created_at");

        let rows = builder
            .build_query_as::<Appointment>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn find_active_at(
        &self,
        tenant_id: Uuid,
        stylist_id: Uuid,
        at: DateTime<Utc>,
        exclude: Option<Uuid>,
    ) -> AppResult<Option<Appointment>> {
        let row = sqlx::query_as::<_, Appointment>(
            r#"
            SELECT * FROM appointments
            WHERE tenant_id = $1 AND stylist_id = $2 AND date_time = $3
              AND status IN ('scheduled', 'completed')
              AND ($4::uuid IS NULL OR id <> $4)
            LIMIT 1
            "#,
        )
        .bind(tenant_id)
        .bind(stylist_id)
        .bind(at)
        .bind(exclude)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn occupied_between(
        &self,
        tenant_id: Uuid,
        stylist_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<DateTime<Utc>>> {
        let rows = sqlx::query_scalar::<_, DateTime<Utc>>(
            r#"
            SELECT date_time FROM appointments
            WHERE tenant_id = $1 AND stylist_id = $2
              AND date_time >= $3 AND date_time < $4
              AND status IN ('scheduled', 'completed')
            ORDER BY date_time
            "#,
        )
        .bind(tenant_id)
        .bind(stylist_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn insert(&self, appointment: &Appointment) -> AppResult<Appointment> {
        // The partial unique index on (tenant_id, stylist_id, date_time) is the
        // authoritative guard against two racing bookings of one slot.
        sqlx::query_as::<_, Appointment>(
            r#"
            INSERT INTO appointments (
                id, tenant_id, client_id, stylist_id, service_id, role_id,
                status, date_time, description, sale_id, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(appointment.id)
        .bind(appointment.tenant_id)
        .bind(appointment.client_id)
        .bind(appointment.stylist_id)
        .bind(appointment.service_id)
        .bind(appointment.role_id)
        .bind(appointment.status)
        .bind(appointment.date_time)
        .bind(&appointment.description)
        .bind(appointment.sale_id)
        .bind(appointment.created_at)
        .bind(appointment.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || slot_taken(appointment.date_time)))
    }

    async fn reschedule(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        date_time: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> AppResult<Option<Appointment>> {
        sqlx::query_as::<_, Appointment>(
            r#"
            UPDATE appointments SET date_time = $3, updated_at = $4
            WHERE tenant_id = $1 AND id = $2 AND status = 'scheduled'
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(id)
        .bind(date_time)
        .bind(updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || slot_taken(date_time)))
    }

    async fn transition(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        from: AppointmentStatus,
        to: AppointmentStatus,
        sale_id: Option<Uuid>,
        updated_at: DateTime<Utc>,
    ) -> AppResult<Option<Appointment>> {
        let mut tx = self.pool.begin().await?;

        // sale_id is only ever filled in, never replaced
        let updated = sqlx::query_as::<_, Appointment>(
            r#"
            UPDATE appointments
            SET status = $4, sale_id = COALESCE(sale_id, $5), updated_at = $6
            WHERE tenant_id = $1 AND id = $2 AND status = $3
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(id)
        .bind(from)
        .bind(to)
        .bind(sale_id)
        .bind(updated_at)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| {
            map_unique_violation(e, || {
                AppError::Conflict("Sale is already linked to another appointment".to_string())
            })
        })?;
        let Some(updated) = updated else {
            return Ok(None);
        };

        if to == AppointmentStatus::Completed && from != to {
            if let Some(client_id) = updated.client_id {
                clients::record_visit(&mut tx, tenant_id, client_id, updated_at).await?;
            }
        }

        tx.commit().await?;
        Ok(Some(updated))
    }

    async fn calendar_rows(
        &self,
        tenant_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<AppointmentDetails>> {
        let rows = sqlx::query_as::<_, AppointmentDetails>(
            r#"
            SELECT a.id, c.full_name AS client_name, c.phone AS client_phone,
                   u.full_name AS stylist_name, s.name AS service_name,
                   ss.duration_minutes, a.status, a.date_time, a.description
            FROM appointments a
            LEFT JOIN clients c ON c.id = a.client_id AND c.tenant_id = a.tenant_id
            LEFT JOIN users u ON u.id = a.stylist_id AND u.tenant_id = a.tenant_id
            LEFT JOIN services s ON s.id = a.service_id AND s.tenant_id = a.tenant_id
            LEFT JOIN stylist_services ss
                   ON ss.stylist_id = a.stylist_id AND ss.service_id = a.service_id
                  AND ss.tenant_id = a.tenant_id
            WHERE a.tenant_id = $1 AND a.date_time >= $2 AND a.date_time < $3
            ORDER BY a.date_time
            "#,
        )
        .bind(tenant_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
