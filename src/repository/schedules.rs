//! Schedule windows repository (recurring weekly working hours)

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use super::{map_unique_violation, ScheduleWindowAdmin, ScheduleWindowStore};
use crate::{
    error::{AppError, AppResult},
    models::schedule::{NewScheduleWindow, ScheduleWindow, Weekday},
};

#[derive(Clone)]
pub struct SchedulesRepository {
    pool: Pool<Postgres>,
}

impl SchedulesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ScheduleWindowStore for SchedulesRepository {
    async fn windows_for(
        &self,
        tenant_id: Uuid,
        employee_id: Uuid,
        weekday: Weekday,
    ) -> AppResult<Vec<ScheduleWindow>> {
        let rows = sqlx::query_as::<_, ScheduleWindow>(
            r#"
            SELECT * FROM schedule_windows
            WHERE tenant_id = $1 AND employee_id = $2 AND day_of_week = $3
            ORDER BY start_time
            "#,
        )
        .bind(tenant_id)
        .bind(employee_id)
        .bind(weekday)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

#[async_trait]
impl ScheduleWindowAdmin for SchedulesRepository {
    async fn list_for_employee(&self, tenant_id: Uuid, employee_id: Uuid) -> AppResult<Vec<ScheduleWindow>> {
        let rows = sqlx::query_as::<_, ScheduleWindow>(
            r#"
            SELECT * FROM schedule_windows
            WHERE tenant_id = $1 AND employee_id = $2
            ORDER BY CASE day_of_week
                WHEN 'monday' THEN 0 WHEN 'tuesday' THEN 1 WHEN 'wednesday' THEN 2
                WHEN 'thursday' THEN 3 WHEN 'friday' THEN 4 WHEN 'saturday' THEN 5
                ELSE 6 END,
                start_time
            "#,
        )
        .bind(tenant_id)
        .bind(employee_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn create_window(
        &self,
        tenant_id: Uuid,
        window: &NewScheduleWindow,
        created_at: DateTime<Utc>,
    ) -> AppResult<ScheduleWindow> {
        sqlx::query_as::<_, ScheduleWindow>(
            r#"
            INSERT INTO schedule_windows (id, tenant_id, employee_id, day_of_week, start_time, end_time, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(tenant_id)
        .bind(window.employee_id)
        .bind(window.day_of_week)
        .bind(window.start_time)
        .bind(window.end_time)
        .bind(created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            map_unique_violation(e, || {
                AppError::Conflict(format!(
                    "Employee already has a window starting at {} on {}",
                    window.start_time.format("%H:%M"),
                    window.day_of_week
                ))
            })
        })
    }

    async fn delete_window(&self, tenant_id: Uuid, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM schedule_windows WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id)
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Schedule window {} not found", id)));
        }
        Ok(())
    }
}
