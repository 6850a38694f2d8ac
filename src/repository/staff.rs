//! Stylist profiles and service eligibility (read-only views of employee management)

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use super::{ServiceEligibilityIndex, StaffDirectory};
use crate::{
    error::{AppError, AppResult},
    models::staff::{StylistProfile, StylistService},
};

#[derive(Clone)]
pub struct StaffRepository {
    pool: Pool<Postgres>,
}

impl StaffRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StaffDirectory for StaffRepository {
    async fn stylist_profile(&self, tenant_id: Uuid, stylist_id: Uuid) -> AppResult<StylistProfile> {
        sqlx::query_as::<_, StylistProfile>(
            r#"
            SELECT u.id AS stylist_id, e.id AS employee_id, u.full_name AS display_name
            FROM users u
            LEFT JOIN employees e ON e.user_id = u.id AND e.tenant_id = u.tenant_id
            WHERE u.tenant_id = $1 AND u.id = $2
            "#,
        )
        .bind(tenant_id)
        .bind(stylist_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Stylist {} not found", stylist_id)))
    }
}

#[async_trait]
impl ServiceEligibilityIndex for StaffRepository {
    async fn is_eligible(&self, tenant_id: Uuid, stylist_id: Uuid, service_id: Uuid) -> AppResult<bool> {
        let eligible: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM stylist_services
                WHERE tenant_id = $1 AND stylist_id = $2 AND service_id = $3
            )
            "#,
        )
        .bind(tenant_id)
        .bind(stylist_id)
        .bind(service_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(eligible)
    }

    async fn services_for(&self, tenant_id: Uuid, stylist_id: Uuid) -> AppResult<Vec<StylistService>> {
        let rows = sqlx::query_as::<_, StylistService>(
            r#"
            SELECT ss.stylist_id, ss.service_id, s.name AS service_name, ss.duration_minutes
            FROM stylist_services ss
            JOIN services s ON s.id = ss.service_id AND s.tenant_id = ss.tenant_id
            WHERE ss.tenant_id = $1 AND ss.stylist_id = $2
            ORDER BY s.name
            "#,
        )
        .bind(tenant_id)
        .bind(stylist_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
