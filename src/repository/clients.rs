//! Client directory (client management collaborator)

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, Pool, Postgres};
use uuid::Uuid;

use super::ClientDirectory;
use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct ClientsRepository {
    pool: Pool<Postgres>,
}

impl ClientsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClientDirectory for ClientsRepository {
    async fn exists(&self, tenant_id: Uuid, client_id: Uuid) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM clients WHERE tenant_id = $1 AND id = $2)",
        )
        .bind(tenant_id)
        .bind(client_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }
}

/// Stamp the client's last visit inside the caller's transaction
pub(crate) async fn record_visit(
    conn: &mut PgConnection,
    tenant_id: Uuid,
    client_id: Uuid,
    at: DateTime<Utc>,
) -> AppResult<()> {
    let result = sqlx::query("UPDATE clients SET last_visit = $3 WHERE tenant_id = $1 AND id = $2")
        .bind(tenant_id)
        .bind(client_id)
        .bind(at)
        .execute(conn)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Client {} not found", client_id)));
    }
    Ok(())
}
