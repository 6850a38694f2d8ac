//! Staff and service eligibility records read by the booking core

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// A bookable stylist account and its (optional) employee profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct StylistProfile {
    pub stylist_id: Uuid,
    /// Missing until the account is linked to an employee profile
    pub employee_id: Option<Uuid>,
    pub display_name: String,
}

/// A service a stylist is authorized to perform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct StylistService {
    pub stylist_id: Uuid,
    pub service_id: Uuid,
    pub service_name: String,
    /// Duration of the service when performed by this stylist
    pub duration_minutes: i32,
}
