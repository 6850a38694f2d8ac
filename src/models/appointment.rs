//! Appointment model and related types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};

/// Appointment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Scheduled,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "scheduled",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
        }
    }

    /// Whether an appointment in this status occupies its slot
    pub fn occupies_slot(&self) -> bool {
        !matches!(self, AppointmentStatus::Cancelled)
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, AppointmentStatus::Scheduled)
    }
}

impl std::fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "scheduled" => Ok(AppointmentStatus::Scheduled),
            "completed" => Ok(AppointmentStatus::Completed),
            "cancelled" => Ok(AppointmentStatus::Cancelled),
            _ => Err(format!("Invalid appointment status: {}", s)),
        }
    }
}

// SQLx conversion for AppointmentStatus
impl sqlx::Type<Postgres> for AppointmentStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for AppointmentStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for AppointmentStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        let s: String = self.as_str().to_string();
        <String as Encode<Postgres>>::encode(s, buf)
    }
}

/// Appointment record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Appointment {
    pub id: Uuid,
    #[serde(skip_serializing)]
    pub tenant_id: Uuid,
    pub client_id: Option<Uuid>,
    pub stylist_id: Uuid,
    pub service_id: Option<Uuid>,
    pub role_id: Option<Uuid>,
    pub status: AppointmentStatus,
    /// Scheduled start
    pub date_time: DateTime<Utc>,
    pub description: String,
    /// Sale that closed this appointment (set once, on completion)
    pub sale_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create appointment request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateAppointment {
    pub client_id: Uuid,
    pub stylist_id: Uuid,
    pub service_id: Option<Uuid>,
    pub role_id: Option<Uuid>,
    /// Requested start (RFC 3339, e.g. 2030-01-08T10:00:00Z)
    pub date_time: String,
    #[serde(default)]
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: String,
}

/// Reschedule request
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RescheduleAppointment {
    /// New start (RFC 3339)
    pub date_time: String,
}

/// Completion request, sent by the point-of-sale when closing a sale
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CompleteAppointment {
    pub sale_id: Option<Uuid>,
}

/// Query parameters for appointment listing
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct AppointmentQuery {
    /// Lower bound, inclusive (RFC 3339)
    pub start: Option<String>,
    /// Upper bound, exclusive (RFC 3339)
    pub end: Option<String>,
    pub stylist_id: Option<Uuid>,
    pub status: Option<AppointmentStatus>,
}

/// Parsed listing filter
#[derive(Debug, Clone, Default)]
pub struct AppointmentFilter {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub stylist_id: Option<Uuid>,
    pub status: Option<AppointmentStatus>,
}

impl AppointmentFilter {
    pub fn matches(&self, appointment: &Appointment) -> bool {
        self.start.map_or(true, |s| appointment.date_time >= s)
            && self.end.map_or(true, |e| appointment.date_time < e)
            && self.stylist_id.map_or(true, |id| appointment.stylist_id == id)
            && self.status.map_or(true, |st| appointment.status == st)
    }
}

impl TryFrom<&AppointmentQuery> for AppointmentFilter {
    type Error = AppError;

    fn try_from(query: &AppointmentQuery) -> AppResult<Self> {
        Ok(Self {
            start: query.start.as_deref().map(parse_timestamp).transpose()?,
            end: query.end.as_deref().map(parse_timestamp).transpose()?,
            stylist_id: query.stylist_id,
            status: query.status,
        })
    }
}

/// Appointment joined with the names needed to render a calendar entry
#[derive(Debug, Clone, FromRow)]
pub struct AppointmentDetails {
    pub id: Uuid,
    pub client_name: Option<String>,
    pub client_phone: Option<String>,
    pub stylist_name: Option<String>,
    pub service_name: Option<String>,
    /// Duration of the booked service for this stylist, when known
    pub duration_minutes: Option<i32>,
    pub status: AppointmentStatus,
    pub date_time: DateTime<Utc>,
    pub description: String,
}

/// Parse an RFC 3339 timestamp from a request
pub fn parse_timestamp(value: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| AppError::InvalidRequest(format!("Invalid timestamp '{}' (use RFC 3339)", value)))
}

/// Parse a calendar date (YYYY-MM-DD) from a request
pub fn parse_date(value: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| AppError::InvalidRequest(format!("Invalid date '{}' (use YYYY-MM-DD)", value)))
}
