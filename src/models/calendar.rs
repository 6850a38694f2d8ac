//! Calendar feed models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::appointment::AppointmentStatus;

/// Display record for a calendar widget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: Uuid,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub color: String,
    pub extended_props: CalendarEventProps,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CalendarEventProps {
    pub client_phone: Option<String>,
    pub stylist_name: Option<String>,
    pub service_name: Option<String>,
    pub notes: String,
    pub status: AppointmentStatus,
}

/// Query parameters for the calendar feed
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct CalendarQuery {
    /// Range start, inclusive (RFC 3339)
    pub start: String,
    /// Range end, exclusive (RFC 3339)
    pub end: String,
}
