//! Availability models

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::schedule::Weekday;

/// A bookable slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Slot {
    pub date_time: DateTime<Utc>,
    pub available: bool,
}

/// Bookable slots of one stylist on one date
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Availability {
    pub stylist_id: Uuid,
    pub date: NaiveDate,
    pub weekday: Weekday,
    pub slots: Vec<Slot>,
    /// Set when the stylist does not work that day
    pub message: Option<String>,
}

/// Query parameters for availability
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct AvailabilityQuery {
    /// Date (YYYY-MM-DD)
    pub date: String,
}
