//! Schedule window models (recurring weekly working hours per employee)

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Weekday
// ---------------------------------------------------------------------------

/// Named day of week, stored as lowercase text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub fn as_str(&self) -> &'static str {
        match self {
            Weekday::Monday => "monday",
            Weekday::Tuesday => "tuesday",
            Weekday::Wednesday => "wednesday",
            Weekday::Thursday => "thursday",
            Weekday::Friday => "friday",
            Weekday::Saturday => "saturday",
            Weekday::Sunday => "sunday",
        }
    }
}

impl From<chrono::Weekday> for Weekday {
    fn from(day: chrono::Weekday) -> Self {
        match day {
            chrono::Weekday::Mon => Weekday::Monday,
            chrono::Weekday::Tue => Weekday::Tuesday,
            chrono::Weekday::Wed => Weekday::Wednesday,
            chrono::Weekday::Thu => Weekday::Thursday,
            chrono::Weekday::Fri => Weekday::Friday,
            chrono::Weekday::Sat => Weekday::Saturday,
            chrono::Weekday::Sun => Weekday::Sunday,
        }
    }
}

impl std::fmt::Display for Weekday {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Weekday {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "monday" => Ok(Weekday::Monday),
            "tuesday" => Ok(Weekday::Tuesday),
            "wednesday" => Ok(Weekday::Wednesday),
            "thursday" => Ok(Weekday::Thursday),
            "friday" => Ok(Weekday::Friday),
            "saturday" => Ok(Weekday::Saturday),
            "sunday" => Ok(Weekday::Sunday),
            _ => Err(format!("Invalid weekday: {}", s)),
        }
    }
}

// SQLx conversion for Weekday
impl sqlx::Type<Postgres> for Weekday {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for Weekday {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for Weekday {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        let s: String = self.as_str().to_string();
        <String as Encode<Postgres>>::encode(s, buf)
    }
}

// ---------------------------------------------------------------------------
// ScheduleWindow
// ---------------------------------------------------------------------------

/// A recurring weekly time range during which an employee is available
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ScheduleWindow {
    pub id: Uuid,
    #[serde(skip_serializing)]
    pub tenant_id: Uuid,
    pub employee_id: Uuid,
    pub day_of_week: Weekday,
    /// Start of the window (local time of day)
    #[schema(value_type = String, example = "09:00:00")]
    pub start_time: NaiveTime,
    /// End of the window (local time of day)
    #[schema(value_type = String, example = "18:00:00")]
    pub end_time: NaiveTime,
    pub created_at: DateTime<Utc>,
}

impl ScheduleWindow {
    /// Inclusive containment: a booking exactly at `end_time` is accepted
    pub fn contains(&self, time: NaiveTime) -> bool {
        self.start_time <= time && time <= self.end_time
    }

    pub fn label(&self) -> String {
        format!(
            "{}-{}",
            self.start_time.format("%H:%M"),
            self.end_time.format("%H:%M")
        )
    }
}

/// Create schedule window request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateScheduleWindow {
    pub day_of_week: Weekday,
    /// Start time (HH:MM)
    pub start_time: String,
    /// End time (HH:MM)
    pub end_time: String,
}

/// Validated window ready to be stored
#[derive(Debug, Clone)]
pub struct NewScheduleWindow {
    pub employee_id: Uuid,
    pub day_of_week: Weekday,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}
