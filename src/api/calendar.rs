//! Calendar feed endpoint

use axum::{
    extract::{Query, State},
    Json,
};

use crate::{
    error::AppResult,
    models::{
        appointment::parse_timestamp,
        calendar::{CalendarEvent, CalendarQuery},
    },
};

use super::AuthenticatedUser;

/// Appointments in a time range, shaped for a calendar widget
#[utoipa::path(
    get,
    path = "/calendar",
    tag = "calendar",
    security(("bearer_auth" = [])),
    params(CalendarQuery),
    responses(
        (status = 200, description = "Calendar events", body = Vec<CalendarEvent>),
        (status = 400, description = "Invalid range", body = crate::error::ErrorResponse)
    )
)]
pub async fn calendar_feed(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<CalendarQuery>,
) -> AppResult<Json<Vec<CalendarEvent>>> {
    claims.require_booking()?;
    let start = parse_timestamp(&query.start)?;
    let end = parse_timestamp(&query.end)?;
    let events = state.services.booking.calendar_feed(claims.context(), start, end).await?;
    Ok(Json(events))
}
