//! Stylist availability and offered services

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        appointment::parse_date,
        availability::{Availability, AvailabilityQuery},
        staff::StylistService,
    },
};

use super::AuthenticatedUser;

/// Free slots of a stylist on a date
#[utoipa::path(
    get,
    path = "/stylists/{id}/availability",
    tag = "availability",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Stylist ID"),
        AvailabilityQuery
    ),
    responses(
        (status = 200, description = "Bookable slots", body = Availability),
        (status = 400, description = "Invalid date", body = crate::error::ErrorResponse),
        (status = 404, description = "Stylist not found", body = crate::error::ErrorResponse),
        (status = 422, description = "Stylist has no employee profile", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_availability(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(stylist_id): Path<Uuid>,
    Query(query): Query<AvailabilityQuery>,
) -> AppResult<Json<Availability>> {
    claims.require_booking()?;
    let date = parse_date(&query.date)?;
    let availability = state
        .services
        .booking
        .get_availability(claims.context(), stylist_id, date)
        .await?;
    Ok(Json(availability))
}

/// Services a stylist can perform
#[utoipa::path(
    get,
    path = "/stylists/{id}/services",
    tag = "availability",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Stylist ID")),
    responses(
        (status = 200, description = "Offered services", body = Vec<StylistService>),
        (status = 404, description = "Stylist not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_stylist_services(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(stylist_id): Path<Uuid>,
) -> AppResult<Json<Vec<StylistService>>> {
    claims.require_booking()?;
    let services = state
        .services
        .appointments
        .stylist_services(claims.context(), stylist_id)
        .await?;
    Ok(Json(services))
}
