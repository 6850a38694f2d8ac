//! Appointment API endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::appointment::{
        Appointment, AppointmentFilter, AppointmentQuery, CompleteAppointment, CreateAppointment,
        RescheduleAppointment,
    },
};

use super::AuthenticatedUser;

/// List appointments
#[utoipa::path(
    get,
    path = "/appointments",
    tag = "appointments",
    security(("bearer_auth" = [])),
    params(AppointmentQuery),
    responses(
        (status = 200, description = "Appointments ordered by start time", body = Vec<Appointment>),
        (status = 400, description = "Invalid filter", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_appointments(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<AppointmentQuery>,
) -> AppResult<Json<Vec<Appointment>>> {
    claims.require_booking()?;
    let filter = AppointmentFilter::try_from(&query)?;
    let appointments = state.services.appointments.list_appointments(claims.context(), &filter).await?;
    Ok(Json(appointments))
}

/// Get appointment by ID
#[utoipa::path(
    get,
    path = "/appointments/{id}",
    tag = "appointments",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Appointment ID")),
    responses(
        (status = 200, description = "Appointment details", body = Appointment),
        (status = 404, description = "Appointment not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_appointment(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Appointment>> {
    claims.require_booking()?;
    let appointment = state.services.appointments.get_appointment(claims.context(), id).await?;
    Ok(Json(appointment))
}

/// Book an appointment
#[utoipa::path(
    post,
    path = "/appointments",
    tag = "appointments",
    security(("bearer_auth" = [])),
    request_body = CreateAppointment,
    responses(
        (status = 201, description = "Appointment booked", body = Appointment),
        (status = 400, description = "Malformed request", body = crate::error::ErrorResponse),
        (status = 404, description = "Stylist or client not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Slot already booked", body = crate::error::ErrorResponse),
        (status = 422, description = "Booking rule violated", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_appointment(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateAppointment>,
) -> AppResult<(StatusCode, Json<Appointment>)> {
    claims.require_booking()?;
    let appointment = state.services.booking.create_appointment(claims.context(), data).await?;
    Ok((StatusCode::CREATED, Json(appointment)))
}

/// Move an appointment to a new start time
#[utoipa::path(
    post,
    path = "/appointments/{id}/reschedule",
    tag = "appointments",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Appointment ID")),
    request_body = RescheduleAppointment,
    responses(
        (status = 200, description = "Appointment rescheduled", body = Appointment),
        (status = 409, description = "Slot already booked", body = crate::error::ErrorResponse),
        (status = 422, description = "Booking rule violated or appointment closed", body = crate::error::ErrorResponse)
    )
)]
pub async fn reschedule_appointment(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(data): Json<RescheduleAppointment>,
) -> AppResult<Json<Appointment>> {
    claims.require_booking()?;
    let appointment = state
        .services
        .booking
        .reschedule_appointment(claims.context(), id, data)
        .await?;
    Ok(Json(appointment))
}

/// Cancel an appointment
#[utoipa::path(
    post,
    path = "/appointments/{id}/cancel",
    tag = "appointments",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Appointment ID")),
    responses(
        (status = 200, description = "Appointment cancelled", body = Appointment),
        (status = 409, description = "Already cancelled", body = crate::error::ErrorResponse),
        (status = 422, description = "Appointment already completed", body = crate::error::ErrorResponse)
    )
)]
pub async fn cancel_appointment(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Appointment>> {
    claims.require_booking()?;
    let appointment = state.services.booking.cancel_appointment(claims.context(), id).await?;
    Ok(Json(appointment))
}

/// Mark an appointment as completed, optionally linking the sale that closed it
#[utoipa::path(
    post,
    path = "/appointments/{id}/complete",
    tag = "appointments",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Appointment ID")),
    request_body = CompleteAppointment,
    responses(
        (status = 200, description = "Appointment completed", body = Appointment),
        (status = 409, description = "Already completed", body = crate::error::ErrorResponse),
        (status = 422, description = "Appointment was cancelled", body = crate::error::ErrorResponse)
    )
)]
pub async fn complete_appointment(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    data: Option<Json<CompleteAppointment>>,
) -> AppResult<Json<Appointment>> {
    claims.require_booking()?;
    let data = data.map(|Json(d)| d).unwrap_or_default();
    let appointment = state
        .services
        .booking
        .complete_appointment(claims.context(), id, data)
        .await?;
    Ok(Json(appointment))
}
