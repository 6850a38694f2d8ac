//! Schedule API endpoints (employee working windows)

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::schedule::{CreateScheduleWindow, ScheduleWindow},
};

use super::AuthenticatedUser;

/// List working windows of an employee
#[utoipa::path(
    get,
    path = "/employees/{id}/schedule-windows",
    tag = "schedules",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Windows ordered by weekday and start", body = Vec<ScheduleWindow>)
    )
)]
pub async fn list_windows(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(employee_id): Path<Uuid>,
) -> AppResult<Json<Vec<ScheduleWindow>>> {
    claims.require_booking()?;
    let windows = state.services.schedules.list_windows(claims.context(), employee_id).await?;
    Ok(Json(windows))
}

/// Add a working window
#[utoipa::path(
    post,
    path = "/employees/{id}/schedule-windows",
    tag = "schedules",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Employee ID")),
    request_body = CreateScheduleWindow,
    responses(
        (status = 201, description = "Window created", body = ScheduleWindow),
        (status = 400, description = "Invalid times", body = crate::error::ErrorResponse),
        (status = 409, description = "Window with the same start exists", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_window(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(employee_id): Path<Uuid>,
    Json(data): Json<CreateScheduleWindow>,
) -> AppResult<(StatusCode, Json<ScheduleWindow>)> {
    claims.require_schedule_admin()?;
    let window = state
        .services
        .schedules
        .create_window(claims.context(), employee_id, &data)
        .await?;
    Ok((StatusCode::CREATED, Json(window)))
}

/// Delete a working window
#[utoipa::path(
    delete,
    path = "/schedule-windows/{id}",
    tag = "schedules",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Window ID")),
    responses(
        (status = 204, description = "Window deleted")
    )
)]
pub async fn delete_window(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    claims.require_schedule_admin()?;
    state.services.schedules.delete_window(claims.context(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
