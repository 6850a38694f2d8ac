//! Error types for the salon server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::models::schedule::Weekday;

/// Stable numeric error codes exposed in API responses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Success = 0,
    Failure = 1,
    NotAuthorized = 2,
    DbFailure = 3,
    NotFound = 4,
    InvalidRequest = 5,
    PastDateRejected = 6,
    EmployeeProfileMissing = 7,
    OutsideWorkingHours = 8,
    ServiceNotOffered = 9,
    SlotConflict = 10,
    AlreadyCompleted = 11,
    AlreadyCancelled = 12,
    InvalidTransition = 13,
    Duplicate = 14,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Requested time {requested} is not in the future")]
    PastDateRejected { requested: DateTime<Utc> },

    #[error("Stylist {stylist_id} has no employee profile and cannot be booked")]
    EmployeeProfileMissing { stylist_id: Uuid },

    #[error("Requested time is outside working hours on {weekday} (working hours: {hours})")]
    OutsideWorkingHours { weekday: Weekday, hours: String },

    #[error("Stylist {stylist_id} does not offer service {service_id}")]
    ServiceNotOffered { stylist_id: Uuid, service_id: Uuid },

    #[error("Slot {date_time} is already booked{}", conflict_suffix(.existing))]
    SlotConflict {
        date_time: DateTime<Utc>,
        existing: Option<Uuid>,
    },

    #[error("Appointment {0} is already completed")]
    AlreadyCompleted(Uuid),

    #[error("Appointment {0} is already cancelled")]
    AlreadyCancelled(Uuid),

    #[error("Cannot {action} appointment {id} in status {status}")]
    InvalidTransition {
        id: Uuid,
        action: &'static str,
        status: &'static str,
    },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

fn conflict_suffix(existing: &Option<Uuid>) -> String {
    existing
        .map(|id| format!(" by appointment {}", id))
        .unwrap_or_default()
}

impl AppError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Authentication(_) | AppError::Authorization(_) => ErrorCode::NotAuthorized,
            AppError::NotFound(_) => ErrorCode::NotFound,
            AppError::InvalidRequest(_) => ErrorCode::InvalidRequest,
            AppError::PastDateRejected { .. } => ErrorCode::PastDateRejected,
            AppError::EmployeeProfileMissing { .. } => ErrorCode::EmployeeProfileMissing,
            AppError::OutsideWorkingHours { .. } => ErrorCode::OutsideWorkingHours,
            AppError::ServiceNotOffered { .. } => ErrorCode::ServiceNotOffered,
            AppError::SlotConflict { .. } => ErrorCode::SlotConflict,
            AppError::AlreadyCompleted(_) => ErrorCode::AlreadyCompleted,
            AppError::AlreadyCancelled(_) => ErrorCode::AlreadyCancelled,
            AppError::InvalidTransition { .. } => ErrorCode::InvalidTransition,
            AppError::Conflict(_) => ErrorCode::Duplicate,
            AppError::Database(_) => ErrorCode::DbFailure,
            AppError::Internal(_) => ErrorCode::Failure,
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::Authentication(_) => StatusCode::UNAUTHORIZED,
            AppError::Authorization(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::PastDateRejected { .. }
            | AppError::EmployeeProfileMissing { .. }
            | AppError::OutsideWorkingHours { .. }
            | AppError::ServiceNotOffered { .. }
            | AppError::InvalidTransition { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::SlotConflict { .. }
            | AppError::AlreadyCompleted(_)
            | AppError::AlreadyCancelled(_)
            | AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        AppError::InvalidRequest(e.to_string())
    }
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code();
        let status = self.status();

        let message = match &self {
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "Database error".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
