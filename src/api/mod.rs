//! API handlers for the salon booking REST endpoints

pub mod appointments;
pub mod availability;
pub mod calendar;
pub mod health;
pub mod openapi;
pub mod schedules;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{error::AppError, models::user::UserClaims, AppState};

/// Extractor for authenticated user from JWT token
pub struct AuthenticatedUser(pub UserClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Authentication("Invalid authorization header format".to_string()))?;

        let claims = UserClaims::from_token(token, &state.config.auth.jwt_secret)
            .map_err(|e| AppError::Authentication(e.to_string()))?;

        Ok(AuthenticatedUser(claims))
    }
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Appointments
        .route(
            "/appointments",
            get(appointments::list_appointments).post(appointments::create_appointment),
        )
        .route("/appointments/:id", get(appointments::get_appointment))
        .route("/appointments/:id/reschedule", post(appointments::reschedule_appointment))
        .route("/appointments/:id/cancel", post(appointments::cancel_appointment))
        .route("/appointments/:id/complete", post(appointments::complete_appointment))
        // Stylists
        .route("/stylists/:id/availability", get(availability::get_availability))
        .route("/stylists/:id/services", get(availability::list_stylist_services))
        // Calendar
        .route("/calendar", get(calendar::calendar_feed))
        // Schedules
        .route(
            "/employees/:id/schedule-windows",
            get(schedules::list_windows).post(schedules::create_window),
        )
        .route("/schedule-windows/:id", delete(schedules::delete_window))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi::create_openapi_router())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
