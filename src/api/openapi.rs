//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{appointments, availability, calendar, health, schedules};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Salon Booking API",
        version = "1.0.0",
        description = "Appointment booking, availability and calendar REST API"
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        // Appointments
        appointments::list_appointments,
        appointments::get_appointment,
        appointments::create_appointment,
        appointments::reschedule_appointment,
        appointments::cancel_appointment,
        appointments::complete_appointment,
        // Availability
        availability::get_availability,
        availability::list_stylist_services,
        // Calendar
        calendar::calendar_feed,
        // Schedules
        schedules::list_windows,
        schedules::create_window,
        schedules::delete_window,
    ),
    components(
        schemas(
            // Appointments
            crate::models::appointment::Appointment,
            crate::models::appointment::AppointmentStatus,
            crate::models::appointment::CreateAppointment,
            crate::models::appointment::RescheduleAppointment,
            crate::models::appointment::CompleteAppointment,
            // Availability
            crate::models::availability::Availability,
            crate::models::availability::Slot,
            crate::models::staff::StylistService,
            // Calendar
            crate::models::calendar::CalendarEvent,
            crate::models::calendar::CalendarEventProps,
            // Schedules
            crate::models::schedule::ScheduleWindow,
            crate::models::schedule::CreateScheduleWindow,
            crate::models::schedule::Weekday,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "appointments", description = "Appointment booking and lifecycle"),
        (name = "availability", description = "Stylist availability"),
        (name = "calendar", description = "Calendar feed"),
        (name = "schedules", description = "Employee working windows")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
