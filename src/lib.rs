//! Salon booking server
//!
//! Appointment scheduling core for salon management: stylist working
//! windows, service eligibility, bookable slots, the appointment
//! lifecycle and a calendar feed, served as a REST JSON API.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
