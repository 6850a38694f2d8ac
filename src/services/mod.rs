//! Business logic services

pub mod audit;
pub mod availability;
pub mod booking;
pub mod calendar;
pub mod clock;
pub mod hooks;
pub mod lifecycle;
pub mod schedules;
pub mod validator;

use std::sync::Arc;

use crate::{config::BookingConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    /// Audited entry point for the booking operations
    pub booking: Arc<dyn booking::BookingOperations>,
    /// Read-side queries over appointments and stylist services
    pub appointments: booking::BookingService,
    pub schedules: schedules::SchedulesService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, booking_config: &BookingConfig, clock: Arc<dyn clock::Clock>) -> Self {
        let appointments = booking::BookingService::new(repository.clone(), booking_config, clock.clone());
        let sink: Arc<dyn audit::AuditSink> = Arc::new(audit::TracingAuditSink);
        Self {
            booking: Arc::new(audit::Audited::new(appointments.clone(), sink)),
            appointments,
            schedules: schedules::SchedulesService::new(repository, clock),
        }
    }
}
