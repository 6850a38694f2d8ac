//! Booking rule checks shared by create and reschedule
//!
//! Checks run in a fixed order and stop at the first failure:
//! not in the past, stylist has an employee profile, inside a working
//! window, service offered by the stylist, slot free.

use std::sync::Arc;

use chrono::{DateTime, Datelike, FixedOffset, Utc};
use uuid::Uuid;

use super::clock::Clock;
use crate::{
    error::{AppError, AppResult},
    models::schedule::Weekday,
    repository::{AppointmentStore, Repository, ScheduleWindowStore, ServiceEligibilityIndex, StaffDirectory},
};

/// A proposed booking
#[derive(Debug, Clone, Copy)]
pub struct BookingRequest {
    pub stylist_id: Uuid,
    pub date_time: DateTime<Utc>,
    pub service_id: Option<Uuid>,
    /// Appointment being moved, ignored by the slot check
    pub rescheduling: Option<Uuid>,
}

#[derive(Clone)]
pub struct BookingValidator {
    windows: Arc<dyn ScheduleWindowStore>,
    eligibility: Arc<dyn ServiceEligibilityIndex>,
    staff: Arc<dyn StaffDirectory>,
    appointments: Arc<dyn AppointmentStore>,
    clock: Arc<dyn Clock>,
    offset: FixedOffset,
}

impl BookingValidator {
    pub fn new(repository: &Repository, clock: Arc<dyn Clock>, offset: FixedOffset) -> Self {
        Self {
            windows: repository.schedule_windows.clone(),
            eligibility: repository.eligibility.clone(),
            staff: repository.staff.clone(),
            appointments: repository.appointments.clone(),
            clock,
            offset,
        }
    }

    pub async fn check(&self, tenant_id: Uuid, request: &BookingRequest) -> AppResult<()> {
        if request.date_time <= self.clock.now() {
            return Err(AppError::PastDateRejected {
                requested: request.date_time,
            });
        }

        let profile = self.staff.stylist_profile(tenant_id, request.stylist_id).await?;
        let employee_id = profile.employee_id.ok_or(AppError::EmployeeProfileMissing {
            stylist_id: request.stylist_id,
        })?;

        let local = request.date_time.with_timezone(&self.offset);
        let weekday = Weekday::from(local.weekday());
        let windows = self.windows.windows_for(tenant_id, employee_id, weekday).await?;
        if !windows.iter().any(|w| w.contains(local.time())) {
            let hours = if windows.is_empty() {
                "not working".to_string()
            } else {
                windows.iter().map(|w| w.label()).collect::<Vec<_>>().join(", ")
            };
            return Err(AppError::OutsideWorkingHours { weekday, hours });
        }

        if let Some(service_id) = request.service_id {
            if !self
                .eligibility
                .is_eligible(tenant_id, request.stylist_id, service_id)
                .await?
            {
                return Err(AppError::ServiceNotOffered {
                    stylist_id: request.stylist_id,
                    service_id,
                });
            }
        }

        if let Some(existing) = self
            .appointments
            .find_active_at(tenant_id, request.stylist_id, request.date_time, request.rescheduling)
            .await?
        {
            return Err(AppError::SlotConflict {
                date_time: request.date_time,
                existing: Some(existing.id),
            });
        }

        Ok(())
    }
}
