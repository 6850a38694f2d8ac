//! Appointment lifecycle state machine
//!
//! `scheduled` is the only non-terminal state. Completing and cancelling
//! are terminal; rescheduling keeps the appointment `scheduled`.

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::appointment::AppointmentStatus,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleAction {
    Complete,
    Cancel,
    Reschedule,
}

impl LifecycleAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleAction::Complete => "complete",
            LifecycleAction::Cancel => "cancel",
            LifecycleAction::Reschedule => "reschedule",
        }
    }
}

/// Status reached by applying `action` to an appointment in `current`
pub fn next_status(
    id: Uuid,
    current: AppointmentStatus,
    action: LifecycleAction,
) -> AppResult<AppointmentStatus> {
    use AppointmentStatus::*;
    use LifecycleAction::*;

    match (current, action) {
        (Scheduled, Complete) => Ok(Completed),
        (Scheduled, Cancel) => Ok(Cancelled),
        (Scheduled, Reschedule) => Ok(Scheduled),
        (Completed, Complete) => Err(AppError::AlreadyCompleted(id)),
        (Cancelled, Cancel) => Err(AppError::AlreadyCancelled(id)),
        (status, action) => Err(AppError::InvalidTransition {
            id,
            action: action.as_str(),
            status: status.as_str(),
        }),
    }
}
