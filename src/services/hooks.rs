//! Transition observers
//!
//! Observers run synchronously, in registration order, after a transition
//! has been persisted. They carry optional side effects only: the client's
//! last visit is stamped by the store inside the completing transition. A
//! failing observer is logged and does not roll the transition back.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::appointment::{Appointment, AppointmentStatus},
};

#[derive(Debug, Clone)]
pub struct TransitionEvent {
    pub tenant_id: Uuid,
    pub appointment: Appointment,
    pub from: AppointmentStatus,
    pub to: AppointmentStatus,
    pub at: DateTime<Utc>,
}

#[async_trait]
pub trait AppointmentObserver: Send + Sync {
    fn name(&self) -> &'static str;

    async fn on_transition(&self, event: &TransitionEvent) -> AppResult<()>;
}

/// Run every observer for one event
pub async fn notify(observers: &[Arc<dyn AppointmentObserver>], event: &TransitionEvent) {
    for observer in observers {
        if let Err(e) = observer.on_transition(event).await {
            tracing::warn!(
                observer = observer.name(),
                appointment_id = %event.appointment.id,
                "Transition hook failed: {}",
                e
            );
        }
    }
}
