//! Audit trail for booking operations
//!
//! `Audited` wraps any `BookingOperations` and records one entry per call,
//! successful or not.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use super::booking::BookingOperations;
use crate::{
    error::AppResult,
    models::{
        appointment::{Appointment, CompleteAppointment, CreateAppointment, RescheduleAppointment},
        availability::Availability,
        calendar::CalendarEvent,
        user::RequestContext,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditOutcome {
    Success,
    Failure,
}

#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub action: &'static str,
    pub tenant_id: Uuid,
    pub actor_id: Uuid,
    pub target: Option<Uuid>,
    pub outcome: AuditOutcome,
    pub error: Option<String>,
}

pub trait AuditSink: Send + Sync {
    fn record(&self, entry: &AuditEntry);
}

/// Writes audit entries to the `audit` tracing target
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, entry: &AuditEntry) {
        let target = entry.target.map(|id| id.to_string()).unwrap_or_default();
        match entry.outcome {
            AuditOutcome::Success => tracing::info!(
                target: "audit",
                action = entry.action,
                tenant_id = %entry.tenant_id,
                actor_id = %entry.actor_id,
                target_id = %target,
                "ok"
            ),
            AuditOutcome::Failure => tracing::warn!(
                target: "audit",
                action = entry.action,
                tenant_id = %entry.tenant_id,
                actor_id = %entry.actor_id,
                target_id = %target,
                error = entry.error.as_deref().unwrap_or_default(),
                "failed"
            ),
        }
    }
}

pub struct Audited<B> {
    inner: B,
    sink: Arc<dyn AuditSink>,
}

impl<B: BookingOperations> Audited<B> {
    pub fn new(inner: B, sink: Arc<dyn AuditSink>) -> Self {
        Self { inner, sink }
    }

    fn record<T>(&self, action: &'static str, ctx: RequestContext, target: Option<Uuid>, result: &AppResult<T>) {
        let (outcome, error) = match result {
            Ok(_) => (AuditOutcome::Success, None),
            Err(e) => (AuditOutcome::Failure, Some(e.to_string())),
        };
        self.sink.record(&AuditEntry {
            action,
            tenant_id: ctx.tenant_id,
            actor_id: ctx.actor_id,
            target,
            outcome,
            error,
        });
    }
}

#[async_trait]
impl<B: BookingOperations> BookingOperations for Audited<B> {
    async fn create_appointment(&self, ctx: RequestContext, request: CreateAppointment) -> AppResult<Appointment> {
        let result = self.inner.create_appointment(ctx, request).await;
        let target = result.as_ref().ok().map(|a| a.id);
        self.record("create_appointment", ctx, target, &result);
        result
    }

    async fn reschedule_appointment(
        &self,
        ctx: RequestContext,
        id: Uuid,
        request: RescheduleAppointment,
    ) -> AppResult<Appointment> {
        let result = self.inner.reschedule_appointment(ctx, id, request).await;
        self.record("reschedule_appointment", ctx, Some(id), &result);
        result
    }

    async fn cancel_appointment(&self, ctx: RequestContext, id: Uuid) -> AppResult<Appointment> {
        let result = self.inner.cancel_appointment(ctx, id).await;
        self.record("cancel_appointment", ctx, Some(id), &result);
        result
    }

    async fn complete_appointment(
        &self,
        ctx: RequestContext,
        id: Uuid,
        request: CompleteAppointment,
    ) -> AppResult<Appointment> {
        let result = self.inner.complete_appointment(ctx, id, request).await;
        self.record("complete_appointment", ctx, Some(id), &result);
        result
    }

    async fn get_availability(&self, ctx: RequestContext, stylist_id: Uuid, date: NaiveDate) -> AppResult<Availability> {
        let result = self.inner.get_availability(ctx, stylist_id, date).await;
        self.record("get_availability", ctx, Some(stylist_id), &result);
        result
    }

    async fn calendar_feed(
        &self,
        ctx: RequestContext,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<CalendarEvent>> {
        let result = self.inner.calendar_feed(ctx, start, end).await;
        self.record("calendar_feed", ctx, None, &result);
        result
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::{error::AppError, services::booking::MockBookingOperations};

    #[derive(Default)]
    struct Recorder(Mutex<Vec<AuditEntry>>);

    impl AuditSink for Recorder {
        fn record(&self, entry: &AuditEntry) {
            self.0.lock().unwrap().push(entry.clone());
        }
    }

    #[tokio::test]
    async fn test_records_failed_cancel() {
        let id = Uuid::new_v4();
        let mut mock = MockBookingOperations::new();
        mock.expect_cancel_appointment()
            .withf(move |_, target| *target == id)
            .times(1)
            .returning(|_, id| Err(AppError::AlreadyCancelled(id)));

        let recorder = Arc::new(Recorder::default());
        let audited = Audited::new(mock, recorder.clone());
        let ctx = RequestContext::new(Uuid::new_v4(), Uuid::new_v4());

        let result = audited.cancel_appointment(ctx, id).await;
        assert!(matches!(result, Err(AppError::AlreadyCancelled(_))));

        let entries = recorder.0.lock().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, "cancel_appointment");
        assert_eq!(entries[0].outcome, AuditOutcome::Failure);
        assert_eq!(entries[0].target, Some(id));
        assert_eq!(entries[0].actor_id, ctx.actor_id);
        assert!(entries[0].error.as_deref().unwrap().contains("already cancelled"));
    }

    #[tokio::test]
    async fn test_records_calendar_success() {
        let mut mock = MockBookingOperations::new();
        mock.expect_calendar_feed().times(1).returning(|_, _, _| Ok(Vec::new()));

        let recorder = Arc::new(Recorder::default());
        let audited = Audited::new(mock, recorder.clone());
        let ctx = RequestContext::new(Uuid::new_v4(), Uuid::new_v4());

        let now = Utc::now();
        audited
            .calendar_feed(ctx, now, now + chrono::Duration::days(1))
            .await
            .unwrap();

        let entries = recorder.0.lock().unwrap();
        assert_eq!(entries[0].outcome, AuditOutcome::Success);
        assert_eq!(entries[0].target, None);
    }
}
