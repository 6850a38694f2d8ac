//! Booking service: create, move, close and display appointments

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;
use validator::Validate;

use super::{
    availability::AvailabilityCalculator,
    calendar::CalendarProjector,
    clock::Clock,
    hooks::{self, AppointmentObserver, TransitionEvent},
    lifecycle::{next_status, LifecycleAction},
    validator::{BookingRequest, BookingValidator},
};
use crate::{
    config::BookingConfig,
    error::{AppError, AppResult},
    models::{
        appointment::{
            parse_timestamp, Appointment, AppointmentFilter, AppointmentStatus, CompleteAppointment,
            CreateAppointment, RescheduleAppointment,
        },
        availability::Availability,
        calendar::CalendarEvent,
        staff::StylistService,
        user::RequestContext,
    },
    repository::Repository,
};

/// Booking operations exposed to the HTTP layer
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookingOperations: Send + Sync {
    async fn create_appointment(&self, ctx: RequestContext, request: CreateAppointment) -> AppResult<Appointment>;

    async fn reschedule_appointment(
        &self,
        ctx: RequestContext,
        id: Uuid,
        request: RescheduleAppointment,
    ) -> AppResult<Appointment>;

    async fn cancel_appointment(&self, ctx: RequestContext, id: Uuid) -> AppResult<Appointment>;

    async fn complete_appointment(
        &self,
        ctx: RequestContext,
        id: Uuid,
        request: CompleteAppointment,
    ) -> AppResult<Appointment>;

    async fn get_availability(&self, ctx: RequestContext, stylist_id: Uuid, date: NaiveDate) -> AppResult<Availability>;

    async fn calendar_feed(
        &self,
        ctx: RequestContext,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<CalendarEvent>>;
}

#[derive(Clone)]
pub struct BookingService {
    repository: Repository,
    validator: BookingValidator,
    availability: AvailabilityCalculator,
    calendar: CalendarProjector,
    observers: Vec<Arc<dyn AppointmentObserver>>,
    clock: Arc<dyn Clock>,
}

impl BookingService {
    pub fn new(repository: Repository, config: &BookingConfig, clock: Arc<dyn Clock>) -> Self {
        let offset = config.local_offset();
        Self {
            validator: BookingValidator::new(&repository, clock.clone(), offset),
            availability: AvailabilityCalculator::new(&repository, config.slot_increment(), offset),
            calendar: CalendarProjector::new(config.default_duration()),
            observers: Vec::new(),
            repository,
            clock,
        }
    }

    /// Register a transition observer; observers run in registration order
    pub fn with_observer(mut self, observer: Arc<dyn AppointmentObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub async fn get_appointment(&self, ctx: RequestContext, id: Uuid) -> AppResult<Appointment> {
        self.repository.appointments.get(ctx.tenant_id, id).await
    }

    pub async fn list_appointments(&self, ctx: RequestContext, filter: &AppointmentFilter) -> AppResult<Vec<Appointment>> {
        self.repository.appointments.list(ctx.tenant_id, filter).await
    }

    pub async fn stylist_services(&self, ctx: RequestContext, stylist_id: Uuid) -> AppResult<Vec<StylistService>> {
        self.repository.staff.stylist_profile(ctx.tenant_id, stylist_id).await?;
        self.repository.eligibility.services_for(ctx.tenant_id, stylist_id).await
    }

    async fn check(&self, ctx: RequestContext, request: BookingRequest) -> AppResult<()> {
        if let Err(e) = self.validator.check(ctx.tenant_id, &request).await {
            tracing::warn!(
                stylist_id = %request.stylist_id,
                date_time = %request.date_time,
                "Booking rejected: {}",
                e
            );
            return Err(e);
        }
        Ok(())
    }

    async fn notify(&self, ctx: RequestContext, appointment: &Appointment, from: AppointmentStatus) {
        let event = TransitionEvent {
            tenant_id: ctx.tenant_id,
            appointment: appointment.clone(),
            from,
            to: appointment.status,
            at: appointment.updated_at,
        };
        hooks::notify(&self.observers, &event).await;
    }

    /// Report why a compare-and-set lost: the row moved to a state the action
    /// cannot leave, or it changed back and the caller should retry
    async fn lost_race(&self, ctx: RequestContext, id: Uuid, action: LifecycleAction) -> AppError {
        let latest = match self.repository.appointments.get(ctx.tenant_id, id).await {
            Ok(latest) => latest,
            Err(e) => return e,
        };
        match next_status(id, latest.status, action) {
            Err(e) => e,
            Ok(_) => AppError::Conflict(format!("Appointment {} was modified concurrently, retry", id)),
        }
    }

    async fn close(
        &self,
        ctx: RequestContext,
        id: Uuid,
        action: LifecycleAction,
        sale_id: Option<Uuid>,
    ) -> AppResult<Appointment> {
        let current = self.repository.appointments.get(ctx.tenant_id, id).await?;
        let to = next_status(id, current.status, action)?;

        let updated = self
            .repository
            .appointments
            .transition(ctx.tenant_id, id, current.status, to, sale_id, self.clock.now())
            .await?;
        let Some(updated) = updated else {
            return Err(self.lost_race(ctx, id, action).await);
        };

        tracing::info!(
            appointment_id = %id,
            actor_id = %ctx.actor_id,
            from = %current.status,
            to = %updated.status,
            "Appointment status changed"
        );
        self.notify(ctx, &updated, current.status).await;
        Ok(updated)
    }
}

#[async_trait]
impl BookingOperations for BookingService {
    async fn create_appointment(&self, ctx: RequestContext, request: CreateAppointment) -> AppResult<Appointment> {
        request.validate()?;
        let date_time = parse_timestamp(&request.date_time)?;

        self.check(
            ctx,
            BookingRequest {
                stylist_id: request.stylist_id,
                date_time,
                service_id: request.service_id,
                rescheduling: None,
            },
        )
        .await?;

        if !self.repository.clients.exists(ctx.tenant_id, request.client_id).await? {
            return Err(AppError::NotFound(format!("Client {} not found", request.client_id)));
        }

        let now = self.clock.now();
        let appointment = Appointment {
            id: Uuid::new_v4(),
            tenant_id: ctx.tenant_id,
            client_id: Some(request.client_id),
            stylist_id: request.stylist_id,
            service_id: request.service_id,
            role_id: request.role_id,
            status: AppointmentStatus::Scheduled,
            date_time,
            description: request.description,
            sale_id: None,
            created_at: now,
            updated_at: now,
        };
        let created = self.repository.appointments.insert(&appointment).await?;

        tracing::info!(
            appointment_id = %created.id,
            stylist_id = %created.stylist_id,
            actor_id = %ctx.actor_id,
            date_time = %created.date_time,
            "Appointment created"
        );
        Ok(created)
    }

    async fn reschedule_appointment(
        &self,
        ctx: RequestContext,
        id: Uuid,
        request: RescheduleAppointment,
    ) -> AppResult<Appointment> {
        let date_time = parse_timestamp(&request.date_time)?;
        let current = self.repository.appointments.get(ctx.tenant_id, id).await?;
        next_status(id, current.status, LifecycleAction::Reschedule)?;

        self.check(
            ctx,
            BookingRequest {
                stylist_id: current.stylist_id,
                date_time,
                service_id: current.service_id,
                rescheduling: Some(id),
            },
        )
        .await?;

        let updated = self
            .repository
            .appointments
            .reschedule(ctx.tenant_id, id, date_time, self.clock.now())
            .await?;
        let Some(updated) = updated else {
            return Err(self.lost_race(ctx, id, LifecycleAction::Reschedule).await);
        };

        tracing::info!(
            appointment_id = %id,
            actor_id = %ctx.actor_id,
            from = %current.date_time,
            to = %updated.date_time,
            "Appointment rescheduled"
        );
        self.notify(ctx, &updated, current.status).await;
        Ok(updated)
    }

    async fn cancel_appointment(&self, ctx: RequestContext, id: Uuid) -> AppResult<Appointment> {
        self.close(ctx, id, LifecycleAction::Cancel, None).await
    }

    async fn complete_appointment(
        &self,
        ctx: RequestContext,
        id: Uuid,
        request: CompleteAppointment,
    ) -> AppResult<Appointment> {
        self.close(ctx, id, LifecycleAction::Complete, request.sale_id).await
    }

    async fn get_availability(&self, ctx: RequestContext, stylist_id: Uuid, date: NaiveDate) -> AppResult<Availability> {
        self.availability.for_date(ctx.tenant_id, stylist_id, date).await
    }

    async fn calendar_feed(
        &self,
        ctx: RequestContext,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<CalendarEvent>> {
        if start >= end {
            return Err(AppError::InvalidRequest("Calendar range start must be before end".to_string()));
        }
        let rows = self.repository.appointments.calendar_rows(ctx.tenant_id, start, end).await?;
        Ok(self.calendar.project(rows))
    }
}
