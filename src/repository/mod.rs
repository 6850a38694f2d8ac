//! Repository layer: storage seams used by the booking core
//!
//! Each concern is a trait so the core runs unchanged against Postgres or
//! the in-memory backend. Every method takes the tenant explicitly.

pub mod appointments;
pub mod clients;
pub mod memory;
pub mod schedules;
pub mod staff;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        appointment::{Appointment, AppointmentDetails, AppointmentFilter, AppointmentStatus},
        schedule::{NewScheduleWindow, ScheduleWindow, Weekday},
        staff::{StylistProfile, StylistService},
    },
};

/// Appointment rows, owned by the booking subsystem
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    /// Fails with `NotFound` when the appointment is absent or belongs to another tenant
    async fn get(&self, tenant_id: Uuid, id: Uuid) -> AppResult<Appointment>;

    async fn list(&self, tenant_id: Uuid, filter: &AppointmentFilter) -> AppResult<Vec<Appointment>>;

    /// Scheduled or completed appointment of `stylist_id` starting exactly at `at`
    async fn find_active_at(
        &self,
        tenant_id: Uuid,
        stylist_id: Uuid,
        at: DateTime<Utc>,
        exclude: Option<Uuid>,
    ) -> AppResult<Option<Appointment>>;

    /// Start times in `[start, end)` held by scheduled or completed appointments
    async fn occupied_between(
        &self,
        tenant_id: Uuid,
        stylist_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<DateTime<Utc>>>;

    /// Insert a new appointment; a concurrent booking of the same slot
    /// surfaces as `SlotConflict`
    async fn insert(&self, appointment: &Appointment) -> AppResult<Appointment>;

    /// Move a still-scheduled appointment. `None` when it is no longer scheduled.
    async fn reschedule(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        date_time: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> AppResult<Option<Appointment>>;

    /// Compare-and-set status change. `None` when the stored status is not `from`.
    /// Entering `completed` also stamps the client's last visit with `updated_at`
    /// in the same unit of work; a missing client fails the whole change.
    async fn transition(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        from: AppointmentStatus,
        to: AppointmentStatus,
        sale_id: Option<Uuid>,
        updated_at: DateTime<Utc>,
    ) -> AppResult<Option<Appointment>>;

    /// Appointments in `[start, end)` joined with display names
    async fn calendar_rows(
        &self,
        tenant_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<AppointmentDetails>>;
}

/// Read side of employee schedule windows
#[async_trait]
pub trait ScheduleWindowStore: Send + Sync {
    /// Windows ordered by start time; empty when not working that day
    async fn windows_for(
        &self,
        tenant_id: Uuid,
        employee_id: Uuid,
        weekday: Weekday,
    ) -> AppResult<Vec<ScheduleWindow>>;
}

/// Write side of schedule windows, used by employee management only
#[async_trait]
pub trait ScheduleWindowAdmin: Send + Sync {
    async fn list_for_employee(&self, tenant_id: Uuid, employee_id: Uuid) -> AppResult<Vec<ScheduleWindow>>;

    /// `Conflict` when the employee already has a window starting at the same time that day
    async fn create_window(
        &self,
        tenant_id: Uuid,
        window: &NewScheduleWindow,
        created_at: DateTime<Utc>,
    ) -> AppResult<ScheduleWindow>;

    async fn delete_window(&self, tenant_id: Uuid, id: Uuid) -> AppResult<()>;
}

/// Stylist to service authorization
#[async_trait]
pub trait ServiceEligibilityIndex: Send + Sync {
    async fn is_eligible(&self, tenant_id: Uuid, stylist_id: Uuid, service_id: Uuid) -> AppResult<bool>;

    async fn services_for(&self, tenant_id: Uuid, stylist_id: Uuid) -> AppResult<Vec<StylistService>>;
}

#[async_trait]
pub trait StaffDirectory: Send + Sync {
    /// `NotFound` when no such stylist exists in the tenant
    async fn stylist_profile(&self, tenant_id: Uuid, stylist_id: Uuid) -> AppResult<StylistProfile>;
}

#[async_trait]
pub trait ClientDirectory: Send + Sync {
    async fn exists(&self, tenant_id: Uuid, client_id: Uuid) -> AppResult<bool>;
}

/// Main repository struct holding every storage seam
#[derive(Clone)]
pub struct Repository {
    pub appointments: Arc<dyn AppointmentStore>,
    pub schedule_windows: Arc<dyn ScheduleWindowStore>,
    pub schedule_admin: Arc<dyn ScheduleWindowAdmin>,
    pub eligibility: Arc<dyn ServiceEligibilityIndex>,
    pub staff: Arc<dyn StaffDirectory>,
    pub clients: Arc<dyn ClientDirectory>,
}

impl Repository {
    /// Create a Postgres-backed repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        let schedules = Arc::new(schedules::SchedulesRepository::new(pool.clone()));
        let staff = Arc::new(staff::StaffRepository::new(pool.clone()));
        Self {
            appointments: Arc::new(appointments::AppointmentsRepository::new(pool.clone())),
            schedule_windows: schedules.clone(),
            schedule_admin: schedules,
            eligibility: staff.clone(),
            staff,
            clients: Arc::new(clients::ClientsRepository::new(pool)),
        }
    }

    /// Repository backed entirely by one in-memory store
    pub fn in_memory(store: Arc<memory::MemoryStore>) -> Self {
        Self {
            appointments: store.clone(),
            schedule_windows: store.clone(),
            schedule_admin: store.clone(),
            eligibility: store.clone(),
            staff: store.clone(),
            clients: store,
        }
    }
}

/// Map a Postgres unique violation to a domain error, pass everything else through
pub(crate) fn map_unique_violation(
    err: sqlx::Error,
    on_violation: impl FnOnce() -> crate::error::AppError,
) -> crate::error::AppError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => on_violation(),
        _ => crate::error::AppError::Database(err),
    }
}
