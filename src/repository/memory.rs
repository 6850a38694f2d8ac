//! In-memory backend implementing every storage seam
//!
//! All reads and writes go through one `RwLock`, so check-then-insert of an
//! appointment is atomic with respect to other bookings.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    AppointmentStore, ClientDirectory, ScheduleWindowAdmin, ScheduleWindowStore,
    ServiceEligibilityIndex, StaffDirectory,
};
use crate::{
    error::{AppError, AppResult},
    models::{
        appointment::{Appointment, AppointmentDetails, AppointmentFilter, AppointmentStatus},
        schedule::{NewScheduleWindow, ScheduleWindow, Weekday},
        staff::{StylistProfile, StylistService},
    },
};

#[derive(Debug, Clone)]
struct StylistRecord {
    employee_id: Option<Uuid>,
    display_name: String,
}

#[derive(Debug, Clone)]
struct ClientRecord {
    full_name: String,
    phone: Option<String>,
    last_visit: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
struct MemoryState {
    appointments: HashMap<Uuid, Appointment>,
    windows: HashMap<Uuid, ScheduleWindow>,
    stylists: HashMap<(Uuid, Uuid), StylistRecord>,
    services: HashMap<(Uuid, Uuid), String>,
    eligibility: HashMap<(Uuid, Uuid, Uuid), i32>,
    clients: HashMap<(Uuid, Uuid), ClientRecord>,
}

impl MemoryState {
    fn active_at(
        &self,
        tenant_id: Uuid,
        stylist_id: Uuid,
        at: DateTime<Utc>,
        exclude: Option<Uuid>,
    ) -> Option<&Appointment> {
        self.appointments.values().find(|a| {
            a.tenant_id == tenant_id
                && a.stylist_id == stylist_id
                && a.date_time == at
                && a.status.occupies_slot()
                && Some(a.id) != exclude
        })
    }

    fn tenant_appointment(&self, tenant_id: Uuid, id: Uuid) -> Option<&Appointment> {
        self.appointments.get(&id).filter(|a| a.tenant_id == tenant_id)
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a stylist account, optionally linked to a fresh employee profile
    pub async fn add_stylist(&self, tenant_id: Uuid, display_name: &str, with_employee: bool) -> StylistProfile {
        let profile = StylistProfile {
            stylist_id: Uuid::new_v4(),
            employee_id: with_employee.then(Uuid::new_v4),
            display_name: display_name.to_string(),
        };
        self.state.write().await.stylists.insert(
            (tenant_id, profile.stylist_id),
            StylistRecord {
                employee_id: profile.employee_id,
                display_name: profile.display_name.clone(),
            },
        );
        profile
    }

    pub async fn add_client(&self, tenant_id: Uuid, full_name: &str, phone: Option<&str>) -> Uuid {
        let id = Uuid::new_v4();
        self.state.write().await.clients.insert(
            (tenant_id, id),
            ClientRecord {
                full_name: full_name.to_string(),
                phone: phone.map(str::to_string),
                last_visit: None,
            },
        );
        id
    }

    pub async fn add_service(&self, tenant_id: Uuid, name: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.state.write().await.services.insert((tenant_id, id), name.to_string());
        id
    }

    /// Authorize a stylist for a service with the given duration
    pub async fn offer_service(&self, tenant_id: Uuid, stylist_id: Uuid, service_id: Uuid, duration_minutes: i32) {
        self.state
            .write()
            .await
            .eligibility
            .insert((tenant_id, stylist_id, service_id), duration_minutes);
    }

    pub async fn add_window(
        &self,
        tenant_id: Uuid,
        employee_id: Uuid,
        day_of_week: Weekday,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) -> AppResult<ScheduleWindow> {
        let window = NewScheduleWindow {
            employee_id,
            day_of_week,
            start_time,
            end_time,
        };
        self.create_window(tenant_id, &window, Utc::now()).await
    }

    pub async fn client_last_visit(&self, tenant_id: Uuid, client_id: Uuid) -> Option<DateTime<Utc>> {
        self.state
            .read()
            .await
            .clients
            .get(&(tenant_id, client_id))
            .and_then(|c| c.last_visit)
    }

    pub async fn appointment_count(&self, tenant_id: Uuid) -> usize {
        self.state
            .read()
            .await
            .appointments
            .values()
            .filter(|a| a.tenant_id == tenant_id)
            .count()
    }
}

#[async_trait]
impl AppointmentStore for MemoryStore {
    async fn get(&self, tenant_id: Uuid, id: Uuid) -> AppResult<Appointment> {
        self.state
            .read()
            .await
            .tenant_appointment(tenant_id, id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Appointment {} not found", id)))
    }

    async fn list(&self, tenant_id: Uuid, filter: &AppointmentFilter) -> AppResult<Vec<Appointment>> {
        let state = self.state.read().await;
        let mut rows: Vec<Appointment> = state
            .appointments
            .values()
            .filter(|a| a.tenant_id == tenant_id && filter.matches(a))
            .cloned()
            .collect();
        rows.sort_by_key(|a| (a.date_time, a.created_at));
        Ok(rows)
    }

    async fn find_active_at(
        &self,
        tenant_id: Uuid,
        stylist_id: Uuid,
        at: DateTime<Utc>,
        exclude: Option<Uuid>,
    ) -> AppResult<Option<Appointment>> {
        Ok(self
            .state
            .read()
            .await
            .active_at(tenant_id, stylist_id, at, exclude)
            .cloned())
    }

    async fn occupied_between(
        &self,
        tenant_id: Uuid,
        stylist_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<DateTime<Utc>>> {
        let state = self.state.read().await;
        let mut taken: Vec<DateTime<Utc>> = state
            .appointments
            .values()
            .filter(|a| {
                a.tenant_id == tenant_id
                    && a.stylist_id == stylist_id
                    && a.status.occupies_slot()
                    && a.date_time >= start
                    && a.date_time < end
            })
            .map(|a| a.date_time)
            .collect();
        taken.sort();
        Ok(taken)
    }

    async fn insert(&self, appointment: &Appointment) -> AppResult<Appointment> {
        let mut state = self.state.write().await;
        if appointment.status.occupies_slot() {
            if let Some(existing) =
                state.active_at(appointment.tenant_id, appointment.stylist_id, appointment.date_time, None)
            {
                return Err(AppError::SlotConflict {
                    date_time: appointment.date_time,
                    existing: Some(existing.id),
                });
            }
        }
        state.appointments.insert(appointment.id, appointment.clone());
        Ok(appointment.clone())
    }

    async fn reschedule(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        date_time: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> AppResult<Option<Appointment>> {
        let mut state = self.state.write().await;
        let Some(current) = state.tenant_appointment(tenant_id, id) else {
            return Ok(None);
        };
        if current.status != AppointmentStatus::Scheduled {
            return Ok(None);
        }
        let stylist_id = current.stylist_id;
        if let Some(existing) = state.active_at(tenant_id, stylist_id, date_time, Some(id)) {
            return Err(AppError::SlotConflict {
                date_time,
                existing: Some(existing.id),
            });
        }
        let Some(row) = state.appointments.get_mut(&id) else {
            return Ok(None);
        };
        row.date_time = date_time;
        row.updated_at = updated_at;
        Ok(Some(row.clone()))
    }

    async fn transition(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        from: AppointmentStatus,
        to: AppointmentStatus,
        sale_id: Option<Uuid>,
        updated_at: DateTime<Utc>,
    ) -> AppResult<Option<Appointment>> {
        let mut state = self.state.write().await;
        let client_id = match state.tenant_appointment(tenant_id, id) {
            Some(current) if current.status == from => current.client_id,
            _ => return Ok(None),
        };
        if let Some(sale) = sale_id {
            let linked_elsewhere = state
                .appointments
                .values()
                .any(|a| a.id != id && a.sale_id == Some(sale));
            if linked_elsewhere {
                return Err(AppError::Conflict(
                    "Sale is already linked to another appointment".to_string(),
                ));
            }
        }
        let visit = client_id.filter(|_| to == AppointmentStatus::Completed && from != to);
        if let Some(client_id) = visit {
            let client = state
                .clients
                .get_mut(&(tenant_id, client_id))
                .ok_or_else(|| AppError::NotFound(format!("Client {} not found", client_id)))?;
            client.last_visit = Some(updated_at);
        }
        let Some(row) = state.appointments.get_mut(&id) else {
            return Ok(None);
        };
        row.status = to;
        if row.sale_id.is_none() {
            row.sale_id = sale_id;
        }
        row.updated_at = updated_at;
        Ok(Some(row.clone()))
    }

    async fn calendar_rows(
        &self,
        tenant_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<AppointmentDetails>> {
        let state = self.state.read().await;
        let mut rows: Vec<AppointmentDetails> = state
            .appointments
            .values()
            .filter(|a| a.tenant_id == tenant_id && a.date_time >= start && a.date_time < end)
            .map(|a| {
                let client = a.client_id.and_then(|c| state.clients.get(&(tenant_id, c)));
                AppointmentDetails {
                    id: a.id,
                    client_name: client.map(|c| c.full_name.clone()),
                    client_phone: client.and_then(|c| c.phone.clone()),
                    stylist_name: state
                        .stylists
                        .get(&(tenant_id, a.stylist_id))
                        .map(|s| s.display_name.clone()),
                    service_name: a
                        .service_id
                        .and_then(|s| state.services.get(&(tenant_id, s)).cloned()),
                    duration_minutes: a
                        .service_id
                        .and_then(|s| state.eligibility.get(&(tenant_id, a.stylist_id, s)).copied()),
                    status: a.status,
                    date_time: a.date_time,
                    description: a.description.clone(),
                }
            })
            .collect();
        rows.sort_by_key(|r| r.date_time);
        Ok(rows)
    }
}

#[async_trait]
impl ScheduleWindowStore for MemoryStore {
    async fn windows_for(
        &self,
        tenant_id: Uuid,
        employee_id: Uuid,
        weekday: Weekday,
    ) -> AppResult<Vec<ScheduleWindow>> {
        let state = self.state.read().await;
        let mut rows: Vec<ScheduleWindow> = state
            .windows
            .values()
            .filter(|w| w.tenant_id == tenant_id && w.employee_id == employee_id && w.day_of_week == weekday)
            .cloned()
            .collect();
        rows.sort_by_key(|w| w.start_time);
        Ok(rows)
    }
}

#[async_trait]
impl ScheduleWindowAdmin for MemoryStore {
    async fn list_for_employee(&self, tenant_id: Uuid, employee_id: Uuid) -> AppResult<Vec<ScheduleWindow>> {
        let state = self.state.read().await;
        let mut rows: Vec<ScheduleWindow> = state
            .windows
            .values()
            .filter(|w| w.tenant_id == tenant_id && w.employee_id == employee_id)
            .cloned()
            .collect();
        rows.sort_by_key(|w| (w.day_of_week, w.start_time));
        Ok(rows)
    }

    async fn create_window(
        &self,
        tenant_id: Uuid,
        window: &NewScheduleWindow,
        created_at: DateTime<Utc>,
    ) -> AppResult<ScheduleWindow> {
        if window.start_time >= window.end_time {
            return Err(AppError::InvalidRequest(
                "Window start_time must be before end_time".to_string(),
            ));
        }
        let mut state = self.state.write().await;
        let duplicate = state.windows.values().any(|w| {
            w.tenant_id == tenant_id
                && w.employee_id == window.employee_id
                && w.day_of_week == window.day_of_week
                && w.start_time == window.start_time
        });
        if duplicate {
            return Err(AppError::Conflict(format!(
                "Employee already has a window starting at {} on {}",
                window.start_time.format("%H:%M"),
                window.day_of_week
            )));
        }
        let row = ScheduleWindow {
            id: Uuid::new_v4(),
            tenant_id,
            employee_id: window.employee_id,
            day_of_week: window.day_of_week,
            start_time: window.start_time,
            end_time: window.end_time,
            created_at,
        };
        state.windows.insert(row.id, row.clone());
        Ok(row)
    }

    async fn delete_window(&self, tenant_id: Uuid, id: Uuid) -> AppResult<()> {
        let mut state = self.state.write().await;
        match state.windows.get(&id) {
            Some(w) if w.tenant_id == tenant_id => {
                state.windows.remove(&id);
                Ok(())
            }
            _ => Err(AppError::NotFound(format!("Schedule window {} not found", id))),
        }
    }
}

#[async_trait]
impl ServiceEligibilityIndex for MemoryStore {
    async fn is_eligible(&self, tenant_id: Uuid, stylist_id: Uuid, service_id: Uuid) -> AppResult<bool> {
        Ok(self
            .state
            .read()
            .await
            .eligibility
            .contains_key(&(tenant_id, stylist_id, service_id)))
    }

    async fn services_for(&self, tenant_id: Uuid, stylist_id: Uuid) -> AppResult<Vec<StylistService>> {
        let state = self.state.read().await;
        let mut rows: Vec<StylistService> = state
            .eligibility
            .iter()
            .filter(|((t, s, _), _)| *t == tenant_id && *s == stylist_id)
            .map(|((_, _, service_id), duration)| StylistService {
                stylist_id,
                service_id: *service_id,
                service_name: state
                    .services
                    .get(&(tenant_id, *service_id))
                    .cloned()
                    .unwrap_or_default(),
                duration_minutes: *duration,
            })
            .collect();
        rows.sort_by(|a, b| a.service_name.cmp(&b.service_name));
        Ok(rows)
    }
}

#[async_trait]
impl StaffDirectory for MemoryStore {
    async fn stylist_profile(&self, tenant_id: Uuid, stylist_id: Uuid) -> AppResult<StylistProfile> {
        self.state
            .read()
            .await
            .stylists
            .get(&(tenant_id, stylist_id))
            .map(|s| StylistProfile {
                stylist_id,
                employee_id: s.employee_id,
                display_name: s.display_name.clone(),
            })
            .ok_or_else(|| AppError::NotFound(format!("Stylist {} not found", stylist_id)))
    }
}

#[async_trait]
impl ClientDirectory for MemoryStore {
    async fn exists(&self, tenant_id: Uuid, client_id: Uuid) -> AppResult<bool> {
        Ok(self.state.read().await.clients.contains_key(&(tenant_id, client_id)))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::TimeZone;

    use super::*;

    fn appointment(tenant_id: Uuid, stylist_id: Uuid, at: DateTime<Utc>) -> Appointment {
        Appointment {
            id: Uuid::new_v4(),
            tenant_id,
            client_id: None,
            stylist_id,
            service_id: None,
            role_id: None,
            status: AppointmentStatus::Scheduled,
            date_time: at,
            description: String::new(),
            sale_id: None,
            created_at: at,
            updated_at: at,
        }
    }

    #[tokio::test]
    async fn test_racing_inserts_only_one_wins() {
        let store = Arc::new(MemoryStore::new());
        let tenant = Uuid::new_v4();
        let stylist = Uuid::new_v4();
        let at = Utc.with_ymd_and_hms(2030, 1, 8, 10, 0, 0).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.insert(&appointment(tenant, stylist, at)).await })
            })
            .collect();

        let mut wins = 0;
        let mut conflicts = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => wins += 1,
                Err(AppError::SlotConflict { .. }) => conflicts += 1,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
        assert_eq!(wins, 1);
        assert_eq!(conflicts, 7);
        assert_eq!(store.appointment_count(tenant).await, 1);
    }

    #[tokio::test]
    async fn test_cancelled_row_frees_the_slot() {
        let store = MemoryStore::new();
        let tenant = Uuid::new_v4();
        let stylist = Uuid::new_v4();
        let at = Utc.with_ymd_and_hms(2030, 1, 8, 10, 0, 0).unwrap();

        let first = store.insert(&appointment(tenant, stylist, at)).await.unwrap();
        store
            .transition(tenant, first.id, AppointmentStatus::Scheduled, AppointmentStatus::Cancelled, None, at)
            .await
            .unwrap();

        tokio_test::assert_ok!(store.insert(&appointment(tenant, stylist, at)).await);
    }

    #[tokio::test]
    async fn test_transition_is_compare_and_set() {
        let store = MemoryStore::new();
        let tenant = Uuid::new_v4();
        let at = Utc.with_ymd_and_hms(2030, 1, 8, 10, 0, 0).unwrap();
        let row = store.insert(&appointment(tenant, Uuid::new_v4(), at)).await.unwrap();

        let sale = Uuid::new_v4();
        let done = store
            .transition(tenant, row.id, AppointmentStatus::Scheduled, AppointmentStatus::Completed, Some(sale), at)
            .await
            .unwrap();
        assert_eq!(done.unwrap().sale_id, Some(sale));

        let again = store
            .transition(tenant, row.id, AppointmentStatus::Scheduled, AppointmentStatus::Cancelled, None, at)
            .await
            .unwrap();
        assert!(again.is_none());
    }

    #[tokio::test]
    async fn test_other_tenant_cannot_see_appointment() {
        let store = MemoryStore::new();
        let tenant = Uuid::new_v4();
        let at = Utc.with_ymd_and_hms(2030, 1, 8, 10, 0, 0).unwrap();
        let row = store.insert(&appointment(tenant, Uuid::new_v4(), at)).await.unwrap();

        assert!(matches!(
            store.get(Uuid::new_v4(), row.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_duplicate_window_start_is_rejected() {
        let store = MemoryStore::new();
        let tenant = Uuid::new_v4();
        let employee = Uuid::new_v4();
        let nine = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        let noon = NaiveTime::from_hms_opt(12, 0, 0).unwrap();

        store.add_window(tenant, employee, Weekday::Monday, nine, noon).await.unwrap();
        let duplicate = store.add_window(tenant, employee, Weekday::Monday, nine, noon).await;
        assert!(matches!(duplicate, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_inverted_window_is_rejected() {
        let store = MemoryStore::new();
        let nine = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        let noon = NaiveTime::from_hms_opt(12, 0, 0).unwrap();

        for (start, end) in [(noon, nine), (nine, nine)] {
            let window = store
                .add_window(Uuid::new_v4(), Uuid::new_v4(), Weekday::Monday, start, end)
                .await;
            assert!(matches!(window, Err(AppError::InvalidRequest(_))), "{start}-{end}");
        }
    }

    #[tokio::test]
    async fn test_completion_stamps_last_visit_with_the_status() {
        let store = MemoryStore::new();
        let tenant = Uuid::new_v4();
        let at = Utc.with_ymd_and_hms(2030, 1, 8, 10, 0, 0).unwrap();
        let client = store.add_client(tenant, "Ada", None).await;

        let mut booked = appointment(tenant, Uuid::new_v4(), at);
        booked.client_id = Some(client);
        let row = store.insert(&booked).await.unwrap();
        store
            .transition(tenant, row.id, AppointmentStatus::Scheduled, AppointmentStatus::Completed, None, at)
            .await
            .unwrap();
        assert_eq!(store.client_last_visit(tenant, client).await, Some(at));

        // Unknown client: neither the status nor the sale moves
        let mut orphan = appointment(tenant, Uuid::new_v4(), at);
        orphan.client_id = Some(Uuid::new_v4());
        let row = store.insert(&orphan).await.unwrap();
        let err = store
            .transition(
                tenant,
                row.id,
                AppointmentStatus::Scheduled,
                AppointmentStatus::Completed,
                Some(Uuid::new_v4()),
                at,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let unchanged = store.get(tenant, row.id).await.unwrap();
        assert_eq!(unchanged.status, AppointmentStatus::Scheduled);
        assert_eq!(unchanged.sale_id, None);
    }
}
