//! Free slots of a stylist on a date

use std::{
    collections::{BTreeSet, HashSet},
    sync::Arc,
};

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        availability::{Availability, Slot},
        schedule::{ScheduleWindow, Weekday},
    },
    repository::{AppointmentStore, Repository, ScheduleWindowStore, StaffDirectory},
};

/// Candidate start times produced by walking each window in `step` increments.
///
/// A slot is emitted only if it fits entirely before the window end. Slots
/// shared by overlapping windows appear once; output is ascending.
pub fn walk_slots(
    date: NaiveDate,
    windows: &[ScheduleWindow],
    step: Duration,
    offset: FixedOffset,
) -> Vec<DateTime<Utc>> {
    if step <= Duration::zero() {
        return Vec::new();
    }

    let mut starts = BTreeSet::new();
    for window in windows {
        let end = date.and_time(window.end_time);
        let mut cursor = date.and_time(window.start_time);
        while cursor + step <= end {
            starts.insert(to_utc(cursor, offset));
            cursor += step;
        }
    }
    starts.into_iter().collect()
}

fn to_utc(local: NaiveDateTime, offset: FixedOffset) -> DateTime<Utc> {
    Utc.from_utc_datetime(&(local - Duration::seconds(i64::from(offset.local_minus_utc()))))
}

#[derive(Clone)]
pub struct AvailabilityCalculator {
    staff: Arc<dyn StaffDirectory>,
    windows: Arc<dyn ScheduleWindowStore>,
    appointments: Arc<dyn AppointmentStore>,
    step: Duration,
    offset: FixedOffset,
}

impl AvailabilityCalculator {
    pub fn new(repository: &Repository, step: Duration, offset: FixedOffset) -> Self {
        Self {
            staff: repository.staff.clone(),
            windows: repository.schedule_windows.clone(),
            appointments: repository.appointments.clone(),
            step,
            offset,
        }
    }

    pub async fn for_date(&self, tenant_id: Uuid, stylist_id: Uuid, date: NaiveDate) -> AppResult<Availability> {
        let profile = self.staff.stylist_profile(tenant_id, stylist_id).await?;
        let employee_id = profile
            .employee_id
            .ok_or(AppError::EmployeeProfileMissing { stylist_id })?;

        let weekday = Weekday::from(date.weekday());
        let windows = self.windows.windows_for(tenant_id, employee_id, weekday).await?;
        if windows.is_empty() {
            return Ok(Availability {
                stylist_id,
                date,
                weekday,
                slots: Vec::new(),
                message: Some(format!("Stylist does not work on {}", weekday)),
            });
        }

        let candidates = walk_slots(date, &windows, self.step, self.offset);
        let day_start = to_utc(date.and_time(NaiveTime::default()), self.offset);
        let taken: HashSet<DateTime<Utc>> = self
            .appointments
            .occupied_between(tenant_id, stylist_id, day_start, day_start + Duration::days(1))
            .await?
            .into_iter()
            .collect();

        let slots: Vec<Slot> = candidates
            .into_iter()
            .filter(|start| !taken.contains(start))
            .map(|date_time| Slot {
                date_time,
                available: true,
            })
            .collect();

        tracing::debug!(
            stylist_id = %stylist_id,
            date = %date,
            free = slots.len(),
            taken = taken.len(),
            "Computed availability"
        );

        Ok(Availability {
            stylist_id,
            date,
            weekday,
            slots,
            message: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::appointment::{Appointment, AppointmentStatus};
    use crate::repository::memory::MemoryStore;

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn window(start: NaiveTime, end: NaiveTime) -> ScheduleWindow {
        ScheduleWindow {
            id: Uuid::new_v4(),
            tenant_id: Uuid::nil(),
            employee_id: Uuid::nil(),
            day_of_week: Weekday::Monday,
            start_time: start,
            end_time: end,
            created_at: Utc::now(),
        }
    }

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2030, 1, 7).unwrap()
    }

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    #[test]
    fn test_walk_full_day() {
        let slots = walk_slots(monday(), &[window(hm(9, 0), hm(18, 0))], Duration::minutes(30), utc());
        assert_eq!(slots.len(), 18);
        assert_eq!(slots[0], Utc.with_ymd_and_hms(2030, 1, 7, 9, 0, 0).unwrap());
        assert_eq!(slots[17], Utc.with_ymd_and_hms(2030, 1, 7, 17, 30, 0).unwrap());
    }

    #[test]
    fn test_partial_tail_is_dropped() {
        let slots = walk_slots(monday(), &[window(hm(9, 0), hm(10, 45))], Duration::minutes(30), utc());
        let times: Vec<_> = slots.iter().map(|s| s.time()).collect();
        assert_eq!(times, vec![hm(9, 0), hm(9, 30), hm(10, 0)]);
    }

    #[test]
    fn test_overlapping_windows_are_merged() {
        let windows = [window(hm(11, 0), hm(13, 0)), window(hm(9, 0), hm(12, 0))];
        let slots = walk_slots(monday(), &windows, Duration::minutes(60), utc());
        let times: Vec<_> = slots.iter().map(|s| s.time()).collect();
        assert_eq!(times, vec![hm(9, 0), hm(10, 0), hm(11, 0), hm(12, 0)]);
    }

    #[test]
    fn test_zero_step_yields_nothing() {
        assert!(walk_slots(monday(), &[window(hm(9, 0), hm(10, 0))], Duration::zero(), utc()).is_empty());
    }

    #[test]
    fn test_offset_shifts_to_utc() {
        let plus_one = FixedOffset::east_opt(3600).unwrap();
        let slots = walk_slots(monday(), &[window(hm(9, 0), hm(10, 0))], Duration::minutes(30), plus_one);
        assert_eq!(slots[0], Utc.with_ymd_and_hms(2030, 1, 7, 8, 0, 0).unwrap());
    }

    async fn calculator() -> (Arc<MemoryStore>, AvailabilityCalculator, Uuid, Uuid) {
        let store = Arc::new(MemoryStore::new());
        let tenant = Uuid::new_v4();
        let profile = store.add_stylist(tenant, "Jo", true).await;
        store
            .add_window(tenant, profile.employee_id.unwrap(), Weekday::Monday, hm(9, 0), hm(11, 0))
            .await
            .unwrap();
        let calc = AvailabilityCalculator::new(&Repository::in_memory(store.clone()), Duration::minutes(30), utc());
        (store, calc, tenant, profile.stylist_id)
    }

    #[tokio::test]
    async fn test_taken_and_completed_slots_are_excluded() {
        let (store, calc, tenant, stylist) = calculator().await;
        for (h, m, status) in [
            (9, 30, AppointmentStatus::Scheduled),
            (10, 0, AppointmentStatus::Completed),
            (10, 30, AppointmentStatus::Cancelled),
        ] {
            let at = Utc.with_ymd_and_hms(2030, 1, 7, h, m, 0).unwrap();
            store
                .insert(&Appointment {
                    id: Uuid::new_v4(),
                    tenant_id: tenant,
                    client_id: None,
                    stylist_id: stylist,
                    service_id: None,
                    role_id: None,
                    status,
                    date_time: at,
                    description: String::new(),
                    sale_id: None,
                    created_at: at,
                    updated_at: at,
                })
                .await
                .unwrap();
        }

        let availability = calc.for_date(tenant, stylist, monday()).await.unwrap();
        let times: Vec<_> = availability.slots.iter().map(|s| s.date_time.time()).collect();
        assert_eq!(times, vec![hm(9, 0), hm(10, 30)]);
        assert!(availability.slots.iter().all(|s| s.available));
        assert!(availability.message.is_none());
    }

    #[tokio::test]
    async fn test_day_off_returns_message() {
        let (_store, calc, tenant, stylist) = calculator().await;
        let tuesday = NaiveDate::from_ymd_opt(2030, 1, 8).unwrap();
        let availability = calc.for_date(tenant, stylist, tuesday).await.unwrap();
        assert!(availability.slots.is_empty());
        assert_eq!(availability.message.as_deref(), Some("Stylist does not work on tuesday"));
    }

    #[tokio::test]
    async fn test_missing_profile_is_an_error() {
        let (store, calc, tenant, _) = calculator().await;
        let bare = store.add_stylist(tenant, "Sam", false).await;
        let err = calc.for_date(tenant, bare.stylist_id, monday()).await.unwrap_err();
        assert!(matches!(err, AppError::EmployeeProfileMissing { .. }));
    }
}
