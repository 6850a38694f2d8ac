//! Schedules service (employee working windows)

use std::sync::Arc;

use chrono::NaiveTime;
use uuid::Uuid;

use super::clock::Clock;
use crate::{
    error::{AppError, AppResult},
    models::{
        schedule::{CreateScheduleWindow, NewScheduleWindow, ScheduleWindow},
        user::RequestContext,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct SchedulesService {
    repository: Repository,
    clock: Arc<dyn Clock>,
}

fn parse_time(field: &str, value: &str) -> AppResult<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|_| AppError::InvalidRequest(format!("Invalid {} '{}' (use HH:MM)", field, value)))
}

impl SchedulesService {
    pub fn new(repository: Repository, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    pub async fn list_windows(&self, ctx: RequestContext, employee_id: Uuid) -> AppResult<Vec<ScheduleWindow>> {
        self.repository.schedule_admin.list_for_employee(ctx.tenant_id, employee_id).await
    }

    pub async fn create_window(
        &self,
        ctx: RequestContext,
        employee_id: Uuid,
        data: &CreateScheduleWindow,
    ) -> AppResult<ScheduleWindow> {
        let start_time = parse_time("start_time", &data.start_time)?;
        let end_time = parse_time("end_time", &data.end_time)?;
        if start_time >= end_time {
            return Err(AppError::InvalidRequest(
                "Window start_time must be before end_time".to_string(),
            ));
        }

        let window = NewScheduleWindow {
            employee_id,
            day_of_week: data.day_of_week,
            start_time,
            end_time,
        };
        let created = self
            .repository
            .schedule_admin
            .create_window(ctx.tenant_id, &window, self.clock.now())
            .await?;
        tracing::info!(
            employee_id = %employee_id,
            window = %created.label(),
            day = %created.day_of_week,
            "Schedule window added"
        );
        Ok(created)
    }

    pub async fn delete_window(&self, ctx: RequestContext, id: Uuid) -> AppResult<()> {
        self.repository.schedule_admin.delete_window(ctx.tenant_id, id).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::{
        models::schedule::Weekday,
        repository::{memory::MemoryStore, ScheduleWindowStore},
        services::clock::FixedClock,
    };

    fn service(store: Arc<MemoryStore>) -> SchedulesService {
        SchedulesService::new(
            Repository::in_memory(store),
            Arc::new(FixedClock(Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap())),
        )
    }

    fn data(start: &str, end: &str) -> CreateScheduleWindow {
        CreateScheduleWindow {
            day_of_week: Weekday::Friday,
            start_time: start.to_string(),
            end_time: end.to_string(),
        }
    }

    #[tokio::test]
    async fn test_created_window_is_visible_to_booking() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(store.clone());
        let ctx = RequestContext::new(Uuid::new_v4(), Uuid::new_v4());
        let employee = Uuid::new_v4();

        let window = svc.create_window(ctx, employee, &data("09:30", "13:00")).await.unwrap();
        assert_eq!(window.label(), "09:30-13:00");

        let friday = store.windows_for(ctx.tenant_id, employee, Weekday::Friday).await.unwrap();
        assert_eq!(friday.len(), 1);

        tokio_test::assert_ok!(svc.delete_window(ctx, window.id).await);
        assert!(svc.list_windows(ctx, employee).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rejects_inverted_or_malformed_times() {
        let svc = service(Arc::new(MemoryStore::new()));
        let ctx = RequestContext::new(Uuid::new_v4(), Uuid::new_v4());

        for (start, end) in [("13:00", "09:00"), ("10:00", "10:00"), ("9am", "12:00")] {
            let err = svc.create_window(ctx, Uuid::new_v4(), &data(start, end)).await.unwrap_err();
            assert!(matches!(err, AppError::InvalidRequest(_)), "{start}-{end}");
        }
    }
}
