//! Calendar feed projection

use chrono::Duration;

use crate::models::{
    appointment::{AppointmentDetails, AppointmentStatus},
    calendar::{CalendarEvent, CalendarEventProps},
};

const WALK_IN_TITLE: &str = "Walk-in";

pub fn status_color(status: AppointmentStatus) -> &'static str {
    match status {
        AppointmentStatus::Scheduled => "#3788d8",
        AppointmentStatus::Completed => "#28a745",
        AppointmentStatus::Cancelled => "#dc3545",
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CalendarProjector {
    default_duration: Duration,
}

impl CalendarProjector {
    pub fn new(default_duration: Duration) -> Self {
        Self { default_duration }
    }

    pub fn project(&self, rows: Vec<AppointmentDetails>) -> Vec<CalendarEvent> {
        rows.into_iter().map(|row| self.event(row)).collect()
    }

    fn event(&self, row: AppointmentDetails) -> CalendarEvent {
        let duration = row
            .duration_minutes
            .filter(|m| *m > 0)
            .map(|m| Duration::minutes(i64::from(m)))
            .unwrap_or(self.default_duration);

        CalendarEvent {
            id: row.id,
            title: row.client_name.unwrap_or_else(|| WALK_IN_TITLE.to_string()),
            start: row.date_time,
            end: row.date_time + duration,
            color: status_color(row.status).to_string(),
            extended_props: CalendarEventProps {
                client_phone: row.client_phone,
                stylist_name: row.stylist_name,
                service_name: row.service_name,
                notes: row.description,
                status: row.status,
            },
        }
    }
}
