//! Data models for the booking domain

pub mod appointment;
pub mod availability;
pub mod calendar;
pub mod schedule;
pub mod staff;
pub mod user;

pub use appointment::{Appointment, AppointmentStatus};
pub use availability::{Availability, Slot};
pub use calendar::CalendarEvent;
pub use schedule::{ScheduleWindow, Weekday};
pub use user::{RequestContext, UserClaims};
