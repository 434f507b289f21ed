//! Cycle command and query handlers.

// Command handlers
mod refresh_cycle_statuses;

// Query handlers
mod get_calendar;

pub use get_calendar::{GetCalendarHandler, GetCalendarQuery};
pub use refresh_cycle_statuses::{
    RefreshCycleStatusesCommand, RefreshCycleStatusesHandler, RefreshCycleStatusesResult,
};
