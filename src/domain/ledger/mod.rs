//! Ledger domain - contribution and fee records, reconciliation, calendar.

mod calendar;
mod entry;
mod events;
mod reconciler;

pub use calendar::{derive_calendar_events, CalendarEvent, CalendarEventType};
pub use entry::{EntryKind, LedgerEntry};
pub use events::PaymentRecorded;
pub use reconciler::{LedgerReconciler, LedgerSummary, MemberLedgerSummary};
