//! Application layer - Commands, Queries, and Handlers.
//!
//! Orchestrates the pure domain services against the ports. Command
//! handlers (activation, status refresh, payments) write and publish
//! events; query handlers (fee preview, calendar, ledger summary) only read.

mod engine;
pub mod handlers;

pub use engine::{Engine, EnginePorts};

pub use handlers::{
    // Group handlers
    ActivateGroupCommand, ActivateGroupHandler, ActivateGroupResult,
    PreviewFeesHandler, PreviewFeesQuery,
    // Cycle handlers
    GetCalendarHandler, GetCalendarQuery,
    RefreshCycleStatusesCommand, RefreshCycleStatusesHandler, RefreshCycleStatusesResult,
    // Ledger handlers
    GetLedgerSummaryHandler, GetLedgerSummaryQuery, LedgerSummaryView,
    RecordPaymentCommand, RecordPaymentHandler, RecordPaymentResult,
};
