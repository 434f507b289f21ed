//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

mod contributions;
pub mod cycle;
pub mod group;
pub mod ledger;

pub use cycle::{
    GetCalendarHandler, GetCalendarQuery, RefreshCycleStatusesCommand,
    RefreshCycleStatusesHandler, RefreshCycleStatusesResult,
};
pub use group::{
    ActivateGroupCommand, ActivateGroupHandler, ActivateGroupResult, PreviewFeesHandler,
    PreviewFeesQuery,
};
pub use ledger::{
    GetLedgerSummaryHandler, GetLedgerSummaryQuery, LedgerSummaryView, RecordPaymentCommand,
    RecordPaymentHandler, RecordPaymentResult,
};
