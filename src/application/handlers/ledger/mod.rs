//! Ledger command and query handlers.

// Command handlers
mod record_payment;

// Query handlers
mod get_ledger_summary;

pub use get_ledger_summary::{GetLedgerSummaryHandler, GetLedgerSummaryQuery, LedgerSummaryView};
pub use record_payment::{RecordPaymentCommand, RecordPaymentHandler, RecordPaymentResult};
