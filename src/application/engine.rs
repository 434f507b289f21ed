//! Engine - every handler wired from one set of ports and `EngineConfig`.

use std::sync::Arc;

use crate::config::{EngineConfig, ValidationError};
use crate::ports::{CycleRepository, EventPublisher, GroupRepository, LedgerRepository, MemberReader};

use super::handlers::{
    ActivateGroupHandler, GetCalendarHandler, GetLedgerSummaryHandler, PreviewFeesHandler,
    RecordPaymentHandler, RefreshCycleStatusesHandler,
};

/// Collaborators shared by all handlers.
#[derive(Clone)]
pub struct EnginePorts {
    pub groups: Arc<dyn GroupRepository>,
    pub members: Arc<dyn MemberReader>,
    pub cycles: Arc<dyn CycleRepository>,
    pub ledger: Arc<dyn LedgerRepository>,
    pub events: Arc<dyn EventPublisher>,
}

/// Configured command and query handlers.
pub struct Engine {
    pub activate_group: ActivateGroupHandler,
    pub preview_fees: PreviewFeesHandler,
    pub refresh_cycle_statuses: RefreshCycleStatusesHandler,
    pub record_payment: RecordPaymentHandler,
    pub get_calendar: GetCalendarHandler,
    pub get_ledger_summary: GetLedgerSummaryHandler,
}

impl Engine {
    /// Applies fee bounds, lottery seed, grace period and payout delay.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` when the configured fee bounds are invalid.
    pub fn new(
        ports: EnginePorts,
        config: &EngineConfig,
        is_production: bool,
    ) -> Result<Self, ValidationError> {
        let fee_bounds = config.fee_bounds()?;

        Ok(Self {
            activate_group: ActivateGroupHandler::new(
                ports.groups.clone(),
                ports.members.clone(),
                ports.cycles.clone(),
                ports.ledger.clone(),
                ports.events.clone(),
            )
            .with_fee_bounds(fee_bounds)
            .with_lottery_seed(config.lottery_seed(is_production)),
            preview_fees: PreviewFeesHandler::new(ports.groups.clone(), fee_bounds),
            refresh_cycle_statuses: RefreshCycleStatusesHandler::new(
                ports.groups.clone(),
                ports.members.clone(),
                ports.cycles.clone(),
                ports.ledger.clone(),
                ports.events.clone(),
            )
            .with_grace_days(config.grace_period_days),
            record_payment: RecordPaymentHandler::new(ports.ledger.clone(), ports.events.clone()),
            get_calendar: GetCalendarHandler::new(
                ports.groups.clone(),
                ports.members.clone(),
                ports.cycles.clone(),
                ports.ledger.clone(),
            )
            .with_payout_delay_days(config.payout_delay_days),
            get_ledger_summary: GetLedgerSummaryHandler::new(ports.groups, ports.ledger),
        })
    }
}
