//! GetLedgerSummaryHandler - Query handler for paid/unpaid totals.
//!
//! Group-wide by default; scoped to one member when `member_id` is set.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::domain::foundation::{GroupId, MemberId};
use crate::domain::group::EngineError;
use crate::domain::ledger::{EntryKind, LedgerEntry, LedgerReconciler, LedgerSummary, MemberLedgerSummary};
use crate::ports::{GroupRepository, LedgerRepository};

#[derive(Debug, Clone)]
pub struct GetLedgerSummaryQuery {
    pub group_id: GroupId,
    pub member_id: Option<MemberId>,
}

/// Totals plus per-member and per-kind breakdowns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerSummaryView {
    pub totals: LedgerSummary,
    pub by_member: Vec<MemberLedgerSummary>,
    pub by_kind: BTreeMap<EntryKind, LedgerSummary>,
}

pub struct GetLedgerSummaryHandler {
    group_repository: Arc<dyn GroupRepository>,
    ledger_repository: Arc<dyn LedgerRepository>,
}

impl GetLedgerSummaryHandler {
    pub fn new(
        group_repository: Arc<dyn GroupRepository>,
        ledger_repository: Arc<dyn LedgerRepository>,
    ) -> Self {
        Self {
            group_repository,
            ledger_repository,
        }
    }

    pub async fn handle(&self, query: GetLedgerSummaryQuery) -> Result<LedgerSummaryView, EngineError> {
        if self.group_repository.find_by_id(&query.group_id).await?.is_none() {
            return Err(EngineError::GroupNotFound(query.group_id));
        }

        let entries: Vec<LedgerEntry> = match query.member_id {
            Some(member_id) => self
                .ledger_repository
                .find_by_member(&member_id)
                .await?
                .into_iter()
                .filter(|e| e.group_id == query.group_id)
                .collect(),
            None => self.ledger_repository.find_by_group(&query.group_id).await?,
        };

        Ok(LedgerSummaryView {
            totals: LedgerReconciler::reconcile(&entries),
            by_member: LedgerReconciler::summarize_by_member(&entries),
            by_kind: LedgerReconciler::summarize_by_kind(&entries),
        })
    }
}
