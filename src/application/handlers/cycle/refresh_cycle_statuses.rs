//! RefreshCycleStatusesHandler - the periodic status sweep for one group.
//!
//! Evaluates every cycle against `today` and the contribution ledger,
//! persists each single status step, opens contribution entries for open
//! cycles, and completes the group once its last cycle completes.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::domain::cycle::{CycleProgression, CycleStatus, CycleStatusChanged, StatusChange};
use crate::domain::foundation::{
    CommandMetadata, CycleId, EventEnvelope, EventId, GroupId, SerializableDomainEvent, Timestamp,
};
use crate::domain::group::{EngineError, GroupCompleted, GroupStatus};
use crate::domain::ledger::LedgerReconciler;
use crate::domain::payout::FeeCalculator;
use crate::ports::{CycleRepository, EventPublisher, GroupRepository, LedgerRepository, MemberReader};

use super::super::contributions::open_contributions;

/// Command to refresh one group's cycle statuses.
#[derive(Debug, Clone)]
pub struct RefreshCycleStatusesCommand {
    pub group_id: GroupId,
    pub today: NaiveDate,
}

/// What a refresh changed.
#[derive(Debug, Clone, Default)]
pub struct RefreshCycleStatusesResult {
    /// Applied steps, in application order.
    pub changes: Vec<StatusChange>,
    pub opened_entries: usize,
    pub group_completed: bool,
}

impl RefreshCycleStatusesResult {
    pub fn is_noop(&self) -> bool {
        self.changes.is_empty() && self.opened_entries == 0 && !self.group_completed
    }
}

pub struct RefreshCycleStatusesHandler {
    group_repository: Arc<dyn GroupRepository>,
    member_reader: Arc<dyn MemberReader>,
    cycle_repository: Arc<dyn CycleRepository>,
    ledger_repository: Arc<dyn LedgerRepository>,
    event_publisher: Arc<dyn EventPublisher>,
    grace_days: u32,
}

impl RefreshCycleStatusesHandler {
    pub fn new(
        group_repository: Arc<dyn GroupRepository>,
        member_reader: Arc<dyn MemberReader>,
        cycle_repository: Arc<dyn CycleRepository>,
        ledger_repository: Arc<dyn LedgerRepository>,
        event_publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            group_repository,
            member_reader,
            cycle_repository,
            ledger_repository,
            event_publisher,
            grace_days: 3,
        }
    }

    pub fn with_grace_days(mut self, days: u32) -> Self {
        self.grace_days = days;
        self
    }

    pub async fn handle(
        &self,
        cmd: RefreshCycleStatusesCommand,
        metadata: CommandMetadata,
    ) -> Result<RefreshCycleStatusesResult, EngineError> {
        let mut group = self
            .group_repository
            .find_by_id(&cmd.group_id)
            .await?
            .ok_or(EngineError::GroupNotFound(cmd.group_id))?;

        if group.status() != GroupStatus::Active {
            tracing::debug!("Group {} is {}, nothing to refresh", cmd.group_id, group.status());
            return Ok(RefreshCycleStatusesResult::default());
        }

        let mut cycles = self.cycle_repository.find_by_group(&cmd.group_id).await?;
        if cycles.is_empty() {
            return Ok(RefreshCycleStatusesResult::default());
        }

        // Funding is measured against the pool fixed at activation.
        let fees = FeeCalculator::breakdown(
            group.contribution_amount(),
            group.members_limit(),
            &group.fee_policy(),
        )?;
        let entries = self.ledger_repository.find_by_group(&cmd.group_id).await?;
        let funded = LedgerReconciler::funded_cycles(&entries, fees.gross_pool);

        let changes =
            CycleProgression::advance_schedule(&cycles, cmd.today, &funded, self.grace_days);
        tracing::debug!(
            "Evaluated group {} on {}: {} steps, {} funded cycles",
            cmd.group_id,
            cmd.today,
            changes.len(),
            funded.len()
        );

        // Apply each step in order.
        let index: HashMap<CycleId, usize> =
            cycles.iter().enumerate().map(|(i, c)| (c.id, i)).collect();
        let mut envelopes: Vec<EventEnvelope> = Vec::with_capacity(changes.len() + 1);
        for change in &changes {
            let Some(&position) = index.get(&change.cycle_id) else {
                continue;
            };
            let cycle = &mut cycles[position];
            cycle.transition_to(change.to)?;
            self.cycle_repository
                .update_status(&change.cycle_id, change.to)
                .await?;

            tracing::info!(
                group_id = %cmd.group_id,
                cycle_number = change.cycle_number,
                from = %change.from,
                to = %change.to,
                "cycle status changed"
            );
            let event = CycleStatusChanged {
                event_id: EventId::new(),
                cycle_id: change.cycle_id,
                group_id: cmd.group_id,
                cycle_number: change.cycle_number,
                from: change.from,
                to: change.to,
                occurred_at: Timestamp::now(),
            };
            envelopes.push(metadata.stamp(event.to_envelope()?));
        }

        // Every started, unfinished cycle has a contribution entry per active
        // member, including one that skipped straight to missed.
        let mut opened_entries = 0;
        let open: Vec<_> = cycles
            .iter()
            .filter(|c| matches!(c.status, CycleStatus::Open | CycleStatus::Missed))
            .collect();
        if !open.is_empty() {
            let members = self.member_reader.find_active_by_group(&cmd.group_id).await?;
            for cycle in open {
                opened_entries +=
                    open_contributions(self.ledger_repository.as_ref(), &group, cycle, &members)
                        .await?;
            }
        }

        let group_completed = cycles.iter().all(|c| c.status == CycleStatus::Completed);
        if group_completed {
            group.complete()?;
            self.group_repository.update(&group).await?;
            tracing::info!("Group {} completed", cmd.group_id);

            let event = GroupCompleted {
                event_id: EventId::new(),
                group_id: cmd.group_id,
                occurred_at: Timestamp::now(),
            };
            envelopes.push(metadata.stamp(event.to_envelope()?));
        }

        if !envelopes.is_empty() {
            self.event_publisher.publish_all(envelopes).await?;
        }

        Ok(RefreshCycleStatusesResult {
            changes,
            opened_entries,
            group_completed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::group::{ActivateGroupCommand, ActivateGroupHandler};
    use crate::application::handlers::test_support::Fixture;
    use crate::domain::foundation::Money;
    use crate::domain::group::{test_support as group_support, Group, GroupTerms};
    use crate::domain::ledger::{EntryKind, LedgerEntry};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn activated(member_count: usize) -> Fixture {
        let fixture = Fixture::seeded(member_count).await;
        ActivateGroupHandler::new(
            fixture.groups.clone(),
            fixture.members.clone(),
            fixture.cycles.clone(),
            fixture.ledger.clone(),
            fixture.bus.clone(),
        )
        .handle(
            ActivateGroupCommand {
                group_id: fixture.group.id(),
                assignment: None,
                today: date(2025, 2, 1),
            },
            CommandMetadata::test_fixture(),
        )
        .await
        .unwrap();
        fixture.bus.clear();
        fixture
    }

    fn handler(fixture: &Fixture) -> RefreshCycleStatusesHandler {
        RefreshCycleStatusesHandler::new(
            fixture.groups.clone(),
            fixture.members.clone(),
            fixture.cycles.clone(),
            fixture.ledger.clone(),
            fixture.bus.clone(),
        )
    }

    async fn refresh(fixture: &Fixture, today: NaiveDate) -> RefreshCycleStatusesResult {
        handler(fixture)
            .handle(
                RefreshCycleStatusesCommand {
                    group_id: fixture.group.id(),
                    today,
                },
                CommandMetadata::system("sweep"),
            )
            .await
            .unwrap()
    }

    async fn pay_cycle(fixture: &Fixture, cycle_number: u32) {
        let entries = fixture.ledger.find_by_group(&fixture.group.id()).await.unwrap();
        for mut entry in entries
            .into_iter()
            .filter(|e| e.cycle_number == cycle_number && e.kind == EntryKind::Contribution)
        {
            let (due, read) = (entry.outstanding(), entry.amount_paid);
            entry.record_payment(due, Timestamp::now()).unwrap();
            fixture.ledger.update(&entry, read).await.unwrap();
        }
    }

    async fn statuses(fixture: &Fixture) -> Vec<CycleStatus> {
        fixture
            .cycles
            .find_by_group(&fixture.group.id())
            .await
            .unwrap()
            .iter()
            .map(|c| c.status)
            .collect()
    }

    #[tokio::test]
    async fn rate_above_default_bounds_still_progresses() {
        // 25% was accepted at activation; the handler's defaults cap at 20%
        let fixture = Fixture::activated_with_fee(25, date(2025, 2, 1)).await;

        let opened = refresh(&fixture, date(2025, 3, 1)).await;
        assert_eq!(opened.changes[0].to, CycleStatus::Open);
        assert_eq!(opened.opened_entries, 10);

        pay_cycle(&fixture, 1).await;
        refresh(&fixture, date(2025, 3, 2)).await;

        assert_eq!(statuses(&fixture).await[0], CycleStatus::Completed);
    }

    #[tokio::test]
    async fn nothing_changes_before_first_due_date() {
        let fixture = activated(10).await;

        let result = refresh(&fixture, date(2025, 2, 28)).await;

        assert!(result.is_noop());
        assert_eq!(fixture.bus.event_count(), 0);
    }

    #[tokio::test]
    async fn due_cycle_opens_with_contribution_entries() {
        let fixture = activated(10).await;

        let result = refresh(&fixture, date(2025, 3, 1)).await;

        assert_eq!(result.changes.len(), 1);
        assert_eq!(result.changes[0].to, CycleStatus::Open);
        assert_eq!(result.opened_entries, 10);
        assert_eq!(statuses(&fixture).await[0], CycleStatus::Open);
        assert_eq!(fixture.bus.events_of_type("cycle.status_changed.v1").len(), 1);
    }

    #[tokio::test]
    async fn repeated_refresh_is_idempotent() {
        let fixture = activated(10).await;
        refresh(&fixture, date(2025, 3, 1)).await;

        let again = refresh(&fixture, date(2025, 3, 1)).await;

        assert!(again.is_noop());
        assert_eq!(
            fixture.ledger.find_by_group(&fixture.group.id()).await.unwrap().len(),
            10
        );
    }

    #[tokio::test]
    async fn funded_cycle_completes_and_next_one_opens_when_due() {
        let fixture = activated(10).await;
        refresh(&fixture, date(2025, 3, 1)).await;
        pay_cycle(&fixture, 1).await;

        let result = refresh(&fixture, date(2025, 4, 1)).await;

        let steps: Vec<(u32, CycleStatus)> =
            result.changes.iter().map(|c| (c.cycle_number, c.to)).collect();
        assert_eq!(
            steps,
            vec![(1, CycleStatus::Completed), (2, CycleStatus::Open)]
        );
        let current = statuses(&fixture).await;
        assert_eq!(current[0], CycleStatus::Completed);
        assert_eq!(current[1], CycleStatus::Open);
        assert_eq!(current[2], CycleStatus::Upcoming);
    }

    #[tokio::test]
    async fn unfunded_cycle_is_missed_after_grace_period() {
        let fixture = activated(10).await;
        refresh(&fixture, date(2025, 3, 1)).await;

        let within_grace = refresh(&fixture, date(2025, 3, 3)).await;
        let after_grace = refresh(&fixture, date(2025, 3, 4)).await;

        assert!(within_grace.changes.is_empty());
        assert_eq!(after_grace.changes.len(), 1);
        assert_eq!(after_grace.changes[0].to, CycleStatus::Missed);
    }

    #[tokio::test]
    async fn missed_cycle_completes_once_paid_late() {
        let fixture = activated(10).await;
        refresh(&fixture, date(2025, 3, 1)).await;
        refresh(&fixture, date(2025, 3, 10)).await;
        pay_cycle(&fixture, 1).await;

        let result = refresh(&fixture, date(2025, 3, 11)).await;

        assert_eq!(result.changes.len(), 1);
        assert_eq!(result.changes[0].from, CycleStatus::Missed);
        assert_eq!(result.changes[0].to, CycleStatus::Completed);
    }

    #[tokio::test]
    async fn last_completed_cycle_completes_group() {
        let terms = GroupTerms {
            members_limit: 2,
            ..group_support::terms()
        };
        let fixture = Fixture::with_group(Group::create(GroupId::new(), terms).unwrap(), 2).await;
        ActivateGroupHandler::new(
            fixture.groups.clone(),
            fixture.members.clone(),
            fixture.cycles.clone(),
            fixture.ledger.clone(),
            fixture.bus.clone(),
        )
        .handle(
            ActivateGroupCommand {
                group_id: fixture.group.id(),
                assignment: None,
                today: date(2025, 3, 1),
            },
            CommandMetadata::test_fixture(),
        )
        .await
        .unwrap();

        pay_cycle(&fixture, 1).await;
        let midway = refresh(&fixture, date(2025, 4, 1)).await;
        pay_cycle(&fixture, 2).await;
        let result = refresh(&fixture, date(2025, 4, 2)).await;

        assert!(!midway.group_completed);
        assert_eq!(midway.opened_entries, 2);
        assert!(result.group_completed);
        let stored = fixture.groups.find_by_id(&fixture.group.id()).await.unwrap().unwrap();
        assert_eq!(stored.status(), GroupStatus::Completed);
        assert!(fixture.bus.has_event("group.completed.v1"));
    }

    #[tokio::test]
    async fn late_sweep_still_opens_entries_for_missed_cycle() {
        let fixture = activated(10).await;

        let result = refresh(&fixture, date(2025, 3, 20)).await;

        let steps: Vec<CycleStatus> = result.changes.iter().map(|c| c.to).collect();
        assert_eq!(steps, vec![CycleStatus::Open, CycleStatus::Missed]);
        assert_eq!(result.opened_entries, 10);
    }

    #[tokio::test]
    async fn forming_group_is_left_alone() {
        let fixture = Fixture::seeded(10).await;

        let result = refresh(&fixture, date(2025, 6, 1)).await;

        assert!(result.is_noop());
    }

    #[tokio::test]
    async fn partial_funding_does_not_complete() {
        let fixture = activated(10).await;
        refresh(&fixture, date(2025, 3, 1)).await;
        let mut entry: LedgerEntry = fixture
            .ledger
            .find_by_group(&fixture.group.id())
            .await
            .unwrap()
            .remove(0);
        entry.record_payment(Money::from_minor(1000), Timestamp::now()).unwrap();
        fixture.ledger.update(&entry, Money::ZERO).await.unwrap();

        let result = refresh(&fixture, date(2025, 3, 2)).await;

        assert!(result.changes.is_empty());
    }
}
