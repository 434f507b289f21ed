//! ActivateGroupHandler - Command handler for activating a forming group.
//!
//! Activation generates the full cycle schedule once: fees are fixed, the
//! payout order is drawn, due dates are stepped from the start date. The
//! schedule write is the serialization point between concurrent
//! activations; whoever loses sees `AlreadyGenerated`.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::domain::cycle::{CycleGenerator, CycleStatus, GeneratedSchedule};
use crate::domain::foundation::{
    CommandMetadata, EventId, GroupId, SerializableDomainEvent, Timestamp,
};
use crate::domain::group::{EngineError, FeeBounds, Group, GroupActivated};
use crate::domain::payout::{LotterySeed, OrganizerAssignment};
use crate::ports::{CycleRepository, EventPublisher, GroupRepository, LedgerRepository, MemberReader};

use super::super::contributions::open_contributions;

/// Command to activate a group.
#[derive(Debug, Clone)]
pub struct ActivateGroupCommand {
    pub group_id: GroupId,
    /// Required when the group uses organizer-assigned ordering.
    pub assignment: Option<OrganizerAssignment>,
    /// Calendar day the activation happens on.
    pub today: NaiveDate,
}

/// Result of a successful activation.
#[derive(Debug, Clone)]
pub struct ActivateGroupResult {
    pub group: Group,
    pub schedule: GeneratedSchedule,
    /// Contribution entries opened because cycle 1 was already due.
    pub opened_entries: usize,
    pub event: GroupActivated,
}

/// Handler for group activation.
pub struct ActivateGroupHandler {
    group_repository: Arc<dyn GroupRepository>,
    member_reader: Arc<dyn MemberReader>,
    cycle_repository: Arc<dyn CycleRepository>,
    ledger_repository: Arc<dyn LedgerRepository>,
    event_publisher: Arc<dyn EventPublisher>,
    fee_bounds: FeeBounds,
    lottery_seed: LotterySeed,
}

impl ActivateGroupHandler {
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
            fee_bounds: FeeBounds::default(),
            lottery_seed: LotterySeed::Entropy,
        }
    }

    pub fn with_fee_bounds(mut self, bounds: FeeBounds) -> Self {
        self.fee_bounds = bounds;
        self
    }

    pub fn with_lottery_seed(mut self, seed: LotterySeed) -> Self {
        self.lottery_seed = seed;
        self
    }

    pub async fn handle(
        &self,
        cmd: ActivateGroupCommand,
        metadata: CommandMetadata,
    ) -> Result<ActivateGroupResult, EngineError> {
        let result = self.activate(cmd, &metadata).await;
        if let Err(err) = &result {
            tracing::warn!(
                error = %err,
                code = %err.code(),
                correlation_id = metadata.correlation_id(),
                "group activation refused"
            );
        }
        result
    }

    async fn activate(
        &self,
        cmd: ActivateGroupCommand,
        metadata: &CommandMetadata,
    ) -> Result<ActivateGroupResult, EngineError> {
        // 1. Load the group
        let mut group = self
            .group_repository
            .find_by_id(&cmd.group_id)
            .await?
            .ok_or(EngineError::GroupNotFound(cmd.group_id))?;

        // 2. A schedule is generated at most once
        if self.cycle_repository.exists_for_group(&cmd.group_id).await? {
            return Err(EngineError::AlreadyGenerated(cmd.group_id));
        }

        // 3. Generate against the active roster
        let members = self.member_reader.find_active_by_group(&cmd.group_id).await?;
        let schedule = CycleGenerator::generate(
            &group,
            &members,
            cmd.assignment.as_ref(),
            self.lottery_seed,
            cmd.today,
            &self.fee_bounds,
        )?;
        group.activate()?;

        // 4. Persist the schedule, then the group
        self.cycle_repository
            .create_schedule(&cmd.group_id, &schedule.cycles)
            .await?;
        if let Err(err) = self.group_repository.update(&group).await {
            self.cycle_repository.delete_schedule(&cmd.group_id).await?;
            return Err(err.into());
        }

        tracing::info!(
            group_id = %cmd.group_id,
            cycles = schedule.cycles.len(),
            method = %group.payout_order_method(),
            net_payout = %schedule.fees.net_payout,
            "group activated"
        );

        // 5. Cycle 1 may already be due
        let mut opened_entries = 0;
        if let Some(first) = schedule.cycles.first().filter(|c| c.status == CycleStatus::Open) {
            opened_entries =
                open_contributions(self.ledger_repository.as_ref(), &group, first, &members).await?;
        }

        // 6. Publish
        let event = GroupActivated {
            event_id: EventId::new(),
            group_id: cmd.group_id,
            cycle_count: u32::try_from(schedule.cycles.len()).unwrap_or(u32::MAX),
            payout_order_method: group.payout_order_method(),
            lottery_seed: schedule.order.lottery_seed,
            gross_pool: schedule.fees.gross_pool,
            fee_amount: schedule.fees.fee_amount,
            net_payout: schedule.fees.net_payout,
            first_due_date: schedule.first_due_date().unwrap_or(cmd.today),
            last_due_date: schedule.last_due_date().unwrap_or(cmd.today),
            occurred_at: Timestamp::now(),
        };
        self.event_publisher
            .publish(metadata.stamp(event.to_envelope()?))
            .await?;

        Ok(ActivateGroupResult {
            group,
            schedule,
            opened_entries,
            event,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_support::Fixture;
    use crate::domain::foundation::{DomainError, ErrorCode, UserId};
    use crate::domain::group::{GroupStatus, Member, MemberRole, PayoutOrderMethod};
    use async_trait::async_trait;
    use std::collections::HashSet;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn command(fixture: &Fixture, today: NaiveDate) -> ActivateGroupCommand {
        ActivateGroupCommand {
            group_id: fixture.group.id(),
            assignment: None,
            today,
        }
    }

    fn handler(fixture: &Fixture) -> ActivateGroupHandler {
        ActivateGroupHandler::new(
            fixture.groups.clone(),
            fixture.members.clone(),
            fixture.cycles.clone(),
            fixture.ledger.clone(),
            fixture.bus.clone(),
        )
    }

    /// Group repository whose writes always fail.
    struct FailingGroupWrites {
        group: Group,
    }

    #[async_trait]
    impl GroupRepository for FailingGroupWrites {
        async fn find_by_id(&self, id: &GroupId) -> Result<Option<Group>, DomainError> {
            Ok((self.group.id() == *id).then(|| self.group.clone()))
        }

        async fn update(&self, _group: &Group) -> Result<(), DomainError> {
            Err(DomainError::new(ErrorCode::DatabaseError, "Simulated update failure"))
        }

        async fn find_active(&self) -> Result<Vec<Group>, DomainError> {
            Ok(vec![])
        }
    }

    #[tokio::test]
    async fn activates_group_and_generates_full_schedule() {
        let fixture = Fixture::seeded(10).await;

        let result = handler(&fixture)
            .handle(command(&fixture, date(2025, 2, 1)), CommandMetadata::test_fixture())
            .await
            .unwrap();

        assert_eq!(result.group.status(), GroupStatus::Active);
        assert_eq!(result.schedule.cycles.len(), 10);
        assert_eq!(result.event.first_due_date, date(2025, 3, 1));
        assert_eq!(result.event.last_due_date, date(2025, 12, 1));
        assert_eq!(result.event.net_payout.minor_units(), 9500);
        assert_eq!(result.opened_entries, 0);

        let stored = fixture.groups.find_by_id(&fixture.group.id()).await.unwrap().unwrap();
        assert_eq!(stored.status(), GroupStatus::Active);
        assert_eq!(fixture.cycles.find_by_group(&fixture.group.id()).await.unwrap().len(), 10);
    }

    #[tokio::test]
    async fn publishes_stamped_activation_event() {
        let fixture = Fixture::seeded(10).await;

        handler(&fixture)
            .handle(command(&fixture, date(2025, 2, 1)), CommandMetadata::test_fixture())
            .await
            .unwrap();

        let events = fixture.bus.events_of_type("group.activated.v1");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].aggregate_id, fixture.group.id().to_string());
        assert_eq!(
            events[0].metadata.correlation_id.as_deref(),
            Some("test-correlation-id")
        );
    }

    #[tokio::test]
    async fn fixed_order_follows_join_order() {
        let fixture = Fixture::seeded(10).await;

        let result = handler(&fixture)
            .handle(command(&fixture, date(2025, 2, 1)), CommandMetadata::test_fixture())
            .await
            .unwrap();

        let payout_users: Vec<&str> = result
            .schedule
            .cycles
            .iter()
            .map(|c| c.payout_user_id.as_str())
            .collect();
        let joined: Vec<&str> = fixture.roster.iter().map(|m| m.user_id.as_str()).collect();
        assert_eq!(payout_users, joined);
    }

    #[tokio::test]
    async fn due_first_cycle_opens_contributions() {
        let fixture = Fixture::seeded(10).await;

        let result = handler(&fixture)
            .handle(command(&fixture, date(2025, 3, 1)), CommandMetadata::test_fixture())
            .await
            .unwrap();

        assert_eq!(result.schedule.cycles[0].status, CycleStatus::Open);
        assert_eq!(result.opened_entries, 10);
        let entries = fixture.ledger.find_by_group(&fixture.group.id()).await.unwrap();
        assert!(entries.iter().all(|e| e.cycle_number == 1));
    }

    #[tokio::test]
    async fn second_activation_is_already_generated_and_keeps_first_schedule() {
        let fixture = Fixture::seeded(10).await;
        let handler = handler(&fixture);

        handler
            .handle(command(&fixture, date(2025, 2, 1)), CommandMetadata::test_fixture())
            .await
            .unwrap();
        let first = fixture.cycles.find_by_group(&fixture.group.id()).await.unwrap();

        let err = handler
            .handle(command(&fixture, date(2025, 2, 1)), CommandMetadata::test_fixture())
            .await
            .unwrap_err();

        assert_eq!(err, EngineError::AlreadyGenerated(fixture.group.id()));
        assert!(err.is_benign());
        assert_eq!(fixture.cycles.find_by_group(&fixture.group.id()).await.unwrap(), first);
        assert_eq!(fixture.bus.events_of_type("group.activated.v1").len(), 1);
    }

    #[tokio::test]
    async fn short_roster_leaves_group_forming_without_cycles() {
        let fixture = Fixture::seeded(9).await;

        let err = handler(&fixture)
            .handle(command(&fixture, date(2025, 2, 1)), CommandMetadata::test_fixture())
            .await
            .unwrap_err();

        assert_eq!(err, EngineError::ActivationPrecondition { expected: 10, actual: 9 });
        let stored = fixture.groups.find_by_id(&fixture.group.id()).await.unwrap().unwrap();
        assert_eq!(stored.status(), GroupStatus::Forming);
        assert!(!fixture.cycles.exists_for_group(&fixture.group.id()).await.unwrap());
        assert_eq!(fixture.bus.event_count(), 0);
    }

    #[tokio::test]
    async fn unknown_group_is_not_found() {
        let fixture = Fixture::seeded(10).await;
        let missing = GroupId::new();

        let err = handler(&fixture)
            .handle(
                ActivateGroupCommand {
                    group_id: missing,
                    assignment: None,
                    today: date(2025, 2, 1),
                },
                CommandMetadata::test_fixture(),
            )
            .await
            .unwrap_err();

        assert_eq!(err, EngineError::GroupNotFound(missing));
    }

    #[tokio::test]
    async fn organizer_assignment_without_mapping_is_incomplete() {
        let mut fixture = Fixture::seeded(10).await;
        fixture
            .group
            .change_payout_order_method(PayoutOrderMethod::OrganizerAssigned)
            .unwrap();
        fixture.groups.insert(fixture.group.clone()).await;

        let err = handler(&fixture)
            .handle(command(&fixture, date(2025, 2, 1)), CommandMetadata::test_fixture())
            .await
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::IncompleteAssignment);
        assert!(!fixture.cycles.exists_for_group(&fixture.group.id()).await.unwrap());
    }

    #[tokio::test]
    async fn organizer_assignment_is_honoured() {
        let mut fixture = Fixture::seeded(10).await;
        fixture
            .group
            .change_payout_order_method(PayoutOrderMethod::OrganizerAssigned)
            .unwrap();
        fixture.groups.insert(fixture.group.clone()).await;
        let reversed: Vec<_> = fixture.roster.iter().rev().map(|m| m.id).collect();

        let result = handler(&fixture)
            .handle(
                ActivateGroupCommand {
                    group_id: fixture.group.id(),
                    assignment: Some(OrganizerAssignment::in_order(&reversed)),
                    today: date(2025, 2, 1),
                },
                CommandMetadata::test_fixture(),
            )
            .await
            .unwrap();

        let order: Vec<_> = result.schedule.cycles.iter().map(|c| c.payout_member_id).collect();
        assert_eq!(order, reversed);
    }

    #[tokio::test]
    async fn seeded_lottery_is_reproducible_bijection() {
        let mut orders = Vec::new();
        for _ in 0..2 {
            let mut fixture = Fixture::seeded(10).await;
            fixture
                .group
                .change_payout_order_method(PayoutOrderMethod::Lottery)
                .unwrap();
            fixture.groups.insert(fixture.group.clone()).await;

            let result = handler(&fixture)
                .with_lottery_seed(LotterySeed::Fixed(7))
                .handle(command(&fixture, date(2025, 2, 1)), CommandMetadata::test_fixture())
                .await
                .unwrap();

            assert_eq!(result.event.lottery_seed, Some(7));
            let users: Vec<UserId> = result
                .schedule
                .cycles
                .iter()
                .map(|c| c.payout_user_id.clone())
                .collect();
            let distinct: HashSet<&UserId> = users.iter().collect();
            assert_eq!(distinct.len(), 10);
            orders.push(users);
        }

        assert_eq!(orders[0], orders[1]);
    }

    #[tokio::test]
    async fn failed_group_write_rolls_back_schedule() {
        let fixture = Fixture::seeded(10).await;
        let handler = ActivateGroupHandler::new(
            Arc::new(FailingGroupWrites {
                group: fixture.group.clone(),
            }),
            fixture.members.clone(),
            fixture.cycles.clone(),
            fixture.ledger.clone(),
            fixture.bus.clone(),
        );

        let err = handler
            .handle(command(&fixture, date(2025, 3, 1)), CommandMetadata::test_fixture())
            .await
            .unwrap_err();

        assert!(err.is_retryable());
        assert!(!fixture.cycles.exists_for_group(&fixture.group.id()).await.unwrap());
        assert!(fixture.ledger.find_by_group(&fixture.group.id()).await.unwrap().is_empty());
        assert_eq!(fixture.bus.event_count(), 0);
    }

    #[tokio::test]
    async fn removed_members_do_not_count_toward_capacity() {
        let fixture = Fixture::seeded(10).await;
        let mut leaver = Member::active(
            fixture.group.id(),
            UserId::new("U-leaver").unwrap(),
            MemberRole::Member,
            Timestamp::now(),
        );
        leaver.status = crate::domain::group::MemberStatus::Removed;
        fixture.members.add(leaver).await;

        let result = handler(&fixture)
            .handle(command(&fixture, date(2025, 2, 1)), CommandMetadata::test_fixture())
            .await
            .unwrap();

        assert!(result
            .schedule
            .cycles
            .iter()
            .all(|c| c.payout_user_id.as_str() != "U-leaver"));
    }
}
