//! End-to-end engine flow over the in-memory adapters.
//!
//! Activation → status refresh → payments → calendar → ledger summary,
//! plus the double-activation guard.

use std::sync::Arc;

use chrono::NaiveDate;

use paluwagan::adapters::{
    InMemoryCycleRepository, InMemoryEventBus, InMemoryGroupRepository, InMemoryLedgerRepository,
    InMemoryMemberStore,
};
use paluwagan::application::{
    ActivateGroupCommand, ActivateGroupHandler, GetCalendarHandler, GetCalendarQuery,
    GetLedgerSummaryHandler, GetLedgerSummaryQuery, RecordPaymentCommand, RecordPaymentHandler,
    RefreshCycleStatusesCommand, RefreshCycleStatusesHandler,
};
use paluwagan::domain::cycle::CycleStatus;
use paluwagan::domain::foundation::{CommandMetadata, GroupId, Money, Timestamp, UserId};
use paluwagan::domain::group::{
    ContributionFrequency, EngineError, FeePolicy, FeeRate, Group, GroupStatus, GroupTerms,
    Member, MemberRole, PayoutOrderMethod,
};
use paluwagan::domain::ledger::{CalendarEventType, EntryKind};
use paluwagan::domain::payout::LotterySeed;
use paluwagan::ports::{CycleRepository, GroupRepository, LedgerRepository};

// =============================================================================
// Test Infrastructure
// =============================================================================

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

struct Engine {
    groups: Arc<InMemoryGroupRepository>,
    members: Arc<InMemoryMemberStore>,
    cycles: Arc<InMemoryCycleRepository>,
    ledger: Arc<InMemoryLedgerRepository>,
    bus: Arc<InMemoryEventBus>,
    group_id: GroupId,
    roster: Vec<Member>,
}

impl Engine {
    /// A weekly four-member lottery group contributing 500, 10% fee.
    async fn new() -> Self {
        let organizer = UserId::new("org-1").unwrap();
        let group = Group::create(
            GroupId::new(),
            GroupTerms {
                name: "Weekly Four".to_string(),
                organizer_id: organizer,
                members_limit: 4,
                contribution_amount: Money::from_minor(500),
                frequency: ContributionFrequency::Weekly,
                start_date: date(2025, 1, 6),
                payout_order_method: PayoutOrderMethod::Lottery,
                fee_policy: FeePolicy::Percentage(FeeRate::from_percent(10).unwrap()),
            },
        )
        .unwrap();

        let joined = Timestamp::now();
        let roster: Vec<Member> = ["ana", "ben", "cora", "dido"]
            .iter()
            .zip(0i64..)
            .map(|(name, i)| {
                Member::active(
                    group.id(),
                    UserId::new(*name).unwrap(),
                    MemberRole::Member,
                    joined.plus_secs(i),
                )
            })
            .collect();

        let groups = Arc::new(InMemoryGroupRepository::new());
        let group_id = group.id();
        groups.insert(group).await;
        let members = Arc::new(InMemoryMemberStore::new());
        members.add_all(roster.clone()).await;

        Self {
            groups,
            members,
            cycles: Arc::new(InMemoryCycleRepository::new()),
            ledger: Arc::new(InMemoryLedgerRepository::new()),
            bus: Arc::new(InMemoryEventBus::new()),
            group_id,
            roster,
        }
    }

    fn activator(&self) -> ActivateGroupHandler {
        ActivateGroupHandler::new(
            self.groups.clone(),
            self.members.clone(),
            self.cycles.clone(),
            self.ledger.clone(),
            self.bus.clone(),
        )
        .with_lottery_seed(LotterySeed::Fixed(2025))
    }

    fn refresher(&self) -> RefreshCycleStatusesHandler {
        RefreshCycleStatusesHandler::new(
            self.groups.clone(),
            self.members.clone(),
            self.cycles.clone(),
            self.ledger.clone(),
            self.bus.clone(),
        )
        .with_grace_days(2)
    }

    async fn activate(&self, today: NaiveDate) -> Result<(), EngineError> {
        self.activator()
            .handle(
                ActivateGroupCommand {
                    group_id: self.group_id,
                    assignment: None,
                    today,
                },
                CommandMetadata::new(UserId::new("org-1").unwrap()),
            )
            .await
            .map(|_| ())
    }

    async fn refresh(&self, today: NaiveDate) {
        self.refresher()
            .handle(
                RefreshCycleStatusesCommand {
                    group_id: self.group_id,
                    today,
                },
                CommandMetadata::system("sweep"),
            )
            .await
            .unwrap();
    }

    async fn pay_everyone(&self, cycle_number: u32) {
        let payments = RecordPaymentHandler::new(self.ledger.clone(), self.bus.clone());
        let entries = self.ledger.find_by_group(&self.group_id).await.unwrap();
        for entry in entries
            .iter()
            .filter(|e| e.cycle_number == cycle_number && e.kind == EntryKind::Contribution)
        {
            payments
                .handle(
                    RecordPaymentCommand {
                        entry_id: entry.id,
                        amount: entry.outstanding(),
                        paid_at: None,
                    },
                    CommandMetadata::new(entry.user_id.clone()),
                )
                .await
                .unwrap();
        }
    }

    async fn statuses(&self) -> Vec<CycleStatus> {
        self.cycles
            .find_by_group(&self.group_id)
            .await
            .unwrap()
            .iter()
            .map(|c| c.status)
            .collect()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn full_rotation_pays_everyone_once_and_completes_group() {
    let engine = Engine::new().await;
    engine.activate(date(2025, 1, 6)).await.unwrap();

    for week in 0..4u32 {
        let due = date(2025, 1, 6) + chrono::Days::new(u64::from(week) * 7);
        engine.refresh(due).await;
        engine.pay_everyone(week + 1).await;
    }
    engine.refresh(date(2025, 1, 28)).await;

    assert!(engine.statuses().await.iter().all(|s| *s == CycleStatus::Completed));
    let group = engine.groups.find_by_id(&engine.group_id).await.unwrap().unwrap();
    assert_eq!(group.status(), GroupStatus::Completed);
    assert!(engine.bus.has_event("group.completed.v1"));

    let recipients: Vec<UserId> = engine
        .cycles
        .find_by_group(&engine.group_id)
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.payout_user_id)
        .collect();
    let mut sorted: Vec<&str> = recipients.iter().map(|u| u.as_str()).collect();
    sorted.sort_unstable();
    assert_eq!(sorted, vec!["ana", "ben", "cora", "dido"]);
}

#[tokio::test]
async fn weekly_due_dates_step_seven_days() {
    let engine = Engine::new().await;
    engine.activate(date(2025, 1, 1)).await.unwrap();

    let dates: Vec<NaiveDate> = engine
        .cycles
        .find_by_group(&engine.group_id)
        .await
        .unwrap()
        .iter()
        .map(|c| c.due_date)
        .collect();

    assert_eq!(
        dates,
        vec![date(2025, 1, 6), date(2025, 1, 13), date(2025, 1, 20), date(2025, 1, 27)]
    );
}

#[tokio::test]
async fn double_activation_is_already_generated() {
    let engine = Engine::new().await;
    engine.activate(date(2025, 1, 1)).await.unwrap();
    let first = engine.cycles.find_by_group(&engine.group_id).await.unwrap();

    let err = engine.activate(date(2025, 1, 1)).await.unwrap_err();

    assert_eq!(err, EngineError::AlreadyGenerated(engine.group_id));
    assert_eq!(engine.cycles.find_by_group(&engine.group_id).await.unwrap(), first);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_activations_generate_once() {
    let engine = Engine::new().await;
    let first = Arc::new(engine.activator());
    let second = Arc::new(engine.activator());
    let group_id = engine.group_id;
    let command = move || ActivateGroupCommand {
        group_id,
        assignment: None,
        today: date(2025, 1, 1),
    };

    let (a, b) = tokio::join!(
        tokio::spawn({
            let handler = first.clone();
            let cmd = command();
            async move { handler.handle(cmd, CommandMetadata::system("a")).await }
        }),
        tokio::spawn({
            let handler = second.clone();
            let cmd = command();
            async move { handler.handle(cmd, CommandMetadata::system("b")).await }
        }),
    );
    let outcomes = [a.unwrap(), b.unwrap()];

    assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
    let refused = outcomes.iter().find_map(|r| r.as_ref().err()).unwrap();
    assert_eq!(*refused, EngineError::AlreadyGenerated(group_id));
    assert_eq!(engine.cycles.find_by_group(&group_id).await.unwrap().len(), 4);
    assert_eq!(engine.bus.events_of_type("group.activated.v1").len(), 1);
    let group = engine.groups.find_by_id(&group_id).await.unwrap().unwrap();
    assert_eq!(group.status(), GroupStatus::Active);
}

#[tokio::test]
async fn calendar_and_summary_reflect_payments() {
    let engine = Engine::new().await;
    engine.activate(date(2025, 1, 6)).await.unwrap();
    engine.pay_everyone(1).await;
    engine.refresh(date(2025, 1, 13)).await;

    let cycles = engine.cycles.find_by_group(&engine.group_id).await.unwrap();
    let first_recipient = cycles[0].payout_user_id.clone();

    let calendar = GetCalendarHandler::new(
        engine.groups.clone(),
        engine.members.clone(),
        engine.cycles.clone(),
        engine.ledger.clone(),
    )
    .handle(GetCalendarQuery {
        group_id: engine.group_id,
        requesting_user: first_recipient.clone(),
    })
    .await
    .unwrap();

    assert_eq!(calendar.len(), 8);
    let payout = calendar
        .iter()
        .find(|e| e.cycle_number == 1 && e.event_type == CalendarEventType::Payout)
        .unwrap();
    // 4 × 500 = 2000 gross, 10% fee
    assert_eq!(payout.amount, Money::from_minor(1800));
    assert_eq!(payout.status, CycleStatus::Completed);
    assert!(payout.is_requesting_user_payout);
    assert_eq!(payout.requester_paid, Some(true));

    let summary = GetLedgerSummaryHandler::new(engine.groups.clone(), engine.ledger.clone())
        .handle(GetLedgerSummaryQuery {
            group_id: engine.group_id,
            member_id: None,
        })
        .await
        .unwrap();

    // Cycle 1 paid in full; cycle 2 opened on 2025-01-13 and is unpaid.
    assert_eq!(summary.totals.paid_count, 4);
    assert_eq!(summary.totals.total_paid, Money::from_minor(2000));
    assert_eq!(summary.totals.unpaid_count, 4);
    assert_eq!(summary.totals.total_unpaid, Money::from_minor(2000));
    assert_eq!(summary.by_member.len(), 4);

    let member_view = GetLedgerSummaryHandler::new(engine.groups.clone(), engine.ledger.clone())
        .handle(GetLedgerSummaryQuery {
            group_id: engine.group_id,
            member_id: Some(engine.roster[0].id),
        })
        .await
        .unwrap();
    assert_eq!(member_view.totals.paid_count, 1);
    assert_eq!(member_view.totals.unpaid_count, 1);
}

#[tokio::test]
async fn events_carry_command_correlation() {
    let engine = Engine::new().await;
    let metadata = CommandMetadata::new(UserId::new("org-1").unwrap()).with_correlation_id("act-42");

    engine
        .activator()
        .handle(
            ActivateGroupCommand {
                group_id: engine.group_id,
                assignment: None,
                today: date(2025, 1, 6),
            },
            metadata,
        )
        .await
        .unwrap();

    let activated = engine.bus.events_of_type("group.activated.v1");
    assert_eq!(activated.len(), 1);
    assert_eq!(activated[0].metadata.correlation_id.as_deref(), Some("act-42"));
    assert_eq!(activated[0].metadata.user_id.as_deref(), Some("org-1"));
    assert_eq!(activated[0].payload["lottery_seed"], 2025);
}
