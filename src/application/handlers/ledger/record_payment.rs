//! RecordPaymentHandler - Command handler for applying a payment to a
//! ledger entry.

use std::sync::Arc;

use crate::domain::foundation::{
    CommandMetadata, EventId, LedgerEntryId, Money, SerializableDomainEvent, Timestamp,
};
use crate::domain::group::EngineError;
use crate::domain::ledger::{LedgerEntry, PaymentRecorded};
use crate::ports::{EventPublisher, LedgerRepository};

/// Command to record a payment.
#[derive(Debug, Clone)]
pub struct RecordPaymentCommand {
    pub entry_id: LedgerEntryId,
    pub amount: Money,
    /// Defaults to now.
    pub paid_at: Option<Timestamp>,
}

#[derive(Debug, Clone)]
pub struct RecordPaymentResult {
    pub entry: LedgerEntry,
    pub event: PaymentRecorded,
}

pub struct RecordPaymentHandler {
    ledger_repository: Arc<dyn LedgerRepository>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl RecordPaymentHandler {
    pub fn new(
        ledger_repository: Arc<dyn LedgerRepository>,
        event_publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            ledger_repository,
            event_publisher,
        }
    }

    pub async fn handle(
        &self,
        cmd: RecordPaymentCommand,
        metadata: CommandMetadata,
    ) -> Result<RecordPaymentResult, EngineError> {
        // 1. Find the entry
        let mut entry = self
            .ledger_repository
            .find_by_id(&cmd.entry_id)
            .await?
            .ok_or(EngineError::LedgerEntryNotFound(cmd.entry_id))?;

        // 2. Apply (rejects non-positive amounts and overpayment)
        let read_amount_paid = entry.amount_paid;
        let paid_at = cmd.paid_at.unwrap_or_else(Timestamp::now);
        entry.record_payment(cmd.amount, paid_at)?;

        // 3. Persist, unless another payment landed since the read
        self.ledger_repository
            .update(&entry, read_amount_paid)
            .await?;
        tracing::info!(
            "Recorded payment of {} on entry {} (cycle {}, {})",
            cmd.amount,
            entry.id,
            entry.cycle_number,
            entry.kind
        );

        // 4. Publish
        let event = PaymentRecorded {
            event_id: EventId::new(),
            entry_id: entry.id,
            group_id: entry.group_id,
            member_id: entry.member_id,
            cycle_number: entry.cycle_number,
            kind: entry.kind,
            amount: cmd.amount,
            amount_paid: entry.amount_paid,
            fully_paid: entry.is_paid(),
            occurred_at: paid_at,
        };
        self.event_publisher
            .publish(metadata.stamp(event.to_envelope()?))
            .await?;

        Ok(RecordPaymentResult { entry, event })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{InMemoryEventBus, InMemoryLedgerRepository};
    use crate::domain::foundation::{
        DomainError, ErrorCode, EventEnvelope, GroupId, MemberId, UserId,
    };
    use crate::domain::group::{Member, MemberRole};
    use crate::domain::ledger::EntryKind;
    use async_trait::async_trait;

    /// Serves the entry as it was before `inner` moved on.
    struct StaleReads {
        inner: Arc<InMemoryLedgerRepository>,
        snapshot: LedgerEntry,
    }

    #[async_trait]
    impl LedgerRepository for StaleReads {
        async fn find_by_group(&self, group_id: &GroupId) -> Result<Vec<LedgerEntry>, DomainError> {
            self.inner.find_by_group(group_id).await
        }

        async fn find_by_member(&self, member_id: &MemberId) -> Result<Vec<LedgerEntry>, DomainError> {
            self.inner.find_by_member(member_id).await
        }

        async fn find_by_id(&self, _id: &LedgerEntryId) -> Result<Option<LedgerEntry>, DomainError> {
            Ok(Some(self.snapshot.clone()))
        }

        async fn create_entries(&self, entries: &[LedgerEntry]) -> Result<(), DomainError> {
            self.inner.create_entries(entries).await
        }

        async fn update(&self, entry: &LedgerEntry, read_amount_paid: Money) -> Result<(), DomainError> {
            self.inner.update(entry, read_amount_paid).await
        }
    }

    struct FailingPublisher;

    #[async_trait]
    impl EventPublisher for FailingPublisher {
        async fn publish(&self, _event: EventEnvelope) -> Result<(), DomainError> {
            Err(DomainError::new(ErrorCode::InternalError, "bus down"))
        }

        async fn publish_all(&self, _events: Vec<EventEnvelope>) -> Result<(), DomainError> {
            Err(DomainError::new(ErrorCode::InternalError, "bus down"))
        }
    }

    async fn seeded_entry(ledger: &InMemoryLedgerRepository) -> LedgerEntry {
        let member = Member::active(
            GroupId::new(),
            UserId::new("U1").unwrap(),
            MemberRole::Member,
            Timestamp::now(),
        );
        let entry = LedgerEntry::new(&member, 1, EntryKind::Contribution, Money::from_minor(1000));
        ledger.create_entries(std::slice::from_ref(&entry)).await.unwrap();
        entry
    }

    #[tokio::test]
    async fn full_payment_marks_entry_paid() {
        let ledger = Arc::new(InMemoryLedgerRepository::new());
        let bus = Arc::new(InMemoryEventBus::new());
        let entry = seeded_entry(&ledger).await;
        let handler = RecordPaymentHandler::new(ledger.clone(), bus.clone());

        let result = handler
            .handle(
                RecordPaymentCommand {
                    entry_id: entry.id,
                    amount: Money::from_minor(1000),
                    paid_at: None,
                },
                CommandMetadata::test_fixture(),
            )
            .await
            .unwrap();

        assert!(result.entry.is_paid());
        assert!(result.entry.paid_at.is_some());
        assert!(result.event.fully_paid);
        let stored = ledger.find_by_id(&entry.id).await.unwrap().unwrap();
        assert_eq!(stored.amount_paid, Money::from_minor(1000));
        assert!(bus.has_event("ledger.payment_recorded.v1"));
    }

    #[tokio::test]
    async fn partial_payments_accumulate() {
        let ledger = Arc::new(InMemoryLedgerRepository::new());
        let bus = Arc::new(InMemoryEventBus::new());
        let entry = seeded_entry(&ledger).await;
        let handler = RecordPaymentHandler::new(ledger.clone(), bus.clone());

        for _ in 0..2 {
            handler
                .handle(
                    RecordPaymentCommand {
                        entry_id: entry.id,
                        amount: Money::from_minor(400),
                        paid_at: None,
                    },
                    CommandMetadata::test_fixture(),
                )
                .await
                .unwrap();
        }

        let stored = ledger.find_by_id(&entry.id).await.unwrap().unwrap();
        assert_eq!(stored.amount_paid, Money::from_minor(800));
        assert_eq!(stored.outstanding(), Money::from_minor(200));
        assert!(stored.paid_at.is_none());
        assert_eq!(bus.event_count(), 2);
    }

    #[tokio::test]
    async fn overpayment_is_rejected_and_not_persisted() {
        let ledger = Arc::new(InMemoryLedgerRepository::new());
        let bus = Arc::new(InMemoryEventBus::new());
        let entry = seeded_entry(&ledger).await;
        let handler = RecordPaymentHandler::new(ledger.clone(), bus.clone());

        let err = handler
            .handle(
                RecordPaymentCommand {
                    entry_id: entry.id,
                    amount: Money::from_minor(1001),
                    paid_at: None,
                },
                CommandMetadata::test_fixture(),
            )
            .await
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::ValidationFailed);
        let stored = ledger.find_by_id(&entry.id).await.unwrap().unwrap();
        assert_eq!(stored.amount_paid, Money::ZERO);
        assert_eq!(bus.event_count(), 0);
    }

    #[tokio::test]
    async fn payment_on_stale_read_conflicts_and_keeps_earlier_payment() {
        let ledger = Arc::new(InMemoryLedgerRepository::new());
        let bus = Arc::new(InMemoryEventBus::new());
        let snapshot = seeded_entry(&ledger).await;

        // 600 lands first through a fresh read
        RecordPaymentHandler::new(ledger.clone(), bus.clone())
            .handle(
                RecordPaymentCommand {
                    entry_id: snapshot.id,
                    amount: Money::from_minor(600),
                    paid_at: None,
                },
                CommandMetadata::test_fixture(),
            )
            .await
            .unwrap();

        let stale = Arc::new(StaleReads {
            inner: ledger.clone(),
            snapshot: snapshot.clone(),
        });
        let err = RecordPaymentHandler::new(stale, bus.clone())
            .handle(
                RecordPaymentCommand {
                    entry_id: snapshot.id,
                    amount: Money::from_minor(300),
                    paid_at: None,
                },
                CommandMetadata::test_fixture(),
            )
            .await
            .unwrap_err();

        assert_eq!(err, EngineError::PaymentConflict(snapshot.id));
        assert!(err.is_retryable());
        let stored = ledger.find_by_id(&snapshot.id).await.unwrap().unwrap();
        assert_eq!(stored.amount_paid, Money::from_minor(600));
        assert_eq!(bus.event_count(), 1);
    }

    #[tokio::test]
    async fn unknown_entry_is_not_found() {
        let handler = RecordPaymentHandler::new(
            Arc::new(InMemoryLedgerRepository::new()),
            Arc::new(InMemoryEventBus::new()),
        );
        let missing = LedgerEntryId::new();

        let err = handler
            .handle(
                RecordPaymentCommand {
                    entry_id: missing,
                    amount: Money::from_minor(100),
                    paid_at: None,
                },
                CommandMetadata::test_fixture(),
            )
            .await
            .unwrap_err();

        assert_eq!(err, EngineError::LedgerEntryNotFound(missing));
    }

    #[tokio::test]
    async fn publish_failure_surfaces_as_infrastructure() {
        let ledger = Arc::new(InMemoryLedgerRepository::new());
        let entry = seeded_entry(&ledger).await;
        let handler = RecordPaymentHandler::new(ledger.clone(), Arc::new(FailingPublisher));

        let err = handler
            .handle(
                RecordPaymentCommand {
                    entry_id: entry.id,
                    amount: Money::from_minor(1000),
                    paid_at: None,
                },
                CommandMetadata::test_fixture(),
            )
            .await
            .unwrap_err();

        assert!(err.is_retryable());
    }
}
