//! Opening contribution entries for a cycle.
//!
//! Shared by activation (cycle 1 may open immediately) and the status
//! refresh. Running it twice for the same cycle creates nothing new.

use std::collections::HashSet;

use crate::domain::cycle::Cycle;
use crate::domain::foundation::MemberId;
use crate::domain::group::{EngineError, Group, Member};
use crate::domain::ledger::{EntryKind, LedgerEntry};
use crate::ports::LedgerRepository;

/// Creates the missing contribution entries for `cycle`. Returns how many
/// entries were written.
pub(crate) async fn open_contributions(
    ledger: &dyn LedgerRepository,
    group: &Group,
    cycle: &Cycle,
    members: &[Member],
) -> Result<usize, EngineError> {
    let existing: HashSet<MemberId> = ledger
        .find_by_group(&group.id())
        .await?
        .into_iter()
        .filter(|e| e.kind == EntryKind::Contribution && e.cycle_number == cycle.cycle_number)
        .map(|e| e.member_id)
        .collect();

    let missing: Vec<LedgerEntry> = LedgerEntry::contributions_for_cycle(group, cycle, members)
        .into_iter()
        .filter(|e| !existing.contains(&e.member_id))
        .collect();

    if missing.is_empty() {
        return Ok(0);
    }

    ledger.create_entries(&missing).await?;
    tracing::debug!(
        group_id = %group.id(),
        cycle_number = cycle.cycle_number,
        count = missing.len(),
        "opened contribution entries"
    );
    Ok(missing.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_support::Fixture;
    use crate::domain::cycle::CycleStatus;
    use crate::domain::foundation::CycleId;
    use chrono::NaiveDate;

    fn open_cycle(fixture: &Fixture) -> Cycle {
        Cycle {
            id: CycleId::new(),
            group_id: fixture.group.id(),
            cycle_number: 1,
            due_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            payout_member_id: fixture.roster[0].id,
            payout_user_id: fixture.roster[0].user_id.clone(),
            status: CycleStatus::Open,
        }
    }

    #[tokio::test]
    async fn opens_one_entry_per_active_member_once() {
        let fixture = Fixture::seeded(10).await;
        let cycle = open_cycle(&fixture);

        let first = open_contributions(fixture.ledger.as_ref(), &fixture.group, &cycle, &fixture.roster)
            .await
            .unwrap();
        let second = open_contributions(fixture.ledger.as_ref(), &fixture.group, &cycle, &fixture.roster)
            .await
            .unwrap();

        assert_eq!(first, 10);
        assert_eq!(second, 0);
        let entries = fixture.ledger.find_by_group(&fixture.group.id()).await.unwrap();
        assert_eq!(entries.len(), 10);
        assert!(entries.iter().all(|e| e.amount_due == fixture.group.contribution_amount()));
    }
}
