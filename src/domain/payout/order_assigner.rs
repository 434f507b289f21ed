//! Payout Order Assigner - who receives the pool in which cycle.
//!
//! # Design Decisions
//!
//! - **Closed method set**: the three methods are one enum dispatched by
//!   [`PayoutOrderAssigner::assign`]
//! - **Deterministic lottery**: the shuffle is driven by a seeded ChaCha20
//!   stream; the seed is returned so a draw can be audited and replayed
//! - **Canonical input**: members are placed in join order before any
//!   shuffle, so a lottery result depends only on the seed and the set

use std::collections::{BTreeMap, HashSet};

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::MemberId;
use crate::domain::group::{AssignmentDefect, EngineError, Member, PayoutOrderMethod};

/// One organizer-chosen slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotAssignment {
    pub member_id: MemberId,
    /// 1-based position in the rotation.
    pub position: u32,
}

/// Organizer-supplied mapping of members to payout positions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizerAssignment {
    pub slots: Vec<SlotAssignment>,
}

impl OrganizerAssignment {
    pub fn new(slots: Vec<SlotAssignment>) -> Self {
        Self { slots }
    }

    /// Builds a mapping that places `members` in the given order.
    pub fn in_order(members: &[MemberId]) -> Self {
        let slots = members
            .iter()
            .zip(1u32..)
            .map(|(member_id, position)| SlotAssignment {
                member_id: *member_id,
                position,
            })
            .collect();
        Self { slots }
    }
}

/// Source of randomness for a lottery draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LotterySeed {
    /// Reproducible draw (tests, replays).
    Fixed(u64),
    /// Seed drawn from the OS-backed thread RNG.
    Entropy,
}

impl LotterySeed {
    fn resolve(self) -> u64 {
        match self {
            LotterySeed::Fixed(seed) => seed,
            LotterySeed::Entropy => rand::random::<u64>(),
        }
    }
}

/// The full rotation, one member per cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutOrder {
    /// `members[i]` receives the payout of cycle `i + 1`.
    pub members: Vec<MemberId>,
    /// Seed used when the order came from a lottery.
    pub lottery_seed: Option<u64>,
}

impl PayoutOrder {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Member paid out in the given 1-based cycle.
    pub fn recipient_of(&self, cycle_number: u32) -> Option<MemberId> {
        let index = usize::try_from(cycle_number.checked_sub(1)?).ok()?;
        self.members.get(index).copied()
    }
}

/// Stateless payout ordering service.
pub struct PayoutOrderAssigner;

impl PayoutOrderAssigner {
    /// Produces a bijection from `members` onto positions `1..=members.len()`.
    ///
    /// # Errors
    ///
    /// `IncompleteAssignment` when there are no members, or when an
    /// organizer mapping is missing or not a bijection.
    pub fn assign(
        members: &[Member],
        method: PayoutOrderMethod,
        mapping: Option<&OrganizerAssignment>,
        seed: LotterySeed,
    ) -> Result<PayoutOrder, EngineError> {
        if members.is_empty() {
            return Err(EngineError::IncompleteAssignment(AssignmentDefect::NoMembers));
        }

        match method {
            PayoutOrderMethod::Fixed => Ok(PayoutOrder {
                members: join_order(members),
                lottery_seed: None,
            }),
            PayoutOrderMethod::Lottery => {
                let seed = seed.resolve();
                let mut order = join_order(members);
                let mut rng = ChaCha20Rng::seed_from_u64(seed);
                order.shuffle(&mut rng);
                Ok(PayoutOrder {
                    members: order,
                    lottery_seed: Some(seed),
                })
            }
            PayoutOrderMethod::OrganizerAssigned => {
                let mapping = mapping.ok_or(EngineError::IncompleteAssignment(
                    AssignmentDefect::MappingMissing,
                ))?;
                let order = validate_mapping(members, mapping)
                    .map_err(EngineError::IncompleteAssignment)?;
                Ok(PayoutOrder {
                    members: order,
                    lottery_seed: None,
                })
            }
        }
    }
}

/// Ascending join time, ties broken by member id.
fn join_order(members: &[Member]) -> Vec<MemberId> {
    let mut sorted: Vec<&Member> = members.iter().collect();
    sorted.sort_by(|a, b| a.joined_at.cmp(&b.joined_at).then(a.id.cmp(&b.id)));
    sorted.into_iter().map(|m| m.id).collect()
}

fn validate_mapping(
    members: &[Member],
    mapping: &OrganizerAssignment,
) -> Result<Vec<MemberId>, AssignmentDefect> {
    let max = u32::try_from(members.len()).unwrap_or(u32::MAX);
    let known: HashSet<MemberId> = members.iter().map(|m| m.id).collect();

    let mut seen_members = HashSet::new();
    let mut by_slot: BTreeMap<u32, MemberId> = BTreeMap::new();

    for slot in &mapping.slots {
        if !seen_members.insert(slot.member_id) {
            return Err(AssignmentDefect::DuplicateMember(slot.member_id));
        }
        if !known.contains(&slot.member_id) {
            return Err(AssignmentDefect::UnknownMember(slot.member_id));
        }
        if slot.position == 0 || slot.position > max {
            return Err(AssignmentDefect::SlotOutOfRange {
                slot: slot.position,
                max,
            });
        }
        if by_slot.insert(slot.position, slot.member_id).is_some() {
            return Err(AssignmentDefect::DuplicateSlot(slot.position));
        }
    }

    if let Some(missing) = join_order(members)
        .into_iter()
        .find(|id| !seen_members.contains(id))
    {
        return Err(AssignmentDefect::MissingMember(missing));
    }

    // Every member has a distinct in-range slot, so the slots are exactly 1..=max.
    Ok(by_slot.into_values().collect())
}
