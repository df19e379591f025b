// Starter allocation: direct requirements, then Superflex, then Flex.
//
// Bonus slots are filled greedily from whoever is left after the slots
// already claimed. SF is computed and frozen before Flex begins, so a player
// taken by SF is never offered to Flex.

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use crate::config::LeagueConfig;
use crate::player::{BonusSlot, PlayerPool, Position};

/// Slot counts keyed by true position.
pub type PositionCounts = HashMap<Position, usize>;

fn count(counts: &PositionCounts, position: Position) -> usize {
    counts.get(&position).copied().unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Allocation result
// ---------------------------------------------------------------------------

/// League-wide starting slots per true position, split by how they were
/// filled.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StarterAllocation {
    pub direct: PositionCounts,
    pub superflex: PositionCounts,
    pub flex: PositionCounts,
}

impl StarterAllocation {
    pub fn direct(&self, position: Position) -> usize {
        count(&self.direct, position)
    }

    pub fn superflex(&self, position: Position) -> usize {
        count(&self.superflex, position)
    }

    pub fn flex(&self, position: Position) -> usize {
        count(&self.flex, position)
    }

    /// direct + sf + flex.
    pub fn total(&self, position: Position) -> usize {
        self.direct(position)
            .saturating_add(self.superflex(position))
            .saturating_add(self.flex(position))
    }
}

// ---------------------------------------------------------------------------
// Bonus-slot phase
// ---------------------------------------------------------------------------

/// Fill `n` bonus slots of kind `slot` from the players not yet claimed.
///
/// Each eligible position's sorted list is entered at its `claimed` index;
/// the merged candidates are ranked by points and the top `n` are counted
/// by position. Every eligible position appears in the result, possibly
/// with 0. The counts sum to `min(n, remaining eligible players)`.
pub fn allocate_bonus_slots(
    pool: &PlayerPool,
    slot: BonusSlot,
    claimed: &PositionCounts,
    n: usize,
) -> PositionCounts {
    let eligible = slot.eligible_positions();
    let mut counts: PositionCounts = eligible.iter().map(|&pos| (pos, 0)).collect();
    if n == 0 {
        return counts;
    }

    let mut candidates: Vec<(Position, f64)> = eligible
        .iter()
        .flat_map(|&pos| {
            let start = count(claimed, pos);
            pool.players(pos)
                .iter()
                .skip(start)
                .map(move |p| (pos, p.points))
        })
        .collect();

    candidates.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    for (pos, _) in candidates.into_iter().take(n) {
        *counts.entry(pos).or_insert(0) += 1;
    }

    debug!("{} allocation of {} slots: {:?}", slot, n, counts);
    counts
}

// ---------------------------------------------------------------------------
// Full allocation
// ---------------------------------------------------------------------------

/// Run direct, SF and Flex allocation in that order.
pub fn allocate_starters(pool: &PlayerPool, league: &LeagueConfig) -> StarterAllocation {
    let direct: PositionCounts = Position::ALL
        .into_iter()
        .map(|pos| (pos, league.direct_starters(pos)))
        .collect();

    let mut claimed = direct.clone();

    let superflex = allocate_bonus_slots(
        pool,
        BonusSlot::Superflex,
        &claimed,
        league.bonus_slot_count(BonusSlot::Superflex),
    );
    for (&pos, &c) in &superflex {
        let entry = claimed.entry(pos).or_insert(0);
        *entry = entry.saturating_add(c);
    }

    let flex = allocate_bonus_slots(
        pool,
        BonusSlot::Flex,
        &claimed,
        league.bonus_slot_count(BonusSlot::Flex),
    );

    StarterAllocation {
        direct,
        superflex,
        flex,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
