// Replacement and last-starter levels per position.

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use crate::config::LeagueConfig;
use crate::player::{Player, PlayerPool, Position};
use crate::valuation::allocation::StarterAllocation;

/// Both reference levels for one position.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Baseline {
    /// Points of the best player beyond starters and bench (VOR baseline).
    pub replacement: f64,
    /// Points of the weakest league-wide starter (VOLS baseline).
    pub last_starter: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BaselineSet {
    levels: HashMap<Position, Baseline>,
}

impl BaselineSet {
    /// Baseline for `position`; all zeros when the position was never computed.
    pub fn get(&self, position: Position) -> Baseline {
        self.levels.get(&position).copied().unwrap_or_default()
    }

    pub fn replacement(&self, position: Position) -> f64 {
        self.get(position).replacement
    }

    pub fn last_starter(&self, position: Position) -> f64 {
        self.get(position).last_starter
    }
}

/// Points at index `total_starters - 1`. Falls back to the last player when
/// the index is out of range, and to 0 for an empty pool.
pub fn last_starter_level(players: &[Player], total_starters: usize) -> f64 {
    if total_starters > 0 && total_starters <= players.len() {
        return players[total_starters - 1].points;
    }
    match players.last() {
        Some(last) => {
            debug!(
                "last-starter index {} outside pool of {}, using last player",
                total_starters.wrapping_sub(1) as isize,
                players.len()
            );
            last.points
        }
        None => 0.0,
    }
}

/// Points at index `total_starters + total_bench`. Falls back to the last
/// player when the pool is not that deep, and to 0 for an empty pool.
pub fn replacement_level(players: &[Player], total_starters: usize, total_bench: usize) -> f64 {
    let index = total_starters.saturating_add(total_bench);
    if let Some(player) = players.get(index) {
        return player.points;
    }
    match players.last() {
        Some(last) => {
            debug!(
                "replacement index {} beyond pool of {}, using last player",
                index,
                players.len()
            );
            last.points
        }
        None => 0.0,
    }
}

/// Compute both levels for every true position.
pub fn compute_baselines(
    pool: &PlayerPool,
    league: &LeagueConfig,
    allocation: &StarterAllocation,
) -> BaselineSet {
    let levels = Position::ALL
        .into_iter()
        .map(|pos| {
            let players = pool.players(pos);
            let starters = allocation.total(pos);
            let bench = league.bench_slots(pos);
            let baseline = Baseline {
                replacement: replacement_level(players, starters, bench),
                last_starter: last_starter_level(players, starters),
            };
            debug!(
                "{}: starters={} bench={} replacement={:.1} last_starter={:.1}",
                pos, starters, bench, baseline.replacement, baseline.last_starter
            );
            (pos, baseline)
        })
        .collect();

    BaselineSet { levels }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
