// Valuation engine: starter allocation, baselines, VOR/VOLS and VONA.

pub mod allocation;
pub mod baseline;
pub mod scarcity;
pub mod vona;
pub mod vor;

use serde::Serialize;
use tracing::info;

use crate::config::LeagueConfig;
use crate::player::PlayerPool;
use allocation::{allocate_starters, StarterAllocation};
use baseline::{compute_baselines, BaselineSet};
use vor::{allocation_report, apply_vor, AllocationRow, ValuedPlayer};

/// Output of a full valuation pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValuationReport {
    pub league: String,
    pub num_teams: usize,
    pub allocation: Vec<AllocationRow>,
    /// Every player, highest VOR first.
    pub players: Vec<ValuedPlayer>,
    #[serde(skip)]
    pub starters: StarterAllocation,
    #[serde(skip)]
    pub baselines: BaselineSet,
}

/// Run the full pipeline:
///
/// 1. Allocate direct, SF and Flex starters.
/// 2. Derive replacement and last-starter levels per position.
/// 3. Annotate every player with VOR and VOLS.
pub fn compute_valuations(pool: &PlayerPool, league: &LeagueConfig) -> ValuationReport {
    let starters = allocate_starters(pool, league);
    let baselines = compute_baselines(pool, league, &starters);
    let players = apply_vor(pool, &baselines);
    let allocation = allocation_report(league, &starters, &baselines);

    info!(
        "Valued {} players for {} ({} teams)",
        players.len(),
        league.name,
        league.num_teams
    );

    ValuationReport {
        league: league.name.clone(),
        num_teams: league.num_teams,
        allocation,
        players,
        starters,
        baselines,
    }
}
