// Value Over Replacement (VOR) and Value Over Last Starter (VOLS).
//
// Both are plain differences against the per-position baselines, rounded to
// one decimal. This pass only annotates; allocation and baselines are inputs.

use serde::Serialize;

use crate::config::LeagueConfig;
use crate::player::{Player, PlayerPool, Position};
use crate::valuation::allocation::StarterAllocation;
use crate::valuation::baseline::BaselineSet;

/// Round to one decimal place, half away from zero.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// A player annotated with VOR and VOLS.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValuedPlayer {
    #[serde(flatten)]
    pub player: Player,
    pub vor: f64,
    pub vols: f64,
}

pub fn value_player(player: &Player, baselines: &BaselineSet) -> ValuedPlayer {
    let baseline = baselines.get(player.position);
    ValuedPlayer {
        player: player.clone(),
        vor: round1(player.points - baseline.replacement),
        vols: round1(player.points - baseline.last_starter),
    }
}

/// Annotate every player in the pool, sorted by VOR descending
/// (ties: points descending, then name).
pub fn apply_vor(pool: &PlayerPool, baselines: &BaselineSet) -> Vec<ValuedPlayer> {
    let mut valued: Vec<ValuedPlayer> = pool
        .iter()
        .map(|p| value_player(p, baselines))
        .collect();

    valued.sort_by(|a, b| {
        b.vor
            .partial_cmp(&a.vor)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| {
                b.player
                    .points
                    .partial_cmp(&a.player.points)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .then_with(|| a.player.name.cmp(&b.player.name))
    });

    valued
}

// ---------------------------------------------------------------------------
// Allocation report
// ---------------------------------------------------------------------------

/// One line of the allocation report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllocationRow {
    pub position: Position,
    pub direct: usize,
    pub superflex: usize,
    pub flex: usize,
    pub total: usize,
    pub bench: usize,
    pub replacement_level: f64,
    pub last_starter_level: f64,
}

pub fn allocation_report(
    league: &LeagueConfig,
    allocation: &StarterAllocation,
    baselines: &BaselineSet,
) -> Vec<AllocationRow> {
    Position::ALL
        .into_iter()
        .map(|pos| AllocationRow {
            position: pos,
            direct: allocation.direct(pos),
            superflex: allocation.superflex(pos),
            flex: allocation.flex(pos),
            total: allocation.total(pos),
            bench: league.bench_slots(pos),
            replacement_level: baselines.replacement(pos),
            last_starter_level: baselines.last_starter(pos),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::valuation::allocation::allocate_starters;
    use crate::valuation::baseline::compute_baselines;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    fn make_player(name: &str, position: Position, points: f64) -> Player {
        Player {
            name: name.into(),
            team: None,
            position,
            points,
            rank: None,
            source_row: 0,
        }
    }

    fn small_pool() -> PlayerPool {
        PlayerPool::new(vec![
            make_player("QB1", Position::Quarterback, 350.0),
            make_player("QB2", Position::Quarterback, 320.0),
            make_player("QB3", Position::Quarterback, 290.0),
            make_player("QB4", Position::Quarterback, 260.0),
            make_player("TE1", Position::TightEnd, 180.0),
            make_player("TE2", Position::TightEnd, 140.0),
            make_player("TE3", Position::TightEnd, 120.0),
        ])
    }

    fn two_team_league() -> LeagueConfig {
        LeagueConfig::new("Two", 2)
            .with_requirement(Position::Quarterback, 1.0, 0.5)
            .with_requirement(Position::TightEnd, 1.0, 0.0)
    }

    #[test]
    fn round1_half_away_from_zero() {
        assert_eq!(round1(12.25), 12.3);
        assert_eq!(round1(-12.25), -12.3);
        assert_eq!(round1(7.04), 7.0);
        assert_eq!(round1(0.0), 0.0);
    }

    #[test]
    fn vor_and_vols_against_baselines() {
        let pool = small_pool();
        let league = two_team_league();
        let alloc = allocate_starters(&pool, &league);
        let baselines = compute_baselines(&pool, &league, &alloc);

        // QB: 2 starters, 1 bench -> last starter 320, replacement 260.
        let valued = apply_vor(&pool, &baselines);
        let qb1 = valued.iter().find(|v| v.player.name == "QB1").unwrap();
        assert!(approx_eq(qb1.vor, 90.0, 1e-9));
        assert!(approx_eq(qb1.vols, 30.0, 1e-9));

        // TE: 2 starters, no bench -> last starter 140, replacement 120.
        let te3 = valued.iter().find(|v| v.player.name == "TE3").unwrap();
        assert!(approx_eq(te3.vor, 0.0, 1e-9));
        assert!(approx_eq(te3.vols, -20.0, 1e-9));
    }

    #[test]
    fn sorted_by_vor_descending() {
        let pool = small_pool();
        let league = two_team_league();
        let alloc = allocate_starters(&pool, &league);
        let valued = apply_vor(&pool, &compute_baselines(&pool, &league, &alloc));

        assert_eq!(valued.len(), 7);
        assert_eq!(valued[0].player.name, "QB1");
        for pair in valued.windows(2) {
            assert!(pair[0].vor >= pair[1].vor);
        }
    }

    #[test]
    fn annotation_is_idempotent() {
        let pool = small_pool();
        let league = two_team_league();
        let alloc = allocate_starters(&pool, &league);
        let baselines = compute_baselines(&pool, &league, &alloc);

        let first = apply_vor(&pool, &baselines);
        let second = apply_vor(&pool, &baselines);
        assert_eq!(first, second);
        // Allocation untouched by the annotation pass.
        assert_eq!(allocate_starters(&pool, &league), alloc);
    }

    #[test]
    fn report_has_one_row_per_position() {
        let pool = small_pool();
        let league = two_team_league();
        let alloc = allocate_starters(&pool, &league);
        let baselines = compute_baselines(&pool, &league, &alloc);
        let rows = allocation_report(&league, &alloc, &baselines);

        assert_eq!(rows.len(), Position::ALL.len());
        let qb = &rows[0];
        assert_eq!(qb.position, Position::Quarterback);
        assert_eq!(qb.direct, 2);
        assert_eq!(qb.total, 2);
        assert_eq!(qb.bench, 1);
        assert!(approx_eq(qb.replacement_level, 260.0, 1e-9));
        assert!(approx_eq(qb.last_starter_level, 320.0, 1e-9));
    }
}
