// Value Over Next Available (VONA) projection.
//
// Estimates, per position, the points of the best player likely still on the
// board at a future pick, and compares every available player against that
// estimate. The draft-rate heuristic is round sensitive and tunable through
// `DraftRateModel`.

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{DraftRateModel, LeagueConfig};
use crate::draft::state::DraftState;
use crate::player::{Player, PlayerPool, Position};
use crate::valuation::scarcity::{scarcity_index, tier_break, window_average, TierBreak};
use crate::valuation::vor::round1;

#[derive(Debug, Error, PartialEq)]
pub enum VonaError {
    #[error("target pick must be 1 or greater")]
    InvalidTargetPick,
}

// ---------------------------------------------------------------------------
// Draft-rate model
// ---------------------------------------------------------------------------

/// Share of the picks until the target expected to go to `position` in
/// `round`. Never above 1.0.
pub fn draft_rate(model: &DraftRateModel, position: Position, round: usize) -> f64 {
    let base = model.base_rates.get(position);
    let multiplier = if round <= model.early_round_max {
        match position {
            Position::RunningBack | Position::WideReceiver => model.early_boost,
            Position::Defense | Position::Kicker => model.early_suppress,
            _ => 1.0,
        }
    } else if round <= model.middle_round_max {
        match position {
            Position::Quarterback | Position::TightEnd => model.middle_boost,
            _ => 1.0,
        }
    } else {
        match position {
            Position::Defense | Position::Kicker => model.late_boost,
            _ => 1.0,
        }
    };
    (base * multiplier).min(1.0)
}

/// Picks other teams make before `target_pick` comes up. 0 when the target
/// is on the clock or already past.
pub fn picks_until(target_pick: usize, picks_made: usize) -> usize {
    target_pick.saturating_sub(picks_made + 1)
}

/// `floor(picks_until * rate)`.
pub fn expected_drafted(picks_until: usize, rate: f64) -> usize {
    let expected = (picks_until as f64 * rate).floor();
    if expected.is_finite() && expected > 0.0 {
        expected as usize
    } else {
        0
    }
}

/// Expected points of the best player left at `position` once
/// `expected_drafted` of them are gone.
///
/// Averages the +/-1 window around the expected index (clamped to the
/// pool). With nothing expected to go, the top player is the baseline.
pub fn expected_value(players: &[Player], expected_drafted: usize) -> f64 {
    let Some(top) = players.first() else {
        return 0.0;
    };
    if expected_drafted == 0 {
        return top.points;
    }
    let index = expected_drafted.min(players.len() - 1);
    let lo = index.saturating_sub(1);
    let hi = (index + 1).min(players.len() - 1);
    window_average(players, lo, hi - lo + 1)
}

// ---------------------------------------------------------------------------
// Recommendation tiers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Recommendation {
    /// Gap above 20 points.
    Priority,
    /// Gap above 10 points.
    Consider,
    /// Gap above 5 points.
    CanWait,
    SafeToWait,
    /// Nobody left at the position.
    NoPlayers,
}

impl Recommendation {
    pub fn from_gap(gap: f64) -> Self {
        if gap > 20.0 {
            Recommendation::Priority
        } else if gap > 10.0 {
            Recommendation::Consider
        } else if gap > 5.0 {
            Recommendation::CanWait
        } else {
            Recommendation::SafeToWait
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Recommendation::Priority => "priority",
            Recommendation::Consider => "consider",
            Recommendation::CanWait => "can wait",
            Recommendation::SafeToWait => "safe to wait",
            Recommendation::NoPlayers => "no players available",
        }
    }
}

// ---------------------------------------------------------------------------
// Report types
// ---------------------------------------------------------------------------

/// An available player scored against the expected value at the target.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VonaEntry {
    #[serde(flatten)]
    pub player: Player,
    pub expected_value: f64,
    pub vona: f64,
}

/// How a position looks now versus at the target pick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionOutlook {
    pub position: Position,
    /// Best available player right now.
    pub best_player: Option<String>,
    pub current_best: f64,
    pub expected_at_pick: f64,
    pub gap: f64,
    pub draft_rate: f64,
    pub expected_drafted: usize,
    pub players_remaining: usize,
    pub tier_break: TierBreak,
    pub scarcity: f64,
    pub recommendation: Recommendation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VonaReport {
    pub target_pick: usize,
    pub picks_made: usize,
    pub picks_until_target: usize,
    /// Round of the pick currently on the clock.
    pub round: usize,
    /// Available players, highest VONA first.
    pub board: Vec<VonaEntry>,
    /// One entry per true position, in display order.
    pub positions: Vec<PositionOutlook>,
    pub insights: Vec<String>,
}

impl VonaReport {
    pub fn outlook(&self, position: Position) -> Option<&PositionOutlook> {
        self.positions.iter().find(|o| o.position == position)
    }
}

// ---------------------------------------------------------------------------
// Projection
// ---------------------------------------------------------------------------

/// Outlook for one position, paired with the unrounded expected value so the
/// board can measure VONA against it.
fn position_outlook(
    position: Position,
    players: &[Player],
    picks_until_target: usize,
    round: usize,
    model: &DraftRateModel,
) -> (PositionOutlook, f64) {
    let rate = draft_rate(model, position, round);
    let drafted = expected_drafted(picks_until_target, rate);
    let expected = expected_value(players, drafted);

    let Some(best) = players.first() else {
        let outlook = PositionOutlook {
            position,
            best_player: None,
            current_best: 0.0,
            expected_at_pick: 0.0,
            gap: 0.0,
            draft_rate: rate,
            expected_drafted: drafted,
            players_remaining: 0,
            tier_break: TierBreak::Gradual,
            scarcity: 0.0,
            recommendation: Recommendation::NoPlayers,
        };
        return (outlook, 0.0);
    };

    // Classify on the raw gap; only the reported figures are rounded.
    let gap = best.points - expected;
    let outlook = PositionOutlook {
        position,
        best_player: Some(best.name.clone()),
        current_best: best.points,
        expected_at_pick: round1(expected),
        gap: round1(gap),
        draft_rate: rate,
        expected_drafted: drafted,
        players_remaining: players.len(),
        tier_break: tier_break(players),
        scarcity: scarcity_index(players),
        recommendation: Recommendation::from_gap(gap),
    };
    (outlook, expected)
}

/// Run a VONA pass for `target_pick` given the current draft.
///
/// Drafted players are removed from `pool` first, so either the full pool or
/// an already filtered one may be passed.
pub fn project_vona(
    pool: &PlayerPool,
    draft: &DraftState,
    target_pick: usize,
    league: &LeagueConfig,
    model: &DraftRateModel,
) -> Result<VonaReport, VonaError> {
    if target_pick == 0 {
        return Err(VonaError::InvalidTargetPick);
    }

    let available = pool.without_drafted(draft);
    if available.is_empty() {
        warn!("every player has been drafted; the VONA board is empty");
    }
    let picks_made = draft.pick_count();
    let picks_until_target = picks_until(target_pick, picks_made);
    let round = draft.current_round(league.num_teams);

    let (positions, expected): (Vec<PositionOutlook>, Vec<f64>) = Position::ALL
        .into_iter()
        .map(|pos| {
            position_outlook(pos, available.players(pos), picks_until_target, round, model)
        })
        .unzip();

    for outlook in &positions {
        debug!(
            "{}: rate={:.3} expected_drafted={} expected={:.1} gap={:.1}",
            outlook.position,
            outlook.draft_rate,
            outlook.expected_drafted,
            outlook.expected_at_pick,
            outlook.gap
        );
    }

    let mut board: Vec<VonaEntry> = positions
        .iter()
        .zip(expected)
        .flat_map(|(outlook, raw_expected)| {
            available.players(outlook.position).iter().map(move |p| VonaEntry {
                player: p.clone(),
                expected_value: outlook.expected_at_pick,
                vona: round1(p.points - raw_expected),
            })
        })
        .collect();

    board.sort_by(|a, b| {
        b.vona
            .partial_cmp(&a.vona)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| {
                b.player
                    .points
                    .partial_cmp(&a.player.points)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .then_with(|| a.player.name.cmp(&b.player.name))
    });

    let insights = derive_insights(target_pick, &board, &positions);

    info!(
        "VONA pass: target pick {}, {} picks until target, round {}, {} available",
        target_pick,
        picks_until_target,
        round,
        available.len()
    );

    Ok(VonaReport {
        target_pick,
        picks_made,
        picks_until_target,
        round,
        board,
        positions,
        insights,
    })
}

// ---------------------------------------------------------------------------
// Insights
// ---------------------------------------------------------------------------

fn derive_insights(
    target_pick: usize,
    board: &[VonaEntry],
    positions: &[PositionOutlook],
) -> Vec<String> {
    let mut insights = Vec::new();

    let stocked: Vec<&PositionOutlook> = positions
        .iter()
        .filter(|o| o.recommendation != Recommendation::NoPlayers)
        .collect();

    // Ties keep the earlier position in display order.
    let biggest_gap = stocked
        .iter()
        .copied()
        .fold(None::<&PositionOutlook>, |best, o| match best {
            Some(b) if b.gap >= o.gap => Some(b),
            _ => Some(o),
        });
    if let Some(o) = biggest_gap {
        insights.push(format!(
            "Biggest drop by pick {}: {} ({} at {:.1} now, {:.1} expected, gap {:.1})",
            target_pick,
            o.position,
            o.best_player.as_deref().unwrap_or("-"),
            o.current_best,
            o.expected_at_pick,
            o.gap
        ));
    }

    let mut scarce: Vec<&PositionOutlook> =
        stocked.iter().copied().filter(|o| o.scarcity > 0.0).collect();
    scarce.sort_by(|a, b| {
        b.scarcity
            .partial_cmp(&a.scarcity)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    if !scarce.is_empty() {
        let listed: Vec<String> = scarce
            .iter()
            .take(2)
            .map(|o| format!("{} ({:.3})", o.position, o.scarcity))
            .collect();
        insights.push(format!("Scarcest positions: {}", listed.join(", ")));
    }

    if !board.is_empty() {
        let listed: Vec<String> = board
            .iter()
            .take(3)
            .map(|e| format!("{} ({}, {:+.1})", e.player.name, e.player.position, e.vona))
            .collect();
        insights.push(format!("Top VONA: {}", listed.join(", ")));
    }

    let safe: Vec<&str> = stocked
        .iter()
        .filter(|o| o.recommendation == Recommendation::SafeToWait)
        .map(|o| o.position.display_str())
        .collect();
    if !safe.is_empty() {
        insights.push(format!("Safe to wait on: {}", safe.join(", ")));
    }

    insights
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
