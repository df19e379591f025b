// Positional scarcity index and tier-break classification.
//
// Both read the top of a position's sorted available list: how steeply
// talent falls off after the first few players, and how thin the pool is.
// Neither feeds back into VONA itself.

use serde::Serialize;

use crate::player::Player;

// ---------------------------------------------------------------------------
// Averages
// ---------------------------------------------------------------------------

/// Mean of `values`; 0.0 when empty.
pub fn average(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Mean points of `players[skip..skip + take]`, clamped to the slice.
pub fn window_average(players: &[Player], skip: usize, take: usize) -> f64 {
    let points: Vec<f64> = players.iter().skip(skip).take(take).map(|p| p.points).collect();
    average(&points)
}

// ---------------------------------------------------------------------------
// Scarcity index
// ---------------------------------------------------------------------------

/// `(top3Avg - next5Avg) / top3Avg * 10 / (remaining + 10)`.
///
/// The first factor is the relative drop-off after the top tier, the second
/// shrinks as the pool deepens. 0.0 for an empty position or when the top
/// three average to zero.
pub fn scarcity_index(players: &[Player]) -> f64 {
    if players.is_empty() {
        return 0.0;
    }
    let top3 = window_average(players, 0, 3);
    if top3 <= 0.0 {
        return 0.0;
    }
    let next5 = window_average(players, 3, 5);
    let remaining = players.len() as f64;

    (top3 - next5) / top3 * 10.0 / (remaining + 10.0)
}

// ---------------------------------------------------------------------------
// Tier break
// ---------------------------------------------------------------------------

/// Size of the drop between the top three and the next three players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TierBreak {
    /// More than 15% drop.
    Major,
    /// More than 8% drop.
    Moderate,
    Gradual,
}

impl TierBreak {
    pub fn from_drop_pct(drop_pct: f64) -> Self {
        if drop_pct > 15.0 {
            TierBreak::Major
        } else if drop_pct > 8.0 {
            TierBreak::Moderate
        } else {
            TierBreak::Gradual
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TierBreak::Major => "Major",
            TierBreak::Moderate => "Moderate",
            TierBreak::Gradual => "Gradual",
        }
    }
}

/// Percentage drop from the top-3 average to the next-3 average. 0.0 when
/// the top three average to zero.
pub fn tier_drop_pct(players: &[Player]) -> f64 {
    let top3 = window_average(players, 0, 3);
    if top3 <= 0.0 {
        return 0.0;
    }
    let next3 = window_average(players, 3, 3);
    (top3 - next3) / top3 * 100.0
}

pub fn tier_break(players: &[Player]) -> TierBreak {
    TierBreak::from_drop_pct(tier_drop_pct(players))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
