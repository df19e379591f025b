// Players, true positions, bonus roster slots, and the per-position pool.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::draft::state::DraftState;

// ---------------------------------------------------------------------------
// Positions
// ---------------------------------------------------------------------------

/// A player's true position. Never a roster slot: FLEX and SF are modelled
/// separately as [`BonusSlot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Position {
    #[serde(rename = "QB")]
    Quarterback,
    #[serde(rename = "RB")]
    RunningBack,
    #[serde(rename = "WR")]
    WideReceiver,
    #[serde(rename = "TE")]
    TightEnd,
    #[serde(rename = "DST")]
    Defense,
    #[serde(rename = "K")]
    Kicker,
}

impl Position {
    /// Every true position in display order.
    pub const ALL: [Position; 6] = [
        Position::Quarterback,
        Position::RunningBack,
        Position::WideReceiver,
        Position::TightEnd,
        Position::Defense,
        Position::Kicker,
    ];

    /// Parse a position code. Accepts the common aliases "D/ST", "DEF" and
    /// "PK". Roster-slot codes (FLEX, SF) are not positions and return `None`.
    pub fn from_str_pos(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "QB" => Some(Position::Quarterback),
            "RB" => Some(Position::RunningBack),
            "WR" => Some(Position::WideReceiver),
            "TE" => Some(Position::TightEnd),
            "DST" | "D/ST" | "DEF" => Some(Position::Defense),
            "K" | "PK" => Some(Position::Kicker),
            _ => None,
        }
    }

    pub fn display_str(&self) -> &'static str {
        match self {
            Position::Quarterback => "QB",
            Position::RunningBack => "RB",
            Position::WideReceiver => "WR",
            Position::TightEnd => "TE",
            Position::Defense => "DST",
            Position::Kicker => "K",
        }
    }

    /// Whether a player at this position may fill the given bonus slot.
    ///
    /// | position | SF  | FLEX |
    /// |----------|-----|------|
    /// | QB       | yes | no   |
    /// | RB/WR/TE | yes | yes  |
    /// | DST/K    | no  | no   |
    pub fn is_eligible_for(&self, slot: BonusSlot) -> bool {
        match (self, slot) {
            (Position::Quarterback, BonusSlot::Superflex) => true,
            (Position::Quarterback, BonusSlot::Flex) => false,
            (Position::RunningBack | Position::WideReceiver | Position::TightEnd, _) => true,
            (Position::Defense | Position::Kicker, _) => false,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_str())
    }
}

/// Cross-position starting slots that are filled after direct requirements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BonusSlot {
    #[serde(rename = "SF")]
    Superflex,
    #[serde(rename = "FLEX")]
    Flex,
}

impl BonusSlot {
    pub fn from_str_slot(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "SF" | "SFLEX" | "SUPERFLEX" | "OP" => Some(BonusSlot::Superflex),
            "FLEX" | "W/R/T" => Some(BonusSlot::Flex),
            _ => None,
        }
    }

    pub fn display_str(&self) -> &'static str {
        match self {
            BonusSlot::Superflex => "SF",
            BonusSlot::Flex => "FLEX",
        }
    }

    /// Positions eligible for this slot, in display order.
    pub fn eligible_positions(&self) -> Vec<Position> {
        Position::ALL
            .into_iter()
            .filter(|p| p.is_eligible_for(*self))
            .collect()
    }
}

impl fmt::Display for BonusSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_str())
    }
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// One row of the projection input. Immutable for the length of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub team: Option<String>,
    pub position: Position,
    /// Projected fantasy points.
    pub points: f64,
    /// External rank from the input. Informational only.
    pub rank: Option<u32>,
    /// Line number of the source row, kept for write-back.
    pub source_row: usize,
}

impl Player {
    /// Case-insensitive key used for drafted-status matching.
    pub fn name_key(&self) -> String {
        normalize_name(&self.name)
    }
}

/// Normalize a player name for case-insensitive comparison.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

// ---------------------------------------------------------------------------
// PlayerPool
// ---------------------------------------------------------------------------

/// Players grouped by true position, each group sorted by points descending.
///
/// Equal-point players are ordered by name so that every pass over the same
/// input sees the same ordering.
#[derive(Debug, Clone, Default)]
pub struct PlayerPool {
    by_position: HashMap<Position, Vec<Player>>,
}

impl PlayerPool {
    pub fn new(players: Vec<Player>) -> Self {
        let mut by_position: HashMap<Position, Vec<Player>> = HashMap::new();
        for player in players {
            by_position.entry(player.position).or_default().push(player);
        }
        for group in by_position.values_mut() {
            group.sort_by(|a, b| {
                b.points
                    .partial_cmp(&a.points)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| a.name.cmp(&b.name))
            });
        }
        PlayerPool { by_position }
    }

    /// Sorted players at `position`. Empty when the position has no players.
    pub fn players(&self, position: Position) -> &[Player] {
        self.by_position
            .get(&position)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.by_position.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate every player, position by position in display order.
    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        Position::ALL
            .into_iter()
            .flat_map(move |p| self.players(p).iter())
    }

    /// Find a player by case-insensitive name.
    pub fn find(&self, name: &str) -> Option<&Player> {
        let key = normalize_name(name);
        self.iter().find(|p| p.name_key() == key)
    }

    /// A new pool holding only players not yet drafted.
    pub fn without_drafted(&self, draft: &DraftState) -> PlayerPool {
        self.without_names(draft.drafted_names())
    }

    /// A new pool excluding every player whose normalized name is in `names`.
    pub fn without_names(&self, names: &HashSet<String>) -> PlayerPool {
        let by_position = self
            .by_position
            .iter()
            .map(|(&pos, group)| {
                let kept: Vec<Player> = group
                    .iter()
                    .filter(|p| !names.contains(&p.name_key()))
                    .cloned()
                    .collect();
                (pos, kept)
            })
            .collect();
        PlayerPool { by_position }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

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

    #[test]
    fn position_parsing_and_aliases() {
        assert_eq!(Position::from_str_pos("qb"), Some(Position::Quarterback));
        assert_eq!(Position::from_str_pos(" WR "), Some(Position::WideReceiver));
        assert_eq!(Position::from_str_pos("D/ST"), Some(Position::Defense));
        assert_eq!(Position::from_str_pos("PK"), Some(Position::Kicker));
        assert_eq!(Position::from_str_pos("FLEX"), None);
        assert_eq!(Position::from_str_pos("SF"), None);
        assert_eq!(Position::from_str_pos(""), None);
    }

    #[test]
    fn eligibility_table() {
        assert_eq!(
            BonusSlot::Superflex.eligible_positions(),
            vec![
                Position::Quarterback,
                Position::RunningBack,
                Position::WideReceiver,
                Position::TightEnd,
            ]
        );
        assert_eq!(
            BonusSlot::Flex.eligible_positions(),
            vec![Position::RunningBack, Position::WideReceiver, Position::TightEnd]
        );
        assert!(!Position::Kicker.is_eligible_for(BonusSlot::Superflex));
        assert!(!Position::Defense.is_eligible_for(BonusSlot::Flex));
    }

    #[test]
    fn pool_groups_and_sorts_descending() {
        let pool = PlayerPool::new(vec![
            make_player("RB Low", Position::RunningBack, 100.0),
            make_player("QB A", Position::Quarterback, 300.0),
            make_player("RB High", Position::RunningBack, 250.0),
            make_player("RB Mid", Position::RunningBack, 180.0),
        ]);

        let rbs: Vec<&str> = pool
            .players(Position::RunningBack)
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(rbs, vec!["RB High", "RB Mid", "RB Low"]);
        assert_eq!(pool.players(Position::Quarterback).len(), 1);
        assert!(pool.players(Position::Kicker).is_empty());
        assert_eq!(pool.len(), 4);
        assert!(!pool.is_empty());
        assert!(PlayerPool::new(Vec::new()).is_empty());
    }

    #[test]
    fn equal_points_order_by_name() {
        let pool = PlayerPool::new(vec![
            make_player("Zed", Position::TightEnd, 90.0),
            make_player("Abe", Position::TightEnd, 90.0),
        ]);
        assert_eq!(pool.players(Position::TightEnd)[0].name, "Abe");
    }

    #[test]
    fn find_is_case_insensitive() {
        let pool = PlayerPool::new(vec![make_player("Josh Allen", Position::Quarterback, 380.0)]);
        assert!(pool.find("JOSH ALLEN").is_some());
        assert!(pool.find("  josh allen ").is_some());
        assert!(pool.find("Josh Allan").is_none());
    }

    #[test]
    fn without_names_filters_case_insensitively() {
        let pool = PlayerPool::new(vec![
            make_player("Bijan Robinson", Position::RunningBack, 290.0),
            make_player("Breece Hall", Position::RunningBack, 270.0),
        ]);
        let drafted: HashSet<String> = ["BIJAN ROBINSON"].iter().map(|n| normalize_name(n)).collect();
        let available = pool.without_names(&drafted);
        assert_eq!(available.len(), 1);
        assert_eq!(available.players(Position::RunningBack)[0].name, "Breece Hall");
        // Source pool untouched.
        assert_eq!(pool.len(), 2);
    }
}
