// A single recorded draft pick.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::player::Player;

/// One pick in the draft log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftPick {
    /// 1-based overall pick number.
    pub pick_number: u32,
    pub player_name: String,
    /// Position code (e.g. "RB").
    pub position: String,
    /// When the pick was recorded. `None` until persisted.
    #[serde(default)]
    pub recorded_at: Option<DateTime<Utc>>,
}

impl DraftPick {
    /// Build the pick for `player` at overall pick `pick_number`.
    pub fn for_player(pick_number: u32, player: &Player) -> Self {
        DraftPick {
            pick_number,
            player_name: player.name.clone(),
            position: player.position.display_str().to_string(),
            recorded_at: None,
        }
    }

    /// Round this pick falls in for a league of `num_teams`.
    pub fn round(&self, num_teams: usize) -> usize {
        round_of_pick(self.pick_number as usize, num_teams)
    }
}

/// Round containing overall pick `pick` (1-based): `ceil(pick / num_teams)`.
/// Pick 0 is treated as pick 1.
pub fn round_of_pick(pick: usize, num_teams: usize) -> usize {
    let teams = num_teams.max(1);
    pick.max(1).div_ceil(teams)
}
