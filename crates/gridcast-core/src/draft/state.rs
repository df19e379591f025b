// Draft state: which players are gone and how many picks have been made.

use std::collections::HashSet;

use serde::Serialize;

use super::pick::{round_of_pick, DraftPick};
use crate::player::normalize_name;

/// Snapshot of a live draft as seen by the VONA projector.
///
/// Names are stored normalized so lookups ignore case and surrounding
/// whitespace.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DraftState {
    drafted: HashSet<String>,
    pick_count: usize,
}

impl DraftState {
    /// A draft with no picks made.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the state from the recorded picks.
    pub fn from_picks(picks: &[DraftPick]) -> Self {
        let drafted = picks
            .iter()
            .map(|p| normalize_name(&p.player_name))
            .collect();
        DraftState {
            drafted,
            pick_count: picks.len(),
        }
    }

    /// Build from a bare set of names. `pick_count` is given separately
    /// because picks of players outside the pool still advance the draft.
    pub fn from_names<I, S>(names: I, pick_count: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let drafted: HashSet<String> = names
            .into_iter()
            .map(|n| normalize_name(n.as_ref()))
            .collect();
        let pick_count = pick_count.max(drafted.len());
        DraftState {
            drafted,
            pick_count,
        }
    }

    pub fn is_drafted(&self, name: &str) -> bool {
        self.drafted.contains(&normalize_name(name))
    }

    pub fn drafted_names(&self) -> &HashSet<String> {
        &self.drafted
    }

    /// Number of picks already made.
    pub fn pick_count(&self) -> usize {
        self.pick_count
    }

    /// The pick currently on the clock (1-based).
    pub fn current_pick(&self) -> usize {
        self.pick_count + 1
    }

    pub fn current_round(&self, num_teams: usize) -> usize {
        round_of_pick(self.current_pick(), num_teams)
    }
}
