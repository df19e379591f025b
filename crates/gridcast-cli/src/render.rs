// Plain-text tables for terminal output.

use std::fmt::Write;

use gridcast_core::draft::pick::DraftPick;
use gridcast_core::valuation::vona::{PositionOutlook, VonaEntry, VonaReport};
use gridcast_core::valuation::vor::{AllocationRow, ValuedPlayer};

pub fn allocation_table(rows: &[AllocationRow]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<4} {:>6} {:>4} {:>5} {:>6} {:>6} {:>8} {:>8}",
        "POS", "DIRECT", "SF", "FLEX", "TOTAL", "BENCH", "REPL", "LAST"
    );
    for r in rows {
        let _ = writeln!(
            out,
            "{:<4} {:>6} {:>4} {:>5} {:>6} {:>6} {:>8.1} {:>8.1}",
            r.position.display_str(),
            r.direct,
            r.superflex,
            r.flex,
            r.total,
            r.bench,
            r.replacement_level,
            r.last_starter_level
        );
    }
    out
}

pub fn valuation_table(players: &[ValuedPlayer], top: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>4}  {:<26} {:<4} {:<4} {:>7} {:>7} {:>7}",
        "#", "NAME", "TEAM", "POS", "FPTS", "VOR", "VOLS"
    );
    for (i, v) in players.iter().take(top).enumerate() {
        let _ = writeln!(
            out,
            "{:>4}  {:<26} {:<4} {:<4} {:>7.1} {:>7.1} {:>7.1}",
            i + 1,
            truncate(&v.player.name, 26),
            v.player.team.as_deref().unwrap_or("-"),
            v.player.position.display_str(),
            v.player.points,
            v.vor,
            v.vols
        );
    }
    out
}

pub fn vona_header(report: &VonaReport) -> String {
    format!(
        "Target pick {} | {} picks made | {} picks until target | round {}\n",
        report.target_pick, report.picks_made, report.picks_until_target, report.round
    )
}

pub fn position_table(positions: &[PositionOutlook]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<4} {:<24} {:>7} {:>8} {:>6} {:<9} {:>8} {:>5}  {}",
        "POS", "BEST", "NOW", "AT PICK", "GAP", "TIER", "SCARCITY", "LEFT", "CALL"
    );
    for o in positions {
        let _ = writeln!(
            out,
            "{:<4} {:<24} {:>7.1} {:>8.1} {:>6.1} {:<9} {:>8.3} {:>5}  {}",
            o.position.display_str(),
            truncate(o.best_player.as_deref().unwrap_or("-"), 24),
            o.current_best,
            o.expected_at_pick,
            o.gap,
            o.tier_break.label(),
            o.scarcity,
            o.players_remaining,
            o.recommendation.label()
        );
    }
    out
}

pub fn vona_board(board: &[VonaEntry], top: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>4}  {:<26} {:<4} {:>7} {:>8} {:>7}",
        "#", "NAME", "POS", "FPTS", "EXPECTED", "VONA"
    );
    for (i, e) in board.iter().take(top).enumerate() {
        let _ = writeln!(
            out,
            "{:>4}  {:<26} {:<4} {:>7.1} {:>8.1} {:>+7.1}",
            i + 1,
            truncate(&e.player.name, 26),
            e.player.position.display_str(),
            e.player.points,
            e.expected_value,
            e.vona
        );
    }
    out
}

pub fn pick_table(picks: &[DraftPick], num_teams: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:>5} {:>5}  {:<26} {:<4}", "PICK", "ROUND", "PLAYER", "POS");
    for p in picks {
        let _ = writeln!(
            out,
            "{:>5} {:>5}  {:<26} {:<4}",
            p.pick_number,
            p.round(num_teams),
            truncate(&p.player_name, 26),
            p.position
        );
    }
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut t: String = s.chars().take(max.saturating_sub(1)).collect();
        t.push('~');
        t
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridcast_core::player::{Player, Position};

    fn player(name: &str, position: Position, points: f64) -> Player {
        Player {
            name: name.into(),
            team: Some("DET".into()),
            position,
            points,
            rank: None,
            source_row: 2,
        }
    }

    #[test]
    fn truncate_long_names() {
        assert_eq!(truncate("Short", 10), "Short");
        assert_eq!(truncate("Amon-Ra St. Brown", 8), "Amon-Ra~");
    }

    #[test]
    fn valuation_table_respects_top() {
        let players: Vec<ValuedPlayer> = (0..5)
            .map(|i| ValuedPlayer {
                player: player(&format!("WR {i}"), Position::WideReceiver, 200.0 - i as f64),
                vor: 50.0 - i as f64,
                vols: 10.0,
            })
            .collect();

        let text = valuation_table(&players, 3);
        assert_eq!(text.lines().count(), 4);
        assert!(text.lines().nth(1).unwrap().contains("WR 0"));
        assert!(text.contains("50.0"));
    }

    #[test]
    fn vona_board_signs_values() {
        let board = vec![VonaEntry {
            player: player("Jahmyr Gibbs", Position::RunningBack, 270.0),
            expected_value: 280.0,
            vona: -10.0,
        }];
        let text = vona_board(&board, 10);
        assert!(text.contains("-10.0"));
        assert!(text.contains("Jahmyr Gibbs"));
    }

    #[test]
    fn pick_table_shows_rounds() {
        let picks = vec![DraftPick {
            pick_number: 13,
            player_name: "Sam LaPorta".into(),
            position: "TE".into(),
            recorded_at: None,
        }];
        let text = pick_table(&picks, 12);
        let row = text.lines().nth(1).unwrap();
        assert!(row.trim_start().starts_with("13     2"));
    }
}
