// Player projection loading and VOR/VOLS write-back.
//
// Reads a single player CSV with Name, Position and FPTS columns (Rank and
// Team optional). Header names are matched case-insensitively and a few
// common aliases are accepted.

use std::ffi::OsString;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::Config;
use crate::player::{Player, PlayerPool, Position};
use crate::valuation::vor::ValuedPlayer;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ProjectionError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("{path}: required column `{column}` is missing")]
    MissingColumn { path: String, column: &'static str },

    #[error("validation error: {0}")]
    Validation(String),
}

// ---------------------------------------------------------------------------
// Header normalization
// ---------------------------------------------------------------------------

/// Canonical column names and the header spellings mapped onto them.
const COLUMN_ALIASES: &[(&str, &[&str])] = &[
    ("Rank", &["rank", "rk", "ecr"]),
    ("Name", &["name", "player", "player name"]),
    ("Team", &["team", "tm"]),
    ("Position", &["position", "pos"]),
    ("FPTS", &["fpts", "points", "proj", "fantasypoints", "fantasy points"]),
];

const REQUIRED_COLUMNS: &[&str] = &["Name", "Position", "FPTS"];

fn canonical_column(header: &str) -> Option<&'static str> {
    let h = header.trim().to_lowercase();
    COLUMN_ALIASES
        .iter()
        .find(|(_, aliases)| aliases.contains(&h.as_str()))
        .map(|(canonical, _)| *canonical)
}

/// Rewrite recognized headers to their canonical names and check that every
/// required column is present.
fn normalize_headers(
    headers: &csv::StringRecord,
    path: &str,
) -> Result<csv::StringRecord, ProjectionError> {
    let normalized: csv::StringRecord = headers
        .iter()
        .map(|h| canonical_column(h).unwrap_or(h))
        .collect();

    for &column in REQUIRED_COLUMNS {
        if !normalized.iter().any(|h| h == column) {
            return Err(ProjectionError::MissingColumn {
                path: path.to_string(),
                column,
            });
        }
    }

    Ok(normalized)
}

// ---------------------------------------------------------------------------
// Raw CSV serde struct (private)
// ---------------------------------------------------------------------------

/// Every field is read as text so one bad number does not drop the row.
#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct RawPlayerRow {
    #[serde(default)]
    Rank: Option<String>,
    Name: String,
    #[serde(default)]
    Team: Option<String>,
    Position: String,
    FPTS: String,
}

fn parse_points(raw: &str, name: &str) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => v,
        Ok(v) if v.is_finite() => {
            warn!("negative FPTS {} for '{}', clamping to 0", v, name);
            0.0
        }
        _ => {
            warn!("unparseable FPTS '{}' for '{}', using 0", raw.trim(), name);
            0.0
        }
    }
}

fn parse_rank(raw: Option<&str>) -> Option<u32> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    raw.parse::<f64>()
        .ok()
        .filter(|r| r.is_finite() && *r >= 0.0)
        .map(|r| r.round() as u32)
}

// ---------------------------------------------------------------------------
// Reader-based loader (enables testing without temp files)
// ---------------------------------------------------------------------------

/// Parse players from CSV. `path` only labels errors.
///
/// Rows with a blank name or an unsupported position are skipped with a
/// warning. A missing required column is an error.
pub fn load_players_from_reader<R: Read>(rdr: R, path: &str) -> Result<Vec<Player>, ProjectionError> {
    let csv_err = |e: csv::Error| ProjectionError::Csv {
        path: path.to_string(),
        source: e,
    };

    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(rdr);
    let headers = normalize_headers(reader.headers().map_err(csv_err)?, path)?;

    let mut players = Vec::new();
    let mut record = csv::StringRecord::new();

    loop {
        match reader.read_record(&mut record) {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) if e.is_io_error() => return Err(csv_err(e)),
            Err(e) => {
                warn!("skipping malformed player row: {}", e);
                continue;
            }
        }

        let line = record.position().map(|p| p.line() as usize).unwrap_or(0);
        let raw: RawPlayerRow = match record.deserialize(Some(&headers)) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("skipping malformed player row at line {}: {}", line, e);
                continue;
            }
        };

        let name = raw.Name.trim();
        if name.is_empty() {
            warn!("skipping row at line {}: blank player name", line);
            continue;
        }

        let Some(position) = Position::from_str_pos(&raw.Position) else {
            warn!(
                "skipping '{}' at line {}: unsupported position '{}'",
                name, line, raw.Position
            );
            continue;
        };

        let team = raw
            .Team
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        players.push(Player {
            name: name.to_string(),
            team,
            position,
            points: parse_points(&raw.FPTS, name),
            rank: parse_rank(raw.Rank.as_deref()),
            source_row: line,
        });
    }

    Ok(players)
}

// ---------------------------------------------------------------------------
// Public path-based loaders
// ---------------------------------------------------------------------------

/// Load players from a CSV file. An input with no usable rows is an error.
pub fn load_players(path: &Path) -> Result<Vec<Player>, ProjectionError> {
    let label = path.display().to_string();
    let file = std::fs::File::open(path).map_err(|e| ProjectionError::Io {
        path: label.clone(),
        source: e,
    })?;
    let players = load_players_from_reader(file, &label)?;

    if players.is_empty() {
        return Err(ProjectionError::Validation(format!(
            "{label} produced zero valid player rows"
        )));
    }

    info!("Loaded {} players from {}", players.len(), label);
    Ok(players)
}

/// Load the configured player file and build a fresh pool from it.
pub fn load_pool(config: &Config) -> Result<PlayerPool, ProjectionError> {
    let players = load_players(&config.players_path())?;
    Ok(PlayerPool::new(players))
}

// ---------------------------------------------------------------------------
// Write-back
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[allow(non_snake_case)]
struct ValuationRow<'a> {
    Row: usize,
    Name: &'a str,
    Team: &'a str,
    Position: &'static str,
    FPTS: f64,
    VOR: f64,
    VOLS: f64,
}

/// Write VOR/VOLS per player, ordered by source row, to any writer.
pub fn write_valuations_to_writer<W: Write>(
    wtr: W,
    players: &[ValuedPlayer],
) -> Result<(), csv::Error> {
    let mut ordered: Vec<&ValuedPlayer> = players.iter().collect();
    ordered.sort_by_key(|v| v.player.source_row);

    let mut writer = csv::Writer::from_writer(wtr);
    for v in ordered {
        writer.serialize(ValuationRow {
            Row: v.player.source_row,
            Name: &v.player.name,
            Team: v.player.team.as_deref().unwrap_or(""),
            Position: v.player.position.display_str(),
            FPTS: v.player.points,
            VOR: v.vor,
            VOLS: v.vols,
        })?;
    }
    writer.flush()?;
    Ok(())
}

/// Sibling path the CSV is staged at before being renamed over `path`.
fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write VOR/VOLS per player to a CSV file.
///
/// The rows go to a sibling `.tmp` file that replaces `path` only once it
/// is complete; on failure `path` is left as it was.
pub fn write_valuations(path: &Path, players: &[ValuedPlayer]) -> Result<(), ProjectionError> {
    let label = path.display().to_string();
    let staging = staging_path(path);

    let result = std::fs::File::create(&staging)
        .map_err(|e| ProjectionError::Io {
            path: label.clone(),
            source: e,
        })
        .and_then(|file| {
            write_valuations_to_writer(file, players).map_err(|e| ProjectionError::Csv {
                path: label.clone(),
                source: e,
            })
        })
        .and_then(|()| {
            std::fs::rename(&staging, path).map_err(|e| ProjectionError::Io {
                path: label.clone(),
                source: e,
            })
        });

    if result.is_err() {
        let _ = std::fs::remove_file(&staging);
    }
    result?;

    info!("Wrote {} valuations to {}", players.len(), label);
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn load(csv_data: &str) -> Result<Vec<Player>, ProjectionError> {
        load_players_from_reader(csv_data.as_bytes(), "test.csv")
    }

    #[test]
    fn basic_rows_parse() {
        let csv_data = "\
Rank,Name,Team,Position,FPTS
1,Christian McCaffrey,SF,RB,355.2
2,Josh Allen,BUF,QB,390.5";

        let players = load(csv_data).unwrap();
        assert_eq!(players.len(), 2);

        assert_eq!(players[0].name, "Christian McCaffrey");
        assert_eq!(players[0].team.as_deref(), Some("SF"));
        assert_eq!(players[0].position, Position::RunningBack);
        assert!((players[0].points - 355.2).abs() < f64::EPSILON);
        assert_eq!(players[0].rank, Some(1));
        // Header is line 1, so the first data row is line 2.
        assert_eq!(players[0].source_row, 2);

        assert_eq!(players[1].position, Position::Quarterback);
        assert_eq!(players[1].source_row, 3);
    }

    #[test]
    fn header_aliases_and_case() {
        let csv_data = "\
player,POS,tm,Points,Rk
Travis Kelce,te,KC,210.0,30";

        let players = load(csv_data).unwrap();
        assert_eq!(players.len(), 1);
        assert_eq!(players[0].name, "Travis Kelce");
        assert_eq!(players[0].position, Position::TightEnd);
        assert_eq!(players[0].team.as_deref(), Some("KC"));
        assert_eq!(players[0].rank, Some(30));
    }

    #[test]
    fn optional_columns_may_be_absent() {
        let csv_data = "\
Name,Position,FPTS
Justin Tucker,K,150";

        let players = load(csv_data).unwrap();
        assert_eq!(players[0].team, None);
        assert_eq!(players[0].rank, None);
    }

    #[test]
    fn missing_required_column_is_an_error() {
        let csv_data = "\
Name,Team,FPTS
Josh Allen,BUF,390.5";

        match load(csv_data).unwrap_err() {
            ProjectionError::MissingColumn { column, .. } => assert_eq!(column, "Position"),
            other => panic!("expected MissingColumn, got: {other}"),
        }

        let csv_data = "\
Name,Position
Josh Allen,QB";
        match load(csv_data).unwrap_err() {
            ProjectionError::MissingColumn { column, .. } => assert_eq!(column, "FPTS"),
            other => panic!("expected MissingColumn, got: {other}"),
        }
    }

    #[test]
    fn unparseable_points_default_to_zero() {
        let csv_data = "\
Name,Position,FPTS
Mystery Man,WR,n/a
Blank Points,WR,
Negative,WR,-5";

        let players = load(csv_data).unwrap();
        assert_eq!(players.len(), 3);
        assert!(players.iter().all(|p| p.points == 0.0));
    }

    #[test]
    fn unsupported_position_and_blank_name_skipped() {
        let csv_data = "\
Name,Position,FPTS
Valid RB,RB,200
Linebacker,LB,120
,WR,150
Valid WR,WR,180";

        let players = load(csv_data).unwrap();
        let names: Vec<&str> = players.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Valid RB", "Valid WR"]);
        assert_eq!(players[1].source_row, 5);
    }

    #[test]
    fn malformed_row_skipped() {
        let csv_data = "\
Name,Position,FPTS
Good,QB,300
Too,Many,Fields,Here
Also Good,QB,280";

        let players = load(csv_data).unwrap();
        assert_eq!(players.len(), 2);
        assert_eq!(players[1].name, "Also Good");
    }

    #[test]
    fn names_and_teams_trimmed() {
        let csv_data = "\
Name,Team,Position,FPTS
  Bijan Robinson  ,  ATL ,RB,290
Free Agent,,RB,50";

        let players = load(csv_data).unwrap();
        assert_eq!(players[0].name, "Bijan Robinson");
        assert_eq!(players[0].team.as_deref(), Some("ATL"));
        assert_eq!(players[1].team, None);
    }

    #[test]
    fn empty_csv_returns_empty_vec() {
        let players = load("Name,Position,FPTS").unwrap();
        assert!(players.is_empty());
    }

    #[test]
    fn empty_file_fails_validation() {
        let path = std::env::temp_dir().join("gridcast_empty_players.csv");
        std::fs::write(&path, "Name,Position,FPTS\n").unwrap();

        match load_players(&path).unwrap_err() {
            ProjectionError::Validation(msg) => assert!(msg.contains("zero valid player rows")),
            other => panic!("expected Validation, got: {other}"),
        }

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn write_back_orders_by_source_row() {
        let players = load(
            "\
Name,Team,Position,FPTS
A,BUF,QB,300
B,,RB,200",
        )
        .unwrap();

        let valued = vec![
            ValuedPlayer {
                player: players[1].clone(),
                vor: 12.5,
                vols: -3.0,
            },
            ValuedPlayer {
                player: players[0].clone(),
                vor: 40.0,
                vols: 10.1,
            },
        ];

        let mut out = Vec::new();
        write_valuations_to_writer(&mut out, &valued).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Row,Name,Team,Position,FPTS,VOR,VOLS");
        assert_eq!(lines[1], "2,A,BUF,QB,300.0,40.0,10.1");
        assert_eq!(lines[2], "3,B,,RB,200.0,12.5,-3.0");
    }

    fn one_valued_player() -> Vec<ValuedPlayer> {
        let players = load("Name,Team,Position,FPTS\nA,BUF,QB,300").unwrap();
        vec![ValuedPlayer {
            player: players[0].clone(),
            vor: 40.0,
            vols: 10.0,
        }]
    }

    #[test]
    fn write_valuations_replaces_existing_file() {
        let dir = std::env::temp_dir().join("gridcast_write_replace");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let out = dir.join("valued.csv");
        std::fs::write(&out, "stale contents that are longer than the new file\n".repeat(20))
            .unwrap();

        write_valuations(&out, &one_valued_player()).unwrap();

        let text = std::fs::read_to_string(&out).unwrap();
        assert_eq!(text, "Row,Name,Team,Position,FPTS,VOR,VOLS\n2,A,BUF,QB,300.0,40.0,10.0\n");
        assert!(!dir.join("valued.csv.tmp").exists());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn failed_write_leaves_existing_file_untouched() {
        let dir = std::env::temp_dir().join("gridcast_write_failed");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let out = dir.join("valued.csv");
        std::fs::write(&out, "previous run\n").unwrap();
        // A directory in the staging spot makes the write fail.
        std::fs::create_dir(dir.join("valued.csv.tmp")).unwrap();

        let err = write_valuations(&out, &one_valued_player()).unwrap_err();
        assert!(matches!(err, ProjectionError::Io { .. }));
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "previous run\n");

        let _ = std::fs::remove_dir_all(&dir);
    }
}
