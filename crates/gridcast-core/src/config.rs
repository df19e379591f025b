// Configuration loading and parsing (league.toml, strategy.toml).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

use crate::player::{BonusSlot, Position};

/// Number of teams assumed when `num_teams` is absent or unusable.
pub const DEFAULT_NUM_TEAMS: usize = 12;

/// Largest league `validate` accepts.
pub const MAX_NUM_TEAMS: usize = 256;

const DEFAULT_LEAGUE_TOML: &str = include_str!("../defaults/league.toml");
const DEFAULT_STRATEGY_TOML: &str = include_str!("../defaults/strategy.toml");

/// Built-in default files written into `config/` when missing.
const DEFAULT_FILES: &[(&str, &str)] = &[
    ("league.toml", DEFAULT_LEAGUE_TOML),
    ("strategy.toml", DEFAULT_STRATEGY_TOML),
];

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub league: LeagueConfig,
    pub vona: DraftRateModel,
    pub db_path: String,
    pub data_paths: DataPaths,
    /// Directory relative paths in the config are resolved against.
    pub base_dir: PathBuf,
}

impl Config {
    /// Resolve a config-relative path against `base_dir`.
    pub fn resolve(&self, path: &str) -> PathBuf {
        let p = Path::new(path);
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.base_dir.join(p)
        }
    }

    pub fn players_path(&self) -> PathBuf {
        self.resolve(&self.data_paths.players)
    }

    pub fn output_path(&self) -> Option<PathBuf> {
        self.data_paths.output.as_deref().map(|p| self.resolve(p))
    }

    /// The database path as a string; `:memory:` is passed through untouched.
    pub fn database_path(&self) -> String {
        if self.db_path == ":memory:" {
            return self.db_path.clone();
        }
        self.resolve(&self.db_path).display().to_string()
    }
}

// ---------------------------------------------------------------------------
// League
// ---------------------------------------------------------------------------

/// Per-team roster requirement for one true position.
///
/// Both values are per team and may be fractional (`bench = 2.5` means half
/// the league carries a third bench player at that position).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PositionRequirement {
    pub starters: f64,
    pub bench: f64,
}

impl PositionRequirement {
    pub fn new(starters: f64, bench: f64) -> Self {
        PositionRequirement { starters, bench }
    }

    /// League-wide starters: `round(starters * num_teams)`.
    pub fn total_starters(&self, num_teams: usize) -> usize {
        league_wide(self.starters, num_teams)
    }

    /// League-wide bench depth: `round(bench * num_teams)`.
    pub fn total_bench(&self, num_teams: usize) -> usize {
        league_wide(self.bench, num_teams)
    }
}

/// Multiply a per-team count by the number of teams and round half away
/// from zero. Negative or non-finite inputs yield 0.
pub fn league_wide(per_team: f64, num_teams: usize) -> usize {
    let total = (per_team * num_teams as f64).round();
    if total.is_finite() && total > 0.0 {
        total as usize
    } else {
        0
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LeagueConfig {
    pub name: String,
    pub num_teams: usize,
    pub requirements: HashMap<Position, PositionRequirement>,
    /// Per-team starters for each bonus slot. Bonus slots carry no bench.
    pub bonus_slots: HashMap<BonusSlot, f64>,
}

impl LeagueConfig {
    pub fn new(name: impl Into<String>, num_teams: usize) -> Self {
        LeagueConfig {
            name: name.into(),
            num_teams,
            requirements: HashMap::new(),
            bonus_slots: HashMap::new(),
        }
    }

    /// Builder-style setter for a true position's requirement.
    pub fn with_requirement(mut self, position: Position, starters: f64, bench: f64) -> Self {
        self.requirements
            .insert(position, PositionRequirement::new(starters, bench));
        self
    }

    /// Builder-style setter for a bonus slot's per-team starters.
    pub fn with_bonus_slot(mut self, slot: BonusSlot, starters: f64) -> Self {
        self.bonus_slots.insert(slot, starters);
        self
    }

    /// Requirement for `position`; all zeros when not configured.
    pub fn requirement(&self, position: Position) -> PositionRequirement {
        self.requirements.get(&position).copied().unwrap_or_default()
    }

    pub fn direct_starters(&self, position: Position) -> usize {
        self.requirement(position).total_starters(self.num_teams)
    }

    pub fn bench_slots(&self, position: Position) -> usize {
        self.requirement(position).total_bench(self.num_teams)
    }

    /// League-wide number of bonus slots of the given kind.
    pub fn bonus_slot_count(&self, slot: BonusSlot) -> usize {
        league_wide(
            self.bonus_slots.get(&slot).copied().unwrap_or(0.0),
            self.num_teams,
        )
    }
}

/// Wrapper for the top-level `[league]` table in league.toml.
#[derive(Debug, Clone, Deserialize)]
struct LeagueFile {
    league: RawLeague,
}

#[derive(Debug, Clone, Deserialize)]
struct RawLeague {
    #[serde(default)]
    name: String,
    #[serde(default)]
    num_teams: Option<toml::Value>,
    #[serde(default)]
    roster: HashMap<String, RawRequirement>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawRequirement {
    #[serde(default)]
    starters: Option<toml::Value>,
    #[serde(default)]
    bench: Option<toml::Value>,
}

impl RawLeague {
    fn into_league(self) -> LeagueConfig {
        let num_teams = parse_num_teams(self.num_teams.as_ref());
        let mut league = LeagueConfig::new(self.name, num_teams);

        for (key, raw) in self.roster {
            let starters = lenient_number(&format!("roster.{key}.starters"), raw.starters.as_ref());
            if let Some(pos) = Position::from_str_pos(&key) {
                let bench = lenient_number(&format!("roster.{key}.bench"), raw.bench.as_ref());
                league.requirements.insert(pos, PositionRequirement::new(starters, bench));
            } else if let Some(slot) = BonusSlot::from_str_slot(&key) {
                league.bonus_slots.insert(slot, starters);
            } else {
                warn!("ignoring unknown roster key '{}'", key);
            }
        }

        league
    }
}

/// Read a numeric config value that may be written as an integer, a float or
/// a numeric string. Anything else becomes 0.
fn lenient_number(field: &str, value: Option<&toml::Value>) -> f64 {
    let parsed = match value {
        None => return 0.0,
        Some(toml::Value::Integer(i)) => Some(*i as f64),
        Some(toml::Value::Float(f)) => Some(*f),
        Some(toml::Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(_) => None,
    };
    match parsed {
        Some(v) if v.is_finite() => v,
        _ => {
            warn!("non-numeric value for `{}`, using 0", field);
            0.0
        }
    }
}

fn parse_num_teams(value: Option<&toml::Value>) -> usize {
    let Some(value) = value else {
        return DEFAULT_NUM_TEAMS;
    };
    let n = lenient_number("league.num_teams", Some(value)).round();
    if n >= 1.0 {
        n as usize
    } else {
        warn!(
            "invalid league.num_teams, defaulting to {}",
            DEFAULT_NUM_TEAMS
        );
        DEFAULT_NUM_TEAMS
    }
}

// ---------------------------------------------------------------------------
// strategy.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire strategy.toml file.
#[derive(Debug, Clone, Deserialize)]
struct StrategyFile {
    #[serde(default)]
    vona: DraftRateModel,
    database: DatabaseSection,
    data_paths: DataPaths,
}

#[derive(Debug, Clone, Deserialize)]
struct DatabaseSection {
    path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataPaths {
    /// Player projection CSV.
    pub players: String,
    /// Where `value` writes VOR/VOLS back, when set.
    #[serde(default)]
    pub output: Option<String>,
}

/// Share of all picks expected to go to each position before round
/// adjustments. Field names match the TOML keys.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseRates {
    #[serde(rename = "QB")]
    pub qb: f64,
    #[serde(rename = "RB")]
    pub rb: f64,
    #[serde(rename = "WR")]
    pub wr: f64,
    #[serde(rename = "TE")]
    pub te: f64,
    #[serde(rename = "DST")]
    pub dst: f64,
    #[serde(rename = "K")]
    pub k: f64,
}

impl BaseRates {
    pub fn get(&self, position: Position) -> f64 {
        match position {
            Position::Quarterback => self.qb,
            Position::RunningBack => self.rb,
            Position::WideReceiver => self.wr,
            Position::TightEnd => self.te,
            Position::Defense => self.dst,
            Position::Kicker => self.k,
        }
    }
}

impl Default for BaseRates {
    fn default() -> Self {
        BaseRates {
            qb: 0.12,
            rb: 0.30,
            wr: 0.32,
            te: 0.12,
            dst: 0.07,
            k: 0.07,
        }
    }
}

/// Tunable parameters of the VONA draft-rate heuristic.
///
/// Rounds `1..=early_round_max` are early, `..=middle_round_max` are middle,
/// everything after is late.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DraftRateModel {
    pub base_rates: BaseRates,
    pub early_round_max: usize,
    pub middle_round_max: usize,
    /// RB/WR multiplier in early rounds.
    pub early_boost: f64,
    /// K/DST multiplier in early rounds.
    pub early_suppress: f64,
    /// QB/TE multiplier in middle rounds.
    pub middle_boost: f64,
    /// K/DST multiplier in late rounds.
    pub late_boost: f64,
}

impl Default for DraftRateModel {
    fn default() -> Self {
        DraftRateModel {
            base_rates: BaseRates::default(),
            early_round_max: 3,
            middle_round_max: 8,
            early_boost: 1.3,
            early_suppress: 0.2,
            middle_boost: 1.3,
            late_boost: 2.5,
        }
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/league.toml` and
/// `config/strategy.toml` relative to `base_dir`.
///
/// Does not write defaults. Prefer `load_config_in()` which does.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    // --- league.toml (required) ---
    let league_path = config_dir.join("league.toml");
    let league_text = read_file(&league_path)?;
    let league = parse_league(&league_text).map_err(|e| ConfigError::ParseError {
        path: league_path.clone(),
        source: e,
    })?;

    // --- strategy.toml (required) ---
    let strategy_path = config_dir.join("strategy.toml");
    let strategy_text = read_file(&strategy_path)?;
    let strategy_file: StrategyFile =
        toml::from_str(&strategy_text).map_err(|e| ConfigError::ParseError {
            path: strategy_path.clone(),
            source: e,
        })?;

    let config = Config {
        league,
        vona: strategy_file.vona,
        db_path: strategy_file.database.path,
        data_paths: strategy_file.data_paths,
        base_dir: base_dir.to_path_buf(),
    };

    validate(&config)?;

    Ok(config)
}

/// Parse the text of a league.toml file into a `LeagueConfig`.
pub fn parse_league(text: &str) -> Result<LeagueConfig, toml::de::Error> {
    let file: LeagueFile = toml::from_str(text)?;
    Ok(file.league.into_league())
}

/// Write the built-in default for every config file missing from
/// `base_dir/config`. Existing files are never overwritten. Returns the
/// files that were written.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let config_dir = base_dir.join("config");

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;

    let mut written = Vec::new();

    for (file_name, content) in DEFAULT_FILES {
        let target = config_dir.join(file_name);

        match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
        {
            Ok(mut dest) => {
                std::io::Write::write_all(&mut dest, content.as_bytes()).map_err(|e| {
                    ConfigError::DefaultsCopyError {
                        message: format!("failed to write {}: {e}", target.display()),
                    }
                })?;
                written.push(target);
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {}
            Err(e) => {
                return Err(ConfigError::DefaultsCopyError {
                    message: format!("failed to create {}: {e}", target.display()),
                });
            }
        }
    }

    Ok(written)
}

/// Ensure defaults exist under `base_dir`, then load from it.
pub fn load_config_in(base_dir: &Path) -> Result<Config, ConfigError> {
    ensure_config_files(base_dir)?;
    load_config_from(base_dir)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    let league = &config.league;

    if league.num_teams > MAX_NUM_TEAMS {
        return Err(ConfigError::ValidationError {
            field: "league.num_teams".into(),
            message: format!("must be <= {MAX_NUM_TEAMS}, got {}", league.num_teams),
        });
    }

    for pos in Position::ALL {
        let req = league.requirement(pos);
        if req.starters < 0.0 {
            return Err(ConfigError::ValidationError {
                field: format!("roster.{pos}.starters"),
                message: format!("must be >= 0, got {}", req.starters),
            });
        }
        if req.bench < 0.0 {
            return Err(ConfigError::ValidationError {
                field: format!("roster.{pos}.bench"),
                message: format!("must be >= 0, got {}", req.bench),
            });
        }
    }

    for (slot, &starters) in &league.bonus_slots {
        if starters < 0.0 {
            return Err(ConfigError::ValidationError {
                field: format!("roster.{slot}.starters"),
                message: format!("must be >= 0, got {starters}"),
            });
        }
    }

    // Draft-rate model
    let model = &config.vona;
    for pos in Position::ALL {
        let rate = model.base_rates.get(pos);
        if !(0.0..=1.0).contains(&rate) {
            return Err(ConfigError::ValidationError {
                field: format!("vona.base_rates.{pos}"),
                message: format!("must be between 0.0 and 1.0 inclusive, got {rate}"),
            });
        }
    }

    let multipliers: &[(&str, f64)] = &[
        ("vona.early_boost", model.early_boost),
        ("vona.early_suppress", model.early_suppress),
        ("vona.middle_boost", model.middle_boost),
        ("vona.late_boost", model.late_boost),
    ];
    for (name, val) in multipliers {
        if *val <= 0.0 {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: format!("must be > 0, got {val}"),
            });
        }
    }

    if model.middle_round_max < model.early_round_max {
        return Err(ConfigError::ValidationError {
            field: "vona.middle_round_max".into(),
            message: format!(
                "must be >= vona.early_round_max ({}), got {}",
                model.early_round_max, model.middle_round_max
            ),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
