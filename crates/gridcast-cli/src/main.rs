// gridcast: command-line front end for the draft-value engine.

mod render;

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use gridcast_core::config::{self, Config};
use gridcast_core::db::Database;
use gridcast_core::draft::pick::DraftPick;
use gridcast_core::draft::state::DraftState;
use gridcast_core::projections;
use gridcast_core::valuation::{compute_valuations, vona::project_vona};

#[derive(Parser)]
#[command(name = "gridcast")]
#[command(about = "Fantasy football draft values: VOR, VOLS and VONA")]
#[command(version)]
struct Cli {
    /// Directory containing config/ and the data paths it names
    #[arg(long, global = true, default_value = ".")]
    base_dir: PathBuf,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Allocate starters, compute baselines and value every player
    Value {
        /// Write VOR/VOLS per player to this CSV (overrides data_paths.output)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Number of players to list
        #[arg(long, default_value = "25")]
        top: usize,
    },

    /// Project value over next available for a future pick
    Vona {
        /// Overall pick number you are planning for
        #[arg(short, long)]
        target: usize,

        /// Number of board entries to list
        #[arg(long, default_value = "15")]
        top: usize,
    },

    /// Record the next pick in the draft log
    Pick {
        /// Player name (case-insensitive)
        name: String,
    },

    /// Remove the most recent pick
    Undo,

    /// Clear the draft log and start a new draft
    Reset,

    /// Show picks made, the current round and recent picks
    Status {
        /// Number of recent picks to show
        #[arg(long, default_value = "10")]
        recent: usize,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing()?;

    let config = config::load_config_in(&cli.base_dir).context("failed to load configuration")?;
    info!(
        "Config loaded: league={}, {} teams",
        config.league.name, config.league.num_teams
    );

    match cli.command {
        Commands::Value { out, top } => run_value(&config, out, top, cli.json),
        Commands::Vona { target, top } => run_vona(&config, target, top, cli.json),
        Commands::Pick { name } => run_pick(&config, &name, cli.json),
        Commands::Undo => run_undo(&config, cli.json),
        Commands::Reset => run_reset(&config, cli.json),
        Commands::Status { recent } => run_status(&config, recent, cli.json),
    }
}

/// Logs go to stderr so stdout carries only the report.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("gridcast=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}

fn open_db(config: &Config) -> anyhow::Result<Database> {
    let path = config.database_path();
    Database::open(&path).with_context(|| format!("failed to open draft log at {path}"))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let text = serde_json::to_string_pretty(value).context("failed to serialize report")?;
    println!("{text}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn run_value(config: &Config, out: Option<PathBuf>, top: usize, json: bool) -> anyhow::Result<()> {
    let pool = projections::load_pool(config).context("failed to load player projections")?;
    let report = compute_valuations(&pool, &config.league);

    if let Some(path) = out.or_else(|| config.output_path()) {
        projections::write_valuations(&path, &report.players)
            .with_context(|| format!("failed to write valuations to {}", path.display()))?;
    }

    if json {
        return print_json(&report);
    }
    print!("{}", render::allocation_table(&report.allocation));
    println!();
    print!("{}", render::valuation_table(&report.players, top));
    Ok(())
}

fn run_vona(config: &Config, target: usize, top: usize, json: bool) -> anyhow::Result<()> {
    let pool = projections::load_pool(config).context("failed to load player projections")?;
    let db = open_db(config)?;
    let draft_id = db.current_draft_id()?;
    let draft = DraftState::from_picks(&db.load_picks(&draft_id)?);

    let report = project_vona(&pool, &draft, target, &config.league, &config.vona)?;

    if json {
        return print_json(&report);
    }
    print!("{}", render::vona_header(&report));
    println!();
    print!("{}", render::position_table(&report.positions));
    println!();
    print!("{}", render::vona_board(&report.board, top));
    println!();
    for insight in &report.insights {
        println!("* {insight}");
    }
    Ok(())
}

fn run_pick(config: &Config, name: &str, json: bool) -> anyhow::Result<()> {
    let pool = projections::load_pool(config).context("failed to load player projections")?;
    let db = open_db(config)?;
    let draft_id = db.current_draft_id()?;
    let draft = DraftState::from_picks(&db.load_picks(&draft_id)?);

    let Some(player) = pool.find(name) else {
        bail!("unknown player '{name}'");
    };
    if draft.is_drafted(&player.name) {
        bail!("{} has already been drafted", player.name);
    }

    let pick_number = u32::try_from(draft.current_pick()).context("pick number out of range")?;
    let pick = DraftPick::for_player(pick_number, player);
    db.record_pick(&pick, &draft_id)?;
    info!("Recorded pick {} ({}) in {}", pick_number, player.name, draft_id);

    if json {
        return print_json(&pick);
    }
    println!(
        "Pick {} (round {}): {} ({})",
        pick.pick_number,
        pick.round(config.league.num_teams),
        pick.player_name,
        pick.position
    );
    Ok(())
}

fn run_undo(config: &Config, json: bool) -> anyhow::Result<()> {
    let mut db = open_db(config)?;
    let draft_id = db.current_draft_id()?;
    let removed = db.remove_last_pick(&draft_id)?;

    if json {
        return print_json(&removed);
    }
    match removed {
        Some(pick) => println!(
            "Removed pick {}: {} ({})",
            pick.pick_number, pick.player_name, pick.position
        ),
        None => println!("No picks to undo"),
    }
    Ok(())
}

fn run_reset(config: &Config, json: bool) -> anyhow::Result<()> {
    let mut db = open_db(config)?;
    db.clear_draft()?;
    let draft_id = Database::generate_draft_id();
    db.set_draft_id(&draft_id)?;
    info!("Started new draft {}", draft_id);

    if json {
        return print_json(&serde_json::json!({ "draft_id": draft_id }));
    }
    println!("Started new draft {draft_id}");
    Ok(())
}

#[derive(Serialize)]
struct StatusReport {
    draft_id: String,
    picks_made: usize,
    current_pick: usize,
    current_round: usize,
    recent: Vec<DraftPick>,
}

fn run_status(config: &Config, recent: usize, json: bool) -> anyhow::Result<()> {
    let db = open_db(config)?;
    let draft_id = db.current_draft_id()?;
    let picks = db.load_picks(&draft_id)?;
    let draft = DraftState::from_picks(&picks);

    let start = picks.len().saturating_sub(recent);
    let status = StatusReport {
        draft_id,
        picks_made: draft.pick_count(),
        current_pick: draft.current_pick(),
        current_round: draft.current_round(config.league.num_teams),
        recent: picks[start..].to_vec(),
    };

    if json {
        return print_json(&status);
    }
    println!("Draft:        {}", status.draft_id);
    println!("Picks made:   {}", status.picks_made);
    println!(
        "On the clock: pick {} (round {})",
        status.current_pick, status.current_round
    );
    if !status.recent.is_empty() {
        println!();
        print!(
            "{}",
            render::pick_table(&status.recent, config.league.num_teams)
        );
    }
    Ok(())
}
