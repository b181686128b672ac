//! Journey self-play runner.
//!
//! Plays bot-vs-bot games on a map and prints per-game results plus a
//! summary, or the whole batch as JSON.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use journey_core::{load_map, run_batch_selfplay, GameConfig, MapSource, SelfPlayConfig};

#[derive(Parser)]
#[command(name = "journey-selfplay")]
#[command(about = "Run bot-vs-bot Journey games", version)]
struct Cli {
    /// Map file (defaults to the built-in Europe map)
    #[arg(short, long)]
    map: Option<PathBuf>,

    /// Seats per game
    #[arg(short, long, default_value_t = 3)]
    players: usize,

    /// Seed of the first game; later games use consecutive seeds
    #[arg(short, long, default_value_t = 42)]
    seed: u64,

    /// Number of games
    #[arg(short, long, default_value_t = 1)]
    games: u32,

    /// Abandon a game after this many actions
    #[arg(long, default_value_t = 5_000)]
    max_actions: u32,

    /// Destination cards per player
    #[arg(long, default_value_t = 3)]
    hand_size: usize,

    /// Print the batch as JSON
    #[arg(long)]
    json: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn log_filter(verbose: bool) -> EnvFilter {
    EnvFilter::new(if verbose { "debug" } else { "info" })
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Results go to stdout, so diagnostics stay on stderr.
    fmt()
        .with_env_filter(log_filter(cli.verbose))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let source = match &cli.map {
        Some(path) => MapSource::Path(path.clone()),
        None => MapSource::Embedded,
    };
    let map = Arc::new(load_map(source).context("failed to load map")?);
    info!(cities = map.city_count(), links = map.links().len(), "map loaded");

    let config = SelfPlayConfig {
        players: cli.players,
        seed: cli.seed,
        max_actions: cli.max_actions,
        game: GameConfig {
            hand_size: cli.hand_size,
            ..GameConfig::default()
        },
    };
    let batch = run_batch_selfplay(map, &config, cli.games).context("self-play failed")?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&batch)?);
        return Ok(());
    }

    for result in &batch.results {
        println!(
            "seed {:>6}  winner {:<8}  turns {:>4}  actions {:>5}  {} ms",
            result.seed,
            result.winner.as_deref().unwrap_or("-"),
            result.turns_taken,
            result.actions_taken,
            result.duration_ms,
        );
    }
    println!();
    println!("games played: {}", batch.games_played);
    println!("unfinished:   {}", batch.unfinished);
    println!("avg turns:    {:.1}", batch.avg_turns);
    for (seat, wins) in batch.wins.iter().enumerate() {
        println!("Bot{} wins:    {}", seat + 1, wins);
    }

    Ok(())
}
