//! Journey hot-seat console
//!
//! Hosts a single game through the registry and lets everyone play from one
//! terminal, taking turns at the keyboard.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use journey_core::{load_map, GameMap, MapSource};
use journey_protocol::{ActionId, GameId, GameStatus, LogEntry};
use journey_server::{DirStore, GameRegistry, GameStore, MemoryStore, ServerConfig};

#[derive(Parser)]
#[command(name = "journey-hotseat")]
#[command(about = "Play Journey Through Europe from one terminal", version)]
struct Cli {
    /// Server configuration file (YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Map file; overrides the configuration
    #[arg(short, long)]
    map: Option<PathBuf>,

    /// Player names, comma separated
    #[arg(short, long, value_delimiter = ',', default_value = "John,Yoko")]
    players: Vec<String>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn log_filter(verbose: bool) -> EnvFilter {
    EnvFilter::new(if verbose { "debug" } else { "info" })
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    fmt()
        .with_env_filter(log_filter(cli.verbose))
        .with_target(false)
        .init();

    let config = ServerConfig::load_or_default(cli.config.as_deref())?;
    let map = Arc::new(load_game_map(cli.map.as_ref().or(config.map_path.as_ref()))?);
    let store: Box<dyn GameStore> = match &config.data_dir {
        Some(dir) => Box::new(DirStore::open(dir).context("failed to open data directory")?),
        None => Box::new(MemoryStore::new()),
    };

    let Ok(seats) = u8::try_from(cli.players.len()) else {
        bail!("too many players");
    };
    let registry = GameRegistry::new(map.clone(), config, store);
    let id = registry.create_game(seats)?;
    let mut names = Vec::with_capacity(cli.players.len());
    for name in &cli.players {
        names.push(registry.join(id, name)?);
    }
    info!(game = %id, players = ?names, "hot-seat game started");

    play(&registry, &map, id, &names[0])
}

fn load_game_map(path: Option<&PathBuf>) -> Result<GameMap> {
    let map = match path {
        Some(path) => load_map(MapSource::Path(path.clone()))
            .with_context(|| format!("failed to load map from {}", path.display()))?,
        None => load_map(MapSource::Embedded).context("failed to load built-in map")?,
    };
    Ok(map)
}

fn play(registry: &GameRegistry, map: &GameMap, id: GameId, anyone: &str) -> Result<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut shown: Vec<LogEntry> = Vec::new();

    loop {
        // Anyone can see whose turn it is; the current player's own view
        // carries their cards and actions.
        let public = current_status(registry, id, anyone)?;
        let status = current_status(registry, id, &public.current_player)?;

        for entry in unseen(&shown, &status.messages) {
            println!("  {}", entry.text);
        }
        shown.clone_from(&status.messages);

        if let Some(winner) = &status.winner {
            println!("\n{winner} wins!");
            return Ok(());
        }

        print_turn(map, &status);
        let Some(actions) = &status.actions else {
            bail!("no actions offered to {}", status.current_player);
        };

        print!("{}> ", status.current_player);
        io::stdout().flush()?;
        let Some(line) = lines.next() else {
            return Ok(());
        };
        let line = line?;
        let input = line.trim();
        if input.eq_ignore_ascii_case("quit") {
            return Ok(());
        }

        let Ok(choice) = input.parse::<u32>() else {
            println!("enter an action number between 0 and {}", actions.len().saturating_sub(1));
            continue;
        };
        if let Err(err) = registry.perform_action(id, &status.current_player, ActionId(choice)) {
            println!("{err}");
        }
    }
}

/// Entries of `current` that were not in `shown`. The log is a bounded
/// window, so the longest tail of `shown` that starts `current` is what
/// has already been printed.
fn unseen<'a>(shown: &[LogEntry], current: &'a [LogEntry]) -> &'a [LogEntry] {
    let overlap = (0..=shown.len().min(current.len()))
        .rev()
        .find(|&n| shown[shown.len() - n..] == current[..n])
        .unwrap_or(0);
    &current[overlap..]
}

fn current_status(registry: &GameRegistry, id: GameId, viewer: &str) -> Result<GameStatus> {
    registry
        .status(id, viewer, None)?
        .into_status()
        .context("registry returned no status")
}

fn print_turn(map: &GameMap, status: &GameStatus) {
    println!();
    for record in &status.players {
        println!(
            "{:<10} {:>5}  in {}",
            record.name,
            record.progress,
            map.city_name(record.current_city)
        );
        if let Some(cards) = &record.cards {
            let hand: Vec<String> = cards
                .iter()
                .map(|c| {
                    let mark = if c.visited { "x" } else { " " };
                    let home = if c.home { " (home)" } else { "" };
                    format!("[{mark}] {}{home}", map.city_name(c.city))
                })
                .collect();
            println!("           {}", hand.join(", "));
        }
    }

    match (status.dice_roll, status.dice_points) {
        (Some(roll), Some(points)) => println!("rolled {roll}, {points} points left"),
        _ => println!("dice not rolled yet"),
    }

    if let Some(actions) = &status.actions {
        for action in actions {
            println!("  {}: {}", action.id, action.description);
        }
    }
}
