//! Headless self-play: every seat is driven by a simple greedy bot.
//!
//! Used to smoke-test maps and rule settings and to measure game length.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;

use journey_protocol::{ActionId, ActionKind, CityId};
use serde::{Deserialize, Serialize};

use crate::{GameConfig, GameEngine, GameError, GameMap, GameRng, Player};

/// Configuration for one self-play game.
#[derive(Clone, Debug)]
pub struct SelfPlayConfig {
    /// Number of seats.
    pub players: usize,
    /// Seed for dealing and dice; bot tie-breaks derive from it too.
    pub seed: u64,
    /// Give up after this many actions.
    pub max_actions: u32,
    pub game: GameConfig,
}

impl Default for SelfPlayConfig {
    fn default() -> Self {
        Self {
            players: 3,
            seed: 42,
            max_actions: 5_000,
            game: GameConfig::default(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SelfPlayResult {
    pub seed: u64,
    /// None when the action limit was hit first.
    pub winner: Option<String>,
    pub actions_taken: u32,
    pub turns_taken: u32,
    /// Wall clock.
    pub duration_ms: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BatchSelfPlayResult {
    pub games_played: u32,
    pub results: Vec<SelfPlayResult>,
    /// Wins per seat, in seat order.
    pub wins: Vec<u32>,
    pub unfinished: u32,
    pub avg_turns: f64,
}

/// Seat names used by self-play games.
pub fn seat_names(players: usize) -> Vec<String> {
    (1..=players).map(|i| format!("Bot{i}")).collect()
}

/// Play one game to completion or to `max_actions`.
pub fn run_selfplay(
    map: Arc<GameMap>,
    config: &SelfPlayConfig,
) -> Result<SelfPlayResult, GameError> {
    let start = Instant::now();
    let names = seat_names(config.players);
    let mut engine = GameEngine::new(map, &names, config.game.clone(), config.seed)?;
    let mut bot_rng = GameRng::seed_from_u64(config.seed ^ 0x5EED_B075);

    let mut actions_taken = 0;
    while engine.is_in_progress() && actions_taken < config.max_actions {
        let actor = engine.current_player().name().to_string();
        let Some(choice) = choose_action(&engine, &mut bot_rng) else {
            break;
        };
        engine.perform_action(&actor, choice)?;
        actions_taken += 1;
    }

    Ok(SelfPlayResult {
        seed: config.seed,
        winner: engine.winner().map(|p| p.name().to_string()),
        actions_taken,
        turns_taken: engine.turns_taken(),
        duration_ms: start.elapsed().as_millis() as u64,
    })
}

/// Run `games` games with consecutive seeds starting at `config.seed`.
pub fn run_batch_selfplay(
    map: Arc<GameMap>,
    config: &SelfPlayConfig,
    games: u32,
) -> Result<BatchSelfPlayResult, GameError> {
    let names = seat_names(config.players);
    let mut results = Vec::with_capacity(games as usize);
    let mut wins = vec![0; config.players];
    let mut unfinished = 0;

    for i in 0..games {
        let mut game_config = config.clone();
        game_config.seed = config.seed.wrapping_add(u64::from(i));
        let result = run_selfplay(map.clone(), &game_config)?;
        match result.winner.as_deref() {
            Some(winner) => {
                if let Some(seat) = names.iter().position(|n| n == winner) {
                    wins[seat] += 1;
                }
            }
            None => unfinished += 1,
        }
        results.push(result);
    }

    let avg_turns = if results.is_empty() {
        0.0
    } else {
        results.iter().map(|r| f64::from(r.turns_taken)).sum::<f64>() / results.len() as f64
    };

    Ok(BatchSelfPlayResult {
        games_played: games,
        results,
        wins,
        unfinished,
        avg_turns,
    })
}

/// Pick the action that gets closest to a collectable destination.
///
/// Scores are doubled hop counts so that rolling (stay put, -1) beats a
/// sideways sea crossing and waiting (stay put, +1) loses to any move that
/// keeps the distance. Ties are broken at random.
fn choose_action(engine: &GameEngine, rng: &mut GameRng) -> Option<ActionId> {
    let player = engine.current_player();
    let distance = hops_to_targets(engine.map(), player);
    let here = distance[player.current_city().index()];

    let scored: Vec<(u64, ActionId)> = engine
        .available_actions()
        .iter()
        .map(|action| {
            let score = match action.kind {
                ActionKind::RollDice => (2 * here).saturating_sub(1),
                ActionKind::Travel(option) => 2 * distance[option.to.index()],
                ActionKind::WaitAtPort => 2 * here + 1,
            };
            (score, action.id)
        })
        .collect();

    let best = scored.iter().map(|(score, _)| *score).min()?;
    let ties: Vec<ActionId> = scored
        .into_iter()
        .filter(|(score, _)| *score == best)
        .map(|(_, id)| id)
        .collect();
    Some(ties[rng.gen_index(ties.len())])
}

/// Hop count from every city to the nearest city `player` could collect,
/// ignoring link kinds.
fn hops_to_targets(map: &GameMap, player: &Player) -> Vec<u64> {
    const UNREACHABLE: u64 = u32::MAX as u64;

    let mut distance = vec![UNREACHABLE; map.city_count()];
    let mut queue = VecDeque::new();
    for city in player.remaining().filter(|c| player.can_collect(*c)) {
        distance[city.index()] = 0;
        queue.push_back(city);
    }

    while let Some(city) = queue.pop_front() {
        let next = distance[city.index()] + 1;
        for (_, other) in map.links_from(city) {
            let slot = &mut distance[other.index()];
            if *slot > next {
                *slot = next;
                queue.push_back(other);
            }
        }
    }

    distance
}
