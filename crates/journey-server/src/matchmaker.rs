//! Pre-game roster for one game.
//!
//! Collects player names until the configured count is reached, then deals
//! the game. Afterwards it just fronts the engine.

use std::sync::Arc;

use journey_core::{GameConfig, GameEngine, GameError, GameMap, GameState};
use journey_protocol::{ActionId, LobbyStatus, StatusReply};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Roster errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LobbyError {
    #[error("Invalid player name: {0:?}")]
    InvalidName(String),
    #[error("Game is full")]
    RosterFull,
    #[error("Game is still waiting for players")]
    NotReady,
    #[error(transparent)]
    Game(#[from] GameError),
}

/// Persisted form of a [`Matchmaker`]: everything but the shared map.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SavedMatch {
    pub max_players: u8,
    pub player_names: Vec<String>,
    pub seed: u64,
    pub config: GameConfig,
    /// Fingerprint of the map the game was dealt on.
    pub map_fingerprint: u64,
    pub game: Option<GameState>,
}

#[derive(Clone, Debug)]
pub struct Matchmaker {
    map: Arc<GameMap>,
    config: GameConfig,
    max_players: u8,
    player_names: Vec<String>,
    seed: u64,
    /// None until the roster is full
    game: Option<GameEngine>,
}

impl Matchmaker {
    pub fn new(map: Arc<GameMap>, config: GameConfig, max_players: u8, seed: u64) -> Self {
        Self {
            map,
            config,
            max_players,
            player_names: Vec::new(),
            seed,
            game: None,
        }
    }

    /// Add a player; the game is dealt as soon as the last seat fills.
    ///
    /// Nothing changes on error, including when dealing fails.
    pub fn add_player(&mut self, name: &str) -> Result<(), LobbyError> {
        if self.game.is_some() || self.player_names.len() >= usize::from(self.max_players) {
            return Err(LobbyError::RosterFull);
        }
        if name.trim().is_empty() || self.player_names.iter().any(|n| n == name) {
            return Err(LobbyError::InvalidName(name.to_string()));
        }

        let mut names = self.player_names.clone();
        names.push(name.to_string());

        if names.len() == usize::from(self.max_players) {
            let engine = GameEngine::new(self.map.clone(), &names, self.config.clone(), self.seed)?;
            info!(players = names.len(), "roster full, game dealt");
            self.game = Some(engine);
        }
        self.player_names = names;
        Ok(())
    }

    pub fn status(&self) -> LobbyStatus {
        LobbyStatus {
            ready: self.game.is_some(),
            player_names: self.player_names.clone(),
            max_players: self.max_players,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.game.is_some()
    }

    pub fn has_player(&self, name: &str) -> bool {
        self.player_names.iter().any(|n| n == name)
    }

    pub fn game(&self) -> Option<&GameEngine> {
        self.game.as_ref()
    }

    pub fn perform_action(&mut self, actor: &str, action: ActionId) -> Result<(), LobbyError> {
        let game = self.game.as_mut().ok_or(LobbyError::NotReady)?;
        game.perform_action(actor, action)?;
        Ok(())
    }

    pub fn game_status(&self, viewer: &str, since: Option<u64>) -> Result<StatusReply, LobbyError> {
        let game = self.game.as_ref().ok_or(LobbyError::NotReady)?;
        Ok(game.status(viewer, since))
    }

    pub fn to_saved(&self) -> SavedMatch {
        SavedMatch {
            max_players: self.max_players,
            player_names: self.player_names.clone(),
            seed: self.seed,
            config: self.config.clone(),
            map_fingerprint: self.map.fingerprint(),
            game: self.game.as_ref().map(|g| g.state().clone()),
        }
    }

    /// Rebuild from a saved match. The caller checks the map fingerprint.
    pub fn from_saved(saved: SavedMatch, map: Arc<GameMap>) -> Self {
        let game = saved.game.map(|state| GameEngine::restore(map.clone(), state));
        Self {
            map,
            config: saved.config,
            max_players: saved.max_players,
            player_names: saved.player_names,
            seed: saved.seed,
            game,
        }
    }
}
