//! The authoritative game: dealing, turn rotation, action dispatch and victory.
//!
//! A `GameEngine` pairs the shared, read-only `GameMap` with the mutable
//! `GameState` of one game. Only the state is persisted; hosts reattach the
//! map with [`GameEngine::restore`].

use std::collections::HashSet;
use std::sync::Arc;

use journey_protocol::{Action, ActionId, ActionKind, CityId, GameStatus, LogEntry, TravelOption};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    clock::now_millis,
    legality::{available_actions, legal_links},
    CardDeck, CircularQueue, DeckExhausted, GameConfig, GameMap, GameRng, MessageLog, Player, Turn,
};

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("it is not {actor}'s turn")]
    NotYourTurn { actor: String },
    #[error("no action with id {0}")]
    UnknownAction(ActionId),
    #[error("that is not a valid move")]
    IllegalMove,
    #[error("the game is already over")]
    GameFinished,
    #[error(transparent)]
    DeckExhausted(#[from] DeckExhausted),
    #[error("map has {available} cities but {needed} destination cards are needed")]
    InsufficientMapData { needed: usize, available: usize },
    #[error("a game needs at least one player")]
    NoPlayers,
    #[error("duplicate player name: {0}")]
    DuplicatePlayer(String),
    #[error("invalid hand: {0}")]
    InvalidHand(String),
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

/// What a successful action did, for hosts that want to log or notify.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ActionReport {
    pub rolled: Option<u8>,
    pub extra_go: bool,
    pub collected: Option<CityId>,
    pub turn_ended: bool,
    pub stuck: bool,
    pub winner: Option<String>,
}

/// Everything about one game except the map. This is the persisted aggregate.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameState {
    pub(crate) config: GameConfig,
    pub(crate) players: Vec<Player>,
    /// Player indices; the cursor points at whoever plays next.
    pub(crate) rotation: CircularQueue<usize>,
    pub(crate) current: usize,
    pub(crate) turn: Turn,
    pub(crate) turns_taken: u32,
    pub(crate) in_progress: bool,
    pub(crate) winner: Option<usize>,
    pub(crate) actions: Vec<Action>,
    pub(crate) log: MessageLog,
    pub(crate) rng: GameRng,
    /// Unredacted status as of the last mutation.
    pub(crate) snapshot: GameStatus,
}

#[derive(Clone, Debug)]
pub struct GameEngine {
    pub(crate) map: Arc<GameMap>,
    pub(crate) state: GameState,
}

impl GameEngine {
    /// Deal `config.hand_size` destinations to each named player from one
    /// shuffled deck of every city, then start the first player's turn.
    pub fn new(
        map: Arc<GameMap>,
        names: &[String],
        config: GameConfig,
        seed: u64,
    ) -> Result<Self, GameError> {
        check_config(&config)?;
        check_names(names.iter().map(String::as_str))?;

        let available = map.city_count();
        let needed = names
            .len()
            .checked_mul(config.hand_size)
            .ok_or(GameError::InsufficientMapData { needed: usize::MAX, available })?;
        if needed > available {
            return Err(GameError::InsufficientMapData { needed, available });
        }

        let mut rng = GameRng::seed_from_u64(seed);
        let cities = (0..available).map(|i| CityId(i as u16)).collect();
        let mut deck = CardDeck::shuffled(cities, &mut rng);

        let mut players = Vec::with_capacity(names.len());
        for name in names {
            let hand = (0..config.hand_size)
                .map(|_| deck.deal())
                .collect::<Result<Vec<_>, _>>()?;
            let player = Player::new(name.clone(), hand)
                .ok_or(GameError::InvalidConfig("hand_size must be at least 1"))?;
            players.push(player);
        }

        Self::start(map, players, config, rng)
    }

    /// Start a game with hands and positions chosen by the caller.
    ///
    /// Hands must reference map cities and be pairwise disjoint.
    pub fn from_players(
        map: Arc<GameMap>,
        players: Vec<Player>,
        config: GameConfig,
        seed: u64,
    ) -> Result<Self, GameError> {
        check_config(&config)?;
        check_names(players.iter().map(Player::name))?;

        let mut dealt = HashSet::new();
        for player in &players {
            if !map.contains(player.current_city()) {
                return Err(GameError::InvalidHand(format!(
                    "{} starts outside the map",
                    player.name()
                )));
            }
            for &city in player.destinations() {
                if !map.contains(city) {
                    return Err(GameError::InvalidHand(format!(
                        "{} holds unknown city {city}",
                        player.name()
                    )));
                }
                if !dealt.insert(city) {
                    return Err(GameError::InvalidHand(format!(
                        "city {city} dealt more than once"
                    )));
                }
            }
        }

        Self::start(map, players, config, GameRng::seed_from_u64(seed))
    }

    fn start(
        map: Arc<GameMap>,
        players: Vec<Player>,
        config: GameConfig,
        rng: GameRng,
    ) -> Result<Self, GameError> {
        let mut rotation =
            CircularQueue::new((0..players.len()).collect()).ok_or(GameError::NoPlayers)?;
        let current = *rotation.advance();
        let start = players[current].current_city();

        let log = MessageLog::with_capacity(config.log_capacity);
        let mut engine = Self {
            map,
            state: GameState {
                config,
                players,
                rotation,
                current,
                turn: Turn::new(start),
                turns_taken: 0,
                in_progress: true,
                winner: None,
                actions: Vec::new(),
                log,
                rng,
                snapshot: GameStatus {
                    in_progress: true,
                    winner: None,
                    current_player: String::new(),
                    current_city: start,
                    dice_roll: None,
                    dice_points: None,
                    players: Vec::new(),
                    actions: None,
                    messages: Vec::new(),
                    timestamp: 0,
                },
            },
        };

        let first = engine.current_player().name().to_string();
        engine.narrate(format!("The game has started, {first} goes first"));
        engine.refresh_actions();
        engine.refresh_snapshot();
        info!(players = engine.state.players.len(), first = %first, "game started");
        Ok(engine)
    }

    /// Reattach a persisted state to its map.
    pub fn restore(map: Arc<GameMap>, state: GameState) -> Self {
        Self { map, state }
    }

    pub fn map(&self) -> &Arc<GameMap> {
        &self.map
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn into_state(self) -> GameState {
        self.state
    }

    pub fn config(&self) -> &GameConfig {
        &self.state.config
    }

    pub fn players(&self) -> &[Player] {
        &self.state.players
    }

    pub fn player(&self, name: &str) -> Option<&Player> {
        self.state.players.iter().find(|p| p.name() == name)
    }

    pub fn current_player(&self) -> &Player {
        &self.state.players[self.state.current]
    }

    pub fn turn(&self) -> &Turn {
        &self.state.turn
    }

    /// Number of completed turns.
    pub fn turns_taken(&self) -> u32 {
        self.state.turns_taken
    }

    /// The action list computed after the last mutation.
    pub fn available_actions(&self) -> &[Action] {
        &self.state.actions
    }

    /// Moves open to the current player right now.
    pub fn legal_links(&self) -> Vec<TravelOption> {
        legal_links(
            &self.map,
            self.current_player().current_city(),
            &self.state.turn,
        )
    }

    pub fn is_in_progress(&self) -> bool {
        self.state.in_progress
    }

    pub fn winner(&self) -> Option<&Player> {
        self.state.winner.map(|i| &self.state.players[i])
    }

    pub fn messages(&self) -> Vec<LogEntry> {
        self.state.log.list()
    }

    /// Validate and apply one action for `actor`.
    ///
    /// Every check runs before anything is mutated, so a rejected action
    /// leaves the game exactly as it was.
    pub fn perform_action(
        &mut self,
        actor: &str,
        action_id: ActionId,
    ) -> Result<ActionReport, GameError> {
        if !self.state.in_progress {
            return Err(GameError::GameFinished);
        }
        if actor != self.current_player().name() {
            return Err(GameError::NotYourTurn {
                actor: actor.to_string(),
            });
        }
        let kind = self
            .state
            .actions
            .iter()
            .find(|a| a.id == action_id)
            .map(|a| a.kind)
            .ok_or(GameError::UnknownAction(action_id))?;
        if let ActionKind::Travel(option) = kind {
            if !self.legal_links().contains(&option) {
                return Err(GameError::IllegalMove);
            }
        }

        let mut report = ActionReport::default();
        match kind {
            ActionKind::RollDice => self.roll_dice(&mut report),
            ActionKind::Travel(option) => self.travel(option, &mut report),
            ActionKind::WaitAtPort => {
                let name = self.current_player().name().to_string();
                self.narrate(format!("{name} waits at port"));
                self.end_turn(&mut report);
            }
        }

        if self.state.in_progress {
            self.refresh_actions();
            if self.state.actions.is_empty() {
                let name = self.current_player().name().to_string();
                self.narrate(format!("{name} got stuck!"));
                debug!(player = %name, "no legal actions, ending turn");
                report.stuck = true;
                self.end_turn(&mut report);
                self.refresh_actions();
            }
        } else {
            self.state.actions.clear();
        }

        self.refresh_snapshot();
        Ok(report)
    }

    fn roll_dice(&mut self, report: &mut ActionReport) {
        let faces = self.state.config.dice_faces;
        let value = self.state.rng.roll(faces);
        self.state.turn.record_roll(value);
        report.rolled = Some(value);

        let name = self.current_player().name().to_string();
        self.narrate(format!("{name} rolled a {value}"));
        debug!(player = %name, value, "dice rolled");

        if value == faces {
            // The rotation already moved past this player; step it back so
            // the next turn is theirs again.
            self.state.rotation.rewind();
            report.extra_go = true;
            self.narrate(format!("{name} rolled a {faces} and gets another go"));
        }
    }

    fn travel(&mut self, option: TravelOption, report: &mut ActionReport) {
        let current = self.state.current;
        self.state.players[current].move_to(option.to);
        self.state.turn.enter(option.to, option.mode);

        let name = self.current_player().name().to_string();
        let city = self.map.city_name(option.to).to_string();
        self.narrate(format!("{name} travelled to {city} by {}", option.mode));

        let collected = self.state.players[current].collect(option.to);
        if collected {
            report.collected = Some(option.to);
            self.narrate(format!("{name} collected {city}"));
            info!(player = %name, city = %city, progress = %self.current_player().progress(), "destination collected");

            if let Some(winner) = self.state.players.iter().position(Player::has_completed) {
                self.finish(winner, report);
                return;
            }
        }

        // Collecting a destination stops movement for the turn.
        if collected || self.state.turn.is_over() {
            self.end_turn(report);
        }
    }

    fn finish(&mut self, winner: usize, report: &mut ActionReport) {
        let name = self.state.players[winner].name().to_string();
        self.state.in_progress = false;
        self.state.winner = Some(winner);
        self.narrate(format!("{name} has won!"));
        info!(winner = %name, turns = self.state.turns_taken, "game finished");
        report.winner = Some(name);
    }

    fn end_turn(&mut self, report: &mut ActionReport) {
        let previous = self.current_player().name().to_string();
        self.state.current = *self.state.rotation.advance();
        self.state.turn = Turn::new(self.current_player().current_city());
        self.state.turns_taken += 1;
        report.turn_ended = true;

        let next = self.current_player().name().to_string();
        if next == previous {
            self.narrate(format!("{next} takes another turn"));
        } else {
            self.narrate(format!("End of {previous}'s turn, over to {next}"));
        }
        debug!(from = %previous, to = %next, turns = self.state.turns_taken, "turn handed over");
    }

    fn refresh_actions(&mut self) {
        self.state.actions = available_actions(
            &self.map,
            self.current_player().current_city(),
            &self.state.turn,
        );
    }

    /// Regenerate the cached snapshot with a timestamp strictly newer than
    /// the previous one.
    fn refresh_snapshot(&mut self) {
        let timestamp = now_millis().max(self.state.snapshot.timestamp + 1);
        self.state.snapshot = self.build_snapshot(timestamp);
    }

    fn narrate(&mut self, text: String) {
        self.state.log.append(text);
    }
}

fn check_config(config: &GameConfig) -> Result<(), GameError> {
    if config.hand_size == 0 {
        return Err(GameError::InvalidConfig("hand_size must be at least 1"));
    }
    if config.dice_faces == 0 {
        return Err(GameError::InvalidConfig("dice_faces must be at least 1"));
    }
    Ok(())
}

fn check_names<'a>(names: impl Iterator<Item = &'a str>) -> Result<(), GameError> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(GameError::DuplicatePlayer(name.to_string()));
        }
    }
    if seen.is_empty() {
        return Err(GameError::NoPlayers);
    }
    Ok(())
}
