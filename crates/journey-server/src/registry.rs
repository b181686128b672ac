//! All games hosted by one server.
//!
//! Every call loads the saved match from the store, acts on it and writes it
//! back whole. Mutations of one game id are serialized through a per-id lock;
//! reads take no lock and see the last completed save.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use journey_core::GameMap;
use journey_protocol::{ActionId, GameId, LobbyStatus, StatusReply};
use rand::Rng;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    config::ServerConfig,
    matchmaker::{LobbyError, Matchmaker, SavedMatch},
    store::{GameStore, StoreError},
};

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("no game with id {0}")]
    UnknownGame(GameId),
    #[error("all {0} game ids are in use")]
    RegistryFull(u32),
    #[error("game {0} was saved against a different map")]
    MapMismatch(GameId),
    #[error("a game needs at least one player")]
    NoSeats,
    #[error(transparent)]
    Lobby(#[from] LobbyError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("encode error: {0}")]
    Encode(#[from] rmp_serde::encode::Error),
    #[error("decode error: {0}")]
    Decode(#[from] rmp_serde::decode::Error),
}

/// First character upper case, the rest lower case.
pub fn normalize_name(name: &str) -> String {
    let trimmed = name.trim();
    let mut chars = trimmed.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

pub struct GameRegistry {
    map: Arc<GameMap>,
    config: ServerConfig,
    store: Box<dyn GameStore>,
    /// Per-game locks, present only while some caller holds or waits on one.
    locks: Mutex<HashMap<GameId, Arc<Mutex<()>>>>,
    creating: Mutex<()>,
}

impl GameRegistry {
    pub fn new(map: Arc<GameMap>, config: ServerConfig, store: Box<dyn GameStore>) -> Self {
        Self {
            map,
            config,
            store,
            locks: Mutex::new(HashMap::new()),
            creating: Mutex::new(()),
        }
    }

    pub fn map(&self) -> &Arc<GameMap> {
        &self.map
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Open a new game for `no_of_players` under a random unused id.
    pub fn create_game(&self, no_of_players: u8) -> Result<GameId, RegistryError> {
        if no_of_players == 0 {
            return Err(RegistryError::NoSeats);
        }

        // Held across the pick and the first save so two creators never
        // claim the same id.
        let creating = self.creating.lock().unwrap_or_else(PoisonError::into_inner);

        let max = self.config.max_games;
        let mut free = Vec::new();
        for raw in 1..=max {
            let id = GameId(raw);
            if !self.store.contains(id)? {
                free.push(id);
            }
        }
        if free.is_empty() {
            return Err(RegistryError::RegistryFull(max));
        }

        let mut rng = rand::thread_rng();
        let id = free[rng.gen_range(0..free.len())];
        let seed: u64 = rng.gen();

        let lobby = Matchmaker::new(self.map.clone(), self.config.game.clone(), no_of_players, seed);
        self.save(id, &lobby)?;
        drop(creating);

        info!(game = %id, players = no_of_players, "game created");
        Ok(id)
    }

    /// Add a player to a game's roster. Returns the name as stored.
    pub fn join(&self, id: GameId, name: &str) -> Result<String, RegistryError> {
        let name = normalize_name(name);
        self.mutate(id, |lobby| lobby.add_player(&name))?;
        info!(game = %id, player = %name, "player joined");
        Ok(name)
    }

    pub fn lobby_status(&self, id: GameId) -> Result<LobbyStatus, RegistryError> {
        Ok(self.load(id)?.status())
    }

    pub fn perform_action(
        &self,
        id: GameId,
        actor: &str,
        action: ActionId,
    ) -> Result<(), RegistryError> {
        self.mutate(id, |lobby| lobby.perform_action(actor, action))
    }

    pub fn status(
        &self,
        id: GameId,
        viewer: &str,
        since: Option<u64>,
    ) -> Result<StatusReply, RegistryError> {
        Ok(self.load(id)?.game_status(viewer, since)?)
    }

    pub fn remove_game(&self, id: GameId) -> Result<bool, RegistryError> {
        let removed = self.exclusive(id, || self.store.remove(id))?;
        if removed {
            info!(game = %id, "game removed");
        }
        Ok(removed)
    }

    pub fn game_ids(&self) -> Result<Vec<GameId>, RegistryError> {
        Ok(self.store.ids()?)
    }

    /// Load, apply `f`, and save only if it succeeded, all under the game's lock.
    fn mutate<T>(
        &self,
        id: GameId,
        f: impl FnOnce(&mut Matchmaker) -> Result<T, LobbyError>,
    ) -> Result<T, RegistryError> {
        self.exclusive(id, || {
            let mut lobby = self.load(id)?;
            match f(&mut lobby) {
                Ok(value) => {
                    self.save(id, &lobby)?;
                    debug!(game = %id, "game saved");
                    Ok(value)
                }
                Err(err) => {
                    warn!(game = %id, error = %err, "request rejected");
                    Err(err.into())
                }
            }
        })
    }

    /// Run `f` holding the lock for `id`.
    fn exclusive<T>(&self, id: GameId, f: impl FnOnce() -> T) -> T {
        let lock = self.lock_for(id);
        let result = {
            let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
            f()
        };
        self.release(id, lock);
        result
    }

    fn lock_for(&self, id: GameId) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks.entry(id).or_default().clone()
    }

    /// Clones are only made and dropped under the map lock, so a count of two
    /// (the map's and ours) means nobody else holds or waits on this lock.
    fn release(&self, id: GameId, lock: Arc<Mutex<()>>) {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        let last = Arc::strong_count(&lock) == 2;
        drop(lock);
        if last {
            locks.remove(&id);
        }
    }

    fn load(&self, id: GameId) -> Result<Matchmaker, RegistryError> {
        let bytes = self.store.load(id)?.ok_or(RegistryError::UnknownGame(id))?;
        let saved: SavedMatch = rmp_serde::from_slice(&bytes)?;
        if saved.map_fingerprint != self.map.fingerprint() {
            return Err(RegistryError::MapMismatch(id));
        }
        Ok(Matchmaker::from_saved(saved, self.map.clone()))
    }

    fn save(&self, id: GameId, lobby: &Matchmaker) -> Result<(), RegistryError> {
        let bytes = rmp_serde::to_vec_named(&lobby.to_saved())?;
        self.store.save(id, &bytes)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use journey_core::{load_map, GameError, MapSource};
    use proptest::prelude::*;

    use super::*;
    use crate::store::MemoryStore;

    fn registry(max_games: u32) -> GameRegistry {
        let map = Arc::new(load_map(MapSource::Embedded).unwrap());
        let config = ServerConfig {
            max_games,
            ..ServerConfig::default()
        };
        GameRegistry::new(map, config, Box::new(MemoryStore::new()))
    }

    #[test]
    fn names_are_normalized() {
        assert_eq!(normalize_name("jOHN"), "John");
        assert_eq!(normalize_name(" yoko "), "Yoko");
        assert_eq!(normalize_name("élodie"), "Élodie");
        assert_eq!(normalize_name("   "), "");
    }

    proptest! {
        #[test]
        fn normalizing_is_idempotent(name in "[a-zA-Z ]{0,12}") {
            let once = normalize_name(&name);
            prop_assert_eq!(normalize_name(&once), once.clone());
            prop_assert!(once.chars().skip(1).all(|c| !c.is_uppercase()));
        }
    }

    #[test]
    fn ids_stay_in_range_until_exhausted() {
        let registry = registry(3);
        let mut ids: Vec<GameId> = (0..3).map(|_| registry.create_game(2).unwrap()).collect();
        ids.sort();
        assert_eq!(ids, vec![GameId(1), GameId(2), GameId(3)]);
        assert!(matches!(registry.create_game(2), Err(RegistryError::RegistryFull(3))));

        assert!(registry.remove_game(GameId(2)).unwrap());
        assert_eq!(registry.create_game(2).unwrap(), GameId(2));
    }

    #[test]
    fn duplicate_join_after_normalizing_is_rejected() {
        let registry = registry(10);
        let id = registry.create_game(2).unwrap();
        assert_eq!(registry.join(id, "john").unwrap(), "John");
        assert!(matches!(
            registry.join(id, "JOHN"),
            Err(RegistryError::Lobby(LobbyError::InvalidName(_)))
        ));
        assert!(matches!(
            registry.join(id, " "),
            Err(RegistryError::Lobby(LobbyError::InvalidName(_)))
        ));
        assert_eq!(registry.lobby_status(id).unwrap().player_names, vec!["John"]);
    }

    #[test]
    fn rejected_action_is_not_saved() {
        let registry = registry(10);
        let id = registry.create_game(2).unwrap();
        registry.join(id, "john").unwrap();
        registry.join(id, "yoko").unwrap();

        let before = registry.store.load(id).unwrap();
        let err = registry.perform_action(id, "Yoko", ActionId(0)).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::Lobby(LobbyError::Game(GameError::NotYourTurn { .. }))
        ));
        assert_eq!(registry.store.load(id).unwrap(), before);
    }

    fn lock_entries(registry: &GameRegistry) -> usize {
        registry.locks.lock().unwrap().len()
    }

    #[test]
    fn requests_on_unknown_ids_leave_no_locks_behind() {
        let registry = registry(10);
        for raw in 1000..3000 {
            assert!(registry.join(GameId(raw), "John").is_err());
            assert!(registry.perform_action(GameId(raw), "John", ActionId(0)).is_err());
        }
        assert_eq!(lock_entries(&registry), 0);

        let id = registry.create_game(1).unwrap();
        registry.join(id, "john").unwrap();
        registry.perform_action(id, "John", ActionId(0)).unwrap();
        assert!(registry.remove_game(id).unwrap());
        assert_eq!(lock_entries(&registry), 0);
    }

    #[test]
    fn creating_a_game_keeps_the_lock_of_an_early_caller() {
        let registry = registry(1);
        let early = registry.lock_for(GameId(1));
        let id = registry.create_game(2).unwrap();
        assert_eq!(id, GameId(1));

        let later = registry.lock_for(id);
        assert!(Arc::ptr_eq(&early, &later));

        let _guard = early.lock().unwrap();
        assert!(later.try_lock().is_err());
    }

    #[test]
    fn removal_keeps_a_lock_that_others_still_hold() {
        let registry = registry(1);
        let id = registry.create_game(2).unwrap();
        let held = registry.lock_for(id);

        assert!(registry.remove_game(id).unwrap());
        assert_eq!(registry.create_game(2).unwrap(), id);

        let next = registry.lock_for(id);
        assert!(Arc::ptr_eq(&held, &next));
        registry.release(id, next);
        registry.release(id, held);
        assert_eq!(lock_entries(&registry), 0);
    }

    #[test]
    fn unknown_games_are_reported() {
        let registry = registry(10);
        assert!(matches!(
            registry.lobby_status(GameId(5)),
            Err(RegistryError::UnknownGame(GameId(5)))
        ));
        assert!(matches!(
            registry.join(GameId(5), "John"),
            Err(RegistryError::UnknownGame(GameId(5)))
        ));
        assert!(matches!(registry.create_game(0), Err(RegistryError::NoSeats)));
    }
}
