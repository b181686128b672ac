//! Registry flows against real stores: rosters, play-through, restarts.

use std::sync::Arc;
use std::thread;

use journey_core::{load_map, GameError, GameMap, GameRng, MapSource};
use journey_protocol::{ActionId, GameId, GameStatus, LinkKind};
use journey_server::{
    normalize_name, DirStore, GameRegistry, GameStore, LobbyError, MemoryStore, RegistryError,
    ServerConfig,
};

fn europe() -> Arc<GameMap> {
    Arc::new(load_map(MapSource::Embedded).expect("embedded map"))
}

fn status(registry: &GameRegistry, id: GameId, viewer: &str) -> GameStatus {
    registry
        .status(id, viewer, None)
        .unwrap()
        .into_status()
        .expect("full status")
}

fn start_game(registry: &GameRegistry, names: &[&str]) -> GameId {
    let id = registry.create_game(names.len() as u8).unwrap();
    for name in names {
        registry.join(id, name).unwrap();
    }
    id
}

#[test]
fn roster_fills_then_play_begins() {
    let registry = GameRegistry::new(europe(), ServerConfig::default(), Box::new(MemoryStore::new()));
    let id = registry.create_game(3).unwrap();
    assert!((1..=100).contains(&id.0));

    registry.join(id, "john").unwrap();
    registry.join(id, "PAUL").unwrap();
    let lobby = registry.lobby_status(id).unwrap();
    assert!(!lobby.ready);
    assert_eq!(lobby.player_names, vec!["John", "Paul"]);
    assert!(matches!(
        registry.status(id, "John", None),
        Err(RegistryError::Lobby(LobbyError::NotReady))
    ));

    registry.join(id, "yoko").unwrap();
    assert!(registry.lobby_status(id).unwrap().ready);
    assert!(matches!(
        registry.join(id, "ringo"),
        Err(RegistryError::Lobby(LobbyError::RosterFull))
    ));

    let john = status(&registry, id, "John");
    assert_eq!(john.current_player, "John");
    assert!(john.actions.is_some());
    assert!(john.players[0].cards.is_some());
    assert!(john.players[1].cards.is_none());

    let paul = status(&registry, id, "Paul");
    assert!(paul.actions.is_none());
    assert!(paul.players[0].cards.is_none());
}

#[test]
fn polling_reports_unchanged_until_something_happens() {
    let registry = GameRegistry::new(europe(), ServerConfig::default(), Box::new(MemoryStore::new()));
    let id = start_game(&registry, &["john", "yoko"]);

    let first = status(&registry, id, "Yoko");
    assert!(registry.status(id, "Yoko", Some(first.timestamp)).unwrap().is_unchanged());

    registry.perform_action(id, "John", ActionId(0)).unwrap();
    let next = registry
        .status(id, "Yoko", Some(first.timestamp))
        .unwrap()
        .into_status()
        .expect("changed");
    assert!(next.timestamp > first.timestamp);
}

#[test]
fn game_plays_to_a_winner_and_survives_restarts() {
    let dir = tempfile::tempdir().unwrap();
    let config = ServerConfig {
        data_dir: Some(dir.path().to_path_buf()),
        ..ServerConfig::default()
    };
    let map = europe();
    let open = || {
        GameRegistry::new(
            map.clone(),
            config.clone(),
            Box::new(DirStore::open(dir.path()).unwrap()),
        )
    };

    let id = start_game(&open(), &["john", "yoko"]);

    // Each action goes through a freshly opened registry, so every step is a
    // full load/act/save round trip through the directory.
    let mut picker = GameRng::seed_from_u64(99);
    let mut finished = None;
    for _ in 0..50_000 {
        let registry = open();
        let view = status(&registry, id, "John");
        if let Some(winner) = view.winner {
            finished = Some(winner);
            break;
        }
        let mover = status(&registry, id, &view.current_player);
        let actions = mover.actions.expect("current player sees actions");
        assert!(!actions.is_empty());
        let pick = &actions[picker.gen_index(actions.len())];
        registry.perform_action(id, &mover.current_player, pick.id).unwrap();
    }

    let winner = finished.expect("game finished");
    assert!(winner == "John" || winner == "Yoko");

    let registry = open();
    assert!(matches!(
        registry.perform_action(id, &winner, ActionId(0)),
        Err(RegistryError::Lobby(LobbyError::Game(GameError::GameFinished)))
    ));
    assert_eq!(registry.game_ids().unwrap(), vec![id]);
}

#[test]
fn restoring_against_another_map_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let registry = GameRegistry::new(
        europe(),
        ServerConfig::default(),
        Box::new(DirStore::open(dir.path()).unwrap()),
    );
    let id = start_game(&registry, &["john"]);

    let tiny = Arc::new(
        GameMap::from_parts(
            vec!["A".into(), "B".into(), "C".into(), "D".into()],
            vec![([0, 1], LinkKind::Land), ([2, 3], LinkKind::Sea)],
        )
        .unwrap(),
    );
    let other = GameRegistry::new(
        tiny,
        ServerConfig::default(),
        Box::new(DirStore::open(dir.path()).unwrap()),
    );
    assert!(matches!(
        other.status(id, "John", None),
        Err(RegistryError::MapMismatch(found)) if found == id
    ));
}

#[test]
fn concurrent_submissions_apply_one_at_a_time() {
    let registry = GameRegistry::new(europe(), ServerConfig::default(), Box::new(MemoryStore::new()));
    let id = start_game(&registry, &["john", "yoko"]);
    let before = status(&registry, id, "John");

    // Every thread submits John's first listed action.
    let outcomes: Vec<Result<(), RegistryError>> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| registry.perform_action(id, "John", ActionId(0))))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert!(outcomes.iter().any(Result::is_ok));
    for outcome in &outcomes {
        if let Err(err) = outcome {
            assert!(
                matches!(
                    err,
                    RegistryError::Lobby(LobbyError::Game(
                        GameError::UnknownAction(_) | GameError::NotYourTurn { .. }
                    ))
                ),
                "unexpected error: {err}"
            );
        }
    }

    // Whatever interleaving happened, the saved game is whole and consistent.
    let after = status(&registry, id, "John");
    assert!(after.timestamp > before.timestamp);
    assert_eq!(after.players.len(), 2);
    assert!(!after.messages.is_empty());
}

#[test]
fn concurrent_joins_are_never_lost() {
    let dir = tempfile::tempdir().unwrap();
    let stores: Vec<Box<dyn GameStore>> = vec![
        Box::new(MemoryStore::new()),
        Box::new(DirStore::open(dir.path()).unwrap()),
    ];
    let names = ["anna", "ben", "cleo", "dan", "eve", "finn", "gus", "hal"];

    for store in stores {
        let registry = GameRegistry::new(europe(), ServerConfig::default(), store);
        let id = registry.create_game(names.len() as u8).unwrap();

        // Each join is a load/modify/save; an unserialized pair would drop a name.
        thread::scope(|scope| {
            for name in names {
                let registry = &registry;
                scope.spawn(move || registry.join(id, name).unwrap());
            }
        });

        let lobby = registry.lobby_status(id).unwrap();
        assert!(lobby.ready);
        let mut joined = lobby.player_names.clone();
        joined.sort();
        let mut expected: Vec<String> = names.iter().map(|n| normalize_name(n)).collect();
        expected.sort();
        assert_eq!(joined, expected);
    }
}
