//! Property tests over dealing, the rotation, the log and random play.

use std::collections::HashSet;
use std::sync::Arc;

use journey_core::{
    load_map, CircularQueue, GameConfig, GameEngine, GameMap, GameRng, MapSource, MessageLog,
};
use journey_protocol::ActionKind;
use proptest::prelude::*;

fn europe() -> Arc<GameMap> {
    Arc::new(load_map(MapSource::Embedded).expect("embedded map"))
}

fn seat_names(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("P{i}")).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn hands_are_disjoint_and_full(players in 1usize..=6, hand_size in 1usize..=4, seed in any::<u64>()) {
        let config = GameConfig { hand_size, ..GameConfig::default() };
        let engine = GameEngine::new(europe(), &seat_names(players), config, seed).unwrap();

        let mut dealt = HashSet::new();
        for player in engine.players() {
            prop_assert_eq!(player.destinations().len(), hand_size);
            for city in player.destinations() {
                prop_assert!(dealt.insert(*city), "{} dealt twice", city);
            }
        }
    }

    #[test]
    fn advance_visits_everything_once(len in 1usize..20, steps in 0usize..60) {
        let mut queue = CircularQueue::new((0..len).collect::<Vec<_>>()).unwrap();
        for _ in 0..steps {
            queue.advance();
        }
        let seen: HashSet<usize> = (0..len).map(|_| *queue.advance()).collect();
        prop_assert_eq!(seen.len(), len);
    }

    #[test]
    fn advance_then_rewind_restores_cursor(len in 1usize..20, steps in 0usize..60) {
        let mut queue = CircularQueue::new((0..len).collect::<Vec<_>>()).unwrap();
        for _ in 0..steps {
            queue.advance();
        }
        let before = queue.position();
        queue.advance();
        queue.rewind();
        prop_assert_eq!(queue.position(), before);
        queue.advance();
        queue.rewind();
        prop_assert_eq!(queue.position(), before);
    }

    #[test]
    fn log_stays_bounded_and_ordered(capacity in 1usize..12, appends in 0usize..40) {
        let mut log = MessageLog::with_capacity(capacity);
        for i in 0..appends {
            log.append_at(format!("line {i}"), i as u64);
        }
        let entries = log.list();
        prop_assert_eq!(entries.len(), appends.min(capacity));
        prop_assert!(entries.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
        if let Some(last) = entries.last() {
            prop_assert_eq!(last.timestamp, appends as u64 - 1);
        }
    }

    #[test]
    fn random_play_keeps_turn_invariants(seed in any::<u64>(), players in 1usize..=4) {
        let names = seat_names(players);
        let mut engine = GameEngine::new(europe(), &names, GameConfig::default(), seed).unwrap();
        let mut picker = GameRng::seed_from_u64(seed.rotate_left(17));
        let mut last_stamp = engine.snapshot_timestamp();

        for _ in 0..300 {
            if !engine.is_in_progress() {
                break;
            }
            let actor = engine.current_player().name().to_string();
            let actions = engine.available_actions().to_vec();
            prop_assert!(!actions.is_empty());
            let choice = &actions[picker.gen_index(actions.len())];

            let report = engine.perform_action(&actor, choice.id).unwrap();

            if report.extra_go && report.turn_ended {
                prop_assert_eq!(engine.current_player().name(), actor.as_str());
            }
            if choice.kind == ActionKind::RollDice && !report.turn_ended {
                prop_assert_eq!(engine.current_player().name(), actor.as_str());
            }

            let turn = engine.turn();
            let unique: HashSet<_> = turn.route().iter().collect();
            prop_assert_eq!(unique.len(), turn.route().len());

            if turn.has_rolled() {
                prop_assert!(engine.legal_links().iter().all(|o| !o.mode.is_sea()));
            }

            for player in engine.players() {
                let visited = player.visited();
                if let Some(pos) = visited.iter().position(|c| *c == player.home()) {
                    prop_assert_eq!(pos, player.destinations().len() - 1);
                }
            }

            for viewer in &names {
                let status = engine.status_for(viewer);
                for record in &status.players {
                    prop_assert_eq!(record.cards.is_some(), &record.name == viewer);
                }
            }

            prop_assert!(engine.snapshot_timestamp() > last_stamp);
            last_stamp = engine.snapshot_timestamp();
        }
    }
}
