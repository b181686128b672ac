//! Which links and actions are open to the current player.
//!
//! Both lists are recomputed from scratch from the map, the player's city and
//! the turn; nothing here is cached or patched incrementally.

use journey_protocol::{Action, ActionId, ActionKind, CityId, LinkKind, TravelOption};

use crate::{map::Link, GameMap, Turn};

/// Whether `link` may be taken from `at` given the state of `turn`.
pub fn is_link_legal(link: &Link, at: CityId, turn: &Turn) -> bool {
    let Some(to) = link.other_end(at) else {
        return false;
    };

    // Sea crossings replace the dice roll: only before it, never after.
    if link.kind.is_sea() == turn.has_rolled() {
        return false;
    }

    if let LinkKind::Air { cost } = link.kind {
        if turn.has_flown() {
            return false;
        }
        if turn.points_left().map_or(true, |points| cost > points) {
            return false;
        }
    }

    !turn.has_entered(to)
}

/// Every legal move from `at`, in map order.
pub fn legal_links(map: &GameMap, at: CityId, turn: &Turn) -> Vec<TravelOption> {
    map.links_from(at)
        .filter(|(link, _)| is_link_legal(link, at, turn))
        .map(|(link, to)| TravelOption {
            link: link.id,
            from: at,
            to,
            mode: link.kind,
        })
        .collect()
}

/// The current player's options, numbered from zero.
///
/// Rolling comes first while the dice are unrolled, then one entry per legal
/// link, then waiting at port when the player stands in a port after rolling.
/// An empty list means the player is stuck.
pub fn available_actions(map: &GameMap, at: CityId, turn: &Turn) -> Vec<Action> {
    let mut kinds = Vec::new();

    if !turn.has_rolled() {
        kinds.push(ActionKind::RollDice);
    }

    kinds.extend(legal_links(map, at, turn).into_iter().map(ActionKind::Travel));

    if turn.has_rolled() && map.is_port(at) {
        kinds.push(ActionKind::WaitAtPort);
    }

    kinds
        .into_iter()
        .enumerate()
        .map(|(i, kind)| Action {
            id: ActionId(i as u32),
            description: describe(map, &kind),
            kind,
        })
        .collect()
}

pub fn describe(map: &GameMap, kind: &ActionKind) -> String {
    match kind {
        ActionKind::RollDice => "Roll dice".to_string(),
        ActionKind::Travel(option) => {
            format!("Travel to {} by {}", map.city_name(option.to), option.mode)
        }
        ActionKind::WaitAtPort => "Wait at port".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 0 -land- 1 -air(3)- 2, 0 -sea- 3, 1 -land- 4, 3 -air(1)- 4
    fn map() -> GameMap {
        GameMap::from_parts(
            ["A", "B", "C", "D", "E"].iter().map(|s| s.to_string()).collect(),
            vec![
                ([0, 1], LinkKind::Land),
                ([1, 2], LinkKind::Air { cost: 3 }),
                ([0, 3], LinkKind::Sea),
                ([1, 4], LinkKind::Land),
                ([3, 4], LinkKind::Air { cost: 1 }),
            ],
        )
        .unwrap()
    }

    fn destinations(options: &[TravelOption]) -> Vec<u16> {
        options.iter().map(|o| o.to.0).collect()
    }

    #[test]
    fn only_sea_before_rolling() {
        let map = map();
        let turn = Turn::new(CityId(0));
        let options = legal_links(&map, CityId(0), &turn);
        assert_eq!(destinations(&options), [3]);
        assert_eq!(options[0].mode, LinkKind::Sea);
    }

    #[test]
    fn no_sea_after_rolling() {
        let map = map();
        let mut turn = Turn::new(CityId(0));
        turn.record_roll(2);
        assert_eq!(destinations(&legal_links(&map, CityId(0), &turn)), [1]);
    }

    #[test]
    fn air_needs_points_and_no_previous_flight() {
        let map = map();

        let mut short = Turn::new(CityId(1));
        short.record_roll(2);
        assert_eq!(destinations(&legal_links(&map, CityId(1), &short)), [0, 4]);

        let mut enough = Turn::new(CityId(1));
        enough.record_roll(3);
        assert_eq!(destinations(&legal_links(&map, CityId(1), &enough)), [0, 2, 4]);

        let mut flown = Turn::new(CityId(3));
        flown.record_roll(6);
        flown.enter(CityId(4), LinkKind::Air { cost: 1 });
        flown.enter(CityId(1), LinkKind::Land);
        assert_eq!(destinations(&legal_links(&map, CityId(1), &flown)), [0]);
    }

    #[test]
    fn no_revisiting_within_a_turn() {
        let map = map();
        let mut turn = Turn::new(CityId(0));
        turn.record_roll(5);
        turn.enter(CityId(1), LinkKind::Land);
        let options = legal_links(&map, CityId(1), &turn);
        assert!(!destinations(&options).contains(&0));
    }

    #[test]
    fn actions_are_numbered_in_order() {
        let map = map();
        let turn = Turn::new(CityId(0));
        let actions = available_actions(&map, CityId(0), &turn);
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0].kind, ActionKind::RollDice);
        assert_eq!(actions[0].description, "Roll dice");
        assert_eq!(actions[1].id, ActionId(1));
        assert_eq!(actions[1].description, "Travel to D by sea");
    }

    #[test]
    fn wait_at_port_only_after_rolling() {
        let map = map();
        let mut turn = Turn::new(CityId(3));
        assert!(!available_actions(&map, CityId(3), &turn)
            .iter()
            .any(|a| a.kind == ActionKind::WaitAtPort));

        turn.record_roll(1);
        let actions = available_actions(&map, CityId(3), &turn);
        assert_eq!(actions.last().unwrap().kind, ActionKind::WaitAtPort);
        // 3 -air(1)- 4 is still open with one point.
        assert_eq!(actions.len(), 2);
    }

    #[test]
    fn dead_end_is_stuck() {
        let map = map();
        let mut turn = Turn::new(CityId(4));
        turn.record_roll(3);
        turn.enter(CityId(1), LinkKind::Land);
        turn.enter(CityId(0), LinkKind::Land);
        // From 0: land back to 1 is revisiting, sea is closed after rolling,
        // but 0 is a port so waiting remains.
        let actions = available_actions(&map, CityId(0), &turn);
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].kind, ActionKind::WaitAtPort);

        // C only has a 3-point flight and is not a port.
        let mut stuck = Turn::new(CityId(2));
        stuck.record_roll(2);
        assert!(available_actions(&map, CityId(2), &stuck).is_empty());
    }
}
