use journey_protocol::{CityId, DestinationCard};
use serde::{Deserialize, Serialize};

/// A participant and their destination hand.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    name: String,
    /// Dealt once at game start; the first card is home.
    destinations: Vec<CityId>,
    /// Collected destinations, in collection order.
    visited: Vec<CityId>,
    home: CityId,
    current: CityId,
}

impl Player {
    /// Players start at home, which is the first card of their hand.
    ///
    /// Returns `None` for an empty hand.
    pub fn new(name: impl Into<String>, destinations: Vec<CityId>) -> Option<Self> {
        let home = *destinations.first()?;
        Some(Self {
            name: name.into(),
            destinations,
            visited: Vec::new(),
            home,
            current: home,
        })
    }

    /// Place the player somewhere other than home before play starts.
    pub fn starting_at(mut self, city: CityId) -> Self {
        self.current = city;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn destinations(&self) -> &[CityId] {
        &self.destinations
    }

    pub fn visited(&self) -> &[CityId] {
        &self.visited
    }

    pub fn home(&self) -> CityId {
        self.home
    }

    pub fn current_city(&self) -> CityId {
        self.current
    }

    pub fn move_to(&mut self, city: CityId) {
        self.current = city;
    }

    pub fn has_visited(&self, city: CityId) -> bool {
        self.visited.contains(&city)
    }

    /// Destinations still to collect, in hand order.
    pub fn remaining(&self) -> impl Iterator<Item = CityId> + '_ {
        self.destinations
            .iter()
            .copied()
            .filter(|c| !self.has_visited(*c))
    }

    /// Arriving at `city` would collect it.
    ///
    /// Home only counts once every other destination has been collected.
    pub fn can_collect(&self, city: CityId) -> bool {
        if !self.destinations.contains(&city) || self.has_visited(city) {
            return false;
        }
        city != self.home || self.remaining().all(|c| c == self.home)
    }

    /// Mark `city` collected if allowed; returns whether it was.
    pub fn collect(&mut self, city: CityId) -> bool {
        if !self.can_collect(city) {
            return false;
        }
        self.visited.push(city);
        true
    }

    pub fn has_completed(&self) -> bool {
        self.remaining().next().is_none()
    }

    /// "visited/total".
    pub fn progress(&self) -> String {
        format!("{}/{}", self.visited.len(), self.destinations.len())
    }

    pub fn cards(&self) -> Vec<DestinationCard> {
        self.destinations
            .iter()
            .map(|&city| DestinationCard {
                city,
                visited: self.has_visited(city),
                home: city == self.home,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hand(ids: &[u16]) -> Vec<CityId> {
        ids.iter().copied().map(CityId).collect()
    }

    #[test]
    fn starts_at_home() {
        let p = Player::new("John", hand(&[4, 7, 9])).unwrap();
        assert_eq!(p.home(), CityId(4));
        assert_eq!(p.current_city(), CityId(4));
        assert_eq!(p.progress(), "0/3");
        assert!(Player::new("Nobody", Vec::new()).is_none());
    }

    #[test]
    fn home_is_collected_last() {
        let mut p = Player::new("Yoko", hand(&[4, 7, 9])).unwrap();
        assert!(!p.can_collect(CityId(4)));
        assert!(!p.collect(CityId(4)));

        assert!(p.collect(CityId(9)));
        assert!(!p.collect(CityId(9)));
        assert!(!p.can_collect(CityId(4)));

        assert!(p.collect(CityId(7)));
        assert!(p.can_collect(CityId(4)));
        assert!(!p.has_completed());

        assert!(p.collect(CityId(4)));
        assert!(p.has_completed());
        assert_eq!(p.progress(), "3/3");
        assert_eq!(p.visited(), &[CityId(9), CityId(7), CityId(4)]);
    }

    #[test]
    fn only_destinations_are_collected() {
        let mut p = Player::new("John", hand(&[1, 2])).unwrap();
        assert!(!p.collect(CityId(3)));
        assert!(p.visited().is_empty());
    }

    #[test]
    fn single_card_hand_is_home_only() {
        let mut p = Player::new("Solo", hand(&[2])).unwrap();
        assert!(p.can_collect(CityId(2)));
        assert!(p.collect(CityId(2)));
        assert!(p.has_completed());
    }

    #[test]
    fn cards_flag_visits_and_home() {
        let mut p = Player::new("John", hand(&[1, 2])).unwrap();
        p.collect(CityId(2));
        let cards = p.cards();
        assert_eq!(
            cards,
            vec![
                DestinationCard { city: CityId(1), visited: false, home: true },
                DestinationCard { city: CityId(2), visited: true, home: false },
            ]
        );
    }
}
