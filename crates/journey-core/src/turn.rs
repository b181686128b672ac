//! Per-turn state: dice, remaining points, flight flag and route.

use journey_protocol::{CityId, LinkKind};
use serde::{Deserialize, Serialize};

/// Where a turn stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TurnPhase {
    /// Dice not rolled yet; a sea crossing may still be taken instead.
    AwaitingDiceOrSeaMove,
    /// Dice rolled and points remain to spend.
    DiceRolled { points: u8 },
    /// Nothing more can happen this turn.
    Finished,
}

/// State of the current player's turn. A fresh one starts every turn.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    dice_roll: Option<u8>,
    points: Option<u8>,
    flown: bool,
    sailed: bool,
    /// Cities entered this turn, starting with where the turn began.
    route: Vec<CityId>,
}

impl Turn {
    pub fn new(start: CityId) -> Self {
        Self {
            dice_roll: None,
            points: None,
            flown: false,
            sailed: false,
            route: vec![start],
        }
    }

    pub fn phase(&self) -> TurnPhase {
        if self.sailed {
            return TurnPhase::Finished;
        }
        match self.points {
            None => TurnPhase::AwaitingDiceOrSeaMove,
            Some(0) => TurnPhase::Finished,
            Some(points) => TurnPhase::DiceRolled { points },
        }
    }

    pub fn has_rolled(&self) -> bool {
        self.dice_roll.is_some()
    }

    pub fn dice_roll(&self) -> Option<u8> {
        self.dice_roll
    }

    pub fn points_left(&self) -> Option<u8> {
        self.points
    }

    pub fn has_flown(&self) -> bool {
        self.flown
    }

    pub fn route(&self) -> &[CityId] {
        &self.route
    }

    pub fn start(&self) -> CityId {
        self.route[0]
    }

    pub fn has_entered(&self, city: CityId) -> bool {
        self.route.contains(&city)
    }

    pub fn record_roll(&mut self, value: u8) {
        self.dice_roll = Some(value);
        self.points = Some(value);
    }

    /// Record a move into `city`, paying for it according to `mode`.
    pub fn enter(&mut self, city: CityId, mode: LinkKind) {
        self.route.push(city);
        match mode {
            LinkKind::Sea => self.sailed = true,
            LinkKind::Land => self.spend(1),
            LinkKind::Air { cost } => {
                self.spend(cost);
                self.flown = true;
            }
        }
    }

    fn spend(&mut self, cost: u8) {
        if let Some(points) = self.points.as_mut() {
            *points = points.saturating_sub(cost);
        }
    }

    /// Sea crossings and running out of points both end the turn.
    pub fn is_over(&self) -> bool {
        self.phase() == TurnPhase::Finished
    }
}
