use serde::{Deserialize, Serialize};

use crate::{ActionId, CityId, LinkId, LinkKind};

/// Something the current player may do right now.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub id: ActionId,
    pub kind: ActionKind,
    /// Human-readable label, e.g. "Travel to Paris by land".
    pub description: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionKind {
    RollDice,
    Travel(TravelOption),
    WaitAtPort,
}

/// A legal move along one map link.
///
/// `to` is derived from the player's position when the option is computed;
/// it is never written back into the map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TravelOption {
    pub link: LinkId,
    pub from: CityId,
    pub to: CityId,
    pub mode: LinkKind,
}
