use serde::{Deserialize, Serialize};

use crate::{Action, CityId, LogEntry};

/// Everything a client needs to render the game, as seen by one viewer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStatus {
    pub in_progress: bool,
    #[serde(default)]
    pub winner: Option<String>,
    pub current_player: String,
    pub current_city: CityId,
    /// Value rolled this turn (None until the dice are rolled).
    #[serde(default)]
    pub dice_roll: Option<u8>,
    /// Movement points still unspent this turn.
    #[serde(default)]
    pub dice_points: Option<u8>,
    pub players: Vec<PlayerRecord>,
    /// Present only when the viewer is the current player.
    #[serde(default)]
    pub actions: Option<Vec<Action>>,
    /// Narration, oldest first.
    #[serde(default)]
    pub messages: Vec<LogEntry>,
    /// Generation time of this snapshot, in milliseconds since the UNIX epoch.
    pub timestamp: u64,
}

/// Public view of one player.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub name: String,
    /// "visited/total", e.g. "1/3".
    pub progress: String,
    pub current_city: CityId,
    /// Destination cards; only filled in on the viewer's own record.
    #[serde(default)]
    pub cards: Option<Vec<DestinationCard>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestinationCard {
    pub city: CityId,
    pub visited: bool,
    /// The home city must be collected last.
    pub home: bool,
}

/// Answer to a status poll.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StatusReply {
    /// The viewer's timestamp is at least as new as the latest snapshot.
    Unchanged,
    Updated { status: Box<GameStatus> },
}

impl StatusReply {
    pub fn is_unchanged(&self) -> bool {
        matches!(self, StatusReply::Unchanged)
    }

    pub fn into_status(self) -> Option<GameStatus> {
        match self {
            StatusReply::Unchanged => None,
            StatusReply::Updated { status } => Some(*status),
        }
    }
}
