use serde::{Deserialize, Serialize};

/// Pre-game roster as seen by joining clients.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LobbyStatus {
    /// The roster is full and the game has been dealt.
    pub ready: bool,
    pub player_names: Vec<String>,
    pub max_players: u8,
}
