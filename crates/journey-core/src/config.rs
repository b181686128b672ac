//! Per-game rule settings.

use serde::{Deserialize, Serialize};

use crate::log::DEFAULT_LOG_CAPACITY;

/// Rule knobs fixed when a game is dealt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Destination cards dealt to each player; the first one is home.
    pub hand_size: usize,
    /// Narration lines kept in the message log.
    pub log_capacity: usize,
    /// Die size. Rolling the top face grants another go.
    pub dice_faces: u8,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            hand_size: 3,
            log_capacity: DEFAULT_LOG_CAPACITY,
            dice_faces: 6,
        }
    }
}
