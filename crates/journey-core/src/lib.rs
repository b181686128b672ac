//! Rules engine for the Journey travel board game.
//!
//! Players race around a city graph collecting destination cards, moving by
//! land, sea or air according to a dice roll. The engine is deterministic
//! given its seed and owns no I/O beyond loading map files.

mod clock;
mod config;
mod deck;
mod game;
pub mod legality;
mod log;
mod map;
mod player;
mod rng;
mod rotation;
pub mod selfplay;
mod status;
mod turn;

pub use crate::clock::now_millis;
pub use crate::config::*;
pub use crate::deck::*;
pub use crate::game::*;
pub use crate::log::*;
pub use crate::map::*;
pub use crate::player::*;
pub use crate::rng::*;
pub use crate::rotation::*;
pub use crate::selfplay::{run_batch_selfplay, run_selfplay, BatchSelfPlayResult, SelfPlayConfig, SelfPlayResult};
pub use crate::turn::*;
