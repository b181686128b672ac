//! Data exchanged between the Journey engine, its hosting layer and clients.
//!
//! Everything here is plain serde data: no game rules live in this crate.

mod action;
mod ids;
mod lobby;
mod status;
mod types;
pub mod wire;

pub use crate::action::*;
pub use crate::ids::*;
pub use crate::lobby::*;
pub use crate::status::*;
pub use crate::types::*;
