//! Hosting layer around the Journey engine.
//!
//! Collects rosters, keeps saved games in a store, and serializes every
//! mutation of a game behind a per-game lock.

pub mod config;
pub mod matchmaker;
pub mod registry;
pub mod store;

pub use config::ServerConfig;
pub use matchmaker::{LobbyError, Matchmaker, SavedMatch};
pub use registry::{normalize_name, GameRegistry, RegistryError};
pub use store::{DirStore, GameStore, MemoryStore, StoreError};
