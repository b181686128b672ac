//! Server configuration

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use journey_core::GameConfig;
use serde::{Deserialize, Serialize};

/// Server configuration, loaded from YAML
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Highest game id handed out; ids are drawn from `1..=max_games`
    #[serde(default = "default_max_games")]
    pub max_games: u32,
    /// Map file (the built-in Europe map when unset)
    pub map_path: Option<PathBuf>,
    /// Directory for saved games (kept in memory when unset)
    pub data_dir: Option<PathBuf>,
    /// Rules applied to every new game
    pub game: GameConfig,
}

fn default_max_games() -> u32 {
    100
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            max_games: default_max_games(),
            map_path: None,
            data_dir: None,
            game: GameConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;
        Ok(config)
    }

    /// Load `path` if given and present, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) if path.exists() => Self::load(path),
            _ => Ok(Self::default()),
        }
    }
}
