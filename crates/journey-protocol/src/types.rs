use std::fmt;

use serde::{Deserialize, Serialize};

/// How two cities are connected.
///
/// Only air links carry a movement-point cost; land links always cost one
/// point and sea links consume the whole turn instead of points.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LinkKind {
    Land,
    Sea,
    Air { cost: u8 },
}

impl LinkKind {
    /// Movement points spent travelling along a link of this kind.
    pub const fn points(self) -> u8 {
        match self {
            LinkKind::Land => 1,
            LinkKind::Sea => 0,
            LinkKind::Air { cost } => cost,
        }
    }

    pub const fn is_sea(self) -> bool {
        matches!(self, LinkKind::Sea)
    }

    pub const fn is_air(self) -> bool {
        matches!(self, LinkKind::Air { .. })
    }

    pub const fn name(self) -> &'static str {
        match self {
            LinkKind::Land => "land",
            LinkKind::Sea => "sea",
            LinkKind::Air { .. } => "air",
        }
    }
}

impl fmt::Display for LinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One line of the in-game narration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub text: String,
    /// Milliseconds since the UNIX epoch.
    pub timestamp: u64,
}
