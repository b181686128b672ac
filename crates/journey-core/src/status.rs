//! Status snapshots and per-viewer redaction.

use journey_protocol::{GameStatus, PlayerRecord, StatusReply};

use crate::GameEngine;

impl GameEngine {
    /// Full, unredacted status of the game as it stands.
    pub(crate) fn build_snapshot(&self, timestamp: u64) -> GameStatus {
        let state = &self.state;
        let current = self.current_player();

        GameStatus {
            in_progress: state.in_progress,
            winner: self.winner().map(|p| p.name().to_string()),
            current_player: current.name().to_string(),
            current_city: current.current_city(),
            dice_roll: state.turn.dice_roll(),
            dice_points: state.turn.points_left(),
            players: state
                .players
                .iter()
                .map(|p| PlayerRecord {
                    name: p.name().to_string(),
                    progress: p.progress(),
                    current_city: p.current_city(),
                    cards: Some(p.cards()),
                })
                .collect(),
            actions: Some(state.actions.clone()),
            messages: state.log.list(),
            timestamp,
        }
    }

    /// Generation time of the latest snapshot.
    pub fn snapshot_timestamp(&self) -> u64 {
        self.state.snapshot.timestamp
    }

    /// The latest snapshot as `viewer` may see it.
    ///
    /// Destination cards are kept only on the viewer's own record, and the
    /// action list only when the viewer is the one to move.
    pub fn status_for(&self, viewer: &str) -> GameStatus {
        let mut status = self.state.snapshot.clone();

        for record in status.players.iter_mut() {
            if record.name != viewer {
                record.cards = None;
            }
        }

        if !status.in_progress || status.current_player != viewer {
            status.actions = None;
        }

        status
    }

    /// Poll for changes: `Unchanged` when `since` is at least as new as the
    /// latest snapshot.
    pub fn status(&self, viewer: &str, since: Option<u64>) -> StatusReply {
        match since {
            Some(ts) if ts >= self.snapshot_timestamp() => StatusReply::Unchanged,
            _ => StatusReply::Updated {
                status: Box::new(self.status_for(viewer)),
            },
        }
    }
}
