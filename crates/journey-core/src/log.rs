use journey_protocol::LogEntry;
use serde::{Deserialize, Serialize};

use crate::clock::now_millis;

pub const DEFAULT_LOG_CAPACITY: usize = 10;

/// Fixed-size ring of narration lines.
///
/// Once full, each append overwrites the oldest line.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageLog {
    slots: Vec<Option<LogEntry>>,
    next: usize,
}

impl Default for MessageLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_LOG_CAPACITY)
    }
}

impl MessageLog {
    /// A zero capacity is bumped to one.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity.max(1)],
            next: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn append(&mut self, text: impl Into<String>) {
        self.append_at(text, now_millis());
    }

    pub fn append_at(&mut self, text: impl Into<String>, timestamp: u64) {
        let at = self.next % self.slots.len();
        self.slots[at] = Some(LogEntry {
            text: text.into(),
            timestamp,
        });
        self.next = (at + 1) % self.slots.len();
    }

    /// Stored entries, oldest first.
    pub fn list(&self) -> Vec<LogEntry> {
        let at = self.next % self.slots.len();
        let (newer, older) = self.slots.split_at(at);
        older.iter().chain(newer).flatten().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
