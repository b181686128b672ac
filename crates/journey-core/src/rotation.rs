use serde::{Deserialize, Serialize};

/// Fixed, ordered rotation over participants.
///
/// The cursor always points at whoever comes up next: `advance` hands out
/// that participant and steps forward, `rewind` hands it out and steps back.
/// Rewinding right after an advance therefore lines the same participant up
/// again, which is how an extra go is granted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircularQueue<T> {
    items: Vec<T>,
    cursor: usize,
}

impl<T> CircularQueue<T> {
    /// Returns `None` for an empty rotation.
    pub fn new(items: Vec<T>) -> Option<Self> {
        if items.is_empty() {
            return None;
        }
        Some(Self { items, cursor: 0 })
    }

    pub fn advance(&mut self) -> &T {
        let len = self.items.len();
        let at = self.cursor % len;
        self.cursor = (at + 1) % len;
        &self.items[at]
    }

    pub fn rewind(&mut self) -> &T {
        let len = self.items.len();
        let at = self.cursor % len;
        self.cursor = (at + len - 1) % len;
        &self.items[at]
    }

    /// The participant the next `advance` will return.
    pub fn peek(&self) -> &T {
        &self.items[self.cursor % self.items.len()]
    }

    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }
}
