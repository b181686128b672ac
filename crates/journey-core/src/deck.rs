use thiserror::Error;

use crate::GameRng;

/// Dealing from an empty deck. Construction sizes the deck up front, so
/// hitting this means the caller broke that contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("card deck exhausted")]
pub struct DeckExhausted;

/// A shuffled pile of cards dealt one at a time without replacement.
#[derive(Clone, Debug)]
pub struct CardDeck<T> {
    cards: Vec<T>,
}

impl<T> CardDeck<T> {
    /// Shuffle `cards` with a uniform random permutation.
    pub fn shuffled(mut cards: Vec<T>, rng: &mut GameRng) -> Self {
        rng.shuffle(&mut cards);
        Self { cards }
    }

    pub fn deal(&mut self) -> Result<T, DeckExhausted> {
        self.cards.pop().ok_or(DeckExhausted)
    }

    pub fn remaining(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}
