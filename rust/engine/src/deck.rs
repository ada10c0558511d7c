use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use crate::cards::{full_deck, Card};
use crate::errors::DeckError;

/// A depleting 52-card deck that owns its random source.
///
/// Each deck carries its own `ChaCha20Rng`, so shuffles at one table never
/// consume randomness shared with another and can be reproduced from a seed.
#[derive(Debug)]
pub struct Deck {
    cards: Vec<Card>,
    position: usize,
    rng: ChaCha20Rng,
    seed: u64,
}

impl Deck {
    /// Canonical, unshuffled deck seeded from fresh entropy.
    pub fn new() -> Self {
        Self::new_with_seed(rand::random())
    }

    pub fn new_with_seed(seed: u64) -> Self {
        let rng = ChaCha20Rng::seed_from_u64(seed);
        // Keep initial order until shuffle is called explicitly
        Self {
            cards: full_deck(),
            position: 0,
            rng,
            seed,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Fisher–Yates over the undealt cards.
    pub fn shuffle(&mut self) {
        self.cards[self.position..].shuffle(&mut self.rng);
    }

    pub fn deal(&mut self) -> Result<Card, DeckError> {
        let card = *self.cards.get(self.position).ok_or(DeckError::EmptyDeck)?;
        self.position += 1;
        Ok(card)
    }

    /// Deals `n` cards or nothing at all.
    pub fn deal_multiple(&mut self, n: usize) -> Result<Vec<Card>, DeckError> {
        let remaining = self.remaining();
        if n > remaining {
            return Err(DeckError::InsufficientCards {
                requested: n,
                remaining,
            });
        }
        let dealt = self.cards[self.position..self.position + n].to_vec();
        self.position += n;
        Ok(dealt)
    }

    pub fn burn(&mut self) -> Result<(), DeckError> {
        self.deal().map(|_| ())
    }

    /// Restores all 52 cards and shuffles them.
    pub fn reset(&mut self) {
        self.cards = full_deck();
        self.position = 0;
        self.shuffle();
    }

    pub fn remaining(&self) -> usize {
        self.cards.len().saturating_sub(self.position)
    }
}

impl Default for Deck {
    fn default() -> Self {
        Self::new()
    }
}
