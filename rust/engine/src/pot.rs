//! Pot tiers and chip splitting.

use serde::{Deserialize, Serialize};

use crate::player::PlayerId;

/// What one player has put into the pot over the whole hand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contribution {
    pub player_id: PlayerId,
    pub amount: u64,
    pub folded: bool,
}

/// A pot tier: every contribution between the previous tier's cap and
/// `cap`, contestable by the non-folded players who reached `cap`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SidePot {
    pub amount: u64,
    pub cap: u64,
    pub eligible: Vec<PlayerId>,
}

/// Builds pot tiers from per-player hand contributions, lowest cap first.
///
/// Caps are the distinct contribution levels of non-folded players, so every
/// all-in amount starts a new tier. Adjacent tiers with the same eligible set
/// are merged, and anything folded players put in above the top cap joins the
/// top tier. The tier amounts always add up to the sum of all contributions
/// whenever at least one non-folded player contributed.
///
/// `contributions` should be in seat order; eligible lists keep that order.
pub fn build_side_pots(contributions: &[Contribution]) -> Vec<SidePot> {
    let mut levels: Vec<u64> = contributions
        .iter()
        .filter(|c| !c.folded && c.amount > 0)
        .map(|c| c.amount)
        .collect();
    levels.sort_unstable();
    levels.dedup();

    let mut pots: Vec<SidePot> = Vec::with_capacity(levels.len());
    let mut prev = 0u64;
    for &level in &levels {
        let amount: u64 = contributions
            .iter()
            .map(|c| c.amount.min(level) - c.amount.min(prev))
            .sum();
        let eligible: Vec<PlayerId> = contributions
            .iter()
            .filter(|c| !c.folded && c.amount >= level)
            .map(|c| c.player_id.clone())
            .collect();

        match pots.last_mut() {
            Some(last) if last.eligible == eligible => {
                last.amount += amount;
                last.cap = level;
            }
            _ => pots.push(SidePot {
                amount,
                cap: level,
                eligible,
            }),
        }
        prev = level;
    }

    let overflow: u64 = contributions
        .iter()
        .map(|c| c.amount.saturating_sub(prev))
        .sum();
    if let Some(top) = pots.last_mut() {
        top.amount += overflow;
    }
    pots
}

/// Splits `amount` into `winners` shares; the first `amount % winners`
/// shares carry one extra chip.
pub fn split_pot(amount: u64, winners: usize) -> Vec<u64> {
    if winners == 0 {
        return Vec::new();
    }
    let n = winners as u64;
    let base = amount / n;
    let remainder = (amount % n) as usize;
    (0..winners)
        .map(|i| if i < remainder { base + 1 } else { base })
        .collect()
}
