use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::errors::GameError;
use crate::history::ActionRecord;

pub type PlayerId = String;

/// A decision submitted by the player to act.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "amount", rename_all = "snake_case")]
pub enum PlayerAction {
    /// Fold and forfeit the hand
    Fold,
    /// Pass without wagering; only legal when nothing is owed
    Check,
    /// Match the street-high bet
    Call,
    /// Raise the street-high bet by the given increment
    Raise(u64),
    /// Wager every remaining chip
    AllIn,
}

/// Per-seat betting and card state.
///
/// Only ever touched while the owning game is locked, so no locking here.
#[derive(Debug, Clone)]
pub struct Player {
    id: PlayerId,
    username: String,
    chips: u64,
    hole: Vec<Card>,
    current_bet: u64,
    total_bet: u64,
    folded: bool,
    all_in: bool,
    active: bool,
    connected: bool,
    acted_this_street: bool,
    last_action: Option<ActionRecord>,
    seat: usize,
    hand_start_chips: u64,
}

impl Player {
    pub fn new(id: impl Into<PlayerId>, username: impl Into<String>, buy_in: u64, seat: usize) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            chips: buy_in,
            hole: Vec::with_capacity(2),
            current_bet: 0,
            total_bet: 0,
            folded: false,
            all_in: false,
            active: buy_in > 0,
            connected: true,
            acted_this_street: false,
            last_action: None,
            seat,
            hand_start_chips: buy_in,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
    pub fn username(&self) -> &str {
        &self.username
    }
    pub fn chips(&self) -> u64 {
        self.chips
    }
    pub fn hole_cards(&self) -> &[Card] {
        &self.hole
    }
    pub fn current_bet(&self) -> u64 {
        self.current_bet
    }
    pub fn total_bet(&self) -> u64 {
        self.total_bet
    }
    pub fn is_folded(&self) -> bool {
        self.folded
    }
    pub fn is_all_in(&self) -> bool {
        self.all_in
    }
    pub fn is_active(&self) -> bool {
        self.active
    }
    pub fn is_connected(&self) -> bool {
        self.connected
    }
    pub fn has_acted(&self) -> bool {
        self.acted_this_street
    }
    pub fn last_action(&self) -> Option<&ActionRecord> {
        self.last_action.as_ref()
    }
    pub fn seat(&self) -> usize {
        self.seat
    }
    pub fn hand_start_chips(&self) -> u64 {
        self.hand_start_chips
    }

    /// Moves `amount` from the stack into this street's bet.
    pub fn bet(&mut self, amount: u64) -> Result<(), GameError> {
        if amount > self.chips {
            return Err(GameError::InsufficientChips {
                needed: amount,
                available: self.chips,
            });
        }
        self.chips -= amount;
        self.current_bet += amount;
        self.total_bet += amount;
        if self.chips == 0 {
            self.all_in = true;
        }
        Ok(())
    }

    pub fn fold(&mut self) {
        self.folded = true;
    }

    pub fn can_act(&self) -> bool {
        self.active && !self.folded && !self.all_in && self.connected
    }

    pub fn reset_for_new_hand(&mut self) {
        self.hole.clear();
        self.current_bet = 0;
        self.total_bet = 0;
        self.folded = false;
        self.all_in = false;
        self.acted_this_street = false;
        self.last_action = None;
        self.active = self.chips > 0 && self.connected;
        self.hand_start_chips = self.chips;
    }

    pub(crate) fn give_card(&mut self, c: Card) -> Result<(), GameError> {
        if self.hole.len() >= 2 {
            return Err(GameError::InvalidAction("hole cards already full".into()));
        }
        self.hole.push(c);
        Ok(())
    }

    pub(crate) fn reset_street(&mut self) {
        self.current_bet = 0;
        self.acted_this_street = false;
    }

    pub(crate) fn record_action(&mut self, record: ActionRecord) {
        self.acted_this_street = true;
        self.last_action = Some(record);
    }

    pub(crate) fn disconnect(&mut self) {
        self.connected = false;
        self.active = false;
    }

    pub(crate) fn award(&mut self, amount: u64) {
        self.chips += amount;
    }

    /// Returns this hand's contributions to the stack.
    pub(crate) fn refund_hand(&mut self) {
        self.chips += self.total_bet;
        self.current_bet = 0;
        self.total_bet = 0;
        self.all_in = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bet_tracks_street_and_hand_totals() {
        let mut p = Player::new("p1", "alice", 1_000, 0);
        p.bet(100).expect("bet");
        p.reset_street();
        p.bet(250).expect("bet");
        assert_eq!(p.chips(), 650);
        assert_eq!(p.current_bet(), 250);
        assert_eq!(p.total_bet(), 350);
        assert!(!p.is_all_in());
    }

    #[test]
    fn overbet_fails_without_side_effects() {
        let mut p = Player::new("p1", "alice", 100, 0);
        let err = p.bet(101).unwrap_err();
        assert_eq!(
            err,
            GameError::InsufficientChips {
                needed: 101,
                available: 100
            }
        );
        assert_eq!(p.chips(), 100);
        assert_eq!(p.current_bet(), 0);
    }

    #[test]
    fn betting_whole_stack_sets_all_in() {
        let mut p = Player::new("p1", "alice", 100, 0);
        p.bet(100).expect("bet");
        assert!(p.is_all_in());
        assert!(!p.can_act());
    }

    #[test]
    fn fold_is_idempotent() {
        let mut p = Player::new("p1", "alice", 100, 0);
        p.fold();
        p.fold();
        assert!(p.is_folded());
        assert!(!p.can_act());
    }

    #[test]
    fn reset_recomputes_active_from_chips_and_connection() {
        let mut busted = Player::new("p1", "alice", 100, 0);
        busted.bet(100).expect("bet");
        busted.reset_for_new_hand();
        assert!(!busted.is_active());

        let mut gone = Player::new("p2", "bob", 100, 1);
        gone.disconnect();
        gone.reset_for_new_hand();
        assert!(!gone.is_active());
        assert!(!gone.can_act());

        let mut fresh = Player::new("p3", "carol", 100, 2);
        fresh.bet(40).expect("bet");
        fresh.fold();
        fresh.reset_for_new_hand();
        assert!(fresh.can_act());
        assert_eq!(fresh.total_bet(), 0);
        assert_eq!(fresh.hand_start_chips(), 60);
    }
}
