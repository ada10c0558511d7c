use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::game::Phase;
use crate::hand::Hand;
use crate::player::PlayerId;

/// What a log entry records: a forced blind or a voluntary action.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    PostSmallBlind,
    PostBigBlind,
    Fold,
    Check,
    Call,
    Raise,
    AllIn,
}

/// One entry of a hand's action log.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub player_id: PlayerId,
    /// The street the action happened on
    pub phase: Phase,
    pub kind: ActionKind,
    /// Chips moved into the pot by this action
    pub amount: u64,
    pub at: DateTime<Utc>,
}

/// One settled pot tier.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct PotAward {
    pub amount: u64,
    pub eligible: Vec<PlayerId>,
    pub winners: Vec<PlayerId>,
    /// Chips paid to each winner, aligned with `winners`
    pub shares: Vec<u64>,
}

/// A hand shown down at settlement.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct ShowdownHand {
    pub player_id: PlayerId,
    pub hole_cards: Vec<Card>,
    pub hand: Hand,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct PlayerResult {
    pub player_id: PlayerId,
    pub starting_chips: u64,
    pub ending_chips: u64,
    pub net: i64,
}

/// Stack a departing player took with them when unseated.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct CashOut {
    pub player_id: PlayerId,
    pub chips: u64,
}

/// Finished-hand record handed to whoever persists hand history.
/// The engine itself never stores it.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct HandSummary {
    /// `<game_id>-<hand_number:06>`
    pub hand_id: String,
    pub game_id: String,
    pub game_name: String,
    pub hand_number: u64,
    /// Seed of the table's deck; replays the table's shuffles
    pub seed: u64,
    pub dealer: Option<PlayerId>,
    pub board: Vec<Card>,
    pub pot: u64,
    pub went_to_showdown: bool,
    pub pots: Vec<PotAward>,
    #[serde(default)]
    pub showdown: Vec<ShowdownHand>,
    pub results: Vec<PlayerResult>,
    /// Players unseated at settlement because they left during the hand
    #[serde(default)]
    pub removed_players: Vec<PlayerId>,
    /// Stacks of `removed_players`, in the same order
    #[serde(default)]
    pub cash_outs: Vec<CashOut>,
    pub actions: Vec<ActionRecord>,
    pub ended_at: DateTime<Utc>,
}

impl HandSummary {
    /// Single-line JSON, one hand per line.
    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn winners(&self) -> Vec<&PlayerId> {
        let mut winners: Vec<&PlayerId> = Vec::new();
        for award in &self.pots {
            for w in &award.winners {
                if !winners.contains(&w) {
                    winners.push(w);
                }
            }
        }
        winners
    }

    pub fn result_for(&self, player_id: &str) -> Option<&PlayerResult> {
        self.results.iter().find(|r| r.player_id == player_id)
    }

    pub fn cash_out_for(&self, player_id: &str) -> Option<u64> {
        self.cash_outs
            .iter()
            .find(|c| c.player_id == player_id)
            .map(|c| c.chips)
    }
}

pub fn format_hand_id(game_id: &str, hand_number: u64) -> String {
    format!("{}-{:06}", game_id, hand_number)
}
