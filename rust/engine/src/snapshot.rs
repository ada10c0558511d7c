use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::game::Phase;
use crate::history::ActionRecord;
use crate::player::PlayerId;
use crate::pot::SidePot;

/// Viewer-scoped, read-only picture of a table.
///
/// Hole cards appear for the viewer's own seat and, once a hand reaches
/// showdown, for every hand that was shown down.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameSnapshot {
    pub game_id: String,
    pub name: String,
    pub phase: Phase,
    pub hand_number: u64,
    pub pot: u64,
    #[serde(default)]
    pub side_pots: Vec<SidePot>,
    pub community_cards: Vec<Card>,
    pub players: Vec<PlayerView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_player: Option<PlayerId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dealer: Option<PlayerId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub small_blind_player: Option<PlayerId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub big_blind_player: Option<PlayerId>,
    /// True when the viewer is the player to act
    pub can_act: bool,
    pub street_high: u64,
    pub min_raise: u64,
    pub small_blind: u64,
    pub big_blind: u64,
    pub turn_timeout: Duration,
    pub decision_timeout: Duration,
    pub last_activity: DateTime<Utc>,
}

impl GameSnapshot {
    pub fn player(&self, id: &str) -> Option<&PlayerView> {
        self.players.iter().find(|p| p.id == id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerView {
    pub id: PlayerId,
    pub username: String,
    pub seat: usize,
    pub chips: u64,
    pub current_bet: u64,
    pub total_bet: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hole_cards: Option<Vec<Card>>,
    pub folded: bool,
    pub all_in: bool,
    pub active: bool,
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_action: Option<ActionRecord>,
}

/// Public listing entry for a table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TableSummary {
    pub id: String,
    pub name: String,
    pub player_count: usize,
    pub max_players: usize,
    pub small_blind: u64,
    pub big_blind: u64,
    pub buy_in: u64,
    pub phase: Phase,
    pub created_at: DateTime<Utc>,
}
