use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::config::GameConfig;
use crate::deck::Deck;
use crate::errors::GameError;
use crate::hand::{best_hand, Hand};
use crate::history::{
    format_hand_id, ActionKind, ActionRecord, CashOut, HandSummary, PlayerResult, PotAward,
    ShowdownHand,
};
use crate::player::{Player, PlayerAction, PlayerId};
use crate::pot::{build_side_pots, split_pot, Contribution, SidePot};
use crate::rules::{validate_action, ValidatedAction};
use crate::snapshot::{GameSnapshot, PlayerView, TableSummary};

/// Table lifecycle. `GameOver` is terminal.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    WaitingForPlayers,
    PreFlop,
    Flop,
    Turn,
    River,
    Showdown,
    GameOver,
}

impl Phase {
    /// A betting street is being played.
    pub fn is_betting(self) -> bool {
        matches!(self, Phase::PreFlop | Phase::Flop | Phase::Turn | Phase::River)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::WaitingForPlayers => "Waiting for Players",
            Phase::PreFlop => "Pre-Flop",
            Phase::Flop => "Flop",
            Phase::Turn => "Turn",
            Phase::River => "River",
            Phase::Showdown => "Showdown",
            Phase::GameOver => "Game Over",
        };
        f.write_str(name)
    }
}

/// One No-Limit Hold'em table.
///
/// `Game` holds no lock of its own: the owner serializes every call (the
/// lobby keeps each table behind a mutex), so each `&mut self` method runs a
/// whole validate → apply → advance step atomically. Nothing here sleeps,
/// performs I/O, or reads timers other than stamping activity times.
#[derive(Debug)]
pub struct Game {
    id: String,
    name: String,
    config: GameConfig,
    seat_order: Vec<PlayerId>,
    players: HashMap<PlayerId, Player>,
    phase: Phase,
    community: Vec<Card>,
    pot: u64,
    side_pots: Vec<SidePot>,
    deck: Deck,
    dealer_pos: usize,
    small_blind_pos: usize,
    big_blind_pos: usize,
    current_player: usize,
    street_high: u64,
    min_raise: u64,
    hand_number: u64,
    actions: Vec<ActionRecord>,
    revealed: Vec<PlayerId>,
    last_summary: Option<HandSummary>,
    created_at: DateTime<Utc>,
    last_activity: DateTime<Utc>,
}

impl Game {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        config: GameConfig,
    ) -> Result<Self, GameError> {
        config.validate()?;
        let deck = match config.seed {
            Some(seed) => Deck::new_with_seed(seed),
            None => Deck::new(),
        };
        let now = Utc::now();
        Ok(Self {
            id: id.into(),
            name: name.into(),
            min_raise: config.big_blind,
            config,
            seat_order: Vec::new(),
            players: HashMap::new(),
            phase: Phase::WaitingForPlayers,
            community: Vec::with_capacity(5),
            pot: 0,
            side_pots: Vec::new(),
            deck,
            dealer_pos: 0,
            small_blind_pos: 0,
            big_blind_pos: 0,
            current_player: 0,
            street_high: 0,
            hand_number: 0,
            actions: Vec::new(),
            revealed: Vec::new(),
            last_summary: None,
            created_at: now,
            last_activity: now,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn config(&self) -> &GameConfig {
        &self.config
    }
    pub fn phase(&self) -> Phase {
        self.phase
    }
    pub fn pot(&self) -> u64 {
        self.pot
    }
    pub fn side_pots(&self) -> &[SidePot] {
        &self.side_pots
    }
    pub fn community_cards(&self) -> &[Card] {
        &self.community
    }
    pub fn hand_number(&self) -> u64 {
        self.hand_number
    }
    pub fn street_high(&self) -> u64 {
        self.street_high
    }
    pub fn min_raise(&self) -> u64 {
        self.min_raise
    }
    pub fn seed(&self) -> u64 {
        self.deck.seed()
    }
    pub fn actions(&self) -> &[ActionRecord] {
        &self.actions
    }
    pub fn last_summary(&self) -> Option<&HandSummary> {
        self.last_summary.as_ref()
    }
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
    pub fn last_activity(&self) -> DateTime<Utc> {
        self.last_activity
    }
    pub fn seat_order(&self) -> &[PlayerId] {
        &self.seat_order
    }
    pub fn player(&self, id: &str) -> Option<&Player> {
        self.players.get(id)
    }
    pub fn has_player(&self, id: &str) -> bool {
        self.players.contains_key(id)
    }
    pub fn player_count(&self) -> usize {
        self.seat_order.len()
    }
    pub fn is_empty(&self) -> bool {
        self.seat_order.is_empty()
    }

    /// Seated players in seat order.
    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.seat_order.iter().filter_map(|id| self.players.get(id))
    }

    pub fn occupied_seats(&self) -> Vec<usize> {
        self.players().map(Player::seat).collect()
    }

    /// Connected players that still have chips.
    pub fn active_player_count(&self) -> usize {
        self.players()
            .filter(|p| p.chips() > 0 && p.is_connected())
            .count()
    }

    /// Sum of every seated stack plus the chips in the middle.
    pub fn total_chips(&self) -> u64 {
        self.players().map(Player::chips).sum::<u64>() + self.pot
    }

    pub fn current_player_id(&self) -> Option<&str> {
        if !self.phase.is_betting() {
            return None;
        }
        self.seat_order.get(self.current_player).map(String::as_str)
    }

    pub fn dealer_id(&self) -> Option<&str> {
        self.seat_id(self.dealer_pos)
    }

    /// The hand number a deferred next-hand start should carry, if the table
    /// is between hands.
    pub fn awaiting_next_hand(&self) -> Option<u64> {
        (self.phase == Phase::Showdown).then_some(self.hand_number)
    }

    pub fn add_player(&mut self, player: Player) -> Result<Option<HandSummary>, GameError> {
        if self.phase == Phase::GameOver {
            return Err(GameError::GameOver);
        }
        if self.seat_order.len() >= self.config.max_players {
            return Err(GameError::GameFull {
                max_players: self.config.max_players,
            });
        }
        if self.players.contains_key(player.id()) {
            return Err(GameError::PlayerAlreadyInGame(player.id().to_string()));
        }
        if player.seat() >= self.config.max_players || self.occupied_seats().contains(&player.seat())
        {
            return Err(GameError::InvalidAction(format!(
                "seat {} is not available",
                player.seat()
            )));
        }

        let mut player = player;
        if self.phase.is_betting() {
            // dealt in from the next hand
            player.fold();
        }
        tracing::info!(
            game_id = %self.id,
            player_id = %player.id(),
            seat = player.seat(),
            chips = player.chips(),
            "player seated"
        );
        self.seat_order.push(player.id().to_string());
        self.players.insert(player.id().to_string(), player);
        self.touch();

        if self.phase == Phase::WaitingForPlayers && self.seat_order.len() >= self.config.min_players {
            return self.begin_hand();
        }
        Ok(None)
    }

    /// Leaves the table. Between hands the seat is freed at once; during a
    /// hand the player is disconnected, folded only if it is their turn, and
    /// unseated when the hand settles.
    pub fn remove_player(&mut self, player_id: &str) -> Result<Option<HandSummary>, GameError> {
        let Some(player) = self.players.get_mut(player_id) else {
            return Err(GameError::PlayerNotInGame(player_id.to_string()));
        };

        if !self.phase.is_betting() {
            if let Some(idx) = self.seat_order.iter().position(|id| id == player_id) {
                self.unseat(idx);
            }
            if self.phase == Phase::Showdown && self.active_player_count() < self.config.min_players
            {
                self.phase = Phase::GameOver;
            }
            tracing::info!(game_id = %self.id, player_id = %player_id, "player left");
            self.touch();
            return Ok(None);
        }

        player.disconnect();
        tracing::info!(
            game_id = %self.id,
            player_id = %player_id,
            hand_number = self.hand_number,
            "player disconnected mid-hand"
        );
        self.touch();
        // Out of turn the player just stops acting and keeps their claim on
        // the tiers they already paid into.
        if self.current_player_id() == Some(player_id) {
            return self.apply_action(player_id, PlayerAction::Fold, true);
        }
        Ok(None)
    }

    /// The single entry point for betting decisions.
    pub fn process_action(
        &mut self,
        player_id: &str,
        action: PlayerAction,
    ) -> Result<Option<HandSummary>, GameError> {
        self.apply_action(player_id, action, false)
    }

    /// Starts the hand scheduled after `hand_number` settled. A start for a
    /// hand that is no longer the latest, or for a table not between hands,
    /// does nothing.
    pub fn start_scheduled_hand(
        &mut self,
        hand_number: u64,
    ) -> Result<Option<HandSummary>, GameError> {
        if self.phase != Phase::Showdown || self.hand_number != hand_number {
            tracing::debug!(
                game_id = %self.id,
                scheduled_for = hand_number,
                hand_number = self.hand_number,
                phase = %self.phase,
                "ignoring stale next-hand start"
            );
            return Ok(None);
        }
        self.begin_hand()
    }

    pub fn snapshot(&self, viewer: Option<&str>) -> GameSnapshot {
        let show_revealed = matches!(self.phase, Phase::Showdown | Phase::GameOver);
        let players = self
            .players()
            .map(|p| {
                let visible = viewer == Some(p.id())
                    || (show_revealed && self.revealed.iter().any(|id| id == p.id()));
                PlayerView {
                    id: p.id().to_string(),
                    username: p.username().to_string(),
                    seat: p.seat(),
                    chips: p.chips(),
                    current_bet: p.current_bet(),
                    total_bet: p.total_bet(),
                    hole_cards: (visible && !p.hole_cards().is_empty())
                        .then(|| p.hole_cards().to_vec()),
                    folded: p.is_folded(),
                    all_in: p.is_all_in(),
                    active: p.is_active(),
                    connected: p.is_connected(),
                    last_action: p.last_action().cloned(),
                }
            })
            .collect();

        let current_player = self.current_player_id().map(str::to_string);
        let dealt = self.hand_number > 0;
        GameSnapshot {
            game_id: self.id.clone(),
            name: self.name.clone(),
            phase: self.phase,
            hand_number: self.hand_number,
            pot: self.pot,
            side_pots: self.side_pots.clone(),
            community_cards: self.community.clone(),
            players,
            can_act: viewer.is_some() && current_player.as_deref() == viewer,
            current_player,
            dealer: dealt.then(|| self.seat_id(self.dealer_pos)).flatten().map(str::to_string),
            small_blind_player: dealt
                .then(|| self.seat_id(self.small_blind_pos))
                .flatten()
                .map(str::to_string),
            big_blind_player: dealt
                .then(|| self.seat_id(self.big_blind_pos))
                .flatten()
                .map(str::to_string),
            street_high: self.street_high,
            min_raise: self.min_raise,
            small_blind: self.config.small_blind,
            big_blind: self.config.big_blind,
            turn_timeout: self.config.turn_timeout,
            decision_timeout: self.config.decision_timeout,
            last_activity: self.last_activity,
        }
    }

    pub fn summary(&self) -> TableSummary {
        TableSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            player_count: self.seat_order.len(),
            max_players: self.config.max_players,
            small_blind: self.config.small_blind,
            big_blind: self.config.big_blind,
            buy_in: self.config.default_buy_in,
            phase: self.phase,
            created_at: self.created_at,
        }
    }

    fn apply_action(
        &mut self,
        player_id: &str,
        action: PlayerAction,
        forced: bool,
    ) -> Result<Option<HandSummary>, GameError> {
        match self.phase {
            Phase::GameOver => return Err(GameError::GameOver),
            Phase::WaitingForPlayers | Phase::Showdown => return Err(GameError::NoHandInProgress),
            _ => {}
        }
        if !self.players.contains_key(player_id) {
            return Err(GameError::PlayerNotInGame(player_id.to_string()));
        }
        let expected = self.current_player_id().unwrap_or_default().to_string();
        if expected != player_id {
            return Err(GameError::NotPlayersTurn {
                expected,
                actual: player_id.to_string(),
            });
        }

        let phase = self.phase;
        let street_high = self.street_high;
        let min_raise = self.min_raise;
        let Some(player) = self.players.get_mut(player_id) else {
            return Err(GameError::PlayerNotInGame(player_id.to_string()));
        };
        // a departing player may still be folded on their turn
        if !player.can_act() && !(forced && !player.is_folded() && !player.is_all_in()) {
            return Err(GameError::CannotAct(player_id.to_string()));
        }

        let validated = validate_action(
            player.chips(),
            player.current_bet(),
            street_high,
            min_raise,
            action,
        )?;
        let (kind, amount) = match validated {
            ValidatedAction::Fold => {
                player.fold();
                (ActionKind::Fold, 0)
            }
            ValidatedAction::Check => (ActionKind::Check, 0),
            ValidatedAction::Call(amount) => {
                player.bet(amount)?;
                (ActionKind::Call, amount)
            }
            ValidatedAction::Raise { wager, increment } => {
                player.bet(wager)?;
                self.street_high = player.current_bet();
                self.min_raise = increment;
                (ActionKind::Raise, wager)
            }
            ValidatedAction::AllIn(amount) => {
                player.bet(amount)?;
                if player.current_bet() > street_high {
                    let excess = player.current_bet() - street_high;
                    // a short all-in does not lower the bar for the next raise
                    if excess >= min_raise {
                        self.min_raise = excess;
                    }
                    self.street_high = player.current_bet();
                }
                (ActionKind::AllIn, amount)
            }
        };

        let record = ActionRecord {
            player_id: player_id.to_string(),
            phase,
            kind,
            amount,
            at: Utc::now(),
        };
        player.record_action(record.clone());
        self.pot += amount;
        self.actions.push(record);
        self.touch();

        tracing::debug!(
            game_id = %self.id,
            hand_number = self.hand_number,
            player_id = %player_id,
            phase = %phase,
            action = ?kind,
            amount,
            pot = self.pot,
            "action applied"
        );

        if let Some(next) = self.next_actor_from(self.current_player + 1) {
            self.current_player = next;
        }
        self.advance()
    }

    /// Runs streets forward until someone has to decide or the hand ends.
    fn advance(&mut self) -> Result<Option<HandSummary>, GameError> {
        loop {
            if self.live_players().count() <= 1 {
                return Ok(Some(self.settle(false)));
            }
            if !self.betting_round_complete() {
                return Ok(None);
            }
            if self.phase == Phase::River {
                return Ok(Some(self.settle(true)));
            }
            if let Err(err) = self.deal_next_street() {
                return Err(self.abort_hand(err));
            }
        }
    }

    fn betting_round_complete(&self) -> bool {
        let actors: Vec<&Player> = self.live_players().filter(|p| p.can_act()).collect();
        if actors
            .iter()
            .all(|p| p.has_acted() && p.current_bet() == self.street_high)
        {
            return true;
        }
        // nobody left to bet against
        actors.len() == 1 && actors[0].current_bet() >= self.street_high
    }

    fn deal_next_street(&mut self) -> Result<(), GameError> {
        let (next, count) = match self.phase {
            Phase::PreFlop => (Phase::Flop, 3),
            Phase::Flop => (Phase::Turn, 1),
            Phase::Turn => (Phase::River, 1),
            other => {
                return Err(GameError::InvalidAction(format!(
                    "no street follows {other}"
                )))
            }
        };
        for player in self.players.values_mut() {
            player.reset_street();
        }
        self.street_high = 0;
        self.min_raise = self.config.big_blind;

        self.deck.burn()?;
        let cards = self.deck.deal_multiple(count)?;
        self.community.extend(cards);
        self.phase = next;
        if let Some(first) = self.next_actor_from(self.dealer_pos + 1) {
            self.current_player = first;
        }

        tracing::debug!(
            game_id = %self.id,
            hand_number = self.hand_number,
            phase = %self.phase,
            board = ?self.community,
            "street dealt"
        );
        Ok(())
    }

    fn begin_hand(&mut self) -> Result<Option<HandSummary>, GameError> {
        match self.start_new_hand() {
            Ok(true) => self.advance(),
            Ok(false) => Ok(None),
            Err(err) => Err(self.abort_hand(err)),
        }
    }

    /// Returns `false` when too few players remain and the table is over.
    fn start_new_hand(&mut self) -> Result<bool, GameError> {
        let needed = self.config.min_players.max(2);
        if self.active_player_count() < needed {
            self.phase = Phase::GameOver;
            tracing::info!(
                game_id = %self.id,
                hand_number = self.hand_number,
                "not enough players, game over"
            );
            return Ok(false);
        }

        self.hand_number += 1;
        self.phase = Phase::PreFlop;
        self.pot = 0;
        self.side_pots.clear();
        self.community.clear();
        self.actions.clear();
        self.revealed.clear();
        self.street_high = self.config.big_blind;
        self.min_raise = self.config.big_blind;

        for player in self.players.values_mut() {
            player.reset_for_new_hand();
            if !player.is_active() {
                // sits this hand out
                player.fold();
            }
        }

        self.move_dealer_button();
        self.deck.reset();

        let n = self.seat_order.len();
        for _ in 0..2 {
            for i in 0..n {
                let idx = (self.dealer_pos + 1 + i) % n;
                let id = &self.seat_order[idx];
                if let Some(player) = self.players.get_mut(id) {
                    if player.is_active() {
                        let card = self.deck.deal()?;
                        player.give_card(card)?;
                    }
                }
            }
        }

        self.post_blind(self.small_blind_pos, self.config.small_blind, ActionKind::PostSmallBlind);
        self.post_blind(self.big_blind_pos, self.config.big_blind, ActionKind::PostBigBlind);

        self.current_player = self
            .next_actor_from(self.big_blind_pos + 1)
            .unwrap_or(self.big_blind_pos);
        self.touch();

        tracing::info!(
            game_id = %self.id,
            hand_number = self.hand_number,
            dealer = ?self.dealer_id(),
            players = self.live_players().count(),
            "hand started"
        );
        Ok(true)
    }

    fn move_dealer_button(&mut self) {
        let start = if self.hand_number == 1 { 0 } else { self.dealer_pos + 1 };
        self.dealer_pos = self.next_active_from(start);
        let active = self.players().filter(|p| p.is_active()).count();
        if active == 2 {
            // heads-up: the button posts the small blind
            self.small_blind_pos = self.dealer_pos;
        } else {
            self.small_blind_pos = self.next_active_from(self.dealer_pos + 1);
        }
        self.big_blind_pos = self.next_active_from(self.small_blind_pos + 1);
    }

    fn post_blind(&mut self, pos: usize, blind: u64, kind: ActionKind) {
        let Some(id) = self.seat_order.get(pos).cloned() else {
            return;
        };
        let Some(player) = self.players.get_mut(&id) else {
            return;
        };
        let amount = blind.min(player.chips());
        if player.bet(amount).is_err() {
            return;
        }
        self.pot += amount;
        self.actions.push(ActionRecord {
            player_id: id,
            phase: Phase::PreFlop,
            kind,
            amount,
            at: Utc::now(),
        });
    }

    /// Pays out the pot, unseats departed players and decides whether the
    /// table goes on.
    fn settle(&mut self, showdown: bool) -> HandSummary {
        self.phase = Phase::Showdown;
        let pot = self.pot;

        let contributions: Vec<Contribution> = self
            .players()
            .map(|p| Contribution {
                player_id: p.id().to_string(),
                amount: p.total_bet(),
                folded: p.is_folded(),
            })
            .collect();

        let mut showdown_hands: Vec<ShowdownHand> = Vec::new();
        let awards: Vec<PotAward> = if showdown {
            self.side_pots = build_side_pots(&contributions);
            let hands: HashMap<PlayerId, Hand> = self
                .live_players()
                .filter_map(|p| {
                    let cards = seven_cards(p.hole_cards(), &self.community)?;
                    Some((p.id().to_string(), best_hand(&cards)))
                })
                .collect();
            for p in self.live_players() {
                if let Some(hand) = hands.get(p.id()) {
                    showdown_hands.push(ShowdownHand {
                        player_id: p.id().to_string(),
                        hole_cards: p.hole_cards().to_vec(),
                        hand: hand.clone(),
                    });
                }
            }
            self.revealed = showdown_hands.iter().map(|s| s.player_id.clone()).collect();
            self.side_pots
                .iter()
                .map(|tier| award_tier(tier, &hands))
                .collect()
        } else {
            let winner = self
                .live_players()
                .next()
                .map(|p| p.id().to_string())
                .unwrap_or_default();
            vec![PotAward {
                amount: pot,
                eligible: vec![winner.clone()],
                winners: vec![winner],
                shares: vec![pot],
            }]
        };

        for award in &awards {
            for (winner, share) in award.winners.iter().zip(&award.shares) {
                if let Some(player) = self.players.get_mut(winner) {
                    player.award(*share);
                }
            }
        }
        self.pot = 0;

        let results: Vec<PlayerResult> = self
            .players()
            .filter(|p| !p.hole_cards().is_empty())
            .map(|p| PlayerResult {
                player_id: p.id().to_string(),
                starting_chips: p.hand_start_chips(),
                ending_chips: p.chips(),
                net: p.chips() as i64 - p.hand_start_chips() as i64,
            })
            .collect();

        let mut summary = HandSummary {
            hand_id: format_hand_id(&self.id, self.hand_number),
            game_id: self.id.clone(),
            game_name: self.name.clone(),
            hand_number: self.hand_number,
            seed: self.deck.seed(),
            dealer: self.dealer_id().map(str::to_string),
            board: self.community.clone(),
            pot,
            went_to_showdown: showdown,
            pots: awards,
            showdown: showdown_hands,
            results,
            removed_players: Vec::new(),
            cash_outs: Vec::new(),
            actions: self.actions.clone(),
            ended_at: Utc::now(),
        };

        summary.cash_outs = self.remove_departed_players();
        summary.removed_players = summary
            .cash_outs
            .iter()
            .map(|c| c.player_id.clone())
            .collect();

        if self.active_player_count() < self.config.min_players {
            self.phase = Phase::GameOver;
        }

        tracing::info!(
            game_id = %self.id,
            hand_number = self.hand_number,
            pot,
            showdown,
            winners = ?summary.winners(),
            phase = %self.phase,
            "hand settled"
        );
        self.last_summary = Some(summary.clone());
        summary
    }

    /// Voids the current hand: every contribution goes back to its owner.
    fn abort_hand(&mut self, err: GameError) -> GameError {
        tracing::error!(
            game_id = %self.id,
            hand_number = self.hand_number,
            error = %err,
            "aborting hand"
        );
        for player in self.players.values_mut() {
            player.refund_hand();
        }
        self.pot = 0;
        self.side_pots.clear();
        self.community.clear();
        self.phase = Phase::Showdown;
        err
    }

    /// Unseats disconnected players; busted ones leave nothing behind, the
    /// rest leave with their stacks.
    fn remove_departed_players(&mut self) -> Vec<CashOut> {
        let mut removed = Vec::new();
        for idx in (0..self.seat_order.len()).rev() {
            let stack = match self.players.get(&self.seat_order[idx]) {
                Some(p) if p.is_connected() => continue,
                Some(p) => p.chips(),
                None => 0,
            };
            removed.push(CashOut {
                player_id: self.unseat(idx),
                chips: stack,
            });
        }
        removed.reverse();
        removed
    }

    fn unseat(&mut self, idx: usize) -> PlayerId {
        let id = self.seat_order.remove(idx);
        self.players.remove(&id);
        let len = self.seat_order.len();
        self.dealer_pos = shift_after_removal(self.dealer_pos, idx, len);
        self.small_blind_pos = shift_after_removal(self.small_blind_pos, idx, len);
        self.big_blind_pos = shift_after_removal(self.big_blind_pos, idx, len);
        self.current_player = shift_after_removal(self.current_player, idx, len);
        id
    }

    fn live_players(&self) -> impl Iterator<Item = &Player> {
        self.players().filter(|p| !p.is_folded())
    }

    fn seat_id(&self, idx: usize) -> Option<&str> {
        self.seat_order.get(idx).map(String::as_str)
    }

    /// First seat at or after `start` (wrapping) whose player can act.
    fn next_actor_from(&self, start: usize) -> Option<usize> {
        let n = self.seat_order.len();
        (0..n)
            .map(|i| (start + i) % n)
            .find(|&idx| self.player_at(idx).is_some_and(Player::can_act))
    }

    fn next_active_from(&self, start: usize) -> usize {
        let n = self.seat_order.len().max(1);
        (0..n)
            .map(|i| (start + i) % n)
            .find(|&idx| self.player_at(idx).is_some_and(Player::is_active))
            .unwrap_or(start % n)
    }

    fn player_at(&self, idx: usize) -> Option<&Player> {
        self.seat_order.get(idx).and_then(|id| self.players.get(id))
    }

    fn touch(&mut self) {
        self.last_activity = Utc::now();
    }
}

/// Splits one tier among the best eligible hands; odd chips go to the
/// earliest winners in seat order.
fn award_tier(tier: &SidePot, hands: &HashMap<PlayerId, Hand>) -> PotAward {
    let best = tier
        .eligible
        .iter()
        .filter_map(|id| hands.get(id).map(|h| h.value))
        .max();
    let winners: Vec<PlayerId> = tier
        .eligible
        .iter()
        .filter(|id| best.is_some() && hands.get(*id).map(|h| h.value) == best)
        .cloned()
        .collect();
    let shares = split_pot(tier.amount, winners.len());
    PotAward {
        amount: tier.amount,
        eligible: tier.eligible.clone(),
        winners,
        shares,
    }
}

fn seven_cards(hole: &[Card], board: &[Card]) -> Option<[Card; 7]> {
    if hole.len() != 2 || board.len() != 5 {
        return None;
    }
    Some([
        hole[0], hole[1], board[0], board[1], board[2], board[3], board[4],
    ])
}

/// Keeps an index pointing at the same seat after `removed` is taken out;
/// an index on the removed seat moves back one so that advancing it lands on
/// the seat that followed.
fn shift_after_removal(pos: usize, removed: usize, len_after: usize) -> usize {
    if len_after == 0 {
        return 0;
    }
    if pos > removed {
        pos - 1
    } else if pos == removed {
        (pos + len_after - 1) % len_after
    } else {
        pos
    }
}
