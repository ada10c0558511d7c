//! # felt-engine: No-Limit Hold'em Table Engine
//!
//! The rules core of a multi-table Texas Hold'em server. A [`game::Game`]
//! seats up to ten players (configurable), deals from a seeded deck, runs the
//! four betting streets, splits the pot into side pots at showdown and hands
//! back a [`history::HandSummary`] for every settled hand.
//!
//! The crate is synchronous and does no I/O: callers own the locking, the
//! clocks and the delivery of snapshots.
//!
//! ## Core Modules
//!
//! - [`cards`] - Card representation (Suit, Rank, Card) and deck construction
//! - [`deck`] - Seeded deck shuffling with ChaCha20 RNG
//! - [`game`] - Table state machine: seating, betting, streets, settlement
//! - [`hand`] - Five-card evaluation and best-of-seven selection
//! - [`player`] - Player state, actions, and stack management
//! - [`pot`] - Side pot tiers and chip splitting
//! - [`rules`] - Betting validation
//! - [`history`] - Action log and HandSummary serialization
//! - [`snapshot`] - Viewer-scoped table views and listings
//! - [`config`] - Table configuration and overrides
//! - [`errors`] - Error types for game operations
//!
//! ## Quick Start
//!
//! ```rust
//! use felt_engine::cards::{Card, Rank, Suit};
//! use felt_engine::hand::{best_hand, Category};
//!
//! let cards = [
//!     Card::new(Rank::Ace, Suit::Hearts),
//!     Card::new(Rank::King, Suit::Hearts),
//!     Card::new(Rank::Queen, Suit::Hearts),
//!     Card::new(Rank::Jack, Suit::Hearts),
//!     Card::new(Rank::Ten, Suit::Hearts),
//!     Card::new(Rank::Two, Suit::Clubs),
//!     Card::new(Rank::Three, Suit::Diamonds),
//! ];
//!
//! let hand = best_hand(&cards);
//! assert_eq!(hand.category, Category::RoyalFlush);
//! ```
//!
//! ## Running a Table
//!
//! ```rust
//! use felt_engine::config::GameConfig;
//! use felt_engine::game::{Game, Phase};
//! use felt_engine::player::{Player, PlayerAction};
//!
//! let config = GameConfig { seed: Some(42), ..GameConfig::default() };
//! let mut game = Game::new("t1", "Main", config).unwrap();
//! game.add_player(Player::new("alice", "Alice", 10_000, 0)).unwrap();
//! game.add_player(Player::new("bob", "Bob", 10_000, 1)).unwrap();
//!
//! // Heads-up: the button posts the small blind and acts first pre-flop
//! assert_eq!(game.phase(), Phase::PreFlop);
//! let first = game.current_player_id().unwrap().to_string();
//! game.process_action(&first, PlayerAction::Call).unwrap();
//! let second = game.current_player_id().unwrap().to_string();
//! game.process_action(&second, PlayerAction::Check).unwrap();
//! assert_eq!(game.phase(), Phase::Flop);
//! assert_eq!(game.pot(), 200);
//! ```
//!
//! ## Deterministic Gameplay
//!
//! ```rust
//! use felt_engine::deck::Deck;
//!
//! let mut deck1 = Deck::new_with_seed(42);
//! let mut deck2 = Deck::new_with_seed(42);
//! deck1.shuffle();
//! deck2.shuffle();
//! assert_eq!(deck1.deal(), deck2.deal());
//! ```

pub mod cards;
pub mod config;
pub mod deck;
pub mod errors;
pub mod game;
pub mod hand;
pub mod history;
pub mod player;
pub mod pot;
pub mod rules;
pub mod snapshot;
