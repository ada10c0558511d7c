use thiserror::Error;

use crate::player::PlayerId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeckError {
    #[error("Cannot deal from an empty deck")]
    EmptyDeck,
    #[error("Not enough cards in deck: have {remaining}, need {requested}")]
    InsufficientCards { requested: usize, remaining: usize },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Game is full ({max_players} seats)")]
    GameFull { max_players: usize },
    #[error("Player {0} is already in the game")]
    PlayerAlreadyInGame(PlayerId),
    #[error("Player {0} is not in the game")]
    PlayerNotInGame(PlayerId),
    #[error("It's not player {actual}'s turn (expected player {expected})")]
    NotPlayersTurn { expected: PlayerId, actual: PlayerId },
    #[error("Player {0} cannot act")]
    CannotAct(PlayerId),
    #[error("Invalid action: {0}")]
    InvalidAction(String),
    #[error("Insufficient chips: need {needed}, have {available}")]
    InsufficientChips { needed: u64, available: u64 },
    #[error("No hand in progress")]
    NoHandInProgress,
    #[error("Game is over")]
    GameOver,
    #[error("Invalid game configuration: {0}")]
    InvalidConfig(String),
    #[error("Hand aborted: {0}")]
    HandAborted(#[from] DeckError),
}
