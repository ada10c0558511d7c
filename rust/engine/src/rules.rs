use crate::errors::GameError;
use crate::player::PlayerAction as A;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidatedAction {
    Fold,
    Check,
    /// Chips to move in to match the street-high bet
    Call(u64),
    /// Chips to move in, and the increment over the street-high bet
    Raise { wager: u64, increment: u64 },
    /// Whole remaining stack
    AllIn(u64),
}

/// Validates a player action against the betting state of the street.
///
/// # Arguments
///
/// * `stack` - Player's remaining chips
/// * `current_bet` - What the player has already put in this street
/// * `street_high` - Highest total bet on this street
/// * `min_raise` - Minimum legal raise increment
/// * `action` - The action the player wishes to perform
///
/// # Errors
///
/// - [`GameError::InvalidAction`] - checking while facing a bet, or raising
///   by less than `min_raise`
/// - [`GameError::InsufficientChips`] - a raise that needs more than `stack`
///
/// # Examples
///
/// ```
/// use felt_engine::rules::{validate_action, ValidatedAction};
/// use felt_engine::player::PlayerAction;
///
/// // Short call turns into an all-in
/// let result = validate_action(80, 0, 100, 100, PlayerAction::Call);
/// assert_eq!(result, Ok(ValidatedAction::AllIn(80)));
///
/// // Raising by 200 over a 100 bet, having already posted 50
/// let result = validate_action(1_000, 50, 100, 100, PlayerAction::Raise(200));
/// assert_eq!(result, Ok(ValidatedAction::Raise { wager: 250, increment: 200 }));
/// ```
pub fn validate_action(
    stack: u64,
    current_bet: u64,
    street_high: u64,
    min_raise: u64,
    action: A,
) -> Result<ValidatedAction, GameError> {
    let to_call = street_high.saturating_sub(current_bet);
    match action {
        A::Fold => Ok(ValidatedAction::Fold),
        A::Check => {
            if to_call == 0 {
                Ok(ValidatedAction::Check)
            } else {
                Err(GameError::InvalidAction(format!(
                    "cannot check facing a bet of {to_call}"
                )))
            }
        }
        A::Call => {
            if to_call > stack {
                Ok(ValidatedAction::AllIn(stack))
            } else {
                Ok(ValidatedAction::Call(to_call))
            }
        }
        A::Raise(increment) => {
            if increment < min_raise {
                return Err(GameError::InvalidAction(format!(
                    "minimum raise is {min_raise}, got {increment}"
                )));
            }
            let wager = to_call + increment;
            if wager > stack {
                return Err(GameError::InsufficientChips {
                    needed: wager,
                    available: stack,
                });
            }
            Ok(ValidatedAction::Raise { wager, increment })
        }
        A::AllIn => Ok(ValidatedAction::AllIn(stack)),
    }
}
