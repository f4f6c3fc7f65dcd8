//! # Command Execution
//!
//! Applies player inputs to a running session.

use crate::game::{GameSession, MoveOutcome};
use crate::input::PlayerInput;
use crate::RoliceResult;

/// Help text shown for [`PlayerInput::Help`].
pub const HELP_TEXT: &str = "\
Roll the die onto every color tile while its bottom face shows that color.

  U D L R / w s a d / k j h l   roll up, down, left, right
  .                             wait
  r                             restart the stage
  q                             quit
  ?                             show this help";

/// What executing an input did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    Moved(MoveOutcome),
    Waited,
    Restarted,
    Help,
    Quit,
}

/// Applies one input to the session.
pub fn execute_input(session: &mut GameSession, input: PlayerInput) -> RoliceResult<CommandOutcome> {
    let outcome = match input {
        PlayerInput::Move(direction) => CommandOutcome::Moved(session.move_pawn(direction)),
        PlayerInput::Wait => CommandOutcome::Waited,
        PlayerInput::Restart => {
            session.restart()?;
            CommandOutcome::Restarted
        }
        PlayerInput::Help => CommandOutcome::Help,
        PlayerInput::Quit => CommandOutcome::Quit,
    };
    Ok(outcome)
}
