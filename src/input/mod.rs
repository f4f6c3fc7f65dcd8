//! # Input Module
//!
//! Text input handling and command parsing for player interactions.

pub mod commands;

pub use commands::*;

use crate::game::Direction;
use crate::{RoliceError, RoliceResult};

/// Input handler for turning key presses into player inputs.
///
/// Keys are case-sensitive so that the direction names `U`, `D`, `L` and
/// `R` never collide with the lowercase command keys.
///
/// | Keys | Input |
/// |------|-------|
/// | `U` `D` `L` `R` | roll up, down, left, right |
/// | `w` `s` `a` `d` | roll up, down, left, right |
/// | `k` `j` `h` `l` | roll up, down, left, right (vi keys) |
/// | `.` | wait |
/// | `r` | restart |
/// | `q` | quit |
/// | `?` | help |
#[derive(Debug, Clone)]
pub struct InputHandler {
    /// Whether to enable Vi-style movement keys (hjkl)
    pub vi_keys_enabled: bool,
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl InputHandler {
    /// Creates a new input handler.
    ///
    /// # Examples
    ///
    /// ```
    /// use rolice::{Direction, InputHandler, PlayerInput};
    ///
    /// let input_handler = InputHandler::new();
    /// assert_eq!(input_handler.parse_key('w'), Some(PlayerInput::Move(Direction::Up)));
    /// ```
    pub fn new() -> Self {
        Self {
            vi_keys_enabled: true,
        }
    }

    /// Maps a single key to a player input.
    pub fn parse_key(&self, key: char) -> Option<PlayerInput> {
        let input = match key {
            // Direction names
            'U' => PlayerInput::Move(Direction::Up),
            'D' => PlayerInput::Move(Direction::Down),
            'L' => PlayerInput::Move(Direction::Left),
            'R' => PlayerInput::Move(Direction::Right),

            // WASD
            'w' => PlayerInput::Move(Direction::Up),
            's' => PlayerInput::Move(Direction::Down),
            'a' => PlayerInput::Move(Direction::Left),
            'd' => PlayerInput::Move(Direction::Right),

            // Vi style
            'k' if self.vi_keys_enabled => PlayerInput::Move(Direction::Up),
            'j' if self.vi_keys_enabled => PlayerInput::Move(Direction::Down),
            'h' if self.vi_keys_enabled => PlayerInput::Move(Direction::Left),
            'l' if self.vi_keys_enabled => PlayerInput::Move(Direction::Right),

            '.' => PlayerInput::Wait,
            'r' => PlayerInput::Restart,
            'q' => PlayerInput::Quit,
            '?' => PlayerInput::Help,
            _ => return None,
        };
        Some(input)
    }

    /// Parses a move script such as `"RU"` or `"d, w"`.
    ///
    /// Whitespace and commas are separators. Any other unknown key fails
    /// the whole script.
    pub fn parse_script(&self, script: &str) -> RoliceResult<Vec<PlayerInput>> {
        script
            .chars()
            .enumerate()
            .filter(|(_, key)| !key.is_whitespace() && *key != ',')
            .map(|(index, key)| {
                self.parse_key(key).ok_or_else(|| {
                    RoliceError::InvalidInput(format!(
                        "Unknown key '{}' at offset {}",
                        key, index
                    ))
                })
            })
            .collect()
    }

    /// Parses one line typed at the prompt.
    ///
    /// Full words (`up`, `restart`, `quit`, `help`) are accepted as well as
    /// key scripts.
    pub fn parse_line(&self, line: &str) -> RoliceResult<Vec<PlayerInput>> {
        let word = line.trim().to_lowercase();
        let input = match word.as_str() {
            "up" => PlayerInput::Move(Direction::Up),
            "down" => PlayerInput::Move(Direction::Down),
            "left" => PlayerInput::Move(Direction::Left),
            "right" => PlayerInput::Move(Direction::Right),
            "wait" => PlayerInput::Wait,
            "restart" => PlayerInput::Restart,
            "quit" | "exit" => PlayerInput::Quit,
            "help" => PlayerInput::Help,
            _ => return self.parse_script(line),
        };
        Ok(vec![input])
    }
}

/// Player input types that can be processed by the input handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerInput {
    /// Roll the die one cell
    Move(Direction),
    /// Do nothing
    Wait,
    /// Reload the current stage
    Restart,
    /// Quit the game
    Quit,
    /// Show help information
    Help,
}
