//! # Rule State Machine
//!
//! Turn and time bookkeeping against a level's limits.
//!
//! ```text
//! Uninitialized --initialize--> Playing --+--> Won
//!                                         +--> Lost
//! ```
//!
//! `Won` and `Lost` are terminal until the next `initialize` or `reset`.

use crate::game::{GameEvent, LevelState};
use crate::{LevelRules, RoliceResult};
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Phase of the rule state machine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RulePhase {
    #[default]
    Uninitialized,
    Playing,
    Won,
    Lost,
}

/// Which limit ended the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoseReason {
    TurnLimit,
    TimeLimit,
}

impl fmt::Display for LoseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoseReason::TurnLimit => write!(f, "out of turns"),
            LoseReason::TimeLimit => write!(f, "out of time"),
        }
    }
}

/// Turn counter, clock and win/lose state for one play session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleState {
    rules: LevelRules,
    current_turn: u32,
    elapsed_time: f32,
    phase: RulePhase,
}

impl RuleState {
    /// Creates an uninitialized rule state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a session under `rules`.
    ///
    /// Invalid rules leave the machine uninitialized.
    pub fn initialize(&mut self, rules: &LevelRules) -> RoliceResult<()> {
        self.current_turn = 0;
        self.elapsed_time = 0.0;

        if let Err(err) = rules.validate() {
            error!("Rule initialization failed: {}", err);
            self.phase = RulePhase::Uninitialized;
            return Err(err);
        }

        self.rules = *rules;
        self.phase = RulePhase::Playing;
        debug!("Rules initialized: {:?}", self.rules);
        Ok(())
    }

    /// Restarts the counters under the current rules.
    pub fn reset(&mut self) {
        if self.phase == RulePhase::Uninitialized {
            warn!("Cannot reset rules that were never initialized");
            return;
        }
        self.current_turn = 0;
        self.elapsed_time = 0.0;
        self.phase = RulePhase::Playing;
    }

    /// Advances the clock by `delta_time` seconds.
    ///
    /// Only runs while playing with a time limit.
    pub fn tick(&mut self, delta_time: f32) -> Vec<GameEvent> {
        if self.phase != RulePhase::Playing || !self.rules.has_time_limit {
            return Vec::new();
        }
        if delta_time.is_finite() && delta_time > 0.0 {
            self.elapsed_time += delta_time;
        }
        self.check_lose_condition().into_iter().collect()
    }

    /// Counts one finished move.
    pub fn increment_turn(&mut self) -> Vec<GameEvent> {
        match self.phase {
            RulePhase::Uninitialized => {
                warn!("Turn increment before rules were initialized");
                return Vec::new();
            }
            RulePhase::Won | RulePhase::Lost => {
                debug!("Ignoring turn increment after game over");
                return Vec::new();
            }
            RulePhase::Playing => {}
        }

        self.current_turn += 1;
        let mut events = vec![GameEvent::TurnChanged(self.current_turn)];
        events.extend(self.check_lose_condition());
        events
    }

    fn check_lose_condition(&mut self) -> Option<GameEvent> {
        if self.phase != RulePhase::Playing {
            return None;
        }

        let reason = if self.rules.has_turn_limit
            && i64::from(self.current_turn) >= i64::from(self.rules.max_turns)
        {
            LoseReason::TurnLimit
        } else if self.rules.has_time_limit && self.elapsed_time >= self.rules.max_time {
            LoseReason::TimeLimit
        } else {
            return None;
        };

        self.phase = RulePhase::Lost;
        info!("Game lost: {}", reason);
        Some(GameEvent::GameLose(reason))
    }

    /// Declares the win once the level reports every color tile cleared.
    pub fn check_win_condition(&mut self, level: &LevelState) -> Vec<GameEvent> {
        if self.phase != RulePhase::Playing || !level.check_level_complete() {
            return Vec::new();
        }

        self.phase = RulePhase::Won;
        info!("Game won in {} turns", self.current_turn);
        vec![GameEvent::GameWin]
    }

    pub fn phase(&self) -> RulePhase {
        self.phase
    }

    pub fn rules(&self) -> &LevelRules {
        &self.rules
    }

    pub fn current_turn(&self) -> u32 {
        self.current_turn
    }

    pub fn elapsed_time(&self) -> f32 {
        self.elapsed_time
    }

    pub fn is_initialized(&self) -> bool {
        self.phase != RulePhase::Uninitialized
    }

    pub fn is_game_over(&self) -> bool {
        matches!(self.phase, RulePhase::Won | RulePhase::Lost)
    }

    /// Turns left, or None without a turn limit.
    pub fn remaining_turns(&self) -> Option<u32> {
        self.rules.has_turn_limit.then(|| {
            let left = i64::from(self.rules.max_turns) - i64::from(self.current_turn);
            left.max(0) as u32
        })
    }

    /// Seconds left, or None without a time limit.
    pub fn remaining_time(&self) -> Option<f32> {
        self.rules
            .has_time_limit
            .then(|| (self.rules.max_time - self.elapsed_time).max(0.0))
    }

    /// Fraction of the turn limit used, in `0.0..=1.0`.
    pub fn turn_progress(&self) -> f32 {
        if !self.rules.has_turn_limit || self.rules.max_turns <= 0 {
            return 0.0;
        }
        (self.current_turn as f32 / self.rules.max_turns as f32).clamp(0.0, 1.0)
    }

    /// Fraction of the time limit used, in `0.0..=1.0`.
    pub fn time_progress(&self) -> f32 {
        if !self.rules.has_time_limit || !(self.rules.max_time > 0.0) {
            return 0.0;
        }
        (self.elapsed_time / self.rules.max_time).clamp(0.0, 1.0)
    }
}
