//! # Pawn Movement
//!
//! The die on the board and the sequence of a single move.
//!
//! A move is a synchronous state transition. Animation is left to the
//! rendering layer, which receives [`PresentationCue`]s describing what to
//! show and may hold the pawn busy while it plays them.

use crate::game::{
    DiceFaces, Direction, GameEvent, LevelState, PawnView, Position, RuleState, TileBehavior,
};
use crate::ColorType;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether the pawn can accept a move.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MovePhase {
    #[default]
    Idle,
    Moving,
}

/// Why a move was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveRejection {
    /// Another move is still in progress
    Busy,
    GameOver,
    NotLoaded,
    /// No tile at the target
    NoTile(Position),
    /// The target tile cannot be entered
    Blocked(Position),
    /// The target tile's behavior refused the pawn
    BehaviorRefused(Position),
}

impl fmt::Display for MoveRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveRejection::Busy => write!(f, "pawn is already moving"),
            MoveRejection::GameOver => write!(f, "game is over"),
            MoveRejection::NotLoaded => write!(f, "no level loaded"),
            MoveRejection::NoTile(pos) => write!(f, "no tile at {}", pos),
            MoveRejection::Blocked(pos) => write!(f, "tile at {} is blocked", pos),
            MoveRejection::BehaviorRefused(pos) => write!(f, "tile at {} refused entry", pos),
        }
    }
}

/// Instruction for the rendering layer; carries no game logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PresentationCue {
    Roll {
        from: Position,
        to: Position,
        direction: Direction,
    },
    Teleport {
        from: Position,
        to: Position,
    },
}

/// Everything that happened during an accepted move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveReport {
    pub from: Position,
    /// Final resting position, after any teleport
    pub to: Position,
    pub direction: Direction,
    pub events: Vec<GameEvent>,
    pub cues: Vec<PresentationCue>,
    pub teleported_to: Option<Position>,
}

/// Result of [`Pawn::try_move`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved(MoveReport),
    Rejected(MoveRejection),
}

impl MoveOutcome {
    pub fn is_moved(&self) -> bool {
        matches!(self, MoveOutcome::Moved(_))
    }

    pub fn report(&self) -> Option<&MoveReport> {
        match self {
            MoveOutcome::Moved(report) => Some(report),
            MoveOutcome::Rejected(_) => None,
        }
    }
}

/// The rolling die.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pawn {
    grid_pos: Position,
    faces: DiceFaces,
    phase: MovePhase,
}

impl Pawn {
    /// Places a die at `position` with the given faces.
    pub fn new(position: Position, faces: DiceFaces) -> Self {
        Self {
            grid_pos: position,
            faces,
            phase: MovePhase::Idle,
        }
    }

    pub fn position(&self) -> Position {
        self.grid_pos
    }

    pub fn faces(&self) -> &DiceFaces {
        &self.faces
    }

    pub fn bottom_color(&self) -> ColorType {
        self.faces.bottom_color()
    }

    pub fn phase(&self) -> MovePhase {
        self.phase
    }

    pub fn is_moving(&self) -> bool {
        self.phase == MovePhase::Moving
    }

    /// What tile behaviors get to see.
    pub fn view(&self) -> PawnView {
        PawnView {
            position: self.grid_pos,
            bottom_color: self.faces.bottom_color(),
        }
    }

    /// Holds the pawn busy while the rendering layer plays a cue.
    pub fn begin_animation(&mut self) {
        self.phase = MovePhase::Moving;
    }

    /// Releases the pawn after an animation.
    pub fn finish_animation(&mut self) {
        self.phase = MovePhase::Idle;
    }

    /// Rolls one cell in `direction`.
    ///
    /// The target must hold an enterable tile whose behavior accepts the
    /// pawn. Rejected moves leave the pawn untouched.
    pub fn try_move(
        &mut self,
        direction: Direction,
        level: &mut LevelState,
        rules: &RuleState,
    ) -> MoveOutcome {
        let from = self.grid_pos;
        let target = from.step(direction);

        if let Err(rejection) = self.validate_move(target, level, rules) {
            debug!("Move {:?} from {} rejected: {}", direction, from, rejection);
            return MoveOutcome::Rejected(rejection);
        }

        self.phase = MovePhase::Moving;
        let mut events = level.exit_tile(from, self.view()).events;

        self.grid_pos = target;
        self.faces = self.faces.rotate(direction);
        let mut cues = vec![PresentationCue::Roll {
            from,
            to: target,
            direction,
        }];
        self.phase = MovePhase::Idle;

        let entered = level.enter_tile(target, self.view());
        events.extend(entered.events);

        let mut teleported_to = None;
        if let Some(destination) = entered.teleport_to {
            if self.teleport(destination, level) {
                cues.push(PresentationCue::Teleport {
                    from: target,
                    to: destination,
                });
                teleported_to = Some(destination);
            }
        }

        events.push(GameEvent::MoveCompleted(self.grid_pos));
        MoveOutcome::Moved(MoveReport {
            from,
            to: self.grid_pos,
            direction,
            events,
            cues,
            teleported_to,
        })
    }

    /// Fires enter logic for the tile the pawn was placed on.
    ///
    /// Called once when a stage starts. A teleport tile under the pawn sends
    /// it on to its partner, whose enter logic does not fire.
    pub fn enter_start_tile(&mut self, level: &mut LevelState) -> Vec<GameEvent> {
        let start = self.grid_pos;
        let entered = level.enter_tile(start, self.view());
        let mut events = entered.events;

        if let Some(destination) = entered.teleport_to {
            if self.teleport(destination, level) {
                events.push(GameEvent::MoveCompleted(destination));
            }
        }
        events
    }

    fn validate_move(
        &self,
        target: Position,
        level: &LevelState,
        rules: &RuleState,
    ) -> Result<(), MoveRejection> {
        if self.is_moving() {
            return Err(MoveRejection::Busy);
        }
        if rules.is_game_over() {
            return Err(MoveRejection::GameOver);
        }
        if !level.is_loaded() {
            return Err(MoveRejection::NotLoaded);
        }

        let tile = level
            .get_runtime_tile(target)
            .filter(|tile| !tile.descriptor.is_empty())
            .ok_or(MoveRejection::NoTile(target))?;
        if !tile.can_enter() {
            return Err(MoveRejection::Blocked(target));
        }
        if !tile.behavior.can_enter(&self.view()) {
            return Err(MoveRejection::BehaviorRefused(target));
        }
        Ok(())
    }

    /// Relocates the pawn without rolling.
    ///
    /// Only checks that a tile exists at `target`. Faces stay as they are
    /// and the destination's enter logic does not fire.
    pub fn teleport(&mut self, target: Position, level: &LevelState) -> bool {
        if !level.has_tile(target) {
            warn!("Teleport destination {} has no tile", target);
            return false;
        }
        debug!("Pawn teleported from {} to {}", self.grid_pos, target);
        self.grid_pos = target;
        true
    }
}
