//! # Game Session
//!
//! Owns every piece of a running stage and wires them together.
//!
//! The session is the only caller of the rule state machine. After each
//! accepted move it publishes the move's events, counts the turn (which
//! may end the game on the turn limit) and only then checks for the win,
//! so running out of turns on the clearing move is a loss.

use crate::game::{
    Direction, EventBus, GameEvent, LevelState, MoveOutcome, NullSpawner, Pawn, RulePhase,
    RuleState, SubscriptionId, TileSpawner,
};
use crate::{LevelDescriptor, RoliceError, RoliceResult};
use log::info;
use serde::{Deserialize, Serialize};

/// Summary of a won stage, handed to progress tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageResult {
    pub stage_number: u32,
    pub turn_count: u32,
    pub stars: u32,
}

/// A running stage.
pub struct GameSession {
    descriptor: LevelDescriptor,
    level: LevelState,
    rules: RuleState,
    pawn: Pawn,
    events: EventBus,
    spawner: Box<dyn TileSpawner>,
}

impl GameSession {
    /// Starts a headless session.
    pub fn new(descriptor: LevelDescriptor) -> RoliceResult<Self> {
        Self::with_spawner(descriptor, Box::new(NullSpawner::default()))
    }

    /// Starts a session that spawns tile visuals through `spawner`.
    pub fn with_spawner(
        descriptor: LevelDescriptor,
        mut spawner: Box<dyn TileSpawner>,
    ) -> RoliceResult<Self> {
        let (level, rules, pawn, start_events) = Self::start(&descriptor, spawner.as_mut())?;
        info!(
            "Session started: stage {} '{}'",
            descriptor.stage_info.stage_number,
            descriptor.stage_info.display_name()
        );
        let mut events = EventBus::new();
        events.publish_all(start_events);
        Ok(Self {
            descriptor,
            level,
            rules,
            pawn,
            events,
            spawner,
        })
    }

    fn start(
        descriptor: &LevelDescriptor,
        spawner: &mut dyn TileSpawner,
    ) -> RoliceResult<(LevelState, RuleState, Pawn, Vec<GameEvent>)> {
        let mut level = LevelState::new();
        level.try_load(descriptor, spawner)?;

        let mut rules = RuleState::new();
        rules.initialize(&descriptor.rules)?;

        let start = descriptor
            .resolve_start_position()
            .filter(|pos| {
                level
                    .get_runtime_tile(*pos)
                    .map(|tile| tile.can_enter())
                    .unwrap_or(false)
            })
            .ok_or_else(|| {
                RoliceError::InvalidLevel(format!(
                    "Level '{}' has no enterable start position",
                    descriptor.name
                ))
            })?;

        let mut pawn = Pawn::new(start, descriptor.initial_dice_faces());
        let mut events = pawn.enter_start_tile(&mut level);
        events.extend(rules.check_win_condition(&level));

        Ok((level, rules, pawn, events))
    }

    /// Rolls the pawn and applies the rules to the result.
    ///
    /// Rejected moves publish nothing.
    pub fn move_pawn(&mut self, direction: Direction) -> MoveOutcome {
        let mut outcome = self.pawn.try_move(direction, &mut self.level, &self.rules);

        if let MoveOutcome::Moved(report) = &mut outcome {
            let mut rule_events = self.rules.increment_turn();
            rule_events.extend(self.rules.check_win_condition(&self.level));

            report.events.extend(rule_events);
            self.events.publish_all(report.events.iter().copied());
        }
        outcome
    }

    /// Advances the time limit clock.
    pub fn tick(&mut self, delta_time: f32) -> Vec<GameEvent> {
        let events = self.rules.tick(delta_time);
        self.events.publish_all(events.iter().copied());
        events
    }

    /// Reloads the stage from its descriptor.
    ///
    /// Subscriptions survive the restart; the event history does not.
    pub fn restart(&mut self) -> RoliceResult<()> {
        let (level, rules, pawn, start_events) =
            Self::start(&self.descriptor, self.spawner.as_mut())?;
        self.level = level;
        self.rules = rules;
        self.pawn = pawn;
        self.events.drain();
        self.events.publish_all(start_events);
        info!("Stage {} restarted", self.descriptor.stage_info.stage_number);
        Ok(())
    }

    /// Result of the stage once it has been won.
    pub fn stage_result(&self) -> Option<StageResult> {
        if self.rules.phase() != RulePhase::Won {
            return None;
        }
        let turn_count = self.rules.current_turn();
        Some(StageResult {
            stage_number: self.descriptor.stage_info.stage_number,
            turn_count,
            stars: self.descriptor.calculate_stars(turn_count),
        })
    }

    pub fn subscribe(&mut self, callback: impl FnMut(&GameEvent) + 'static) -> SubscriptionId {
        self.events.subscribe(callback)
    }

    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.events
    }

    pub fn descriptor(&self) -> &LevelDescriptor {
        &self.descriptor
    }

    pub fn level(&self) -> &LevelState {
        &self.level
    }

    pub fn rules(&self) -> &RuleState {
        &self.rules
    }

    pub fn pawn(&self) -> &Pawn {
        &self.pawn
    }

    pub fn pawn_mut(&mut self) -> &mut Pawn {
        &mut self.pawn
    }

    pub fn phase(&self) -> RulePhase {
        self.rules.phase()
    }

    pub fn is_game_over(&self) -> bool {
        self.rules.is_game_over()
    }
}
