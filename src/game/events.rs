//! # Game Events
//!
//! Notifications published while a stage is played, and the small
//! synchronous bus that delivers them to the UI layer.

use crate::config;
use crate::game::{LoseReason, Position};
use log::trace;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Something observable that happened during play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A turn was spent; carries the new turn count
    TurnChanged(u32),
    GameWin,
    GameLose(LoseReason),
    /// The last color tile was cleared
    LevelCompleted,
    ColorTileCleared(Position),
    /// A move finished; carries where the pawn came to rest
    MoveCompleted(Position),
}

impl GameEvent {
    /// Whether this event ends the game.
    pub fn is_terminal(&self) -> bool {
        matches!(self, GameEvent::GameWin | GameEvent::GameLose(_))
    }
}

impl fmt::Display for GameEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameEvent::TurnChanged(turn) => write!(f, "Turn {}", turn),
            GameEvent::GameWin => write!(f, "Stage clear!"),
            GameEvent::GameLose(reason) => write!(f, "Game over: {}", reason),
            GameEvent::LevelCompleted => write!(f, "All color tiles cleared"),
            GameEvent::ColorTileCleared(pos) => write!(f, "Cleared color tile at {}", pos),
            GameEvent::MoveCompleted(pos) => write!(f, "Moved to {}", pos),
        }
    }
}

/// Identifies a subscription so it can be removed later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&GameEvent)>;

/// Synchronous publish/subscribe channel for [`GameEvent`]s.
///
/// Publishing with no subscribers is fine. Published events are also kept
/// in a history until drained; only the most recent `history_capacity`
/// events are retained.
pub struct EventBus {
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    history: Vec<GameEvent>,
    history_capacity: usize,
    next_id: u64,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::with_history_capacity(config::EVENT_HISTORY_CAPACITY)
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a bus that remembers at most `capacity` events.
    pub fn with_history_capacity(capacity: usize) -> Self {
        Self {
            subscribers: Vec::new(),
            history: Vec::new(),
            history_capacity: capacity,
            next_id: 0,
        }
    }

    pub fn history_capacity(&self) -> usize {
        self.history_capacity
    }

    /// Registers a callback for every future event.
    pub fn subscribe(&mut self, callback: impl FnMut(&GameEvent) + 'static) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Removes a subscription. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub_id, _)| *sub_id != id);
        self.subscribers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Delivers an event to every subscriber in subscription order.
    pub fn publish(&mut self, event: GameEvent) {
        trace!("Publishing {:?} to {} subscriber(s)", event, self.subscribers.len());
        for (_, callback) in self.subscribers.iter_mut() {
            callback(&event);
        }
        self.history.push(event);
        if self.history.len() > self.history_capacity {
            let overflow = self.history.len() - self.history_capacity;
            self.history.drain(..overflow);
        }
    }

    pub fn publish_all(&mut self, events: impl IntoIterator<Item = GameEvent>) {
        for event in events {
            self.publish(event);
        }
    }

    /// Most recent events published since the last drain, oldest first.
    pub fn history(&self) -> &[GameEvent] {
        &self.history
    }

    /// Takes the history, leaving it empty.
    pub fn drain(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.history)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.len())
            .field("history", &self.history)
            .finish()
    }
}
