//! # Rolice
//!
//! Rules engine for a dice-rolling, color-matching grid puzzle.
//!
//! ## Architecture Overview
//!
//! A six-faced die with colored faces rolls across a tile grid. Every roll
//! permutes the faces; landing on a color tile with a matching bottom face
//! clears it, paired teleport tiles relocate the die, and optional turn and
//! time limits decide whether the stage is lost before all color tiles clear.
//!
//! - **Level**: authored, serializable level data (grid, rules, stage info)
//!   plus validation and stage bookkeeping
//! - **Game**: the live session: runtime tiles and their behaviors, the dice
//!   face algebra, the turn/time rule machine and the pawn movement sequence
//! - **Progress**: per-stage clear records with pluggable persistence
//! - **Input**: text command parsing for scripted or interactive play
//! - **Rendering**: plain-text board and status lines for the terminal
//!
//! Graphical rendering, animation, audio and UI live outside this crate. The session
//! exposes [`GameEvent`]s and [`PresentationCue`]s for those layers to consume.

pub mod game;
pub mod input;
pub mod level;
pub mod progress;
pub mod rendering;

// Core module re-exports
pub use game::*;
pub use input::*;
pub use level::*;
pub use progress::*;
pub use rendering::*;

/// Core error type for the Rolice rules engine.
#[derive(thiserror::Error, Debug)]
pub enum RoliceError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Level data cannot be played
    #[error("Invalid level: {0}")]
    InvalidLevel(String),

    /// Level rules are out of range
    #[error("Invalid rules: {0}")]
    InvalidRules(String),

    /// The tile spawner refused to instantiate a tile
    #[error("Failed to spawn tile '{tile_kind}' at {position}")]
    TileSpawn {
        tile_kind: String,
        position: Position,
    },

    /// A movement vector that is not one of the four grid directions
    #[error("Invalid direction vector ({dx}, {dy})")]
    InvalidDirection { dx: i32, dy: i32 },

    /// Unrecognized player input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Game state is invalid
    #[error("Invalid game state: {0}")]
    InvalidState(String),
}

/// Result type used throughout the Rolice codebase.
pub type RoliceResult<T> = Result<T, RoliceError>;

/// Version information for the crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Game configuration constants.
pub mod config {
    /// Turn limit applied when a level does not specify its own rules
    pub const DEFAULT_MAX_TURNS: i32 = 10;

    /// Time limit in seconds applied when a level enables one without a value
    pub const DEFAULT_MAX_TIME: f32 = 60.0;

    /// Highest star rating a stage can award
    pub const MAX_STARS: u32 = 3;

    /// Default turn thresholds for 3, 2 and 1 stars
    pub const DEFAULT_STAR_THRESHOLDS: [u32; 3] = [10, 15, 20];

    /// Threshold step used when star thresholds are regenerated
    pub const STAR_THRESHOLD_BASE: u32 = 10;
    pub const STAR_THRESHOLD_STEP: u32 = 5;

    /// File name used by the JSON progress store
    pub const PROGRESS_FILE_NAME: &str = "player_progress.json";

    /// Events an [`crate::EventBus`] remembers before dropping the oldest
    pub const EVENT_HISTORY_CAPACITY: usize = 256;

    /// Schema version written into player progress records
    pub const PROGRESS_DATA_VERSION: u32 = 1;
}
