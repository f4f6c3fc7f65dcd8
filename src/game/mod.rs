//! # Game Module
//!
//! Runtime side of a puzzle session.
//!
//! This module contains the pieces that change while a stage is played:
//! - Grid coordinates, roll directions and the color palette
//! - The dice face algebra
//! - Runtime tiles and their enter/exit behaviors
//! - The runtime level state and its clear tracking
//! - The turn/time rule machine
//! - Pawn movement and the session that wires everything together

pub mod dice;
pub mod events;
pub mod pawn;
pub mod rules;
pub mod session;
pub mod state;
pub mod tiles;

pub use dice::*;
pub use events::*;
pub use pawn::*;
pub use rules::*;
pub use session::*;
pub use state::*;
pub use tiles::*;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents a 2D coordinate on the tile grid.
///
/// `y` grows in the [`Direction::Up`] direction.
///
/// # Examples
///
/// ```
/// use rolice::Position;
///
/// let pos = Position::new(2, 3);
/// assert_eq!(pos.x, 2);
/// assert_eq!(pos.y, 3);
///
/// let adjacent = pos.cardinal_adjacent_positions();
/// assert_eq!(adjacent.len(), 4);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    /// Creates a new position with the given coordinates.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns the origin position (0, 0).
    pub fn origin() -> Self {
        Self::new(0, 0)
    }

    /// Calculates the Manhattan distance to another position.
    ///
    /// # Examples
    ///
    /// ```
    /// use rolice::Position;
    ///
    /// let pos1 = Position::new(0, 0);
    /// let pos2 = Position::new(3, 4);
    /// assert_eq!(pos1.manhattan_distance(pos2), 7);
    /// ```
    pub fn manhattan_distance(self, other: Position) -> u32 {
        ((self.x - other.x).abs() + (self.y - other.y).abs()) as u32
    }

    /// Returns the 4 cardinal neighbours, in [`Direction::ALL`] order.
    pub fn cardinal_adjacent_positions(self) -> Vec<Position> {
        Direction::ALL.iter().map(|dir| self.step(*dir)).collect()
    }

    /// Returns the neighbouring position one step in `direction`.
    pub fn step(self, direction: Direction) -> Position {
        self + direction.to_delta()
    }
}

impl std::ops::Add for Position {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl std::ops::Sub for Position {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// The four directions the die can roll in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// All roll directions.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Converts a direction to a grid delta.
    ///
    /// # Examples
    ///
    /// ```
    /// use rolice::{Direction, Position};
    ///
    /// assert_eq!(Direction::Up.to_delta(), Position::new(0, 1));
    /// assert_eq!(Direction::Left.to_delta(), Position::new(-1, 0));
    /// ```
    pub fn to_delta(self) -> Position {
        match self {
            Direction::Up => Position::new(0, 1),
            Direction::Down => Position::new(0, -1),
            Direction::Left => Position::new(-1, 0),
            Direction::Right => Position::new(1, 0),
        }
    }

    /// Converts a grid delta to a direction.
    ///
    /// Returns None if the delta is not a unit cardinal step.
    pub fn from_delta(delta: Position) -> Option<Direction> {
        match (delta.x, delta.y) {
            (0, 1) => Some(Direction::Up),
            (0, -1) => Some(Direction::Down),
            (-1, 0) => Some(Direction::Left),
            (1, 0) => Some(Direction::Right),
            _ => None,
        }
    }

    /// Returns the direction that undoes this one.
    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

/// Colors that can appear on dice faces and color tiles.
///
/// `Gray` is the neutral default for unassigned faces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColorType {
    #[default]
    Gray,
    Red,
    Green,
    Blue,
    Yellow,
    Orange,
    Purple,
}

impl ColorType {
    /// Every color in the palette.
    pub const ALL: [ColorType; 7] = [
        ColorType::Gray,
        ColorType::Red,
        ColorType::Green,
        ColorType::Blue,
        ColorType::Yellow,
        ColorType::Orange,
        ColorType::Purple,
    ];

    /// Lowercase display name.
    pub fn name(self) -> &'static str {
        match self {
            ColorType::Gray => "gray",
            ColorType::Red => "red",
            ColorType::Green => "green",
            ColorType::Blue => "blue",
            ColorType::Yellow => "yellow",
            ColorType::Orange => "orange",
            ColorType::Purple => "purple",
        }
    }

    /// Looks a color up by name, ignoring case.
    pub fn from_name(name: &str) -> Option<ColorType> {
        let lowered = name.trim().to_lowercase();
        ColorType::ALL
            .iter()
            .copied()
            .find(|color| color.name() == lowered)
    }

    /// Single-letter code used by ASCII level maps (`None` for gray).
    pub fn map_symbol(self) -> Option<char> {
        match self {
            ColorType::Gray => None,
            ColorType::Red => Some('R'),
            ColorType::Green => Some('G'),
            ColorType::Blue => Some('B'),
            ColorType::Yellow => Some('Y'),
            ColorType::Orange => Some('O'),
            ColorType::Purple => Some('P'),
        }
    }

    /// Inverse of [`ColorType::map_symbol`].
    pub fn from_map_symbol(symbol: char) -> Option<ColorType> {
        ColorType::ALL
            .iter()
            .copied()
            .find(|color| color.map_symbol() == Some(symbol))
    }
}

impl fmt::Display for ColorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
