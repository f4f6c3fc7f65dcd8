//! # Level Module
//!
//! Authored level data: the tile grid, per-level rules and stage metadata.
//!
//! Levels are plain serializable data. They are read once when a session
//! starts and are never mutated by play. Structural edits (resizing, tile
//! painting) keep the tile list consistent with the grid dimensions.

pub mod stage;
pub mod validation;

pub use stage::*;
pub use validation::*;

use crate::game::{ColorType, DiceFaces, Position};
use crate::{config, RoliceError, RoliceResult};
use log::warn;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Optional behavior attached to a tile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum BehaviorDescriptor {
    /// Plain floor
    #[default]
    None,
    /// Cleared when the die lands on it with a matching bottom face
    ColorMatch,
    /// Relocates the die to the other tile with the same pair ID
    Teleport { pair_id: String },
}

impl BehaviorDescriptor {
    /// Whether tiles with this behavior must be cleared to finish the level.
    pub fn requires_clear_tracking(&self) -> bool {
        matches!(self, BehaviorDescriptor::ColorMatch)
    }
}

fn default_can_enter() -> bool {
    true
}

/// One authored grid cell.
///
/// An empty `tile_kind` means there is no tile at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileDescriptor {
    /// Tile kind identifier used to spawn the visual
    #[serde(default)]
    pub tile_kind: String,
    /// Whether the die may roll onto this tile
    #[serde(default = "default_can_enter")]
    pub can_enter: bool,
    /// Color for color-match tiles
    #[serde(default)]
    pub color: Option<ColorType>,
    /// Special behavior
    #[serde(default)]
    pub behavior: BehaviorDescriptor,
}

impl Default for TileDescriptor {
    fn default() -> Self {
        Self::empty()
    }
}

impl TileDescriptor {
    /// A cell without a tile.
    pub fn empty() -> Self {
        Self {
            tile_kind: String::new(),
            can_enter: true,
            color: None,
            behavior: BehaviorDescriptor::None,
        }
    }

    /// Plain enterable floor.
    pub fn floor() -> Self {
        Self {
            tile_kind: "floor".to_string(),
            ..Self::empty()
        }
    }

    /// A tile the die can never enter.
    pub fn wall() -> Self {
        Self {
            tile_kind: "wall".to_string(),
            can_enter: false,
            ..Self::empty()
        }
    }

    /// A color-match tile of the given color.
    pub fn color_match(color: ColorType) -> Self {
        Self {
            tile_kind: "color".to_string(),
            color: Some(color),
            behavior: BehaviorDescriptor::ColorMatch,
            ..Self::empty()
        }
    }

    /// One end of a teleport pair.
    pub fn teleport(pair_id: impl Into<String>) -> Self {
        Self {
            tile_kind: "teleport".to_string(),
            behavior: BehaviorDescriptor::Teleport {
                pair_id: pair_id.into(),
            },
            ..Self::empty()
        }
    }

    /// Replaces the enter flag.
    pub fn with_can_enter(mut self, can_enter: bool) -> Self {
        self.can_enter = can_enter;
        self
    }

    /// Whether this cell holds no tile.
    pub fn is_empty(&self) -> bool {
        self.tile_kind.is_empty()
    }

    /// Whether this tile counts toward level completion.
    pub fn requires_clear_tracking(&self) -> bool {
        !self.is_empty() && self.behavior.requires_clear_tracking()
    }
}

/// Turn and time limits for a level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelRules {
    /// Whether the turn limit applies
    pub has_turn_limit: bool,
    /// Turns allowed; must be positive when the limit applies
    pub max_turns: i32,
    /// Whether the time limit applies
    pub has_time_limit: bool,
    /// Seconds allowed; must be positive when the limit applies
    pub max_time: f32,
}

impl Default for LevelRules {
    fn default() -> Self {
        Self {
            has_turn_limit: true,
            max_turns: config::DEFAULT_MAX_TURNS,
            has_time_limit: false,
            max_time: config::DEFAULT_MAX_TIME,
        }
    }
}

impl LevelRules {
    /// Rules with neither limit.
    pub fn unlimited() -> Self {
        Self {
            has_turn_limit: false,
            has_time_limit: false,
            ..Self::default()
        }
    }

    /// Rules with only a turn limit.
    pub fn turn_limit(max_turns: i32) -> Self {
        Self {
            has_turn_limit: true,
            max_turns,
            has_time_limit: false,
            ..Self::default()
        }
    }

    /// Rules with only a time limit.
    pub fn time_limit(max_time: f32) -> Self {
        Self {
            has_turn_limit: false,
            has_time_limit: true,
            max_time,
            ..Self::default()
        }
    }

    /// Checks that every enabled limit is positive.
    ///
    /// # Examples
    ///
    /// ```
    /// use rolice::LevelRules;
    ///
    /// assert!(LevelRules::turn_limit(5).validate().is_ok());
    /// assert!(LevelRules::turn_limit(0).validate().is_err());
    /// ```
    pub fn validate(&self) -> RoliceResult<()> {
        if self.has_turn_limit && self.max_turns <= 0 {
            return Err(RoliceError::InvalidRules(format!(
                "max_turns must be greater than 0 (got {})",
                self.max_turns
            )));
        }

        if self.has_time_limit && !(self.max_time > 0.0) {
            return Err(RoliceError::InvalidRules(format!(
                "max_time must be greater than 0 (got {})",
                self.max_time
            )));
        }

        Ok(())
    }
}

/// The authored description of one puzzle.
///
/// Tiles are stored row-major: the cell at `(x, y)` lives at
/// `tiles[y * width + x]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelDescriptor {
    /// Asset name, used for logging
    #[serde(default)]
    pub name: String,
    /// Stage metadata
    #[serde(default)]
    pub stage_info: StageInfo,
    /// Grid width in tiles
    pub width: i32,
    /// Grid height in tiles
    pub height: i32,
    /// Row-major cells, `width * height` long
    #[serde(default)]
    pub tiles: Vec<TileDescriptor>,
    /// Turn and time limits
    #[serde(default)]
    pub rules: LevelRules,
    /// Where the die starts; defaults to the first enterable tile
    #[serde(default)]
    pub start_position: Option<Position>,
    /// Initial face colors; defaults to [`DiceFaces::standard`]
    #[serde(default)]
    pub dice_faces: Option<DiceFaces>,
}

impl LevelDescriptor {
    /// Creates a level of the given size filled with empty cells.
    ///
    /// # Examples
    ///
    /// ```
    /// use rolice::LevelDescriptor;
    ///
    /// let level = LevelDescriptor::new(4, 3);
    /// assert_eq!(level.tiles.len(), 12);
    /// assert!(level.get_tile(3, 2).unwrap().is_empty());
    /// assert!(level.get_tile(4, 0).is_none());
    /// ```
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            name: String::new(),
            stage_info: StageInfo::default(),
            width,
            height,
            tiles: vec![TileDescriptor::empty(); cell_count(width, height)],
            rules: LevelRules::default(),
            start_position: None,
            dice_faces: None,
        }
    }

    /// Builds a level from an ASCII map.
    ///
    /// The first string is row `y = 0`, the next one `y = 1`, and so on.
    /// Rows shorter than the widest row are padded with empty cells.
    ///
    /// | Symbol | Cell |
    /// |--------|------|
    /// | space or `_` | no tile |
    /// | `.` | floor |
    /// | `S` | floor, start position |
    /// | `#` | wall |
    /// | `R` `G` `B` `Y` `O` `P` | color tile |
    /// | `0`-`9` | teleport, pair `TP_<digit>` |
    pub fn from_ascii(rows: &[&str]) -> RoliceResult<Self> {
        let height = rows.len() as i32;
        let width = rows
            .iter()
            .map(|row| row.chars().count())
            .max()
            .unwrap_or(0) as i32;

        let mut level = Self::new(width, height);
        for (y, row) in rows.iter().enumerate() {
            for (x, symbol) in row.chars().enumerate() {
                let pos = Position::new(x as i32, y as i32);
                let tile = match symbol {
                    ' ' | '_' => TileDescriptor::empty(),
                    '.' => TileDescriptor::floor(),
                    'S' => {
                        level.start_position = Some(pos);
                        TileDescriptor::floor()
                    }
                    '#' => TileDescriptor::wall(),
                    digit if digit.is_ascii_digit() => TileDescriptor::teleport(format!("TP_{}", digit)),
                    other => match ColorType::from_map_symbol(other) {
                        Some(color) => TileDescriptor::color_match(color),
                        None => {
                            return Err(RoliceError::InvalidLevel(format!(
                                "Unknown map symbol '{}' at {}",
                                other, pos
                            )))
                        }
                    },
                };
                level.set_tile(pos, tile)?;
            }
        }

        Ok(level)
    }

    /// Returns the row-major index of a cell, or None when out of bounds.
    pub fn index_of(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || x >= self.width || y < 0 || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    /// Gets the tile at the given coordinates.
    ///
    /// Returns None for coordinates outside the grid; never panics, even if
    /// the tile list is shorter than the grid.
    pub fn get_tile(&self, x: i32, y: i32) -> Option<&TileDescriptor> {
        self.index_of(x, y).and_then(|index| self.tiles.get(index))
    }

    /// Gets the tile at a position.
    pub fn tile_at(&self, pos: Position) -> Option<&TileDescriptor> {
        self.get_tile(pos.x, pos.y)
    }

    /// Replaces the tile at a position.
    pub fn set_tile(&mut self, pos: Position, tile: TileDescriptor) -> RoliceResult<()> {
        let index = self
            .index_of(pos.x, pos.y)
            .filter(|index| *index < self.tiles.len())
            .ok_or_else(|| {
                RoliceError::InvalidLevel(format!(
                    "Position {} is outside the {}x{} grid",
                    pos, self.width, self.height
                ))
            })?;
        self.tiles[index] = tile;
        Ok(())
    }

    /// Whether the tile list length matches the grid dimensions.
    pub fn is_consistent(&self) -> bool {
        self.tiles.len() == cell_count(self.width, self.height)
    }

    /// Changes the grid dimensions, keeping the overlapping sub-rectangle.
    ///
    /// Cells inside both the old and the new grid keep their tile; every
    /// other cell becomes empty.
    pub fn resize(&mut self, new_width: i32, new_height: i32) {
        let mut tiles = vec![TileDescriptor::empty(); cell_count(new_width, new_height)];

        let keep_width = self.width.min(new_width).max(0);
        let keep_height = self.height.min(new_height).max(0);
        for y in 0..keep_height {
            for x in 0..keep_width {
                if let Some(tile) = self.get_tile(x, y) {
                    tiles[(y * new_width + x) as usize] = tile.clone();
                }
            }
        }

        self.width = new_width;
        self.height = new_height;
        self.tiles = tiles;

        if let Some(start) = self.start_position {
            if self.index_of(start.x, start.y).is_none() {
                self.start_position = None;
            }
        }
    }

    /// Brings the tile list back in line with the grid dimensions.
    ///
    /// Extra tiles are dropped and missing ones are filled with empty cells.
    /// Returns true when a repair was needed.
    pub fn reconcile_tiles(&mut self) -> bool {
        let expected = cell_count(self.width, self.height);
        if self.tiles.len() == expected {
            return false;
        }

        warn!(
            "Level '{}' has {} tiles but a {}x{} grid needs {}; repairing",
            self.name,
            self.tiles.len(),
            self.width,
            self.height,
            expected
        );
        self.tiles.resize(expected, TileDescriptor::empty());
        true
    }

    /// Repairs authoring data after loading or editing.
    ///
    /// Returns true when anything was changed.
    pub fn repair(&mut self) -> bool {
        let tiles_repaired = self.reconcile_tiles();
        let stage_repaired = self.stage_info.validate();
        if let Err(err) = self.rules.validate() {
            warn!("Level '{}' has invalid rules: {}", self.name, err);
        }
        tiles_repaired || stage_repaired
    }

    /// Iterates over every in-bounds cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (Position, &TileDescriptor)> + '_ {
        let width = self.width.max(1) as usize;
        self.tiles
            .iter()
            .take(cell_count(self.width, self.height))
            .enumerate()
            .map(move |(index, tile)| {
                (Position::new((index % width) as i32, (index / width) as i32), tile)
            })
    }

    /// Number of non-empty tiles.
    pub fn tile_count(&self) -> usize {
        self.cells().filter(|(_, tile)| !tile.is_empty()).count()
    }

    /// Number of tiles that must be cleared to finish the level.
    pub fn color_tile_count(&self) -> usize {
        self.cells()
            .filter(|(_, tile)| tile.requires_clear_tracking())
            .count()
    }

    /// Explicit start position, or the first enterable tile in row-major order.
    pub fn resolve_start_position(&self) -> Option<Position> {
        if let Some(start) = self.start_position {
            return Some(start);
        }
        self.cells()
            .find(|(_, tile)| !tile.is_empty() && tile.can_enter)
            .map(|(pos, _)| pos)
    }

    /// Initial dice faces for this level.
    pub fn initial_dice_faces(&self) -> DiceFaces {
        self.dice_faces.unwrap_or_else(DiceFaces::standard)
    }

    /// Stars earned for finishing this level in `turn_count` turns.
    pub fn calculate_stars(&self, turn_count: u32) -> u32 {
        self.stage_info.calculate_stars(turn_count)
    }

    /// Serializes the level to pretty JSON.
    pub fn to_json(&self) -> RoliceResult<String> {
        serde_json::to_string_pretty(self).map_err(RoliceError::from)
    }

    /// Parses a level from JSON, repairing inconsistent tile data.
    pub fn from_json(json: &str) -> RoliceResult<Self> {
        let mut level: LevelDescriptor = serde_json::from_str(json)?;
        level.repair();
        Ok(level)
    }

    /// Reads a level from a JSON file.
    pub fn load_from_file(path: impl AsRef<Path>) -> RoliceResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Small built-in level used by the CLI when no file is given.
    ///
    /// Solvable with the standard die by rolling right, then up.
    pub fn tutorial() -> Self {
        let mut level = Self::from_ascii(&["SP.", "#G.", "..."])
            .unwrap_or_else(|_| Self::new(3, 3));
        level.name = "tutorial".to_string();
        level.stage_info.stage_number = 1;
        level.stage_info.display_name = "First Roll".to_string();
        level.rules = LevelRules::turn_limit(config::DEFAULT_MAX_TURNS);
        level
    }
}

pub(crate) fn cell_count(width: i32, height: i32) -> usize {
    (width.max(0) as usize) * (height.max(0) as usize)
}
