//! # Level Validation
//!
//! Authoring checks run before a level ships: grid consistency, color tile
//! counts, teleport pairing, rule balance and reachability.
//!
//! Validation never modifies the level. Errors mean the level cannot be
//! finished as authored; warnings flag likely mistakes.

use crate::game::Position;
use crate::level::{cell_count, BehaviorDescriptor, LevelDescriptor};
use pathfinding::prelude::bfs_reach;
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// Turn margin below which a level is reported as tight.
const TIGHT_TURN_MARGIN: i64 = 3;

/// Findings of a level validation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub info: Vec<String>,
}

impl ValidationReport {
    /// A level is valid when no errors were found.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    fn warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    fn info(&mut self, message: impl Into<String>) {
        self.info.push(message.into());
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Level Validation Result ===")?;
        if self.is_valid() {
            writeln!(f, "Level is VALID")?;
        } else {
            writeln!(f, "Level has ERRORS")?;
        }

        for (title, lines) in [
            ("ERRORS", &self.errors),
            ("WARNINGS", &self.warnings),
            ("INFO", &self.info),
        ] {
            if lines.is_empty() {
                continue;
            }
            writeln!(f, "{}:", title)?;
            for line in lines {
                writeln!(f, "  - {}", line)?;
            }
        }
        Ok(())
    }
}

/// Validates a level starting reachability from its resolved start position.
pub fn validate_level(level: &LevelDescriptor) -> ValidationReport {
    validate_level_from(level, level.resolve_start_position())
}

/// Validates a level with an explicit reachability start.
pub fn validate_level_from(level: &LevelDescriptor, start: Option<Position>) -> ValidationReport {
    let mut report = ValidationReport::default();

    if !check_dimensions(level, &mut report) {
        return report;
    }
    check_tiles(level, &mut report);
    check_teleport_pairs(level, &mut report);
    check_rules(level, &mut report);
    check_reachability(level, start, &mut report);

    report
}

fn check_dimensions(level: &LevelDescriptor, report: &mut ValidationReport) -> bool {
    report.info(format!("Map size: {} x {}", level.width, level.height));

    if level.width <= 0 || level.height <= 0 {
        report.error("Invalid map size");
        return false;
    }

    if !level.is_consistent() {
        let expected = cell_count(level.width, level.height);
        report.error(format!(
            "Tile count mismatch: expected {}, got {}",
            expected,
            level.tiles.len()
        ));
    }
    true
}

fn check_tiles(level: &LevelDescriptor, report: &mut ValidationReport) {
    let total = level.tile_count();
    let color_tiles = level.color_tile_count();

    report.info(format!("Total tiles: {}", total));
    report.info(format!("Color tiles: {}", color_tiles));

    if color_tiles == 0 {
        report.error("No color tiles found; the level cannot be completed");
    }
    if total == 0 {
        report.warning("Map is empty");
    }

    for (pos, tile) in level.cells() {
        if tile.requires_clear_tracking() && tile.color.is_none() {
            report.error(format!("Color tile at {} has no color assigned", pos));
        }
    }
}

fn teleport_groups(level: &LevelDescriptor) -> BTreeMap<&str, Vec<Position>> {
    let mut groups: BTreeMap<&str, Vec<Position>> = BTreeMap::new();
    for (pos, tile) in level.cells() {
        if tile.is_empty() {
            continue;
        }
        if let BehaviorDescriptor::Teleport { pair_id } = &tile.behavior {
            groups.entry(pair_id.as_str()).or_default().push(pos);
        }
    }
    groups
}

fn check_teleport_pairs(level: &LevelDescriptor, report: &mut ValidationReport) {
    let groups = teleport_groups(level);
    if groups.is_empty() {
        return;
    }

    report.info(format!("Teleport pairs: {}", groups.len()));
    for (pair_id, positions) in &groups {
        if pair_id.is_empty() {
            report.warning(format!(
                "{} teleport tile(s) have an empty pair ID",
                positions.len()
            ));
        } else if positions.len() < 2 {
            report.warning(format!(
                "Teleport pair '{}' has only {} tile(s); needs 2",
                pair_id,
                positions.len()
            ));
        } else if positions.len() > 2 {
            report.warning(format!(
                "Teleport pair '{}' has {} tiles; only the first partner is used",
                pair_id,
                positions.len()
            ));
        }
    }
}

fn check_rules(level: &LevelDescriptor, report: &mut ValidationReport) {
    let rules = &level.rules;
    if let Err(err) = rules.validate() {
        report.error(err.to_string());
    }

    let color_tiles = level.color_tile_count() as i64;
    if rules.has_turn_limit {
        report.info(format!("Turn limit: {}", rules.max_turns));
        let max_turns = i64::from(rules.max_turns);
        if color_tiles > max_turns {
            report.warning(format!(
                "Color tiles ({}) exceed the turn limit ({}); the level may be impossible",
                color_tiles, max_turns
            ));
        }
        let margin = max_turns - color_tiles;
        if color_tiles > 0 && margin < TIGHT_TURN_MARGIN {
            report.info(format!("Tight difficulty: only {} extra turns", margin));
        }
    }

    if rules.has_time_limit {
        report.info(format!("Time limit: {} seconds", rules.max_time));
    }
}

fn check_reachability(level: &LevelDescriptor, start: Option<Position>, report: &mut ValidationReport) {
    let Some(start) = start else {
        report.warning("No start position found");
        return;
    };

    match level.tile_at(start) {
        Some(tile) if !tile.is_empty() => {}
        _ => {
            report.error(format!("Start position {} has no tile", start));
            return;
        }
    }

    let groups = teleport_groups(level);
    let enterable = |pos: &Position| {
        level
            .tile_at(*pos)
            .map(|tile| !tile.is_empty() && tile.can_enter)
            .unwrap_or(false)
    };
    // Where the pawn comes to rest after entering `pos`: a paired teleport
    // always sends it on to its partner.
    let landing = |pos: Position| -> Position {
        match level.tile_at(pos).map(|tile| &tile.behavior) {
            Some(BehaviorDescriptor::Teleport { pair_id }) => groups
                .get(pair_id.as_str())
                .and_then(|positions| positions.iter().find(|p| **p != pos))
                .copied()
                .unwrap_or(pos),
            _ => pos,
        }
    };

    let rest_positions: Vec<Position> = bfs_reach(landing(start), |pos| {
        pos.cardinal_adjacent_positions()
            .into_iter()
            .filter(|neighbour| enterable(neighbour))
            .map(|neighbour| landing(neighbour))
            .collect::<Vec<_>>()
    })
    .collect();

    // Color tiles are cleared on entry, so only tiles the pawn rests on count.
    let reachable: HashSet<Position> = rest_positions.into_iter().collect();

    let unreachable: Vec<Position> = level
        .cells()
        .filter(|(pos, tile)| tile.requires_clear_tracking() && !reachable.contains(pos))
        .map(|(pos, _)| pos)
        .collect();

    if unreachable.is_empty() {
        report.info(format!("All color tiles reachable from {}", start));
    } else {
        report.error(format!("Found {} unreachable color tile(s)", unreachable.len()));
        for pos in unreachable {
            report.error(format!("  unreachable color tile at {}", pos));
        }
    }
}
