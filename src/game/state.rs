//! # Level State Module
//!
//! The live instantiation of a level for one play session.
//!
//! `LevelState` owns every runtime tile, the set of color tiles that still
//! need clearing, and the teleport pair registry. It is the only place the
//! remaining-to-clear set is mutated, which keeps clearing idempotent and
//! completion exactly-once.

use crate::game::{
    ConcreteBehavior, GameEvent, PawnView, Position, RuntimeTile, TeleportPairs, TileBehavior,
    TileContext, TileEffect, TileSpawner,
};
use crate::{LevelDescriptor, RoliceError, RoliceResult};
use log::{debug, error, info, warn};
use std::collections::{HashMap, HashSet};

/// Outcome of [`LevelState::load_level`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadResult {
    pub success: bool,
    pub tiles_created: usize,
    pub color_tiles_count: usize,
    pub error_message: Option<String>,
    /// Non-fatal authoring problems noticed during the load
    pub warnings: Vec<String>,
}

impl LoadResult {
    fn failure(message: String) -> Self {
        Self {
            success: false,
            error_message: Some(message),
            ..Self::default()
        }
    }
}

/// Result of firing enter or exit logic on a tile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TileOutcome {
    pub events: Vec<GameEvent>,
    /// Destination when the tile sent the pawn elsewhere
    pub teleport_to: Option<Position>,
}

/// Runtime state of the loaded level.
#[derive(Debug, Clone, Default)]
pub struct LevelState {
    level_name: String,
    width: i32,
    height: i32,
    tiles: HashMap<Position, RuntimeTile>,
    color_tiles_remaining: HashSet<Position>,
    teleports: TeleportPairs,
    completion_notified: bool,
    loaded: bool,
}

impl LevelState {
    /// Creates an empty, unloaded state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a level, reporting failures through the returned [`LoadResult`].
    ///
    /// A missing descriptor or a failed load leaves the state unloaded.
    pub fn load_level(
        &mut self,
        descriptor: Option<&LevelDescriptor>,
        spawner: &mut dyn TileSpawner,
    ) -> LoadResult {
        let Some(descriptor) = descriptor else {
            self.unload();
            error!("Cannot load level: no level descriptor given");
            return LoadResult::failure("Level descriptor is missing".to_string());
        };

        match self.try_load(descriptor, spawner) {
            Ok(result) => result,
            Err(err) => {
                error!("Failed to load level '{}': {}", descriptor.name, err);
                LoadResult::failure(err.to_string())
            }
        }
    }

    /// Loads a level, replacing any previous session.
    ///
    /// Nothing is committed until every tile has been spawned; on error the
    /// state is left unloaded.
    pub fn try_load(
        &mut self,
        descriptor: &LevelDescriptor,
        spawner: &mut dyn TileSpawner,
    ) -> RoliceResult<LoadResult> {
        self.unload();

        if descriptor.width <= 0 || descriptor.height <= 0 {
            return Err(RoliceError::InvalidLevel(format!(
                "Invalid level size {}x{}",
                descriptor.width, descriptor.height
            )));
        }

        let mut warnings = Vec::new();
        let repaired;
        let descriptor = if descriptor.is_consistent() {
            descriptor
        } else {
            let mut copy = descriptor.clone();
            copy.reconcile_tiles();
            warnings.push(format!(
                "Tile list had {} entries for a {}x{} grid and was repaired",
                descriptor.tiles.len(),
                descriptor.width,
                descriptor.height
            ));
            repaired = copy;
            &repaired
        };

        let mut tiles = HashMap::new();
        let mut color_tiles_remaining = HashSet::new();
        let mut teleports = TeleportPairs::new();

        for (position, tile) in descriptor.cells() {
            if tile.is_empty() {
                continue;
            }

            let visual = spawner.spawn(&tile.tile_kind, position).ok_or_else(|| {
                RoliceError::TileSpawn {
                    tile_kind: tile.tile_kind.clone(),
                    position,
                }
            })?;

            let runtime = RuntimeTile::new(tile.clone(), position, Some(visual), &mut teleports);
            if runtime.behavior.requires_clear_tracking() {
                color_tiles_remaining.insert(position);
            }
            tiles.insert(position, runtime);
        }

        for (pair_id, count) in teleports.malformed_pairs() {
            let message = format!("Teleport pair '{}' has {} tile(s), expected 2", pair_id, count);
            warn!("{}", message);
            warnings.push(message);
        }
        if color_tiles_remaining.is_empty() {
            let message = "Level has no color tiles".to_string();
            warn!("{}", message);
            warnings.push(message);
        }

        let result = LoadResult {
            success: true,
            tiles_created: tiles.len(),
            color_tiles_count: color_tiles_remaining.len(),
            error_message: None,
            warnings,
        };

        self.level_name = descriptor.name.clone();
        self.width = descriptor.width;
        self.height = descriptor.height;
        self.tiles = tiles;
        self.color_tiles_remaining = color_tiles_remaining;
        self.teleports = teleports;
        self.completion_notified = false;
        self.loaded = true;

        info!(
            "Loaded level '{}': {} tiles, {} color tiles",
            self.level_name, result.tiles_created, result.color_tiles_count
        );
        Ok(result)
    }

    /// Drops every runtime tile and returns to the unloaded state.
    pub fn unload(&mut self) {
        *self = Self::default();
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn level_name(&self) -> &str {
        &self.level_name
    }

    /// Grid dimensions of the loaded level.
    pub fn size(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    /// Looks up the runtime tile at a position.
    pub fn get_runtime_tile(&self, position: Position) -> Option<&RuntimeTile> {
        self.tiles.get(&position)
    }

    pub fn has_tile(&self, position: Position) -> bool {
        self.tiles.contains_key(&position)
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Registers one end of a teleport pair.
    pub fn register_teleport_pair(&mut self, pair_id: &str, position: Position) {
        self.teleports.register(pair_id, position);
    }

    /// Partner of a teleport tile.
    pub fn find_teleport_pair(&self, pair_id: &str, exclude: Position) -> Option<Position> {
        self.teleports.find_pair(pair_id, exclude)
    }

    pub fn teleports(&self) -> &TeleportPairs {
        &self.teleports
    }

    /// Marks a color tile as cleared.
    ///
    /// Clearing a position that is not pending does nothing. The returned
    /// events include [`GameEvent::LevelCompleted`] the first time the
    /// pending set becomes empty, and never again for this session.
    pub fn clear_color_tile(&mut self, position: Position) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if !self.color_tiles_remaining.remove(&position) {
            debug!("Color tile at {} is not pending; ignoring clear", position);
            return events;
        }

        if let Some(tile) = self.tiles.get_mut(&position) {
            if let ConcreteBehavior::ColorMatch(behavior) = &mut tile.behavior {
                behavior.cleared = true;
            }
        }

        debug!(
            "Cleared color tile at {} ({} remaining)",
            position,
            self.color_tiles_remaining.len()
        );
        events.push(GameEvent::ColorTileCleared(position));

        if self.color_tiles_remaining.is_empty() && !self.completion_notified {
            self.completion_notified = true;
            info!("Level '{}' completed", self.level_name);
            events.push(GameEvent::LevelCompleted);
        }
        events
    }

    /// Whether every color tile has been cleared.
    ///
    /// Always false while no level is loaded.
    pub fn check_level_complete(&self) -> bool {
        self.loaded && self.color_tiles_remaining.is_empty()
    }

    pub fn remaining_color_tiles(&self) -> usize {
        self.color_tiles_remaining.len()
    }

    pub fn is_color_tile_pending(&self, position: Position) -> bool {
        self.color_tiles_remaining.contains(&position)
    }

    /// Pending color tiles, sorted.
    pub fn remaining_positions(&self) -> Vec<Position> {
        let mut positions: Vec<Position> = self.color_tiles_remaining.iter().copied().collect();
        positions.sort();
        positions
    }

    /// Fires enter logic on the tile at `position`.
    pub fn enter_tile(&mut self, position: Position, pawn: PawnView) -> TileOutcome {
        self.fire(position, pawn, true)
    }

    /// Fires exit logic on the tile at `position`.
    pub fn exit_tile(&mut self, position: Position, pawn: PawnView) -> TileOutcome {
        self.fire(position, pawn, false)
    }

    fn fire(&mut self, position: Position, pawn: PawnView, entering: bool) -> TileOutcome {
        let teleports = &self.teleports;
        let Some(tile) = self.tiles.get_mut(&position) else {
            return TileOutcome::default();
        };

        let ctx = TileContext {
            position,
            pawn,
            teleports,
        };
        let effect = if entering {
            tile.behavior.on_enter(&ctx)
        } else {
            tile.behavior.on_exit(&ctx)
        };

        match effect {
            TileEffect::None => TileOutcome::default(),
            TileEffect::Cleared(cleared) => TileOutcome {
                events: self.clear_color_tile(cleared),
                teleport_to: None,
            },
            TileEffect::Teleport { from, to } => {
                debug!("Teleport from {} to {}", from, to);
                TileOutcome {
                    events: Vec::new(),
                    teleport_to: Some(to),
                }
            }
        }
    }

    /// One-line summary for debug overlays and logs.
    pub fn debug_summary(&self) -> String {
        let mut summary = format!(
            "Level '{}' {}x{}: {} runtime tiles, {} color tiles remaining, {} teleport pairs",
            self.level_name,
            self.width,
            self.height,
            self.tiles.len(),
            self.color_tiles_remaining.len(),
            self.teleports.len()
        );
        if !self.loaded {
            summary.push_str(" (not loaded)");
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{ColorType, NullSpawner, VisualHandle};
    use crate::level::TileDescriptor;
    use proptest::prelude::*;

    struct FailingSpawner {
        fail_kind: &'static str,
    }

    impl TileSpawner for FailingSpawner {
        fn spawn(&mut self, tile_kind: &str, _position: Position) -> Option<VisualHandle> {
            (tile_kind != self.fail_kind).then_some(VisualHandle(7))
        }
    }

    fn loaded(rows: &[&str]) -> LevelState {
        let level = LevelDescriptor::from_ascii(rows).unwrap();
        let mut state = LevelState::new();
        state.try_load(&level, &mut NullSpawner::default()).unwrap();
        state
    }

    fn pawn(bottom_color: ColorType) -> PawnView {
        PawnView {
            position: Position::origin(),
            bottom_color,
        }
    }

    #[test]
    fn test_load_counts_tiles() {
        let mut state = LevelState::new();
        let result = state.load_level(Some(&LevelDescriptor::tutorial()), &mut NullSpawner::default());
        assert!(result.success);
        assert_eq!(result.tiles_created, 9);
        assert_eq!(result.color_tiles_count, 2);
        assert!(result.error_message.is_none());
        assert!(state.is_loaded());
        assert!(state.get_runtime_tile(Position::new(1, 0)).is_some());
        assert!(state.get_runtime_tile(Position::new(9, 9)).is_none());
        assert!(!state.check_level_complete());
    }

    #[test]
    fn test_missing_descriptor_fails() {
        let mut state = loaded(&["SR"]);
        let result = state.load_level(None, &mut NullSpawner::default());
        assert!(!result.success);
        assert!(result.error_message.is_some());
        assert!(!state.is_loaded());
        assert_eq!(state.tile_count(), 0);
    }

    #[test]
    fn test_non_positive_dimensions_fail() {
        let mut state = LevelState::new();
        let err = state
            .try_load(&LevelDescriptor::new(0, 3), &mut NullSpawner::default())
            .unwrap_err();
        assert!(matches!(err, RoliceError::InvalidLevel(_)));
        assert!(!state.is_loaded());
    }

    #[test]
    fn test_spawn_failure_leaves_no_partial_state() {
        let mut state = loaded(&["SR"]);
        let level = LevelDescriptor::from_ascii(&["S.#R"]).unwrap();
        let result = state.load_level(Some(&level), &mut FailingSpawner { fail_kind: "wall" });
        assert!(!result.success);
        assert!(result.error_message.unwrap().contains("wall"));
        assert!(!state.is_loaded());
        assert_eq!(state.tile_count(), 0);
        assert_eq!(state.remaining_color_tiles(), 0);
        assert!(!state.check_level_complete());
    }

    #[test]
    fn test_inconsistent_descriptor_is_repaired_with_warning() {
        let mut level = LevelDescriptor::from_ascii(&["SR", ".."]).unwrap();
        level.tiles.truncate(3);
        let mut state = LevelState::new();
        let result = state.try_load(&level, &mut NullSpawner::default()).unwrap();
        assert!(result.success);
        assert_eq!(result.tiles_created, 3);
        assert!(result.warnings.iter().any(|w| w.contains("repaired")));
    }

    #[test]
    fn test_teleport_pairs_registered_on_load() {
        let state = loaded(&["S1.1R"]);
        assert_eq!(
            state.find_teleport_pair("TP_1", Position::new(1, 0)),
            Some(Position::new(3, 0))
        );
        assert_eq!(state.teleports().len(), 1);
    }

    #[test]
    fn test_malformed_teleports_warn() {
        let mut state = LevelState::new();
        let level = LevelDescriptor::from_ascii(&["S1R"]).unwrap();
        let result = state.try_load(&level, &mut NullSpawner::default()).unwrap();
        assert!(result.warnings.iter().any(|w| w.contains("TP_1")));
    }

    #[test]
    fn test_clear_is_idempotent_and_completes_once() {
        let mut state = loaded(&["SR"]);
        let target = Position::new(1, 0);

        let events = state.clear_color_tile(target);
        assert_eq!(
            events,
            vec![GameEvent::ColorTileCleared(target), GameEvent::LevelCompleted]
        );
        assert!(state.check_level_complete());
        assert!(state.get_runtime_tile(target).unwrap().is_cleared());

        assert!(state.clear_color_tile(target).is_empty());
        assert!(state.clear_color_tile(Position::new(0, 0)).is_empty());
        assert!(state.check_level_complete());
    }

    #[test]
    fn test_enter_matching_color_clears() {
        let mut state = loaded(&["SRG"]);
        let outcome = state.enter_tile(Position::new(1, 0), pawn(ColorType::Green));
        assert!(outcome.events.is_empty());
        assert!(state.is_color_tile_pending(Position::new(1, 0)));

        let outcome = state.enter_tile(Position::new(1, 0), pawn(ColorType::Red));
        assert_eq!(outcome.events, vec![GameEvent::ColorTileCleared(Position::new(1, 0))]);
        assert_eq!(state.remaining_positions(), vec![Position::new(2, 0)]);
    }

    #[test]
    fn test_enter_teleport_reports_destination() {
        let mut state = loaded(&["S1.1"]);
        let outcome = state.enter_tile(Position::new(1, 0), pawn(ColorType::Red));
        assert_eq!(outcome.teleport_to, Some(Position::new(3, 0)));
        assert!(state.exit_tile(Position::new(1, 0), pawn(ColorType::Red)).teleport_to.is_none());
        assert_eq!(state.enter_tile(Position::new(2, 0), pawn(ColorType::Red)), TileOutcome::default());
    }

    #[test]
    fn test_reload_resets_completion() {
        let mut level = LevelDescriptor::new(2, 1);
        level.set_tile(Position::new(0, 0), TileDescriptor::floor()).unwrap();
        level
            .set_tile(Position::new(1, 0), TileDescriptor::color_match(ColorType::Red))
            .unwrap();
        let mut state = LevelState::new();
        state.try_load(&level, &mut NullSpawner::default()).unwrap();
        state.clear_color_tile(Position::new(1, 0));
        assert!(state.check_level_complete());

        state.try_load(&level, &mut NullSpawner::default()).unwrap();
        assert!(!state.check_level_complete());
        assert_eq!(
            state.clear_color_tile(Position::new(1, 0)).last(),
            Some(&GameEvent::LevelCompleted)
        );
    }

    #[test]
    fn test_debug_summary() {
        let state = loaded(&["S1.1R"]);
        let summary = state.debug_summary();
        assert!(summary.contains("5 runtime tiles"));
        assert!(summary.contains("1 color tiles remaining"));
        assert!(summary.contains("1 teleport pairs"));
        assert!(LevelState::new().debug_summary().ends_with("(not loaded)"));
    }

    proptest! {
        #[test]
        fn prop_completion_independent_of_clear_order(
            order in Just((0..6).collect::<Vec<i32>>()).prop_shuffle()
        ) {
            let mut state = loaded(&["SRGBYOP"]);
            let (last, rest) = order.split_last().unwrap();
            for x in rest {
                let events = state.clear_color_tile(Position::new(x + 1, 0));
                prop_assert!(!events.contains(&GameEvent::LevelCompleted));
                prop_assert!(!state.check_level_complete());
            }
            let events = state.clear_color_tile(Position::new(last + 1, 0));
            prop_assert!(events.contains(&GameEvent::LevelCompleted));
            prop_assert!(state.check_level_complete());
        }
    }
}
