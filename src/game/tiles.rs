//! # Runtime Tiles
//!
//! Per-session tile copies and the behaviors that react to the die rolling
//! on and off them.
//!
//! Behaviors are built eagerly when a runtime tile is created. They never
//! touch the level state directly; instead they return a [`TileEffect`]
//! that the level state applies, keeping the remaining-to-clear set behind
//! a single entry point.

use crate::game::{ColorType, Position};
use crate::level::{BehaviorDescriptor, TileDescriptor};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// What a behavior can see of the pawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PawnView {
    pub position: Position,
    pub bottom_color: ColorType,
}

/// Registry of teleport tiles keyed by pair ID.
///
/// Positions keep their registration order, which decides the partner
/// picked when a pair has more than two members.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeleportPairs {
    pairs: HashMap<String, Vec<Position>>,
}

impl TeleportPairs {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one end of a pair.
    ///
    /// Empty IDs are ignored with a warning and duplicate registrations
    /// are dropped.
    pub fn register(&mut self, pair_id: &str, position: Position) {
        if pair_id.is_empty() {
            warn!("Ignoring teleport at {} with an empty pair ID", position);
            return;
        }

        let positions = self.pairs.entry(pair_id.to_string()).or_default();
        if !positions.contains(&position) {
            positions.push(position);
            debug!("Registered teleport '{}' at {}", pair_id, position);
        }
    }

    /// First registered position of `pair_id` other than `exclude`.
    pub fn find_pair(&self, pair_id: &str, exclude: Position) -> Option<Position> {
        self.pairs
            .get(pair_id)?
            .iter()
            .copied()
            .find(|pos| *pos != exclude)
    }

    /// Registered positions of a pair.
    pub fn positions(&self, pair_id: &str) -> &[Position] {
        self.pairs.get(pair_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of distinct pair IDs.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Pair IDs that do not have exactly two members, sorted.
    pub fn malformed_pairs(&self) -> Vec<(String, usize)> {
        let mut malformed: Vec<(String, usize)> = self
            .pairs
            .iter()
            .filter(|(_, positions)| positions.len() != 2)
            .map(|(id, positions)| (id.clone(), positions.len()))
            .collect();
        malformed.sort();
        malformed
    }

    pub fn clear(&mut self) {
        self.pairs.clear();
    }
}

/// Everything a behavior may read while reacting to the pawn.
#[derive(Debug, Clone, Copy)]
pub struct TileContext<'a> {
    /// Position of the tile the behavior belongs to
    pub position: Position,
    pub pawn: PawnView,
    pub teleports: &'a TeleportPairs,
}

/// Side effect requested by a behavior, applied by the level state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileEffect {
    None,
    /// The color tile at this position was satisfied
    Cleared(Position),
    /// Relocate the pawn without firing enter logic at `to`
    Teleport { from: Position, to: Position },
}

/// Capability interface shared by every tile behavior.
pub trait TileBehavior {
    /// Whether the pawn may roll onto the tile.
    fn can_enter(&self, _pawn: &PawnView) -> bool {
        true
    }

    /// Called after the pawn has rolled onto the tile.
    fn on_enter(&mut self, ctx: &TileContext<'_>) -> TileEffect;

    /// Called before the pawn rolls off the tile.
    fn on_exit(&mut self, _ctx: &TileContext<'_>) -> TileEffect {
        TileEffect::None
    }

    /// Whether the tile must be cleared to finish the level.
    fn requires_clear_tracking(&self) -> bool {
        false
    }
}

/// Cleared once the die lands on it showing the same bottom color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorMatchBehavior {
    pub color: Option<ColorType>,
    pub cleared: bool,
}

impl ColorMatchBehavior {
    pub fn new(color: Option<ColorType>) -> Self {
        Self {
            color,
            cleared: false,
        }
    }
}

impl TileBehavior for ColorMatchBehavior {
    fn on_enter(&mut self, ctx: &TileContext<'_>) -> TileEffect {
        if self.cleared {
            return TileEffect::None;
        }

        let Some(color) = self.color else {
            warn!("Color tile at {} has no color assigned", ctx.position);
            return TileEffect::None;
        };

        if color != ctx.pawn.bottom_color {
            debug!(
                "Color tile at {} wants {}, die shows {}",
                ctx.position, color, ctx.pawn.bottom_color
            );
            return TileEffect::None;
        }

        self.cleared = true;
        TileEffect::Cleared(ctx.position)
    }

    fn requires_clear_tracking(&self) -> bool {
        true
    }
}

/// Sends the pawn to the other tile sharing its pair ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeleportBehavior {
    pub pair_id: String,
}

impl TeleportBehavior {
    /// Creates the behavior and registers its tile with the pair registry.
    pub fn new(pair_id: impl Into<String>, position: Position, teleports: &mut TeleportPairs) -> Self {
        let pair_id = pair_id.into();
        teleports.register(&pair_id, position);
        Self { pair_id }
    }
}

impl TileBehavior for TeleportBehavior {
    fn on_enter(&mut self, ctx: &TileContext<'_>) -> TileEffect {
        match ctx.teleports.find_pair(&self.pair_id, ctx.position) {
            Some(to) => TileEffect::Teleport {
                from: ctx.position,
                to,
            },
            None => {
                warn!(
                    "Teleport '{}' at {} has no partner; staying put",
                    self.pair_id, ctx.position
                );
                TileEffect::None
            }
        }
    }
}

/// Behavior attached to a runtime tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConcreteBehavior {
    None,
    ColorMatch(ColorMatchBehavior),
    Teleport(TeleportBehavior),
}

impl ConcreteBehavior {
    /// Builds the behavior described by a tile, registering teleports.
    pub fn build(descriptor: &TileDescriptor, position: Position, teleports: &mut TeleportPairs) -> Self {
        match &descriptor.behavior {
            BehaviorDescriptor::None => ConcreteBehavior::None,
            BehaviorDescriptor::ColorMatch => {
                ConcreteBehavior::ColorMatch(ColorMatchBehavior::new(descriptor.color))
            }
            BehaviorDescriptor::Teleport { pair_id } => {
                ConcreteBehavior::Teleport(TeleportBehavior::new(pair_id.clone(), position, teleports))
            }
        }
    }

    /// Whether a color tile has already been cleared.
    pub fn is_cleared(&self) -> bool {
        matches!(self, ConcreteBehavior::ColorMatch(behavior) if behavior.cleared)
    }
}

impl TileBehavior for ConcreteBehavior {
    fn can_enter(&self, pawn: &PawnView) -> bool {
        match self {
            ConcreteBehavior::None => true,
            ConcreteBehavior::ColorMatch(behavior) => behavior.can_enter(pawn),
            ConcreteBehavior::Teleport(behavior) => behavior.can_enter(pawn),
        }
    }

    fn on_enter(&mut self, ctx: &TileContext<'_>) -> TileEffect {
        match self {
            ConcreteBehavior::None => TileEffect::None,
            ConcreteBehavior::ColorMatch(behavior) => behavior.on_enter(ctx),
            ConcreteBehavior::Teleport(behavior) => behavior.on_enter(ctx),
        }
    }

    fn on_exit(&mut self, ctx: &TileContext<'_>) -> TileEffect {
        match self {
            ConcreteBehavior::None => TileEffect::None,
            ConcreteBehavior::ColorMatch(behavior) => behavior.on_exit(ctx),
            ConcreteBehavior::Teleport(behavior) => behavior.on_exit(ctx),
        }
    }

    fn requires_clear_tracking(&self) -> bool {
        match self {
            ConcreteBehavior::None => false,
            ConcreteBehavior::ColorMatch(behavior) => behavior.requires_clear_tracking(),
            ConcreteBehavior::Teleport(behavior) => behavior.requires_clear_tracking(),
        }
    }
}

/// Opaque handle to a spawned tile visual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VisualHandle(pub u64);

/// Creates tile visuals for the rendering layer.
pub trait TileSpawner {
    /// Spawns the visual for a tile kind, or returns None on failure.
    fn spawn(&mut self, tile_kind: &str, position: Position) -> Option<VisualHandle>;
}

/// Spawner for headless play; every spawn succeeds.
#[derive(Debug, Clone, Default)]
pub struct NullSpawner {
    next_handle: u64,
}

impl TileSpawner for NullSpawner {
    fn spawn(&mut self, _tile_kind: &str, _position: Position) -> Option<VisualHandle> {
        self.next_handle += 1;
        Some(VisualHandle(self.next_handle))
    }
}

/// The live copy of one authored tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeTile {
    pub descriptor: TileDescriptor,
    pub position: Position,
    pub visual: Option<VisualHandle>,
    pub behavior: ConcreteBehavior,
}

impl RuntimeTile {
    pub fn new(
        descriptor: TileDescriptor,
        position: Position,
        visual: Option<VisualHandle>,
        teleports: &mut TeleportPairs,
    ) -> Self {
        let behavior = ConcreteBehavior::build(&descriptor, position, teleports);
        Self {
            descriptor,
            position,
            visual,
            behavior,
        }
    }

    pub fn tile_kind(&self) -> &str {
        &self.descriptor.tile_kind
    }

    /// Authored enter flag; the behavior gets its own say separately.
    pub fn can_enter(&self) -> bool {
        self.descriptor.can_enter
    }

    pub fn is_cleared(&self) -> bool {
        self.behavior.is_cleared()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(bottom_color: ColorType) -> PawnView {
        PawnView {
            position: Position::origin(),
            bottom_color,
        }
    }

    #[test]
    fn test_teleport_registry_dedupes_and_ignores_empty_ids() {
        let mut pairs = TeleportPairs::new();
        pairs.register("TP_1", Position::new(0, 0));
        pairs.register("TP_1", Position::new(0, 0));
        pairs.register("TP_1", Position::new(3, 1));
        pairs.register("", Position::new(5, 5));

        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs.positions("TP_1").len(), 2);
        assert_eq!(
            pairs.find_pair("TP_1", Position::new(0, 0)),
            Some(Position::new(3, 1))
        );
        assert_eq!(
            pairs.find_pair("TP_1", Position::new(3, 1)),
            Some(Position::new(0, 0))
        );
        assert_eq!(pairs.find_pair("TP_9", Position::origin()), None);
        assert!(pairs.malformed_pairs().is_empty());
    }

    #[test]
    fn test_malformed_pairs_reported() {
        let mut pairs = TeleportPairs::new();
        pairs.register("solo", Position::new(1, 1));
        pairs.register("trio", Position::new(0, 0));
        pairs.register("trio", Position::new(0, 1));
        pairs.register("trio", Position::new(0, 2));
        assert_eq!(
            pairs.malformed_pairs(),
            vec![("solo".to_string(), 1), ("trio".to_string(), 3)]
        );
    }

    #[test]
    fn test_color_match_clears_once_on_matching_color() {
        let pairs = TeleportPairs::new();
        let pos = Position::new(2, 2);
        let mut behavior = ColorMatchBehavior::new(Some(ColorType::Red));

        let ctx = TileContext {
            position: pos,
            pawn: view(ColorType::Blue),
            teleports: &pairs,
        };
        assert_eq!(behavior.on_enter(&ctx), TileEffect::None);
        assert!(!behavior.cleared);

        let ctx = TileContext {
            pawn: view(ColorType::Red),
            ..ctx
        };
        assert_eq!(behavior.on_enter(&ctx), TileEffect::Cleared(pos));
        assert!(behavior.cleared);
        assert_eq!(behavior.on_enter(&ctx), TileEffect::None);
    }

    #[test]
    fn test_color_match_without_color_never_clears() {
        let pairs = TeleportPairs::new();
        let mut behavior = ColorMatchBehavior::new(None);
        let ctx = TileContext {
            position: Position::origin(),
            pawn: view(ColorType::Gray),
            teleports: &pairs,
        };
        assert_eq!(behavior.on_enter(&ctx), TileEffect::None);
        assert!(behavior.requires_clear_tracking());
    }

    #[test]
    fn test_teleport_construction_registers_position() {
        let mut pairs = TeleportPairs::new();
        let a = RuntimeTile::new(
            TileDescriptor::teleport("TP_1"),
            Position::new(0, 0),
            None,
            &mut pairs,
        );
        let _b = RuntimeTile::new(
            TileDescriptor::teleport("TP_1"),
            Position::new(4, 0),
            None,
            &mut pairs,
        );

        let mut behavior = a.behavior.clone();
        let ctx = TileContext {
            position: a.position,
            pawn: view(ColorType::Red),
            teleports: &pairs,
        };
        assert_eq!(
            behavior.on_enter(&ctx),
            TileEffect::Teleport {
                from: Position::new(0, 0),
                to: Position::new(4, 0)
            }
        );
        assert!(!behavior.requires_clear_tracking());
    }

    #[test]
    fn test_teleport_without_partner_is_a_no_op() {
        let mut pairs = TeleportPairs::new();
        let mut behavior = TeleportBehavior::new("lonely", Position::new(1, 1), &mut pairs);
        let ctx = TileContext {
            position: Position::new(1, 1),
            pawn: view(ColorType::Red),
            teleports: &pairs,
        };
        assert_eq!(behavior.on_enter(&ctx), TileEffect::None);
    }

    #[test]
    fn test_concrete_behavior_from_descriptor() {
        let mut pairs = TeleportPairs::new();
        let floor = ConcreteBehavior::build(&TileDescriptor::floor(), Position::origin(), &mut pairs);
        assert_eq!(floor, ConcreteBehavior::None);
        assert!(floor.can_enter(&view(ColorType::Red)));

        let color = ConcreteBehavior::build(
            &TileDescriptor::color_match(ColorType::Green),
            Position::origin(),
            &mut pairs,
        );
        assert!(color.requires_clear_tracking());
        assert!(!color.is_cleared());
        assert!(pairs.is_empty());
    }

    #[test]
    fn test_null_spawner_hands_out_unique_handles() {
        let mut spawner = NullSpawner::default();
        let a = spawner.spawn("floor", Position::origin());
        let b = spawner.spawn("floor", Position::new(1, 0));
        assert!(a.is_some());
        assert_ne!(a, b);
    }
}
