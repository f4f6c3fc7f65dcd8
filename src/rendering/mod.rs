//! # Rendering Module
//!
//! Plain-text rendering of the board for the terminal front end.
//!
//! Rows are printed top to bottom, so the highest `y` comes first.

use crate::game::{GameSession, LevelState, Pawn, Position, RulePhase, RuntimeTile};
use crate::level::BehaviorDescriptor;

/// Glyph drawn for the pawn.
pub const PAWN_GLYPH: char = '@';

/// Returns the glyph for a runtime tile.
///
/// Pending color tiles use their uppercase map symbol and cleared ones the
/// lowercase symbol; teleports show the last character of their pair ID.
pub fn tile_glyph(tile: &RuntimeTile) -> char {
    if !tile.can_enter() {
        return '#';
    }
    match &tile.descriptor.behavior {
        BehaviorDescriptor::ColorMatch => {
            let symbol = tile
                .descriptor
                .color
                .and_then(|color| color.map_symbol())
                .unwrap_or('?');
            if tile.is_cleared() {
                symbol.to_ascii_lowercase()
            } else {
                symbol
            }
        }
        BehaviorDescriptor::Teleport { pair_id } => pair_id.chars().last().unwrap_or('T'),
        BehaviorDescriptor::None => '.',
    }
}

/// Draws the board with the pawn on it.
pub fn render_board(level: &LevelState, pawn: &Pawn) -> String {
    let (width, height) = level.size();
    let mut board = String::new();

    for y in (0..height).rev() {
        for x in 0..width {
            let pos = Position::new(x, y);
            let glyph = if pos == pawn.position() {
                PAWN_GLYPH
            } else {
                level.get_runtime_tile(pos).map(tile_glyph).unwrap_or(' ')
            };
            board.push(glyph);
        }
        board.push('\n');
    }
    board
}

/// One-line status: turns, time, remaining tiles and the die's faces.
pub fn render_status(session: &GameSession) -> String {
    let rules = session.rules();
    let mut status = match rules.remaining_turns() {
        Some(left) => format!("Turn {} ({} left)", rules.current_turn(), left),
        None => format!("Turn {}", rules.current_turn()),
    };
    if let Some(left) = rules.remaining_time() {
        status.push_str(&format!(" | {:.1}s left", left));
    }

    let faces = session.pawn().faces();
    status.push_str(&format!(
        " | {} color tile(s) remaining | bottom {} top {}",
        session.level().remaining_color_tiles(),
        faces.bottom_color(),
        faces.top_color()
    ));

    match session.phase() {
        RulePhase::Won => status.push_str(" | CLEAR"),
        RulePhase::Lost => status.push_str(" | GAME OVER"),
        RulePhase::Playing | RulePhase::Uninitialized => {}
    }
    status
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Direction, LevelDescriptor};

    #[test]
    fn test_render_board_puts_high_rows_first() {
        let session = GameSession::new(LevelDescriptor::tutorial()).unwrap();
        let board = render_board(session.level(), session.pawn());
        assert_eq!(board, "...\n#G.\n@P.\n");
    }

    #[test]
    fn test_cleared_tiles_render_lowercase() {
        let mut session = GameSession::new(LevelDescriptor::tutorial()).unwrap();
        session.move_pawn(Direction::Right);
        session.move_pawn(Direction::Right);
        let board = render_board(session.level(), session.pawn());
        assert_eq!(board, "...\n#G.\n.p@\n");
    }

    #[test]
    fn test_teleport_glyph_and_status() {
        let session = GameSession::new(LevelDescriptor::from_ascii(&["S1R1"]).unwrap()).unwrap();
        let board = render_board(session.level(), session.pawn());
        assert_eq!(board, "@1R1\n");

        let status = render_status(&session);
        assert!(status.starts_with("Turn 0 (10 left)"));
        assert!(status.contains("1 color tile(s) remaining"));
        assert!(status.contains("bottom blue"));
    }

    #[test]
    fn test_status_with_time_limit_and_game_over() {
        let mut level = LevelDescriptor::tutorial();
        level.rules = crate::LevelRules::time_limit(2.0);
        let mut session = GameSession::new(level).unwrap();
        assert_eq!(
            render_status(&session),
            "Turn 0 | 2.0s left | 2 color tile(s) remaining | bottom blue top red"
        );

        session.tick(2.0);
        assert!(render_status(&session).ends_with(" | GAME OVER"));
    }
}
