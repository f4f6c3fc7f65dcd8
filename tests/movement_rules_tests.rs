//! End-to-end tests of moves, tile behaviors and the rule state machine.

use rolice::{
    DiceFaces, Direction, GameEvent, GameSession, LevelDescriptor, LevelRules, LoseReason,
    MoveOutcome, MoveRejection, Position, RoliceResult, RulePhase,
};

fn session(rows: &[&str], rules: LevelRules) -> RoliceResult<GameSession> {
    let mut level = LevelDescriptor::from_ascii(rows)?;
    level.rules = rules;
    GameSession::new(level)
}

#[test]
fn test_blocked_and_empty_targets_are_rejected() -> RoliceResult<()> {
    let mut session = session(&["#S ", " R "], LevelRules::unlimited())?;
    let faces = *session.pawn().faces();

    for (direction, rejection) in [
        (Direction::Left, MoveRejection::Blocked(Position::new(0, 0))),
        (Direction::Right, MoveRejection::NoTile(Position::new(2, 0))),
        (Direction::Down, MoveRejection::NoTile(Position::new(1, -1))),
    ] {
        assert_eq!(session.move_pawn(direction), MoveOutcome::Rejected(rejection));
        assert_eq!(session.pawn().position(), Position::new(1, 0));
        assert_eq!(*session.pawn().faces(), faces);
    }
    assert_eq!(session.rules().current_turn(), 0);
    assert!(session.events_mut().history().is_empty());

    Ok(())
}

#[test]
fn test_busy_pawn_is_rejected() -> RoliceResult<()> {
    let mut session = session(&["S.."], LevelRules::unlimited())?;
    session.pawn_mut().begin_animation();
    assert_eq!(
        session.move_pawn(Direction::Right),
        MoveOutcome::Rejected(MoveRejection::Busy)
    );
    assert_eq!(session.pawn().position(), Position::new(0, 0));

    session.pawn_mut().finish_animation();
    assert!(session.move_pawn(Direction::Right).is_moved());
    Ok(())
}

#[test]
fn test_turn_limit_of_five() -> RoliceResult<()> {
    // Rolling back and forth on plain floor never clears anything
    let mut session = session(&["S.R"], LevelRules::turn_limit(5))?;
    let moves = [
        Direction::Right,
        Direction::Left,
        Direction::Right,
        Direction::Left,
        Direction::Right,
    ];
    for direction in moves {
        assert!(session.move_pawn(direction).is_moved());
    }

    assert_eq!(session.phase(), RulePhase::Lost);
    assert_eq!(session.rules().current_turn(), 5);
    assert_eq!(
        session.events_mut().history().last(),
        Some(&GameEvent::GameLose(LoseReason::TurnLimit))
    );

    assert_eq!(
        session.move_pawn(Direction::Left),
        MoveOutcome::Rejected(MoveRejection::GameOver)
    );
    assert_eq!(session.rules().current_turn(), 5);
    Ok(())
}

#[test]
fn test_lose_preempts_win_on_final_turn() -> RoliceResult<()> {
    // Right then up clears both tiles on exactly the second turn
    let mut level = LevelDescriptor::tutorial();
    level.rules = LevelRules::turn_limit(2);
    let mut session = GameSession::new(level)?;

    session.move_pawn(Direction::Right);
    session.move_pawn(Direction::Up);

    let events = session.events_mut().drain();
    assert!(events.contains(&GameEvent::LevelCompleted));
    assert!(events.contains(&GameEvent::GameLose(LoseReason::TurnLimit)));
    assert!(!events.contains(&GameEvent::GameWin));
    assert_eq!(session.phase(), RulePhase::Lost);
    Ok(())
}

#[test]
fn test_win_with_turns_to_spare() -> RoliceResult<()> {
    let mut level = LevelDescriptor::tutorial();
    level.rules = LevelRules::turn_limit(3);
    let mut session = GameSession::new(level)?;

    session.move_pawn(Direction::Right);
    session.move_pawn(Direction::Up);
    assert_eq!(session.phase(), RulePhase::Won);
    assert_eq!(session.stage_result().map(|r| r.turn_count), Some(2));
    Ok(())
}

#[test]
fn test_last_clear_completes_level_once() -> RoliceResult<()> {
    let mut session = session(&["SP."], LevelRules::unlimited())?;

    session.move_pawn(Direction::Right);
    assert_eq!(session.level().remaining_color_tiles(), 0);
    assert_eq!(session.phase(), RulePhase::Won);
    let completed = session
        .events_mut()
        .drain()
        .into_iter()
        .filter(|event| *event == GameEvent::LevelCompleted)
        .count();
    assert_eq!(completed, 1);
    Ok(())
}

#[test]
fn test_wrong_color_does_not_clear() -> RoliceResult<()> {
    // Rolled right, the standard die shows purple, not red
    let mut session = session(&["SR."], LevelRules::unlimited())?;
    session.move_pawn(Direction::Right);
    assert!(session.level().is_color_tile_pending(Position::new(1, 0)));
    assert_eq!(session.phase(), RulePhase::Playing);
    Ok(())
}

#[test]
fn test_teleport_relocates_without_entering() -> RoliceResult<()> {
    let mut session = session(&["S1.", "P.1"], LevelRules::unlimited())?;
    let report = match session.move_pawn(Direction::Right) {
        MoveOutcome::Moved(report) => report,
        MoveOutcome::Rejected(rejection) => panic!("move rejected: {}", rejection),
    };

    assert_eq!(report.teleported_to, Some(Position::new(2, 1)));
    assert_eq!(session.pawn().position(), Position::new(2, 1));
    assert_eq!(*session.pawn().faces(), DiceFaces::standard().rotate(Direction::Right));
    assert!(report.events.contains(&GameEvent::MoveCompleted(Position::new(2, 1))));

    // Rolling off the destination teleport and back onto it does teleport
    session.move_pawn(Direction::Left);
    session.move_pawn(Direction::Right);
    assert_eq!(session.pawn().position(), Position::new(1, 0));
    Ok(())
}

#[test]
fn test_teleport_landing_on_matching_tile_skips_clear() -> RoliceResult<()> {
    let mut level = LevelDescriptor::from_ascii(&["S1P"])?;
    level.rules = LevelRules::unlimited();
    let mut session = GameSession::new(level)?;

    // Pair the teleport with the purple tile so the landing matches
    let mut level_state = session.level().clone();
    level_state.register_teleport_pair("TP_1", Position::new(2, 0));
    let mut pawn = session.pawn().clone();
    let rules = session.rules().clone();
    let outcome = pawn.try_move(Direction::Right, &mut level_state, &rules);

    assert!(outcome.is_moved());
    assert_eq!(pawn.position(), Position::new(2, 0));
    assert_eq!(pawn.bottom_color(), rolice::ColorType::Purple);
    assert!(level_state.is_color_tile_pending(Position::new(2, 0)));

    // The session's own copies are untouched
    assert_eq!(session.pawn().position(), Position::new(0, 0));
    assert!(session.move_pawn(Direction::Up).report().is_none());
    Ok(())
}

#[test]
fn test_time_limit_ends_game() -> RoliceResult<()> {
    let mut session = session(&["S.R"], LevelRules::time_limit(5.0))?;
    for _ in 0..4 {
        assert!(session.tick(1.0).is_empty());
    }
    assert_eq!(session.rules().remaining_time(), Some(1.0));
    assert_eq!(
        session.tick(1.0),
        vec![GameEvent::GameLose(LoseReason::TimeLimit)]
    );
    assert!(session.is_game_over());
    assert!(session.tick(1.0).is_empty());
    Ok(())
}
