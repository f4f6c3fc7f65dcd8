//! Integration tests for stage progress and its JSON persistence.

use rolice::{
    Direction, GameSession, JsonProgressStore, LevelDescriptor, ProgressTracker, RoliceError,
    RoliceResult, StageDatabase,
};
use tempfile::TempDir;

fn stage_database() -> RoliceResult<StageDatabase> {
    let mut second = LevelDescriptor::from_ascii(&["SP"])?;
    second.name = "one_step".to_string();
    Ok(StageDatabase::new(vec![LevelDescriptor::tutorial(), second]))
}

fn play(level: &LevelDescriptor, moves: &[Direction]) -> RoliceResult<GameSession> {
    let mut session = GameSession::new(level.clone())?;
    for direction in moves {
        session.move_pawn(*direction);
    }
    Ok(session)
}

#[test]
fn test_clearing_stages_unlocks_the_next() -> RoliceResult<()> {
    let dir = TempDir::new()?;
    let database = stage_database()?;
    let mut tracker = ProgressTracker::new(JsonProgressStore::in_dir(dir.path()));

    assert!(tracker.is_stage_unlocked(1));
    assert!(!tracker.is_stage_unlocked(2));

    let tutorial = database
        .get_stage(1)
        .ok_or_else(|| RoliceError::InvalidState("missing stage 1".to_string()))?;
    let session = play(tutorial, &[Direction::Right, Direction::Up])?;
    let result = session
        .stage_result()
        .ok_or_else(|| RoliceError::InvalidState("stage 1 not won".to_string()))?;
    assert_eq!(result.stage_number, 1);
    assert_eq!(result.turn_count, 2);
    assert_eq!(result.stars, 3);

    tracker.record_result(&result)?;
    assert!(tracker.is_stage_unlocked(2));
    assert!(!tracker.is_stage_unlocked(3));

    let second = database
        .get_stage(2)
        .ok_or_else(|| RoliceError::InvalidState("missing stage 2".to_string()))?;
    let session = play(second, &[Direction::Right])?;
    let result = session
        .stage_result()
        .ok_or_else(|| RoliceError::InvalidState("stage 2 not won".to_string()))?;
    tracker.record_result(&result)?;

    assert!(tracker.is_stage_unlocked(3));
    assert_eq!(tracker.progress().total_stars(), 6);
    Ok(())
}

#[test]
fn test_lost_session_has_no_result() -> RoliceResult<()> {
    let mut level = LevelDescriptor::tutorial();
    level.rules = rolice::LevelRules::turn_limit(1);
    let session = play(&level, &[Direction::Right])?;
    assert!(session.is_game_over());
    assert!(session.stage_result().is_none());
    Ok(())
}

#[test]
fn test_progress_survives_reopening() -> RoliceResult<()> {
    let dir = TempDir::new()?;
    let database = stage_database()?;

    {
        let mut tracker = ProgressTracker::new(JsonProgressStore::in_dir(dir.path()));
        let stage = &database.stages[0].stage_info;
        assert_eq!(tracker.record_stage_clear(stage, 12)?, 2);
        tracker.record_stage_clear(stage, 25)?;
    }

    let tracker = ProgressTracker::new(JsonProgressStore::in_dir(dir.path()));
    assert!(tracker.is_stage_cleared(1));
    assert_eq!(tracker.stage_stars(1), 2);
    let record = tracker
        .progress()
        .get(1)
        .ok_or_else(|| RoliceError::InvalidState("no record for stage 1".to_string()))?;
    assert_eq!(record.best_turns(), Some(12));
    Ok(())
}

#[test]
fn test_corrupt_save_starts_fresh() -> RoliceResult<()> {
    let dir = TempDir::new()?;
    let store = JsonProgressStore::in_dir(dir.path());
    std::fs::write(store.path(), "not json at all")?;

    let mut tracker = ProgressTracker::new(store);
    assert_eq!(tracker.progress().cleared_count(), 0);

    tracker.reset_progress()?;
    assert!(!dir.path().join(rolice::config::PROGRESS_FILE_NAME).exists());
    Ok(())
}
