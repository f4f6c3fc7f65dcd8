//! # Progress Module
//!
//! Per-stage clear records, star ratings and stage unlocking.
//!
//! Progress is keyed by stage number. Recording a clear only ever improves
//! a record: the cleared flag stays set, stars keep their maximum and the
//! best turn count keeps its minimum.

pub mod store;

pub use store::*;

use crate::game::StageResult;
use crate::{config, RoliceResult, StageInfo};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

fn unplayed_turns() -> u32 {
    u32::MAX
}

/// Best results for one stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageProgress {
    pub stage_id: u32,
    pub is_cleared: bool,
    pub stars: u32,
    /// `u32::MAX` until the stage is cleared
    #[serde(default = "unplayed_turns")]
    pub best_turn_count: u32,
}

impl StageProgress {
    pub fn new(stage_id: u32) -> Self {
        Self {
            stage_id,
            is_cleared: false,
            stars: 0,
            best_turn_count: unplayed_turns(),
        }
    }

    /// Records a clear, keeping the best stars and turn count.
    pub fn update_clear(&mut self, turn_count: u32, stars: u32) {
        self.is_cleared = true;
        self.stars = self.stars.max(stars);
        self.best_turn_count = self.best_turn_count.min(turn_count);
    }

    /// Best turn count, if the stage was ever cleared.
    pub fn best_turns(&self) -> Option<u32> {
        (self.best_turn_count != unplayed_turns()).then_some(self.best_turn_count)
    }
}

/// Saved progress across every stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerProgress {
    pub version: u32,
    #[serde(default)]
    pub stages: BTreeMap<u32, StageProgress>,
}

impl Default for PlayerProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerProgress {
    pub fn new() -> Self {
        Self {
            version: config::PROGRESS_DATA_VERSION,
            stages: BTreeMap::new(),
        }
    }

    /// Record for a stage, created on first access.
    pub fn progress(&mut self, stage_id: u32) -> &mut StageProgress {
        self.stages
            .entry(stage_id)
            .or_insert_with(|| StageProgress::new(stage_id))
    }

    pub fn get(&self, stage_id: u32) -> Option<&StageProgress> {
        self.stages.get(&stage_id)
    }

    pub fn is_stage_cleared(&self, stage_id: u32) -> bool {
        self.get(stage_id).map(|p| p.is_cleared).unwrap_or(false)
    }

    pub fn stage_stars(&self, stage_id: u32) -> u32 {
        self.get(stage_id).map(|p| p.stars).unwrap_or(0)
    }

    pub fn total_stars(&self) -> u32 {
        self.stages.values().map(|p| p.stars).sum()
    }

    pub fn cleared_count(&self) -> usize {
        self.stages.values().filter(|p| p.is_cleared).count()
    }

    /// Serializes progress to pretty JSON.
    pub fn save_to_json(&self) -> RoliceResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Loads progress from JSON.
    pub fn load_from_json(json: &str) -> RoliceResult<Self> {
        let progress: PlayerProgress = serde_json::from_str(json)?;
        if progress.version != config::PROGRESS_DATA_VERSION {
            warn!(
                "Progress data version {} differs from {}",
                progress.version,
                config::PROGRESS_DATA_VERSION
            );
        }
        Ok(progress)
    }
}

/// Player progress bound to a store.
#[derive(Debug)]
pub struct ProgressTracker<S: ProgressStore> {
    store: S,
    progress: PlayerProgress,
}

impl<S: ProgressStore> ProgressTracker<S> {
    /// Loads progress from `store`.
    ///
    /// Missing or unreadable save data starts fresh progress.
    pub fn new(mut store: S) -> Self {
        let progress = match store.load() {
            Ok(Some(progress)) => progress,
            Ok(None) => {
                info!("No saved progress; starting fresh");
                PlayerProgress::new()
            }
            Err(err) => {
                warn!("Failed to load progress ({}); starting fresh", err);
                PlayerProgress::new()
            }
        };
        Self { store, progress }
    }

    pub fn progress(&self) -> &PlayerProgress {
        &self.progress
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Records a clear of `stage` and saves. Returns the stars earned.
    pub fn record_stage_clear(&mut self, stage: &StageInfo, turn_count: u32) -> RoliceResult<u32> {
        let stars = stage.calculate_stars(turn_count);
        self.record(stage.stage_number, turn_count, stars)?;
        Ok(stars)
    }

    /// Records a finished session's result and saves.
    pub fn record_result(&mut self, result: &StageResult) -> RoliceResult<()> {
        self.record(result.stage_number, result.turn_count, result.stars)
    }

    fn record(&mut self, stage_number: u32, turn_count: u32, stars: u32) -> RoliceResult<()> {
        self.progress
            .progress(stage_number)
            .update_clear(turn_count, stars);
        info!(
            "Stage {} cleared in {} turns ({} stars)",
            stage_number, turn_count, stars
        );
        self.save()
    }

    /// Stage 1 is always open; later stages open once the previous one is cleared.
    pub fn is_stage_unlocked(&self, stage_number: u32) -> bool {
        stage_number <= 1 || self.progress.is_stage_cleared(stage_number - 1)
    }

    pub fn is_stage_cleared(&self, stage_number: u32) -> bool {
        self.progress.is_stage_cleared(stage_number)
    }

    pub fn stage_stars(&self, stage_number: u32) -> u32 {
        self.progress.stage_stars(stage_number)
    }

    pub fn save(&mut self) -> RoliceResult<()> {
        self.store.save(&self.progress)
    }

    /// Forgets all progress, including saved data.
    pub fn reset_progress(&mut self) -> RoliceResult<()> {
        self.store.delete()?;
        self.progress = PlayerProgress::new();
        info!("Progress reset");
        Ok(())
    }
}
