//! # Stage Metadata
//!
//! Stage numbering, display names, star ratings and the ordered stage list.

use crate::{config, LevelDescriptor};
use log::warn;
use serde::{Deserialize, Serialize};

/// Per-level metadata shown on the stage select screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageInfo {
    /// 1-based stage number, assigned by the [`StageDatabase`]
    pub stage_number: u32,
    /// Display name; falls back to "Stage N" when empty
    pub display_name: String,
    /// Highest star rating, between 1 and [`config::MAX_STARS`]
    pub max_stars: u32,
    /// Ascending turn thresholds, best rating first
    pub star_thresholds: Vec<u32>,
}

impl Default for StageInfo {
    fn default() -> Self {
        Self {
            stage_number: 0,
            display_name: String::new(),
            max_stars: config::MAX_STARS,
            star_thresholds: config::DEFAULT_STAR_THRESHOLDS.to_vec(),
        }
    }
}

impl StageInfo {
    /// Name shown to the player.
    pub fn display_name(&self) -> String {
        if self.display_name.is_empty() {
            format!("Stage {}", self.stage_number)
        } else {
            self.display_name.clone()
        }
    }

    /// Stars earned for finishing in `turn_count` turns.
    ///
    /// The first threshold the turn count does not exceed decides the
    /// rating. Finishing is always worth at least one star.
    ///
    /// # Examples
    ///
    /// ```
    /// use rolice::StageInfo;
    ///
    /// let stage = StageInfo::default(); // thresholds [10, 15, 20]
    /// assert_eq!(stage.calculate_stars(10), 3);
    /// assert_eq!(stage.calculate_stars(15), 2);
    /// assert_eq!(stage.calculate_stars(99), 1);
    /// ```
    pub fn calculate_stars(&self, turn_count: u32) -> u32 {
        self.star_thresholds
            .iter()
            .position(|threshold| turn_count <= *threshold)
            .map(|index| (self.max_stars as usize).saturating_sub(index).max(1) as u32)
            .unwrap_or(1)
    }

    /// Clamps the star count and regenerates thresholds that do not match it.
    ///
    /// Returns true when anything was changed.
    pub fn validate(&mut self) -> bool {
        let mut changed = false;

        let clamped = self.max_stars.clamp(1, config::MAX_STARS);
        if clamped != self.max_stars {
            self.max_stars = clamped;
            changed = true;
        }

        if self.star_thresholds.len() != self.max_stars as usize {
            warn!(
                "Stage {} has {} star thresholds for {} stars; regenerating",
                self.stage_number,
                self.star_thresholds.len(),
                self.max_stars
            );
            self.star_thresholds = (0..self.max_stars)
                .map(|i| config::STAR_THRESHOLD_BASE + i * config::STAR_THRESHOLD_STEP)
                .collect();
            changed = true;
        }

        changed
    }
}

/// Ordered list of every stage in the game.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageDatabase {
    pub stages: Vec<LevelDescriptor>,
}

impl StageDatabase {
    /// Creates a database and numbers its stages.
    pub fn new(stages: Vec<LevelDescriptor>) -> Self {
        let mut database = Self { stages };
        database.renumber();
        database
    }

    /// Number of stages.
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Looks a stage up by its 1-based number.
    pub fn get_stage(&self, stage_number: u32) -> Option<&LevelDescriptor> {
        let index = (stage_number as usize).checked_sub(1)?;
        self.stages.get(index)
    }

    /// Looks a stage up by its 0-based index.
    pub fn get_stage_by_index(&self, index: usize) -> Option<&LevelDescriptor> {
        self.stages.get(index)
    }

    /// Appends a stage, numbering it after the existing ones.
    pub fn push(&mut self, mut level: LevelDescriptor) -> u32 {
        let stage_number = self.stages.len() as u32 + 1;
        level.stage_info.stage_number = stage_number;
        self.stages.push(level);
        stage_number
    }

    /// Assigns `stage_number = index + 1` to every stage.
    pub fn renumber(&mut self) {
        for (index, level) in self.stages.iter_mut().enumerate() {
            level.stage_info.stage_number = index as u32 + 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_star_calculation_boundaries() {
        let stage = StageInfo {
            star_thresholds: vec![10, 15, 20],
            max_stars: 3,
            ..StageInfo::default()
        };
        assert_eq!(stage.calculate_stars(0), 3);
        assert_eq!(stage.calculate_stars(10), 3);
        assert_eq!(stage.calculate_stars(11), 2);
        assert_eq!(stage.calculate_stars(15), 2);
        assert_eq!(stage.calculate_stars(20), 1);
        assert_eq!(stage.calculate_stars(25), 1);
    }

    #[test]
    fn test_star_calculation_without_thresholds() {
        let stage = StageInfo {
            star_thresholds: Vec::new(),
            ..StageInfo::default()
        };
        assert_eq!(stage.calculate_stars(1), 1);
    }

    #[test]
    fn test_display_name_fallback() {
        let mut stage = StageInfo {
            stage_number: 4,
            ..StageInfo::default()
        };
        assert_eq!(stage.display_name(), "Stage 4");
        stage.display_name = "Crossroads".to_string();
        assert_eq!(stage.display_name(), "Crossroads");
    }

    #[test]
    fn test_validate_regenerates_thresholds() {
        let mut stage = StageInfo {
            max_stars: 7,
            star_thresholds: vec![3],
            ..StageInfo::default()
        };
        assert!(stage.validate());
        assert_eq!(stage.max_stars, 3);
        assert_eq!(stage.star_thresholds, vec![10, 15, 20]);
        assert!(!stage.validate());

        let mut single = StageInfo {
            max_stars: 0,
            ..StageInfo::default()
        };
        assert!(single.validate());
        assert_eq!(single.max_stars, 1);
        assert_eq!(single.star_thresholds, vec![10]);
    }

    #[test]
    fn test_stage_database_numbering() {
        let mut database = StageDatabase::new(vec![
            LevelDescriptor::new(1, 1),
            LevelDescriptor::new(2, 2),
        ]);
        assert_eq!(database.stage_count(), 2);
        assert_eq!(database.get_stage(2).unwrap().width, 2);
        assert_eq!(database.get_stage(2).unwrap().stage_info.stage_number, 2);
        assert!(database.get_stage(0).is_none());
        assert!(database.get_stage(3).is_none());
        assert_eq!(database.get_stage_by_index(0).unwrap().width, 1);

        assert_eq!(database.push(LevelDescriptor::tutorial()), 3);
        assert_eq!(database.get_stage(3).unwrap().name, "tutorial");
    }
}
