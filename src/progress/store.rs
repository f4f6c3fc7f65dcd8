//! # Progress Stores
//!
//! Where player progress lives between runs.

use crate::progress::PlayerProgress;
use crate::{config, RoliceResult};
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

/// Persistence backend for [`PlayerProgress`].
pub trait ProgressStore {
    /// Loads saved progress, or None when nothing has been saved.
    fn load(&mut self) -> RoliceResult<Option<PlayerProgress>>;

    fn save(&mut self, progress: &PlayerProgress) -> RoliceResult<()>;

    fn has_save_data(&self) -> bool;

    /// Removes saved progress. Deleting nothing is not an error.
    fn delete(&mut self) -> RoliceResult<()>;
}

/// Store that keeps progress in memory only.
#[derive(Debug, Clone, Default)]
pub struct MemoryProgressStore {
    saved: Option<PlayerProgress>,
}

impl MemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressStore for MemoryProgressStore {
    fn load(&mut self) -> RoliceResult<Option<PlayerProgress>> {
        Ok(self.saved.clone())
    }

    fn save(&mut self, progress: &PlayerProgress) -> RoliceResult<()> {
        self.saved = Some(progress.clone());
        Ok(())
    }

    fn has_save_data(&self) -> bool {
        self.saved.is_some()
    }

    fn delete(&mut self) -> RoliceResult<()> {
        self.saved = None;
        Ok(())
    }
}

/// Store backed by a pretty-printed JSON file.
#[derive(Debug, Clone)]
pub struct JsonProgressStore {
    path: PathBuf,
}

impl JsonProgressStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store using the default file name inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(config::PROGRESS_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProgressStore for JsonProgressStore {
    fn load(&mut self) -> RoliceResult<Option<PlayerProgress>> {
        if !self.path.exists() {
            debug!("No progress file at {}", self.path.display());
            return Ok(None);
        }
        let json = fs::read_to_string(&self.path)?;
        let progress = PlayerProgress::load_from_json(&json)?;
        Ok(Some(progress))
    }

    fn save(&mut self, progress: &PlayerProgress) -> RoliceResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, progress.save_to_json()?)?;
        debug!("Saved progress to {}", self.path.display());
        Ok(())
    }

    fn has_save_data(&self) -> bool {
        self.path.is_file()
    }

    fn delete(&mut self) -> RoliceResult<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
            info!("Deleted progress file {}", self.path.display());
        }
        Ok(())
    }
}
