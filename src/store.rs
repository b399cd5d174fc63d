//! Progress Store: owns the [`GameProgress`] snapshot and its durable slot.
//!
//! The snapshot is read once when the store opens and written back after every
//! update. Storage problems never reach the player: a missing or unreadable record
//! falls back to the default catalog, and a failed write is logged.

use std::cell::RefCell;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

use crate::achievements::{self, Badge};
use crate::domain::StarRating;
use crate::progress::GameProgress;

/// Fixed key of the persisted progress record.
pub const PROGRESS_KEY: &str = "shibu-kuttan-progress";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to {action} {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("stored progress is not valid JSON: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("failed to encode progress: {0}")]
    Encode(#[source] serde_json::Error),
}

/// A durable key-value slot holding one serialized record.
pub trait ProgressSlot {
    /// Raw record, or `None` when nothing was stored yet.
    fn load(&self) -> Result<Option<String>, StoreError>;
    fn save(&self, record: &str) -> Result<(), StoreError>;
}

/// Slot backed by `<dir>/<key>.json`, written atomically (temp file + rename).
#[derive(Debug, Clone)]
pub struct FileSlot {
    path: PathBuf,
}

impl FileSlot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProgressSlot for FileSlot {
    fn load(&self) -> Result<Option<String>, StoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io { action: "read", path: self.path.clone(), source }),
        }
    }

    fn save(&self, record: &str) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err("create directory", parent))?;
        }
        let temp_path = self.path.with_extension("json.tmp");
        let mut temp = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .map_err(io_err("create", &temp_path))?;
        temp.write_all(record.as_bytes()).map_err(io_err("write", &temp_path))?;
        temp.sync_all().map_err(io_err("sync", &temp_path))?;
        std::fs::rename(&temp_path, &self.path).map_err(io_err("rename", &self.path))?;
        Ok(())
    }
}

fn io_err(action: &'static str, path: &Path) -> impl FnOnce(std::io::Error) -> StoreError {
    let path = path.to_path_buf();
    move |source| StoreError::Io { action, path, source }
}

/// In-memory slot for guest sessions that leave nothing on disk. Clones share the record.
#[derive(Debug, Default, Clone)]
pub struct MemorySlot {
    record: Rc<RefCell<Option<String>>>,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn with_record(record: impl Into<String>) -> Self {
        Self { record: Rc::new(RefCell::new(Some(record.into()))) }
    }

    #[cfg(test)]
    pub fn record(&self) -> Option<String> {
        self.record.borrow().clone()
    }
}

impl ProgressSlot for MemorySlot {
    fn load(&self) -> Result<Option<String>, StoreError> {
        Ok(self.record.borrow().clone())
    }

    fn save(&self, record: &str) -> Result<(), StoreError> {
        *self.record.borrow_mut() = Some(record.to_string());
        Ok(())
    }
}

/// Outcome of one level completion.
#[derive(Debug, Clone)]
pub struct CompletionReport {
    pub progress: GameProgress,
    pub new_badges: Vec<&'static Badge>,
}

/// Exclusive owner of the player's progress.
pub struct ProgressStore {
    progress: GameProgress,
    slot: Box<dyn ProgressSlot>,
}

impl std::fmt::Debug for ProgressStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressStore").field("progress", &self.progress).finish_non_exhaustive()
    }
}

impl ProgressStore {
    /// Read the stored snapshot, falling back to the default catalog.
    #[instrument(level = "info", skip_all)]
    pub fn open(slot: Box<dyn ProgressSlot>) -> Self {
        let progress = match slot.load() {
            Ok(Some(raw)) => match serde_json::from_str::<GameProgress>(&raw).map_err(StoreError::Decode) {
                Ok(p) => {
                    info!(target: "progress", total_stars = p.total_stars, badges = p.badges.len(), "Loaded saved progress");
                    p
                }
                Err(e) => {
                    warn!(target: "progress", error = %e, "Stored progress unreadable; starting from defaults");
                    GameProgress::new()
                }
            },
            Ok(None) => {
                info!(target: "progress", "No saved progress; starting from defaults");
                GameProgress::new()
            }
            Err(e) => {
                warn!(target: "progress", error = %e, "Failed to read saved progress; starting from defaults");
                GameProgress::new()
            }
        };
        Self { progress, slot }
    }

    pub fn snapshot(&self) -> &GameProgress {
        &self.progress
    }

    /// Apply a level result and persist the new snapshot.
    #[instrument(level = "info", skip(self, stars), fields(stars = stars.stars()))]
    pub fn apply_level_result(&mut self, world: &str, level: u32, stars: StarRating) -> &GameProgress {
        if self.progress.world(world).is_none() {
            warn!(target: "progress", %world, "Unknown world; only the global star total changes");
        }
        self.progress = self.progress.with_level_result(world, level, stars.stars());
        self.persist();
        &self.progress
    }

    /// Apply a level result, evaluate badges against the new snapshot and persist.
    pub fn complete_level(&mut self, world: &str, level: u32, stars: StarRating) -> CompletionReport {
        self.apply_level_result(world, level, stars);
        let new_badges = achievements::evaluate(&mut self.progress);
        if !new_badges.is_empty() {
            self.persist();
        }
        CompletionReport { progress: self.progress.clone(), new_badges }
    }

    /// Move the level cursor the player is on.
    pub fn set_current_level(&mut self, level: u32) {
        if self.progress.current_level != level {
            self.progress.current_level = level;
            self.persist();
        }
    }

    fn persist(&self) {
        let result = serde_json::to_string(&self.progress)
            .map_err(StoreError::Encode)
            .and_then(|raw| self.slot.save(&raw));
        match result {
            Ok(()) => debug!(target: "progress", total_stars = self.progress.total_stars, "Progress saved"),
            Err(e) => error!(target: "progress", error = %e, "Failed to save progress"),
        }
    }
}
