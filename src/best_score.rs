//! Best score storage
//!
//! The engine only needs to read and replace a single number. Where it lives
//! is up to the host: memory for tests and embedding, a JSON file for the
//! native binary.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Where the all-time best score is kept
pub trait BestScoreStore {
    fn get(&self) -> u64;
    fn set(&mut self, score: u64);
}

/// Best score held for the lifetime of the process
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryBestScore {
    best: u64,
}

impl MemoryBestScore {
    pub fn new(best: u64) -> Self {
        Self { best }
    }
}

impl BestScoreStore for MemoryBestScore {
    fn get(&self) -> u64 {
        self.best
    }

    fn set(&mut self, score: u64) {
        self.best = score;
    }
}

/// On-disk record
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
struct BestScoreRecord {
    best: u64,
}

/// Best score persisted as a small JSON document
#[derive(Debug, Clone)]
pub struct JsonFileBestScore {
    path: PathBuf,
    best: u64,
}

impl JsonFileBestScore {
    /// Open the store, starting from 0 if the file is missing or unreadable
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let best = Self::load(&path);
        Self { path, best }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(path: &Path) -> u64 {
        if let Ok(json) = fs::read_to_string(path) {
            match serde_json::from_str::<BestScoreRecord>(&json) {
                Ok(record) => {
                    log::info!("Loaded best score {} from {}", record.best, path.display());
                    return record.best;
                }
                Err(e) => log::warn!("Ignoring unreadable best score file {}: {}", path.display(), e),
            }
        } else {
            log::info!("No best score found, starting fresh");
        }
        0
    }

    fn save(&self) {
        let record = BestScoreRecord { best: self.best };
        match serde_json::to_string(&record) {
            Ok(json) => {
                if let Err(e) = fs::write(&self.path, json) {
                    log::warn!("Failed to save best score to {}: {}", self.path.display(), e);
                } else {
                    log::info!("Best score saved ({})", self.best);
                }
            }
            Err(e) => log::warn!("Failed to encode best score: {}", e),
        }
    }
}

impl BestScoreStore for JsonFileBestScore {
    fn get(&self) -> u64 {
        self.best
    }

    fn set(&mut self, score: u64) {
        self.best = score;
        self.save();
    }
}
