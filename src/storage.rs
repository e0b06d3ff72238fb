//! High score persistence.
//!
//! The browser build keeps the best score in `localStorage`; tests and hosts
//! without a window use [`MemoryStore`]. Reads never fail the game: a missing
//! or unreadable value counts as a high score of 0.

use thiserror::Error;

/// localStorage key holding the best score.
pub const HIGH_SCORE_KEY: &str = "highScore";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("browser storage is unavailable")]
    Unavailable,
    #[error("stored high score {0:?} is not a number")]
    Malformed(String),
    #[error("storage rejected write: {0}")]
    Write(String),
}

pub trait HighScoreStore {
    /// Stored score, `Ok(None)` when nothing has been saved yet.
    fn load(&self) -> Result<Option<u32>, StorageError>;
    fn save(&mut self, score: u32) -> Result<(), StorageError>;
}

/// Read the stored score, degrading to 0 when it is absent or unreadable.
pub fn load_or_default<S: HighScoreStore + ?Sized>(store: &S) -> u32 {
    match store.load() {
        Ok(score) => score.unwrap_or(0),
        Err(e) => {
            log::warn!("ignoring stored high score: {e}");
            0
        }
    }
}

pub fn parse_high_score(raw: &str) -> Result<u32, StorageError> {
    raw.trim()
        .parse()
        .map_err(|_| StorageError::Malformed(raw.to_string()))
}

/// In-memory store. Holds the raw text the way localStorage does so that
/// malformed values can be exercised.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    raw: Option<String>,
    writes: u32,
}

impl MemoryStore {
    pub fn with_score(score: u32) -> Self {
        Self {
            raw: Some(score.to_string()),
            writes: 0,
        }
    }

    pub fn with_raw(raw: &str) -> Self {
        Self {
            raw: Some(raw.to_string()),
            writes: 0,
        }
    }

    /// Number of successful `save` calls.
    pub fn writes(&self) -> u32 {
        self.writes
    }
}

impl HighScoreStore for MemoryStore {
    fn load(&self) -> Result<Option<u32>, StorageError> {
        self.raw.as_deref().map(parse_high_score).transpose()
    }

    fn save(&mut self, score: u32) -> Result<(), StorageError> {
        self.raw = Some(score.to_string());
        self.writes += 1;
        Ok(())
    }
}

/// `window.localStorage` under [`HIGH_SCORE_KEY`] (or a custom key).
#[derive(Clone, Debug)]
pub struct LocalStore {
    key: String,
}

impl Default for LocalStore {
    fn default() -> Self {
        Self::new(HIGH_SCORE_KEY)
    }
}

impl LocalStore {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
        }
    }

    fn storage() -> Result<web_sys::Storage, StorageError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok().flatten())
            .ok_or(StorageError::Unavailable)
    }
}

impl HighScoreStore for LocalStore {
    fn load(&self) -> Result<Option<u32>, StorageError> {
        let storage = Self::storage()?;
        match storage.get_item(&self.key) {
            Ok(Some(raw)) => parse_high_score(&raw).map(Some),
            Ok(None) => Ok(None),
            Err(_) => Err(StorageError::Unavailable),
        }
    }

    fn save(&mut self, score: u32) -> Result<(), StorageError> {
        Self::storage()?
            .set_item(&self.key, &score.to_string())
            .map_err(|e| StorageError::Write(format!("{e:?}")))
    }
}
