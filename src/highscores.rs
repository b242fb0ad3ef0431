//! High score leaderboard
//!
//! Every finished session is recorded; the list is kept sorted by score,
//! highest first. Storage is unbounded, display is truncated by the caller.
//! Persisted as a JSON array of `{"score": n}` objects.

use serde::{Deserialize, Serialize};

use crate::persistence::{KeyValueStore, StorageError};

/// A single leaderboard entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub score: u64,
}

/// Ranked list of past scores
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Leaderboard {
    entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from stored entries, restoring the descending order
    pub fn from_entries(mut entries: Vec<LeaderboardEntry>) -> Self {
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        Self { entries }
    }

    /// Record a score. Returns its rank (1-indexed); ties rank below earlier entries.
    pub fn record(&mut self, score: u64) -> usize {
        let pos = self
            .entries
            .iter()
            .position(|e| score > e.score)
            .unwrap_or(self.entries.len());
        self.entries.insert(pos, LeaderboardEntry { score });
        pos + 1
    }

    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    /// Best `n` entries
    pub fn top(&self, n: usize) -> &[LeaderboardEntry] {
        &self.entries[..n.min(self.entries.len())]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the leaderboard is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }
}

/// Durable home for the leaderboard
pub trait LeaderboardStore {
    /// Stored entries, or empty if nothing usable is stored
    fn load(&self) -> Vec<LeaderboardEntry>;
    /// Replace the stored entries. Failures are logged, never raised.
    fn save(&mut self, entries: &[LeaderboardEntry]);
}

/// `LeaderboardStore` over any key-value backend
#[derive(Debug, Clone)]
pub struct KvLeaderboardStore<K> {
    backend: K,
}

impl<K: KeyValueStore> KvLeaderboardStore<K> {
    /// Storage key, shared with earlier browser builds of the game
    pub const STORAGE_KEY: &'static str = "leaderboard";

    pub fn new(backend: K) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &K {
        &self.backend
    }

    fn try_load(&self) -> Result<Vec<LeaderboardEntry>, StorageError> {
        match self.backend.get_item(Self::STORAGE_KEY)? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Vec::new()),
        }
    }

    fn try_save(&mut self, entries: &[LeaderboardEntry]) -> Result<(), StorageError> {
        let json = serde_json::to_string(entries)?;
        self.backend.set_item(Self::STORAGE_KEY, &json)
    }
}

impl<K: KeyValueStore> LeaderboardStore for KvLeaderboardStore<K> {
    fn load(&self) -> Vec<LeaderboardEntry> {
        match self.try_load() {
            Ok(entries) => {
                log::info!("Loaded {} leaderboard entries", entries.len());
                entries
            }
            Err(e) => {
                log::warn!("Leaderboard unreadable, starting fresh: {}", e);
                Vec::new()
            }
        }
    }

    fn save(&mut self, entries: &[LeaderboardEntry]) {
        match self.try_save(entries) {
            Ok(()) => log::info!("Leaderboard saved ({} entries)", entries.len()),
            Err(e) => log::warn!("Failed to save leaderboard: {}", e),
        }
    }
}

impl<S: LeaderboardStore + ?Sized> LeaderboardStore for Box<S> {
    fn load(&self) -> Vec<LeaderboardEntry> {
        (**self).load()
    }

    fn save(&mut self, entries: &[LeaderboardEntry]) {
        (**self).save(entries)
    }
}

/// Leaderboard row text
pub fn format_entry(entry: &LeaderboardEntry) -> String {
    format!("{} points", entry.score)
}
