//! Local daily leaderboard.
//!
//! Entries live as one JSON array under `romaji_leaderboard`; the date the
//! array belongs to is kept under `romaji_leaderboard_date`. The board is
//! emptied the first time it is touched on a new day. "Today" is whatever
//! string the caller passes, so the browser and tests decide the calendar.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_LEADERBOARD_CAPACITY;

pub const LEADERBOARD_KEY: &str = "romaji_leaderboard";
pub const LEADERBOARD_DATE_KEY: &str = "romaji_leaderboard_date";
pub const WELCOME_KEY: &str = "romaji_welcome_seen";

#[derive(Debug, thiserror::Error)]
pub enum LeaderboardError {
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Leaderboard JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Username must not be empty")]
    EmptyUsername,
}

/// Minimal string key/value persistence.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, LeaderboardError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), LeaderboardError>;
}

/// In-process store for native builds and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, LeaderboardError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), LeaderboardError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub username: String,
    pub score: u32,
    /// Milliseconds since the Unix epoch.
    pub timestamp: f64,
    pub mode: String,
    /// Seconds from first correct answer to the end of the deck.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_taken: Option<u64>,
}

#[derive(Debug)]
pub struct Leaderboard<S: KeyValueStore> {
    store: S,
    capacity: usize,
}

impl<S: KeyValueStore> Leaderboard<S> {
    pub fn new(store: S) -> Self {
        Self::with_capacity(store, DEFAULT_LEADERBOARD_CAPACITY)
    }

    pub fn with_capacity(store: S, capacity: usize) -> Self {
        Self { store, capacity }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Empty the board when its date differs from `today`. Returns whether a
    /// reset happened.
    pub fn reset_if_new_day(&mut self, today: &str) -> Result<bool, LeaderboardError> {
        let last = self.store.get(LEADERBOARD_DATE_KEY)?;
        if last.as_deref() == Some(today) {
            return Ok(false);
        }
        self.store.set(LEADERBOARD_KEY, "[]")?;
        self.store.set(LEADERBOARD_DATE_KEY, today)?;
        tracing::info!(today, "leaderboard reset for new day");
        Ok(true)
    }

    /// Today's entries, best first.
    pub fn entries(&mut self, today: &str) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
        self.reset_if_new_day(today)?;
        let Some(raw) = self.store.get(LEADERBOARD_KEY)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(&raw) {
            Ok(entries) => Ok(entries),
            Err(err) => {
                tracing::warn!(%err, "unreadable leaderboard, starting over");
                self.store.set(LEADERBOARD_KEY, "[]")?;
                Ok(Vec::new())
            }
        }
    }

    /// Record `entry` and return its rank (0 = best) if it made the cut.
    ///
    /// Ties rank below entries already on the board.
    pub fn submit(
        &mut self,
        mut entry: LeaderboardEntry,
        today: &str,
    ) -> Result<Option<usize>, LeaderboardError> {
        let username = entry.username.trim();
        if username.is_empty() {
            return Err(LeaderboardError::EmptyUsername);
        }
        entry.username = username.to_string();

        let mut entries = self.entries(today)?;
        let rank = entries.iter().filter(|e| e.score >= entry.score).count();
        entries.push(entry);
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        entries.truncate(self.capacity);
        self.store.set(LEADERBOARD_KEY, &serde_json::to_string(&entries)?)?;

        let rank = (rank < self.capacity).then_some(rank);
        tracing::info!(?rank, size = entries.len(), "leaderboard entry submitted");
        Ok(rank)
    }
}

/// Whether the onboarding screens were already dismissed.
pub fn welcome_seen(store: &impl KeyValueStore) -> Result<bool, LeaderboardError> {
    Ok(store.get(WELCOME_KEY)?.as_deref() == Some("true"))
}

pub fn mark_welcome_seen(store: &mut impl KeyValueStore) -> Result<(), LeaderboardError> {
    store.set(WELCOME_KEY, "true")
}

/// `m:ss`, or `--` when no time was recorded.
pub fn format_time(seconds: Option<u64>) -> String {
    match seconds {
        None | Some(0) => "--".to_string(),
        Some(s) => format!("{}:{:02}", s / 60, s % 60),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, score: u32) -> LeaderboardEntry {
        LeaderboardEntry {
            username: name.to_string(),
            score,
            timestamp: 1_700_000_000_000.0,
            mode: "recognition".to_string(),
            time_taken: None,
        }
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(None), "--");
        assert_eq!(format_time(Some(0)), "--");
        assert_eq!(format_time(Some(5)), "0:05");
        assert_eq!(format_time(Some(125)), "2:05");
        assert_eq!(format_time(Some(600)), "10:00");
    }

    #[test]
    fn test_entry_json_shape() {
        let mut e = entry("kai", 15);
        let json = serde_json::to_string(&e).unwrap();
        assert!(!json.contains("timeTaken"));
        e.time_taken = Some(42);
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["timeTaken"], 42);
    }

    #[test]
    fn test_corrupt_blob_is_reset() {
        let mut store = MemoryStore::new();
        store.set(LEADERBOARD_DATE_KEY, "Mon Jan 01 2024").unwrap();
        store.set(LEADERBOARD_KEY, "{oops").unwrap();
        let mut board = Leaderboard::new(store);
        assert!(board.entries("Mon Jan 01 2024").unwrap().is_empty());
        assert_eq!(
            board.store().get(LEADERBOARD_KEY).unwrap().as_deref(),
            Some("[]")
        );
    }

    #[test]
    fn test_welcome_flag() {
        let mut store = MemoryStore::new();
        assert!(!welcome_seen(&store).unwrap());
        mark_welcome_seen(&mut store).unwrap();
        assert!(welcome_seen(&store).unwrap());
    }
}
