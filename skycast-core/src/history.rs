//! Recent searches and last-city bookkeeping, persisted as a small JSON file.
//!
//! Persistence is best effort: a missing or unreadable file reads as empty and
//! write failures are logged, never returned.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

/// Maximum number of cities kept in the history.
pub const HISTORY_LIMIT: usize = 5;

/// On-disk shape of the state file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    #[serde(default)]
    pub history: Vec<String>,
    #[serde(default)]
    pub last_city: Option<String>,
}

/// Keyed read/write access to the state file.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current contents, or empty state when absent or corrupt.
    pub fn read(&self) -> PersistedState {
        match self.try_read() {
            Ok(state) => state,
            Err(e) => {
                warn!(path = %self.path.display(), error = %format!("{e:#}"), "ignoring unreadable state file");
                PersistedState::default()
            }
        }
    }

    fn try_read(&self) -> Result<PersistedState> {
        if !self.path.exists() {
            return Ok(PersistedState::default());
        }

        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read state file: {}", self.path.display()))?;

        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse state file: {}", self.path.display()))
    }

    fn write(&self, state: &PersistedState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create state directory: {}", parent.display())
            })?;
        }

        let json = serde_json::to_string_pretty(state).context("Failed to serialize state")?;

        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write state file: {}", self.path.display()))
    }

    /// Read-modify-write a single key, logging any failure.
    fn update(&self, apply: impl FnOnce(&mut PersistedState)) {
        let mut state = self.read();
        apply(&mut state);
        if let Err(e) = self.write(&state) {
            warn!(error = %format!("{e:#}"), "failed to persist state");
        }
    }

    pub fn save_history(&self, history: &[String]) {
        self.update(|state| state.history = history.to_vec());
    }

    pub fn last_city(&self) -> Option<String> {
        self.read().last_city.filter(|c| !c.trim().is_empty())
    }

    pub fn save_last_city(&self, city: &str) {
        self.update(|state| state.last_city = Some(city.to_string()));
    }
}

/// Most-recent-first list of distinct city names.
#[derive(Debug, Clone)]
pub struct SearchHistory {
    entries: Vec<String>,
    store: StateStore,
}

impl SearchHistory {
    /// Restore the history persisted in `store`.
    pub fn load(store: StateStore) -> Self {
        let mut entries = Vec::new();
        // Re-apply the rules so a hand-edited file can't break them.
        for city in store.read().history.iter().rev() {
            push_recent(&mut entries, city);
        }
        debug!(count = entries.len(), "search history loaded");

        Self { entries, store }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Move `city` to the front, dropping case-insensitive duplicates, and persist.
    pub fn record(&mut self, city: &str) {
        if push_recent(&mut self.entries, city) {
            self.store.save_history(&self.entries);
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.store.save_history(&self.entries);
    }
}

/// Returns false when `city` is blank and nothing changed.
fn push_recent(entries: &mut Vec<String>, city: &str) -> bool {
    let city = city.trim();
    if city.is_empty() {
        return false;
    }

    let key = city.to_lowercase();
    entries.retain(|c| c.to_lowercase() != key);
    entries.insert(0, city.to_string());
    entries.truncate(HISTORY_LIMIT);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, StateStore) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = StateStore::new(dir.path().join("state").join("state.json"));
        (dir, store)
    }

    #[test]
    fn missing_file_loads_empty() {
        let (_dir, store) = store();
        let history = SearchHistory::load(store);
        assert!(history.is_empty());
    }

    #[test]
    fn duplicate_in_other_case_keeps_latest_form() {
        let (_dir, store) = store();
        let mut history = SearchHistory::load(store);

        history.record("Paris");
        history.record("PARIS");

        assert_eq!(history.entries(), ["PARIS"]);
    }

    #[test]
    fn keeps_only_five_most_recent() {
        let (_dir, store) = store();
        let mut history = SearchHistory::load(store);

        for city in ["Oslo", "Rome", "Lima", "Cairo", "Tokyo", "Quito"] {
            history.record(city);
        }

        assert_eq!(history.entries(), ["Quito", "Tokyo", "Cairo", "Lima", "Rome"]);
    }

    #[test]
    fn revisited_city_moves_to_front() {
        let (_dir, store) = store();
        let mut history = SearchHistory::load(store);

        for city in ["Oslo", "Rome", "Lima", "oslo"] {
            history.record(city);
        }

        assert_eq!(history.entries(), ["oslo", "Lima", "Rome"]);
    }

    #[test]
    fn survives_restart() {
        let (_dir, store) = store();

        let mut history = SearchHistory::load(store.clone());
        history.record("Nairobi");
        history.record("Hanoi");
        drop(history);

        let restored = SearchHistory::load(store);
        assert_eq!(restored.entries().first().map(String::as_str), Some("Hanoi"));
        assert_eq!(restored.entries(), ["Hanoi", "Nairobi"]);
    }

    #[test]
    fn clear_empties_persisted_list() {
        let (_dir, store) = store();

        let mut history = SearchHistory::load(store.clone());
        history.record("Nairobi");
        history.clear();

        assert!(history.is_empty());
        assert!(SearchHistory::load(store.clone()).is_empty());
        assert!(store.read().history.is_empty());
    }

    #[test]
    fn blank_city_is_ignored() {
        let (_dir, store) = store();
        let mut history = SearchHistory::load(store.clone());

        history.record("   ");

        assert!(history.is_empty());
        assert!(!store.path().exists());
    }

    #[test]
    fn corrupt_file_reads_as_empty() {
        let (_dir, store) = store();
        fs::create_dir_all(store.path().parent().expect("parent")).expect("mkdir");
        fs::write(store.path(), "{ not json").expect("write");

        assert!(SearchHistory::load(store.clone()).is_empty());
        assert_eq!(store.last_city(), None);
    }

    #[test]
    fn hand_edited_file_is_normalised() {
        let (_dir, store) = store();
        fs::create_dir_all(store.path().parent().expect("parent")).expect("mkdir");
        fs::write(
            store.path(),
            r#"{"history": ["Rome", "ROME", "Oslo", "Lima", "Kyiv", "Baku", "Doha"]}"#,
        )
        .expect("write");

        let history = SearchHistory::load(store);
        assert_eq!(history.entries(), ["Rome", "Oslo", "Lima", "Kyiv", "Baku"]);
    }

    #[test]
    fn last_city_and_history_are_independent_keys() {
        let (_dir, store) = store();

        store.save_last_city("Seoul");
        let mut history = SearchHistory::load(store.clone());
        history.record("Busan");

        assert_eq!(store.last_city().as_deref(), Some("Seoul"));
        assert_eq!(store.read().history, ["Busan"]);
    }
}
