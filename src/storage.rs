//! Local persistence for user data
//!
//! One JSON file per named key under the user data directory. Writes are
//! budgeted against a soft quota with a best-effort cleanup pass that
//! drops stale or unparseable non-reserved entries before retrying once.

use anyhow::{anyhow, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

pub const KEY_FAVORITES: &str = "favorites";
pub const KEY_WATCHLIST: &str = "watchlist";
pub const KEY_THEME: &str = "theme";
pub const KEY_VIEW_MODE: &str = "view_mode";
pub const KEY_LAST_SEARCH: &str = "last_search";
pub const KEY_SETTINGS: &str = "settings";

/// The free-form CRUD list and search history live outside the reserved set
pub const KEY_MY_LIST: &str = "my_list";
pub const KEY_SEARCH_HISTORY: &str = "search_history";

/// Keys that `clear` wipes and that the cleanup pass never touches
const RESERVED_KEYS: [&str; 6] = [
    KEY_FAVORITES,
    KEY_WATCHLIST,
    KEY_THEME,
    KEY_VIEW_MODE,
    KEY_LAST_SEARCH,
    KEY_SETTINGS,
];

/// Soft usage quota for everything under the storage root
const MAX_STORAGE_BYTES: u64 = 5 * 1024 * 1024;

/// Non-reserved entries with a timestamp older than this are reclaimable
const STALE_AFTER_MS: i64 = 30 * 24 * 60 * 60 * 1000;

/// User-tunable application settings, persisted as one JSON object
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    pub language: String,
    pub include_adult: bool,
    pub notifications: bool,
    pub autoplay_trailers: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            language: "en-US".to_string(),
            include_adult: false,
            notifications: true,
            autoplay_trailers: false,
        }
    }
}

/// Key-value JSON persistence over a base directory
pub struct Storage {
    root: PathBuf,
    max_bytes: u64,
}

impl Storage {
    /// Storage rooted at the platform data directory
    pub fn new() -> Self {
        Self::at(Self::default_dir())
    }

    /// Storage rooted at an explicit directory (tests use a temp dir)
    pub fn at(root: PathBuf) -> Self {
        let _ = fs::create_dir_all(&root);
        Self {
            root,
            max_bytes: MAX_STORAGE_BYTES,
        }
    }

    /// Shrink the quota (tests exercise the cleanup path with small budgets)
    pub fn with_quota(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    fn default_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("cinetui")
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", key))
    }

    // -------------------------------------------------------------------------
    // Core operations
    // -------------------------------------------------------------------------

    /// Read and decode a key; any failure yields None
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = fs::read_to_string(self.path_for(key)).ok()?;
        serde_json::from_str(&raw).ok()
    }

    /// Read a key, falling back to the given default
    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.get(key).unwrap_or(default)
    }

    /// Encode and write a key. When the projected usage would exceed the
    /// quota, a cleanup pass runs first and the write is retried once.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let serialized = serde_json::to_string(value)?;
        // Character count x2 approximates UTF-16 byte width
        let incoming = (serialized.chars().count() as u64) * 2;
        let existing = self.entry_size(key);

        if self.usage() - existing + incoming > self.max_bytes {
            self.cleanup_old_entries();
            if self.usage() - self.entry_size(key) + incoming > self.max_bytes {
                return Err(anyhow!("storage quota exceeded for key '{}'", key));
            }
        }

        fs::write(self.path_for(key), serialized)?;
        Ok(())
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    /// Wipe every reserved key; non-reserved keys are untouched
    pub fn clear(&self) -> Result<()> {
        for key in RESERVED_KEYS {
            self.remove(key)?;
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Usage accounting
    // -------------------------------------------------------------------------

    fn entry_size(&self, key: &str) -> u64 {
        fs::read_to_string(self.path_for(key))
            .map(|s| (s.chars().count() as u64) * 2)
            .unwrap_or(0)
    }

    /// Estimated usage across all stored keys
    pub fn usage(&self) -> u64 {
        let Ok(entries) = fs::read_dir(&self.root) else {
            return 0;
        };
        entries
            .flatten()
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "json"))
            .filter_map(|e| fs::read_to_string(e.path()).ok())
            .map(|s| (s.chars().count() as u64) * 2)
            .sum()
    }

    pub fn usage_percentage(&self) -> f64 {
        (self.usage() as f64 / self.max_bytes as f64) * 100.0
    }

    /// Best-effort housekeeping: remove non-reserved entries whose stored
    /// value carries a `timestamp` older than 30 days, and entries that no
    /// longer parse as JSON. Returns the number of removed entries.
    pub fn cleanup_old_entries(&self) -> usize {
        let Ok(entries) = fs::read_dir(&self.root) else {
            return 0;
        };
        let cutoff = chrono::Utc::now().timestamp_millis() - STALE_AFTER_MS;
        let mut removed = 0;

        for entry in entries.flatten() {
            let path = entry.path();
            if !path.extension().is_some_and(|ext| ext == "json") {
                continue;
            }
            let stem = match path.file_stem().and_then(|s| s.to_str()) {
                Some(s) => s.to_string(),
                None => continue,
            };
            if RESERVED_KEYS.contains(&stem.as_str()) {
                continue;
            }

            let reclaim = match fs::read_to_string(&path)
                .ok()
                .and_then(|raw| serde_json::from_str::<serde_json::Value>(&raw).ok())
            {
                // Unparseable values are dead weight
                None => true,
                Some(value) => value
                    .get("timestamp")
                    .and_then(|t| t.as_i64())
                    .is_some_and(|t| t < cutoff),
            };

            if reclaim && fs::remove_file(&path).is_ok() {
                removed += 1;
            }
        }

        removed
    }

    // -------------------------------------------------------------------------
    // Typed accessors for the fixed keys
    // -------------------------------------------------------------------------

    pub fn last_search(&self) -> String {
        self.get_or(KEY_LAST_SEARCH, String::new())
    }

    pub fn save_last_search(&self, query: &str) -> Result<()> {
        self.set(KEY_LAST_SEARCH, &query.to_string())
    }

    pub fn theme(&self) -> String {
        self.get_or(KEY_THEME, "dark".to_string())
    }

    pub fn save_theme(&self, theme: &str) -> Result<()> {
        self.set(KEY_THEME, &theme.to_string())
    }

    pub fn settings(&self) -> Settings {
        self.get_or(KEY_SETTINGS, Settings::default())
    }

    pub fn save_settings(&self, settings: &Settings) -> Result<()> {
        self.set(KEY_SETTINGS, settings)
    }
}

impl Default for Storage {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
