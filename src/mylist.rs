//! Personal movie list with CRUD operations
//!
//! A free-form list separate from favorites/watchlist: each entry carries
//! user data (own rating, notes, watch status) alongside a catalog
//! reference. Persisted under its own storage key.

use anyhow::{anyhow, bail, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::models::Movie;
use crate::storage::{Storage, KEY_MY_LIST};

/// Entries are capped nowhere; ids are locally generated epoch millis,
/// bumped past the last issued id when the clock collides
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListEntry {
    pub id: u64,
    pub catalog_id: u64,
    pub title: String,
    pub poster_path: Option<String>,
    pub rating: f32,
    pub year: Option<u16>,
    pub added_at: String,
    #[serde(default)]
    pub updated_at: Option<String>,
    pub my_rating: Option<f32>,
    #[serde(default)]
    pub notes: String,
    pub status: WatchStatus,
    pub favorite: bool,
}

/// Where an entry sits in the user's watching lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum WatchStatus {
    #[default]
    WantToWatch,
    Watching,
    Watched,
}

impl WatchStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "want-to-watch" => Some(WatchStatus::WantToWatch),
            "watching" => Some(WatchStatus::Watching),
            "watched" => Some(WatchStatus::Watched),
            _ => None,
        }
    }
}

impl fmt::Display for WatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WatchStatus::WantToWatch => write!(f, "want-to-watch"),
            WatchStatus::Watching => write!(f, "watching"),
            WatchStatus::Watched => write!(f, "watched"),
        }
    }
}

/// Aggregates over the list
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ListStats {
    pub total: usize,
    pub want_to_watch: usize,
    pub watching: usize,
    pub watched: usize,
    pub favorites: usize,
    pub average_rating: f32,
}

/// CRUD manager over the personal list
pub struct MyListManager {
    list: Vec<ListEntry>,
    last_id: u64,
    storage: Arc<Storage>,
}

impl MyListManager {
    pub fn new(storage: Arc<Storage>) -> Self {
        let list: Vec<ListEntry> = storage.get_or(KEY_MY_LIST, Vec::new());
        let last_id = list.iter().map(|e| e.id).max().unwrap_or(0);
        Self {
            list,
            last_id,
            storage,
        }
    }

    fn next_id(&mut self) -> u64 {
        let now = chrono::Utc::now().timestamp_millis() as u64;
        self.last_id = now.max(self.last_id + 1);
        self.last_id
    }

    fn save(&self) -> Result<()> {
        self.storage.set(KEY_MY_LIST, &self.list)
    }

    // -------------------------------------------------------------------------
    // Create
    // -------------------------------------------------------------------------

    /// Add a catalog movie to the list; a second add of the same catalog id
    /// is rejected
    pub fn add(&mut self, movie: &Movie) -> Result<ListEntry> {
        if self.list.iter().any(|e| e.catalog_id == movie.id) {
            bail!("\"{}\" is already in your list", movie.title);
        }
        let entry = ListEntry {
            id: self.next_id(),
            catalog_id: movie.id,
            title: movie.title.clone(),
            poster_path: movie.poster_path.clone(),
            rating: movie.vote_average,
            year: movie.year,
            added_at: chrono::Utc::now().to_rfc3339(),
            updated_at: None,
            my_rating: None,
            notes: String::new(),
            status: WatchStatus::default(),
            favorite: false,
        };
        // Newest first
        self.list.insert(0, entry.clone());
        self.save()?;
        Ok(entry)
    }

    // -------------------------------------------------------------------------
    // Read
    // -------------------------------------------------------------------------

    pub fn all(&self) -> &[ListEntry] {
        &self.list
    }

    pub fn by_id(&self, id: u64) -> Option<&ListEntry> {
        self.list.iter().find(|e| e.id == id)
    }

    pub fn by_status(&self, status: WatchStatus) -> Vec<&ListEntry> {
        self.list.iter().filter(|e| e.status == status).collect()
    }

    pub fn favorites(&self) -> Vec<&ListEntry> {
        self.list.iter().filter(|e| e.favorite).collect()
    }

    /// Case-insensitive title substring search
    pub fn search(&self, query: &str) -> Vec<&ListEntry> {
        let needle = query.to_lowercase();
        self.list
            .iter()
            .filter(|e| e.title.to_lowercase().contains(&needle))
            .collect()
    }

    // -------------------------------------------------------------------------
    // Update
    // -------------------------------------------------------------------------

    fn update_entry(
        &mut self,
        id: u64,
        apply: impl FnOnce(&mut ListEntry),
    ) -> Result<ListEntry> {
        let entry = self
            .list
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| anyhow!("no list entry with id {}", id))?;
        apply(entry);
        entry.updated_at = Some(chrono::Utc::now().to_rfc3339());
        let updated = entry.clone();
        self.save()?;
        Ok(updated)
    }

    pub fn set_rating(&mut self, id: u64, rating: f32) -> Result<ListEntry> {
        self.update_entry(id, |e| e.my_rating = Some(rating.clamp(0.0, 10.0)))
    }

    pub fn set_notes(&mut self, id: u64, notes: &str) -> Result<ListEntry> {
        self.update_entry(id, |e| e.notes = notes.to_string())
    }

    pub fn set_status(&mut self, id: u64, status: WatchStatus) -> Result<ListEntry> {
        self.update_entry(id, |e| e.status = status)
    }

    pub fn toggle_favorite(&mut self, id: u64) -> Result<ListEntry> {
        self.update_entry(id, |e| e.favorite = !e.favorite)
    }

    // -------------------------------------------------------------------------
    // Delete
    // -------------------------------------------------------------------------

    pub fn delete(&mut self, id: u64) -> Result<ListEntry> {
        let index = self
            .list
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| anyhow!("no list entry with id {}", id))?;
        let removed = self.list.remove(index);
        self.save()?;
        Ok(removed)
    }

    pub fn clear(&mut self) -> Result<()> {
        self.list.clear();
        self.save()
    }

    // -------------------------------------------------------------------------
    // Stats, export, import
    // -------------------------------------------------------------------------

    pub fn stats(&self) -> ListStats {
        let rated: Vec<f32> = self.list.iter().filter_map(|e| e.my_rating).collect();
        let average_rating = if rated.is_empty() {
            0.0
        } else {
            rated.iter().sum::<f32>() / rated.len() as f32
        };
        ListStats {
            total: self.list.len(),
            want_to_watch: self.by_status(WatchStatus::WantToWatch).len(),
            watching: self.by_status(WatchStatus::Watching).len(),
            watched: self.by_status(WatchStatus::Watched).len(),
            favorites: self.favorites().len(),
            average_rating,
        }
    }

    pub fn export_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.list)?)
    }

    /// Replace the list from an exported JSON array; anything that is not
    /// an array of entries is rejected wholesale
    pub fn import_json(&mut self, data: &str) -> Result<usize> {
        let value: serde_json::Value =
            serde_json::from_str(data).map_err(|e| anyhow!("not valid JSON: {}", e))?;
        if !value.is_array() {
            bail!("list backup must be a JSON array");
        }
        let imported: Vec<ListEntry> = serde_json::from_value(value)
            .map_err(|e| anyhow!("list entries malformed: {}", e))?;
        let count = imported.len();
        self.list = imported;
        self.last_id = self.list.iter().map(|e| e.id).max().unwrap_or(0);
        self.save()?;
        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MediaType;
    use std::sync::atomic::{AtomicU32, Ordering};

    static DIR_SEQ: AtomicU32 = AtomicU32::new(0);

    fn test_manager() -> MyListManager {
        let seq = DIR_SEQ.fetch_add(1, Ordering::Relaxed);
        let dir = std::env::temp_dir().join(format!(
            "cinetui-mylist-test-{}-{}",
            std::process::id(),
            seq
        ));
        let _ = std::fs::remove_dir_all(&dir);
        MyListManager::new(Arc::new(Storage::at(dir)))
    }

    fn movie(id: u64, title: &str) -> Movie {
        Movie {
            id,
            title: title.to_string(),
            original_title: title.to_string(),
            overview: String::new(),
            tagline: String::new(),
            poster_path: Some(format!("/{}.jpg", id)),
            backdrop_path: None,
            release_date: Some("2020-01-01".to_string()),
            year: Some(2020),
            vote_average: 7.5,
            vote_count: 100,
            popularity: 10.0,
            runtime: None,
            genre_ids: Vec::new(),
            genres: Vec::new(),
            status: "Released".to_string(),
            budget: 0,
            revenue: 0,
            homepage: None,
            imdb_id: None,
            media_type: MediaType::Movie,
            cast: Vec::new(),
            crew: Vec::new(),
            videos: Vec::new(),
            similar: Vec::new(),
            recommendations: Vec::new(),
            view_count: 0,
            last_viewed: None,
        }
    }

    #[test]
    fn test_add_and_read() {
        let mut manager = test_manager();
        let entry = manager.add(&movie(603, "The Matrix")).unwrap();
        assert_eq!(entry.catalog_id, 603);
        assert_eq!(entry.status, WatchStatus::WantToWatch);
        assert_eq!(manager.all().len(), 1);
        assert!(manager.by_id(entry.id).is_some());
    }

    #[test]
    fn test_duplicate_catalog_id_rejected() {
        let mut manager = test_manager();
        manager.add(&movie(603, "The Matrix")).unwrap();
        assert!(manager.add(&movie(603, "The Matrix")).is_err());
        assert_eq!(manager.all().len(), 1);
    }

    #[test]
    fn test_newest_first_ordering() {
        let mut manager = test_manager();
        manager.add(&movie(1, "First")).unwrap();
        manager.add(&movie(2, "Second")).unwrap();
        assert_eq!(manager.all()[0].title, "Second");
        assert_eq!(manager.all()[1].title, "First");
    }

    #[test]
    fn test_ids_unique_under_fast_inserts() {
        let mut manager = test_manager();
        let a = manager.add(&movie(1, "A")).unwrap();
        let b = manager.add(&movie(2, "B")).unwrap();
        let c = manager.add(&movie(3, "C")).unwrap();
        assert!(a.id < b.id && b.id < c.id);
    }

    #[test]
    fn test_update_rating_clamped() {
        let mut manager = test_manager();
        let entry = manager.add(&movie(1, "A")).unwrap();
        let updated = manager.set_rating(entry.id, 15.0).unwrap();
        assert_eq!(updated.my_rating, Some(10.0));
        assert!(updated.updated_at.is_some());
    }

    #[test]
    fn test_update_missing_id_errors() {
        let mut manager = test_manager();
        assert!(manager.set_rating(424242, 8.0).is_err());
        assert!(manager.set_notes(424242, "x").is_err());
        assert!(manager.delete(424242).is_err());
    }

    #[test]
    fn test_status_and_favorite_updates() {
        let mut manager = test_manager();
        let entry = manager.add(&movie(1, "A")).unwrap();
        manager.set_status(entry.id, WatchStatus::Watched).unwrap();
        manager.toggle_favorite(entry.id).unwrap();

        let stored = manager.by_id(entry.id).unwrap();
        assert_eq!(stored.status, WatchStatus::Watched);
        assert!(stored.favorite);

        manager.toggle_favorite(entry.id).unwrap();
        assert!(!manager.by_id(entry.id).unwrap().favorite);
    }

    #[test]
    fn test_search_case_insensitive() {
        let mut manager = test_manager();
        manager.add(&movie(1, "The Dark Knight")).unwrap();
        manager.add(&movie(2, "Inception")).unwrap();
        assert_eq!(manager.search("dark").len(), 1);
        assert_eq!(manager.search("KNIGHT").len(), 1);
        assert!(manager.search("matrix").is_empty());
    }

    #[test]
    fn test_delete_and_clear() {
        let mut manager = test_manager();
        let entry = manager.add(&movie(1, "A")).unwrap();
        manager.add(&movie(2, "B")).unwrap();

        let removed = manager.delete(entry.id).unwrap();
        assert_eq!(removed.catalog_id, 1);
        assert_eq!(manager.all().len(), 1);

        manager.clear().unwrap();
        assert!(manager.all().is_empty());
    }

    #[test]
    fn test_stats() {
        let mut manager = test_manager();
        let a = manager.add(&movie(1, "A")).unwrap();
        let b = manager.add(&movie(2, "B")).unwrap();
        manager.add(&movie(3, "C")).unwrap();

        manager.set_status(a.id, WatchStatus::Watched).unwrap();
        manager.set_rating(a.id, 8.0).unwrap();
        manager.set_rating(b.id, 6.0).unwrap();
        manager.toggle_favorite(b.id).unwrap();

        let stats = manager.stats();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.watched, 1);
        assert_eq!(stats.want_to_watch, 2);
        assert_eq!(stats.favorites, 1);
        assert!((stats.average_rating - 7.0).abs() < 0.01);
    }

    #[test]
    fn test_stats_no_ratings() {
        let mut manager = test_manager();
        manager.add(&movie(1, "A")).unwrap();
        assert_eq!(manager.stats().average_rating, 0.0);
    }

    #[test]
    fn test_export_import_roundtrip() {
        let mut manager = test_manager();
        manager.add(&movie(1, "A")).unwrap();
        manager.add(&movie(2, "B")).unwrap();
        let exported = manager.export_json().unwrap();

        let mut fresh = test_manager();
        let count = fresh.import_json(&exported).unwrap();
        assert_eq!(count, 2);
        assert_eq!(fresh.all().len(), 2);
        assert_eq!(fresh.all()[0].title, "B");
    }

    #[test]
    fn test_import_rejects_non_array() {
        let mut manager = test_manager();
        manager.add(&movie(1, "Kept")).unwrap();
        assert!(manager.import_json(r#"{"not": "a list"}"#).is_err());
        assert!(manager.import_json("garbage").is_err());
        // Failed import leaves the list untouched
        assert_eq!(manager.all().len(), 1);
    }

    #[test]
    fn test_persistence_across_managers() {
        let seq = DIR_SEQ.fetch_add(1, Ordering::Relaxed);
        let dir = std::env::temp_dir().join(format!(
            "cinetui-mylist-persist-{}-{}",
            std::process::id(),
            seq
        ));
        let _ = std::fs::remove_dir_all(&dir);

        let mut manager = MyListManager::new(Arc::new(Storage::at(dir.clone())));
        manager.add(&movie(42, "Persisted")).unwrap();
        drop(manager);

        let reloaded = MyListManager::new(Arc::new(Storage::at(dir)));
        assert_eq!(reloaded.all().len(), 1);
        assert_eq!(reloaded.all()[0].title, "Persisted");
    }

    #[test]
    fn test_watch_status_parse_display() {
        assert_eq!(WatchStatus::parse("watched"), Some(WatchStatus::Watched));
        assert_eq!(
            WatchStatus::parse("want-to-watch"),
            Some(WatchStatus::WantToWatch)
        );
        assert_eq!(WatchStatus::parse("dropped"), None);
        assert_eq!(WatchStatus::Watching.to_string(), "watching");
    }
}
