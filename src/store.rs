//! Observable application state container
//!
//! A single mutable state record plus a subscriber registry. Every mutation
//! runs synchronously and ends by handing the full state snapshot to every
//! subscriber; there is no diffing. Favorites and watchlist changes persist
//! immediately through the storage adapter.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use crate::models::{Movie, Page, MAX_TOTAL_PAGES};
use crate::storage::{Storage, KEY_FAVORITES, KEY_VIEW_MODE, KEY_WATCHLIST};

/// Loaded-page lookup cache capacity
const MOVIE_CACHE_CAP: usize = 200;

/// Detail lookup cache capacity
const DETAIL_CACHE_CAP: usize = 50;

/// Result layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Grid,
    List,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            ViewMode::Grid => ViewMode::List,
            ViewMode::List => ViewMode::Grid,
        }
    }
}

/// Client-side sort key for the loaded result page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Popularity,
    Rating,
    ReleaseDate,
    Revenue,
}

impl SortKey {
    /// The matching API sort parameter for discover queries
    pub fn api_value(self) -> &'static str {
        match self {
            SortKey::Popularity => "popularity.desc",
            SortKey::Rating => "vote_average.desc",
            SortKey::ReleaseDate => "release_date.desc",
            SortKey::Revenue => "revenue.desc",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "vote_average.desc" | "rating" => SortKey::Rating,
            "release_date.desc" | "date" => SortKey::ReleaseDate,
            "revenue.desc" | "revenue" => SortKey::Revenue,
            _ => SortKey::Popularity,
        }
    }

    /// Next key in the cycle, for the sort keybinding
    pub fn next(self) -> Self {
        match self {
            SortKey::Popularity => SortKey::Rating,
            SortKey::Rating => SortKey::ReleaseDate,
            SortKey::ReleaseDate => SortKey::Revenue,
            SortKey::Revenue => SortKey::Popularity,
        }
    }
}

/// Active client-side filters over the loaded page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filters {
    pub genre: Option<u32>,
    pub year: Option<u16>,
    pub sort: SortKey,
}

/// Aggregate counters derived from the lists and caches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub cached_movies: usize,
    pub favorites: usize,
    pub watchlist: usize,
    pub total_views: u32,
}

/// The full state snapshot handed to subscribers
#[derive(Debug, Clone, Default)]
pub struct StoreState {
    pub movies: Vec<Movie>,
    pub filtered: Vec<Movie>,
    pub selected: Option<Movie>,
    pub favorites: Vec<Movie>,
    pub watchlist: Vec<Movie>,
    pub search_query: String,
    pub filters: Filters,
    pub current_page: u32,
    pub total_pages: u32,
    pub total_results: u32,
    pub view_mode: ViewMode,
    pub loading: bool,
    pub error: Option<String>,
    /// Transient user-facing message (favorite added, save failed, ...)
    pub notice: Option<String>,
    pub stats: StoreStats,
}

/// Exported backup document; the import allow-list is exactly these keys
#[derive(Debug, Serialize, Deserialize)]
struct ExportDoc {
    favorites: Vec<Movie>,
    watchlist: Vec<Movie>,
    #[serde(default)]
    last_search: String,
    #[serde(default)]
    view_mode: ViewMode,
    #[serde(default)]
    exported_at: Option<String>,
}

const EXPORT_KEYS: [&str; 5] = [
    "favorites",
    "watchlist",
    "last_search",
    "view_mode",
    "exported_at",
];

/// Insertion-order bounded id lookup cache (deliberately not LRU)
struct BoundedCache {
    entries: HashMap<u64, Movie>,
    insertion_order: VecDeque<u64>,
    capacity: usize,
}

impl BoundedCache {
    fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            insertion_order: VecDeque::new(),
            capacity,
        }
    }

    fn get(&self, id: u64) -> Option<&Movie> {
        self.entries.get(&id)
    }

    fn put(&mut self, movie: Movie) {
        if !self.entries.contains_key(&movie.id) {
            self.insertion_order.push_back(movie.id);
        }
        self.entries.insert(movie.id, movie);
        while self.entries.len() > self.capacity {
            match self.insertion_order.pop_front() {
                Some(oldest) => {
                    self.entries.remove(&oldest);
                }
                None => break,
            }
        }
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.insertion_order.clear();
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn values(&self) -> impl Iterator<Item = &Movie> {
        self.entries.values()
    }
}

type Subscriber = Box<dyn Fn(&StoreState) + Send>;

/// Observable state container
pub struct MovieStore {
    state: StoreState,
    movie_cache: BoundedCache,
    detail_cache: BoundedCache,
    subscribers: Vec<(u64, Subscriber)>,
    next_subscriber: u64,
    storage: Arc<Storage>,
}

impl MovieStore {
    /// Build a store hydrated from persisted user data
    pub fn new(storage: Arc<Storage>) -> Self {
        let mut store = Self {
            state: StoreState {
                current_page: 1,
                total_pages: 1,
                ..StoreState::default()
            },
            movie_cache: BoundedCache::new(MOVIE_CACHE_CAP),
            detail_cache: BoundedCache::new(DETAIL_CACHE_CAP),
            subscribers: Vec::new(),
            next_subscriber: 0,
            storage,
        };
        store.state.favorites = store.storage.get_or(KEY_FAVORITES, Vec::new());
        store.state.watchlist = store.storage.get_or(KEY_WATCHLIST, Vec::new());
        store.state.view_mode = store.storage.get_or(KEY_VIEW_MODE, ViewMode::default());
        store.state.search_query = store.storage.last_search();
        store.update_stats();
        store.notify();
        store
    }

    pub fn state(&self) -> &StoreState {
        &self.state
    }

    // -------------------------------------------------------------------------
    // Subscriptions
    // -------------------------------------------------------------------------

    /// Register a callback invoked with the full snapshot on every mutation
    pub fn subscribe(&mut self, callback: impl Fn(&StoreState) + Send + 'static) -> u64 {
        let id = self.next_subscriber;
        self.next_subscriber += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    pub fn unsubscribe(&mut self, id: u64) {
        self.subscribers.retain(|(sub_id, _)| *sub_id != id);
    }

    fn notify(&self) {
        for (_, callback) in &self.subscribers {
            callback(&self.state);
        }
    }

    // -------------------------------------------------------------------------
    // Result set
    // -------------------------------------------------------------------------

    /// Replace the result set from a fetched page; total pages clamp at the
    /// API's hard maximum
    pub fn set_movies(&mut self, page: Page<Movie>) {
        for movie in &page.results {
            self.movie_cache.put(movie.clone());
        }
        self.state.total_pages = page.total_pages.clamp(1, MAX_TOTAL_PAGES);
        self.state.total_results = page.total_results;
        self.state.current_page = page.page.clamp(1, self.state.total_pages);
        self.state.movies = page.results.clone();
        self.state.filtered = page.results;
        self.state.loading = false;
        self.state.error = None;
        self.apply_filters_inner();
        self.update_stats();
        self.notify();
    }

    /// Re-filter and re-sort the currently loaded page; no new query
    fn apply_filters_inner(&mut self) {
        let filters = self.state.filters.clone();
        let mut filtered: Vec<Movie> = self
            .state
            .movies
            .iter()
            .filter(|m| match filters.genre {
                Some(genre) => m.genre_ids.contains(&genre),
                None => true,
            })
            .filter(|m| match filters.year {
                Some(year) => m.year == Some(year),
                None => true,
            })
            .cloned()
            .collect();

        // Plain descending comparisons; equal keys keep their prior relative
        // order because sort_by is stable
        match filters.sort {
            SortKey::Popularity => {
                filtered.sort_by(|a, b| {
                    b.popularity
                        .partial_cmp(&a.popularity)
                        .unwrap_or(std::cmp::Ordering::Equal)
                });
            }
            SortKey::Rating => {
                filtered.sort_by(|a, b| {
                    b.vote_average
                        .partial_cmp(&a.vote_average)
                        .unwrap_or(std::cmp::Ordering::Equal)
                });
            }
            SortKey::ReleaseDate => {
                // ISO dates compare correctly as strings; undated entries sink
                filtered.sort_by(|a, b| b.release_date.cmp(&a.release_date));
            }
            SortKey::Revenue => {
                filtered.sort_by(|a, b| b.revenue.cmp(&a.revenue));
            }
        }

        self.state.filtered = filtered;
    }

    pub fn set_genre_filter(&mut self, genre: Option<u32>) {
        self.state.filters.genre = genre;
        self.apply_filters_inner();
        self.notify();
    }

    pub fn set_year_filter(&mut self, year: Option<u16>) {
        self.state.filters.year = year;
        self.apply_filters_inner();
        self.notify();
    }

    pub fn set_sort(&mut self, sort: SortKey) {
        self.state.filters.sort = sort;
        self.apply_filters_inner();
        self.notify();
    }

    pub fn clear_filters(&mut self) {
        self.state.filters = Filters::default();
        self.apply_filters_inner();
        self.notify();
    }

    // -------------------------------------------------------------------------
    // Search query and pagination
    // -------------------------------------------------------------------------

    pub fn set_search_query(&mut self, query: &str) {
        self.state.search_query = query.to_string();
        self.persist_or_notice(|storage| storage.save_last_search(query));
        self.notify();
    }

    /// Clamp the requested page into `[1, total_pages]`
    pub fn set_page(&mut self, page: u32) {
        self.state.current_page = page.clamp(1, self.state.total_pages.max(1));
        self.notify();
    }

    // -------------------------------------------------------------------------
    // Favorites and watchlist
    // -------------------------------------------------------------------------

    /// Add to favorites; duplicate ids are a no-op returning false
    pub fn add_favorite(&mut self, movie: Movie) -> bool {
        if self.state.favorites.iter().any(|m| m.id == movie.id) {
            return false;
        }
        let title = movie.title.clone();
        self.state.favorites.push(movie);
        let favorites = self.state.favorites.clone();
        self.persist_or_notice(|storage| storage.set(KEY_FAVORITES, &favorites));
        self.state.notice = Some(format!("Added \"{}\" to favorites", title));
        self.update_stats();
        self.notify();
        true
    }

    pub fn remove_favorite(&mut self, id: u64) -> bool {
        let before = self.state.favorites.len();
        self.state.favorites.retain(|m| m.id != id);
        if self.state.favorites.len() == before {
            return false;
        }
        let favorites = self.state.favorites.clone();
        self.persist_or_notice(|storage| storage.set(KEY_FAVORITES, &favorites));
        self.state.notice = Some("Removed from favorites".to_string());
        self.update_stats();
        self.notify();
        true
    }

    pub fn is_favorite(&self, id: u64) -> bool {
        self.state.favorites.iter().any(|m| m.id == id)
    }

    /// Toggle by id; requires a cached instance, otherwise a no-op
    pub fn toggle_favorite(&mut self, id: u64) -> bool {
        if self.is_favorite(id) {
            return self.remove_favorite(id);
        }
        match self.movie_from_cache(id) {
            Some(movie) => self.add_favorite(movie),
            None => false,
        }
    }

    pub fn add_to_watchlist(&mut self, movie: Movie) -> bool {
        if self.state.watchlist.iter().any(|m| m.id == movie.id) {
            return false;
        }
        let title = movie.title.clone();
        self.state.watchlist.push(movie);
        let watchlist = self.state.watchlist.clone();
        self.persist_or_notice(|storage| storage.set(KEY_WATCHLIST, &watchlist));
        self.state.notice = Some(format!("Added \"{}\" to watchlist", title));
        self.update_stats();
        self.notify();
        true
    }

    pub fn remove_from_watchlist(&mut self, id: u64) -> bool {
        let before = self.state.watchlist.len();
        self.state.watchlist.retain(|m| m.id != id);
        if self.state.watchlist.len() == before {
            return false;
        }
        let watchlist = self.state.watchlist.clone();
        self.persist_or_notice(|storage| storage.set(KEY_WATCHLIST, &watchlist));
        self.state.notice = Some("Removed from watchlist".to_string());
        self.update_stats();
        self.notify();
        true
    }

    pub fn is_in_watchlist(&self, id: u64) -> bool {
        self.state.watchlist.iter().any(|m| m.id == id)
    }

    /// Toggle by id; requires a cached instance, otherwise a no-op
    pub fn toggle_watchlist(&mut self, id: u64) -> bool {
        if self.is_in_watchlist(id) {
            return self.remove_from_watchlist(id);
        }
        match self.movie_from_cache(id) {
            Some(movie) => self.add_to_watchlist(movie),
            None => false,
        }
    }

    // -------------------------------------------------------------------------
    // Detail, flags, view mode
    // -------------------------------------------------------------------------

    /// Record the selected detail; bumps its local view counter
    pub fn set_movie_details(&mut self, mut movie: Movie) {
        movie.record_view(chrono::Utc::now().timestamp_millis());
        self.detail_cache.put(movie.clone());
        self.state.selected = Some(movie);
        self.state.loading = false;
        self.state.error = None;
        self.update_stats();
        self.notify();
    }

    /// Lookup a movie by id in the page cache, then the detail cache
    pub fn movie_from_cache(&self, id: u64) -> Option<Movie> {
        self.movie_cache
            .get(id)
            .or_else(|| self.detail_cache.get(id))
            .cloned()
    }

    /// Lookup a detail-cached movie (with expansions) by id
    pub fn detail_from_cache(&self, id: u64) -> Option<Movie> {
        self.detail_cache.get(id).cloned()
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.state.loading = loading;
        self.notify();
    }

    /// Record a failure; surfaces as both the error field and a notice
    pub fn set_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        self.state.loading = false;
        self.state.error = Some(message.clone());
        self.state.notice = Some(message);
        self.notify();
    }

    pub fn clear_error(&mut self) {
        self.state.error = None;
        self.notify();
    }

    pub fn take_notice(&mut self) -> Option<String> {
        self.state.notice.take()
    }

    pub fn set_notice(&mut self, message: impl Into<String>) {
        self.state.notice = Some(message.into());
        self.notify();
    }

    /// Drop the transient error/notice; a keypress dismisses both
    pub fn clear_transients(&mut self) {
        if self.state.error.is_some() || self.state.notice.is_some() {
            self.state.error = None;
            self.state.notice = None;
            self.notify();
        }
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.state.view_mode = mode;
        self.persist_or_notice(|storage| storage.set(KEY_VIEW_MODE, &mode));
        self.notify();
    }

    // -------------------------------------------------------------------------
    // Reset, export, import
    // -------------------------------------------------------------------------

    /// Wipe state and persisted reserved keys
    pub fn clear_all(&mut self) {
        if let Err(e) = self.storage.clear() {
            self.state.notice = Some(format!("Could not clear saved data: {}", e));
        }
        self.state.movies.clear();
        self.state.filtered.clear();
        self.state.favorites.clear();
        self.state.watchlist.clear();
        self.state.selected = None;
        self.state.search_query.clear();
        self.state.filters = Filters::default();
        self.state.current_page = 1;
        self.state.total_pages = 1;
        self.state.total_results = 0;
        self.state.error = None;
        self.movie_cache.clear();
        self.detail_cache.clear();
        self.update_stats();
        self.notify();
    }

    /// Bundle favorites/watchlist/search/view-mode into one JSON document
    pub fn export_state(&self) -> anyhow::Result<String> {
        let doc = ExportDoc {
            favorites: self.state.favorites.clone(),
            watchlist: self.state.watchlist.clone(),
            last_search: self.state.search_query.clone(),
            view_mode: self.state.view_mode,
            exported_at: Some(chrono::Utc::now().to_rfc3339()),
        };
        Ok(serde_json::to_string_pretty(&doc)?)
    }

    /// Import a previously exported document. Validation is all-or-nothing:
    /// unknown keys or wrong shapes reject the whole document.
    pub fn import_state(&mut self, data: &str) -> anyhow::Result<()> {
        let value: serde_json::Value =
            serde_json::from_str(data).map_err(|e| anyhow::anyhow!("not valid JSON: {}", e))?;
        let object = value
            .as_object()
            .ok_or_else(|| anyhow::anyhow!("backup must be a JSON object"))?;
        for key in object.keys() {
            if !EXPORT_KEYS.contains(&key.as_str()) {
                anyhow::bail!("unrecognized key in backup: '{}'", key);
            }
        }
        for list_key in ["favorites", "watchlist"] {
            if let Some(entry) = object.get(list_key) {
                if !entry.is_array() {
                    anyhow::bail!("'{}' must be an array", list_key);
                }
            }
        }

        let doc: ExportDoc = serde_json::from_value(value)
            .map_err(|e| anyhow::anyhow!("backup entries malformed: {}", e))?;

        self.state.favorites = doc.favorites;
        self.state.watchlist = doc.watchlist;
        self.state.search_query = doc.last_search;
        self.state.view_mode = doc.view_mode;

        let favorites = self.state.favorites.clone();
        self.persist_or_notice(|storage| storage.set(KEY_FAVORITES, &favorites));
        let watchlist = self.state.watchlist.clone();
        self.persist_or_notice(|storage| storage.set(KEY_WATCHLIST, &watchlist));
        let query = self.state.search_query.clone();
        self.persist_or_notice(|storage| storage.save_last_search(&query));
        let mode = self.state.view_mode;
        self.persist_or_notice(|storage| storage.set(KEY_VIEW_MODE, &mode));

        self.update_stats();
        self.notify();
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn persist_or_notice(&mut self, write: impl FnOnce(&Storage) -> anyhow::Result<()>) {
        if let Err(e) = write(&self.storage) {
            self.state.notice = Some(format!("Could not save: {}", e));
        }
    }

    fn update_stats(&mut self) {
        self.state.stats = StoreStats {
            cached_movies: self.movie_cache.len(),
            favorites: self.state.favorites.len(),
            watchlist: self.state.watchlist.len(),
            total_views: self.detail_cache.values().map(|m| m.view_count).sum(),
        };
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
    use std::sync::Mutex;

    static DIR_SEQ: AtomicU32 = AtomicU32::new(0);

    fn test_store() -> MovieStore {
        let seq = DIR_SEQ.fetch_add(1, Ordering::Relaxed);
        let dir = std::env::temp_dir().join(format!(
            "cinetui-store-test-{}-{}",
            std::process::id(),
            seq
        ));
        let _ = std::fs::remove_dir_all(&dir);
        MovieStore::new(Arc::new(Storage::at(dir)))
    }

    fn movie(id: u64, title: &str) -> Movie {
        Movie {
            id,
            title: title.to_string(),
            original_title: title.to_string(),
            overview: "overview".to_string(),
            tagline: String::new(),
            poster_path: None,
            backdrop_path: None,
            release_date: None,
            year: None,
            vote_average: 5.0,
            vote_count: 10,
            popularity: 1.0,
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

    fn page(results: Vec<Movie>, total_pages: u32) -> Page<Movie> {
        let total_results = results.len() as u32;
        Page {
            page: 1,
            results,
            total_pages,
            total_results,
        }
    }

    #[test]
    fn test_set_movies_clamps_total_pages() {
        let mut store = test_store();
        store.set_movies(page(vec![movie(1, "A")], 9000));
        assert_eq!(store.state().total_pages, MAX_TOTAL_PAGES);
        assert!(!store.state().loading);
    }

    #[test]
    fn test_set_page_clamps_range() {
        let mut store = test_store();
        store.set_movies(page(vec![movie(1, "A")], 10));

        store.set_page(0);
        assert_eq!(store.state().current_page, 1);

        store.set_page(25);
        assert_eq!(store.state().current_page, 10);

        store.set_page(7);
        assert_eq!(store.state().current_page, 7);
    }

    #[test]
    fn test_duplicate_favorite_is_noop() {
        let mut store = test_store();
        assert!(store.add_favorite(movie(1, "A")));
        assert!(!store.add_favorite(movie(1, "A")));
        assert_eq!(store.state().favorites.len(), 1);
    }

    #[test]
    fn test_duplicate_watchlist_is_noop() {
        let mut store = test_store();
        assert!(store.add_to_watchlist(movie(2, "B")));
        assert!(!store.add_to_watchlist(movie(2, "B")));
        assert_eq!(store.state().watchlist.len(), 1);
    }

    #[test]
    fn test_remove_favorite() {
        let mut store = test_store();
        store.add_favorite(movie(1, "A"));
        assert!(store.remove_favorite(1));
        assert!(!store.remove_favorite(1));
        assert!(store.state().favorites.is_empty());
    }

    #[test]
    fn test_toggle_favorite_requires_cached_instance() {
        let mut store = test_store();
        // Nothing cached under this id: toggle must be a no-op
        assert!(!store.toggle_favorite(99));
        assert!(store.state().favorites.is_empty());

        store.set_movies(page(vec![movie(99, "Cached")], 1));
        assert!(store.toggle_favorite(99));
        assert_eq!(store.state().favorites.len(), 1);
        // Second toggle removes
        assert!(store.toggle_favorite(99));
        assert!(store.state().favorites.is_empty());
    }

    #[test]
    fn test_favorites_persist_across_stores() {
        let seq = DIR_SEQ.fetch_add(1, Ordering::Relaxed);
        let dir = std::env::temp_dir().join(format!(
            "cinetui-store-persist-{}-{}",
            std::process::id(),
            seq
        ));
        let _ = std::fs::remove_dir_all(&dir);
        let storage = Arc::new(Storage::at(dir.clone()));

        let mut store = MovieStore::new(storage);
        store.add_favorite(movie(5, "Kept"));
        drop(store);

        let reloaded = MovieStore::new(Arc::new(Storage::at(dir)));
        assert_eq!(reloaded.state().favorites.len(), 1);
        assert_eq!(reloaded.state().favorites[0].title, "Kept");
    }

    #[test]
    fn test_genre_filter() {
        let mut store = test_store();
        let mut action = movie(1, "Action Movie");
        action.genre_ids = vec![28];
        let mut drama = movie(2, "Drama Movie");
        drama.genre_ids = vec![18];
        store.set_movies(page(vec![action, drama], 1));

        store.set_genre_filter(Some(28));
        assert_eq!(store.state().filtered.len(), 1);
        assert_eq!(store.state().filtered[0].title, "Action Movie");

        store.clear_filters();
        assert_eq!(store.state().filtered.len(), 2);
    }

    #[test]
    fn test_year_filter() {
        let mut store = test_store();
        let mut old = movie(1, "Old");
        old.year = Some(1999);
        let mut new = movie(2, "New");
        new.year = Some(2023);
        store.set_movies(page(vec![old, new], 1));

        store.set_year_filter(Some(1999));
        assert_eq!(store.state().filtered.len(), 1);
        assert_eq!(store.state().filtered[0].title, "Old");
    }

    #[test]
    fn test_sort_by_rating() {
        let mut store = test_store();
        let mut low = movie(1, "Low");
        low.vote_average = 4.0;
        let mut high = movie(2, "High");
        high.vote_average = 9.0;
        store.set_movies(page(vec![low, high], 1));

        store.set_sort(SortKey::Rating);
        assert_eq!(store.state().filtered[0].title, "High");
    }

    #[test]
    fn test_sort_equal_keys_keep_order() {
        let mut store = test_store();
        let mut first = movie(1, "First");
        first.vote_average = 7.0;
        let mut second = movie(2, "Second");
        second.vote_average = 7.0;
        store.set_movies(page(vec![first, second], 1));

        store.set_sort(SortKey::Rating);
        assert_eq!(store.state().filtered[0].title, "First");
        assert_eq!(store.state().filtered[1].title, "Second");
    }

    #[test]
    fn test_sort_by_release_date() {
        let mut store = test_store();
        let mut older = movie(1, "Older");
        older.release_date = Some("2001-01-01".to_string());
        let mut newer = movie(2, "Newer");
        newer.release_date = Some("2020-06-15".to_string());
        store.set_movies(page(vec![older, newer], 1));

        store.set_sort(SortKey::ReleaseDate);
        assert_eq!(store.state().filtered[0].title, "Newer");
    }

    #[test]
    fn test_subscribers_receive_every_mutation() {
        let mut store = test_store();
        let count = Arc::new(Mutex::new(0));
        let seen = Arc::clone(&count);
        store.subscribe(move |_| {
            *seen.lock().unwrap() += 1;
        });

        store.set_loading(true);
        store.set_loading(false);
        store.set_page(1);
        assert_eq!(*count.lock().unwrap(), 3);
    }

    #[test]
    fn test_unsubscribe_stops_callbacks() {
        let mut store = test_store();
        let count = Arc::new(Mutex::new(0));
        let seen = Arc::clone(&count);
        let id = store.subscribe(move |_| {
            *seen.lock().unwrap() += 1;
        });

        store.set_loading(true);
        store.unsubscribe(id);
        store.set_loading(false);
        assert_eq!(*count.lock().unwrap(), 1);
    }

    #[test]
    fn test_set_error_clears_loading() {
        let mut store = test_store();
        store.set_loading(true);
        store.set_error("boom");
        assert!(!store.state().loading);
        assert_eq!(store.state().error.as_deref(), Some("boom"));
        assert_eq!(store.take_notice().as_deref(), Some("boom"));
    }

    #[test]
    fn test_set_movie_details_bumps_view_count() {
        let mut store = test_store();
        store.set_movie_details(movie(1, "Seen"));
        assert_eq!(store.state().selected.as_ref().unwrap().view_count, 1);
        assert!(store.state().selected.as_ref().unwrap().last_viewed.is_some());

        let cached = store.detail_from_cache(1).unwrap();
        store.set_movie_details(cached);
        assert_eq!(store.state().selected.as_ref().unwrap().view_count, 2);
        assert_eq!(store.state().stats.total_views, 2);
    }

    #[test]
    fn test_export_import_roundtrip() {
        let mut store = test_store();
        store.add_favorite(movie(3, "Fav A"));
        store.add_favorite(movie(1, "Fav B"));
        store.add_to_watchlist(movie(7, "Watch"));
        store.set_search_query("inception");

        let exported = store.export_state().unwrap();

        let mut fresh = test_store();
        fresh.import_state(&exported).unwrap();

        let ids: Vec<u64> = fresh.state().favorites.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![3, 1]); // same ids, same order
        assert_eq!(fresh.state().watchlist.len(), 1);
        assert_eq!(fresh.state().search_query, "inception");
    }

    #[test]
    fn test_import_rejects_unknown_keys() {
        let mut store = test_store();
        let result = store.import_state(r#"{"favorites": [], "evil": true}"#);
        assert!(result.is_err());
        assert!(store.state().favorites.is_empty());
    }

    #[test]
    fn test_import_rejects_non_array_lists() {
        let mut store = test_store();
        assert!(store
            .import_state(r#"{"favorites": "nope", "watchlist": []}"#)
            .is_err());
        assert!(store.import_state("not json at all").is_err());
        assert!(store.import_state("[1,2,3]").is_err());
    }

    #[test]
    fn test_clear_all_resets_state() {
        let mut store = test_store();
        store.add_favorite(movie(1, "A"));
        store.set_movies(page(vec![movie(2, "B")], 5));
        store.set_search_query("query");

        store.clear_all();

        assert!(store.state().movies.is_empty());
        assert!(store.state().favorites.is_empty());
        assert_eq!(store.state().search_query, "");
        assert_eq!(store.state().current_page, 1);
        assert!(store.movie_from_cache(2).is_none());
    }

    #[test]
    fn test_view_mode_toggle_and_persist() {
        let mut store = test_store();
        assert_eq!(store.state().view_mode, ViewMode::Grid);
        store.set_view_mode(store.state().view_mode.toggled());
        assert_eq!(store.state().view_mode, ViewMode::List);
    }

    #[test]
    fn test_sort_key_api_values() {
        assert_eq!(SortKey::Popularity.api_value(), "popularity.desc");
        assert_eq!(SortKey::Rating.api_value(), "vote_average.desc");
        assert_eq!(SortKey::parse("vote_average.desc"), SortKey::Rating);
        assert_eq!(SortKey::parse("whatever"), SortKey::Popularity);
    }
}
