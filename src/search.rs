//! Search and query coordination
//!
//! Translates UI intents (search, browse, filter, page changes) into API
//! calls and state updates. Every fetch sets the loading flag up front and
//! routes failures into the store's error setter. Overlapping list fetches
//! are sequence-tagged so a slow stale response can never overwrite newer
//! results.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::api::{DiscoverFilters, TmdbClient, TrendingKind, TrendingWindow};
use crate::models::{Genre, Movie, Page};
use crate::storage::{Storage, KEY_SEARCH_HISTORY};
use crate::store::{MovieStore, SortKey};

/// Keystrokes within this window collapse into one autocomplete request
const DEBOUNCE_DELAY: Duration = Duration::from_millis(500);

/// Autocomplete needs at least this many characters
const AUTOCOMPLETE_MIN_CHARS: usize = 2;

/// Autocomplete returns at most this many suggestions
const AUTOCOMPLETE_LIMIT: usize = 5;

/// Search history keeps this many entries, most recent first
const HISTORY_LIMIT: usize = 20;

/// Detail fetches expand these sections in one request
const DETAIL_EXPANSIONS: [&str; 4] = ["credits", "videos", "similar", "recommendations"];

pub type SharedStore = Arc<Mutex<MovieStore>>;

/// One remembered search
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryEntry {
    pub query: String,
    pub timestamp: i64,
    pub display_date: String,
}

/// A lightweight autocomplete row
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Suggestion {
    pub id: u64,
    pub title: String,
    pub year: Option<u16>,
    pub poster_path: Option<String>,
}

/// Coordinates searches, list fetches and detail loads against the store
pub struct SearchCoordinator {
    client: Arc<TmdbClient>,
    store: SharedStore,
    storage: Arc<Storage>,
    history: Mutex<Vec<HistoryEntry>>,
    genres: Mutex<Vec<Genre>>,
    suggestions: Arc<Mutex<Vec<Suggestion>>>,
    debounce: Mutex<Option<JoinHandle<()>>>,
    debounce_delay: Duration,
    /// Sequence of the most recently dispatched list fetch
    fetch_seq: AtomicU64,
}

impl SearchCoordinator {
    pub fn new(client: Arc<TmdbClient>, store: SharedStore, storage: Arc<Storage>) -> Self {
        let history = storage.get_or(KEY_SEARCH_HISTORY, Vec::new());
        Self {
            client,
            store,
            storage,
            history: Mutex::new(history),
            genres: Mutex::new(Vec::new()),
            suggestions: Arc::new(Mutex::new(Vec::new())),
            debounce: Mutex::new(None),
            debounce_delay: DEBOUNCE_DELAY,
            fetch_seq: AtomicU64::new(0),
        }
    }

    /// Shrink the debounce window (tests)
    pub fn with_debounce_delay(mut self, delay: Duration) -> Self {
        self.debounce_delay = delay;
        self
    }

    pub fn client(&self) -> &Arc<TmdbClient> {
        &self.client
    }

    fn with_store(&self, apply: impl FnOnce(&mut MovieStore)) {
        if let Ok(mut store) = self.store.lock() {
            apply(&mut store);
        }
    }

    fn read_store<T>(&self, read: impl FnOnce(&MovieStore) -> T) -> Option<T> {
        self.store.lock().ok().map(|store| read(&store))
    }

    // -------------------------------------------------------------------------
    // Sequence guard
    // -------------------------------------------------------------------------

    fn begin_fetch(&self) -> u64 {
        self.fetch_seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Only the newest dispatched fetch may write its result to state
    fn is_current(&self, seq: u64) -> bool {
        seq == self.fetch_seq.load(Ordering::SeqCst)
    }

    fn commit_list(&self, seq: u64, result: Result<Page<Movie>>) -> Result<()> {
        if !self.is_current(seq) {
            // A newer fetch superseded this one; drop the response
            return Ok(());
        }
        match result {
            Ok(page) => {
                self.with_store(|store| store.set_movies(page));
                Ok(())
            }
            Err(e) => {
                self.with_store(|store| store.set_error(e.to_string()));
                Err(e)
            }
        }
    }

    // -------------------------------------------------------------------------
    // List operations
    // -------------------------------------------------------------------------

    /// Keyword search, paginated; successful searches land in the history
    pub async fn search(&self, query: &str, page: u32) -> Result<()> {
        let seq = self.begin_fetch();
        self.with_store(|store| {
            store.set_search_query(query);
            store.set_loading(true);
        });

        let result = self.client.search_movies(query, page).await;
        if result.is_ok() {
            self.add_to_history(query);
        }
        self.commit_list(seq, result)
    }

    /// Popular list, paginated
    pub async fn popular(&self, page: u32) -> Result<()> {
        let seq = self.begin_fetch();
        self.with_store(|store| {
            store.set_search_query("");
            store.set_loading(true);
        });
        let result = self.client.popular(page).await;
        self.commit_list(seq, result)
    }

    /// Filtered discovery; also records the filters in the store
    pub async fn apply_filters(
        &self,
        genre: Option<u32>,
        year: Option<u16>,
        sort: SortKey,
    ) -> Result<()> {
        let seq = self.begin_fetch();
        self.with_store(|store| {
            store.set_genre_filter(genre);
            store.set_year_filter(year);
            store.set_sort(sort);
            store.set_loading(true);
        });

        let filters = DiscoverFilters {
            genre,
            year,
            min_rating: None,
            language: None,
            sort_by: Some(sort.api_value().to_string()),
        };
        let result = self.client.discover(&filters, 1).await;
        self.commit_list(seq, result)
    }

    /// Raw discovery without touching the stored filters
    pub async fn discover(&self, filters: &DiscoverFilters, page: u32) -> Result<()> {
        let seq = self.begin_fetch();
        self.with_store(|store| store.set_loading(true));
        let result = self.client.discover(filters, page).await;
        self.commit_list(seq, result)
    }

    /// Trending titles for a day/week window
    pub async fn trending(&self, window: TrendingWindow) -> Result<()> {
        let seq = self.begin_fetch();
        self.with_store(|store| {
            store.set_search_query("");
            store.set_loading(true);
        });
        let result = self.client.trending(TrendingKind::Movie, window).await;
        self.commit_list(seq, result)
    }

    /// Re-issue the last search (or the popular list when there is none)
    /// against the requested page
    pub async fn change_page(&self, page: u32) -> Result<()> {
        let (query, total_pages) = self
            .read_store(|store| {
                (
                    store.state().search_query.clone(),
                    store.state().total_pages,
                )
            })
            .unwrap_or((String::new(), 1));
        let page = page.clamp(1, total_pages.max(1));

        let outcome = if query.trim().is_empty() {
            self.popular(page).await
        } else {
            self.search(&query, page).await
        };
        self.with_store(|store| store.set_page(page));
        outcome
    }

    // -------------------------------------------------------------------------
    // Detail
    // -------------------------------------------------------------------------

    /// Detail fetch with a cache-first short-circuit by id
    pub async fn details(&self, id: u64) -> Result<Movie> {
        let cached = self.read_store(|store| store.detail_from_cache(id)).flatten();
        if let Some(movie) = cached {
            return Ok(self.select_detail(movie));
        }

        self.with_store(|store| store.set_loading(true));
        match self.client.movie_details(id, &DETAIL_EXPANSIONS).await {
            Ok(movie) => Ok(self.select_detail(movie)),
            Err(e) => {
                self.with_store(|store| store.set_error(e.to_string()));
                Err(e)
            }
        }
    }

    /// Hand a movie to the store as the selected detail and return the
    /// stored copy (the store stamps the view counter)
    fn select_detail(&self, movie: Movie) -> Movie {
        self.with_store(|store| store.set_movie_details(movie.clone()));
        self.read_store(|store| store.state().selected.clone())
            .flatten()
            .unwrap_or(movie)
    }

    // -------------------------------------------------------------------------
    // Autocomplete
    // -------------------------------------------------------------------------

    /// Debounced autocomplete: each keystroke cancels the pending request
    /// task and schedules a new one; only the survivor hits the network.
    pub fn schedule_autocomplete(&self, query: &str) {
        if let Ok(mut pending) = self.debounce.lock() {
            if let Some(handle) = pending.take() {
                handle.abort();
            }

            let trimmed = query.trim().to_string();
            if trimmed.chars().count() < AUTOCOMPLETE_MIN_CHARS {
                if let Ok(mut suggestions) = self.suggestions.lock() {
                    suggestions.clear();
                }
                return;
            }

            let client = Arc::clone(&self.client);
            let suggestions = Arc::clone(&self.suggestions);
            let delay = self.debounce_delay;
            *pending = Some(tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                let rows = Self::fetch_suggestions(&client, &trimmed).await;
                if let Ok(mut slot) = suggestions.lock() {
                    *slot = rows;
                }
            }));
        }
    }

    async fn fetch_suggestions(client: &TmdbClient, query: &str) -> Vec<Suggestion> {
        match client.search_movies(query, 1).await {
            Ok(page) => page
                .results
                .into_iter()
                .take(AUTOCOMPLETE_LIMIT)
                .map(|m| Suggestion {
                    id: m.id,
                    title: m.title,
                    year: m.year,
                    poster_path: m.poster_path,
                })
                .collect(),
            // Autocomplete failures are silent; the main search surfaces errors
            Err(_) => Vec::new(),
        }
    }

    /// Immediate (undebounced) autocomplete, used by tests and the CLI
    pub async fn autocomplete_now(&self, query: &str) -> Vec<Suggestion> {
        let trimmed = query.trim();
        if trimmed.chars().count() < AUTOCOMPLETE_MIN_CHARS {
            return Vec::new();
        }
        let rows = Self::fetch_suggestions(&self.client, trimmed).await;
        if let Ok(mut slot) = self.suggestions.lock() {
            *slot = rows.clone();
        }
        rows
    }

    pub fn suggestions(&self) -> Vec<Suggestion> {
        self.suggestions
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    // -------------------------------------------------------------------------
    // Search history
    // -------------------------------------------------------------------------

    pub fn history(&self) -> Vec<HistoryEntry> {
        self.history.lock().map(|h| h.clone()).unwrap_or_default()
    }

    /// Record a query: most recent first, case-insensitive dedup, capped
    pub fn add_to_history(&self, query: &str) {
        let cleaned = query.trim();
        if cleaned.is_empty() {
            return;
        }

        if let Ok(mut history) = self.history.lock() {
            let lowered = cleaned.to_lowercase();
            history.retain(|entry| entry.query.to_lowercase() != lowered);

            let now = chrono::Utc::now();
            history.insert(
                0,
                HistoryEntry {
                    query: cleaned.to_string(),
                    timestamp: now.timestamp_millis(),
                    display_date: now.format("%Y-%m-%d").to_string(),
                },
            );
            history.truncate(HISTORY_LIMIT);

            if let Err(e) = self.storage.set(KEY_SEARCH_HISTORY, &*history) {
                self.with_store(|store| {
                    store.set_error(format!("Could not save search history: {}", e))
                });
            }
        }
    }

    pub fn clear_history(&self) {
        if let Ok(mut history) = self.history.lock() {
            history.clear();
        }
        let _ = self.storage.remove(KEY_SEARCH_HISTORY);
    }

    // -------------------------------------------------------------------------
    // Genres
    // -------------------------------------------------------------------------

    /// Load and merge the movie and TV genre lists, deduplicated by id and
    /// sorted by name. Best effort: failures leave the catalog empty.
    pub async fn load_genres(&self) -> Result<Vec<Genre>> {
        let movie_genres = self.client.movie_genres().await?;
        let tv_genres = self.client.tv_genres().await?;

        let mut merged: Vec<Genre> = movie_genres;
        for genre in tv_genres {
            if !merged.iter().any(|g| g.id == genre.id) {
                merged.push(genre);
            }
        }
        merged.sort_by(|a, b| a.name.cmp(&b.name));

        if let Ok(mut slot) = self.genres.lock() {
            *slot = merged.clone();
        }
        Ok(merged)
    }

    pub fn genres(&self) -> Vec<Genre> {
        self.genres.lock().map(|g| g.clone()).unwrap_or_default()
    }

    pub fn genre_name(&self, id: u32) -> Option<String> {
        self.genres
            .lock()
            .ok()
            .and_then(|g| g.iter().find(|genre| genre.id == id).map(|genre| genre.name.clone()))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;

    static DIR_SEQ: AtomicU32 = AtomicU32::new(0);

    fn test_coordinator() -> SearchCoordinator {
        let seq = DIR_SEQ.fetch_add(1, Ordering::Relaxed);
        let dir = std::env::temp_dir().join(format!(
            "cinetui-search-test-{}-{}",
            std::process::id(),
            seq
        ));
        let _ = std::fs::remove_dir_all(&dir);
        let storage = Arc::new(Storage::at(dir));
        let store = Arc::new(Mutex::new(MovieStore::new(Arc::clone(&storage))));
        // Unroutable base URL: unit tests never reach the network
        let client = Arc::new(
            TmdbClient::with_base_url("test", "http://127.0.0.1:9")
                .with_retry_delay(Duration::from_millis(1)),
        );
        SearchCoordinator::new(client, store, storage)
    }

    #[test]
    fn test_history_most_recent_first() {
        let coordinator = test_coordinator();
        coordinator.add_to_history("alien");
        coordinator.add_to_history("blade runner");

        let history = coordinator.history();
        assert_eq!(history[0].query, "blade runner");
        assert_eq!(history[1].query, "alien");
    }

    #[test]
    fn test_history_dedup_case_insensitive() {
        let coordinator = test_coordinator();
        coordinator.add_to_history("Dune");
        coordinator.add_to_history("alien");
        coordinator.add_to_history("DUNE");

        let history = coordinator.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].query, "DUNE");
        assert_eq!(history[1].query, "alien");
    }

    #[test]
    fn test_history_capped_at_limit() {
        let coordinator = test_coordinator();
        for i in 0..30 {
            coordinator.add_to_history(&format!("query {}", i));
        }
        assert_eq!(coordinator.history().len(), HISTORY_LIMIT);
        assert_eq!(coordinator.history()[0].query, "query 29");
    }

    #[test]
    fn test_history_ignores_blank() {
        let coordinator = test_coordinator();
        coordinator.add_to_history("   ");
        assert!(coordinator.history().is_empty());
    }

    #[test]
    fn test_history_entry_has_display_date() {
        let coordinator = test_coordinator();
        coordinator.add_to_history("dune");
        let entry = &coordinator.history()[0];
        assert!(entry.timestamp > 0);
        // YYYY-MM-DD
        assert_eq!(entry.display_date.len(), 10);
        assert_eq!(entry.display_date.matches('-').count(), 2);
    }

    #[test]
    fn test_clear_history() {
        let coordinator = test_coordinator();
        coordinator.add_to_history("dune");
        coordinator.clear_history();
        assert!(coordinator.history().is_empty());
    }

    #[tokio::test]
    async fn test_autocomplete_min_length() {
        let coordinator = test_coordinator();
        // Under two characters: no request, empty result
        assert!(coordinator.autocomplete_now("d").await.is_empty());
        assert!(coordinator.autocomplete_now(" ").await.is_empty());
    }

    #[tokio::test]
    async fn test_schedule_autocomplete_short_query_clears() {
        let coordinator = test_coordinator();
        if let Ok(mut slot) = coordinator.suggestions.lock() {
            slot.push(Suggestion {
                id: 1,
                title: "Stale".to_string(),
                year: None,
                poster_path: None,
            });
        }
        coordinator.schedule_autocomplete("x");
        assert!(coordinator.suggestions().is_empty());
    }

    #[tokio::test]
    async fn test_debounce_cancels_pending_task() {
        let coordinator = test_coordinator().with_debounce_delay(Duration::from_millis(50));
        coordinator.schedule_autocomplete("first query");
        // Reschedule before the delay elapses; the first task must be aborted
        coordinator.schedule_autocomplete("second query");

        let first_handle_gone = coordinator
            .debounce
            .lock()
            .map(|p| p.is_some())
            .unwrap_or(false);
        assert!(first_handle_gone, "a pending task should be scheduled");

        tokio::time::sleep(Duration::from_millis(120)).await;
        // Only the surviving request ran; the unreachable client yields no rows
        assert!(coordinator.suggestions().is_empty());
    }

    #[test]
    fn test_sequence_guard_discards_stale() {
        let coordinator = test_coordinator();
        let older = coordinator.begin_fetch();
        let newer = coordinator.begin_fetch();
        assert!(!coordinator.is_current(older));
        assert!(coordinator.is_current(newer));
    }

    #[tokio::test]
    async fn test_failed_search_routes_error_into_store() {
        let coordinator = test_coordinator();
        let result = coordinator.search("dune", 1).await;
        assert!(result.is_err());

        let state_error = coordinator
            .read_store(|store| store.state().error.clone())
            .flatten();
        assert!(state_error.is_some());
        let loading = coordinator
            .read_store(|store| store.state().loading)
            .unwrap();
        assert!(!loading);
    }
}
