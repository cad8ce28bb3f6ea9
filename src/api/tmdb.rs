//! TMDB (The Movie Database) API client
//!
//! Search, listing, discovery and detail fetches with an in-memory
//! time-boxed response cache, a per-session request ceiling, and a
//! linear-backoff retry loop.
//! API docs: https://developer.themoviedb.org/docs

use anyhow::Result;
use reqwest::StatusCode;
use serde::Deserialize;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use thiserror::Error;

use crate::models::{
    extract_year, CastMember, CrewMember, Genre, MediaType, Movie, Page, Video, VideoKind,
    VideoSite, NO_OVERVIEW, UNTITLED,
};

/// Responses are reused for this long before hitting the network again
const CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// Cached entries beyond this count are evicted oldest-inserted-first
const CACHE_CAPACITY: usize = 100;

/// Soft per-session request ceiling; exceeding it fails fast
const REQUEST_LIMIT: u32 = 40;

/// TMDB API error types
#[derive(Error, Debug)]
pub enum TmdbError {
    #[error("Invalid API key. Check your TMDB credentials.")]
    Unauthorized,

    #[error("The requested resource was not found.")]
    NotFound,

    #[error("Too many requests. Please wait a moment and try again.")]
    RateLimited,

    #[error("Server error ({0}). Please try again later.")]
    ServerError(u16),

    #[error("Request failed with status {0}. Please try again.")]
    UnexpectedStatus(u16),

    #[error("Session request limit reached. Please wait before searching again.")]
    RequestLimitReached,

    #[error("Search query must not be empty.")]
    EmptyQuery,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Network error: {0}")]
    RequestFailed(#[from] reqwest::Error),
}

impl TmdbError {
    fn from_status(status: StatusCode) -> Self {
        match status.as_u16() {
            401 => TmdbError::Unauthorized,
            404 => TmdbError::NotFound,
            429 => TmdbError::RateLimited,
            s if (500..600).contains(&s) => TmdbError::ServerError(s),
            s => TmdbError::UnexpectedStatus(s),
        }
    }
}

/// Trending time window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrendingWindow {
    #[default]
    Day,
    Week,
}

impl TrendingWindow {
    pub fn as_str(self) -> &'static str {
        match self {
            TrendingWindow::Day => "day",
            TrendingWindow::Week => "week",
        }
    }
}

/// Trending media selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrendingKind {
    #[default]
    Movie,
    Tv,
    All,
}

impl TrendingKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TrendingKind::Movie => "movie",
            TrendingKind::Tv => "tv",
            TrendingKind::All => "all",
        }
    }
}

/// Filters for the discover endpoint
#[derive(Debug, Clone, Default)]
pub struct DiscoverFilters {
    pub genre: Option<u32>,
    pub year: Option<u16>,
    pub min_rating: Option<f32>,
    pub language: Option<String>,
    /// API sort key, e.g. "popularity.desc"
    pub sort_by: Option<String>,
}

/// Counters exposed for diagnostics and tests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientStats {
    pub request_count: u32,
    pub request_limit: u32,
    pub cache_size: usize,
}

struct CacheEntry {
    body: String,
    inserted: Instant,
}

/// Response cache keyed by endpoint+params, expiring after [`CACHE_TTL`]
/// and evicting in insertion order past [`CACHE_CAPACITY`]. Not an LRU.
struct ResponseCache {
    entries: HashMap<String, CacheEntry>,
    insertion_order: VecDeque<String>,
}

impl ResponseCache {
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
            insertion_order: VecDeque::new(),
        }
    }

    fn get(&mut self, key: &str) -> Option<String> {
        let stale = match self.entries.get(key) {
            Some(entry) => entry.inserted.elapsed() > CACHE_TTL,
            None => return None,
        };
        if stale {
            self.entries.remove(key);
            self.insertion_order.retain(|k| k != key);
            return None;
        }
        self.entries.get(key).map(|e| e.body.clone())
    }

    fn put(&mut self, key: String, body: String) {
        if !self.entries.contains_key(&key) {
            self.insertion_order.push_back(key.clone());
        }
        self.entries.insert(
            key,
            CacheEntry {
                body,
                inserted: Instant::now(),
            },
        );
        while self.entries.len() > CACHE_CAPACITY {
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
}

/// TMDB API client
pub struct TmdbClient {
    api_key: String,
    base_url: String,
    language: String,
    client: reqwest::Client,
    max_retries: u32,
    retry_delay: Duration,
    request_count: AtomicU32,
    request_limit: AtomicU32,
    cache: Mutex<ResponseCache>,
}

impl TmdbClient {
    /// Create a new TMDB client with the given API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, "https://api.themoviedb.org/3")
    }

    /// Create a client with a custom base URL (for testing)
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into(),
            language: "en-US".to_string(),
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
            max_retries: 3,
            retry_delay: Duration::from_millis(1000),
            request_count: AtomicU32::new(0),
            request_limit: AtomicU32::new(REQUEST_LIMIT),
            cache: Mutex::new(ResponseCache::new()),
        }
    }

    /// Override the retry backoff base (tests shrink it to keep runs fast)
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Override the response language
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Requests issued this session (cache hits excluded)
    pub fn request_count(&self) -> u32 {
        self.request_count.load(Ordering::Relaxed)
    }

    pub fn stats(&self) -> ClientStats {
        let cache_size = self.cache.lock().map(|c| c.len()).unwrap_or(0);
        ClientStats {
            request_count: self.request_count.load(Ordering::Relaxed),
            request_limit: self.request_limit.load(Ordering::Relaxed),
            cache_size,
        }
    }

    pub fn clear_cache(&self) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.clear();
        }
    }

    fn cache_key(endpoint: &str, params: &[(&str, String)]) -> String {
        let mut key = String::from(endpoint);
        for (name, value) in params {
            key.push_str(&format!(":{}={}", name, value));
        }
        key
    }

    fn build_url(&self, endpoint: &str, params: &[(&str, String)]) -> String {
        let mut url = format!(
            "{}{}?api_key={}&language={}",
            self.base_url,
            endpoint,
            urlencoding::encode(&self.api_key),
            urlencoding::encode(&self.language)
        );
        for (name, value) in params {
            url.push_str(&format!("&{}={}", name, urlencoding::encode(value)));
        }
        url
    }

    /// Fetch an endpoint with cache check, request ceiling, and retry loop
    async fn get<T: for<'de> Deserialize<'de>>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let cache_key = Self::cache_key(endpoint, params);

        if let Ok(mut cache) = self.cache.lock() {
            if let Some(body) = cache.get(&cache_key) {
                let parsed: T = serde_json::from_str(&body)
                    .map_err(|e| TmdbError::InvalidResponse(format!("cached body: {}", e)))?;
                return Ok(parsed);
            }
        }

        if self.request_count.load(Ordering::Relaxed) >= self.request_limit.load(Ordering::Relaxed)
        {
            return Err(TmdbError::RequestLimitReached.into());
        }

        let url = self.build_url(endpoint, params);
        self.request_count.fetch_add(1, Ordering::Relaxed);

        let mut last_error: Option<anyhow::Error> = None;
        for attempt in 1..=self.max_retries {
            match self.try_once::<T>(&url, &cache_key).await {
                Ok(parsed) => return Ok(parsed),
                Err(e) => last_error = Some(e),
            }
            if attempt < self.max_retries {
                // Linear backoff: delay grows with the attempt number
                tokio::time::sleep(self.retry_delay * attempt).await;
            }
        }

        Err(last_error
            .unwrap_or_else(|| TmdbError::InvalidResponse("no attempts made".to_string()).into()))
    }

    async fn try_once<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        cache_key: &str,
    ) -> Result<T> {
        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await?;

        // The API advertises the remaining quota; track it as our ceiling
        if let Some(remaining) = response
            .headers()
            .get("x-ratelimit-remaining")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u32>().ok())
        {
            self.request_limit.store(remaining, Ordering::Relaxed);
        }

        let status = response.status();
        if !status.is_success() {
            return Err(TmdbError::from_status(status).into());
        }

        let body = response.text().await?;
        let parsed: T = serde_json::from_str(&body)
            .map_err(|e| TmdbError::InvalidResponse(format!("JSON parse error: {}", e)))?;

        if let Ok(mut cache) = self.cache.lock() {
            cache.put(cache_key.to_string(), body);
        }

        Ok(parsed)
    }

    fn require_query(query: &str) -> Result<String> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Err(TmdbError::EmptyQuery.into());
        }
        Ok(trimmed.to_string())
    }

    // -------------------------------------------------------------------------
    // Search
    // -------------------------------------------------------------------------

    /// Search movies by keyword
    pub async fn search_movies(&self, query: &str, page: u32) -> Result<Page<Movie>> {
        let query = Self::require_query(query)?;
        let params = [
            ("query", query),
            ("page", page.to_string()),
            ("include_adult", "false".to_string()),
        ];
        let raw: Page<MovieRaw> = self.get("/search/movie", &params).await?;
        Ok(raw.map(MovieRaw::into_movie))
    }

    /// Search TV shows by keyword
    pub async fn search_tv(&self, query: &str, page: u32) -> Result<Page<Movie>> {
        let query = Self::require_query(query)?;
        let params = [
            ("query", query),
            ("page", page.to_string()),
            ("include_adult", "false".to_string()),
        ];
        let raw: Page<MovieRaw> = self.get("/search/tv", &params).await?;
        Ok(raw.map(MovieRaw::into_movie))
    }

    /// Multi-type search; person results are dropped during normalization
    pub async fn multi_search(&self, query: &str, page: u32) -> Result<Page<Movie>> {
        let query = Self::require_query(query)?;
        let params = [
            ("query", query),
            ("page", page.to_string()),
            ("include_adult", "false".to_string()),
        ];
        let raw: Page<MultiRaw> = self.get("/search/multi", &params).await?;
        Ok(Page {
            page: raw.page,
            total_pages: raw.total_pages,
            total_results: raw.total_results,
            results: raw
                .results
                .into_iter()
                .filter_map(MultiRaw::into_movie)
                .collect(),
        })
    }

    // -------------------------------------------------------------------------
    // Lists
    // -------------------------------------------------------------------------

    pub async fn popular(&self, page: u32) -> Result<Page<Movie>> {
        let params = [("page", page.to_string())];
        let raw: Page<MovieRaw> = self.get("/movie/popular", &params).await?;
        Ok(raw.map(MovieRaw::into_movie))
    }

    pub async fn top_rated(&self, page: u32) -> Result<Page<Movie>> {
        let params = [("page", page.to_string())];
        let raw: Page<MovieRaw> = self.get("/movie/top_rated", &params).await?;
        Ok(raw.map(MovieRaw::into_movie))
    }

    pub async fn now_playing(&self, page: u32) -> Result<Page<Movie>> {
        let params = [("page", page.to_string())];
        let raw: Page<MovieRaw> = self.get("/movie/now_playing", &params).await?;
        Ok(raw.map(MovieRaw::into_movie))
    }

    pub async fn upcoming(&self, page: u32) -> Result<Page<Movie>> {
        let params = [("page", page.to_string())];
        let raw: Page<MovieRaw> = self.get("/movie/upcoming", &params).await?;
        Ok(raw.map(MovieRaw::into_movie))
    }

    pub async fn popular_tv(&self, page: u32) -> Result<Page<Movie>> {
        let params = [("page", page.to_string())];
        let raw: Page<MovieRaw> = self.get("/tv/popular", &params).await?;
        Ok(raw.map(MovieRaw::into_movie))
    }

    /// Trending titles for a time window
    pub async fn trending(&self, kind: TrendingKind, window: TrendingWindow) -> Result<Page<Movie>> {
        let endpoint = format!("/trending/{}/{}", kind.as_str(), window.as_str());
        let raw: Page<MultiRaw> = self.get(&endpoint, &[]).await?;
        Ok(Page {
            page: raw.page,
            total_pages: raw.total_pages,
            total_results: raw.total_results,
            results: raw
                .results
                .into_iter()
                .filter_map(MultiRaw::into_movie)
                .collect(),
        })
    }

    /// Filtered discovery
    pub async fn discover(&self, filters: &DiscoverFilters, page: u32) -> Result<Page<Movie>> {
        let mut params: Vec<(&str, String)> = vec![
            ("page", page.to_string()),
            (
                "sort_by",
                filters
                    .sort_by
                    .clone()
                    .unwrap_or_else(|| "popularity.desc".to_string()),
            ),
            ("include_adult", "false".to_string()),
            ("include_video", "false".to_string()),
        ];
        if let Some(genre) = filters.genre {
            params.push(("with_genres", genre.to_string()));
        }
        if let Some(year) = filters.year {
            params.push(("primary_release_year", year.to_string()));
        }
        if let Some(rating) = filters.min_rating {
            params.push(("vote_average.gte", format!("{:.1}", rating)));
        }
        if let Some(language) = &filters.language {
            params.push(("with_original_language", language.clone()));
        }
        let raw: Page<MovieRaw> = self.get("/discover/movie", &params).await?;
        Ok(raw.map(MovieRaw::into_movie))
    }

    // -------------------------------------------------------------------------
    // Details and expansions
    // -------------------------------------------------------------------------

    /// Movie details, optionally expanded with credits/videos/similar/recommendations
    pub async fn movie_details(&self, id: u64, append: &[&str]) -> Result<Movie> {
        let endpoint = format!("/movie/{}", id);
        let mut params: Vec<(&str, String)> = Vec::new();
        if !append.is_empty() {
            params.push(("append_to_response", append.join(",")));
        }
        let raw: MovieRaw = self.get(&endpoint, &params).await?;
        Ok(raw.into_movie())
    }

    pub async fn movie_credits(&self, id: u64) -> Result<(Vec<CastMember>, Vec<CrewMember>)> {
        let endpoint = format!("/movie/{}/credits", id);
        let raw: CreditsRaw = self.get(&endpoint, &[]).await?;
        Ok(raw.into_credits())
    }

    pub async fn movie_videos(&self, id: u64) -> Result<Vec<Video>> {
        let endpoint = format!("/movie/{}/videos", id);
        let raw: VideoListRaw = self.get(&endpoint, &[]).await?;
        Ok(raw.results.into_iter().map(VideoRaw::into_video).collect())
    }

    pub async fn similar(&self, id: u64, page: u32) -> Result<Page<Movie>> {
        let endpoint = format!("/movie/{}/similar", id);
        let params = [("page", page.to_string())];
        let raw: Page<MovieRaw> = self.get(&endpoint, &params).await?;
        Ok(raw.map(MovieRaw::into_movie))
    }

    pub async fn recommendations(&self, id: u64, page: u32) -> Result<Page<Movie>> {
        let endpoint = format!("/movie/{}/recommendations", id);
        let params = [("page", page.to_string())];
        let raw: Page<MovieRaw> = self.get(&endpoint, &params).await?;
        Ok(raw.map(MovieRaw::into_movie))
    }

    // -------------------------------------------------------------------------
    // Genres and people
    // -------------------------------------------------------------------------

    pub async fn movie_genres(&self) -> Result<Vec<Genre>> {
        let raw: GenreListRaw = self.get("/genre/movie/list", &[]).await?;
        Ok(raw.genres)
    }

    pub async fn tv_genres(&self) -> Result<Vec<Genre>> {
        let raw: GenreListRaw = self.get("/genre/tv/list", &[]).await?;
        Ok(raw.genres)
    }

    /// Person details with combined credits and external ids, for the
    /// lazily fetched bio fields and filmography
    pub async fn person_details(&self, id: u64) -> Result<CastMember> {
        let endpoint = format!("/person/{}", id);
        let params = [(
            "append_to_response",
            "combined_credits,external_ids".to_string(),
        )];
        let raw: PersonRaw = self.get(&endpoint, &params).await?;
        Ok(raw.into_cast_member())
    }

    // -------------------------------------------------------------------------
    // Health
    // -------------------------------------------------------------------------

    /// Connectivity and credential probe; bypasses cache and counters
    pub async fn check_status(&self) -> bool {
        let url = format!(
            "{}/configuration?api_key={}",
            self.base_url,
            urlencoding::encode(&self.api_key)
        );
        match self.client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}

// =============================================================================
// Response Structures (internal deserialization)
// =============================================================================

#[derive(Debug, Deserialize)]
struct MovieRaw {
    id: u64,
    // Movies use "title", TV uses "name"
    title: Option<String>,
    name: Option<String>,
    original_title: Option<String>,
    original_name: Option<String>,
    overview: Option<String>,
    tagline: Option<String>,
    poster_path: Option<String>,
    backdrop_path: Option<String>,
    // Movies use "release_date", TV uses "first_air_date"
    release_date: Option<String>,
    first_air_date: Option<String>,
    vote_average: Option<f32>,
    vote_count: Option<u32>,
    popularity: Option<f32>,
    runtime: Option<u32>,
    #[serde(default)]
    genre_ids: Vec<u32>,
    #[serde(default)]
    genres: Vec<Genre>,
    status: Option<String>,
    budget: Option<u64>,
    revenue: Option<u64>,
    homepage: Option<String>,
    imdb_id: Option<String>,
    media_type: Option<String>,
    credits: Option<CreditsRaw>,
    videos: Option<VideoListRaw>,
    similar: Option<Page<MovieRaw>>,
    recommendations: Option<Page<MovieRaw>>,
}

impl MovieRaw {
    fn into_movie(self) -> Movie {
        let title = self
            .title
            .or(self.name)
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| UNTITLED.to_string());
        let original_title = self
            .original_title
            .or(self.original_name)
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| title.clone());
        let release_date = self
            .release_date
            .or(self.first_air_date)
            .filter(|d| !d.is_empty());
        let year = release_date.as_deref().and_then(extract_year);
        let genres = self.genres;
        let genre_ids = if self.genre_ids.is_empty() {
            genres.iter().map(|g| g.id).collect()
        } else {
            self.genre_ids
        };
        let media_type = match self.media_type.as_deref() {
            Some("tv") => MediaType::Tv,
            _ => MediaType::Movie,
        };
        let (cast, crew) = self.credits.map(CreditsRaw::into_credits).unwrap_or_default();

        Movie {
            id: self.id,
            title,
            original_title,
            overview: self
                .overview
                .filter(|o| !o.is_empty())
                .unwrap_or_else(|| NO_OVERVIEW.to_string()),
            tagline: self.tagline.unwrap_or_default(),
            poster_path: self.poster_path,
            backdrop_path: self.backdrop_path,
            release_date,
            year,
            vote_average: self.vote_average.unwrap_or(0.0),
            vote_count: self.vote_count.unwrap_or(0),
            popularity: self.popularity.unwrap_or(0.0),
            runtime: self.runtime.filter(|&r| r > 0),
            genre_ids,
            genres,
            status: self.status.unwrap_or_else(|| "Unknown".to_string()),
            budget: self.budget.unwrap_or(0),
            revenue: self.revenue.unwrap_or(0),
            homepage: self.homepage.filter(|h| !h.is_empty()),
            imdb_id: self.imdb_id.filter(|i| !i.is_empty()),
            media_type,
            cast,
            crew,
            videos: self
                .videos
                .map(|v| v.results.into_iter().map(VideoRaw::into_video).collect())
                .unwrap_or_default(),
            similar: self
                .similar
                .map(|p| p.results.into_iter().map(MovieRaw::into_movie).collect())
                .unwrap_or_default(),
            recommendations: self
                .recommendations
                .map(|p| p.results.into_iter().map(MovieRaw::into_movie).collect())
                .unwrap_or_default(),
            view_count: 0,
            last_viewed: None,
        }
    }
}

/// Multi-search row; `media_type` discriminates movie/tv/person
#[derive(Debug, Deserialize)]
struct MultiRaw {
    #[serde(flatten)]
    inner: MovieRaw,
}

impl MultiRaw {
    fn into_movie(self) -> Option<Movie> {
        match self.inner.media_type.as_deref() {
            Some("movie") | Some("tv") => Some(self.inner.into_movie()),
            // Drop "person" and anything else the multi endpoint mixes in
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CreditsRaw {
    #[serde(default)]
    cast: Vec<CastRaw>,
    #[serde(default)]
    crew: Vec<CrewRaw>,
}

impl CreditsRaw {
    fn into_credits(self) -> (Vec<CastMember>, Vec<CrewMember>) {
        (
            self.cast.into_iter().map(CastRaw::into_cast_member).collect(),
            self.crew.into_iter().map(CrewRaw::into_crew_member).collect(),
        )
    }
}

#[derive(Debug, Deserialize)]
struct CastRaw {
    id: u64,
    name: Option<String>,
    character: Option<String>,
    profile_path: Option<String>,
    order: Option<u32>,
    known_for_department: Option<String>,
}

impl CastRaw {
    fn into_cast_member(self) -> CastMember {
        CastMember {
            id: self.id,
            name: self.name.unwrap_or_else(|| "Unknown".to_string()),
            character: self.character.unwrap_or_else(|| "Unknown".to_string()),
            profile_path: self.profile_path,
            order: self.order.unwrap_or(999),
            department: self
                .known_for_department
                .unwrap_or_else(|| "Acting".to_string()),
            biography: None,
            birthday: None,
            place_of_birth: None,
            deathday: None,
            imdb_id: None,
            homepage: None,
            credits: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CrewRaw {
    id: u64,
    name: Option<String>,
    job: Option<String>,
    department: Option<String>,
    profile_path: Option<String>,
}

impl CrewRaw {
    fn into_crew_member(self) -> CrewMember {
        CrewMember {
            id: self.id,
            name: self.name.unwrap_or_else(|| "Unknown".to_string()),
            job: self.job.unwrap_or_default(),
            department: self.department.unwrap_or_default(),
            profile_path: self.profile_path,
        }
    }
}

#[derive(Debug, Deserialize)]
struct VideoListRaw {
    #[serde(default)]
    results: Vec<VideoRaw>,
}

#[derive(Debug, Deserialize)]
struct VideoRaw {
    id: Option<String>,
    key: Option<String>,
    name: Option<String>,
    site: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    official: Option<bool>,
    published_at: Option<String>,
}

impl VideoRaw {
    fn into_video(self) -> Video {
        Video {
            id: self.id.unwrap_or_default(),
            key: self.key.unwrap_or_default(),
            name: self.name.unwrap_or_else(|| "Untitled video".to_string()),
            site: VideoSite::parse(self.site.as_deref().unwrap_or("YouTube")),
            kind: VideoKind::parse(self.kind.as_deref().unwrap_or("Trailer")),
            official: self.official.unwrap_or(false),
            published_at: self.published_at,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenreListRaw {
    genres: Vec<Genre>,
}

#[derive(Debug, Deserialize)]
struct PersonRaw {
    id: u64,
    name: Option<String>,
    profile_path: Option<String>,
    known_for_department: Option<String>,
    biography: Option<String>,
    birthday: Option<String>,
    place_of_birth: Option<String>,
    deathday: Option<String>,
    homepage: Option<String>,
    external_ids: Option<ExternalIds>,
    imdb_id: Option<String>,
    combined_credits: Option<CombinedCreditsRaw>,
}

#[derive(Debug, Deserialize)]
struct ExternalIds {
    imdb_id: Option<String>,
}

/// Combined credits mix movie and TV rows; person rows never appear here
#[derive(Debug, Deserialize)]
struct CombinedCreditsRaw {
    #[serde(default)]
    cast: Vec<MovieRaw>,
}

impl PersonRaw {
    fn into_cast_member(self) -> CastMember {
        let imdb_id = self
            .imdb_id
            .or(self.external_ids.and_then(|e| e.imdb_id))
            .filter(|i| !i.is_empty());
        let mut credits: Vec<Movie> = self
            .combined_credits
            .map(|c| c.cast.into_iter().map(MovieRaw::into_movie).collect())
            .unwrap_or_default();
        // Most prominent titles first
        credits.sort_by(|a, b| {
            b.popularity
                .partial_cmp(&a.popularity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        CastMember {
            id: self.id,
            name: self.name.unwrap_or_else(|| "Unknown".to_string()),
            character: String::new(),
            profile_path: self.profile_path,
            order: 999,
            department: self
                .known_for_department
                .unwrap_or_else(|| "Acting".to_string()),
            biography: self.biography.filter(|b| !b.is_empty()),
            birthday: self.birthday.filter(|b| !b.is_empty()),
            place_of_birth: self.place_of_birth.filter(|p| !p.is_empty()),
            deathday: self.deathday.filter(|d| !d.is_empty()),
            imdb_id,
            homepage: self.homepage.filter(|h| !h.is_empty()),
            credits,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
