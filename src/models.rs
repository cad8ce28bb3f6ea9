//! Data structures and types for cinetui
//!
//! Contains all shared models used across the application organized by domain:
//! - **Catalog**: movies, genres and paginated list envelopes from TMDB
//! - **People**: cast and crew members, lazily extended person details
//! - **Videos**: trailers/teasers/clips with per-site URL builders

use serde::{Deserialize, Serialize};
use std::fmt;

/// Base URL for TMDB-hosted images
pub const IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p";

/// TMDB caps list endpoints at 500 pages regardless of total_results
pub const MAX_TOTAL_PAGES: u32 = 500;

/// Placeholder shown when the catalog has no overview text
pub const NO_OVERVIEW: &str = "No overview available.";

/// Placeholder title for entries missing both `title` and `name`
pub const UNTITLED: &str = "Untitled";

// =============================================================================
// Catalog Models
// =============================================================================

/// Media type discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    #[default]
    Movie,
    Tv,
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaType::Movie => write!(f, "Movie"),
            MediaType::Tv => write!(f, "TV Show"),
        }
    }
}

/// A genre entry from the catalog's genre lists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: u32,
    pub name: String,
}

/// Paginated list envelope returned by every TMDB list endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub page: u32,
    pub results: Vec<T>,
    pub total_pages: u32,
    pub total_results: u32,
}

impl<T> Page<T> {
    /// Map the results while keeping the envelope
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            page: self.page,
            results: self.results.into_iter().map(f).collect(),
            total_pages: self.total_pages,
            total_results: self.total_results,
        }
    }
}

/// Poster image width selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PosterSize {
    Small,
    Medium,
    Large,
    Original,
}

impl PosterSize {
    fn segment(self) -> &'static str {
        match self {
            PosterSize::Small => "w185",
            PosterSize::Medium => "w342",
            PosterSize::Large => "w500",
            PosterSize::Original => "original",
        }
    }
}

/// Backdrop image width selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackdropSize {
    Small,
    Medium,
    Large,
    Original,
}

impl BackdropSize {
    fn segment(self) -> &'static str {
        match self {
            BackdropSize::Small => "w300",
            BackdropSize::Medium => "w780",
            BackdropSize::Large => "w1280",
            BackdropSize::Original => "original",
        }
    }
}

/// A catalog entry, normalized from the API's search/list/detail shapes.
///
/// Fields absent from the response get documented placeholders instead of
/// propagating nulls into the UI. The `view_count`/`last_viewed` pair is
/// mutated locally and never sent upstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Movie {
    pub id: u64,
    pub title: String,
    pub original_title: String,
    pub overview: String,
    #[serde(default)]
    pub tagline: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub release_date: Option<String>,
    pub year: Option<u16>,
    pub vote_average: f32,
    pub vote_count: u32,
    pub popularity: f32,
    pub runtime: Option<u32>,
    #[serde(default)]
    pub genre_ids: Vec<u32>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub budget: u64,
    #[serde(default)]
    pub revenue: u64,
    pub homepage: Option<String>,
    pub imdb_id: Option<String>,
    #[serde(default)]
    pub media_type: MediaType,

    // Present only when fetched with append_to_response expansions
    #[serde(default)]
    pub cast: Vec<CastMember>,
    #[serde(default)]
    pub crew: Vec<CrewMember>,
    #[serde(default)]
    pub videos: Vec<Video>,
    #[serde(default)]
    pub similar: Vec<Movie>,
    #[serde(default)]
    pub recommendations: Vec<Movie>,

    // Local-only bookkeeping
    #[serde(default)]
    pub view_count: u32,
    #[serde(default)]
    pub last_viewed: Option<i64>,
}

impl Movie {
    /// Poster URL for the given size, or the bundled placeholder path
    pub fn poster_url(&self, size: PosterSize) -> String {
        match &self.poster_path {
            Some(path) => format!("{}/{}{}", IMAGE_BASE_URL, size.segment(), path),
            None => "assets/no-poster.jpg".to_string(),
        }
    }

    /// Backdrop URL for the given size, or the bundled placeholder path
    pub fn backdrop_url(&self, size: BackdropSize) -> String {
        match &self.backdrop_path {
            Some(path) => format!("{}/{}{}", IMAGE_BASE_URL, size.segment(), path),
            None => "assets/no-backdrop.jpg".to_string(),
        }
    }

    /// Rating on a 0-5 scale derived from the 0-10 vote average
    pub fn star_rating(&self) -> f32 {
        self.vote_average / 2.0
    }

    /// Five-position star bar, e.g. "★★★½☆" for a 7.0 vote average
    pub fn star_bar(&self) -> String {
        star_bar(self.vote_average)
    }

    /// Runtime as "2h 56m", or "Unknown" when the catalog has none
    pub fn formatted_runtime(&self) -> String {
        format_runtime(self.runtime)
    }

    /// Overview trimmed to `max` characters with an ellipsis
    pub fn short_overview(&self, max: usize) -> String {
        truncate(&self.overview, max)
    }

    /// Comma-joined genre names from the resolved genre list
    pub fn genre_names(&self) -> String {
        self.genres
            .iter()
            .map(|g| g.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn imdb_url(&self) -> Option<String> {
        self.imdb_id
            .as_ref()
            .map(|id| format!("https://www.imdb.com/title/{}", id))
    }

    /// Pick the best trailer: official YouTube trailer, then any YouTube
    /// trailer, then a YouTube teaser, then whatever video came first.
    pub fn trailer(&self) -> Option<&Video> {
        self.videos
            .iter()
            .find(|v| v.kind == VideoKind::Trailer && v.site == VideoSite::YouTube && v.official)
            .or_else(|| {
                self.videos
                    .iter()
                    .find(|v| v.kind == VideoKind::Trailer && v.site == VideoSite::YouTube)
            })
            .or_else(|| {
                self.videos
                    .iter()
                    .find(|v| v.kind == VideoKind::Teaser && v.site == VideoSite::YouTube)
            })
            .or_else(|| self.videos.first())
    }

    pub fn directors(&self) -> Vec<&CrewMember> {
        self.crew
            .iter()
            .filter(|p| p.job == "Director" || p.department == "Directing")
            .collect()
    }

    pub fn writers(&self) -> Vec<&CrewMember> {
        self.crew
            .iter()
            .filter(|p| p.job == "Writer" || p.department == "Writing")
            .collect()
    }

    /// Top-billed cast, limited
    pub fn main_cast(&self, limit: usize) -> &[CastMember] {
        &self.cast[..self.cast.len().min(limit)]
    }

    /// Record a local view: bump the counter and stamp the time
    pub fn record_view(&mut self, now_millis: i64) {
        self.view_count += 1;
        self.last_viewed = Some(now_millis);
    }
}

impl fmt::Display for Movie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let year = self.year.map(|y| format!(" ({})", y)).unwrap_or_default();
        write!(f, "{}{} - ★ {:.1}", self.title, year, self.vote_average)
    }
}

// =============================================================================
// People Models
// =============================================================================

/// A cast credit on a movie, with optional extended person fields that are
/// only populated by a dedicated person-details fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CastMember {
    pub id: u64,
    pub name: String,
    pub character: String,
    pub profile_path: Option<String>,
    pub order: u32,
    pub department: String,

    #[serde(default)]
    pub biography: Option<String>,
    #[serde(default)]
    pub birthday: Option<String>,
    #[serde(default)]
    pub place_of_birth: Option<String>,
    #[serde(default)]
    pub deathday: Option<String>,
    #[serde(default)]
    pub imdb_id: Option<String>,
    #[serde(default)]
    pub homepage: Option<String>,
    /// Filmography from the person's combined credits
    #[serde(default)]
    pub credits: Vec<Movie>,
}

/// Profile image width selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileSize {
    Small,
    Medium,
    Large,
}

impl ProfileSize {
    fn segment(self) -> &'static str {
        match self {
            ProfileSize::Small => "w45",
            ProfileSize::Medium => "w185",
            ProfileSize::Large => "h632",
        }
    }
}

impl CastMember {
    pub fn profile_url(&self, size: ProfileSize) -> String {
        match &self.profile_path {
            Some(path) => format!("{}/{}{}", IMAGE_BASE_URL, size.segment(), path),
            None => "assets/no-avatar.png".to_string(),
        }
    }

    pub fn short_biography(&self, max: usize) -> String {
        match &self.biography {
            Some(bio) => truncate(bio, max),
            None => "No biography available.".to_string(),
        }
    }

    pub fn imdb_url(&self) -> Option<String> {
        self.imdb_id
            .as_ref()
            .map(|id| format!("https://www.imdb.com/name/{}", id))
    }

    /// Best-known titles from the filmography, limited
    pub fn known_for(&self, limit: usize) -> &[Movie] {
        &self.credits[..self.credits.len().min(limit)]
    }
}

impl fmt::Display for CastMember {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} as {}", self.name, self.character)
    }
}

/// A crew credit on a movie
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrewMember {
    pub id: u64,
    pub name: String,
    pub job: String,
    pub department: String,
    pub profile_path: Option<String>,
}

// =============================================================================
// Video Models
// =============================================================================

/// Hosting site for a video; URL builders exist for the two supported sites
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VideoSite {
    YouTube,
    Vimeo,
    Other(String),
}

impl VideoSite {
    pub fn parse(s: &str) -> Self {
        match s {
            "YouTube" => VideoSite::YouTube,
            "Vimeo" => VideoSite::Vimeo,
            other => VideoSite::Other(other.to_string()),
        }
    }
}

impl fmt::Display for VideoSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VideoSite::YouTube => write!(f, "YouTube"),
            VideoSite::Vimeo => write!(f, "Vimeo"),
            VideoSite::Other(s) => write!(f, "{}", s),
        }
    }
}

/// Classified video type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VideoKind {
    Trailer,
    Teaser,
    Clip,
    Featurette,
    BehindTheScenes,
    Other(String),
}

impl VideoKind {
    pub fn parse(s: &str) -> Self {
        match s {
            "Trailer" => VideoKind::Trailer,
            "Teaser" => VideoKind::Teaser,
            "Clip" => VideoKind::Clip,
            "Featurette" => VideoKind::Featurette,
            "Behind the Scenes" => VideoKind::BehindTheScenes,
            other => VideoKind::Other(other.to_string()),
        }
    }
}

impl fmt::Display for VideoKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VideoKind::Trailer => write!(f, "Trailer"),
            VideoKind::Teaser => write!(f, "Teaser"),
            VideoKind::Clip => write!(f, "Clip"),
            VideoKind::Featurette => write!(f, "Featurette"),
            VideoKind::BehindTheScenes => write!(f, "Behind the Scenes"),
            VideoKind::Other(s) => write!(f, "{}", s),
        }
    }
}

/// A promotional video attached to a catalog entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Video {
    pub id: String,
    pub key: String,
    pub name: String,
    pub site: VideoSite,
    pub kind: VideoKind,
    pub official: bool,
    pub published_at: Option<String>,
}

impl Video {
    /// Embed URL, only for the supported sites
    pub fn embed_url(&self) -> Option<String> {
        match self.site {
            VideoSite::YouTube => Some(format!("https://www.youtube.com/embed/{}", self.key)),
            VideoSite::Vimeo => Some(format!("https://player.vimeo.com/video/{}", self.key)),
            VideoSite::Other(_) => None,
        }
    }

    /// Watch URL, only for the supported sites
    pub fn watch_url(&self) -> Option<String> {
        match self.site {
            VideoSite::YouTube => Some(format!("https://www.youtube.com/watch?v={}", self.key)),
            VideoSite::Vimeo => Some(format!("https://vimeo.com/{}", self.key)),
            VideoSite::Other(_) => None,
        }
    }

    /// Thumbnail URL (YouTube only; Vimeo thumbnails need an extra API call)
    pub fn thumbnail_url(&self) -> Option<String> {
        match self.site {
            VideoSite::YouTube => Some(format!(
                "https://img.youtube.com/vi/{}/hqdefault.jpg",
                self.key
            )),
            _ => None,
        }
    }
}

impl fmt::Display for Video {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let official = if self.official { " [official]" } else { "" };
        write!(f, "{} ({}{})", self.name, self.kind, official)
    }
}

// =============================================================================
// Utility Functions
// =============================================================================

/// Extract year from a date string like "2022-03-04"
pub fn extract_year(date: &str) -> Option<u16> {
    if date.len() >= 4 {
        date[..4].parse().ok()
    } else {
        None
    }
}

/// Truncate to `max` characters, appending "..." only when something was cut.
/// Shorter strings come back unchanged.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let prefix: String = text.chars().take(max).collect();
    format!("{}...", prefix.trim_end())
}

/// Runtime minutes as "2h 56m" / "45m", or "Unknown"
pub fn format_runtime(minutes: Option<u32>) -> String {
    match minutes {
        None | Some(0) => "Unknown".to_string(),
        Some(m) if m < 60 => format!("{}m", m),
        Some(m) => format!("{}h {}m", m / 60, m % 60),
    }
}

/// Five-position star bar from a 0-10 vote average
pub fn star_bar(vote_average: f32) -> String {
    let rating = (vote_average / 2.0).clamp(0.0, 5.0);
    let full = rating.floor() as usize;
    let half = rating - rating.floor() >= 0.5;
    let empty = 5 - full - usize::from(half);

    let mut bar = "★".repeat(full);
    if half {
        bar.push('½');
    }
    bar.push_str(&"☆".repeat(empty));
    bar
}

// =============================================================================
// Unit Tests
// =============================================================================
