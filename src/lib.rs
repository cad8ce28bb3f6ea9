//! cinetui - terminal movie discovery client
//!
//! Search, browse and track movies from the TMDB catalog, with local
//! favorites, a watchlist and a personal CRUD list.
//!
//! # Modules
//!
//! - `models` - catalog data structures (movies, people, videos)
//! - `api` - TMDB client with caching and retry
//! - `store` - observable application state container
//! - `search` - query coordination, history and autocomplete
//! - `storage` - JSON-blob persistence with quota housekeeping
//! - `mylist` - the personal CRUD list
//! - `ui` - TUI components
//! - `app` - TUI state machine and keyboard routing

pub mod api;
pub mod app;
pub mod cli;
pub mod commands;
pub mod config;
pub mod models;
pub mod mylist;
pub mod search;
pub mod storage;
pub mod store;
pub mod ui;

// Re-export commonly used types
pub use api::{DiscoverFilters, TmdbClient, TmdbError, TrendingKind, TrendingWindow};
pub use app::{Action, App, Screen};
pub use models::{CastMember, CrewMember, Genre, MediaType, Movie, Page, Video};
pub use mylist::{ListEntry, MyListManager, WatchStatus};
pub use search::{HistoryEntry, SearchCoordinator, Suggestion};
pub use storage::{Settings, Storage};
pub use store::{MovieStore, SortKey, StoreState, ViewMode};
