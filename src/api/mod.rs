//! API clients for external services
//!
//! - TMDB: movie metadata, search, discovery and people

pub mod tmdb;

pub use tmdb::{ClientStats, DiscoverFilters, TmdbClient, TmdbError, TrendingKind, TrendingWindow};
