//! CLI command handlers
//!
//! Each handler takes its parsed args and the Output helper, performs the
//! work against the API client or local storage, and returns an ExitCode.

use serde::Serialize;
use std::sync::{Arc, Mutex};

use crate::api::{DiscoverFilters, TmdbClient, TrendingWindow};
use crate::cli::{
    validate_page, DiscoverCmd, ExitCode, ExportCmd, HistoryCmd, ImportCmd, InfoCmd, MovieIdCmd,
    MyListCmd, Output, PageCmd, PersonCmd, RelatedCmd, SavedListCmd, SearchCmd, SearchMedia,
    SuggestCmd, TrendingCmd, WindowOption,
};
use crate::config::{Config, DEMO_API_KEY};
use crate::models::{Movie, Page};
use crate::mylist::{MyListManager, WatchStatus};
use crate::search::{HistoryEntry, SearchCoordinator};
use crate::storage::{Storage, KEY_MY_LIST, KEY_SEARCH_HISTORY};
use crate::store::MovieStore;

/// Compact row for list output
#[derive(Debug, Serialize)]
struct MovieRow {
    id: u64,
    title: String,
    year: Option<u16>,
    rating: f32,
    overview: String,
}

impl From<&Movie> for MovieRow {
    fn from(movie: &Movie) -> Self {
        Self {
            id: movie.id,
            title: movie.title.clone(),
            year: movie.year,
            rating: movie.vote_average,
            overview: movie.short_overview(120),
        }
    }
}

fn build_client(output: &Output) -> TmdbClient {
    let config = Config::load();
    let key = match config.resolve_api_key() {
        crate::config::ApiKey::Configured(key) => key,
        crate::config::ApiKey::Missing => {
            output.info("No API key configured; using the rate-limited demo key");
            DEMO_API_KEY.to_string()
        }
    };
    TmdbClient::new(key).with_language(config.language())
}

fn print_page(page: &Page<Movie>, limit: usize, output: &Output) -> ExitCode {
    let rows: Vec<MovieRow> = page.results.iter().take(limit).map(MovieRow::from).collect();
    if output.json {
        match output.print(&rows) {
            Ok(()) => ExitCode::Success,
            Err(e) => output.error(format!("Failed to serialize: {}", e), ExitCode::Error),
        }
    } else {
        for movie in page.results.iter().take(limit) {
            output.line(movie);
        }
        output.info(format!(
            "page {} of {} ({} results)",
            page.page, page.total_pages, page.total_results
        ));
        ExitCode::Success
    }
}

// =============================================================================
// Catalog commands
// =============================================================================

pub async fn search_cmd(cmd: SearchCmd, output: &Output) -> ExitCode {
    if let Err(e) = validate_page(cmd.page) {
        return output.error(e, ExitCode::InvalidArgs);
    }
    let client = build_client(output);
    output.info(format!("Searching for: {}", cmd.query));

    let result = match cmd.media {
        SearchMedia::Movie => client.search_movies(&cmd.query, cmd.page).await,
        SearchMedia::Tv => client.search_tv(&cmd.query, cmd.page).await,
        SearchMedia::Multi => client.multi_search(&cmd.query, cmd.page).await,
    };

    match result {
        Ok(page) => print_page(&page, cmd.limit, output),
        Err(e) => output.error(format!("Search failed: {}", e), ExitCode::NetworkError),
    }
}

pub async fn suggest_cmd(cmd: SuggestCmd, output: &Output) -> ExitCode {
    let storage = Arc::new(Storage::new());
    let store = Arc::new(Mutex::new(MovieStore::new(Arc::clone(&storage))));
    let coordinator =
        SearchCoordinator::new(Arc::new(build_client(output)), store, storage);

    let suggestions = coordinator.autocomplete_now(&cmd.query).await;
    if output.json {
        match output.print(&suggestions) {
            Ok(()) => ExitCode::Success,
            Err(e) => output.error(format!("Failed to serialize: {}", e), ExitCode::Error),
        }
    } else {
        for suggestion in &suggestions {
            let year = suggestion
                .year
                .map(|y| format!(" ({})", y))
                .unwrap_or_default();
            output.line(format!("{}{}", suggestion.title, year));
        }
        ExitCode::Success
    }
}

pub async fn popular_cmd(cmd: PageCmd, output: &Output) -> ExitCode {
    list_cmd(cmd, output, ListKind::Popular).await
}

pub async fn top_rated_cmd(cmd: PageCmd, output: &Output) -> ExitCode {
    list_cmd(cmd, output, ListKind::TopRated).await
}

pub async fn now_playing_cmd(cmd: PageCmd, output: &Output) -> ExitCode {
    list_cmd(cmd, output, ListKind::NowPlaying).await
}

pub async fn upcoming_cmd(cmd: PageCmd, output: &Output) -> ExitCode {
    list_cmd(cmd, output, ListKind::Upcoming).await
}

pub async fn popular_tv_cmd(cmd: PageCmd, output: &Output) -> ExitCode {
    list_cmd(cmd, output, ListKind::PopularTv).await
}

enum ListKind {
    Popular,
    TopRated,
    NowPlaying,
    Upcoming,
    PopularTv,
}

async fn list_cmd(cmd: PageCmd, output: &Output, kind: ListKind) -> ExitCode {
    if let Err(e) = validate_page(cmd.page) {
        return output.error(e, ExitCode::InvalidArgs);
    }
    let client = build_client(output);
    let result = match kind {
        ListKind::Popular => client.popular(cmd.page).await,
        ListKind::TopRated => client.top_rated(cmd.page).await,
        ListKind::NowPlaying => client.now_playing(cmd.page).await,
        ListKind::Upcoming => client.upcoming(cmd.page).await,
        ListKind::PopularTv => client.popular_tv(cmd.page).await,
    };
    match result {
        Ok(page) => print_page(&page, cmd.limit, output),
        Err(e) => output.error(format!("Fetch failed: {}", e), ExitCode::NetworkError),
    }
}

pub async fn credits_cmd(cmd: MovieIdCmd, output: &Output) -> ExitCode {
    let client = build_client(output);
    match client.movie_credits(cmd.id).await {
        Ok((cast, crew)) => {
            if output.json {
                match output.print(&serde_json::json!({"cast": cast, "crew": crew})) {
                    Ok(()) => ExitCode::Success,
                    Err(e) => output.error(format!("Failed to serialize: {}", e), ExitCode::Error),
                }
            } else {
                for member in cast.iter().take(15) {
                    output.line(member);
                }
                ExitCode::Success
            }
        }
        Err(e) => output.error(format!("Credits failed: {}", e), ExitCode::NetworkError),
    }
}

pub async fn videos_cmd(cmd: MovieIdCmd, output: &Output) -> ExitCode {
    let client = build_client(output);
    match client.movie_videos(cmd.id).await {
        Ok(videos) => {
            if output.json {
                match output.print(&videos) {
                    Ok(()) => ExitCode::Success,
                    Err(e) => output.error(format!("Failed to serialize: {}", e), ExitCode::Error),
                }
            } else {
                for video in &videos {
                    match video.watch_url() {
                        Some(url) => output.line(format!("{}  {}", video, url)),
                        None => output.line(video),
                    }
                }
                ExitCode::Success
            }
        }
        Err(e) => output.error(format!("Videos failed: {}", e), ExitCode::NetworkError),
    }
}

pub async fn similar_cmd(cmd: RelatedCmd, output: &Output) -> ExitCode {
    if let Err(e) = validate_page(cmd.page) {
        return output.error(e, ExitCode::InvalidArgs);
    }
    let client = build_client(output);
    match client.similar(cmd.id, cmd.page).await {
        Ok(page) => print_page(&page, cmd.limit, output),
        Err(e) => output.error(format!("Similar failed: {}", e), ExitCode::NetworkError),
    }
}

pub async fn recommend_cmd(cmd: RelatedCmd, output: &Output) -> ExitCode {
    if let Err(e) = validate_page(cmd.page) {
        return output.error(e, ExitCode::InvalidArgs);
    }
    let client = build_client(output);
    match client.recommendations(cmd.id, cmd.page).await {
        Ok(page) => print_page(&page, cmd.limit, output),
        Err(e) => output.error(format!("Recommendations failed: {}", e), ExitCode::NetworkError),
    }
}

pub async fn discover_cmd(cmd: DiscoverCmd, output: &Output) -> ExitCode {
    if let Err(e) = validate_page(cmd.page) {
        return output.error(e, ExitCode::InvalidArgs);
    }
    let storage = Arc::new(Storage::new());
    let store = Arc::new(Mutex::new(MovieStore::new(Arc::clone(&storage))));
    let coordinator =
        SearchCoordinator::new(Arc::new(build_client(output)), Arc::clone(&store), storage);

    let filters = DiscoverFilters {
        genre: cmd.genre,
        year: cmd.year,
        min_rating: cmd.min_rating,
        language: cmd.language.clone(),
        sort_by: Some(cmd.sort.as_sort_key().api_value().to_string()),
    };
    match coordinator.discover(&filters, cmd.page).await {
        Ok(()) => {
            let (results, total_pages, total_results) = store
                .lock()
                .map(|s| {
                    let state = s.state();
                    (state.filtered.clone(), state.total_pages, state.total_results)
                })
                .unwrap_or((Vec::new(), 1, 0));
            let page = Page {
                page: cmd.page,
                results,
                total_pages,
                total_results,
            };
            print_page(&page, 20, output)
        }
        Err(e) => output.error(format!("Discover failed: {}", e), ExitCode::NetworkError),
    }
}

pub async fn trending_cmd(cmd: TrendingCmd, output: &Output) -> ExitCode {
    let storage = Arc::new(Storage::new());
    let store = Arc::new(Mutex::new(MovieStore::new(Arc::clone(&storage))));
    let coordinator =
        SearchCoordinator::new(Arc::new(build_client(output)), Arc::clone(&store), storage);

    let window = match cmd.window {
        WindowOption::Day => TrendingWindow::Day,
        WindowOption::Week => TrendingWindow::Week,
    };
    match coordinator.trending(window).await {
        Ok(()) => {
            let (results, total_pages, total_results) = store
                .lock()
                .map(|s| {
                    let state = s.state();
                    (state.filtered.clone(), state.total_pages, state.total_results)
                })
                .unwrap_or((Vec::new(), 1, 0));
            let page = Page {
                page: 1,
                results,
                total_pages,
                total_results,
            };
            print_page(&page, cmd.limit, output)
        }
        Err(e) => output.error(format!("Trending failed: {}", e), ExitCode::NetworkError),
    }
}

pub async fn info_cmd(cmd: InfoCmd, output: &Output) -> ExitCode {
    let client = build_client(output);
    let expansions: &[&str] = if cmd.brief {
        &[]
    } else {
        &["credits", "videos", "similar", "recommendations"]
    };
    match client.movie_details(cmd.id, expansions).await {
        Ok(movie) => {
            if output.json {
                match output.print(&movie) {
                    Ok(()) => ExitCode::Success,
                    Err(e) => output.error(format!("Failed to serialize: {}", e), ExitCode::Error),
                }
            } else {
                output.line(&movie);
                output.line(format!("  {}", movie.formatted_runtime()));
                if !movie.genres.is_empty() {
                    output.line(format!("  {}", movie.genre_names()));
                }
                output.line(format!("  {}", movie.overview));
                if let Some(trailer) = movie.trailer() {
                    if let Some(url) = trailer.watch_url() {
                        output.line(format!("  Trailer: {}", url));
                    }
                }
                ExitCode::Success
            }
        }
        Err(e) => output.error(format!("Info failed: {}", e), ExitCode::NetworkError),
    }
}

pub async fn person_cmd(cmd: PersonCmd, output: &Output) -> ExitCode {
    let client = build_client(output);
    match client.person_details(cmd.id).await {
        Ok(person) => {
            if output.json {
                match output.print(&person) {
                    Ok(()) => ExitCode::Success,
                    Err(e) => output.error(format!("Failed to serialize: {}", e), ExitCode::Error),
                }
            } else {
                output.line(&person.name);
                output.line(format!("  {}", person.department));
                output.line(format!("  {}", person.short_biography(300)));
                if !person.credits.is_empty() {
                    output.line("  Known for:");
                    for movie in person.known_for(10) {
                        output.line(format!("    {}", movie));
                    }
                }
                ExitCode::Success
            }
        }
        Err(e) => output.error(format!("Person lookup failed: {}", e), ExitCode::NetworkError),
    }
}

pub async fn genres_cmd(output: &Output) -> ExitCode {
    let storage = Arc::new(Storage::new());
    let store = Arc::new(Mutex::new(MovieStore::new(Arc::clone(&storage))));
    let coordinator =
        SearchCoordinator::new(Arc::new(build_client(output)), store, storage);

    match coordinator.load_genres().await {
        Ok(genres) => {
            if output.json {
                match output.print(&genres) {
                    Ok(()) => ExitCode::Success,
                    Err(e) => output.error(format!("Failed to serialize: {}", e), ExitCode::Error),
                }
            } else {
                for genre in &genres {
                    output.line(format!("{:6}  {}", genre.id, genre.name));
                }
                ExitCode::Success
            }
        }
        Err(e) => output.error(format!("Genre fetch failed: {}", e), ExitCode::NetworkError),
    }
}

// =============================================================================
// Local data commands
// =============================================================================

pub fn history_cmd(cmd: HistoryCmd, output: &Output) -> ExitCode {
    let storage = Storage::new();
    if cmd.clear {
        if let Err(e) = storage.remove(KEY_SEARCH_HISTORY) {
            return output.error(format!("Could not clear history: {}", e), ExitCode::StorageError);
        }
        output.info("Search history cleared");
        return ExitCode::Success;
    }

    let history: Vec<HistoryEntry> = storage.get_or(KEY_SEARCH_HISTORY, Vec::new());
    if output.json {
        match output.print(&history) {
            Ok(()) => ExitCode::Success,
            Err(e) => output.error(format!("Failed to serialize: {}", e), ExitCode::Error),
        }
    } else {
        for entry in &history {
            output.line(format!("{}  {}", entry.display_date, entry.query));
        }
        ExitCode::Success
    }
}

pub async fn saved_list_cmd(cmd: SavedListCmd, favorites: bool, output: &Output) -> ExitCode {
    let storage = Arc::new(Storage::new());
    let mut store = MovieStore::new(Arc::clone(&storage));
    let label = if favorites { "favorites" } else { "watchlist" };

    match cmd {
        SavedListCmd::Show => {
            let list = if favorites {
                &store.state().favorites
            } else {
                &store.state().watchlist
            };
            let rows: Vec<MovieRow> = list.iter().map(MovieRow::from).collect();
            if output.json {
                match output.print(&rows) {
                    Ok(()) => ExitCode::Success,
                    Err(e) => output.error(format!("Failed to serialize: {}", e), ExitCode::Error),
                }
            } else {
                for movie in list {
                    output.line(movie);
                }
                ExitCode::Success
            }
        }
        SavedListCmd::Add { id } => {
            let client = build_client(output);
            let movie = match client.movie_details(id, &[]).await {
                Ok(movie) => movie,
                Err(e) => {
                    return output.error(format!("Lookup failed: {}", e), ExitCode::NetworkError)
                }
            };
            let title = movie.title.clone();
            let added = if favorites {
                store.add_favorite(movie)
            } else {
                store.add_to_watchlist(movie)
            };
            if added {
                output.info(format!("Added \"{}\" to {}", title, label));
                ExitCode::Success
            } else {
                output.error(
                    format!("\"{}\" is already in {}", title, label),
                    ExitCode::Error,
                )
            }
        }
        SavedListCmd::Remove { id } => {
            let removed = if favorites {
                store.remove_favorite(id)
            } else {
                store.remove_from_watchlist(id)
            };
            if removed {
                output.info(format!("Removed {} from {}", id, label));
                ExitCode::Success
            } else {
                output.error(format!("{} is not in {}", id, label), ExitCode::Error)
            }
        }
    }
}

pub async fn my_list_cmd(cmd: MyListCmd, output: &Output) -> ExitCode {
    let storage = Arc::new(Storage::new());
    let mut manager = MyListManager::new(Arc::clone(&storage));

    match cmd {
        MyListCmd::Show { status, query } => {
            let status = match status.as_deref().map(WatchStatus::parse) {
                Some(None) => {
                    return output.error(
                        "status must be want-to-watch, watching or watched",
                        ExitCode::InvalidArgs,
                    )
                }
                Some(parsed) => parsed,
                None => None,
            };
            let entries: Vec<&crate::mylist::ListEntry> = manager
                .all()
                .iter()
                .filter(|e| status.map(|s| e.status == s).unwrap_or(true))
                .filter(|e| {
                    query
                        .as_deref()
                        .map(|q| e.title.to_lowercase().contains(&q.to_lowercase()))
                        .unwrap_or(true)
                })
                .collect();
            if output.json {
                match output.print(&entries) {
                    Ok(()) => ExitCode::Success,
                    Err(e) => output.error(format!("Failed to serialize: {}", e), ExitCode::Error),
                }
            } else {
                for entry in entries {
                    let rating = entry
                        .my_rating
                        .map(|r| format!("  my rating {:.1}", r))
                        .unwrap_or_default();
                    output.line(format!(
                        "{}  {} [{}]{}",
                        entry.id, entry.title, entry.status, rating
                    ));
                }
                ExitCode::Success
            }
        }
        MyListCmd::Add { id } => {
            let client = build_client(output);
            let movie = match client.movie_details(id, &[]).await {
                Ok(movie) => movie,
                Err(e) => {
                    return output.error(format!("Lookup failed: {}", e), ExitCode::NetworkError)
                }
            };
            match manager.add(&movie) {
                Ok(entry) => {
                    output.info(format!("Added \"{}\" (list id {})", entry.title, entry.id));
                    ExitCode::Success
                }
                Err(e) => output.error(e.to_string(), ExitCode::Error),
            }
        }
        MyListCmd::Remove { id } => match manager.delete(id) {
            Ok(entry) => {
                output.info(format!("Removed \"{}\"", entry.title));
                ExitCode::Success
            }
            Err(e) => output.error(e.to_string(), ExitCode::Error),
        },
        MyListCmd::Rate { id, rating } => match manager.set_rating(id, rating) {
            Ok(entry) => {
                output.info(format!(
                    "Rated \"{}\" {:.1}",
                    entry.title,
                    entry.my_rating.unwrap_or(0.0)
                ));
                ExitCode::Success
            }
            Err(e) => output.error(e.to_string(), ExitCode::Error),
        },
        MyListCmd::Note { id, notes } => match manager.set_notes(id, &notes) {
            Ok(entry) => {
                output.info(format!("Noted \"{}\"", entry.title));
                ExitCode::Success
            }
            Err(e) => output.error(e.to_string(), ExitCode::Error),
        },
        MyListCmd::Status { id, status } => {
            let Some(status) = WatchStatus::parse(&status) else {
                return output.error(
                    "status must be want-to-watch, watching or watched",
                    ExitCode::InvalidArgs,
                );
            };
            match manager.set_status(id, status) {
                Ok(entry) => {
                    output.info(format!("\"{}\" is now {}", entry.title, entry.status));
                    ExitCode::Success
                }
                Err(e) => output.error(e.to_string(), ExitCode::Error),
            }
        }
        MyListCmd::Fav { id } => match manager.toggle_favorite(id) {
            Ok(entry) => {
                let state = if entry.favorite { "on" } else { "off" };
                output.info(format!("Favorite {} for \"{}\"", state, entry.title));
                ExitCode::Success
            }
            Err(e) => output.error(e.to_string(), ExitCode::Error),
        },
        MyListCmd::Stats => {
            let stats = manager.stats();
            match output.print(&stats) {
                Ok(()) => ExitCode::Success,
                Err(e) => output.error(format!("Failed to serialize: {}", e), ExitCode::Error),
            }
        }
        MyListCmd::Export { path } => match manager.export_json() {
            Ok(json) => match path {
                Some(path) => match std::fs::write(&path, json) {
                    Ok(()) => {
                        output.info(format!("Exported to {}", path.display()));
                        ExitCode::Success
                    }
                    Err(e) => {
                        output.error(format!("Could not write file: {}", e), ExitCode::StorageError)
                    }
                },
                None => {
                    println!("{}", json);
                    ExitCode::Success
                }
            },
            Err(e) => output.error(e.to_string(), ExitCode::StorageError),
        },
        MyListCmd::Import { path } => {
            let data = match std::fs::read_to_string(&path) {
                Ok(data) => data,
                Err(e) => {
                    return output
                        .error(format!("Could not read file: {}", e), ExitCode::StorageError)
                }
            };
            match manager.import_json(&data) {
                Ok(count) => {
                    output.info(format!("Imported {} entries", count));
                    ExitCode::Success
                }
                Err(e) => output.error(e.to_string(), ExitCode::InvalidArgs),
            }
        }
        MyListCmd::Clear => match manager.clear() {
            Ok(()) => {
                output.info("List cleared");
                ExitCode::Success
            }
            Err(e) => output.error(e.to_string(), ExitCode::StorageError),
        },
    }
}

pub fn export_cmd(cmd: ExportCmd, output: &Output) -> ExitCode {
    let storage = Arc::new(Storage::new());
    let store = MovieStore::new(storage);
    match store.export_state() {
        Ok(json) => match cmd.path {
            Some(path) => match std::fs::write(&path, json) {
                Ok(()) => {
                    output.info(format!("Exported to {}", path.display()));
                    ExitCode::Success
                }
                Err(e) => {
                    output.error(format!("Could not write file: {}", e), ExitCode::StorageError)
                }
            },
            None => {
                println!("{}", json);
                ExitCode::Success
            }
        },
        Err(e) => output.error(e.to_string(), ExitCode::StorageError),
    }
}

pub fn import_cmd(cmd: ImportCmd, output: &Output) -> ExitCode {
    let data = match std::fs::read_to_string(&cmd.path) {
        Ok(data) => data,
        Err(e) => {
            return output.error(format!("Could not read file: {}", e), ExitCode::StorageError)
        }
    };
    let storage = Arc::new(Storage::new());
    let mut store = MovieStore::new(storage);
    match store.import_state(&data) {
        Ok(()) => {
            output.info(format!(
                "Imported {} favorites, {} watchlist entries",
                store.state().favorites.len(),
                store.state().watchlist.len()
            ));
            ExitCode::Success
        }
        Err(e) => output.error(format!("Import rejected: {}", e), ExitCode::InvalidArgs),
    }
}

pub fn wipe_cmd(output: &Output) -> ExitCode {
    let storage = Arc::new(Storage::new());
    let mut store = MovieStore::new(Arc::clone(&storage));
    store.clear_all();
    let my_list = storage.remove(KEY_MY_LIST);
    let history = storage.remove(KEY_SEARCH_HISTORY);
    if let Err(e) = my_list.and(history) {
        return output.error(format!("Could not wipe data: {}", e), ExitCode::StorageError);
    }
    output.info("All local data wiped");
    ExitCode::Success
}
