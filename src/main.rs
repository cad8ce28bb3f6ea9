//! cinetui - terminal movie discovery client
//!
//! Search the TMDB catalog, browse popular and trending titles, and keep
//! local favorites, a watchlist and a personal list.
//!
//! # Usage
//!
//! ```bash
//! # Launch interactive TUI
//! cinetui
//!
//! # CLI mode (for automation)
//! cinetui search "blade runner"
//! cinetui info 27205 --json
//! cinetui favorites add 27205
//! ```

// Modules are shared with the library crate; the binary drives only part
// of their surface
#![allow(dead_code)]

mod api;
mod app;
mod cli;
mod commands;
mod config;
mod models;
mod mylist;
mod search;
mod storage;
mod store;
mod ui;

use std::io::{stdout, Stdout};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, List, ListItem, Paragraph},
    Frame, Terminal,
};

use crate::api::TmdbClient;
use crate::app::{Action, App, InputMode, Screen};
use crate::cli::{Cli, Command, ExitCode, Output};
use crate::config::{ApiKey, Config, DEMO_API_KEY};
use crate::mylist::{MyListManager, WatchStatus};
use crate::search::SearchCoordinator;
use crate::storage::{Storage, KEY_MY_LIST, KEY_SEARCH_HISTORY};
use crate::store::{MovieStore, StoreState};
use crate::ui::{browser, detail, panels, Palette, ThemeKind};

/// Terminal type alias for convenience
type Tui = Terminal<CrosstermBackend<Stdout>>;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.is_cli_mode() {
        let exit_code = run_cli(cli).await;
        std::process::exit(exit_code.into());
    } else {
        run_tui().await
    }
}

/// Run CLI command and return exit code
async fn run_cli(cli: Cli) -> ExitCode {
    let output = Output::new(&cli);

    match cli.command {
        Some(Command::Search(cmd)) => commands::search_cmd(cmd, &output).await,
        Some(Command::Suggest(cmd)) => commands::suggest_cmd(cmd, &output).await,
        Some(Command::Popular(cmd)) => commands::popular_cmd(cmd, &output).await,
        Some(Command::TopRated(cmd)) => commands::top_rated_cmd(cmd, &output).await,
        Some(Command::NowPlaying(cmd)) => commands::now_playing_cmd(cmd, &output).await,
        Some(Command::Upcoming(cmd)) => commands::upcoming_cmd(cmd, &output).await,
        Some(Command::PopularTv(cmd)) => commands::popular_tv_cmd(cmd, &output).await,
        Some(Command::Discover(cmd)) => commands::discover_cmd(cmd, &output).await,
        Some(Command::Trending(cmd)) => commands::trending_cmd(cmd, &output).await,
        Some(Command::Info(cmd)) => commands::info_cmd(cmd, &output).await,
        Some(Command::Person(cmd)) => commands::person_cmd(cmd, &output).await,
        Some(Command::Credits(cmd)) => commands::credits_cmd(cmd, &output).await,
        Some(Command::Videos(cmd)) => commands::videos_cmd(cmd, &output).await,
        Some(Command::Similar(cmd)) => commands::similar_cmd(cmd, &output).await,
        Some(Command::Recommend(cmd)) => commands::recommend_cmd(cmd, &output).await,
        Some(Command::Genres) => commands::genres_cmd(&output).await,
        Some(Command::History(cmd)) => commands::history_cmd(cmd, &output),
        Some(Command::Favorites(cmd)) => commands::saved_list_cmd(cmd, true, &output).await,
        Some(Command::Watchlist(cmd)) => commands::saved_list_cmd(cmd, false, &output).await,
        Some(Command::List(cmd)) => commands::my_list_cmd(cmd, &output).await,
        Some(Command::Export(cmd)) => commands::export_cmd(cmd, &output),
        Some(Command::Import(cmd)) => commands::import_cmd(cmd, &output),
        Some(Command::Wipe) => commands::wipe_cmd(&output),
        None => ExitCode::Success,
    }
}

// =============================================================================
// TUI Mode
// =============================================================================

/// Everything the event loop needs once startup has succeeded
struct Services {
    storage: Arc<Storage>,
    store: Arc<Mutex<MovieStore>>,
    coordinator: Arc<SearchCoordinator>,
    my_list: Arc<Mutex<MyListManager>>,
    /// Set by the store's subscriber callback whenever state mutates,
    /// including from background fetch tasks; the event loop redraws on it
    dirty: Arc<AtomicBool>,
}

impl Services {
    fn build(api_key: String, config: &Config) -> Self {
        let storage = Arc::new(Storage::new());
        let store = Arc::new(Mutex::new(MovieStore::new(Arc::clone(&storage))));
        let client = Arc::new(TmdbClient::new(api_key).with_language(config.language()));
        let coordinator = Arc::new(SearchCoordinator::new(
            client,
            Arc::clone(&store),
            Arc::clone(&storage),
        ));
        let my_list = Arc::new(Mutex::new(MyListManager::new(Arc::clone(&storage))));

        let dirty = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&dirty);
        if let Ok(mut store) = store.lock() {
            store.subscribe(move |_| flag.store(true, Ordering::Relaxed));
        }

        Self {
            storage,
            store,
            coordinator,
            my_list,
            dirty,
        }
    }

    fn snapshot(&self) -> StoreState {
        self.store
            .lock()
            .map(|store| store.state().clone())
            .unwrap_or_default()
    }

    fn with_store(&self, apply: impl FnOnce(&mut MovieStore)) {
        if let Ok(mut store) = self.store.lock() {
            apply(&mut store);
        }
    }
}

/// Initialize the terminal for TUI mode
fn init_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore terminal to normal state
fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Run interactive TUI
async fn run_tui() -> Result<()> {
    let mut terminal = init_terminal()?;
    let mut app = App::new();

    let result = run_event_loop(&mut terminal, &mut app).await;

    // Always restore terminal, even on error
    restore_terminal(&mut terminal)?;

    result
}

/// Startup sequencing: resolve credentials, probe connectivity, load the
/// genre catalog and the first popular page
async fn start_services(app: &mut App, config: &Config, api_key: String) -> Services {
    let services = Services::build(api_key, config);

    app.theme = ThemeKind::parse(&services.storage.theme());
    app.offline = !services.coordinator.client().check_status().await;
    if app.offline {
        services.with_store(|store| {
            store.set_notice("Offline: showing saved data only");
        });
    }

    // Genre catalog is best effort; browsing works without it
    let coordinator = Arc::clone(&services.coordinator);
    tokio::spawn(async move {
        let _ = coordinator.load_genres().await;
    });

    let coordinator = Arc::clone(&services.coordinator);
    tokio::spawn(async move {
        let _ = coordinator.popular(1).await;
    });

    app.screen = Screen::Home;
    app.startup_error = None;
    services
}

/// Main event loop - handles input, updates state, renders UI
async fn run_event_loop(terminal: &mut Tui, app: &mut App) -> Result<()> {
    const TICK_RATE: Duration = Duration::from_millis(100);

    let mut config = Config::load();
    let mut services = match config.resolve_api_key() {
        ApiKey::Configured(key) => Some(start_services(app, &config, key).await),
        ApiKey::Missing => {
            app.screen = Screen::StartupError;
            app.startup_error = Some(
                "No TMDB API key configured. Set the TMDB_API_KEY environment variable \
                 or add tmdb_api_key to the config file."
                    .to_string(),
            );
            None
        }
    };

    let mut force_draw = true;
    while app.running {
        let state = services
            .as_ref()
            .map(|s| s.snapshot())
            .unwrap_or_default();
        app.sync_store(&state);
        if let Some(services) = &services {
            if let Ok(my_list) = services.my_list.lock() {
                app.sync_my_list(my_list.all().len());
            }
            app.sync_history(services.coordinator.history().len());
        }

        let my_list_entries = services
            .as_ref()
            .and_then(|s| s.my_list.lock().ok().map(|m| m.all().to_vec()))
            .unwrap_or_default();
        let history_entries = services
            .as_ref()
            .map(|s| s.coordinator.history())
            .unwrap_or_default();
        let suggestions = services
            .as_ref()
            .map(|s| s.coordinator.suggestions())
            .unwrap_or_default();

        // Redraw when state changed (the store subscriber flips the dirty
        // flag, also from background fetches), on input, or while the
        // search box waits for autocomplete results
        let state_dirty = services
            .as_ref()
            .map(|s| s.dirty.swap(false, Ordering::Relaxed))
            .unwrap_or(false);
        if force_draw || state_dirty || app.input_mode == InputMode::Editing {
            terminal.draw(|frame| {
                render_ui(
                    frame,
                    app,
                    &state,
                    &my_list_entries,
                    &history_entries,
                    &suggestions,
                )
            })?;
            force_draw = false;
        }

        if event::poll(TICK_RATE)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if let Some(services) = &services {
                        services.with_store(|store| store.clear_transients());
                    }
                    let action = app.handle_key(key, &state);
                    dispatch_action(action, app, &mut services, &mut config).await;
                    force_draw = true;
                }
                Event::Resize(_, _) => force_draw = true,
                _ => {}
            }
        }
    }

    Ok(())
}

/// Execute an action produced by the input layer
async fn dispatch_action(
    action: Action,
    app: &mut App,
    services: &mut Option<Services>,
    config: &mut Config,
) {
    // Recovery actions work without services
    match &action {
        Action::UseDemoKey => {
            config.remember_api_key(DEMO_API_KEY);
            *services = Some(start_services(app, config, DEMO_API_KEY.to_string()).await);
            return;
        }
        Action::RetryStartup => {
            if let ApiKey::Configured(key) = config.resolve_api_key() {
                *services = Some(start_services(app, config, key).await);
            }
            return;
        }
        Action::WipeAndRetry => {
            let storage = Storage::new();
            let _ = storage.clear();
            let _ = storage.remove(KEY_MY_LIST);
            let _ = storage.remove(KEY_SEARCH_HISTORY);
            if let ApiKey::Configured(key) = config.resolve_api_key() {
                *services = Some(start_services(app, config, key).await);
            }
            return;
        }
        _ => {}
    }

    let Some(services) = services.as_ref() else {
        return;
    };

    match action {
        Action::None | Action::Quit => {}
        Action::SubmitSearch(query) => {
            let coordinator = Arc::clone(&services.coordinator);
            tokio::spawn(async move {
                let _ = coordinator.search(&query, 1).await;
            });
        }
        Action::Autocomplete(query) => {
            services.coordinator.schedule_autocomplete(&query);
        }
        Action::ChangePage(page) => {
            let coordinator = Arc::clone(&services.coordinator);
            tokio::spawn(async move {
                let _ = coordinator.change_page(page).await;
            });
        }
        Action::OpenDetail(id) => {
            let coordinator = Arc::clone(&services.coordinator);
            tokio::spawn(async move {
                let _ = coordinator.details(id).await;
            });
        }
        Action::ToggleFavorite(id) => {
            services.with_store(|store| {
                store.toggle_favorite(id);
            });
        }
        Action::ToggleWatchlist(id) => {
            services.with_store(|store| {
                store.toggle_watchlist(id);
            });
        }
        Action::AddToMyList(id) => {
            let movie = services
                .store
                .lock()
                .ok()
                .and_then(|store| store.movie_from_cache(id));
            let Some(movie) = movie else {
                return;
            };
            if let Ok(mut my_list) = services.my_list.lock() {
                let notice = match my_list.add(&movie) {
                    Ok(entry) => format!("Added \"{}\" to your list", entry.title),
                    Err(e) => e.to_string(),
                };
                services.with_store(|store| store.set_notice(notice));
            }
        }
        Action::MyListDeleteAt(index) => {
            if let Ok(mut my_list) = services.my_list.lock() {
                if let Some(id) = my_list.all().get(index).map(|e| e.id) {
                    let _ = my_list.delete(id);
                }
            }
        }
        Action::MyListCycleStatusAt(index) => {
            if let Ok(mut my_list) = services.my_list.lock() {
                if let Some((id, status)) =
                    my_list.all().get(index).map(|e| (e.id, e.status))
                {
                    let next = match status {
                        WatchStatus::WantToWatch => WatchStatus::Watching,
                        WatchStatus::Watching => WatchStatus::Watched,
                        WatchStatus::Watched => WatchStatus::WantToWatch,
                    };
                    let _ = my_list.set_status(id, next);
                }
            }
        }
        Action::MyListToggleFavoriteAt(index) => {
            if let Ok(mut my_list) = services.my_list.lock() {
                if let Some(id) = my_list.all().get(index).map(|e| e.id) {
                    let _ = my_list.toggle_favorite(id);
                }
            }
        }
        Action::HistoryRunAt(index) => {
            if let Some(entry) = services.coordinator.history().get(index).cloned() {
                app.search.text = entry.query.clone();
                app.navigate(Screen::Results);
                let coordinator = Arc::clone(&services.coordinator);
                tokio::spawn(async move {
                    let _ = coordinator.search(&entry.query, 1).await;
                });
            }
        }
        Action::ClearHistory => {
            services.coordinator.clear_history();
        }
        Action::CycleSort => {
            let filters = services
                .store
                .lock()
                .ok()
                .map(|store| store.state().filters.clone());
            if let Some(filters) = filters {
                let coordinator = Arc::clone(&services.coordinator);
                tokio::spawn(async move {
                    let _ = coordinator
                        .apply_filters(filters.genre, filters.year, filters.sort.next())
                        .await;
                });
            }
        }
        Action::CycleGenre => {
            let filters = services
                .store
                .lock()
                .ok()
                .map(|store| store.state().filters.clone());
            if let Some(filters) = filters {
                let genres = services.coordinator.genres();
                let next_genre = match filters.genre {
                    // Past the last genre the filter wraps back to "any"
                    Some(current) => genres
                        .iter()
                        .position(|g| g.id == current)
                        .and_then(|i| genres.get(i + 1))
                        .map(|g| g.id),
                    None => genres.first().map(|g| g.id),
                };
                let coordinator = Arc::clone(&services.coordinator);
                tokio::spawn(async move {
                    let _ = coordinator
                        .apply_filters(next_genre, filters.year, filters.sort)
                        .await;
                });
            }
        }
        Action::ClearFilters => {
            services.with_store(|store| store.clear_filters());
        }
        Action::ToggleViewMode => {
            services.with_store(|store| {
                let mode = store.state().view_mode.toggled();
                store.set_view_mode(mode);
            });
        }
        Action::ToggleTheme => {
            if let Err(e) = services.storage.save_theme(app.theme.as_str()) {
                services.with_store(|store| store.set_notice(format!("Could not save: {}", e)));
            }
        }
        Action::Refresh => {
            let coordinator = Arc::clone(&services.coordinator);
            tokio::spawn(async move {
                let _ = coordinator.popular(1).await;
            });
        }
        Action::UseDemoKey | Action::RetryStartup | Action::WipeAndRetry => {}
    }
}

// =============================================================================
// UI Rendering
// =============================================================================

/// Main render function - dispatches to view-specific renderers
fn render_ui(
    frame: &mut Frame,
    app: &App,
    state: &StoreState,
    my_list: &[crate::mylist::ListEntry],
    history: &[crate::search::HistoryEntry],
    suggestions: &[crate::search::Suggestion],
) {
    let palette = Palette::for_kind(app.theme);
    let area = frame.area();

    frame.render_widget(Clear, area);
    frame.render_widget(Block::default().style(palette.base()), area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(1),    // Content
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    render_header(frame, chunks[0], app, state, &palette);
    render_content(frame, chunks[1], app, state, my_list, history, &palette);
    render_status_bar(frame, chunks[2], app, state, &palette);

    if app.input_mode == InputMode::Editing && !suggestions.is_empty() {
        render_suggestions(frame, chunks[0], suggestions, &palette);
    }

    if let Some(error) = &state.error {
        render_error_popup(frame, area, error, &palette);
    }
}

/// Render the header with logo and search box
fn render_header(frame: &mut Frame, area: Rect, app: &App, state: &StoreState, palette: &Palette) {
    let header_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(14), Constraint::Min(1)])
        .split(area);

    let logo = Paragraph::new(Line::from(vec![
        Span::styled("CINE", palette.title()),
        Span::styled("TUI", palette.accent()),
    ]))
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(palette.border()),
    );
    frame.render_widget(logo, header_chunks[0]);

    let editing = app.input_mode == InputMode::Editing;
    let search_text = if editing {
        let text = &app.search.text;
        let cursor = app
            .search
            .text
            .char_indices()
            .nth(app.search.cursor)
            .map(|(i, _)| i)
            .unwrap_or(text.len());
        let (before, after) = text.split_at(cursor);
        format!("⌕ {}│{}", before, after)
    } else if app.search.text.is_empty() {
        format!("⌕ Press / to search... (last: {})", state.search_query)
    } else {
        format!("⌕ {}", app.search.text)
    };

    let search_box = Paragraph::new(search_text)
        .style(if editing { palette.text() } else { palette.dimmed() })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(if editing {
                    palette.border_focused()
                } else {
                    palette.border()
                })
                .title(Span::styled(" SEARCH ", palette.title())),
        );
    frame.render_widget(search_box, header_chunks[1]);
}

/// Render the main content area based on current screen
fn render_content(
    frame: &mut Frame,
    area: Rect,
    app: &App,
    state: &StoreState,
    my_list: &[crate::mylist::ListEntry],
    history: &[crate::search::HistoryEntry],
    palette: &Palette,
) {
    match app.screen {
        Screen::Home | Screen::Results => browser::render_results(frame, area, state, app, palette),
        Screen::Detail => detail::render_detail(frame, area, state, palette),
        Screen::Favorites => panels::render_saved_list(
            frame,
            area,
            "FAVORITES",
            &state.favorites,
            &app.favorites,
            palette,
        ),
        Screen::Watchlist => panels::render_saved_list(
            frame,
            area,
            "WATCHLIST",
            &state.watchlist,
            &app.watchlist,
            palette,
        ),
        Screen::MyList => panels::render_my_list(frame, area, my_list, &app.my_list, palette),
        Screen::History => panels::render_history(frame, area, history, &app.history, palette),
        Screen::StartupError => render_recovery(frame, area, app, palette),
    }
}

/// Autocomplete dropdown under the search box
fn render_suggestions(
    frame: &mut Frame,
    header_area: Rect,
    suggestions: &[crate::search::Suggestion],
    palette: &Palette,
) {
    let height = (suggestions.len() as u16 + 2).min(8);
    let area = Rect {
        x: header_area.x + 14,
        y: header_area.y + header_area.height,
        width: header_area.width.saturating_sub(14).min(60),
        height,
    };

    frame.render_widget(Clear, area);
    let items: Vec<ListItem> = suggestions
        .iter()
        .map(|s| {
            let year = s.year.map(|y| format!(" ({})", y)).unwrap_or_default();
            ListItem::new(Line::from(vec![
                Span::styled(s.title.clone(), palette.text()),
                Span::styled(year, palette.dimmed()),
            ]))
        })
        .collect();
    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(palette.border_focused()),
    );
    frame.render_widget(list, area);
}

/// Fatal startup failure: recovery choices instead of content
fn render_recovery(frame: &mut Frame, area: Rect, app: &App, palette: &Palette) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(palette.error())
        .title(Span::styled(" STARTUP FAILED ", palette.error()));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let reason = app
        .startup_error
        .clone()
        .unwrap_or_else(|| "Unknown startup failure".to_string());

    let content = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(reason, palette.text())),
        Line::from(""),
        Line::from(""),
        Line::from(vec![
            Span::styled(" d ", palette.keybind()),
            Span::styled(" Start with the demo key (rate limited)", palette.dimmed()),
        ]),
        Line::from(vec![
            Span::styled(" r ", palette.keybind()),
            Span::styled(" Retry startup", palette.dimmed()),
        ]),
        Line::from(vec![
            Span::styled(" x ", palette.keybind()),
            Span::styled(" Wipe local data and retry", palette.dimmed()),
        ]),
        Line::from(vec![
            Span::styled(" q ", palette.keybind()),
            Span::styled(" Quit", palette.dimmed()),
        ]),
    ])
    .alignment(Alignment::Center)
    .wrap(ratatui::widgets::Wrap { trim: true });

    frame.render_widget(content, inner);
}

/// Render status bar at bottom
fn render_status_bar(frame: &mut Frame, area: Rect, app: &App, state: &StoreState, palette: &Palette) {
    let mode = match app.input_mode {
        InputMode::Normal => Span::styled(" NORMAL ", palette.selected()),
        InputMode::Editing => Span::styled(" INSERT ", palette.accent()),
    };

    let screen = Span::styled(
        format!(" {} ", format!("{:?}", app.screen).to_uppercase()),
        palette.dimmed(),
    );

    let connectivity = if app.offline {
        Span::styled(" OFFLINE ", palette.warning())
    } else {
        Span::raw("")
    };

    let notice = state
        .notice
        .clone()
        .map(|n| Span::styled(format!(" {} ", n), palette.success()))
        .unwrap_or_else(|| Span::raw(""));

    let help = Span::styled(
        " q:quit /:search F:favs W:watch L:list H:history v:view t:theme ",
        palette.dimmed(),
    );

    let status = Paragraph::new(Line::from(vec![
        mode,
        screen,
        connectivity,
        notice,
        Span::raw(" │ "),
        help,
    ]))
    .style(palette.dimmed());
    frame.render_widget(status, area);
}

/// Render error popup overlay
fn render_error_popup(frame: &mut Frame, area: Rect, error: &str, palette: &Palette) {
    let popup_width = 60.min(area.width.saturating_sub(4));
    let popup_height = 5;

    let popup_area = Rect {
        x: area.x + (area.width.saturating_sub(popup_width)) / 2,
        y: area.y + (area.height.saturating_sub(popup_height)) / 2,
        width: popup_width,
        height: popup_height,
    };

    frame.render_widget(Clear, popup_area);

    let error_block = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(error.to_string(), palette.error())),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Double)
            .border_style(palette.error())
            .title(Span::styled(" ✗ ERROR ", palette.error())),
    );

    frame.render_widget(error_block, popup_area);
}
