//! App state and input handling for the TUI
//!
//! Manages the screen state machine, navigation stack, list cursors and
//! keyboard routing. Key handling is pure: it inspects the latest store
//! snapshot and returns an [`Action`] for the event loop to execute, so
//! the whole input layer is testable without a terminal or network.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::store::StoreState;
use crate::ui::ThemeKind;

/// Page-number buttons shown at once in the pagination bar
pub const PAGE_WINDOW: u32 = 5;

// =============================================================================
// Screens
// =============================================================================

/// Current screen
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Screen {
    /// Popular titles plus the search box
    #[default]
    Home,
    /// Search/discover results
    Results,
    /// Detail view for one movie
    Detail,
    /// Favorites panel
    Favorites,
    /// Watchlist panel
    Watchlist,
    /// Personal CRUD list
    MyList,
    /// Search history
    History,
    /// Fatal startup failure with recovery choices
    StartupError,
}

/// Current input mode for keyboard handling
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    /// Search box focused
    Editing,
}

// =============================================================================
// Actions
// =============================================================================

/// What the event loop should do in response to a key
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    None,
    Quit,
    /// Run a keyword search from page 1
    SubmitSearch(String),
    /// Schedule a debounced autocomplete request
    Autocomplete(String),
    /// Re-issue the current query (or popular) for another page
    ChangePage(u32),
    /// Fetch and show the detail view
    OpenDetail(u64),
    ToggleFavorite(u64),
    ToggleWatchlist(u64),
    AddToMyList(u64),
    /// Index into the personal list, resolved by the caller
    MyListDeleteAt(usize),
    MyListCycleStatusAt(usize),
    MyListToggleFavoriteAt(usize),
    /// Re-run a remembered query (index into the history list)
    HistoryRunAt(usize),
    ClearHistory,
    /// Advance the sort key and re-discover with the active filters
    CycleSort,
    /// Advance the genre filter and re-discover with the active filters
    CycleGenre,
    ClearFilters,
    ToggleViewMode,
    ToggleTheme,
    /// Reload the home list
    Refresh,
    /// Recovery screen choices
    UseDemoKey,
    RetryStartup,
    WipeAndRetry,
}

// =============================================================================
// List cursor
// =============================================================================

/// Selection state for list views
#[derive(Debug, Clone, Default)]
pub struct ListCursor {
    pub selected: usize,
    pub offset: usize,
    pub len: usize,
}

impl ListCursor {
    pub fn up(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
            if self.selected < self.offset {
                self.offset = self.selected;
            }
        }
    }

    pub fn down(&mut self) {
        if self.len > 0 && self.selected < self.len - 1 {
            self.selected += 1;
        }
    }

    pub fn first(&mut self) {
        self.selected = 0;
        self.offset = 0;
    }

    pub fn last(&mut self) {
        if self.len > 0 {
            self.selected = self.len - 1;
        }
    }

    /// Keep the selection inside the visible viewport
    pub fn scroll_into_view(&mut self, visible_height: usize) {
        if visible_height == 0 {
            return;
        }
        if self.selected < self.offset {
            self.offset = self.selected;
        } else if self.selected >= self.offset + visible_height {
            self.offset = self.selected - visible_height + 1;
        }
    }

    /// Update length when new data arrives, clamping the selection
    pub fn set_len(&mut self, len: usize) {
        self.len = len;
        if len == 0 {
            self.selected = 0;
            self.offset = 0;
        } else if self.selected >= len {
            self.selected = len - 1;
        }
    }
}

// =============================================================================
// Search input
// =============================================================================

/// Text input state for the search box
#[derive(Debug, Clone, Default)]
pub struct SearchInput {
    pub text: String,
    pub cursor: usize,
}

impl SearchInput {
    pub fn insert(&mut self, c: char) {
        let byte_index = self.byte_index();
        self.text.insert(byte_index, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_index = self.byte_index();
            self.text.remove(byte_index);
        }
    }

    pub fn cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        if self.cursor < self.text.chars().count() {
            self.cursor += 1;
        }
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    fn byte_index(&self) -> usize {
        self.text
            .char_indices()
            .nth(self.cursor)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len())
    }
}

// =============================================================================
// Pagination window
// =============================================================================

/// Sliding window of page numbers centered on the current page, clamped to
/// the valid range
pub fn page_window(current: u32, total: u32, size: u32) -> Vec<u32> {
    if total == 0 || size == 0 {
        return Vec::new();
    }
    let half = size / 2;
    let mut start = current.saturating_sub(half).max(1);
    let end = (start + size - 1).min(total);
    if end + 1 - start < size {
        start = (end + 1).saturating_sub(size).max(1);
    }
    (start..=end).collect()
}

// =============================================================================
// Application state
// =============================================================================

/// TUI application state
#[derive(Debug)]
pub struct App {
    pub screen: Screen,
    pub nav_stack: Vec<Screen>,
    pub running: bool,
    pub input_mode: InputMode,
    pub search: SearchInput,
    pub theme: ThemeKind,

    pub results: ListCursor,
    pub favorites: ListCursor,
    pub watchlist: ListCursor,
    pub my_list: ListCursor,
    pub history: ListCursor,

    /// Why startup failed, shown on the recovery screen
    pub startup_error: Option<String>,
    /// Set when the connectivity probe failed; cached data still browsable
    pub offline: bool,
}

impl Default for App {
    fn default() -> Self {
        Self {
            screen: Screen::Home,
            nav_stack: Vec::new(),
            running: true,
            input_mode: InputMode::Normal,
            search: SearchInput::default(),
            theme: ThemeKind::Dark,
            results: ListCursor::default(),
            favorites: ListCursor::default(),
            watchlist: ListCursor::default(),
            my_list: ListCursor::default(),
            history: ListCursor::default(),
            startup_error: None,
            offline: false,
        }
    }
}

impl App {
    pub fn new() -> Self {
        Self::default()
    }

    /// Navigate to a screen, pushing the current one onto the stack.
    /// Panels are exclusive: opening one replaces any open panel instead of
    /// stacking on top of it.
    pub fn navigate(&mut self, screen: Screen) {
        if self.screen == screen {
            return;
        }
        if self.is_panel(&self.screen) && self.is_panel(&screen) {
            self.screen = screen;
        } else {
            self.nav_stack.push(self.screen.clone());
            self.screen = screen;
        }
        self.input_mode = InputMode::Normal;
    }

    fn is_panel(&self, screen: &Screen) -> bool {
        matches!(
            screen,
            Screen::Favorites | Screen::Watchlist | Screen::MyList | Screen::History
        )
    }

    /// Go back to the previous screen
    pub fn back(&mut self) -> bool {
        if self.input_mode == InputMode::Editing {
            self.input_mode = InputMode::Normal;
            return true;
        }
        if let Some(previous) = self.nav_stack.pop() {
            self.screen = previous;
            true
        } else {
            false
        }
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Pull list lengths from the latest snapshot
    pub fn sync_store(&mut self, state: &StoreState) {
        self.results.set_len(state.filtered.len());
        self.favorites.set_len(state.favorites.len());
        self.watchlist.set_len(state.watchlist.len());
    }

    pub fn sync_my_list(&mut self, len: usize) {
        self.my_list.set_len(len);
    }

    pub fn sync_history(&mut self, len: usize) {
        self.history.set_len(len);
    }

    pub fn focus_search(&mut self) {
        self.input_mode = InputMode::Editing;
        if self.screen != Screen::Results && self.screen != Screen::Home {
            self.navigate(Screen::Results);
        }
    }

    // -------------------------------------------------------------------------
    // Keyboard routing
    // -------------------------------------------------------------------------

    /// Handle a key against the latest snapshot and return what to do
    pub fn handle_key(&mut self, key: KeyEvent, state: &StoreState) -> Action {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.quit();
            return Action::Quit;
        }

        if self.screen == Screen::StartupError {
            return self.handle_startup_error_key(key);
        }

        if self.input_mode == InputMode::Editing {
            self.handle_editing_key(key)
        } else {
            self.handle_normal_key(key, state)
        }
    }

    fn handle_editing_key(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
                Action::None
            }
            KeyCode::Enter => {
                self.input_mode = InputMode::Normal;
                let query = self.search.text.trim().to_string();
                if query.is_empty() {
                    Action::None
                } else {
                    self.navigate(Screen::Results);
                    Action::SubmitSearch(query)
                }
            }
            KeyCode::Char(c) => {
                self.search.insert(c);
                Action::Autocomplete(self.search.text.clone())
            }
            KeyCode::Backspace => {
                self.search.backspace();
                Action::Autocomplete(self.search.text.clone())
            }
            KeyCode::Left => {
                self.search.cursor_left();
                Action::None
            }
            KeyCode::Right => {
                self.search.cursor_right();
                Action::None
            }
            _ => Action::None,
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent, state: &StoreState) -> Action {
        // Global shortcuts first
        match key.code {
            KeyCode::Char('q') => {
                self.quit();
                return Action::Quit;
            }
            KeyCode::Char('/') => {
                self.focus_search();
                return Action::None;
            }
            KeyCode::Esc => {
                self.back();
                return Action::None;
            }
            KeyCode::Char('t') => {
                self.theme = self.theme.toggled();
                return Action::ToggleTheme;
            }
            KeyCode::Char('v') => return Action::ToggleViewMode,
            KeyCode::Char('F') => {
                self.navigate(Screen::Favorites);
                return Action::None;
            }
            KeyCode::Char('W') => {
                self.navigate(Screen::Watchlist);
                return Action::None;
            }
            KeyCode::Char('L') => {
                self.navigate(Screen::MyList);
                return Action::None;
            }
            KeyCode::Char('H') => {
                self.navigate(Screen::History);
                return Action::None;
            }
            _ => {}
        }

        match self.screen {
            Screen::Home | Screen::Results => self.handle_results_key(key, state),
            Screen::Detail => self.handle_detail_key(key, state),
            Screen::Favorites => self.handle_saved_list_key(key, state, true),
            Screen::Watchlist => self.handle_saved_list_key(key, state, false),
            Screen::MyList => self.handle_my_list_key(key),
            Screen::History => self.handle_history_key(key),
            Screen::StartupError => Action::None,
        }
    }

    fn selected_result_id(&self, state: &StoreState) -> Option<u64> {
        state.filtered.get(self.results.selected).map(|m| m.id)
    }

    fn handle_results_key(&mut self, key: KeyEvent, state: &StoreState) -> Action {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.results.up();
                Action::None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.results.down();
                Action::None
            }
            KeyCode::Home => {
                self.results.first();
                Action::None
            }
            KeyCode::End => {
                self.results.last();
                Action::None
            }
            KeyCode::Enter => match self.selected_result_id(state) {
                Some(id) => {
                    self.navigate(Screen::Detail);
                    Action::OpenDetail(id)
                }
                None => Action::None,
            },
            KeyCode::Char('f') => self
                .selected_result_id(state)
                .map(Action::ToggleFavorite)
                .unwrap_or(Action::None),
            KeyCode::Char('w') => self
                .selected_result_id(state)
                .map(Action::ToggleWatchlist)
                .unwrap_or(Action::None),
            KeyCode::Char('m') => self
                .selected_result_id(state)
                .map(Action::AddToMyList)
                .unwrap_or(Action::None),
            KeyCode::Right | KeyCode::Char('n') => {
                Action::ChangePage(state.current_page.saturating_add(1))
            }
            KeyCode::Left | KeyCode::Char('p') => {
                Action::ChangePage(state.current_page.saturating_sub(1))
            }
            KeyCode::Char('r') => Action::Refresh,
            KeyCode::Char('o') => Action::CycleSort,
            KeyCode::Char('g') => Action::CycleGenre,
            KeyCode::Char('c') => Action::ClearFilters,
            _ => Action::None,
        }
    }

    fn handle_detail_key(&mut self, key: KeyEvent, state: &StoreState) -> Action {
        let selected_id = state.selected.as_ref().map(|m| m.id);
        match key.code {
            KeyCode::Char('f') => selected_id
                .map(Action::ToggleFavorite)
                .unwrap_or(Action::None),
            KeyCode::Char('w') => selected_id
                .map(Action::ToggleWatchlist)
                .unwrap_or(Action::None),
            KeyCode::Char('m') => selected_id.map(Action::AddToMyList).unwrap_or(Action::None),
            _ => Action::None,
        }
    }

    fn handle_saved_list_key(
        &mut self,
        key: KeyEvent,
        state: &StoreState,
        favorites: bool,
    ) -> Action {
        let cursor = if favorites {
            &mut self.favorites
        } else {
            &mut self.watchlist
        };
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                cursor.up();
                Action::None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                cursor.down();
                Action::None
            }
            KeyCode::Enter => {
                let list = if favorites {
                    &state.favorites
                } else {
                    &state.watchlist
                };
                match list.get(cursor.selected).map(|m| m.id) {
                    Some(id) => {
                        self.navigate(Screen::Detail);
                        Action::OpenDetail(id)
                    }
                    None => Action::None,
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                let list = if favorites {
                    &state.favorites
                } else {
                    &state.watchlist
                };
                match list.get(cursor.selected).map(|m| m.id) {
                    Some(id) if favorites => Action::ToggleFavorite(id),
                    Some(id) => Action::ToggleWatchlist(id),
                    None => Action::None,
                }
            }
            _ => Action::None,
        }
    }

    fn handle_my_list_key(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.my_list.up();
                Action::None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.my_list.down();
                Action::None
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if self.my_list.len > 0 {
                    Action::MyListDeleteAt(self.my_list.selected)
                } else {
                    Action::None
                }
            }
            KeyCode::Char('s') => {
                if self.my_list.len > 0 {
                    Action::MyListCycleStatusAt(self.my_list.selected)
                } else {
                    Action::None
                }
            }
            KeyCode::Char('x') => {
                if self.my_list.len > 0 {
                    Action::MyListToggleFavoriteAt(self.my_list.selected)
                } else {
                    Action::None
                }
            }
            _ => Action::None,
        }
    }

    fn handle_history_key(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.history.up();
                Action::None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.history.down();
                Action::None
            }
            KeyCode::Enter => {
                if self.history.len > 0 {
                    Action::HistoryRunAt(self.history.selected)
                } else {
                    Action::None
                }
            }
            KeyCode::Char('c') => Action::ClearHistory,
            _ => Action::None,
        }
    }

    fn handle_startup_error_key(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Char('d') => Action::UseDemoKey,
            KeyCode::Char('r') => Action::RetryStartup,
            KeyCode::Char('x') => Action::WipeAndRetry,
            KeyCode::Char('q') => {
                self.quit();
                Action::Quit
            }
            _ => Action::None,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MediaType, Movie};

    fn state_with_movies(n: u64) -> StoreState {
        let movies: Vec<Movie> = (1..=n)
            .map(|id| Movie {
                id,
                title: format!("Movie {}", id),
                original_title: format!("Movie {}", id),
                overview: String::new(),
                tagline: String::new(),
                poster_path: None,
                backdrop_path: None,
                release_date: None,
                year: None,
                vote_average: 5.0,
                vote_count: 0,
                popularity: 0.0,
                runtime: None,
                genre_ids: Vec::new(),
                genres: Vec::new(),
                status: String::new(),
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
            })
            .collect();
        StoreState {
            filtered: movies.clone(),
            movies,
            current_page: 1,
            total_pages: 10,
            ..StoreState::default()
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::empty())
    }

    // -------------------------------------------------------------------------
    // Pagination window
    // -------------------------------------------------------------------------

    #[test]
    fn test_page_window_centered() {
        assert_eq!(page_window(5, 10, 5), vec![3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_page_window_clamped_at_start() {
        assert_eq!(page_window(1, 10, 5), vec![1, 2, 3, 4, 5]);
        assert_eq!(page_window(2, 10, 5), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_page_window_clamped_at_end() {
        assert_eq!(page_window(10, 10, 5), vec![6, 7, 8, 9, 10]);
        assert_eq!(page_window(9, 10, 5), vec![6, 7, 8, 9, 10]);
    }

    #[test]
    fn test_page_window_fewer_pages_than_window() {
        assert_eq!(page_window(1, 3, 5), vec![1, 2, 3]);
        assert_eq!(page_window(1, 1, 5), vec![1]);
    }

    #[test]
    fn test_page_window_empty() {
        assert!(page_window(1, 0, 5).is_empty());
    }

    // -------------------------------------------------------------------------
    // ListCursor
    // -------------------------------------------------------------------------

    #[test]
    fn test_cursor_navigation() {
        let mut cursor = ListCursor {
            len: 5,
            ..ListCursor::default()
        };
        cursor.down();
        cursor.down();
        assert_eq!(cursor.selected, 2);
        cursor.last();
        assert_eq!(cursor.selected, 4);
        cursor.down();
        assert_eq!(cursor.selected, 4);
        cursor.first();
        assert_eq!(cursor.selected, 0);
        cursor.up();
        assert_eq!(cursor.selected, 0);
    }

    #[test]
    fn test_cursor_set_len_clamps() {
        let mut cursor = ListCursor {
            len: 10,
            selected: 8,
            ..ListCursor::default()
        };
        cursor.set_len(5);
        assert_eq!(cursor.selected, 4);
        cursor.set_len(0);
        assert_eq!(cursor.selected, 0);
    }

    #[test]
    fn test_cursor_scroll_into_view() {
        let mut cursor = ListCursor {
            len: 30,
            selected: 15,
            offset: 0,
        };
        cursor.scroll_into_view(10);
        assert_eq!(cursor.offset, 6);
        cursor.selected = 3;
        cursor.scroll_into_view(10);
        assert_eq!(cursor.offset, 3);
    }

    // -------------------------------------------------------------------------
    // SearchInput
    // -------------------------------------------------------------------------

    #[test]
    fn test_search_input_editing() {
        let mut input = SearchInput::default();
        for c in "dune".chars() {
            input.insert(c);
        }
        assert_eq!(input.text, "dune");

        input.cursor_left();
        input.cursor_left();
        input.insert('X');
        assert_eq!(input.text, "duXne");

        input.backspace();
        assert_eq!(input.text, "dune");

        input.clear();
        assert_eq!(input.text, "");
        assert_eq!(input.cursor, 0);
    }

    #[test]
    fn test_search_input_multibyte() {
        let mut input = SearchInput::default();
        input.insert('é');
        input.insert('t');
        assert_eq!(input.text, "ét");
        input.cursor_left();
        input.cursor_left();
        input.insert('b');
        assert_eq!(input.text, "bét");
    }

    // -------------------------------------------------------------------------
    // Navigation
    // -------------------------------------------------------------------------

    #[test]
    fn test_navigation_stack() {
        let mut app = App::new();
        app.navigate(Screen::Results);
        app.navigate(Screen::Detail);
        assert_eq!(app.screen, Screen::Detail);

        assert!(app.back());
        assert_eq!(app.screen, Screen::Results);
        assert!(app.back());
        assert_eq!(app.screen, Screen::Home);
        assert!(!app.back());
    }

    #[test]
    fn test_panels_replace_each_other() {
        let mut app = App::new();
        app.navigate(Screen::Favorites);
        app.navigate(Screen::Watchlist);
        assert_eq!(app.screen, Screen::Watchlist);
        // One back step returns underneath the panel, not to the other panel
        assert!(app.back());
        assert_eq!(app.screen, Screen::Home);
    }

    #[test]
    fn test_quit_keys() {
        let state = StoreState::default();

        let mut app = App::new();
        assert_eq!(app.handle_key(key(KeyCode::Char('q')), &state), Action::Quit);
        assert!(!app.running);

        let mut app = App::new();
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(app.handle_key(ctrl_c, &state), Action::Quit);
        assert!(!app.running);
    }

    #[test]
    fn test_search_submit_flow() {
        let state = StoreState::default();
        let mut app = App::new();

        app.handle_key(key(KeyCode::Char('/')), &state);
        assert_eq!(app.input_mode, InputMode::Editing);

        for c in "dune".chars() {
            let action = app.handle_key(key(KeyCode::Char(c)), &state);
            assert!(matches!(action, Action::Autocomplete(_)));
        }

        let action = app.handle_key(key(KeyCode::Enter), &state);
        assert_eq!(action, Action::SubmitSearch("dune".to_string()));
        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.screen, Screen::Results);
    }

    #[test]
    fn test_blank_search_not_submitted() {
        let state = StoreState::default();
        let mut app = App::new();
        app.focus_search();
        app.handle_key(key(KeyCode::Char(' ')), &state);
        let action = app.handle_key(key(KeyCode::Enter), &state);
        assert_eq!(action, Action::None);
    }

    #[test]
    fn test_escape_exits_editing_before_navigating() {
        let state = StoreState::default();
        let mut app = App::new();
        app.navigate(Screen::Results);
        app.input_mode = InputMode::Editing;

        app.handle_key(key(KeyCode::Esc), &state);
        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.screen, Screen::Results);

        app.handle_key(key(KeyCode::Esc), &state);
        assert_eq!(app.screen, Screen::Home);
    }

    #[test]
    fn test_open_detail_from_results() {
        let state = state_with_movies(3);
        let mut app = App::new();
        app.navigate(Screen::Results);
        app.sync_store(&state);
        app.handle_key(key(KeyCode::Char('j')), &state);

        let action = app.handle_key(key(KeyCode::Enter), &state);
        assert_eq!(action, Action::OpenDetail(2));
        assert_eq!(app.screen, Screen::Detail);
    }

    #[test]
    fn test_favorite_toggle_targets_selection() {
        let state = state_with_movies(3);
        let mut app = App::new();
        app.navigate(Screen::Results);
        app.sync_store(&state);
        app.handle_key(key(KeyCode::Char('j')), &state);
        app.handle_key(key(KeyCode::Char('j')), &state);

        assert_eq!(
            app.handle_key(key(KeyCode::Char('f')), &state),
            Action::ToggleFavorite(3)
        );
        assert_eq!(
            app.handle_key(key(KeyCode::Char('w')), &state),
            Action::ToggleWatchlist(3)
        );
    }

    #[test]
    fn test_empty_results_actions_are_noops() {
        let state = StoreState::default();
        let mut app = App::new();
        app.navigate(Screen::Results);
        app.sync_store(&state);
        assert_eq!(app.handle_key(key(KeyCode::Enter), &state), Action::None);
        assert_eq!(
            app.handle_key(key(KeyCode::Char('f')), &state),
            Action::None
        );
    }

    #[test]
    fn test_page_change_keys() {
        let mut state = state_with_movies(3);
        state.current_page = 4;
        let mut app = App::new();
        app.navigate(Screen::Results);
        app.sync_store(&state);

        assert_eq!(
            app.handle_key(key(KeyCode::Char('n')), &state),
            Action::ChangePage(5)
        );
        assert_eq!(
            app.handle_key(key(KeyCode::Char('p')), &state),
            Action::ChangePage(3)
        );
    }

    #[test]
    fn test_filter_keys() {
        let state = state_with_movies(3);
        let mut app = App::new();
        app.navigate(Screen::Results);
        app.sync_store(&state);

        assert_eq!(
            app.handle_key(key(KeyCode::Char('o')), &state),
            Action::CycleSort
        );
        assert_eq!(
            app.handle_key(key(KeyCode::Char('g')), &state),
            Action::CycleGenre
        );
        assert_eq!(
            app.handle_key(key(KeyCode::Char('c')), &state),
            Action::ClearFilters
        );
    }

    #[test]
    fn test_startup_error_keys() {
        let state = StoreState::default();
        let mut app = App::new();
        app.screen = Screen::StartupError;

        assert_eq!(
            app.handle_key(key(KeyCode::Char('d')), &state),
            Action::UseDemoKey
        );
        assert_eq!(
            app.handle_key(key(KeyCode::Char('r')), &state),
            Action::RetryStartup
        );
        assert_eq!(
            app.handle_key(key(KeyCode::Char('x')), &state),
            Action::WipeAndRetry
        );
    }

    #[test]
    fn test_theme_and_view_mode_keys() {
        let state = StoreState::default();
        let mut app = App::new();
        assert_eq!(app.theme, ThemeKind::Dark);
        assert_eq!(
            app.handle_key(key(KeyCode::Char('t')), &state),
            Action::ToggleTheme
        );
        assert_eq!(app.theme, ThemeKind::Light);
        assert_eq!(
            app.handle_key(key(KeyCode::Char('v')), &state),
            Action::ToggleViewMode
        );
    }

    #[test]
    fn test_history_screen_keys() {
        let state = StoreState::default();
        let mut app = App::new();
        app.navigate(Screen::History);
        app.sync_history(2);
        app.handle_key(key(KeyCode::Char('j')), &state);

        assert_eq!(
            app.handle_key(key(KeyCode::Enter), &state),
            Action::HistoryRunAt(1)
        );
        assert_eq!(
            app.handle_key(key(KeyCode::Char('c')), &state),
            Action::ClearHistory
        );
    }

    #[test]
    fn test_my_list_screen_keys() {
        let state = StoreState::default();
        let mut app = App::new();
        app.navigate(Screen::MyList);
        app.sync_my_list(3);
        app.handle_key(key(KeyCode::Char('j')), &state);

        assert_eq!(
            app.handle_key(key(KeyCode::Char('d')), &state),
            Action::MyListDeleteAt(1)
        );
        assert_eq!(
            app.handle_key(key(KeyCode::Char('s')), &state),
            Action::MyListCycleStatusAt(1)
        );
        assert_eq!(
            app.handle_key(key(KeyCode::Char('x')), &state),
            Action::MyListToggleFavoriteAt(1)
        );
    }
}
