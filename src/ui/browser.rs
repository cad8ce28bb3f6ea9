//! Result browser: grid and list rendering of the current result set

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::app::{page_window, App, PAGE_WINDOW};
use crate::models::Movie;
use crate::store::{StoreState, ViewMode};
use crate::ui::Palette;

/// Characters of overview shown per list row
const LIST_OVERVIEW_CHARS: usize = 90;

/// Grid cards per row
const GRID_COLUMNS: usize = 4;

/// Render the result area: loading, empty panel, or grid/list plus the
/// pagination bar
pub fn render_results(frame: &mut Frame, area: Rect, state: &StoreState, app: &App, palette: &Palette) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(palette.border())
        .title(Span::styled(
            format!(
                " RESULTS ({} of {}) ",
                state.filtered.len(),
                state.total_results
            ),
            palette.title(),
        ));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    if state.loading {
        let loading = Paragraph::new("⟳ Loading...")
            .style(palette.loading())
            .alignment(Alignment::Center);
        frame.render_widget(loading, inner);
        return;
    }

    if state.filtered.is_empty() {
        render_empty(frame, inner, state, palette);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(inner);

    match state.view_mode {
        ViewMode::Grid => render_grid(frame, chunks[0], state, app, palette),
        ViewMode::List => render_list(frame, chunks[0], state, app, palette),
    }
    render_pagination(frame, chunks[1], state, palette);
}

fn render_empty(frame: &mut Frame, area: Rect, state: &StoreState, palette: &Palette) {
    let message = if state.search_query.is_empty() {
        "Nothing loaded yet. Press / to search.".to_string()
    } else {
        format!(
            "No results for \"{}\". Press / to try another search.",
            state.search_query
        )
    };
    let empty = Paragraph::new(message)
        .style(palette.dimmed())
        .alignment(Alignment::Center);
    frame.render_widget(empty, area);
}

fn card_lines(movie: &Movie, selected: bool, palette: &Palette) -> Vec<Line<'static>> {
    let title_style = if selected {
        palette.selected()
    } else {
        palette.text()
    };
    let year = movie
        .year
        .map(|y| y.to_string())
        .unwrap_or_else(|| "----".to_string());
    vec![
        Line::from(Span::styled(movie.title.clone(), title_style)),
        Line::from(vec![
            Span::styled(year, palette.dimmed()),
            Span::raw("  "),
            Span::styled(movie.star_bar(), palette.rating(movie.vote_average)),
        ]),
        Line::from(Span::styled(
            movie.short_overview(40),
            palette.dimmed(),
        )),
    ]
}

/// Grid mode: rows of bordered cards
fn render_grid(frame: &mut Frame, area: Rect, state: &StoreState, app: &App, palette: &Palette) {
    let card_height = 5u16;
    let visible_rows = (area.height / card_height).max(1) as usize;

    let mut cursor = app.results.clone();
    cursor.scroll_into_view(visible_rows * GRID_COLUMNS);
    let first_row = cursor.offset / GRID_COLUMNS;

    let row_constraints: Vec<Constraint> = (0..visible_rows)
        .map(|_| Constraint::Length(card_height))
        .collect();
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(row_constraints)
        .split(area);

    for (row_index, row_area) in rows.iter().enumerate() {
        let column_constraints: Vec<Constraint> = (0..GRID_COLUMNS)
            .map(|_| Constraint::Ratio(1, GRID_COLUMNS as u32))
            .collect();
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(column_constraints)
            .split(*row_area);

        for (column_index, cell) in columns.iter().enumerate() {
            let movie_index = (first_row + row_index) * GRID_COLUMNS + column_index;
            let Some(movie) = state.filtered.get(movie_index) else {
                continue;
            };
            let selected = movie_index == app.results.selected;
            let border_style = if selected {
                palette.border_focused()
            } else {
                palette.border()
            };
            let card = Paragraph::new(card_lines(movie, selected, palette)).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(border_style),
            );
            frame.render_widget(card, *cell);
        }
    }
}

/// List mode: one row per movie with a truncated overview
fn render_list(frame: &mut Frame, area: Rect, state: &StoreState, app: &App, palette: &Palette) {
    let mut cursor = app.results.clone();
    cursor.scroll_into_view(area.height as usize);

    let items: Vec<ListItem> = state
        .filtered
        .iter()
        .enumerate()
        .skip(cursor.offset)
        .take(area.height as usize)
        .map(|(index, movie)| {
            let selected = index == app.results.selected;
            let marker = if selected { "▸ " } else { "  " };
            let year = movie.year.map(|y| format!(" ({})", y)).unwrap_or_default();

            let line = Line::from(vec![
                Span::styled(
                    marker,
                    if selected {
                        palette.accent()
                    } else {
                        palette.dimmed()
                    },
                ),
                Span::styled(
                    movie.title.clone(),
                    if selected {
                        palette.selected()
                    } else {
                        palette.text()
                    },
                ),
                Span::styled(year, palette.dimmed()),
                Span::raw(" "),
                Span::styled(
                    format!("★ {:.1}", movie.vote_average),
                    palette.rating(movie.vote_average),
                ),
                Span::raw("  "),
                Span::styled(movie.short_overview(LIST_OVERVIEW_CHARS), palette.dimmed()),
            ]);
            ListItem::new(line)
        })
        .collect();

    frame.render_widget(List::new(items).style(palette.text()), area);
}

/// Sliding window of page buttons centered on the current page
fn render_pagination(frame: &mut Frame, area: Rect, state: &StoreState, palette: &Palette) {
    if state.total_pages <= 1 {
        return;
    }

    let mut spans: Vec<Span> = vec![Span::styled("page ", palette.dimmed())];
    for page in page_window(state.current_page, state.total_pages, PAGE_WINDOW) {
        let style = if page == state.current_page {
            palette.selected()
        } else {
            palette.dimmed()
        };
        spans.push(Span::styled(format!(" {} ", page), style));
    }
    spans.push(Span::styled(
        format!(" / {}  (n/p to flip)", state.total_pages),
        palette.dimmed(),
    ));

    let bar = Paragraph::new(Line::from(spans)).alignment(Alignment::Center);
    frame.render_widget(bar, area);
}
