//! Saved-list panels: favorites, watchlist, personal list, search history
//!
//! Each panel re-reads its backing data every frame; there is no
//! incremental update.

use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::app::ListCursor;
use crate::models::Movie;
use crate::mylist::ListEntry;
use crate::search::HistoryEntry;
use crate::ui::Palette;

fn panel_block<'a>(title: String, palette: &Palette) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(palette.border())
        .title(Span::styled(title, palette.title()))
}

fn render_empty(frame: &mut Frame, area: Rect, message: &str, palette: &Palette) {
    let empty = Paragraph::new(message.to_string())
        .style(palette.dimmed())
        .alignment(Alignment::Center);
    frame.render_widget(empty, area);
}

/// Favorites or watchlist: both are plain movie lists
pub fn render_saved_list(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    movies: &[Movie],
    cursor: &ListCursor,
    palette: &Palette,
) {
    let block = panel_block(format!(" {} ({}) ", title, movies.len()), palette);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if movies.is_empty() {
        render_empty(
            frame,
            inner,
            "Empty. Press f/w on a result to save it here.",
            palette,
        );
        return;
    }

    let mut view = cursor.clone();
    view.scroll_into_view(inner.height as usize);

    let items: Vec<ListItem> = movies
        .iter()
        .enumerate()
        .skip(view.offset)
        .take(inner.height as usize)
        .map(|(index, movie)| {
            let selected = index == cursor.selected;
            let marker = if selected { "▸ " } else { "  " };
            ListItem::new(Line::from(vec![
                Span::styled(
                    marker,
                    if selected {
                        palette.accent()
                    } else {
                        palette.dimmed()
                    },
                ),
                Span::styled(
                    movie.to_string(),
                    if selected {
                        palette.selected()
                    } else {
                        palette.text()
                    },
                ),
            ]))
        })
        .collect();

    frame.render_widget(List::new(items).style(palette.text()), inner);
}

/// The personal CRUD list with status, own rating and favorite flag
pub fn render_my_list(
    frame: &mut Frame,
    area: Rect,
    entries: &[ListEntry],
    cursor: &ListCursor,
    palette: &Palette,
) {
    let block = panel_block(format!(" MY LIST ({}) ", entries.len()), palette);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if entries.is_empty() {
        render_empty(
            frame,
            inner,
            "Empty. Press m on a result to add it here.",
            palette,
        );
        return;
    }

    let mut view = cursor.clone();
    view.scroll_into_view(inner.height as usize);

    let items: Vec<ListItem> = entries
        .iter()
        .enumerate()
        .skip(view.offset)
        .take(inner.height as usize)
        .map(|(index, entry)| {
            let selected = index == cursor.selected;
            let marker = if selected { "▸ " } else { "  " };
            let year = entry.year.map(|y| format!(" ({})", y)).unwrap_or_default();
            let own_rating = entry
                .my_rating
                .map(|r| format!("  my rating {:.1}", r))
                .unwrap_or_default();
            let favorite = if entry.favorite { "  ♥" } else { "" };

            ListItem::new(Line::from(vec![
                Span::styled(
                    marker,
                    if selected {
                        palette.accent()
                    } else {
                        palette.dimmed()
                    },
                ),
                Span::styled(
                    format!("{}{}", entry.title, year),
                    if selected {
                        palette.selected()
                    } else {
                        palette.text()
                    },
                ),
                Span::styled(format!("  [{}]", entry.status), palette.warning()),
                Span::styled(own_rating, palette.success()),
                Span::styled(favorite, palette.accent()),
            ]))
        })
        .collect();

    frame.render_widget(List::new(items).style(palette.text()), inner);

    let hint = Paragraph::new(Line::from(vec![
        Span::styled(" d ", palette.keybind()),
        Span::styled(" delete  ", palette.dimmed()),
        Span::styled(" s ", palette.keybind()),
        Span::styled(" cycle status  ", palette.dimmed()),
        Span::styled(" x ", palette.keybind()),
        Span::styled(" favorite", palette.dimmed()),
    ]))
    .alignment(Alignment::Right);
    if inner.height > 1 {
        let hint_area = Rect {
            y: inner.y + inner.height - 1,
            height: 1,
            ..inner
        };
        frame.render_widget(hint, hint_area);
    }
}

/// Recent searches, most recent first
pub fn render_history(
    frame: &mut Frame,
    area: Rect,
    entries: &[HistoryEntry],
    cursor: &ListCursor,
    palette: &Palette,
) {
    let block = panel_block(format!(" SEARCH HISTORY ({}) ", entries.len()), palette);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if entries.is_empty() {
        render_empty(frame, inner, "No searches yet.", palette);
        return;
    }

    let mut view = cursor.clone();
    view.scroll_into_view(inner.height as usize);

    let items: Vec<ListItem> = entries
        .iter()
        .enumerate()
        .skip(view.offset)
        .take(inner.height as usize)
        .map(|(index, entry)| {
            let selected = index == cursor.selected;
            let marker = if selected { "▸ " } else { "  " };
            ListItem::new(Line::from(vec![
                Span::styled(
                    marker,
                    if selected {
                        palette.accent()
                    } else {
                        palette.dimmed()
                    },
                ),
                Span::styled(
                    entry.query.clone(),
                    if selected {
                        palette.selected()
                    } else {
                        palette.text()
                    },
                ),
                Span::styled(format!("  {}", entry.display_date), palette.dimmed()),
            ]))
        })
        .collect();

    frame.render_widget(List::new(items).style(palette.text()), inner);
}
