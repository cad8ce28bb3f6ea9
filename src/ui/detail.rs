//! Detail view for a single movie

use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
    Frame,
};

use crate::models::PosterSize;
use crate::store::StoreState;
use crate::ui::Palette;

/// Cast names shown on the detail screen
const CAST_LIMIT: usize = 5;

/// Similar titles shown on the detail screen
const SIMILAR_LIMIT: usize = 6;

pub fn render_detail(frame: &mut Frame, area: Rect, state: &StoreState, palette: &Palette) {
    let title = state
        .selected
        .as_ref()
        .map(|m| m.title.clone())
        .unwrap_or_else(|| "DETAIL".to_string());

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(palette.border())
        .title(Span::styled(format!(" {} ", title), palette.title()));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    if state.loading {
        let loading = Paragraph::new("⟳ Loading details...")
            .style(palette.loading())
            .alignment(Alignment::Center);
        frame.render_widget(loading, inner);
        return;
    }

    let Some(movie) = &state.selected else {
        let empty = Paragraph::new("Nothing selected")
            .style(palette.dimmed())
            .alignment(Alignment::Center);
        frame.render_widget(empty, inner);
        return;
    };

    let mut lines: Vec<Line> = Vec::new();

    if !movie.tagline.is_empty() {
        lines.push(Line::from(Span::styled(
            movie.tagline.clone(),
            palette.accent(),
        )));
        lines.push(Line::from(""));
    }

    let year = movie
        .year
        .map(|y| y.to_string())
        .unwrap_or_else(|| "----".to_string());
    lines.push(Line::from(vec![
        Span::styled(year, palette.text()),
        Span::raw("  ·  "),
        Span::styled(movie.formatted_runtime(), palette.text()),
        Span::raw("  ·  "),
        Span::styled(
            format!("{} ({:.1}, {} votes)", movie.star_bar(), movie.vote_average, movie.vote_count),
            palette.rating(movie.vote_average),
        ),
    ]));

    if !movie.genres.is_empty() {
        lines.push(Line::from(Span::styled(
            movie.genre_names(),
            palette.dimmed(),
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        movie.overview.clone(),
        palette.text(),
    )));
    lines.push(Line::from(""));

    let directors = movie.directors();
    if !directors.is_empty() {
        let names: Vec<&str> = directors.iter().map(|d| d.name.as_str()).collect();
        lines.push(Line::from(vec![
            Span::styled("Directed by  ", palette.dimmed()),
            Span::styled(names.join(", "), palette.text()),
        ]));
    }

    if !movie.cast.is_empty() {
        let names: Vec<String> = movie
            .main_cast(CAST_LIMIT)
            .iter()
            .map(|c| c.to_string())
            .collect();
        lines.push(Line::from(vec![
            Span::styled("Starring     ", palette.dimmed()),
            Span::styled(names.join("  ·  "), palette.text()),
        ]));
    }

    if let Some(trailer) = movie.trailer() {
        if let Some(url) = trailer.watch_url() {
            lines.push(Line::from(vec![
                Span::styled("Trailer      ", palette.dimmed()),
                Span::styled(url, palette.success()),
            ]));
        }
    }

    if let Some(url) = movie.imdb_url() {
        lines.push(Line::from(vec![
            Span::styled("IMDB         ", palette.dimmed()),
            Span::styled(url, palette.success()),
        ]));
    }
    lines.push(Line::from(vec![
        Span::styled("Poster       ", palette.dimmed()),
        Span::styled(movie.poster_url(PosterSize::Large), palette.dimmed()),
    ]));

    if !movie.similar.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("Similar titles", palette.title())));
        for similar in movie.similar.iter().take(SIMILAR_LIMIT) {
            lines.push(Line::from(Span::styled(
                format!("  · {}", similar),
                palette.dimmed(),
            )));
        }
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled(" f ", palette.keybind()),
        Span::styled(" favorite   ", palette.dimmed()),
        Span::styled(" w ", palette.keybind()),
        Span::styled(" watchlist   ", palette.dimmed()),
        Span::styled(" m ", palette.keybind()),
        Span::styled(" my list   ", palette.dimmed()),
        Span::styled(" ESC ", palette.keybind()),
        Span::styled(" back", palette.dimmed()),
    ]));

    let content = Paragraph::new(lines).wrap(Wrap { trim: false });
    frame.render_widget(content, inner);
}
