//! Color themes for the TUI
//!
//! Two palettes, dark and light, selected by a persisted preference.

use ratatui::style::{Color, Modifier, Style};

/// Persisted theme preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeKind {
    #[default]
    Dark,
    Light,
}

impl ThemeKind {
    pub fn toggled(self) -> Self {
        match self {
            ThemeKind::Dark => ThemeKind::Light,
            ThemeKind::Light => ThemeKind::Dark,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ThemeKind::Dark => "dark",
            ThemeKind::Light => "light",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "light" => ThemeKind::Light,
            _ => ThemeKind::Dark,
        }
    }
}

/// Resolved color palette for one theme
pub struct Palette {
    pub background: Color,
    pub surface: Color,
    pub primary: Color,
    pub accent: Color,
    pub text: Color,
    pub dim: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub border: Color,
    pub border_focused: Color,
}

impl Palette {
    pub fn for_kind(kind: ThemeKind) -> Self {
        match kind {
            ThemeKind::Dark => Self::dark(),
            ThemeKind::Light => Self::light(),
        }
    }

    fn dark() -> Self {
        Self {
            background: Color::Rgb(0x12, 0x12, 0x18),
            surface: Color::Rgb(0x1c, 0x1c, 0x26),
            primary: Color::Rgb(0x43, 0x61, 0xee),
            accent: Color::Rgb(0xf7, 0x25, 0x85),
            text: Color::Rgb(0xe0, 0xe0, 0xe0),
            dim: Color::Rgb(0x55, 0x55, 0x66),
            success: Color::Rgb(0x4c, 0xc9, 0xf0),
            warning: Color::Rgb(0xf8, 0x96, 0x1e),
            error: Color::Rgb(0xe6, 0x39, 0x46),
            border: Color::Rgb(0x33, 0x3a, 0x56),
            border_focused: Color::Rgb(0x43, 0x61, 0xee),
        }
    }

    fn light() -> Self {
        Self {
            background: Color::Rgb(0xf8, 0xf9, 0xfa),
            surface: Color::Rgb(0xec, 0xee, 0xf2),
            primary: Color::Rgb(0x3a, 0x0c, 0xa3),
            accent: Color::Rgb(0xf7, 0x25, 0x85),
            text: Color::Rgb(0x21, 0x25, 0x29),
            dim: Color::Rgb(0x8a, 0x8f, 0x98),
            success: Color::Rgb(0x13, 0x7a, 0xa8),
            warning: Color::Rgb(0xb5, 0x6a, 0x0b),
            error: Color::Rgb(0xc2, 0x2d, 0x3a),
            border: Color::Rgb(0xc5, 0xcb, 0xd6),
            border_focused: Color::Rgb(0x3a, 0x0c, 0xa3),
        }
    }

    // -------------------------------------------------------------------------
    // Style helpers
    // -------------------------------------------------------------------------

    pub fn base(&self) -> Style {
        Style::default().fg(self.text).bg(self.background)
    }

    pub fn text(&self) -> Style {
        Style::default().fg(self.text)
    }

    pub fn title(&self) -> Style {
        Style::default()
            .fg(self.primary)
            .add_modifier(Modifier::BOLD)
    }

    pub fn dimmed(&self) -> Style {
        Style::default().fg(self.dim)
    }

    pub fn accent(&self) -> Style {
        Style::default()
            .fg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    pub fn selected(&self) -> Style {
        Style::default()
            .fg(self.background)
            .bg(self.primary)
            .add_modifier(Modifier::BOLD)
    }

    pub fn success(&self) -> Style {
        Style::default().fg(self.success)
    }

    pub fn warning(&self) -> Style {
        Style::default().fg(self.warning)
    }

    pub fn error(&self) -> Style {
        Style::default()
            .fg(self.error)
            .add_modifier(Modifier::BOLD)
    }

    pub fn loading(&self) -> Style {
        Style::default()
            .fg(self.warning)
            .add_modifier(Modifier::SLOW_BLINK)
    }

    pub fn keybind(&self) -> Style {
        Style::default()
            .fg(self.background)
            .bg(self.dim)
            .add_modifier(Modifier::BOLD)
    }

    pub fn border(&self) -> Style {
        Style::default().fg(self.border)
    }

    pub fn border_focused(&self) -> Style {
        Style::default().fg(self.border_focused)
    }

    /// Rating color band: good / middling / poor
    pub fn rating(&self, vote_average: f32) -> Style {
        if vote_average >= 7.0 {
            self.success()
        } else if vote_average >= 5.0 {
            self.warning()
        } else {
            self.dimmed()
        }
    }
}
