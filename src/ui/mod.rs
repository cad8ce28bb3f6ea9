//! Terminal UI components
//!
//! Built with ratatui. Keyboard-first navigation throughout; every frame
//! is a full redraw of the visible screen from the latest state snapshot.

pub mod browser;
pub mod detail;
pub mod panels;
pub mod theme;

pub use theme::{Palette, ThemeKind};
