//! Color scheme and styles.

use ratatui::style::{Color, Modifier, Style};

/// Pre-defined styles.
pub struct Styles;

impl Styles {
    /// Header bar: reverse video.
    pub fn header() -> Style {
        Style::default().add_modifier(Modifier::REVERSED)
    }

    /// Column titles.
    pub fn table_header() -> Style {
        Style::default()
            .add_modifier(Modifier::REVERSED)
            .add_modifier(Modifier::BOLD)
    }

    /// Interface total row.
    pub fn total() -> Style {
        Style::default().add_modifier(Modifier::BOLD)
    }

    pub fn queue() -> Style {
        Style::default()
    }

    /// Queue with no counters fed in the last interval.
    pub fn idle_queue() -> Style {
        Style::default().fg(Color::DarkGray)
    }
}
