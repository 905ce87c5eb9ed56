use ratatui::style::{Color, Modifier, Style};

/// Colors of the viewer chrome.
///
/// Log lines are not styled here; their colors come from the severity
/// settings through the `StyleTable`.
pub struct Theme;

impl Theme {
    pub const ACCENT: Color = Color::Cyan;
    const MUTED: Color = Color::DarkGray;
    const BAR: Color = Color::DarkGray;

    pub fn frame() -> Style {
        Style::default().fg(Self::MUTED)
    }

    pub fn title() -> Style {
        Style::default().fg(Self::ACCENT).add_modifier(Modifier::BOLD)
    }

    pub fn plain() -> Style {
        Style::default().fg(Color::White)
    }

    /// Line numbers, separators, secondary labels
    pub fn muted() -> Style {
        Style::default().fg(Self::MUTED)
    }

    pub fn source_name() -> Style {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    }

    /// A severity that is currently filtered out
    pub fn hidden() -> Style {
        Self::muted().add_modifier(Modifier::CROSSED_OUT)
    }

    pub fn status() -> Style {
        Style::default().fg(Color::White).bg(Self::BAR)
    }

    pub fn status_key() -> Style {
        Self::status().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    }

    pub fn alert() -> Style {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    }
}
