use std::io;

use logtint_logs::VisibilitySettings;
use logtint_types::ClassifiedLine;

use crate::app::AppState;
use crate::style::StyleTable;
use crate::tui::Tui;
use crate::ui::screens::LogViewerScreen;
use crate::viewer::ViewerAdapter;

/// Full-screen viewer drawn with ratatui
pub struct TerminalViewer {
    tui: Tui,
    state: AppState,
    visibility: VisibilitySettings,
}

impl TerminalViewer {
    /// Take over the terminal
    pub fn new(state: AppState) -> io::Result<Self> {
        Ok(Self {
            tui: Tui::new()?,
            state,
            visibility: VisibilitySettings::default(),
        })
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut AppState {
        &mut self.state
    }

    /// Visibility shown in the header and stats bar on the next render
    pub fn set_visibility(&mut self, visibility: VisibilitySettings) {
        self.visibility = visibility;
    }

    /// Give the terminal back
    pub fn restore(&mut self) -> io::Result<()> {
        self.tui.restore()
    }
}

impl ViewerAdapter for TerminalViewer {
    fn render(&mut self, lines: &[ClassifiedLine], styles: &StyleTable) -> io::Result<()> {
        let Self {
            tui,
            state,
            visibility,
        } = self;

        tui.terminal().draw(|frame| {
            LogViewerScreen::render(frame, state, lines, styles, visibility);
        })?;
        Ok(())
    }
}
