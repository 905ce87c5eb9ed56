use chrono::{DateTime, Local};

use logtint_logs::SeverityCounts;

use super::Action;

/// Viewer state
pub struct AppState {
    /// Name of the source shown in the header
    pub source_name: String,

    /// First visible line (index into the filtered lines)
    pub scroll: usize,

    /// Follow mode: keep the last line in view
    pub auto_scroll: bool,

    /// Is help overlay visible?
    pub help_visible: bool,

    /// Show the per-severity statistics bar?
    pub stats_visible: bool,

    /// Error message to display (if any)
    pub error_message: Option<String>,

    /// Whether app should quit
    pub should_quit: bool,

    /// Number of lines after filtering, as of the last render
    pub visible_count: usize,

    /// Lines per page, as of the last render
    pub page_height: usize,

    /// Counts over all buffered lines, visible or not
    pub counts: SeverityCounts,

    /// When the last line arrived
    pub last_update: Option<DateTime<Local>>,

    /// Source reached end of input
    pub finished: bool,
}

impl AppState {
    pub fn new(source_name: impl Into<String>) -> Self {
        Self {
            source_name: source_name.into(),
            scroll: 0,
            auto_scroll: true,
            help_visible: false,
            stats_visible: true,
            error_message: None,
            should_quit: false,
            visible_count: 0,
            page_height: 1,
            counts: SeverityCounts::default(),
            last_update: None,
            finished: false,
        }
    }

    /// Apply an action to the state
    pub fn apply(&mut self, action: Action) {
        match action {
            Action::Quit => self.should_quit = true,
            Action::ToggleHelp => self.help_visible = !self.help_visible,
            Action::ToggleStats => self.stats_visible = !self.stats_visible,
            Action::ToggleAutoScroll => {
                self.auto_scroll = !self.auto_scroll;
                if self.auto_scroll {
                    self.scroll = self.max_scroll();
                }
            }
            Action::ScrollUp(n) => {
                self.auto_scroll = false;
                self.scroll = self.scroll.saturating_sub(n);
            }
            Action::ScrollDown(n) => self.scroll_down(n),
            Action::PageUp => {
                self.auto_scroll = false;
                self.scroll = self.scroll.saturating_sub(self.page_height);
            }
            Action::PageDown => self.scroll_down(self.page_height),
            Action::ScrollToTop => {
                self.auto_scroll = false;
                self.scroll = 0;
            }
            Action::ScrollToBottom => {
                self.auto_scroll = true;
                self.scroll = self.max_scroll();
            }
            Action::ShowError(msg) => self.error_message = Some(msg),
            Action::DismissError => self.error_message = None,
            // Applied by the host
            Action::ToggleSeverity(_)
            | Action::ToggleUnclassified
            | Action::ShowAllSeverities
            | Action::NextSource => {}
        }
    }

    /// Record a newly arrived line
    pub fn touch(&mut self) {
        self.last_update = Some(Local::now());
    }

    /// Forget the scroll position (document reloaded)
    pub fn reset_scroll(&mut self) {
        self.scroll = 0;
        self.auto_scroll = true;
    }

    /// Clamp the scroll position to the current content and viewport
    pub fn clamp_scroll(&mut self, visible_count: usize, page_height: usize) {
        self.visible_count = visible_count;
        self.page_height = page_height.max(1);

        if self.auto_scroll {
            self.scroll = self.max_scroll();
        } else if self.scroll > self.max_scroll() {
            self.scroll = self.max_scroll();
        }
    }

    pub fn max_scroll(&self) -> usize {
        self.visible_count.saturating_sub(self.page_height)
    }

    fn scroll_down(&mut self, n: usize) {
        self.scroll = (self.scroll + n).min(self.max_scroll());
        // Reaching the bottom re-enables follow mode, like less +F
        self.auto_scroll = self.scroll >= self.max_scroll();
    }
}
