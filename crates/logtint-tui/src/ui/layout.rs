use ratatui::layout::{Constraint, Direction, Layout as RatatuiLayout, Rect};

/// Areas of the log viewer screen
pub struct ViewerAreas {
    pub header: Rect,
    pub stats: Option<Rect>,
    pub error: Option<Rect>,
    pub logs: Rect,
    pub status: Rect,
}

/// Layout helper for consistent screen layouts
pub struct Layout;

impl Layout {
    /// Header, optional stats and error bars, logs, status bar
    pub fn log_viewer(area: Rect, show_stats: bool, show_error: bool) -> ViewerAreas {
        let mut constraints = vec![Constraint::Length(3)]; // Header
        if show_stats {
            constraints.push(Constraint::Length(3));
        }
        if show_error {
            constraints.push(Constraint::Length(1));
        }
        constraints.push(Constraint::Min(1)); // Logs
        constraints.push(Constraint::Length(1)); // Status bar

        let chunks = RatatuiLayout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        let mut idx = 0;
        let mut next = || {
            let rect = chunks[idx];
            idx += 1;
            rect
        };

        let header = next();
        let stats = show_stats.then(&mut next);
        let error = show_error.then(&mut next);
        let logs = next();
        let status = next();

        ViewerAreas {
            header,
            stats,
            error,
            logs,
            status,
        }
    }

    /// A centered popup of at most `width` x `height`
    pub fn popup(area: Rect, width: u16, height: u16) -> Rect {
        let width = width.min(area.width.saturating_sub(4));
        let height = height.min(area.height.saturating_sub(4));
        let x = area.x + area.width.saturating_sub(width) / 2;
        let y = area.y + area.height.saturating_sub(height) / 2;
        Rect::new(x, y, width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_viewer_areas() {
        let area = Rect::new(0, 0, 80, 24);

        let full = Layout::log_viewer(area, true, true);
        assert_eq!(full.header.height, 3);
        assert_eq!(full.stats.map(|r| r.height), Some(3));
        assert_eq!(full.error.map(|r| r.height), Some(1));
        assert_eq!(full.logs.height, 24 - 3 - 3 - 1 - 1);
        assert_eq!(full.status.y, 23);

        let bare = Layout::log_viewer(area, false, false);
        assert!(bare.stats.is_none());
        assert!(bare.error.is_none());
        assert_eq!(bare.logs.height, 20);
    }

    #[test]
    fn test_popup_is_centered() {
        let popup = Layout::popup(Rect::new(0, 0, 100, 40), 50, 20);
        assert_eq!(popup, Rect::new(25, 10, 50, 20));

        let small = Layout::popup(Rect::new(0, 0, 20, 10), 50, 20);
        assert_eq!(small.width, 16);
        assert_eq!(small.height, 6);
    }
}
