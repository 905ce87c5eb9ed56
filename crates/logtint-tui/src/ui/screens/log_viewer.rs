use ratatui::{
    Frame,
    layout::{Margin, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use logtint_logs::VisibilitySettings;
use logtint_types::{ClassifiedLine, Severity};

use crate::app::AppState;
use crate::style::StyleTable;
use crate::ui::components::{viewer_hints, HelpOverlay, StatusBar};
use crate::ui::{Layout, Theme};

/// Width of the line-number column
const LINE_NUMBER_WIDTH: usize = 6;

/// Log viewer screen
pub struct LogViewerScreen;

impl LogViewerScreen {
    /// Draw the already filtered `lines`
    pub fn render(
        frame: &mut Frame,
        state: &mut AppState,
        lines: &[ClassifiedLine],
        styles: &StyleTable,
        visibility: &VisibilitySettings,
    ) {
        let areas = Layout::log_viewer(
            frame.area(),
            state.stats_visible,
            state.error_message.is_some(),
        );

        Self::render_header(frame, areas.header, state, visibility);
        if let Some(area) = areas.stats {
            Self::render_stats_bar(frame, area, state, styles, visibility);
        }
        if let Some(area) = areas.error {
            Self::render_error(frame, area, state);
        }
        Self::render_logs(frame, areas.logs, state, lines, styles);
        Self::render_status_bar(frame, areas.status, state);

        if state.help_visible {
            HelpOverlay::render(frame);
        }
    }

    fn render_header(frame: &mut Frame, area: Rect, state: &AppState, visibility: &VisibilitySettings) {
        let mut spans = vec![
            Span::styled("logtint", Theme::title()),
            Span::styled(" │ ", Theme::muted()),
            Span::styled(state.source_name.clone(), Theme::source_name()),
        ];

        let all_tags = visibility.all_tags();
        if !all_tags.is_empty() {
            let shown = visibility.visible_tags().len();
            spans.push(Span::styled(" │ ", Theme::muted()));
            spans.push(Span::styled(
                format!("tags {}/{}", shown, all_tags.len()),
                Theme::plain(),
            ));
        }

        if state.finished {
            spans.push(Span::styled(" │ ", Theme::muted()));
            spans.push(Span::styled("EOF", Theme::muted()));
        }

        let header = Paragraph::new(Line::from(spans)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Theme::frame()),
        );

        frame.render_widget(header, area);
    }

    fn render_stats_bar(
        frame: &mut Frame,
        area: Rect,
        state: &AppState,
        styles: &StyleTable,
        visibility: &VisibilitySettings,
    ) {
        let counts = &state.counts;
        let mut spans = vec![Span::styled(" ", Theme::plain())];

        // Most severe first
        for severity in Severity::ALL.into_iter().rev() {
            let label_style = if visibility.is_severity_visible(severity) {
                styles.get(severity.into()).add_modifier(Modifier::BOLD)
            } else {
                Theme::hidden()
            };
            spans.push(Span::styled(format!("{}:", severity.label()), label_style));
            spans.push(Span::styled(format!("{} ", counts.get(severity)), Theme::plain()));
        }

        if counts.unclassified > 0 {
            let label_style = if visibility.is_unclassified_visible() {
                Theme::muted()
            } else {
                Theme::hidden()
            };
            spans.push(Span::styled("│ ", Theme::muted()));
            spans.push(Span::styled("Other:", label_style));
            spans.push(Span::styled(format!("{} ", counts.unclassified), Theme::plain()));
        }

        spans.push(Span::styled("│ ", Theme::muted()));
        spans.push(Span::styled("Total:", Theme::muted()));
        spans.push(Span::styled(format!("{}", counts.total()), Theme::plain()));

        let stats_widget = Paragraph::new(Line::from(spans)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Theme::frame())
                .title(Span::styled(" Stats ", Theme::title())),
        );
        frame.render_widget(stats_widget, area);
    }

    fn render_error(frame: &mut Frame, area: Rect, state: &AppState) {
        if let Some(msg) = &state.error_message {
            let line = Line::from(vec![
                Span::styled(format!(" ⚠ {}", msg), Theme::alert()),
                Span::styled("  [Esc] Dismiss", Theme::muted()),
            ]);
            frame.render_widget(Paragraph::new(line), area);
        }
    }

    fn render_logs(
        frame: &mut Frame,
        area: Rect,
        state: &mut AppState,
        lines: &[ClassifiedLine],
        styles: &StyleTable,
    ) {
        let total = lines.len();

        // Account for the border
        let inner_height = area.height.saturating_sub(2) as usize;
        state.clamp_scroll(total, inner_height);

        // 2 for borders, 2 for scrollbar
        let inner_width = area.width.saturating_sub(4) as usize;

        let rendered: Vec<Line> = lines
            .iter()
            .skip(state.scroll)
            .take(inner_height)
            .map(|line| Self::format_line(line, styles, inner_width))
            .collect();

        let title = if total == state.counts.total() {
            format!(" Logs ({}) ", total)
        } else {
            format!(" Logs ({} of {}) ", total, state.counts.total())
        };

        let logs_widget = Paragraph::new(rendered).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Theme::frame())
                .title(Span::styled(title, Theme::title())),
        );

        frame.render_widget(logs_widget, area);

        if total > inner_height {
            let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .begin_symbol(Some("▲"))
                .end_symbol(Some("▼"));

            let mut scrollbar_state = ScrollbarState::default()
                .content_length(state.max_scroll())
                .position(state.scroll);

            frame.render_stateful_widget(
                scrollbar,
                area.inner(Margin {
                    vertical: 1,
                    horizontal: 0,
                }),
                &mut scrollbar_state,
            );
        }
    }

    /// Line number, level label, then the raw text in its severity style
    fn format_line(line: &ClassifiedLine, styles: &StyleTable, available_width: usize) -> Line<'static> {
        let style = styles.get(line.classification);

        // " 12345 " + "ERR" + " │ "
        let prefix_width = LINE_NUMBER_WIDTH + 1 + 3 + 3;
        let message_width = available_width.saturating_sub(prefix_width);

        let label_style = if line.classification.is_unclassified() {
            Style::default()
        } else {
            style.add_modifier(Modifier::BOLD)
        };

        Line::from(vec![
            Span::styled(
                format!("{:>width$} ", line.line_number, width = LINE_NUMBER_WIDTH),
                Theme::muted(),
            ),
            Span::styled(line.classification.label(), label_style),
            Span::styled(" │ ", Theme::muted()),
            Span::styled(truncate_to_width(&line.raw, message_width), style),
        ])
    }

    fn render_status_bar(frame: &mut Frame, area: Rect, state: &AppState) {
        let updated = state
            .last_update
            .map(|t| t.format("%H:%M:%S").to_string())
            .unwrap_or_else(|| "--:--:--".to_string());

        let right = format!(
            "{} {}",
            updated,
            if state.auto_scroll { "▼" } else { " " }
        );

        frame.render_widget(StatusBar::new().hints(viewer_hints()).right(right), area);
    }
}

/// Cut `s` to at most `max` display columns, marking the cut with "…"
fn truncate_to_width(s: &str, max: usize) -> String {
    if s.width() <= max {
        return s.to_string();
    }
    if max == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut width = 0;
    for ch in s.chars() {
        let w = ch.width().unwrap_or(0);
        if width + w > max - 1 {
            break;
        }
        width += w;
        out.push(ch);
    }
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use logtint_logs::SeverityCounts;
    use logtint_types::Classification;
    use ratatui::{backend::TestBackend, Terminal};

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let area = buffer.area;
        let mut out = String::new();
        for y in 0..area.height {
            for x in 0..area.width {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn test_truncate_to_width() {
        assert_eq!(truncate_to_width("hello", 10), "hello");
        assert_eq!(truncate_to_width("hello world", 6), "hello…");
        // Wide characters count double
        assert_eq!(truncate_to_width("日本語テキスト", 5), "日本…");
        assert_eq!(truncate_to_width("abc", 0), "");
    }

    #[test]
    fn test_renders_lines_with_labels() {
        let lines = vec![
            ClassifiedLine::new(1, "boot".into(), Classification::Unclassified),
            ClassifiedLine::new(2, "ERROR disk full".into(), Severity::Error.into()),
            ClassifiedLine::new(3, "  at foo()".into(), Severity::Error.into()),
        ];

        let mut state = AppState::new("app.log");
        state.counts = SeverityCounts {
            by_severity: [0, 0, 0, 0, 2],
            unclassified: 1,
        };

        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        terminal
            .draw(|frame| {
                LogViewerScreen::render(
                    frame,
                    &mut state,
                    &lines,
                    &StyleTable::default(),
                    &VisibilitySettings::default(),
                )
            })
            .unwrap();

        let text = screen_text(&terminal);
        assert!(text.contains("app.log"));
        assert!(text.contains("Logs (3)"));
        assert!(text.contains("ERR │ ERROR disk full"));
        assert!(text.contains("ERR │   at foo()"));
        assert!(text.contains("ERR:2"));
        assert!(text.contains("Total:3"));
    }

    #[test]
    fn test_filtered_title_and_error_bar() {
        let lines = vec![ClassifiedLine::new(
            4,
            "ERROR x".into(),
            Severity::Error.into(),
        )];

        let mut state = AppState::new("stdin");
        state.counts = SeverityCounts {
            by_severity: [0, 0, 3, 0, 1],
            unclassified: 0,
        };
        state.error_message = Some("read failed".into());

        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        terminal
            .draw(|frame| {
                LogViewerScreen::render(
                    frame,
                    &mut state,
                    &lines,
                    &StyleTable::default(),
                    &VisibilitySettings::default(),
                )
            })
            .unwrap();

        let text = screen_text(&terminal);
        assert!(text.contains("Logs (1 of 4)"));
        assert!(text.contains("read failed"));
    }
}
