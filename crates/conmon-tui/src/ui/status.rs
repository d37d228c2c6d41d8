//! Header, status line, and key hint footer.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style, Stylize};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::app::{App, View};

const CONNECTION_HINTS: &[(&str, &str)] = &[
    ("j/k", "move"),
    ("Enter", "details"),
    ("d", "terminate"),
    ("Tab", "listening"),
    ("q", "quit"),
];

const LISTENING_HINTS: &[(&str, &str)] = &[("j/k", "move"), ("Tab", "connections"), ("q", "quit")];

/// Renders the title bar with cycle and count summaries.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let view = app.view();
    let refreshed = view
        .refreshed_at
        .map_or_else(|| "never".to_owned(), |t| t.format("%H:%M:%S").to_string());
    let line = Line::from(vec![
        Span::styled(" conmon ", Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD)),
        Span::raw(format!(
            " cycle {} | {} connections | {} closing | {} listening | refreshed {refreshed}",
            view.cycle,
            view.connections.len(),
            view.connections.dying_count(),
            view.listening.len(),
        )),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

/// Renders the latest status message, if any.
pub fn render_status(frame: &mut Frame, app: &App, area: Rect) {
    let Some(message) = app.status() else {
        return;
    };
    let style = if message.starts_with("error") {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::Yellow)
    };
    frame.render_widget(Paragraph::new(Span::styled(format!(" {message}"), style)), area);
}

/// Renders the key hints for the active view.
pub fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let hints = match app.current_view {
        View::Connections => CONNECTION_HINTS,
        View::Listening => LISTENING_HINTS,
    };
    let spans: Vec<Span<'_>> = hints
        .iter()
        .flat_map(|&(key, label)| [Span::raw(" "), key.cyan().bold(), Span::raw(format!(" {label}"))])
        .collect();
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

#[cfg(test)]
mod tests {
    use conmon_common::error::ConmonError;
    use conmon_common::types::ProcessId;

    use crate::app::App;
    use crate::ui::testing::screen;

    #[test]
    fn status_line_shows_termination_errors() {
        let mut app = App::new();
        let pid = ProcessId::new(4321);
        app.record_termination(pid, &Err(ConmonError::ProcessNotFound { pid }));
        let text = screen(&app, 100, 10);
        assert!(text.contains("error killing process 4321"), "screen:\n{text}");
    }

    #[test]
    fn footer_hints_follow_active_view() {
        let app = App::new();
        let text = screen(&app, 100, 10);
        let footer = text.lines().last().expect("footer");
        assert!(footer.contains("terminate"), "footer: {footer}");
    }
}
