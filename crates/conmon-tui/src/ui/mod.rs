//! Frame layout and widget rendering.
//!
//! The screen is split top to bottom into a header, the active table
//! (with an optional detail panel beside it), a status line, and a key
//! hint footer.

pub mod connections;
pub mod listening;
pub mod status;

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout};

use crate::app::{App, View};

/// Renders the whole dashboard for one frame.
pub fn render(frame: &mut Frame, app: &App) {
    let [header, body, status_line, footer] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(3),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    status::render_header(frame, app, header);

    match app.current_view {
        View::Connections => {
            if app.detail_open {
                let [table, detail] =
                    Layout::horizontal([Constraint::Percentage(60), Constraint::Percentage(40)])
                        .areas(body);
                connections::render_table(frame, app, table);
                connections::render_detail(frame, app, detail);
            } else {
                connections::render_table(frame, app, body);
            }
        }
        View::Listening => listening::render_table(frame, app, body),
    }

    status::render_status(frame, app, status_line);
    status::render_footer(frame, app, footer);
}

#[cfg(test)]
pub(crate) mod testing {
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    use crate::app::App;

    /// Draws the app on an in-memory terminal and returns the screen text.
    pub fn screen(app: &App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).expect("test terminal");
        let _ = terminal
            .draw(|frame| super::render(frame, app))
            .expect("draw");
        let buffer = terminal.backend().buffer();
        let mut lines = Vec::new();
        for y in 0..height {
            let mut line = String::new();
            for x in 0..width {
                line.push_str(buffer[(x, y)].symbol());
            }
            lines.push(line.trim_end().to_owned());
        }
        lines.join("\n")
    }
}
