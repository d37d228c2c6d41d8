//! Listening socket table.

use std::net::SocketAddr;

use conmon_common::types::ListeningSocket;
use conmon_core::services;
use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style, Stylize};
use ratatui::widgets::{Block, Borders, Paragraph, Row, Table, TableState};

use crate::app::App;

/// Renders the listening sockets sorted by port.
pub fn render_table(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Listening ")
        .border_style(Style::default().fg(Color::Cyan));

    let mut sockets: Vec<&ListeningSocket> = app.view().listening.iter().collect();
    if sockets.is_empty() {
        frame.render_widget(Paragraph::new("no listening sockets".dark_gray()).block(block), area);
        return;
    }
    sockets.sort_by_key(|s| (s.port, s.addr));

    let rows = sockets.into_iter().map(|s| {
        Row::new(vec![
            SocketAddr::new(s.addr, s.port).to_string(),
            services::annotate(s.port).to_owned(),
        ])
    });
    let table = Table::new(rows, [Constraint::Min(30), Constraint::Min(16)])
        .header(Row::new(["Socket", "Service"]).style(Style::default().add_modifier(Modifier::BOLD)))
        .block(block)
        .row_highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol("> ");

    let mut state = TableState::default().with_selected(Some(app.selected_index));
    frame.render_stateful_widget(table, area, &mut state);
}
