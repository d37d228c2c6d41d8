//! Established connection table and the detail panel for one connection.
//!
//! Closing connections stay in the table, dimmed and marked until their
//! grace period runs out.

use std::net::SocketAddr;

use conmon_core::reconcile::RenderRow;
use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style, Stylize};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState};

use crate::app::App;

const HEADERS: [&str; 6] = ["ID", "Local", "Remote", "PID", "Service", "State"];

/// Renders the connection table with the selection highlighted.
pub fn render_table(frame: &mut Frame, app: &App, area: Rect) {
    let view = app.view();
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Connections ")
        .border_style(Style::default().fg(Color::Cyan));

    if view.connections.is_empty() {
        let message = if view.cycle == 0 {
            "waiting for first snapshot"
        } else {
            "no established connections"
        };
        frame.render_widget(Paragraph::new(message.dark_gray()).block(block), area);
        return;
    }

    let rows = view.connections.rows().iter().map(table_row);
    let widths = [
        Constraint::Length(6),
        Constraint::Min(22),
        Constraint::Min(22),
        Constraint::Length(8),
        Constraint::Min(12),
        Constraint::Length(12),
    ];
    let table = Table::new(rows, widths)
        .header(
            Row::new(HEADERS)
                .style(Style::default().add_modifier(Modifier::BOLD))
                .bottom_margin(1),
        )
        .block(block)
        .row_highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    let mut state = TableState::default().with_selected(Some(app.selected_index));
    frame.render_stateful_widget(table, area, &mut state);
}

fn table_row(row: &RenderRow) -> Row<'_> {
    let state = if row.dying {
        Cell::from(format!("(closing) {}", row.grace_remaining)).style(Style::default().fg(Color::Yellow))
    } else {
        Cell::from("open").style(Style::default().fg(Color::Green))
    };
    let cells = vec![
        Cell::from(row.id.to_string()),
        Cell::from(SocketAddr::new(row.local_addr, row.local_port).to_string()),
        Cell::from(SocketAddr::new(row.remote_addr, row.remote_port).to_string()),
        Cell::from(row.pid.to_string()),
        Cell::from(row.annotation.as_str()),
        state,
    ];
    let style = if row.dying {
        Style::default().add_modifier(Modifier::DIM)
    } else {
        Style::default()
    };
    Row::new(cells).style(style)
}

/// Renders the detail panel for the selected connection.
pub fn render_detail(frame: &mut Frame, app: &App, area: Rect) {
    let Some(row) = app.selected_connection() else {
        return;
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Connection {} ", row.id))
        .border_style(Style::default().fg(Color::Yellow));

    let state = if row.dying {
        format!("closing, {} cycle(s) left", row.grace_remaining)
    } else {
        "open".to_owned()
    };
    let lines = vec![
        field("Local", SocketAddr::new(row.local_addr, row.local_port).to_string()),
        field("Remote", SocketAddr::new(row.remote_addr, row.remote_port).to_string()),
        field("PID", row.pid.to_string()),
        field("Service", row.annotation.clone()),
        field("State", state),
        Line::from(""),
        Line::from("d: terminate process and its children".dark_gray()),
    ];
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn field(label: &'static str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{label:<9}"), Style::default().fg(Color::Cyan)),
        Span::raw(value),
    ])
}
