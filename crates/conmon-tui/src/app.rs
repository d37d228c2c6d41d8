//! TUI application state machine.
//!
//! Holds the latest published view, the selection, and the status line.
//! Key handling is pure: it mutates the state and returns an [`Action`]
//! for the caller to execute against the OS.

use std::sync::Arc;

use conmon_common::error::Result;
use conmon_common::types::ProcessId;
use conmon_core::monitor::MonitorView;
use conmon_core::reconcile::RenderRow;
use conmon_core::terminate::TerminationReport;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Which table the TUI is currently showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Established connections, alive and closing.
    Connections,
    /// Listening sockets.
    Listening,
}

/// Side effect requested by a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Terminate the process (and its direct children).
    Terminate(ProcessId),
}

/// Root application state for the TUI.
#[derive(Debug)]
pub struct App {
    /// Whether the app should continue running.
    pub running: bool,
    /// Current active view.
    pub current_view: View,
    /// Index of the selected row in the current view.
    pub selected_index: usize,
    /// Whether the detail panel for the selected connection is open.
    pub detail_open: bool,
    /// Set once the monitor's channel has closed.
    pub monitor_stopped: bool,
    status: Option<String>,
    view: Arc<MonitorView>,
}

impl App {
    /// Creates a new application state with an empty view.
    #[must_use]
    pub fn new() -> Self {
        Self {
            running: true,
            current_view: View::Connections,
            selected_index: 0,
            detail_open: false,
            monitor_stopped: false,
            status: None,
            view: Arc::new(MonitorView::default()),
        }
    }

    /// Signals the app to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Replaces the displayed view and keeps the selection in range.
    pub fn set_view(&mut self, view: Arc<MonitorView>) {
        self.view = view;
        self.clamp_selection();
    }

    /// The currently displayed view.
    #[must_use]
    pub fn view(&self) -> &MonitorView {
        &self.view
    }

    /// Message shown in the status bar, if any.
    #[must_use]
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Sets the status bar message.
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some(message.into());
    }

    /// Number of rows in the current view.
    #[must_use]
    pub fn row_count(&self) -> usize {
        match self.current_view {
            View::Connections => self.view.connections.len(),
            View::Listening => self.view.listening.len(),
        }
    }

    /// Selected connection, when the connection view is active.
    #[must_use]
    pub fn selected_connection(&self) -> Option<&RenderRow> {
        match self.current_view {
            View::Connections => self.view.connections.row(self.selected_index),
            View::Listening => None,
        }
    }

    fn clamp_selection(&mut self) {
        self.selected_index = self.selected_index.min(self.row_count().saturating_sub(1));
        if self.selected_connection().is_none() {
            self.detail_open = false;
        }
    }

    fn move_down(&mut self) {
        if self.selected_index + 1 < self.row_count() {
            self.selected_index += 1;
        }
    }

    fn move_up(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
    }

    fn toggle_view(&mut self) {
        self.current_view = match self.current_view {
            View::Connections => View::Listening,
            View::Listening => View::Connections,
        };
        self.selected_index = 0;
        self.detail_open = false;
        self.status = None;
    }

    /// Applies a key press and returns the side effect it requests.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Action> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.quit();
            return None;
        }
        match key.code {
            KeyCode::Char('q') => self.quit(),
            KeyCode::Esc => {
                if self.detail_open {
                    self.detail_open = false;
                } else {
                    self.quit();
                }
            }
            KeyCode::Char('j') | KeyCode::Down => self.move_down(),
            KeyCode::Char('k') | KeyCode::Up => self.move_up(),
            KeyCode::Char('g') | KeyCode::Home => self.selected_index = 0,
            KeyCode::Char('G') | KeyCode::End => {
                self.selected_index = self.row_count().saturating_sub(1);
            }
            KeyCode::Tab | KeyCode::Char('l') => self.toggle_view(),
            KeyCode::Enter => {
                if self.selected_connection().is_some() {
                    self.detail_open = !self.detail_open;
                }
            }
            KeyCode::Char('d') => return self.request_termination(),
            _ => {}
        }
        None
    }

    fn request_termination(&mut self) -> Option<Action> {
        let Some(row) = self.selected_connection() else {
            self.set_status("no connection selected");
            return None;
        };
        let pid = row.pid;
        self.set_status(format!("terminating process {pid}"));
        Some(Action::Terminate(pid))
    }

    /// Reports the outcome of a termination request in the status bar.
    pub fn record_termination(&mut self, pid: ProcessId, outcome: &Result<TerminationReport>) {
        let message = match outcome {
            Ok(report) if report.children_signalled.is_empty() => {
                format!("killed process {pid}")
            }
            Ok(report) => format!(
                "killed process {pid} and {} child process(es)",
                report.children_signalled.len()
            ),
            Err(e) => {
                tracing::warn!(pid = %pid, error = %e, "termination failed");
                format!("error killing process {pid} [{}]: {e}", e.reason_code())
            }
        };
        self.set_status(message);
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}
