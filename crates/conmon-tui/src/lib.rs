//! # conmon-tui
//!
//! Interactive terminal dashboard for the connection monitor.
//!
//! Built with `ratatui` and `crossterm`, providing:
//! - A live connection table with closing connections dimmed until their
//!   grace period ends.
//! - A listening-socket view.
//! - Process termination for the selected connection.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod app;
pub mod event;
pub mod ui;

use std::io;
use std::time::Duration;

use conmon_core::monitor::ViewReceiver;
use conmon_core::source::ProcessTree;
use conmon_core::terminate::Terminator;
use ratatui::DefaultTerminal;

use crate::app::{Action, App};
use crate::event::TerminalEvent;

/// Runs the dashboard until the operator quits.
///
/// Views are pulled from the monitor's channel before every frame; key
/// presses are handled between frames. Termination requests are executed
/// synchronously and reported in the status bar.
///
/// # Errors
///
/// Returns an error if drawing or reading terminal events fails.
pub fn run<T: ProcessTree>(
    terminal: &mut DefaultTerminal,
    mut views: ViewReceiver,
    terminator: &Terminator<T>,
    frame_rate: Duration,
) -> io::Result<()> {
    let mut app = App::new();
    while app.running {
        sync_view(&mut app, &mut views);

        let _ = terminal.draw(|frame| ui::render(frame, &app))?;

        match event::next(frame_rate)? {
            Some(TerminalEvent::Key(key)) => {
                if let Some(Action::Terminate(pid)) = app.handle_key(key) {
                    let outcome = terminator.terminate(pid);
                    app.record_termination(pid, &outcome);
                }
            }
            Some(TerminalEvent::Resize(width, height)) => {
                tracing::trace!(width, height, "terminal resized");
            }
            Some(TerminalEvent::Tick) | None => {}
        }
    }
    Ok(())
}

/// Pulls the latest view into the app.
///
/// When the monitor has gone away the view freezes and the operator is
/// told once; later status messages are left alone.
fn sync_view(app: &mut App, views: &mut ViewReceiver) {
    match views.has_changed() {
        Ok(true) => app.set_view(views.borrow_and_update().clone()),
        Ok(false) => {}
        Err(_) if app.monitor_stopped => {}
        Err(_) => {
            app.monitor_stopped = true;
            app.set_status(MONITOR_STOPPED);
        }
    }
}

const MONITOR_STOPPED: &str = "monitor stopped; view is frozen";
