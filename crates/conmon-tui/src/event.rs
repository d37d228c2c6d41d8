//! Terminal event handling.
//!
//! Captures keyboard and resize events from the terminal and hands them to
//! the application state machine.

use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEventKind};

/// Terminal input events.
#[derive(Debug, Clone)]
pub enum TerminalEvent {
    /// A key was pressed.
    Key(crossterm::event::KeyEvent),
    /// The terminal was resized.
    Resize(u16, u16),
    /// A periodic tick for UI refresh.
    Tick,
}

/// Waits up to `timeout` for the next relevant event.
///
/// Returns [`TerminalEvent::Tick`] when nothing arrived in time and `None`
/// for events the dashboard does not handle (key releases, mouse, focus).
///
/// # Errors
///
/// Returns an error if the terminal cannot be polled.
pub fn next(timeout: Duration) -> io::Result<Option<TerminalEvent>> {
    if !event::poll(timeout)? {
        return Ok(Some(TerminalEvent::Tick));
    }
    Ok(match event::read()? {
        Event::Key(key) if key.kind == KeyEventKind::Press => Some(TerminalEvent::Key(key)),
        Event::Resize(width, height) => Some(TerminalEvent::Resize(width, height)),
        _ => None,
    })
}
