//! Session input events.
//!
//! This module defines [`AppEvent`], the set of inputs that drive the
//! [`crate::App`] state machine. Keys come from the visitor's terminal,
//! resizes from pty window changes, and shutdown from the server.

use crate::KeyInput;

/// Events processed by the App state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    /// Keyboard input.
    Key(KeyInput),

    /// Terminal window changed (columns, rows).
    Resize(u16, u16),

    /// Server is closing all sessions.
    Shutdown,
}
