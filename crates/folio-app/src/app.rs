//! Session view state machine.
//!
//! This module defines the [`App`] state machine, which tracks which tab a
//! visitor is looking at, completely decoupled from terminal and network I/O.
//!
//! This is a pure state machine: it consumes [`crate::AppEvent`] inputs and
//! produces [`crate::AppAction`] instructions for the runtime to execute.
//!
//! # Transitions
//!
//! - A tab's shortcut key selects that tab; `Tab` returns to the first one.
//! - `q` and Ctrl+C quit, as does a server shutdown.
//! - Any other key leaves the state unchanged but still asks for a render.
//! - Once quit, every further event is ignored.

use crate::{AppAction, AppEvent, Content, ContentBlock, KeyInput, Tab};

/// Session view state machine.
///
/// One instance per connection, owned by that connection's task.
#[derive(Debug, Clone)]
pub struct App {
    /// Static content shared by all sessions.
    content: &'static Content,
    /// Index into `content.tabs()`.
    active_tab: usize,
    /// Terminal dimensions (columns, rows) negotiated at session start.
    terminal_size: (u16, u16),
    /// Set once a `Quit` has been emitted.
    quitting: bool,
}

impl App {
    /// Create a session view sized to the visitor's terminal.
    pub fn new(cols: u16, rows: u16) -> Self {
        Self::with_content(Content::portfolio(), cols, rows)
    }

    /// Create a session view over custom content.
    pub fn with_content(content: &'static Content, cols: u16, rows: u16) -> Self {
        Self { content, active_tab: 0, terminal_size: (cols, rows), quitting: false }
    }

    /// Process an event and return actions.
    pub fn handle(&mut self, event: AppEvent) -> Vec<AppAction> {
        if self.quitting {
            return vec![];
        }

        match event {
            AppEvent::Key(key) if key.is_quit() => self.quit(),
            AppEvent::Key(KeyInput::Tab) => {
                self.select_tab(0);
                vec![AppAction::Render]
            },
            AppEvent::Key(KeyInput::Char(c)) => {
                if let Some(index) = self.content.tab_for_shortcut(c) {
                    self.select_tab(index);
                }
                vec![AppAction::Render]
            },
            // Size is fixed at session start; the driver repaints its own viewport.
            AppEvent::Key(_) | AppEvent::Resize(..) => vec![AppAction::Render],
            AppEvent::Shutdown => {
                tracing::debug!("session view closing for server shutdown");
                self.quit()
            },
        }
    }

    fn select_tab(&mut self, index: usize) {
        debug_assert!(index < self.content.tab_count(), "tab index {index} out of range");
        self.active_tab = index;
    }

    fn quit(&mut self) -> Vec<AppAction> {
        self.quitting = true;
        vec![AppAction::Quit]
    }

    /// Static content this session is showing.
    pub fn content(&self) -> &'static Content {
        self.content
    }

    /// All tabs in display order.
    pub fn tabs(&self) -> &'static [Tab] {
        self.content.tabs()
    }

    /// Index of the tab being shown.
    pub fn active_tab(&self) -> usize {
        self.active_tab
    }

    /// Blocks of the tab being shown, in rendering order.
    pub fn active_blocks(&self) -> &'static [ContentBlock] {
        self.content.content_for(self.active_tab)
    }

    /// Terminal dimensions (columns, rows).
    pub fn terminal_size(&self) -> (u16, u16) {
        self.terminal_size
    }

    /// Whether the session has been asked to end.
    pub fn is_quitting(&self) -> bool {
        self.quitting
    }
}
