//! Terminal-agnostic keyboard input.

/// Keyboard input abstraction.
///
/// Decouples the session view from the byte encoding used by the visitor's
/// terminal, so transitions can be driven directly in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    /// Printable character.
    Char(char),
    /// Control combination, e.g. `Ctrl('c')` for Ctrl+C.
    Ctrl(char),
    /// Alt (Meta) combination, sent by terminals as ESC then the key.
    Alt(char),
    /// Tab key.
    Tab,
    /// Enter/Return key.
    Enter,
    /// Backspace key.
    Backspace,
    /// Delete key.
    Delete,
    /// Escape key.
    Esc,
    /// Left arrow key.
    Left,
    /// Right arrow key.
    Right,
    /// Up arrow key.
    Up,
    /// Down arrow key.
    Down,
    /// Home key.
    Home,
    /// End key.
    End,
}

impl KeyInput {
    /// Interrupt combination (Ctrl+C).
    pub const INTERRUPT: Self = Self::Ctrl('c');

    /// Whether this key ends the session.
    pub fn is_quit(self) -> bool {
        matches!(self, Self::Char('q')) || self == Self::INTERRUPT
    }
}
