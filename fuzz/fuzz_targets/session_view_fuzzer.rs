//! Fuzz target for the session view state machine and renderer
//!
//! # Strategy
//!
//! - Terminal sizes from zero up to very wide
//! - Arbitrary interleaving of keys, resizes and shutdowns
//! - Render after every event
//!
//! # Invariants
//!
//! - Active tab always in range
//! - Nothing is handled after a quit
//! - Rendering never panics and is deterministic

#![no_main]

use arbitrary::Arbitrary;
use folio_app::{App, AppAction, AppEvent, KeyInput};
use folio_tui::{ui, Theme};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Clone, Arbitrary)]
enum Op {
    Char(char),
    Ctrl(char),
    Alt(char),
    Tab,
    Esc,
    Resize(u16, u16),
    Shutdown,
}

impl Op {
    fn event(&self) -> AppEvent {
        match *self {
            Op::Char(c) => AppEvent::Key(KeyInput::Char(c)),
            Op::Ctrl(c) => AppEvent::Key(KeyInput::Ctrl(c)),
            Op::Alt(c) => AppEvent::Key(KeyInput::Alt(c)),
            Op::Tab => AppEvent::Key(KeyInput::Tab),
            Op::Esc => AppEvent::Key(KeyInput::Esc),
            Op::Resize(cols, rows) => AppEvent::Resize(cols, rows),
            Op::Shutdown => AppEvent::Shutdown,
        }
    }
}

#[derive(Debug, Arbitrary)]
struct Session {
    cols: u16,
    rows: u16,
    ops: Vec<Op>,
}

fuzz_target!(|session: Session| {
    // Bound buffer allocation; wider terminals add nothing new.
    let cols = session.cols % 512;
    let mut app = App::new(cols, session.rows);
    let theme = Theme::default();
    let mut quit = false;

    for op in &session.ops {
        let actions = app.handle(op.event());
        if quit {
            assert!(actions.is_empty());
        }
        quit |= actions.contains(&AppAction::Quit);

        assert!(app.active_tab() < app.tabs().len());
        let first = ui::render_to_buffer(&app, &theme);
        assert_eq!(first, ui::render_to_buffer(&app, &theme));
    }
});
