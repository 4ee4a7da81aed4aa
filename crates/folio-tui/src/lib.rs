//! Terminal UI for folio
//!
//! Turns a [`folio_app::App`] into terminal output with ratatui, and turns the
//! raw bytes a visitor's terminal sends into [`folio_app::KeyInput`]s. Holds no
//! I/O of its own; the server wires both halves to an SSH channel.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod input;
pub mod theme;
pub mod ui;

pub use folio_app::{App, AppAction, AppEvent, KeyInput};
pub use theme::Theme;
