//! Application layer for folio
//!
//! Static portfolio content, the per-session view state machine and a generic
//! runtime loop, with no terminal or network dependencies so every transition
//! can be exercised directly in tests.
//!
//! # Components
//!
//! - [`Content`]: ordered tabs of styled text blocks
//! - [`App`]: session view state machine (active tab, quit handling)
//! - [`Driver`]: Trait for transport-specific I/O abstraction
//! - [`Runtime`]: Generic session loop using Driver

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod action;
mod app;
mod content;
mod driver;
mod event;
mod input;
mod runtime;

pub use action::AppAction;
pub use app::App;
pub use content::{BlockStyle, Content, ContentBlock, Tab, Tone};
pub use driver::Driver;
pub use event::AppEvent;
pub use input::KeyInput;
pub use runtime::{Runtime, SessionEnd};
