//! Driver trait for abstracting I/O operations.
//!
//! The [`Driver`] trait decouples the session runtime from a specific
//! terminal transport. The SSH server implements it over a session channel,
//! while tests script it directly; the generic [`crate::Runtime`] handles the
//! loop in both cases.

use std::future::Future;

use crate::{App, AppEvent};

/// Abstracts I/O operations for a session runtime.
///
/// Implementations provide transport-specific I/O while the generic
/// [`Runtime`](crate::Runtime) handles orchestration logic. This ensures
/// the same loop runs over a live SSH channel and in tests.
pub trait Driver: Send {
    /// Transport-specific error type.
    type Error: std::error::Error + Send + 'static;

    /// Wait for the next input event.
    ///
    /// Returns `None` once the visitor's input has ended (disconnect).
    fn poll_event(&mut self) -> impl Future<Output = Result<Option<AppEvent>, Self::Error>> + Send;

    /// Render the session view.
    ///
    /// # Errors
    ///
    /// Returns an error if the output could not be written.
    fn render(&mut self, app: &App) -> Result<(), Self::Error>;

    /// Restore the visitor's terminal and close the session.
    fn stop(&mut self) -> impl Future<Output = Result<(), Self::Error>> + Send;
}
