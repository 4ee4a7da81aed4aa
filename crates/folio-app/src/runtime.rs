//! Generic runtime for one session.
//!
//! The Runtime drives the session event loop, coordinating between:
//! - [`App`]: session view state machine
//! - [`Driver`]: transport-specific I/O
//!
//! Exactly one event is handled, and its actions executed, before the next
//! event is read.

use crate::{App, AppAction, AppEvent, Driver};

/// Why a session loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// Visitor pressed a quit key.
    Quit,
    /// Server shut down.
    Shutdown,
    /// Visitor's input ended without a quit.
    Disconnected,
}

/// Generic runtime that orchestrates an App and a Driver.
pub struct Runtime<D: Driver> {
    driver: D,
    app: App,
}

impl<D: Driver> Runtime<D> {
    /// Create a new runtime.
    pub fn new(driver: D, app: App) -> Self {
        Self { driver, app }
    }

    /// Run the session loop to completion.
    ///
    /// Renders the initial view, then processes events until the App quits
    /// or input ends. The driver is always stopped before returning.
    ///
    /// # Errors
    ///
    /// Returns the first driver error. A failure while stopping is only
    /// reported if the loop itself succeeded.
    pub async fn run(mut self) -> Result<SessionEnd, D::Error> {
        let outcome = self.event_loop().await;
        let stopped = self.driver.stop().await;

        let end = outcome?;
        stopped?;
        Ok(end)
    }

    async fn event_loop(&mut self) -> Result<SessionEnd, D::Error> {
        self.driver.render(&self.app)?;

        loop {
            let Some(event) = self.driver.poll_event().await? else {
                return Ok(SessionEnd::Disconnected);
            };

            if self.process_actions(event)? {
                return Ok(match event {
                    AppEvent::Shutdown => SessionEnd::Shutdown,
                    AppEvent::Key(_) | AppEvent::Resize(..) => SessionEnd::Quit,
                });
            }
        }
    }

    /// Handle one event. Returns `true` if the session should end.
    fn process_actions(&mut self, event: AppEvent) -> Result<bool, D::Error> {
        for action in self.app.handle(event) {
            match action {
                AppAction::Render => self.driver.render(&self.app)?,
                AppAction::Quit => return Ok(true),
            }
        }
        Ok(false)
    }

    /// Current session view.
    pub fn app(&self) -> &App {
        &self.app
    }
}
