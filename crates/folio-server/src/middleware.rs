//! Session middleware pipeline.
//!
//! Before a session starts, it passes through an ordered list of
//! [`Middleware`] stages. Each stage either forwards the session to the next
//! one or rejects it with a message for the visitor. When the session ends,
//! every stage that forwarded it is told, last stage first.

use std::time::{Duration, Instant};

use crate::session::SessionInfo;

/// Decision of one stage about a new session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    /// Hand the session to the next stage.
    Forward,
    /// Refuse the session; the message is shown to the visitor.
    Reject(String),
}

/// One stage of session handling.
pub trait Middleware: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Called once the visitor's shell request arrives.
    fn on_connect(&self, info: &SessionInfo) -> Flow;

    /// Called after a session this stage forwarded has ended.
    fn on_disconnect(&self, _info: &SessionInfo, _elapsed: Duration) {}
}

/// Ordered list of stages.
#[derive(Default)]
pub struct Pipeline {
    stages: Vec<Box<dyn Middleware>>,
}

impl Pipeline {
    /// Empty pipeline that admits every session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stages every portfolio session goes through: logging, then the
    /// pseudo-terminal check.
    pub fn standard() -> Self {
        Self::new().with(Logging).with(ActiveTerm)
    }

    /// Append a stage.
    #[must_use]
    pub fn with(mut self, stage: impl Middleware + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Stage names in order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.stages.iter().map(|stage| stage.name())
    }

    /// Run the connect stages for a new session, stopping at the first
    /// rejection.
    pub fn admit(&self, info: &SessionInfo) -> Admission<'_> {
        let started = Instant::now();
        for (index, stage) in self.stages.iter().enumerate() {
            if let Flow::Reject(message) = stage.on_connect(info) {
                tracing::debug!(stage = stage.name(), "session rejected");
                return Admission { admitted: &self.stages[..index], rejection: Some(message), started };
            }
        }
        Admission { admitted: &self.stages, rejection: None, started }
    }
}

/// Outcome of [`Pipeline::admit`].
///
/// Must be finished once the session is over so the admitting stages see the
/// disconnect.
#[must_use = "call finish() when the session ends"]
pub struct Admission<'a> {
    admitted: &'a [Box<dyn Middleware>],
    rejection: Option<String>,
    started: Instant,
}

impl Admission<'_> {
    /// Message of the stage that refused the session, if one did.
    pub fn rejection(&self) -> Option<&str> {
        self.rejection.as_deref()
    }

    /// Notify every admitting stage of the disconnect, in reverse order.
    pub fn finish(self, info: &SessionInfo) {
        let elapsed = self.started.elapsed();
        for stage in self.admitted.iter().rev() {
            stage.on_disconnect(info, elapsed);
        }
    }
}

/// Logs every session's connect and disconnect.
#[derive(Debug, Clone, Copy, Default)]
pub struct Logging;

impl Middleware for Logging {
    fn name(&self) -> &'static str {
        "logging"
    }

    fn on_connect(&self, info: &SessionInfo) -> Flow {
        let (cols, rows) = info.pty.map_or((0, 0), |size| (size.cols, size.rows));
        tracing::info!(
            user = %info.user,
            peer = ?info.peer,
            term = info.term.as_deref().unwrap_or("-"),
            cols,
            rows,
            "session connected"
        );
        Flow::Forward
    }

    fn on_disconnect(&self, info: &SessionInfo, elapsed: Duration) {
        tracing::info!(user = %info.user, peer = ?info.peer, ?elapsed, "session disconnected");
    }
}

/// Rejects sessions that did not request a pseudo-terminal.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActiveTerm;

/// Message shown to visitors who connect without a terminal.
pub const NO_PTY_MESSAGE: &str = "Requires an active PTY";

impl Middleware for ActiveTerm {
    fn name(&self) -> &'static str {
        "active-term"
    }

    fn on_connect(&self, info: &SessionInfo) -> Flow {
        if info.pty.is_some() { Flow::Forward } else { Flow::Reject(NO_PTY_MESSAGE.to_string()) }
    }
}
