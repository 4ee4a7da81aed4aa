//! Session lifecycle.
//!
//! One visitor's path through a connection: wait for the shell request
//! while collecting the user, channel and pseudo-terminal, pass the session
//! through the middleware [`Pipeline`], build the view with
//! [`create_session`], then run the session loop until the visitor quits,
//! disconnects, or the server shuts down.

use std::{net::SocketAddr, sync::Arc};

use folio_app::{App, Runtime, SessionEnd};
use folio_tui::Theme;
use ratatui::layout::Rect;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio_util::sync::CancellationToken;

use crate::{ConnectionEvent, Pipeline, SessionChannel, SessionError, SshTerminal};

/// Exit status sent to clients whose session was refused.
pub const REJECTED_EXIT_STATUS: u32 = 1;

/// Pseudo-terminal window size in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PtySize {
    /// Columns
    pub cols: u16,
    /// Rows
    pub rows: u16,
}

impl PtySize {
    /// Largest window a session renders into. Bigger windows see the view
    /// in their top-left corner.
    pub const MAX: Self = Self::new(1000, 500);

    /// Create a window size.
    pub const fn new(cols: u16, rows: u16) -> Self {
        Self { cols, rows }
    }

    /// Size from an SSH window request, clamped to [`PtySize::MAX`].
    pub fn from_window(cols: u32, rows: u32) -> Self {
        let saturate = |value: u32| u16::try_from(value).unwrap_or(u16::MAX);
        Self::new(saturate(cols), saturate(rows)).clamped()
    }

    /// This size, limited to [`PtySize::MAX`].
    #[must_use]
    pub fn clamped(self) -> Self {
        Self::new(self.cols.min(Self::MAX.cols), self.rows.min(Self::MAX.rows))
    }

    /// Screen area at the origin.
    pub fn area(self) -> Rect {
        Rect::new(0, 0, self.cols, self.rows)
    }
}

/// What is known about a session when its shell request arrives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    /// Login name.
    pub user: String,
    /// Remote address, when known.
    pub peer: Option<SocketAddr>,
    /// Client `TERM`, when a pseudo-terminal was requested.
    pub term: Option<String>,
    /// Window size, when a pseudo-terminal was requested.
    pub pty: Option<PtySize>,
}

/// How the session loop drives the visitor's terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoopOptions {
    /// Render on the alternate screen so the visitor's scrollback is restored
    /// on exit.
    pub alt_screen: bool,
}

/// Build the initial view for a session.
///
/// # Errors
///
/// [`SessionError::NoPty`] if the session has no pseudo-terminal. The
/// middleware pipeline rejects such sessions before they get here.
pub fn create_session(info: &SessionInfo) -> Result<(App, LoopOptions), SessionError> {
    let size = info.pty.ok_or(SessionError::NoPty)?.clamped();
    Ok((App::new(size.cols, size.rows), LoopOptions { alt_screen: true }))
}

/// Shared, read-only dependencies of every session.
pub struct SessionContext {
    /// Middleware every session passes through.
    pub pipeline: Pipeline,
    /// Styling used to render.
    pub theme: Arc<Theme>,
}

impl Default for SessionContext {
    fn default() -> Self {
        Self { pipeline: Pipeline::standard(), theme: Arc::new(Theme::default()) }
    }
}

/// Session state collected before the shell request.
struct Setup<C> {
    user: String,
    channel: Option<C>,
    term: Option<String>,
    pty: Option<PtySize>,
}

/// Serve one connection's session from its event stream.
///
/// Returns `None` if the connection ended or the server shut down before a
/// shell was requested, or if the pipeline rejected the session.
pub async fn serve<C: SessionChannel>(
    mut events: UnboundedReceiver<ConnectionEvent<C>>,
    peer: Option<SocketAddr>,
    context: &SessionContext,
    shutdown: CancellationToken,
) -> Result<Option<SessionEnd>, SessionError> {
    let mut setup = Setup { user: String::new(), channel: None, term: None, pty: None };

    loop {
        let event = tokio::select! {
            biased;

            () = shutdown.cancelled() => return Ok(None),
            event = events.recv() => event,
        };

        match event {
            Some(ConnectionEvent::Authenticated { user }) => setup.user = user,
            Some(ConnectionEvent::SessionOpened(channel)) => setup.channel = Some(channel),
            Some(ConnectionEvent::PtyRequested { term, size }) => {
                setup.term = Some(term);
                setup.pty = Some(size);
            },
            Some(ConnectionEvent::WindowChanged(size)) => {
                if setup.pty.is_some() {
                    setup.pty = Some(size);
                }
            },
            // Typed before the view exists.
            Some(ConnectionEvent::Input(_)) => {},
            Some(ConnectionEvent::ShellRequested) => break,
            Some(ConnectionEvent::Closed) | None => return Ok(None),
        }
    }

    let channel = setup.channel.ok_or(SessionError::ChannelClosed)?;
    let info = SessionInfo { user: setup.user, peer, term: setup.term, pty: setup.pty };

    let admission = context.pipeline.admit(&info);
    let outcome = match admission.rejection() {
        Some(message) => reject(&channel, message).await.map(|()| None),
        None => run(channel, events, &info, context, shutdown).await.map(Some),
    };
    admission.finish(&info);

    outcome
}

async fn run<C: SessionChannel>(
    channel: C,
    events: UnboundedReceiver<ConnectionEvent<C>>,
    info: &SessionInfo,
    context: &SessionContext,
    shutdown: CancellationToken,
) -> Result<SessionEnd, SessionError> {
    let (app, options) = create_session(info)?;
    let (cols, rows) = app.terminal_size();
    let driver = SshTerminal::start(
        channel,
        events,
        PtySize::new(cols, rows),
        options,
        Arc::clone(&context.theme),
        shutdown,
    )?;

    Runtime::new(driver, app).run().await
}

async fn reject<C: SessionChannel>(channel: &C, message: &str) -> Result<(), SessionError> {
    channel.send(format!("{message}\r\n").into_bytes()).await?;
    channel.exit(REJECTED_EXIT_STATUS).await?;
    channel.close().await
}
