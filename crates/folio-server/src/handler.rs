//! russh connection handler.
//!
//! russh calls into [`ConnectionHandler`] from inside its protocol task. The
//! handler makes the protocol decisions that must be answered immediately
//! (authentication, channel acceptance, request success) and forwards
//! everything else as [`ConnectionEvent`]s to the connection's session task,
//! in arrival order.

use russh::{
    Channel, ChannelId, Pty,
    keys::ssh_key::{HashAlg, PublicKey},
    server::{Auth, Handler, Msg, Response, Session},
};
use tokio::sync::mpsc;

use crate::{RusshChannel, session::PtySize};

/// Protocol events relevant to a portfolio session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEvent<C> {
    /// Client authenticated as `user`.
    Authenticated {
        /// Login name the client presented
        user: String,
    },
    /// Client opened its session channel.
    SessionOpened(C),
    /// Client asked for a pseudo-terminal.
    PtyRequested {
        /// `TERM` of the client
        term: String,
        /// Initial window size
        size: PtySize,
    },
    /// Client asked for a shell (or ran a command, treated the same).
    ShellRequested,
    /// Raw bytes typed by the visitor.
    Input(Vec<u8>),
    /// Client window was resized.
    WindowChanged(PtySize),
    /// Client closed the channel or sent EOF.
    Closed,
}

/// Per-connection russh handler.
pub struct ConnectionHandler {
    events: mpsc::UnboundedSender<ConnectionEvent<RusshChannel>>,
    channel: Option<ChannelId>,
}

impl ConnectionHandler {
    /// Create a handler forwarding to `events`.
    pub fn new(events: mpsc::UnboundedSender<ConnectionEvent<RusshChannel>>) -> Self {
        Self { events, channel: None }
    }

    fn forward(&self, event: ConnectionEvent<RusshChannel>) {
        // Receiver gone means the session already ended; nothing left to tell.
        let _ = self.events.send(event);
    }

    /// Every visitor is let in, whatever they authenticate with.
    fn accept(&self, user: &str, method: &'static str) -> Auth {
        tracing::debug!(user, method, "accepting authentication");
        self.forward(ConnectionEvent::Authenticated { user: user.to_string() });
        Auth::Accept
    }

    fn is_session(&self, channel: ChannelId) -> bool {
        self.channel == Some(channel)
    }
}

impl Handler for ConnectionHandler {
    type Error = russh::Error;

    async fn auth_none(&mut self, user: &str) -> Result<Auth, Self::Error> {
        Ok(self.accept(user, "none"))
    }

    async fn auth_password(&mut self, user: &str, _password: &str) -> Result<Auth, Self::Error> {
        Ok(self.accept(user, "password"))
    }

    async fn auth_publickey(
        &mut self,
        user: &str,
        public_key: &PublicKey,
    ) -> Result<Auth, Self::Error> {
        tracing::debug!(user, fingerprint = %public_key.fingerprint(HashAlg::Sha256), "public key");
        Ok(self.accept(user, "publickey"))
    }

    async fn auth_keyboard_interactive<'a>(
        &'a mut self,
        user: &str,
        _submethods: &str,
        _response: Option<Response<'a>>,
    ) -> Result<Auth, Self::Error> {
        Ok(self.accept(user, "keyboard-interactive"))
    }

    async fn channel_open_session(
        &mut self,
        channel: Channel<Msg>,
        session: &mut Session,
    ) -> Result<bool, Self::Error> {
        if self.channel.is_some() {
            tracing::debug!("rejecting additional session channel");
            return Ok(false);
        }

        let id = channel.id();
        self.channel = Some(id);
        self.forward(ConnectionEvent::SessionOpened(RusshChannel::new(session.handle(), id)));
        Ok(true)
    }

    async fn pty_request(
        &mut self,
        channel: ChannelId,
        term: &str,
        col_width: u32,
        row_height: u32,
        _pix_width: u32,
        _pix_height: u32,
        _modes: &[(Pty, u32)],
        session: &mut Session,
    ) -> Result<(), Self::Error> {
        if !self.is_session(channel) {
            return Ok(session.channel_failure(channel)?);
        }

        self.forward(ConnectionEvent::PtyRequested {
            term: term.to_string(),
            size: PtySize::from_window(col_width, row_height),
        });
        Ok(session.channel_success(channel)?)
    }

    async fn shell_request(
        &mut self,
        channel: ChannelId,
        session: &mut Session,
    ) -> Result<(), Self::Error> {
        if !self.is_session(channel) {
            return Ok(session.channel_failure(channel)?);
        }

        self.forward(ConnectionEvent::ShellRequested);
        Ok(session.channel_success(channel)?)
    }

    async fn exec_request(
        &mut self,
        channel: ChannelId,
        data: &[u8],
        session: &mut Session,
    ) -> Result<(), Self::Error> {
        tracing::debug!(command = %String::from_utf8_lossy(data), "exec request served as shell");
        self.shell_request(channel, session).await
    }

    async fn data(
        &mut self,
        channel: ChannelId,
        data: &[u8],
        _session: &mut Session,
    ) -> Result<(), Self::Error> {
        if self.is_session(channel) {
            self.forward(ConnectionEvent::Input(data.to_vec()));
        }
        Ok(())
    }

    async fn window_change_request(
        &mut self,
        channel: ChannelId,
        col_width: u32,
        row_height: u32,
        _pix_width: u32,
        _pix_height: u32,
        _session: &mut Session,
    ) -> Result<(), Self::Error> {
        if self.is_session(channel) {
            self.forward(ConnectionEvent::WindowChanged(PtySize::from_window(col_width, row_height)));
        }
        Ok(())
    }

    async fn channel_eof(
        &mut self,
        channel: ChannelId,
        _session: &mut Session,
    ) -> Result<(), Self::Error> {
        if self.is_session(channel) {
            self.forward(ConnectionEvent::Closed);
        }
        Ok(())
    }

    async fn channel_close(
        &mut self,
        channel: ChannelId,
        _session: &mut Session,
    ) -> Result<(), Self::Error> {
        if self.is_session(channel) {
            self.forward(ConnectionEvent::Closed);
        }
        Ok(())
    }
}
